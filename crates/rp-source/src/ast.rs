//! RPG AST node types.
//!
//! Only the constructs the diagram cares about are modelled. Every other
//! statement or expression deserializes into the `Unsupported` variant of
//! its enum so unknown parser output never fails a load.

use serde::{Deserialize, Serialize};

/// Root envelope, used to check what a pipeline stage was handed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "node", content = "value")]
pub enum SourceNode {
    CompilationUnit(CompilationUnit),
    Subroutine(Subroutine),
    Statement(Statement),
    Expression(Expression),
}

impl SourceNode {
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::CompilationUnit(_) => "CompilationUnit",
            Self::Subroutine(_) => "Subroutine",
            Self::Statement(_) => "Statement",
            Self::Expression(_) => "Expression",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CompilationUnit {
    #[serde(default)]
    pub subroutines: Vec<Subroutine>,
    #[serde(default)]
    pub main_statements: Vec<Statement>,
}

impl CompilationUnit {
    /// First subroutine whose name matches, ignoring ASCII case.
    #[must_use]
    pub fn find_subroutine(&self, name: &str) -> Option<&Subroutine> {
        self.subroutines
            .iter()
            .find(|subroutine| subroutine.name.eq_ignore_ascii_case(name))
    }

    pub fn initialization_subroutines(&self) -> impl Iterator<Item = &Subroutine> {
        self.subroutines
            .iter()
            .filter(|subroutine| subroutine.initialization)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Subroutine {
    pub name: String,
    /// `*INZSR`: runs implicitly before the main body.
    #[serde(default)]
    pub initialization: bool,
    #[serde(default)]
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum Statement {
    /// `EXSR name`
    InvokeSubroutine { subroutine: String },
    If {
        condition: Expression,
        #[serde(default)]
        then_body: Vec<Statement>,
    },
    /// `DOU cond ... ENDDO`
    DoUntil {
        condition: Expression,
        #[serde(default)]
        body: Vec<Statement>,
    },
    /// `SETLL key file`
    SetLowerLimit {
        search_argument: Expression,
        name: Expression,
    },
    ReadRecord { name: Expression },
    WriteRecord { name: Expression },
    DeleteRecord { name: Expression },
    UpdateRecord { name: Expression },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ComparisonKind {
    Equality,
    Inequality,
    LessThan,
    LessEq,
    MoreThan,
    MoreEq,
}

impl ComparisonKind {
    #[must_use]
    pub const fn operator(self) -> &'static str {
        match self {
            Self::Equality => "=",
            Self::Inequality => "!=",
            Self::LessThan => "<",
            Self::LessEq => "<=",
            Self::MoreThan => ">",
            Self::MoreEq => ">=",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum Expression {
    IntLiteral { value: String },
    DecLiteral { value: String },
    StringLiteral { value: String },
    /// `*BLANKS`, `*ZEROS`, `*ON`, ...
    FigurativeConstant { text: String },
    /// Reference to a data definition (field, file, indicator).
    Reference { name: String },
    Comparison {
        comparison: ComparisonKind,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    LogicalNegation { base: Box<Expression> },
    /// `%EOF(file)`, `%FOUND()`, ...
    BuiltinFunctionCall {
        function_name: String,
        #[serde(default)]
        params: Vec<Expression>,
    },
    #[serde(other)]
    Unsupported,
}

impl Expression {
    #[must_use]
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Reference { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_operators_are_complete() {
        let expectations = [
            (ComparisonKind::Equality, "="),
            (ComparisonKind::Inequality, "!="),
            (ComparisonKind::LessThan, "<"),
            (ComparisonKind::LessEq, "<="),
            (ComparisonKind::MoreThan, ">"),
            (ComparisonKind::MoreEq, ">="),
        ];

        for (kind, expected) in expectations {
            assert_eq!(kind.operator(), expected);
        }
    }

    #[test]
    fn nested_expression_deserializes() {
        let json = r#"{
            "kind": "LogicalNegation",
            "base": {
                "kind": "BuiltinFunctionCall",
                "function_name": "eof",
                "params": [ { "kind": "Reference", "name": "custmast" } ]
            }
        }"#;
        let expression: Expression = serde_json::from_str(json).expect("expression");
        assert_eq!(
            expression,
            Expression::LogicalNegation {
                base: Box::new(Expression::BuiltinFunctionCall {
                    function_name: "eof".to_string(),
                    params: vec![Expression::reference("custmast")],
                }),
            }
        );
    }

    #[test]
    fn unknown_expression_kind_is_unsupported() {
        let expression: Expression =
            serde_json::from_str(r#"{ "kind": "ArrayAccess" }"#).expect("expression");
        assert_eq!(expression, Expression::Unsupported);
    }

    #[test]
    fn initialization_subroutines_are_filtered() {
        let unit = CompilationUnit {
            subroutines: vec![
                Subroutine {
                    name: "*INZSR".to_string(),
                    initialization: true,
                    statements: Vec::new(),
                },
                Subroutine {
                    name: "MAIN".to_string(),
                    ..Subroutine::default()
                },
            ],
            main_statements: Vec::new(),
        };
        let names: Vec<_> = unit
            .initialization_subroutines()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, ["*INZSR"]);
        assert!(unit.find_subroutine("main").is_some());
        assert!(unit.find_subroutine("other").is_none());
    }
}
