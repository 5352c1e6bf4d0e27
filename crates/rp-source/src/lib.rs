#![forbid(unsafe_code)]

//! Typed RPG source AST, as handed over by the external parser.
//!
//! The parser itself lives outside this workspace. Its output crosses the
//! boundary as a JSON AST dump which [`load_document`] turns into the types
//! below. Nothing here is mutated after loading.

mod ast;

pub use ast::{
    CompilationUnit, ComparisonKind, Expression, SourceNode, Statement, Subroutine,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("malformed AST document at line {line}, column {column}: {message}")]
    Malformed {
        message: String,
        line: usize,
        column: usize,
    },
}

impl From<serde_json::Error> for SourceError {
    fn from(error: serde_json::Error) -> Self {
        Self::Malformed {
            message: error.to_string(),
            line: error.line(),
            column: error.column(),
        }
    }
}

/// One parsed source member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceDocument {
    /// Name of the RPG member the AST was parsed from, e.g. `CUSTINQ.rpgle`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    pub root: SourceNode,
}

impl SourceDocument {
    #[must_use]
    pub fn new(source_file: Option<String>, root: SourceNode) -> Self {
        Self { source_file, root }
    }
}

/// Load an AST dump.
///
/// # Errors
///
/// Returns [`SourceError::Malformed`] when the text is not a valid document.
pub fn load_document(json: &str) -> Result<SourceDocument, SourceError> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_compilation_unit_document() {
        let json = r#"{
            "source_file": "CUSTINQ.rpgle",
            "root": {
                "node": "CompilationUnit",
                "value": {
                    "subroutines": [
                        {
                            "name": "*INZSR",
                            "initialization": true,
                            "statements": []
                        },
                        {
                            "name": "LoadCust",
                            "statements": [
                                { "kind": "ReadRecord", "name": { "kind": "Reference", "name": "cust" } }
                            ]
                        }
                    ],
                    "main_statements": [
                        { "kind": "InvokeSubroutine", "subroutine": "LOADCUST" },
                        { "kind": "Eval" }
                    ]
                }
            }
        }"#;

        let document = load_document(json).expect("document loads");
        assert_eq!(document.source_file.as_deref(), Some("CUSTINQ.rpgle"));
        let SourceNode::CompilationUnit(unit) = &document.root else {
            panic!("expected compilation unit");
        };
        assert_eq!(unit.subroutines.len(), 2);
        assert!(unit.subroutines[0].initialization);
        assert!(!unit.subroutines[1].initialization);
        assert_eq!(unit.main_statements[1], Statement::Unsupported);
        assert_eq!(
            unit.find_subroutine("loadcust").map(|s| s.name.as_str()),
            Some("LoadCust")
        );
    }

    #[test]
    fn source_file_is_optional() {
        let json = r#"{ "root": { "node": "CompilationUnit", "value": {} } }"#;
        let document = load_document(json).expect("document loads");
        assert!(document.source_file.is_none());
        assert_eq!(
            document.root,
            SourceNode::CompilationUnit(CompilationUnit::default())
        );
    }

    #[test]
    fn non_unit_roots_load_and_report_their_kind() {
        let json = r#"{ "root": { "node": "Expression", "value": { "kind": "IntLiteral", "value": "1" } } }"#;
        let document = load_document(json).expect("document loads");
        assert_eq!(document.root.kind_name(), "Expression");
    }

    #[test]
    fn malformed_json_reports_position() {
        let error = load_document("{\n  \"root\": ").expect_err("truncated input");
        let SourceError::Malformed { line, .. } = error;
        assert_eq!(line, 2);
    }

    #[test]
    fn unknown_root_node_is_rejected() {
        let json = r#"{ "root": { "node": "Procedure", "value": {} } }"#;
        assert!(load_document(json).is_err());
    }
}
