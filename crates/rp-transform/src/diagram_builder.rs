use rp_core::{
    EntityKind, Invoke, Loop, SequenceDiagram, Statement as DiagramStatement, derive_color,
};
use rp_source::{CompilationUnit, Expression, Statement as SourceStatement, Subroutine};
use tracing::{debug, trace, warn};

use crate::expression::expression_text;
use crate::{TransformOptions, TransformOutcome};

/// Default label of the actor driving the program.
pub const CLIENT_PARTICIPANT: &str = "client";
/// Method shown for the implicit call of the initialization subroutine.
pub const INITIALIZATION_METHOD: &str = "inzsr";
/// Method shown for `SETLL`.
pub const SET_LOWER_LIMIT_METHOD: &str = "Initialize cursor";
/// Loop label for `DOU`.
pub const UNTIL_LOOP: &str = "UNTIL";

/// Names of the subroutines currently being expanded, outermost first.
///
/// Passed by reference down the recursion; entering a subroutine produces a
/// new value instead of mutating the caller's.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CallContext {
    frames: Vec<String>,
}

impl CallContext {
    /// The participant executing right now: innermost subroutine, or the
    /// source member itself at top level.
    pub(crate) fn caller<'a>(&'a self, source_name: &'a str) -> &'a str {
        self.frames.last().map_or(source_name, String::as_str)
    }

    pub(crate) fn enter(&self, subroutine: &str) -> Self {
        let mut frames = self.frames.clone();
        frames.push(subroutine.to_string());
        Self { frames }
    }

    pub(crate) fn is_active(&self, subroutine: &str) -> bool {
        self.frames
            .iter()
            .any(|frame| frame.eq_ignore_ascii_case(subroutine))
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }
}

pub(crate) struct DiagramBuilder<'a> {
    unit: &'a CompilationUnit,
    source_name: &'a str,
    max_call_depth: usize,
    diagram: SequenceDiagram,
    warnings: Vec<String>,
}

impl<'a> DiagramBuilder<'a> {
    pub(crate) fn new(unit: &'a CompilationUnit, options: &'a TransformOptions) -> Self {
        let mut diagram = SequenceDiagram::new();
        diagram.ensure_entity(options.client.as_str(), EntityKind::Actor, None);
        diagram.ensure_entity(options.source_name.as_str(), EntityKind::Entity, None);
        Self {
            unit,
            source_name: &options.source_name,
            max_call_depth: options.max_call_depth,
            diagram,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn build(mut self) -> TransformOutcome {
        let unit = self.unit;
        for subroutine in unit.initialization_subroutines() {
            self.add_initialization_call(subroutine);
        }

        let root = CallContext::default();
        for statement in &unit.main_statements {
            let translated = self.translate(statement, &root);
            self.diagram.add_statement(translated);
        }

        debug!(
            "Built diagram: statements={}, nodes={}, entities={}, warnings={}",
            self.diagram.statements().len(),
            self.diagram.node_count(),
            self.diagram.entities().len(),
            self.warnings.len()
        );

        TransformOutcome {
            diagram: self.diagram,
            warnings: self.warnings,
        }
    }

    fn add_initialization_call(&mut self, subroutine: &Subroutine) {
        trace!("Initialization subroutine {} runs first", subroutine.name);
        let invoke = Invoke::new(
            self.source_name,
            self.source_name,
            INITIALIZATION_METHOD,
            Vec::new(),
        );
        self.diagram
            .ensure_entity(invoke.method.as_str(), EntityKind::Entity, None);
        self.diagram.add_statement(invoke.into());
    }

    pub(crate) fn translate(
        &mut self,
        statement: &SourceStatement,
        context: &CallContext,
    ) -> DiagramStatement {
        let caller = context.caller(self.source_name).to_string();
        match statement {
            SourceStatement::InvokeSubroutine { subroutine } => {
                self.translate_subroutine_call(caller, subroutine, context)
            }
            SourceStatement::If {
                condition,
                then_body,
            } => {
                let condition = expression_text(condition);
                let then_body = self.translate_all(then_body, context);
                DiagramStatement::conditional(condition, then_body)
            }
            SourceStatement::DoUntil { condition, body } => {
                let mut lp = Loop::new(UNTIL_LOOP, expression_text(condition));
                lp.body = self.translate_all(body, context);
                lp.into()
            }
            SourceStatement::SetLowerLimit {
                search_argument,
                name,
            } => {
                let search_argument = expression_text(search_argument);
                let reference = expression_text(name);
                let entity_color = derive_color(&reference);
                self.diagram.ensure_entity(
                    reference.as_str(),
                    EntityKind::Database,
                    Some(entity_color),
                );
                Invoke::new(
                    caller,
                    reference.as_str(),
                    SET_LOWER_LIMIT_METHOD,
                    vec![search_argument, reference.clone()],
                )
                .with_color(entity_color.darker_shade())
                .into()
            }
            SourceStatement::ReadRecord { name } => {
                self.record_access(caller, name, "READ", true)
            }
            SourceStatement::WriteRecord { name } => {
                self.record_access(caller, name, "WRITE", true)
            }
            SourceStatement::DeleteRecord { name } => {
                self.record_access(caller, name, "DELETE", false)
            }
            SourceStatement::UpdateRecord { name } => {
                self.record_access(caller, name, "UPDATE", false)
            }
            SourceStatement::Unsupported => DiagramStatement::Empty,
        }
    }

    fn translate_all(
        &mut self,
        statements: &[SourceStatement],
        context: &CallContext,
    ) -> Vec<DiagramStatement> {
        statements
            .iter()
            .map(|statement| self.translate(statement, context))
            .collect()
    }

    fn translate_subroutine_call(
        &mut self,
        caller: String,
        target: &str,
        context: &CallContext,
    ) -> DiagramStatement {
        let mut invoke = Invoke::new(caller, target, target, Vec::new());
        self.diagram
            .ensure_entity(invoke.method.as_str(), EntityKind::Entity, None);

        let unit = self.unit;
        let Some(subroutine) = unit.find_subroutine(target) else {
            self.add_warning(format!(
                "Subroutine {target} is not defined in {}; call left unexpanded",
                self.source_name
            ));
            return invoke.into();
        };

        if context.is_active(target) {
            self.add_warning(format!(
                "Recursive call to subroutine {target} from {}; body not expanded",
                invoke.caller
            ));
            return invoke.into();
        }
        if context.depth() >= self.max_call_depth {
            self.add_warning(format!(
                "Call depth limit {} reached at subroutine {target}; body not expanded",
                self.max_call_depth
            ));
            return invoke.into();
        }

        debug!(
            "Expanding subroutine {} called from {} at depth {}",
            subroutine.name,
            invoke.caller,
            context.depth()
        );
        let nested = context.enter(target);
        invoke.body = self.translate_all(&subroutine.statements, &nested);
        invoke.into()
    }

    fn record_access(
        &mut self,
        caller: String,
        name: &Expression,
        method: &str,
        colored: bool,
    ) -> DiagramStatement {
        let reference = expression_text(name);
        let invoke = Invoke::new(caller, reference.as_str(), method, vec![reference.clone()]);
        if !colored {
            return invoke.into();
        }

        let entity_color = derive_color(&reference);
        self.diagram
            .ensure_entity(reference.as_str(), EntityKind::Database, Some(entity_color));
        invoke.with_color(entity_color.darker_shade()).into()
    }

    fn add_warning(&mut self, message: String) {
        warn!("{message}");
        self.warnings.push(message);
    }
}
