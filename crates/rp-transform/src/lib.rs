#![forbid(unsafe_code)]

//! RPG AST to sequence diagram transformer.
//!
//! Walks a [`CompilationUnit`] and produces a [`SequenceDiagram`]:
//!
//! - `EXSR` becomes a call whose body is the expanded subroutine
//! - `IF` becomes a group, or nothing when its branch has nothing to show
//! - `DOU` becomes an `UNTIL` loop
//! - record I/O (`SETLL`, `READ`, `WRITE`, `DELETE`, `UPDATE`) becomes a call
//!   to the file participant
//!
//! Calls are attributed to whichever subroutine is being expanded at that
//! point, not to the program as a whole.

mod diagram_builder;
mod expression;

pub use diagram_builder::{
    CLIENT_PARTICIPANT, INITIALIZATION_METHOD, SET_LOWER_LIMIT_METHOD, UNTIL_LOOP,
};
pub use expression::{UNSUPPORTED_EXPRESSION, expression_text};

use rp_core::{ModelError, SequenceDiagram};
use rp_source::{CompilationUnit, SourceNode};

use crate::diagram_builder::DiagramBuilder;

/// Default bound on nested subroutine expansion.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    /// Name of the source member; labels the program participant.
    pub source_name: String,
    /// Label of the actor driving the program.
    pub client: String,
    /// Subroutine calls nested deeper than this are emitted without a body.
    pub max_call_depth: usize,
}

impl TransformOptions {
    #[must_use]
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            client: CLIENT_PARTICIPANT.to_string(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = client.into();
        self
    }

    #[must_use]
    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }
}

/// A built diagram plus the soft failures met while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutcome {
    pub diagram: SequenceDiagram,
    /// Unresolved calls and truncated recursion.
    pub warnings: Vec<String>,
}

/// Transform a source AST into a sequence diagram.
///
/// # Errors
///
/// Returns [`ModelError::UnsupportedModel`] unless `node` is a compilation unit.
pub fn transform(
    node: &SourceNode,
    options: &TransformOptions,
) -> Result<SequenceDiagram, ModelError> {
    transform_traced(node, options).map(|outcome| outcome.diagram)
}

/// Like [`transform`], also returning the warnings collected on the way.
///
/// # Errors
///
/// Returns [`ModelError::UnsupportedModel`] unless `node` is a compilation unit.
pub fn transform_traced(
    node: &SourceNode,
    options: &TransformOptions,
) -> Result<TransformOutcome, ModelError> {
    match node {
        SourceNode::CompilationUnit(unit) => Ok(transform_unit(unit, options)),
        other => Err(ModelError::unsupported(
            "CompilationUnit",
            other.kind_name(),
        )),
    }
}

/// Transform a compilation unit directly.
#[must_use]
pub fn transform_unit(unit: &CompilationUnit, options: &TransformOptions) -> TransformOutcome {
    DiagramBuilder::new(unit, options).build()
}
