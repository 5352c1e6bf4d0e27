#![forbid(unsafe_code)]

//! Sequence diagram model shared by the rpg2puml pipeline.
//!
//! A [`SequenceDiagram`] is an ordered tree of [`Statement`]s plus a registry
//! of participant [`Entity`] values. The transformer builds it once per
//! source member and the PlantUML generator consumes it.

mod color;

pub use color::{CHANNEL_MODULUS, Rgb, darker_shade, derive_color, identifier_hash, to_hex};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A pipeline stage was handed a model of the wrong kind.
    #[error("Invalid input model: expected {expected}, found {found}")]
    UnsupportedModel { expected: String, found: String },
}

impl ModelError {
    #[must_use]
    pub fn unsupported(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::UnsupportedModel {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum EntityKind {
    Actor,
    #[default]
    Entity,
    Database,
}

impl EntityKind {
    /// PlantUML participant keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Actor => "actor",
            Self::Entity => "entity",
            Self::Database => "database",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Entity {
    pub name: String,
    pub kind: EntityKind,
    pub color: Option<Rgb>,
}

impl Entity {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            color: None,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Option<Rgb>) -> Self {
        self.color = color;
        self
    }
}

/// A call from one participant to another.
///
/// `body` holds what happens as a consequence of the call, usually the
/// expanded statements of the called subroutine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Invoke {
    pub caller: String,
    pub receiver: String,
    pub method: String,
    pub params: Vec<String>,
    pub body: Vec<Statement>,
    pub color: Option<Rgb>,
}

impl Invoke {
    #[must_use]
    pub fn new(
        caller: impl Into<String>,
        receiver: impl Into<String>,
        method: impl Into<String>,
        params: Vec<String>,
    ) -> Self {
        Self {
            caller: caller.into(),
            receiver: receiver.into(),
            method: method.into(),
            params,
            body: Vec::new(),
            color: None,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Loop {
    /// Loop flavor label, e.g. `UNTIL`.
    pub kind: String,
    pub condition: String,
    pub body: Vec<Statement>,
}

impl Loop {
    #[must_use]
    pub fn new(kind: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            condition: condition.into(),
            body: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Conditional {
    pub condition: String,
    pub then_body: Vec<Statement>,
}

impl Conditional {
    /// True when nothing in the branch would render.
    #[must_use]
    pub fn has_empty_body(&self) -> bool {
        self.then_body.iter().all(Statement::is_empty)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Statement {
    Invoke(Invoke),
    Loop(Loop),
    If(Conditional),
    #[default]
    Empty,
}

impl Statement {
    /// Build a conditional, collapsing it to [`Statement::Empty`] when every
    /// statement in its branch is empty.
    #[must_use]
    pub fn conditional(condition: impl Into<String>, then_body: Vec<Statement>) -> Self {
        let conditional = Conditional {
            condition: condition.into(),
            then_body,
        };
        if conditional.has_empty_body() {
            Self::Empty
        } else {
            Self::If(conditional)
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Nested statements, if this statement kind has a body.
    #[must_use]
    pub fn body(&self) -> &[Statement] {
        match self {
            Self::Invoke(invoke) => &invoke.body,
            Self::Loop(lp) => &lp.body,
            Self::If(conditional) => &conditional.then_body,
            Self::Empty => &[],
        }
    }

    #[must_use]
    pub fn as_invoke(&self) -> Option<&Invoke> {
        match self {
            Self::Invoke(invoke) => Some(invoke),
            _ => None,
        }
    }

    /// Count this statement and everything nested below it.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.body().iter().map(Self::node_count).sum::<usize>()
    }
}

impl From<Invoke> for Statement {
    fn from(value: Invoke) -> Self {
        Self::Invoke(value)
    }
}

impl From<Loop> for Statement {
    fn from(value: Loop) -> Self {
        Self::Loop(value)
    }
}

/// The complete diagram: top-level statements plus participants, both in
/// insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SequenceDiagram {
    statements: Vec<Statement>,
    entities: Vec<Entity>,
    #[serde(skip)]
    entity_index_by_name: FxHashMap<String, usize>,
}

impl SequenceDiagram {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a top-level statement and hand it back for further editing.
    pub fn add_statement(&mut self, statement: Statement) -> &mut Statement {
        let index = self.statements.len();
        self.statements.push(statement);
        &mut self.statements[index]
    }

    /// Register a participant unless one with the same name already exists.
    ///
    /// Returns `true` when a new entity was added. An existing entity keeps
    /// its original kind and color.
    pub fn ensure_entity(
        &mut self,
        name: impl Into<String>,
        kind: EntityKind,
        color: Option<Rgb>,
    ) -> bool {
        let name = name.into();
        if self.entity_index(&name).is_some() {
            return false;
        }
        self.entity_index_by_name
            .insert(name.clone(), self.entities.len());
        self.entities.push(Entity::new(name, kind).with_color(color));
        true
    }

    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    #[must_use]
    pub fn find_entity(&self, name: &str) -> Option<&Entity> {
        self.entity_index(name).map(|index| &self.entities[index])
    }

    /// Total statements in the tree, nested ones included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.statements.iter().map(Statement::node_count).sum()
    }

    fn entity_index(&self, name: &str) -> Option<usize> {
        // The index is not serialized; fall back to a scan after a round trip.
        self.entity_index_by_name
            .get(name)
            .copied()
            .or_else(|| self.entities.iter().position(|entity| entity.name == name))
    }
}

impl PartialEq for SequenceDiagram {
    fn eq(&self, other: &Self) -> bool {
        self.statements == other.statements && self.entities == other.entities
    }
}

impl Eq for SequenceDiagram {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn read(caller: &str, reference: &str) -> Statement {
        Invoke::new(caller, reference, "READ", vec![reference.to_string()]).into()
    }

    #[test]
    fn entity_registration_is_idempotent() {
        let mut diagram = SequenceDiagram::new();
        let color = derive_color("CUST");
        assert!(diagram.ensure_entity("CUST", EntityKind::Database, Some(color)));
        assert!(!diagram.ensure_entity("CUST", EntityKind::Actor, None));

        assert_eq!(diagram.entities().len(), 1);
        let entity = diagram.find_entity("CUST").expect("entity registered");
        assert_eq!(entity.kind, EntityKind::Database);
        assert_eq!(entity.color, Some(color));
    }

    #[test]
    fn entities_keep_insertion_order() {
        let mut diagram = SequenceDiagram::new();
        diagram.ensure_entity("client", EntityKind::Actor, None);
        diagram.ensure_entity("PGM.rpgle", EntityKind::Entity, None);
        diagram.ensure_entity("CUST", EntityKind::Database, None);
        diagram.ensure_entity("client", EntityKind::Entity, None);

        let names: Vec<_> = diagram.entities().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["client", "PGM.rpgle", "CUST"]);
    }

    #[test]
    fn entity_names_are_case_sensitive() {
        let mut diagram = SequenceDiagram::new();
        diagram.ensure_entity("cust", EntityKind::Database, None);
        diagram.ensure_entity("CUST", EntityKind::Database, None);
        assert_eq!(diagram.entities().len(), 2);
    }

    #[test]
    fn add_statement_returns_the_appended_statement() {
        let mut diagram = SequenceDiagram::new();
        let added = diagram.add_statement(read("PGM", "CUST"));
        if let Statement::Invoke(invoke) = added {
            invoke.color = Some(Rgb::new(1, 2, 3));
        }

        let stored = diagram.statements()[0].as_invoke().expect("invoke");
        assert_eq!(stored.color, Some(Rgb::new(1, 2, 3)));
    }

    #[test]
    fn conditional_with_only_empty_children_collapses() {
        let statement = Statement::conditional("A = B", vec![Statement::Empty, Statement::Empty]);
        assert_eq!(statement, Statement::Empty);

        let statement = Statement::conditional("A = B", Vec::new());
        assert_eq!(statement, Statement::Empty);
    }

    #[test]
    fn conditional_with_a_call_is_kept() {
        let statement =
            Statement::conditional("A = B", vec![Statement::Empty, read("PGM", "CUST")]);
        let Statement::If(conditional) = statement else {
            panic!("expected conditional");
        };
        assert_eq!(conditional.condition, "A = B");
        assert_eq!(conditional.then_body.len(), 2);
    }

    #[test]
    fn node_count_includes_nested_bodies() {
        let mut outer = Invoke::new("PGM", "SUB", "SUB", Vec::new());
        outer.body.push(read("SUB", "CUST"));
        let mut lp = Loop::new("UNTIL", "*IN90");
        lp.body.push(read("SUB", "ORD"));
        outer.body.push(lp.into());

        let mut diagram = SequenceDiagram::new();
        diagram.add_statement(outer.into());
        diagram.add_statement(Statement::Empty);
        assert_eq!(diagram.node_count(), 5);
    }

    #[test]
    fn entity_lookup_survives_json_round_trip() {
        let mut diagram = SequenceDiagram::new();
        diagram.ensure_entity("CUST", EntityKind::Database, None);
        diagram.add_statement(read("PGM", "CUST"));

        let encoded = serde_json::to_string(&diagram).expect("serialize diagram");
        let mut decoded: SequenceDiagram =
            serde_json::from_str(&encoded).expect("deserialize diagram");
        assert!(decoded.find_entity("CUST").is_some());
        assert!(!decoded.ensure_entity("CUST", EntityKind::Entity, None));
        assert_eq!(decoded, diagram);
    }

    #[test]
    fn entity_kind_keywords() {
        assert_eq!(EntityKind::Actor.as_str(), "actor");
        assert_eq!(EntityKind::Entity.as_str(), "entity");
        assert_eq!(EntityKind::Database.as_str(), "database");
    }

    #[test]
    fn unsupported_model_error_message() {
        let error = ModelError::unsupported("CompilationUnit", "Expression");
        assert_eq!(
            error.to_string(),
            "Invalid input model: expected CompilationUnit, found Expression"
        );
    }

    proptest! {
        #[test]
        fn repeated_registration_never_grows(names in proptest::collection::vec("[A-Z]{1,3}", 1..20)) {
            let mut diagram = SequenceDiagram::new();
            for name in &names {
                diagram.ensure_entity(name.clone(), EntityKind::Database, None);
            }
            let before = diagram.entities().to_vec();
            for name in &names {
                diagram.ensure_entity(name.clone(), EntityKind::Actor, Some(Rgb::new(1, 1, 1)));
            }
            prop_assert_eq!(diagram.entities(), before.as_slice());
        }
    }
}
