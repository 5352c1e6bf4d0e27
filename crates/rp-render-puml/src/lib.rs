#![forbid(unsafe_code)]

//! PlantUML sequence diagram generator.
//!
//! Statements render to lines by kind:
//!
//! | Statement | Lines                                                   |
//! |-----------|---------------------------------------------------------|
//! | Invoke    | `caller -> receiver : method params`, then its body     |
//! | Loop      | `loop KIND condition`, body, `end`                      |
//! | If        | `group IF condition`, body, `end`                       |
//! | Empty     | nothing                                                 |
//!
//! The joined lines fill the `sequence` placeholder of [`SEQUENCE_TEMPLATE`].

mod config;
mod template;

pub use config::PumlRenderConfig;
pub use template::{SEQUENCE_TEMPLATE, placeholders, substitute};

use std::collections::BTreeMap;

use rp_core::{Conditional, Entity, Invoke, Loop, SequenceDiagram, Statement};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("template placeholder '{0}' has no value")]
    MissingPlaceholder(String),
}

pub const SEQUENCE_KEY: &str = "sequence";
pub const ENTITIES_KEY: &str = "entities";
pub const CLIENT_KEY: &str = "client";
pub const MODULE_KEY: &str = "module";

/// Render with the default configuration.
///
/// `placeholders` must provide `client` and `module`. A missing `entities`
/// renders blank; `sequence` is always computed from the diagram and
/// overrides any supplied value.
///
/// # Errors
///
/// Returns [`RenderError::MissingPlaceholder`] when a template key has no value.
pub fn render(
    diagram: &SequenceDiagram,
    placeholders: &BTreeMap<String, String>,
) -> Result<String, RenderError> {
    render_with_config(diagram, placeholders, &PumlRenderConfig::default())
}

/// Render with an explicit configuration.
///
/// With `declare_entities` the `entities` value is computed too, so callers
/// only have to supply `client` and `module`.
///
/// # Errors
///
/// Returns [`RenderError::MissingPlaceholder`] when a template key has no value.
pub fn render_with_config(
    diagram: &SequenceDiagram,
    placeholders: &BTreeMap<String, String>,
    config: &PumlRenderConfig,
) -> Result<String, RenderError> {
    let mut values = placeholders.clone();

    let sequence = render_sequence_with_config(diagram, config);
    debug!(
        "Rendered sequence: statements={}, lines={}",
        diagram.statements().len(),
        sequence.len()
    );
    values.insert(SEQUENCE_KEY.to_string(), sequence.join("\n"));

    if config.declare_entities {
        let declarations: Vec<String> = diagram.entities().iter().map(entity_line).collect();
        values.insert(ENTITIES_KEY.to_string(), declarations.join("\n"));
    } else {
        values.entry(ENTITIES_KEY.to_string()).or_default();
    }

    substitute(SEQUENCE_TEMPLATE, &values)
}

/// Sequence lines for every top-level statement, in order.
#[must_use]
pub fn render_sequence(diagram: &SequenceDiagram) -> Vec<String> {
    render_sequence_with_config(diagram, &PumlRenderConfig::default())
}

fn render_sequence_with_config(diagram: &SequenceDiagram, config: &PumlRenderConfig) -> Vec<String> {
    let mut lines = Vec::new();
    for statement in diagram.statements() {
        render_statement(statement, config, &mut lines);
    }
    lines
}

/// Append the lines for one statement and everything nested in it.
pub fn render_statement(statement: &Statement, config: &PumlRenderConfig, lines: &mut Vec<String>) {
    match statement {
        Statement::Invoke(invoke) => render_invoke(invoke, config, lines),
        Statement::Loop(lp) => render_loop(lp, config, lines),
        Statement::If(conditional) => render_conditional(conditional, config, lines),
        Statement::Empty => {}
    }
}

fn render_invoke(invoke: &Invoke, config: &PumlRenderConfig, lines: &mut Vec<String>) {
    let arrow = match invoke.color {
        Some(color) if config.color_arrows => format!("-[#{}]>", color.to_hex()),
        _ => "->".to_string(),
    };
    let params: Vec<String> = invoke.params.iter().map(|param| single_line(param)).collect();
    lines.push(format!(
        "{} {arrow} {} : {} {}",
        single_line(&invoke.caller),
        single_line(&invoke.receiver),
        single_line(&invoke.method),
        params.join(" ")
    ));
    render_body(&invoke.body, config, lines);
}

fn render_loop(lp: &Loop, config: &PumlRenderConfig, lines: &mut Vec<String>) {
    lines.push(format!(
        "loop {} {}",
        single_line(&lp.kind),
        single_line(&lp.condition)
    ));
    render_body(&lp.body, config, lines);
    lines.push("end".to_string());
}

fn render_conditional(conditional: &Conditional, config: &PumlRenderConfig, lines: &mut Vec<String>) {
    lines.push(format!("group IF {}", single_line(&conditional.condition)));
    render_body(&conditional.then_body, config, lines);
    lines.push("end".to_string());
}

fn render_body(body: &[Statement], config: &PumlRenderConfig, lines: &mut Vec<String>) {
    for statement in body {
        render_statement(statement, config, lines);
    }
}

fn entity_line(entity: &Entity) -> String {
    let mut line = format!(
        "{} \"{}\"",
        entity.kind.as_str(),
        single_line(&entity.name).replace('"', "'")
    );
    if let Some(color) = entity.color {
        line.push_str(" #");
        line.push_str(&color.to_hex());
    }
    line
}

/// Line breaks inside a value would split a sequence line in two.
fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
