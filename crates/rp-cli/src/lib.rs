#![forbid(unsafe_code)]

//! Driver pieces behind the `rpg2puml` binary: settings, pipeline stages
//! and the output sink.

pub mod config;
pub mod pipeline;
pub mod sink;

pub use config::{ConfigOverrides, Rpg2PumlConfig};
pub use pipeline::{
    Model, ModelToModel, ModelToSource, ModelTransformer, OutputTarget, Pipeline, SourceToModel,
};
pub use sink::write_text;

use std::path::Path;

use anyhow::Result;

/// The standard three-stage conversion of `input` into a PlantUML file
/// under `output`.
///
/// # Errors
///
/// Fails on unreadable input, a non compilation-unit AST, or a failed write.
pub fn convert(input: &Path, output: &Path, config: &Rpg2PumlConfig) -> Result<Model> {
    Pipeline::new()
        .stage(SourceToModel::new(input))
        .stage(
            ModelToModel::new(input, config.max_call_depth)
                .with_client(config.client.as_str()),
        )
        .stage(ModelToSource::new(
            input,
            output,
            config.client.clone(),
            config.render_config(),
        ))
        .run()
}

/// One-line failure message for the terminal: `error: ` followed by the
/// whole context chain.
#[must_use]
pub fn error_report(error: &anyhow::Error) -> String {
    format!("error: {error:#}")
}
