//! Staged conversion: AST dump → diagram model → PlantUML file.
//!
//! Each stage takes the previous stage's [`Model`] and rejects kinds it
//! cannot handle. Stages run strictly in order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rp_core::{ModelError, SequenceDiagram};
use rp_render_puml::{CLIENT_KEY, ENTITIES_KEY, MODULE_KEY, PumlRenderConfig, render_with_config};
use rp_source::{SourceDocument, load_document};
use rp_transform::{CLIENT_PARTICIPANT, TransformOptions, transform_traced};
use tracing::{debug, warn};

use crate::sink::write_text;

/// Value handed from one stage to the next.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Model {
    #[default]
    Empty,
    Source(SourceDocument),
    Diagram(SequenceDiagram),
}

impl Model {
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Empty => "Empty",
            Self::Source(_) => "SourceDocument",
            Self::Diagram(_) => "SequenceDiagram",
        }
    }
}

pub trait ModelTransformer {
    /// Short stage name for logs.
    fn name(&self) -> &'static str;

    /// # Errors
    ///
    /// Fails when the model has the wrong kind or the stage's I/O fails.
    fn transform(&self, model: Model) -> Result<Model>;
}

#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn ModelTransformer>>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stage(mut self, stage: impl ModelTransformer + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Run every stage, starting from [`Model::Empty`].
    ///
    /// # Errors
    ///
    /// Stops at the first failing stage.
    pub fn run(&self) -> Result<Model> {
        let mut model = Model::Empty;
        for stage in &self.stages {
            debug!("Running stage {} on {}", stage.name(), model.kind_name());
            model = stage
                .transform(model)
                .with_context(|| format!("Stage {} failed", stage.name()))?;
        }
        Ok(model)
    }
}

/// File name of `path`, or the whole path when it has none.
fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Loads the parser's AST dump.
pub struct SourceToModel {
    input: PathBuf,
}

impl SourceToModel {
    #[must_use]
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

impl ModelTransformer for SourceToModel {
    fn name(&self) -> &'static str {
        "source-to-model"
    }

    fn transform(&self, _model: Model) -> Result<Model> {
        if !self.input.is_file() {
            bail!("Invalid input file '{}'", self.input.display());
        }
        let text = std::fs::read_to_string(&self.input)
            .with_context(|| format!("Failed to read file: {}", self.input.display()))?;
        let document = load_document(&text)
            .with_context(|| format!("Invalid input file '{}'", self.input.display()))?;
        Ok(Model::Source(document))
    }
}

/// Builds the diagram model from the AST.
pub struct ModelToModel {
    input: PathBuf,
    client: String,
    max_call_depth: usize,
}

impl ModelToModel {
    #[must_use]
    pub fn new(input: impl Into<PathBuf>, max_call_depth: usize) -> Self {
        Self {
            input: input.into(),
            client: CLIENT_PARTICIPANT.to_string(),
            max_call_depth,
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = client.into();
        self
    }

    /// Participant name for the program. Always the input file name, so it
    /// matches the `module` label of a directory output.
    #[must_use]
    pub fn source_name(&self) -> String {
        file_name(&self.input)
    }
}

impl ModelTransformer for ModelToModel {
    fn name(&self) -> &'static str {
        "model-to-model"
    }

    fn transform(&self, model: Model) -> Result<Model> {
        let Model::Source(document) = model else {
            return Err(ModelError::unsupported("SourceDocument", model.kind_name()).into());
        };
        if let Some(member) = &document.source_file {
            debug!("AST parsed from member {member}");
        }
        let options = TransformOptions::new(self.source_name())
            .with_client(self.client.as_str())
            .with_max_call_depth(self.max_call_depth);
        let outcome = transform_traced(&document.root, &options)?;
        for warning in &outcome.warnings {
            warn!("Transform warning: {warning}");
        }
        Ok(Model::Diagram(outcome.diagram))
    }
}

/// Where the generated text goes and the label it gets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub path: PathBuf,
    pub module: String,
}

impl OutputTarget {
    /// An existing file is overwritten and names the module; anything else
    /// is a directory that receives `<input file name>.puml`.
    #[must_use]
    pub fn resolve(input: &Path, output: &Path) -> Self {
        if output.is_file() {
            Self {
                path: output.to_path_buf(),
                module: file_name(output),
            }
        } else {
            let input_name = file_name(input);
            Self {
                path: output.join(format!("{input_name}.puml")),
                module: input_name,
            }
        }
    }
}

/// Generates PlantUML and writes it out.
pub struct ModelToSource {
    input: PathBuf,
    output: PathBuf,
    client: String,
    render_config: PumlRenderConfig,
}

impl ModelToSource {
    #[must_use]
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        client: impl Into<String>,
        render_config: PumlRenderConfig,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            client: client.into(),
            render_config,
        }
    }
}

impl ModelTransformer for ModelToSource {
    fn name(&self) -> &'static str {
        "model-to-source"
    }

    fn transform(&self, model: Model) -> Result<Model> {
        let Model::Diagram(diagram) = &model else {
            return Err(ModelError::unsupported("SequenceDiagram", model.kind_name()).into());
        };
        let target = OutputTarget::resolve(&self.input, &self.output);

        let mut values = BTreeMap::new();
        values.insert(CLIENT_KEY.to_string(), self.client.clone());
        values.insert(MODULE_KEY.to_string(), target.module.clone());
        values.insert(ENTITIES_KEY.to_string(), String::new());

        let text = render_with_config(diagram, &values, &self.render_config)?;
        write_text(&target.path, &text)?;
        Ok(model)
    }
}
