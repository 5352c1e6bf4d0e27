//! `rpg2puml.toml` settings.

use std::path::Path;

use anyhow::{Context, Result};
use rp_render_puml::PumlRenderConfig;
use rp_transform::DEFAULT_MAX_CALL_DEPTH;
use serde::{Deserialize, Serialize};

/// Settings file contents. Every key is optional.
///
/// ```toml
/// client = "operator"
/// declare_entities = true
/// color_arrows = false
/// max_call_depth = 32
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Rpg2PumlConfig {
    /// Label of the participant that starts the program.
    pub client: String,
    pub declare_entities: bool,
    pub color_arrows: bool,
    pub max_call_depth: usize,
}

impl Default for Rpg2PumlConfig {
    fn default() -> Self {
        Self {
            client: "client".to_string(),
            declare_entities: false,
            color_arrows: false,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// Command-line flags that take precedence over the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub declare_entities: bool,
    pub color_arrows: bool,
    pub max_call_depth: Option<usize>,
}

impl Rpg2PumlConfig {
    /// Parse settings from TOML text.
    ///
    /// # Errors
    ///
    /// Fails on invalid TOML, unknown keys, or wrongly typed values.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid rpg2puml configuration")
    }

    /// Load settings from `path`, or defaults when no path is given.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("In config file: {}", path.display()))
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.declare_entities |= overrides.declare_entities;
        self.color_arrows |= overrides.color_arrows;
        if let Some(depth) = overrides.max_call_depth {
            self.max_call_depth = depth;
        }
        self
    }

    #[must_use]
    pub fn render_config(&self) -> PumlRenderConfig {
        PumlRenderConfig {
            declare_entities: self.declare_entities,
            color_arrows: self.color_arrows,
        }
    }
}
