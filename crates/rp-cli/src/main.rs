#![forbid(unsafe_code)]

//! rpg2puml - turn parsed RPG programs into PlantUML sequence diagrams.
//!
//! # Commands
//!
//! - `render`: Convert an RPG AST dump into a `.puml` file
//! - `model`: Output the diagram model as JSON for tooling/debugging

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rp_cli::{
    ConfigOverrides, Model, ModelToModel, Pipeline, Rpg2PumlConfig, SourceToModel, convert,
    error_report,
};
use tracing::{debug, info};

/// rpg2puml - turn parsed RPG programs into PlantUML sequence diagrams.
#[derive(Debug, Parser)]
#[command(
    name = "rpg2puml",
    version,
    about = "Turn parsed RPG programs into PlantUML sequence diagrams",
    long_about = "Reads the JSON AST dump of an RPG member and writes a PlantUML\n\
        sequence diagram of its subroutine calls, conditions, loops and record I/O."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert an AST dump into a PlantUML sequence diagram.
    Render {
        /// AST dump produced by the RPG parser.
        #[arg(short, long)]
        input: PathBuf,

        /// Existing file to overwrite, or directory for `<input>.puml`.
        #[arg(short, long)]
        output: PathBuf,

        /// Settings file (TOML).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Declare every participant, with database colors.
        #[arg(long)]
        declare_entities: bool,

        /// Draw record I/O arrows in the file's color.
        #[arg(long)]
        color_arrows: bool,

        /// Stop expanding nested subroutine calls past this depth.
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Output the diagram model as JSON.
    Model {
        /// AST dump produced by the RPG parser.
        #[arg(short, long)]
        input: PathBuf,

        /// Stop expanding nested subroutine calls past this depth.
        #[arg(long)]
        max_depth: Option<usize>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    if let Err(error) = run(cli.command) {
        eprintln!("{}", error_report(&error));
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Render {
            input,
            output,
            config,
            declare_entities,
            color_arrows,
            max_depth,
        } => {
            let overrides = ConfigOverrides {
                declare_entities,
                color_arrows,
                max_call_depth: max_depth,
            };
            cmd_render(&input, &output, config.as_deref(), overrides)
        }

        Command::Model {
            input,
            max_depth,
            pretty,
        } => cmd_model(&input, max_depth, pretty),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}

// =============================================================================
// Command: render
// =============================================================================

fn cmd_render(
    input: &Path,
    output: &Path,
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<()> {
    let start = Instant::now();
    let config = Rpg2PumlConfig::load(config_path)?.with_overrides(overrides);
    debug!("Effective configuration: {config:?}");

    let model = convert(input, output, &config)?;
    if let Model::Diagram(diagram) = &model {
        info!(
            "Converted {}: {} nodes, {} participants in {:.2}ms",
            input.display(),
            diagram.node_count(),
            diagram.entities().len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
    }
    Ok(())
}

// =============================================================================
// Command: model
// =============================================================================

fn cmd_model(input: &Path, max_depth: Option<usize>, pretty: bool) -> Result<()> {
    let config = Rpg2PumlConfig::load(None)?.with_overrides(ConfigOverrides {
        max_call_depth: max_depth,
        ..ConfigOverrides::default()
    });

    let model = Pipeline::new()
        .stage(SourceToModel::new(input))
        .stage(
            ModelToModel::new(input, config.max_call_depth)
                .with_client(config.client.as_str()),
        )
        .run()?;

    let value = model_json(&model)?;
    let output = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{output}");
    Ok(())
}

fn model_json(model: &Model) -> Result<serde_json::Value> {
    let value = match model {
        Model::Diagram(diagram) => serde_json::to_value(diagram)?,
        Model::Source(document) => serde_json::to_value(document)?,
        Model::Empty => serde_json::Value::Null,
    };
    Ok(value)
}
