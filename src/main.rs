use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use concept_map::mapping::{MappingError, MappingRequest};
use concept_map::model::Confidence;
use concept_map::{Config, StateError};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Map programming concepts to code implementations", long_about = None)]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// State file to use instead of the configured one
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new concept map state file
    Init {
        /// Name of the project being audited
        project_name: String,

        /// Overwrite an existing state file (it is backed up first)
        #[arg(long)]
        force: bool,
    },

    /// Load concept definitions from a JSON taxonomy file
    LoadConcepts {
        /// Path to the concepts taxonomy JSON file
        concepts_file: PathBuf,
    },

    /// Map a concept to a code implementation
    Add {
        /// The concept name to map
        concept: String,

        /// Path to the file containing the implementation
        #[arg(long)]
        file: String,

        /// Name of class/function (preferred over lines)
        #[arg(long)]
        identifier: Option<String>,

        /// Fallback line range (e.g. '10-20')
        #[arg(long)]
        lines: Option<String>,

        /// How sure the mapping is (high, medium, low)
        #[arg(long, default_value = "high")]
        confidence: Confidence,

        /// Type of implementation (e.g. 'class_definition')
        #[arg(long = "type")]
        pattern_type: String,

        /// Specific reason for the mapping
        #[arg(long)]
        evidence: String,
    },

    /// Show a summary of the current concept map
    Status {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    concept_map::logging::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_fatal(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to resolve current directory")?,
    };

    let mut config = Config::load(&root)?;
    if let Some(state) = cli.state {
        config = config.with_state_file(state);
    }

    match cli.command {
        Commands::Init {
            project_name,
            force,
        } => {
            commands::init::execute(&config, &project_name, force)?;
        }
        Commands::LoadConcepts { concepts_file } => {
            commands::load_concepts::execute(&config, &concepts_file)?;
        }
        Commands::Add {
            concept,
            file,
            identifier,
            lines,
            confidence,
            pattern_type,
            evidence,
        } => {
            commands::add::execute(
                &config,
                MappingRequest {
                    concept,
                    file_path: file,
                    identifier,
                    lines,
                    confidence,
                    pattern_type,
                    evidence,
                },
            )?;
        }
        Commands::Status { json } => {
            commands::status::execute(&config, json)?;
        }
    }

    Ok(())
}

fn report_fatal(err: &anyhow::Error) {
    let state_error = match err.downcast_ref::<MappingError>() {
        Some(MappingError::State(e)) => Some(e),
        _ => err.downcast_ref::<StateError>(),
    };

    let Some(e) = state_error else {
        eprintln!("❌ {:#}", err);
        return;
    };

    if let StateError::Corrupt { message, .. } = e {
        eprintln!("❌ {}", e);
        eprintln!("   Error: {}", message);
    } else {
        eprintln!("❌ Failed to load state: {}", e);
    }
    eprintln!("   Inspect the backups in .mapper_backups/ next to the state file.");
}
