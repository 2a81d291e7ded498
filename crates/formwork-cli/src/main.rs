//! Formwork CLI
//!
//! Command-line form builder over the formwork engine. The working form is
//! kept in a single file and saved after every change.
//!
//! # Usage
//!
//! ```bash
//! formwork new --title "Signup"
//! formwork add email
//! formwork condition add <field-id>
//! formwork preview --values answers.json
//! formwork share
//! ```

use clap::{Parser, Subcommand};
use formwork_core::{ConditionOperator, ConditionalAction, FieldType, FormsConfig, LogicType};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "formwork")]
#[command(author = "Formwork")]
#[command(version)]
#[command(about = "Formwork form builder", long_about = None)]
pub struct Cli {
    /// File holding the working form
    #[arg(long, env = "FORMWORK_STORAGE", global = true)]
    storage: Option<PathBuf>,

    /// Directory for exported files
    #[arg(long, env = "FORMWORK_EXPORT_DIR", global = true)]
    export_dir: Option<PathBuf>,

    /// Base URL for share links
    #[arg(long, env = "FORMWORK_SHARE_BASE_URL", global = true)]
    share_base_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Profile name from config file
    #[arg(long, short, env = "FORMWORK_PROFILE", global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a new empty form
    New {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Show the working form
    Show,
    /// Set the form title and/or description
    Meta {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Append a field of the given type
    Add { field_type: FieldType },
    /// Rename a field
    SetLabel { id: String, label: String },
    /// Set a field's placeholder
    SetPlaceholder { id: String, placeholder: String },
    /// Mark a field required (or optional with --off)
    Require {
        id: String,
        #[arg(long)]
        off: bool,
    },
    /// Set validation bounds, pattern and message
    Rule {
        id: String,
        #[arg(long, value_parser = finite_bound)]
        min: Option<f64>,
        #[arg(long, value_parser = finite_bound)]
        max: Option<f64>,
        #[arg(long)]
        pattern: Option<String>,
        #[arg(long)]
        message: Option<String>,
        /// Drop the existing rule first
        #[arg(long)]
        clear: bool,
    },
    /// Change a field's type
    Retype { id: String, field_type: FieldType },
    /// Remove a field and every condition pointing at it
    Remove { id: String },
    /// Duplicate a field
    Duplicate { id: String },
    /// Move a field into another field's position
    Move { id: String, target: String },
    /// Manage a field's options
    #[command(name = "option")]
    Options {
        #[command(subcommand)]
        action: OptionCommands,
    },
    /// Manage a field's conditions
    Condition {
        #[command(subcommand)]
        action: ConditionCommands,
    },
    /// Configure a field's conditional logic
    Logic {
        id: String,
        #[arg(long)]
        enabled: Option<bool>,
        #[arg(long)]
        action: Option<ConditionalAction>,
        #[arg(long)]
        logic_type: Option<LogicType>,
    },
    /// List field types
    Types,
    /// Field visibility and disabled state for a set of answers
    Preview {
        /// JSON object of field id to value
        #[arg(long)]
        values: Option<PathBuf>,
    },
    /// Validate a set of answers
    Validate {
        /// JSON object of field id to value
        #[arg(long)]
        values: PathBuf,
    },
    /// Save the working form now
    Save,
    /// Print a share link for the working form
    Share,
    /// Open a form from a share link
    Open { url: String },
    /// Export the working form as a JSON file
    Export,
    /// Import a form from an exported JSON file
    Import { file: PathBuf },
    /// Reset the working form and delete the saved copy
    Clear,
    /// Configure the CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum OptionCommands {
    /// Append an option
    Add { field: String },
    /// Relabel an option
    Set {
        field: String,
        option: String,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        value: Option<String>,
    },
    /// Remove an option (the last one is kept)
    Remove { field: String, option: String },
}

#[derive(Subcommand)]
pub enum ConditionCommands {
    /// Add a condition on the first other field
    Add { field: String },
    /// Change a condition
    Set {
        field: String,
        condition: String,
        #[arg(long)]
        target: Option<String>,
        #[arg(long)]
        operator: Option<ConditionOperator>,
        #[arg(long)]
        value: Option<String>,
    },
    /// Remove a condition
    Remove { field: String, condition: String },
    /// Operators usable against a target field
    Operators { target: String },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Set configuration value
    Set { key: String, value: String },
    /// List all configuration
    List,
    /// Initialize configuration
    Init,
}

/// Bounds are stored as JSON numbers, which cannot hold `inf` or `NaN`
fn finite_bound(text: &str) -> Result<f64, String> {
    let bound: f64 = text.parse().map_err(|e| format!("{}", e))?;
    if bound.is_finite() {
        Ok(bound)
    } else {
        Err(format!("{} is not a finite number", text))
    }
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Config file values with command-line overrides applied
fn effective_config(cli: &Cli) -> anyhow::Result<FormsConfig> {
    let mut config = FormsConfig::load(cli.profile.as_deref())?;
    if let Some(storage) = &cli.storage {
        config.storage_path = storage.clone();
    }
    if let Some(dir) = &cli.export_dir {
        config.export_dir = dir.clone();
    }
    if let Some(base) = &cli.share_base_url {
        config.share_base_url = base.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match effective_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&config.log_level);

    if let Err(e) = commands::run(cli, config).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
