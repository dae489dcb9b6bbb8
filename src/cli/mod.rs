//! CLI argument parsing

mod args;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{cache, credentials, defaults, gcloud};

pub use args::{
    ActivityArgs, AdcArgs, CreateArgs, DeleteArgs, ListArgs, NameArgs, ProjectsArgs, ServeArgs,
    UpdateArgs,
};

/// gcloud configuration switcher
#[derive(Parser, Debug)]
#[command(name = "gcpswitch")]
#[command(version)]
#[command(
    about = "Switch gcloud configurations together with their application default credentials",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// gcloud executable to run
    #[arg(long, global = true, env = gcloud::BIN_ENV_VAR, default_value = gcloud::DEFAULT_BIN)]
    pub gcloud_bin: PathBuf,

    /// State file holding the cache [default: ~/.gcpswitch/state.json]
    #[arg(long, global = true, env = cache::FILE_ENV_VAR)]
    pub state_file: Option<PathBuf>,

    /// Application default credential file
    /// [default: ~/.config/gcloud/application_default_credentials.json]
    #[arg(long, global = true, env = credentials::FILE_ENV_VAR)]
    pub credential_file: Option<PathBuf>,

    /// Seconds to wait for the browser login before giving up
    #[arg(long, global = true, default_value_t = gcloud::LOGIN_TIMEOUT_SECS)]
    pub login_timeout: u64,

    /// Seconds to wait for any other gcloud invocation
    #[arg(long, global = true, default_value_t = gcloud::COMMAND_TIMEOUT_SECS)]
    pub command_timeout: u64,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, global = true, default_value = defaults::LOG_LEVEL)]
    pub log_level: String,

    /// Only print errors and requested data
    #[arg(short, long, global = true, default_value_t = false)]
    pub quiet: bool,

    /// Non-interactive: no spinner, confirmations are declined unless --yes
    #[arg(short, long, global = true, default_value_t = false)]
    pub batch: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List configurations with their cached credential state
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Print the active configuration
    Current,

    /// Activate a configuration and restore its credentials
    #[command(visible_alias = "use")]
    Switch(NameArgs),

    /// Create a configuration
    Create(CreateArgs),

    /// Rename a configuration and/or change its account and project
    #[command(visible_alias = "edit")]
    Update(UpdateArgs),

    /// Delete a configuration
    #[command(visible_alias = "rm")]
    Delete(DeleteArgs),

    /// Forget the cached credentials of a configuration
    ClearCache(NameArgs),

    /// List projects visible to the active account
    #[command(visible_alias = "prj")]
    Projects(ProjectsArgs),

    /// Show recent actions
    Activity(ActivityArgs),

    /// Show the application default credential file
    Adc(AdcArgs),

    /// Read UI messages as JSON lines on stdin, write events to stdout
    Serve(ServeArgs),
}

impl Command {
    /// Commands that may switch configurations show the status line
    pub fn shows_status(&self) -> bool {
        matches!(
            self,
            Command::Switch(_)
                | Command::Create(_)
                | Command::Update(_)
                | Command::ClearCache(_)
        )
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table (default)
    Table,
    /// Comma-separated values
    Csv,
    /// JSON array
    Json,
    /// YAML
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}
