//! Per-command arguments

use clap::Parser;

use super::OutputFormat;

/// Arguments for 'list'
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only configurations whose name, account or project contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Ask gcloud instead of showing the cached list
    #[arg(short, long, default_value_t = false)]
    pub refresh: bool,
}

/// A single configuration name
#[derive(Parser, Debug)]
pub struct NameArgs {
    /// Configuration name
    pub name: String,
}

/// Arguments for 'create'
#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Name of the new configuration
    pub name: String,

    /// Account (core/account) to set
    #[arg(long)]
    pub account: Option<String>,

    /// Project (core/project) to set
    #[arg(long)]
    pub project: Option<String>,

    /// Create only; do not switch to it or log in
    #[arg(long, default_value_t = false)]
    pub no_activate_switch: bool,
}

/// Arguments for 'update'
#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// Configuration to change
    pub name: String,

    /// Rename the configuration
    #[arg(long)]
    pub new_name: Option<String>,

    /// Account (core/account) to set
    #[arg(long)]
    pub account: Option<String>,

    /// Project (core/project) to set
    #[arg(long)]
    pub project: Option<String>,
}

/// Arguments for 'delete'
#[derive(Parser, Debug)]
pub struct DeleteArgs {
    /// Configuration to delete
    pub name: String,

    /// Skip confirmation prompt
    #[arg(short = 'y', long, default_value_t = false)]
    pub yes: bool,
}

/// Arguments for 'projects'
#[derive(Parser, Debug)]
pub struct ProjectsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Ask gcloud instead of showing the cached list
    #[arg(short, long, default_value_t = false)]
    pub refresh: bool,
}

/// Arguments for 'activity'
#[derive(Parser, Debug)]
pub struct ActivityArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Show at most this many entries, newest last
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Arguments for 'adc'
#[derive(Parser, Debug)]
pub struct AdcArgs {
    /// Print the file contents instead of its path
    #[arg(long, default_value_t = false)]
    pub show: bool,
}

/// Arguments for 'serve'
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Answer yes to delete confirmations
    #[arg(short = 'y', long, default_value_t = false)]
    pub yes: bool,

    /// Also keep a dashboard table up to date on stderr
    #[arg(long, default_value_t = false)]
    pub dock: bool,
}
