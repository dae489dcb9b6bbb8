//! gcpswitch - switch gcloud configurations with their credentials
//!
//! A gcloud configuration only carries account and project properties; the
//! application default credentials in
//! `~/.config/gcloud/application_default_credentials.json` belong to whoever
//! logged in last. gcpswitch remembers the credential captured for each
//! configuration and restores it on every switch, so only the first switch to
//! a configuration needs a browser login.
//!
//! # Features
//!
//! - List, create, rename, delete and switch configurations
//! - Per-configuration credential cache with replay on switch
//! - Multiple output formats (table, CSV, JSON, YAML)
//! - `serve` mode speaking newline-delimited JSON for editor front ends
//!
//! # Example
//!
//! ```bash
//! # Show configurations and which ones have cached credentials
//! gcpswitch list
//!
//! # Switch (logs in only if nothing is cached for "work")
//! gcpswitch switch work
//!
//! # New configuration, activated with account and project set
//! gcpswitch create staging --account me@example.com --project my-staging
//!
//! # Force a fresh login next time
//! gcpswitch clear-cache work
//! ```

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gcloud;
pub mod output;
pub mod serve;
pub mod status;
pub mod surface;
pub mod switch;
pub mod ui;

pub use app::{run, Settings};
pub use cli::{Cli, Command, OutputFormat};
pub use error::{Result, SwitchError};
pub use gcloud::{CommandRunner, Configuration, Gateway, ProcessRunner, Project};
pub use switch::{Orchestrator, SwitchOutcome, SwitchTarget, UiMessage};
