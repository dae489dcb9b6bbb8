//! gcloud CLI gateway module
//!
//! Every interaction with the external `gcloud` binary goes through
//! [`Gateway`], which turns text output into typed results.

mod gateway;
mod models;
mod runner;

pub use gateway::Gateway;
pub use models::{ConfigProperties, Configuration, CoreProperties, CredentialBlob, Project, ProjectParent};
pub use runner::{CommandOutput, CommandRunner, ProcessRunner};

#[cfg(test)]
pub(crate) use runner::fake;
