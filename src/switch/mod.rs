//! Configuration switching
//!
//! [`Orchestrator`] sequences gcloud calls, cache updates and surface
//! refreshes for every user action; `commands` maps terminal subcommands
//! onto it and `messages` defines what surfaces send in.

mod commands;
mod messages;
mod orchestrator;

pub use commands::{
    run_activity_command, run_adc_command, run_clear_cache_command, run_command,
    run_create_command, run_current_command, run_delete_command, run_list_command,
    run_projects_command, run_switch_command, run_update_command,
};
pub use messages::{ConfigForm, UiMessage};
pub use orchestrator::{
    ConfigRef, CredentialSource, DeleteOutcome, Orchestrator, SwitchOutcome, SwitchState,
    SwitchTarget,
};
