//! UI utilities
//!
//! This module provides the host abstraction used for notifications and
//! confirmation prompts.

mod host;

pub use host::{Host, JsonHost, TerminalHost};

#[cfg(test)]
pub(crate) use host::recording::{Notice, RecordingHost};
