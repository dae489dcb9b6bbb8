use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Error type for configuration switching
#[derive(Debug)]
pub enum SwitchError {
    /// gcloud exited non-zero (or could not be started)
    Process {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    /// gcloud exited zero but did not print the expected confirmation
    UnexpectedOutput { command: String, stderr: String },
    /// gcloud did not finish in time and was terminated
    Timeout { command: String, limit: Duration },
    /// Credential file read/write against a missing file
    FileNotFound(PathBuf),
    /// Durable store could not be read or written
    Persistence(String),
    /// JSON parsing error
    Json(String),
    /// Configuration error
    Config(String),
    /// Local I/O error
    Io(String),
    /// Another switch is still running
    SwitchInProgress,
    /// Status indicator used before `create`
    StatusNotInitialized,
    /// Refused to delete the active configuration
    ActiveConfigDelete(String),
    /// No configuration with that name or index
    ConfigNotFound(String),
}

impl fmt::Display for SwitchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchError::Process {
                command,
                code: Some(code),
                stderr,
            } => write!(f, "`{}` failed (exit code {}): {}", command, code, stderr),
            SwitchError::Process {
                command,
                code: None,
                stderr,
            } => write!(f, "`{}` failed: {}", command, stderr),
            SwitchError::UnexpectedOutput { command, stderr } if stderr.is_empty() => {
                write!(f, "`{}` finished without a confirmation message", command)
            }
            SwitchError::UnexpectedOutput { command, stderr } => {
                write!(f, "`{}` returned unexpected output: {}", command, stderr)
            }
            SwitchError::Timeout { command, limit } => write!(
                f,
                "`{}` did not finish within {:?} and was terminated",
                command, limit
            ),
            SwitchError::FileNotFound(path) => {
                write!(f, "File does not exist: {}", path.display())
            }
            SwitchError::Persistence(msg) => write!(f, "Failed to persist cache: {}", msg),
            SwitchError::Json(msg) => write!(f, "JSON error: {}", msg),
            SwitchError::Config(msg) => write!(f, "Configuration error: {}", msg),
            SwitchError::Io(msg) => write!(f, "I/O error: {}", msg),
            SwitchError::SwitchInProgress => write!(
                f,
                "Another configuration switch is still in progress. Wait for it to finish and retry"
            ),
            SwitchError::StatusNotInitialized => write!(
                f,
                "Status indicator has not been created. Call create first"
            ),
            SwitchError::ActiveConfigDelete(name) => write!(
                f,
                "{}",
                crate::config::messages::config_delete_rejected(name)
            ),
            SwitchError::ConfigNotFound(name) => {
                write!(f, "Configuration '{}' not found", name)
            }
        }
    }
}

impl std::error::Error for SwitchError {}

impl From<serde_json::Error> for SwitchError {
    fn from(err: serde_json::Error) -> Self {
        SwitchError::Json(err.to_string())
    }
}

impl From<std::io::Error> for SwitchError {
    fn from(err: std::io::Error) -> Self {
        SwitchError::Io(err.to_string())
    }
}

/// Result type alias for switching operations
pub type Result<T> = std::result::Result<T, SwitchError>;
