//! Application default credential file I/O

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info};

use crate::config::credentials;
use crate::error::{Result, SwitchError};
use crate::gcloud::CredentialBlob;

/// Result of writing a credential into the well-known file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The file did not exist; nothing was written
    Skipped,
}

/// Reads and overwrites the credential file consumed by Google client libraries
#[derive(Debug, Clone)]
pub struct CredentialFile {
    path: PathBuf,
}

impl Default for CredentialFile {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl CredentialFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `~/.config/gcloud/application_default_credentials.json`
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(credentials::FILE_PATH)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the credential. A missing file means "no data yet" and yields `None`.
    pub fn read(&self) -> Result<Option<CredentialBlob>> {
        if !self.exists() {
            info!("Credential file does not exist: {}", self.path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            SwitchError::Io(format!(
                "Failed to read credential file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let value = serde_json::from_str(&content).map_err(|e| {
            SwitchError::Json(format!(
                "Could not parse credential file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(Some(CredentialBlob::new(value)))
    }

    /// Overwrite the existing file with `blob` (pretty-printed, 2-space indent).
    /// Never creates the file: a missing file is logged and skipped.
    pub fn write(&self, blob: &CredentialBlob) -> Result<WriteOutcome> {
        if !self.exists() {
            error!("File does not exist: {}", self.path.display());
            return Ok(WriteOutcome::Skipped);
        }

        let json = serde_json::to_string_pretty(blob)?;
        fs::write(&self.path, json).map_err(|e| {
            SwitchError::Io(format!(
                "Failed to write credential file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!("Wrote cached credential to {}", self.path.display());
        Ok(WriteOutcome::Written)
    }
}
