//! Persisted cache data models

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::gcloud::{Configuration, CredentialBlob, Project};

/// The whole cache, stored as one unit.
///
/// Every field is required so that a record written by an incompatible
/// version fails to deserialize and is discarded instead of half-adopted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub configurations: Vec<Configuration>,
    pub credentials_by_config_name: BTreeMap<String, CredentialBlob>,
    pub projects: Vec<Project>,
    pub activity_log: Vec<Activity>,
}

/// One diagnostic activity log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub action: String,
    /// RFC 3339 UTC timestamp
    pub date: String,
}

impl Activity {
    pub fn now(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            date: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}
