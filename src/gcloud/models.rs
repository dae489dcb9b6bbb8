//! gcloud data models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named gcloud configuration, as listed by `gcloud config configurations list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub properties: ConfigProperties,
}

/// Configuration properties; sections other than `core` are carried through
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigProperties {
    #[serde(default)]
    pub core: CoreProperties,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// The `core` property section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Configuration {
    pub fn new(name: &str, is_active: bool) -> Self {
        Self {
            name: name.to_string(),
            is_active,
            properties: ConfigProperties::default(),
        }
    }

    pub fn with_core(mut self, account: Option<&str>, project: Option<&str>) -> Self {
        self.properties.core.account = account.map(String::from);
        self.properties.core.project = project.map(String::from);
        self
    }

    pub fn account(&self) -> Option<&str> {
        self.properties.core.account.as_deref()
    }

    pub fn project(&self) -> Option<&str> {
        self.properties.core.project.as_deref()
    }

    /// Case-insensitive substring match on name, account or project
    pub fn matches_filter(&self, filter: &str) -> bool {
        let needle = filter.to_lowercase();
        [Some(self.name.as_str()), self.account(), self.project()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// A project visible to the active account, as listed by `gcloud projects list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ProjectParent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_number: Option<String>,
}

/// Organization or folder owning a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectParent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Application default credential, passed through verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialBlob(Value);

impl CredentialBlob {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Credential `type` field, e.g. `authorized_user`
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }
}
