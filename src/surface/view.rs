//! View models rendered by surfaces

use serde::{Deserialize, Serialize};

use crate::cache::PersistedCache;
use crate::gcloud::{Configuration, Project};

/// The two independent places a dashboard can live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceSlot {
    /// Detachable panel
    Panel,
    /// Docked view
    Dock,
}

impl std::fmt::Display for SurfaceSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceSlot::Panel => write!(f, "panel"),
            SurfaceSlot::Dock => write!(f, "dock"),
        }
    }
}

/// Loading state messages posted to every live surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SurfaceMessage {
    StartLoading,
    StopLoading,
}

/// Dashboard snapshot taken from the cache; all surfaces render the same one
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardView {
    pub configurations: Vec<Configuration>,
    pub active: Option<String>,
    pub cached_credentials: Vec<String>,
}

impl DashboardView {
    pub fn from_cache(cache: &PersistedCache) -> Self {
        Self {
            configurations: cache.configurations().to_vec(),
            active: cache.active_configuration().map(|c| c.name.clone()),
            cached_credentials: cache.cached_credential_names(),
        }
    }

    pub fn has_cached_credential(&self, name: &str) -> bool {
        self.cached_credentials.iter().any(|n| n == name)
    }

    /// Keep only configurations matching `filter` (name, account or project)
    pub fn filtered(mut self, filter: Option<&str>) -> Self {
        if let Some(filter) = filter {
            self.configurations.retain(|c| c.matches_filter(filter));
        }
        self
    }
}

/// Data backing the create/edit configuration form
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigFormModel {
    /// Configuration being edited; `None` for a new one
    pub configuration: Option<Configuration>,
    pub configurations: Vec<Configuration>,
    pub projects: Vec<Project>,
}
