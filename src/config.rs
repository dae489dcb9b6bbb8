/// Configuration constants for the wrapped gcloud CLI
pub mod gcloud {
    /// Default executable name, resolved through PATH
    pub const DEFAULT_BIN: &str = "gcloud";

    /// Environment variable overriding the executable
    pub const BIN_ENV_VAR: &str = "GCPSWITCH_GCLOUD_BIN";

    /// Confirmation line written to stderr by `gcloud config set account`
    pub const ACCOUNT_UPDATED: &str = "Updated property [core/account]";

    /// Confirmation line written to stderr by `gcloud config set project`
    pub const PROJECT_UPDATED: &str = "Updated property [core/project]";

    /// Upper bound for the browser-based login flow
    pub const LOGIN_TIMEOUT_SECS: u64 = 60;

    /// Upper bound for every other gcloud invocation
    pub const COMMAND_TIMEOUT_SECS: u64 = 30;
}

/// Configuration constants for the application default credential file
pub mod credentials {
    /// Credential file path relative to HOME
    pub const FILE_PATH: &str = ".config/gcloud/application_default_credentials.json";

    /// Environment variable overriding the credential file location
    pub const FILE_ENV_VAR: &str = "GCPSWITCH_CREDENTIAL_FILE";
}

/// Configuration constants for the persisted cache
pub mod cache {
    /// Application name used to namespace the cache key
    pub const APP_NAME: &str = "gcp-switch-config";

    /// Versioned key under which the whole cache record is stored
    pub const KEY: &str = "gcp-switch-config_cache_v1";

    /// State directory name (relative to HOME)
    pub const DIR_NAME: &str = ".gcpswitch";

    /// State file name
    pub const FILE_NAME: &str = "state.json";

    /// Environment variable overriding the state file location
    pub const FILE_ENV_VAR: &str = "GCPSWITCH_STATE_FILE";
}

/// Default values for CLI
pub mod defaults {
    /// Default log level
    pub const LOG_LEVEL: &str = "warn";

    /// Status text shown when gcloud reports no active configuration
    pub const NO_ACTIVE_CONFIG: &str = "No gcp active config";

    /// Maximum configuration name length shown in the status line
    pub const STATUS_NAME_MAX: usize = 25;
}

/// User-facing notification texts
pub mod messages {
    pub fn config_switched(name: &str) -> String {
        format!("GCP config switched successfully to [{}]", name)
    }

    pub fn already_active(name: &str) -> String {
        format!("[{}] is already the active configuration", name)
    }

    pub const DELETE_DETAIL: &str = "This action is irreversible !";

    pub fn config_delete_confirm(name: &str) -> String {
        format!("Are you sure you want to delete [{}] ?", name)
    }

    pub fn config_deleted(name: &str) -> String {
        format!("Successfully deleted configuration: [{}]", name)
    }

    pub fn config_delete_rejected(name: &str) -> String {
        format!(
            "Can not delete [{}] because is set as active. Switch to another configuration and retry",
            name
        )
    }

    pub fn config_created(name: &str) -> String {
        format!("Created configuration [{}]", name)
    }

    pub fn credential_cache_cleared(name: &str) -> String {
        format!("Cleared cached credentials for [{}]", name)
    }

    pub fn form_submit_failed(error: &dyn std::fmt::Display) -> String {
        format!("Error on submit form: {}", error)
    }

    pub fn credential_replay_skipped(path: &std::path::Path) -> String {
        format!(
            "Cached credentials were not restored: {} does not exist. \
             Run 'gcloud auth application-default login' once to create it.",
            path.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_versioned() {
        assert!(cache::KEY.starts_with(cache::APP_NAME));
        assert!(cache::KEY.ends_with("_v1"));
    }

    #[test]
    fn test_credentials_path_is_relative() {
        assert!(!credentials::FILE_PATH.starts_with('/'));
        assert!(credentials::FILE_PATH.ends_with("application_default_credentials.json"));
    }

    #[test]
    fn test_login_timeout_bounded() {
        assert_eq!(gcloud::LOGIN_TIMEOUT_SECS, 60);
        assert!(gcloud::COMMAND_TIMEOUT_SECS > 0);
    }

    #[test]
    fn test_messages_name_the_config() {
        assert_eq!(
            messages::config_switched("work"),
            "GCP config switched successfully to [work]"
        );
        assert!(messages::config_delete_rejected("work").contains("[work]"));
        assert!(messages::form_submit_failed(&"boom").ends_with("boom"));
    }
}
