//! Inbound UI messages

use serde::{Deserialize, Serialize};

/// Create/edit form fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigForm {
    pub config_name: String,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    /// Switch to the new configuration after `create_config`
    #[serde(default = "default_activate")]
    pub activate_config: bool,
}

fn default_activate() -> bool {
    true
}

impl ConfigForm {
    pub fn new(config_name: &str, account: Option<&str>, project: Option<&str>) -> Self {
        Self {
            config_name: config_name.to_string(),
            account: account.map(String::from),
            project: project.map(String::from),
            activate_config: true,
        }
    }
}

/// One message from a surface, e.g. `{"command": "switch_config", "configIndex": 1}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum UiMessage {
    SwitchConfig {
        #[serde(rename = "configIndex", alias = "gcpConfigIndex")]
        config_index: usize,
    },
    EditConfig {
        #[serde(rename = "configIndex", alias = "gcpConfigIndex")]
        config_index: usize,
    },
    DeleteConfig {
        #[serde(rename = "configIndex", alias = "gcpConfigIndex")]
        config_index: usize,
    },
    OpenAdcFile,
    OpenAddConfigPanel,
    CreateConfig(ConfigForm),
    /// Edit a configuration. It is always switched to afterwards, so the
    /// form's `activateConfig` is ignored.
    UpdateConfig {
        #[serde(rename = "configIndex", alias = "gcpConfigIndex")]
        config_index: usize,
        #[serde(flatten)]
        form: ConfigForm,
    },
    ClearAdcCache {
        #[serde(rename = "configIndex", alias = "gcpConfigIndex")]
        config_index: usize,
    },
}

impl UiMessage {
    pub fn command(&self) -> &'static str {
        match self {
            UiMessage::SwitchConfig { .. } => "switch_config",
            UiMessage::EditConfig { .. } => "edit_config",
            UiMessage::DeleteConfig { .. } => "delete_config",
            UiMessage::OpenAdcFile => "open_adc_file",
            UiMessage::OpenAddConfigPanel => "open_add_config_panel",
            UiMessage::CreateConfig(_) => "create_config",
            UiMessage::UpdateConfig { .. } => "update_config",
            UiMessage::ClearAdcCache { .. } => "clear_adc_cache",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_switch_config_message() {
        let msg: UiMessage =
            serde_json::from_value(json!({"command": "switch_config", "configIndex": 1})).unwrap();
        assert_eq!(msg, UiMessage::SwitchConfig { config_index: 1 });
        assert_eq!(msg.command(), "switch_config");
    }

    #[test]
    fn test_legacy_index_field() {
        let msg: UiMessage =
            serde_json::from_value(json!({"command": "delete_config", "gcpConfigIndex": 0})).unwrap();
        assert_eq!(msg, UiMessage::DeleteConfig { config_index: 0 });
    }

    #[test]
    fn test_unit_messages() {
        let msg: UiMessage = serde_json::from_value(json!({"command": "open_adc_file"})).unwrap();
        assert_eq!(msg, UiMessage::OpenAdcFile);
        let msg: UiMessage =
            serde_json::from_value(json!({"command": "open_add_config_panel"})).unwrap();
        assert_eq!(msg, UiMessage::OpenAddConfigPanel);
    }

    #[test]
    fn test_create_config_defaults_to_activate() {
        let msg: UiMessage = serde_json::from_value(json!({
            "command": "create_config",
            "configName": "staging",
            "account": "a@x.com",
            "project": "p3"
        }))
        .unwrap();
        match msg {
            UiMessage::CreateConfig(form) => {
                assert_eq!(form.config_name, "staging");
                assert_eq!(form.project.as_deref(), Some("p3"));
                assert!(form.activate_config);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_update_config_message() {
        let msg: UiMessage = serde_json::from_value(json!({
            "command": "update_config",
            "configIndex": 2,
            "configName": "office",
            "account": "a@x.com",
            "project": "p1",
            "activateConfig": false
        }))
        .unwrap();
        match msg {
            UiMessage::UpdateConfig { config_index, form } => {
                assert_eq!(config_index, 2);
                assert_eq!(form.config_name, "office");
                assert!(!form.activate_config);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(serde_json::from_value::<UiMessage>(json!({"command": "format_disk"})).is_err());
    }
}
