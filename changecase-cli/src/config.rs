// ABOUTME: Runtime settings assembled once at startup from the environment
// ABOUTME: Passed by value into command handlers; no hidden global flag state

use changecase_sdk::constants::{env as env_names, record_types};

/// Org-specific identifiers and defaults that are configuration, not flags.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Record type stamped onto created change cases
    pub change_record_type_id: String,
    /// Record type a template case must carry
    pub template_record_type_id: String,
    /// Configuration item path attached to the generated implementation step
    pub configuration_item: Option<String>,
    /// Change type id that is pre-approved regardless of case status
    pub standard_change_type: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            change_record_type_id: record_types::CHANGE.to_string(),
            template_record_type_id: record_types::CHANGE_TEMPLATE.to_string(),
            configuration_item: None,
            standard_change_type: None,
        }
    }
}

impl Settings {
    /// Environment overrides win over the built-in record type defaults.
    pub fn from_env() -> Self {
        let defaults = Settings::default();
        Settings {
            change_record_type_id: env_value("CHANGE_RECORD_TYPE_ID")
                .unwrap_or(defaults.change_record_type_id),
            template_record_type_id: env_value("CHANGE_TEMPLATE_RECORD_TYPE_ID")
                .unwrap_or(defaults.template_record_type_id),
            configuration_item: env_value("CONFIGURATION_ITEM"),
            standard_change_type: env_value("STANDARD_CHANGE_TYPE"),
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(env_names::full_name(name))
        .ok()
        .filter(|value| !value.is_empty())
}
