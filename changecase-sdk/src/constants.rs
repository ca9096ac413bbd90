// ABOUTME: Centralized constants for the change case SDK
// ABOUTME: Contains API paths, record type defaults, status vocabulary, and env var names

/// Salesforce REST API paths
pub mod urls {
    /// API version used for query and sobject endpoints
    pub const API_VERSION: &str = "v56.0";

    /// SOQL query endpoint
    pub const QUERY_PATH: &str = "/services/data/v56.0/query";

    /// Base path for sobject CRUD operations
    pub const SOBJECTS_PATH: &str = "/services/data/v56.0/sobjects";

    /// OAuth token exchange endpoint
    pub const OAUTH_TOKEN_PATH: &str = "/services/oauth2/token";

    /// Base path for the change management REST layer
    pub const CHANGE_MANAGEMENT_BASE: &str = "/services/apexrest/change-management/v1";

    /// Case creation endpoint
    pub const CHANGE_CASES_PATH: &str = "/services/apexrest/change-management/v1/change-cases";

    /// Case close endpoint
    pub const CHANGE_CASES_CLOSE_PATH: &str =
        "/services/apexrest/change-management/v1/change-cases/close";

    /// Implementation step start endpoint
    pub const IMPLEMENTATION_STEPS_START_PATH: &str =
        "/services/apexrest/change-management/v1/implementation-steps/start";

    /// Implementation step stop endpoint
    pub const IMPLEMENTATION_STEPS_STOP_PATH: &str =
        "/services/apexrest/change-management/v1/implementation-steps/stop";
}

/// Record type identifiers for change cases
pub mod record_types {
    /// Default record type for a real change case
    pub const CHANGE: &str = "012B000000009fBIAQ";

    /// Default record type for a change case template
    pub const CHANGE_TEMPLATE: &str = "012B0000000EGnTIAW";
}

/// Status vocabulary owned by the remote system
pub mod status {
    /// The only case status that counts as approved
    pub const APPROVED_SCHEDULED: &str = "Approved, Scheduled";

    /// Substring that marks a case status as closed
    pub const CLOSED_MARKER: &str = "Closed";

    /// Risk level applied to cases created by this tool
    pub const RISK_LOW: &str = "Low";

    /// Implementation step statuses accepted by the stop endpoint
    pub const IMPLEMENTED_PER_PLAN: &str = "Implemented - per plan";
    pub const NOT_IMPLEMENTED: &str = "Not Implemented";
    pub const ROLLED_BACK_NO_IMPACT: &str = "Rolled back - with no impact";

    /// Case statuses accepted by the update command
    pub const CLOSED_DEPLOY_SUCCESSFUL: &str = "Closed - Deploy Successful";
    pub const CLOSED_NOT_EXECUTED: &str = "Closed - Not Executed";
}

/// Environment variable naming
pub mod env {
    /// Prefix shared by every flag mirror and configuration variable
    pub const PREFIX: &str = "SF_CHANGE_CASE_";

    /// Full environment variable name for a flag or setting
    pub fn full_name(name: &str) -> String {
        format!("{}{}", PREFIX, name.to_uppercase())
    }
}

/// SObject names used in queries and CRUD calls
pub mod sobjects {
    pub const CASE: &str = "Case";
    pub const BUILD: &str = "ADM_Build__c";
    pub const RELEASE: &str = "ADM_Release__c";
    pub const WORK_ITEM: &str = "ADM_Work__c";
    pub const IMPLEMENTATION: &str = "SM_Change_Implementation__c";
}

/// HTTP and request timeouts
pub mod timeouts {
    use std::time::Duration;

    /// Default timeout for HTTP requests
    pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
}

/// Implementation step defaults for cases created by this tool
pub mod implementation {
    /// Planned duration of the single rollout step, in hours
    pub const PLANNED_DURATION_HOURS: f64 = 1.0;

    /// Description attached to the generated rollout step
    pub const STEP_DESCRIPTION: &str = "Automated release via change case management CLI";
}
