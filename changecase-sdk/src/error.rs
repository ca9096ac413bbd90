// ABOUTME: Custom error types for the change case SDK with user-friendly messages
// ABOUTME: One variant per failure mode in the change case lifecycle, all terminal

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChangeCaseError {
    #[error("Required environment variable {0} not specified")]
    MissingEnvVar(String),

    #[error("Invalid auth configuration: {0}")]
    Auth(String),

    #[error("Either the change case ID or the release and location need to be provided")]
    MissingSelector,

    #[error("Could not find change case with {release} and {location} and non-Closed status")]
    CaseNotFound { release: String, location: String },

    #[error(
        "Found more than one change case with {release} and {location}. Use the change case ID to remove ambiguity"
    )]
    AmbiguousCase { release: String, location: String },

    #[error("Change case {id} is already closed ({status}). Is the release correct?")]
    AlreadyClosed { id: String, status: String },

    #[error(
        "A valid change case template must be supplied. Found {found} but expecting {expected}"
    )]
    TemplateTypeMismatch { found: String, expected: String },

    #[error("The release {id} is set to \"{status}\" and not approved")]
    NotApproved { id: String, status: String },

    #[error("Invalid build name {0}")]
    BuildNotFound(String),

    #[error("No workitem found for name {0}")]
    WorkItemNotFound(String),

    #[error("More than one workitem found for name {0}")]
    AmbiguousWorkItem(String),

    #[error("{operation} failed with {messages}")]
    Remote { operation: String, messages: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response format")]
    InvalidResponse,
}

impl ChangeCaseError {
    pub fn help_text(&self) -> Option<&'static str> {
        match self {
            ChangeCaseError::MissingEnvVar(_) | ChangeCaseError::Auth(_) => {
                Some("Set SF_CHANGE_CASE_SFDX_AUTH_URL to the org's sfdx auth URL")
            }
            ChangeCaseError::MissingSelector => {
                Some("Pass --changecaseid, or both --release and --location")
            }
            ChangeCaseError::AmbiguousCase { .. } => {
                Some("Pass --changecaseid to select one case explicitly")
            }
            ChangeCaseError::AlreadyClosed { .. } => {
                Some("A closed case cannot be reused. Check the release name passed to --release")
            }
            ChangeCaseError::Network(_) => Some("Check your internet connection and try again"),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ChangeCaseError {
    fn from(err: reqwest::Error) -> Self {
        ChangeCaseError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ChangeCaseError {
    fn from(_err: serde_json::Error) -> Self {
        ChangeCaseError::InvalidResponse
    }
}

pub type Result<T> = std::result::Result<T, ChangeCaseError>;
