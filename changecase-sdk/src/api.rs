// ABOUTME: Wire payloads and response normalization for the change management REST layer
// ABOUTME: One tagged outcome type and one normalizing function per endpoint

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::constants::urls;
use crate::error::{ChangeCaseError, Result};
use crate::records::{CaseWithImpl, StepRef};
use crate::SfClient;

/// One reported error element. The message is occasionally a structured
/// object (blocked configuration-item locks), so it is kept as raw JSON and
/// rendered when joining.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: serde_json::Value,
    #[serde(rename = "errorCode", default)]
    pub error_code: Option<String>,
}

impl ApiErrorDetail {
    fn render(&self) -> String {
        match &self.message {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Normalized per-element outcome shared by the start/stop/close endpoints.
#[derive(Debug)]
pub enum ElementOutcome {
    Success { id: String },
    Failure { messages: Vec<String> },
}

#[derive(Debug, Deserialize)]
struct RawElement {
    #[serde(default, alias = "Id")]
    id: Option<String>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct RawElementsResponse {
    #[serde(rename = "hasErrors", default)]
    has_errors: bool,
    #[serde(default)]
    results: Vec<RawElement>,
}

/// Only an explicit `success: false` marks a failure; the API omits the flag
/// on some success shapes.
fn normalize_element(raw: RawElement) -> ElementOutcome {
    if raw.success == Some(false) {
        ElementOutcome::Failure {
            messages: raw.errors.iter().map(ApiErrorDetail::render).collect(),
        }
    } else {
        ElementOutcome::Success {
            id: raw.id.unwrap_or_default(),
        }
    }
}

/// Collect success ids; any failure aborts with every element's messages
/// joined by comma.
fn collect_outcomes(operation: &str, response: RawElementsResponse) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut failures = Vec::new();
    for element in response.results {
        match normalize_element(element) {
            ElementOutcome::Success { id } => {
                log::info!("{operation} succeeded for {id}");
                ids.push(id);
            }
            ElementOutcome::Failure { messages } => failures.extend(messages),
        }
    }
    if response.has_errors && failures.is_empty() {
        return Err(ChangeCaseError::InvalidResponse);
    }
    if !failures.is_empty() {
        return Err(ChangeCaseError::Remote {
            operation: operation.to_string(),
            messages: failures.join(","),
        });
    }
    Ok(ids)
}

/// The created case plus the ids of its implementation steps.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedCase {
    pub id: String,
    pub implementation_steps: Vec<StepRef>,
}

#[derive(Debug, Deserialize)]
struct RawCreateResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(rename = "implementationSteps", default)]
    implementation_steps: Vec<StepRef>,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

fn normalize_create(raw: RawCreateResponse) -> Result<CreatedCase> {
    if raw.success == Some(false) {
        return Err(ChangeCaseError::Remote {
            operation: "Creating the change case".to_string(),
            messages: raw
                .errors
                .iter()
                .map(ApiErrorDetail::render)
                .collect::<Vec<_>>()
                .join(","),
        });
    }
    Ok(CreatedCase {
        id: raw.id.ok_or(ChangeCaseError::InvalidResponse)?,
        implementation_steps: raw.implementation_steps,
    })
}

/// POST the case and its implementation steps to the case-creation endpoint.
pub async fn create_case(client: &SfClient, payload: &CaseWithImpl) -> Result<CreatedCase> {
    let raw: RawCreateResponse = client.post(urls::CHANGE_CASES_PATH, payload).await?;
    normalize_create(raw)
}

/// Start the given implementation steps. Returns the started step ids.
pub async fn start_implementation_steps(
    client: &SfClient,
    steps: &[StepRef],
) -> Result<Vec<String>> {
    let body = json!({ "implementationSteps": steps });
    let raw: RawElementsResponse = client
        .patch(urls::IMPLEMENTATION_STEPS_START_PATH, &body)
        .await?;
    collect_outcomes("Starting the implementation steps", raw)
}

#[derive(Debug, Serialize)]
struct StepWithStatus<'a> {
    #[serde(rename = "Id")]
    id: &'a str,
    #[serde(rename = "Status__c")]
    status: &'a str,
}

/// Stop the given implementation steps, tagging each with the target status.
pub async fn stop_implementation_steps(
    client: &SfClient,
    steps: &[StepRef],
    status: &str,
) -> Result<Vec<String>> {
    let tagged: Vec<StepWithStatus<'_>> = steps
        .iter()
        .map(|step| StepWithStatus {
            id: &step.id,
            status,
        })
        .collect();
    let body = json!({ "implementationSteps": tagged });
    let raw: RawElementsResponse = client
        .patch(urls::IMPLEMENTATION_STEPS_STOP_PATH, &body)
        .await?;
    collect_outcomes("Stopping the implementation steps", raw)
}

/// Close the case. Returns the closed case id reported by the endpoint.
pub async fn close_case(client: &SfClient, case_id: &str) -> Result<String> {
    let body = json!({ "cases": [{ "Id": case_id }] });
    let raw: RawElementsResponse = client.patch(urls::CHANGE_CASES_CLOSE_PATH, &body).await?;
    let ids = collect_outcomes("Closing the change case", raw)?;
    Ok(ids.into_iter().next().unwrap_or_else(|| case_id.to_string()))
}
