// ABOUTME: Check that a change case is approved for release
// ABOUTME: Pre-approved change types pass without consulting the status string

use anyhow::{Context, Result};
use serde::Serialize;

use changecase_sdk::constants::status;
use changecase_sdk::resolver;
use changecase_sdk::{CaseSelector, ChangeCaseError, SfClient};

use crate::config::Settings;

#[derive(Debug, Serialize, PartialEq)]
pub struct CheckResult {
    pub id: String,
    pub status: String,
    #[serde(rename = "type")]
    pub change_type: Option<String>,
}

pub async fn run(
    client: &SfClient,
    settings: &Settings,
    selector: &CaseSelector,
) -> Result<CheckResult> {
    let case = resolver::resolve_case(client, selector).await?;
    let id = case.id.clone().context("change case record has no id")?;
    let case_status = case.status.clone().unwrap_or_default();

    let pre_approved = settings
        .standard_change_type
        .as_deref()
        .is_some_and(|standard| case.change_type.as_deref() == Some(standard));

    if pre_approved {
        log::info!("Change case {id} is a standard pre-approved change.");
    } else if case_status != status::APPROVED_SCHEDULED {
        return Err(ChangeCaseError::NotApproved {
            id,
            status: case_status,
        }
        .into());
    }

    log::info!("Change case {id} is approved.");
    Ok(CheckResult {
        id,
        status: case_status,
        change_type: case.change_type,
    })
}
