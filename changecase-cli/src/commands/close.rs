// ABOUTME: Stop a case's implementation steps and close it
// ABOUTME: Case and steps come from the flag, the progress file, or remote resolution

use anyhow::{Context, Result};
use serde::Serialize;

use changecase_sdk::{CaseSelector, SfClient, StepRef, api, resolver};

use crate::progress::ProgressFile;

#[derive(Debug)]
pub struct CloseOptions {
    pub change_case_id: Option<String>,
    pub release: Option<String>,
    pub location: Option<String>,
    pub status: &'static str,
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct CloseResult {
    pub case: ClosedCase,
}

#[derive(Debug, Serialize)]
pub struct ClosedCase {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Status")]
    pub status: String,
}

pub async fn run(
    client: &SfClient,
    progress_file: &ProgressFile,
    opts: CloseOptions,
) -> Result<CloseResult> {
    let progress = progress_file.read()?;

    // Flag beats progress file beats release/location resolution.
    let case_id = match opts.change_case_id {
        Some(id) => id,
        None => match &progress {
            Some(progress) => progress.change.clone(),
            None => {
                let selector =
                    CaseSelector::from_parts(None, opts.release.clone(), opts.location.clone())?;
                resolver::resolve_case(client, &selector)
                    .await?
                    .id
                    .context("change case record has no id")?
            }
        },
    };

    let steps: Vec<StepRef> = match progress
        .as_ref()
        .filter(|progress| !progress.implementation_steps.is_empty())
    {
        Some(progress) => progress.implementation_steps.clone(),
        None => resolver::resolve_implementation_steps(client, &case_id).await?,
    };

    if opts.dry_run {
        log::info!(
            "Command dryrun - would set {} implementation steps to {} and close change case {case_id}.",
            steps.len(),
            opts.status
        );
        return Ok(CloseResult {
            case: ClosedCase {
                id: case_id,
                status: opts.status.to_string(),
            },
        });
    }

    api::stop_implementation_steps(client, &steps, opts.status).await?;
    api::close_case(client, &case_id).await?;

    // Clear local state until the next release
    progress_file.delete()?;

    log::info!("Change case {case_id} set to {}.", opts.status);
    Ok(CloseResult {
        case: ClosedCase {
            id: case_id,
            status: opts.status.to_string(),
        },
    })
}
