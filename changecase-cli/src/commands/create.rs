// ABOUTME: Create a change case by cloning a template and starting its implementation step
// ABOUTME: Guards against duplicate live cases for the same (release, location) pair

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use changecase_sdk::constants::{env as env_names, implementation, sobjects, status};
use changecase_sdk::{
    Case, CaseWithImpl, ChangeCaseError, Implementation, SfClient, api, resolver,
};

use crate::config::Settings;
use crate::progress::{Progress, ProgressFile};

/// Marker id reported when --dryrun stops before the creation call.
pub const DRY_RUN_ID: &str = "NOT PRESENT BECAUSE DRY RUN";

#[derive(Debug)]
pub struct CreateOptions {
    pub template_id: String,
    pub release: String,
    pub location: Option<String>,
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateResult {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<CaseWithImpl>,
}

pub async fn run(
    client: &SfClient,
    settings: &Settings,
    progress_file: &ProgressFile,
    opts: CreateOptions,
) -> Result<CreateResult> {
    let template: Case = client.retrieve(sobjects::CASE, &opts.template_id).await?;
    let found_type = template.record_type_id.clone().unwrap_or_default();
    if found_type != settings.template_record_type_id {
        return Err(ChangeCaseError::TemplateTypeMismatch {
            found: found_type,
            expected: settings.template_record_type_id.clone(),
        }
        .into());
    }

    // The flag wins over the template's location; the guard and the new case
    // both use the effective value.
    let location = opts
        .location
        .clone()
        .or_else(|| template.source_control_location.clone())
        .context("no source control location: pass --location or use a template that has one")?;

    if let Some(existing) = resolver::find_existing_case(client, &opts.release, &location).await? {
        let id = existing.id.context("change case record has no id")?;
        log::info!(
            "Change case {id} already exists for {} and {location}. Skipping creation.",
            opts.release
        );
        return Ok(CreateResult { id, record: None });
    }

    let configuration_item = settings.configuration_item.clone().ok_or_else(|| {
        ChangeCaseError::MissingEnvVar(env_names::full_name("CONFIGURATION_ITEM"))
    })?;

    let release_id = resolver::resolve_release_id(client, &opts.release).await?;

    let mut change = template.clone_template_fields();
    change.record_type_id = Some(settings.change_record_type_id.clone());
    change.source_control_location = Some(location);
    change.release = Some(release_id);
    change.status = Some(status::APPROVED_SCHEDULED.to_string());
    change.risk_level = Some(status::RISK_LOW.to_string());

    let step = Implementation {
        description: Some(implementation::STEP_DESCRIPTION.to_string()),
        owner_id: client.user_id().map(str::to_string),
        configuration_item_path_list: Some(configuration_item),
        implementation_steps: Some(implementation::STEP_DESCRIPTION.to_string()),
        infrastructure_type: change.infrastructure_type.clone(),
        planned_start_time: Some(Utc::now()),
        planned_duration_in_hours: Some(implementation::PLANNED_DURATION_HOURS),
        ..Implementation::default()
    };

    let payload = CaseWithImpl {
        change,
        implementation_steps: vec![step],
    };

    if opts.dry_run {
        log::info!("Command dryrun - skipping case creation.");
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(CreateResult {
            id: DRY_RUN_ID.to_string(),
            record: Some(payload),
        });
    }

    let created = api::create_case(client, &payload).await?;
    api::start_implementation_steps(client, &created.implementation_steps).await?;

    progress_file.write(&Progress {
        change: created.id.clone(),
        implementation_steps: created.implementation_steps.clone(),
    })?;

    log::info!("Change case {} created.", created.id);
    Ok(CreateResult {
        id: created.id,
        record: Some(payload),
    })
}
