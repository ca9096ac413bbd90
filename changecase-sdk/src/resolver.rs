// ABOUTME: Case resolution and build/release find-or-create logic
// ABOUTME: Implements the duplicate guard rules used by create, close, and check

use crate::constants::sobjects;
use crate::error::{ChangeCaseError, Result};
use crate::records::{Case, IdRecord, StepRef};
use crate::{SfClient, soql_quote};

/// How a command selects its target case: a direct id, or the unique
/// non-closed case for a (release, location) pair.
#[derive(Debug, Clone)]
pub enum CaseSelector {
    Id(String),
    ReleaseLocation { release: String, location: String },
}

impl CaseSelector {
    /// Build a selector from optional flag values, enforcing the
    /// id-or-release-and-location precondition.
    pub fn from_parts(
        case_id: Option<String>,
        release: Option<String>,
        location: Option<String>,
    ) -> Result<Self> {
        if let Some(id) = case_id {
            return Ok(CaseSelector::Id(id));
        }
        match (release, location) {
            (Some(release), Some(location)) => Ok(CaseSelector::ReleaseLocation { release, location }),
            _ => Err(ChangeCaseError::MissingSelector),
        }
    }
}

/// Find a build by name, creating it when absent. Idempotent per name;
/// multiple hits log a warning and take the first in store order.
pub async fn resolve_build_id(client: &SfClient, release: &str) -> Result<String> {
    let records: Vec<IdRecord> = client
        .query(&format!(
            "SELECT Id FROM {} WHERE Name = '{}'",
            sobjects::BUILD,
            soql_quote(release)
        ))
        .await?;

    if let Some(first) = records.first() {
        if records.len() > 1 {
            log::warn!("More than one {release} build found. Using the first one.");
        }
        return Ok(first.id.clone());
    }

    client
        .create(sobjects::BUILD, &serde_json::json!({ "Name": release }))
        .await
}

/// Find a release by name, creating it (and its backing build) when absent.
pub async fn resolve_release_id(client: &SfClient, release: &str) -> Result<String> {
    let records: Vec<IdRecord> = client
        .query(&format!(
            "SELECT Id FROM {} WHERE Name = '{}'",
            sobjects::RELEASE,
            soql_quote(release)
        ))
        .await?;

    if let Some(first) = records.first() {
        if records.len() > 1 {
            log::warn!("More than one {release} release found. Using the first one.");
        }
        return Ok(first.id.clone());
    }

    let build_id = resolve_build_id(client, release).await?;
    client
        .create(
            sobjects::RELEASE,
            &serde_json::json!({ "Name": release, "Build__c": build_id }),
        )
        .await
}

/// All cases for a (release, location) pair, in store order, closed included.
async fn cases_for_release(client: &SfClient, release: &str, location: &str) -> Result<Vec<Case>> {
    let release_id = resolve_release_id(client, release).await?;
    client
        .query(&format!(
            "SELECT Id, Status, SM_ChangeType__c FROM {} WHERE SM_Release__c = '{}' AND SM_Source_Control_Location__c = '{}'",
            sobjects::CASE,
            soql_quote(&release_id),
            soql_quote(location)
        ))
        .await
}

/// Resolve exactly one case: by id directly, or the unique non-closed case
/// matching the (release, location) pair.
pub async fn resolve_case(client: &SfClient, selector: &CaseSelector) -> Result<Case> {
    match selector {
        CaseSelector::Id(id) => {
            log::debug!("Using change case ID {id}.");
            client.retrieve(sobjects::CASE, id).await
        }
        CaseSelector::ReleaseLocation { release, location } => {
            log::debug!("No change case ID provided, using release and location instead.");
            let mut cases: Vec<Case> = cases_for_release(client, release, location)
                .await?
                .into_iter()
                .filter(|case| !case.is_closed())
                .collect();

            match cases.len() {
                0 => Err(ChangeCaseError::CaseNotFound {
                    release: release.clone(),
                    location: location.clone(),
                }),
                1 => Ok(cases.remove(0)),
                _ => Err(ChangeCaseError::AmbiguousCase {
                    release: release.clone(),
                    location: location.clone(),
                }),
            }
        }
    }
}

/// Duplicate guard for the create path. Unlike [`resolve_case`], closed cases
/// are looked at too: a live case short-circuits creation, a closed one is a
/// state conflict (the caller probably has the wrong release).
///
/// Returns `Ok(None)` when creation should proceed and `Ok(Some(case))` when
/// an open case already covers the pair.
pub async fn find_existing_case(
    client: &SfClient,
    release: &str,
    location: &str,
) -> Result<Option<Case>> {
    let cases = cases_for_release(client, release, location).await?;

    match cases.as_slice() {
        [] => Ok(None),
        [only] if only.is_closed() => Err(ChangeCaseError::AlreadyClosed {
            id: only.id.clone().unwrap_or_default(),
            status: only.status.clone().unwrap_or_default(),
        }),
        [only] => Ok(Some(only.clone())),
        _ => Err(ChangeCaseError::AmbiguousCase {
            release: release.to_string(),
            location: location.to_string(),
        }),
    }
}

/// Implementation steps attached to a case, for a close that lost (or never
/// had) the local progress record.
pub async fn resolve_implementation_steps(
    client: &SfClient,
    case_id: &str,
) -> Result<Vec<StepRef>> {
    let records: Vec<IdRecord> = client
        .query(&format!(
            "SELECT Id FROM {} WHERE Case__c = '{}'",
            sobjects::IMPLEMENTATION,
            soql_quote(case_id)
        ))
        .await?;
    Ok(records.into_iter().map(|r| StepRef { id: r.id }).collect())
}
