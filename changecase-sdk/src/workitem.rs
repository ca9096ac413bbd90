// ABOUTME: Work item operations for tagging a scheduled build onto a work record
// ABOUTME: Build lookup here never creates; an unknown build name is the caller's mistake

use crate::constants::sobjects;
use crate::error::{ChangeCaseError, Result};
use crate::records::IdRecord;
use crate::{SfClient, soql_quote};

/// Look up the build by name (it must already exist), then point the named
/// work item's scheduled build at it.
pub async fn update_scheduled_build(
    client: &SfClient,
    build_name: &str,
    work_item_name: &str,
) -> Result<()> {
    let builds: Vec<IdRecord> = client
        .query(&format!(
            "SELECT Id FROM {} WHERE Name = '{}'",
            sobjects::BUILD,
            soql_quote(build_name)
        ))
        .await?;
    let build_id = match builds.first() {
        Some(first) => {
            if builds.len() > 1 {
                log::warn!("More than one {build_name} build found. Using the first one.");
            }
            first.id.clone()
        }
        None => return Err(ChangeCaseError::BuildNotFound(build_name.to_string())),
    };

    let work_items: Vec<IdRecord> = client
        .query(&format!(
            "SELECT Id, Scheduled_Build__c FROM {} WHERE Name = '{}'",
            sobjects::WORK_ITEM,
            soql_quote(work_item_name)
        ))
        .await?;
    let work_item_id = match work_items.as_slice() {
        [] => return Err(ChangeCaseError::WorkItemNotFound(work_item_name.to_string())),
        [only] => only.id.clone(),
        _ => return Err(ChangeCaseError::AmbiguousWorkItem(work_item_name.to_string())),
    };

    client
        .update(
            sobjects::WORK_ITEM,
            &work_item_id,
            &serde_json::json!({ "Scheduled_Build__c": build_id }),
        )
        .await
}
