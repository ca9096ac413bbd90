// ABOUTME: Points a work item at a scheduled build record
// ABOUTME: Thin wrapper over the SDK workitem helper

use anyhow::Result;
use serde::Serialize;

use changecase_sdk::SfClient;
use changecase_sdk::workitem;

#[derive(Debug, Serialize)]
pub struct ScheduledBuildResult {
    #[serde(rename = "workItem")]
    pub work_item: String,
    #[serde(rename = "scheduledBuild")]
    pub scheduled_build: String,
}

pub async fn run(
    client: &SfClient,
    work_item_name: &str,
    build_name: &str,
) -> Result<ScheduledBuildResult> {
    workitem::update_scheduled_build(client, build_name, work_item_name).await?;

    log::info!("Work item {work_item_name} updated with scheduled build {build_name}.");
    Ok(ScheduledBuildResult {
        work_item: work_item_name.to_string(),
        scheduled_build: build_name.to_string(),
    })
}
