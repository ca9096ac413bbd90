// ABOUTME: Direct status update of a change case by id
// ABOUTME: Plain sobject PATCH, no implementation step handling

use anyhow::Result;
use serde::Serialize;
use serde_json::json;

use changecase_sdk::SfClient;
use changecase_sdk::constants::sobjects;

#[derive(Debug, Serialize)]
pub struct UpdateResult {
    pub case: UpdatedCase,
}

#[derive(Debug, Serialize)]
pub struct UpdatedCase {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Status")]
    pub status: String,
}

pub async fn run(client: &SfClient, change_case_id: &str, status: &str) -> Result<UpdateResult> {
    client
        .update(sobjects::CASE, change_case_id, &json!({ "Status": status }))
        .await?;

    log::info!("Change case {change_case_id} set to {status}.");
    Ok(UpdateResult {
        case: UpdatedCase {
            id: change_case_id.to_string(),
            status: status.to_string(),
        },
    })
}
