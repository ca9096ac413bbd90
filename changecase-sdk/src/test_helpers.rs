// ABOUTME: Test helper utilities for mocking org API responses
// ABOUTME: Provides mockito-backed client construction and canned query bodies

use mockito::{Matcher, Server, ServerGuard};
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;

use crate::{OrgAuth, SfClient};

/// An SfClient pointed at a mockito server.
pub fn client_for(server: &ServerGuard) -> SfClient {
    let auth = OrgAuth {
        instance_url: Url::parse(&server.url()).expect("mockito url parses"),
        access_token: SecretString::new("00D!TESTTOKEN".to_string().into_boxed_str()),
        user_id: Some("005B0000005LiTVIA0".to_string()),
    };
    SfClient::new(auth).expect("client builds")
}

/// Matcher for a SOQL query hitting the query endpoint.
pub fn soql_matcher(soql: &str) -> Matcher {
    Matcher::UrlEncoded("q".into(), soql.into())
}

/// Body of a query response wrapping the given records.
pub fn query_body(records: Vec<Value>) -> String {
    json!({
        "totalSize": records.len(),
        "done": true,
        "records": records,
    })
    .to_string()
}

/// Body of a successful sobject create.
pub fn create_body(id: &str) -> String {
    json!({"id": id, "success": true, "errors": []}).to_string()
}

/// Mock the build and release name lookups to both return existing rows.
pub async fn mock_release_found(server: &mut Server, release: &str, release_id: &str) {
    server
        .mock("GET", "/services/data/v56.0/query")
        .match_query(soql_matcher(&format!(
            "SELECT Id FROM ADM_Release__c WHERE Name = '{release}'"
        )))
        .with_body(query_body(vec![json!({"Id": release_id})]))
        .create_async()
        .await;
}
