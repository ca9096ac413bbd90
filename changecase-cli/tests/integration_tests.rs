// ABOUTME: End-to-end command flows against a mocked org API
// ABOUTME: Exercises create, close, check, update, and update-scheduled-build handlers

use mockito::{Matcher, Server, ServerGuard};
use secrecy::SecretString;
use serde_json::{Value, json};
use tempfile::TempDir;
use url::Url;

use changecase_sdk::{CaseSelector, ChangeCaseError, OrgAuth, SfClient, StepRef};
use changecase_cli::commands;
use changecase_cli::config::Settings;
use changecase_cli::progress::{Progress, ProgressFile};

const TEMPLATE_ID: &str = "500B0000005YGsh";
const RELEASE: &str = "test.build";
const LOCATION: &str = "https://github.com/myorg/myrepo";
const TEMPLATE_RECORD_TYPE: &str = "012B0000000EGnTIAW";
const CHANGE_RECORD_TYPE: &str = "012B000000009fBIAQ";

fn client_for(server: &ServerGuard) -> SfClient {
    let auth = OrgAuth {
        instance_url: Url::parse(&server.url()).expect("mockito url parses"),
        access_token: SecretString::new("00D!TESTTOKEN".to_string().into_boxed_str()),
        user_id: Some("005B0000005LiTVIA0".to_string()),
    };
    SfClient::new(auth).expect("client builds")
}

fn settings() -> Settings {
    Settings {
        configuration_item: Some("Salesforce.SF_Core.release_automation".to_string()),
        ..Settings::default()
    }
}

fn query_body(records: Vec<Value>) -> String {
    json!({"totalSize": records.len(), "done": true, "records": records}).to_string()
}

fn soql(soql: &str) -> Matcher {
    Matcher::UrlEncoded("q".into(), soql.into())
}

async fn mock_template(server: &mut Server, record_type: &str) {
    server
        .mock(
            "GET",
            format!("/services/data/v56.0/sobjects/Case/{TEMPLATE_ID}").as_str(),
        )
        .with_body(
            json!({
                "Id": TEMPLATE_ID,
                "RecordTypeId": record_type,
                "Subject": "Deploy the service",
                "SM_Source_Control_Location__c": LOCATION,
                "SM_Infrastructure_Type__c": "Falcon",
                "SM_Risk_Summary__c": "Low risk",
            })
            .to_string(),
        )
        .create_async()
        .await;
}

async fn mock_release_found(server: &mut Server, release_id: &str) {
    server
        .mock("GET", "/services/data/v56.0/query")
        .match_query(soql(&format!(
            "SELECT Id FROM ADM_Release__c WHERE Name = '{RELEASE}'"
        )))
        .with_body(query_body(vec![json!({"Id": release_id})]))
        .create_async()
        .await;
}

async fn mock_case_query(server: &mut Server, release_id: &str, cases: Vec<Value>) {
    server
        .mock("GET", "/services/data/v56.0/query")
        .match_query(soql(&format!(
            "SELECT Id, Status, SM_ChangeType__c FROM Case WHERE SM_Release__c = '{release_id}' AND SM_Source_Control_Location__c = '{LOCATION}'"
        )))
        .with_body(query_body(cases))
        .create_async()
        .await;
}

#[tokio::test]
async fn test_create_flow_writes_progress_file() {
    let mut server = Server::new_async().await;
    mock_template(&mut server, TEMPLATE_RECORD_TYPE).await;
    mock_release_found(&mut server, "a0nREL").await;
    mock_case_query(&mut server, "a0nREL", vec![]).await;

    let create = server
        .mock("POST", "/services/apexrest/change-management/v1/change-cases")
        .match_body(Matcher::PartialJson(json!({
            "change": {
                "RecordTypeId": CHANGE_RECORD_TYPE,
                "Status": "Approved, Scheduled",
                "SM_Risk_Level__c": "Low",
                "SM_Release__c": "a0nREL",
                "SM_Source_Control_Location__c": LOCATION,
                "Subject": "Deploy the service",
            },
        })))
        .with_body(
            json!({
                "id": "500NEW",
                "success": true,
                "implementationSteps": [{"Id": "a1k1"}],
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let start = server
        .mock(
            "PATCH",
            "/services/apexrest/change-management/v1/implementation-steps/start",
        )
        .match_body(Matcher::Json(
            json!({"implementationSteps": [{"Id": "a1k1"}]}),
        ))
        .with_body(
            json!({"hasErrors": false, "results": [{"id": "a1k1", "success": true}]}).to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let progress_file = ProgressFile::in_dir(dir.path());
    let client = client_for(&server);

    let result = commands::create::run(
        &client,
        &settings(),
        &progress_file,
        commands::create::CreateOptions {
            template_id: TEMPLATE_ID.to_string(),
            release: RELEASE.to_string(),
            location: None,
            dry_run: false,
        },
    )
    .await
    .unwrap();

    assert_eq!(result.id, "500NEW");
    create.assert_async().await;
    start.assert_async().await;

    let progress = progress_file.read().unwrap().expect("progress written");
    assert_eq!(progress.change, "500NEW");
    assert_eq!(progress.implementation_steps, vec![StepRef { id: "a1k1".into() }]);
}

#[tokio::test]
async fn test_create_dry_run_touches_nothing() {
    let mut server = Server::new_async().await;
    mock_template(&mut server, TEMPLATE_RECORD_TYPE).await;
    mock_release_found(&mut server, "a0nREL").await;
    mock_case_query(&mut server, "a0nREL", vec![]).await;
    let create = server
        .mock("POST", "/services/apexrest/change-management/v1/change-cases")
        .expect(0)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let progress_file = ProgressFile::in_dir(dir.path());
    let client = client_for(&server);

    let result = commands::create::run(
        &client,
        &settings(),
        &progress_file,
        commands::create::CreateOptions {
            template_id: TEMPLATE_ID.to_string(),
            release: RELEASE.to_string(),
            location: None,
            dry_run: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(result.id, commands::create::DRY_RUN_ID);
    let payload = result.record.expect("dry run reports the payload");
    assert_eq!(
        payload.change.status.as_deref(),
        Some("Approved, Scheduled")
    );
    create.assert_async().await;
    assert!(progress_file.read().unwrap().is_none());
}

#[tokio::test]
async fn test_create_reuses_existing_open_case() {
    let mut server = Server::new_async().await;
    mock_template(&mut server, TEMPLATE_RECORD_TYPE).await;
    mock_release_found(&mut server, "a0nREL").await;
    mock_case_query(
        &mut server,
        "a0nREL",
        vec![json!({"Id": "500LIVE", "Status": "Approved, Scheduled"})],
    )
    .await;
    let create = server
        .mock("POST", "/services/apexrest/change-management/v1/change-cases")
        .expect(0)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let progress_file = ProgressFile::in_dir(dir.path());
    let client = client_for(&server);

    let result = commands::create::run(
        &client,
        &settings(),
        &progress_file,
        commands::create::CreateOptions {
            template_id: TEMPLATE_ID.to_string(),
            release: RELEASE.to_string(),
            location: None,
            dry_run: false,
        },
    )
    .await
    .unwrap();

    assert_eq!(result.id, "500LIVE");
    assert!(result.record.is_none());
    create.assert_async().await;
}

#[tokio::test]
async fn test_create_rejects_wrong_template_type() {
    let mut server = Server::new_async().await;
    mock_template(&mut server, CHANGE_RECORD_TYPE).await;

    let dir = TempDir::new().unwrap();
    let progress_file = ProgressFile::in_dir(dir.path());
    let client = client_for(&server);

    let err = commands::create::run(
        &client,
        &settings(),
        &progress_file,
        commands::create::CreateOptions {
            template_id: TEMPLATE_ID.to_string(),
            release: RELEASE.to_string(),
            location: None,
            dry_run: false,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ChangeCaseError>(),
        Some(ChangeCaseError::TemplateTypeMismatch { .. })
    ));
}

#[tokio::test]
async fn test_close_flow_prefers_progress_file_and_deletes_it() {
    let mut server = Server::new_async().await;
    let stop = server
        .mock(
            "PATCH",
            "/services/apexrest/change-management/v1/implementation-steps/stop",
        )
        .match_body(Matcher::Json(json!({
            "implementationSteps": [{"Id": "a1k1", "Status__c": "Implemented - per plan"}],
        })))
        .with_body(
            json!({"hasErrors": false, "results": [{"id": "a1k1", "success": true}]}).to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let close = server
        .mock(
            "PATCH",
            "/services/apexrest/change-management/v1/change-cases/close",
        )
        .match_body(Matcher::Json(json!({"cases": [{"Id": "500B0X"}]})))
        .with_body(
            json!({"hasErrors": false, "results": [{"id": "500B0X", "success": true}]}).to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let progress_file = ProgressFile::in_dir(dir.path());
    progress_file
        .write(&Progress {
            change: "500B0X".to_string(),
            implementation_steps: vec![StepRef { id: "a1k1".into() }],
        })
        .unwrap();

    let client = client_for(&server);
    let result = commands::close::run(
        &client,
        &progress_file,
        commands::close::CloseOptions {
            change_case_id: None,
            release: None,
            location: None,
            status: "Implemented - per plan",
            dry_run: false,
        },
    )
    .await
    .unwrap();

    assert_eq!(result.case.id, "500B0X");
    assert_eq!(result.case.status, "Implemented - per plan");
    stop.assert_async().await;
    close.assert_async().await;
    assert!(progress_file.read().unwrap().is_none());
}

#[tokio::test]
async fn test_close_resolves_remotely_without_progress() {
    let mut server = Server::new_async().await;
    mock_release_found(&mut server, "a0nREL").await;
    mock_case_query(
        &mut server,
        "a0nREL",
        vec![json!({"Id": "500B0X", "Status": "Approved, Scheduled"})],
    )
    .await;
    server
        .mock("GET", "/services/data/v56.0/query")
        .match_query(soql(
            "SELECT Id FROM SM_Change_Implementation__c WHERE Case__c = '500B0X'",
        ))
        .with_body(query_body(vec![json!({"Id": "a1k1"})]))
        .create_async()
        .await;
    server
        .mock(
            "PATCH",
            "/services/apexrest/change-management/v1/implementation-steps/stop",
        )
        .with_body(
            json!({"hasErrors": false, "results": [{"id": "a1k1", "success": true}]}).to_string(),
        )
        .create_async()
        .await;
    let close = server
        .mock(
            "PATCH",
            "/services/apexrest/change-management/v1/change-cases/close",
        )
        .with_body(
            json!({"hasErrors": false, "results": [{"id": "500B0X", "success": true}]}).to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let progress_file = ProgressFile::in_dir(dir.path());
    let client = client_for(&server);

    let result = commands::close::run(
        &client,
        &progress_file,
        commands::close::CloseOptions {
            change_case_id: None,
            release: Some(RELEASE.to_string()),
            location: Some(LOCATION.to_string()),
            status: "Not Implemented",
            dry_run: false,
        },
    )
    .await
    .unwrap();

    assert_eq!(result.case.id, "500B0X");
    close.assert_async().await;
}

#[tokio::test]
async fn test_close_dry_run_calls_nothing() {
    let mut server = Server::new_async().await;
    let stop = server
        .mock(
            "PATCH",
            "/services/apexrest/change-management/v1/implementation-steps/stop",
        )
        .expect(0)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let progress_file = ProgressFile::in_dir(dir.path());
    progress_file
        .write(&Progress {
            change: "500B0X".to_string(),
            implementation_steps: vec![StepRef { id: "a1k1".into() }],
        })
        .unwrap();

    let client = client_for(&server);
    commands::close::run(
        &client,
        &progress_file,
        commands::close::CloseOptions {
            change_case_id: None,
            release: None,
            location: None,
            status: "Implemented - per plan",
            dry_run: true,
        },
    )
    .await
    .unwrap();

    stop.assert_async().await;
    // Dry run leaves the progress file for the real close
    assert!(progress_file.read().unwrap().is_some());
}

#[tokio::test]
async fn test_check_approved_case_passes() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/services/data/v56.0/sobjects/Case/500B0X")
        .with_body(json!({"Id": "500B0X", "Status": "Approved, Scheduled"}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let result = commands::check::run(
        &client,
        &settings(),
        &CaseSelector::Id("500B0X".to_string()),
    )
    .await
    .unwrap();

    assert_eq!(result.id, "500B0X");
    assert_eq!(result.status, "Approved, Scheduled");
}

#[tokio::test]
async fn test_check_unapproved_case_fails() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/services/data/v56.0/sobjects/Case/500B0X")
        .with_body(json!({"Id": "500B0X", "Status": "New"}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let err = commands::check::run(
        &client,
        &settings(),
        &CaseSelector::Id("500B0X".to_string()),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ChangeCaseError>(),
        Some(ChangeCaseError::NotApproved { .. })
    ));
}

#[tokio::test]
async fn test_check_standard_change_type_is_pre_approved() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/services/data/v56.0/sobjects/Case/500B0X")
        .with_body(
            json!({"Id": "500B0X", "Status": "New", "SM_ChangeType__c": "a1cB0000000ABCD"})
                .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let mut settings = settings();
    settings.standard_change_type = Some("a1cB0000000ABCD".to_string());

    let result = commands::check::run(
        &client,
        &settings,
        &CaseSelector::Id("500B0X".to_string()),
    )
    .await
    .unwrap();

    assert_eq!(result.change_type.as_deref(), Some("a1cB0000000ABCD"));
}

#[tokio::test]
async fn test_update_patches_case_status() {
    let mut server = Server::new_async().await;
    let patch = server
        .mock("PATCH", "/services/data/v56.0/sobjects/Case/500B0X")
        .match_body(Matcher::Json(json!({"Status": "Closed - Not Executed"})))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let result = commands::update::run(&client, "500B0X", "Closed - Not Executed")
        .await
        .unwrap();

    assert_eq!(result.case.id, "500B0X");
    assert_eq!(result.case.status, "Closed - Not Executed");
    patch.assert_async().await;
}

#[tokio::test]
async fn test_update_scheduled_build_flow() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/services/data/v56.0/query")
        .match_query(soql("SELECT Id FROM ADM_Build__c WHERE Name = '47.18.x'"))
        .with_body(query_body(vec![json!({"Id": "a0AB0X"})]))
        .create_async()
        .await;
    server
        .mock("GET", "/services/data/v56.0/query")
        .match_query(soql(
            "SELECT Id, Scheduled_Build__c FROM ADM_Work__c WHERE Name = 'W-1234567'",
        ))
        .with_body(query_body(vec![json!({"Id": "a07W0X"})]))
        .create_async()
        .await;
    let patch = server
        .mock("PATCH", "/services/data/v56.0/sobjects/ADM_Work__c/a07W0X")
        .match_body(Matcher::Json(json!({"Scheduled_Build__c": "a0AB0X"})))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let result = commands::scheduled_build::run(&client, "W-1234567", "47.18.x")
        .await
        .unwrap();

    assert_eq!(result.work_item, "W-1234567");
    assert_eq!(result.scheduled_build, "47.18.x");
    patch.assert_async().await;
}
