use super::*;
use crate::auth::TokenAuth;
use crate::memory::MemoryWorkbook;
use crate::retry::RecordingSleeper;
use serde_json::json;
use std::time::Duration;

fn sheet(name: &str) -> SheetName {
    SheetName::try_new(name).unwrap()
}

fn setup() -> (Arc<MemoryWorkbook>, Arc<RecordingSleeper>, ResilientClient) {
    let workbook = Arc::new(MemoryWorkbook::new("wb-1"));
    let sleeper = Arc::new(RecordingSleeper::new());
    let client = ResilientClient::new(workbook.clone(), SpreadsheetId::try_new("wb-1").unwrap())
        .with_sleeper(sleeper.clone());
    (workbook, sleeper, client)
}

#[tokio::test]
async fn test_two_failures_then_success() {
    let (workbook, sleeper, client) = setup();
    workbook.fail_next(SheetsError::Transient("connection reset".into()));
    workbook.fail_next(SheetsError::Internal("Service error".into()));

    let names = client.list_sheets().await.unwrap();
    assert_eq!(names, vec!["Sheet1"]);
    assert_eq!(workbook.request_count(), 3);
    assert_eq!(
        sleeper.sleeps(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
}

#[tokio::test]
async fn test_three_rate_limits_return_error() {
    let (workbook, sleeper, client) = setup();
    for _ in 0..3 {
        workbook.fail_next(SheetsError::RateLimited("Rate limit exceeded".into()));
    }

    let err = client
        .append_rows(&sheet("Sheet1"), vec![vec![json!(1)]])
        .await
        .unwrap_err();
    assert!(matches!(err, SheetsError::RateLimited(_)));
    assert_eq!(workbook.request_count(), 3);
    assert_eq!(
        sleeper.sleeps(),
        vec![Duration::from_secs(3), Duration::from_secs(5)]
    );
    assert!(workbook.sheet("Sheet1").unwrap().is_empty());
}

#[tokio::test]
async fn test_validation_error_sends_nothing() {
    let (workbook, sleeper, client) = setup();
    let err = client
        .update_range(&sheet("Sheet1"), "bogus", vec![vec![json!(1)]])
        .await
        .unwrap_err();
    assert!(matches!(err, SheetsError::Validation(_)));
    assert_eq!(workbook.request_count(), 0);
    assert!(sleeper.sleeps().is_empty());
}

#[tokio::test]
async fn test_create_sheet_conflict_is_success() {
    let (workbook, sleeper, client) = setup();
    workbook.fail_next(SheetsError::ProvisionConflict("Sheet already exists".into()));

    let response = client.create_sheet(&sheet("Summary")).await.unwrap();
    assert_eq!(response.message.as_deref(), Some("Sheet already exists"));
    // one round trip, no retry
    assert_eq!(workbook.request_count(), 1);
    assert!(sleeper.sleeps().is_empty());
}

#[tokio::test]
async fn test_conflict_on_other_operations_is_an_error() {
    let (workbook, _sleeper, client) = setup();
    let client = client.with_policy(RetryPolicy::new(1, Duration::ZERO));
    workbook.fail_next(SheetsError::ProvisionConflict("already exists".into()));
    assert!(client.list_sheets().await.is_err());
}

#[tokio::test]
async fn test_write_then_read_round_trip() {
    let (_workbook, _sleeper, client) = setup();
    let grid = vec![
        vec![json!("ad_name"), json!("cost")],
        vec![json!("echo_1"), json!("100.00")],
        vec![json!("meta_1"), json!("N/A")],
    ];
    client.overwrite(&sheet("Sheet1"), grid.clone()).await.unwrap();
    assert_eq!(client.read(&sheet("Sheet1")).await.unwrap(), grid);

    client
        .update_from_a1(&sheet("Sheet1"), vec![vec![json!("x")]])
        .await
        .unwrap();
    assert_eq!(client.read(&sheet("Sheet1")).await.unwrap()[0][0], json!("x"));

    client.clear(&sheet("Sheet1"), None).await.unwrap();
    assert!(client.read(&sheet("Sheet1")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_auth_is_applied() {
    let workbook = Arc::new(MemoryWorkbook::new("wb-1").require_tokens(["t"]));
    let client = ResilientClient::new(workbook.clone(), SpreadsheetId::try_new("wb-1").unwrap())
        .with_sleeper(Arc::new(RecordingSleeper::new()))
        .with_auth(Arc::new(TokenAuth::new("t")));
    client.list_sheets().await.unwrap();
    assert_eq!(workbook.access_log()[0].client, "t");
}

#[tokio::test]
async fn test_unauthorized_after_retries() {
    let workbook = Arc::new(MemoryWorkbook::new("wb-1").require_tokens(["t"]));
    let client = ResilientClient::new(workbook.clone(), SpreadsheetId::try_new("wb-1").unwrap())
        .with_sleeper(Arc::new(RecordingSleeper::new()));
    let err = client.list_sheets().await.unwrap_err();
    assert!(matches!(err, SheetsError::Unauthorized(_)));
    assert_eq!(workbook.request_count(), 3);
}

#[tokio::test]
async fn test_client_side_quota() {
    let (workbook, sleeper, client) = setup();
    let client = client
        .with_policy(RetryPolicy::new(2, Duration::from_millis(10)))
        .with_quota(QuotaGuard::new(
            Arc::new(crate::quota::InMemoryRateLimitStore::default()),
            1,
            Duration::from_secs(3600),
        ));

    client.list_sheets().await.unwrap();
    let err = client.list_sheets().await.unwrap_err();
    assert!(matches!(err, SheetsError::RateLimited(_)));
    // the quota stops requests before they leave the process
    assert_eq!(workbook.request_count(), 1);
    assert_eq!(sleeper.sleeps().len(), 1);
}
