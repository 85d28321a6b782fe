use super::*;
use crate::operation::Operation;
use crate::quota::{InMemoryRateLimitStore, ManualClock};
use chrono::TimeZone;
use ks_core::{SheetName, SpreadsheetId};
use serde_json::json;
use std::time::Duration;

fn id() -> SpreadsheetId {
    SpreadsheetId::try_new("wb-1").unwrap()
}

fn sheet(name: &str) -> SheetName {
    SheetName::try_new(name).unwrap()
}

fn send(wb: &MemoryWorkbook, op: Operation) -> SheetsResult<ApiResponse> {
    wb.handle(&op.to_request(&id()))?.into_result(None)
}

#[test]
fn test_default_sheet() {
    let wb = MemoryWorkbook::new("wb-1");
    assert_eq!(wb.sheet_names(), vec!["Sheet1"]);
    assert_eq!(wb.sheet("Sheet1"), Some(Vec::new()));
}

#[test]
fn test_overwrite_then_read() {
    let wb = MemoryWorkbook::new("wb-1");
    send(
        &wb,
        Operation::Overwrite {
            sheet: sheet("Sheet1"),
            values: vec![vec![json!("a"), json!("b")], vec![json!(1)]],
        },
    )
    .unwrap();

    let read = send(&wb, Operation::Read { sheet: sheet("Sheet1") }).unwrap();
    assert_eq!(read.rows, Some(2));
    assert_eq!(read.columns, Some(2));
    // short rows are padded
    assert_eq!(read.data.unwrap()[1], vec![json!(1), json!("")]);
}

#[test]
fn test_update_range_places_values() {
    let wb = MemoryWorkbook::new("wb-1");
    send(
        &wb,
        Operation::UpdateRange {
            sheet: sheet("Sheet1"),
            range: "B2:C2".to_string(),
            values: vec![vec![json!("x"), json!("y")]],
        },
    )
    .unwrap();
    let grid = wb.sheet("Sheet1").unwrap();
    assert_eq!(grid.len(), 2);
    assert_eq!(grid[1], vec![json!(""), json!("x"), json!("y")]);
}

#[test]
fn test_update_rejects_data_larger_than_range() {
    let wb = MemoryWorkbook::new("wb-1");
    let err = send(
        &wb,
        Operation::UpdateRange {
            sheet: sheet("Sheet1"),
            range: "A1:A1".to_string(),
            values: vec![vec![json!(1), json!(2)]],
        },
    )
    .unwrap_err();
    assert!(matches!(err, SheetsError::Validation(_)));
}

#[test]
fn test_append_and_clear() {
    let wb = MemoryWorkbook::new("wb-1");
    let rows = vec![vec![json!("r1")], vec![json!("r2")]];
    let resp = send(
        &wb,
        Operation::AppendRows {
            sheet: sheet("Sheet1"),
            rows: rows.clone(),
        },
    )
    .unwrap();
    assert_eq!(resp.rows, Some(2));
    send(
        &wb,
        Operation::AppendRows {
            sheet: sheet("Sheet1"),
            rows,
        },
    )
    .unwrap();
    assert_eq!(wb.sheet("Sheet1").unwrap().len(), 4);

    send(
        &wb,
        Operation::Clear {
            sheet: sheet("Sheet1"),
            range: Some("A1:A1".to_string()),
        },
    )
    .unwrap();
    assert_eq!(wb.sheet("Sheet1").unwrap()[0], vec![json!("")]);

    send(
        &wb,
        Operation::Clear {
            sheet: sheet("Sheet1"),
            range: None,
        },
    )
    .unwrap();
    assert!(wb.sheet("Sheet1").unwrap().is_empty());
}

#[test]
fn test_create_sheet_idempotent() {
    let wb = MemoryWorkbook::new("wb-1");
    let first = send(&wb, Operation::CreateSheet { sheet: sheet("Summary") }).unwrap();
    assert!(first.message.unwrap().contains("created"));
    let second = send(&wb, Operation::CreateSheet { sheet: sheet("Summary") }).unwrap();
    assert!(second.message.unwrap().contains("already exists"));
    assert_eq!(wb.sheet_names(), vec!["Sheet1", "Summary"]);
}

#[test]
fn test_list_sheets() {
    let wb = MemoryWorkbook::with_sheets("wb-1", ["시트1", "Notes"]);
    let resp = send(&wb, Operation::ListSheets).unwrap();
    assert_eq!(resp.sheet_names.unwrap(), vec!["시트1", "Notes"]);
    assert_eq!(resp.count, Some(2));
}

#[test]
fn test_unknown_sheet_is_404() {
    let wb = MemoryWorkbook::new("wb-1");
    let err = send(&wb, Operation::Read { sheet: sheet("Missing") }).unwrap_err();
    assert!(matches!(err, SheetsError::NotFound(_)));
}

#[test]
fn test_wrong_spreadsheet_is_404() {
    let wb = MemoryWorkbook::new("other");
    let err = send(&wb, Operation::ListSheets).unwrap_err();
    assert!(matches!(err, SheetsError::NotFound(_)));
}

#[test]
fn test_missing_parameters_are_400() {
    let wb = MemoryWorkbook::new("wb-1");

    let no_id = WireRequest {
        method: Method::Get,
        params: vec![("sheetName".to_string(), "Sheet1".to_string())],
        body: None,
    };
    let resp = wb.handle(&no_id).unwrap();
    assert_eq!(resp.status_code, Some(400));

    let bad_action = WireRequest {
        method: Method::Post,
        params: Vec::new(),
        body: Some(PostBody {
            sheet_id: "wb-1".to_string(),
            sheet_name: None,
            action: "delete".to_string(),
            data: None,
            range: None,
        }),
    };
    let resp = wb.handle(&bad_action).unwrap();
    assert_eq!(resp.status_code, Some(400));
    assert_eq!(resp.error.as_deref(), Some("Invalid action: delete"));

    let no_range = WireRequest {
        method: Method::Post,
        params: Vec::new(),
        body: Some(PostBody {
            sheet_id: "wb-1".to_string(),
            sheet_name: Some("Sheet1".to_string()),
            action: "update".to_string(),
            data: Some(vec![vec![json!(1)]]),
            range: None,
        }),
    };
    let resp = wb.handle(&no_range).unwrap();
    assert_eq!(resp.error.as_deref(), Some("update requires range"));
}

#[test]
fn test_token_allow_list() {
    let wb = MemoryWorkbook::new("wb-1").require_tokens(["good"]);
    let mut req = Operation::ListSheets.to_request(&id());
    assert_eq!(wb.handle(&req).unwrap().status_code, Some(401));

    req.push_param("token", "good");
    assert!(wb.handle(&req).unwrap().is_success());
}

#[test]
fn test_api_key_required() {
    let wb = MemoryWorkbook::new("wb-1").require_api_key("k");
    let mut req = Operation::ListSheets.to_request(&id());
    req.push_param("apiKey", "wrong");
    let err = wb.handle(&req).unwrap().into_result(None).unwrap_err();
    assert!(matches!(err, SheetsError::Unauthorized(_)));
}

#[test]
fn test_quota_returns_429() {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
    ));
    let store = Arc::new(InMemoryRateLimitStore::new(clock.clone()));
    let wb = MemoryWorkbook::new("wb-1")
        .with_clock(clock.clone())
        .with_quota(QuotaGuard::new(store, 1, Duration::from_secs(3600)));

    send(&wb, Operation::ListSheets).unwrap();
    let err = send(&wb, Operation::ListSheets).unwrap_err();
    assert!(matches!(err, SheetsError::RateLimited(_)));

    clock.advance(Duration::from_secs(3600));
    send(&wb, Operation::ListSheets).unwrap();
}

#[test]
fn test_access_log_records_reads_and_writes() {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
    ));
    let wb = MemoryWorkbook::new("wb-1").with_clock(clock);
    send(&wb, Operation::Read { sheet: sheet("Sheet1") }).unwrap();
    send(
        &wb,
        Operation::AppendRows {
            sheet: sheet("Sheet1"),
            rows: vec![vec![json!(1)]],
        },
    )
    .unwrap();

    let log = wb.access_log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].action, "read");
    assert_eq!(log[1].action, "append");
    assert_eq!(log[1].client, ANONYMOUS_CLIENT);
    assert_eq!(log[1].sheet_name.as_deref(), Some("Sheet1"));
    assert_eq!(log[1].timestamp.to_rfc3339(), "2024-05-01T12:30:00+00:00");
}

#[test]
fn test_fault_injection() {
    let wb = MemoryWorkbook::new("wb-1");
    wb.fail_next(SheetsError::Transient("reset".into()));
    assert!(send(&wb, Operation::ListSheets).is_err());
    assert!(send(&wb, Operation::ListSheets).is_ok());

    wb.fail_sheet("Sheet1", SheetsError::Internal("broken".into()));
    assert!(send(&wb, Operation::Read { sheet: sheet("Sheet1") }).is_err());
    wb.clear_faults();
    assert!(send(&wb, Operation::Read { sheet: sheet("Sheet1") }).is_ok());
    assert_eq!(wb.request_count(), 4);
}
