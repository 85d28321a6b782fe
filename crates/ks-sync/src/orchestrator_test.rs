use super::*;
use chrono::TimeZone;
use ks_core::{
    compute_kpis, rank, CanonicalField, DestinationResolver, ResolveStrategy, Row, SpreadsheetId,
};
use ks_sheets::{ManualClock, MemoryWorkbook, RecordingSleeper, RetryPolicy, SheetsError};
use serde_json::json;

fn row(name: &str, cost: f64, installs: f64, d1: f64) -> Row {
    Row {
        ad_name: name.to_string(),
        cost,
        impressions: 1000.0,
        clicks: 50.0,
        installs,
        signups: 2.0,
        d1_retained_users: d1,
    }
}

fn sample() -> Dataset {
    rank(
        vec![
            row("echo_participation_aos", 100.0, 20.0, 10.0),
            row("ttcx_blinddate_img_ios", 300.0, 30.0, 5.0),
            row("meta_tpo_ios", 200.0, 40.0, 20.0),
        ]
        .into_iter()
        .map(compute_kpis)
        .collect(),
    )
}

fn started() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
}

fn sheet(name: &str) -> SheetName {
    SheetName::try_new(name).unwrap()
}

struct Harness {
    workbook: Arc<MemoryWorkbook>,
    sleeper: Arc<RecordingSleeper>,
    orchestrator: SyncOrchestrator,
}

fn harness(options: SyncOptions, policy: RetryPolicy) -> Harness {
    let workbook = Arc::new(MemoryWorkbook::new("wb"));
    let sleeper = Arc::new(RecordingSleeper::new());
    let client = ResilientClient::new(workbook.clone(), SpreadsheetId::try_new("wb").unwrap())
        .with_policy(policy)
        .with_sleeper(sleeper.clone());
    let orchestrator = SyncOrchestrator::new(client, options)
        .with_clock(Arc::new(ManualClock::new(started())));
    Harness {
        workbook,
        sleeper,
        orchestrator,
    }
}

fn default_harness() -> Harness {
    harness(SyncOptions::default(), RetryPolicy::new(3, Duration::ZERO))
}

fn derived() -> DestinationMap {
    DestinationResolver::new(ResolveStrategy::Derived)
        .resolve(&["Sheet1"])
        .unwrap()
}

fn create_count(workbook: &MemoryWorkbook) -> usize {
    workbook
        .access_log()
        .iter()
        .filter(|e| e.action == "create_sheet")
        .count()
}

#[tokio::test]
async fn test_sync_separate_sheets() {
    let h = default_harness();
    let dataset = sample();
    let report = h.orchestrator.sync(&dataset, &derived()).await;

    assert!(report.all_succeeded(), "{:?}", report.results);
    assert_eq!(report.rows, 3);
    assert_eq!(report.started_at, started());
    let roles: Vec<Role> = report.results.iter().map(|r| r.role).collect();
    assert_eq!(roles, Role::ORDER.to_vec());

    let kinds: Vec<Option<WriteKind>> = report.results.iter().map(|r| r.write).collect();
    assert_eq!(
        kinds,
        vec![
            Some(WriteKind::Overwrite),
            Some(WriteKind::UpdateRange),
            Some(WriteKind::UpdateRange),
            Some(WriteKind::Overwrite),
        ]
    );

    let main = h.workbook.sheet("Sheet1").unwrap();
    assert_eq!(main.len(), 4);
    assert!(main.iter().all(|r| r.len() == 25));
    assert_eq!(main, payload::main_data_grid(&dataset));
    assert_eq!(
        h.workbook.sheet("Sheet1_summary").unwrap(),
        payload::summary_grid(&dataset.summary(), started())
    );
    assert_eq!(
        h.workbook.sheet("Sheet1_top_performers").unwrap(),
        payload::top_performers_grid(&dataset, 10)
    );
    assert_eq!(
        h.workbook.sheet("Sheet1_pivot").unwrap(),
        payload::pivot_grid(&dataset)
    );
    assert_eq!(report.result(Role::MainData).unwrap().rows_affected, Some(4));
}

#[tokio::test]
async fn test_sync_single_sheet_appends_later_views() {
    let h = default_harness();
    let dataset = sample();
    let report = h
        .orchestrator
        .sync(&dataset, &DestinationMap::single(sheet("Sheet1")))
        .await;

    assert!(report.all_succeeded());
    assert_eq!(report.result(Role::MainData).unwrap().write, Some(WriteKind::Overwrite));
    for role in [Role::Summary, Role::TopPerformers, Role::Pivot] {
        assert_eq!(report.result(role).unwrap().write, Some(WriteKind::AppendRows));
    }

    let expected_rows = payload::main_data_grid(&dataset).len()
        + payload::summary_grid(&dataset.summary(), started()).len()
        + 1
        + payload::top_performers_grid(&dataset, 10).len()
        + 1
        + payload::pivot_grid(&dataset).len()
        + 1;
    let grid = h.workbook.sheet("Sheet1").unwrap();
    assert_eq!(grid.len(), expected_rows);
    // Separator row, then the summary header.
    assert!(grid[4].iter().all(|c| c == &json!("")));
    assert_eq!(grid[5][0], json!("Metric"));

    // One sheet, provisioned once.
    assert_eq!(create_count(&h.workbook), 1);
    assert_eq!(h.sleeper.sleeps(), vec![Duration::from_millis(500)]);
}

#[tokio::test]
async fn test_role_failure_does_not_stop_later_roles() {
    let h = default_harness();
    h.workbook
        .fail_sheet("Sheet1_summary", SheetsError::Transient("boom".to_string()));

    let report = h.orchestrator.sync(&sample(), &derived()).await;
    assert!(!report.all_succeeded());
    assert_eq!(report.failures().count(), 1);

    let summary = report.result(Role::Summary).unwrap();
    assert!(!summary.success);
    let error = summary.error.as_deref().unwrap();
    assert!(error.starts_with("provisioning failed"));
    assert!(error.contains("[S004]"));

    assert!(report.result(Role::MainData).unwrap().success);
    assert!(report.result(Role::TopPerformers).unwrap().success);
    assert!(report.result(Role::Pivot).unwrap().success);
    assert!(h.workbook.sheet("Sheet1_pivot").is_some());
}

#[tokio::test]
async fn test_existing_sheet_counts_as_provisioned() {
    let h = default_harness();
    h.workbook.fail_next(SheetsError::ProvisionConflict(
        "Sheet already exists: Sheet1".to_string(),
    ));

    let report = h
        .orchestrator
        .sync(&sample(), &DestinationMap::single(sheet("Sheet1")))
        .await;
    assert!(report.all_succeeded(), "{:?}", report.results);
}

#[tokio::test]
async fn test_provisioning_tries_once_more() {
    let h = harness(SyncOptions::default(), RetryPolicy::new(1, Duration::from_secs(1)));
    h.workbook.fail_next(SheetsError::Transient("reset".to_string()));

    let report = h
        .orchestrator
        .sync(&sample(), &DestinationMap::single(sheet("Sheet1")))
        .await;
    assert!(report.all_succeeded(), "{:?}", report.results);
    assert_eq!(
        h.sleeper.sleeps(),
        vec![Duration::from_millis(500), Duration::from_secs(1)]
    );
}

#[tokio::test]
async fn test_empty_dataset_leaves_main_data_unwritten() {
    let h = default_harness();
    let report = h
        .orchestrator
        .sync(&Dataset::default(), &DestinationMap::single(sheet("Sheet1")))
        .await;

    let main = report.result(Role::MainData).unwrap();
    assert!(!main.success);
    assert_eq!(main.error.as_deref(), Some("no rows to write"));

    // The sheet was never written, so the summary takes the primary write.
    let summary = report.result(Role::Summary).unwrap();
    assert!(summary.success);
    assert_eq!(summary.write, Some(WriteKind::UpdateRange));
    assert_eq!(report.result(Role::TopPerformers).unwrap().write, Some(WriteKind::AppendRows));
}

#[tokio::test]
async fn test_formula_mode_references_main_sheet() {
    let options = SyncOptions {
        mode: UpdateMode::Formula,
        ..SyncOptions::default()
    };
    let h = harness(options, RetryPolicy::new(3, Duration::ZERO));
    let dataset = sample();
    let report = h.orchestrator.sync(&dataset, &derived()).await;
    assert!(report.all_succeeded());
    assert_eq!(report.mode, UpdateMode::Formula);

    let formulas = FormulaBuilder::new(&sheet("Sheet1"), dataset.len());
    assert_eq!(
        h.workbook.sheet("Sheet1_summary").unwrap(),
        payload::rectangular(formulas.summary_grid())
    );
    assert_eq!(
        h.workbook.sheet("Sheet1_pivot").unwrap(),
        payload::rectangular(formulas.pivot_grid())
    );
    // The main sheet still holds literal values.
    assert_eq!(h.workbook.sheet("Sheet1").unwrap(), payload::main_data_grid(&dataset));
}

#[tokio::test]
async fn test_backup_runs_before_writes() {
    let options = SyncOptions {
        backup: true,
        ..SyncOptions::default()
    };
    let h = harness(options, RetryPolicy::new(3, Duration::ZERO));
    let previous = vec![vec![json!("ad_name")], vec![json!("old_ad")]];
    h.orchestrator
        .client()
        .overwrite(&sheet("Sheet1"), previous.clone())
        .await
        .unwrap();

    let report = h.orchestrator.sync(&sample(), &derived()).await;
    let backup = report.backup.unwrap();
    assert!(backup.success);
    assert_eq!(backup.target, "backup_20240501_093000");
    assert_eq!(h.workbook.sheet("backup_20240501_093000").unwrap(), previous);
    assert_eq!(h.workbook.sheet("Sheet1").unwrap().len(), 4);
}

#[tokio::test]
async fn test_report_serializes_roles() {
    let h = default_harness();
    let report = h.orchestrator.sync(&sample(), &derived()).await;
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["mode"], json!("direct"));
    assert_eq!(value["results"][0]["role"], json!("main_data"));
    assert_eq!(value["results"][0]["write"], json!("overwrite"));
    assert_eq!(value["results"][3]["sheet"], json!("Sheet1_pivot"));
    assert!(value["backup"].is_null());
    assert_eq!(value["warnings"], json!([]));
}

#[tokio::test]
async fn test_report_carries_normalize_warnings() {
    let h = default_harness();
    let report = h
        .orchestrator
        .sync(&sample(), &derived())
        .await
        .with_warnings(vec![NormalizeWarning {
            row: 1,
            field: CanonicalField::Clicks,
            value: "oops".to_string(),
        }]);

    assert_eq!(report.warnings.len(), 1);
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["warnings"][0]["row"], json!(1));
    assert_eq!(value["warnings"][0]["field"], json!("clicks"));
    assert_eq!(value["warnings"][0]["value"], json!("oops"));
}

#[tokio::test]
async fn test_failed_provisioning_is_retried_by_next_role() {
    let h = harness(SyncOptions::default(), RetryPolicy::new(1, Duration::ZERO));
    // Both the first create and the extra attempt for main_data fail.
    h.workbook
        .fail_next(SheetsError::Transient("blip 1".to_string()));
    h.workbook
        .fail_next(SheetsError::Transient("blip 2".to_string()));

    let report = h
        .orchestrator
        .sync(&sample(), &DestinationMap::single(sheet("Sheet1")))
        .await;

    let main = report.result(Role::MainData).unwrap();
    assert!(!main.success);
    assert!(main
        .error
        .as_deref()
        .unwrap()
        .starts_with("provisioning failed"));

    // The summary provisions the sheet itself and takes the primary write.
    let summary = report.result(Role::Summary).unwrap();
    assert!(summary.success, "{:?}", summary);
    assert_eq!(summary.write, Some(WriteKind::UpdateRange));
    assert_eq!(report.result(Role::TopPerformers).unwrap().write, Some(WriteKind::AppendRows));
    assert!(report.result(Role::Pivot).unwrap().success);
    assert_eq!(report.failures().count(), 1);

    // Two failed creates, one successful create, three writes.
    assert_eq!(h.workbook.request_count(), 6);
    assert_eq!(create_count(&h.workbook), 1);
}

#[tokio::test]
async fn test_appended_rows_exclude_separator() {
    let h = default_harness();
    let dataset = sample();
    let report = h
        .orchestrator
        .sync(&dataset, &DestinationMap::single(sheet("Sheet1")))
        .await;

    assert_eq!(
        report.result(Role::Summary).unwrap().rows_affected,
        Some(payload::summary_grid(&dataset.summary(), started()).len())
    );
    assert_eq!(
        report.result(Role::Pivot).unwrap().rows_affected,
        Some(payload::pivot_grid(&dataset).len())
    );
}
