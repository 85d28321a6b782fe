use super::*;
use serde_json::json;

fn builder(rows: usize) -> FormulaBuilder {
    FormulaBuilder::new(&SheetName::try_new("Sheet1").unwrap(), rows)
}

#[test]
fn test_column_refs_follow_main_order() {
    let b = builder(10);
    assert_eq!(b.column_ref(MainColumn::AdName), "'Sheet1'!A2:A11");
    assert_eq!(b.column_ref(MainColumn::Cost), "'Sheet1'!B2:B11");
    assert_eq!(b.column_ref(MainColumn::PerformanceGrade), "'Sheet1'!Y2:Y11");
    assert_eq!(b.block_ref(), "'Sheet1'!A2:Y11");
}

#[test]
fn test_sheet_name_quotes_escaped() {
    let b = FormulaBuilder::new(&SheetName::try_new("Bob's data").unwrap(), 1);
    assert_eq!(b.column_ref(MainColumn::AdName), "'Bob''s data'!A2:A2");
}

#[test]
fn test_empty_data_still_valid_range() {
    assert_eq!(builder(0).column_ref(MainColumn::Cost), "'Sheet1'!B2:B2");
}

#[test]
fn test_summary_formulas() {
    let grid = builder(3).summary_grid();
    assert_eq!(grid[1][1], json!("=COUNTA('Sheet1'!A2:A4)"));
    assert_eq!(grid[2][1], json!("=SUM('Sheet1'!B2:B4)"));
    assert!(grid
        .iter()
        .any(|r| r[1] == json!("=COUNTIF('Sheet1'!Y2:Y4,\"A\")")));
    assert!(grid
        .iter()
        .any(|r| r[1] == json!("=COUNTIF('Sheet1'!H2:H4,\"tiktok\")")));
}

#[test]
fn test_top_performers_formulas() {
    let grid = builder(5).top_performers_grid(2);
    assert_eq!(grid.len(), 3);
    assert_eq!(grid[0][1], json!("ad_name"));
    let cell = grid[2][1].as_str().unwrap();
    assert!(cell.starts_with("=IFERROR(INDEX(SORT(FILTER('Sheet1'!A2:Y6,"));
    assert!(cell.ends_with(",2,1),\"\")"));
    assert!(cell.contains(",23,TRUE)"));
}

#[test]
fn test_pivot_formulas() {
    let grid = builder(4).pivot_grid();
    assert_eq!(grid[0].len(), 5);
    // five known media types plus unknown
    assert_eq!(grid.len(), 7);
    let echo_aos = grid[1][1].as_str().unwrap();
    assert!(echo_aos.starts_with("=IFERROR(AVERAGEIFS('Sheet1'!O2:O5,"));
    assert!(echo_aos.contains("\"echo\""));
    assert!(echo_aos.contains("\"AOS\""));
    assert_eq!(
        grid[1][4],
        json!("=SUMIF('Sheet1'!H2:H5,\"echo\",'Sheet1'!B2:B5)")
    );
}
