use super::*;

fn export_row(pairs: &[(&str, &str)]) -> RawRow {
    RawRow::from_pairs(pairs.iter().copied())
}

#[test]
fn test_normalize_adapted_headers() {
    let mut normalizer = RowNormalizer::new(ColumnMap::default());
    let row = normalizer.normalize(&export_row(&[
        ("Ad", "echo_participation_vdo_01"),
        ("Cost (sum)", "$1,234.50"),
        ("Impressions (sum)", "10,000"),
        ("Clicks (sum)", "250"),
        ("Installs (sum)", "40"),
        ("Unique Users - etc_sign_up (sum)", "12"),
        ("Retention Day 01 (sum)", "8"),
    ]));

    assert_eq!(row.ad_name, "echo_participation_vdo_01");
    assert_eq!(row.cost, 1234.5);
    assert_eq!(row.impressions, 10_000.0);
    assert_eq!(row.clicks, 250.0);
    assert_eq!(row.installs, 40.0);
    assert_eq!(row.signups, 12.0);
    assert_eq!(row.d1_retained_users, 8.0);
    assert!(normalizer.warnings().is_empty());
}

#[test]
fn test_missing_fields_default_to_zero() {
    let mut normalizer = RowNormalizer::new(ColumnMap::default());
    let row = normalizer.normalize(&export_row(&[("Ad Name", "x"), ("Cost", "10")]));

    assert_eq!(row.cost, 10.0);
    assert_eq!(row.clicks, 0.0);
    assert_eq!(row.installs, 0.0);
    assert_eq!(row.d1_retained_users, 0.0);
}

#[test]
fn test_unmapped_columns_are_dropped() {
    let mut normalizer = RowNormalizer::new(ColumnMap::default());
    let row = normalizer.normalize(&export_row(&[
        ("Campaign", "should be ignored"),
        ("cost", "3"),
    ]));

    assert_eq!(row, Row { cost: 3.0, ..Row::default() });
}

#[test]
fn test_unparsable_value_warns_and_continues() {
    let mut normalizer = RowNormalizer::new(ColumnMap::default());
    let first = normalizer.normalize(&export_row(&[("Ad", "a"), ("Clicks", "lots")]));
    let second = normalizer.normalize(&export_row(&[("Ad", "b"), ("Clicks", "7")]));

    assert_eq!(first.clicks, 0.0);
    assert_eq!(second.clicks, 7.0);

    let warnings = normalizer.into_warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].row, 0);
    assert_eq!(warnings[0].field, CanonicalField::Clicks);
    assert_eq!(warnings[0].value, "lots");
    assert!(warnings[0].to_string().contains("row 1"));
}

#[test]
fn test_empty_cell_is_zero_without_warning() {
    let mut normalizer = RowNormalizer::new(ColumnMap::default());
    let row = normalizer.normalize(&export_row(&[("Installs", "  ")]));
    assert_eq!(row.installs, 0.0);
    assert!(normalizer.warnings().is_empty());
}

#[test]
fn test_non_finite_values_are_rejected() {
    assert_eq!(parse_numeric("NaN"), None);
    assert_eq!(parse_numeric("inf"), None);
    assert_eq!(parse_numeric("-12.5"), Some(-12.5));
}

#[test]
fn test_leftmost_duplicate_mapping_wins() {
    let mut normalizer = RowNormalizer::new(ColumnMap::default());
    let row = normalizer.normalize(&export_row(&[("Cost (sum)", "5"), ("Cost", "9")]));
    assert_eq!(row.cost, 5.0);
}

#[test]
fn test_column_overrides() {
    let mut overrides = HashMap::new();
    overrides.insert("Spend".to_string(), CanonicalField::Cost);
    let mut normalizer = RowNormalizer::new(ColumnMap::with_overrides(&overrides));
    let row = normalizer.normalize(&export_row(&[("Spend", "42")]));
    assert_eq!(row.cost, 42.0);
}

#[test]
fn test_raw_table_strips_bom_and_pads() {
    let table = RawTable {
        headers: vec!["\u{feff}Ad".to_string(), "Clicks".to_string()],
        rows: vec![vec!["solo".to_string()]],
    };
    let mut normalizer = RowNormalizer::new(ColumnMap::default());
    let rows = normalizer.normalize_table(&table);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].ad_name, "solo");
    assert_eq!(rows[0].clicks, 0.0);
}
