use super::*;

fn sheet(name: &str) -> SheetName {
    SheetName::try_new(name).unwrap()
}

#[test]
fn test_resolve_empty_fails() {
    let resolver = DestinationResolver::default();
    let err = resolver.resolve::<&str>(&[]).unwrap_err();
    assert!(matches!(err, CoreError::NoDestinationAvailable));
}

#[test]
fn test_resolve_blank_names_fail() {
    let err = DestinationResolver::default()
        .resolve(&["", "  "])
        .unwrap_err();
    assert!(matches!(err, CoreError::NoDestinationAvailable));
}

#[test]
fn test_resolve_prefers_default_name() {
    let map = DestinationResolver::default()
        .resolve(&["Sheet1", "Extra"])
        .unwrap();
    assert_eq!(map.main_data, "Sheet1");
    assert!(map.is_single());
    assert_eq!(map.pivot, "Sheet1");
}

#[test]
fn test_resolve_candidate_priority() {
    let map = DestinationResolver::default()
        .resolve(&["Sheet 1", "Sheet1", "시트1"])
        .unwrap();
    assert_eq!(map.main_data, "시트1");
}

#[test]
fn test_resolve_falls_back_to_first() {
    let map = DestinationResolver::default()
        .resolve(&["Campaigns", "Notes"])
        .unwrap();
    assert_eq!(map.main_data, "Campaigns");
}

#[test]
fn test_keyword_strategy() {
    let map = DestinationResolver::new(ResolveStrategy::Keyword)
        .resolve(&["Raw Data", "요약", "Top 10", "Notes"])
        .unwrap();
    assert_eq!(map.main_data, "Raw Data");
    assert_eq!(map.summary, "요약");
    assert_eq!(map.top_performers, "Top 10");
    // no pivot-like sheet, so pivot shares the main sheet
    assert_eq!(map.pivot, "Raw Data");
}

#[test]
fn test_derived_strategy() {
    let map = DestinationResolver::new(ResolveStrategy::Derived)
        .resolve(&["Sheet1"])
        .unwrap();
    assert_eq!(map.main_data, "Sheet1");
    assert_eq!(map.summary, "Sheet1_summary");
    assert_eq!(map.top_performers, "Sheet1_top_performers");
    assert_eq!(map.pivot, "Sheet1_pivot");
    assert!(!map.is_single());
}

#[test]
fn test_overrides_win() {
    let map = DestinationResolver::new(ResolveStrategy::Derived)
        .with_override(Role::Summary, sheet("Dashboard"))
        .resolve(&["Sheet1"])
        .unwrap();
    assert_eq!(map.summary, "Dashboard");
    assert_eq!(map.pivot, "Sheet1_pivot");
}

#[test]
fn test_main_override_needs_no_existing_sheets() {
    let map = DestinationResolver::default()
        .with_override(Role::MainData, sheet("Data"))
        .resolve::<&str>(&[])
        .unwrap();
    assert_eq!(map.top_performers, "Data");
}

#[test]
fn test_iter_follows_role_order() {
    let map = DestinationMap::single(sheet("Sheet1"));
    let roles: Vec<Role> = map.iter().map(|(role, _)| role).collect();
    assert_eq!(roles, Role::ORDER.to_vec());
}
