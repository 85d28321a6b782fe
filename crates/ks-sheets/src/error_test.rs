use super::*;

#[test]
fn test_from_remote_by_status() {
    assert!(matches!(
        SheetsError::from_remote(Some(400), "Missing sheetId"),
        SheetsError::Validation(_)
    ));
    assert!(matches!(
        SheetsError::from_remote(Some(401), "bad token"),
        SheetsError::Unauthorized(_)
    ));
    assert!(matches!(
        SheetsError::from_remote(Some(404), "Sheet not found: X"),
        SheetsError::NotFound(_)
    ));
    assert!(matches!(
        SheetsError::from_remote(Some(429), "slow down"),
        SheetsError::RateLimited(_)
    ));
    assert!(matches!(
        SheetsError::from_remote(Some(503), "unavailable"),
        SheetsError::Transient(_)
    ));
    assert!(matches!(
        SheetsError::from_remote(None, "boom"),
        SheetsError::Internal(_)
    ));
}

#[test]
fn test_already_exists_is_conflict_regardless_of_status() {
    let err = SheetsError::from_remote(Some(400), "Sheet already exists");
    assert_eq!(err, SheetsError::ProvisionConflict("Sheet already exists".into()));
}

#[test]
fn test_internal_message_truncated() {
    let long = "x".repeat(800);
    let err = SheetsError::from_remote(Some(500), &long);
    assert_eq!(err.message().len(), MAX_MESSAGE_LEN + 3);
    assert!(err.message().ends_with("..."));
}

#[test]
fn test_display_has_code() {
    let err = SheetsError::RateLimited("quota".into());
    assert_eq!(err.to_string(), "[S003] Rate limited: quota");
}
