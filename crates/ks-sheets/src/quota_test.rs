use super::*;
use chrono::TimeZone;

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()))
}

#[test]
fn test_store_counts_within_window() {
    let clock = clock();
    let store = InMemoryRateLimitStore::new(clock.clone());
    let hour = Duration::from_secs(3600);

    assert_eq!(store.get("a"), 0);
    assert_eq!(store.increment("a", hour), 1);
    assert_eq!(store.increment("a", hour), 2);
    assert_eq!(store.get("a"), 2);
    assert_eq!(store.get("b"), 0);
}

#[test]
fn test_store_window_expires() {
    let clock = clock();
    let store = InMemoryRateLimitStore::new(clock.clone());
    let hour = Duration::from_secs(3600);

    store.increment("a", hour);
    store.increment("a", hour);
    clock.advance(Duration::from_secs(3600));
    assert_eq!(store.get("a"), 0);
    assert_eq!(store.increment("a", hour), 1);
}

#[test]
fn test_store_expire_removes_key() {
    let store = InMemoryRateLimitStore::new(clock());
    store.increment("a", Duration::from_secs(60));
    store.expire("a");
    assert_eq!(store.get("a"), 0);
}

#[test]
fn test_guard_rejects_over_quota() {
    let clock = clock();
    let store = Arc::new(InMemoryRateLimitStore::new(clock.clone()));
    let guard = QuotaGuard::new(store, 2, Duration::from_secs(3600));

    guard.check("client").unwrap();
    guard.check("client").unwrap();
    assert_eq!(guard.remaining("client"), 0);
    let err = guard.check("client").unwrap_err();
    assert!(matches!(err, SheetsError::RateLimited(_)));

    // other clients are unaffected
    guard.check("other").unwrap();

    clock.advance(Duration::from_secs(3601));
    guard.check("client").unwrap();
}
