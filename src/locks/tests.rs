//! Tests for the locks subsystem.

use super::*;
use crate::error::ActionLockError;
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

fn new_map(ttl_ms: u64) -> Arc<ExpirationMap> {
    Arc::new(ExpirationMap::new(Duration::from_millis(ttl_ms)))
}

// ============================================================================
// LockMetadata
// ============================================================================

#[test]
fn test_lock_metadata_creation() {
    let meta = LockMetadata::new("action-1");

    assert!(!meta.owner.is_empty());
    assert_eq!(meta.holder, "action-1");
    assert!(meta.renewed_at.is_none());
    assert!(meta.age().num_minutes() < 1);
}

#[test]
fn test_lock_metadata_age_string() {
    let mut meta = LockMetadata::new("test");
    assert!(meta.age_string().ends_with('s'));

    meta.created_at = Utc::now() - ChronoDuration::minutes(5);
    assert!(meta.age_string().starts_with("5m"));

    meta.created_at = Utc::now() - ChronoDuration::hours(2);
    assert!(meta.age_string().starts_with("2h"));
}

#[test]
fn test_lock_metadata_touch_records_renewal() {
    let mut meta = LockMetadata::new("test");
    meta.touch();
    assert!(meta.renewed_at.is_some());
}

#[test]
fn test_get_owner_string() {
    let owner = metadata::get_owner_string();
    assert!(owner.contains('@'));
}

// ============================================================================
// ExpirationMap
// ============================================================================

#[test]
fn test_acquire_same_key_twice_fails() {
    let map = new_map(10_000);

    assert!(map.acquire("k", LockMetadata::new("first")));
    assert!(!map.acquire("k", LockMetadata::new("second")));
    assert!(map.is_held("k"));

    assert!(map.release("k"));
    assert!(map.acquire("k", LockMetadata::new("third")));
}

#[test]
fn test_zero_ttl_is_raised_to_minimum() {
    let map = ExpirationMap::new(Duration::ZERO);
    assert_eq!(map.ttl(), expiration_map::MIN_TTL);
    assert!(map.ttl() > Duration::ZERO);
}

#[test]
fn test_distinct_keys_do_not_contend() {
    let map = new_map(10_000);

    assert!(map.acquire("a", LockMetadata::new("one")));
    assert!(map.acquire("b", LockMetadata::new("two")));
    assert_eq!(map.len(), 2);
}

#[test]
fn test_release_is_idempotent() {
    let map = new_map(10_000);

    assert!(!map.release("missing"));

    map.acquire("k", LockMetadata::new("h"));
    assert!(map.release("k"));
    assert!(!map.release("k"));
    assert!(map.is_empty());
}

#[test]
fn test_expired_entry_is_reclaimed_on_acquire() {
    let map = new_map(50);

    assert!(map.acquire("X", LockMetadata::new("crashed-holder")));
    assert!(!map.acquire("X", LockMetadata::new("early")));

    thread::sleep(Duration::from_millis(80));

    assert!(!map.is_held("X"));
    assert!(map.acquire("X", LockMetadata::new("late")));
    let locks = map.list();
    assert_eq!(locks.len(), 1);
    assert_eq!(locks[0].metadata.holder, "late");
}

#[test]
fn test_renew_extends_live_entry() {
    let map = new_map(100);

    map.acquire("k", LockMetadata::new("h"));
    thread::sleep(Duration::from_millis(60));
    assert!(map.renew("k"));
    thread::sleep(Duration::from_millis(60));

    // 120ms after acquisition but only 60ms after renewal.
    assert!(map.is_held("k"));
    assert!(map.list()[0].metadata.renewed_at.is_some());
}

#[test]
fn test_renew_absent_or_expired_fails() {
    let map = new_map(30);

    assert!(!map.renew("missing"));

    map.acquire("k", LockMetadata::new("h"));
    thread::sleep(Duration::from_millis(50));
    assert!(!map.renew("k"));
}

#[test]
fn test_purge_expired_removes_only_expired() {
    let map = new_map(40);

    map.acquire("old-b", LockMetadata::new("h"));
    map.acquire("old-a", LockMetadata::new("h"));
    thread::sleep(Duration::from_millis(60));
    map.acquire("fresh", LockMetadata::new("h"));

    let purged = map.purge_expired();
    assert_eq!(purged, vec!["old-a".to_string(), "old-b".to_string()]);
    assert_eq!(map.len(), 1);
    assert!(map.is_held("fresh"));
}

#[test]
fn test_list_is_sorted_and_skips_expired() {
    let map = new_map(10_000);

    map.acquire("zeta", LockMetadata::new("z"));
    map.acquire("alpha", LockMetadata::new("a"));

    let keys: Vec<String> = map.list().into_iter().map(|l| l.key).collect();
    assert_eq!(keys, vec!["alpha".to_string(), "zeta".to_string()]);

    let short = new_map(20);
    short.acquire("gone", LockMetadata::new("g"));
    thread::sleep(Duration::from_millis(40));
    assert!(short.list().is_empty());
    assert_eq!(short.len(), 1);
}

#[test]
fn test_lock_info_display() {
    let map = new_map(10_000);
    map.acquire("ReplicaSet-ns1/web", LockMetadata::new("action-7"));

    let display = format!("{}", map.list()[0]);
    assert!(display.contains("ReplicaSet-ns1/web"));
    assert!(display.contains("holder: action-7"));
    assert!(display.contains("expires in"));
}

#[test]
fn test_concurrent_acquire_grants_single_holder() {
    let map = new_map(10_000);
    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));
    let winners = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let map = Arc::clone(&map);
            let barrier = Arc::clone(&barrier);
            let winners = Arc::clone(&winners);
            thread::spawn(move || {
                barrier.wait();
                if map.acquire("shared", LockMetadata::new(&format!("t{}", i))) {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(winners.load(Ordering::SeqCst), 1);
}

// ============================================================================
// LockHelper
// ============================================================================

#[test]
fn test_helper_rejects_empty_key() {
    let map = new_map(1_000);

    let err = LockHelper::new("", Arc::clone(&map)).unwrap_err();
    assert!(matches!(err, ActionLockError::InvalidKey(_)));

    let err = LockHelper::new("   ", map).unwrap_err();
    assert!(matches!(err, ActionLockError::InvalidKey(_)));
}

#[test]
fn test_helper_lock_and_release() {
    let map = new_map(10_000);
    let mut helper = LockHelper::new("k", Arc::clone(&map))
        .unwrap()
        .with_holder("action-1");

    assert!(!helper.is_locked());
    helper
        .try_lock(Duration::from_millis(100), Duration::from_millis(10))
        .unwrap();
    assert!(helper.is_locked());
    assert_eq!(helper.attempts(), 1);
    assert_eq!(map.list()[0].metadata.holder, "action-1");

    helper.release();
    assert!(!helper.is_locked());
    assert!(!map.is_held("k"));

    // Second release is a no-op.
    helper.release();
    assert!(!map.is_held("k"));
}

#[test]
fn test_helper_release_does_not_touch_unheld_key() {
    let map = new_map(10_000);
    map.acquire("k", LockMetadata::new("other"));

    let mut helper = LockHelper::new("k", Arc::clone(&map)).unwrap();
    helper.release();
    drop(helper);

    assert!(map.is_held("k"));
}

#[test]
fn test_helper_drop_releases() {
    let map = new_map(10_000);
    {
        let mut helper = LockHelper::new("k", Arc::clone(&map)).unwrap();
        helper
            .try_lock(Duration::from_millis(100), Duration::from_millis(10))
            .unwrap();
        assert!(map.is_held("k"));
    }
    assert!(!map.is_held("k"));
}

#[test]
fn test_try_lock_times_out_within_one_poll_interval() {
    let map = new_map(60_000);
    let mut holder = LockHelper::new("Y", Arc::clone(&map)).unwrap();
    holder
        .try_lock(Duration::from_millis(10), Duration::from_millis(1))
        .unwrap();

    let timeout = Duration::from_millis(300);
    let poll = Duration::from_millis(100);
    let mut waiter = LockHelper::new("Y", Arc::clone(&map)).unwrap();

    let start = Instant::now();
    let err = waiter.try_lock(timeout, poll).unwrap_err();
    let elapsed = start.elapsed();

    match err {
        ActionLockError::LockTimeout { key, waited } => {
            assert_eq!(key, "Y");
            assert_eq!(waited, timeout);
        }
        other => panic!("expected LockTimeout, got {:?}", other),
    }
    assert!(elapsed >= timeout, "returned early after {:?}", elapsed);
    // One poll interval of slack plus scheduler jitter.
    assert!(
        elapsed < timeout + poll + Duration::from_millis(100),
        "returned late after {:?}",
        elapsed
    );
    // Initial attempt plus one after each of the three poll intervals.
    assert_eq!(waiter.attempts(), 4);
    assert!(!waiter.is_locked());
    assert!(holder.is_locked());
    assert!(map.is_held("Y"));
}

#[test]
fn test_try_lock_with_zero_timeout_tries_once() {
    let map = new_map(60_000);
    map.acquire("k", LockMetadata::new("other"));

    let mut helper = LockHelper::new("k", map).unwrap();
    let result = helper.try_lock(Duration::ZERO, Duration::from_millis(10));

    assert!(matches!(result, Err(ActionLockError::LockTimeout { .. })));
    assert_eq!(helper.attempts(), 1);
}

#[test]
fn test_try_lock_wakes_on_release() {
    let map = new_map(60_000);
    let mut holder = LockHelper::new("k", Arc::clone(&map)).unwrap();
    holder
        .try_lock(Duration::from_millis(10), Duration::from_millis(1))
        .unwrap();

    let releaser = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        holder.release();
    });

    let mut waiter = LockHelper::new("k", Arc::clone(&map)).unwrap();
    let start = Instant::now();
    waiter
        .try_lock(Duration::from_secs(5), Duration::from_secs(2))
        .unwrap();

    // Woken by the release rather than the 2s poll interval.
    assert!(start.elapsed() < Duration::from_secs(1));
    assert!(waiter.is_locked());
    releaser.join().unwrap();
}

#[test]
fn test_try_lock_succeeds_after_holder_expires() {
    let map = new_map(100);
    // A holder that never releases.
    map.acquire("k", LockMetadata::new("hung"));

    let mut waiter = LockHelper::new("k", Arc::clone(&map)).unwrap();
    waiter
        .try_lock(Duration::from_secs(2), Duration::from_millis(20))
        .unwrap();

    assert!(waiter.is_locked());
    assert!(waiter.attempts() > 1);
}

#[test]
fn test_try_lock_when_already_locked_is_noop() {
    let map = new_map(60_000);
    let mut helper = LockHelper::new("k", map).unwrap();
    helper
        .try_lock(Duration::from_millis(10), Duration::from_millis(1))
        .unwrap();
    helper
        .try_lock(Duration::from_millis(10), Duration::from_millis(1))
        .unwrap();
    assert!(helper.is_locked());
}

#[test]
fn test_contending_helpers_never_overlap() {
    let map = new_map(60_000);
    let inside = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let map = Arc::clone(&map);
            let inside = Arc::clone(&inside);
            let completed = Arc::clone(&completed);
            thread::spawn(move || {
                let mut helper = LockHelper::new("ReplicaSet-ns1/web", map)
                    .unwrap()
                    .with_holder(format!("action-{}", i));
                helper
                    .try_lock(Duration::from_secs(10), Duration::from_millis(5))
                    .unwrap();

                assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                thread::sleep(Duration::from_millis(5));
                inside.fetch_sub(1, Ordering::SeqCst);

                helper.release();
                completed.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(completed.load(Ordering::SeqCst), 8);
    assert!(map.is_empty());
}

#[test]
fn test_keep_renew_outlives_ttl() {
    let map = new_map(60);
    let mut helper = LockHelper::new("k", Arc::clone(&map)).unwrap();
    helper
        .try_lock(Duration::from_millis(10), Duration::from_millis(1))
        .unwrap();
    helper.keep_renew();

    thread::sleep(Duration::from_millis(200));
    assert!(map.is_held("k"));
    assert!(!map.acquire("k", LockMetadata::new("intruder")));

    helper.release();
    assert!(!map.is_held("k"));
}

#[test]
fn test_expired_helper_does_not_release_successor() {
    let map = new_map(50);
    let mut first = LockHelper::new("k", Arc::clone(&map))
        .unwrap()
        .with_holder("first");
    first
        .try_lock(Duration::from_millis(10), Duration::from_millis(1))
        .unwrap();

    thread::sleep(Duration::from_millis(80));
    assert!(!first.is_locked());

    let mut second = LockHelper::new("k", Arc::clone(&map))
        .unwrap()
        .with_holder("second");
    second
        .try_lock(Duration::from_millis(10), Duration::from_millis(1))
        .unwrap();

    first.release();

    assert!(second.is_locked());
    assert!(!map.acquire("k", LockMetadata::new("third")));
    assert_eq!(map.list()[0].metadata.holder, "second");
}

#[test]
fn test_keep_renew_without_lock_is_noop() {
    let map = new_map(30);
    let mut helper = LockHelper::new("k", Arc::clone(&map)).unwrap();
    helper.keep_renew();

    thread::sleep(Duration::from_millis(50));
    assert!(map.is_empty());
    helper.release();
}
