//! Contract Test: Failure Transparency
//!
//! Verifies that resolution failures never leak into the cache or stop the loop.
//!
//! Constraints verified:
//! - A failed tick leaves the last good address in place
//! - A resolver that never succeeds leaves the cache unset
//! - The loop keeps ticking through any number of failures
//!
//! If this test fails, someone has made failures fatal or destructive.

mod common;

use common::*;
use myip_core::IpWatcher;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;

#[tokio::test]
async fn failed_tick_keeps_last_good_address() {
    let a = ip("198.51.100.77");
    let resolver = Arc::new(ScriptedResolver::new(vec![Some(a), None, None, None]));

    let watcher = IpWatcher::new(resolver.clone()).with_interval(FAST_TICK);
    let handle = watcher.start(None);

    wait_until(Duration::from_secs(2), || resolver.calls() >= 4).await;
    assert_eq!(watcher.address(), Some(a));

    assert_ok!(handle.stop().await);
}

#[tokio::test]
async fn always_failing_resolver_keeps_loop_alive() {
    let resolver = Arc::new(ScriptedResolver::failing());

    let watcher = IpWatcher::new(resolver.clone()).with_interval(FAST_TICK);
    let (callback, mut fired) = recording_callback();
    let handle = watcher.start(Some(callback));

    wait_until(Duration::from_secs(2), || resolver.calls() >= 5).await;

    assert!(!handle.is_finished(), "failures must not end the loop");
    assert_eq!(watcher.address(), None);
    assert!(fired.try_recv().is_err());

    assert_ok!(handle.stop().await);
}

#[tokio::test]
async fn recovery_after_failures_is_a_single_change() {
    let a = ip("198.51.100.1");
    let resolver = Arc::new(ScriptedResolver::new(vec![None, None, Some(a), Some(a)]));

    let watcher = IpWatcher::new(resolver.clone()).with_interval(FAST_TICK);
    let (callback, mut fired) = recording_callback();
    let handle = watcher.start(Some(callback));

    assert_eq!(next_firing(&mut fired).await, (None, a));

    wait_until(Duration::from_secs(2), || resolver.calls() >= 6).await;
    assert_ok!(handle.stop().await);

    assert!(fired.try_recv().is_err());
    assert_eq!(watcher.address(), Some(a));
}
