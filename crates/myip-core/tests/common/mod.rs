//! Test doubles and common utilities for watcher contract tests
//!
//! This module provides minimal resolvers and callbacks that record what the
//! refresh loop does without touching the network.

#![allow(dead_code)]

use myip_core::error::{Error, Result};
use myip_core::{ChangeCallback, Resolver};
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Interval short enough to run many ticks per test
pub const FAST_TICK: Duration = Duration::from_millis(10);

/// A resolver that replays a script
///
/// `Some(ip)` entries succeed, `None` entries fail with a transport error.
/// Once the script is exhausted every call fails.
pub struct ScriptedResolver {
    script: Mutex<VecDeque<Option<IpAddr>>>,
    calls: AtomicUsize,
}

impl ScriptedResolver {
    pub fn new(script: Vec<Option<IpAddr>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A resolver that fails on every call
    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    /// Number of times resolve() was called
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Resolver for ScriptedResolver {
    async fn resolve(&self) -> Result<IpAddr> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.script.lock().unwrap().pop_front() {
            Some(Some(ip)) => Ok(ip),
            Some(None) => Err(Error::transport("scripted", "connection refused")),
            None => Err(Error::transport("scripted", "script exhausted")),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// A resolver that always returns the same address
pub struct FixedResolver {
    ip: IpAddr,
    calls: AtomicUsize,
}

impl FixedResolver {
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Resolver for FixedResolver {
    async fn resolve(&self) -> Result<IpAddr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.ip)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// A resolver whose requests never complete
pub struct HangingResolver {
    calls: AtomicUsize,
}

impl HangingResolver {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Resolver for HangingResolver {
    async fn resolve(&self) -> Result<IpAddr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }

    fn name(&self) -> &str {
        "hanging"
    }
}

/// A callback that forwards every firing to a channel
pub fn recording_callback() -> (ChangeCallback, mpsc::UnboundedReceiver<(Option<IpAddr>, IpAddr)>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let callback: ChangeCallback = Arc::new(move |previous: Option<IpAddr>, current: IpAddr| {
        let _ = tx.send((previous, current));
    });
    (callback, rx)
}

/// Receive the next callback firing, failing the test after a second
pub async fn next_firing(
    rx: &mut mpsc::UnboundedReceiver<(Option<IpAddr>, IpAddr)>,
) -> (Option<IpAddr>, IpAddr) {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("callback fires within a second")
        .expect("callback channel open")
}

/// Poll `condition` until it holds, failing the test after `limit`
pub async fn wait_until(limit: Duration, mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + limit;
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within {:?}",
            limit
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

pub fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}
