//! Public IP refresh loop
//!
//! The IpWatcher is responsible for:
//! - Periodically invoking a Resolver
//! - Keeping the last good address in an AddressCache
//! - Detecting transitions against the loop's own snapshot
//! - Notifying the change callback and stream subscribers
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Resolver   │◄── resolve() every tick
//! └─────────────┘
//!        │ IpAddr / Error
//!        ▼
//! ┌──────────────┐   set/get   ┌──────────────┐
//! │  IpWatcher   │────────────►│ AddressCache │◄── address() from any thread
//! └──────────────┘             └──────────────┘
//!        │ AddressChange
//!        ├──────────────────────────┐
//!        ▼                          ▼
//! ┌──────────────┐          ┌──────────────┐
//! │  callback    │          │  changes()   │
//! │ (blocking    │          │  (broadcast) │
//! │  pool)       │          │              │
//! └──────────────┘          └──────────────┘
//! ```
//!
//! ## Tick Flow
//!
//! 1. Resolve the public IP
//! 2. On failure: log, leave the cache alone, wait for the next tick
//! 3. On success: store it, read it back, compare with the last seen address
//! 4. On change: spawn the callback, publish to subscribers, advance the snapshot
//! 5. Sleep for the interval

use crate::cache::{AddressCache, same_host};
use crate::config::WatcherConfig;
use crate::error::{Error, Result};
use crate::traits::Resolver;
use std::fmt;
use std::net::IpAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error, info, warn};

/// Default delay between refresh ticks
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Shortest delay `with_interval` accepts
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

const DEFAULT_CHANGE_CHANNEL_CAPACITY: usize = 16;

/// A detected change of the public address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressChange {
    /// The address seen before (`None` if nothing had resolved yet)
    pub previous: Option<IpAddr>,
    /// The newly resolved address
    pub current: IpAddr,
}

/// Callback invoked with `(previous, current)` whenever the address changes
pub type ChangeCallback = Arc<dyn Fn(Option<IpAddr>, IpAddr) + Send + Sync>;

/// Public IP watcher
///
/// Owns the cached address and the resolver. Cloning is cheap; clones share
/// the same cache and change channel.
///
/// ## Lifecycle
///
/// 1. Create with [`IpWatcher::new()`] (no I/O happens here)
/// 2. Start the loop with [`IpWatcher::start()`]
/// 3. Read the address at any time with [`IpWatcher::address()`]
/// 4. Either [`WatchHandle::stop()`] the loop or drop the handle to let it
///    run for the rest of the process
#[derive(Clone)]
pub struct IpWatcher {
    /// Last good address
    cache: AddressCache,

    /// Resolution capability
    resolver: Arc<dyn Resolver>,

    /// Delay between ticks
    interval: Duration,

    /// Sender for `changes()` subscribers
    change_tx: broadcast::Sender<AddressChange>,
}

impl fmt::Debug for IpWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IpWatcher")
            .field("resolver", &self.resolver.name())
            .field("interval", &self.interval)
            .field("address", &self.cache.get())
            .finish()
    }
}

impl IpWatcher {
    /// Create a watcher with an unset cache and the default interval
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        let (change_tx, _) = broadcast::channel(DEFAULT_CHANGE_CHANNEL_CAPACITY);

        Self {
            cache: AddressCache::new(),
            resolver,
            interval: DEFAULT_INTERVAL,
            change_tx,
        }
    }

    /// Create a watcher from loop settings
    pub fn from_config(resolver: Arc<dyn Resolver>, config: &WatcherConfig) -> Result<Self> {
        config.validate()?;

        let (change_tx, _) = broadcast::channel(config.change_channel_capacity);

        Ok(Self {
            cache: AddressCache::new(),
            resolver,
            interval: config.interval(),
            change_tx,
        })
    }

    /// Override the delay between ticks
    ///
    /// Values below [`MIN_INTERVAL`] are raised to it; a zero delay would
    /// call the resolver back to back.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        if interval < MIN_INTERVAL {
            warn!(
                "Refresh interval {:?} is too short, using {:?}",
                interval, MIN_INTERVAL
            );
        }
        self.interval = interval.max(MIN_INTERVAL);
        self
    }

    /// Delay between ticks
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The cached public address
    ///
    /// Returns `None` until the first successful resolution. Failed
    /// refreshes are invisible here; the last good value is kept.
    pub fn address(&self) -> Option<IpAddr> {
        self.cache.get()
    }

    /// Overwrite the cached address
    ///
    /// Never fires the change callback. Setting a value before `start()`
    /// seeds the loop's initial snapshot.
    pub fn set_address(&self, ip: IpAddr) {
        self.cache.set(ip);
    }

    /// Subscribe to address changes
    ///
    /// Subscribers that lag behind skip the missed changes instead of
    /// holding up the refresh loop.
    pub fn changes(&self) -> Pin<Box<dyn Stream<Item = AddressChange> + Send + 'static>> {
        let stream = BroadcastStream::new(self.change_tx.subscribe()).filter_map(|item| match item {
            Ok(change) => Some(change),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!("Change subscriber lagged, skipped {} change(s)", skipped);
                None
            }
        });

        Box::pin(stream)
    }

    /// Start the refresh loop on the current tokio runtime
    ///
    /// Returns immediately; the first resolution happens on the spawned
    /// task. The callback, if any, runs on tokio's blocking pool for every
    /// change and is never awaited by the loop, so it may block freely.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn start(&self, on_change: Option<ChangeCallback>) -> WatchHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let watcher = self.clone();

        let task = tokio::spawn(async move { watcher.run(on_change, shutdown_rx).await });

        WatchHandle { shutdown_tx, task }
    }

    async fn run(self, on_change: Option<ChangeCallback>, mut shutdown_rx: watch::Receiver<bool>) {
        info!(
            "Starting public IP refresh loop (resolver={}, interval={:?})",
            self.resolver.name(),
            self.interval
        );

        let mut last_seen = self.address();

        loop {
            tokio::select! {
                biased;

                _ = stop_requested(&mut shutdown_rx) => break,

                result = self.refresh(&mut last_seen, on_change.as_ref()) => match result {
                    Ok(_) => {}
                    Err(e) if e.is_resolution_failure() => {
                        warn!(
                            category = e.category(),
                            "Refresh public IP failed: {}",
                            e
                        );
                    }
                    Err(e) => {
                        error!(category = e.category(), "Refresh tick failed: {}", e);
                    }
                }
            }

            tokio::select! {
                biased;

                _ = stop_requested(&mut shutdown_rx) => break,

                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("Public IP refresh loop stopped");
    }

    /// One tick: resolve, store, compare, notify
    ///
    /// `last_seen` is the loop's private snapshot. Returns the change if one
    /// was detected.
    pub(crate) async fn refresh(
        &self,
        last_seen: &mut Option<IpAddr>,
        on_change: Option<&ChangeCallback>,
    ) -> Result<Option<AddressChange>> {
        let ip = self.resolver.resolve().await?;
        self.set_address(ip);

        let current = self
            .address()
            .ok_or_else(|| Error::other("Address cache empty right after update"))?;

        if same_host(*last_seen, Some(current)) {
            debug!("Public IP unchanged: {}", current);
            return Ok(None);
        }

        let change = AddressChange {
            previous: *last_seen,
            current,
        };

        match change.previous {
            Some(previous) => info!("Public IP changed: {} -> {}", previous, current),
            None => info!("Public IP discovered: {}", current),
        }

        // Synchronous callbacks go to the blocking pool so a slow one never
        // holds a runtime worker, even on a current-thread runtime
        if let Some(callback) = on_change {
            let callback = Arc::clone(callback);
            tokio::task::spawn_blocking(move || callback(change.previous, change.current));
        }

        // No subscribers is fine
        let _ = self.change_tx.send(change);

        *last_seen = Some(current);
        Ok(Some(change))
    }
}

/// Resolves once `stop()` was requested; never resolves after the handle is dropped
async fn stop_requested(shutdown_rx: &mut watch::Receiver<bool>) {
    if shutdown_rx.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Handle to a running refresh loop
///
/// Dropping the handle detaches the loop, which then runs for the rest of
/// the process.
#[derive(Debug)]
pub struct WatchHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl WatchHandle {
    /// Stop the loop and wait for it to exit
    ///
    /// An in-flight resolution is abandoned. Callbacks already dispatched
    /// keep running on their own tasks.
    pub async fn stop(self) -> Result<()> {
        // Err only means the loop already exited
        let _ = self.shutdown_tx.send(true);

        self.task
            .await
            .map_err(|e| Error::other(format!("Refresh loop task failed: {}", e)))
    }

    /// Whether the loop task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
