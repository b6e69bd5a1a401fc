// # Address Cache
//
// The last successfully resolved public address.
//
// ## Crash Behavior
//
// - Nothing is persisted; the cache starts unset on every run
// - Readers see `None` until the first successful resolution
//
// The lock is a plain `std::sync::RwLock` so reads stay synchronous and never
// wait on network I/O. `IpAddr` is `Copy`, so a reader always gets a whole
// value: either the one before a write or the one after.

use std::net::IpAddr;
use std::sync::{Arc, PoisonError, RwLock};

/// Shared, thread-safe cell holding the last known public address
///
/// Cloning is cheap and every clone refers to the same cell.
///
/// # Example
///
/// ```rust
/// use myip_core::AddressCache;
///
/// let cache = AddressCache::new();
/// assert_eq!(cache.get(), None);
///
/// cache.set("1.2.3.4".parse().unwrap());
/// assert_eq!(cache.get(), Some("1.2.3.4".parse().unwrap()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AddressCache {
    inner: Arc<RwLock<Option<IpAddr>>>,
}

impl AddressCache {
    /// Create a new, unset cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cached address, or `None` if nothing resolved yet
    pub fn get(&self) -> Option<IpAddr> {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrite the cached address
    pub fn set(&self, ip: IpAddr) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(ip);
    }
}

/// Host equality for addresses
///
/// Both sides are canonicalized first, so an IPv4-mapped IPv6 address
/// (`::ffff:1.2.3.4`) equals the plain IPv4 address (`1.2.3.4`). An unset
/// address only equals another unset address.
pub fn same_host(a: Option<IpAddr>, b: Option<IpAddr>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.to_canonical() == b.to_canonical(),
        (None, None) => true,
        _ => false,
    }
}
