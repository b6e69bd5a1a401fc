// # myip-core
//
// Core library for discovering, caching and watching the host's public IP.
//
// ## Architecture Overview
//
// - **Resolver**: Trait for asking an external service "what is my IP?"
// - **AddressCache**: The last known address, readable from any thread
// - **IpWatcher**: Periodic refresh loop that detects changes and notifies
// - **ResolverRegistry**: Factory registry for building resolvers from config
//
// ## Design Principles
//
// 1. **Pluggable resolution**: The loop knows the `Resolver` trait, never a wire format
// 2. **Failures are ticks**: A failed resolution is logged and retried on the next tick
// 3. **Fire-and-forget notification**: Callbacks never hold up the refresh loop
// 4. **Library-First**: The daemon is a thin layer over this crate

pub mod traits;
pub mod cache;
pub mod watcher;
pub mod registry;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{Resolver, ResolverFactory};
pub use cache::{AddressCache, same_host};
pub use watcher::{AddressChange, ChangeCallback, IpWatcher, WatchHandle};
pub use registry::ResolverRegistry;
pub use config::{MyIpConfig, ResolverConfig, WatcherConfig};
pub use error::{Error, Result};
