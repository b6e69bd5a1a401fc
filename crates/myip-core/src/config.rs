//! Configuration types for the myip system
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default endpoint of the Taobao IP lookup API
pub const DEFAULT_TAOBAO_URL: &str = "http://ip.taobao.com/service/getIpInfo.php?ip=myip";

/// Default plain-text endpoint
pub const DEFAULT_PLAIN_TEXT_URL: &str = "https://api.ipify.org";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MyIpConfig {
    /// Resolver configuration
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Refresh loop settings
    #[serde(default)]
    pub watcher: WatcherConfig,
}

impl MyIpConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.resolver.validate()?;
        self.watcher.validate()?;
        Ok(())
    }
}

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolverConfig {
    /// Taobao JSON API (`{"code":0,"data":{"ip":"..."}}`)
    Taobao {
        /// Endpoint URL
        #[serde(default = "default_taobao_url")]
        url: String,
        /// Transport timeout in seconds
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },

    /// Endpoint returning the bare address as the response body
    PlainText {
        /// Endpoint URL
        #[serde(default = "default_plain_text_url")]
        url: String,
        /// Transport timeout in seconds
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },

    /// Custom resolver
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ResolverConfig {
    /// Validate the resolver configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ResolverConfig::Taobao { url, timeout_secs }
            | ResolverConfig::PlainText { url, timeout_secs } => {
                if url.is_empty() {
                    return Err(crate::Error::config("Resolver URL cannot be empty"));
                }
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(crate::Error::config(format!(
                        "Resolver URL must use HTTP or HTTPS scheme. Got: {}",
                        url
                    )));
                }
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("Resolver timeout must be > 0"));
                }
                Ok(())
            }
            ResolverConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom resolver factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom resolver config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the resolver type name used for registry lookup
    pub fn type_name(&self) -> &str {
        match self {
            ResolverConfig::Taobao { .. } => "taobao",
            ResolverConfig::PlainText { .. } => "plain_text",
            ResolverConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig::Taobao {
            url: default_taobao_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Refresh loop configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Delay between refresh ticks (in milliseconds)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Capacity of the broadcast channel behind `IpWatcher::changes()`
    ///
    /// Subscribers that fall further behind than this skip the missed changes.
    #[serde(default = "default_change_channel_capacity")]
    pub change_channel_capacity: usize,
}

impl WatcherConfig {
    /// Validate the loop settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.interval_ms == 0 {
            return Err(crate::Error::config("Refresh interval must be > 0"));
        }
        if self.change_channel_capacity == 0 {
            return Err(crate::Error::config("Change channel capacity must be > 0"));
        }
        Ok(())
    }

    /// Refresh interval as a `Duration`
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            change_channel_capacity: default_change_channel_capacity(),
        }
    }
}

fn default_taobao_url() -> String {
    DEFAULT_TAOBAO_URL.to_string()
}

fn default_plain_text_url() -> String {
    DEFAULT_PLAIN_TEXT_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_change_channel_capacity() -> usize {
    16
}
