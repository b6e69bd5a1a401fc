// # myipd - public IP watcher daemon
//
// A thin integration layer over myip-core. It reads its configuration from
// the environment, builds a resolver through the registry, runs the refresh
// loop and logs every change until SIGINT/SIGTERM.
//
// ## Configuration
//
// - `MYIP_RESOLVER_TYPE`: Resolver type (taobao, plain_text). Default: taobao
// - `MYIP_RESOLVER_URL`: Endpoint URL. Default: the resolver's own default
// - `MYIP_RESOLVER_TIMEOUT_SECS`: Transport timeout. Default: 10
// - `MYIP_INTERVAL_MS`: Delay between refreshes. Default: 1000
// - `MYIP_LOG_LEVEL`: trace, debug, info, warn, error. Default: info
//
// ## Example
//
// ```bash
// export MYIP_RESOLVER_TYPE=plain_text
// export MYIP_RESOLVER_URL=https://api.ipify.org
// export MYIP_INTERVAL_MS=30000
//
// myipd
// ```

use anyhow::Result;
use myip_core::config::{DEFAULT_PLAIN_TEXT_URL, DEFAULT_TAOBAO_URL};
use myip_core::{
    ChangeCallback, IpWatcher, MyIpConfig, Resolver, ResolverConfig, ResolverRegistry,
    WatcherConfig,
};
use std::env;
use std::fmt::Display;
use std::net::IpAddr;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum MyIpExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<MyIpExitCode> for ExitCode {
    fn from(code: MyIpExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Daemon settings
#[derive(Debug)]
struct Settings {
    config: MyIpConfig,
    log_level: String,
}

impl Settings {
    /// Load settings from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout_secs = parse_var(&lookup, "MYIP_RESOLVER_TIMEOUT_SECS", 10)?;
        let url = lookup("MYIP_RESOLVER_URL");

        let resolver_type = lookup("MYIP_RESOLVER_TYPE").unwrap_or_else(|| "taobao".to_string());
        let resolver = match resolver_type.as_str() {
            "taobao" => ResolverConfig::Taobao {
                url: url.unwrap_or_else(|| DEFAULT_TAOBAO_URL.to_string()),
                timeout_secs,
            },
            "plain_text" => ResolverConfig::PlainText {
                url: url.unwrap_or_else(|| DEFAULT_PLAIN_TEXT_URL.to_string()),
                timeout_secs,
            },
            other => anyhow::bail!(
                "MYIP_RESOLVER_TYPE '{}' is not supported. \
                Supported types: taobao, plain_text",
                other
            ),
        };

        let watcher = WatcherConfig {
            interval_ms: parse_var(&lookup, "MYIP_INTERVAL_MS", 1000)?,
            ..WatcherConfig::default()
        };

        Ok(Self {
            config: MyIpConfig { resolver, watcher },
            log_level: lookup("MYIP_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the settings
    fn validate(&self) -> Result<()> {
        self.config.validate()?;
        self.level()?;
        Ok(())
    }

    /// Tracing level for `MYIP_LOG_LEVEL`
    fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "MYIP_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

/// Parse a numeric variable, falling back to `default` when unset
fn parse_var<T>(lookup: impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} must be a number. Got '{}': {}", name, raw, e)),
        None => Ok(default),
    }
}

fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return MyIpExitCode::ConfigError.into();
        }
    };

    if let Err(e) = settings.validate() {
        eprintln!("Configuration validation error: {}", e);
        return MyIpExitCode::ConfigError.into();
    }

    let log_level = settings.level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return MyIpExitCode::ConfigError.into();
    }

    info!("Starting myipd");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return MyIpExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(settings.config).await {
            error!("Daemon error: {}", e);
            MyIpExitCode::RuntimeError
        } else {
            MyIpExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon until a shutdown signal arrives
async fn run_daemon(config: MyIpConfig) -> Result<()> {
    let registry = ResolverRegistry::new();
    myip_http::register(&registry);

    let resolver = registry.create_resolver(&config.resolver)?;
    info!(
        "Resolver: {} (interval={}ms)",
        resolver.name(),
        config.watcher.interval_ms
    );

    let watcher = IpWatcher::from_config(Arc::from(resolver), &config.watcher)?;

    let on_change: ChangeCallback = Arc::new(|previous: Option<IpAddr>, current: IpAddr| match previous {
        Some(previous) => info!("Public IP changed: {} -> {}", previous, current),
        None => info!("Public IP available: {}", current),
    });

    let handle = watcher.start(Some(on_change));
    info!("Ready to watch the public IP");

    let signal = wait_for_shutdown().await?;
    info!("Received shutdown signal: {}", signal);

    handle.stop().await?;

    match watcher.address() {
        Some(ip) => info!("Last known public IP: {}", ip),
        None => info!("Public IP was never resolved"),
    }

    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
