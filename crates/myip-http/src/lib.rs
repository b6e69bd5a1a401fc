// # HTTP Resolvers
//
// This crate provides HTTP-based public IP resolvers for myip.
//
// ## Resolvers
//
// - `TaobaoResolver`: Taobao's JSON lookup API (`{"code":0,"data":{"ip":"..."}}`)
// - `PlainTextResolver`: services answering with the bare address
//   (ipify, icanhazip, ifconfig.me)
//
// ## Transport
//
// Each resolver owns an immutable configuration and its own `reqwest::Client`.
// Callers that need proxies, custom TLS or a shared connection pool can hand
// in their own client with `with_client`.

mod plain_text;
mod taobao;

pub use plain_text::{PlainTextConfig, PlainTextResolver};
pub use taobao::{TaobaoConfig, TaobaoResolver};

use myip_core::config::ResolverConfig;
use myip_core::traits::{Resolver, ResolverFactory};
use myip_core::{Error, ResolverRegistry, Result};
use std::time::Duration;

/// Factory for creating Taobao resolvers
pub struct TaobaoFactory;

impl ResolverFactory for TaobaoFactory {
    fn create(&self, config: &ResolverConfig) -> Result<Box<dyn Resolver>> {
        match config {
            ResolverConfig::Taobao { url, timeout_secs } => {
                let resolver = TaobaoResolver::new(TaobaoConfig {
                    url: url.clone(),
                    timeout: Duration::from_secs(*timeout_secs),
                })?;
                Ok(Box::new(resolver))
            }
            _ => Err(Error::config("Invalid config for Taobao resolver")),
        }
    }
}

/// Factory for creating plain-text resolvers
pub struct PlainTextFactory;

impl ResolverFactory for PlainTextFactory {
    fn create(&self, config: &ResolverConfig) -> Result<Box<dyn Resolver>> {
        match config {
            ResolverConfig::PlainText { url, timeout_secs } => {
                let resolver = PlainTextResolver::new(PlainTextConfig {
                    url: url.clone(),
                    timeout: Duration::from_secs(*timeout_secs),
                })?;
                Ok(Box::new(resolver))
            }
            _ => Err(Error::config("Invalid config for plain-text resolver")),
        }
    }
}

/// Register the HTTP resolvers with a registry
pub fn register(registry: &ResolverRegistry) {
    registry.register_resolver("taobao", Box::new(TaobaoFactory));
    registry.register_resolver("plain_text", Box::new(PlainTextFactory));
}

/// Build the default client for a resolver
fn build_client(resolver: &str, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client for {}: {}", resolver, e)))
}

/// Parse and check a resolver endpoint
///
/// Config validation only looks at the scheme prefix; this rejects URLs
/// reqwest could never send, such as `http://` with no host.
fn parse_endpoint(resolver: &str, url: &str) -> Result<reqwest::Url> {
    let endpoint = reqwest::Url::parse(url).map_err(|e| {
        Error::config(format!("Invalid {} resolver URL '{}': {}", resolver, url, e))
    })?;

    match endpoint.scheme() {
        "http" | "https" => Ok(endpoint),
        other => Err(Error::config(format!(
            "{} resolver URL must use HTTP or HTTPS scheme. Got: {}",
            resolver, other
        ))),
    }
}

/// Read a response body, giving up once it grows past `limit` bytes
async fn read_body(
    resolver: &str,
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>> {
    let too_large = || Error::decode(resolver, format!("Response body exceeds {} bytes", limit));

    if response.content_length().is_some_and(|len| len > limit as u64) {
        return Err(too_large());
    }

    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| request_error(resolver, e))?
    {
        if body.len() + chunk.len() > limit {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

/// Map a request failure onto the resolver taxonomy
fn request_error(resolver: &str, err: reqwest::Error) -> Error {
    if err.is_decode() {
        Error::decode(resolver, err.to_string())
    } else {
        Error::transport(resolver, format!("Request failed: {}", err))
    }
}
