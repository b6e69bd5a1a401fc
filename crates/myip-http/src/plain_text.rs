//! Plain-text IP services
//!
//! Services such as `https://api.ipify.org`, `https://icanhazip.com` and
//! `https://ifconfig.me/ip` answer with the address as the whole body,
//! usually followed by a newline.

use myip_core::config::DEFAULT_PLAIN_TEXT_URL;
use myip_core::traits::Resolver;
use myip_core::{Error, Result};
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

const RESOLVER_NAME: &str = "plain_text";

/// Largest body read before giving up
const MAX_BODY_BYTES: usize = 1024;

/// Per-instance plain-text resolver configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainTextConfig {
    /// Endpoint URL
    pub url: String,
    /// Transport timeout for the default client
    pub timeout: Duration,
}

impl Default for PlainTextConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PLAIN_TEXT_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Resolver for endpoints that return the bare address
#[derive(Debug, Clone)]
pub struct PlainTextResolver {
    config: PlainTextConfig,
    endpoint: reqwest::Url,
    client: reqwest::Client,
}

impl PlainTextResolver {
    /// Create a resolver with a default client honoring `config.timeout`
    pub fn new(config: PlainTextConfig) -> Result<Self> {
        let endpoint = super::parse_endpoint(RESOLVER_NAME, &config.url)?;
        let client = super::build_client(RESOLVER_NAME, config.timeout)?;
        Ok(Self {
            config,
            endpoint,
            client,
        })
    }

    /// Create a resolver on top of a caller-supplied client
    ///
    /// `config.timeout` is ignored; the client's own settings apply.
    pub fn with_client(config: PlainTextConfig, client: reqwest::Client) -> Result<Self> {
        let endpoint = super::parse_endpoint(RESOLVER_NAME, &config.url)?;
        Ok(Self {
            config,
            endpoint,
            client,
        })
    }

    /// Endpoint this resolver queries
    pub fn url(&self) -> &str {
        &self.config.url
    }
}

#[async_trait::async_trait]
impl Resolver for PlainTextResolver {
    async fn resolve(&self) -> Result<IpAddr> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|e| super::request_error(RESOLVER_NAME, e))?;

        if !response.status().is_success() {
            return Err(Error::status(RESOLVER_NAME, response.status().to_string()));
        }

        let body = super::read_body(RESOLVER_NAME, response, MAX_BODY_BYTES).await?;
        let body = String::from_utf8_lossy(&body);

        let literal = body.trim();
        let ip = literal
            .parse::<IpAddr>()
            .map_err(|_| Error::parse(RESOLVER_NAME, literal))?;

        debug!("{} reported {}", self.config.url, ip);
        Ok(ip)
    }

    fn name(&self) -> &str {
        RESOLVER_NAME
    }
}
