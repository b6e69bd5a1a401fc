//! Taobao IP lookup API
//!
//! `GET http://ip.taobao.com/service/getIpInfo.php?ip=myip` answers with
//!
//! ```json
//! {"code": 0, "data": {"ip": "203.0.113.7", "country": "...", ...}}
//! ```
//!
//! A non-zero `code` means the lookup itself failed; `data` is then usually
//! a bare error string rather than an object.

use myip_core::config::DEFAULT_TAOBAO_URL;
use myip_core::traits::Resolver;
use myip_core::{Error, Result};
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

const RESOLVER_NAME: &str = "taobao";

/// Largest body read before giving up
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Per-instance Taobao resolver configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaobaoConfig {
    /// Endpoint URL
    pub url: String,
    /// Transport timeout for the default client
    pub timeout: Duration,
}

impl Default for TaobaoConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_TAOBAO_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Data {
    ip: String,
}

/// Resolver backed by Taobao's JSON lookup API
#[derive(Debug, Clone)]
pub struct TaobaoResolver {
    config: TaobaoConfig,
    endpoint: reqwest::Url,
    client: reqwest::Client,
}

impl TaobaoResolver {
    /// Create a resolver with a default client honoring `config.timeout`
    pub fn new(config: TaobaoConfig) -> Result<Self> {
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
    pub fn with_client(config: TaobaoConfig, client: reqwest::Client) -> Result<Self> {
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
impl Resolver for TaobaoResolver {
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
        let envelope: Envelope = serde_json::from_slice(&body)
            .map_err(|e| Error::decode(RESOLVER_NAME, format!("Invalid JSON: {}", e)))?;

        if envelope.code != 0 {
            return Err(Error::status(
                RESOLVER_NAME,
                format!("api code {}", envelope.code),
            ));
        }

        let data: Data = serde_json::from_value(envelope.data).map_err(|e| {
            Error::decode(RESOLVER_NAME, format!("Unexpected response shape: {}", e))
        })?;

        let literal = data.ip.trim();
        let ip = literal
            .parse::<IpAddr>()
            .map_err(|_| Error::parse(RESOLVER_NAME, literal))?;

        debug!("Taobao reported {}", ip);
        Ok(ip)
    }

    fn name(&self) -> &str {
        RESOLVER_NAME
    }
}
