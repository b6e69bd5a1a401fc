// # Resolver Trait
//
// Defines the interface for discovering the host's public IP address.
//
// ## Implementations
//
// - Taobao JSON API: `myip-http` crate (`TaobaoResolver`)
// - Plain-text endpoints (ipify, icanhazip): `myip-http` crate (`PlainTextResolver`)
//
// ## Usage
//
// ```rust,ignore
// use myip_core::Resolver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* Resolver implementation */;
//
//     let ip = resolver.resolve().await?;
//     println!("public ip: {}", ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for public IP resolvers
///
/// A resolver performs one round trip to an external service per call and
/// returns the address it reports. Implementations must be thread-safe; the
/// watcher calls them from a background task.
///
/// ## Error Contract
///
/// Every failure along the way (transport, unexpected status, malformed body,
/// unparseable literal) must come back as an `Err`. Never return an
/// unspecified address such as `0.0.0.0` to mean "unknown".
///
/// ## What Resolvers Don't Do
///
/// - Cache results (use `IpWatcher`)
/// - Retry or back off (the watcher simply tries again next tick)
/// - Decide whether the address changed
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolve the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The address reported by the service
    /// - `Err(Error)`: Transport, status, decode or parse failure
    async fn resolve(&self) -> Result<IpAddr, crate::Error>;

    /// Short name used in logs and error messages (e.g. "taobao")
    fn name(&self) -> &str;
}

/// Helper trait for constructing resolvers from configuration
pub trait ResolverFactory: Send + Sync {
    /// Create a Resolver instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this resolver type
    ///
    /// # Returns
    ///
    /// A boxed Resolver trait object
    fn create(
        &self,
        config: &crate::config::ResolverConfig,
    ) -> Result<Box<dyn Resolver>, crate::Error>;
}
