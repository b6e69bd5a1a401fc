//! Plugin-based resolver registry
//!
//! The registry lets resolver crates register factories at startup, so the
//! daemon can turn a [`ResolverConfig`] into a resolver without a hardcoded
//! match over every implementation.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use myip_core::ResolverRegistry;
//! use myip_core::config::ResolverConfig;
//!
//! let registry = ResolverRegistry::new();
//! myip_http::register(&registry);
//!
//! let resolver = registry.create_resolver(&ResolverConfig::default())?;
//! ```

use crate::config::ResolverConfig;
use crate::error::{Error, Result};
use crate::traits::{Resolver, ResolverFactory};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Registry of resolver factories keyed by type name
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: RwLock<HashMap<String, Box<dyn ResolverFactory>>>,
}

impl ResolverRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolver factory
    ///
    /// # Parameters
    ///
    /// - `name`: Resolver type name (e.g., "taobao", "plain_text")
    /// - `factory`: Factory object for creating resolver instances
    pub fn register_resolver(&self, name: impl Into<String>, factory: Box<dyn ResolverFactory>) {
        let mut resolvers = self
            .resolvers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        resolvers.insert(name.into(), factory);
    }

    /// Create a resolver from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn Resolver>)`: Created resolver instance
    /// - `Err(Error)`: If the type is not registered or creation fails
    pub fn create_resolver(&self, config: &ResolverConfig) -> Result<Box<dyn Resolver>> {
        config.validate()?;

        let resolver_type = config.type_name();
        let resolvers = self.resolvers.read().unwrap_or_else(PoisonError::into_inner);

        let factory = resolvers
            .get(resolver_type)
            .ok_or_else(|| Error::config(format!("Unknown resolver type: {}", resolver_type)))?;

        factory.create(config)
    }

    /// List all registered resolver types
    pub fn list_resolvers(&self) -> Vec<String> {
        let resolvers = self.resolvers.read().unwrap_or_else(PoisonError::into_inner);
        resolvers.keys().cloned().collect()
    }

    /// Check if a resolver type is registered
    pub fn has_resolver(&self, name: &str) -> bool {
        let resolvers = self.resolvers.read().unwrap_or_else(PoisonError::into_inner);
        resolvers.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::net::IpAddr;

    struct FixedResolver(IpAddr);

    #[async_trait]
    impl Resolver for FixedResolver {
        async fn resolve(&self) -> Result<IpAddr> {
            Ok(self.0)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FixedFactory;

    impl ResolverFactory for FixedFactory {
        fn create(&self, config: &ResolverConfig) -> Result<Box<dyn Resolver>> {
            match config {
                ResolverConfig::Custom { config, .. } => {
                    let ip = config["ip"]
                        .as_str()
                        .and_then(|s| s.parse().ok())
                        .ok_or_else(|| Error::config("fixed resolver needs an ip"))?;
                    Ok(Box::new(FixedResolver(ip)))
                }
                _ => Err(Error::config("Invalid config for fixed resolver")),
            }
        }
    }

    #[test]
    fn test_registry_registration() {
        let registry = ResolverRegistry::new();

        assert!(!registry.has_resolver("fixed"));

        registry.register_resolver("fixed", Box::new(FixedFactory));

        assert!(registry.has_resolver("fixed"));
        assert!(registry.list_resolvers().contains(&"fixed".to_string()));
    }

    #[tokio::test]
    async fn test_create_custom_resolver() {
        let registry = ResolverRegistry::new();
        registry.register_resolver("fixed", Box::new(FixedFactory));

        let config = ResolverConfig::Custom {
            factory: "fixed".to_string(),
            config: serde_json::json!({ "ip": "192.0.2.7" }),
        };

        let resolver = registry.create_resolver(&config).unwrap();
        assert_eq!(resolver.resolve().await.unwrap(), "192.0.2.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_unknown_type_is_config_error() {
        let registry = ResolverRegistry::new();

        let result = registry.create_resolver(&ResolverConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
