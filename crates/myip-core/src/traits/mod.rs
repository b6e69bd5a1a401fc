//! Core traits for the myip system
//!
//! - [`Resolver`]: Ask an external service for the host's public IP
//! - [`ResolverFactory`]: Build a resolver from configuration

pub mod resolver;

pub use resolver::{Resolver, ResolverFactory};
