//! Error types for public IP resolution
//!
//! Resolution failures fall into four kinds (transport, status, decode, parse).
//! The refresh loop treats all of them the same way; the distinction exists
//! for logs and for callers that use a [`Resolver`](crate::Resolver) directly.

use thiserror::Error;

/// Result type alias for myip operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the myip system
#[derive(Error, Debug)]
pub enum Error {
    /// Network unreachable, connection refused, transport timeout
    #[error("Transport error ({resolver}): {message}")]
    Transport {
        /// Resolver name
        resolver: String,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status or API result code
    #[error("Unexpected status from {resolver}: {status}")]
    Status {
        /// Resolver name
        resolver: String,
        /// Status as reported by the endpoint
        status: String,
    },

    /// Body is not valid JSON or lacks the expected shape
    #[error("Decode error ({resolver}): {message}")]
    Decode {
        /// Resolver name
        resolver: String,
        /// Error message
        message: String,
    },

    /// Extracted value is not an IP address literal
    #[error("Parse error ({resolver}): failed to parse {input:?} as ip")]
    Parse {
        /// Resolver name
        resolver: String,
        /// The offending input
        input: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a transport error
    pub fn transport(resolver: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            resolver: resolver.into(),
            message: message.into(),
        }
    }

    /// Create a status (protocol) error
    pub fn status(resolver: impl Into<String>, status: impl Into<String>) -> Self {
        Self::Status {
            resolver: resolver.into(),
            status: status.into(),
        }
    }

    /// Create a decode error
    pub fn decode(resolver: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            resolver: resolver.into(),
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(resolver: impl Into<String>, input: impl Into<String>) -> Self {
        Self::Parse {
            resolver: resolver.into(),
            input: input.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Short name of the error kind, used as a structured log field
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Status { .. } => "protocol",
            Self::Decode { .. } => "decode",
            Self::Parse { .. } => "parse",
            Self::Config(_) => "config",
            Self::Other(_) => "other",
        }
    }

    /// Whether this error came out of a resolution attempt
    ///
    /// The refresh loop logs these as routine tick failures; anything else
    /// points at a bug in the loop itself.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Status { .. } | Self::Decode { .. } | Self::Parse { .. }
        )
    }
}
