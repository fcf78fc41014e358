//! Error types for token generation and caching

use std::path::PathBuf;
use thiserror::Error;

/// Configuration problems detected while resolving a request.
///
/// Each variant is reported before any I/O or network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("either --cluster-name or --cluster-id must be specified")]
    MissingCluster,

    #[error("--cluster-name and --cluster-id are mutually exclusive")]
    ConflictingCluster,

    #[error(
        "region must be specified via --region flag or AWS_REGION/AWS_DEFAULT_REGION environment variable"
    )]
    MissingRegion,

    #[error("invalid sts-regional-endpoints value '{0}'. Valid values are 'regional' or 'legacy'")]
    InvalidStsEndpoint(String),

    #[error("invalid output format '{0}'. Only 'json' is supported or omit for default")]
    InvalidOutputFormat(String),

    #[error("--cache-dir and --ignore-cache are mutually exclusive")]
    ConflictingCacheFlags,

    #[error("--ttl must be greater than zero")]
    NonPositiveTtl,

    /// A cluster name or region that would not stay inside the cache root.
    #[error("'{0}' cannot be used in a cache file name")]
    InvalidCacheKey(String),
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Loading credentials or presigning the identity request failed.
    #[error("failed to generate EKS token: {message}")]
    Signing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("failed to describe cluster '{cluster}': {message}")]
    ClusterLookup { cluster: String, message: String },

    #[error("{context} {path:?}: {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cache file exists but does not hold a token record.
    #[error("cached token at {path:?} is unreadable: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize token: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl TokenError {
    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
            source: None,
        }
    }

    pub fn signing_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Signing {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TokenError>;
