//! Request resolution
//!
//! Merges explicit arguments over environment variables over built-in
//! defaults into one validated [`RequestDescriptor`]. Resolution only reads
//! the environment; it never touches the filesystem or the network.

pub mod cluster;
pub mod env;

use log::debug;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use crate::api::constants::DEFAULT_TTL_SECS;
use crate::error::ValidationError;

pub use cluster::ClusterIdentifier;
pub use env::{Environment, ProcessEnv};

/// Which STS endpoint the identity request is signed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StsEndpointScope {
    #[default]
    Regional,
    Legacy,
}

impl FromStr for StsEndpointScope {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regional" => Ok(Self::Regional),
            "legacy" => Ok(Self::Legacy),
            other => Err(ValidationError::InvalidStsEndpoint(other.to_string())),
        }
    }
}

impl fmt::Display for StsEndpointScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regional => write!(f, "regional"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

/// Output selector. Both variants emit the same compact JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Default,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Self::Default),
            "json" => Ok(Self::Json),
            other => Err(ValidationError::InvalidOutputFormat(other.to_string())),
        }
    }
}

/// Values supplied explicitly on the command line
#[derive(Debug, Clone, Default)]
pub struct ExplicitArgs {
    pub cluster_name: Option<String>,
    pub cluster_id: Option<String>,
    pub region: Option<String>,
    pub profile: Option<String>,
    pub role_arn: Option<String>,
    pub ignore_cache: bool,
    pub cache_dir: Option<String>,
    pub ttl: Option<u64>,
    pub output: Option<String>,
    pub sts_regional_endpoints: Option<String>,
    pub client_cert_file: Option<String>,
    pub client_key_file: Option<String>,
}

/// Fully resolved parameters for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub cluster: ClusterIdentifier,
    pub region: String,
    pub profile: Option<String>,
    pub role_arn: Option<String>,
    pub ignore_cache: bool,
    pub cache_dir: Option<PathBuf>,
    pub ttl_secs: u64,
    pub output: OutputFormat,
    pub sts_endpoint: StsEndpointScope,
    pub client_cert_file: Option<PathBuf>,
    pub client_key_file: Option<PathBuf>,
}

impl RequestDescriptor {
    pub fn wants_client_credentials(&self) -> bool {
        self.client_cert_file.is_some() || self.client_key_file.is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Resolve `args` against `env`. Explicit values win over environment
/// values, which win over defaults.
pub fn resolve(
    args: ExplicitArgs,
    env: &impl Environment,
) -> Result<RequestDescriptor, ValidationError> {
    let cluster = match (non_empty(args.cluster_name), non_empty(args.cluster_id)) {
        (None, None) => return Err(ValidationError::MissingCluster),
        (Some(_), Some(_)) => return Err(ValidationError::ConflictingCluster),
        (Some(name), None) => ClusterIdentifier::from_name(name),
        (None, Some(id)) => ClusterIdentifier::from_id(id),
    };

    let region = non_empty(args.region)
        .or_else(|| env.var(env::AWS_REGION))
        .or_else(|| env.var(env::AWS_DEFAULT_REGION))
        .ok_or(ValidationError::MissingRegion)?;

    for key in [cluster.short_name(), region.as_str()] {
        if !is_safe_cache_key(key) {
            return Err(ValidationError::InvalidCacheKey(key.to_string()));
        }
    }

    let profile = non_empty(args.profile).or_else(|| env.var(env::AWS_PROFILE));

    let sts_endpoint = match non_empty(args.sts_regional_endpoints)
        .or_else(|| env.var(env::AWS_STS_REGIONAL_ENDPOINT))
    {
        Some(value) => value.parse()?,
        None => StsEndpointScope::default(),
    };

    let output = args.output.as_deref().unwrap_or_default().parse()?;

    let cache_dir = non_empty(args.cache_dir);
    if cache_dir.is_some() && args.ignore_cache {
        return Err(ValidationError::ConflictingCacheFlags);
    }

    let ttl_secs = args.ttl.unwrap_or(DEFAULT_TTL_SECS);
    if ttl_secs == 0 {
        return Err(ValidationError::NonPositiveTtl);
    }

    let client_cert_file = non_empty(args.client_cert_file)
        .or_else(|| env.var(env::CLIENT_CERT_FILE))
        .map(|path| expand_home(&path));
    let client_key_file = non_empty(args.client_key_file)
        .or_else(|| env.var(env::CLIENT_KEY_FILE))
        .map(|path| expand_home(&path));

    let request = RequestDescriptor {
        cluster,
        region,
        profile,
        role_arn: non_empty(args.role_arn),
        ignore_cache: args.ignore_cache,
        cache_dir: cache_dir.map(|dir| expand_home(&dir)),
        ttl_secs,
        output,
        sts_endpoint,
        client_cert_file,
        client_key_file,
    };
    debug!(
        "Resolved request for cluster {} in {} (sts: {}, ttl: {}s)",
        request.cluster, request.region, request.sts_endpoint, request.ttl_secs
    );
    Ok(request)
}

/// True when `key` can appear in a cache file name without leaving the
/// cache root
pub fn is_safe_cache_key(key: &str) -> bool {
    let mut components = Path::new(key).components();
    !key.contains(['/', '\\'])
        && !key.contains("..")
        && matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        )
}

/// Expand a leading `~` to the home directory. Paths are returned unchanged
/// when no home directory is known.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) => rest,
        None => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
        None => PathBuf::from(path),
    }
}

/// `~/.kube/cache/tokens`, or `None` without a home directory
pub fn default_cache_root() -> Option<PathBuf> {
    dirs::home_dir().map(|home| default_cache_root_in(&home))
}

pub fn default_cache_root_in(home: &Path) -> PathBuf {
    home.join(".kube").join("cache").join("tokens")
}
