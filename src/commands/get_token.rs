//! The get-token flow: cache lookup, generation, augmentation, persistence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::path::PathBuf;

use crate::api::models::TokenRecord;
use crate::api::{StsEndpoint, TokenGenerator, verify_cluster_exists};
use crate::auth::{attach_client_credentials, load_sdk_config, resolve_credentials};
use crate::cache::TokenCache;
use crate::config::RequestDescriptor;
use crate::error::Result;

/// Produces fresh token records
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch(&self, request: &RequestDescriptor, now: DateTime<Utc>) -> Result<TokenRecord>;
}

/// Credentials from the AWS provider chain, a DescribeCluster check, then a
/// locally presigned STS request
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsTokenSource;

#[async_trait]
impl TokenSource for AwsTokenSource {
    async fn fetch(&self, request: &RequestDescriptor, now: DateTime<Utc>) -> Result<TokenRecord> {
        let sdk_config = load_sdk_config(request).await;

        match request.cluster.describe_name() {
            Some(name) => verify_cluster_exists(&sdk_config, name).await?,
            None => debug!("Skipping cluster lookup for cluster ID {}", request.cluster),
        }

        let credentials = resolve_credentials(&sdk_config).await?;
        let endpoint = StsEndpoint::resolve(&request.region, request.sts_endpoint);
        let generator = TokenGenerator::new(credentials, endpoint);

        let (token, expires_at) =
            generator.generate(request.cluster.header_value(), request.ttl_secs, now)?;
        Ok(TokenRecord::new(token, expires_at))
    }
}

pub struct TokenService<S> {
    source: S,
}

impl<S: TokenSource> TokenService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Resolve a token for `request` as of `now`.
    ///
    /// Cache problems never fail the call: an unreadable entry means
    /// regenerate, a failed write is only logged. Client certificate and key
    /// data are attached after the cache boundary and never persisted.
    pub async fn get_token(
        &self,
        request: &RequestDescriptor,
        now: DateTime<Utc>,
    ) -> Result<TokenRecord> {
        let cache = if request.ignore_cache {
            debug!("Cache bypassed for cluster {}", request.cluster);
            None
        } else {
            match open_cache(request) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("token cache unavailable: {}", e);
                    None
                }
            }
        };

        if let Some((cache, path)) = &cache {
            match cache.read(path) {
                Ok(Some(record)) if record.is_valid(now) => {
                    info!("Using cached token from {:?}", path);
                    return self.augment(record, request);
                }
                Ok(Some(_)) => debug!("Cached token at {:?} has expired", path),
                Ok(None) => {}
                Err(e) => debug!("Ignoring cached token: {}", e),
            }
        }

        let record = self.source.fetch(request, now).await?;
        let emitted = self.augment(record, request)?;

        if let Some((cache, path)) = &cache {
            if let Err(e) = cache.write(path, &emitted.without_client_credentials()) {
                warn!("failed to cache token: {}", e);
            }
        }

        Ok(emitted)
    }

    fn augment(&self, mut record: TokenRecord, request: &RequestDescriptor) -> Result<TokenRecord> {
        if request.wants_client_credentials() {
            attach_client_credentials(
                &mut record,
                request.client_cert_file.as_deref(),
                request.client_key_file.as_deref(),
            )?;
        }
        Ok(record)
    }
}

fn open_cache(request: &RequestDescriptor) -> Result<(TokenCache, PathBuf)> {
    let cache = TokenCache::from_override(request.cache_dir.as_deref())?;
    let path = cache.cache_path(&request.cluster, &request.region)?;
    Ok((cache, path))
}

/// Run the get-token flow against AWS and return the JSON line to print
pub async fn get_token_command(request: &RequestDescriptor) -> Result<String> {
    info!("Getting token for cluster {} in {}", request.cluster, request.region);

    let service = TokenService::new(AwsTokenSource);
    let record = service.get_token(request, Utc::now()).await?;
    Ok(record.to_json()?)
}
