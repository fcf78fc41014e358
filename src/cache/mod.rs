//! On-disk token cache
//!
//! One JSON file per (cluster, region) pair under a cache root. Entries are
//! overwritten on refresh and never deleted; expiry is detected on read.
//! Concurrent invocations are not serialized, the last writer wins.

use log::debug;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::api::models::TokenRecord;
use crate::config::{self, ClusterIdentifier};
use crate::error::{Result, TokenError, ValidationError};

#[derive(Debug, Clone)]
pub struct TokenCache {
    cache_dir: PathBuf,
}

impl TokenCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Cache rooted at `override_dir`, or at `~/.kube/cache/tokens`
    pub fn from_override(override_dir: Option<&Path>) -> Result<Self> {
        match override_dir {
            Some(dir) => Ok(Self::new(dir)),
            None => config::default_cache_root().map(Self::new).ok_or_else(|| {
                TokenError::io(
                    "failed to get user home directory for",
                    "~/.kube/cache/tokens",
                    io::Error::new(io::ErrorKind::NotFound, "home directory not found"),
                )
            }),
        }
    }

    pub fn ensure_cache_dir(&self) -> Result<()> {
        if !self.cache_dir.exists() {
            create_private_dir(&self.cache_dir).map_err(|e| {
                TokenError::io("failed to create cache directory", &self.cache_dir, e)
            })?;
            debug!("Created cache directory: {:?}", self.cache_dir);
        }
        Ok(())
    }

    /// Path of the entry for `cluster` in `region`, creating the cache
    /// directory if needed. Keys that would resolve outside the cache root
    /// are refused before anything is created.
    pub fn cache_path(&self, cluster: &ClusterIdentifier, region: &str) -> Result<PathBuf> {
        let path = self.entry_path(cluster.short_name(), region)?;
        self.ensure_cache_dir()?;
        Ok(path)
    }

    fn entry_path(&self, short_name: &str, region: &str) -> Result<PathBuf> {
        for key in [short_name, region] {
            if !config::is_safe_cache_key(key) {
                return Err(ValidationError::InvalidCacheKey(key.to_string()).into());
            }
        }
        Ok(self.cache_dir.join(format!("{}_{}.json", short_name, region)))
    }

    /// `Ok(None)` when no entry exists; [`TokenError::Corrupt`] when one
    /// exists but does not parse
    pub fn read(&self, path: &Path) -> Result<Option<TokenRecord>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No cached token at {:?}", path);
                return Ok(None);
            }
            Err(e) => return Err(TokenError::io("failed to read cached token", path, e)),
        };

        let record = serde_json::from_str(&content).map_err(|source| TokenError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(record))
    }

    /// Persist `record`, readable by the owning user only.
    ///
    /// Callers strip client certificate and key data first; the cache stores
    /// whatever it is given.
    pub fn write(&self, path: &Path, record: &TokenRecord) -> Result<()> {
        let data = record.to_json()?;
        write_private_file(path, data.as_bytes())
            .map_err(|e| TokenError::io("failed to write cached token", path, e))?;
        debug!("Cached token at {:?}", path);
        Ok(())
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

#[cfg(unix)]
fn write_private_file(path: &Path, data: &[u8]) -> io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(data)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private_file(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}
