//! # Disk-Cached Resolution
//!
//! Trust material is stored under `<dir>/<resource_name>`. A cached copy
//! is served unless the request carries `requires_update`; on a miss the
//! [`CacheMissPolicy`] decides between fetching (and storing) or failing.
//!
//! ## Invariants
//!
//! - Resource names must match `[A-Za-z0-9._-]+` without a leading dot, so
//!   a name can never escape the cache directory.
//! - An unreadable cache file is a `DownloadError`; it is not silently
//!   refetched.
//! - A failed cache write is logged and the fetched bytes are still
//!   returned.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{Fetcher, ResolveStatus, ResourceRequest, ResourceResolver};

/// What to do when a resource is not in the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMissPolicy {
    /// Fetch from upstream and write the result to the cache.
    #[default]
    FetchAndStore,
    /// Report `DownloadError` without contacting upstream.
    Fail,
}

/// Cache location and miss behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory. Created on first store.
    pub dir: PathBuf,
    /// Miss behaviour.
    #[serde(default)]
    pub miss_policy: CacheMissPolicy,
}

impl CacheConfig {
    /// Cache in `dir` with the default miss policy.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            miss_policy: CacheMissPolicy::default(),
        }
    }

    /// Override the miss policy.
    pub fn with_miss_policy(mut self, miss_policy: CacheMissPolicy) -> Self {
        self.miss_policy = miss_policy;
        self
    }
}

/// A resolver backed by a disk cache in front of a [`Fetcher`].
#[derive(Debug, Clone)]
pub struct CachingResolver<F> {
    config: CacheConfig,
    fetcher: F,
}

impl<F: Fetcher> CachingResolver<F> {
    /// Build a resolver from a cache configuration and an upstream fetcher.
    pub fn new(config: CacheConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    /// The active configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Path of the cache entry for `resource_name`, if the name is safe.
    pub fn entry_path(&self, resource_name: &str) -> Option<PathBuf> {
        is_safe_resource_name(resource_name).then(|| self.config.dir.join(resource_name))
    }

    fn fetch_and_store(&self, request: &mut ResourceRequest, path: &Path) -> ResolveStatus {
        let bytes = match self.fetcher.fetch(&request.uri) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(uri = %request.uri, error = %e, "upstream fetch failed");
                return ResolveStatus::DownloadError;
            }
        };
        if let Err(e) = store(&self.config.dir, path, &bytes) {
            tracing::warn!(path = %path.display(), error = %e, "cache write failed");
        }
        request.output_data = bytes;
        ResolveStatus::Ok
    }
}

impl<F: Fetcher> ResourceResolver for CachingResolver<F> {
    fn resolve(&self, request: &mut ResourceRequest) -> ResolveStatus {
        let Some(path) = self.entry_path(&request.resource_name) else {
            tracing::warn!(name = %request.resource_name, "rejected unsafe resource name");
            return ResolveStatus::DownloadError;
        };

        if request.requires_update {
            tracing::debug!(name = %request.resource_name, "forced refresh");
            return self.fetch_and_store(request, &path);
        }

        match fs::read(&path) {
            Ok(bytes) => {
                tracing::trace!(name = %request.resource_name, "cache hit");
                request.output_data = bytes;
                ResolveStatus::Ok
            }
            Err(e) if e.kind() == ErrorKind::NotFound => match self.config.miss_policy {
                CacheMissPolicy::FetchAndStore => {
                    tracing::trace!(name = %request.resource_name, "cache miss");
                    self.fetch_and_store(request, &path)
                }
                CacheMissPolicy::Fail => {
                    tracing::debug!(name = %request.resource_name, "cache miss, policy is fail");
                    ResolveStatus::DownloadError
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cache entry unreadable");
                ResolveStatus::DownloadError
            }
        }
    }
}

fn store(dir: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    // Readers never observe a partially written entry.
    let tmp = partial_path(path);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

/// `<entry>.partial`, next to the entry.
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

/// `[A-Za-z0-9._-]+`, no leading dot.
pub fn is_safe_resource_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}
