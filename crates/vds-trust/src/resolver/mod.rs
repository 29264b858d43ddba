//! # Resource Resolver
//!
//! The single outbound boundary of verification. The validator never
//! touches the network or the filesystem itself; every certificate and
//! governance document it needs is requested through a host-supplied
//! [`ResourceResolver`].
//!
//! ## Contract
//!
//! - The resolver receives a [`ResourceRequest`] by `&mut`, fills
//!   `output_data`, and returns a [`ResolveStatus`].
//! - `Ok` with empty `output_data` is treated as a download error.
//! - A panicking resolver is caught by the validator and recorded as
//!   [`ResolveStatus::ExceptionInCallback`]. Nothing a resolver does can
//!   abort verification.
//! - Resolvers take `&self`, so one instance serves many verifications.
//!
//! ## Provided Implementations
//!
//! - [`DirectResolver`]: fetch through a [`Fetcher`] on every request.
//! - [`CachingResolver`]: consult a disk cache first, governed by a
//!   [`CacheConfig`].
//! - Any `Fn(&mut ResourceRequest) -> ResolveStatus` closure.

pub mod cache;
pub mod fetcher;

use serde::{Deserialize, Serialize};
use vds_crypto::sha256_fingerprint;

pub use cache::{CacheConfig, CacheMissPolicy, CachingResolver};
pub use fetcher::{DirectoryFetcher, FetchError, Fetcher, MemoryFetcher};

/// Outcome of a resolver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolveStatus {
    /// `output_data` holds the resource.
    Ok,
    /// The resource could not be obtained.
    DownloadError,
    /// The resolver failed internally (including by panicking).
    ExceptionInCallback,
}

impl ResolveStatus {
    /// Upper-case status code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::DownloadError => "DOWNLOAD_ERROR",
            Self::ExceptionInCallback => "EXCEPTION_IN_CALLBACK",
        }
    }
}

impl std::fmt::Display for ResolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of trust material being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceKind {
    /// Signing or issuer certificate.
    Certificate,
    /// List of trusted lists.
    Lotl,
    /// Trust status list.
    Tsl,
    /// Issuer manifest.
    Manifest,
}

impl ResourceKind {
    fn prefix(&self) -> &'static str {
        match self {
            Self::Certificate => "cert",
            Self::Lotl => "lotl",
            Self::Tsl => "tsl",
            Self::Manifest => "manifest",
        }
    }
}

/// One fetch, created by the validator and consumed immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    /// Location of the resource.
    pub uri: String,
    /// Cache key, always a safe single path component, unique per URI.
    pub resource_name: String,
    /// Set when a cached copy is known to be stale.
    pub requires_update: bool,
    /// Filled by the resolver.
    pub output_data: Vec<u8>,
}

impl ResourceRequest {
    /// A request for `uri`, with a cache key derived from its kind, the
    /// last path segment and a digest of the full URI.
    pub fn new(kind: ResourceKind, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let resource_name = resource_name_for(kind, &uri);
        Self {
            uri,
            resource_name,
            requires_update: false,
            output_data: Vec::new(),
        }
    }

    /// Mark the request as a forced refresh.
    pub fn with_update(mut self, requires_update: bool) -> Self {
        self.requires_update = requires_update;
        self
    }
}

/// Host-supplied lookup for certificates and governance documents.
pub trait ResourceResolver {
    /// Fill `request.output_data` and report the outcome.
    fn resolve(&self, request: &mut ResourceRequest) -> ResolveStatus;
}

impl<F> ResourceResolver for F
where
    F: Fn(&mut ResourceRequest) -> ResolveStatus,
{
    fn resolve(&self, request: &mut ResourceRequest) -> ResolveStatus {
        self(request)
    }
}

/// Fetch on every request, no caching.
#[derive(Debug, Clone)]
pub struct DirectResolver<F> {
    fetcher: F,
}

impl<F: Fetcher> DirectResolver<F> {
    /// Wrap a fetcher.
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }
}

impl<F: Fetcher> ResourceResolver for DirectResolver<F> {
    fn resolve(&self, request: &mut ResourceRequest) -> ResolveStatus {
        match self.fetcher.fetch(&request.uri) {
            Ok(bytes) => {
                request.output_data = bytes;
                ResolveStatus::Ok
            }
            Err(e) => {
                tracing::warn!(uri = %request.uri, error = %e, "fetch failed");
                ResolveStatus::DownloadError
            }
        }
    }
}

/// `<kind>_<last path segment>_<16 hex of SHA-256(uri)>`. The segment is
/// reduced to `[A-Za-z0-9._-]`; the digest keeps distinct URIs with the
/// same last segment apart.
fn resource_name_for(kind: ResourceKind, uri: &str) -> String {
    let path = uri.split(['?', '#']).next().unwrap_or_default();
    let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    let cleaned: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = if cleaned.is_empty() { "resource".to_string() } else { cleaned };
    let digest = sha256_fingerprint(uri.as_bytes()).to_hex();
    format!("{}_{cleaned}_{}", kind.prefix(), &digest[..16])
}
