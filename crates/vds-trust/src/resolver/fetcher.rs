//! # Fetchers
//!
//! The transport side of resolution. A [`Fetcher`] turns a URI into bytes;
//! the resolvers in this module decide when to call it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Transport failure.
#[derive(Error, Debug)]
pub enum FetchError {
    /// No resource exists at the URI.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The URI cannot be mapped onto this fetcher.
    #[error("unsupported uri: {0}")]
    UnsupportedUri(String),

    /// Reading the resource failed.
    #[error("I/O error fetching {uri}: {source}")]
    Io {
        /// The URI being fetched.
        uri: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Turns a URI into bytes.
pub trait Fetcher {
    /// Fetch the resource at `uri`.
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError>;
}

/// In-memory mirror keyed by exact URI.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    resources: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    /// An empty mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `bytes` at `uri`, replacing any previous content.
    pub fn insert(&mut self, uri: impl Into<String>, bytes: Vec<u8>) {
        self.resources.insert(uri.into(), bytes);
    }

    /// Withdraw the resource at `uri`.
    pub fn remove(&mut self, uri: &str) -> Option<Vec<u8>> {
        self.resources.remove(uri)
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
        self.resources
            .get(uri)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(uri.to_string()))
    }
}

/// Local mirror directory laid out by host and path, so
/// `https://tsl.example/FR/tsl.json` reads `<root>/tsl.example/FR/tsl.json`.
/// Scheme, query and fragment are ignored.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    /// Serve files from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The mirror directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `uri`. Every path component must be a plain name.
    pub fn path_for(&self, uri: &str) -> Result<PathBuf, FetchError> {
        let unsupported = || FetchError::UnsupportedUri(uri.to_string());
        let location = uri.split(['?', '#']).next().unwrap_or_default();
        let location = location.split_once("://").map_or(location, |(_, rest)| rest);
        let mut path = self.root.clone();
        let mut components = 0;
        for component in location.split('/').filter(|c| !c.is_empty()) {
            if component == "." || component == ".." || component.contains('\\') {
                return Err(unsupported());
            }
            path.push(component);
            components += 1;
        }
        if components == 0 {
            return Err(unsupported());
        }
        Ok(path)
    }
}

impl Fetcher for DirectoryFetcher {
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
        let path = self.path_for(uri)?;
        fs::read(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound(uri.to_string())
            } else {
                FetchError::Io {
                    uri: uri.to_string(),
                    source,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_fetcher() {
        let mut f = MemoryFetcher::new();
        f.insert("mem://a", vec![1]);
        assert_eq!(f.fetch("mem://a").unwrap(), vec![1]);
        assert!(matches!(f.fetch("mem://b"), Err(FetchError::NotFound(_))));
        f.remove("mem://a");
        assert!(f.fetch("mem://a").is_err());
    }

    #[test]
    fn test_directory_fetcher_maps_host_and_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("tsl.example/FR")).unwrap();
        fs::write(dir.path().join("tsl.example/FR/tsl.json"), b"{}").unwrap();
        let f = DirectoryFetcher::new(dir.path());
        assert_eq!(f.fetch("https://tsl.example/FR/tsl.json?v=1").unwrap(), b"{}");
        assert!(matches!(
            f.fetch("https://tsl.example/FR/missing.json"),
            Err(FetchError::NotFound(_))
        ));
    }

    #[test]
    fn test_directory_fetcher_keeps_same_named_files_apart() {
        let dir = tempfile::tempdir().unwrap();
        for (country, body) in [("FR", b"fr".as_slice()), ("DE", b"de".as_slice())] {
            fs::create_dir_all(dir.path().join("tsl.example").join(country)).unwrap();
            fs::write(dir.path().join("tsl.example").join(country).join("tsl.json"), body).unwrap();
        }
        let f = DirectoryFetcher::new(dir.path());
        assert_eq!(f.fetch("https://tsl.example/FR/tsl.json").unwrap(), b"fr");
        assert_eq!(f.fetch("https://tsl.example/DE/tsl.json").unwrap(), b"de");
    }

    #[test]
    fn test_directory_fetcher_rejects_traversal() {
        let f = DirectoryFetcher::new("/tmp");
        assert!(matches!(f.fetch("https://x/../etc/passwd"), Err(FetchError::UnsupportedUri(_))));
        assert!(matches!(f.fetch("https://x/./a"), Err(FetchError::UnsupportedUri(_))));
        assert!(matches!(f.fetch(""), Err(FetchError::UnsupportedUri(_))));
        assert!(matches!(f.fetch("https://"), Err(FetchError::UnsupportedUri(_))));
    }
}
