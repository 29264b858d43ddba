//! Shared wiring: reading seal files and building a verifier from a
//! configuration file.

use std::path::Path;

use anyhow::{Context, Result};

use vds_core::SEAL_MAGIC;
use vds_seal::SealedDocument;
use vds_trust::{
    CachingResolver, DirectResolver, DirectoryFetcher, Fetcher, MemoryFetcher, Verifier,
    VerifierConfig,
};

/// Read a seal file holding either raw bytes or the textual form.
pub fn load_seal(path: &Path) -> Result<SealedDocument> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let doc = if bytes.first() == Some(&SEAL_MAGIC) {
        SealedDocument::decode(&bytes)
    } else {
        let text = std::str::from_utf8(&bytes)
            .with_context(|| format!("{} is neither a binary seal nor text", path.display()))?;
        SealedDocument::decode_from_string(text)
    };
    doc.with_context(|| format!("failed to decode {}", path.display()))
}

/// Load the verifier configuration, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<VerifierConfig> {
    match path {
        Some(path) => VerifierConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display())),
        None => {
            tracing::warn!("no configuration given; governance artifacts cannot be trusted");
            Ok(VerifierConfig::default())
        }
    }
}

/// A verifier reading trust material from `mirror_dir` through the
/// configured disk cache. Without a mirror every fetch fails, so only
/// cached material can be used.
pub fn build_verifier(config: VerifierConfig) -> Verifier {
    match config.mirror_dir.clone() {
        Some(dir) => {
            tracing::debug!(mirror = %dir.display(), "using mirror directory");
            with_fetcher(config, DirectoryFetcher::new(dir))
        }
        None => with_fetcher(config, MemoryFetcher::new()),
    }
}

fn with_fetcher<F: Fetcher + 'static>(config: VerifierConfig, fetcher: F) -> Verifier {
    match config.cache.clone() {
        Some(cache) => {
            tracing::debug!(cache = %cache.dir.display(), policy = ?cache.miss_policy, "using disk cache");
            Verifier::new(config, CachingResolver::new(cache, fetcher))
        }
        None => Verifier::new(config, DirectResolver::new(fetcher)),
    }
}
