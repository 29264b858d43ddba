//! # Verifier Configuration
//!
//! Loaded from YAML:
//!
//! ```yaml
//! governance_signers:
//!   - 8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c
//! max_chain_depth: 4
//! verification_time: 2026-10-19T00:00:00Z   # optional, default: now
//! cache:
//!   dir: /var/cache/vds
//!   miss_policy: fetch_and_store           # or: fail
//! mirror_dir: /srv/vds-mirror
//! ```
//!
//! An empty `governance_signers` list loads, but every verification run
//! with it ends in the `FAILED` stage.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vds_core::Timestamp;
use vds_crypto::Ed25519PublicKey;

use crate::resolver::CacheConfig;

/// Upper bound on `max_chain_depth`.
pub const MAX_CHAIN_DEPTH_LIMIT: usize = 16;

/// Configuration load or validation failure.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn default_max_chain_depth() -> usize {
    4
}

/// Everything a [`crate::Verifier`] needs besides its resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifierConfig {
    /// Keys allowed to sign LoTL, TSL and manifest artifacts.
    #[serde(default)]
    pub governance_signers: Vec<Ed25519PublicKey>,
    /// Most issuer certificates fetched above the signing certificate.
    #[serde(default = "default_max_chain_depth")]
    pub max_chain_depth: usize,
    /// Fixed verification instant. `None` means "now" at verifier construction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheConfig>,
    /// Local mirror of published trust material.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_dir: Option<PathBuf>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            governance_signers: Vec::new(),
            max_chain_depth: default_max_chain_depth(),
            verification_time: None,
            cache: None,
            mirror_dir: None,
        }
    }
}

impl VerifierConfig {
    /// A configuration trusting `signers`, other settings at their defaults.
    pub fn with_signers(signers: Vec<Ed25519PublicKey>) -> Self {
        Self {
            governance_signers: signers,
            ..Self::default()
        }
    }

    /// Pin the verification instant.
    pub fn at(mut self, time: Timestamp) -> Self {
        self.verification_time = Some(time);
        self
    }

    /// Parse and validate YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&yaml)?;
        tracing::debug!(
            path = %path.display(),
            signers = config.governance_signers.len(),
            max_chain_depth = config.max_chain_depth,
            "loaded verifier configuration"
        );
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chain_depth == 0 || self.max_chain_depth > MAX_CHAIN_DEPTH_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_chain_depth must be 1..={MAX_CHAIN_DEPTH_LIMIT}, got {}",
                self.max_chain_depth
            )));
        }
        if let Some(cache) = &self.cache {
            if cache.dir.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("cache.dir must not be empty".into()));
            }
        }
        if self.governance_signers.is_empty() {
            tracing::warn!("no governance signers configured; verification will fail");
        }
        Ok(())
    }
}
