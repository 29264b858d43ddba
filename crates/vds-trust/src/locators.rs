//! URIs a seal carries for its trust material.

use serde::{Deserialize, Serialize};

/// Where the signing certificate and the governance artifacts of a seal
/// are published.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GovernanceLocators {
    pub certificate_uri: String,
    pub lotl_uri: String,
    pub tsl_uri: String,
    pub manifest_uri: String,
}
