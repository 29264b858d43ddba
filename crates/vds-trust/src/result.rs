//! # Verification Results
//!
//! The seven trust flags of a verified seal, the signer's certificate
//! summary, and the audit record of how each flag was reached.

use serde::{Deserialize, Serialize};
use vds_core::{ContentDigest, Timestamp};

/// The seven independent trust flags.
///
/// Each flag is decided by one part of the validator; a failure in one
/// part degrades only the flags that depend on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerificationResult {
    /// The seal signature verifies under the signing certificate's key.
    pub vds_signature_verified: bool,
    /// Every link from the signing certificate to a self-signed root holds.
    pub certification_chain_verified: bool,
    /// The signing certificate may sign seals at the verification time.
    pub signing_certificate_usage_authorized: bool,
    /// The list of trusted lists is valid and points at the seal's TSL.
    pub lotl_governance_valid: bool,
    /// The trust status list is valid and covers the seal's authority.
    pub tsl_governance_valid: bool,
    /// The issuer manifest is valid and matches the payload.
    pub manifest_governance_valid: bool,
    /// The chain root is a trust anchor of a valid TSL.
    pub ca_certificate_verified: bool,
}

impl VerificationResult {
    /// True when all seven flags hold.
    pub fn is_trusted(&self) -> bool {
        self.vds_signature_verified
            && self.certification_chain_verified
            && self.signing_certificate_usage_authorized
            && self.lotl_governance_valid
            && self.tsl_governance_valid
            && self.manifest_governance_valid
            && self.ca_certificate_verified
    }

    /// Flag names and values, in declaration order.
    pub fn flags(&self) -> [(&'static str, bool); 7] {
        [
            ("vds_signature_verified", self.vds_signature_verified),
            ("certification_chain_verified", self.certification_chain_verified),
            (
                "signing_certificate_usage_authorized",
                self.signing_certificate_usage_authorized,
            ),
            ("lotl_governance_valid", self.lotl_governance_valid),
            ("tsl_governance_valid", self.tsl_governance_valid),
            ("manifest_governance_valid", self.manifest_governance_valid),
            ("ca_certificate_verified", self.ca_certificate_verified),
        ]
    }
}

/// Summary of the signing certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateInformation {
    pub issuer_common_name: String,
    pub subject_common_name: String,
    pub subject_organization: String,
    pub subject_organizational_unit: String,
    pub not_before: Timestamp,
    pub not_after: Timestamp,
}

/// Validator stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Start,
    SignatureCheck,
    ChainResolution,
    GovernanceCheck,
    Done,
    /// Verification could not start; every flag is false.
    Failed,
}

impl Stage {
    /// Upper-case stage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::SignatureCheck => "SIGNATURE_CHECK",
            Self::ChainResolution => "CHAIN_RESOLUTION",
            Self::GovernanceCheck => "GOVERNANCE_CHECK",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Stage that produced the event.
    pub stage: Stage,
    /// Resource involved, by cache name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// What happened.
    pub outcome: String,
}

/// Complete outcome of one verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub result: VerificationResult,
    /// Present when a signing certificate was obtained and parsed.
    pub certificate_information: Option<CertificateInformation>,
    /// SHA-256 fingerprints of the certificates walked, signing
    /// certificate first.
    pub chain: Vec<ContentDigest>,
    pub final_stage: Stage,
    pub events: Vec<AuditEvent>,
}

impl VerificationReport {
    /// Shorthand for `self.result.is_trusted()`.
    pub fn is_trusted(&self) -> bool {
        self.result.is_trusted()
    }
}
