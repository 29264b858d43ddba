//! # Governance Artifacts
//!
//! Three signed documents govern whether a seal can be trusted:
//!
//! - **List of Trusted Lists (LoTL)**: maps issuing countries to the URI of
//!   their trust status list.
//! - **Trust Status List (TSL)**: names the authority it covers and the
//!   SHA-256 fingerprints of its trusted root certificates.
//! - **Issuer Manifest**: declares the fields and types a use case carries.
//!
//! Each is published as a [`SignedEnvelope`]: `{ body, signer, signature }`
//! where `signature` is Ed25519 over `CanonicalBytes(body)` by `signer`.
//!
//! ## Validity
//!
//! [`SignedEnvelope::open`] accepts an artifact only if it parses, its
//! signer is a configured governance signer, the signature verifies, and
//! the verification time lies in `[issued, next_update]`. Content checks
//! against the seal are separate methods on each body.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vds_core::{
    AuthorityId, CanonicalBytes, CanonicalizationError, ContentDigest, CountryCode, CryptoError,
    ManifestId, Timestamp,
};
use vds_crypto::{verify, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use vds_payload::{FieldType, PayloadMap};

/// Why a governance artifact was rejected.
#[derive(Error, Debug)]
pub enum GovernanceError {
    #[error("{0} unavailable")]
    Unavailable(&'static str),

    #[error("malformed artifact: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    #[error("signer {0} is not a configured governance signer")]
    UnknownSigner(String),

    #[error("artifact signature invalid: {0}")]
    BadSignature(#[from] CryptoError),

    /// `now` is past `next_update`. The only error worth a refetch.
    #[error("artifact expired at {next_update}")]
    Expired { next_update: Timestamp },

    #[error("artifact not valid before {issued}")]
    NotYetValid { issued: Timestamp },

    /// The artifact is authentic but does not describe this seal.
    #[error("content mismatch: {0}")]
    Content(String),
}

/// A body that can travel in a [`SignedEnvelope`].
pub trait GovernanceBody: Serialize + DeserializeOwned {
    /// Short name used in logs and audit events.
    const KIND: &'static str;

    fn issued(&self) -> &Timestamp;

    fn next_update(&self) -> &Timestamp;
}

/// A signed governance artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignedEnvelope<T> {
    pub body: T,
    pub signer: Ed25519PublicKey,
    pub signature: Ed25519Signature,
}

impl<T: GovernanceBody> SignedEnvelope<T> {
    /// Sign `body` with `key`.
    pub fn sign(body: T, key: &Ed25519KeyPair) -> Result<Self, GovernanceError> {
        let signature = key.sign(&CanonicalBytes::new(&body)?);
        Ok(Self {
            body,
            signer: key.public_key(),
            signature,
        })
    }

    /// JSON bytes as published.
    pub fn to_bytes(&self) -> Result<Vec<u8>, GovernanceError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse and authenticate published bytes, returning the body.
    pub fn open(
        bytes: &[u8],
        signers: &[Ed25519PublicKey],
        now: &Timestamp,
    ) -> Result<T, GovernanceError> {
        let envelope: Self = serde_json::from_slice(bytes)?;
        if !signers.contains(&envelope.signer) {
            return Err(GovernanceError::UnknownSigner(envelope.signer.to_hex()));
        }
        verify(&CanonicalBytes::new(&envelope.body)?, &envelope.signature, &envelope.signer)?;
        let issued = *envelope.body.issued();
        let next_update = *envelope.body.next_update();
        if *now < issued {
            return Err(GovernanceError::NotYetValid { issued });
        }
        if *now > next_update {
            return Err(GovernanceError::Expired { next_update });
        }
        Ok(envelope.body)
    }
}

// ---------------------------------------------------------------------------
// List of Trusted Lists
// ---------------------------------------------------------------------------

/// One country's entry in the LoTL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedListPointer {
    pub country: CountryCode,
    pub tsl_uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOfTrustedLists {
    pub sequence: u64,
    pub issued: Timestamp,
    pub next_update: Timestamp,
    pub lists: Vec<TrustedListPointer>,
}

impl ListOfTrustedLists {
    /// Require an entry for `country` pointing at `tsl_uri`.
    pub fn check_points_to(&self, country: &CountryCode, tsl_uri: &str) -> Result<(), GovernanceError> {
        if self
            .lists
            .iter()
            .any(|p| &p.country == country && p.tsl_uri == tsl_uri)
        {
            Ok(())
        } else {
            Err(GovernanceError::Content(format!(
                "no trusted list for {country} at {tsl_uri}"
            )))
        }
    }
}

impl GovernanceBody for ListOfTrustedLists {
    const KIND: &'static str = "lotl";

    fn issued(&self) -> &Timestamp {
        &self.issued
    }

    fn next_update(&self) -> &Timestamp {
        &self.next_update
    }
}

// ---------------------------------------------------------------------------
// Trust Status List
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustStatusList {
    pub sequence: u64,
    pub issued: Timestamp,
    pub next_update: Timestamp,
    pub country: CountryCode,
    pub authority_id: AuthorityId,
    /// SHA-256 fingerprints of trusted root certificates.
    pub trust_anchors: Vec<ContentDigest>,
}

impl TrustStatusList {
    /// Require the list to cover `authority`.
    pub fn check_covers(&self, authority: &AuthorityId) -> Result<(), GovernanceError> {
        if &self.authority_id == authority {
            Ok(())
        } else {
            Err(GovernanceError::Content(format!(
                "list covers {} not {authority}",
                self.authority_id
            )))
        }
    }

    pub fn is_trust_anchor(&self, fingerprint: &ContentDigest) -> bool {
        self.trust_anchors.contains(fingerprint)
    }
}

impl GovernanceBody for TrustStatusList {
    const KIND: &'static str = "tsl";

    fn issued(&self) -> &Timestamp {
        &self.issued
    }

    fn next_update(&self) -> &Timestamp {
        &self.next_update
    }
}

// ---------------------------------------------------------------------------
// Issuer Manifest
// ---------------------------------------------------------------------------

/// A field declared by a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestField {
    pub name: String,
    pub field_type: FieldType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerManifest {
    pub manifest_id: ManifestId,
    pub issued: Timestamp,
    pub next_update: Timestamp,
    pub fields: Vec<ManifestField>,
}

impl IssuerManifest {
    /// Require a matching id and, for every declared field the payload
    /// carries, a matching type. Declared fields may be absent.
    pub fn check_payload(&self, manifest_id: ManifestId, payload: &PayloadMap) -> Result<(), GovernanceError> {
        if self.manifest_id != manifest_id {
            return Err(GovernanceError::Content(format!(
                "manifest {} does not describe use case {manifest_id}",
                self.manifest_id
            )));
        }
        for declared in &self.fields {
            if let Some(field) = payload.get(&declared.name) {
                if field.field_type() != declared.field_type {
                    return Err(GovernanceError::Content(format!(
                        "field {:?} is {} but manifest declares {}",
                        declared.name,
                        field.field_type(),
                        declared.field_type
                    )));
                }
            }
        }
        Ok(())
    }
}

impl GovernanceBody for IssuerManifest {
    const KIND: &'static str = "manifest";

    fn issued(&self) -> &Timestamp {
        &self.issued
    }

    fn next_update(&self) -> &Timestamp {
        &self.next_update
    }
}
