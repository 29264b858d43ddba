//! # Seal Certificates
//!
//! A certificate binds an Ed25519 public key to a subject and is signed by
//! its issuer. On the wire it is a JSON object `{ "body": …, "signature": … }`
//! where the signature covers `CanonicalBytes(body)`.
//!
//! Trust status lists identify certificates by the SHA-256 of their exact
//! bytes as fetched, so a parsed certificate keeps that fingerprint.
//!
//! ## Chain Rules
//!
//! A certificate whose issuer and subject common names are equal is a
//! root and must carry a valid self-signature. Every other certificate
//! names its issuer by common name and, optionally, an `issuer_uri` from
//! which the issuer certificate can be fetched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vds_core::{CanonicalBytes, CanonicalizationError, ContentDigest, CountryCode, CryptoError, Timestamp};
use vds_crypto::{sha256_fingerprint, verify, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

use crate::result::CertificateInformation;

/// Errors parsing or checking a certificate.
#[derive(Error, Debug)]
pub enum CertificateError {
    /// The bytes are not a certificate.
    #[error("malformed certificate: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The body could not be canonicalized.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The signature does not verify under the given key.
    #[error("certificate signature invalid: {0}")]
    Signature(#[from] CryptoError),
}

/// Permitted uses of the certified key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyUsage {
    DigitalSignature,
    KeyCertSign,
    CrlSign,
}

/// Application-level purposes of the certified key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtendedKeyUsage {
    /// Signing visible digital seals.
    SealSigning,
    /// Signing trust status lists.
    TslSigning,
}

/// The signed part of a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CertificateBody {
    pub serial: String,
    pub issuer_common_name: String,
    pub subject_common_name: String,
    pub subject_organization: String,
    pub subject_organizational_unit: String,
    pub subject_country: CountryCode,
    pub not_before: Timestamp,
    pub not_after: Timestamp,
    pub public_key: Ed25519PublicKey,
    pub key_usage: Vec<KeyUsage>,
    #[serde(default)]
    pub extended_key_usage: Vec<ExtendedKeyUsage>,
    #[serde(default)]
    pub is_ca: bool,
    /// Where the issuer certificate can be fetched. Absent on roots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_uri: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CertificateEnvelope {
    body: CertificateBody,
    signature: Ed25519Signature,
}

/// A parsed certificate together with the fingerprint of its raw bytes.
#[derive(Debug, Clone)]
pub struct SealCertificate {
    body: CertificateBody,
    signature: Ed25519Signature,
    signing_input: CanonicalBytes,
    fingerprint: ContentDigest,
}

impl SealCertificate {
    /// Parse certificate bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CertificateError> {
        let envelope: CertificateEnvelope = serde_json::from_slice(bytes)?;
        let signing_input = CanonicalBytes::new(&envelope.body)?;
        Ok(Self {
            body: envelope.body,
            signature: envelope.signature,
            signing_input,
            fingerprint: sha256_fingerprint(bytes),
        })
    }

    /// Sign `body` with `issuer` and return the certificate bytes.
    pub fn issue(body: CertificateBody, issuer: &Ed25519KeyPair) -> Result<Vec<u8>, CertificateError> {
        let signature = issuer.sign(&CanonicalBytes::new(&body)?);
        Ok(serde_json::to_vec(&CertificateEnvelope { body, signature })?)
    }

    pub fn body(&self) -> &CertificateBody {
        &self.body
    }

    /// The certified public key.
    pub fn public_key(&self) -> &Ed25519PublicKey {
        &self.body.public_key
    }

    /// SHA-256 of the bytes this certificate was parsed from.
    pub fn fingerprint(&self) -> &ContentDigest {
        &self.fingerprint
    }

    /// Issuer and subject are the same entity.
    pub fn is_self_issued(&self) -> bool {
        self.body.issuer_common_name == self.body.subject_common_name
    }

    /// Check the signature under `issuer_key`.
    pub fn verify_signed_by(&self, issuer_key: &Ed25519PublicKey) -> Result<(), CertificateError> {
        verify(&self.signing_input, &self.signature, issuer_key)?;
        Ok(())
    }

    /// `now` lies within `[not_before, not_after]`.
    pub fn is_valid_at(&self, now: &Timestamp) -> bool {
        now.within(&self.body.not_before, &self.body.not_after)
    }

    /// May this certificate sign seals at `now`?
    ///
    /// An end-entity certificate with `DigitalSignature` and `SealSigning`,
    /// inside its validity window.
    pub fn usage_authorized_at(&self, now: &Timestamp) -> bool {
        !self.body.is_ca
            && self.body.key_usage.contains(&KeyUsage::DigitalSignature)
            && self.body.extended_key_usage.contains(&ExtendedKeyUsage::SealSigning)
            && self.is_valid_at(now)
    }

    /// Check that `issuer` certifies this certificate at `now`.
    ///
    /// Returns a reason string on the first failed condition.
    pub fn check_issued_by(&self, issuer: &SealCertificate, now: &Timestamp) -> Result<(), String> {
        if issuer.body.subject_common_name != self.body.issuer_common_name {
            return Err(format!(
                "issuer CN {:?} does not match {:?}",
                issuer.body.subject_common_name, self.body.issuer_common_name
            ));
        }
        if !issuer.body.is_ca {
            return Err(format!("issuer {:?} is not a CA", issuer.body.subject_common_name));
        }
        if !issuer.body.key_usage.contains(&KeyUsage::KeyCertSign) {
            return Err(format!(
                "issuer {:?} lacks KEY_CERT_SIGN",
                issuer.body.subject_common_name
            ));
        }
        self.verify_signed_by(issuer.public_key()).map_err(|e| e.to_string())?;
        if !self.is_valid_at(now) {
            return Err(format!("{:?} is outside its validity window", self.body.subject_common_name));
        }
        if !issuer.is_valid_at(now) {
            return Err(format!(
                "issuer {:?} is outside its validity window",
                issuer.body.subject_common_name
            ));
        }
        Ok(())
    }

    /// Summary for the verification report.
    pub fn information(&self) -> CertificateInformation {
        CertificateInformation {
            issuer_common_name: self.body.issuer_common_name.clone(),
            subject_common_name: self.body.subject_common_name.clone(),
            subject_organization: self.body.subject_organization.clone(),
            subject_organizational_unit: self.body.subject_organizational_unit.clone(),
            not_before: self.body.not_before,
            not_after: self.body.not_after,
        }
    }
}
