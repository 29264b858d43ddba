//! # Error Types
//!
//! The error taxonomy for decoding and querying sealed documents. All
//! errors use `thiserror` for derive-based `Display` and `Error`.
//!
//! ## Design
//!
//! - Decode-time structural errors (`MalformedPayload`, `UnsupportedFormat`)
//!   abort decoding and surface to the caller.
//! - Accessor errors (`TypeMismatch`, `NullValue`) are caller misuse and
//!   never mutate document state.
//! - Verification never produces a `SealError`: resource and certificate
//!   failures degrade individual result flags instead.

use thiserror::Error;

/// Top-level error type for sealed-document operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SealError {
    /// The byte stream violates the seal or payload framing.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The header names a format identifier or version this decoder does not know.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A typed accessor was invoked against a field of a different type.
    #[error("type mismatch on field {field:?}: requested {requested}, field is {actual}")]
    TypeMismatch {
        /// Name of the field.
        field: String,
        /// The accessor type that was requested.
        requested: String,
        /// The declared type of the field.
        actual: String,
    },

    /// A value accessor was invoked on a null field.
    #[error("field {0:?} is null")]
    NullValue(String),

    /// The verification result was read before `verify()` ran.
    #[error("document has not been verified yet")]
    NotYetVerified,

    /// The requested presentation language is not supported by the document.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// A domain identifier failed validation.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A timestamp could not be parsed or represented.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// JSON projection failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in signed bodies.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in cryptographic operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key parsing failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// Digest parsing failed.
    #[error("digest error: {0}")]
    DigestError(String),
}
