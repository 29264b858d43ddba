//! # vds-crypto — Cryptographic Primitives
//!
//! - **Ed25519** signing and verification for seals, certificates and
//!   governance artifacts.
//! - **SHA-256** fingerprints of raw certificate bytes.
//!
//! ## Crate Policy
//!
//! - Depends only on `vds-core` internally.
//! - No mocking of cryptographic operations in tests: all tests use real
//!   Ed25519 and real SHA-256.

pub mod ed25519;
pub mod sha256;

pub use ed25519::{verify, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature, SignedRegion, SigningInput};
pub use sha256::sha256_fingerprint;
