//! # vds-core — Foundational Types for the VDS Stack
//!
//! Leaf crate of the workspace. Defines the error taxonomy, the canonical
//! byte form used for every signed governance body, SHA-256 content
//! digests, UTC timestamps, and the validated identifiers that appear in a
//! seal header.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain identifiers.** `ManifestId`,
//!    `AuthorityId`, `CountryCode`, `LanguageTag` have validated
//!    constructors. No bare strings cross crate boundaries.
//!
//! 2. **`CanonicalBytes` newtype.** Every signature over a JSON body is
//!    computed and checked over `CanonicalBytes`, never over the bytes a
//!    resolver happened to return.
//!
//! 3. **UTC-only timestamps.** Validity windows compare `Timestamp`
//!    values, which cannot carry an offset.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vds-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod format;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, CryptoError, SealError};
pub use format::{SealFormat, SEAL_MAGIC};
pub use identity::{AuthorityId, CountryCode, LanguageTag, ManifestId};
pub use temporal::Timestamp;
