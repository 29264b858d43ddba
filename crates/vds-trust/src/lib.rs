//! # vds-trust — Trust Chain Verification
//!
//! Decides whether a decoded seal can be trusted:
//!
//! - **Resolver** (`resolver/`): the host-supplied boundary through which
//!   certificates and governance documents are obtained, with direct and
//!   disk-cached implementations.
//!
//! - **Certificates** (`certificate.rs`): Ed25519-signed certificate
//!   bodies, chain links, and SHA-256 fingerprints of raw bytes.
//!
//! - **Governance** (`governance.rs`): signed LoTL, TSL and issuer
//!   manifest artifacts and their content checks.
//!
//! - **Validator** (`validator.rs`): the typestate pipeline that turns a
//!   [`SealEvidence`] into a [`VerificationReport`].
//!
//! - **Configuration** (`config.rs`): YAML-loaded [`VerifierConfig`].
//!
//! ## Security Invariant
//!
//! Every signature over a JSON body is checked against `CanonicalBytes` of
//! the parsed body, never against the bytes a resolver returned.
//!
//! ## Crate Policy
//!
//! - Depends on `vds-core`, `vds-crypto` and `vds-payload` internally.
//! - Verification never returns an error: failures degrade result flags.

pub mod certificate;
pub mod config;
pub mod governance;
pub mod locators;
pub mod resolver;
pub mod result;
pub mod validator;

pub use certificate::{CertificateBody, CertificateError, ExtendedKeyUsage, KeyUsage, SealCertificate};
pub use config::{ConfigError, VerifierConfig};
pub use governance::{
    GovernanceError, IssuerManifest, ListOfTrustedLists, ManifestField, SignedEnvelope,
    TrustStatusList, TrustedListPointer,
};
pub use locators::GovernanceLocators;
pub use resolver::{
    CacheConfig, CacheMissPolicy, CachingResolver, DirectResolver, DirectoryFetcher, FetchError,
    Fetcher, MemoryFetcher, ResolveStatus, ResourceKind, ResourceRequest, ResourceResolver,
};
pub use result::{AuditEvent, CertificateInformation, Stage, VerificationReport, VerificationResult};
pub use validator::{SealEvidence, Verifier};
