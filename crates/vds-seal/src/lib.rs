//! # vds-seal — Sealed Documents
//!
//! Decodes a seal into a [`SealedDocument`], verifies it once through a
//! [`vds_trust::Verifier`], and answers queries about it:
//!
//! - **Codec** (`codec.rs`, `header.rs`): seal framing, the header, the
//!   signed region, and the textual (hex/base64) form.
//! - **Document** (`document.rs`): accessors, biometric lookups, and the
//!   verify-once report.
//! - **Views** (`html.rs`, `json.rs`): pure HTML and JSON projections.
//!
//! ```no_run
//! use vds_seal::SealedDocument;
//! use vds_trust::{DirectResolver, MemoryFetcher, Verifier, VerifierConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = SealedDocument::decode_from_string("3AI...")?;
//! let verifier = Verifier::new(VerifierConfig::default(), DirectResolver::new(MemoryFetcher::new()));
//! let trusted = doc.verify(&verifier).is_trusted();
//! let html = doc.build_html_view(None, true)?;
//! # let _ = (trusted, html);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod document;
pub mod header;
pub mod html;
pub mod json;

pub use codec::{assemble, decode_text, encode_unsigned, RawSeal};
pub use document::SealedDocument;
pub use header::SealHeader;
