//! # vds-cli — Command-Line Host for the VDS Stack
//!
//! Supplies what the libraries leave to their host: file access, a local
//! mirror of trust material, a disk cache, and configuration.
//!
//! ## Subcommands
//!
//! - `vds inspect`: print header and payload, write HTML/JSON views.
//! - `vds verify`: print the verification report; exit 0 iff trusted.
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; decoding and verification live in
//!   `vds-seal` and `vds-trust`.
//! - Handlers return `anyhow::Result<u8>`, the process exit code.

pub mod inspect;
pub mod setup;
pub mod verify;
