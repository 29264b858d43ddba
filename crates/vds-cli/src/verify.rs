//! # Verify Subcommand
//!
//! Verifies a seal and prints the full verification report as JSON.
//! Exit code 0 when the seal is trusted, 2 when it is not.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::setup::{build_verifier, load_config, load_seal};

/// Exit code for a seal that decoded and verified but is not trusted.
pub const EXIT_UNTRUSTED: u8 = 2;

/// Arguments for `vds verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Seal file: binary, hex or base64.
    pub file: PathBuf,

    /// Verifier configuration (YAML).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the report on one line.
    #[arg(long)]
    pub compact: bool,
}

/// Execute `vds verify`.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let mut doc = load_seal(&args.file)?;
    let verifier = build_verifier(load_config(args.config.as_deref())?);
    let trusted = doc.verify(&verifier).is_trusted();
    let report = doc.verification_report()?;

    let json = if args.compact {
        serde_json::to_string(report)
    } else {
        serde_json::to_string_pretty(report)
    }
    .context("failed to serialize verification report")?;
    println!("{json}");

    tracing::info!(file = %args.file.display(), trusted, "verification finished");
    Ok(if trusted { 0 } else { EXIT_UNTRUSTED })
}
