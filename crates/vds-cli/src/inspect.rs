//! # Inspect Subcommand
//!
//! Decodes a seal, prints its header and payload, optionally verifies it,
//! and writes the HTML view and payload JSON.
//!
//! ```bash
//! vds inspect seal.dat --config trust.yaml --html-out seal.html --json-out seal.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use vds_seal::SealedDocument;

use crate::setup::{build_verifier, load_config, load_seal};

/// Arguments for `vds inspect`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Seal file: binary, hex or base64.
    pub file: PathBuf,

    /// Verifier configuration (YAML). Without it the seal is not verified.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the payload as JSON to this path.
    #[arg(long)]
    pub json_out: Option<PathBuf>,

    /// Write the HTML presentation view to this path.
    #[arg(long)]
    pub html_out: Option<PathBuf>,

    /// Presentation language for the HTML view. Falls back to the first
    /// language the document supports.
    #[arg(long)]
    pub language: Option<String>,
}

/// Execute `vds inspect`.
pub fn run_inspect(args: &InspectArgs) -> Result<u8> {
    let mut doc = load_seal(&args.file)?;
    print_summary(&doc);

    if let Some(path) = &args.config {
        let verifier = build_verifier(load_config(Some(path))?);
        let result = *doc.verify(&verifier);
        println!("  Verification:");
        for (flag, value) in result.flags() {
            println!("    {flag:<38} {value}");
        }
        if let Ok(Some(info)) = doc.certificate_information() {
            println!("    signing certificate: {} (issued by {})", info.subject_common_name, info.issuer_common_name);
            println!("    valid {} .. {}", info.not_before, info.not_after);
        }
    }

    if let Some(path) = &args.html_out {
        let html = doc.build_html_view(args.language.as_deref(), true)?;
        write_output(path, &html)?;
        println!("  HTML view written to {}", path.display());
    }
    if let Some(path) = &args.json_out {
        let json = doc.build_payload_as_json("  ")?;
        write_output(path, &json)?;
        println!("  Payload JSON written to {}", path.display());
    }
    Ok(0)
}

fn print_summary(doc: &SealedDocument) {
    println!("  Format:            {}", doc.format());
    println!("  Manifest:          {} (version {})", doc.manifest_id(), doc.manifest_version());
    println!(
        "  Authority:         {} ({})",
        doc.certificate_authority_id(),
        doc.certificate_authority_issuing_country()
    );
    println!("  LoTL:              {}", doc.lotl_url());
    println!("  TSL:               {}", doc.tsl_url());
    println!("  Manifest URL:      {}", doc.manifest_url());
    for language in doc.supported_languages() {
        if let Some(name) = doc.document_name(language.as_str()) {
            println!("  Document name [{language}]: {name}");
        }
    }
    println!("  Payload:");
    for field in doc.payload() {
        println!("    {} ({}): {}", field.name(), field.field_type(), preview(&field.value_to_string()));
    }
    println!("  Face template:     {}", doc.contains_face_templates());
    println!("  Face image:        {}", doc.contains_face_images());
    println!("  Finger template:   {}", doc.contains_finger_templates());
}

fn preview(value: &str) -> String {
    const MAX: usize = 60;
    if value.chars().count() <= MAX {
        value.to_string()
    } else {
        let head: String = value.chars().take(MAX).collect();
        format!("{head}...")
    }
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_long_values() {
        assert_eq!(preview("short"), "short");
        let long = "x".repeat(100);
        assert_eq!(preview(&long), format!("{}...", "x".repeat(60)));
    }

    #[test]
    fn test_inspect_missing_file_is_error() {
        let args = InspectArgs {
            file: PathBuf::from("/nonexistent/seal.dat"),
            config: None,
            json_out: None,
            html_out: None,
            language: None,
        };
        assert!(run_inspect(&args).is_err());
    }
}
