//! # Seal Codec
//!
//! A seal is a header, a length-prefixed payload, a signature and an
//! optional embedded certificate:
//!
//! ```text
//! header | payload_len DER-length | payload
//! 0xFF signature[64]
//! [0xFE DER-length certificate]
//! ```
//!
//! The signed region is every byte before the `0xFF` marker. Decoding
//! rejects trailing bytes.
//!
//! [`encode_unsigned`] and [`assemble`] are the inverse of [`decode`] for
//! tests and tooling. Signing itself happens outside this crate.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;

use vds_core::{SealError, SEAL_MAGIC};
use vds_crypto::Ed25519Signature;
use vds_payload::wire::{Reader, Writer};
use vds_payload::{codec as payload_codec, PayloadMap};

use crate::header::SealHeader;

/// Marker preceding the 64-byte signature.
pub const SIGNATURE_MARKER: u8 = 0xFF;

/// Marker preceding an embedded signing certificate.
pub const CERTIFICATE_MARKER: u8 = 0xFE;

const SIGNATURE_LEN: usize = 64;

/// The structural parts of a seal.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeal {
    pub header: SealHeader,
    pub payload: PayloadMap,
    /// Header and payload bytes exactly as received.
    pub signed_region: Vec<u8>,
    pub signature: Ed25519Signature,
    pub embedded_certificate: Option<Vec<u8>>,
}

/// Split and decode a binary seal.
///
/// # Errors
///
/// `UnsupportedFormat` for a bad magic byte or unknown format code,
/// `MalformedPayload` for everything else.
pub fn decode(bytes: &[u8]) -> Result<RawSeal, SealError> {
    let mut r = Reader::new(bytes);
    let header = SealHeader::decode(&mut r)?;
    let payload_len = r.der_len("payload length")?;
    let payload_bytes = r.take(payload_len, "payload")?;
    let payload = payload_codec::decode(payload_bytes, header.format)?;
    let signed_len = r.position();

    let marker = r.u8("signature marker")?;
    if marker != SIGNATURE_MARKER {
        return Err(SealError::MalformedPayload(format!(
            "expected signature marker {SIGNATURE_MARKER:#04x} at offset {signed_len}, found {marker:#04x}"
        )));
    }
    let signature = Ed25519Signature::from_slice(r.take(SIGNATURE_LEN, "signature")?)
        .map_err(|e| SealError::MalformedPayload(e.to_string()))?;

    let embedded_certificate = match r.peek() {
        Some(CERTIFICATE_MARKER) => {
            r.u8("certificate marker")?;
            let len = r.der_len("certificate length")?;
            if len == 0 {
                return Err(r.error("empty embedded certificate"));
            }
            Some(r.take(len, "certificate")?.to_vec())
        }
        _ => None,
    };
    if !r.is_empty() {
        return Err(r.error(&format!("{} trailing bytes", r.remaining())));
    }

    tracing::debug!(
        format = %header.format,
        manifest_id = %header.manifest_id,
        fields = payload.len(),
        embedded_certificate = embedded_certificate.is_some(),
        "decoded seal"
    );
    Ok(RawSeal {
        header,
        payload,
        signed_region: bytes[..signed_len].to_vec(),
        signature,
        embedded_certificate,
    })
}

/// Encode the signed region: header, payload length, payload.
///
/// # Errors
///
/// `MalformedPayload` if the header or payload cannot be represented.
pub fn encode_unsigned(header: &SealHeader, payload: &PayloadMap) -> Result<Vec<u8>, SealError> {
    let payload_bytes = payload_codec::encode(payload)?;
    let mut w = Writer::new();
    header.encode(&mut w)?;
    w.put_der_len(payload_bytes.len());
    w.put_bytes(&payload_bytes);
    Ok(w.into_bytes())
}

/// Append the signature and optional certificate to a signed region.
pub fn assemble(
    signed_region: &[u8],
    signature: &Ed25519Signature,
    embedded_certificate: Option<&[u8]>,
) -> Vec<u8> {
    let mut w = Writer::new();
    w.put_bytes(signed_region);
    w.put_u8(SIGNATURE_MARKER);
    w.put_bytes(signature.as_bytes());
    if let Some(cert) = embedded_certificate {
        w.put_u8(CERTIFICATE_MARKER);
        w.put_der_len(cert.len());
        w.put_bytes(cert);
    }
    w.into_bytes()
}

/// Turn the textual form of a seal into bytes.
///
/// Accepts hex (any case) or base64 in the standard or URL-safe alphabet,
/// with or without padding. Whitespace anywhere is ignored.
///
/// # Errors
///
/// `MalformedPayload` if the text is neither.
pub fn decode_text(text: &str) -> Result<Vec<u8>, SealError> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(SealError::MalformedPayload("empty seal text".into()));
    }
    if let Some(bytes) = decode_hex(&compact) {
        if bytes.first() == Some(&SEAL_MAGIC) {
            return Ok(bytes);
        }
    }
    let unpadded = compact.trim_end_matches('=');
    let engine = if unpadded.contains(['-', '_']) { &URL_SAFE_NO_PAD } else { &STANDARD_NO_PAD };
    engine
        .decode(unpadded)
        .map_err(|e| SealError::MalformedPayload(format!("seal text is neither hex nor base64: {e}")))
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}
