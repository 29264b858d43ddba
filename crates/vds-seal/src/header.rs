//! # Seal Header
//!
//! Everything in a seal that precedes the payload:
//!
//! ```text
//! magic 0xDC | format u8
//! manifest_id u24 | manifest_version u8
//! authority str8 | issuing_country 2 ASCII letters
//! certificate_uri str16 | lotl_uri str16 | tsl_uri str16 | manifest_uri str16
//! language_count u8 | (language str8, document_name str16) * count
//! ```

use serde::Serialize;

use vds_core::{AuthorityId, CountryCode, LanguageTag, ManifestId, SealError, SealFormat, SEAL_MAGIC};
use vds_payload::wire::{Reader, Writer};
use vds_trust::GovernanceLocators;

/// Decoded seal header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SealHeader {
    pub format: SealFormat,
    pub manifest_id: ManifestId,
    pub manifest_version: u8,
    pub authority: AuthorityId,
    pub issuing_country: CountryCode,
    pub governance: GovernanceLocators,
    /// Localized document names in encoding order. Languages are unique.
    pub document_names: Vec<(LanguageTag, String)>,
}

impl SealHeader {
    /// Read a header from the start of a seal.
    ///
    /// # Errors
    ///
    /// `UnsupportedFormat` for a wrong magic byte or unknown format code,
    /// `MalformedPayload` for any other framing or identifier violation.
    pub fn decode(r: &mut Reader<'_>) -> Result<Self, SealError> {
        let magic = r.u8("magic")?;
        if magic != SEAL_MAGIC {
            return Err(SealError::UnsupportedFormat(format!(
                "bad magic {magic:#04x}, expected {SEAL_MAGIC:#04x}"
            )));
        }
        let format = SealFormat::from_code(r.u8("format")?)?;
        let manifest_id = ManifestId::new(r.u24("manifest id")?).map_err(malformed)?;
        let manifest_version = r.u8("manifest version")?;
        let authority = AuthorityId::new(r.str8("authority")?).map_err(malformed)?;
        let country = r.take(2, "issuing country")?;
        let issuing_country = std::str::from_utf8(country)
            .map_err(|_| r.error("non-ASCII issuing country"))
            .and_then(|s| CountryCode::new(s).map_err(malformed))?;
        let governance = GovernanceLocators {
            certificate_uri: r.str16("certificate uri")?,
            lotl_uri: r.str16("lotl uri")?,
            tsl_uri: r.str16("tsl uri")?,
            manifest_uri: r.str16("manifest uri")?,
        };

        let count = r.u8("language count")?;
        let mut document_names: Vec<(LanguageTag, String)> = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let language = LanguageTag::new(&r.str8("language")?).map_err(malformed)?;
            let name = r.str16("document name")?;
            if document_names.iter().any(|(l, _)| *l == language) {
                return Err(r.error(&format!("duplicate language {language}")));
            }
            document_names.push((language, name));
        }

        Ok(Self {
            format,
            manifest_id,
            manifest_version,
            authority,
            issuing_country,
            governance,
            document_names,
        })
    }

    /// Append the header to `w`.
    ///
    /// # Errors
    ///
    /// `MalformedPayload` if a string exceeds its length prefix or there
    /// are more than 255 languages.
    pub fn encode(&self, w: &mut Writer) -> Result<(), SealError> {
        w.put_u8(SEAL_MAGIC);
        w.put_u8(self.format.code());
        w.put_u24(self.manifest_id.value());
        w.put_u8(self.manifest_version);
        w.put_str8(self.authority.as_str(), "authority")?;
        w.put_bytes(self.issuing_country.as_str().as_bytes());
        w.put_str16(&self.governance.certificate_uri, "certificate uri")?;
        w.put_str16(&self.governance.lotl_uri, "lotl uri")?;
        w.put_str16(&self.governance.tsl_uri, "tsl uri")?;
        w.put_str16(&self.governance.manifest_uri, "manifest uri")?;
        let count = u8::try_from(self.document_names.len())
            .map_err(|_| SealError::MalformedPayload("more than 255 document names".into()))?;
        w.put_u8(count);
        for (language, name) in &self.document_names {
            w.put_str8(language.as_str(), "language")?;
            w.put_str16(name, "document name")?;
        }
        Ok(())
    }

    /// Document name in `language`, if the seal carries one.
    pub fn document_name(&self, language: &LanguageTag) -> Option<&str> {
        self.document_names
            .iter()
            .find(|(l, _)| l == language)
            .map(|(_, name)| name.as_str())
    }
}

/// Identifier validation failures inside a seal are framing errors.
fn malformed(e: SealError) -> SealError {
    match e {
        SealError::InvalidIdentifier(msg) => SealError::MalformedPayload(msg),
        other => other,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_header() -> SealHeader {
        SealHeader {
            format: SealFormat::VdsAfnorXpZ42_105,
            manifest_id: ManifestId::new(0x0A0B0C).unwrap(),
            manifest_version: 2,
            authority: AuthorityId::new("FR01").unwrap(),
            issuing_country: CountryCode::new("FR").unwrap(),
            governance: GovernanceLocators {
                certificate_uri: "https://pki.example.fr/certs/signer.json".into(),
                lotl_uri: "https://trust.example.eu/lotl.json".into(),
                tsl_uri: "https://trust.example.fr/tsl-fr.json".into(),
                manifest_uri: "https://manifests.example.fr/0A0B0C.json".into(),
            },
            document_names: vec![
                (LanguageTag::new("en").unwrap(), "Residence permit".into()),
                (LanguageTag::new("fr").unwrap(), "Titre de séjour".into()),
            ],
        }
    }

    fn encoded(header: &SealHeader) -> Vec<u8> {
        let mut w = Writer::new();
        header.encode(&mut w).unwrap();
        w.into_bytes()
    }

    #[test]
    fn test_header_roundtrip() {
        let header = sample_header();
        let bytes = encoded(&header);
        let mut r = Reader::new(&bytes);
        assert_eq!(SealHeader::decode(&mut r).unwrap(), header);
        assert!(r.is_empty());
    }

    #[test]
    fn test_bad_magic_is_unsupported_format() {
        let mut bytes = encoded(&sample_header());
        bytes[0] = 0xDD;
        assert!(matches!(
            SealHeader::decode(&mut Reader::new(&bytes)),
            Err(SealError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_unknown_format_byte_is_unsupported_format() {
        let mut bytes = encoded(&sample_header());
        bytes[1] = 0x09;
        assert!(matches!(
            SealHeader::decode(&mut Reader::new(&bytes)),
            Err(SealError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_invalid_country_is_malformed() {
        let mut bytes = encoded(&sample_header());
        // magic, format, id(3), version, authority len + "FR01"
        let country_at = 2 + 3 + 1 + 1 + 4;
        bytes[country_at] = b'1';
        assert!(matches!(
            SealHeader::decode(&mut Reader::new(&bytes)),
            Err(SealError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_duplicate_language_is_malformed() {
        let mut header = sample_header();
        header.document_names.push((LanguageTag::new("en").unwrap(), "Again".into()));
        let bytes = encoded(&header);
        assert!(matches!(
            SealHeader::decode(&mut Reader::new(&bytes)),
            Err(SealError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_truncated_header_is_malformed() {
        let bytes = encoded(&sample_header());
        for cut in 1..bytes.len() {
            let err = SealHeader::decode(&mut Reader::new(&bytes[..cut])).unwrap_err();
            assert!(matches!(err, SealError::MalformedPayload(_)), "cut at {cut}: {err}");
        }
    }

    #[test]
    fn test_document_name_lookup() {
        let header = sample_header();
        assert_eq!(header.document_name(&LanguageTag::new("FR").unwrap()), Some("Titre de séjour"));
        assert_eq!(header.document_name(&LanguageTag::new("de").unwrap()), None);
    }
}
