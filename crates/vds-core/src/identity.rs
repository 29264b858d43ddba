//! # Domain Identity Newtypes
//!
//! Validated wrappers for the identifiers carried in a seal header and in
//! governance documents. You cannot pass a `CountryCode` where an
//! `AuthorityId` is expected, and neither can be constructed from an
//! arbitrary string without validation.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SealError;

/// Use-case identifier from the issuer manifest (24 bits on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ManifestId(u32);

impl ManifestId {
    /// Largest value representable in the 3-byte header field.
    pub const MAX: u32 = 0x00FF_FFFF;

    /// Create a manifest id, rejecting values wider than 24 bits.
    pub fn new(value: u32) -> Result<Self, SealError> {
        if value > Self::MAX {
            return Err(SealError::InvalidIdentifier(format!(
                "manifest id {value:#x} exceeds 24 bits"
            )));
        }
        Ok(Self(value))
    }

    /// The numeric value.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ManifestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06X}", self.0)
    }
}

impl<'de> Deserialize<'de> for ManifestId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = u32::deserialize(deserializer)?;
        Self::new(v).map_err(serde::de::Error::custom)
    }
}

/// Identifier of the certificate authority that issued the signing
/// certificate (e.g. `FR01`). 1–16 ASCII alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AuthorityId(String);

impl AuthorityId {
    /// Validate and wrap an authority identifier.
    pub fn new(s: impl Into<String>) -> Result<Self, SealError> {
        let s = s.into();
        if s.is_empty() || s.len() > 16 || !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SealError::InvalidIdentifier(format!(
                "authority id must be 1-16 ASCII alphanumerics, got {s:?}"
            )));
        }
        Ok(Self(s))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AuthorityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AuthorityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Self::new(String::deserialize(deserializer)?).map_err(serde::de::Error::custom)
    }
}

/// ISO 3166-1 alpha-2 country code, upper case (e.g. `FR`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    /// Validate and wrap a country code. Lower case input is normalized.
    pub fn new(s: &str) -> Result<Self, SealError> {
        let upper = s.trim().to_ascii_uppercase();
        if upper.len() != 2 || !upper.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(SealError::InvalidIdentifier(format!(
                "country code must be two ASCII letters, got {s:?}"
            )));
        }
        Ok(Self(upper))
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CountryCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Self::new(&String::deserialize(deserializer)?).map_err(serde::de::Error::custom)
    }
}

/// Presentation language tag: a 2–3 letter primary subtag, optionally
/// followed by `-` and a 2-letter region (`en`, `fr`, `pt-BR`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LanguageTag(String);

impl LanguageTag {
    /// Validate a language tag. The primary subtag is lower-cased and the
    /// region upper-cased.
    pub fn new(s: &str) -> Result<Self, SealError> {
        let invalid = || SealError::InvalidIdentifier(format!("invalid language tag {s:?}"));
        let mut parts = s.trim().splitn(2, '-');
        let primary = parts.next().unwrap_or_default().to_ascii_lowercase();
        if !(2..=3).contains(&primary.len()) || !primary.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(invalid());
        }
        match parts.next() {
            None => Ok(Self(primary)),
            Some(region) => {
                let region = region.to_ascii_uppercase();
                if region.len() != 2 || !region.chars().all(|c| c.is_ascii_uppercase()) {
                    return Err(invalid());
                }
                Ok(Self(format!("{primary}-{region}")))
            }
        }
    }

    /// The tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LanguageTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Self::new(&String::deserialize(deserializer)?).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_id_24_bit_limit() {
        assert!(ManifestId::new(0xFFFFFF).is_ok());
        assert!(ManifestId::new(0x1000000).is_err());
        assert_eq!(ManifestId::new(0x0A12).unwrap().to_string(), "000A12");
    }

    #[test]
    fn test_authority_id_validation() {
        assert_eq!(AuthorityId::new("FR01").unwrap().as_str(), "FR01");
        assert!(AuthorityId::new("").is_err());
        assert!(AuthorityId::new("FR 01").is_err());
        assert!(AuthorityId::new("A".repeat(17)).is_err());
    }

    #[test]
    fn test_country_code_normalized() {
        assert_eq!(CountryCode::new("fr").unwrap().as_str(), "FR");
        assert!(CountryCode::new("FRA").is_err());
        assert!(CountryCode::new("F1").is_err());
    }

    #[test]
    fn test_language_tag_forms() {
        assert_eq!(LanguageTag::new("EN").unwrap().as_str(), "en");
        assert_eq!(LanguageTag::new("pt-br").unwrap().as_str(), "pt-BR");
        assert!(LanguageTag::new("e").is_err());
        assert!(LanguageTag::new("en-").is_err());
        assert!(LanguageTag::new("en-USA").is_err());
    }

    #[test]
    fn test_identifiers_deserialize_with_validation() {
        let id: AuthorityId = serde_json::from_str("\"FR01\"").unwrap();
        assert_eq!(id.as_str(), "FR01");
        assert!(serde_json::from_str::<AuthorityId>("\"bad id\"").is_err());
        assert!(serde_json::from_str::<ManifestId>("16777216").is_err());
    }
}
