//! # Seal Format Identifiers
//!
//! The second byte of every seal names the format revision. The revision
//! decides which payload field types may appear (see `vds-payload`).

use serde::{Deserialize, Serialize};

use crate::error::SealError;

/// Magic byte opening every seal.
pub const SEAL_MAGIC: u8 = 0xDC;

/// A supported seal format revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SealFormat {
    /// AFNOR XP Z42-101: scalar, binary and date fields.
    VdsAfnorXpZ42_101,
    /// AFNOR XP Z42-105: adds time and timestamp fields.
    VdsAfnorXpZ42_105,
}

impl SealFormat {
    /// Wire code of the format.
    pub fn code(&self) -> u8 {
        match self {
            Self::VdsAfnorXpZ42_101 => 0x01,
            Self::VdsAfnorXpZ42_105 => 0x02,
        }
    }

    /// Parse the wire code.
    ///
    /// # Errors
    ///
    /// `UnsupportedFormat` for any code this decoder does not know.
    pub fn from_code(code: u8) -> Result<Self, SealError> {
        match code {
            0x01 => Ok(Self::VdsAfnorXpZ42_101),
            0x02 => Ok(Self::VdsAfnorXpZ42_105),
            other => Err(SealError::UnsupportedFormat(format!(
                "unknown format code {other:#04x}"
            ))),
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VdsAfnorXpZ42_101 => "VdsAfnorXpZ42_101",
            Self::VdsAfnorXpZ42_105 => "VdsAfnorXpZ42_105",
        }
    }
}

impl std::fmt::Display for SealFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for format in [SealFormat::VdsAfnorXpZ42_101, SealFormat::VdsAfnorXpZ42_105] {
            assert_eq!(SealFormat::from_code(format.code()).unwrap(), format);
        }
    }

    #[test]
    fn test_unknown_code_is_unsupported() {
        assert!(matches!(
            SealFormat::from_code(0x00),
            Err(SealError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            SealFormat::from_code(0x7F),
            Err(SealError::UnsupportedFormat(_))
        ));
    }
}
