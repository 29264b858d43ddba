//! # Semantic Field Extensions
//!
//! A binary field may carry a semantic tag telling consumers what the bytes
//! are: an ID portrait, or a biometric sample of a given modality and
//! encoding format. Extensions are only legal on `BINARY` fields.

use serde::{Deserialize, Serialize};
use vds_core::SealError;

use crate::wire::{Reader, Writer};

/// Biometric modality of a biometric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BiometricDataType {
    /// Face template (feature vector).
    FacialFeatures,
    /// Face image.
    FaceImage,
    /// Fingerprint minutiae template.
    FingerTemplate,
    /// Fingerprint image.
    FingerImage,
    /// Iris image.
    IrisImage,
}

impl BiometricDataType {
    fn code(self) -> u8 {
        match self {
            Self::FacialFeatures => 0x01,
            Self::FaceImage => 0x02,
            Self::FingerTemplate => 0x03,
            Self::FingerImage => 0x04,
            Self::IrisImage => 0x05,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0x01 => Self::FacialFeatures,
            0x02 => Self::FaceImage,
            0x03 => Self::FingerTemplate,
            0x04 => Self::FingerImage,
            0x05 => Self::IrisImage,
            _ => return None,
        })
    }
}

/// Encoding format of a biometric sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BiometricFormat {
    /// Format not declared by the issuer.
    Undefined,
    /// ISO/IEC 19794-2 finger minutiae.
    IsoIec19794_2,
    /// ISO/IEC 19794-4 finger image.
    IsoIec19794_4,
    /// ISO/IEC 19794-5 face image.
    IsoIec19794_5,
    /// ISO/IEC 19794-6 iris image.
    IsoIec19794_6,
    /// WebP image.
    Webp,
    /// JPEG 2000 image.
    Jpeg2000,
    /// Vendor-specific template.
    Proprietary,
}

impl BiometricFormat {
    fn code(self) -> u8 {
        match self {
            Self::Undefined => 0x00,
            Self::IsoIec19794_2 => 0x01,
            Self::IsoIec19794_4 => 0x02,
            Self::IsoIec19794_5 => 0x03,
            Self::IsoIec19794_6 => 0x04,
            Self::Webp => 0x05,
            Self::Jpeg2000 => 0x06,
            Self::Proprietary => 0xFF,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0x00 => Self::Undefined,
            0x01 => Self::IsoIec19794_2,
            0x02 => Self::IsoIec19794_4,
            0x03 => Self::IsoIec19794_5,
            0x04 => Self::IsoIec19794_6,
            0x05 => Self::Webp,
            0x06 => Self::Jpeg2000,
            0xFF => Self::Proprietary,
            _ => return None,
        })
    }
}

/// The semantic tag attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldExtension {
    /// ID portrait of the holder.
    Portrait,
    /// Biometric sample.
    Biometric {
        /// Modality.
        data_type: BiometricDataType,
        /// Encoding format.
        format: BiometricFormat,
    },
}

/// Extension kinds, for [`crate::PayloadMap::find_fields_by_extension`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldExtensionType {
    /// Matches [`FieldExtension::Portrait`].
    Portrait,
    /// Matches any [`FieldExtension::Biometric`].
    Biometric,
}

impl FieldExtension {
    /// The kind of this extension.
    pub fn extension_type(&self) -> FieldExtensionType {
        match self {
            Self::Portrait => FieldExtensionType::Portrait,
            Self::Biometric { .. } => FieldExtensionType::Biometric,
        }
    }

    pub(crate) fn encode(ext: Option<&FieldExtension>, w: &mut Writer) {
        match ext {
            None => w.put_u8(0x00),
            Some(Self::Portrait) => w.put_u8(0x01),
            Some(Self::Biometric { data_type, format }) => {
                w.put_u8(0x02);
                w.put_u8(data_type.code());
                w.put_u8(format.code());
            }
        }
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Option<FieldExtension>, SealError> {
        match r.u8("extension code")? {
            0x00 => Ok(None),
            0x01 => Ok(Some(Self::Portrait)),
            0x02 => {
                let dt = r.u8("biometric data type")?;
                let data_type = BiometricDataType::from_code(dt)
                    .ok_or_else(|| r.error(&format!("unknown biometric data type {dt:#04x}")))?;
                let fmt = r.u8("biometric format")?;
                let format = BiometricFormat::from_code(fmt)
                    .ok_or_else(|| r.error(&format!("unknown biometric format {fmt:#04x}")))?;
                Ok(Some(Self::Biometric { data_type, format }))
            }
            other => Err(r.error(&format!("unknown extension code {other:#04x}"))),
        }
    }
}
