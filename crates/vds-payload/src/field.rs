//! # Typed Payload Fields
//!
//! A field is a name, a declared [`FieldType`], an optional value whose arm
//! always matches the declared type, and an optional semantic extension.
//!
//! ## Invariants
//!
//! - `PayloadField` fields are private; the constructors enforce that the
//!   value arm matches `field_type`, that names are 1..=255 bytes, that
//!   extensions only sit on `BINARY` fields, and that date/time values are
//!   representable on the wire (years 0..=9999, whole seconds).
//! - Typed accessors fail closed: the wrong arm is `TypeMismatch`, a null
//!   field is `NullValue`. No accessor ever returns a default value.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize, Serializer};
use vds_core::{SealError, SealFormat};

use crate::extension::FieldExtension;

/// Largest string or binary value a field may hold (16 MiB).
pub const MAX_VALUE_LEN: usize = 16 * 1024 * 1024;

/// Declared type of a payload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    /// Signed 64-bit integer.
    Integer,
    /// UTF-8 string.
    String,
    /// 32-bit IEEE-754 float.
    Float,
    /// Boolean.
    Boolean,
    /// Opaque bytes.
    Binary,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// UTC date and time, seconds precision.
    Timestamp,
}

impl FieldType {
    /// Wire code (low 7 bits of the field tag).
    pub fn code(&self) -> u8 {
        match self {
            Self::Integer => 0x01,
            Self::String => 0x02,
            Self::Float => 0x03,
            Self::Boolean => 0x04,
            Self::Binary => 0x05,
            Self::Date => 0x06,
            Self::Time => 0x07,
            Self::Timestamp => 0x08,
        }
    }

    /// Parse a wire code.
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0x01 => Self::Integer,
            0x02 => Self::String,
            0x03 => Self::Float,
            0x04 => Self::Boolean,
            0x05 => Self::Binary,
            0x06 => Self::Date,
            0x07 => Self::Time,
            0x08 => Self::Timestamp,
            _ => return None,
        })
    }

    /// Whether a seal of `format` may declare fields of this type.
    pub fn is_supported_by(&self, format: SealFormat) -> bool {
        match format {
            SealFormat::VdsAfnorXpZ42_101 => !matches!(self, Self::Time | Self::Timestamp),
            SealFormat::VdsAfnorXpZ42_105 => true,
        }
    }

    /// Upper-case name (`INTEGER`, `STRING`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::String => "STRING",
            Self::Float => "FLOAT",
            Self::Boolean => "BOOLEAN",
            Self::Binary => "BINARY",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-null field value, tagged by type.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// `INTEGER` value.
    Integer(i64),
    /// `STRING` value.
    String(String),
    /// `FLOAT` value.
    Float(f32),
    /// `BOOLEAN` value.
    Boolean(bool),
    /// `BINARY` value; may be empty.
    Binary(Vec<u8>),
    /// `DATE` value.
    Date(NaiveDate),
    /// `TIME` value.
    Time(NaiveTime),
    /// `TIMESTAMP` value (UTC).
    Timestamp(NaiveDateTime),
}

impl FieldValue {
    /// The type this value belongs to.
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Integer(_) => FieldType::Integer,
            Self::String(_) => FieldType::String,
            Self::Float(_) => FieldType::Float,
            Self::Boolean(_) => FieldType::Boolean,
            Self::Binary(_) => FieldType::Binary,
            Self::Date(_) => FieldType::Date,
            Self::Time(_) => FieldType::Time,
            Self::Timestamp(_) => FieldType::Timestamp,
        }
    }

    fn check_representable(&self) -> Result<(), String> {
        match self {
            Self::String(s) if s.len() > MAX_VALUE_LEN => Err("string value too long".into()),
            Self::Binary(b) if b.len() > MAX_VALUE_LEN => Err("binary value too long".into()),
            Self::Date(d) if !(0..=9999).contains(&d.year()) => {
                Err(format!("date year {} outside 0..=9999", d.year()))
            }
            Self::Time(t) if t.nanosecond() != 0 => Err("time must be whole seconds".into()),
            Self::Timestamp(ts) if ts.nanosecond() != 0 => {
                Err("timestamp must be whole seconds".into())
            }
            _ => Ok(()),
        }
    }
}

/// Floats compare bitwise so that `decode(encode(x)) == x` holds for NaN.
impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Binary(a), Self::Binary(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Time(a), Self::Time(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            _ => false,
        }
    }
}

/// Normalized textual form: dates `YYYY-MM-DD`, times `HH:MM:SS`,
/// timestamps `YYYY-MM-DDTHH:MM:SS`, binary as base64.
impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Float(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Binary(v) => f.write_str(&BASE64.encode(v)),
            Self::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Self::Time(v) => write!(f, "{}", v.format("%H:%M:%S")),
            Self::Timestamp(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Integer(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f32(*v),
            Self::Boolean(v) => serializer.serialize_bool(*v),
            Self::String(v) => serializer.serialize_str(v),
            other => serializer.collect_str(other),
        }
    }
}

/// A named, typed payload field.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadField {
    name: String,
    field_type: FieldType,
    value: Option<FieldValue>,
    extension: Option<FieldExtension>,
}

impl PayloadField {
    /// A field holding `value`.
    ///
    /// # Errors
    ///
    /// `MalformedPayload` if the name is empty or longer than 255 bytes, or
    /// if the value cannot be represented on the wire.
    pub fn new(name: impl Into<String>, value: FieldValue) -> Result<Self, SealError> {
        let name = validate_name(name.into())?;
        value
            .check_representable()
            .map_err(|e| SealError::MalformedPayload(format!("field {name:?}: {e}")))?;
        Ok(Self {
            field_type: value.field_type(),
            name,
            value: Some(value),
            extension: None,
        })
    }

    /// A null field of the given type.
    pub fn null(name: impl Into<String>, field_type: FieldType) -> Result<Self, SealError> {
        Ok(Self {
            name: validate_name(name.into())?,
            field_type,
            value: None,
            extension: None,
        })
    }

    /// Attach a semantic extension.
    ///
    /// # Errors
    ///
    /// `MalformedPayload` unless the field is `BINARY`.
    pub fn with_extension(mut self, extension: Option<FieldExtension>) -> Result<Self, SealError> {
        if extension.is_some() && self.field_type != FieldType::Binary {
            return Err(SealError::MalformedPayload(format!(
                "extension on non-binary field {:?} ({})",
                self.name, self.field_type
            )));
        }
        self.extension = extension;
        Ok(self)
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// True if the field carries no value.
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    /// The value, or `None` for a null field.
    pub fn value(&self) -> Option<&FieldValue> {
        self.value.as_ref()
    }

    /// Semantic extension, if any.
    pub fn extension(&self) -> Option<&FieldExtension> {
        self.extension.as_ref()
    }

    /// Normalized textual value; `"null"` for a null field.
    pub fn value_to_string(&self) -> String {
        self.value
            .as_ref()
            .map_or_else(|| "null".to_string(), ToString::to_string)
    }

    fn typed(&self, requested: FieldType) -> Result<&FieldValue, SealError> {
        if self.field_type != requested {
            return Err(SealError::TypeMismatch {
                field: self.name.clone(),
                requested: requested.to_string(),
                actual: self.field_type.to_string(),
            });
        }
        self.value
            .as_ref()
            .ok_or_else(|| SealError::NullValue(self.name.clone()))
    }

    /// `INTEGER` value.
    pub fn value_as_integer(&self) -> Result<i64, SealError> {
        match self.typed(FieldType::Integer)? {
            FieldValue::Integer(v) => Ok(*v),
            _ => Err(self.internal_mismatch(FieldType::Integer)),
        }
    }

    /// `STRING` value.
    pub fn value_as_string(&self) -> Result<&str, SealError> {
        match self.typed(FieldType::String)? {
            FieldValue::String(v) => Ok(v),
            _ => Err(self.internal_mismatch(FieldType::String)),
        }
    }

    /// `FLOAT` value.
    pub fn value_as_float(&self) -> Result<f32, SealError> {
        match self.typed(FieldType::Float)? {
            FieldValue::Float(v) => Ok(*v),
            _ => Err(self.internal_mismatch(FieldType::Float)),
        }
    }

    /// `BOOLEAN` value.
    pub fn value_as_boolean(&self) -> Result<bool, SealError> {
        match self.typed(FieldType::Boolean)? {
            FieldValue::Boolean(v) => Ok(*v),
            _ => Err(self.internal_mismatch(FieldType::Boolean)),
        }
    }

    /// `BINARY` value.
    pub fn value_as_binary(&self) -> Result<&[u8], SealError> {
        match self.typed(FieldType::Binary)? {
            FieldValue::Binary(v) => Ok(v),
            _ => Err(self.internal_mismatch(FieldType::Binary)),
        }
    }

    /// `DATE` value.
    pub fn value_as_date(&self) -> Result<NaiveDate, SealError> {
        match self.typed(FieldType::Date)? {
            FieldValue::Date(v) => Ok(*v),
            _ => Err(self.internal_mismatch(FieldType::Date)),
        }
    }

    /// `TIME` value.
    pub fn value_as_time(&self) -> Result<NaiveTime, SealError> {
        match self.typed(FieldType::Time)? {
            FieldValue::Time(v) => Ok(*v),
            _ => Err(self.internal_mismatch(FieldType::Time)),
        }
    }

    /// `TIMESTAMP` value.
    pub fn value_as_timestamp(&self) -> Result<NaiveDateTime, SealError> {
        match self.typed(FieldType::Timestamp)? {
            FieldValue::Timestamp(v) => Ok(*v),
            _ => Err(self.internal_mismatch(FieldType::Timestamp)),
        }
    }

    // Unreachable while the constructors hold the arm/type invariant.
    fn internal_mismatch(&self, requested: FieldType) -> SealError {
        SealError::TypeMismatch {
            field: self.name.clone(),
            requested: requested.to_string(),
            actual: self
                .value
                .as_ref()
                .map_or(self.field_type, FieldValue::field_type)
                .to_string(),
        }
    }
}

fn validate_name(name: String) -> Result<String, SealError> {
    if name.is_empty() || name.len() > 255 {
        return Err(SealError::MalformedPayload(format!(
            "field name must be 1-255 bytes, got {}",
            name.len()
        )));
    }
    Ok(name)
}
