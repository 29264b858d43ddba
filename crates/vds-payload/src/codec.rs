//! # Payload Codec
//!
//! Binary encoding of a [`PayloadMap`]. The payload is a sequence of
//! entries, each laid out as:
//!
//! ```text
//! tag        u8     low 7 bits: type code, bit 7: null flag
//! name       str8
//! extension  0x00 | 0x01 (portrait) | 0x02 data_type format
//! value      DER length + bytes, absent when the null flag is set
//! ```
//!
//! Value encodings:
//!
//! | Type        | Bytes                                              |
//! |-------------|----------------------------------------------------|
//! | `INTEGER`   | minimal big-endian two's complement, 1..=8 bytes   |
//! | `STRING`    | UTF-8                                              |
//! | `FLOAT`     | IEEE-754 binary32, big-endian                      |
//! | `BOOLEAN`   | one byte, `0x00` or `0x01`                         |
//! | `BINARY`    | raw                                                |
//! | `DATE`      | year u16, month u8, day u8                         |
//! | `TIME`      | hour u8, minute u8, second u8                      |
//! | `TIMESTAMP` | i64 seconds since the Unix epoch, big-endian       |

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike};
use vds_core::{SealError, SealFormat};

use crate::extension::FieldExtension;
use crate::field::{FieldType, FieldValue, PayloadField, MAX_VALUE_LEN};
use crate::map::PayloadMap;
use crate::wire::{Reader, Writer};

const NULL_FLAG: u8 = 0x80;

/// Decode a payload declared under `format`.
///
/// # Errors
///
/// `MalformedPayload` on truncation, unknown or format-disallowed type
/// codes, duplicate or empty names, extensions on non-binary fields, and
/// value bytes that do not fit their declared type.
pub fn decode(bytes: &[u8], format: SealFormat) -> Result<PayloadMap, SealError> {
    let mut r = Reader::new(bytes);
    let mut map = PayloadMap::new();
    while !r.is_empty() {
        let field = decode_entry(&mut r, format)?;
        map.insert(field)?;
    }
    tracing::trace!(fields = map.len(), %format, "decoded payload");
    Ok(map)
}

/// Encode a payload. Entries are written in map order.
///
/// # Errors
///
/// `MalformedPayload` if a field name exceeds 255 bytes.
pub fn encode(map: &PayloadMap) -> Result<Vec<u8>, SealError> {
    let mut w = Writer::new();
    for field in map {
        let null = if field.is_null() { NULL_FLAG } else { 0 };
        w.put_u8(field.field_type().code() | null);
        w.put_str8(field.name(), "field name")?;
        FieldExtension::encode(field.extension(), &mut w);
        if let Some(value) = field.value() {
            let bytes = encode_value(value);
            w.put_der_len(bytes.len());
            w.put_bytes(&bytes);
        }
    }
    Ok(w.into_bytes())
}

fn decode_entry(r: &mut Reader<'_>, format: SealFormat) -> Result<PayloadField, SealError> {
    let tag = r.u8("field tag")?;
    let code = tag & !NULL_FLAG;
    let field_type = FieldType::from_code(code)
        .ok_or_else(|| r.error(&format!("unknown field type code {code:#04x}")))?;
    if !field_type.is_supported_by(format) {
        return Err(r.error(&format!("{field_type} fields are not allowed in {format}")));
    }
    let name = r.str8("field name")?;
    if name.is_empty() {
        return Err(r.error("empty field name"));
    }
    let extension = FieldExtension::decode(r)?;

    let field = if tag & NULL_FLAG != 0 {
        PayloadField::null(name, field_type)?
    } else {
        let len = r.der_len("value length")?;
        if len > MAX_VALUE_LEN {
            return Err(r.error(&format!("value of {len} bytes exceeds limit")));
        }
        let raw = r.take(len, "field value")?;
        let value = decode_value(field_type, raw)
            .map_err(|e| SealError::MalformedPayload(format!("field {name:?}: {e}")))?;
        PayloadField::new(name, value)?
    };
    field.with_extension(extension)
}

fn encode_value(value: &FieldValue) -> Vec<u8> {
    match value {
        FieldValue::Integer(v) => encode_integer(*v),
        FieldValue::String(s) => s.as_bytes().to_vec(),
        FieldValue::Float(v) => v.to_be_bytes().to_vec(),
        FieldValue::Boolean(v) => vec![u8::from(*v)],
        FieldValue::Binary(b) => b.clone(),
        FieldValue::Date(d) => {
            // Constructors keep the year inside 0..=9999.
            let year = u16::try_from(d.year()).unwrap_or(0);
            let mut out = year.to_be_bytes().to_vec();
            out.push(d.month() as u8);
            out.push(d.day() as u8);
            out
        }
        FieldValue::Time(t) => vec![t.hour() as u8, t.minute() as u8, t.second() as u8],
        FieldValue::Timestamp(ts) => ts.and_utc().timestamp().to_be_bytes().to_vec(),
    }
}

fn decode_value(field_type: FieldType, raw: &[u8]) -> Result<FieldValue, String> {
    Ok(match field_type {
        FieldType::Integer => FieldValue::Integer(decode_integer(raw)?),
        FieldType::String => FieldValue::String(
            String::from_utf8(raw.to_vec()).map_err(|_| "string is not valid UTF-8".to_string())?,
        ),
        FieldType::Float => {
            let bytes: [u8; 4] = raw
                .try_into()
                .map_err(|_| format!("float must be 4 bytes, got {}", raw.len()))?;
            FieldValue::Float(f32::from_be_bytes(bytes))
        }
        FieldType::Boolean => match raw {
            [0x00] => FieldValue::Boolean(false),
            [0x01] => FieldValue::Boolean(true),
            _ => return Err(format!("invalid boolean encoding {raw:02x?}")),
        },
        FieldType::Binary => FieldValue::Binary(raw.to_vec()),
        FieldType::Date => match raw {
            [y0, y1, m, d] => {
                let year = i32::from(u16::from_be_bytes([*y0, *y1]));
                NaiveDate::from_ymd_opt(year, u32::from(*m), u32::from(*d))
                    .map(FieldValue::Date)
                    .ok_or_else(|| format!("invalid date {year:04}-{m:02}-{d:02}"))?
            }
            _ => return Err(format!("date must be 4 bytes, got {}", raw.len())),
        },
        FieldType::Time => match raw {
            [h, m, s] => NaiveTime::from_hms_opt(u32::from(*h), u32::from(*m), u32::from(*s))
                .map(FieldValue::Time)
                .ok_or_else(|| format!("invalid time {h:02}:{m:02}:{s:02}"))?,
            _ => return Err(format!("time must be 3 bytes, got {}", raw.len())),
        },
        FieldType::Timestamp => {
            let bytes: [u8; 8] = raw
                .try_into()
                .map_err(|_| format!("timestamp must be 8 bytes, got {}", raw.len()))?;
            let secs = i64::from_be_bytes(bytes);
            DateTime::from_timestamp(secs, 0)
                .map(|dt| FieldValue::Timestamp(dt.naive_utc()))
                .ok_or_else(|| format!("timestamp {secs} out of range"))?
        }
    })
}

/// Shortest big-endian two's complement form of `v`.
fn encode_integer(v: i64) -> Vec<u8> {
    let be = v.to_be_bytes();
    let mut start = 0;
    while start < 7 {
        let redundant = (be[start] == 0x00 && be[start + 1] & 0x80 == 0)
            || (be[start] == 0xFF && be[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    be[start..].to_vec()
}

fn decode_integer(raw: &[u8]) -> Result<i64, String> {
    if raw.is_empty() || raw.len() > 8 {
        return Err(format!("integer must be 1-8 bytes, got {}", raw.len()));
    }
    let fill = if raw[0] & 0x80 != 0 { 0xFF } else { 0x00 };
    let mut be = [fill; 8];
    be[8 - raw.len()..].copy_from_slice(raw);
    Ok(i64::from_be_bytes(be))
}
