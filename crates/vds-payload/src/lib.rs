//! # vds-payload — Typed Payload Fields
//!
//! The signed payload of a seal is an ordered list of named, typed fields.
//! This crate owns the field model ([`PayloadField`], [`FieldValue`]), the
//! semantic extensions that mark portraits and biometric samples, the
//! ordered [`PayloadMap`] with its biometric lookups, and the binary codec
//! in [`codec`].
//!
//! The low-level [`wire`] reader and writer are shared with the seal header
//! codec in `vds-seal`.

pub mod codec;
pub mod extension;
pub mod field;
pub mod map;
pub mod wire;

pub use extension::{BiometricDataType, BiometricFormat, FieldExtension, FieldExtensionType};
pub use field::{FieldType, FieldValue, PayloadField, MAX_VALUE_LEN};
pub use map::PayloadMap;
