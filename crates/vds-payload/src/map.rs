//! # Payload Map
//!
//! Ordered collection of payload fields. Insertion order is encoding order,
//! and names are unique within a map.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use vds_core::SealError;

use crate::extension::{BiometricDataType, BiometricFormat, FieldExtension, FieldExtensionType};
use crate::field::PayloadField;

/// Ordered mapping from field name to [`PayloadField`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayloadMap {
    fields: Vec<PayloadField>,
    // name -> position in `fields`
    index: HashMap<String, usize>,
}

impl PayloadMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    ///
    /// # Errors
    ///
    /// `MalformedPayload` if a field with the same name is already present.
    pub fn insert(&mut self, field: PayloadField) -> Result<(), SealError> {
        match self.index.entry(field.name().to_owned()) {
            Entry::Occupied(slot) => Err(SealError::MalformedPayload(format!(
                "duplicate field name {:?}",
                slot.key()
            ))),
            Entry::Vacant(slot) => {
                slot.insert(self.fields.len());
                self.fields.push(field);
                Ok(())
            }
        }
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&PayloadField> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Fields in encoding order.
    pub fn iter(&self) -> std::slice::Iter<'_, PayloadField> {
        self.fields.iter()
    }

    /// Field names in encoding order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(PayloadField::name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the map has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Biometric fields of the given modality, optionally restricted to one
    /// encoding format. An empty result means "none present".
    pub fn find_biometrics(
        &self,
        data_type: BiometricDataType,
        format: Option<BiometricFormat>,
    ) -> Vec<&PayloadField> {
        self.fields
            .iter()
            .filter(|f| match f.extension() {
                Some(FieldExtension::Biometric { data_type: dt, format: fmt }) => {
                    *dt == data_type && format.map_or(true, |wanted| wanted == *fmt)
                }
                _ => false,
            })
            .collect()
    }

    /// Fields carrying an extension of the given kind.
    pub fn find_fields_by_extension(&self, extension_type: FieldExtensionType) -> Vec<&PayloadField> {
        self.fields
            .iter()
            .filter(|f| f.extension().map(FieldExtension::extension_type) == Some(extension_type))
            .collect()
    }

    /// True if a face template is present.
    pub fn contains_face_templates(&self) -> bool {
        !self.find_biometrics(BiometricDataType::FacialFeatures, None).is_empty()
    }

    /// True if a face image is present, either as a biometric sample or a portrait.
    pub fn contains_face_images(&self) -> bool {
        self.contains_portraits()
            || !self.find_biometrics(BiometricDataType::FaceImage, None).is_empty()
    }

    /// True if a portrait is present.
    pub fn contains_portraits(&self) -> bool {
        !self.find_fields_by_extension(FieldExtensionType::Portrait).is_empty()
    }

    /// True if a fingerprint template is present.
    pub fn contains_finger_templates(&self) -> bool {
        !self.find_biometrics(BiometricDataType::FingerTemplate, None).is_empty()
    }
}

impl<'a> IntoIterator for &'a PayloadMap {
    type Item = &'a PayloadField;
    type IntoIter = std::slice::Iter<'a, PayloadField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Serializes as an object in field order; null fields become `null`.
impl Serialize for PayloadMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(field.name(), &field.value())?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldType, FieldValue};

    fn binary(name: &str, ext: FieldExtension) -> PayloadField {
        PayloadField::new(name, FieldValue::Binary(vec![0xAB]))
            .unwrap()
            .with_extension(Some(ext))
            .unwrap()
    }

    fn sample() -> PayloadMap {
        let mut map = PayloadMap::new();
        map.insert(PayloadField::new("last_name", FieldValue::String("DUPONT".into())).unwrap())
            .unwrap();
        map.insert(PayloadField::null("first_name", FieldType::String).unwrap()).unwrap();
        map.insert(binary("portrait", FieldExtension::Portrait)).unwrap();
        map.insert(binary(
            "face_template",
            FieldExtension::Biometric {
                data_type: BiometricDataType::FacialFeatures,
                format: BiometricFormat::Proprietary,
            },
        ))
        .unwrap();
        map
    }

    #[test]
    fn test_insertion_order_preserved() {
        let names: Vec<_> = sample().names().map(str::to_owned).collect();
        assert_eq!(names, ["last_name", "first_name", "portrait", "face_template"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut map = sample();
        let dup = PayloadField::new("last_name", FieldValue::Integer(1)).unwrap();
        assert!(matches!(map.insert(dup), Err(SealError::MalformedPayload(_))));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_get_by_name() {
        let map = sample();
        assert_eq!(map.get("portrait").unwrap().name(), "portrait");
        assert_eq!(map.get("first_name").unwrap().value(), None);
        assert!(map.get("missing").is_none());
    }

    #[test]
    fn test_find_biometrics_by_type_and_format() {
        let map = sample();
        assert_eq!(map.find_biometrics(BiometricDataType::FacialFeatures, None).len(), 1);
        assert_eq!(
            map.find_biometrics(BiometricDataType::FacialFeatures, Some(BiometricFormat::Proprietary))
                .len(),
            1
        );
        assert!(map
            .find_biometrics(BiometricDataType::FacialFeatures, Some(BiometricFormat::Webp))
            .is_empty());
        assert!(map.find_biometrics(BiometricDataType::IrisImage, None).is_empty());
    }

    #[test]
    fn test_empty_lookup_is_not_an_error() {
        let mut map = PayloadMap::new();
        map.insert(PayloadField::new("name", FieldValue::String("A".into())).unwrap()).unwrap();
        assert!(map.find_biometrics(BiometricDataType::FacialFeatures, None).is_empty());
        assert!(map.find_fields_by_extension(FieldExtensionType::Portrait).is_empty());
        assert!(!map.contains_face_templates());
        assert!(!map.contains_face_images());
    }

    #[test]
    fn test_presence_helpers() {
        let map = sample();
        assert!(map.contains_portraits());
        assert!(map.contains_face_images());
        assert!(map.contains_face_templates());
        assert!(!map.contains_finger_templates());
        let portraits = map.find_fields_by_extension(FieldExtensionType::Portrait);
        assert_eq!(portraits[0].name(), "portrait");
    }

    #[test]
    fn test_serializes_in_order_with_nulls() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"last_name":"DUPONT","first_name":null,"portrait":"qw==","face_template":"qw=="}"#
        );
    }
}
