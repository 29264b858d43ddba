//! # Canonical Serialization for Signed Governance Bodies
//!
//! Governance artifacts (LoTL, TSL, issuer manifests) and signing
//! certificates are JSON documents whose `body` is signed with Ed25519.
//! Signer and verifier must agree on the exact byte sequence, so every
//! signed body flows through [`CanonicalBytes::new()`], which produces
//! RFC 8785 (JCS) output: sorted keys, compact separators, UTF-8.
//!
//! ## Security Invariant
//!
//! The inner `Vec<u8>` is private. A verification routine that accepts
//! `&CanonicalBytes` cannot be handed the raw bytes of a fetched document,
//! which may carry arbitrary whitespace or key order.
//!
//! Floats are rejected: JCS number formatting is the one place where
//! independent implementations disagree, and no governance body needs them.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructor is [`CanonicalBytes::new()`].
/// - Object keys are sorted, separators are compact.
/// - The document contains no floating point numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// `FloatRejected` if the value contains a non-integral number,
    /// `SerializationFailed` if serde cannot represent the value as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if !n.is_i64() && !n.is_u64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_keys_compact_separators() {
        let data = serde_json::json!({"tsl_url": "https://x", "country": "FR", "authority_id": "FR01"});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(
            std::str::from_utf8(cb.as_bytes()).unwrap(),
            r#"{"authority_id":"FR01","country":"FR","tsl_url":"https://x"}"#
        );
    }

    #[test]
    fn test_nested_objects_sorted() {
        let data = serde_json::json!({"entries": [{"b": 2, "a": 1}], "seq": 3});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"entries":[{"a":1,"b":2}],"seq":3}"#);
    }

    #[test]
    fn test_whitespace_and_order_do_not_matter() {
        let a: Value = serde_json::from_str(r#"{ "x" : 1,   "y": [true, null] }"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"y":[true,null],"x":1}"#).unwrap();
        assert_eq!(CanonicalBytes::new(&a).unwrap(), CanonicalBytes::new(&b).unwrap());
    }

    #[test]
    fn test_float_rejected_at_any_depth() {
        let data = serde_json::json!({"a": {"b": [{"c": 3.25}]}});
        match CanonicalBytes::new(&data) {
            Err(CanonicalizationError::FloatRejected(f)) => assert_eq!(f, 3.25),
            other => panic!("expected FloatRejected, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_and_large_integers_accepted() {
        let data = serde_json::json!({"n": -42, "big": 9_999_999_999i64});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"big":9999999999,"n":-42}"#);
        assert!(!cb.is_empty());
        assert_eq!(cb.len(), cb.as_ref().len());
    }

    #[test]
    fn test_unicode_passthrough() {
        let data = serde_json::json!({"name": "Titre de s\u{e9}jour"});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert!(std::str::from_utf8(cb.as_bytes()).unwrap().contains('\u{e9}'));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn json_value_no_floats() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            "[a-zA-Z0-9_ ]{0,40}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,8}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn canonical_bytes_deterministic(value in json_value_no_floats()) {
            let a = CanonicalBytes::new(&value).unwrap();
            let b = CanonicalBytes::new(&value).unwrap();
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
        }

        #[test]
        fn canonical_bytes_reparse_to_same_value(value in json_value_no_floats()) {
            let cb = CanonicalBytes::new(&value).unwrap();
            let parsed: Value = serde_json::from_slice(cb.as_bytes()).unwrap();
            prop_assert_eq!(parsed, value);
        }
    }
}
