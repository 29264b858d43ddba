//! JSON projection of the payload.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use vds_core::SealError;

use crate::document::SealedDocument;

impl SealedDocument {
    /// Serialize the payload as a JSON object in field order.
    ///
    /// `indent` is the string used per nesting level; an empty indent
    /// yields compact JSON. Binary values are base64, dates and times
    /// their normalized text, null fields `null`.
    pub fn build_payload_as_json(&self, indent: &str) -> Result<String, SealError> {
        to_json(self.payload(), indent)
    }
}

pub(crate) fn to_json<T: Serialize>(value: &T, indent: &str) -> Result<String, SealError> {
    let bytes = if indent.is_empty() {
        serde_json::to_vec(value)
    } else {
        let mut out = Vec::new();
        let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
        value.serialize(&mut ser).map(|()| out)
    }
    .map_err(|e| SealError::Serialization(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| SealError::Serialization(e.to_string()))
}
