//! Scalar and binary value handling
//!
//! Strings, numbers and booleans travel as plain JSON. Binary fields are
//! base64 encoded on the wire. Document fields are schema-free JSON and are
//! passed through untouched.

use super::error::{json_type, CodecError, CodecResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema-free nested data, carried through the codec without interpretation
pub type Document = Value;

/// Raw bytes
///
/// In its natural form a blob is a sequence of octets; the field rule
/// [`Field::blob`](super::projector::Field::blob) turns that into base64 on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blob(pub Vec<u8>);

impl Blob {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Blob(bytes)
    }
}

impl From<&[u8]> for Blob {
    fn from(bytes: &[u8]) -> Self {
        Blob(bytes.to_vec())
    }
}

/// Encode bytes as standard, padded base64
pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64 into bytes
pub fn decode_bytes(text: &str) -> CodecResult<Vec<u8>> {
    STANDARD
        .decode(text)
        .map_err(|e| CodecError::InvalidBlob {
            message: e.to_string(),
        })
}

/// Natural blob (array of octets) to wire blob (base64 string)
pub fn encode_blob(natural: &Value) -> CodecResult<Value> {
    let items = natural.as_array().ok_or(CodecError::UnexpectedType {
        shape: "Blob",
        expected: "array of octets",
        found: json_type(natural),
    })?;

    let mut bytes = Vec::with_capacity(items.len());
    for item in items {
        let octet = item
            .as_u64()
            .and_then(|n| u8::try_from(n).ok())
            .ok_or_else(|| CodecError::InvalidBlob {
                message: format!("{} is not an octet", item),
            })?;
        bytes.push(octet);
    }

    Ok(Value::String(encode_bytes(&bytes)))
}

/// Wire blob (base64 string) to natural blob (array of octets)
pub fn decode_blob(wire: &Value) -> CodecResult<Value> {
    let text = wire.as_str().ok_or(CodecError::UnexpectedType {
        shape: "Blob",
        expected: "base64 string",
        found: json_type(wire),
    })?;

    let bytes = decode_bytes(text)?;
    Ok(Value::Array(bytes.into_iter().map(Value::from).collect()))
}

/// Read a string member from a JSON object, if present
pub fn expect_string<'a>(object: &'a Value, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str)
}
