//! Structured-field projection
//!
//! A record shape is described by a static table of [`Field`]s. Each entry
//! names a wire member and the rule used to move it between the record's
//! natural JSON form and the wire form:
//!
//! - [`FieldRule::PassThrough`] copies the value as-is
//! - [`FieldRule::Omit`] never writes the value to the wire
//! - [`FieldRule::Nested`] runs a sub-encoder / sub-decoder pair
//!
//! Absent members are never emitted, and neither is a JSON `null` under a
//! nested rule. A pass-through member is document data, so its `null` is a
//! value and is carried as-is. Members that the table does not name are
//! dropped in both directions.

use super::error::{json_type, CodecError, CodecResult};
use super::scalar::{decode_blob, encode_blob};
use serde_json::{Map, Value};

/// Conversion applied to a single member value
pub type Transform = fn(&Value) -> CodecResult<Value>;

/// How a member moves between natural and wire form
#[derive(Debug, Clone, Copy)]
pub enum FieldRule {
    /// Copy the value unchanged
    PassThrough,
    /// Keep the value off the wire
    Omit,
    /// Apply a sub-encoder on the way out and a sub-decoder on the way in
    Nested { encode: Transform, decode: Transform },
}

/// One entry of a field table
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Wire member name
    pub name: &'static str,
    /// Rule for this member
    pub rule: FieldRule,
}

impl Field {
    pub const fn pass(name: &'static str) -> Self {
        Self {
            name,
            rule: FieldRule::PassThrough,
        }
    }

    pub const fn omit(name: &'static str) -> Self {
        Self {
            name,
            rule: FieldRule::Omit,
        }
    }

    pub const fn nested(name: &'static str, encode: Transform, decode: Transform) -> Self {
        Self {
            name,
            rule: FieldRule::Nested { encode, decode },
        }
    }

    /// Binary member, base64 on the wire
    pub const fn blob(name: &'static str) -> Self {
        Self::nested(name, encode_blob, decode_blob)
    }
}

/// Look up a member's entry in a field table
pub fn find_field<'a>(fields: &'a [Field], name: &str) -> Option<&'a Field> {
    fields.iter().find(|field| field.name == name)
}

/// Build a wire object from a record's natural form
pub fn project(record: &Map<String, Value>, fields: &[Field]) -> CodecResult<Map<String, Value>> {
    let mut wire = Map::new();

    for field in fields {
        let Some(value) = member(record, field) else {
            continue;
        };

        match field.rule {
            FieldRule::PassThrough => {
                wire.insert(field.name.to_string(), value.clone());
            }
            FieldRule::Omit => {}
            FieldRule::Nested { encode, .. } => {
                let encoded = encode(value).map_err(|e| e.in_field(field.name))?;
                wire.insert(field.name.to_string(), encoded);
            }
        }
    }

    Ok(wire)
}

/// Read a record's natural form back out of a wire object
pub fn unproject(wire: &Map<String, Value>, fields: &[Field]) -> CodecResult<Map<String, Value>> {
    let mut record = Map::new();

    for field in fields {
        let Some(value) = member(wire, field) else {
            continue;
        };

        match field.rule {
            FieldRule::PassThrough => {
                record.insert(field.name.to_string(), value.clone());
            }
            FieldRule::Omit => {}
            FieldRule::Nested { decode, .. } => {
                let decoded = decode(value).map_err(|e| e.in_field(field.name))?;
                record.insert(field.name.to_string(), decoded);
            }
        }
    }

    Ok(record)
}

/// Whether a JSON `null` under this rule is data rather than absence
pub(crate) fn keeps_null(rule: &FieldRule) -> bool {
    matches!(rule, FieldRule::PassThrough)
}

fn member<'a>(object: &'a Map<String, Value>, field: &Field) -> Option<&'a Value> {
    object
        .get(field.name)
        .filter(|value| !value.is_null() || keeps_null(&field.rule))
}

/// Borrow a value as a JSON object or report a type mismatch
pub(crate) fn as_object<'a>(
    shape: &'static str,
    value: &'a Value,
) -> CodecResult<&'a Map<String, Value>> {
    value.as_object().ok_or(CodecError::UnexpectedType {
        shape,
        expected: "object",
        found: json_type(value),
    })
}
