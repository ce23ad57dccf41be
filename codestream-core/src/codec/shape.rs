//! Shapes: records and variants with a static wire layout
//!
//! Every request, event and exception type implements [`Shape`]. Its serde
//! derive produces the *natural* JSON form (camelCase members, `None`
//! skipped); its [`Layout`] describes how that natural form maps to the wire.
//!
//! Variants are Rust enums whose natural form is externally tagged
//! (`{"tag": payload}`). Each variant enum carries one extra case renamed to
//! [`UNKNOWN_TAG`] that holds the raw `(tag, payload)` pair of an alternative
//! this client does not know about.

use super::error::{CodecError, CodecResult};
use super::projector::{as_object, find_field, keeps_null, project, unproject, Field, FieldRule};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Natural-form tag of the "unrecognized" alternative of every variant
pub const UNKNOWN_TAG: &str = "$unknown";

/// Wire layout of a shape
#[derive(Debug, Clone, Copy)]
pub enum Layout {
    /// Flat object; one table entry per member
    Record(&'static [Field]),
    /// Single-key object; one table entry per alternative
    Variant(&'static [Field]),
}

/// A type with a fixed wire layout
pub trait Shape: Serialize + DeserializeOwned {
    /// Shape name used in error messages
    const NAME: &'static str;

    /// How the natural form maps onto the wire
    const LAYOUT: Layout;
}

/// Encode a shape into its wire value
pub fn to_wire<S: Shape>(shape: &S) -> CodecResult<Value> {
    let natural = serde_json::to_value(shape).map_err(|source| CodecError::Serde {
        shape: S::NAME,
        source,
    })?;
    encode_value::<S>(&natural)
}

/// Decode a shape from its wire value
pub fn from_wire<S: Shape>(wire: &Value) -> CodecResult<S> {
    let natural = decode_value::<S>(wire)?;
    serde_json::from_value(natural).map_err(|source| CodecError::Serde {
        shape: S::NAME,
        source,
    })
}

/// Decode a shape from a JSON document; an empty document reads as `{}`
pub fn from_wire_slice<S: Shape>(bytes: &[u8]) -> CodecResult<S> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return from_wire(&Value::Object(Map::new()));
    }
    let wire: Value = serde_json::from_slice(bytes).map_err(|source| CodecError::Serde {
        shape: S::NAME,
        source,
    })?;
    from_wire(&wire)
}

/// Natural form to wire form, following `S::LAYOUT`
pub fn encode_value<S: Shape>(natural: &Value) -> CodecResult<Value> {
    match S::LAYOUT {
        Layout::Record(fields) => {
            let record = as_object(S::NAME, natural)?;
            Ok(Value::Object(project(record, fields)?))
        }
        Layout::Variant(alternatives) => encode_variant(S::NAME, alternatives, natural),
    }
}

/// Wire form to natural form, following `S::LAYOUT`
pub fn decode_value<S: Shape>(wire: &Value) -> CodecResult<Value> {
    match S::LAYOUT {
        Layout::Record(fields) => {
            let object = as_object(S::NAME, wire)?;
            Ok(Value::Object(unproject(object, fields)?))
        }
        Layout::Variant(alternatives) => decode_variant(S::NAME, alternatives, wire),
    }
}

/// Encode every element of a list of shapes
pub fn encode_list<S: Shape>(natural: &Value) -> CodecResult<Value> {
    map_list(S::NAME, natural, encode_value::<S>)
}

/// Decode every element of a list of shapes
pub fn decode_list<S: Shape>(wire: &Value) -> CodecResult<Value> {
    map_list(S::NAME, wire, decode_value::<S>)
}

/// Table entry for a member holding a nested shape
pub const fn nested<S: Shape>(name: &'static str) -> Field {
    Field::nested(name, encode_value::<S>, decode_value::<S>)
}

/// Table entry for a member holding a list of nested shapes
pub const fn list_of<S: Shape>(name: &'static str) -> Field {
    Field::nested(name, encode_list::<S>, decode_list::<S>)
}

fn map_list(
    shape: &'static str,
    value: &Value,
    transform: fn(&Value) -> CodecResult<Value>,
) -> CodecResult<Value> {
    let items = value.as_array().ok_or(CodecError::UnexpectedType {
        shape,
        expected: "array",
        found: super::error::json_type(value),
    })?;

    items
        .iter()
        .filter(|item| !item.is_null())
        .map(transform)
        .collect::<CodecResult<Vec<_>>>()
        .map(Value::Array)
}

fn encode_variant(
    shape: &'static str,
    alternatives: &'static [Field],
    natural: &Value,
) -> CodecResult<Value> {
    let (tag, payload) = single_member(shape, alternatives, natural)?;

    if tag == UNKNOWN_TAG {
        let (raw_tag, raw_payload) = unknown_parts(shape, payload)?;
        if declares(alternatives, raw_tag) {
            return Err(CodecError::invalid_input(
                raw_tag,
                format!("unknown alternative of `{}` reuses a declared tag", shape),
            ));
        }
        return Ok(tagged(raw_tag, raw_payload.clone()));
    }

    let alternative = find_field(alternatives, tag).ok_or_else(|| CodecError::UnknownAlternative {
        shape,
        tag: tag.to_string(),
    })?;

    let encoded = match alternative.rule {
        FieldRule::PassThrough => payload.clone(),
        FieldRule::Nested { encode, .. } => {
            encode(payload).map_err(|e| e.in_field(alternative.name))?
        }
        FieldRule::Omit => {
            return Err(CodecError::UnknownAlternative {
                shape,
                tag: tag.to_string(),
            })
        }
    };

    Ok(tagged(tag, encoded))
}

fn decode_variant(
    shape: &'static str,
    alternatives: &'static [Field],
    wire: &Value,
) -> CodecResult<Value> {
    let (tag, payload) = single_member(shape, alternatives, wire)?;

    let decoded = match find_field(alternatives, tag).map(|a| (a.name, a.rule)) {
        Some((_, FieldRule::PassThrough)) => payload.clone(),
        Some((name, FieldRule::Nested { decode, .. })) => {
            decode(payload).map_err(|e| e.in_field(name))?
        }
        Some((_, FieldRule::Omit)) | None => {
            let raw = Value::Array(vec![Value::String(tag.to_string()), payload.clone()]);
            return Ok(tagged(UNKNOWN_TAG, raw));
        }
    };

    Ok(tagged(tag, decoded))
}

/// The one populated member of a variant object
///
/// `null` only populates a pass-through alternative; anywhere else it reads
/// as unset.
fn single_member<'a>(
    shape: &'static str,
    alternatives: &'static [Field],
    value: &'a Value,
) -> CodecResult<(&'a str, &'a Value)> {
    let object = as_object(shape, value)?;
    let set: Vec<_> = object
        .iter()
        .filter(|(tag, payload)| {
            !payload.is_null()
                || find_field(alternatives, tag).is_some_and(|alt| keeps_null(&alt.rule))
        })
        .collect();

    match set.as_slice() {
        [(tag, payload)] => Ok((tag.as_str(), payload)),
        _ => Err(CodecError::VariantTagCount {
            shape,
            found: set.len(),
        }),
    }
}

fn unknown_parts<'a>(shape: &'static str, payload: &'a Value) -> CodecResult<(&'a str, &'a Value)> {
    match payload.as_array().map(Vec::as_slice) {
        Some([Value::String(tag), raw]) => Ok((tag.as_str(), raw)),
        _ => Err(CodecError::UnexpectedType {
            shape,
            expected: "[tag, payload] pair",
            found: super::error::json_type(payload),
        }),
    }
}

/// Whether `tag` names an alternative this variant encodes itself
fn declares(alternatives: &[Field], tag: &str) -> bool {
    find_field(alternatives, tag).is_some_and(|alt| !matches!(alt.rule, FieldRule::Omit))
}

fn tagged(tag: &str, payload: Value) -> Value {
    let mut object = Map::with_capacity(1);
    object.insert(tag.to_string(), payload);
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::scalar::Blob;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Attachment {
        #[serde(skip_serializing_if = "Option::is_none")]
        file_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<Blob>,
    }

    impl Shape for Attachment {
        const NAME: &'static str = "Attachment";
        const LAYOUT: Layout = Layout::Record(&[Field::pass("fileName"), Field::blob("data")]);
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    enum Part {
        Text(String),
        Attachment(Attachment),
        #[serde(rename = "$unknown")]
        Unknown(String, Value),
    }

    impl Shape for Part {
        const NAME: &'static str = "Part";
        const LAYOUT: Layout =
            Layout::Variant(&[Field::pass("text"), nested::<Attachment>("attachment")]);
    }

    #[test]
    fn test_variant_encodes_single_key() {
        let part = Part::Attachment(Attachment {
            file_name: Some("a.bin".to_string()),
            data: Some(Blob(vec![0xde, 0xad])),
        });
        assert_eq!(
            to_wire(&part).unwrap(),
            json!({"attachment": {"fileName": "a.bin", "data": "3q0="}})
        );
        assert_eq!(to_wire(&Part::Text("hi".into())).unwrap(), json!({"text": "hi"}));
    }

    #[test]
    fn test_variant_round_trip() {
        let part = Part::Attachment(Attachment {
            file_name: None,
            data: Some(Blob(vec![1, 2, 3])),
        });
        let wire = to_wire(&part).unwrap();
        assert_eq!(from_wire::<Part>(&wire).unwrap(), part);
    }

    #[test]
    fn test_variant_rejects_two_members() {
        let err = encode_value::<Part>(&json!({"text": "a", "attachment": {}})).unwrap_err();
        assert!(matches!(err, CodecError::VariantTagCount { found: 2, .. }));
    }

    #[test]
    fn test_variant_rejects_zero_members() {
        let err = encode_value::<Part>(&json!({})).unwrap_err();
        assert!(matches!(err, CodecError::VariantTagCount { found: 0, .. }));

        let err = encode_value::<Part>(&json!({"attachment": null})).unwrap_err();
        assert!(matches!(err, CodecError::VariantTagCount { found: 0, .. }));
    }

    #[test]
    fn test_null_pass_through_alternative_is_set() {
        assert_eq!(encode_value::<Part>(&json!({"text": null})).unwrap(), json!({"text": null}));
        assert_eq!(decode_value::<Part>(&json!({"text": null})).unwrap(), json!({"text": null}));

        let err = encode_value::<Part>(&json!({"text": null, "attachment": {}})).unwrap_err();
        assert!(matches!(err, CodecError::VariantTagCount { found: 2, .. }));
    }

    #[test]
    fn test_unknown_tag_is_preserved() {
        let wire = json!({"video": {"url": "https://example.com/v.mp4"}});
        let part: Part = from_wire(&wire).unwrap();
        assert_eq!(
            part,
            Part::Unknown("video".to_string(), json!({"url": "https://example.com/v.mp4"}))
        );

        // Re-encoding restores the original wire object
        assert_eq!(to_wire(&part).unwrap(), wire);
    }

    #[test]
    fn test_unknown_cannot_shadow_declared_tag() {
        let part = Part::Unknown("attachment".to_string(), json!({"data": "raw"}));
        match to_wire(&part).unwrap_err() {
            CodecError::InvalidInput { field_path, .. } => assert_eq!(field_path, "attachment"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_ignores_null_siblings() {
        let part: Part = from_wire(&json!({"text": "hi", "attachment": null})).unwrap();
        assert_eq!(part, Part::Text("hi".to_string()));
    }

    #[test]
    fn test_empty_document_reads_as_empty_record() {
        let attachment: Attachment = from_wire_slice(b"").unwrap();
        assert_eq!(
            attachment,
            Attachment {
                file_name: None,
                data: None
            }
        );
    }

    #[test]
    fn test_list_helpers() {
        let natural = json!([{"fileName": "x", "data": [255]}]);
        let wire = encode_list::<Attachment>(&natural).unwrap();
        assert_eq!(wire, json!([{"fileName": "x", "data": "/w=="}]));
        assert_eq!(decode_list::<Attachment>(&wire).unwrap(), natural);
    }
}
