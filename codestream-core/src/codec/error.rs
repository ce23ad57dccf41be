//! Codec error types

use thiserror::Error;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while turning shapes into wire values and back.
///
/// On the request side these are client input errors: the request is
/// rejected before anything reaches the transport.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A variant must carry exactly one populated alternative
    #[error("variant `{shape}` must have exactly one member set, found {found}")]
    VariantTagCount { shape: &'static str, found: usize },

    /// A natural value named an alternative the variant does not declare
    #[error("variant `{shape}` has no alternative named `{tag}`")]
    UnknownAlternative { shape: &'static str, tag: String },

    /// The value had the wrong JSON type for its shape
    #[error("expected {expected} for `{shape}`, found {found}")]
    UnexpectedType {
        shape: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// A blob field did not hold valid base64 or valid octets
    #[error("invalid blob: {message}")]
    InvalidBlob { message: String },

    /// Request data violated an invariant of its shape
    #[error("invalid input at '{field_path}': {message}")]
    InvalidInput { field_path: String, message: String },

    /// A failure nested below a named field
    #[error("in field `{field}`: {source}")]
    InField {
        field: &'static str,
        #[source]
        source: Box<CodecError>,
    },

    /// serde could not map between the shape and its natural JSON form
    #[error("failed to map `{shape}`: {source}")]
    Serde {
        shape: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl CodecError {
    /// Wrap this error with the name of the field it occurred in
    pub fn in_field(self, field: &'static str) -> Self {
        CodecError::InField {
            field,
            source: Box::new(self),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::InvalidInput {
            field_path: field_path.into(),
            message: message.into(),
        }
    }

    /// Innermost error, skipping field context
    pub fn root_cause(&self) -> &CodecError {
        match self {
            CodecError::InField { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Name of a JSON value's type, for error messages
pub(crate) fn json_type(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
