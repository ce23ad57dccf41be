//! Service exceptions and error dispatch
//!
//! Any response with status ≥ 300, and any in-stream error frame, ends up
//! here. The wire error code is normalized and matched against the modeled
//! exceptions; anything else becomes [`ServiceError::Unhandled`]. Every
//! error carries the [`ResponseMetadata`] of the response it came from.

use crate::codec::scalar::expect_string;
use crate::codec::{from_wire, CodecError, Field, Layout};
use crate::http::{ResponseMetadata, TransportError};
use crate::protocol::shapes::shape;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Header carrying the error code, preferred over the body
pub const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";

/// Code reported when neither header nor body names one
pub const UNKNOWN_CODE: &str = "Unknown";

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Modeled exceptions of the streaming service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionKind {
    AccessDenied,
    Conflict,
    DryRunOperation,
    InternalServer,
    ResourceNotFound,
    ServiceQuotaExceeded,
    Throttling,
    Validation,
}

impl ExceptionKind {
    pub const ALL: [ExceptionKind; 8] = [
        ExceptionKind::AccessDenied,
        ExceptionKind::Conflict,
        ExceptionKind::DryRunOperation,
        ExceptionKind::InternalServer,
        ExceptionKind::ResourceNotFound,
        ExceptionKind::ServiceQuotaExceeded,
        ExceptionKind::Throttling,
        ExceptionKind::Validation,
    ];

    /// Wire name of the exception
    pub fn code(&self) -> &'static str {
        match self {
            ExceptionKind::AccessDenied => "AccessDeniedException",
            ExceptionKind::Conflict => "ConflictException",
            ExceptionKind::DryRunOperation => "DryRunOperationException",
            ExceptionKind::InternalServer => "InternalServerException",
            ExceptionKind::ResourceNotFound => "ResourceNotFoundException",
            ExceptionKind::ServiceQuotaExceeded => "ServiceQuotaExceededException",
            ExceptionKind::Throttling => "ThrottlingException",
            ExceptionKind::Validation => "ValidationException",
        }
    }

    /// Exact, case-sensitive match on a normalized code
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Whether the service attributes the failure to itself
    pub fn is_server_fault(&self) -> bool {
        matches!(self, ExceptionKind::InternalServer)
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Reduce a raw wire code to its bare exception name
///
/// Anything after the first `:` is dropped, then anything up to and
/// including the last `#`. `"aws.protocols#ThrottlingException:http://x"`
/// becomes `"ThrottlingException"`.
pub fn normalize_error_code(raw: &str) -> &str {
    let code = raw.split_once(':').map_or(raw, |(head, _)| head);
    let code = code.rsplit_once('#').map_or(code, |(_, tail)| tail);
    code.trim()
}

// ----------------------------------------------------------------------------
// Exception payloads
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDeniedException {
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictException {
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Dry run would have been rejected; `response_code` is the status it would have returned
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunOperationException {
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_code: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalServerException {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNotFoundException {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceQuotaExceededException {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrottlingException {
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationException {
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

const MESSAGE_ONLY: &[Field] = &[Field::pass("message")];
const MESSAGE_AND_REASON: &[Field] = &[Field::pass("message"), Field::pass("reason")];
const DRY_RUN_OPERATION: &[Field] = &[Field::pass("message"), Field::pass("responseCode")];

shape!(AccessDeniedException, "AccessDeniedException", Layout::Record(MESSAGE_AND_REASON));
shape!(ConflictException, "ConflictException", Layout::Record(MESSAGE_AND_REASON));
shape!(DryRunOperationException, "DryRunOperationException", Layout::Record(DRY_RUN_OPERATION));
shape!(InternalServerException, "InternalServerException", Layout::Record(MESSAGE_ONLY));
shape!(ResourceNotFoundException, "ResourceNotFoundException", Layout::Record(MESSAGE_ONLY));
shape!(
    ServiceQuotaExceededException,
    "ServiceQuotaExceededException",
    Layout::Record(MESSAGE_ONLY)
);
shape!(ThrottlingException, "ThrottlingException", Layout::Record(MESSAGE_AND_REASON));
shape!(ValidationException, "ValidationException", Layout::Record(MESSAGE_AND_REASON));

// ----------------------------------------------------------------------------
// Service errors
// ----------------------------------------------------------------------------

/// An error reported by the service, decorated with response metadata
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("AccessDeniedException: {}", .error.message)]
    AccessDenied {
        error: AccessDeniedException,
        metadata: ResponseMetadata,
    },

    #[error("ConflictException: {}", .error.message)]
    Conflict {
        error: ConflictException,
        metadata: ResponseMetadata,
    },

    #[error("DryRunOperationException: {}", .error.message)]
    DryRunOperation {
        error: DryRunOperationException,
        metadata: ResponseMetadata,
    },

    #[error("InternalServerException: {}", .error.message)]
    InternalServer {
        error: InternalServerException,
        metadata: ResponseMetadata,
    },

    #[error("ResourceNotFoundException: {}", .error.message)]
    ResourceNotFound {
        error: ResourceNotFoundException,
        metadata: ResponseMetadata,
    },

    #[error("ServiceQuotaExceededException: {}", .error.message)]
    ServiceQuotaExceeded {
        error: ServiceQuotaExceededException,
        metadata: ResponseMetadata,
    },

    #[error("ThrottlingException: {}", .error.message)]
    Throttling {
        error: ThrottlingException,
        metadata: ResponseMetadata,
    },

    #[error("ValidationException: {}", .error.message)]
    Validation {
        error: ValidationException,
        metadata: ResponseMetadata,
    },

    /// Code not among the modeled exceptions, or a body that did not fit one
    #[error("{code}: {message}")]
    Unhandled {
        code: String,
        message: String,
        /// Parsed error body; an empty object when the body was not JSON
        body: Value,
        metadata: ResponseMetadata,
    },
}

impl ServiceError {
    /// Modeled kind, `None` for unhandled errors
    pub fn kind(&self) -> Option<ExceptionKind> {
        match self {
            ServiceError::AccessDenied { .. } => Some(ExceptionKind::AccessDenied),
            ServiceError::Conflict { .. } => Some(ExceptionKind::Conflict),
            ServiceError::DryRunOperation { .. } => Some(ExceptionKind::DryRunOperation),
            ServiceError::InternalServer { .. } => Some(ExceptionKind::InternalServer),
            ServiceError::ResourceNotFound { .. } => Some(ExceptionKind::ResourceNotFound),
            ServiceError::ServiceQuotaExceeded { .. } => Some(ExceptionKind::ServiceQuotaExceeded),
            ServiceError::Throttling { .. } => Some(ExceptionKind::Throttling),
            ServiceError::Validation { .. } => Some(ExceptionKind::Validation),
            ServiceError::Unhandled { .. } => None,
        }
    }

    /// Normalized error code
    pub fn code(&self) -> &str {
        match self {
            ServiceError::Unhandled { code, .. } => code,
            other => other.kind().map(|kind| kind.code()).unwrap_or(UNKNOWN_CODE),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ServiceError::AccessDenied { error, .. } => &error.message,
            ServiceError::Conflict { error, .. } => &error.message,
            ServiceError::DryRunOperation { error, .. } => &error.message,
            ServiceError::InternalServer { error, .. } => &error.message,
            ServiceError::ResourceNotFound { error, .. } => &error.message,
            ServiceError::ServiceQuotaExceeded { error, .. } => &error.message,
            ServiceError::Throttling { error, .. } => &error.message,
            ServiceError::Validation { error, .. } => &error.message,
            ServiceError::Unhandled { message, .. } => message,
        }
    }

    /// Server-side failure: a server-fault kind, or an unmodeled 5xx
    pub fn is_server_fault(&self) -> bool {
        match self.kind() {
            Some(kind) => kind.is_server_fault(),
            None => self.metadata().http_status_code >= 500,
        }
    }

    pub fn metadata(&self) -> &ResponseMetadata {
        match self {
            ServiceError::AccessDenied { metadata, .. }
            | ServiceError::Conflict { metadata, .. }
            | ServiceError::DryRunOperation { metadata, .. }
            | ServiceError::InternalServer { metadata, .. }
            | ServiceError::ResourceNotFound { metadata, .. }
            | ServiceError::ServiceQuotaExceeded { metadata, .. }
            | ServiceError::Throttling { metadata, .. }
            | ServiceError::Validation { metadata, .. }
            | ServiceError::Unhandled { metadata, .. } => metadata,
        }
    }

    /// Decode `body` as the exception named by `code`
    ///
    /// Unmatched codes, and bodies that do not fit the matched exception,
    /// produce [`ServiceError::Unhandled`] so no service error is lost.
    pub fn from_parts(code: Option<&str>, body: Value, metadata: ResponseMetadata) -> Self {
        let code = code.map(normalize_error_code).filter(|code| !code.is_empty());

        if let Some(kind) = code.and_then(ExceptionKind::from_code) {
            match decode_exception(kind, &body, metadata.clone()) {
                Ok(error) => return error,
                Err(err) => warn!("{} body did not decode: {}", kind, err),
            }
        }

        let message = expect_string(&body, "message")
            .or_else(|| expect_string(&body, "Message"))
            .unwrap_or_default()
            .to_string();

        ServiceError::Unhandled {
            code: code.unwrap_or(UNKNOWN_CODE).to_string(),
            message,
            body,
            metadata,
        }
    }
}

fn decode_exception(
    kind: ExceptionKind,
    body: &Value,
    metadata: ResponseMetadata,
) -> Result<ServiceError, CodecError> {
    Ok(match kind {
        ExceptionKind::AccessDenied => ServiceError::AccessDenied {
            error: from_wire(body)?,
            metadata,
        },
        ExceptionKind::Conflict => ServiceError::Conflict {
            error: from_wire(body)?,
            metadata,
        },
        ExceptionKind::DryRunOperation => ServiceError::DryRunOperation {
            error: from_wire(body)?,
            metadata,
        },
        ExceptionKind::InternalServer => ServiceError::InternalServer {
            error: from_wire(body)?,
            metadata,
        },
        ExceptionKind::ResourceNotFound => ServiceError::ResourceNotFound {
            error: from_wire(body)?,
            metadata,
        },
        ExceptionKind::ServiceQuotaExceeded => ServiceError::ServiceQuotaExceeded {
            error: from_wire(body)?,
            metadata,
        },
        ExceptionKind::Throttling => ServiceError::Throttling {
            error: from_wire(body)?,
            metadata,
        },
        ExceptionKind::Validation => ServiceError::Validation {
            error: from_wire(body)?,
            metadata,
        },
    })
}

/// Parse an error body; empty or non-JSON bodies become an empty object
///
/// A non-JSON body's text is kept as the `message` so it still reaches
/// the caller.
fn parse_error_body(body: &[u8]) -> Value {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return Value::Object(Map::new());
    }

    match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => value,
        _ => {
            debug!("error body is not a JSON object ({} bytes)", body.len());
            let mut object = Map::new();
            object.insert("message".to_string(), Value::String(text.to_string()));
            Value::Object(object)
        }
    }
}

fn body_code(body: &Value) -> Option<&str> {
    expect_string(body, "code").or_else(|| expect_string(body, "__type"))
}

/// Map a top-level error response to a service error
pub fn dispatch_error(status: u16, headers: &HeaderMap, body: &[u8]) -> ServiceError {
    let metadata = ResponseMetadata::from_response(status, headers);
    let body = parse_error_body(body);

    let header_code = headers
        .get(ERROR_TYPE_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty());
    let code = header_code.or_else(|| body_code(&body)).map(str::to_string);

    let error = ServiceError::from_parts(code.as_deref(), body, metadata);
    let request_id = error.metadata().request_id.as_deref().unwrap_or("-");
    if error.is_server_fault() {
        warn!(
            "service fault {} (status {}, request id {})",
            error.code(),
            status,
            request_id
        );
    } else {
        debug!(
            "service rejected request with {} (status {}, request id {})",
            error.code(),
            status,
            request_id
        );
    }
    error
}

/// Map an in-stream error frame to a service error
///
/// `exception_type` is the frame's exception or error code when the
/// transport marked it as one; otherwise the payload's `__type`/`code`
/// is used, falling back to the event name.
pub fn dispatch_stream_error(
    event_name: &str,
    exception_type: Option<&str>,
    payload: &[u8],
    metadata: &ResponseMetadata,
) -> ServiceError {
    let body = parse_error_body(payload);
    let code = exception_type
        .or_else(|| body_code(&body))
        .unwrap_or(event_name)
        .to_string();

    let error = ServiceError::from_parts(Some(&code), body, metadata.clone());
    warn!(
        "stream error event {} mapped to {} (request id {})",
        event_name,
        error.code(),
        metadata.request_id.as_deref().unwrap_or("-")
    );
    error
}

// ----------------------------------------------------------------------------
// Client errors
// ----------------------------------------------------------------------------

/// Every way a client call can fail
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request was rejected before it was sent
    #[error("invalid request: {0}")]
    Codec(#[from] CodecError),

    /// The service answered with an error
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Connection, timeout or framing failure
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A successful response that could not be understood
    #[error("malformed response: {message}")]
    Response {
        message: String,
        metadata: ResponseMetadata,
    },
}

impl ClientError {
    /// Metadata of the response this error came from, if one arrived
    pub fn metadata(&self) -> Option<&ResponseMetadata> {
        match self {
            ClientError::Service(err) => Some(err.metadata()),
            ClientError::Response { metadata, .. } => Some(metadata),
            ClientError::Codec(_) | ClientError::Transport(_) => None,
        }
    }

    pub fn as_service_error(&self) -> Option<&ServiceError> {
        match self {
            ClientError::Service(err) => Some(err),
            _ => None,
        }
    }

    pub(crate) fn response(message: impl Into<String>, metadata: &ResponseMetadata) -> Self {
        ClientError::Response {
            message: message.into(),
            metadata: metadata.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_normalize_error_code() {
        assert_eq!(normalize_error_code("ThrottlingException"), "ThrottlingException");
        assert_eq!(
            normalize_error_code("com.amazon.coral#ValidationException"),
            "ValidationException"
        );
        assert_eq!(
            normalize_error_code("a#b#AccessDeniedException:http://internal.amazon.com/"),
            "AccessDeniedException"
        );
        assert_eq!(normalize_error_code(""), "");
    }

    #[test]
    fn test_header_code_takes_precedence() {
        let error = dispatch_error(
            400,
            &headers(&[("x-amzn-errortype", "ValidationException:http://x")]),
            br#"{"__type":"ThrottlingException","message":"bad input","reason":"INVALID_CONVERSATION_ID"}"#,
        );

        match &error {
            ServiceError::Validation { error, metadata } => {
                assert_eq!(error.message, "bad input");
                assert_eq!(error.reason.as_deref(), Some("INVALID_CONVERSATION_ID"));
                assert_eq!(metadata.http_status_code, 400);
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_body_code_before_type() {
        let error = dispatch_error(
            403,
            &HeaderMap::new(),
            br#"{"code":"AccessDeniedException","__type":"ConflictException","message":"no"}"#,
        );
        assert_eq!(error.kind(), Some(ExceptionKind::AccessDenied));
        assert_eq!(error.message(), "no");
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let error = dispatch_error(429, &HeaderMap::new(), br#"{"__type":"throttlingexception"}"#);
        assert_eq!(error.kind(), None);
        assert_eq!(error.code(), "throttlingexception");
    }

    #[test]
    fn test_unknown_code_is_unhandled() {
        let error = dispatch_error(
            418,
            &headers(&[("x-amzn-requestid", "req-1")]),
            br#"{"__type":"com.example#TeapotException","message":"short and stout","extra":1}"#,
        );

        match error {
            ServiceError::Unhandled {
                code,
                message,
                body,
                metadata,
            } => {
                assert_eq!(code, "TeapotException");
                assert_eq!(message, "short and stout");
                assert_eq!(body["extra"], json!(1));
                assert_eq!(metadata.request_id.as_deref(), Some("req-1"));
                assert_eq!(metadata.http_status_code, 418);
            }
            other => panic!("Expected unhandled error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_body_without_code() {
        let error = dispatch_error(502, &HeaderMap::new(), b"");
        assert_eq!(error.code(), UNKNOWN_CODE);
        assert_eq!(error.message(), "");
        assert!(matches!(&error, ServiceError::Unhandled { body, .. } if body == &json!({})));
    }

    #[test]
    fn test_non_json_body_keeps_text() {
        let error = dispatch_error(
            503,
            &headers(&[("x-amzn-errortype", "InternalServerException")]),
            b"Service Unavailable",
        );
        assert_eq!(error.kind(), Some(ExceptionKind::InternalServer));
        assert_eq!(error.message(), "Service Unavailable");
    }

    #[test]
    fn test_mismatched_body_falls_back_to_unhandled() {
        let error = dispatch_error(
            400,
            &HeaderMap::new(),
            br#"{"__type":"DryRunOperationException","message":"m","responseCode":"not a number"}"#,
        );
        assert_eq!(error.kind(), None);
        assert_eq!(error.code(), "DryRunOperationException");
        assert_eq!(error.message(), "m");
    }

    #[test]
    fn test_stream_error_code_sources() {
        let metadata = ResponseMetadata {
            http_status_code: 200,
            request_id: Some("req-9".to_string()),
            ..Default::default()
        };

        let from_frame = dispatch_stream_error(
            "ThrottlingException",
            Some("ThrottlingException"),
            br#"{"message":"slow"}"#,
            &metadata,
        );
        assert_eq!(from_frame.kind(), Some(ExceptionKind::Throttling));
        assert_eq!(from_frame.metadata(), &metadata);

        let from_payload = dispatch_stream_error(
            "error",
            None,
            br#"{"__type":"InternalServerException","message":"boom"}"#,
            &metadata,
        );
        assert_eq!(from_payload.kind(), Some(ExceptionKind::InternalServer));

        let from_name = dispatch_stream_error(
            "QuotaLevelExceededError",
            None,
            br#"{"message":"q"}"#,
            &metadata,
        );
        assert_eq!(from_name.code(), "QuotaLevelExceededError");
        assert_eq!(from_name.message(), "q");
    }

    #[test]
    fn test_exception_kind_roundtrip() {
        for kind in ExceptionKind::ALL {
            assert_eq!(ExceptionKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ExceptionKind::from_code("Exception"), None);
    }

    #[test]
    fn test_server_fault() {
        let faults: Vec<_> = ExceptionKind::ALL
            .into_iter()
            .filter(ExceptionKind::is_server_fault)
            .collect();
        assert_eq!(faults, [ExceptionKind::InternalServer]);

        let internal = dispatch_error(
            500,
            &HeaderMap::new(),
            br#"{"__type":"InternalServerException"}"#,
        );
        assert!(internal.is_server_fault());

        let throttled =
            dispatch_error(429, &HeaderMap::new(), br#"{"__type":"ThrottlingException"}"#);
        assert!(!throttled.is_server_fault());

        assert!(dispatch_error(503, &HeaderMap::new(), b"").is_server_fault());
        assert!(!dispatch_error(418, &HeaderMap::new(), b"").is_server_fault());
    }

    #[test]
    fn test_client_error_metadata() {
        let service = dispatch_error(500, &HeaderMap::new(), b"{}");
        let err = ClientError::from(service);
        assert_eq!(err.metadata().map(|m| m.http_status_code), Some(500));
        assert!(err.as_service_error().is_some());

        let err = ClientError::from(TransportError::Timeout);
        assert!(err.metadata().is_none());
    }
}
