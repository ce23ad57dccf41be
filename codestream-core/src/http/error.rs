//! Transport error types

use thiserror::Error;

/// Failures below the protocol layer: connections, timeouts, framing
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// Request timed out
    #[error("request timed out")]
    Timeout,

    /// Could not connect to the endpoint
    #[error("connection failed: {message}")]
    Connect { message: String },

    /// Request could not be built or sent
    #[error("request failed: {message}")]
    Request { message: String },

    /// Response body could not be read
    #[error("failed to read response body: {message}")]
    Body { message: String },

    /// Event-stream body was not validly framed
    #[error("invalid event-stream frame: {message}")]
    Framing { message: String },

    /// Response exceeded the configured size limit
    #[error("response size {size} exceeds maximum {max}")]
    ResponseTooLarge { size: usize, max: usize },
}

impl TransportError {
    pub fn framing(message: impl Into<String>) -> Self {
        TransportError::Framing {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect {
                message: err.to_string(),
            }
        } else if err.is_body() || err.is_decode() {
            TransportError::Body {
                message: err.to_string(),
            }
        } else {
            TransportError::Request {
                message: err.to_string(),
            }
        }
    }
}
