//! HTTP layer
//!
//! This module holds everything between the codec and the network:
//! - Transport-level request/response types and the [`Transport`] trait
//! - The request envelope builder and endpoint resolution
//! - Response metadata extraction
//! - Event-stream framing and the reqwest-backed transport

pub mod client;
pub mod envelope;
pub mod error;
pub mod framing;
pub mod metadata;

pub use envelope::{build_request, join_path, Endpoint, EndpointResolver, StaticEndpointResolver};
pub use error::TransportError;
pub use framing::{Frame, FrameKind};
pub use metadata::ResponseMetadata;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use reqwest::header::HeaderMap;
use reqwest::Method;
use std::collections::BTreeMap;
use std::fmt;
use std::pin::Pin;

/// Ordered frames of an event-stream response body
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Frame, TransportError>> + Send>>;

/// A fully assembled request, ready for a transport
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub protocol: String,
    pub hostname: String,
    pub port: Option<u16>,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Absolute URL of this request
    pub fn url(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}{}", self.protocol, self.hostname, port, self.path),
            None => format!("{}://{}{}", self.protocol, self.hostname, self.path),
        }
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Body of a transport response
pub enum ResponseBody {
    /// Whole body, already read
    Bytes(Bytes),
    /// Event-stream body, split into frames as it arrives
    Frames(FrameStream),
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            ResponseBody::Frames(_) => f.write_str("Frames(..)"),
        }
    }
}

/// A response as delivered by a transport
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

impl HttpResponse {
    /// Whether the status routes to the error dispatcher
    pub fn is_error(&self) -> bool {
        self.status >= 300
    }

    /// Read the whole body; a framed body yields its payloads concatenated
    pub async fn into_bytes(self) -> Result<Bytes, TransportError> {
        use futures::TryStreamExt;

        match self.body {
            ResponseBody::Bytes(bytes) => Ok(bytes),
            ResponseBody::Frames(frames) => {
                let payloads: Vec<Bytes> =
                    frames.map_ok(|frame| frame.payload).try_collect().await?;
                Ok(payloads.concat().into())
            }
        }
    }
}

/// Sends assembled requests and returns raw responses
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
