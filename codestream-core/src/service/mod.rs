//! Streaming service layer
//!
//! Operations, request serialization, error dispatch, event stream
//! demultiplexing, and the [`StreamingClient`] that runs them in sequence.

pub mod client;
pub mod error;
pub mod operation;
pub mod serializer;
pub mod streaming;

pub use client::{GenerateAssistantResponseOutput, SendMessageOutput, StreamingClient};
pub use error::{
    dispatch_error, dispatch_stream_error, normalize_error_code, ClientError, ClientResult,
    ExceptionKind, ServiceError,
};
pub use operation::{EventKind, EventTable, Operation};
pub use serializer::shared_headers;
pub use streaming::EventStream;
