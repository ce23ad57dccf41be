//! Shared helpers for integration tests

#![allow(dead_code)]

use bytes::{BufMut, Bytes, BytesMut};
use codestream_core::protocol::{ChatMessage, ConversationState, GenerateAssistantResponseRequest};
use std::sync::Once;

static INIT: Once = Once::new();

/// Route library logs to the test output; `RUST_LOG` controls the level
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn put_string_header(out: &mut BytesMut, name: &str, value: &str) {
    out.put_u8(name.len() as u8);
    out.put_slice(name.as_bytes());
    out.put_u8(7);
    out.put_u16(value.len() as u16);
    out.put_slice(value.as_bytes());
}

/// Encode one event-stream message with string headers
///
/// Checksums are written as zero; the decoder does not verify them.
pub fn encode_message(headers: &[(&str, &str)], payload: &[u8]) -> Bytes {
    let mut header_bytes = BytesMut::new();
    for (name, value) in headers {
        put_string_header(&mut header_bytes, name, value);
    }

    let total = 16 + header_bytes.len() + payload.len();
    let mut out = BytesMut::with_capacity(total);
    out.put_u32(total as u32);
    out.put_u32(header_bytes.len() as u32);
    out.put_u32(0);
    out.put_slice(&header_bytes);
    out.put_slice(payload);
    out.put_u32(0);
    out.freeze()
}

pub fn event_message(event_type: &str, payload: &str) -> Bytes {
    encode_message(
        &[
            (":message-type", "event"),
            (":event-type", event_type),
            (":content-type", "application/json"),
        ],
        payload.as_bytes(),
    )
}

pub fn exception_message(exception_type: &str, payload: &str) -> Bytes {
    encode_message(
        &[
            (":message-type", "exception"),
            (":exception-type", exception_type),
            (":content-type", "application/json"),
        ],
        payload.as_bytes(),
    )
}

pub fn error_message(error_code: &str, payload: &str) -> Bytes {
    encode_message(
        &[(":message-type", "error"), (":error-code", error_code)],
        payload.as_bytes(),
    )
}

/// Concatenate messages into one response body
pub fn body(messages: &[Bytes]) -> Vec<u8> {
    messages.iter().flat_map(|m| m.iter().copied()).collect()
}

pub fn simple_request(text: &str) -> GenerateAssistantResponseRequest {
    GenerateAssistantResponseRequest::new(ConversationState::new(ChatMessage::user(text)))
}
