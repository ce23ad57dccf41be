//! Event-stream framing (`application/vnd.amazon.eventstream`)
//!
//! Splits a response body into discrete named frames:
//!
//! ```text
//! total_len:u32 | headers_len:u32 | prelude_crc:u32 | headers | payload | message_crc:u32
//! ```
//!
//! Checksums are skipped, not verified; integrity is left to TLS.

use super::error::TransportError;
use super::FrameStream;
use bytes::{Buf, Bytes, BytesMut};
use futures::{Stream, StreamExt};
use std::pin::Pin;

/// Bytes before the headers: two lengths and the prelude checksum
pub const PRELUDE_LEN: usize = 12;

/// Prelude plus trailing message checksum
pub const FRAME_OVERHEAD: usize = PRELUDE_LEN + 4;

/// Upper bound on a single frame
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Content type of event-stream bodies
pub const EVENT_STREAM_CONTENT_TYPE: &str = "application/vnd.amazon.eventstream";

/// How the service classified a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Ordinary event; `name` is the event type
    Event,
    /// Modeled exception; `name` is the exception type
    Exception,
    /// Unmodeled error; `name` is the error code
    Error,
}

/// One named unit of an event stream
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub name: String,
    pub kind: FrameKind,
    pub payload: Bytes,
}

impl Frame {
    pub fn event(name: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            kind: FrameKind::Event,
            payload: payload.into(),
        }
    }

    pub fn exception(name: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            kind: FrameKind::Exception,
            payload: payload.into(),
        }
    }
}

/// Incremental frame splitter
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append body bytes as they arrive
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Whether a partial frame is still buffered
    pub fn has_partial_frame(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Next complete frame, or `None` until more bytes arrive
    pub fn decode_next(&mut self) -> Result<Option<Frame>, TransportError> {
        if self.buffer.len() < PRELUDE_LEN {
            return Ok(None);
        }

        let mut prelude = &self.buffer[..PRELUDE_LEN];
        let total_len = prelude.get_u32() as usize;
        let headers_len = prelude.get_u32() as usize;

        if total_len < FRAME_OVERHEAD || total_len > MAX_FRAME_BYTES {
            return Err(TransportError::framing(format!(
                "frame length {} out of range",
                total_len
            )));
        }
        if headers_len > total_len - FRAME_OVERHEAD {
            return Err(TransportError::framing(format!(
                "headers length {} exceeds frame length {}",
                headers_len, total_len
            )));
        }
        if self.buffer.len() < total_len {
            return Ok(None);
        }

        let mut message = self.buffer.split_to(total_len).freeze();
        message.advance(PRELUDE_LEN);
        let headers = message.split_to(headers_len);
        let payload = message.split_to(total_len - FRAME_OVERHEAD - headers_len);

        parse_frame(headers, payload).map(Some)
    }
}

/// Turn a chunked body into a lazy stream of frames
///
/// The stream ends after the first error. Dropping it drops the body.
pub fn frames<S, E>(body: S) -> FrameStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<TransportError> + 'static,
{
    let body: BodyStream = Box::pin(body.map(|chunk| chunk.map_err(Into::<TransportError>::into)));
    let reader = FrameReader {
        body,
        decoder: FrameDecoder::new(),
        finished: false,
    };

    Box::pin(futures::stream::try_unfold(reader, FrameReader::next_frame))
}

type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

struct FrameReader {
    body: BodyStream,
    decoder: FrameDecoder,
    finished: bool,
}

impl FrameReader {
    async fn next_frame(mut self) -> Result<Option<(Frame, Self)>, TransportError> {
        loop {
            if let Some(frame) = self.decoder.decode_next()? {
                return Ok(Some((frame, self)));
            }
            if self.finished {
                if self.decoder.has_partial_frame() {
                    return Err(TransportError::framing("body ended inside a frame"));
                }
                return Ok(None);
            }
            match self.body.next().await {
                Some(chunk) => self.decoder.extend(&chunk?),
                None => self.finished = true,
            }
        }
    }
}

fn parse_frame(mut headers: Bytes, payload: Bytes) -> Result<Frame, TransportError> {
    let mut message_type = None;
    let mut event_type = None;
    let mut exception_type = None;
    let mut error_code = None;

    while headers.has_remaining() {
        let name = read_short_string(&mut headers, 1)?;
        let value = read_header_value(&mut headers)?;

        match (name.as_str(), value) {
            (":message-type", Some(v)) => message_type = Some(v),
            (":event-type", Some(v)) => event_type = Some(v),
            (":exception-type", Some(v)) => exception_type = Some(v),
            (":error-code", Some(v)) => error_code = Some(v),
            _ => {}
        }
    }

    let (kind, name) = match message_type.as_deref() {
        Some("exception") => (FrameKind::Exception, exception_type),
        Some("error") => (FrameKind::Error, error_code),
        _ => (FrameKind::Event, event_type),
    };

    let name = name.ok_or_else(|| TransportError::framing("frame is missing its type header"))?;

    Ok(Frame {
        name,
        kind,
        payload,
    })
}

/// Read a header value; only string values are kept
fn read_header_value(buf: &mut Bytes) -> Result<Option<String>, TransportError> {
    let value_type = take(buf, 1)?.get_u8();

    let skip = match value_type {
        0 | 1 => 0,
        2 => 1,
        3 => 2,
        4 => 4,
        5 | 8 => 8,
        9 => 16,
        6 => {
            let len = take(buf, 2)?.get_u16() as usize;
            take(buf, len)?;
            return Ok(None);
        }
        7 => return read_short_string(buf, 2).map(Some),
        other => {
            return Err(TransportError::framing(format!(
                "unknown header value type {}",
                other
            )))
        }
    };

    take(buf, skip)?;
    Ok(None)
}

/// Length-prefixed UTF-8 string; the prefix is `width` bytes wide
fn read_short_string(buf: &mut Bytes, width: usize) -> Result<String, TransportError> {
    let mut prefix = take(buf, width)?;
    let len = match width {
        1 => prefix.get_u8() as usize,
        _ => prefix.get_u16() as usize,
    };

    let raw = take(buf, len)?;
    String::from_utf8(raw.to_vec())
        .map_err(|_| TransportError::framing("header is not valid UTF-8"))
}

fn take(buf: &mut Bytes, len: usize) -> Result<Bytes, TransportError> {
    if buf.remaining() < len {
        return Err(TransportError::framing("truncated frame headers"));
    }
    Ok(buf.split_to(len))
}
