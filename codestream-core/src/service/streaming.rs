//! Event stream demultiplexing
//!
//! [`EventStream`] pulls frames from the transport one at a time and decodes
//! each through the operation's [`EventTable`]. An error frame is yielded as
//! [`ResponseStreamEvent::Error`] and ends the stream; unknown frame names are
//! yielded as [`ResponseStreamEvent::Unknown`] and the stream continues.

use super::error::{dispatch_stream_error, ClientError, ClientResult};
use super::operation::{EventKind, EventTable};
use crate::codec::{from_wire_slice, Shape};
use crate::http::{Frame, FrameKind, FrameStream, ResponseMetadata};
use crate::protocol::events::ResponseStreamEvent;
use futures::{ready, Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::{debug, warn};

/// Lazily decoded events of one streaming response
///
/// Dropping the stream drops the underlying frame source, which closes the
/// connection.
pub struct EventStream {
    /// `None` once the stream has finished
    frames: Option<FrameStream>,
    table: EventTable,
    metadata: ResponseMetadata,
}

impl EventStream {
    pub fn from_frames(frames: FrameStream, table: EventTable, metadata: ResponseMetadata) -> Self {
        Self {
            frames: Some(frames),
            table,
            metadata,
        }
    }

    /// Metadata of the response carrying this stream
    pub fn metadata(&self) -> &ResponseMetadata {
        &self.metadata
    }

    /// Whether no further events will be produced
    pub fn is_finished(&self) -> bool {
        self.frames.is_none()
    }

    /// Next event, or `None` once the stream has ended
    pub async fn recv(&mut self) -> Option<ClientResult<ResponseStreamEvent>> {
        self.next().await
    }

    /// Drain the stream, concatenating assistant text
    ///
    /// An in-stream error event is returned as [`ClientError::Service`].
    pub async fn collect_text(mut self) -> ClientResult<String> {
        let mut text = String::new();
        while let Some(event) = self.next().await {
            match event? {
                ResponseStreamEvent::Error(err) => return Err(err.into()),
                ResponseStreamEvent::AssistantResponse(chunk) => text.push_str(&chunk.content),
                _ => {}
            }
        }
        Ok(text)
    }

    fn decode(&self, frame: Frame) -> ClientResult<ResponseStreamEvent> {
        if frame.kind != FrameKind::Event {
            return Ok(ResponseStreamEvent::Error(dispatch_stream_error(
                &frame.name,
                Some(&frame.name),
                &frame.payload,
                &self.metadata,
            )));
        }

        let Some(kind) = self.table.lookup(&frame.name) else {
            warn!("unknown event {} ({} bytes)", frame.name, frame.payload.len());
            return Ok(ResponseStreamEvent::Unknown {
                name: frame.name,
                payload: frame.payload,
            });
        };

        let event = match kind {
            EventKind::MessageMetadata => {
                ResponseStreamEvent::MessageMetadata(self.payload(&frame)?)
            }
            EventKind::AssistantResponse => {
                ResponseStreamEvent::AssistantResponse(self.payload(&frame)?)
            }
            EventKind::Code => ResponseStreamEvent::Code(self.payload(&frame)?),
            EventKind::CodeReference => ResponseStreamEvent::CodeReference(self.payload(&frame)?),
            EventKind::SupplementaryWebLinks => {
                ResponseStreamEvent::SupplementaryWebLinks(self.payload(&frame)?)
            }
            EventKind::FollowupPrompt => ResponseStreamEvent::FollowupPrompt(self.payload(&frame)?),
            EventKind::ToolUse => ResponseStreamEvent::ToolUse(self.payload(&frame)?),
            EventKind::InteractionComponents => {
                ResponseStreamEvent::InteractionComponents(self.payload(&frame)?)
            }
            EventKind::Intents => ResponseStreamEvent::Intents(self.payload(&frame)?),
            EventKind::InvalidState => ResponseStreamEvent::InvalidState(self.payload(&frame)?),
            EventKind::DryRunSucceed => ResponseStreamEvent::DryRunSucceed(self.payload(&frame)?),
            EventKind::Error => ResponseStreamEvent::Error(dispatch_stream_error(
                &frame.name,
                None,
                &frame.payload,
                &self.metadata,
            )),
        };

        Ok(event)
    }

    fn payload<S: Shape>(&self, frame: &Frame) -> ClientResult<S> {
        from_wire_slice(&frame.payload).map_err(|err| {
            ClientError::response(
                format!("failed to decode {} event: {}", frame.name, err),
                &self.metadata,
            )
        })
    }
}

impl Stream for EventStream {
    type Item = ClientResult<ResponseStreamEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        let Some(frames) = this.frames.as_mut() else {
            return Poll::Ready(None);
        };

        let item = match ready!(frames.poll_next_unpin(cx)) {
            None => {
                debug!("event stream completed");
                this.frames = None;
                return Poll::Ready(None);
            }
            Some(Err(err)) => Err(ClientError::Transport(err)),
            Some(Ok(frame)) => this.decode(frame),
        };

        let terminal = match &item {
            Ok(event) => event.is_terminal(),
            Err(_) => true,
        };
        if terminal {
            debug!("event stream terminated early");
            this.frames = None;
        }

        Poll::Ready(Some(item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.frames {
            Some(frames) => (0, frames.size_hint().1),
            None => (0, Some(0)),
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("finished", &self.is_finished())
            .field("table", &self.table)
            .field("metadata", &self.metadata)
            .finish()
    }
}
