//! Demultiplexing over arbitrarily chunked bodies

mod common;

use bytes::Bytes;
use codestream_core::http::{framing, ResponseMetadata, TransportError};
use codestream_core::protocol::ResponseStreamEvent;
use codestream_core::service::{ClientError, EventStream, Operation};
use futures::{stream, StreamExt};

fn stream_over(chunks: Vec<Bytes>, operation: Operation) -> EventStream {
    let body = stream::iter(chunks.into_iter().map(Ok::<_, TransportError>));
    EventStream::from_frames(
        framing::frames(body),
        operation.event_table(),
        ResponseMetadata::default(),
    )
}

fn split_every(body: &[u8], size: usize) -> Vec<Bytes> {
    body.chunks(size).map(Bytes::copy_from_slice).collect()
}

fn conversation() -> Vec<u8> {
    common::body(&[
        common::event_message("messageMetadataEvent", r#"{"conversationId":"c-1"}"#),
        common::event_message("assistantResponseEvent", r#"{"content":"one "}"#),
        common::event_message("codeEvent", r#"{"content":"fn main() {}"}"#),
        common::event_message("assistantResponseEvent", r#"{"content":"two"}"#),
        common::event_message(
            "followupPromptEvent",
            r#"{"followupPrompt":{"content":"more?"}}"#,
        ),
    ])
}

#[test]
fn chunk_boundaries_do_not_matter() {
    common::init_tracing();
    let body = conversation();

    for size in [1, 3, 7, 64, body.len()] {
        let events = stream_over(split_every(&body, size), Operation::GenerateAssistantResponse);
        let text = tokio_test::block_on(events.collect_text()).unwrap();
        assert_eq!(text, "one two", "chunk size {}", size);
    }
}

#[test]
fn every_known_event_decodes() {
    common::init_tracing();
    let events = stream_over(
        vec![Bytes::from(conversation())],
        Operation::GenerateAssistantResponse,
    );
    let events: Vec<_> = tokio_test::block_on(events.collect());

    let names: Vec<_> = events
        .iter()
        .map(|event| match event {
            Ok(ResponseStreamEvent::MessageMetadata(_)) => "metadata",
            Ok(ResponseStreamEvent::AssistantResponse(_)) => "text",
            Ok(ResponseStreamEvent::Code(_)) => "code",
            Ok(ResponseStreamEvent::FollowupPrompt(_)) => "followup",
            other => panic!("unexpected {:?}", other),
        })
        .collect();
    assert_eq!(names, ["metadata", "text", "code", "text", "followup"]);
}

#[test]
fn truncated_body_is_a_terminal_transport_error() {
    common::init_tracing();
    let body = conversation();
    let cut = body.len() - 5;

    let mut events = stream_over(
        split_every(&body[..cut], 16),
        Operation::GenerateAssistantResponse,
    );
    let results: Vec<_> = tokio_test::block_on(async {
        let mut out = Vec::new();
        while let Some(event) = events.recv().await {
            out.push(event);
        }
        out
    });

    assert_eq!(results.len(), 5);
    assert!(results[..4].iter().all(Result::is_ok));
    assert!(matches!(
        results[4],
        Err(ClientError::Transport(TransportError::Framing { .. }))
    ));
    assert!(events.is_finished());
}

#[test]
fn dry_run_event_is_unknown_to_generate_assistant_response() {
    common::init_tracing();
    let body = common::body(&[common::event_message("dryRunSucceedEvent", "{}")]);

    let chunks = vec![Bytes::from(body.clone())];
    let events: Vec<_> = tokio_test::block_on(
        stream_over(chunks, Operation::GenerateAssistantResponse).collect(),
    );
    assert!(matches!(
        &events[0],
        Ok(ResponseStreamEvent::Unknown { name, .. }) if name == "dryRunSucceedEvent"
    ));

    let chunks = vec![Bytes::from(body)];
    let events: Vec<_> =
        tokio_test::block_on(stream_over(chunks, Operation::SendMessage).collect());
    assert!(matches!(events[0], Ok(ResponseStreamEvent::DryRunSucceed(_))));
}

#[test]
fn error_frame_ends_the_stream_with_its_code() {
    common::init_tracing();
    let body = common::body(&[
        common::event_message("assistantResponseEvent", r#"{"content":"so far"}"#),
        common::error_message("InternalFailure", r#"{"message":"stream broke"}"#),
        common::event_message("assistantResponseEvent", r#"{"content":"lost"}"#),
    ]);

    let mut events = stream_over(split_every(&body, 5), Operation::SendMessage);
    let results: Vec<_> = tokio_test::block_on(async {
        let mut out = Vec::new();
        while let Some(event) = events.recv().await {
            out.push(event);
        }
        out
    });

    assert_eq!(results.len(), 2);
    match &results[1] {
        Ok(ResponseStreamEvent::Error(err)) => {
            assert_eq!(err.code(), "InternalFailure");
            assert_eq!(err.kind(), None);
            assert_eq!(err.message(), "stream broke");
        }
        other => panic!("Expected error event, got {:?}", other),
    }
    assert!(events.is_finished());
}

#[test]
fn empty_body_is_an_empty_stream() {
    let events = stream_over(Vec::new(), Operation::SendMessage);
    let events: Vec<_> = tokio_test::block_on(events.collect());
    assert!(events.is_empty());
}
