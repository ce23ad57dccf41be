//! Operation request serializers
//!
//! Each serializer projects its input onto the wire and hands the JSON body
//! to the envelope builder together with the shared headers. Input the codec
//! rejects never produces a request.

use super::operation::Operation;
use crate::codec::{to_wire, CodecError, CodecResult, Shape};
use crate::http::{build_request, EndpointResolver, HttpRequest};
use crate::protocol::types::{GenerateAssistantResponseRequest, SendMessageRequest};
use bytes::Bytes;
use std::collections::BTreeMap;

/// Content type of every request body
pub const CONTENT_TYPE: &str = "application/x-amz-json-1.0";

/// Header carrying `agentMode`, which never appears in the body
pub const AGENT_MODE_HEADER: &str = "x-amzn-kiro-agent-mode";

/// Headers common to every operation
pub fn shared_headers(service_name: &str, operation: Operation) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("content-type".to_string(), CONTENT_TYPE.to_string()),
        (
            "x-amz-target".to_string(),
            format!("{}.{}", service_name, operation.name()),
        ),
    ])
}

pub fn serialize_generate_assistant_response(
    input: &GenerateAssistantResponseRequest,
    resolver: &dyn EndpointResolver,
    service_name: &str,
) -> CodecResult<HttpRequest> {
    let operation = Operation::GenerateAssistantResponse;
    let mut headers = shared_headers(service_name, operation);
    if let Some(mode) = &input.agent_mode {
        headers.insert(AGENT_MODE_HEADER.to_string(), mode.clone());
    }

    let body = json_body(input)?;
    Ok(build_request(resolver, headers, operation.path(), None, Some(body)))
}

pub fn serialize_send_message(
    input: &SendMessageRequest,
    resolver: &dyn EndpointResolver,
    service_name: &str,
) -> CodecResult<HttpRequest> {
    let operation = Operation::SendMessage;
    let headers = shared_headers(service_name, operation);
    let body = json_body(input)?;
    Ok(build_request(resolver, headers, operation.path(), None, Some(body)))
}

fn json_body<S: Shape>(input: &S) -> CodecResult<Bytes> {
    let wire = to_wire(input)?;
    serde_json::to_vec(&wire)
        .map(Bytes::from)
        .map_err(|source| CodecError::Serde {
            shape: S::NAME,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StaticEndpointResolver;
    use crate::protocol::types::{ChatMessage, ConversationState};
    use serde_json::{json, Value};

    fn resolver() -> StaticEndpointResolver {
        StaticEndpointResolver::from_url("https://q.us-east-1.amazonaws.com").unwrap()
    }

    fn body_json(request: &HttpRequest) -> Value {
        serde_json::from_slice(request.body.as_ref().unwrap()).unwrap()
    }

    #[test]
    fn test_shared_headers() {
        let headers = shared_headers("AmazonQDeveloperStreamingService", Operation::SendMessage);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["content-type"], "application/x-amz-json-1.0");
        assert_eq!(
            headers["x-amz-target"],
            "AmazonQDeveloperStreamingService.SendMessage"
        );
    }

    #[test]
    fn test_generate_assistant_response_request() {
        let input = GenerateAssistantResponseRequest::new(
            ConversationState::new(ChatMessage::user("explain this"))
                .with_conversation_id("conv-1"),
        )
        .with_profile_arn("arn:aws:codewhisperer:us-east-1:1:profile/P")
        .with_agent_mode("vibe");

        let request = serialize_generate_assistant_response(
            &input,
            &resolver(),
            "AmazonCodeWhispererStreamingService",
        )
        .unwrap();

        assert_eq!(request.url(), "https://q.us-east-1.amazonaws.com/");
        assert_eq!(
            request.header("x-amz-target"),
            Some("AmazonCodeWhispererStreamingService.GenerateAssistantResponse")
        );
        assert_eq!(request.header(AGENT_MODE_HEADER), Some("vibe"));
        assert_eq!(
            body_json(&request),
            json!({
                "conversationState": {
                    "conversationId": "conv-1",
                    "currentMessage": {"userInputMessage": {"content": "explain this"}},
                    "chatTriggerType": "MANUAL"
                },
                "profileArn": "arn:aws:codewhisperer:us-east-1:1:profile/P"
            })
        );
    }

    #[test]
    fn test_send_message_keeps_dry_run() {
        let input = SendMessageRequest::new(ConversationState::new(ChatMessage::user("hi")))
            .with_source("IDE")
            .with_dry_run(true);

        let request = serialize_send_message(&input, &resolver(), "Svc").unwrap();
        let body = body_json(&request);
        assert_eq!(body["dryRun"], json!(true));
        assert_eq!(body["source"], json!("IDE"));
        assert!(request.header(AGENT_MODE_HEADER).is_none());
    }

    #[test]
    fn test_repeated_user_message_is_sent() {
        let input = GenerateAssistantResponseRequest::new(
            ConversationState::new(ChatMessage::user("yes")).with_history(vec![
                ChatMessage::user("yes"),
                ChatMessage::assistant("ok, done"),
            ]),
        );

        let request = serialize_generate_assistant_response(&input, &resolver(), "Svc").unwrap();
        let body = body_json(&request);
        assert_eq!(body["conversationState"]["history"].as_array().unwrap().len(), 2);
        assert_eq!(
            body["conversationState"]["currentMessage"],
            json!({"userInputMessage": {"content": "yes"}})
        );

        let input = SendMessageRequest::new(input.conversation_state);
        assert!(serialize_send_message(&input, &resolver(), "Svc").is_ok());
    }

    #[test]
    fn test_invalid_state_rejected_before_send() {
        let input = GenerateAssistantResponseRequest::new(ConversationState::new(
            ChatMessage::Unknown("userInputMessage".to_string(), json!({"content": 1})),
        ));

        let err = serialize_generate_assistant_response(&input, &resolver(), "Svc").unwrap_err();
        match err.root_cause() {
            CodecError::InvalidInput { field_path, .. } => {
                assert_eq!(field_path, "userInputMessage")
            }
            other => panic!("Expected invalid input, got {:?}", other),
        }
    }
}
