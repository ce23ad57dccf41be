//! Response-side protocol types
//!
//! A streaming response is an ordered sequence of [`ResponseStreamEvent`]s.
//! Each named frame on the wire decodes into one payload record below.

use super::types::{FollowupPrompt, Reference, SupplementaryWebLink};
use crate::codec::Document;
use crate::service::error::ServiceError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Conversation identifiers, usually the first event of a stream
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadataEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utterance_id: Option<String>,
}

/// A chunk of assistant text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantResponseEvent {
    pub content: String,
}

/// A chunk of generated code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeEvent {
    pub content: String,
}

/// Licensed code referenced by the answer so far
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeReferenceEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<Reference>>,
}

/// Citations for the answer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplementaryWebLinksEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplementary_web_links: Option<Vec<SupplementaryWebLink>>,
}

/// Suggested follow-up question
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowupPromptEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followup_prompt: Option<FollowupPrompt>,
}

/// A chunk of a tool invocation; `input` arrives in fragments until `stop`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUseEvent {
    pub tool_use_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<bool>,
}

/// Structured UI components rendered by the client
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionComponentsEvent {
    #[serde(default)]
    pub interaction_component_entries: Vec<InteractionComponentEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionComponentEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction_component_id: Option<String>,
    /// Component tree, passed through untouched
    #[serde(default)]
    pub interaction_component: Document,
}

/// Intents detected in the user's message
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentsEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intents: Option<Document>,
}

/// The service reached a state it cannot continue from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidStateEvent {
    pub reason: String,
    pub message: String,
}

/// A dry-run request would have succeeded
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DryRunSucceedEvent {}

/// One decoded event of a response stream
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseStreamEvent {
    MessageMetadata(MessageMetadataEvent),
    AssistantResponse(AssistantResponseEvent),
    Code(CodeEvent),
    CodeReference(CodeReferenceEvent),
    SupplementaryWebLinks(SupplementaryWebLinksEvent),
    FollowupPrompt(FollowupPromptEvent),
    ToolUse(ToolUseEvent),
    InteractionComponents(InteractionComponentsEvent),
    Intents(IntentsEvent),
    InvalidState(InvalidStateEvent),
    DryRunSucceed(DryRunSucceedEvent),
    /// Service failure reported after the stream began; always the last event
    Error(ServiceError),
    /// Frame whose name is not in the operation's event table
    Unknown { name: String, payload: Bytes },
}

impl ResponseStreamEvent {
    /// Wire name of the event, where it has a fixed one
    pub fn name(&self) -> &str {
        match self {
            ResponseStreamEvent::MessageMetadata(_) => "messageMetadataEvent",
            ResponseStreamEvent::AssistantResponse(_) => "assistantResponseEvent",
            ResponseStreamEvent::Code(_) => "codeEvent",
            ResponseStreamEvent::CodeReference(_) => "codeReferenceEvent",
            ResponseStreamEvent::SupplementaryWebLinks(_) => "supplementaryWebLinksEvent",
            ResponseStreamEvent::FollowupPrompt(_) => "followupPromptEvent",
            ResponseStreamEvent::ToolUse(_) => "toolUseEvent",
            ResponseStreamEvent::InteractionComponents(_) => "interactionComponentsEvent",
            ResponseStreamEvent::Intents(_) => "intentsEvent",
            ResponseStreamEvent::InvalidState(_) => "invalidStateEvent",
            ResponseStreamEvent::DryRunSucceed(_) => "dryRunSucceedEvent",
            ResponseStreamEvent::Error(err) => err.code(),
            ResponseStreamEvent::Unknown { name, .. } => name,
        }
    }

    /// Whether this event ends the stream
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResponseStreamEvent::Error(_))
    }

    /// Text carried by assistant or code chunks
    pub fn text(&self) -> Option<&str> {
        match self {
            ResponseStreamEvent::AssistantResponse(event) => Some(&event.content),
            ResponseStreamEvent::Code(event) => Some(&event.content),
            _ => None,
        }
    }
}
