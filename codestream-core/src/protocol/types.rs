//! Request-side protocol types
//!
//! These structures describe a conversation sent to the assistant service:
//! the current message, prior history, tool definitions and tool results.
//! Field names follow the wire (camelCase); optional members are skipped
//! when absent so that "absent" and "null" stay distinct.

use crate::codec::{Blob, Document};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What caused this chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatTriggerType {
    /// Typed by the user
    Manual,
    /// Raised from an editor diagnostic
    Diagnostic,
    /// Inline chat in the editor
    InlineChat,
}

/// Canned intent attached to a user message or follow-up prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserIntent {
    SuggestAlternateImplementation,
    ApplyCommonBestPractices,
    ImproveCode,
    ShowExamples,
    CiteSources,
    ExplainLineByLine,
    ExplainCodeSelection,
    GenerateCloudformationTemplate,
    GenerateUnitTests,
    CodeGeneration,
}

/// Outcome reported for a tool invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolResultStatus {
    Success,
    Error,
}

/// Encoding of an image attached to a user message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

/// Full state of a conversation for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    /// Service-assigned conversation identifier (absent on the first turn)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,

    /// Prior turns, oldest first; never includes `current_message`, which is
    /// its own member even when its content repeats an earlier turn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<ChatMessage>>,

    /// The turn being sent now
    pub current_message: ChatMessage,

    /// What caused this turn
    pub chat_trigger_type: ChatTriggerType,

    /// Customization to apply to the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customization_arn: Option<String>,
}

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChatMessage {
    UserInputMessage(UserInputMessage),
    AssistantResponseMessage(AssistantResponseMessage),
    /// Alternative not known to this client: `(wire tag, wire payload)`
    #[serde(rename = "$unknown")]
    Unknown(String, Value),
}

/// A message written by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInputMessage {
    pub content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_input_message_context: Option<UserInputMessageContext>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_intent: Option<UserIntent>,

    /// Client surface the message came from (e.g. "IDE", "CLI")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageBlock>>,
}

/// Context carried alongside a user message
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInputMessageContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_results: Option<Vec<ToolResult>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<Vec<AdditionalContentEntry>>,
}

/// Extra named context supplied by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalContentEntry {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_context: Option<String>,
}

/// A message previously produced by the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantResponseMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    pub content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplementary_web_links: Option<Vec<SupplementaryWebLink>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub followup_prompt: Option<FollowupPrompt>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_uses: Option<Vec<ToolUse>>,
}

/// Web page cited by the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplementaryWebLink {
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// Licensed code the assistant's answer drew on
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation_content_span: Option<Span>,
}

/// Character range within a piece of content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i32>,
}

/// Suggested next question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowupPrompt {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_intent: Option<UserIntent>,
}

/// A tool invocation requested by the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUse {
    pub tool_use_id: String,
    pub name: String,
    /// Tool arguments, passed through untouched
    #[serde(default)]
    pub input: Document,
}

/// Result of running a tool, reported back on the next turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub tool_use_id: String,
    pub content: Vec<ToolResultContentBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ToolResultStatus>,
}

/// One block of tool output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolResultContentBlock {
    Text(String),
    Json(Document),
    #[serde(rename = "$unknown")]
    Unknown(String, Value),
}

/// A tool the assistant may call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tool {
    ToolSpecification(ToolSpecification),
    #[serde(rename = "$unknown")]
    Unknown(String, Value),
}

/// Name, description and input schema of a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpecification {
    pub input_schema: ToolInputSchema,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// JSON schema of a tool's input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInputSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<Document>,
}

/// Image attached to a user message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBlock {
    pub format: ImageFormat,
    pub source: ImageSource,
}

/// Where an image's bytes come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageSource {
    /// Inline bytes, base64 on the wire
    Bytes(Blob),
    #[serde(rename = "$unknown")]
    Unknown(String, Value),
}

/// Input of the `GenerateAssistantResponse` operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAssistantResponseRequest {
    pub conversation_state: ConversationState,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_arn: Option<String>,

    /// Sent as a header, never in the body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_mode: Option<String>,
}

/// Input of the `SendMessage` operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub conversation_state: ConversationState,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_arn: Option<String>,

    /// Client surface the request came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Validate permissions without generating a response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatMessage {
    /// Plain user message
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage::UserInputMessage(UserInputMessage::new(content))
    }

    /// Plain assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage::AssistantResponseMessage(AssistantResponseMessage::new(content))
    }
}

impl UserInputMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            user_input_message_context: None,
            user_intent: None,
            origin: None,
            images: None,
        }
    }

    pub fn with_context(mut self, context: UserInputMessageContext) -> Self {
        self.user_input_message_context = Some(context);
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_image(mut self, format: ImageFormat, bytes: impl Into<Blob>) -> Self {
        self.images.get_or_insert_with(Vec::new).push(ImageBlock {
            format,
            source: ImageSource::Bytes(bytes.into()),
        });
        self
    }
}

impl AssistantResponseMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            message_id: None,
            content: content.into(),
            supplementary_web_links: None,
            references: None,
            followup_prompt: None,
            tool_uses: None,
        }
    }

    pub fn with_tool_use(mut self, tool_use: ToolUse) -> Self {
        self.tool_uses.get_or_insert_with(Vec::new).push(tool_use);
        self
    }
}

impl ConversationState {
    /// New conversation with a single manual user turn
    pub fn new(current_message: ChatMessage) -> Self {
        Self {
            conversation_id: None,
            history: None,
            current_message,
            chat_trigger_type: ChatTriggerType::Manual,
            customization_arn: None,
        }
    }

    pub fn with_conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_trigger(mut self, trigger: ChatTriggerType) -> Self {
        self.chat_trigger_type = trigger;
        self
    }
}

impl GenerateAssistantResponseRequest {
    pub fn new(conversation_state: ConversationState) -> Self {
        Self {
            conversation_state,
            profile_arn: None,
            agent_mode: None,
        }
    }

    pub fn with_profile_arn(mut self, arn: impl Into<String>) -> Self {
        self.profile_arn = Some(arn.into());
        self
    }

    pub fn with_agent_mode(mut self, mode: impl Into<String>) -> Self {
        self.agent_mode = Some(mode.into());
        self
    }
}

impl SendMessageRequest {
    pub fn new(conversation_state: ConversationState) -> Self {
        Self {
            conversation_state,
            profile_arn: None,
            source: None,
            dry_run: None,
        }
    }

    pub fn with_profile_arn(mut self, arn: impl Into<String>) -> Self {
        self.profile_arn = Some(arn.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = Some(dry_run);
        self
    }
}
