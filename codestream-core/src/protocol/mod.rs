//! Protocol module for the streaming chat service
//!
//! Request-side shapes ([`types`]), response stream events ([`events`]),
//! and the wire tables that tie both to the codec ([`shapes`]).

pub mod events;
pub mod shapes;
pub mod types;

pub use events::{
    AssistantResponseEvent, CodeEvent, CodeReferenceEvent, DryRunSucceedEvent, FollowupPromptEvent,
    IntentsEvent, InteractionComponentEntry, InteractionComponentsEvent, InvalidStateEvent,
    MessageMetadataEvent, ResponseStreamEvent, SupplementaryWebLinksEvent, ToolUseEvent,
};
pub use types::{
    AdditionalContentEntry, AssistantResponseMessage, ChatMessage, ChatTriggerType,
    ConversationState, FollowupPrompt, GenerateAssistantResponseRequest, ImageBlock, ImageFormat,
    ImageSource, Reference, SendMessageRequest, Span, SupplementaryWebLink, Tool, ToolInputSchema,
    ToolResult, ToolResultContentBlock, ToolResultStatus, ToolSpecification, ToolUse,
    UserInputMessage, UserInputMessageContext, UserIntent,
};
