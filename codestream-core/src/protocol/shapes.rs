//! Wire layouts of every protocol shape
//!
//! One table per record or variant. A member missing from its table never
//! reaches the wire and is ignored when read back.

use super::events::*;
use super::types::*;
use crate::codec::{list_of, nested, Field, Layout};

macro_rules! shape {
    ($ty:ty, $name:literal, $layout:expr) => {
        impl $crate::codec::Shape for $ty {
            const NAME: &'static str = $name;
            const LAYOUT: $crate::codec::Layout = $layout;
        }
    };
}

pub(crate) use shape;

// ----------------------------------------------------------------------------
// Requests
// ----------------------------------------------------------------------------

const GENERATE_ASSISTANT_RESPONSE_REQUEST: &[Field] = &[
    nested::<ConversationState>("conversationState"),
    Field::pass("profileArn"),
    Field::omit("agentMode"),
];

const SEND_MESSAGE_REQUEST: &[Field] = &[
    nested::<ConversationState>("conversationState"),
    Field::pass("profileArn"),
    Field::pass("source"),
    Field::pass("dryRun"),
];

const CONVERSATION_STATE: &[Field] = &[
    Field::pass("conversationId"),
    list_of::<ChatMessage>("history"),
    nested::<ChatMessage>("currentMessage"),
    Field::pass("chatTriggerType"),
    Field::pass("customizationArn"),
];

const CHAT_MESSAGE: &[Field] = &[
    nested::<UserInputMessage>("userInputMessage"),
    nested::<AssistantResponseMessage>("assistantResponseMessage"),
];

const USER_INPUT_MESSAGE: &[Field] = &[
    Field::pass("content"),
    nested::<UserInputMessageContext>("userInputMessageContext"),
    Field::pass("userIntent"),
    Field::pass("origin"),
    list_of::<ImageBlock>("images"),
];

const USER_INPUT_MESSAGE_CONTEXT: &[Field] = &[
    list_of::<ToolResult>("toolResults"),
    list_of::<Tool>("tools"),
    list_of::<AdditionalContentEntry>("additionalContext"),
];

const ADDITIONAL_CONTENT_ENTRY: &[Field] = &[
    Field::pass("name"),
    Field::pass("description"),
    Field::pass("innerContext"),
];

const ASSISTANT_RESPONSE_MESSAGE: &[Field] = &[
    Field::pass("messageId"),
    Field::pass("content"),
    list_of::<SupplementaryWebLink>("supplementaryWebLinks"),
    list_of::<Reference>("references"),
    nested::<FollowupPrompt>("followupPrompt"),
    list_of::<ToolUse>("toolUses"),
];

const SUPPLEMENTARY_WEB_LINK: &[Field] = &[
    Field::pass("url"),
    Field::pass("title"),
    Field::pass("snippet"),
];

const REFERENCE: &[Field] = &[
    Field::pass("licenseName"),
    Field::pass("repository"),
    Field::pass("url"),
    nested::<Span>("recommendationContentSpan"),
];

const SPAN: &[Field] = &[Field::pass("start"), Field::pass("end")];

const FOLLOWUP_PROMPT: &[Field] = &[Field::pass("content"), Field::pass("userIntent")];

const TOOL_USE: &[Field] = &[
    Field::pass("toolUseId"),
    Field::pass("name"),
    Field::pass("input"),
];

const TOOL_RESULT: &[Field] = &[
    Field::pass("toolUseId"),
    list_of::<ToolResultContentBlock>("content"),
    Field::pass("status"),
];

const TOOL_RESULT_CONTENT_BLOCK: &[Field] = &[Field::pass("text"), Field::pass("json")];

const TOOL: &[Field] = &[nested::<ToolSpecification>("toolSpecification")];

const TOOL_SPECIFICATION: &[Field] = &[
    nested::<ToolInputSchema>("inputSchema"),
    Field::pass("name"),
    Field::pass("description"),
];

const TOOL_INPUT_SCHEMA: &[Field] = &[Field::pass("json")];

const IMAGE_BLOCK: &[Field] = &[Field::pass("format"), nested::<ImageSource>("source")];

const IMAGE_SOURCE: &[Field] = &[Field::blob("bytes")];

shape!(
    GenerateAssistantResponseRequest,
    "GenerateAssistantResponseRequest",
    Layout::Record(GENERATE_ASSISTANT_RESPONSE_REQUEST)
);
shape!(SendMessageRequest, "SendMessageRequest", Layout::Record(SEND_MESSAGE_REQUEST));
shape!(ConversationState, "ConversationState", Layout::Record(CONVERSATION_STATE));
shape!(ChatMessage, "ChatMessage", Layout::Variant(CHAT_MESSAGE));
shape!(UserInputMessage, "UserInputMessage", Layout::Record(USER_INPUT_MESSAGE));
shape!(
    UserInputMessageContext,
    "UserInputMessageContext",
    Layout::Record(USER_INPUT_MESSAGE_CONTEXT)
);
shape!(AdditionalContentEntry, "AdditionalContentEntry", Layout::Record(ADDITIONAL_CONTENT_ENTRY));
shape!(
    AssistantResponseMessage,
    "AssistantResponseMessage",
    Layout::Record(ASSISTANT_RESPONSE_MESSAGE)
);
shape!(SupplementaryWebLink, "SupplementaryWebLink", Layout::Record(SUPPLEMENTARY_WEB_LINK));
shape!(Reference, "Reference", Layout::Record(REFERENCE));
shape!(Span, "Span", Layout::Record(SPAN));
shape!(FollowupPrompt, "FollowupPrompt", Layout::Record(FOLLOWUP_PROMPT));
shape!(ToolUse, "ToolUse", Layout::Record(TOOL_USE));
shape!(ToolResult, "ToolResult", Layout::Record(TOOL_RESULT));
shape!(
    ToolResultContentBlock,
    "ToolResultContentBlock",
    Layout::Variant(TOOL_RESULT_CONTENT_BLOCK)
);
shape!(Tool, "Tool", Layout::Variant(TOOL));
shape!(ToolSpecification, "ToolSpecification", Layout::Record(TOOL_SPECIFICATION));
shape!(ToolInputSchema, "ToolInputSchema", Layout::Record(TOOL_INPUT_SCHEMA));
shape!(ImageBlock, "ImageBlock", Layout::Record(IMAGE_BLOCK));
shape!(ImageSource, "ImageSource", Layout::Variant(IMAGE_SOURCE));

// ----------------------------------------------------------------------------
// Events
// ----------------------------------------------------------------------------

const MESSAGE_METADATA_EVENT: &[Field] =
    &[Field::pass("conversationId"), Field::pass("utteranceId")];

const CONTENT_EVENT: &[Field] = &[Field::pass("content")];

const CODE_REFERENCE_EVENT: &[Field] = &[list_of::<Reference>("references")];

const SUPPLEMENTARY_WEB_LINKS_EVENT: &[Field] =
    &[list_of::<SupplementaryWebLink>("supplementaryWebLinks")];

const FOLLOWUP_PROMPT_EVENT: &[Field] = &[nested::<FollowupPrompt>("followupPrompt")];

const TOOL_USE_EVENT: &[Field] = &[
    Field::pass("toolUseId"),
    Field::pass("name"),
    Field::pass("input"),
    Field::pass("stop"),
];

const INTERACTION_COMPONENTS_EVENT: &[Field] =
    &[list_of::<InteractionComponentEntry>("interactionComponentEntries")];

const INTERACTION_COMPONENT_ENTRY: &[Field] = &[
    Field::pass("interactionComponentId"),
    Field::pass("interactionComponent"),
];

const INTENTS_EVENT: &[Field] = &[Field::pass("intents")];

const INVALID_STATE_EVENT: &[Field] = &[Field::pass("reason"), Field::pass("message")];

shape!(MessageMetadataEvent, "MessageMetadataEvent", Layout::Record(MESSAGE_METADATA_EVENT));
shape!(AssistantResponseEvent, "AssistantResponseEvent", Layout::Record(CONTENT_EVENT));
shape!(CodeEvent, "CodeEvent", Layout::Record(CONTENT_EVENT));
shape!(CodeReferenceEvent, "CodeReferenceEvent", Layout::Record(CODE_REFERENCE_EVENT));
shape!(
    SupplementaryWebLinksEvent,
    "SupplementaryWebLinksEvent",
    Layout::Record(SUPPLEMENTARY_WEB_LINKS_EVENT)
);
shape!(FollowupPromptEvent, "FollowupPromptEvent", Layout::Record(FOLLOWUP_PROMPT_EVENT));
shape!(ToolUseEvent, "ToolUseEvent", Layout::Record(TOOL_USE_EVENT));
shape!(
    InteractionComponentsEvent,
    "InteractionComponentsEvent",
    Layout::Record(INTERACTION_COMPONENTS_EVENT)
);
shape!(
    InteractionComponentEntry,
    "InteractionComponentEntry",
    Layout::Record(INTERACTION_COMPONENT_ENTRY)
);
shape!(IntentsEvent, "IntentsEvent", Layout::Record(INTENTS_EVENT));
shape!(InvalidStateEvent, "InvalidStateEvent", Layout::Record(INVALID_STATE_EVENT));
shape!(DryRunSucceedEvent, "DryRunSucceedEvent", Layout::Record(&[]));
