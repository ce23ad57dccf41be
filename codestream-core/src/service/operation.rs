//! Operations and their event tables

use std::fmt;

/// Decoder selected for a named stream frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    MessageMetadata,
    AssistantResponse,
    Code,
    CodeReference,
    SupplementaryWebLinks,
    FollowupPrompt,
    ToolUse,
    InteractionComponents,
    Intents,
    InvalidState,
    DryRunSucceed,
    /// Reserved name carrying an in-stream service error
    Error,
}

/// Fixed mapping from frame name to decoder for one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTable {
    events: &'static [(&'static str, EventKind)],
    error_events: &'static [&'static str],
}

impl EventTable {
    /// Decoder for a frame name; `None` for names this operation does not know
    pub fn lookup(&self, name: &str) -> Option<EventKind> {
        if self.is_error_event(name) {
            return Some(EventKind::Error);
        }
        self.events
            .iter()
            .find(|(event, _)| *event == name)
            .map(|(_, kind)| *kind)
    }

    /// Whether `name` is reserved for in-stream errors
    pub fn is_error_event(&self, name: &str) -> bool {
        self.error_events.contains(&name)
    }

    pub fn error_events(&self) -> &'static [&'static str] {
        self.error_events
    }

    /// Every non-error event name, in table order
    pub fn event_names(&self) -> impl Iterator<Item = &'static str> {
        self.events.iter().map(|(name, _)| *name)
    }
}

const CHAT_EVENTS: &[(&str, EventKind)] = &[
    ("messageMetadataEvent", EventKind::MessageMetadata),
    ("assistantResponseEvent", EventKind::AssistantResponse),
    ("codeEvent", EventKind::Code),
    ("codeReferenceEvent", EventKind::CodeReference),
    ("supplementaryWebLinksEvent", EventKind::SupplementaryWebLinks),
    ("followupPromptEvent", EventKind::FollowupPrompt),
    ("toolUseEvent", EventKind::ToolUse),
    ("interactionComponentsEvent", EventKind::InteractionComponents),
    ("intentsEvent", EventKind::Intents),
    ("invalidStateEvent", EventKind::InvalidState),
];

const SEND_MESSAGE_EVENTS: &[(&str, EventKind)] = &[
    ("messageMetadataEvent", EventKind::MessageMetadata),
    ("assistantResponseEvent", EventKind::AssistantResponse),
    ("codeEvent", EventKind::Code),
    ("codeReferenceEvent", EventKind::CodeReference),
    ("supplementaryWebLinksEvent", EventKind::SupplementaryWebLinks),
    ("followupPromptEvent", EventKind::FollowupPrompt),
    ("toolUseEvent", EventKind::ToolUse),
    ("interactionComponentsEvent", EventKind::InteractionComponents),
    ("intentsEvent", EventKind::Intents),
    ("invalidStateEvent", EventKind::InvalidState),
    ("dryRunSucceedEvent", EventKind::DryRunSucceed),
];

const GENERATE_ASSISTANT_RESPONSE_TABLE: EventTable = EventTable {
    events: CHAT_EVENTS,
    error_events: &["error"],
};

const SEND_MESSAGE_TABLE: EventTable = EventTable {
    events: SEND_MESSAGE_EVENTS,
    error_events: &["Error", "QuotaLevelExceededError", "ValidationError"],
};

/// Operations exposed by the streaming service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GenerateAssistantResponse,
    SendMessage,
}

impl Operation {
    pub const ALL: [Operation; 2] = [Operation::GenerateAssistantResponse, Operation::SendMessage];

    /// Name used in the `x-amz-target` header
    pub fn name(&self) -> &'static str {
        match self {
            Operation::GenerateAssistantResponse => "GenerateAssistantResponse",
            Operation::SendMessage => "SendMessage",
        }
    }

    /// Path relative to the endpoint's base path
    pub fn path(&self) -> &'static str {
        "/"
    }

    pub fn event_table(&self) -> EventTable {
        match self {
            Operation::GenerateAssistantResponse => GENERATE_ASSISTANT_RESPONSE_TABLE,
            Operation::SendMessage => SEND_MESSAGE_TABLE,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_event_names_are_per_operation() {
        let generate = Operation::GenerateAssistantResponse.event_table();
        assert_eq!(generate.lookup("error"), Some(EventKind::Error));
        assert_eq!(generate.lookup("Error"), None);
        assert_eq!(generate.lookup("ValidationError"), None);

        let send = Operation::SendMessage.event_table();
        assert_eq!(send.lookup("error"), None);
        assert_eq!(send.lookup("Error"), Some(EventKind::Error));
        assert_eq!(send.lookup("QuotaLevelExceededError"), Some(EventKind::Error));
        assert_eq!(send.lookup("ValidationError"), Some(EventKind::Error));
    }

    #[test]
    fn test_dry_run_event_only_for_send_message() {
        assert_eq!(
            Operation::SendMessage.event_table().lookup("dryRunSucceedEvent"),
            Some(EventKind::DryRunSucceed)
        );
        assert_eq!(
            Operation::GenerateAssistantResponse
                .event_table()
                .lookup("dryRunSucceedEvent"),
            None
        );
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let table = Operation::GenerateAssistantResponse.event_table();
        assert_eq!(
            table.lookup("assistantResponseEvent"),
            Some(EventKind::AssistantResponse)
        );
        assert_eq!(table.lookup("AssistantResponseEvent"), None);
        assert_eq!(table.event_names().count(), 10);
    }

    #[test]
    fn test_names() {
        assert_eq!(Operation::SendMessage.to_string(), "SendMessage");
        for op in Operation::ALL {
            assert_eq!(op.path(), "/");
        }
    }
}
