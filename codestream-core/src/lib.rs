//! Codestream Core Library
//!
//! Client-side codec for a streaming chat RPC service. Requests are
//! projected onto JSON through static field tables, sent through a
//! pluggable [`http::Transport`], and answered either by a typed
//! [`service::ServiceError`] or by a lazily decoded [`service::EventStream`].
//!
//! ```no_run
//! use codestream_core::config::ClientConfig;
//! use codestream_core::protocol::{
//!     ChatMessage, ConversationState, GenerateAssistantResponseRequest,
//! };
//! use codestream_core::service::StreamingClient;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("https://q.us-east-1.amazonaws.com");
//! let client = StreamingClient::from_config(&config)?;
//! let state = ConversationState::new(ChatMessage::user("hello"));
//! let request = GenerateAssistantResponseRequest::new(state);
//! let output = client.generate_assistant_response(request).await?;
//! println!("{}", output.events.collect_text().await?);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod http;
pub mod protocol;
pub mod service;

/// Returns the version of the Codestream Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
