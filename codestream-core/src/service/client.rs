//! Streaming service client
//!
//! Ties the pieces together: serialize the input, add per-call headers,
//! send through the transport, then either dispatch the error response or
//! hand the framed body to an [`EventStream`].

use super::error::{dispatch_error, ClientError, ClientResult};
use super::operation::Operation;
use super::serializer::{serialize_generate_assistant_response, serialize_send_message};
use super::streaming::EventStream;
use crate::config::{ClientConfig, ConfigError, ConfigValidator, DEFAULT_SERVICE_NAME};
use crate::http::client::HttpClient;
use crate::http::{EndpointResolver, HttpRequest, ResponseBody, ResponseMetadata, Transport};
use crate::protocol::types::{GenerateAssistantResponseRequest, SendMessageRequest};
use reqwest::header::HeaderMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Unique id attached to every call
pub const INVOCATION_ID_HEADER: &str = "amz-sdk-invocation-id";

/// Response header naming the conversation a turn belongs to
pub const CONVERSATION_ID_HEADER: &str = "x-amzn-codewhisperer-conversation-id";

/// Result of `GenerateAssistantResponse`
#[derive(Debug)]
pub struct GenerateAssistantResponseOutput {
    /// Conversation id reported in the response headers
    pub conversation_id: Option<String>,
    pub metadata: ResponseMetadata,
    pub events: EventStream,
}

/// Result of `SendMessage`
#[derive(Debug)]
pub struct SendMessageOutput {
    pub metadata: ResponseMetadata,
    pub events: EventStream,
}

/// Client for the streaming chat service
///
/// Cheap to clone; clones share the transport and endpoint resolver.
#[derive(Clone)]
pub struct StreamingClient {
    transport: Arc<dyn Transport>,
    resolver: Arc<dyn EndpointResolver>,
    service_name: String,
    profile_arn: Option<String>,
}

impl StreamingClient {
    pub fn new(transport: Arc<dyn Transport>, resolver: Arc<dyn EndpointResolver>) -> Self {
        Self {
            transport,
            resolver,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            profile_arn: None,
        }
    }

    /// Build a client with the reqwest transport from a validated configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        ConfigValidator::new().validate(config)?;

        let transport = HttpClient::with_config(&config.connection, &config.user_agent)?;
        let resolver = config.endpoint_resolver()?;

        let client = Self::new(Arc::new(transport), Arc::new(resolver))
            .with_service_name(config.service_name.clone());

        Ok(match &config.profile_arn {
            Some(arn) => client.with_profile_arn(arn.clone()),
            None => client,
        })
    }

    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = service_name.into();
        self
    }

    /// Profile used when a request does not name one
    pub fn with_profile_arn(mut self, profile_arn: impl Into<String>) -> Self {
        self.profile_arn = Some(profile_arn.into());
        self
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub async fn generate_assistant_response(
        &self,
        mut input: GenerateAssistantResponseRequest,
    ) -> ClientResult<GenerateAssistantResponseOutput> {
        if input.profile_arn.is_none() {
            input.profile_arn = self.profile_arn.clone();
        }

        let request = serialize_generate_assistant_response(
            &input,
            self.resolver.as_ref(),
            &self.service_name,
        )?;
        let (headers, events) = self.invoke(Operation::GenerateAssistantResponse, request).await?;

        let conversation_id = headers
            .get(CONVERSATION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Ok(GenerateAssistantResponseOutput {
            conversation_id,
            metadata: events.metadata().clone(),
            events,
        })
    }

    pub async fn send_message(
        &self,
        mut input: SendMessageRequest,
    ) -> ClientResult<SendMessageOutput> {
        if input.profile_arn.is_none() {
            input.profile_arn = self.profile_arn.clone();
        }

        let request = serialize_send_message(&input, self.resolver.as_ref(), &self.service_name)?;
        let (_, events) = self.invoke(Operation::SendMessage, request).await?;

        Ok(SendMessageOutput {
            metadata: events.metadata().clone(),
            events,
        })
    }

    async fn invoke(
        &self,
        operation: Operation,
        mut request: HttpRequest,
    ) -> ClientResult<(HeaderMap, EventStream)> {
        let invocation_id = Uuid::new_v4().to_string();
        request
            .headers
            .insert(INVOCATION_ID_HEADER.to_string(), invocation_id.clone());

        info!("{} request [invocation_id: {}]", operation, invocation_id);
        let response = self.transport.send(request).await?;
        let metadata = ResponseMetadata::from_response(response.status, &response.headers);
        debug!(
            "{} response status {} [invocation_id: {}, request_id: {}]",
            operation,
            response.status,
            invocation_id,
            metadata.request_id.as_deref().unwrap_or("-")
        );

        if response.is_error() {
            let status = response.status;
            let headers = response.headers.clone();
            let body = response.into_bytes().await?;
            return Err(dispatch_error(status, &headers, &body).into());
        }

        match response.body {
            ResponseBody::Frames(frames) => {
                let events = EventStream::from_frames(frames, operation.event_table(), metadata);
                Ok((response.headers, events))
            }
            ResponseBody::Bytes(bytes) => Err(ClientError::response(
                format!(
                    "{} expected an event stream, got a {} byte body",
                    operation,
                    bytes.len()
                ),
                &metadata,
            )),
        }
    }
}

impl fmt::Debug for StreamingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingClient")
            .field("endpoint", &self.resolver.resolve())
            .field("service_name", &self.service_name)
            .field("profile_arn", &self.profile_arn)
            .finish_non_exhaustive()
    }
}
