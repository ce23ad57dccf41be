//! HTTP transport implementation using reqwest

use super::framing::{self, EVENT_STREAM_CONTENT_TYPE};
use super::{HttpRequest, HttpResponse, ResponseBody, Transport, TransportError};
use crate::config::{ConfigError, ConnectionConfig};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::{Client, ClientBuilder, Response};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default user agent
const USER_AGENT: &str = concat!("codestream/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client with connection pooling
#[derive(Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: Arc<Client>,

    /// Maximum buffered response size to prevent OOM
    max_response_size: usize,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_config(&ConnectionConfig::default(), USER_AGENT)
    }

    /// Create a new HTTP client from connection settings
    pub fn with_config(config: &ConnectionConfig, user_agent: &str) -> Result<Self, ConfigError> {
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(config.max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(user_agent)
            .gzip(true)
            .build()
            .map_err(|e| ConfigError::HttpClient {
                message: e.to_string(),
            })?;

        Ok(Self {
            client: Arc::new(client),
            max_response_size: config.max_response_bytes,
        })
    }

    fn is_event_stream(response: &Response) -> bool {
        response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_ascii_lowercase().contains(EVENT_STREAM_CONTENT_TYPE))
            .unwrap_or(false)
    }

    /// Read a whole body, refusing anything past the size limit
    async fn read_limited(&self, response: Response) -> Result<Bytes, TransportError> {
        let max = self.max_response_size;
        if let Some(length) = response.content_length() {
            if length as usize > max {
                return Err(TransportError::ResponseTooLarge {
                    size: length as usize,
                    max,
                });
            }
        }

        let mut body = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            if body.len() + chunk.len() > max {
                return Err(TransportError::ResponseTooLarge {
                    size: body.len() + chunk.len(),
                    max,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(Bytes::from(body))
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url();
        debug!("POST {} ({} headers)", url, request.headers.len());

        let mut builder = self.client.request(request.method, &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!("request to {} failed: {}", url, e);
            TransportError::from(e)
        })?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        debug!("response status {} from {}", status, url);

        let body = if status < 300 && Self::is_event_stream(&response) {
            ResponseBody::Frames(framing::frames(response.bytes_stream()))
        } else {
            ResponseBody::Bytes(self.read_limited(response).await?)
        };

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("max_response_size", &self.max_response_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request_to(uri: &str, body: &'static str) -> HttpRequest {
        let endpoint = super::super::Endpoint::parse(uri).unwrap();
        let mut headers = BTreeMap::new();
        headers.insert("x-amz-target".to_string(), "Svc.Op".to_string());

        super::super::build_request(
            &super::super::StaticEndpointResolver::new(endpoint),
            headers,
            "/",
            None,
            Some(Bytes::from_static(body.as_bytes())),
        )
    }

    #[tokio::test]
    async fn test_sends_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("x-amz-target", "Svc.Op"))
            .and(body_string("{\"a\":1}"))
            .respond_with(ResponseTemplate::new(400).set_body_string("{\"message\":\"bad\"}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let response = client.send(request_to(&server.uri(), "{\"a\":1}")).await.unwrap();

        assert_eq!(response.status, 400);
        assert!(response.is_error());
        let body = response.into_bytes().await.unwrap();
        assert_eq!(&body[..], b"{\"message\":\"bad\"}");
    }

    #[tokio::test]
    async fn test_response_too_large() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("x".repeat(64)))
            .mount(&server)
            .await;

        let config = ConnectionConfig {
            max_response_bytes: 16,
            ..ConnectionConfig::default()
        };
        let client = HttpClient::with_config(&config, "test-agent").unwrap();
        let err = client.send(request_to(&server.uri(), "{}")).await.unwrap_err();

        assert!(matches!(err, TransportError::ResponseTooLarge { max: 16, .. }));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind then release a port so nothing is listening on it
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let request = request_to(&format!("http://127.0.0.1:{}", port), "{}");

        let err = HttpClient::new().unwrap().send(request).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Connect { .. } | TransportError::Request { .. }
        ));
    }
}
