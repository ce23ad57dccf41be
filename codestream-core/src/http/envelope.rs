//! Request envelope assembly
//!
//! The envelope builder knows nothing about the shapes being sent. It takes
//! an opaque body and the headers computed by the operation serializer and
//! places them on the resolved endpoint.

use super::HttpRequest;
use bytes::Bytes;
use reqwest::Method;
use std::collections::BTreeMap;
use url::Url;

/// Where requests are sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub protocol: String,
    pub hostname: String,
    pub port: Option<u16>,
    /// Base path prefixed to every operation path
    pub path: String,
}

impl Endpoint {
    /// Parse an endpoint from an absolute URL
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(input)?;
        let hostname = url
            .host_str()
            .ok_or(url::ParseError::EmptyHost)?
            .to_string();

        Ok(Self {
            protocol: url.scheme().to_string(),
            hostname,
            port: url.port(),
            path: url.path().to_string(),
        })
    }
}

/// Supplies the endpoint for each request
pub trait EndpointResolver: Send + Sync {
    fn resolve(&self) -> Endpoint;
}

/// Resolver that always returns the same endpoint
#[derive(Debug, Clone)]
pub struct StaticEndpointResolver {
    endpoint: Endpoint,
}

impl StaticEndpointResolver {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    pub fn from_url(input: &str) -> Result<Self, url::ParseError> {
        Endpoint::parse(input).map(Self::new)
    }
}

impl EndpointResolver for StaticEndpointResolver {
    fn resolve(&self) -> Endpoint {
        self.endpoint.clone()
    }
}

/// Join a base path and an operation path without doubling the separator
pub fn join_path(base: &str, path: &str) -> String {
    match (base.strip_suffix('/'), path.starts_with('/')) {
        (Some(trimmed), true) => format!("{}{}", trimmed, path),
        (None, false) if !base.is_empty() && !path.is_empty() => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

/// Assemble a POST request on the resolved endpoint
pub fn build_request(
    resolver: &dyn EndpointResolver,
    headers: BTreeMap<String, String>,
    path: &str,
    override_host: Option<&str>,
    body: Option<Bytes>,
) -> HttpRequest {
    let endpoint = resolver.resolve();
    let mut path = join_path(&endpoint.path, path);
    if !path.starts_with('/') {
        path.insert(0, '/');
    }

    HttpRequest {
        method: Method::POST,
        protocol: endpoint.protocol,
        hostname: override_host
            .map(str::to_string)
            .unwrap_or(endpoint.hostname),
        port: endpoint.port,
        path,
        headers,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(url: &str) -> StaticEndpointResolver {
        StaticEndpointResolver::from_url(url).unwrap()
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/v1/", "/chat"), "/v1/chat");
        assert_eq!(join_path("/v1", "/chat"), "/v1/chat");
        assert_eq!(join_path("/v1", "chat"), "/v1/chat");
        assert_eq!(join_path("/", "/"), "/");
        assert_eq!(join_path("", "/chat"), "/chat");
    }

    #[test]
    fn test_endpoint_parse() {
        let endpoint = Endpoint::parse("https://example.com:8443/base/").unwrap();
        assert_eq!(endpoint.protocol, "https");
        assert_eq!(endpoint.hostname, "example.com");
        assert_eq!(endpoint.port, Some(8443));
        assert_eq!(endpoint.path, "/base/");

        assert!(Endpoint::parse("not a url").is_err());
    }

    #[test]
    fn test_build_request() {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());

        let request = build_request(
            &resolver("https://example.com/v1/"),
            headers,
            "/chat",
            None,
            Some(Bytes::from_static(b"{}")),
        );

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/v1/chat");
        assert_eq!(request.url(), "https://example.com/v1/chat");
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_build_request_with_host_override() {
        let request = build_request(
            &resolver("http://localhost:9000"),
            BTreeMap::new(),
            "/",
            Some("override.internal"),
            None,
        );

        assert_eq!(request.url(), "http://override.internal:9000/");
        assert!(request.body.is_none());
    }
}
