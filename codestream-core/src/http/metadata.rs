//! Response metadata extraction

use reqwest::header::HeaderMap;
use serde::Serialize;

const REQUEST_ID_HEADERS: [&str; 3] = ["x-amzn-requestid", "x-amzn-request-id", "x-amz-request-id"];
const EXTENDED_REQUEST_ID_HEADER: &str = "x-amz-id-2";
const CF_ID_HEADER: &str = "x-amz-cf-id";

/// Identifiers of a single response, shared by its result and any error
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub http_status_code: u16,
    pub request_id: Option<String>,
    pub extended_request_id: Option<String>,
    pub cf_id: Option<String>,
}

impl ResponseMetadata {
    /// Read metadata from a response's status and headers
    pub fn from_response(status: u16, headers: &HeaderMap) -> Self {
        Self {
            http_status_code: status,
            request_id: REQUEST_ID_HEADERS
                .iter()
                .find_map(|name| header_value(headers, name)),
            extended_request_id: header_value(headers, EXTENDED_REQUEST_ID_HEADER),
            cf_id: header_value(headers, CF_ID_HEADER),
        }
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
