use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

pub type Headers = HashMap<String, String>;

/// What the serverless host hands to the handler.
///
/// `body` is already text: either the original text body or its base64
/// encoding (see [`crate::codec::encode_body`]).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InboundEvent {
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub body: Option<String>,
}

impl InboundEvent {
    pub fn new(headers: Headers, body: String) -> Self {
        InboundEvent { headers, body: Some(body) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Headers,
    pub body: String,
}

impl OutboundResponse {
    pub fn json(status_code: u16, body: String) -> Self {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_owned(), "application/json".to_owned());
        OutboundResponse { status_code, headers, body }
    }

    pub fn ok() -> Self {
        OutboundResponse::json(200, "{}".to_owned())
    }

    pub fn error(message: &str) -> Self {
        OutboundResponse::json(500, json!({ "error": message }).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_carries_json_message() {
        let response = OutboundResponse::error("GITHUB_TOKEN is not set");
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, r#"{"error":"GITHUB_TOKEN is not set"}"#);
        assert_eq!(response.headers.get("Content-Type").map(String::as_str), Some("application/json"));
    }

    #[test]
    fn response_uses_platform_field_names() {
        let value = serde_json::to_value(OutboundResponse::ok()).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["body"], "{}");
    }

    #[test]
    fn event_without_body_deserializes() {
        let event: InboundEvent = serde_json::from_str(r#"{"headers":{"host":"localhost"}}"#).unwrap();
        assert_eq!(event.body, None);
        assert_eq!(event.headers.get("host").map(String::as_str), Some("localhost"));
    }
}
