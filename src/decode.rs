use std::collections::HashMap;

use serde_json::Value;

use crate::codec;
use crate::error::{Result, WebhookError};
use crate::event::InboundEvent;

pub fn decode_event(event: &InboundEvent) -> Result<Value> {
    let body = event
        .body
        .as_deref()
        .ok_or_else(|| WebhookError::MalformedEvent("No body field in event".to_owned()))?;
    decode_payload(body)
}

/// base64, then form fields, then the JSON in `payload`.
pub fn decode_payload(encoded_body: &str) -> Result<Value> {
    let body = codec::decode_body(encoded_body)?;
    let fields = urlencoded_to_map(&body);
    let payload = fields
        .get("payload")
        .ok_or_else(|| WebhookError::MalformedEvent("No payload field in body".to_owned()))?;
    serde_json::from_str(payload)
        .map_err(|err| WebhookError::MalformedEvent(format!("Payload is not valid JSON: {}", err)))
}

/// Later duplicates of a key win.
fn urlencoded_to_map(body: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(body.as_bytes()).into_owned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(form: &str) -> String {
        base64::encode(form.as_bytes())
    }

    fn form_with_payload(json: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(json.as_bytes()).collect();
        format!("payload={}", encoded)
    }

    fn assert_malformed(result: Result<Value>, needle: &str) {
        match result {
            Err(WebhookError::MalformedEvent(message)) => {
                assert!(message.contains(needle), "message {:?} lacks {:?}", message, needle)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn decodes_payload_field() {
        let body = encode(&form_with_payload(r#"{"workflow_run":{"id":7},"action":"completed"}"#));
        let value = decode_payload(&body).unwrap();
        assert_eq!(value["workflow_run"]["id"], 7);
        assert_eq!(value["action"], "completed");
    }

    #[test]
    fn ignores_other_form_fields() {
        let form = format!("foo=bar&{}&baz=1", form_with_payload(r#"{"a":true}"#));
        assert_eq!(decode_payload(&encode(&form)).unwrap()["a"], true);
    }

    #[test]
    fn plus_decodes_as_space() {
        let value = decode_payload(&encode(r#"payload={"name":"hello+world"}"#)).unwrap();
        assert_eq!(value["name"], "hello world");
    }

    #[test]
    fn missing_body_field() {
        assert_malformed(decode_event(&InboundEvent::default()), "No body field");
    }

    #[test]
    fn missing_payload_key() {
        assert_malformed(decode_payload(&encode("other=1")), "No payload field");
    }

    #[test]
    fn invalid_json() {
        assert_malformed(decode_payload(&encode("payload=%7Bnope")), "not valid JSON");
    }

    #[test]
    fn invalid_base64() {
        assert_malformed(decode_payload("payload={}"), "base64");
    }
}
