use crate::error::{Result, WebhookError};

/// `text/*` and exactly `application/json` can travel as-is; anything else
/// (including a missing content type) has to be base64 encoded.
pub fn is_text_content_type(content_type: Option<&str>) -> bool {
    match content_type {
        Some(content_type) => content_type.starts_with("text/") || content_type == "application/json",
        None => false,
    }
}

pub fn encode_body(raw: &[u8], content_type: Option<&str>) -> String {
    if is_text_content_type(content_type) {
        String::from_utf8_lossy(raw).into_owned()
    } else {
        base64::encode(raw)
    }
}

/// Reverses the base64 step and insists on UTF-8.
pub fn decode_body(encoded: &str) -> Result<String> {
    let bytes = base64::decode(encoded)
        .map_err(|err| WebhookError::MalformedEvent(format!("Body is not valid base64: {}", err)))?;
    String::from_utf8(bytes)
        .map_err(|err| WebhookError::MalformedEvent(format!("Body is not valid UTF-8: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_types_pass_through() {
        let raw = b"payload=%7B%7D";
        assert_eq!(encode_body(raw, Some("text/plain")), "payload=%7B%7D");
        assert_eq!(encode_body(raw, Some("text/html; charset=utf-8")), "payload=%7B%7D");
        assert_eq!(encode_body(b"{\"a\":1}", Some("application/json")), "{\"a\":1}");
    }

    #[test]
    fn other_types_are_base64_encoded() {
        let raw = b"payload=%7B%7D";
        let encoded = encode_body(raw, Some("application/x-www-form-urlencoded"));
        assert_eq!(encoded, "cGF5bG9hZD0lN0IlN0Q=");
        assert_eq!(base64::decode(&encoded).unwrap(), raw.to_vec());
    }

    #[test]
    fn json_with_charset_is_not_treated_as_text() {
        assert!(!is_text_content_type(Some("application/json; charset=utf-8")));
        assert_eq!(encode_body(b"{}", Some("application/json; charset=utf-8")), "e30=");
    }

    #[test]
    fn missing_content_type_is_binary() {
        assert!(!is_text_content_type(None));
        let binary = [0u8, 159, 146, 150];
        assert_eq!(base64::decode(&encode_body(&binary, None)).unwrap(), binary.to_vec());
    }

    #[test]
    fn decode_rejects_bad_base64() {
        match decode_body("not base64!") {
            Err(WebhookError::MalformedEvent(message)) => assert!(message.contains("base64")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        let encoded = base64::encode(&[0xffu8, 0xfe, 0xfd]);
        match decode_body(&encoded) {
            Err(WebhookError::MalformedEvent(message)) => assert!(message.contains("UTF-8")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
