use serde_json::Value;

use crate::MessagePayload;

/// The only origin whose messages are acted upon.
pub const MESSAGE_ORIGIN: &str = "https://www.linkedin.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutofillMethod {
    /// The user consented in the provider's window.
    OAuth,
    /// The provider is ready to deliver prefill data.
    Ready,
    Unknown(String),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MessageError {
    #[error("message from untrusted origin {0}")]
    UntrustedOrigin(String),
    #[error("malformed message payload: {0}")]
    Malformed(String),
    #[error("message payload has no method")]
    MissingMethod,
}

/// Origins are compared verbatim, as the browser serializes them.
pub fn is_trusted_origin(origin: &str) -> bool {
    origin == MESSAGE_ORIGIN
}

/// Validates the sender and extracts the `method` of a message.
pub fn decode_message(origin: &str, payload: &MessagePayload) -> Result<AutofillMethod, MessageError> {
    if !is_trusted_origin(origin) {
        return Err(MessageError::UntrustedOrigin(origin.to_string()));
    }
    let parsed;
    let value = match payload {
        MessagePayload::Structured(value) => value,
        MessagePayload::Text(text) => {
            parsed = serde_json::from_str::<Value>(text)
                .map_err(|err| MessageError::Malformed(err.to_string()))?;
            &parsed
        }
    };
    let method = value
        .get("method")
        .and_then(Value::as_str)
        .ok_or(MessageError::MissingMethod)?;
    Ok(match method {
        "awliOAuth" => AutofillMethod::OAuth,
        "ready" => AutofillMethod::Ready,
        other => AutofillMethod::Unknown(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn origin_must_match_exactly() {
        assert!(is_trusted_origin("https://www.linkedin.com"));
        assert!(!is_trusted_origin("https://www.linkedin.com:443"));
        assert!(!is_trusted_origin("https://www.linkedin.com/"));
        assert!(!is_trusted_origin("https://WWW.LinkedIn.com"));
        assert!(!is_trusted_origin("http://www.linkedin.com"));
        assert!(!is_trusted_origin("https://www.linkedin.com.evil.example"));
        assert!(!is_trusted_origin("null"));
    }

    #[test]
    fn string_and_structured_payloads_decode() {
        let text = MessagePayload::Text(r#"{"method":"awliOAuth"}"#.to_string());
        assert_eq!(decode_message(MESSAGE_ORIGIN, &text), Ok(AutofillMethod::OAuth));

        let structured = MessagePayload::Structured(json!({"method": "ready", "extra": 1}));
        assert_eq!(decode_message(MESSAGE_ORIGIN, &structured), Ok(AutofillMethod::Ready));
    }

    #[test]
    fn bad_payloads_are_errors() {
        let garbage = MessagePayload::Text("{oops".to_string());
        assert!(matches!(
            decode_message(MESSAGE_ORIGIN, &garbage),
            Err(MessageError::Malformed(_))
        ));

        let no_method = MessagePayload::Structured(json!({"kind": "ready"}));
        assert_eq!(
            decode_message(MESSAGE_ORIGIN, &no_method),
            Err(MessageError::MissingMethod)
        );

        let foreign = MessagePayload::Structured(json!({"method": "ready"}));
        assert_eq!(
            decode_message("https://example.com", &foreign),
            Err(MessageError::UntrustedOrigin("https://example.com".to_string()))
        );
    }
}
