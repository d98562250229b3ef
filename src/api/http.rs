//! HTTP plumbing: retry policy, response classification and body decoding.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// Upper bound applied to response bodies before they reach a log line.
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Retry schedule for transient upstream statuses.
///
/// Only statuses listed in `retry_on` are retried. Transport errors and
/// every other status are returned to the caller immediately.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, first try included.
    pub attempts: u32,
    /// Pause observed after every transient reply.
    pub pause: Duration,
    /// Statuses considered transient.
    pub retry_on: Vec<StatusCode>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            attempts: 3,
            pause: Duration::from_secs(1),
            retry_on: vec![StatusCode::GATEWAY_TIMEOUT],
        }
    }
}

/// Sends `request`, re-sending it while the response status is listed as
/// transient.
pub(crate) async fn send_with_retry(http: &Client, policy: &RetryPolicy, request: Request) -> Result<Response> {
    let url = request.url().to_string();
    let mut pending = Some(request);
    for attempt in 1..=policy.attempts {
        let Some(current) = pending.take() else { break };
        if attempt < policy.attempts {
            pending = current.try_clone();
        }
        let response = http.execute(current).await?;
        if !policy.retry_on.contains(&response.status()) {
            return Ok(response);
        }
        tracing::warn!(
            "transient status {} from {} (attempt {}/{})",
            response.status(),
            url,
            attempt,
            policy.attempts
        );
        tokio::time::sleep(policy.pause).await;
    }
    Err(Error::RetriesExhausted { url })
}

/// Builds the typed error for a non-2xx reply, pulling the server's
/// `Message` and per-field `errors` map out of the body when present.
pub(crate) fn api_error(status: StatusCode, body: &str) -> Error {
    let mut message = String::new();
    let mut details = BTreeMap::new();
    if let Ok(Value::Object(reply)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(text)) = reply.get("Message") {
            message = text.clone();
        }
        if let Some(Value::Object(errors)) = reply.get("errors") {
            for (field, detail) in errors {
                let text = match detail {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                details.insert(field.clone(), text);
            }
        }
    }
    if message.is_empty() {
        message = sanitize_for_log(body);
    }
    Error::Api { status, message, details }
}

/// Decodes a JSON body, logging a sanitized preview on failure.
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|source| {
        tracing::error!("undecodable API response: {} - {}", source, sanitize_for_log(body));
        Error::Decode(source)
    })
}

/// Truncates and strips a body down to printable ASCII for log lines.
pub(crate) fn sanitize_for_log(body: &str) -> String {
    body.chars()
        .take(MAX_LOG_BODY_LENGTH)
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retry_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.pause, Duration::from_secs(1));
        assert_eq!(policy.retry_on, vec![StatusCode::GATEWAY_TIMEOUT]);
    }

    #[test]
    fn test_api_error_extracts_message_and_details() {
        let body = r#"{
            "Message": "One or several required parameters are missing or incorrect",
            "Type": "param_error",
            "errors": {"Email": "The Email field is required."}
        }"#;
        match api_error(StatusCode::BAD_REQUEST, body) {
            Error::Api { status, message, details } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "One or several required parameters are missing or incorrect");
                assert_eq!(details.get("Email").map(String::as_str), Some("The Email field is required."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_falls_back_to_raw_body() {
        match api_error(StatusCode::BAD_GATEWAY, "upstream exploded") {
            Error::Api { message, details, .. } => {
                assert_eq!(message, "upstream exploded");
                assert!(details.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_stringifies_non_string_details() {
        let body = r#"{"Message": "nope", "errors": {"Amount": 42}}"#;
        match api_error(StatusCode::BAD_REQUEST, body) {
            Error::Api { details, .. } => {
                assert_eq!(details.get("Amount").map(String::as_str), Some("42"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_sanitize_for_log_truncates_and_filters() {
        let long = "a".repeat(500);
        assert_eq!(sanitize_for_log(&long).len(), MAX_LOG_BODY_LENGTH);
        assert_eq!(sanitize_for_log("line\nbreak\tand café"), "linebreakand caf");
    }

    #[test]
    fn test_decode_reports_malformed_json() {
        let result: Result<Value> = decode("{not json");
        assert!(matches!(result, Err(Error::Decode(_))));
    }
}
