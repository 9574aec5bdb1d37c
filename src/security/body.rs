//! Payload redaction for logs.

use serde_json::Value;

use super::REDACTED;

/// Body keys whose values never reach a log record.
pub const SENSITIVE_FIELDS: [&str; 4] = ["password", "client_secret", "access_token", "refresh_token"];

pub fn is_sensitive_field(key: &str) -> bool {
    SENSITIVE_FIELDS
        .iter()
        .any(|sensitive| sensitive.eq_ignore_ascii_case(key))
}

/// Build a redacted copy of `value`.
///
/// Walks objects and arrays; a matched key has its whole value replaced, so
/// nothing beneath it is inspected.
pub fn sanitize_body(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, inner)| {
                    let inner = if is_sensitive_field(key) {
                        Value::String(REDACTED.to_string())
                    } else {
                        sanitize_body(inner)
                    };
                    (key.clone(), inner)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_body).collect()),
        scalar => scalar.clone(),
    }
}

/// Sanitize a raw response body for logging.
///
/// Returns `None` when the bytes are not JSON; such bodies are left out of
/// the record rather than logged unredacted.
pub fn sanitize_raw_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    serde_json::from_slice::<Value>(bytes)
        .ok()
        .map(|value| sanitize_body(&value))
}
