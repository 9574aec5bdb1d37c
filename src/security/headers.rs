//! Header redaction for logs.
//!
//! # Responsibilities
//! - Produce a log-safe copy of request headers
//! - Mask credential-bearing headers
//!
//! # Design Decisions
//! - Case-insensitive exact match on the header name
//! - The outbound header map is never touched

use std::collections::{BTreeMap, HashMap};

use super::REDACTED;

/// Header names whose values never reach a log record.
pub const SENSITIVE_HEADERS: [&str; 4] = ["authorization", "x-api-key", "cookie", "password"];

pub fn is_sensitive_header(name: &str) -> bool {
    SENSITIVE_HEADERS
        .iter()
        .any(|sensitive| sensitive.eq_ignore_ascii_case(name))
}

/// Copy `headers`, replacing sensitive values with the redaction marker.
///
/// Returns a sorted map so log output is stable.
pub fn sanitize_headers(headers: &HashMap<String, String>) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if is_sensitive_header(name) {
                REDACTED.to_string()
            } else {
                value.clone()
            };
            (name.clone(), value)
        })
        .collect()
}
