//! Security subsystem: keeping secrets out of logs.
//!
//! # Data Flow
//! ```text
//! RequestSpec / Response
//!     → headers.rs (mask credential headers)
//!     → body.rs (mask credential fields in JSON payloads)
//!     → sanitized copies go to the log sink only
//! ```
//!
//! # Design Decisions
//! - Pure functions over borrowed input; callers' data is never mutated
//! - The request sent to the transport is never the sanitized copy
//! - Sanitization cannot fail a request; unparseable bodies are omitted

pub mod body;
pub mod headers;

/// Marker written in place of a sensitive value.
pub const REDACTED: &str = "[REDACTED]";

pub use body::{sanitize_body, sanitize_raw_body};
pub use headers::sanitize_headers;
