//! Structured logging.
//!
//! # Responsibilities
//! - Define the log sink contract request records are written to
//! - Forward records to `tracing` by default
//! - Initialize the subscriber for services that want one
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Log level configurable via config and environment
//! - Sink failures never reach the request path

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

/// Structured key-value metadata attached to a log record.
pub type LogFields = Map<String, Value>;

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Destination for request lifecycle records.
///
/// Implementations may write to the console, a file or a remote collector.
/// Calls are fire-and-forget.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str, fields: &LogFields);
}

/// Default sink: emits every record as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, message: &str, fields: &LogFields) {
        let correlation_id = fields
            .get("correlation_id")
            .and_then(Value::as_str)
            .unwrap_or("-");
        let rendered = Value::Object(fields.clone());

        match level {
            LogLevel::Debug => {
                tracing::debug!(correlation_id = %correlation_id, fields = %rendered, "{}", message)
            }
            LogLevel::Info => {
                tracing::info!(correlation_id = %correlation_id, fields = %rendered, "{}", message)
            }
            LogLevel::Warn => {
                tracing::warn!(correlation_id = %correlation_id, fields = %rendered, "{}", message)
            }
            LogLevel::Error => {
                tracing::error!(correlation_id = %correlation_id, fields = %rendered, "{}", message)
            }
        }
    }
}

/// Write a record to `sink`, swallowing any panic raised by the sink.
pub fn emit(sink: &dyn LogSink, level: LogLevel, message: &str, fields: &LogFields) {
    let outcome = catch_unwind(AssertUnwindSafe(|| sink.log(level, message, fields)));
    if outcome.is_err() {
        tracing::warn!(record = %message, "Log sink panicked, record dropped");
    }
}

/// Install a global subscriber built from `config`.
///
/// `RUST_LOG` takes precedence over `config.level`. Returns false when a
/// subscriber was already installed by the embedding service.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    };

    result.is_ok()
}
