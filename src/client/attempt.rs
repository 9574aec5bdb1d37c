//! Per-attempt instrumentation records.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::client::types::{ClientError, CorrelationId};
use crate::observability::LogFields;
use crate::resilience::backoff::duration_millis;

/// How one attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success { status: u16 },
    HttpError { status: u16 },
    NetworkError,
}

impl AttemptOutcome {
    pub fn from_error(error: &ClientError) -> Self {
        match error.status() {
            Some(status) => AttemptOutcome::HttpError { status },
            None => AttemptOutcome::NetworkError,
        }
    }

    /// Metric/log label for the outcome.
    pub fn label(&self) -> &'static str {
        match self {
            AttemptOutcome::Success { .. } => "success",
            AttemptOutcome::HttpError { .. } => "http_error",
            AttemptOutcome::NetworkError => "network_error",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AttemptOutcome::Success { status } | AttemptOutcome::HttpError { status } => Some(*status),
            AttemptOutcome::NetworkError => None,
        }
    }
}

/// Ephemeral record of a single transport attempt. Never persisted.
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub correlation_id: CorrelationId,
    /// 0 for the initial attempt, incremented per retry.
    pub attempt: u32,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub outcome: AttemptOutcome,
}

impl AttemptRecord {
    /// Fields describing the outcome: `status` (code or "network") and `duration_ms`.
    pub fn outcome_fields(&self, fields: &mut LogFields) {
        let status = match self.outcome.status() {
            Some(code) => json!(code),
            None => json!("network"),
        };
        fields.insert("status".into(), status);
        fields.insert("outcome".into(), json!(self.outcome.label()));
        fields.insert("started_at".into(), json!(timestamp(self.started_at)));
        fields.insert("duration_ms".into(), json!(duration_millis(self.elapsed)));
    }
}

pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn now_field() -> Value {
    json!(timestamp(Utc::now()))
}
