//! Request orchestration.
//!
//! # Responsibilities
//! - Gate every logical request through the circuit breaker
//! - Bracket each transport attempt with start/outcome log records
//! - Apply the retry policy and backoff between attempts
//! - Report every outcome to the breaker and to metrics
//!
//! # Design Decisions
//! - Logging is explicit in the attempt loop, not hidden in the transport
//! - One correlation ID per logical request, shared by all its retries
//! - The caller's `RequestSpec` is never modified; log records only ever see
//!   sanitized copies
//! - The gate is checked once per logical request; retries of an admitted
//!   request are not re-gated
//! - A Half-Open probe is never retried, and its permit is abandoned if the
//!   request is dropped mid-flight

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use reqwest::header::{HeaderName, HeaderValue};
use serde_json::{json, Value};
use url::Url;

use crate::client::attempt::{now_field, AttemptOutcome, AttemptRecord};
use crate::client::types::{ClientError, ClientResult, CorrelationId, RequestSpec, Response};
use crate::config::{validate_config, ClientConfig, ConfigError};
use crate::observability::logging::emit;
use crate::observability::{metrics, LogFields, LogLevel, LogSink, TracingSink};
use crate::resilience::backoff::duration_millis;
use crate::resilience::timeouts::with_timeout;
use crate::resilience::{
    is_retryable, CircuitBreaker, CircuitSnapshot, CircuitState, PermitGuard, RetryPolicy,
    Transition,
};
use crate::security::{sanitize_body, sanitize_headers, sanitize_raw_body};
use crate::transport::{HttpTransport, Transport, TransportRequest};

/// Outbound HTTP client with retries, circuit breaking and redacted logging.
///
/// Cloning is cheap; clones share the same circuit breaker, transport and sink.
#[derive(Clone)]
pub struct ResilientClient {
    config: Arc<ClientConfig>,
    breaker: Arc<CircuitBreaker>,
    retry_policy: RetryPolicy,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn LogSink>,
}

impl ResilientClient {
    /// Create a client using the default `reqwest` transport.
    ///
    /// # Errors
    /// Returns [`ConfigError::Validation`] listing every invalid field.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    /// Create a client around a caller-supplied transport.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let breaker = Arc::new(CircuitBreaker::new(
            config.service_name.clone(),
            config.circuit_breaker.clone(),
        ));
        let retry_policy = RetryPolicy::from_config(&config);

        tracing::info!(
            service = %config.service_name,
            base_url = %config.base_url,
            timeout_ms = config.timeout_ms,
            max_retries = config.max_retries,
            circuit_breaker = config.circuit_breaker.enabled,
            "Resilient client initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            breaker,
            retry_policy,
            transport,
            sink: Arc::new(TracingSink),
        })
    }

    /// Replace the log sink request records are written to.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Snapshot of the circuit breaker for dashboards.
    pub fn status(&self) -> CircuitSnapshot {
        self.breaker.snapshot()
    }

    /// Force the circuit breaker back to Closed.
    pub fn reset(&self) {
        self.breaker.reset();
        let mut fields = self.service_fields();
        fields.insert("circuit_state".into(), json!(CircuitState::Closed));
        self.log(LogLevel::Info, "Circuit breaker reset", &fields);
    }

    pub async fn get(&self, path: &str) -> ClientResult<Response> {
        self.execute(RequestSpec::get(path)).await
    }

    pub async fn post(&self, path: &str, body: Value) -> ClientResult<Response> {
        self.execute(RequestSpec::post(path, body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> ClientResult<Response> {
        self.execute(RequestSpec::put(path, body)).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<Response> {
        self.execute(RequestSpec::delete(path)).await
    }

    /// Execute one logical request.
    ///
    /// # Errors
    /// - [`ClientError::CircuitOpen`] when the breaker denies the call
    /// - [`ClientError::ExhaustedRetries`] when a retryable failure outlasts
    ///   the retry budget
    /// - the terminal [`ClientError::Http`] or [`ClientError::Network`] error otherwise
    pub async fn execute(&self, spec: RequestSpec) -> ClientResult<Response> {
        let correlation_id = CorrelationId::new();
        let request = self.prepare(&spec, &correlation_id)?;

        let Some(permit) = self.breaker.can_proceed() else {
            metrics::record_circuit_rejection(&self.config.service_name);
            let mut fields = self.request_fields(&correlation_id, &request, 0);
            fields.insert("circuit_state".into(), json!(self.breaker.state()));
            self.log(LogLevel::Debug, "Circuit breaker open, request rejected", &fields);
            return Err(ClientError::CircuitOpen { path: spec.path });
        };
        // Released on drop if this future is cancelled before an outcome lands.
        let mut guard = PermitGuard::new(&self.breaker, permit);

        let sanitized_headers = sanitize_headers(&request.headers);
        let sanitized_body = request.body.as_ref().map(sanitize_body);

        let mut attempt: u32 = 0;
        loop {
            let mut fields = self.request_fields(&correlation_id, &request, attempt);
            fields.insert("headers".into(), json!(sanitized_headers));
            if let Some(body) = &sanitized_body {
                fields.insert("body".into(), body.clone());
            }
            fields.insert("timeout_ms".into(), json!(duration_millis(request.timeout)));
            if permit.is_probe() {
                fields.insert("probe".into(), json!(true));
            }
            self.log(LogLevel::Info, "HTTP request started", &fields);

            let started_at = Utc::now();
            let start = Instant::now();
            let result = self.send_once(&request).await;
            let elapsed = start.elapsed();

            match result {
                Ok(response) => {
                    let record = AttemptRecord {
                        correlation_id,
                        attempt,
                        started_at,
                        elapsed,
                        outcome: AttemptOutcome::Success {
                            status: response.status,
                        },
                    };
                    let mut fields = self.request_fields(&correlation_id, &request, attempt);
                    record.outcome_fields(&mut fields);
                    if let Some(body) = sanitize_raw_body(&response.body) {
                        fields.insert("response_body".into(), body);
                    }
                    self.log(LogLevel::Info, "HTTP request succeeded", &fields);

                    metrics::record_attempt(
                        &self.config.service_name,
                        record.outcome.label(),
                        record.outcome.status(),
                        elapsed,
                    );
                    let transition = guard.record_success();
                    self.report_transition(transition, &correlation_id);
                    return Ok(response);
                }
                Err(error) => {
                    let record = AttemptRecord {
                        correlation_id,
                        attempt,
                        started_at,
                        elapsed,
                        outcome: AttemptOutcome::from_error(&error),
                    };
                    let mut fields = self.request_fields(&correlation_id, &request, attempt);
                    record.outcome_fields(&mut fields);
                    fields.insert("error".into(), json!(error.to_string()));
                    if let ClientError::Http { body: Some(body), .. } = &error {
                        if let Some(body) = sanitize_raw_body(body.as_bytes()) {
                            fields.insert("response_body".into(), body);
                        }
                    }
                    self.log(LogLevel::Error, "HTTP request failed", &fields);

                    metrics::record_attempt(
                        &self.config.service_name,
                        record.outcome.label(),
                        record.outcome.status(),
                        elapsed,
                    );
                    let transition = guard.record_failure();
                    self.report_transition(transition, &correlation_id);

                    // A Half-Open probe gets exactly one attempt.
                    if !permit.is_probe() && self.retry_policy.should_retry(&error, attempt) {
                        let delay = self.retry_policy.compute_backoff(attempt);
                        let mut fields = self.request_fields(&correlation_id, &request, attempt);
                        fields.insert("next_attempt".into(), json!(attempt + 1));
                        fields.insert("delay_ms".into(), json!(duration_millis(delay)));
                        self.log(LogLevel::Warn, "Retrying HTTP request", &fields);
                        metrics::record_retry(&self.config.service_name);

                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    if is_retryable(&error) {
                        return Err(ClientError::ExhaustedRetries {
                            attempts: attempt + 1,
                            source: Box::new(error),
                        });
                    }
                    return Err(error);
                }
            }
        }
    }

    /// Resolve a request path against the base URL.
    ///
    /// Absolute http(s) URLs are used as given.
    pub fn resolve_url(&self, path: &str) -> ClientResult<Url> {
        if let Ok(url) = Url::parse(path) {
            if url.scheme() == "http" || url.scheme() == "https" {
                return Ok(url);
            }
        }

        let base = self.config.base_url.trim_end_matches('/');
        let joined = if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path.trim_start_matches('/'))
        };

        Url::parse(&joined)
            .map_err(|e| ClientError::InvalidRequest(format!("cannot build URL for '{}': {}", path, e)))
    }

    /// Build the outbound copy of a request.
    fn prepare(
        &self,
        spec: &RequestSpec,
        correlation_id: &CorrelationId,
    ) -> ClientResult<TransportRequest> {
        let url = self.resolve_url(&spec.path)?;

        for (name, value) in &spec.headers {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ClientError::InvalidRequest(format!("invalid header name '{}'", name)))?;
            HeaderValue::from_str(value)
                .map_err(|_| ClientError::InvalidRequest(format!("invalid value for header '{}'", name)))?;
        }

        let mut headers: HashMap<String, String> = spec.headers.clone();
        if let Some(header) = &self.config.correlation_header {
            if !headers.keys().any(|name| name.eq_ignore_ascii_case(header)) {
                headers.insert(header.clone(), correlation_id.to_string());
            }
        }

        Ok(TransportRequest {
            method: spec.method.clone(),
            url,
            headers,
            body: spec.body.clone(),
            timeout: spec.timeout.unwrap_or_else(|| self.config.timeout()),
        })
    }

    async fn send_once(&self, request: &TransportRequest) -> ClientResult<Response> {
        let response = with_timeout(request.timeout, self.transport.send(request.clone())).await?;

        if response.is_success() {
            Ok(response)
        } else {
            let body = (!response.body.is_empty()).then(|| response.text());
            Err(ClientError::Http {
                status: response.status,
                url: request.url.to_string(),
                body,
            })
        }
    }

    fn report_transition(&self, transition: Option<Transition>, correlation_id: &CorrelationId) {
        let Some(transition) = transition else {
            return;
        };

        let snapshot = self.breaker.snapshot();
        let mut fields = self.service_fields();
        fields.insert("correlation_id".into(), json!(correlation_id));
        fields.insert("from".into(), json!(transition.from));
        fields.insert("circuit_state".into(), json!(transition.to));
        fields.insert("failure_count".into(), json!(snapshot.failure_count));

        match transition.to {
            CircuitState::Open => self.log(LogLevel::Warn, "Circuit breaker opened", &fields),
            CircuitState::Closed => self.log(LogLevel::Info, "Circuit breaker closed", &fields),
            CircuitState::HalfOpen => self.log(LogLevel::Info, "Circuit breaker half-open", &fields),
        }
    }

    fn service_fields(&self) -> LogFields {
        let mut fields = LogFields::new();
        fields.insert("timestamp".into(), now_field());
        fields.insert("service".into(), json!(self.config.service_name));
        fields
    }

    fn request_fields(
        &self,
        correlation_id: &CorrelationId,
        request: &TransportRequest,
        attempt: u32,
    ) -> LogFields {
        let mut fields = self.service_fields();
        fields.insert("correlation_id".into(), json!(correlation_id));
        fields.insert("attempt".into(), json!(attempt));
        fields.insert("method".into(), json!(request.method.as_str()));
        fields.insert("url".into(), json!(request.url.as_str()));
        fields
    }

    fn log(&self, level: LogLevel, message: &str, fields: &LogFields) {
        emit(self.sink.as_ref(), level, message, fields);
    }
}

impl std::fmt::Debug for ResilientClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientClient")
            .field("service", &self.config.service_name)
            .field("base_url", &self.config.base_url)
            .field("retry_policy", &self.retry_policy)
            .field("circuit", &self.breaker.state())
            .finish()
    }
}
