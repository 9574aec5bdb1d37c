//! Log record tests: shape, correlation and redaction.

use std::sync::Arc;

use resilient_client::observability::LogFields;
use resilient_client::{LogLevel, LogSink, RequestSpec, ResilientClient};
use serde_json::json;

mod common;
use common::{client_with, test_config, ScriptedTransport, Step};

#[tokio::test]
async fn test_success_emits_start_and_success_records() {
    let transport = ScriptedTransport::always(Step::Status(200, r#"{"id":7}"#));
    let (client, sink) = client_with(test_config(), transport);

    client.get("/orders/7").await.unwrap();

    let started = sink.with_message("HTTP request started");
    let succeeded = sink.with_message("HTTP request succeeded");
    assert_eq!(started.len(), 1);
    assert_eq!(succeeded.len(), 1);

    let start = &started[0];
    assert_eq!(start.level, LogLevel::Info);
    assert_eq!(start.fields["method"], "GET");
    assert_eq!(start.fields["url"], "http://api.test/v1/orders/7");
    assert_eq!(start.fields["attempt"], 0);
    assert_eq!(start.fields["service"], "test-service");
    assert_eq!(start.fields["timeout_ms"], 1_000);
    assert!(start.fields["timestamp"].is_string());

    let done = &succeeded[0];
    assert_eq!(done.level, LogLevel::Info);
    assert_eq!(done.fields["status"], 200);
    assert_eq!(done.fields["outcome"], "success");
    assert!(done.fields["duration_ms"].is_u64());
    assert_eq!(done.fields["response_body"], json!({"id": 7}));
    assert_eq!(done.fields["correlation_id"], start.fields["correlation_id"]);
}

#[tokio::test]
async fn test_failed_attempts_logged_with_shared_correlation_id() {
    let transport = ScriptedTransport::new(
        vec![Step::Status(503, ""), Step::Network],
        Step::Status(200, ""),
    );
    let (client, sink) = client_with(test_config(), transport);

    client.get("/orders").await.unwrap();

    let failed = sink.with_message("HTTP request failed");
    assert_eq!(failed.len(), 2);
    assert!(failed.iter().all(|r| r.level == LogLevel::Error));
    assert_eq!(failed[0].fields["status"], 503);
    assert_eq!(failed[0].fields["outcome"], "http_error");
    assert_eq!(failed[1].fields["status"], "network");
    assert_eq!(failed[1].fields["outcome"], "network_error");
    assert!(failed[1].fields["error"]
        .as_str()
        .unwrap()
        .contains("connection refused"));

    let retries = sink.with_message("Retrying HTTP request");
    assert_eq!(retries.len(), 2);
    assert_eq!(retries[0].level, LogLevel::Warn);
    assert_eq!(retries[0].fields["next_attempt"], 1);
    assert_eq!(retries[1].fields["next_attempt"], 2);
    assert_eq!(retries[1].fields["delay_ms"], 10);

    let started = sink.with_message("HTTP request started");
    let attempts: Vec<_> = started.iter().map(|r| r.fields["attempt"].clone()).collect();
    assert_eq!(attempts, vec![json!(0), json!(1), json!(2)]);

    let id = &started[0].fields["correlation_id"];
    assert!(sink
        .records()
        .iter()
        .filter(|r| r.fields.contains_key("correlation_id"))
        .all(|r| &r.fields["correlation_id"] == id));
}

#[tokio::test]
async fn test_separate_requests_get_distinct_correlation_ids() {
    let transport = ScriptedTransport::always(Step::Status(204, ""));
    let (client, sink) = client_with(test_config(), transport);

    client.get("/a").await.unwrap();
    client.get("/b").await.unwrap();

    let started = sink.with_message("HTTP request started");
    assert_eq!(started.len(), 2);
    assert_ne!(
        started[0].fields["correlation_id"],
        started[1].fields["correlation_id"]
    );
}

#[tokio::test]
async fn test_sensitive_request_data_redacted_in_logs_only() {
    let transport = ScriptedTransport::always(Step::Status(201, ""));
    let (client, sink) = client_with(test_config(), transport.clone());

    let body = json!({
        "username": "bob",
        "password": "hunter2",
        "nested": {"client_secret": "s3cr3t", "amount": 12},
        "tokens": [{"access_token": "at"}, {"refresh_token": "rt"}]
    });
    let spec = RequestSpec::post("/login", body.clone())
        .header("Authorization", "Bearer abc")
        .header("X-Api-Key", "k-123")
        .header("Accept", "application/json");

    client.execute(spec.clone()).await.unwrap();

    let start = &sink.with_message("HTTP request started")[0];
    let headers = &start.fields["headers"];
    assert_eq!(headers["Authorization"], "[REDACTED]");
    assert_eq!(headers["X-Api-Key"], "[REDACTED]");
    assert_eq!(headers["Accept"], "application/json");

    let logged = &start.fields["body"];
    assert_eq!(logged["username"], "bob");
    assert_eq!(logged["password"], "[REDACTED]");
    assert_eq!(logged["nested"]["client_secret"], "[REDACTED]");
    assert_eq!(logged["nested"]["amount"], 12);
    assert_eq!(logged["tokens"][0]["access_token"], "[REDACTED]");
    assert_eq!(logged["tokens"][1]["refresh_token"], "[REDACTED]");

    // The caller's RequestSpec and the outbound request keep the real values.
    assert_eq!(spec.headers["Authorization"], "Bearer abc");
    assert_eq!(spec.body, Some(body.clone()));
    let sent = &transport.requests()[0];
    assert_eq!(sent.headers["Authorization"], "Bearer abc");
    assert_eq!(sent.body, Some(body));

    let rendered = format!("{:?}", sink.records());
    assert!(!rendered.contains("hunter2"));
    assert!(!rendered.contains("Bearer abc"));
    assert!(!rendered.contains("s3cr3t"));
}

#[tokio::test]
async fn test_error_response_body_redacted() {
    let transport = ScriptedTransport::always(Step::Status(
        400,
        r#"{"error":"invalid_grant","refresh_token":"leaked"}"#,
    ));
    let (client, sink) = client_with(test_config(), transport);

    let err = client.get("/token").await.unwrap_err();
    assert_eq!(err.status(), Some(400));

    let failed = &sink.with_message("HTTP request failed")[0];
    assert_eq!(failed.fields["response_body"]["error"], "invalid_grant");
    assert_eq!(failed.fields["response_body"]["refresh_token"], "[REDACTED]");
    assert!(!failed.fields["error"].as_str().unwrap().contains("leaked"));
}

#[tokio::test]
async fn test_non_json_response_body_not_logged() {
    let transport = ScriptedTransport::always(Step::Status(200, "<html>ok</html>"));
    let (client, sink) = client_with(test_config(), transport);

    let response = client.get("/page").await.unwrap();
    assert_eq!(response.text(), "<html>ok</html>");

    let done = &sink.with_message("HTTP request succeeded")[0];
    assert!(!done.fields.contains_key("response_body"));
}

#[tokio::test]
async fn test_circuit_transitions_logged() {
    let mut config = test_config();
    config.max_retries = 0;
    config.circuit_breaker.failure_threshold = 1;
    let transport = ScriptedTransport::always(Step::Network);
    let (client, sink) = client_with(config, transport);

    let _ = client.get("/x").await;
    let opened = sink.with_message("Circuit breaker opened");
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].level, LogLevel::Warn);
    assert_eq!(opened[0].fields["circuit_state"], "open");
    assert_eq!(opened[0].fields["from"], "closed");

    let _ = client.get("/x").await;
    let rejected = sink.with_message("Circuit breaker open, request rejected");
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].level, LogLevel::Debug);
    assert!(sink.with_message("HTTP request started").len() == 1);
}

struct PanickingSink;

impl LogSink for PanickingSink {
    fn log(&self, _level: LogLevel, _message: &str, _fields: &LogFields) {
        panic!("sink exploded");
    }
}

#[tokio::test]
async fn test_panicking_sink_does_not_break_requests() {
    let transport = ScriptedTransport::new(vec![Step::Status(500, "")], Step::Status(200, "ok"));
    let client = ResilientClient::with_transport(test_config(), transport.clone())
        .unwrap()
        .with_sink(Arc::new(PanickingSink));

    let response = client.get("/x").await.unwrap();
    assert_eq!(response.text(), "ok");
    assert_eq!(transport.calls(), 2);
}
