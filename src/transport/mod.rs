//! Transport abstraction.
//!
//! # Responsibilities
//! - Define the one operation the client needs from the network
//! - Ship a default implementation on top of `reqwest`
//!
//! # Design Decisions
//! - A transport only performs the call; it never retries or logs
//! - Any HTTP status is a successful transport outcome; the client decides
//!   which statuses are failures
//! - Failures without a response are reported as `NetworkError`

pub mod http;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use url::Url;

use crate::client::types::{NetworkError, Response};

pub use self::http::HttpTransport;

/// Fully resolved request handed to a transport for one attempt.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HashMap<String, String>,
    pub body: Option<serde_json::Value>,
    pub timeout: Duration,
}

/// Performs the network call for a single attempt.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<Response, NetworkError>;
}
