//! Resilient outbound HTTP client library.
//!
//! # Architecture Overview
//!
//! ```text
//!   Business logic
//!        │ execute(RequestSpec)
//!        ▼
//!   ┌──────────────────────────────────────────────────────────┐
//!   │                    RESILIENT CLIENT                       │
//!   │                                                           │
//!   │  ┌──────────────┐   ┌───────────┐   ┌─────────────────┐   │
//!   │  │   circuit    │──▶│  attempt  │──▶│    transport    │───┼──▶ Upstream API
//!   │  │   breaker    │   │   loop    │◀──│ (reqwest / mock)│◀──┼───
//!   │  └──────────────┘   └─────┬─────┘   └─────────────────┘   │
//!   │         ▲                 │ retry? backoff                 │
//!   │         └── outcome ──────┤                                │
//!   │                           ▼                                │
//!   │                ┌─────────────────────┐                     │
//!   │                │ sanitize → log sink │                     │
//!   │                │       + metrics     │                     │
//!   │                └─────────────────────┘                     │
//!   └──────────────────────────────────────────────────────────┘
//! ```

// Core
pub mod client;
pub mod config;
pub mod transport;

// Cross-cutting concerns
pub mod observability;
pub mod resilience;
pub mod security;

pub use client::{
    ClientError, ClientResult, HealthReport, HealthStatus, NetworkError, RequestSpec,
    ResilientClient, Response,
};
pub use config::ClientConfig;
pub use observability::{LogLevel, LogSink};
pub use resilience::{CircuitSnapshot, CircuitState};
pub use transport::{Transport, TransportRequest};
