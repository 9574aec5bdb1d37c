//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request attempt produces:
//!     → logging.rs (sanitized records through the configured LogSink)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, file, remote)
//!     → Whatever metrics exporter the embedding service installs
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Correlation ID flows through every record of a logical request
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFields, LogLevel, LogSink, TracingSink};
