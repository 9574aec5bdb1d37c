//! Circuit breaker for upstream protection.
//!
//! # States
//! - Closed: normal operation, requests pass through
//! - Open: upstream assumed down, requests fail fast
//! - Half-Open: testing if upstream recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive failures >= failure_threshold
//! Open → Half-Open: gate check after the reset timeout has elapsed
//! Half-Open → Closed: probe request succeeds
//! Half-Open → Open: probe request fails
//! ```
//!
//! # Design Decisions
//! - One breaker per client instance, shared by all of its clones
//! - Fail fast in Open state (no waiting for timeout)
//! - Single probe in Half-Open (prevents hammering recovering upstream)
//! - The probe is identified by a generation number carried in its `Permit`;
//!   only the outcome or abandonment of that permit releases the probe slot
//! - All mutation happens under one mutex so concurrent outcomes are never lost

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::CircuitBreakerConfig;
use crate::observability::metrics;
use crate::resilience::backoff::duration_millis;

/// State of a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half_open"),
        }
    }
}

/// A state change caused by a gate check or an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: CircuitState,
    pub to: CircuitState,
}

/// Admission granted by a gate check.
///
/// The permit must be handed back with the request's outcome so the breaker
/// can tell its own Half-Open probe apart from stragglers admitted earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permit {
    /// Admitted while Closed, or with the breaker disabled.
    Normal,
    /// The single Half-Open probe, tagged with its generation.
    Probe(u64),
}

impl Permit {
    pub fn is_probe(&self) -> bool {
        matches!(self, Permit::Probe(_))
    }
}

/// Point-in-time view of a breaker, for status reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitSnapshot {
    pub enabled: bool,
    pub state: CircuitState,
    pub failure_count: u32,
    pub failure_threshold: u32,
    pub reset_timeout_ms: u64,
    /// Milliseconds since the last recorded failure, if any.
    pub last_failure_ms_ago: Option<u64>,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    last_failure: Option<Instant>,
    /// Generation of the Half-Open probe admitted and not yet settled.
    probe: Option<u64>,
    /// Generation handed to the next probe.
    next_probe: u64,
}

impl BreakerState {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            last_failure: None,
            probe: None,
            next_probe: 0,
        }
    }

    /// Back to Closed with a clean history. Probe generations keep counting.
    fn close(&mut self) {
        self.state = CircuitState::Closed;
        self.failure_count = 0;
        self.last_failure = None;
        self.probe = None;
    }

    fn start_probe(&mut self) -> Permit {
        let generation = self.next_probe;
        self.next_probe = self.next_probe.wrapping_add(1);
        self.probe = Some(generation);
        Permit::Probe(generation)
    }

    /// Release the probe slot if `permit` owns it.
    fn settle(&mut self, permit: Permit) -> bool {
        match permit {
            Permit::Probe(generation) if self.probe == Some(generation) => {
                self.probe = None;
                true
            }
            _ => false,
        }
    }
}

/// Consecutive-failure circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Service this breaker protects, used in logs and metrics.
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerState::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        // Every critical section leaves the state consistent, so a poisoned
        // lock still holds a usable value.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Gate check: may a request reach the transport now?
    ///
    /// Returns `None` when the request must be rejected.
    pub fn can_proceed(&self) -> Option<Permit> {
        self.can_proceed_at(Instant::now())
    }

    pub(crate) fn can_proceed_at(&self, now: Instant) -> Option<Permit> {
        if !self.config.enabled {
            return Some(Permit::Normal);
        }

        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => Some(Permit::Normal),
            CircuitState::Open => {
                let elapsed = inner
                    .last_failure
                    .map(|at| now.saturating_duration_since(at))
                    .unwrap_or(Duration::MAX);

                if elapsed > self.config.reset_timeout() {
                    inner.state = CircuitState::HalfOpen;
                    let permit = inner.start_probe();
                    drop(inner);

                    tracing::info!(
                        service = %self.name,
                        open_for_ms = duration_millis(elapsed),
                        "Circuit breaker half-open, allowing probe request"
                    );
                    metrics::record_circuit_state(&self.name, CircuitState::HalfOpen);
                    Some(permit)
                } else {
                    None
                }
            }
            CircuitState::HalfOpen => {
                if inner.probe.is_some() {
                    None
                } else {
                    Some(inner.start_probe())
                }
            }
        }
    }

    /// Record a successful outcome for a request admitted with `permit`.
    pub fn record_success(&self, permit: Permit) -> Option<Transition> {
        if !self.config.enabled {
            return None;
        }

        let mut inner = self.lock();
        inner.settle(permit);

        if inner.state == CircuitState::Closed && inner.failure_count == 0 {
            return None;
        }

        let from = inner.state;
        let failures = inner.failure_count;
        inner.close();
        drop(inner);

        if from == CircuitState::Closed {
            tracing::debug!(
                service = %self.name,
                previous_failures = failures,
                "Circuit breaker failure count reset"
            );
            return None;
        }

        tracing::info!(
            service = %self.name,
            from = %from,
            "Circuit breaker closed after successful request"
        );
        metrics::record_circuit_state(&self.name, CircuitState::Closed);
        Some(Transition {
            from,
            to: CircuitState::Closed,
        })
    }

    /// Record a failed outcome for a request admitted with `permit`.
    pub fn record_failure(&self, permit: Permit) -> Option<Transition> {
        self.record_failure_at(permit, Instant::now())
    }

    pub(crate) fn record_failure_at(&self, permit: Permit, now: Instant) -> Option<Transition> {
        if !self.config.enabled {
            return None;
        }

        let mut inner = self.lock();
        let owns_probe = inner.settle(permit);
        inner.failure_count = inner.failure_count.saturating_add(1);
        inner.last_failure = Some(now);

        let from = inner.state;
        let opens = match from {
            CircuitState::Closed => inner.failure_count >= self.config.failure_threshold,
            // Stragglers admitted before the breaker opened leave the probe in charge.
            CircuitState::HalfOpen => owns_probe,
            CircuitState::Open => false,
        };
        if !opens {
            return None;
        }

        inner.state = CircuitState::Open;
        let failures = inner.failure_count;
        drop(inner);

        tracing::warn!(
            service = %self.name,
            from = %from,
            failures = failures,
            threshold = self.config.failure_threshold,
            "Circuit breaker opened"
        );
        metrics::record_circuit_state(&self.name, CircuitState::Open);
        Some(Transition {
            from,
            to: CircuitState::Open,
        })
    }

    /// Release a probe whose request ended without an outcome.
    ///
    /// The breaker stays Half-Open and the next gate check becomes the probe.
    /// Permits that do not own the probe slot are ignored.
    pub fn abandon(&self, permit: Permit) {
        if !self.config.enabled {
            return;
        }

        let released = self.lock().settle(permit);
        if released {
            tracing::debug!(
                service = %self.name,
                "Circuit breaker probe abandoned, next request will probe"
            );
        }
    }

    /// Force the breaker back to Closed with a clean history.
    pub fn reset(&self) {
        let mut inner = self.lock();
        let from = inner.state;
        inner.close();
        drop(inner);

        tracing::info!(service = %self.name, from = %from, "Circuit breaker reset");
        metrics::record_circuit_state(&self.name, CircuitState::Closed);
    }

    /// Current state without triggering any transition.
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        self.snapshot_at(Instant::now())
    }

    pub(crate) fn snapshot_at(&self, now: Instant) -> CircuitSnapshot {
        let inner = self.lock();
        CircuitSnapshot {
            enabled: self.config.enabled,
            state: inner.state,
            failure_count: inner.failure_count,
            failure_threshold: self.config.failure_threshold,
            reset_timeout_ms: self.config.reset_timeout_ms,
            last_failure_ms_ago: inner
                .last_failure
                .map(|at| duration_millis(now.saturating_duration_since(at))),
        }
    }
}

/// Holds a permit for the lifetime of one admitted request.
///
/// Dropping the guard before an outcome is recorded (for example when the
/// caller's future is cancelled) abandons the permit.
pub struct PermitGuard<'a> {
    breaker: &'a CircuitBreaker,
    permit: Permit,
    settled: bool,
}

impl<'a> PermitGuard<'a> {
    pub fn new(breaker: &'a CircuitBreaker, permit: Permit) -> Self {
        Self {
            breaker,
            permit,
            settled: false,
        }
    }

    pub fn permit(&self) -> Permit {
        self.permit
    }

    pub fn record_success(&mut self) -> Option<Transition> {
        self.settled = true;
        self.breaker.record_success(self.permit)
    }

    pub fn record_failure(&mut self) -> Option<Transition> {
        self.settled = true;
        self.breaker.record_failure(self.permit)
    }
}

impl Drop for PermitGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.abandon(self.permit);
        }
    }
}
