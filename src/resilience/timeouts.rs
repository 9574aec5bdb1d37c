//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound every transport attempt with its timeout budget
//! - Turn an elapsed deadline into a network failure
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timed-out attempts are network errors and follow the retry policy
//! - Each retry gets a fresh budget; no deadline carries across attempts

use std::future::Future;
use std::time::Duration;

use crate::client::types::NetworkError;

/// Run `fut`, failing with [`NetworkError::Timeout`] once `limit` elapses.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, NetworkError>
where
    F: Future<Output = Result<T, NetworkError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(NetworkError::Timeout(limit)),
    }
}
