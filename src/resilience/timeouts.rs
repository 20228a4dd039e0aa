//! Deadline enforcement for upstream calls.
//!
//! # Responsibilities
//! - Bound every outbound exchange by a per-call deadline
//! - Cancel the exchange cleanly when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; expiry drops the inner future, which
//!   tears down the in-flight connection
//! - Deadline expiry is a distinct error, not a generic forwarding failure

use std::future::Future;
use std::time::Duration;

use crate::relay::RelayError;

/// Run `fut` to completion or fail with [`RelayError::Timeout`] after `deadline`.
pub async fn with_deadline<F, T>(deadline: Duration, fut: F) -> Result<T, RelayError>
where
    F: Future<Output = Result<T, RelayError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(RelayError::Timeout(deadline)),
    }
}
