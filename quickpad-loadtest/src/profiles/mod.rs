//! Behavior of the simulated users.
//!
//! Each profile becomes one scenario of the load engine: a session-start transaction plus a
//! set of weighted tasks, paced by a random pause between tasks.

use goose::metrics::GooseRequestMetric;
use goose::prelude::*;

use crate::outcome::Outcome;

pub mod basic;
pub mod power;

/// Applies a verdict to the engine's metrics for this request.
///
/// Failures are returned as an error, which the engine counts against the running task.
pub(crate) fn record(
    user: &GooseUser,
    request: &mut GooseRequestMetric,
    outcome: Outcome,
) -> TransactionResult {
    match outcome {
        Outcome::Success => user.set_success(request),
        Outcome::Failure(message) => {
            tracing::warn!(%message, "request failed");
            user.set_failure(&message, request, None, None)
        }
    }
}

/// Marks a request that never produced a response.
pub(crate) fn transport_failure(
    user: &GooseUser,
    request: &mut GooseRequestMetric,
    context: &str,
    error: &reqwest::Error,
) -> TransactionResult {
    record(user, request, Outcome::Failure(format!("{context}: {error}")))
}

/// Skips a task for a user whose session was never started.
pub(crate) fn missing_session() -> TransactionResult {
    tracing::error!("task ran before the session was started, skipping");
    Ok(())
}
