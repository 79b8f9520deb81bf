//! Bounded completion polling for async server operations
//!
//! Loading and flushing finish on the server well after the triggering call
//! returns. This module turns such an operation into a single awaited outcome:
//! it polls a [`ProgressProbe`] at the policy's cadence until the operation
//! completes, the server reports a terminal failure, or the budget runs out.
//! Optional progress callbacks let a UI follow along.

use crate::policy::TimeoutPolicy;
use crate::probe::ProgressProbe;
use crate::transport::TransportError;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Progress events emitted during a wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// First poll is about to happen
    Started { target: String },
    /// One poll came back without a terminal answer
    Polling {
        target: String,
        attempt: u32,
        percent: u32,
        elapsed: Duration,
    },
    /// Operation finished
    Completed {
        target: String,
        attempts: u32,
        elapsed: Duration,
    },
    /// Server reported a terminal failure or could not be reached
    Failed { target: String, error: String },
    /// Budget exhausted before completion
    TimedOut {
        target: String,
        attempts: u32,
        elapsed: Duration,
    },
}

/// Callback type for progress updates
///
/// A CLI can drive a spinner from this; library callers usually leave it unset.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Terminal result of one wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Succeeded,
    /// Server-side terminal condition, e.g. out of memory
    HardFailed(String),
    /// Deadline reached; the operation may still finish later on the server
    TimedOut,
    /// A poll could not reach the server
    CommunicationFailed(TransportError),
}

impl WaitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WaitOutcome::Succeeded)
    }
}

/// Poll `probe` until completion, hard failure, transport failure, or timeout
///
/// The first poll happens immediately. Completion is checked before the
/// deadline, so a poll that returns late but finished still succeeds. When the
/// next poll could not start before the deadline, the engine sleeps out the
/// remaining budget and times out without polling again. An instant policy
/// therefore polls exactly once and never sleeps.
///
/// # Example
///
/// ```rust,ignore
/// use milvus_client::{wait_for_completion, LoadCollectionProbe, TimeoutPolicy, WaitOutcome};
///
/// let probe = LoadCollectionProbe::new(transport.as_ref(), "docs");
/// let policy = TimeoutPolicy::from_secs(30);
/// match wait_for_completion(&probe, &policy, None).await {
///     WaitOutcome::Succeeded => println!("loaded"),
///     other => println!("gave up: {:?}", other),
/// }
/// ```
pub async fn wait_for_completion(
    probe: &dyn ProgressProbe,
    policy: &TimeoutPolicy,
    on_progress: Option<&ProgressCallback>,
) -> WaitOutcome {
    let target = probe.target();
    let start = Instant::now();
    // Saturate absurd budgets instead of overflowing the clock
    let deadline = start
        .checked_add(policy.budget())
        .unwrap_or_else(|| start + Duration::from_secs(u32::MAX as u64));
    let interval = policy.poll_interval();
    let mut attempts: u32 = 0;

    emit(
        on_progress,
        ProgressEvent::Started {
            target: target.clone(),
        },
    );

    loop {
        attempts += 1;
        let report = match probe.poll().await {
            Ok(report) => report,
            Err(err) => {
                warn!(target_name = %target, attempt = attempts, error = %err, "progress poll failed");
                emit(
                    on_progress,
                    ProgressEvent::Failed {
                        target: target.clone(),
                        error: err.to_string(),
                    },
                );
                return WaitOutcome::CommunicationFailed(err);
            }
        };

        if let Some(reason) = report.hard_failure {
            warn!(target_name = %target, attempt = attempts, %reason, "server reported hard failure");
            emit(
                on_progress,
                ProgressEvent::Failed {
                    target: target.clone(),
                    error: reason.clone(),
                },
            );
            return WaitOutcome::HardFailed(reason);
        }

        let now = Instant::now();
        let elapsed = now.duration_since(start);

        if report.is_complete() {
            info!(target_name = %target, attempts, ?elapsed, "operation completed");
            emit(
                on_progress,
                ProgressEvent::Completed {
                    target: target.clone(),
                    attempts,
                    elapsed,
                },
            );
            return WaitOutcome::Succeeded;
        }

        let percent = report.min_percent();
        debug!(target_name = %target, attempt = attempts, percent, ?elapsed, "operation in progress");
        emit(
            on_progress,
            ProgressEvent::Polling {
                target: target.clone(),
                attempt: attempts,
                percent,
                elapsed,
            },
        );

        if now >= deadline {
            return timed_out(&target, attempts, elapsed, on_progress);
        }

        let remaining = deadline - now;
        if interval < remaining {
            tokio::time::sleep(interval).await;
        } else {
            // No room for another poll before the deadline
            tokio::time::sleep(remaining).await;
            return timed_out(&target, attempts, start.elapsed(), on_progress);
        }
    }
}

fn timed_out(
    target: &str,
    attempts: u32,
    elapsed: Duration,
    on_progress: Option<&ProgressCallback>,
) -> WaitOutcome {
    warn!(target_name = %target, attempts, ?elapsed, "gave up waiting");
    emit(
        on_progress,
        ProgressEvent::TimedOut {
            target: target.to_string(),
            attempts,
            elapsed,
        },
    );
    WaitOutcome::TimedOut
}

/// Helper to emit progress events
fn emit(callback: Option<&ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}
