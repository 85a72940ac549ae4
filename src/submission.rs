/// Submission retrier
///
/// The network boundary is unreliable: nodes drop out, transactions take
/// time to propagate. The retrier pushes one immutable payload at the node
/// repeatedly until it is acknowledged or the attempt budget runs out.
///
/// Attempts are strictly sequential. A later attempt never starts before
/// the prior one resolved, duplicate concurrent submissions risk
/// node-level nonce and record conflicts. Between attempts the retrier
/// sleeps with exponential backoff plus jitter (the original re-submitted
/// in a tight loop, which amplifies load during an outage) and honors a
/// cancel flag and a total wall-clock budget.

use crate::chain_client::ChainClient;
use crate::models::{BuiltTransaction, SubmissionOutcome};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default submission attempt ceiling
pub const DEFAULT_MAX_ATTEMPTS: u32 = 50;

/// First backoff delay (milliseconds)
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 250;

/// Backoff ceiling (milliseconds)
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 10_000;

/// Total wall-clock budget for one submit call (seconds)
pub const DEFAULT_MAX_ELAPSED_SECS: u64 = 120;

// ============================================================================
// RETRY POLICY
// ============================================================================

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of submission attempts
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub initial_backoff: Duration,
    /// Ceiling for the exponential backoff
    pub max_backoff: Duration,
    /// Total wall-clock budget; exceeded means exhaustion even with
    /// attempts left
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(DEFAULT_MAX_BACKOFF_MS),
            max_elapsed: Duration::from_secs(DEFAULT_MAX_ELAPSED_SECS),
        }
    }
}

impl RetryPolicy {
    /// Immediate retries, for tests that assert on exact attempt counts
    /// without waiting out the backoff schedule.
    pub fn no_backoff(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            max_elapsed: Duration::from_secs(DEFAULT_MAX_ELAPSED_SECS),
        }
    }

    /// Backoff before attempt `next_attempt` (1-based), jittered to spread
    /// out synchronized clients.
    fn backoff_before(&self, next_attempt: u32) -> Duration {
        if self.initial_backoff.is_zero() {
            return Duration::ZERO;
        }
        let exp = next_attempt.saturating_sub(1).min(16);
        let base = self
            .initial_backoff
            .saturating_mul(1u32 << exp)
            .min(self.max_backoff);
        // Jitter in [0.5, 1.0] of the computed delay
        let factor = rand::thread_rng().gen_range(0.5..=1.0);
        base.mul_f64(factor)
    }
}

// ============================================================================
// CANCEL HANDLE
// ============================================================================

/// Flips the in-flight submit loop to a cooperative stop. Checked between
/// attempts, never mid-request.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// SUBMISSION RETRIER
// ============================================================================

#[derive(Debug, Clone)]
pub struct SubmissionRetrier {
    policy: RetryPolicy,
}

impl SubmissionRetrier {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Submit `tx` until the node acknowledges it or the budget runs out.
    /// The payload is treated as read-only and resubmitted byte-identical.
    pub async fn submit(
        &self,
        client: &dyn ChainClient,
        tx: &BuiltTransaction,
        cancel: &CancelHandle,
    ) -> SubmissionOutcome {
        let started = Instant::now();
        let mut last_error = String::new();

        for attempt in 0..self.policy.max_attempts {
            if cancel.is_cancelled() {
                info!(attempts = attempt, "submission cancelled");
                return SubmissionOutcome::Cancelled { attempts: attempt };
            }

            match client.submit_transaction(tx).await {
                Ok(tx_id) => {
                    info!(attempts = attempt + 1, tx_id = %tx_id, "transaction accepted");
                    return SubmissionOutcome::Confirmed {
                        transaction_id: tx_id,
                        attempts: attempt + 1,
                    };
                }
                Err(e) => {
                    last_error = e.to_string();
                    debug!(attempt = attempt + 1, error = %last_error, "submission attempt failed");
                }
            }

            let remaining = self.policy.max_attempts - attempt - 1;
            if remaining == 0 {
                break;
            }

            let delay = self.policy.backoff_before(attempt + 1);
            if started.elapsed() + delay >= self.policy.max_elapsed {
                warn!(
                    attempts = attempt + 1,
                    "submission wall-clock budget exceeded"
                );
                return SubmissionOutcome::Exhausted {
                    attempts: attempt + 1,
                    last_error,
                };
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        warn!(
            attempts = self.policy.max_attempts,
            last_error = %last_error,
            "submission attempts exhausted"
        );
        SubmissionOutcome::Exhausted {
            attempts: self.policy.max_attempts,
            last_error,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
