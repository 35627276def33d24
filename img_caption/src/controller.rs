//! Retry/Escalation Controller.
//!
//! Drives one [`ImageTask`] to exactly one [`ControllerResult`]:
//!
//! ```text
//! Attempting(1) ─fail→ Attempting(2) ─fail→ Attempting(3) ─fail→ Exhausted → UserPrompt
//!      │ ok                │ ok                  │ ok                              │
//!      └──────────────→ Resolved ←──────────────┘            Retry → Attempting(1)
//!                                                            Skip  → Skipped
//!                                                            Abort → Aborted
//! ```
//!
//! The gateway is called at most `max_attempts` times per escalation cycle and
//! every terminal state other than `Resolved` writes one error log entry.

use crate::error_log::ErrorLog;
use crate::errors::GatewayError;
use crate::gateway::InferenceGateway;
use crate::task::ImageTask;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Gateway calls per escalation cycle
    pub max_attempts: u32,
    /// Pause between failed attempts inside a cycle
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

/// Operator answer after a cycle is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Stop the whole batch.
    Abort,
    /// Run another full cycle for this file.
    Retry,
    /// Give up on this file and continue.
    Skip,
}

/// What the decision provider is told about a file that exhausted a cycle.
#[derive(Debug)]
pub struct FailureContext<'a> {
    pub task: &'a ImageTask,
    pub file_name: &'a str,
    /// Attempts made in the cycle that just ended
    pub attempts: u32,
    /// 1-based escalation cycle number
    pub cycle: u32,
    pub last_error: &'a GatewayError,
}

/// Supplies the escalation decision. Interactive prompts and fixed automation
/// policies both implement this.
pub trait DecisionProvider {
    fn decide(&mut self, context: &FailureContext<'_>) -> Decision;
}

impl<D: DecisionProvider + ?Sized> DecisionProvider for &mut D {
    fn decide(&mut self, context: &FailureContext<'_>) -> Decision {
        (**self).decide(context)
    }
}

impl<D: DecisionProvider + ?Sized> DecisionProvider for Box<D> {
    fn decide(&mut self, context: &FailureContext<'_>) -> Decision {
        (**self).decide(context)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerResult {
    Resolved(String),
    /// Operator skipped the file; carries the logged message.
    Skipped(String),
    /// Operator stopped the batch on this file; carries the logged message.
    Aborted(String),
}

#[derive(Debug)]
enum State {
    Attempting(u32),
    /// Cycle used up; keeps the last failure.
    Exhausted(GatewayError),
    UserPrompt(GatewayError),
    Resolved(String),
    Skipped(String),
    Aborted(String),
}

/// Per-task bookkeeping threaded through the state loop.
#[derive(Debug)]
struct TaskState {
    cycle: u32,
    calls: u32,
}

pub struct RetryController<'a, G: ?Sized, D: ?Sized> {
    gateway: &'a G,
    decisions: &'a mut D,
    policy: RetryPolicy,
}

impl<'a, G, D> RetryController<'a, G, D>
where
    G: InferenceGateway + ?Sized,
    D: DecisionProvider + ?Sized,
{
    pub fn new(gateway: &'a G, decisions: &'a mut D, policy: RetryPolicy) -> Self {
        Self {
            gateway,
            decisions,
            policy,
        }
    }

    /// Runs `task` until it resolves, is skipped, or the operator aborts.
    pub fn run(&mut self, task: &ImageTask, error_log: &mut ErrorLog) -> ControllerResult {
        let file_name = task.file_name();
        let max_attempts = self.policy.max_attempts.max(1);
        let mut ts = TaskState { cycle: 1, calls: 0 };
        let mut state = State::Attempting(1);

        loop {
            state = match state {
                State::Attempting(n) => {
                    ts.calls += 1;
                    match self.gateway.invoke(task.path(), task.mode) {
                        Ok(text) => State::Resolved(text),
                        Err(e) if n < max_attempts => {
                            println!(
                                "  ⚠ Attempt {} failed, waiting {}s before retry... ({})",
                                n,
                                self.policy.backoff.as_secs(),
                                e
                            );
                            warn!(file = %file_name, attempt = n, cycle = ts.cycle, error = %e, "Inference attempt failed");
                            if !self.policy.backoff.is_zero() {
                                std::thread::sleep(self.policy.backoff);
                            }
                            State::Attempting(n + 1)
                        }
                        Err(e) => {
                            println!("  ✗ Failed after {} attempts: {}", n, e);
                            warn!(file = %file_name, attempt = n, cycle = ts.cycle, error = %e, "Escalation cycle exhausted");
                            State::Exhausted(e)
                        }
                    }
                }

                State::Exhausted(last_error) => State::UserPrompt(last_error),

                State::UserPrompt(last_error) => {
                    let context = FailureContext {
                        task,
                        file_name: &file_name,
                        attempts: max_attempts,
                        cycle: ts.cycle,
                        last_error: &last_error,
                    };
                    let decision = self.decisions.decide(&context);
                    info!(file = %file_name, cycle = ts.cycle, ?decision, "Escalation decision");

                    match decision {
                        Decision::Retry => {
                            println!("  Retrying with {} attempts...", max_attempts);
                            ts.cycle += 1;
                            State::Attempting(1)
                        }
                        Decision::Skip => {
                            println!("  ⊘ Skipping file: {}", file_name);
                            let message = format!(
                                "Skipped by user after {} failed attempts. Last error: {}",
                                max_attempts, last_error
                            );
                            error_log.record_or_warn(&file_name, &message);
                            State::Skipped(message)
                        }
                        Decision::Abort => {
                            println!("\nStopping processing as requested.");
                            let message = last_error.to_string();
                            error_log.record_or_warn(&file_name, &message);
                            State::Aborted(message)
                        }
                    }
                }

                State::Resolved(text) => {
                    info!(file = %file_name, calls = ts.calls, cycles = ts.cycle, "Inference resolved");
                    return ControllerResult::Resolved(text);
                }
                State::Skipped(message) => return ControllerResult::Skipped(message),
                State::Aborted(message) => return ControllerResult::Aborted(message),
            };
        }
    }
}
