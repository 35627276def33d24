//! Caption or rename macOS screenshots with a local vision model.
//!
//! Each eligible file goes through a [`RetryController`]: up to three inference
//! attempts per cycle, then the operator (or a fixed policy) decides whether to
//! abort the batch, run another cycle or skip the file.

pub mod classifier;
pub mod controller;
pub mod driver;
pub mod error_log;
pub mod errors;
pub mod gateway;
pub mod prompt;
pub mod rename;
pub mod sanitizer;
pub mod task;

pub use classifier::{is_eligible, is_eligible_path, is_screenshot_name};
pub use controller::{
    ControllerResult, Decision, DecisionProvider, FailureContext, RetryController, RetryPolicy,
};
pub use driver::{finalize, run, run_batch, Finalized, RunConfig, RunOutcome, RunSummary};
pub use error_log::{ErrorLog, ERROR_LOG_NAME};
pub use errors::{CaptionError, GatewayError, Result};
pub use gateway::{GatewayConfig, InferenceGateway, OllamaGateway};
pub use prompt::{ConsolePrompt, FailurePolicy, FixedPolicy, LinePrompt};
pub use rename::{resolve, Resolution};
pub use sanitizer::{sanitize, slugify_reply};
pub use task::{ImageTask, Mode};
