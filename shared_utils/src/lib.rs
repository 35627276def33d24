//! Shared Utilities for the img_caption tools
//!
//! - Logging setup (tracing + rolling diagnostic file)
//! - Batch file collection and result bookkeeping
//! - Safety checks (dangerous directory detection)
//! - Summary reporting

pub mod batch;
pub mod common_utils;
pub mod logging;
pub mod report;
pub mod safety;

pub use batch::*;
pub use report::*;
pub use safety::*;
