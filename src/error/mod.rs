//! Structured errors
//!
//! This module provides the structured error the panic path works with, its
//! builder, detailed rendering of error chains, and context utilities.

pub mod builder;
pub mod context;
pub mod render;
pub mod types;

pub use builder::{backtrace_policy, set_backtrace_policy, BacktracePolicy, Capture, ErrorBuilder};
pub use context::{OptionExt, ResultExt};
pub use render::{chain, render_detailed, Detailed, BACKTRACE_HEADING};
pub use types::{ConfigError, Error, ErrorKind, Result, SharedError};
