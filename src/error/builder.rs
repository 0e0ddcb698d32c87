//! Builder for structured errors and the process-wide backtrace policy

use std::backtrace::Backtrace;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::types::{Error, ErrorKind, SharedError};

/// How errors built with [`Capture::Auto`] decide whether to capture a backtrace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BacktracePolicy {
    /// Follow `RUST_LIB_BACKTRACE` / `RUST_BACKTRACE`
    #[default]
    Auto,
    /// Always capture
    Always,
    /// Never capture
    Never,
}

impl std::str::FromStr for BacktracePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(BacktracePolicy::Auto),
            "always" | "force" | "1" | "full" => Ok(BacktracePolicy::Always),
            "never" | "off" | "0" => Ok(BacktracePolicy::Never),
            _ => Err(format!("Invalid backtrace policy: {}", s)),
        }
    }
}

impl std::fmt::Display for BacktracePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BacktracePolicy::Auto => write!(f, "auto"),
            BacktracePolicy::Always => write!(f, "always"),
            BacktracePolicy::Never => write!(f, "never"),
        }
    }
}

static DEFAULT_POLICY: AtomicU8 = AtomicU8::new(BacktracePolicy::Auto as u8);

/// Set the policy used by [`Capture::Auto`]
pub fn set_backtrace_policy(policy: BacktracePolicy) {
    DEFAULT_POLICY.store(policy as u8, Ordering::Relaxed);
}

/// Get the policy used by [`Capture::Auto`]
pub fn backtrace_policy() -> BacktracePolicy {
    match DEFAULT_POLICY.load(Ordering::Relaxed) {
        1 => BacktracePolicy::Always,
        2 => BacktracePolicy::Never,
        _ => BacktracePolicy::Auto,
    }
}

/// Backtrace capture requested for a single error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capture {
    /// Defer to the process-wide [`BacktracePolicy`]
    #[default]
    Auto,
    /// Capture regardless of policy and environment
    Force,
    /// Do not capture
    Never,
}

impl Capture {
    fn take(self) -> Backtrace {
        let policy = match self {
            Capture::Auto => backtrace_policy(),
            Capture::Force => BacktracePolicy::Always,
            Capture::Never => BacktracePolicy::Never,
        };

        match policy {
            BacktracePolicy::Auto => Backtrace::capture(),
            BacktracePolicy::Always => Backtrace::force_capture(),
            BacktracePolicy::Never => Backtrace::disabled(),
        }
    }
}

/// Builder for [`Error`]
///
/// ```
/// use errpanic::error::{Capture, ErrorBuilder, ErrorKind};
///
/// let err = ErrorBuilder::new(ErrorKind::Config)
///     .with_message("missing section")
///     .with_backtrace(Capture::Never)
///     .build();
/// assert_eq!(err.to_string(), "missing section");
/// ```
#[derive(Debug)]
pub struct ErrorBuilder {
    kind: ErrorKind,
    message: String,
    cause: Option<SharedError>,
    capture: Capture,
}

impl ErrorBuilder {
    /// Start building an error of the given kind
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: String::new(),
            cause: None,
            capture: Capture::Auto,
        }
    }

    /// Start building a transparent wrapper
    pub fn transparent() -> Self {
        Self::new(ErrorKind::Transparent)
    }

    /// Set the explicit message. An empty message defers to the cause.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the cause
    pub fn with_cause<E>(self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.with_shared_cause(Arc::new(cause))
    }

    /// Set a cause that is already shared
    pub fn with_shared_cause(mut self, cause: SharedError) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Choose how the backtrace is captured
    pub fn with_backtrace(mut self, capture: Capture) -> Self {
        self.capture = capture;
        self
    }

    /// Build the error, capturing the backtrace at this call site
    pub fn build(self) -> Error {
        Error {
            kind: self.kind,
            message: self.message,
            cause: self.cause,
            backtrace: self.capture.take(),
        }
    }
}
