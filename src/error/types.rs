//! Error types and definitions for errpanic
//!
//! [`Error`] is the structured error the panic path is written against: a kind, an
//! optional message, an optional cause and a backtrace captured at construction.
//! [`ConfigError`] covers the crate's own fallible operations.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// A type-erased error that can be shared between a carrier and its wrapper
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Coarse classification of a structured error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrapper with no classification of its own; defers its message to the cause
    Transparent,
    /// Broken internal invariant
    Internal,
    /// Caller supplied something unusable
    InvalidInput,
    /// Underlying I/O failure
    Io,
    /// Configuration problem
    Config,
    /// Anything else
    Other,
}

impl ErrorKind {
    /// Whether this kind adds no classification on top of its cause
    pub fn is_transparent(self) -> bool {
        self == ErrorKind::Transparent
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transparent => write!(f, "transparent"),
            ErrorKind::Internal => write!(f, "internal error"),
            ErrorKind::InvalidInput => write!(f, "invalid input"),
            ErrorKind::Io => write!(f, "io error"),
            ErrorKind::Config => write!(f, "configuration error"),
            ErrorKind::Other => write!(f, "error"),
        }
    }
}

/// Structured error carrying a kind, a message, an optional cause and a backtrace
///
/// Build one with [`ErrorBuilder`](crate::error::ErrorBuilder) or the shortcut
/// constructors [`Error::new`] and [`Error::wrap`].
pub struct Error {
    pub(crate) kind: ErrorKind,
    pub(crate) message: String,
    pub(crate) cause: Option<SharedError>,
    pub(crate) backtrace: Backtrace,
}

impl Error {
    /// Create an error with a message and no cause
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        crate::error::ErrorBuilder::new(kind)
            .with_message(message)
            .build()
    }

    /// Create an error with a message wrapping `cause`
    pub fn wrap<E>(kind: ErrorKind, message: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        crate::error::ErrorBuilder::new(kind)
            .with_message(message)
            .with_cause(cause)
            .build()
    }

    /// Get the kind of this error
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the explicit message, empty when the error defers to its cause
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the cause of this error, if any
    pub fn cause(&self) -> Option<&SharedError> {
        self.cause.as_ref()
    }

    /// Get the backtrace if one was actually captured
    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.has_backtrace().then_some(&self.backtrace)
    }

    /// Whether this error holds a captured backtrace
    pub fn has_backtrace(&self) -> bool {
        self.backtrace.status() == BacktraceStatus::Captured
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.message.is_empty(), &self.cause) {
            (false, Some(cause)) => write!(f, "{}, cause: {}", self.message, cause),
            (false, None) => f.write_str(&self.message),
            (true, Some(cause)) => write!(f, "{}", cause),
            (true, None) => write!(f, "{}", self.kind),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("cause", &self.cause)
            .field("backtrace", &self.backtrace.status())
            .finish()
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        crate::error::ErrorBuilder::new(ErrorKind::Io)
            .with_cause(err)
            .build()
    }
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {path}")]
    NotFound { path: PathBuf },

    /// Configuration file read errors
    #[error("Error reading configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file parse errors
    #[error("Error parsing configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value that does not match any accepted spelling
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

impl ConfigError {
    /// Create a not-found error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ConfigError::NotFound { path: path.into() }
    }

    /// Create a read error with file context
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error with file context
    pub fn parse(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        ConfigError::Parse {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
