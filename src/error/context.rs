//! Error context utilities
//!
//! Extension traits that lift foreign errors and missing values into the
//! structured [`Error`] at the point where the context is known.

use super::builder::ErrorBuilder;
use super::types::{Error, ErrorKind};

/// Extension trait for Result to wrap errors with context
pub trait ResultExt<T> {
    /// Wrap the error with a kind and message
    fn context(self, kind: ErrorKind, message: impl Into<String>) -> Result<T, Error>;

    /// Wrap the error with a kind and a lazily built message
    fn with_context<C, F>(self, kind: ErrorKind, context: F) -> Result<T, Error>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, kind: ErrorKind, message: impl Into<String>) -> Result<T, Error> {
        self.map_err(|err| {
            ErrorBuilder::new(kind)
                .with_message(message)
                .with_cause(err)
                .build()
        })
    }

    fn with_context<C, F>(self, kind: ErrorKind, context: F) -> Result<T, Error>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|err| {
            ErrorBuilder::new(kind)
                .with_message(context())
                .with_cause(err)
                .build()
        })
    }
}

/// Extension trait for Option to convert to Result with a custom error
pub trait OptionExt<T> {
    /// Convert Option to Result with a lazily built error
    fn ok_or_error<F>(self, err_fn: F) -> Result<T, Error>
    where
        F: FnOnce() -> Error;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_error<F>(self, err_fn: F) -> Result<T, Error>
    where
        F: FnOnce() -> Error,
    {
        self.ok_or_else(err_fn)
    }
}
