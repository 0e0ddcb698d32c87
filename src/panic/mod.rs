//! Raising structured errors as panics and getting them back
//!
//! [`raise`] replaces `panic!(...)` when the reason for panicking is an error value.
//! The error travels through the unwind untouched, and [`recover_original`] hands it
//! back from whatever `catch_unwind` produced. If the raised error did not already
//! hold a backtrace, one is captured at the raise site, so the diagnostic is never
//! worse than what a plain panic would give.
//!
//! ```
//! use errpanic::panic::{raise, recover_original};
//!
//! let payload = std::panic::catch_unwind(|| -> () { raise("disk full") }).unwrap_err();
//! let (error, found) = recover_original(payload);
//!
//! assert!(found);
//! assert_eq!(error.unwrap().to_string(), "disk full");
//! ```
//!
//! A payload is *error-shaped* when it is a carrier built by [`raise`], a
//! [`SharedError`], an `Arc<Error>`, a `Box<dyn Error + Send + Sync>`, a structured
//! [`Error`] or a `std::io::Error`. String messages from `panic!` and every other
//! value are not.

mod carrier;

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::trace;

use crate::error::{render_detailed, Detailed, Error, SharedError};

pub(crate) use carrier::{carries_origin, Carrier};

/// Panic with `err` as the payload, preserving it for recovery.
///
/// Never returns. Anything convertible into `Box<dyn Error + Send + Sync>` is
/// accepted, including `&str` and `String` messages.
///
/// A [`SharedError`] or `Arc<Error>` passed here is raised as that same `Arc`
/// rather than wrapped, exactly as [`raise_shared`] would.
#[track_caller]
pub fn raise<E>(err: E) -> !
where
    E: Into<Box<dyn StdError + Send + Sync + 'static>>,
{
    let err: Box<dyn StdError + Send + Sync> = err.into();
    let err = match err.downcast::<SharedError>() {
        Ok(shared) => raise_shared(*shared),
        Err(err) => err,
    };
    match err.downcast::<Arc<Error>>() {
        Ok(structured) => raise_shared(*structured),
        Err(err) => raise_shared(Arc::from(err)),
    }
}

/// Panic with an already shared error as the payload.
///
/// The same allocation comes back out of [`recover_original`], so callers holding a
/// clone of `err` can check identity with [`Arc::ptr_eq`].
#[track_caller]
pub fn raise_shared(err: SharedError) -> ! {
    panic::panic_any(Carrier::new(err))
}

enum Payload {
    Carrier(Carrier),
    Error(SharedError),
    Other(Box<dyn Any + Send>),
}

fn classify(payload: Box<dyn Any + Send>) -> Payload {
    let payload = match payload.downcast::<Carrier>() {
        Ok(carrier) => return Payload::Carrier(*carrier),
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<SharedError>() {
        Ok(err) => return Payload::Error(*err),
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<Arc<Error>>() {
        Ok(err) => return Payload::Error(*err),
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<Box<dyn StdError + Send + Sync>>() {
        Ok(err) => return Payload::Error(Arc::from(*err)),
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<Error>() {
        Ok(err) => return Payload::Error(Arc::new(*err)),
        Err(payload) => payload,
    };
    match payload.downcast::<io::Error>() {
        Ok(err) => Payload::Error(Arc::new(*err)),
        Err(payload) => Payload::Other(payload),
    }
}

/// Get the original error back from a panic payload.
///
/// | payload | result |
/// |---|---|
/// | raised by [`raise`] | `(Some(original), true)` |
/// | any other error-shaped value | `(Some(payload), true)`, unchanged |
/// | anything else | `(None, false)` |
///
/// Safe to call on any payload, including ones this crate never produced.
pub fn recover_original(payload: Box<dyn Any + Send>) -> (Option<SharedError>, bool) {
    match classify(payload) {
        Payload::Carrier(carrier) => {
            trace!(error = %carrier.original, "recovered original error from carrier");
            (Some(carrier.original), true)
        }
        Payload::Error(err) => {
            trace!(error = %err, "recovered foreign error payload");
            (Some(err), true)
        }
        Payload::Other(_) => {
            trace!("panic payload is not an error");
            (None, false)
        }
    }
}

/// Like [`recover_original`], but a carrier yields the error that is guaranteed
/// to hold a backtrace: the original when it had one, otherwise the transparent
/// wrapper synthesized at the raise site.
pub fn recover_with_origin(payload: Box<dyn Any + Send>) -> (Option<SharedError>, bool) {
    match classify(payload) {
        Payload::Carrier(carrier) => (Some(carrier.with_origin), true),
        Payload::Error(err) => (Some(err), true),
        Payload::Other(_) => (None, false),
    }
}

/// An error recovered from a panic by [`catch`]
#[derive(Clone)]
pub struct Recovered {
    error: SharedError,
    origin: SharedError,
}

impl Recovered {
    /// The error exactly as it was raised
    pub fn error(&self) -> &SharedError {
        &self.error
    }

    /// The raised error or its raise-site wrapper, whichever holds a backtrace.
    /// For foreign error payloads this is the payload itself.
    pub fn origin(&self) -> &SharedError {
        &self.origin
    }

    /// Whether [`origin`](Self::origin) holds a captured backtrace
    pub fn has_backtrace(&self) -> bool {
        carries_origin(&self.origin)
    }

    pub fn into_error(self) -> SharedError {
        self.error
    }
}

impl fmt::Display for Recovered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Detailed(&*self.error).fmt(f)
    }
}

impl fmt::Debug for Recovered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recovered")
            .field("error", &self.error.to_string())
            .field("has_backtrace", &self.has_backtrace())
            .finish()
    }
}

impl StdError for Recovered {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.error as &(dyn StdError + 'static))
    }
}

/// Run `f`, turning an error-shaped panic into `Err(Recovered)`.
///
/// Panics whose payload is not an error (a `panic!` message, for instance) keep
/// unwinding with their payload untouched. `f` is treated as unwind safe; state it
/// leaves half-updated is the caller's concern, as with any `catch_unwind`.
pub fn catch<F, R>(f: F) -> Result<R, Recovered>
where
    F: FnOnce() -> R,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Ok(value),
        Err(payload) => match classify(payload) {
            Payload::Carrier(carrier) => Err(Recovered {
                error: carrier.original,
                origin: carrier.with_origin,
            }),
            Payload::Error(err) => Err(Recovered {
                origin: Arc::clone(&err),
                error: err,
            }),
            Payload::Other(payload) => panic::resume_unwind(payload),
        },
    }
}

/// Render the error-shaped payloads in detailed mode, `None` for anything else
pub(crate) fn render_error_payload(payload: &(dyn Any + Send)) -> Option<String> {
    if let Some(carrier) = payload.downcast_ref::<Carrier>() {
        Some(carrier.to_string())
    } else if let Some(err) = payload.downcast_ref::<SharedError>() {
        Some(render_detailed(&**err))
    } else if let Some(err) = payload.downcast_ref::<Arc<Error>>() {
        Some(render_detailed(&**err))
    } else if let Some(err) = payload.downcast_ref::<Box<dyn StdError + Send + Sync>>() {
        Some(render_detailed(&**err))
    } else if let Some(err) = payload.downcast_ref::<Error>() {
        Some(render_detailed(err))
    } else {
        payload.downcast_ref::<io::Error>().map(|err| render_detailed(err))
    }
}

/// Turn any panic payload into a message.
///
/// Error-shaped payloads render in detailed mode; `&str` and `String` payloads are
/// returned as they are.
pub fn payload_message(payload: &(dyn Any + Send)) -> Option<String> {
    render_error_payload(payload)
        .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
        .or_else(|| payload.downcast_ref::<String>().cloned())
}
