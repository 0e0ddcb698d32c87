//! The payload handed to the unwinder by [`raise`](super::raise)

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Capture, Detailed, Error, ErrorBuilder, SharedError};

/// Holds the raised error next to a version of it that is guaranteed to carry a
/// captured backtrace. Both fields point at the same allocation when the raised
/// error already had one.
pub(crate) struct Carrier {
    pub(crate) original: SharedError,
    pub(crate) with_origin: SharedError,
}

impl Carrier {
    pub(crate) fn new(original: SharedError) -> Self {
        let with_origin = if carries_origin(&original) {
            Arc::clone(&original)
        } else {
            let wrapper = ErrorBuilder::transparent()
                .with_shared_cause(Arc::clone(&original))
                .with_backtrace(Capture::Force)
                .build();
            Arc::new(wrapper) as SharedError
        };

        debug!(
            error = %original,
            synthesized = !Arc::ptr_eq(&original, &with_origin),
            "raising error as panic payload"
        );

        Self {
            original,
            with_origin,
        }
    }
}

/// Whether `err` is a structured error holding a captured backtrace
pub(crate) fn carries_origin(err: &SharedError) -> bool {
    err.downcast_ref::<Error>().is_some_and(Error::has_backtrace)
}

// The wrapper only adds the raise-site backtrace, so the original is what gets shown.
impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Detailed(&*self.original).fmt(f)
    }
}

impl fmt::Debug for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for Carrier {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.original as &(dyn std::error::Error + 'static))
    }
}
