//! Detailed rendering of error chains

use std::error::Error as StdError;
use std::fmt;

use super::types::Error;

/// Heading placed in front of every captured backtrace in a detailed rendering
pub const BACKTRACE_HEADING: &str = "origin backtrace:";

/// Display adapter that renders an error with its cause chain and backtraces
///
/// The first line is the error's own `Display`. Each deeper source gets a
/// `caused by:` line unless the error above it already printed it: a structured
/// [`Error`] always prints its cause, and other errors are taken to print it when
/// their message ends in `": <source>"`. Every structured [`Error`] in the chain
/// holding a captured backtrace contributes one backtrace section.
pub struct Detailed<'a>(pub &'a (dyn StdError + 'static));

impl fmt::Display for Detailed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parent = self.0;
        let mut parent_message = parent.to_string();
        f.write_str(&parent_message)?;

        while let Some(err) = parent.source() {
            let message = err.to_string();
            if !message.is_empty() && !prints_source(parent, &parent_message, &message) {
                write!(f, "\ncaused by: {}", message)?;
            }
            parent = err;
            parent_message = message;
        }

        for backtrace in chain(self.0)
            .filter_map(|err| err.downcast_ref::<Error>())
            .filter_map(Error::backtrace)
        {
            write!(f, "\n{}\n{}", BACKTRACE_HEADING, backtrace)?;
        }

        Ok(())
    }
}

/// Whether `parent`'s own message already contains its source's message
fn prints_source(parent: &(dyn StdError + 'static), parent_message: &str, message: &str) -> bool {
    parent.is::<Error>()
        || parent_message
            .strip_suffix(message)
            .is_some_and(|head| head.ends_with(": "))
}

/// Render any error in detailed mode
pub fn render_detailed(err: &(dyn StdError + 'static)) -> String {
    Detailed(err).to_string()
}

/// Iterate over an error and all of its sources
pub fn chain<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |err| (*err).source())
}
