//! Panic hook that understands error payloads
//!
//! The standard hook only knows how to print `&str` and `String` payloads and
//! shows `Box<dyn Any>` for everything else, which hides a raised error entirely.
//! The hook installed here prints error payloads in detailed mode and leaves every
//! other panic to the hook that was in place before.

use std::any::Any;
use std::io::{self, Write};
use std::panic::{self, PanicHookInfo};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{const_mutex, Mutex};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{Error, BACKTRACE_HEADING};
use crate::panic::{carries_origin, render_error_payload, Carrier};

type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

/// Panic hook settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookSettings {
    /// Whether [`init`](crate::config::init) installs the hook
    pub install: bool,

    /// Whether panics without an error payload go to the previously installed hook
    pub chain_previous: bool,

    /// Whether error panics are also emitted as `tracing` events
    pub log_event: bool,
}

impl Default for HookSettings {
    fn default() -> Self {
        Self {
            install: true,
            chain_previous: true,
            log_event: true,
        }
    }
}

static INSTALLED: AtomicBool = AtomicBool::new(false);
static PREVIOUS_HOOK: Mutex<Option<Arc<PanicHook>>> = const_mutex(None);

/// Install the error-aware panic hook.
///
/// Calling this again replaces the installed hook with one using the new settings;
/// the hook that was in place before the first call stays the one chained to.
pub fn install_hook(settings: &HookSettings) {
    let mut previous = PREVIOUS_HOOK.lock();
    let current = panic::take_hook();
    if !INSTALLED.swap(true, Ordering::SeqCst) {
        *previous = Some(Arc::new(current));
    }

    let chained = if settings.chain_previous {
        previous.clone()
    } else {
        None
    };
    let log_event = settings.log_event;

    panic::set_hook(Box::new(move |info| {
        report(&mut io::stderr().lock(), info, chained.as_deref(), log_event);
    }));

    info!(
        chain_previous = settings.chain_previous,
        log_event, "installed error-aware panic hook"
    );
}

/// Put back the hook that was in place before [`install_hook`].
///
/// Does nothing when the hook is not installed. Whatever hook is current gets
/// replaced, so a hook set with `std::panic::set_hook` after [`install_hook`] is
/// dropped here as well.
pub fn restore_default_hook() {
    let mut previous = PREVIOUS_HOOK.lock();
    if !INSTALLED.swap(false, Ordering::SeqCst) {
        return;
    }

    drop(panic::take_hook());
    if let Some(hook) = previous.take() {
        panic::set_hook(Box::new(move |info| (**hook)(info)));
    }
}

/// Whether the error-aware hook is currently installed
pub fn is_installed() -> bool {
    INSTALLED.load(Ordering::SeqCst)
}

fn report(
    out: &mut dyn Write,
    info: &PanicHookInfo<'_>,
    previous: Option<&PanicHook>,
    log_event: bool,
) {
    let Some(rendered) = render(info.payload()) else {
        match previous {
            Some(hook) => hook(info),
            None => {
                let _ = writeln!(out, "{}", info);
            }
        }
        return;
    };

    let thread = std::thread::current();
    let name = thread.name().unwrap_or("<unnamed>");
    let location = info
        .location()
        .map(|location| location.to_string())
        .unwrap_or_else(|| "<unknown>".to_string());

    if log_event {
        error!(thread = name, location = %location, "{}", rendered);
    }
    let _ = writeln!(out, "thread '{}' panicked at {}:\n{}", name, location, rendered);
}

/// Detailed rendering of an error payload for the hook.
///
/// A carrier whose original error has no backtrace gets the raise-site backtrace
/// from its wrapper appended, standing in for the one the standard hook would show.
pub(crate) fn render(payload: &(dyn Any + Send)) -> Option<String> {
    let mut rendered = render_error_payload(payload)?;

    if let Some(carrier) = payload.downcast_ref::<Carrier>() {
        if !carries_origin(&carrier.original) {
            let backtrace = carrier
                .with_origin
                .downcast_ref::<Error>()
                .and_then(Error::backtrace);
            if let Some(backtrace) = backtrace {
                rendered.push_str(&format!("\n{}\n{}", BACKTRACE_HEADING, backtrace));
            }
        }
    }

    Some(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Capture, ErrorBuilder, ErrorKind, SharedError};
    use crate::test_support::global_lock;
    use std::io;
    use std::panic::AssertUnwindSafe;

    fn plain(message: &str) -> SharedError {
        Arc::new(io::Error::new(io::ErrorKind::Other, message.to_string()))
    }

    #[test]
    fn test_render_carrier_without_backtrace_appends_raise_site() {
        let carrier = Carrier::new(plain("disk full"));
        let rendered = render(&carrier).expect("error payload");

        assert!(rendered.starts_with("disk full\n"));
        assert_eq!(rendered.matches(BACKTRACE_HEADING).count(), 1);
    }

    #[test]
    fn test_render_carrier_with_backtrace_shows_it_once() {
        let original: SharedError = Arc::new(
            ErrorBuilder::new(ErrorKind::Io)
                .with_message("disk full")
                .with_backtrace(Capture::Force)
                .build(),
        );
        let rendered = render(&Carrier::new(original)).expect("error payload");

        assert_eq!(rendered.matches(BACKTRACE_HEADING).count(), 1);
    }

    #[test]
    fn test_render_ignores_plain_messages() {
        assert!(render(&"just a message").is_none());
        assert!(render(&String::from("owned message")).is_none());
    }

    /// Route panics on the calling thread through `report`, collecting its output.
    /// Panics on other threads still reach the hook that was in place.
    fn capture_reports<F: FnOnce()>(previous: Option<PanicHook>, f: F) -> String {
        let output = Arc::new(Mutex::new(Vec::new()));
        let owner = std::thread::current().id();
        let fallback: Arc<PanicHook> = Arc::new(panic::take_hook());

        let sink = Arc::clone(&output);
        let other_threads = Arc::clone(&fallback);
        panic::set_hook(Box::new(move |info| {
            if std::thread::current().id() == owner {
                report(&mut *sink.lock(), info, previous.as_ref(), false);
            } else {
                (**other_threads)(info);
            }
        }));

        f();

        drop(panic::take_hook());
        panic::set_hook(Box::new(move |info| (**fallback)(info)));

        let bytes = output.lock().clone();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_report_renders_error_payloads() {
        let _guard = global_lock();

        let output = capture_reports(None, || {
            let _ = panic::catch_unwind(|| -> () { crate::panic::raise("disk full") });
        });

        assert!(output.starts_with("thread '"));
        assert!(output.contains("' panicked at src/hook.rs:"));
        assert!(output.contains(":\ndisk full\n"));
        assert_eq!(output.matches(BACKTRACE_HEADING).count(), 1);
    }

    #[test]
    fn test_report_delegates_plain_panics_to_previous_hook() {
        let _guard = global_lock();
        let delegated = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&delegated);
        let previous: PanicHook = Box::new(move |_| seen.store(true, Ordering::SeqCst));

        let output = capture_reports(Some(previous), || {
            let _ = panic::catch_unwind(|| panic!("plain message"));
        });

        assert!(delegated.load(Ordering::SeqCst));
        assert!(output.is_empty());
    }

    #[test]
    fn test_report_prints_plain_panics_without_previous_hook() {
        let _guard = global_lock();

        let output = capture_reports(None, || {
            let _ = panic::catch_unwind(|| panic!("plain message"));
        });

        assert!(output.contains("plain message"));
        assert!(!output.contains(BACKTRACE_HEADING));
    }

    #[test]
    fn test_report_does_not_delegate_error_payloads() {
        let _guard = global_lock();
        let delegated = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&delegated);
        let previous: PanicHook = Box::new(move |_| seen.store(true, Ordering::SeqCst));

        let output = capture_reports(Some(previous), || {
            let _ = panic::catch_unwind(|| -> () { crate::panic::raise("disk full") });
        });

        assert!(!delegated.load(Ordering::SeqCst));
        assert!(output.contains("disk full"));
    }

    #[test]
    fn test_install_and_restore() {
        let _guard = global_lock();
        let settings = HookSettings {
            log_event: false,
            ..HookSettings::default()
        };

        install_hook(&settings);
        install_hook(&settings);
        assert!(is_installed());

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            crate::panic::raise("disk full");
        }));
        assert!(result.is_err());

        let result = panic::catch_unwind(|| panic!("plain message"));
        assert!(result.is_err());

        restore_default_hook();
        assert!(!is_installed());
        restore_default_hook();
        assert!(!is_installed());
    }

    #[test]
    fn test_restore_brings_back_the_hook_set_before_install() {
        let _guard = global_lock();
        let owner = std::thread::current().id();
        let reached = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&reached);
        let outer: Arc<PanicHook> = Arc::new(panic::take_hook());
        let other_threads = Arc::clone(&outer);

        panic::set_hook(Box::new(move |info| {
            if std::thread::current().id() == owner {
                seen.store(true, Ordering::SeqCst);
            } else {
                (**other_threads)(info);
            }
        }));

        install_hook(&HookSettings {
            log_event: false,
            ..HookSettings::default()
        });
        restore_default_hook();

        let _ = panic::catch_unwind(|| panic!("after restore"));
        assert!(reached.load(Ordering::SeqCst));

        drop(panic::take_hook());
        panic::set_hook(Box::new(move |info| (**outer)(info)));
    }
}
