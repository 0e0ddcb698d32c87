//! errpanic - raise structured errors as panics without losing them
//!
//! A plain `panic!` with an error value either flattens it into a string or, with
//! `panic_any`, buries it in a `Box<dyn Any>` that the default hook cannot print.
//! [`raise`] panics with a carrier that keeps the error intact and makes sure a
//! backtrace exists, and [`recover_original`] gets the error back out of whatever
//! `catch_unwind` returned.
//!
//! Code that already holds a [`SharedError`] and later checks identity with
//! `Arc::ptr_eq` should prefer [`raise_shared`]; [`raise`] accepts the same `Arc`
//! and raises it unwrapped, but also takes plain messages and owned errors.

pub mod config;
pub mod error;
pub mod hook;
pub mod panic;

// Re-export commonly used types
pub use config::{init, Settings};
pub use error::{Error, ErrorBuilder, ErrorKind, SharedError};
pub use hook::{install_hook, restore_default_hook, HookSettings};
pub use panic::{
    catch, payload_message, raise, raise_shared, recover_original, recover_with_origin, Recovered,
};

#[cfg(test)]
pub(crate) mod test_support {
    use parking_lot::{const_mutex, Mutex, MutexGuard};

    static GLOBAL_STATE: Mutex<()> = const_mutex(());

    /// Serializes tests that touch the panic hook or the backtrace policy
    pub(crate) fn global_lock() -> MutexGuard<'static, ()> {
        GLOBAL_STATE.lock()
    }
}
