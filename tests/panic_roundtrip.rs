// End-to-end tests for raising errors as panics and recovering them

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};
use std::thread;

use errpanic::error::{render_detailed, Capture, ErrorBuilder, BACKTRACE_HEADING};
use errpanic::{
    catch, payload_message, raise, raise_shared, recover_original, Error, ErrorKind, SharedError,
};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("errpanic=trace"))
            .with_test_writer()
            .try_init();
    });
}

fn store_block(free_bytes: u64) -> u64 {
    if free_bytes == 0 {
        raise("disk full");
    }
    free_bytes - 1
}

#[test]
fn test_disk_full_is_recovered_one_frame_up() {
    init_tracing();

    let payload = panic::catch_unwind(|| store_block(0)).unwrap_err();
    let (err, found) = recover_original(payload);

    assert!(found);
    assert_eq!(err.expect("error payload").to_string(), "disk full");
}

#[test]
fn test_prebuilt_error_comes_back_unwrapped() {
    init_tracing();

    let e2: SharedError = Arc::new(
        ErrorBuilder::new(ErrorKind::Io)
            .with_message("volume offline")
            .with_cause(io::Error::new(io::ErrorKind::Other, "controller reset"))
            .with_backtrace(Capture::Force)
            .build(),
    );

    let raised = Arc::clone(&e2);
    let payload = panic::catch_unwind(AssertUnwindSafe(move || -> () { raise_shared(raised) }))
        .unwrap_err();
    let (err, found) = recover_original(payload);
    let err = err.expect("error payload");

    assert!(found);
    assert!(Arc::ptr_eq(&err, &e2));

    let rendered = render_detailed(&*err);
    assert!(rendered.starts_with("volume offline, cause: controller reset\n"));
    assert_eq!(rendered.matches(BACKTRACE_HEADING).count(), 1);
}

#[test]
fn test_error_crosses_thread_boundary() {
    init_tracing();

    let handle = thread::spawn(|| -> u64 {
        let err = ErrorBuilder::new(ErrorKind::Internal)
            .with_message("worker lost its queue")
            .with_backtrace(Capture::Never)
            .build();
        raise(err)
    });

    let payload = handle.join().unwrap_err();
    assert_eq!(payload_message(&*payload).as_deref(), Some("worker lost its queue"));

    let (err, found) = recover_original(payload);
    let err = err.expect("error payload");
    assert!(found);
    assert_eq!(
        err.downcast_ref::<Error>().map(Error::kind),
        Some(ErrorKind::Internal)
    );
}

#[test]
fn test_catch_keeps_the_error_and_its_origin() {
    init_tracing();

    let recovered = catch(|| -> u64 { store_block(0) }).unwrap_err();

    assert_eq!(recovered.error().to_string(), "disk full");
    assert!(recovered.has_backtrace());
    assert!(!Arc::ptr_eq(recovered.error(), recovered.origin()));
}

#[test]
fn test_catch_lets_plain_panics_through() {
    init_tracing();

    let outer = panic::catch_unwind(|| {
        let _ = catch(|| -> () { panic!("index out of range") });
    })
    .unwrap_err();

    let (err, found) = recover_original(outer);
    assert!(err.is_none());
    assert!(!found);
}
