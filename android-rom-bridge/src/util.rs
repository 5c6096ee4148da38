use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

pub(crate) fn log_panic(panic: Box<dyn Any + Send>) {
    let message = if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "Unknown panic payload".to_owned()
    };
    log::error!("Aborting after panic at the JNI boundary: {message}");
}

/// Unwinding across the JNI boundary is undefined behaviour, so every
/// `Java_*` export runs its body under this guard and aborts the process on
/// panic instead.
pub(crate) fn abort_on_panic<R>(f: impl FnOnce() -> R) -> R {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(panic) => {
            log_panic(panic);
            std::process::abort()
        }
    }
}
