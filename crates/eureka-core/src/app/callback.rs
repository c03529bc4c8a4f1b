//! Isolation boundary for caller-supplied callbacks.
//!
//! This is the only place in the crate where a failure is intentionally
//! dropped: a callback that panics is logged and forgotten, so that it cannot
//! unwind into the processor or keep sibling callbacks of the same batch from
//! running. Callers must not hold any processor borrow while calling
//! `isolate`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

/// Runs `f`, containing any panic it raises.
///
/// Returns `false` if the callback panicked.
pub(crate) fn isolate<F: FnOnce()>(what: &str, f: F) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => true,
        Err(payload) => {
            warn!(callback = what, panic = %panic_message(payload.as_ref()), "callback panicked");
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic>"
    }
}
