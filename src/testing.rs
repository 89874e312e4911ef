//! Test doubles for the process exit and the panic hook

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use crate::handlers::Exit;
use crate::signal::AbortSignal;

/// Unwind payload standing in for a real process exit
#[derive(Debug)]
pub(crate) struct ExitRequested(pub(crate) i32);

/// Records every exit status, then unwinds with [`ExitRequested`]
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingExit {
    calls: Arc<Mutex<Vec<i32>>>,
}

impl RecordingExit {
    pub(crate) fn calls(&self) -> Vec<i32> {
        self.calls.lock().unwrap().clone()
    }
}

impl Exit for RecordingExit {
    fn exit(&self, status: i32) -> ! {
        self.calls.lock().unwrap().push(status);
        panic::panic_any(ExitRequested(status))
    }
}

/// Run `f` and return the status it tried to exit with
pub(crate) fn exit_status<R>(f: impl FnOnce() -> R) -> Option<i32> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(_) => None,
        Err(payload) => match payload.downcast::<ExitRequested>() {
            Ok(exit) => Some(exit.0),
            Err(other) => panic::resume_unwind(other),
        },
    }
}

/// A panic that reached the bottom of the hook chain
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Reported {
    pub(crate) message: String,
    pub(crate) file: String,
    pub(crate) line: u32,
}

// The panic hook is process-wide
static HOOK_LOCK: Mutex<()> = Mutex::new(());

thread_local! {
    static REPORTED: RefCell<Vec<Reported>> = const { RefCell::new(Vec::new()) };
}

/// Run `f` under the hook `install` sets up, on top of a recording hook
///
/// Returns the panics raised by `f` that were passed down to the recording
/// hook. The original hook is restored afterwards.
pub(crate) fn reported_panics(install: impl FnOnce(), f: impl FnOnce()) -> Vec<Reported> {
    let _guard = HOOK_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let original = panic::take_hook();
    panic::set_hook(Box::new(|info| {
        let payload = info.payload();
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_owned()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else if let Some(signal) = payload.downcast_ref::<AbortSignal>() {
            signal.to_string()
        } else {
            String::new()
        };
        let (file, line) = info
            .location()
            .map_or((String::new(), 0), |loc| (loc.file().to_owned(), loc.line()));
        REPORTED.with(|r| r.borrow_mut().push(Reported { message, file, line }));
    }));
    install();
    REPORTED.with(|r| r.borrow_mut().clear());
    let _ = panic::catch_unwind(AssertUnwindSafe(f));
    panic::set_hook(original);
    REPORTED.with(|r| r.take())
}
