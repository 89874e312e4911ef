//! Capturing standard outcome types with a method call

use std::convert::Infallible;
use std::error::Error;

use crate::handlers::{ActionKind, Dispatcher, Fault};
use crate::note::Note;
use crate::result::{Flag, ValueFailure, ValueFlag};

/// Wrap an outcome for fluent handling
///
/// | Implementor | Wrapper |
/// |---|---|
/// | `Result<T, E>` | [`ValueFailure`], `T::default()` on error |
/// | `Option<T>` | [`ValueFlag`], `T::default()` on `None` |
/// | `bool` | [`Flag`] |
///
/// `Result` and `Option` need `T: Default` because a wrapper always hands a
/// value back, even from `on_failure_record`. For values with no default,
/// such as a `File`, use [`Resolve`].
///
/// # Examples
///
/// ```rust
/// use faultline::{note, Check};
///
/// let port = "8080".parse::<u16>().check().on_failure_abort(note!("parse port"));
/// let first = [1, 2, 3].first().copied().check().must_succeed();
/// (port > 1024).check().on_failure_record("privileged port");
/// # assert_eq!((port, first), (8080, 1));
/// ```
pub trait Check: Sized {
    /// The wrapper this outcome turns into
    type Captured<'d>;

    /// Capture through `dispatcher`
    fn check_with(self, dispatcher: &Dispatcher) -> Self::Captured<'_>;

    /// Capture through the global dispatcher
    fn check(self) -> Self::Captured<'static> {
        self.check_with(Dispatcher::global())
    }
}

impl<T: Default, E> Check for Result<T, E> {
    type Captured<'d> = ValueFailure<'d, T, E>;

    fn check_with(self, dispatcher: &Dispatcher) -> ValueFailure<'_, T, E> {
        dispatcher.capture_result(self)
    }
}

impl<T: Default> Check for Option<T> {
    type Captured<'d> = ValueFlag<'d, T>;

    fn check_with(self, dispatcher: &Dispatcher) -> ValueFlag<'_, T> {
        match self {
            Some(value) => dispatcher.capture_flag(value, true),
            None => dispatcher.capture_flag(T::default(), false),
        }
    }
}

impl Check for bool {
    type Captured<'d> = Flag<'d>;

    fn check_with(self, dispatcher: &Dispatcher) -> Flag<'_> {
        dispatcher.capture_ok(self)
    }
}

/// Resolve an outcome in place, for values that have no default
///
/// Only actions that never return on failure are offered, so no fallback
/// value is needed. Diagnostics are attributed to the caller.
///
/// # Examples
///
/// ```rust,no_run
/// use faultline::{note, Resolve};
///
/// let file = std::fs::File::open("app.toml").or_abort(note!("open config"));
/// let first = std::env::args().next().must();
/// ```
pub trait Resolve: Sized {
    /// The value on success
    type Value;
    /// The error on failure; [`Infallible`] for `Option`
    type Error: Error + Send + Sync + 'static;

    /// Split into the value or the fault to dispatch
    fn into_outcome(self) -> Result<Self::Value, Fault<Self::Error>>;

    /// Return the value, or log and unwind through the global dispatcher
    #[track_caller]
    fn or_abort(self, note: impl Into<Note>) -> Self::Value {
        self.or_abort_with(Dispatcher::global(), note)
    }

    /// Return the value, or log and unwind through `dispatcher`
    #[track_caller]
    fn or_abort_with(self, dispatcher: &Dispatcher, note: impl Into<Note>) -> Self::Value {
        dispatcher.settle(self, ActionKind::Abort, Some(note.into()))
    }

    /// Return the value, or log and end the process through the global dispatcher
    #[track_caller]
    fn or_terminate(self, note: impl Into<Note>) -> Self::Value {
        self.or_terminate_with(Dispatcher::global(), note)
    }

    /// Return the value, or log and end the process through `dispatcher`
    #[track_caller]
    fn or_terminate_with(self, dispatcher: &Dispatcher, note: impl Into<Note>) -> Self::Value {
        dispatcher.settle(self, ActionKind::Terminate, Some(note.into()))
    }

    /// Return the value, or unwind without logging
    #[track_caller]
    fn must(self) -> Self::Value {
        self.must_with(Dispatcher::global())
    }

    /// Return the value, or unwind through `dispatcher` without logging
    #[track_caller]
    fn must_with(self, dispatcher: &Dispatcher) -> Self::Value {
        dispatcher.settle(self, ActionKind::Abort, None)
    }
}

impl<T, E: Error + Send + Sync + 'static> Resolve for Result<T, E> {
    type Value = T;
    type Error = E;

    fn into_outcome(self) -> Result<T, Fault<E>> {
        self.map_err(Fault::Error)
    }
}

impl<T> Resolve for Option<T> {
    type Value = T;
    type Error = Infallible;

    fn into_outcome(self) -> Result<T, Fault<Infallible>> {
        self.ok_or(Fault::False)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::MemoryEmitter;
    use crate::handlers::EXIT_STATUS;
    use crate::signal::recover;
    use crate::testing::{RecordingExit, exit_status};
    use std::fs::File;
    use std::io;
    use std::num::ParseIntError;

    const MISSING: &str = "/nonexistent/faultline/config.toml";

    #[test]
    fn test_result_check() {
        let emitter = MemoryEmitter::new();
        let d = Dispatcher::with_emitter(emitter.clone());

        assert_eq!("12".parse::<u32>().check_with(&d).on_failure_record(()), (12, true));
        assert_eq!("x".parse::<u32>().check_with(&d).on_failure_record("parse"), (0, false));
        let signal = recover(|| "-".parse::<u32>().check_with(&d).on_failure_abort(())).unwrap_err();
        assert!(signal.downcast_ref::<ParseIntError>().is_some());
        assert_eq!(emitter.len(), 2);
    }

    #[test]
    fn test_option_check() {
        let emitter = MemoryEmitter::new();
        let d = Dispatcher::with_emitter(emitter.clone());

        assert_eq!(Some("a").check_with(&d).must_succeed(), "a");
        assert_eq!(None::<String>.check_with(&d).on_failure_record(()), (String::new(), false));
        assert_eq!(emitter.records()[0].message, "record FALSE");
    }

    #[test]
    fn test_bool_check() {
        let emitter = MemoryEmitter::new();
        let d = Dispatcher::with_emitter(emitter.clone());

        assert!(true.check_with(&d).on_failure_record(()));
        assert!(recover(|| false.check_with(&d).must_succeed()).unwrap_err().is_false());
        assert!(emitter.is_empty());
    }

    #[test]
    fn test_check_uses_global_dispatcher() {
        assert_eq!(Ok::<_, ParseIntError>(3).check().on_failure_abort(()), 3);
        assert!(Some(1).check().on_failure_record(()).1);
    }

    #[test]
    fn test_resolve_value_without_default() {
        let emitter = MemoryEmitter::new();
        let d = Dispatcher::with_emitter(emitter.clone());

        let signal = recover(|| File::open(MISSING).or_abort_with(&d, "open config")).unwrap_err();
        assert_eq!(signal.downcast_ref::<io::Error>().map(io::Error::kind), Some(io::ErrorKind::NotFound));
        let records = emitter.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "open config");
        assert!(records[0].attr("err").is_some());
    }

    #[test]
    fn test_resolve_none_aborts_with_false_sentinel() {
        let emitter = MemoryEmitter::new();
        let d = Dispatcher::with_emitter(emitter.clone());

        assert_eq!(Some(4).or_abort_with(&d, ()), 4);
        assert!(recover(|| None::<File>.or_abort_with(&d, ())).unwrap_err().is_false());
        assert_eq!(emitter.records()[0].message, "abort FALSE");
    }

    #[test]
    fn test_resolve_must_is_silent() {
        let emitter = MemoryEmitter::new();
        let d = Dispatcher::with_emitter(emitter.clone());

        assert_eq!(Ok::<_, io::Error>("x").must_with(&d), "x");
        let signal = recover(|| File::open(MISSING).must_with(&d)).unwrap_err();
        assert!(signal.downcast_ref::<io::Error>().is_some());
        assert!(recover(|| None::<File>.must()).unwrap_err().is_false());
        assert!(emitter.is_empty());
    }

    #[test]
    fn test_resolve_terminate_exits_once() {
        let emitter = MemoryEmitter::new();
        let exit = RecordingExit::default();
        let d = Dispatcher::new(emitter.clone(), exit.clone());

        let status = exit_status(|| File::open(MISSING).or_terminate_with(&d, Note::new("open").with("path", MISSING)));
        assert_eq!(status, Some(EXIT_STATUS));
        assert_eq!(exit.calls(), vec![EXIT_STATUS]);
        assert_eq!(emitter.len(), 1);
        assert_eq!(emitter.records()[0].kind, ActionKind::Terminate);
    }

    #[test]
    fn test_resolve_attributes_call_site() {
        let emitter = MemoryEmitter::new();
        let d = Dispatcher::with_emitter(emitter.clone());

        let line = line!() + 1;
        let _ = recover(|| None::<u8>.or_abort_with(&d, "missing"));
        assert_eq!(emitter.records()[0].file, file!());
        assert_eq!(emitter.records()[0].line, line);
    }
}
