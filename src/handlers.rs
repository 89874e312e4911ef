//! Action dispatch: turning a failure into a log line and a control transfer

use std::borrow::Cow;
use std::convert::Infallible;
use std::error::Error;
use std::fmt;
use std::panic::{self, Location};

use log::Level;
use once_cell::sync::OnceCell;

use crate::emitter::{Diagnostic, Emit, LogEmitter};
use crate::note::{Attr, AttrValue, Note};
use crate::result::{Failure, Flag, ValueFailure, ValueFlag};
use crate::signal::AbortSignal;
use crate::traits::Resolve;

/// Status passed to [`Exit::exit`] by terminating actions
pub const EXIT_STATUS: i32 = 1;

/// What to do with a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Log, then unwind with an [`AbortSignal`]
    Abort,
    /// Log, then end the process with [`EXIT_STATUS`]
    Terminate,
    /// Log, then return normally
    Record,
    /// Do nothing
    Suppress,
}

impl ActionKind {
    /// Lowercase name, used in synthesized messages
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Abort => "abort",
            ActionKind::Terminate => "terminate",
            ActionKind::Record => "record",
            ActionKind::Suppress => "suppress",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The failure handed to the dispatcher
#[derive(Debug)]
pub enum Fault<E> {
    /// An operation returned this error
    Error(E),
    /// A boolean outcome was false
    False,
}

/// Ends the process
pub trait Exit: Send + Sync {
    /// Terminate with `status`; never returns
    fn exit(&self, status: i32) -> !;
}

/// [`Exit`] through [`std::process::exit`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExit;

impl Exit for ProcessExit {
    fn exit(&self, status: i32) -> ! {
        log::logger().flush();
        std::process::exit(status)
    }
}

/// Returned when a global dispatcher is installed twice
#[derive(Debug, thiserror::Error)]
#[error("a global dispatcher is already installed")]
pub struct InstallError;

static GLOBAL: OnceCell<Dispatcher> = OnceCell::new();

/// Applies [`ActionKind`]s
///
/// A dispatcher owns the collaborators every action needs: an [`Emit`] for
/// diagnostics and an [`Exit`] for termination. Wrappers created through a
/// dispatcher borrow it until they are resolved.
///
/// The free functions ([`capture`](crate::capture) and friends) use the
/// global dispatcher, which logs through the `log` facade unless another one
/// was [installed](Dispatcher::install).
///
/// # Examples
///
/// ```rust
/// use faultline::{Dispatcher, MemoryEmitter, note};
///
/// let emitter = MemoryEmitter::new();
/// let dispatcher = Dispatcher::with_emitter(emitter.clone());
///
/// let missing: Option<std::io::Error> = Some(std::io::ErrorKind::NotFound.into());
/// let ok = dispatcher.capture_err(missing).on_failure_record(note!("stat", "path" => "/etc/x"));
/// assert!(!ok);
/// assert_eq!(emitter.records()[0].message, "stat");
/// ```
pub struct Dispatcher {
    emitter: Box<dyn Emit>,
    exit: Box<dyn Exit>,
}

impl Dispatcher {
    /// Create a dispatcher from its collaborators
    pub fn new(emitter: impl Emit + 'static, exit: impl Exit + 'static) -> Self {
        Self {
            emitter: Box::new(emitter),
            exit: Box::new(exit),
        }
    }

    /// Create a dispatcher that exits the real process
    pub fn with_emitter(emitter: impl Emit + 'static) -> Self {
        Self::new(emitter, ProcessExit)
    }

    /// The process-wide dispatcher used by the free functions
    pub fn global() -> &'static Dispatcher {
        GLOBAL.get_or_init(Dispatcher::default)
    }

    /// Make this the global dispatcher
    ///
    /// Only the first installation wins, and it must happen before anything
    /// uses [`Dispatcher::global`].
    pub fn install(self) -> Result<(), InstallError> {
        GLOBAL.set(self).map_err(|_| InstallError)
    }

    /// Capture a value and an optional error
    pub fn capture<T, E>(&self, value: T, err: Option<E>) -> ValueFailure<'_, T, E> {
        ValueFailure::new(self, value, err)
    }

    /// Capture a `Result`; an error leaves `T::default()` as the value
    pub fn capture_result<T: Default, E>(&self, result: Result<T, E>) -> ValueFailure<'_, T, E> {
        match result {
            Ok(value) => self.capture(value, None),
            Err(err) => self.capture(T::default(), Some(err)),
        }
    }

    /// Capture a value and an ok flag
    pub fn capture_flag<T>(&self, value: T, ok: bool) -> ValueFlag<'_, T> {
        ValueFlag::new(self, value, ok)
    }

    /// Capture an optional error
    pub fn capture_err<E>(&self, err: Option<E>) -> Failure<'_, E> {
        Failure::new(self, err)
    }

    /// Capture an ok flag
    pub fn capture_ok(&self, ok: bool) -> Flag<'_> {
        Flag::new(self, ok)
    }

    /// Apply `kind` to `fault`
    ///
    /// `note` is `None` for a silent dispatch: nothing is emitted but the
    /// control transfer still happens. `location` is the user frame the
    /// diagnostic is attributed to. Aborts unwind from the caller of this
    /// method, so a panic report names user code too.
    #[track_caller]
    pub fn dispatch<E>(
        &self,
        kind: ActionKind,
        fault: Fault<E>,
        note: Option<Note>,
        location: &'static Location<'static>,
    ) where
        E: Error + Send + Sync + 'static,
    {
        match kind {
            ActionKind::Suppress => {}
            ActionKind::Record => {
                if let Some(note) = note {
                    self.emit_fault(kind, &fault, note, location);
                }
            }
            ActionKind::Abort => self.raise(fault, note, location),
            ActionKind::Terminate => self.halt(fault, note, location),
        }
    }

    /// Resolve a wrapper: dispatch when `fault` is present, report success
    #[track_caller]
    pub(crate) fn resolve<E>(
        &self,
        kind: ActionKind,
        suppressed: bool,
        fault: Option<Fault<E>>,
        note: Option<Note>,
        location: &'static Location<'static>,
    ) -> bool
    where
        E: Error + Send + Sync + 'static,
    {
        let Some(fault) = fault else {
            return true;
        };
        let kind = if suppressed { ActionKind::Suppress } else { kind };
        self.dispatch(kind, fault, note, location);
        false
    }

    /// Settle an outcome that has no value to fall back on
    #[track_caller]
    pub(crate) fn settle<R: Resolve>(&self, outcome: R, kind: ActionKind, note: Option<Note>) -> R::Value {
        match outcome.into_outcome() {
            Ok(value) => value,
            Err(fault) if kind == ActionKind::Terminate => self.halt(fault, note, Location::caller()),
            Err(fault) => self.raise(fault, note, Location::caller()),
        }
    }

    #[track_caller]
    fn raise<E>(&self, fault: Fault<E>, note: Option<Note>, location: &'static Location<'static>) -> !
    where
        E: Error + Send + Sync + 'static,
    {
        if let Some(note) = note {
            self.emit_fault(ActionKind::Abort, &fault, note, location);
        }
        let signal = match fault {
            Fault::Error(err) => AbortSignal::Failed(Box::new(err)),
            Fault::False => AbortSignal::False,
        };
        panic::panic_any(signal)
    }

    #[track_caller]
    fn halt<E>(&self, fault: Fault<E>, note: Option<Note>, location: &'static Location<'static>) -> !
    where
        E: Error + Send + Sync + 'static,
    {
        self.emit_fault(ActionKind::Terminate, &fault, note.unwrap_or_default(), location);
        self.exit.exit(EXIT_STATUS)
    }

    fn emit_fault<E: Error>(
        &self,
        kind: ActionKind,
        fault: &Fault<E>,
        note: Note,
        location: &'static Location<'static>,
    ) {
        let (message, mut attrs) = note.into_parts();
        let message: Cow<'_, str> = match (message, fault) {
            (Some(message), _) => message.into(),
            (None, Fault::Error(_)) => kind.name().into(),
            (None, Fault::False) => format!("{} FALSE", kind.name()).into(),
        };
        if let Fault::Error(err) = fault {
            attrs.push(Attr::new("err", AttrValue::display(err)));
        }
        self.emit(kind, Level::Error, &message, &attrs, location);
    }

    fn emit(
        &self,
        kind: ActionKind,
        level: Level,
        message: &str,
        attrs: &[Attr],
        location: &'static Location<'static>,
    ) {
        self.emitter.emit(&Diagnostic {
            kind,
            level,
            message,
            attrs,
            location,
        });
    }

    /// Log `note` at info level
    #[track_caller]
    pub fn record(&self, note: impl Into<Note>) {
        let (message, attrs) = note.into().into_parts();
        let message = message.unwrap_or_else(|| ActionKind::Record.name().to_owned());
        self.emit(ActionKind::Record, Level::Info, &message, &attrs, Location::caller());
    }

    /// Log `note` as an error and unwind with [`AbortSignal::Explicit`]
    #[track_caller]
    pub fn abort(&self, note: impl Into<Note>) -> ! {
        let (message, attrs) = note.into().into_parts();
        let message = message.unwrap_or_else(|| ActionKind::Abort.name().to_owned());
        self.emit(ActionKind::Abort, Level::Error, &message, &attrs, Location::caller());
        panic::panic_any(AbortSignal::Explicit(message))
    }

    /// Log `note` as an error and end the process
    #[track_caller]
    pub fn terminate(&self, note: impl Into<Note>) -> ! {
        let (message, attrs) = note.into().into_parts();
        let message = message.unwrap_or_else(|| ActionKind::Terminate.name().to_owned());
        self.emit(ActionKind::Terminate, Level::Error, &message, &attrs, Location::caller());
        self.exit.exit(EXIT_STATUS)
    }

    /// Unwrap `result`, aborting silently on error
    #[track_caller]
    pub fn must<T, E>(&self, result: Result<T, E>) -> T
    where
        E: Error + Send + Sync + 'static,
    {
        match result {
            Ok(value) => value,
            Err(err) => self.raise(Fault::Error(err), None, Location::caller()),
        }
    }

    /// Fault type used for boolean outcomes
    pub(crate) fn false_fault() -> Fault<Infallible> {
        Fault::False
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(LogEmitter::default(), ProcessExit)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::MemoryEmitter;
    use crate::signal::recover;
    use crate::testing::{RecordingExit, exit_status};
    use std::io;

    fn dispatcher() -> (Dispatcher, MemoryEmitter, RecordingExit) {
        let emitter = MemoryEmitter::new();
        let exit = RecordingExit::default();
        (Dispatcher::new(emitter.clone(), exit.clone()), emitter, exit)
    }

    fn io_fault() -> Fault<io::Error> {
        Fault::Error(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
    }

    #[test]
    fn test_suppress_does_nothing() {
        let (d, emitter, exit) = dispatcher();
        d.dispatch(ActionKind::Suppress, io_fault(), Some(Note::new("x")), Location::caller());
        assert!(emitter.is_empty());
        assert!(exit.calls().is_empty());
    }

    #[test]
    fn test_record_with_message_appends_error() {
        let (d, emitter, _) = dispatcher();
        let note = Note::new("write config").with("path", "/etc/app");
        d.dispatch(ActionKind::Record, io_fault(), Some(note), Location::caller());

        let records = emitter.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "write config");
        assert_eq!(records[0].level, Level::Error);
        let keys: Vec<_> = records[0].attrs.iter().map(|a| a.key).collect();
        assert_eq!(keys, ["path", "err"]);
        assert_eq!(records[0].attr("err").unwrap().value, AttrValue::Str("denied".into()));
    }

    #[test]
    fn test_synthesized_messages() {
        let (d, emitter, _) = dispatcher();
        d.dispatch(ActionKind::Record, io_fault(), Some(Note::default()), Location::caller());
        d.dispatch(ActionKind::Record, Dispatcher::false_fault(), Some(Note::default()), Location::caller());

        let records = emitter.records();
        assert_eq!(records[0].message, "record");
        assert!(records[0].attr("err").is_some());
        assert_eq!(records[1].message, "record FALSE");
        assert!(records[1].attrs.is_empty());
    }

    #[test]
    fn test_abort_raises_original_error_after_logging() {
        let (d, emitter, _) = dispatcher();
        let signal = recover(|| d.dispatch(ActionKind::Abort, io_fault(), Some(Note::default()), Location::caller()))
            .unwrap_err();

        let err = signal.into_error::<io::Error>().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        let records = emitter.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "abort");
        assert_eq!(records[0].kind, ActionKind::Abort);
    }

    #[test]
    fn test_abort_on_false_raises_sentinel() {
        let (d, emitter, _) = dispatcher();
        let signal = recover(|| {
            d.dispatch(ActionKind::Abort, Dispatcher::false_fault(), Some(Note::default()), Location::caller())
        })
        .unwrap_err();
        assert!(signal.is_false());
        assert_eq!(emitter.records()[0].message, "abort FALSE");
    }

    #[test]
    fn test_silent_abort_emits_nothing() {
        let (d, emitter, _) = dispatcher();
        let signal = recover(|| d.dispatch(ActionKind::Abort, io_fault(), None, Location::caller())).unwrap_err();
        assert!(signal.downcast_ref::<io::Error>().is_some());
        assert!(emitter.is_empty());
    }

    #[test]
    fn test_terminate_logs_once_then_exits_with_status_one() {
        let (d, emitter, exit) = dispatcher();
        let status = exit_status(|| d.dispatch(ActionKind::Terminate, io_fault(), Some(Note::new("bye")), Location::caller()));
        assert_eq!(status, Some(EXIT_STATUS));
        assert_eq!(exit.calls(), [EXIT_STATUS]);
        assert_eq!(emitter.len(), 1);
        assert_eq!(emitter.records()[0].kind, ActionKind::Terminate);
    }

    #[test]
    fn test_direct_record_logs_at_info() {
        let (d, emitter, _) = dispatcher();
        let line = line!() + 1;
        d.record(Note::new("started").with("workers", 4u8));
        let records = emitter.records();
        assert_eq!(records[0].level, Level::Info);
        assert_eq!(records[0].line, line);
        assert_eq!(records[0].message, "started");
        assert_eq!(records[0].attrs, [Attr::new("workers", 4u8)]);
    }

    #[test]
    fn test_direct_abort_carries_message() {
        let (d, emitter, _) = dispatcher();
        let signal = recover(|| -> u8 { d.abort("unreachable state") }).unwrap_err();
        assert!(matches!(signal, AbortSignal::Explicit(ref m) if m == "unreachable state"));
        assert_eq!(emitter.records()[0].level, Level::Error);
    }

    #[test]
    fn test_direct_terminate_exits() {
        let (d, emitter, exit) = dispatcher();
        assert_eq!(exit_status(|| -> u8 { d.terminate(()) }), Some(EXIT_STATUS));
        assert_eq!(exit.calls().len(), 1);
        assert_eq!(emitter.records()[0].message, "terminate");
    }

    #[test]
    fn test_must_is_silent() {
        let (d, emitter, _) = dispatcher();
        assert_eq!(d.must(Ok::<_, io::Error>(3)), 3);
        let signal = recover(|| d.must(Err::<u8, _>(io::Error::other("boom")))).unwrap_err();
        assert_eq!(signal.to_string(), "aborted: boom");
        assert!(emitter.is_empty());
    }

    #[test]
    fn test_capture_result_defaults_value_on_error() {
        let (d, _, _) = dispatcher();
        let captured = d.capture_result(Err::<String, _>(io::Error::other("x")));
        assert!(captured.is_failure());
        let (value, ok) = captured.suppress(true).on_failure_record(());
        assert_eq!(value, "");
        assert!(!ok);
    }

    #[test]
    fn test_action_kind_names() {
        assert_eq!(ActionKind::Abort.to_string(), "abort");
        assert_eq!(ActionKind::Terminate.name(), "terminate");
        assert_eq!(ActionKind::Suppress.name(), "suppress");
    }
}
