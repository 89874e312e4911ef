//! Result wrappers that carry a captured outcome to its terminal action
//!
//! Every wrapper is an immutable value: configuration methods take `self`
//! and hand back the updated wrapper, and a terminal method consumes it.
//!
//! | Wrapper | Payload | Fails when |
//! |---|---|---|
//! | [`ValueFailure`] | `T` and `Option<E>` | the error is `Some` |
//! | [`ValueFlag`] | `T` and `bool` | the flag is `false` |
//! | [`Failure`] | `Option<E>` | the error is `Some` |
//! | [`Flag`] | `bool` | the flag is `false` |
//!
//! A wrapper that is never resolved has no effect at all.

use std::error::Error;
use std::panic::Location;

use crate::filter;
use crate::handlers::{ActionKind, Dispatcher, Fault};
use crate::note::Note;

/// A value together with an optional error
///
/// # Examples
///
/// ```rust
/// use faultline::capture;
///
/// let port = capture(8080u16, None::<std::num::ParseIntError>).on_failure_abort("parse port");
/// assert_eq!(port, 8080);
/// ```
#[derive(Debug, Clone)]
#[must_use = "a captured outcome does nothing until a terminal method resolves it"]
pub struct ValueFailure<'d, T, E> {
    value: T,
    err: Option<E>,
    suppressed: bool,
    dispatcher: &'d Dispatcher,
}

impl<'d, T, E> ValueFailure<'d, T, E> {
    pub(crate) fn new(dispatcher: &'d Dispatcher, value: T, err: Option<E>) -> Self {
        Self {
            value,
            err,
            suppressed: false,
            dispatcher,
        }
    }

    /// True if an error was captured and not filtered out
    pub fn is_failure(&self) -> bool {
        self.err.is_some()
    }

    /// True if terminal methods will skip every effect
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// The captured error, if any
    pub fn error(&self) -> Option<&E> {
        self.err.as_ref()
    }

    /// Set whether failures are ignored
    pub fn suppress(mut self, suppressed: bool) -> Self {
        self.suppressed = suppressed;
        self
    }
}

impl<T, E: Error + 'static> ValueFailure<'_, T, E> {
    /// Treat the error as success if it is, or wraps, one of `candidates`
    pub fn filter<C>(self, candidates: &[C]) -> Self
    where
        C: Error + PartialEq + 'static,
    {
        self.filter_with(|err| filter::is_any(err, candidates))
    }

    /// Treat the error as success if it is, or wraps, an error of type `C`
    pub fn filter_kind<C: Error + 'static>(self) -> Self {
        self.filter_with(filter::is_kind::<C>)
    }

    /// Treat the error as success if `matches` accepts it
    pub fn filter_with<F>(mut self, matches: F) -> Self
    where
        F: Fn(&(dyn Error + 'static)) -> bool,
    {
        if self.err.as_ref().is_some_and(|err| matches(err)) {
            self.err = None;
        }
        self
    }
}

impl<T, E: Error + Send + Sync + 'static> ValueFailure<'_, T, E> {
    /// Return the value, or log and unwind with the error
    #[track_caller]
    pub fn on_failure_abort(self, note: impl Into<Note>) -> T {
        self.resolve(ActionKind::Abort, Some(note.into()), Location::caller()).0
    }

    /// Return the value, or log and end the process
    #[track_caller]
    pub fn on_failure_terminate(self, note: impl Into<Note>) -> T {
        self.resolve(ActionKind::Terminate, Some(note.into()), Location::caller()).0
    }

    /// Return the value and whether the operation succeeded, logging failures
    #[track_caller]
    pub fn on_failure_record(self, note: impl Into<Note>) -> (T, bool) {
        self.resolve(ActionKind::Record, Some(note.into()), Location::caller())
    }

    /// Return the value, or unwind without logging
    #[track_caller]
    pub fn must_succeed(self) -> T {
        self.resolve(ActionKind::Abort, None, Location::caller()).0
    }

    #[track_caller]
    fn resolve(self, kind: ActionKind, note: Option<Note>, location: &'static Location<'static>) -> (T, bool) {
        let ok = self
            .dispatcher
            .resolve(kind, self.suppressed, self.err.map(Fault::Error), note, location);
        (self.value, ok)
    }
}

/// A value together with an ok flag
#[derive(Debug, Clone)]
#[must_use = "a captured outcome does nothing until a terminal method resolves it"]
pub struct ValueFlag<'d, T> {
    value: T,
    ok: bool,
    suppressed: bool,
    dispatcher: &'d Dispatcher,
}

impl<'d, T> ValueFlag<'d, T> {
    pub(crate) fn new(dispatcher: &'d Dispatcher, value: T, ok: bool) -> Self {
        Self {
            value,
            ok,
            suppressed: false,
            dispatcher,
        }
    }

    /// True if the flag was false
    pub fn is_failure(&self) -> bool {
        !self.ok
    }

    /// True if terminal methods will skip every effect
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Set whether failures are ignored
    pub fn suppress(mut self, suppressed: bool) -> Self {
        self.suppressed = suppressed;
        self
    }

    /// Return the value, or log and unwind with [`AbortSignal::False`](crate::AbortSignal::False)
    #[track_caller]
    pub fn on_failure_abort(self, note: impl Into<Note>) -> T {
        self.resolve(ActionKind::Abort, Some(note.into()), Location::caller()).0
    }

    /// Return the value, or log and end the process
    #[track_caller]
    pub fn on_failure_terminate(self, note: impl Into<Note>) -> T {
        self.resolve(ActionKind::Terminate, Some(note.into()), Location::caller()).0
    }

    /// Return the value and the flag, logging when it is false
    #[track_caller]
    pub fn on_failure_record(self, note: impl Into<Note>) -> (T, bool) {
        self.resolve(ActionKind::Record, Some(note.into()), Location::caller())
    }

    /// Return the value, or unwind without logging
    #[track_caller]
    pub fn must_succeed(self) -> T {
        self.resolve(ActionKind::Abort, None, Location::caller()).0
    }

    #[track_caller]
    fn resolve(self, kind: ActionKind, note: Option<Note>, location: &'static Location<'static>) -> (T, bool) {
        let fault = (!self.ok).then(Dispatcher::false_fault);
        let ok = self.dispatcher.resolve(kind, self.suppressed, fault, note, location);
        (self.value, ok)
    }
}

/// An optional error with no value attached
#[derive(Debug, Clone)]
#[must_use = "a captured outcome does nothing until a terminal method resolves it"]
pub struct Failure<'d, E> {
    err: Option<E>,
    suppressed: bool,
    dispatcher: &'d Dispatcher,
}

impl<'d, E> Failure<'d, E> {
    pub(crate) fn new(dispatcher: &'d Dispatcher, err: Option<E>) -> Self {
        Self {
            err,
            suppressed: false,
            dispatcher,
        }
    }

    /// True if an error was captured and not filtered out
    pub fn is_failure(&self) -> bool {
        self.err.is_some()
    }

    /// True if terminal methods will skip every effect
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// The captured error, if any
    pub fn error(&self) -> Option<&E> {
        self.err.as_ref()
    }

    /// Set whether failures are ignored
    pub fn suppress(mut self, suppressed: bool) -> Self {
        self.suppressed = suppressed;
        self
    }
}

impl<E: Error + 'static> Failure<'_, E> {
    /// Treat the error as success if it is, or wraps, one of `candidates`
    pub fn filter<C>(self, candidates: &[C]) -> Self
    where
        C: Error + PartialEq + 'static,
    {
        self.filter_with(|err| filter::is_any(err, candidates))
    }

    /// Treat the error as success if it is, or wraps, an error of type `C`
    pub fn filter_kind<C: Error + 'static>(self) -> Self {
        self.filter_with(filter::is_kind::<C>)
    }

    /// Treat the error as success if `matches` accepts it
    pub fn filter_with<F>(mut self, matches: F) -> Self
    where
        F: Fn(&(dyn Error + 'static)) -> bool,
    {
        if self.err.as_ref().is_some_and(|err| matches(err)) {
            self.err = None;
        }
        self
    }
}

impl<E: Error + Send + Sync + 'static> Failure<'_, E> {
    /// Log and unwind with the error, if there is one
    #[track_caller]
    pub fn on_failure_abort(self, note: impl Into<Note>) {
        self.resolve(ActionKind::Abort, Some(note.into()), Location::caller());
    }

    /// Log and end the process if there is an error
    #[track_caller]
    pub fn on_failure_terminate(self, note: impl Into<Note>) {
        self.resolve(ActionKind::Terminate, Some(note.into()), Location::caller());
    }

    /// Log the error, if any, and report whether there was none
    #[track_caller]
    pub fn on_failure_record(self, note: impl Into<Note>) -> bool {
        self.resolve(ActionKind::Record, Some(note.into()), Location::caller())
    }

    /// Unwind without logging if there is an error
    #[track_caller]
    pub fn must_succeed(self) {
        self.resolve(ActionKind::Abort, None, Location::caller());
    }

    #[track_caller]
    fn resolve(self, kind: ActionKind, note: Option<Note>, location: &'static Location<'static>) -> bool {
        self.dispatcher
            .resolve(kind, self.suppressed, self.err.map(Fault::Error), note, location)
    }
}

/// A bare ok flag
///
/// # Examples
///
/// ```rust
/// use faultline::capture_ok;
///
/// let verbose = false;
/// let ok = capture_ok(verbose).suppress(true).on_failure_record("verbose is off");
/// assert!(!ok);
/// ```
#[derive(Debug, Clone, Copy)]
#[must_use = "a captured outcome does nothing until a terminal method resolves it"]
pub struct Flag<'d> {
    ok: bool,
    suppressed: bool,
    dispatcher: &'d Dispatcher,
}

impl<'d> Flag<'d> {
    pub(crate) fn new(dispatcher: &'d Dispatcher, ok: bool) -> Self {
        Self {
            ok,
            suppressed: false,
            dispatcher,
        }
    }

    /// True if the flag was false
    pub fn is_failure(&self) -> bool {
        !self.ok
    }

    /// True if terminal methods will skip every effect
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Set whether failures are ignored
    pub fn suppress(mut self, suppressed: bool) -> Self {
        self.suppressed = suppressed;
        self
    }

    /// Log and unwind with [`AbortSignal::False`](crate::AbortSignal::False) if the flag is false
    #[track_caller]
    pub fn on_failure_abort(self, note: impl Into<Note>) {
        self.resolve(ActionKind::Abort, Some(note.into()), Location::caller());
    }

    /// Log and end the process if the flag is false
    #[track_caller]
    pub fn on_failure_terminate(self, note: impl Into<Note>) {
        self.resolve(ActionKind::Terminate, Some(note.into()), Location::caller());
    }

    /// Log if the flag is false; returns the flag
    #[track_caller]
    pub fn on_failure_record(self, note: impl Into<Note>) -> bool {
        self.resolve(ActionKind::Record, Some(note.into()), Location::caller())
    }

    /// Unwind without logging if the flag is false
    #[track_caller]
    pub fn must_succeed(self) {
        self.resolve(ActionKind::Abort, None, Location::caller());
    }

    #[track_caller]
    fn resolve(self, kind: ActionKind, note: Option<Note>, location: &'static Location<'static>) -> bool {
        let fault = (!self.ok).then(Dispatcher::false_fault);
        self.dispatcher.resolve(kind, self.suppressed, fault, note, location)
    }
}
