//! Fluent handling of failed operations
//!
//! This crate turns the two usual failure shapes, a value with an optional
//! error and a value with an ok flag, into one expression that says what to
//! do when the operation failed: abort (unwind), terminate the process, or
//! record a diagnostic and carry on.
//!
//! ```rust
//! use faultline::{capture, capture_ok, note, Check};
//! use std::io::ErrorKind;
//!
//! let config = std::fs::read_to_string("/etc/faultline-example.toml")
//!     .check()
//!     .filter_with(faultline::filter::io_kind(ErrorKind::NotFound))
//!     .on_failure_abort(note!("read config", "path" => "/etc/faultline-example.toml"));
//!
//! let (value, ok) = capture(7, None::<std::io::Error>).on_failure_record(());
//! assert_eq!((value, ok), (7, true));
//!
//! capture_ok(!config.contains('\0')).on_failure_record("config contains NUL");
//! ```
//!
//! Terminal methods are no-ops when the outcome succeeded or the wrapper was
//! [suppressed](ValueFailure::suppress). Diagnostics are attributed to the
//! line that called the terminal method, and so is the unwind an abort
//! starts.
//!
//! With no logger installed, the default [`LogEmitter`] writes diagnostics
//! to stderr. An abort nobody catches reaches the panic hook;
//! [`report_aborts`] prints it as one readable line and
//! [`silence_abort_reports`] hides it.

#![deny(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate self as faultline;

// Core modules
mod note;
mod result;
mod handlers;
mod macros;
pub mod emitter;
pub mod filter;
pub mod signal;
pub mod traits;

#[cfg(test)]
mod testing;

use std::error::Error;

// Re-export public API
pub use note::{Attr, AttrValue, Note};
pub use result::{Failure, Flag, ValueFailure, ValueFlag};
pub use handlers::{ActionKind, Dispatcher, Exit, Fault, InstallError, ProcessExit, EXIT_STATUS};
pub use emitter::{Captured, Diagnostic, Emit, LogEmitter, MemoryEmitter};
pub use signal::{recover, report_aborts, silence_abort_reports, AbortSignal};
pub use traits::{Check, Resolve};

// Re-export the proc macro
#[cfg(feature = "macros")]
#[cfg_attr(docsrs, doc(cfg(feature = "macros")))]
pub use faultline_macros::abort_boundary;

/// Capture a value and an optional error
pub fn capture<T, E>(value: T, err: Option<E>) -> ValueFailure<'static, T, E> {
    Dispatcher::global().capture(value, err)
}

/// Capture a `Result`, using `T::default()` as the value on error
pub fn capture_result<T: Default, E>(result: Result<T, E>) -> ValueFailure<'static, T, E> {
    Dispatcher::global().capture_result(result)
}

/// Capture a value and an ok flag
pub fn capture_flag<T>(value: T, ok: bool) -> ValueFlag<'static, T> {
    Dispatcher::global().capture_flag(value, ok)
}

/// Capture an optional error
pub fn capture_err<E>(err: Option<E>) -> Failure<'static, E> {
    Dispatcher::global().capture_err(err)
}

/// Capture an ok flag
pub fn capture_ok(ok: bool) -> Flag<'static> {
    Dispatcher::global().capture_ok(ok)
}

/// Log `note` at info level
#[track_caller]
pub fn record(note: impl Into<Note>) {
    Dispatcher::global().record(note)
}

/// Log `note` as an error and unwind with [`AbortSignal::Explicit`]
#[track_caller]
pub fn abort(note: impl Into<Note>) -> ! {
    Dispatcher::global().abort(note)
}

/// Log `note` as an error and end the process with [`EXIT_STATUS`]
#[track_caller]
pub fn terminate(note: impl Into<Note>) -> ! {
    Dispatcher::global().terminate(note)
}

/// Unwrap `result`, unwinding without a diagnostic on error
///
/// For invariants whose violation is a bug rather than an operational
/// failure.
#[track_caller]
pub fn must<T, E>(result: Result<T, E>) -> T
where
    E: Error + Send + Sync + 'static,
{
    Dispatcher::global().must(result)
}
