//! The unwind payload raised by aborts, and the boundaries that catch it

use std::error::Error;
use std::panic::{self, AssertUnwindSafe, Location};

/// Payload of an abort unwind
///
/// Aborts raised for a captured error carry that error unchanged; aborts
/// raised for a `false` outcome carry [`AbortSignal::False`], which never
/// compares equal to a domain error. Catch it with [`recover`] or
/// `#[abort_boundary]`.
#[derive(Debug, thiserror::Error)]
pub enum AbortSignal {
    /// An operation returned an error
    #[error("aborted: {0}")]
    Failed(#[source] Box<dyn Error + Send + Sync + 'static>),
    /// A checked condition was false
    #[error("aborted: condition was false")]
    False,
    /// Raised directly with a message
    #[error("aborted: {0}")]
    Explicit(String),
}

impl AbortSignal {
    /// True for the boolean-fault sentinel
    pub fn is_false(&self) -> bool {
        matches!(self, AbortSignal::False)
    }

    /// The captured error, if the abort came from one
    pub fn error(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        match self {
            AbortSignal::Failed(err) => Some(&**err),
            _ => None,
        }
    }

    /// Borrow the captured error as a concrete type
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.error().and_then(|err| err.downcast_ref::<E>())
    }

    /// Take back the captured error as a concrete type
    ///
    /// Returns the signal unchanged if it does not carry an `E`.
    pub fn into_error<E: Error + 'static>(self) -> Result<E, Self> {
        match self {
            AbortSignal::Failed(err) => err
                .downcast::<E>()
                .map(|boxed| *boxed)
                .map_err(AbortSignal::Failed),
            other => Err(other),
        }
    }
}

/// Run `f`, turning an abort unwind into `Err`
///
/// Panics that are not aborts keep unwinding. Unlike
/// [`catch_unwind`](std::panic::catch_unwind), `f` does not have to be
/// `UnwindSafe`: an abort is an expected exit from the closure, not a broken
/// invariant.
///
/// # Examples
///
/// ```rust
/// use faultline::{capture_ok, recover};
///
/// let signal = recover(|| capture_ok(1 + 1 == 3).on_failure_abort(())).unwrap_err();
/// assert!(signal.is_false());
/// ```
pub fn recover<F, R>(f: F) -> Result<R, AbortSignal>
where
    F: FnOnce() -> R,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Ok(value),
        Err(payload) => match payload.downcast::<AbortSignal>() {
            Ok(signal) => Err(*signal),
            Err(other) => panic::resume_unwind(other),
        },
    }
}

/// Keep the panic hook from reporting abort unwinds
///
/// Aborts have already been logged by the dispatcher; every other panic is
/// still passed to the previously installed hook. Use this when every abort
/// is caught by [`recover`] or `#[abort_boundary]`, or when a logger is
/// installed. Otherwise prefer [`report_aborts`].
pub fn silence_abort_reports() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if info.payload().downcast_ref::<AbortSignal>().is_none() {
            previous(info);
        }
    }));
}

/// Report uncaught aborts as one readable line on stderr
///
/// The default hook prints `Box<dyn Any>` for an [`AbortSignal`] payload.
/// This hook prints `aborted at file:line: <signal>` instead, naming the
/// terminal method's caller. Other panics go to the previously installed
/// hook.
pub fn report_aborts() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| match info.payload().downcast_ref::<AbortSignal>() {
        Some(signal) => eprintln!("{}", abort_report(signal, info.location())),
        None => previous(info),
    }));
}

fn abort_report(signal: &AbortSignal, location: Option<&Location<'_>>) -> String {
    let cause = match signal {
        AbortSignal::Failed(err) => err.to_string(),
        AbortSignal::False => "condition was false".to_owned(),
        AbortSignal::Explicit(message) => message.clone(),
    };
    match location {
        Some(location) => format!("aborted at {}:{}: {}", location.file(), location.line(), cause),
        None => format!("aborted: {cause}"),
    }
}
