//! Matching errors against known candidates
//!
//! An error matches a candidate if it is the candidate or wraps it, walking
//! the [`source`](Error::source) chain.

use std::error::Error;
use std::io;

/// The error followed by each of its transitive sources
pub fn chain<'a>(err: &'a (dyn Error + 'static)) -> impl Iterator<Item = &'a (dyn Error + 'static)> {
    std::iter::successors(Some(err), |&e| e.source())
}

/// True if `err` or one of its sources equals `candidate`
pub fn is<C>(err: &(dyn Error + 'static), candidate: &C) -> bool
where
    C: Error + PartialEq + 'static,
{
    chain(err).any(|e| e.downcast_ref::<C>() == Some(candidate))
}

/// True if `err` or one of its sources equals any of `candidates`
pub fn is_any<C>(err: &(dyn Error + 'static), candidates: &[C]) -> bool
where
    C: Error + PartialEq + 'static,
{
    chain(err)
        .filter_map(|e| e.downcast_ref::<C>())
        .any(|e| candidates.contains(e))
}

/// True if `err` or one of its sources has type `C`
pub fn is_kind<C: Error + 'static>(err: &(dyn Error + 'static)) -> bool {
    chain(err).any(|e| e.is::<C>())
}

/// Predicate matching any [`io::Error`] of `kind` in the chain
///
/// # Examples
///
/// ```rust
/// use faultline::{capture_err, filter};
/// use std::io::ErrorKind;
///
/// let gone = std::fs::remove_file("/definitely/not/here");
/// capture_err(gone.err())
///     .filter_with(filter::io_kind(ErrorKind::NotFound))
///     .must_succeed();
/// ```
pub fn io_kind(kind: io::ErrorKind) -> impl Fn(&(dyn Error + 'static)) -> bool {
    move |err: &(dyn Error + 'static)| {
        chain(err)
            .filter_map(|e| e.downcast_ref::<io::Error>())
            .any(|e| e.kind() == kind)
    }
}
