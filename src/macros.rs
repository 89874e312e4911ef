//! Note construction macro

/// Build a [`Note`](crate::Note) from a message and `key => value` pairs
///
/// `note!()` is an empty note, which makes the dispatcher synthesize a
/// message.
///
/// # Examples
///
/// ```rust
/// use faultline::{capture_err, note};
///
/// let path = "/etc/hosts";
/// capture_err(std::fs::metadata(path).err())
///     .on_failure_record(note!("stat", "path" => path, "attempt" => 1));
/// ```
#[macro_export]
macro_rules! note {
    () => {
        $crate::Note::default()
    };
    ($message:expr $(, $key:literal => $value:expr)* $(,)?) => {
        $crate::Note::new($message)$(.with($key, $value))*
    };
}
