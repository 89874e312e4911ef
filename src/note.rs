//! Messages and typed attributes attached to a diagnostic

use std::fmt;

/// A printable attribute value
///
/// The set of value kinds is closed so that every attribute can be rendered
/// without runtime type checks. Anything else implementing `Display` goes
/// through [`AttrValue::display`].
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// A text value
    Str(String),
    /// A signed integer
    Int(i64),
    /// An unsigned integer
    Uint(u64),
    /// A floating point number
    Float(f64),
    /// A boolean
    Bool(bool),
}

impl AttrValue {
    /// Render any `Display` value as a text attribute
    pub fn display(value: impl fmt::Display) -> Self {
        AttrValue::Str(value.to_string())
    }

    fn needs_quotes(s: &str) -> bool {
        s.is_empty() || s.chars().any(|c| c.is_whitespace() || c == '=' || c == '"')
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(s) if Self::needs_quotes(s) => write!(f, "{:?}", s),
            AttrValue::Str(s) => f.write_str(s),
            AttrValue::Int(n) => write!(f, "{}", n),
            AttrValue::Uint(n) => write!(f, "{}", n),
            AttrValue::Float(n) => write!(f, "{}", n),
            AttrValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        AttrValue::Str(value.clone())
    }
}

impl From<char> for AttrValue {
    fn from(value: char) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

macro_rules! attr_value_from {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for AttrValue {
                fn from(value: $source) -> Self {
                    AttrValue::$variant(value as $target)
                }
            }
        )+
    };
}

attr_value_from!(Int as i64: i8, i16, i32, i64, isize);
attr_value_from!(Uint as u64: u8, u16, u32, u64, usize);
attr_value_from!(Float as f64: f32, f64);

/// A single key-value pair
#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    /// The attribute name
    pub key: &'static str,
    /// The attribute value
    pub value: AttrValue,
}

impl Attr {
    /// Create an attribute
    pub fn new(key: &'static str, value: impl Into<AttrValue>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// What a call site wants said about a failure
///
/// A note is an optional message plus an ordered list of attributes. When the
/// message is missing the dispatcher synthesizes one, so even `()` produces a
/// useful log line.
///
/// # Examples
///
/// ```rust
/// use faultline::{note, Note};
///
/// let a = Note::new("open file").with("path", "/tmp/x").with("mode", 0o600);
/// let b = note!("open file", "path" => "/tmp/x", "mode" => 0o600);
/// assert_eq!(a, b);
/// assert_eq!(Note::from(()).message(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Note {
    message: Option<String>,
    attrs: Vec<Attr>,
}

impl Note {
    /// Create a note with a message and no attributes
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            attrs: Vec::new(),
        }
    }

    /// Append an attribute
    pub fn with(mut self, key: &'static str, value: impl Into<AttrValue>) -> Self {
        self.attrs.push(Attr::new(key, value));
        self
    }

    /// The caller supplied message, if any
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The attributes in insertion order
    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Vec<Attr>) {
        (self.message, self.attrs)
    }
}

impl From<()> for Note {
    fn from(_: ()) -> Self {
        Note::default()
    }
}

impl From<&str> for Note {
    fn from(message: &str) -> Self {
        Note::new(message)
    }
}

impl From<String> for Note {
    fn from(message: String) -> Self {
        Note::new(message)
    }
}
