//! Rendering diagnostics and handing them to a logging backend

use std::fmt::Write as _;
use std::panic::Location;
use std::sync::{Arc, Mutex, PoisonError};

use log::{Level, LevelFilter};

use crate::handlers::ActionKind;
use crate::note::Attr;

/// One record about to be emitted
#[derive(Debug, Clone, Copy)]
pub struct Diagnostic<'a> {
    /// The action that produced the record
    pub kind: ActionKind,
    /// Severity
    pub level: Level,
    /// Caller supplied or synthesized message
    pub message: &'a str,
    /// Attributes in the order they were supplied, the failure last
    pub attrs: &'a [Attr],
    /// The user code that invoked the terminal method
    pub location: &'static Location<'static>,
}

impl Diagnostic<'_> {
    /// Render as `message key=value key=value`
    pub fn render(&self) -> String {
        let mut out = String::from(self.message);
        for attr in self.attrs {
            let _ = write!(out, " {}", attr);
        }
        out
    }
}

/// A sink for diagnostics
///
/// Implementations must not panic: the dispatcher calls `emit` right before
/// unwinding or exiting.
pub trait Emit: Send + Sync {
    /// Emit one diagnostic
    fn emit(&self, diagnostic: &Diagnostic<'_>);
}

/// Emitter backed by the `log` facade
///
/// The record's file and line are taken from the diagnostic's location, so
/// the log line points at the call site rather than at this crate.
///
/// Until a logger is installed, `log` drops everything. So that an abort or
/// terminate is never silent, diagnostics are then written to stderr as
/// `LEVEL file:line: message`. [`LogEmitter::without_fallback`] turns that
/// off. Levels above `log::max_level()` or the compile-time
/// `log::STATIC_MAX_LEVEL` are dropped either way.
#[derive(Debug, Clone)]
pub struct LogEmitter {
    target: &'static str,
    fallback: bool,
}

impl LogEmitter {
    /// Log under a custom target instead of `faultline`
    pub fn with_target(target: &'static str) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Drop diagnostics instead of writing them to stderr when no logger is set
    pub fn without_fallback(mut self) -> Self {
        self.fallback = false;
        self
    }

    /// The log target records are emitted under
    pub fn target(&self) -> &'static str {
        self.target
    }
}

impl Default for LogEmitter {
    fn default() -> Self {
        Self {
            target: "faultline",
            fallback: true,
        }
    }
}

/// Where a diagnostic of a given level ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Log,
    Stderr,
    Drop,
}

fn route(level: Level, max: LevelFilter, static_max: LevelFilter, fallback: bool) -> Route {
    if level > static_max {
        Route::Drop
    } else if max == LevelFilter::Off {
        // `max_level` stays `Off` until a logger sets it
        if fallback { Route::Stderr } else { Route::Drop }
    } else if level > max {
        Route::Drop
    } else {
        Route::Log
    }
}

impl Emit for LogEmitter {
    fn emit(&self, diagnostic: &Diagnostic<'_>) {
        let location = diagnostic.location;
        match route(diagnostic.level, log::max_level(), log::STATIC_MAX_LEVEL, self.fallback) {
            Route::Drop => {}
            Route::Stderr => eprintln!(
                "{} {}:{}: {}",
                diagnostic.level,
                location.file(),
                location.line(),
                diagnostic.render()
            ),
            Route::Log => log::logger().log(
                &log::Record::builder()
                    .args(format_args!("{}", diagnostic.render()))
                    .level(diagnostic.level)
                    .target(self.target)
                    .file(Some(location.file()))
                    .line(Some(location.line()))
                    .module_path(None)
                    .build(),
            ),
        }
    }
}

/// An owned copy of an emitted diagnostic
#[derive(Debug, Clone, PartialEq)]
pub struct Captured {
    /// The action that produced the record
    pub kind: ActionKind,
    /// Severity
    pub level: Level,
    /// Message text
    pub message: String,
    /// Attributes in emission order
    pub attrs: Vec<Attr>,
    /// Source file of the call site
    pub file: &'static str,
    /// Line of the call site
    pub line: u32,
}

impl Captured {
    /// Look up an attribute by key
    pub fn attr(&self, key: &str) -> Option<&Attr> {
        self.attrs.iter().find(|a| a.key == key)
    }
}

/// Emitter that keeps every diagnostic in memory
///
/// Clones share the same buffer, so a test can hand one clone to a
/// [`Dispatcher`](crate::Dispatcher) and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryEmitter {
    records: Arc<Mutex<Vec<Captured>>>,
}

impl MemoryEmitter {
    /// Create an empty emitter
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything emitted so far
    pub fn records(&self) -> Vec<Captured> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of diagnostics emitted so far
    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True if nothing was emitted
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Emit for MemoryEmitter {
    fn emit(&self, diagnostic: &Diagnostic<'_>) {
        let captured = Captured {
            kind: diagnostic.kind,
            level: diagnostic.level,
            message: diagnostic.message.to_owned(),
            attrs: diagnostic.attrs.to_vec(),
            file: diagnostic.location.file(),
            line: diagnostic.location.line(),
        };
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(captured);
    }
}
