//! Small demo: summarize text files, failing the faultline way
//!
//! ```text
//! FAULTLINE_STRICT=1 FAULTLINE_PORT=8080 RUST_LOG=info faultline Cargo.toml missing.txt
//! ```

use std::env;
use std::fs;
use std::io::ErrorKind;

use faultline::{abort_boundary, capture_ok, filter, note, record, Check, Dispatcher};

#[abort_boundary]
fn parse_port(raw: &str) -> u16 {
    let port = raw.parse::<u16>().check().on_failure_abort(note!("parse port", "raw" => raw));
    capture_ok(port != 0).on_failure_abort(note!("port must not be zero"));
    port
}

/// One line describing `path`, or `None` if it was skipped
///
/// Lenient mode treats a missing file like an empty one and logs nothing for
/// either. Strict mode records a missing file and terminates on an empty one.
fn summarize(dispatcher: &Dispatcher, path: &str, strict: bool) -> Option<String> {
    let not_found = filter::io_kind(ErrorKind::NotFound);
    let (text, ok) = fs::read_to_string(path)
        .check_with(dispatcher)
        .filter_with(|err| !strict && not_found(err))
        .on_failure_record(note!("read file", "path" => path));
    if !ok {
        return None;
    }

    let first = text
        .lines()
        .next()
        .check_with(dispatcher)
        .suppress(!strict)
        .on_failure_terminate(note!("empty file", "path" => path));

    Some(format!("{path}: {} lines, first line {:?}", text.lines().count(), first))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    faultline::silence_abort_reports();

    let strict = env::var_os("FAULTLINE_STRICT").is_some();
    let paths: Vec<String> = env::args().skip(1).collect();
    capture_ok(!paths.is_empty()).on_failure_terminate("usage: faultline <file>...");

    if let Ok(raw) = env::var("FAULTLINE_PORT") {
        match parse_port(&raw) {
            Ok(port) => record(note!("listening", "port" => port)),
            Err(signal) => log::warn!("ignoring FAULTLINE_PORT: {signal}"),
        }
    }

    for path in &paths {
        if let Some(line) = summarize(Dispatcher::global(), path, strict) {
            println!("{line}");
        }
    }
}
