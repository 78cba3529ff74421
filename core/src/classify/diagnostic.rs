use lazy_static::lazy_static;
use regex::Regex;

use crate::model::{Diagnostic, Severity};

lazy_static! {
    /// `path:line:col: error|warning: message`; the path capture is greedy so
    /// paths containing `:` still resolve to the last numeric pair.
    static ref DIAGNOSTIC_RE: Regex =
        Regex::new(r"^(.+):(\d+):(\d+): (error|warning): (.*)$").expect("static regex");
}

/// Parse a compiler diagnostic line. Returns `None` for anything else.
pub fn parse_diagnostic(line: &str) -> Option<(Severity, Diagnostic)> {
    let caps = DIAGNOSTIC_RE.captures(line)?;
    let file = caps.get(1)?.as_str();
    let line_no = caps.get(2)?.as_str().parse::<u32>().ok()?;
    let column = caps.get(3)?.as_str().parse::<u32>().ok()?;
    let severity = match caps.get(4)?.as_str() {
        "error" => Severity::Error,
        _ => Severity::Warning,
    };
    let message = caps.get(5).map(|m| m.as_str()).unwrap_or_default();
    Some((severity, Diagnostic::new(file, line_no, column, message)))
}
