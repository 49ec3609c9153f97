//! Rendering of collected diagnostics.
//!
//! [`TerminalEmitter`] writes the human report, colored when the writer is
//! a terminal. [`JsonEmitter`] writes one JSON array for editors and CI.
//! Given the checked file's text, both show `line:column` positions.

mod json;
mod terminal;

pub use json::JsonEmitter;
pub use terminal::{ColorMode, TerminalEmitter};

use std::fmt;

use crate::span_utils::LineOffsetTable;
use crate::Diagnostic;

/// A sink for rendered diagnostics.
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);

    /// Emit in slice order. Callers pass diagnostics already sorted.
    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        diagnostics.iter().for_each(|d| self.emit(d));
    }

    fn flush(&mut self);

    /// Closing line after the last diagnostic, if the format has one.
    fn emit_summary(&mut self, error_count: usize);
}

/// The checked file's text and its line index.
pub(crate) struct SourceContext {
    pub(crate) text: String,
    pub(crate) lines: LineOffsetTable,
}

impl SourceContext {
    pub(crate) fn new(text: &str) -> Self {
        SourceContext {
            lines: LineOffsetTable::build(text),
            text: text.to_owned(),
        }
    }
}

/// `","` between list items, nothing after the last.
pub(crate) fn trailing_comma(index: usize, total: usize) -> &'static str {
    if index + 1 == total {
        ""
    } else {
        ","
    }
}

/// Displays a string as the body of a JSON string literal.
pub(crate) struct JsonStr<'a>(pub(crate) &'a str);

impl fmt::Display for JsonStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                c if c.is_control() => write!(f, "\\u{:04x}", u32::from(c))?,
                c => write!(f, "{c}")?,
            }
        }
        Ok(())
    }
}
