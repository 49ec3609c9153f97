//! JSON Emitter
//!
//! Machine-readable diagnostic output in JSON format. Each diagnostic
//! carries its code, kind and phase so tools can filter without parsing
//! messages; `fixes` lists the span edits a tool may offer.

use std::io::Write;

use vex_ir::Span;

use crate::span_utils::resolve;
use crate::{Diagnostic, Label, Suggestion};

use super::{trailing_comma, DiagnosticEmitter, JsonStr, SourceContext};

/// JSON emitter for machine-readable output.
///
/// Output is one array; call [`begin`](Self::begin) before the first
/// diagnostic and [`end`](Self::end) after the last.
pub struct JsonEmitter<W: Write> {
    writer: W,
    first: bool,
    source: Option<SourceContext>,
}

impl<W: Write> JsonEmitter<W> {
    pub fn new(writer: W) -> Self {
        JsonEmitter {
            writer,
            first: true,
            source: None,
        }
    }

    /// Attach source text so spans include `line`/`column`.
    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(SourceContext::new(source));
        self
    }

    pub fn begin(&mut self) {
        let _ = writeln!(self.writer, "[");
    }

    pub fn end(&mut self) {
        let _ = writeln!(self.writer, "\n]");
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// `"start": s, "end": e` plus `line`/`column` when source is known.
    fn span_fields(&self, span: Span) -> String {
        let mut fields = format!("\"start\": {}, \"end\": {}", span.start, span.end);
        if let Some(source) = &self.source {
            let pos = resolve(&source.lines, &source.text, span);
            fields.push_str(&format!(", \"line\": {}, \"column\": {}", pos.line, pos.column));
        }
        fields
    }

    fn write_label(&mut self, label: &Label, comma: &str) {
        let span = self.span_fields(label.span);
        let _ = writeln!(
            self.writer,
            "      {{ {span}, \"message\": \"{}\", \"primary\": {} }}{comma}",
            JsonStr(&label.message),
            label.is_primary
        );
    }

    fn write_fix(&mut self, fix: &Suggestion, comma: &str) {
        let span = self.span_fields(fix.span);
        let _ = writeln!(
            self.writer,
            "      {{ {span}, \"message\": \"{}\", \"replacement\": \"{}\", \
             \"applicability\": \"{}\" }}{comma}",
            JsonStr(&fix.message),
            JsonStr(&fix.replacement),
            fix.applicability.as_str()
        );
    }

    fn write_strings(&mut self, key: &str, items: &[String], last: bool) {
        let _ = writeln!(self.writer, "    \"{key}\": [");
        for (i, item) in items.iter().enumerate() {
            let comma = trailing_comma(i, items.len());
            let _ = writeln!(self.writer, "      \"{}\"{comma}", JsonStr(item));
        }
        let _ = writeln!(self.writer, "    ]{}", if last { "" } else { "," });
    }
}

impl<W: Write> DiagnosticEmitter for JsonEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        if !self.first {
            let _ = writeln!(self.writer, ",");
        }
        self.first = false;

        let code = diagnostic.code;
        let phase = code
            .phase()
            .map_or_else(|| "null".to_string(), |p| format!("\"{p}\""));

        let _ = writeln!(self.writer, "  {{");
        let _ = writeln!(self.writer, "    \"code\": \"{code}\",");
        let _ = writeln!(self.writer, "    \"kind\": \"{}\",", code.kind());
        let _ = writeln!(self.writer, "    \"phase\": {phase},");
        let _ = writeln!(self.writer, "    \"severity\": \"{}\",", diagnostic.severity);
        let _ = writeln!(
            self.writer,
            "    \"message\": \"{}\",",
            JsonStr(&diagnostic.message)
        );

        let _ = writeln!(self.writer, "    \"labels\": [");
        for (i, label) in diagnostic.labels.iter().enumerate() {
            self.write_label(label, trailing_comma(i, diagnostic.labels.len()));
        }
        let _ = writeln!(self.writer, "    ],");

        self.write_strings("notes", &diagnostic.notes, false);
        self.write_strings("help", &diagnostic.hints, false);

        let _ = writeln!(self.writer, "    \"fixes\": [");
        for (i, fix) in diagnostic.fixes.iter().enumerate() {
            self.write_fix(fix, trailing_comma(i, diagnostic.fixes.len()));
        }
        let _ = writeln!(self.writer, "    ]");

        let _ = write!(self.writer, "  }}");
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, _error_count: usize) {
        // The array itself is the summary
    }
}
