//! Human-readable diagnostic output with optional ANSI color.
//!
//! With source text attached, labels render as `path:line:col` followed by
//! the offending source line and a caret underline.

use std::io::Write;

use crate::span_utils::resolve;
use crate::{Diagnostic, Label, Severity};

use super::{DiagnosticEmitter, SourceContext};

/// ANSI styles used by the report.
#[derive(Copy, Clone)]
enum Style {
    Error,
    Note,
    Help,
    Secondary,
    Bold,
}

impl Style {
    const RESET: &'static str = "\x1b[0m";

    fn ansi(self) -> &'static str {
        match self {
            Style::Error => "\x1b[1;31m",
            Style::Note => "\x1b[1;36m",
            Style::Help => "\x1b[1;32m",
            Style::Secondary => "\x1b[1;34m",
            Style::Bold => "\x1b[1m",
        }
    }

    fn for_label(label: &Label) -> Style {
        if label.is_primary {
            Style::Error
        } else {
            Style::Secondary
        }
    }
}

/// The `--color=` setting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Color only when writing to a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn enabled(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "auto" => ColorMode::Auto,
            "always" => ColorMode::Always,
            "never" => ColorMode::Never,
            _ => return None,
        })
    }
}

/// Human-readable report writer.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
    source: Option<SourceContext>,
    file_path: Option<String>,
}

impl<W: Write> TerminalEmitter<W> {
    /// `is_tty` says whether `writer` is a terminal; only `Auto` consults it.
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.enabled(is_tty),
            source: None,
            file_path: None,
        }
    }

    /// Attach source text so spans render as line/column with a snippet.
    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(SourceContext::new(source));
        self
    }

    /// File path shown in `-->` lines.
    #[must_use]
    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn styled(&mut self, text: &str, style: Style) {
        let _ = if self.colors {
            write!(self.writer, "{}{text}{}", style.ansi(), Style::RESET)
        } else {
            write!(self.writer, "{text}")
        };
    }

    /// `error[E2001]: use of moved value: `p``
    fn write_header(&mut self, diagnostic: &Diagnostic) {
        let style = match diagnostic.severity {
            Severity::Error => Style::Error,
            Severity::Note => Style::Note,
        };
        self.styled(diagnostic.severity.as_str(), style);
        self.styled(&format!("[{}]", diagnostic.code), Style::Bold);
        let _ = writeln!(self.writer, ": {}", diagnostic.message);
    }

    /// `  = note: ...` and `  = help: ...` trailer lines.
    fn write_trailer(&mut self, kind: &str, style: Style, text: &str) {
        let _ = write!(self.writer, "  = ");
        self.styled(kind, style);
        let _ = writeln!(self.writer, ": {text}");
    }

/// Location prefix for a label: `path:line:col`, `line:col`, or the raw span.
    fn location(&self, label: &Label) -> String {
        let Some(source) = &self.source else {
            return match &self.file_path {
                Some(path) => format!("{path} {:?}", label.span),
                None => format!("{:?}", label.span),
            };
        };
        let pos = resolve(&source.lines, &source.text, label.span);
        match &self.file_path {
            Some(path) => format!("{path}:{}:{}", pos.line, pos.column),
            None => format!("{}:{}", pos.line, pos.column),
        }
    }

    /// Source line plus caret underline for a label, when source is attached.
    fn snippet(&self, label: &Label) -> Option<(u32, String, String)> {
        let source = self.source.as_ref()?;
        let pos = resolve(&source.lines, &source.text, label.span);
        let text = source.lines.line_text(&source.text, pos.line)?;
        let width = text.chars().count();
        let start = (pos.column as usize).saturating_sub(1).min(width);
        let len = (label.span.len() as usize).clamp(1, width.saturating_sub(start).max(1));
        let marker = if label.is_primary { '^' } else { '-' };
        let underline = format!(
            "{}{}",
            " ".repeat(start),
            marker.to_string().repeat(len)
        );
        Some((pos.line, text.to_owned(), underline))
    }

    fn write_label(&mut self, label: &Label) {
        let marker = if label.is_primary { "-->" } else { "   " };
        let location = self.location(label);
        let _ = write!(self.writer, "  {marker} {location}: ");
        let style = Style::for_label(label);
        self.styled(&label.message, style);
        let _ = writeln!(self.writer);

        if let Some((line, text, underline)) = self.snippet(label) {
            let gutter = line.to_string();
            let pad = " ".repeat(gutter.len());
            let _ = writeln!(self.writer, "   {gutter} | {text}");
            let _ = write!(self.writer, "   {pad} | ");
            self.styled(&underline, style);
            let _ = writeln!(self.writer);
        }
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.write_header(diagnostic);

        for label in &diagnostic.labels {
            self.write_label(label);
        }

        for note in &diagnostic.notes {
            self.write_trailer("note", Style::Bold, note);
        }
        for hint in &diagnostic.hints {
            self.write_trailer("help", Style::Help, hint);
        }

        let _ = writeln!(self.writer);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize) {
        if error_count == 0 {
            return;
        }
        self.styled("error", Style::Error);
        let _ = match error_count {
            1 => writeln!(self.writer, ": aborting due to previous error"),
            n => writeln!(self.writer, ": aborting due to {n} previous errors"),
        };
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
