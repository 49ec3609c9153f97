//! The diagnostic model shared by every checker phase.
//!
//! A [`Diagnostic`] is one rejection: a code, a message naming the binding
//! involved, a primary label at the offending use, secondary labels at the
//! related sites (declaration, move, earlier borrow), and optional hints.
//! A hint may come with a [`Suggestion`], an edit a tool can apply.

use std::fmt;

use vex_ir::Span;

use crate::ErrorCode;

/// Severity level for diagnostics.
///
/// The checker has no warning tier: every rejection is an `Error`. `Note`
/// is used for sink-generated summaries such as the error-limit notice.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Note,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Note => "note",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How safe a [`Suggestion`] is to apply without review.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Applicability {
    MachineApplicable,
    MaybeIncorrect,
}

impl Applicability {
    pub const fn as_str(self) -> &'static str {
        match self {
            Applicability::MachineApplicable => "machine-applicable",
            Applicability::MaybeIncorrect => "maybe-incorrect",
        }
    }
}

/// An edit: replace the text at `span` with `replacement`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Suggestion {
    pub message: String,
    pub span: Span,
    pub replacement: String,
    pub applicability: Applicability,
}

impl Suggestion {
    pub fn replace(
        message: impl Into<String>,
        span: Span,
        replacement: impl Into<String>,
        applicability: Applicability,
    ) -> Self {
        Suggestion {
            message: message.into(),
            span,
            replacement: replacement.into(),
            applicability,
        }
    }

    /// Replace a name used at `span` with a similar visible one.
    ///
    /// Never machine-applicable: the closest name is a guess.
    pub fn rename(span: Span, candidate: &str) -> Self {
        Self::replace(
            format!("did you mean `{candidate}`?"),
            span,
            candidate,
            Applicability::MaybeIncorrect,
        )
    }
}

/// A labeled span with a message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
    /// Whether this is the primary error location.
    pub is_primary: bool,
}

/// One rejection, with everything needed to render it.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    /// Error code; also encodes phase and kind.
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    /// Primary label first in practice, secondary labels in order.
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    /// Human-readable help lines.
    pub hints: Vec<String>,
    /// Edits tools may offer.
    pub fixes: Vec<Suggestion>,
}

impl Diagnostic {
    fn with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
            hints: Vec::new(),
            fixes: Vec::new(),
        }
    }

    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::with_severity(code, Severity::Error)
    }

    #[cold]
    pub fn note(code: ErrorCode) -> Self {
        Self::with_severity(code, Severity::Note)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Label the offending location.
    pub fn with_label(self, span: Span, message: impl Into<String>) -> Self {
        self.push_label(span, message.into(), true)
    }

    /// Label a related location, such as the declaration or a move site.
    pub fn with_secondary_label(self, span: Span, message: impl Into<String>) -> Self {
        self.push_label(span, message.into(), false)
    }

    fn push_label(mut self, span: Span, message: String, is_primary: bool) -> Self {
        self.labels.push(Label {
            span,
            message,
            is_primary,
        });
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn with_fix(mut self, fix: Suggestion) -> Self {
        self.fixes.push(fix);
        self
    }

    pub fn primary_span(&self) -> Option<Span> {
        self.labels.iter().find(|l| l.is_primary).map(|l| l.span)
    }

    /// Secondary spans in label order.
    pub fn secondary_spans(&self) -> impl Iterator<Item = Span> + '_ {
        self.labels.iter().filter(|l| !l.is_primary).map(|l| l.span)
    }

    /// First help hint, if any.
    pub fn help(&self) -> Option<&str> {
        self.hints.first().map(String::as_str)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;
        for label in &self.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            write!(f, "\n  {marker} {:?}: {}", label.span, label.message)?;
        }
        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }
        for hint in &self.hints {
            write!(f, "\n  = help: {hint}")?;
        }
        Ok(())
    }
}
