//! The `check` command: run the ownership checker over a serialized module.

use std::io::Write;
use std::path::{Path, PathBuf};

use vex_borrowck::{check_module, AnnotatedModule, CheckOutcome, CheckerConfig};
use vex_diagnostic::emitter::{ColorMode, DiagnosticEmitter, JsonEmitter, TerminalEmitter};
use vex_diagnostic::Diagnostic;

use crate::{CheckInput, DriverError};

/// How diagnostics are written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

impl OutputFormat {
    /// Parse a `--format=` value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "human" => Some(OutputFormat::Human),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Options for the `check` command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckOptions {
    pub format: OutputFormat,
    pub color: ColorMode,
    pub parallel: bool,
    /// Maximum number of errors reported (0 = unlimited).
    pub error_limit: usize,
    /// Where to write the annotated module when the input is accepted.
    pub emit_annotations: Option<PathBuf>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            format: OutputFormat::Human,
            color: ColorMode::Auto,
            parallel: true,
            error_limit: 0,
            emit_annotations: None,
        }
    }
}

impl CheckOptions {
    /// Apply one `--flag` argument.
    fn apply(&mut self, arg: &str) -> Result<(), DriverError> {
        let invalid = || DriverError::InvalidOption(arg.to_owned());
        if arg == "--no-parallel" {
            self.parallel = false;
        } else if let Some(value) = arg.strip_prefix("--format=") {
            self.format = OutputFormat::parse(value).ok_or_else(invalid)?;
        } else if let Some(value) = arg.strip_prefix("--color=") {
            self.color = ColorMode::parse(value).ok_or_else(invalid)?;
        } else if let Some(value) = arg.strip_prefix("--error-limit=") {
            self.error_limit = value.parse().map_err(|_| invalid())?;
        } else if let Some(value) = arg.strip_prefix("--emit-annotations=") {
            if value.is_empty() {
                return Err(invalid());
            }
            self.emit_annotations = Some(PathBuf::from(value));
        } else {
            return Err(invalid());
        }
        Ok(())
    }
}

/// A parsed `vexc check` invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckCommand {
    pub input: PathBuf,
    pub options: CheckOptions,
}

impl CheckCommand {
    /// Parse the arguments following `check`.
    ///
    /// The first argument not starting with `-` is the input file; any
    /// further one is rejected.
    pub fn parse(args: &[String]) -> Result<Self, DriverError> {
        let mut options = CheckOptions::default();
        let mut input = None;
        for arg in args {
            if arg.starts_with('-') {
                options.apply(arg)?;
            } else if input.is_none() {
                input = Some(PathBuf::from(arg));
            } else {
                return Err(DriverError::InvalidOption(arg.clone()));
            }
        }
        let input = input.ok_or(DriverError::MissingInput)?;
        Ok(CheckCommand { input, options })
    }
}

/// What a check run found.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub functions: usize,
    pub error_count: usize,
    /// Reference expressions annotated (0 when rejected).
    pub references: usize,
    /// Closures classified (0 when rejected).
    pub closures: usize,
}

impl CheckSummary {
    pub fn accepted(&self) -> bool {
        self.error_count == 0
    }
}

/// Check the input file, rendering diagnostics to stderr.
pub fn check_file(command: &CheckCommand) -> Result<CheckSummary, DriverError> {
    let input = CheckInput::read(&command.input)?;
    let is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
    check_input(&input, &command.options, std::io::stderr(), is_tty)
}

/// Check an already loaded input, rendering diagnostics to `writer`.
///
/// Diagnostics are fully rendered before the annotated module is written,
/// and the annotated module is written only when there are no errors.
pub fn check_input<W: Write>(
    input: &CheckInput,
    options: &CheckOptions,
    writer: W,
    is_tty: bool,
) -> Result<CheckSummary, DriverError> {
    let interner = input.interner()?;
    let config = CheckerConfig::default()
        .with_parallel(options.parallel)
        .with_error_limit(options.error_limit);
    let outcome = check_module(&input.module, &interner, &config);
    tracing::debug!(
        path = %input.source_path,
        diagnostics = outcome.diagnostics.len(),
        blocking = ?outcome.blocking_phase,
        "check finished"
    );

    let diagnostics = mark_provisional(&outcome);
    let error_count = outcome.error_count();
    render(&diagnostics, error_count, input, options, writer, is_tty);

    let mut summary = CheckSummary {
        functions: input.module.functions().count(),
        error_count,
        ..CheckSummary::default()
    };
    if let Ok(annotations) = outcome.result() {
        summary.references = annotations.references.len();
        summary.closures = annotations.closures.len();
        if let Some(path) = &options.emit_annotations {
            write_annotations(path, &annotations)?;
        }
    }
    Ok(summary)
}

/// Write `annotations` to `path` with bincode.
pub fn write_annotations(path: &Path, annotations: &AnnotatedModule) -> Result<(), DriverError> {
    let bytes = annotations.to_bytes().map_err(|source| DriverError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, bytes).map_err(|e| DriverError::io(path, e))?;
    tracing::debug!(path = %path.display(), "wrote annotations");
    Ok(())
}

/// Add a note to diagnostics that may only be fallout of an earlier phase.
fn mark_provisional(outcome: &CheckOutcome) -> Vec<Diagnostic> {
    outcome
        .diagnostics
        .iter()
        .map(|diag| {
            if outcome.is_provisional(diag) {
                diag.clone()
                    .with_note("this error may be a consequence of earlier errors")
            } else {
                diag.clone()
            }
        })
        .collect()
}

fn render<W: Write>(
    diagnostics: &[Diagnostic],
    error_count: usize,
    input: &CheckInput,
    options: &CheckOptions,
    writer: W,
    is_tty: bool,
) {
    match options.format {
        OutputFormat::Human => {
            let mut emitter = TerminalEmitter::with_color_mode(writer, options.color, is_tty)
                .with_file_path(input.source_path.as_str());
            if let Some(source) = &input.source {
                emitter = emitter.with_source(source);
            }
            emitter.emit_all(diagnostics);
            emitter.emit_summary(error_count);
            emitter.flush();
        }
        OutputFormat::Json => {
            let mut emitter = JsonEmitter::new(writer);
            if let Some(source) = &input.source {
                emitter = emitter.with_source(source);
            }
            emitter.begin();
            emitter.emit_all(diagnostics);
            emitter.end();
            emitter.flush();
        }
    }
}
