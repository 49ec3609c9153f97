//! Append-only diagnostic sink shared by every checker phase.
//!
//! Phases run over functions in parallel. Each (phase, function) pair
//! submits its diagnostics as one batch, so a batch is never interleaved
//! with another. Draining the sink orders batches by phase, then by item
//! index, then by primary span, which makes output independent of thread
//! scheduling.

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use vex_ir::Span;

use crate::{Diagnostic, ErrorCode, Phase};

/// Ordering key for a batch of diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct BatchKey {
    pub phase: Phase,
    /// Index of the item (function) in the module.
    pub item: usize,
}

impl BatchKey {
    pub fn new(phase: Phase, item: usize) -> Self {
        BatchKey { phase, item }
    }
}

/// Configuration for diagnostic collection.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept when draining (0 = unlimited).
    pub error_limit: usize,
    /// Drop diagnostics with the same code, primary span, and message.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: true,
        }
    }
}

/// Identity used for deduplication.
type DedupKey = (ErrorCode, Option<Span>, String);

#[derive(Default)]
struct SinkState {
    batches: Vec<(BatchKey, Vec<Diagnostic>)>,
    seen: FxHashSet<DedupKey>,
    error_count: usize,
}

/// Thread-safe, append-only collection of diagnostics.
#[derive(Default)]
pub struct DiagnosticSink {
    state: Mutex<SinkState>,
    config: DiagnosticConfig,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticSink {
            state: Mutex::new(SinkState::default()),
            config,
        }
    }

    /// Append a batch atomically. Returns how many diagnostics were kept
    /// after deduplication.
    pub fn push_batch(&self, key: BatchKey, diagnostics: Vec<Diagnostic>) -> usize {
        if diagnostics.is_empty() {
            return 0;
        }

        let mut state = self.state.lock();
        let kept: Vec<Diagnostic> = if self.config.deduplicate {
            diagnostics
                .into_iter()
                .filter(|d| {
                    state
                        .seen
                        .insert((d.code, d.primary_span(), d.message.clone()))
                })
                .collect()
        } else {
            diagnostics
        };

        let count = kept.len();
        state.error_count += kept.iter().filter(|d| d.is_error()).count();
        if count > 0 {
            state.batches.push((key, kept));
        }
        count
    }

    /// Number of errors collected so far.
    pub fn error_count(&self) -> usize {
        self.state.lock().error_count
    }

    /// Check if the error limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count() >= self.config.error_limit
    }

    /// Earliest phase that reported an error.
    pub fn first_failing_phase(&self) -> Option<Phase> {
        self.state
            .lock()
            .batches
            .iter()
            .filter(|(_, diags)| diags.iter().any(Diagnostic::is_error))
            .map(|(key, _)| key.phase)
            .min()
    }

    /// Drain all diagnostics in deterministic order.
    ///
    /// When the error limit truncates the list, a trailing `E9002` note
    /// states how many errors were dropped.
    pub fn into_sorted(self) -> Vec<Diagnostic> {
        let mut batches = self.state.into_inner().batches;
        batches.sort_by_key(|(key, _)| *key);

        let mut result: Vec<Diagnostic> = Vec::new();
        for (_, mut diags) in batches {
            diags.sort_by_key(|d| d.primary_span().unwrap_or(Span::DUMMY));
            result.extend(diags);
        }

        let limit = self.config.error_limit;
        if limit > 0 {
            let total_errors = result.iter().filter(|d| d.is_error()).count();
            if total_errors > limit {
                let mut kept_errors = 0;
                result.retain(|d| {
                    if !d.is_error() {
                        return true;
                    }
                    kept_errors += 1;
                    kept_errors <= limit
                });
                result.push(too_many_errors(limit, total_errors - limit));
            }
        }

        tracing::debug!(diagnostics = result.len(), "diagnostic sink drained");
        result
    }
}

/// Create the "error limit reached" note.
#[cold]
pub fn too_many_errors(limit: usize, suppressed: usize) -> Diagnostic {
    Diagnostic::note(ErrorCode::E9002)
        .with_message(format!(
            "aborting after {limit} errors; {suppressed} more not shown"
        ))
        .with_note("use --error-limit to increase the limit")
}
