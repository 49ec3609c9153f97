//! Running all phases over a module.
//!
//! Phases run in order; each completes over the whole module before the next
//! starts. Within a phase, functions are independent: every function gets a
//! fresh clone of the module-level [`CheckerContext`] and submits its
//! diagnostics to the shared sink as one batch.
//!
//! A failing phase does not stop later phases, but their diagnostics are
//! provisional: they may be consequences of the earlier failure. Once the
//! configured error limit is reached, the remaining phases are skipped and
//! their annotations stay empty.

use rayon::prelude::*;
use vex_diagnostic::{
    BatchKey, Diagnostic, DiagnosticConfig, DiagnosticSink, ErrorGuaranteed, Phase,
};
use vex_ir::{Function, Module, StringLookup};

use crate::{
    borrows, capture, lifetimes, moves, mutability, AnnotatedModule, BuiltinRegistry, CheckError,
    CheckerContext,
};

/// Checker settings.
#[derive(Clone, Debug)]
pub struct CheckerConfig {
    /// Check functions of one phase on a thread pool.
    pub parallel: bool,
    /// Drop diagnostics of phases after the first failing one.
    pub suppress_provisional: bool,
    /// Maximum number of errors kept (0 = unlimited).
    pub error_limit: usize,
    pub builtins: BuiltinRegistry,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfig {
            parallel: true,
            suppress_provisional: false,
            error_limit: 0,
            builtins: BuiltinRegistry::standard(),
        }
    }
}

impl CheckerConfig {
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub fn with_suppress_provisional(mut self, suppress: bool) -> Self {
        self.suppress_provisional = suppress;
        self
    }

    #[must_use]
    pub fn with_error_limit(mut self, limit: usize) -> Self {
        self.error_limit = limit;
        self
    }

    #[must_use]
    pub fn with_builtins(mut self, builtins: BuiltinRegistry) -> Self {
        self.builtins = builtins;
        self
    }
}

/// Result of checking a module.
#[derive(Clone, Debug)]
pub struct CheckOutcome {
    /// Diagnostics ordered by phase, function, then span.
    pub diagnostics: Vec<Diagnostic>,
    /// Earliest phase that reported an error.
    pub blocking_phase: Option<Phase>,
    pub annotations: AnnotatedModule,
}

impl CheckOutcome {
    /// Whether `diagnostic` comes from a phase after the blocking one.
    pub fn is_provisional(&self, diagnostic: &Diagnostic) -> bool {
        match (self.blocking_phase, diagnostic.code.phase()) {
            (Some(blocking), Some(phase)) => phase > blocking,
            _ => false,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// The annotations if the module was accepted.
    pub fn result(self) -> Result<AnnotatedModule, ErrorGuaranteed> {
        match ErrorGuaranteed::from_error_count(self.error_count()) {
            Some(guar) => Err(guar),
            None => Ok(self.annotations),
        }
    }
}

/// Check every function of `module`.
pub fn check_module(
    module: &Module,
    names: &(dyn StringLookup + Sync),
    config: &CheckerConfig,
) -> CheckOutcome {
    let sink = DiagnosticSink::with_config(DiagnosticConfig {
        error_limit: config.error_limit,
        deduplicate: true,
    });
    let base = CheckerContext::new(module, names, &config.builtins);
    let functions: Vec<(usize, &Function)> = module.functions().collect();
    tracing::debug!(
        functions = functions.len(),
        parallel = config.parallel,
        "checking module"
    );
    let runner = PhaseRunner {
        base: &base,
        functions: &functions,
        parallel: config.parallel,
        sink: &sink,
    };

    runner.run(Phase::Mutability, mutability::check_function);
    runner.run(Phase::Moves, moves::check_function);

    let mut annotations = AnnotatedModule::default();
    for refs in runner.run(Phase::Borrows, borrows::check_function) {
        annotations.references.extend(refs);
    }

    let references = &annotations.references;
    let bounds = runner.run(Phase::Lifetimes, |ctx, func| {
        lifetimes::check_function(ctx, func, references)
    });
    for (expr, bound) in bounds.into_iter().flatten() {
        if let Some(annotation) = annotations.references.get_mut(&expr) {
            annotation.lifetime_bound = Some(bound);
        }
    }

    for closures in runner.run(Phase::Captures, capture::check_function) {
        annotations.closures.extend(closures);
    }

    let blocking_phase = sink.first_failing_phase();
    let mut diagnostics = sink.into_sorted();
    if config.suppress_provisional {
        if let Some(blocking) = blocking_phase {
            diagnostics.retain(|d| !matches!(d.code.phase(), Some(phase) if phase > blocking));
        }
    }
    tracing::debug!(
        diagnostics = diagnostics.len(),
        blocking = ?blocking_phase,
        "module checked"
    );

    CheckOutcome {
        diagnostics,
        blocking_phase,
        annotations,
    }
}

/// Shared inputs of every phase run.
struct PhaseRunner<'r, 'a> {
    base: &'r CheckerContext<'a>,
    functions: &'r [(usize, &'a Function)],
    parallel: bool,
    sink: &'r DiagnosticSink,
}

impl<'a> PhaseRunner<'_, 'a> {
    /// Run one phase over every function, returning per-function results in
    /// item order.
    fn run<T, F>(&self, phase: Phase, check: F) -> Vec<T>
    where
        T: Default + Send,
        F: Fn(&mut CheckerContext<'a>, &Function) -> Result<T, CheckError> + Sync,
    {
        if self.sink.limit_reached() {
            tracing::debug!(%phase, "error limit reached, phase skipped");
            return Vec::new();
        }
        let check_one =
            |&(item, func): &(usize, &'a Function)| self.check_one(phase, item, func, &check);

        if !self.parallel {
            return self.functions.iter().map(check_one).collect();
        }

        // Scoped so worker threads are joined before returning.
        rayon::ThreadPoolBuilder::new()
            .build_scoped(rayon::ThreadBuilder::run, |pool| {
                pool.install(|| self.functions.par_iter().map(check_one).collect::<Vec<_>>())
            })
            .unwrap_or_else(|e| {
                tracing::warn!("failed to create thread pool ({e}), running sequentially");
                self.functions.iter().map(check_one).collect()
            })
    }

    fn check_one<T, F>(&self, phase: Phase, item: usize, func: &'a Function, check: &F) -> T
    where
        T: Default,
        F: Fn(&mut CheckerContext<'a>, &Function) -> Result<T, CheckError>,
    {
        let mut ctx = self.base.clone();
        let function = ctx.name(func.name);
        let result = match check(&mut ctx, func) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(%phase, function, error = %err, "checker invariant violated");
                ctx.report(err.into_diagnostic(func.span));
                T::default()
            }
        };

        let diagnostics = ctx.into_diagnostics();
        tracing::debug!(
            %phase,
            function,
            diagnostics = diagnostics.len(),
            "function checked"
        );
        self.sink.push_batch(BatchKey::new(phase, item), diagnostics);
        result
    }
}
