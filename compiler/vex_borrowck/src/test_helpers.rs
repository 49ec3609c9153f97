//! Shared test utilities for the checker phases.
//!
//! Only compiled in test builds.

use vex_diagnostic::{Diagnostic, ErrorCode};
use vex_ir::{Function, Module, ModuleBuilder, StmtId, StringInterner, TypeClass, ValueType};

use crate::{
    check_module, BuiltinRegistry, CheckError, CheckOutcome, CheckerConfig, CheckerContext,
};

/// Wrap `stmts` in a parameterless `main` and finish the module.
pub(crate) fn main_module(mut b: ModuleBuilder<'_>, stmts: Vec<StmtId>) -> Module {
    let body = b.block(stmts);
    b.function("main", Vec::new(), body);
    b.finish()
}

/// `struct Point { x: int, y: int }`
pub(crate) fn point(b: &ModuleBuilder<'_>) -> ValueType {
    ValueType::structure(vec![
        b.field_type("x", TypeClass::Copy),
        b.field_type("y", TypeClass::Copy),
    ])
}

/// `struct Person { name: str, age: int }`
pub(crate) fn person(b: &ModuleBuilder<'_>) -> ValueType {
    ValueType::structure(vec![
        b.field_type("name", TypeClass::Move),
        b.field_type("age", TypeClass::Copy),
    ])
}

/// Run one phase over every function, sequentially.
pub(crate) fn run_phase<T>(
    interner: &StringInterner,
    module: &Module,
    check: impl Fn(&mut CheckerContext<'_>, &Function) -> Result<T, CheckError>,
) -> Vec<Diagnostic> {
    let builtins = BuiltinRegistry::standard();
    let base = CheckerContext::new(module, interner, &builtins);
    let mut diagnostics = Vec::new();
    for (_, func) in module.functions() {
        let mut ctx = base.clone();
        if let Err(err) = check(&mut ctx, func) {
            ctx.report(err.into_diagnostic(func.span));
        }
        diagnostics.extend(ctx.into_diagnostics());
    }
    diagnostics
}

/// Run the whole checker without a thread pool.
pub(crate) fn check(interner: &StringInterner, module: &Module) -> CheckOutcome {
    check_module(module, interner, &CheckerConfig::default().with_parallel(false))
}

pub(crate) fn codes(diagnostics: &[Diagnostic]) -> Vec<ErrorCode> {
    diagnostics.iter().map(|d| d.code).collect()
}
