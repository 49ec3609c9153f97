//! Internal checker failures.
//!
//! These are bugs in the checker (or malformed input trees), never user
//! errors. They surface as `E9001` diagnostics so a run still terminates
//! with a report instead of a panic.

use thiserror::Error;
use vex_diagnostic::{Diagnostic, ErrorCode};
use vex_ir::Span;

use crate::ScopeId;

/// Misuse of the scope stack.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("scope {requested:?} is not the innermost open scope (innermost is {innermost:?})")]
    NotInnermost {
        requested: ScopeId,
        innermost: ScopeId,
    },

    #[error("the module scope cannot be exited")]
    ExitRoot,

    #[error("scope {0:?} does not exist")]
    Unknown(ScopeId),
}

/// Internal error raised while walking a function.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("scope tracking failed: {0}")]
    Scope(#[from] ScopeError),

    #[error("function `{function}` left {open} scope(s) open")]
    UnbalancedScopes { function: String, open: usize },
}

impl CheckError {
    /// Convert into the `E9001` diagnostic reported for this failure.
    pub fn into_diagnostic(self, span: Span) -> Diagnostic {
        Diagnostic::error(ErrorCode::E9001)
            .with_message(format!("internal checker error: {self}"))
            .with_label(span, "while checking this item")
            .with_note("this is a bug in the checker; the program may still be valid")
    }
}
