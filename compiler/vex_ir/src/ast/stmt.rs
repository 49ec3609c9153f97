//! Statement nodes.

use std::fmt;

use super::operators::BinaryOp;
use super::types::ValueType;
use super::{Block, MatchArm};
use crate::{ExprId, Name, Span};

/// Statement node.
#[derive(Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

impl fmt::Debug for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

/// Statement kinds.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum StmtKind {
    /// `let x = init` / `let! x = init` / `let! x: T` (deferred init).
    Let {
        name: Name,
        name_span: Span,
        mutable: bool,
        ty: ValueType,
        init: Option<ExprId>,
    },

    /// `target = value`, or `target op= value` when `compound` is set.
    Assign {
        target: ExprId,
        value: ExprId,
        compound: Option<BinaryOp>,
    },

    /// Expression statement
    Expr(ExprId),

    Return(Option<ExprId>),

    If {
        cond: ExprId,
        then_block: Block,
        else_block: Option<Block>,
    },

    While {
        cond: ExprId,
        body: Block,
    },

    /// `match scrutinee { ... }`. Arms are exhaustive: exactly one runs.
    Match {
        scrutinee: ExprId,
        arms: Vec<MatchArm>,
    },

    /// `loop { ... }`, left only through `break` or `return`.
    Loop { body: Block },

    /// `break` out of the innermost loop.
    Break,

    /// `continue` with the next iteration of the innermost loop.
    Continue,

    /// Nested block statement: `{ ... }`
    Block(Block),

    /// `unsafe { ... }`
    Unsafe(Block),
}
