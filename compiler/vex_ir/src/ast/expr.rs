//! Expression nodes.
//!
//! Children are referenced by [`ExprId`] into the module's
//! [`SyntaxArena`](crate::SyntaxArena); nothing is boxed.

use std::fmt;

use super::operators::BinaryOp;
use super::types::RefMode;
use super::{Block, Param};
use crate::{ExprId, Name, Span};

/// Expression node.
#[derive(Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

/// Literal values. The checker only needs to know they own nothing.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Literal {
    Int(i64),
    Bool(bool),
    /// String literal contents (interned).
    Str(Name),
    Unit,
}

/// One `name: value` entry of a struct literal.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldInit {
    pub name: Name,
    pub value: ExprId,
}

/// Expression variants.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ExprKind {
    Lit(Literal),

    /// Variable reference.
    Ident(Name),

    /// Field access: `base.field`
    Field { base: ExprId, field: Name },

    /// Element access: `base[index]`
    Index { base: ExprId, index: ExprId },

    /// Reference creation: `&place` or `&!place`.
    Ref { mode: RefMode, place: ExprId },

    /// Dereference: `*operand`
    Deref(ExprId),

    /// Call of a named function or builtin.
    Call { callee: Name, args: Vec<ExprId> },

    /// Struct literal: `Point { x: 1, y: 2 }`
    StructLit { name: Name, fields: Vec<FieldInit> },

    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },

    /// Heap allocation: `Box.new(value)`. Takes ownership of the operand.
    HeapAlloc(ExprId),

    /// Closure literal: `|params| { body }`
    Closure { params: Vec<Param>, body: Block },
}

impl ExprKind {
    /// Check whether this expression denotes a place (something that can
    /// be assigned to or borrowed).
    pub fn is_place(&self) -> bool {
        matches!(
            self,
            ExprKind::Ident(_)
                | ExprKind::Field { .. }
                | ExprKind::Index { .. }
                | ExprKind::Deref(_)
        )
    }
}
