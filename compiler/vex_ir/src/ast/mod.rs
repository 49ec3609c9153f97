//! Syntax tree consumed by the checker.
//!
//! Every variant set is closed: each checker phase matches exhaustively, so
//! adding a node kind is a compile error until every phase handles it.

mod expr;
mod operators;
mod stmt;
mod types;

pub use expr::{Expr, ExprKind, FieldInit, Literal};
pub use operators::BinaryOp;
pub use stmt::{Stmt, StmtKind};
pub use types::{FieldType, RefMode, TypeClass, ValueType};

use crate::{ExprId, Name, Span, StmtId, SyntaxArena};

/// A `{ ... }` block: an ordered statement list plus its extent.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    pub stmts: Vec<StmtId>,
    pub span: Span,
}

/// One arm of a `match`: an optional guard and the arm body.
///
/// Patterns bind nothing the checker tracks, so only the guard and the
/// body are kept.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchArm {
    pub guard: Option<ExprId>,
    pub body: Block,
    pub span: Span,
}

/// A function parameter or method receiver.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Param {
    pub name: Name,
    pub mutable: bool,
    pub ty: ValueType,
    pub span: Span,
}

/// A function or method definition.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Function {
    pub name: Name,
    /// `self` for methods; `mutable` is set by the trailing `!` in `fn m()!`.
    pub receiver: Option<Param>,
    pub params: Vec<Param>,
    pub body: Block,
    pub span: Span,
}

/// Foreign function declaration (no body).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ExternFn {
    pub name: Name,
    pub params: Vec<Param>,
    pub span: Span,
}

/// Module-level constant.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstDef {
    pub name: Name,
    pub ty: ValueType,
    pub value: ExprId,
    pub span: Span,
}

/// Imported symbol.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Import {
    pub name: Name,
    pub span: Span,
}

/// Top-level items.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Item {
    Function(Function),
    Extern(ExternFn),
    Const(ConstDef),
    Import(Import),
}

impl Item {
    /// Name the item binds at module scope.
    pub fn name(&self) -> Name {
        match self {
            Item::Function(f) => f.name,
            Item::Extern(e) => e.name,
            Item::Const(c) => c.name,
            Item::Import(i) => i.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Item::Function(f) => f.span,
            Item::Extern(e) => e.span,
            Item::Const(c) => c.span,
            Item::Import(i) => i.span,
        }
    }
}

/// A whole compilation unit: items plus the arena holding their bodies.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Module {
    pub items: Vec<Item>,
    pub arena: SyntaxArena,
}

impl Module {
    /// Iterate over function definitions with their item index.
    ///
    /// The item index is stable and is used to order diagnostics.
    pub fn functions(&self) -> impl Iterator<Item = (usize, &Function)> {
        self.items.iter().enumerate().filter_map(|(i, item)| match item {
            Item::Function(f) => Some((i, f)),
            _ => None,
        })
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        self.arena.expr(id)
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        self.arena.stmt(id)
    }
}
