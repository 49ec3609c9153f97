//! Flat storage for expressions and statements.

use crate::ast::{Expr, Stmt};
use crate::{ExprId, StmtId};

/// Contiguous arena of syntax nodes, indexed by [`ExprId`] / [`StmtId`].
#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct SyntaxArena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
}

impl SyntaxArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an expression, returning its id.
    ///
    /// # Panics
    /// Panics if the arena exceeds `u32::MAX` expressions.
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = u32::try_from(self.exprs.len())
            .unwrap_or_else(|_| panic!("expression arena exceeded u32::MAX entries"));
        self.exprs.push(expr);
        ExprId::new(id)
    }

    /// Allocate a statement, returning its id.
    ///
    /// # Panics
    /// Panics if the arena exceeds `u32::MAX` statements.
    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = u32::try_from(self.stmts.len())
            .unwrap_or_else(|_| panic!("statement arena exceeded u32::MAX entries"));
        self.stmts.push(stmt);
        StmtId::new(id)
    }

    /// Get an expression by id.
    ///
    /// # Panics
    /// Panics if `id` was not allocated by this arena. Decoded modules must
    /// pass [`Module::validate`](crate::Module::validate) first.
    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    /// Get a statement by id.
    ///
    /// # Panics
    /// Panics if `id` was not allocated by this arena.
    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    /// Every expression with its id, in allocation order.
    pub fn exprs(&self) -> impl Iterator<Item = (ExprId, &Expr)> {
        (0u32..).map(ExprId::new).zip(&self.exprs)
    }

    /// Every statement with its id, in allocation order.
    pub fn stmts(&self) -> impl Iterator<Item = (StmtId, &Stmt)> {
        (0u32..).map(StmtId::new).zip(&self.stmts)
    }

    /// Number of expressions allocated.
    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    /// Number of statements allocated.
    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }
}
