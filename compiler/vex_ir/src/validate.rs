//! Structural validation of decoded modules.
//!
//! A module built through [`ModuleBuilder`](crate::ModuleBuilder) is a tree
//! by construction. One decoded from bytes may not be: an id can point past
//! the arena, or two parents can share a child, which lets a walk loop
//! forever. [`Module::validate`] rejects both without recursing, so the
//! checker only ever walks finite trees of valid ids.

use std::fmt;

use crate::ast::{Block, ExprKind, Item, StmtKind};
use crate::{ExprId, Module, StmtId};

/// Why a module is not a well-formed tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// An expression id past the end of the arena.
    ExprOutOfRange { id: ExprId, len: usize },
    /// A statement id past the end of the arena.
    StmtOutOfRange { id: StmtId, len: usize },
    /// An expression reachable from two parents.
    SharedExpr(ExprId),
    /// A statement reachable from two parents.
    SharedStmt(StmtId),
}

impl fmt::Display for ModuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleError::ExprOutOfRange { id, len } => write!(
                f,
                "expression {} is out of range ({len} expressions)",
                id.raw()
            ),
            ModuleError::StmtOutOfRange { id, len } => write!(
                f,
                "statement {} is out of range ({len} statements)",
                id.raw()
            ),
            ModuleError::SharedExpr(id) => {
                write!(f, "expression {} has more than one parent", id.raw())
            }
            ModuleError::SharedStmt(id) => {
                write!(f, "statement {} has more than one parent", id.raw())
            }
        }
    }
}

impl std::error::Error for ModuleError {}

impl Module {
    /// Check that every id is in range and every node has at most one
    /// parent.
    ///
    /// Items count as parents of their bodies, so a root statement that is
    /// also nested somewhere is rejected too.
    pub fn validate(&self) -> Result<(), ModuleError> {
        let mut claims = Claims {
            exprs: vec![false; self.arena.expr_count()],
            stmts: vec![false; self.arena.stmt_count()],
        };

        for item in &self.items {
            match item {
                Item::Function(func) => claims.block(&func.body)?,
                Item::Const(constant) => claims.expr(constant.value)?,
                Item::Extern(_) | Item::Import(_) => {}
            }
        }

        for (_, expr) in self.arena.exprs() {
            match &expr.kind {
                ExprKind::Lit(_) | ExprKind::Ident(_) => {}
                ExprKind::Field { base, .. } => claims.expr(*base)?,
                ExprKind::Index { base, index } => {
                    claims.expr(*base)?;
                    claims.expr(*index)?;
                }
                ExprKind::Ref { place, .. } => claims.expr(*place)?,
                ExprKind::Deref(operand) | ExprKind::HeapAlloc(operand) => {
                    claims.expr(*operand)?;
                }
                ExprKind::Call { args, .. } => {
                    for &arg in args {
                        claims.expr(arg)?;
                    }
                }
                ExprKind::StructLit { fields, .. } => {
                    for field in fields {
                        claims.expr(field.value)?;
                    }
                }
                ExprKind::Binary { left, right, .. } => {
                    claims.expr(*left)?;
                    claims.expr(*right)?;
                }
                ExprKind::Closure { body, .. } => claims.block(body)?,
            }
        }

        for (_, stmt) in self.arena.stmts() {
            match &stmt.kind {
                StmtKind::Let { init, .. } => claims.opt_expr(*init)?,
                StmtKind::Assign { target, value, .. } => {
                    claims.expr(*target)?;
                    claims.expr(*value)?;
                }
                StmtKind::Expr(expr) => claims.expr(*expr)?,
                StmtKind::Return(value) => claims.opt_expr(*value)?,
                StmtKind::If {
                    cond,
                    then_block,
                    else_block,
                } => {
                    claims.expr(*cond)?;
                    claims.block(then_block)?;
                    if let Some(else_block) = else_block {
                        claims.block(else_block)?;
                    }
                }
                StmtKind::While { cond, body } => {
                    claims.expr(*cond)?;
                    claims.block(body)?;
                }
                StmtKind::Match { scrutinee, arms } => {
                    claims.expr(*scrutinee)?;
                    for arm in arms {
                        claims.opt_expr(arm.guard)?;
                        claims.block(&arm.body)?;
                    }
                }
                StmtKind::Loop { body } | StmtKind::Block(body) | StmtKind::Unsafe(body) => {
                    claims.block(body)?;
                }
                StmtKind::Break | StmtKind::Continue => {}
            }
        }
        Ok(())
    }
}

/// Which nodes already have a parent.
struct Claims {
    exprs: Vec<bool>,
    stmts: Vec<bool>,
}

impl Claims {
    fn expr(&mut self, id: ExprId) -> Result<(), ModuleError> {
        let len = self.exprs.len();
        let Some(claimed) = self.exprs.get_mut(id.index()) else {
            return Err(ModuleError::ExprOutOfRange { id, len });
        };
        if std::mem::replace(claimed, true) {
            return Err(ModuleError::SharedExpr(id));
        }
        Ok(())
    }

    fn opt_expr(&mut self, id: Option<ExprId>) -> Result<(), ModuleError> {
        id.map_or(Ok(()), |id| self.expr(id))
    }

    fn block(&mut self, block: &Block) -> Result<(), ModuleError> {
        for &id in &block.stmts {
            let len = self.stmts.len();
            let Some(claimed) = self.stmts.get_mut(id.index()) else {
                return Err(ModuleError::StmtOutOfRange { id, len });
            };
            if std::mem::replace(claimed, true) {
                return Err(ModuleError::SharedStmt(id));
            }
        }
        Ok(())
    }
}
