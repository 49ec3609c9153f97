//! Phase 5: closure capture classification.
//!
//! A closure captures every binding it uses that was declared outside its
//! own scope. Its mode is the strongest use it makes of any capture:
//!
//! | Use inside the body                          | Mode           |
//! |----------------------------------------------|----------------|
//! | reads and copies only                        | `Callable`     |
//! | assignment, `&!`, or a mutating builtin call | `CallableMut`  |
//! | moves a non-copy capture out                 | `CallableOnce` |
//!
//! Nested closures propagate: a capture used by an inner closure is also
//! captured, with the same use, by every enclosing closure it crosses.
//! This phase only classifies; it reports nothing.

use rustc_hash::{FxHashMap, FxHashSet};
use vex_ir::{
    Block, ExprId, ExprKind, Function, Name, Param, RefMode, StmtId, StmtKind, TypeClass,
};
use vex_stack::ensure_sufficient_stack;

use crate::place::project;
use crate::{
    BindingId, BindingKind, CaptureMode, CheckError, CheckerContext, ClosureCapture,
    OwnershipState, ParamEffect, ScopeId, ScopeKind,
};

/// Capture results for one function, keyed by closure expression.
pub type FunctionCaptures = FxHashMap<ExprId, ClosureCapture>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Use {
    Read,
    Consume,
    Mutate,
}

/// Classify every closure in one function.
pub fn check_function(
    ctx: &mut CheckerContext<'_>,
    func: &Function,
) -> Result<FunctionCaptures, CheckError> {
    let scope = ctx.enter_function(func)?;
    let mut analyzer = CaptureAnalyzer {
        ctx,
        frames: Vec::new(),
        captures: FxHashMap::default(),
    };
    analyzer.walk_block(&func.body, ScopeKind::Block)?;
    analyzer.ctx.exit_function(func, scope)?;
    Ok(analyzer.captures)
}

/// A closure body being walked.
struct Frame {
    scope: ScopeId,
    mode: CaptureMode,
    captures: Vec<Name>,
    seen: FxHashSet<BindingId>,
}

struct CaptureAnalyzer<'c, 'a> {
    ctx: &'c mut CheckerContext<'a>,
    frames: Vec<Frame>,
    captures: FunctionCaptures,
}

impl CaptureAnalyzer<'_, '_> {
    fn walk_block(&mut self, block: &Block, kind: ScopeKind) -> Result<(), CheckError> {
        let scope = self.ctx.enter(kind)?;
        for &stmt in &block.stmts {
            self.walk_stmt(stmt)?;
        }
        self.ctx.exit(scope)?;
        Ok(())
    }

    fn walk_stmt(&mut self, id: StmtId) -> Result<(), CheckError> {
        ensure_sufficient_stack(|| self.walk_stmt_inner(id))
    }

    fn walk_stmt_inner(&mut self, id: StmtId) -> Result<(), CheckError> {
        let stmt = self.ctx.stmt(id);
        match &stmt.kind {
            StmtKind::Let {
                name,
                name_span,
                mutable,
                ty,
                init,
            } => {
                if let Some(init) = init {
                    self.eval(*init, Use::Consume)?;
                }
                self.ctx.declare(
                    *name,
                    *name_span,
                    *mutable,
                    ty.clone(),
                    BindingKind::Local,
                    OwnershipState::Owned,
                );
            }
            StmtKind::Assign {
                target,
                value,
                compound,
            } => {
                let mode = if compound.is_some() {
                    Use::Read
                } else {
                    Use::Consume
                };
                self.eval(*value, mode)?;
                self.assign_target(*target)?;
            }
            StmtKind::Expr(expr) => self.eval(*expr, Use::Read)?,
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.eval(*value, Use::Consume)?;
                }
            }
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                self.eval(*cond, Use::Read)?;
                self.walk_block(then_block, ScopeKind::Branch)?;
                if let Some(else_block) = else_block {
                    self.walk_block(else_block, ScopeKind::Branch)?;
                }
            }
            StmtKind::While { cond, body } => {
                self.eval(*cond, Use::Read)?;
                self.walk_block(body, ScopeKind::Loop)?;
            }
            StmtKind::Loop { body } => self.walk_block(body, ScopeKind::Loop)?,
            StmtKind::Match { scrutinee, arms } => {
                self.eval(*scrutinee, Use::Read)?;
                for arm in arms {
                    if let Some(guard) = arm.guard {
                        self.eval(guard, Use::Read)?;
                    }
                    self.walk_block(&arm.body, ScopeKind::Branch)?;
                }
            }
            StmtKind::Break | StmtKind::Continue => {}
            StmtKind::Block(block) | StmtKind::Unsafe(block) => {
                self.walk_block(block, ScopeKind::Block)?;
            }
        }
        Ok(())
    }

    fn assign_target(&mut self, target: ExprId) -> Result<(), CheckError> {
        let proj = project(self.ctx.module, target);
        for &index in &proj.indices {
            self.eval(index, Use::Read)?;
        }
        match &self.ctx.expr(proj.base).kind {
            ExprKind::Ident(name) => self.use_name(*name, None, Use::Mutate),
            // `*r = v` mutates whatever `r` refers to
            ExprKind::Deref(operand) => self.eval(*operand, Use::Mutate)?,
            _ => self.eval(proj.base, Use::Read)?,
        }
        Ok(())
    }

    fn eval(&mut self, id: ExprId, mode: Use) -> Result<(), CheckError> {
        ensure_sufficient_stack(|| self.eval_inner(id, mode))
    }

    fn eval_inner(&mut self, id: ExprId, mode: Use) -> Result<(), CheckError> {
        let expr = self.ctx.expr(id);
        match &expr.kind {
            ExprKind::Lit(_) => {}
            ExprKind::Ident(name) => self.use_name(*name, None, mode),
            ExprKind::Field { .. } | ExprKind::Index { .. } => {
                let proj = project(self.ctx.module, id);
                for &index in &proj.indices {
                    self.eval(index, Use::Read)?;
                }
                match &self.ctx.expr(proj.base).kind {
                    ExprKind::Ident(name) => {
                        let mode = if proj.indexed && mode == Use::Consume {
                            Use::Read
                        } else {
                            mode
                        };
                        self.use_name(*name, proj.first_field, mode);
                    }
                    _ => self.eval(proj.base, Use::Read)?,
                }
            }
            ExprKind::Ref { mode: ref_mode, place } => {
                let mode = match ref_mode {
                    RefMode::Shared => Use::Read,
                    RefMode::Exclusive => Use::Mutate,
                };
                self.eval(*place, mode)?;
            }
            ExprKind::Deref(operand) => self.eval(*operand, Use::Read)?,
            ExprKind::Call { callee, args } => {
                self.use_name(*callee, None, Use::Read);
                let callee = self.ctx.name(*callee);
                for (index, &arg) in args.iter().enumerate() {
                    let mode = match self.ctx.builtins.effect(callee, index) {
                        ParamEffect::Moves => Use::Consume,
                        ParamEffect::BorrowsExclusive => Use::Mutate,
                        ParamEffect::ReadOnly | ParamEffect::BorrowsShared => Use::Read,
                    };
                    self.eval(arg, mode)?;
                }
            }
            ExprKind::StructLit { fields, .. } => {
                for field in fields {
                    self.eval(field.value, Use::Consume)?;
                }
            }
            ExprKind::Binary { left, right, .. } => {
                self.eval(*left, Use::Read)?;
                self.eval(*right, Use::Read)?;
            }
            ExprKind::HeapAlloc(operand) => self.eval(*operand, Use::Consume)?,
            ExprKind::Closure { params, body } => self.closure(id, params, body)?,
        }
        Ok(())
    }

    fn closure(
        &mut self,
        id: ExprId,
        params: &[Param],
        body: &Block,
    ) -> Result<(), CheckError> {
        let scope = self.ctx.enter(ScopeKind::Closure)?;
        for param in params {
            self.ctx.declare_param(param, BindingKind::Param);
        }
        self.frames.push(Frame {
            scope,
            mode: CaptureMode::Callable,
            captures: Vec::new(),
            seen: FxHashSet::default(),
        });
        self.walk_block(body, ScopeKind::Block)?;
        self.ctx.exit(scope)?;

        if let Some(frame) = self.frames.pop() {
            tracing::debug!(
                mode = ?frame.mode,
                captures = frame.captures.len(),
                "closure classified"
            );
            self.captures.insert(
                id,
                ClosureCapture {
                    mode: frame.mode,
                    captures: frame.captures,
                },
            );
        }
        Ok(())
    }

    /// Record a use of `name` in every closure it is captured by.
    fn use_name(&mut self, name: Name, field: Option<Name>, mode: Use) {
        if self.frames.is_empty() {
            return;
        }
        let Some(id) = self.ctx.resolve(name) else {
            return;
        };
        let binding = self.ctx.binding(id);
        if binding.kind == BindingKind::Global {
            return;
        }

        let required = match mode {
            Use::Read => CaptureMode::Callable,
            Use::Mutate => CaptureMode::CallableMut,
            Use::Consume => {
                let moves = match field {
                    _ if binding.ty.is_reference() => false,
                    None => !binding.ty.is_copy(),
                    Some(field) => binding.ty.field_class(field) == Some(TypeClass::Move),
                };
                if moves {
                    CaptureMode::CallableOnce
                } else {
                    CaptureMode::Callable
                }
            }
        };

        let declared_in = binding.scope;
        for frame in &mut self.frames {
            if self.ctx.scopes.is_ancestor(frame.scope, declared_in) {
                continue;
            }
            if frame.seen.insert(id) {
                frame.captures.push(name);
            }
            frame.mode = frame.mode.max(required);
        }
    }
}

#[cfg(test)]
mod tests;
