//! Phase 2: ownership transfer and initialization.
//!
//! Each binding moves through a small state machine:
//!
//! ```text
//! Uninitialized --init/assign--> Owned --move--> Moved
//!                                  \--field move--> PartiallyMoved
//! ```
//!
//! `Moved` never returns to `Owned` by assignment; only a new shadowing
//! declaration gives the name an owned value again. Copy values never move.
//!
//! Control flow is joined conservatively: a binding moved on any path is
//! moved after the merge, and a binding initialized on only some paths is
//! `ConditionallyInitialized`. Paths ending in `return`, `break`, or
//! `continue` do not contribute to the merge they skip; a `break` joins the
//! state after its loop and a `continue` joins the loop head. Loop bodies
//! are walked twice so a move in one iteration is seen by a use in the
//! next.

use smallvec::smallvec;
use vex_ir::{
    Block, ExprId, ExprKind, Function, MatchArm, Name, Span, StmtId, StmtKind, TypeClass,
};
use vex_stack::ensure_sufficient_stack;

use crate::flow::{Exit, LoopStack};
use crate::place::project;
use crate::{
    report, BindingId, BindingKind, CheckError, CheckerContext, OwnershipState, ParamEffect,
    ScopeKind, StateSnapshot,
};

/// How an expression's value is consumed by its context.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Use {
    /// Read or copied; ownership stays put.
    Read,
    /// Ownership transfers to the context.
    Consume,
}

/// Check one function, reporting into `ctx`.
pub fn check_function(ctx: &mut CheckerContext<'_>, func: &Function) -> Result<(), CheckError> {
    let scope = ctx.enter_function(func)?;
    let mut checker = MoveChecker {
        ctx,
        diverged: false,
        loops: LoopStack::default(),
    };
    checker.walk_block(&func.body, ScopeKind::Block)?;
    checker.ctx.exit_function(func, scope)
}

struct MoveChecker<'c, 'a> {
    ctx: &'c mut CheckerContext<'a>,
    /// The current path has returned or left its loop.
    diverged: bool,
    loops: LoopStack<StateSnapshot>,
}

impl MoveChecker<'_, '_> {
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
                let state = match init {
                    Some(init) => {
                        self.eval(*init, Use::Consume)?;
                        OwnershipState::Owned
                    }
                    None => OwnershipState::Uninitialized,
                };
                self.ctx.declare(
                    *name,
                    *name_span,
                    *mutable,
                    ty.clone(),
                    BindingKind::Local,
                    state,
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
                self.assign(*target, compound.is_some())?;
            }
            StmtKind::Expr(expr) => self.eval(*expr, Use::Read)?,
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.eval(*value, Use::Consume)?;
                }
                self.diverged = true;
            }
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                self.eval(*cond, Use::Read)?;
                let entry_diverged = self.diverged;
                let before = self.ctx.bindings.snapshot();

                self.walk_block(then_block, ScopeKind::Branch)?;
                let then_state = self.ctx.bindings.snapshot();
                let then_diverged = self.diverged;

                self.ctx.bindings.restore(&before);
                self.diverged = entry_diverged;
                if let Some(else_block) = else_block {
                    self.walk_block(else_block, ScopeKind::Branch)?;
                }
                let else_diverged = self.diverged;

                match (then_diverged, else_diverged) {
                    (false, false) => self.ctx.bindings.join_with(&then_state),
                    (false, true) => self.ctx.bindings.restore(&then_state),
                    // the else state (or either, when both return) stands
                    (true, _) => {}
                }
                self.diverged = then_diverged && else_diverged;
            }
            StmtKind::While { cond, body } => self.walk_loop(Some(*cond), body)?,
            StmtKind::Loop { body } => self.walk_loop(None, body)?,
            StmtKind::Match { scrutinee, arms } => {
                self.eval(*scrutinee, Use::Read)?;
                self.walk_arms(arms)?;
            }
            StmtKind::Break => self.leave_loop(Exit::Break),
            StmtKind::Continue => self.leave_loop(Exit::Continue),
            StmtKind::Block(block) | StmtKind::Unsafe(block) => {
                self.walk_block(block, ScopeKind::Block)?;
            }
        }
        Ok(())
    }

    /// Walk every arm from the state before the match; the arms that fall
    /// through are joined.
    fn walk_arms(&mut self, arms: &[MatchArm]) -> Result<(), CheckError> {
        let entry_diverged = self.diverged;
        let before = self.ctx.bindings.snapshot();
        let mut ends = Vec::new();
        for arm in arms {
            self.ctx.bindings.restore(&before);
            self.diverged = entry_diverged;
            if let Some(guard) = arm.guard {
                self.eval(guard, Use::Read)?;
            }
            self.walk_block(&arm.body, ScopeKind::Branch)?;
            if !self.diverged {
                ends.push(self.ctx.bindings.snapshot());
            }
        }

        self.diverged = entry_diverged;
        match ends.split_first() {
            Some((first, rest)) => {
                self.ctx.bindings.restore(first);
                for end in rest {
                    self.ctx.bindings.join_with(end);
                }
            }
            None if arms.is_empty() => {}
            None => self.diverged = true,
        }
        Ok(())
    }

    /// `while cond { body }`, or `loop { body }` when `cond` is `None`.
    fn walk_loop(&mut self, cond: Option<ExprId>, body: &Block) -> Result<(), CheckError> {
        let entry_diverged = self.diverged;
        let mut breaks = Vec::new();
        for _ in 0..2 {
            if let Some(cond) = cond {
                self.eval(cond, Use::Read)?;
            }
            let head = self.ctx.bindings.snapshot();
            self.loops.push();
            self.walk_block(body, ScopeKind::Loop)?;
            let exits = self.loops.pop();

            if self.diverged {
                self.ctx.bindings.restore(&head);
            } else {
                self.ctx.bindings.join_with(&head);
            }
            for state in &exits.continues {
                self.ctx.bindings.join_with(state);
            }
            breaks.extend(exits.breaks);
            self.diverged = entry_diverged;
        }

        let mut exits = breaks.iter();
        if cond.is_none() {
            // only `break` leaves a `loop`
            let Some(first) = exits.next() else {
                self.diverged = true;
                return Ok(());
            };
            self.ctx.bindings.restore(first);
        }
        for state in exits {
            self.ctx.bindings.join_with(state);
        }
        Ok(())
    }

    fn leave_loop(&mut self, exit: Exit) {
        if !self.diverged {
            let state = self.ctx.bindings.snapshot();
            if !self.loops.record(exit, state) {
                tracing::trace!(?exit, "loop exit outside a loop");
            }
        }
        self.diverged = true;
    }

    fn eval(&mut self, id: ExprId, mode: Use) -> Result<(), CheckError> {
        ensure_sufficient_stack(|| self.eval_inner(id, mode))
    }

    fn eval_inner(&mut self, id: ExprId, mode: Use) -> Result<(), CheckError> {
        let expr = self.ctx.expr(id);
        match &expr.kind {
            ExprKind::Lit(_) => {}
            ExprKind::Ident(name) => {
                if let Some(binding) = self.ctx.resolve(*name) {
                    self.use_binding(binding, None, expr.span, mode);
                }
            }
            ExprKind::Field { .. } | ExprKind::Index { .. } => {
                let proj = project(self.ctx.module, id);
                for &index in &proj.indices {
                    self.eval(index, Use::Read)?;
                }
                match &self.ctx.expr(proj.base).kind {
                    ExprKind::Ident(name) => {
                        if let Some(binding) = self.ctx.resolve(*name) {
                            // moving out of an indexed element is not tracked
                            let mode = if proj.indexed { Use::Read } else { mode };
                            self.use_binding(binding, proj.first_field, expr.span, mode);
                        }
                    }
                    _ => self.eval(proj.base, Use::Read)?,
                }
            }
            ExprKind::Ref { place, .. } => self.eval(*place, Use::Read)?,
            ExprKind::Deref(operand) => self.eval(*operand, Use::Read)?,
            ExprKind::Call { callee, args } => {
                if let Some(binding) = self.ctx.resolve(*callee) {
                    self.use_binding(binding, None, expr.span, Use::Read);
                }
                let callee = self.ctx.name(*callee);
                for (index, &arg) in args.iter().enumerate() {
                    let mode = match self.ctx.builtins.effect(callee, index) {
                        ParamEffect::Moves => Use::Consume,
                        ParamEffect::ReadOnly
                        | ParamEffect::BorrowsShared
                        | ParamEffect::BorrowsExclusive => Use::Read,
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
            ExprKind::Closure { params, body } => {
                // Moves inside the body happen at the definition point.
                let saved = self.diverged;
                let loops = std::mem::take(&mut self.loops);
                let scope = self.ctx.enter(ScopeKind::Closure)?;
                for param in params {
                    self.ctx.declare_param(param, BindingKind::Param);
                }
                self.walk_block(body, ScopeKind::Block)?;
                self.ctx.exit(scope)?;
                self.loops = loops;
                self.diverged = saved;
            }
        }
        Ok(())
    }

    /// Check a read of `binding` (or of its `field`), then apply a move.
    fn use_binding(&mut self, id: BindingId, field: Option<Name>, span: Span, mode: Use) {
        let binding = self.ctx.binding(id);
        if binding.kind == BindingKind::Global {
            return;
        }
        let name = self.ctx.name(binding.name);
        let decl = binding.span;

        let error = match (&binding.state, field) {
            (OwnershipState::Uninitialized, _) => {
                Some(report::uninitialized_use(name, span, decl, false))
            }
            (OwnershipState::ConditionallyInitialized, _) => {
                Some(report::uninitialized_use(name, span, decl, true))
            }
            (OwnershipState::Moved { at }, _) => Some(report::use_after_move(name, span, *at)),
            (OwnershipState::PartiallyMoved { fields }, None) => fields.first().map(|(f, at)| {
                report::use_of_moved_field(name, self.ctx.name(*f), span, *at, true)
            }),
            (state @ OwnershipState::PartiallyMoved { .. }, Some(field)) => {
                state.moved_field(field).map(|at| {
                    report::use_of_moved_field(name, self.ctx.name(field), span, at, false)
                })
            }
            // dropped bindings are out of scope; the lifetime analyzer reports those
            (OwnershipState::Owned | OwnershipState::Dropped, _) => None,
        };
        if let Some(error) = error {
            self.ctx.report(error);
            return;
        }
        if mode == Use::Read || binding.ty.is_reference() {
            return;
        }

        match field {
            None if !binding.ty.is_copy() => {
                tracing::trace!(binding = name, ?span, "moved");
                self.ctx.binding_mut(id).state = OwnershipState::Moved { at: span };
            }
            Some(field) if binding.ty.field_class(field) == Some(TypeClass::Move) => {
                tracing::trace!(binding = name, field = self.ctx.name(field), "field moved");
                let binding = self.ctx.binding_mut(id);
                match &mut binding.state {
                    OwnershipState::PartiallyMoved { fields } => fields.push((field, span)),
                    state => {
                        *state = OwnershipState::PartiallyMoved {
                            fields: smallvec![(field, span)],
                        };
                    }
                }
            }
            _ => {}
        }
    }

    /// Apply an assignment to `target`.
    fn assign(&mut self, target: ExprId, compound: bool) -> Result<(), CheckError> {
        let span = self.ctx.expr(target).span;
        let proj = project(self.ctx.module, target);
        for &index in &proj.indices {
            self.eval(index, Use::Read)?;
        }

        let root = match &self.ctx.expr(proj.base).kind {
            ExprKind::Ident(name) => self.ctx.resolve(*name),
            ExprKind::Deref(operand) => {
                self.eval(*operand, Use::Read)?;
                return Ok(());
            }
            _ => {
                self.eval(proj.base, Use::Read)?;
                return Ok(());
            }
        };
        let Some(id) = root else {
            return Ok(());
        };
        if self.ctx.binding(id).kind == BindingKind::Global {
            return Ok(());
        }

        if compound {
            self.use_binding(id, proj.first_field, span, Use::Read);
            return Ok(());
        }

        if !proj.projected {
            let binding = self.ctx.binding_mut(id);
            if !binding.state.is_initialized() {
                binding.state = OwnershipState::Owned;
            }
            return Ok(());
        }

        match proj.first_field {
            Some(field) if !proj.indexed && !self.ctx.binding(id).ty.is_reference() => {
                self.restore_field(id, field, span);
            }
            _ => self.use_binding(id, None, span, Use::Read),
        }
        Ok(())
    }

    /// `p.f = v`: the aggregate must exist; a moved-out `f` is restored.
    fn restore_field(&mut self, id: BindingId, field: Name, span: Span) {
        let binding = self.ctx.binding(id);
        let name = self.ctx.name(binding.name);
        let error = match &binding.state {
            OwnershipState::Uninitialized => {
                Some(report::uninitialized_use(name, span, binding.span, false))
            }
            OwnershipState::ConditionallyInitialized => {
                Some(report::uninitialized_use(name, span, binding.span, true))
            }
            OwnershipState::Moved { at } => Some(report::use_after_move(name, span, *at)),
            _ => None,
        };
        if let Some(error) = error {
            self.ctx.report(error);
            return;
        }

        let binding = self.ctx.binding_mut(id);
        if let OwnershipState::PartiallyMoved { fields } = &mut binding.state {
            fields.retain(|(f, _)| *f != field);
            if fields.is_empty() {
                binding.state = OwnershipState::Owned;
            }
        }
    }
}

#[cfg(test)]
mod tests;
