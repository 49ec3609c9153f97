//! Phase 3: exclusive-xor-shared reference rules.
//!
//! Every reference expression creates a loan on its target binding. A
//! loan stays live while something holds it:
//!
//! - a binding initialized or assigned from an expression carrying the
//!   loan holds it until the binding's scope closes or it is reassigned;
//! - copying a holder into another binding shares the loan;
//! - a loan nobody holds (a call argument, an implicit builtin borrow)
//!   dies at the end of its statement.
//!
//! Loans live on any arm of a branch or match are live after it. Loop
//! bodies are walked twice so loans from one iteration meet the next; a
//! `continue` carries its loans to the loop head and a `break` to the
//! statement after the loop.
//!
//! Dereferencing a raw pointer is only allowed inside an `unsafe` block.
//!
//! Each reference expression is annotated with its mode, target, and the
//! depths the lifetime analyzer needs.

use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};
use vex_ir::{
    Block, ExprId, ExprKind, Function, MatchArm, Name, RefMode, Span, StmtId, StmtKind, TypeClass,
};
use vex_stack::ensure_sufficient_stack;

use crate::flow::{Exit, LoopStack};
use crate::ids::LoanId;
use crate::place::{mentions, project, Projection};
use crate::{
    report, BindingId, BindingKind, CheckError, CheckerContext, OwnershipState, ParamEffect,
    RefAnnotation, ScopeId, ScopeKind,
};

/// Loans carried by a value.
type Loans = SmallVec<[LoanId; 2]>;

/// Holders of a live loan. Empty while the loan is a temporary.
type Holders = SmallVec<[BindingId; 2]>;

/// Reference annotations produced for one function.
pub type FunctionAnnotations = FxHashMap<ExprId, RefAnnotation>;

#[derive(Copy, Clone, Debug)]
struct LoanInfo {
    target: BindingId,
    mode: RefMode,
    span: Span,
    /// The reference expression, `None` for implicit builtin borrows.
    expr: Option<ExprId>,
}

/// Liveness of every loan, indexed by [`LoanId`]. `None` means dead.
#[derive(Clone, Debug, Default)]
struct LiveLoans {
    slots: Vec<Option<Holders>>,
}

impl LiveLoans {
    fn holders(&self, loan: LoanId) -> Option<&Holders> {
        self.slots.get(loan.index()).and_then(Option::as_ref)
    }

    fn set(&mut self, loan: LoanId, holders: Option<Holders>) {
        if self.slots.len() <= loan.index() {
            self.slots.resize(loan.index() + 1, None);
        }
        self.slots[loan.index()] = holders;
    }

    fn live(&self) -> impl Iterator<Item = (LoanId, &Holders)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref()
                .map(|holders| (LoanId::new(u32::try_from(index).unwrap_or(u32::MAX)), holders))
        })
    }

    /// Union with another path's loans, holder sets included.
    fn union(&mut self, other: &LiveLoans) {
        for (index, theirs) in other.slots.iter().enumerate() {
            let Some(theirs) = theirs else { continue };
            if self.slots.len() <= index {
                self.slots.resize(index + 1, None);
            }
            match &mut self.slots[index] {
                Some(ours) => {
                    for holder in theirs {
                        if !ours.contains(holder) {
                            ours.push(*holder);
                        }
                    }
                }
                slot @ None => *slot = Some(theirs.clone()),
            }
        }
    }
}

/// Check one function, returning its reference annotations.
pub fn check_function(
    ctx: &mut CheckerContext<'_>,
    func: &Function,
) -> Result<FunctionAnnotations, CheckError> {
    let scope = ctx.enter_function(func)?;
    let mut validator = BorrowValidator {
        ctx,
        loans: Vec::new(),
        live: LiveLoans::default(),
        annotations: FxHashMap::default(),
        diverged: false,
        loops: LoopStack::default(),
        in_unsafe: false,
    };
    validator.walk_block(&func.body, ScopeKind::Block)?;
    validator.ctx.exit_function(func, scope)?;
    Ok(validator.annotations)
}

struct BorrowValidator<'c, 'a> {
    ctx: &'c mut CheckerContext<'a>,
    loans: Vec<LoanInfo>,
    live: LiveLoans,
    annotations: FunctionAnnotations,
    diverged: bool,
    loops: LoopStack<LiveLoans>,
    in_unsafe: bool,
}

impl BorrowValidator<'_, '_> {
    // Loan bookkeeping

    /// Register a loan on `target` after checking it against live loans.
    fn borrow(
        &mut self,
        target: BindingId,
        mode: RefMode,
        span: Span,
        expr: Option<ExprId>,
    ) -> LoanId {
        let conflict = self
            .live
            .live()
            .map(|(loan, _)| self.loans[loan.index()])
            .find(|info| {
                info.target == target
                    && (mode == RefMode::Exclusive || info.mode == RefMode::Exclusive)
            });

        if let Some(existing) = conflict {
            let name = self.ctx.binding_name(target);
            let diag = match mode {
                RefMode::Exclusive => {
                    report::exclusive_conflict(name, span, existing.span, existing.mode)
                }
                RefMode::Shared => report::shared_conflict(name, span, existing.span),
            };
            self.ctx.report(diag);
        }

        let loan = LoanId::new(u32::try_from(self.loans.len()).unwrap_or(u32::MAX));
        self.loans.push(LoanInfo {
            target,
            mode,
            span,
            expr,
        });
        self.live.set(loan, Some(SmallVec::new()));
        tracing::trace!(
            target = self.ctx.binding_name(target),
            mode = mode.describe(),
            loan = loan.index(),
            "loan created"
        );
        loan
    }

    /// First live loan on `target`.
    fn live_loan_on(&self, target: BindingId) -> Option<LoanInfo> {
        self.live
            .live()
            .map(|(loan, _)| self.loans[loan.index()])
            .find(|info| info.target == target)
    }

    /// Live loans stored in `holder`.
    fn held_by(&self, holder: BindingId) -> Loans {
        self.live
            .live()
            .filter(|(_, holders)| holders.contains(&holder))
            .map(|(loan, _)| loan)
            .collect()
    }

    fn hold(&mut self, loans: &Loans, holder: BindingId) {
        let holder_name = self.ctx.binding(holder).name;
        for &loan in loans {
            let Some(mut holders) = self.live.holders(loan).cloned() else {
                continue;
            };
            if !holders.contains(&holder) {
                holders.push(holder);
            }
            self.live.set(loan, Some(holders));

            if let Some(expr) = self.loans[loan.index()].expr {
                if let Some(annotation) = self.annotations.get_mut(&expr) {
                    annotation.holder.get_or_insert(holder_name);
                }
            }
        }
    }

    /// Drop `holder` from every loan; loans left without holders die.
    fn release(&mut self, holder: BindingId) {
        for loan in self.held_by(holder) {
            let Some(mut holders) = self.live.holders(loan).cloned() else {
                continue;
            };
            holders.retain(|h| *h != holder);
            let next = if holders.is_empty() { None } else { Some(holders) };
            self.live.set(loan, next);
        }
    }

    /// Kill unheld loans created since `first`.
    fn sweep_temporaries(&mut self, first: usize) {
        self.sweep_temporaries_except(first, &Loans::new());
    }

    /// Kill unheld loans created since `first`, except those in `keep`.
    fn sweep_temporaries_except(&mut self, first: usize, keep: &Loans) {
        for index in first..self.loans.len() {
            let loan = LoanId::new(u32::try_from(index).unwrap_or(u32::MAX));
            if keep.contains(&loan) {
                continue;
            }
            if self.live.holders(loan).is_some_and(SmallVec::is_empty) {
                self.live.set(loan, None);
            }
        }
    }

    /// Kill loans on bindings whose scope has closed, and drop closed
    /// holders. Exit states captured inside a nested scope still carry
    /// them.
    fn forget_dropped(&mut self) {
        let dropped = |id: BindingId| {
            matches!(self.ctx.binding(id).state, OwnershipState::Dropped)
        };
        let updates: Vec<(LoanId, Option<Holders>)> = self
            .live
            .live()
            .filter_map(|(loan, holders)| {
                if dropped(self.loans[loan.index()].target) {
                    return Some((loan, None));
                }
                if !holders.iter().any(|&h| dropped(h)) {
                    return None;
                }
                let kept: Holders = holders.iter().copied().filter(|&h| !dropped(h)).collect();
                Some((loan, (!kept.is_empty()).then_some(kept)))
            })
            .collect();
        for (loan, holders) in updates {
            self.live.set(loan, holders);
        }
    }

    fn check_move(&mut self, binding: BindingId, span: Span) {
        if let Some(existing) = self.live_loan_on(binding) {
            let name = self.ctx.binding_name(binding);
            self.ctx
                .report(report::move_while_borrowed(name, span, existing.span));
        }
    }

    fn check_mutation(&mut self, binding: BindingId, span: Span) {
        if let Some(existing) = self.live_loan_on(binding) {
            let name = self.ctx.binding_name(binding);
            self.ctx
                .report(report::mutation_while_borrowed(name, span, existing.span));
        }
    }

    fn annotate(&mut self, expr: ExprId, mode: RefMode, target: Option<BindingId>) {
        let created_depth = self.ctx.scopes.current_depth();
        let (target_name, target_depth) = match target {
            Some(target) => (
                Some(self.ctx.binding(target).name),
                self.ctx.binding_depth(target),
            ),
            None => (None, created_depth),
        };
        self.annotations.insert(
            expr,
            RefAnnotation {
                mode,
                target,
                target_name,
                target_depth,
                created_depth,
                holder: None,
                lifetime_bound: None,
            },
        );
    }

    // Walk

    fn walk_block(&mut self, block: &Block, kind: ScopeKind) -> Result<(), CheckError> {
        let scope = self.ctx.enter(kind)?;
        for &stmt in &block.stmts {
            self.walk_stmt(stmt)?;
        }
        self.close_scope(scope)
    }

    fn close_scope(&mut self, scope: ScopeId) -> Result<(), CheckError> {
        for dropped in self.ctx.exit(scope)? {
            self.release(dropped);
            // Loans on a dropped binding end with it. Holders that outlive
            // it are reported by the lifetime analyzer.
            let on_dropped: Loans = self
                .live
                .live()
                .filter(|(loan, _)| self.loans[loan.index()].target == dropped)
                .map(|(loan, _)| loan)
                .collect();
            for loan in on_dropped {
                self.live.set(loan, None);
            }
        }
        Ok(())
    }

    fn walk_stmt(&mut self, id: StmtId) -> Result<(), CheckError> {
        ensure_sufficient_stack(|| self.walk_stmt_inner(id))
    }

    fn walk_stmt_inner(&mut self, id: StmtId) -> Result<(), CheckError> {
        let first_loan = self.loans.len();
        let stmt = self.ctx.stmt(id);
        match &stmt.kind {
            StmtKind::Let {
                name,
                name_span,
                mutable,
                ty,
                init,
            } => {
                let loans = match init {
                    Some(init) => self.eval(*init, true)?,
                    None => Loans::new(),
                };
                let state = if init.is_some() {
                    OwnershipState::Owned
                } else {
                    OwnershipState::Uninitialized
                };
                let binding = self.ctx.declare(
                    *name,
                    *name_span,
                    *mutable,
                    ty.clone(),
                    BindingKind::Local,
                    state,
                );
                self.hold(&loans, binding);
            }
            StmtKind::Assign {
                target,
                value,
                compound,
            } => self.assign(*target, *value, compound.is_none(), stmt.span)?,
            StmtKind::Expr(expr) => {
                self.eval(*expr, false)?;
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.eval(*value, true)?;
                }
                self.diverged = true;
            }
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                self.eval(*cond, false)?;
                self.sweep_temporaries(first_loan);
                let entry_diverged = self.diverged;
                let before = self.live.clone();

                self.walk_block(then_block, ScopeKind::Branch)?;
                let then_live = std::mem::replace(&mut self.live, before);
                let then_diverged = self.diverged;

                self.diverged = entry_diverged;
                if let Some(else_block) = else_block {
                    self.walk_block(else_block, ScopeKind::Branch)?;
                }
                let else_diverged = self.diverged;

                match (then_diverged, else_diverged) {
                    (false, false) => self.live.union(&then_live),
                    (false, true) => self.live = then_live,
                    (true, _) => {}
                }
                self.diverged = then_diverged && else_diverged;
            }
            StmtKind::While { cond, body } => self.walk_loop(Some(*cond), body)?,
            StmtKind::Loop { body } => self.walk_loop(None, body)?,
            StmtKind::Match { scrutinee, arms } => {
                self.eval(*scrutinee, false)?;
                self.sweep_temporaries(first_loan);
                self.walk_arms(arms)?;
            }
            StmtKind::Break => self.leave_loop(Exit::Break),
            StmtKind::Continue => self.leave_loop(Exit::Continue),
            StmtKind::Block(block) => self.walk_block(block, ScopeKind::Block)?,
            StmtKind::Unsafe(block) => {
                let outer = std::mem::replace(&mut self.in_unsafe, true);
                self.walk_block(block, ScopeKind::Block)?;
                self.in_unsafe = outer;
            }
        }
        self.sweep_temporaries(first_loan);
        Ok(())
    }

    fn walk_arms(&mut self, arms: &[MatchArm]) -> Result<(), CheckError> {
        let entry_diverged = self.diverged;
        let before = self.live.clone();
        let mut ends: Vec<LiveLoans> = Vec::new();
        for arm in arms {
            self.live = before.clone();
            self.diverged = entry_diverged;
            if let Some(guard) = arm.guard {
                let first = self.loans.len();
                self.eval(guard, false)?;
                self.sweep_temporaries(first);
            }
            self.walk_block(&arm.body, ScopeKind::Branch)?;
            if !self.diverged {
                ends.push(std::mem::take(&mut self.live));
            }
        }

        self.diverged = entry_diverged;
        let mut ends = ends.into_iter();
        match ends.next() {
            Some(first) => {
                self.live = first;
                for end in ends {
                    self.live.union(&end);
                }
            }
            None if arms.is_empty() => self.live = before,
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
                let iteration_start = self.loans.len();
                self.eval(cond, false)?;
                self.sweep_temporaries(iteration_start);
            }
            let head = self.live.clone();
            self.loops.push();
            self.walk_block(body, ScopeKind::Loop)?;
            let exits = self.loops.pop();

            if self.diverged {
                self.live = head;
            } else {
                self.live.union(&head);
            }
            for live in &exits.continues {
                self.live.union(live);
            }
            breaks.extend(exits.breaks);
            self.forget_dropped();
            self.diverged = entry_diverged;
        }

        let mut exits = breaks.into_iter();
        if cond.is_none() {
            // only `break` leaves a `loop`
            let Some(first) = exits.next() else {
                self.diverged = true;
                return Ok(());
            };
            self.live = first;
        }
        for live in exits {
            self.live.union(&live);
        }
        self.forget_dropped();
        Ok(())
    }

    fn leave_loop(&mut self, exit: Exit) {
        if !self.diverged && !self.loops.record(exit, self.live.clone()) {
            tracing::trace!(?exit, "loop exit outside a loop");
        }
        self.diverged = true;
    }

    fn assign(
        &mut self,
        target: ExprId,
        value: ExprId,
        plain: bool,
        span: Span,
    ) -> Result<(), CheckError> {
        let proj = project(self.ctx.module, target);
        let root = proj
            .root_name(self.ctx.module)
            .and_then(|name| self.ctx.resolve(name).map(|id| (name, id)))
            .filter(|(_, id)| self.ctx.binding(*id).kind != BindingKind::Global);

        let Some((name, holder)) = root else {
            self.eval(value, plain)?;
            self.write_through(&proj, span)?;
            return Ok(());
        };

        let first = self.loans.len();
        if !proj.projected {
            // Old loans die first unless the new value reads them.
            if plain && !mentions(self.ctx.module, value, name) {
                self.release(holder);
            }
            let loans = self.eval(value, plain)?;
            // borrows taken while computing the value have ended
            self.sweep_temporaries_except(first, &loans);
            self.check_mutation(holder, span);
            if plain {
                self.release(holder);
            }
            self.hold(&loans, holder);
            return Ok(());
        }

        for &index in &proj.indices {
            self.eval(index, false)?;
        }
        let loans = self.eval(value, plain)?;
        self.sweep_temporaries_except(first, &loans);
        match self.ctx.binding(holder).ty.reference {
            Some(RefMode::Shared) => {
                let name = self.ctx.binding_name(holder);
                self.ctx.report(report::assign_through_shared(name, span));
            }
            Some(RefMode::Exclusive) => {}
            None => {
                self.check_mutation(holder, span);
                // references stored into an aggregate live as long as it
                self.hold(&loans, holder);
            }
        }
        Ok(())
    }

    /// Assignment whose target is not rooted at a local: `*r = v`,
    /// `(*r).f = v`, or a temporary.
    fn write_through(&mut self, proj: &Projection, span: Span) -> Result<(), CheckError> {
        for &index in &proj.indices {
            self.eval(index, false)?;
        }
        let ExprKind::Deref(operand) = &self.ctx.expr(proj.base).kind else {
            if proj.root_name(self.ctx.module).is_none() {
                self.eval(proj.base, false)?;
            }
            return Ok(());
        };

        self.check_raw_deref(*operand, self.ctx.expr(proj.base).span);
        let reference = match &self.ctx.expr(*operand).kind {
            ExprKind::Ident(name) => self.ctx.resolve(*name),
            _ => None,
        };
        let held = self.eval(*operand, false)?;

        let Some(reference) = reference else {
            return Ok(());
        };
        let binding = self.ctx.binding(reference);
        let shared = match binding.ty.reference {
            Some(mode) => mode == RefMode::Shared,
            None => !held.is_empty()
                && held
                    .iter()
                    .all(|loan| self.loans[loan.index()].mode == RefMode::Shared),
        };
        if shared {
            let name = self.ctx.binding_name(reference);
            self.ctx.report(report::assign_through_shared(name, span));
        }
        Ok(())
    }

    /// Evaluate an expression, returning the loans its value carries.
    /// `consume` is set in contexts that take ownership of the value.
    fn eval(&mut self, id: ExprId, consume: bool) -> Result<Loans, CheckError> {
        ensure_sufficient_stack(|| self.eval_inner(id, consume))
    }

    fn eval_inner(&mut self, id: ExprId, consume: bool) -> Result<Loans, CheckError> {
        let expr = self.ctx.expr(id);
        let loans = match &expr.kind {
            ExprKind::Lit(_) => Loans::new(),
            ExprKind::Ident(name) => match self.local(*name) {
                Some(binding) => {
                    if consume && !self.ctx.binding(binding).ty.is_copy() {
                        self.check_move(binding, expr.span);
                    }
                    self.held_by(binding)
                }
                None => Loans::new(),
            },
            ExprKind::Field { .. } | ExprKind::Index { .. } => {
                let proj = project(self.ctx.module, id);
                for &index in &proj.indices {
                    self.eval(index, false)?;
                }
                match proj.root_name(self.ctx.module).and_then(|n| self.local(n)) {
                    Some(binding) => {
                        let ty = &self.ctx.binding(binding).ty;
                        let moves_field = proj.first_field.and_then(|f| ty.field_class(f))
                            == Some(TypeClass::Move);
                        if consume && moves_field && !proj.indexed && !ty.is_reference() {
                            self.check_move(binding, expr.span);
                        }
                        self.held_by(binding)
                    }
                    None if proj.root_name(self.ctx.module).is_some() => Loans::new(),
                    None => self.eval(proj.base, false)?,
                }
            }
            ExprKind::Ref { mode, place } => self.reference(id, *mode, *place)?,
            ExprKind::Deref(operand) => {
                self.check_raw_deref(*operand, expr.span);
                let loans = self.eval(*operand, false)?;
                // `*r` carries whatever the referent itself holds
                let mut carried = Loans::new();
                for loan in loans {
                    for held in self.held_by(self.loans[loan.index()].target) {
                        if !carried.contains(&held) {
                            carried.push(held);
                        }
                    }
                }
                carried
            }
            ExprKind::Call { callee, args } => {
                let callee = self.ctx.name(*callee);
                let mut carried = Loans::new();
                for (index, &arg) in args.iter().enumerate() {
                    let effect = self.ctx.builtins.effect(callee, index);
                    let loans = match effect.borrow_mode() {
                        Some(mode) => self.implicit_borrow(arg, mode)?,
                        None => self.eval(arg, effect == ParamEffect::Moves)?,
                    };
                    carried.extend(loans);
                }
                if self.ctx.builtins.returns_borrowed(callee) {
                    carried
                } else {
                    Loans::new()
                }
            }
            ExprKind::StructLit { fields, .. } => {
                let mut carried = Loans::new();
                for field in fields {
                    carried.extend(self.eval(field.value, true)?);
                }
                carried
            }
            ExprKind::Binary { left, right, .. } => {
                self.eval(*left, false)?;
                self.eval(*right, false)?;
                Loans::new()
            }
            ExprKind::HeapAlloc(operand) => {
                self.eval(*operand, true)?;
                Loans::new()
            }
            ExprKind::Closure { params, body } => {
                let saved = self.diverged;
                let loops = std::mem::take(&mut self.loops);
                let scope = self.ctx.enter(ScopeKind::Closure)?;
                for param in params {
                    self.ctx.declare_param(param, BindingKind::Param);
                }
                self.walk_block(body, ScopeKind::Block)?;
                self.close_scope(scope)?;
                self.loops = loops;
                self.diverged = saved;
                Loans::new()
            }
        };
        Ok(loans)
    }

    /// `&place` / `&!place`.
    fn reference(
        &mut self,
        id: ExprId,
        mode: RefMode,
        place: ExprId,
    ) -> Result<Loans, CheckError> {
        let span = self.ctx.expr(id).span;
        let proj = project(self.ctx.module, place);
        for &index in &proj.indices {
            self.eval(index, false)?;
        }

        if let ExprKind::Deref(operand) = &self.ctx.expr(proj.base).kind {
            // reborrow: the new reference carries the old one's loans
            self.check_raw_deref(*operand, self.ctx.expr(proj.base).span);
            let loans = self.eval(*operand, false)?;
            self.annotate(id, mode, None);
            return Ok(loans);
        }

        let Some(name) = proj.root_name(self.ctx.module) else {
            self.eval(proj.base, false)?;
            self.annotate(id, mode, None);
            return Ok(Loans::new());
        };
        let Some(target) = self.local(name) else {
            self.annotate(id, mode, None);
            return Ok(Loans::new());
        };

        if proj.projected && self.ctx.binding(target).ty.is_reference() {
            // `&r.f` auto-derefs through `r`
            self.annotate(id, mode, None);
            return Ok(self.held_by(target));
        }

        let loan = self.borrow(target, mode, span, Some(id));
        self.annotate(id, mode, Some(target));
        Ok(smallvec![loan])
    }

    /// Argument to a borrowing builtin parameter.
    fn implicit_borrow(&mut self, arg: ExprId, mode: RefMode) -> Result<Loans, CheckError> {
        let proj = project(self.ctx.module, arg);
        let target = proj
            .root_name(self.ctx.module)
            .and_then(|name| self.local(name))
            .filter(|&binding| !self.ctx.binding(binding).ty.is_reference());

        match target {
            Some(target) => {
                for &index in &proj.indices {
                    self.eval(index, false)?;
                }
                let span = self.ctx.expr(arg).span;
                Ok(smallvec![self.borrow(target, mode, span, None)])
            }
            // already a reference (or a temporary): pass it through
            None => self.eval(arg, false),
        }
    }

    /// Report `*operand` when the operand is a raw pointer and no `unsafe`
    /// block encloses the dereference.
    fn check_raw_deref(&mut self, operand: ExprId, span: Span) {
        if self.in_unsafe {
            return;
        }
        let pointer = match &self.ctx.expr(operand).kind {
            ExprKind::Ident(name) => self
                .ctx
                .resolve(*name)
                .filter(|&id| self.ctx.binding(id).ty.raw_pointer)
                .map(|_| self.ctx.name(*name).to_owned()),
            ExprKind::Call { callee, .. } => {
                let callee = self.ctx.name(*callee);
                self.ctx
                    .builtins
                    .returns_raw(callee)
                    .then(|| format!("{callee}(..)"))
            }
            _ => None,
        };
        if let Some(pointer) = pointer {
            tracing::trace!(pointer = %pointer, "raw pointer dereference outside unsafe");
            self.ctx
                .report(report::raw_deref_outside_unsafe(&pointer, span));
        }
    }

    /// Resolve `name` to a non-global binding.
    fn local(&self, name: Name) -> Option<BindingId> {
        self.ctx
            .resolve(name)
            .filter(|&id| self.ctx.binding(id).kind != BindingKind::Global)
    }
}
