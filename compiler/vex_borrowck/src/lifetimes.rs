//! Phase 4: references that outlive their referents.
//!
//! The analyzer tracks, for every binding, which bindings its value points
//! into. Three situations are rejected:
//!
//! - a `return` whose value points into a local of the function body;
//! - a binding of an outer scope still pointing into a binding declared
//!   in an inner scope when that inner scope closes;
//! - a name used after the scope that declared it has closed.
//!
//! Parameters and the receiver outlive the call, so references into them
//! (and into the receiver's fields) may escape. Heap allocations take
//! ownership of their operand and point into nothing.
//!
//! Dereferencing follows the chain: if `r` points into `x`, then `*r`
//! points wherever `x` does, and a reborrow `&*r` points into `x`.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::{smallvec, SmallVec};
use vex_ir::{
    Block, ExprId, ExprKind, Function, MatchArm, Name, RefMode, Span, StmtId, StmtKind,
};
use vex_stack::ensure_sufficient_stack;

use crate::flow::{Exit, LoopStack};
use crate::place::project;
use crate::suggest::suggest_similar;
use crate::{
    report, BindingId, BindingKind, CheckError, CheckerContext, FunctionAnnotations,
    OwnershipState, ScopeKind,
};

/// One binding a value points into.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Pointee {
    target: BindingId,
    mode: RefMode,
    /// The reference expression that created the pointer.
    borrow: Span,
}

type Pointees = SmallVec<[Pointee; 2]>;

/// What every tracked binding points into.
type PointsTo = FxHashMap<BindingId, Pointees>;

/// Lifetime bounds computed for one function, per reference expression.
pub type LifetimeBounds = Vec<(ExprId, u32)>;

/// Check one function.
///
/// `annotations` are the borrow validator's results for the module; the
/// analyzer takes each reference's mode from them. Returns the lifetime
/// bound of every reference expression it resolved.
pub fn check_function(
    ctx: &mut CheckerContext<'_>,
    func: &Function,
    annotations: &FunctionAnnotations,
) -> Result<LifetimeBounds, CheckError> {
    let scope = ctx.enter_function(func)?;
    let mut analyzer = LifetimeAnalyzer {
        ctx,
        annotations,
        points_to: FxHashMap::default(),
        closed: FxHashMap::default(),
        reported: FxHashSet::default(),
        bounds: Vec::new(),
        diverged: false,
        loops: LoopStack::default(),
    };
    analyzer.walk_block(&func.body, ScopeKind::Block)?;
    analyzer.ctx.exit_function(func, scope)?;
    Ok(analyzer.bounds)
}

struct LifetimeAnalyzer<'c, 'a> {
    ctx: &'c mut CheckerContext<'a>,
    annotations: &'c FunctionAnnotations,
    points_to: PointsTo,
    /// Names dropped by closed scopes, with their declaration spans.
    closed: FxHashMap<Name, Span>,
    /// (holder, target) pairs already reported as outliving.
    reported: FxHashSet<(BindingId, BindingId)>,
    bounds: LifetimeBounds,
    diverged: bool,
    loops: LoopStack<PointsTo>,
}

impl LifetimeAnalyzer<'_, '_> {
    fn walk_block(&mut self, block: &Block, kind: ScopeKind) -> Result<(), CheckError> {
        let scope = self.ctx.enter(kind)?;
        for &stmt in &block.stmts {
            self.walk_stmt(stmt)?;
        }
        let dropped = self.ctx.exit(scope)?;
        self.close(&dropped, block.span.end_point());
        Ok(())
    }

    /// Handle the bindings dropped by a scope closing at `scope_end`.
    fn close(&mut self, dropped: &[BindingId], scope_end: Span) {
        for &binding in dropped {
            self.points_to.remove(&binding);
            let binding = self.ctx.binding(binding);
            if binding.kind != BindingKind::Global {
                self.closed.insert(binding.name, binding.span);
            }
        }

        let mut holders: Vec<BindingId> = self.points_to.keys().copied().collect();
        holders.sort_unstable();
        for holder in holders {
            let Some(pointees) = self.points_to.get_mut(&holder) else {
                continue;
            };
            let (dangling, kept): (Pointees, Pointees) = pointees
                .iter()
                .copied()
                .partition(|p| dropped.contains(&p.target));
            if dangling.is_empty() {
                continue;
            }
            *pointees = kept;

            for pointee in dangling {
                if !self.reported.insert((holder, pointee.target)) {
                    continue;
                }
                let target = self.ctx.binding_name(pointee.target);
                let holder_name = self.ctx.binding_name(holder);
                tracing::trace!(target, holder = holder_name, "reference outlives referent");
                self.ctx.report(report::outlives_block(
                    target,
                    holder_name,
                    scope_end,
                    pointee.borrow,
                ));
            }
        }
        self.points_to.retain(|_, pointees| !pointees.is_empty());
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
                let pointees = match init {
                    Some(init) => self.eval(*init)?,
                    None => Pointees::new(),
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
                if !pointees.is_empty() {
                    self.points_to.insert(binding, pointees);
                }
            }
            StmtKind::Assign {
                target,
                value,
                compound,
            } => {
                let pointees = self.eval(*value)?;
                self.assign(*target, pointees, compound.is_none())?;
            }
            StmtKind::Expr(expr) => {
                self.eval(*expr)?;
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    let pointees = self.eval(*value)?;
                    self.check_escape(&pointees, stmt.span);
                }
                self.diverged = true;
            }
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                self.eval(*cond)?;
                let entry_diverged = self.diverged;
                let before = self.points_to.clone();

                self.walk_block(then_block, ScopeKind::Branch)?;
                let then_points = std::mem::replace(&mut self.points_to, before);
                let then_diverged = self.diverged;

                self.diverged = entry_diverged;
                if let Some(else_block) = else_block {
                    self.walk_block(else_block, ScopeKind::Branch)?;
                }
                let else_diverged = self.diverged;

                match (then_diverged, else_diverged) {
                    (false, false) => self.union(then_points),
                    (false, true) => self.points_to = then_points,
                    (true, _) => {}
                }
                self.diverged = then_diverged && else_diverged;
            }
            StmtKind::While { cond, body } => self.walk_loop(Some(*cond), body)?,
            StmtKind::Loop { body } => self.walk_loop(None, body)?,
            StmtKind::Match { scrutinee, arms } => {
                self.eval(*scrutinee)?;
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

    fn walk_arms(&mut self, arms: &[MatchArm]) -> Result<(), CheckError> {
        let entry_diverged = self.diverged;
        let before = self.points_to.clone();
        let mut ends: Vec<PointsTo> = Vec::new();
        for arm in arms {
            self.points_to = before.clone();
            self.diverged = entry_diverged;
            if let Some(guard) = arm.guard {
                self.eval(guard)?;
            }
            self.walk_block(&arm.body, ScopeKind::Branch)?;
            if !self.diverged {
                ends.push(std::mem::take(&mut self.points_to));
            }
        }

        self.diverged = entry_diverged;
        let mut ends = ends.into_iter();
        match ends.next() {
            Some(first) => {
                self.points_to = first;
                for end in ends {
                    self.union(end);
                }
            }
            None if arms.is_empty() => self.points_to = before,
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
                self.eval(cond)?;
            }
            let head = self.points_to.clone();
            self.loops.push();
            self.walk_block(body, ScopeKind::Loop)?;
            let exits = self.loops.pop();

            if self.diverged {
                self.points_to = head;
            } else {
                self.union(head);
            }
            for state in exits.continues {
                self.union(state);
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
            self.points_to = first;
        }
        for state in exits {
            self.union(state);
        }
        self.forget_dropped();
        Ok(())
    }

    fn leave_loop(&mut self, exit: Exit) {
        if !self.diverged && !self.loops.record(exit, self.points_to.clone()) {
            tracing::trace!(?exit, "loop exit outside a loop");
        }
        self.diverged = true;
    }

    /// Forget pointers held by, or into, bindings whose scope has closed.
    /// States captured at a loop exit inside a nested scope still have them;
    /// the scope's own close already reported anything left dangling.
    fn forget_dropped(&mut self) {
        let ctx: &CheckerContext<'_> = self.ctx;
        let dropped = |id: BindingId| matches!(ctx.binding(id).state, OwnershipState::Dropped);
        self.points_to.retain(|&holder, pointees| {
            pointees.retain(|p| !dropped(p.target));
            !dropped(holder) && !pointees.is_empty()
        });
    }

    fn union(&mut self, other: PointsTo) {
        for (holder, theirs) in other {
            let ours = self.points_to.entry(holder).or_default();
            for pointee in theirs {
                if !ours.iter().any(|p| p.target == pointee.target) {
                    ours.push(pointee);
                }
            }
        }
    }

    fn assign(
        &mut self,
        target: ExprId,
        pointees: Pointees,
        plain: bool,
    ) -> Result<(), CheckError> {
        let proj = project(self.ctx.module, target);
        for &index in &proj.indices {
            self.eval(index)?;
        }

        let ExprKind::Ident(name) = self.ctx.expr(proj.base).kind else {
            self.eval(proj.base)?;
            return Ok(());
        };
        let span = self.ctx.expr(proj.base).span;
        let Some(holder) = self.resolve_local(name, span) else {
            return Ok(());
        };

        if !proj.projected {
            if plain {
                self.points_to.remove(&holder);
            }
        } else if self.is_reference(holder) {
            // writes through `r.f` store into the referent
            return Ok(());
        }
        if !pointees.is_empty() {
            let entry = self.points_to.entry(holder).or_default();
            for pointee in pointees {
                if !entry.iter().any(|p| p.target == pointee.target) {
                    entry.push(pointee);
                }
            }
        }
        Ok(())
    }

    fn check_escape(&mut self, pointees: &Pointees, ret: Span) {
        let boundary_depth = self
            .ctx
            .scopes
            .body_boundary()
            .map_or(0, |scope| self.ctx.scopes.depth(scope));

        let mut seen: SmallVec<[BindingId; 2]> = SmallVec::new();
        for pointee in pointees {
            let binding = self.ctx.binding(pointee.target);
            let is_body_local = binding.kind == BindingKind::Local
                && self.ctx.binding_depth(pointee.target) > boundary_depth;
            if !is_body_local || seen.contains(&pointee.target) {
                continue;
            }
            seen.push(pointee.target);
            let name = self.ctx.binding_name(pointee.target);
            let decl = binding.span;
            tracing::trace!(target = name, mode = pointee.mode.describe(), "reference escapes");
            self.ctx
                .report(report::escaping_return(name, ret, decl, pointee.mode));
        }
    }

    /// Evaluate an expression, returning what its value points into.
    fn eval(&mut self, id: ExprId) -> Result<Pointees, CheckError> {
        ensure_sufficient_stack(|| self.eval_inner(id))
    }

    fn eval_inner(&mut self, id: ExprId) -> Result<Pointees, CheckError> {
        let expr = self.ctx.expr(id);
        let pointees = match &expr.kind {
            ExprKind::Lit(_) => Pointees::new(),
            ExprKind::Ident(name) => self.read(*name, expr.span),
            ExprKind::Field { .. } | ExprKind::Index { .. } => {
                let proj = project(self.ctx.module, id);
                for &index in &proj.indices {
                    self.eval(index)?;
                }
                self.eval(proj.base)?
            }
            ExprKind::Ref { mode, place } => self.reference(id, *mode, *place)?,
            ExprKind::Deref(operand) => {
                let referents = self.eval(*operand)?;
                self.through(&referents)
            }
            ExprKind::Call { callee, args } => {
                let callee = self.ctx.name(*callee);
                let mut carried = Pointees::new();
                for (index, &arg) in args.iter().enumerate() {
                    let effect = self.ctx.builtins.effect(callee, index);
                    let pointees = self.eval(arg)?;
                    match effect.borrow_mode() {
                        Some(mode) if pointees.is_empty() => {
                            carried.extend(self.implicit_pointee(arg, mode));
                        }
                        _ => carried.extend(pointees),
                    }
                }
                if self.ctx.builtins.returns_borrowed(callee) {
                    carried
                } else {
                    Pointees::new()
                }
            }
            ExprKind::StructLit { fields, .. } => {
                let mut carried = Pointees::new();
                for field in fields {
                    carried.extend(self.eval(field.value)?);
                }
                carried
            }
            ExprKind::Binary { left, right, .. } => {
                self.eval(*left)?;
                self.eval(*right)?;
                Pointees::new()
            }
            ExprKind::HeapAlloc(operand) => {
                self.eval(*operand)?;
                Pointees::new()
            }
            ExprKind::Closure { params, body } => {
                let saved = self.diverged;
                let loops = std::mem::take(&mut self.loops);
                let scope = self.ctx.enter(ScopeKind::Closure)?;
                for param in params {
                    self.ctx.declare_param(param, BindingKind::Param);
                }
                self.walk_block(body, ScopeKind::Block)?;
                let dropped = self.ctx.exit(scope)?;
                self.close(&dropped, body.span.end_point());
                self.loops = loops;
                self.diverged = saved;
                Pointees::new()
            }
        };
        Ok(pointees)
    }

    /// `&place` / `&!place`.
    fn reference(
        &mut self,
        id: ExprId,
        mode: RefMode,
        place: ExprId,
    ) -> Result<Pointees, CheckError> {
        let span = self.ctx.expr(id).span;
        let mode = self.annotations.get(&id).map_or(mode, |a| a.mode);
        let proj = project(self.ctx.module, place);
        for &index in &proj.indices {
            self.eval(index)?;
        }

        let pointees = match self.ctx.expr(proj.base).kind {
            ExprKind::Ident(name) => {
                let base_span = self.ctx.expr(proj.base).span;
                match self.resolve_local(name, base_span) {
                    // `&r.f` auto-derefs through a reference
                    Some(target) if proj.projected && self.is_reference(target) => {
                        self.points_to.get(&target).cloned().unwrap_or_default()
                    }
                    Some(target) => smallvec![Pointee {
                        target,
                        mode,
                        borrow: span,
                    }],
                    None => Pointees::new(),
                }
            }
            // reborrow: `&*r` points where `r` does
            ExprKind::Deref(operand) => self.eval(operand)?,
            _ => self.eval(proj.base)?,
        };

        let bound = pointees
            .iter()
            .map(|p| self.ctx.binding_depth(p.target))
            .max();
        if let Some(bound) = bound {
            self.bounds.push((id, bound));
        }
        Ok(pointees)
    }

    /// What the referents themselves point into: the value of `*r`.
    fn through(&self, referents: &Pointees) -> Pointees {
        let mut carried = Pointees::new();
        for referent in referents {
            let Some(pointees) = self.points_to.get(&referent.target) else {
                continue;
            };
            for &pointee in pointees {
                if !carried.iter().any(|p| p.target == pointee.target) {
                    carried.push(pointee);
                }
            }
        }
        carried
    }

    fn is_reference(&self, binding: BindingId) -> bool {
        self.ctx.binding(binding).ty.is_reference()
    }

    /// Pointee for an argument borrowed implicitly by a builtin.
    fn implicit_pointee(&mut self, arg: ExprId, mode: RefMode) -> Option<Pointee> {
        let proj = project(self.ctx.module, arg);
        let name = proj.root_name(self.ctx.module)?;
        let target = self.ctx.resolve(name)?;
        let binding = self.ctx.binding(target);
        if binding.kind == BindingKind::Global || binding.ty.is_reference() {
            return None;
        }
        Some(Pointee {
            target,
            mode,
            borrow: self.ctx.expr(arg).span,
        })
    }

    /// Value of a name: whatever the binding points into.
    fn read(&mut self, name: Name, span: Span) -> Pointees {
        self.resolve_local(name, span)
            .and_then(|binding| self.points_to.get(&binding).cloned())
            .unwrap_or_default()
    }

    /// Resolve a non-global name, reporting uses after scope end.
    fn resolve_local(&mut self, name: Name, span: Span) -> Option<BindingId> {
        match self.ctx.resolve(name) {
            Some(binding) if self.ctx.binding(binding).kind == BindingKind::Global => None,
            Some(binding) => Some(binding),
            None => {
                self.check_scope_end(name, span);
                None
            }
        }
    }

    fn check_scope_end(&mut self, name: Name, span: Span) {
        let Some(&decl) = self.closed.get(&name) else {
            return;
        };
        let text = self.ctx.name(name);
        let visible: Vec<&str> = self
            .ctx
            .scopes
            .visible_names()
            .map(|n| self.ctx.name(n))
            .collect();
        let similar = suggest_similar(text, visible);
        self.ctx
            .report(report::use_after_scope(text, span, decl, similar));
    }
}

#[cfg(test)]
mod tests;
