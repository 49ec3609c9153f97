//! Phase 1: assignment to immutable bindings.
//!
//! A single top-down walk. Declarations bind names with the mutability
//! written in the source; every assignment whose target is rooted at an
//! immutable binding is reported. Writes through a dereference are left to
//! the borrow validator.

use vex_ir::{BinaryOp, Block, ExprId, ExprKind, Function, Span, StmtId, StmtKind};
use vex_stack::ensure_sufficient_stack;

use crate::place::project;
use crate::{report, BindingKind, CheckError, CheckerContext, OwnershipState, ScopeKind};

/// Check one function, reporting into `ctx`.
pub fn check_function(ctx: &mut CheckerContext<'_>, func: &Function) -> Result<(), CheckError> {
    let scope = ctx.enter_function(func)?;
    walk_block(ctx, &func.body, ScopeKind::Block)?;
    ctx.exit_function(func, scope)
}

fn walk_block(
    ctx: &mut CheckerContext<'_>,
    block: &Block,
    kind: ScopeKind,
) -> Result<(), CheckError> {
    let scope = ctx.enter(kind)?;
    for &stmt in &block.stmts {
        walk_stmt(ctx, stmt)?;
    }
    ctx.exit(scope)?;
    Ok(())
}

fn walk_stmt(ctx: &mut CheckerContext<'_>, id: StmtId) -> Result<(), CheckError> {
    ensure_sufficient_stack(|| walk_stmt_inner(ctx, id))
}

fn walk_stmt_inner(ctx: &mut CheckerContext<'_>, id: StmtId) -> Result<(), CheckError> {
    let stmt = ctx.stmt(id);
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
                    walk_expr(ctx, *init)?;
                    OwnershipState::Owned
                }
                None => OwnershipState::Uninitialized,
            };
            ctx.declare(
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
            walk_expr(ctx, *value)?;
            walk_expr(ctx, *target)?;
            check_assignment(ctx, *target, *compound, stmt.span);
        }
        StmtKind::Expr(expr) => walk_expr(ctx, *expr)?,
        StmtKind::Return(value) => {
            if let Some(value) = value {
                walk_expr(ctx, *value)?;
            }
        }
        StmtKind::If {
            cond,
            then_block,
            else_block,
        } => {
            walk_expr(ctx, *cond)?;
            walk_block(ctx, then_block, ScopeKind::Branch)?;
            if let Some(else_block) = else_block {
                walk_block(ctx, else_block, ScopeKind::Branch)?;
            }
        }
        StmtKind::While { cond, body } => {
            walk_expr(ctx, *cond)?;
            walk_block(ctx, body, ScopeKind::Loop)?;
        }
        StmtKind::Loop { body } => walk_block(ctx, body, ScopeKind::Loop)?,
        StmtKind::Match { scrutinee, arms } => {
            walk_expr(ctx, *scrutinee)?;
            for arm in arms {
                if let Some(guard) = arm.guard {
                    walk_expr(ctx, guard)?;
                }
                walk_block(ctx, &arm.body, ScopeKind::Branch)?;
            }
        }
        StmtKind::Break | StmtKind::Continue => {}
        StmtKind::Block(block) | StmtKind::Unsafe(block) => {
            walk_block(ctx, block, ScopeKind::Block)?;
        }
    }
    Ok(())
}

/// Expressions hold no assignments of their own; only closure bodies do.
fn walk_expr(ctx: &mut CheckerContext<'_>, id: ExprId) -> Result<(), CheckError> {
    ensure_sufficient_stack(|| walk_expr_inner(ctx, id))
}

fn walk_expr_inner(ctx: &mut CheckerContext<'_>, id: ExprId) -> Result<(), CheckError> {
    match &ctx.expr(id).kind {
        ExprKind::Lit(_) | ExprKind::Ident(_) => {}
        ExprKind::Field { base, .. }
        | ExprKind::Deref(base)
        | ExprKind::HeapAlloc(base)
        | ExprKind::Ref { place: base, .. } => walk_expr(ctx, *base)?,
        ExprKind::Index { base, index } => {
            walk_expr(ctx, *base)?;
            walk_expr(ctx, *index)?;
        }
        ExprKind::Binary { left, right, .. } => {
            walk_expr(ctx, *left)?;
            walk_expr(ctx, *right)?;
        }
        ExprKind::Call { args, .. } => {
            for &arg in args {
                walk_expr(ctx, arg)?;
            }
        }
        ExprKind::StructLit { fields, .. } => {
            for field in fields {
                walk_expr(ctx, field.value)?;
            }
        }
        ExprKind::Closure { params, body } => {
            let scope = ctx.enter(ScopeKind::Closure)?;
            for param in params {
                ctx.declare_param(param, BindingKind::Param);
            }
            walk_block(ctx, body, ScopeKind::Block)?;
            ctx.exit(scope)?;
        }
    }
    Ok(())
}

fn check_assignment(
    ctx: &mut CheckerContext<'_>,
    target: ExprId,
    compound: Option<BinaryOp>,
    span: Span,
) {
    let proj = project(ctx.module, target);
    let Some(root) = proj.root_name(ctx.module) else {
        // `*r = v` and writes into temporaries
        return;
    };
    let Some(id) = ctx.resolve(root) else {
        return;
    };

    let binding = ctx.binding(id);
    if binding.declared_mutable {
        return;
    }
    // `r.f = v` through a reference mutates the referent, not `r`
    if proj.projected && binding.ty.is_reference() {
        return;
    }

    let name = ctx.name(root);
    let decl = binding.span;
    let kind = binding.kind;
    tracing::trace!(binding = name, projected = proj.projected, "assignment to immutable binding");

    let diag = if proj.projected {
        report::immutable_place_assign(name, span, decl, kind == BindingKind::Receiver)
    } else {
        report::immutable_assign(name, span, decl, kind == BindingKind::Global)
    };
    let diag = match compound {
        Some(op) => diag.with_note(format!("`{op}=` reads `{name}` and then assigns it")),
        None => diag,
    };
    ctx.report(diag);
}
