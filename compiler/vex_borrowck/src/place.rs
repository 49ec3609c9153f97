//! Place expressions: `x`, `x.f`, `x[i]`, `(*r).f`.
//!
//! Every phase needs the same three facts about a place: the expression at
//! the bottom of its field/index chain, the first field projected off it,
//! and the index operands that get evaluated on the way.

use smallvec::SmallVec;
use vex_ir::{ExprId, ExprKind, Module, Name};
use vex_stack::ensure_sufficient_stack;

/// A place split into its base and projections.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projection {
    /// Innermost non-projection expression: an identifier, a dereference,
    /// or a temporary.
    pub base: ExprId,
    /// The field projected directly off the base, when the first
    /// projection is a field access.
    pub first_field: Option<Name>,
    /// Whether any projection is an index.
    pub indexed: bool,
    /// Index operands, outermost first.
    pub indices: SmallVec<[ExprId; 2]>,
    /// Whether there was any projection at all.
    pub projected: bool,
}

impl Projection {
    /// Base identifier, if the place is rooted at a name.
    pub fn root_name(&self, module: &Module) -> Option<Name> {
        match module.expr(self.base).kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}

/// Walk the field/index chain of `expr` down to its base.
pub fn project(module: &Module, expr: ExprId) -> Projection {
    let mut indices = SmallVec::new();
    let mut indexed = false;
    let mut first_field = None;
    let mut cursor = expr;

    loop {
        match &module.expr(cursor).kind {
            ExprKind::Field { base, field } => {
                first_field = Some(*field);
                cursor = *base;
            }
            ExprKind::Index { base, index } => {
                indices.push(*index);
                indexed = true;
                first_field = None;
                cursor = *base;
            }
            _ => break,
        }
    }

    Projection {
        base: cursor,
        first_field,
        indexed,
        indices,
        projected: cursor != expr,
    }
}

/// Check whether `expr` reads `name` anywhere, closures included.
pub fn mentions(module: &Module, expr: ExprId, name: Name) -> bool {
    ensure_sufficient_stack(|| mentions_inner(module, expr, name))
}

fn mentions_inner(module: &Module, expr: ExprId, name: Name) -> bool {
    match &module.expr(expr).kind {
        ExprKind::Lit(_) => false,
        ExprKind::Ident(n) => *n == name,
        ExprKind::Field { base, .. } | ExprKind::Deref(base) | ExprKind::HeapAlloc(base) => {
            mentions(module, *base, name)
        }
        ExprKind::Ref { place, .. } => mentions(module, *place, name),
        ExprKind::Index { base, index } => {
            mentions(module, *base, name) || mentions(module, *index, name)
        }
        ExprKind::Binary { left, right, .. } => {
            mentions(module, *left, name) || mentions(module, *right, name)
        }
        ExprKind::Call { args, .. } => args.iter().any(|&arg| mentions(module, arg, name)),
        ExprKind::StructLit { fields, .. } => {
            fields.iter().any(|field| mentions(module, field.value, name))
        }
        // Closure bodies are not scanned; assume they mention everything.
        ExprKind::Closure { .. } => true,
    }
}
