//! Diagnostic constructors for every rejection the checker makes.
//!
//! Messages always name the binding involved. The primary label marks the
//! offending site; secondary labels point at the declaration, move, or
//! borrow that explains it.

use vex_diagnostic::{Diagnostic, ErrorCode, Suggestion};
use vex_ir::{RefMode, Span};

/// Assignment to a binding declared without `!`.
pub fn immutable_assign(name: &str, assign: Span, decl: Span, is_global: bool) -> Diagnostic {
    let diag = Diagnostic::error(ErrorCode::E1001)
        .with_message(format!("cannot assign twice to immutable variable `{name}`"))
        .with_label(assign, "cannot assign to immutable variable")
        .with_secondary_label(decl, format!("`{name}` declared here"));
    if is_global {
        diag.with_note(format!("`{name}` is a module-level item and can never be assigned"))
    } else {
        diag.with_hint(format!(
            "consider making this binding mutable: `let! {name}`"
        ))
    }
}

/// Assignment to a field or element of an immutable binding.
pub fn immutable_place_assign(
    name: &str,
    assign: Span,
    decl: Span,
    is_receiver: bool,
) -> Diagnostic {
    let diag = Diagnostic::error(ErrorCode::E1002)
        .with_message(format!("cannot assign to a part of immutable variable `{name}`"))
        .with_label(assign, "cannot assign through an immutable binding")
        .with_secondary_label(decl, format!("`{name}` declared here"));
    if is_receiver {
        diag.with_hint("add `!` to make it mutable: `fn method()!`")
    } else {
        diag.with_hint(format!(
            "consider making this binding mutable: `let! {name}`"
        ))
    }
}

/// Read of a binding whose value was moved away.
pub fn use_after_move(name: &str, use_site: Span, moved_at: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2001)
        .with_message(format!("use of moved value: `{name}`"))
        .with_label(use_site, "value used here after move")
        .with_secondary_label(moved_at, "value moved here")
        .with_hint("consider cloning the value")
}

/// Read of a field that was moved out, or of an aggregate missing a field.
pub fn use_of_moved_field(
    name: &str,
    field: &str,
    use_site: Span,
    moved_at: Span,
    whole: bool,
) -> Diagnostic {
    let message = if whole {
        format!("use of partially moved value: `{name}`")
    } else {
        format!("use of moved value: `{name}.{field}`")
    };
    Diagnostic::error(ErrorCode::E2001)
        .with_message(message)
        .with_label(use_site, "value used here after partial move")
        .with_secondary_label(moved_at, format!("`{name}.{field}` moved here"))
        .with_hint("consider cloning the field before moving it")
}

/// Read of a binding that is not initialized on every path.
pub fn uninitialized_use(name: &str, use_site: Span, decl: Span, conditional: bool) -> Diagnostic {
    let (message, label) = if conditional {
        (
            format!("used binding `{name}` is possibly-uninitialized"),
            format!("`{name}` used here but it is possibly-uninitialized"),
        )
    } else {
        (
            format!("used binding `{name}` isn't initialized"),
            format!("`{name}` used here but it isn't initialized"),
        )
    };
    Diagnostic::error(ErrorCode::E2002)
        .with_message(message)
        .with_label(use_site, label)
        .with_secondary_label(decl, format!("`{name}` declared here"))
        .with_hint("assign a value on every path before reading it")
}

/// Exclusive reference requested while another reference is live.
pub fn exclusive_conflict(
    name: &str,
    borrow: Span,
    existing: Span,
    existing_mode: RefMode,
) -> Diagnostic {
    Diagnostic::error(ErrorCode::E3001)
        .with_message(format!(
            "cannot borrow `{name}` as exclusive because it is already borrowed as {}",
            existing_mode.describe()
        ))
        .with_label(borrow, "exclusive borrow occurs here")
        .with_secondary_label(
            existing,
            format!("{} borrow occurs here", existing_mode.describe()),
        )
        .with_note("an exclusive reference cannot coexist with any other reference")
}

/// Shared reference requested while an exclusive reference is live.
pub fn shared_conflict(name: &str, borrow: Span, existing: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E3002)
        .with_message(format!(
            "cannot borrow `{name}` as shared because it is also borrowed as exclusive"
        ))
        .with_label(borrow, "shared borrow occurs here")
        .with_secondary_label(existing, "exclusive borrow occurs here")
}

/// Assignment to a binding that is currently borrowed.
pub fn mutation_while_borrowed(name: &str, assign: Span, borrow: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E3003)
        .with_message(format!("cannot assign to `{name}` because it is borrowed"))
        .with_label(assign, format!("`{name}` is assigned here but it was already borrowed"))
        .with_secondary_label(borrow, format!("`{name}` is borrowed here"))
}

/// Move of a binding that is currently borrowed.
pub fn move_while_borrowed(name: &str, moved: Span, borrow: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E3004)
        .with_message(format!("cannot move `{name}` because it is borrowed"))
        .with_label(moved, format!("move out of `{name}` occurs here"))
        .with_secondary_label(borrow, format!("borrow of `{name}` occurs here"))
}

/// Write through a shared reference.
pub fn assign_through_shared(name: &str, assign: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E3005)
        .with_message(format!(
            "cannot assign through `{name}`, which is a shared reference"
        ))
        .with_label(assign, "cannot assign through a `&` reference")
        .with_hint(format!(
            "consider taking an exclusive reference: `&!` instead of `&` for `{name}`"
        ))
}

/// `*p` on a raw pointer with no enclosing `unsafe` block.
pub fn raw_deref_outside_unsafe(pointer: &str, deref: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E3006)
        .with_message(format!(
            "dereference of raw pointer `{pointer}` requires an unsafe block"
        ))
        .with_label(deref, "dereference of raw pointer")
        .with_note("nothing guarantees a raw pointer points at live memory")
        .with_hint("wrap the dereference in an `unsafe { }` block")
}

/// `return` of a reference to a local.
pub fn escaping_return(name: &str, ret: Span, decl: Span, mode: RefMode) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4001)
        .with_message(format!("cannot return reference to local variable `{name}`"))
        .with_label(
            ret,
            format!(
                "returns {} reference to data owned by the current function",
                article(mode)
            ),
        )
        .with_secondary_label(decl, format!("`{name}` is declared here"))
        .with_hint("consider returning an owned value or accepting a reference parameter")
}

/// A reference stored in an outer binding outlives its inner referent.
pub fn outlives_block(target: &str, holder: &str, scope_end: Span, borrow: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4002)
        .with_message(format!("`{target}` does not live long enough"))
        .with_label(scope_end, format!("`{target}` dropped here while still borrowed"))
        .with_secondary_label(borrow, format!("borrowed value stored in `{holder}` here"))
        .with_hint("ensure the referenced value outlives the reference")
}

/// Use of a name whose scope already closed.
pub fn use_after_scope(
    name: &str,
    use_site: Span,
    decl: Span,
    similar: Option<&str>,
) -> Diagnostic {
    let diag = Diagnostic::error(ErrorCode::E4003)
        .with_message(format!("use of `{name}` after its scope ended"))
        .with_label(use_site, "not in scope here")
        .with_secondary_label(decl, format!("`{name}` was declared in a scope that has closed"));
    match similar {
        Some(candidate) => diag
            .with_hint(format!("did you mean `{candidate}`?"))
            .with_fix(Suggestion::rename(use_site, candidate)),
        None => diag.with_hint(format!("declare `{name}` in an enclosing scope")),
    }
}

fn article(mode: RefMode) -> &'static str {
    match mode {
        RefMode::Shared => "a shared",
        RefMode::Exclusive => "an exclusive",
    }
}
