//! End-to-end checks over whole modules.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vex_diagnostic::{ErrorCode, Phase};
use vex_ir::{BinaryOp, ModuleBuilder, RefMode, StringInterner, ValueType};

use crate::test_helpers::{check, codes, main_module, point};

// === Scenarios ===

#[test]
fn scenario_reassign_immutable() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.int(42);
    let decl = b.let_("x", ValueType::copy(), init);
    let x = b.ident("x");
    let value = b.int(100);
    let assign = b.assign(x, value);
    let decl_span = b.let_name_span(decl);
    let assign_span = b.stmt_span(assign);
    let module = main_module(b, vec![decl, assign]);

    let outcome = check(&interner, &module);
    assert_eq!(codes(&outcome.diagnostics), vec![ErrorCode::E1001]);
    let diag = &outcome.diagnostics[0];
    assert_eq!(diag.primary_span(), Some(assign_span));
    assert_eq!(diag.secondary_spans().collect::<Vec<_>>(), vec![decl_span]);
    assert_eq!(outcome.blocking_phase, Some(Phase::Mutability));
}

#[test]
fn scenario_double_exclusive_borrow() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.int(42);
    let y = b.let_mut("y", ValueType::copy(), init);
    let y1 = b.ident("y");
    let first = b.exclusive_ref(y1);
    let r1 = b.let_("r1", ValueType::reference(RefMode::Exclusive), first);
    let y2 = b.ident("y");
    let second = b.exclusive_ref(y2);
    let r2 = b.let_("r2", ValueType::reference(RefMode::Exclusive), second);
    let second_span = b.expr_span(second);
    let module = main_module(b, vec![y, r1, r2]);

    let outcome = check(&interner, &module);
    assert_eq!(codes(&outcome.diagnostics), vec![ErrorCode::E3001]);
    assert_eq!(outcome.diagnostics[0].primary_span(), Some(second_span));
}

#[test]
fn scenario_return_exclusive_reference_to_local() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.int(7);
    let local = b.let_mut("local", ValueType::copy(), init);
    let l = b.ident("local");
    let reference = b.exclusive_ref(l);
    let ret = b.ret(Some(reference));
    let ret_span = b.stmt_span(ret);
    let body = b.block(vec![local, ret]);
    b.function("leak", Vec::new(), body);
    let module = b.finish();

    let outcome = check(&interner, &module);
    assert_eq!(codes(&outcome.diagnostics), vec![ErrorCode::E4001]);
    assert_eq!(outcome.diagnostics[0].primary_span(), Some(ret_span));
}

#[test]
fn scenario_use_after_move() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let ty = point(&b);
    let x = b.int(1);
    let y = b.int(2);
    let lit = b.struct_lit("Point", &[("x", x), ("y", y)]);
    let p = b.let_("p", ty.clone(), lit);
    let moved = b.ident("p");
    let q = b.let_("q", ty, moved);
    let again = b.ident("p");
    let call = b.call("use", vec![again]);
    let call = b.expr_stmt(call);
    let move_span = b.expr_span(moved);
    let use_span = b.expr_span(again);
    let module = main_module(b, vec![p, q, call]);

    let outcome = check(&interner, &module);
    assert_eq!(codes(&outcome.diagnostics), vec![ErrorCode::E2001]);
    let diag = &outcome.diagnostics[0];
    assert_eq!(diag.primary_span(), Some(use_span));
    assert_eq!(diag.secondary_spans().collect::<Vec<_>>(), vec![move_span]);
}

#[test]
fn scenario_conditionally_initialized() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let decl = b.declare("value", true, ValueType::copy());
    let cond = b.bool_lit(true);
    let target = b.ident("value");
    let one = b.int(1);
    let init = b.assign(target, one);
    let then_block = b.block(vec![init]);
    let print = b.call("println", Vec::new());
    let print = b.expr_stmt(print);
    let else_block = b.block(vec![print]);
    let branch = b.if_else(cond, then_block, Some(else_block));
    let read = b.ident("value");
    let result = b.let_("result", ValueType::copy(), read);
    let read_span = b.expr_span(read);
    let module = main_module(b, vec![decl, branch, result]);

    let outcome = check(&interner, &module);
    assert_eq!(codes(&outcome.diagnostics), vec![ErrorCode::E2002]);
    assert_eq!(outcome.diagnostics[0].primary_span(), Some(read_span));
}

#[test]
fn accepted_program_stays_accepted() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let param = b.param("limit", false, ValueType::copy());
    let zero = b.int(0);
    let total = b.let_mut("total", ValueType::copy(), zero);
    let t = b.ident("total");
    let reference = b.exclusive_ref(t);
    let r = b.let_("r", ValueType::reference(RefMode::Exclusive), reference);
    let r1 = b.ident("r");
    let deref = b.deref(r1);
    let limit = b.ident("limit");
    let store = b.assign(deref, limit);
    let scoped = b.block(vec![r, store]);
    let scoped = b.block_stmt(scoped);
    let t2 = b.ident("total");
    let ret = b.ret(Some(t2));
    let body = b.block(vec![total, scoped, ret]);
    b.function("fill", vec![param], body);
    let module = b.finish();

    let first = check(&interner, &module);
    assert!(first.diagnostics.is_empty());
    let second = check(&interner, &module);
    assert!(second.diagnostics.is_empty());
    assert_eq!(first.annotations, second.annotations);
}

#[test]
fn scenario_raw_pointer_read_outside_unsafe() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let size = b.int(8);
    let init = b.call("alloc", vec![size]);
    let p = b.let_("p", ValueType::raw_pointer(), init);
    let p1 = b.ident("p");
    let checked = b.deref(p1);
    let first = b.let_("first", ValueType::copy(), checked);
    let guarded = b.block(vec![first]);
    let guarded = b.unsafe_block(guarded);
    let p2 = b.ident("p");
    let unchecked = b.deref(p2);
    let unchecked_span = b.expr_span(unchecked);
    let second = b.let_("second", ValueType::copy(), unchecked);
    let module = main_module(b, vec![p, guarded, second]);

    let outcome = check(&interner, &module);
    assert_eq!(codes(&outcome.diagnostics), vec![ErrorCode::E3006]);
    assert_eq!(outcome.diagnostics[0].primary_span(), Some(unchecked_span));
    assert_eq!(outcome.blocking_phase, Some(Phase::Borrows));
}

#[test]
fn deeply_nested_expression_does_not_exhaust_the_stack() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let mut sum = b.int(0);
    for _ in 0..200_000 {
        let one = b.int(1);
        sum = b.binary(BinaryOp::Add, sum, one);
    }
    let x = b.let_("x", ValueType::copy(), sum);
    let module = main_module(b, vec![x]);

    let outcome = check(&interner, &module);
    assert!(outcome.diagnostics.is_empty());
}

#[test]
fn deeply_nested_blocks_do_not_exhaust_the_stack() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.int(1);
    let mut innermost = b.let_("x", ValueType::copy(), init);
    for _ in 0..20_000 {
        let block = b.block(vec![innermost]);
        innermost = b.block_stmt(block);
    }
    let module = main_module(b, vec![innermost]);

    let outcome = check(&interner, &module);
    assert!(outcome.diagnostics.is_empty());
}

// === Property tests ===

/// One statement of a generated straight-line program over `v0..v3`.
#[derive(Clone, Debug)]
enum Op {
    Assign(usize),
    Borrow(usize, RefMode),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..4usize).prop_map(Op::Assign),
        (0..4usize, any::<bool>()).prop_map(|(var, exclusive)| {
            let mode = if exclusive {
                RefMode::Exclusive
            } else {
                RefMode::Shared
            };
            Op::Borrow(var, mode)
        }),
    ]
}

proptest! {
    #[test]
    fn one_error_per_immutable_assignment(
        mutable in proptest::collection::vec(any::<bool>(), 4),
        targets in proptest::collection::vec(0..4usize, 0..12),
    ) {
        let interner = StringInterner::new();
        let mut b = ModuleBuilder::new(&interner);
        let mut stmts = Vec::new();
        for (index, &is_mut) in mutable.iter().enumerate() {
            let init = b.int(0);
            let name = format!("v{index}");
            stmts.push(if is_mut {
                b.let_mut(&name, ValueType::copy(), init)
            } else {
                b.let_(&name, ValueType::copy(), init)
            });
        }
        for &target in &targets {
            let ident = b.ident(&format!("v{target}"));
            let value = b.int(1);
            stmts.push(b.assign(ident, value));
        }
        let module = main_module(b, stmts);

        let expected = targets.iter().filter(|&&t| !mutable[t]).count();
        let outcome = check(&interner, &module);
        prop_assert_eq!(outcome.error_count(), expected);
        prop_assert!(outcome.diagnostics.iter().all(|d| d.code == ErrorCode::E1001));
    }

    #[test]
    fn held_borrows_follow_exclusive_xor_shared(
        modes in proptest::collection::vec(any::<bool>(), 1..8),
    ) {
        let interner = StringInterner::new();
        let mut b = ModuleBuilder::new(&interner);
        let init = b.int(0);
        let mut stmts = vec![b.let_mut("target", ValueType::copy(), init)];
        for (index, &exclusive) in modes.iter().enumerate() {
            let mode = if exclusive { RefMode::Exclusive } else { RefMode::Shared };
            let place = b.ident("target");
            let reference = b.reference(mode, place);
            stmts.push(b.let_(&format!("r{index}"), ValueType::reference(mode), reference));
        }
        let module = main_module(b, stmts);

        let expected = (0..modes.len())
            .filter(|&i| {
                let earlier_exclusive = modes[..i].iter().any(|&m| m);
                (modes[i] && i > 0) || earlier_exclusive
            })
            .count();
        let outcome = check(&interner, &module);
        prop_assert_eq!(outcome.error_count(), expected);
    }

    #[test]
    fn checking_is_deterministic(ops in proptest::collection::vec(op(), 0..16)) {
        let interner = StringInterner::new();
        let mut b = ModuleBuilder::new(&interner);
        let mut stmts = Vec::new();
        for index in 0..4 {
            let init = b.int(0);
            stmts.push(b.let_mut(&format!("v{index}"), ValueType::copy(), init));
        }
        for (index, op) in ops.iter().enumerate() {
            stmts.push(match *op {
                Op::Assign(var) => {
                    let target = b.ident(&format!("v{var}"));
                    let value = b.int(2);
                    b.assign(target, value)
                }
                Op::Borrow(var, mode) => {
                    let place = b.ident(&format!("v{var}"));
                    let reference = b.reference(mode, place);
                    b.let_(&format!("r{index}"), ValueType::reference(mode), reference)
                }
            });
        }
        let module = main_module(b, stmts);

        let first = check(&interner, &module);
        let second = check(&interner, &module);
        prop_assert_eq!(first.diagnostics, second.diagnostics);
        prop_assert_eq!(first.annotations, second.annotations);
    }
}
