use pretty_assertions::assert_eq;
use vex_diagnostic::ErrorCode;
use vex_ir::{BinaryOp, ModuleBuilder, StringInterner, ValueType};

use super::check_function;
use crate::test_helpers::{codes, main_module, person, point, run_phase};

#[test]
fn use_after_move_names_both_sites() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let ty = point(&b);
    let x = b.int(1);
    let y = b.int(2);
    let lit = b.struct_lit("Point", &[("x", x), ("y", y)]);
    let p_decl = b.let_("p", ty.clone(), lit);
    let p = b.ident("p");
    let q_decl = b.let_("q", ty, p);
    let p_again = b.ident("p");
    let call = b.call("consume", vec![p_again]);
    let use_stmt = b.expr_stmt(call);
    let move_span = b.expr_span(p);
    let use_span = b.expr_span(p_again);
    let module = main_module(b, vec![p_decl, q_decl, use_stmt]);

    let diags = run_phase(&interner, &module, check_function);
    assert_eq!(codes(&diags), vec![ErrorCode::E2001]);
    assert_eq!(diags[0].primary_span(), Some(use_span));
    assert_eq!(diags[0].secondary_spans().collect::<Vec<_>>(), vec![move_span]);
}

#[test]
fn copy_values_never_move() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.int(5);
    let a = b.let_("a", ValueType::copy(), init);
    let a_ref = b.ident("a");
    let c = b.let_("c", ValueType::copy(), a_ref);
    let a_again = b.ident("a");
    let call = b.call("consume", vec![a_again]);
    let stmt = b.expr_stmt(call);
    let module = main_module(b, vec![a, c, stmt]);

    assert!(run_phase(&interner, &module, check_function).is_empty());
}

#[test]
fn read_only_builtins_do_not_move() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.str_lit("hi");
    let s = b.let_("s", ValueType::owned(), init);
    let first = b.ident("s");
    let print = b.call("println", vec![first]);
    let print = b.expr_stmt(print);
    let second = b.ident("s");
    let consume = b.call("consume", vec![second]);
    let consume = b.expr_stmt(consume);
    let module = main_module(b, vec![s, print, consume]);

    assert!(run_phase(&interner, &module, check_function).is_empty());
}

#[test]
fn reassignment_does_not_revive_a_moved_binding() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.str_lit("a");
    let s = b.let_mut("s", ValueType::owned(), init);
    let moved = b.ident("s");
    let t = b.let_("t", ValueType::owned(), moved);
    let target = b.ident("s");
    let fresh = b.str_lit("b");
    let reassign = b.assign(target, fresh);
    let again = b.ident("s");
    let call = b.call("consume", vec![again]);
    let call = b.expr_stmt(call);
    let module = main_module(b, vec![s, t, reassign, call]);

    let diags = run_phase(&interner, &module, check_function);
    assert_eq!(codes(&diags), vec![ErrorCode::E2001]);
}

#[test]
fn shadowing_gives_a_fresh_owned_binding() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.str_lit("a");
    let s = b.let_("s", ValueType::owned(), init);
    let moved = b.ident("s");
    let t = b.let_("t", ValueType::owned(), moved);
    let fresh = b.str_lit("b");
    let shadow = b.let_("s", ValueType::owned(), fresh);
    let again = b.ident("s");
    let call = b.call("consume", vec![again]);
    let call = b.expr_stmt(call);
    let module = main_module(b, vec![s, t, shadow, call]);

    assert!(run_phase(&interner, &module, check_function).is_empty());
}

#[test]
fn conditionally_initialized_read() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let decl = b.declare("x", true, ValueType::copy());
    let cond = b.bool_lit(true);
    let x = b.ident("x");
    let one = b.int(1);
    let init = b.assign(x, one);
    let then_block = b.block(vec![init]);
    let else_block = b.block(Vec::new());
    let branch = b.if_else(cond, then_block, Some(else_block));
    let read = b.ident("x");
    let call = b.call("println", vec![read]);
    let call = b.expr_stmt(call);
    let read_span = b.expr_span(read);
    let module = main_module(b, vec![decl, branch, call]);

    let diags = run_phase(&interner, &module, check_function);
    assert_eq!(codes(&diags), vec![ErrorCode::E2002]);
    assert_eq!(diags[0].primary_span(), Some(read_span));
}

#[test]
fn initialized_on_both_arms() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let decl = b.declare("x", true, ValueType::copy());
    let cond = b.bool_lit(true);
    let x1 = b.ident("x");
    let one = b.int(1);
    let init1 = b.assign(x1, one);
    let then_block = b.block(vec![init1]);
    let x2 = b.ident("x");
    let two = b.int(2);
    let init2 = b.assign(x2, two);
    let else_block = b.block(vec![init2]);
    let branch = b.if_else(cond, then_block, Some(else_block));
    let read = b.ident("x");
    let call = b.call("println", vec![read]);
    let call = b.expr_stmt(call);
    let module = main_module(b, vec![decl, branch, call]);

    assert!(run_phase(&interner, &module, check_function).is_empty());
}

#[test]
fn move_on_one_arm_is_a_move_after_the_merge() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.str_lit("a");
    let s = b.let_("s", ValueType::owned(), init);
    let cond = b.bool_lit(false);
    let moved = b.ident("s");
    let consume = b.call("consume", vec![moved]);
    let consume = b.expr_stmt(consume);
    let then_block = b.block(vec![consume]);
    let branch = b.if_else(cond, then_block, None);
    let read = b.ident("s");
    let print = b.call("println", vec![read]);
    let print = b.expr_stmt(print);
    let module = main_module(b, vec![s, branch, print]);

    let diags = run_phase(&interner, &module, check_function);
    assert_eq!(codes(&diags), vec![ErrorCode::E2001]);
}

#[test]
fn returning_arm_does_not_join() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.str_lit("a");
    let s = b.let_("s", ValueType::owned(), init);
    let cond = b.bool_lit(false);
    let moved = b.ident("s");
    let ret = b.ret(Some(moved));
    let then_block = b.block(vec![ret]);
    let branch = b.if_else(cond, then_block, None);
    let read = b.ident("s");
    let print = b.call("println", vec![read]);
    let print = b.expr_stmt(print);
    let module = main_module(b, vec![s, branch, print]);

    assert!(run_phase(&interner, &module, check_function).is_empty());
}

#[test]
fn move_in_loop_body_is_seen_next_iteration() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.str_lit("a");
    let s = b.let_("s", ValueType::owned(), init);
    let cond = b.bool_lit(true);
    let moved = b.ident("s");
    let consume = b.call("consume", vec![moved]);
    let consume = b.expr_stmt(consume);
    let body = b.block(vec![consume]);
    let lp = b.while_loop(cond, body);
    let module = main_module(b, vec![s, lp]);

    let diags = run_phase(&interner, &module, check_function);
    assert!(!diags.is_empty());
    assert!(diags.iter().all(|d| d.code == ErrorCode::E2001));
}

#[test]
fn partial_move_allows_other_fields() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let ty = person(&b);
    let name = b.str_lit("Ada");
    let age = b.int(36);
    let lit = b.struct_lit("Person", &[("name", name), ("age", age)]);
    let p = b.let_("p", ty, lit);
    let p1 = b.ident("p");
    let name_field = b.field(p1, "name");
    let n = b.let_("n", ValueType::owned(), name_field);
    let p2 = b.ident("p");
    let age_field = b.field(p2, "age");
    let a = b.let_("a", ValueType::copy(), age_field);
    let module = main_module(b, vec![p, n, a]);

    assert!(run_phase(&interner, &module, check_function).is_empty());
}

#[test]
fn partial_move_blocks_whole_and_moved_field() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let ty = person(&b);
    let name = b.str_lit("Ada");
    let age = b.int(36);
    let lit = b.struct_lit("Person", &[("name", name), ("age", age)]);
    let p = b.let_("p", ty.clone(), lit);
    let p1 = b.ident("p");
    let name_field = b.field(p1, "name");
    let n = b.let_("n", ValueType::owned(), name_field);
    let p2 = b.ident("p");
    let again = b.field(p2, "name");
    let print = b.call("println", vec![again]);
    let print = b.expr_stmt(print);
    let p3 = b.ident("p");
    let whole = b.let_("q", ty, p3);
    let module = main_module(b, vec![p, n, print, whole]);

    let diags = run_phase(&interner, &module, check_function);
    assert_eq!(codes(&diags), vec![ErrorCode::E2001, ErrorCode::E2001]);
    assert_eq!(diags[0].message, "use of moved value: `p.name`");
    assert_eq!(diags[1].message, "use of partially moved value: `p`");
}

#[test]
fn assigning_a_moved_field_restores_it() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let ty = person(&b);
    let name = b.str_lit("Ada");
    let age = b.int(36);
    let lit = b.struct_lit("Person", &[("name", name), ("age", age)]);
    let p = b.let_mut("p", ty.clone(), lit);
    let p1 = b.ident("p");
    let name_field = b.field(p1, "name");
    let n = b.let_("n", ValueType::owned(), name_field);
    let p2 = b.ident("p");
    let target = b.field(p2, "name");
    let fresh = b.str_lit("Grace");
    let restore = b.assign(target, fresh);
    let p3 = b.ident("p");
    let whole = b.let_("q", ty, p3);
    let module = main_module(b, vec![p, n, restore, whole]);

    assert!(run_phase(&interner, &module, check_function).is_empty());
}

#[test]
fn borrowing_a_moved_value_is_a_use() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.str_lit("a");
    let s = b.let_("s", ValueType::owned(), init);
    let moved = b.ident("s");
    let heap = b.heap(moved);
    let boxed = b.let_("boxed", ValueType::owned(), heap);
    let s_again = b.ident("s");
    let reference = b.shared_ref(s_again);
    let call = b.call("println", vec![reference]);
    let call = b.expr_stmt(call);
    let module = main_module(b, vec![s, boxed, call]);

    let diags = run_phase(&interner, &module, check_function);
    assert_eq!(codes(&diags), vec![ErrorCode::E2001]);
}

#[test]
fn compound_assignment_reads_its_target() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let decl = b.declare("total", true, ValueType::copy());
    let target = b.ident("total");
    let one = b.int(1);
    let bump = b.compound_assign(BinaryOp::Add, target, one);
    let module = main_module(b, vec![decl, bump]);

    let diags = run_phase(&interner, &module, check_function);
    assert_eq!(codes(&diags), vec![ErrorCode::E2002]);
}

// === Match and loop exits ===

#[test]
fn move_in_one_match_arm_is_seen_after_the_match() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.str_lit("text");
    let s = b.let_("s", ValueType::owned(), init);
    let s1 = b.ident("s");
    let consume = b.call("consume", vec![s1]);
    let consume = b.expr_stmt(consume);
    let moving = b.block(vec![consume]);
    let moving = b.arm(None, moving);
    let idle = b.block(Vec::new());
    let idle = b.arm(None, idle);
    let scrutinee = b.int(0);
    let matched = b.match_stmt(scrutinee, vec![moving, idle]);
    let s2 = b.ident("s");
    let print = b.call("println", vec![s2]);
    let print = b.expr_stmt(print);
    let module = main_module(b, vec![s, matched, print]);

    let diags = run_phase(&interner, &module, check_function);
    assert_eq!(codes(&diags), vec![ErrorCode::E2001]);
}

#[test]
fn returning_match_arm_does_not_join() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.str_lit("text");
    let s = b.let_("s", ValueType::owned(), init);
    let s1 = b.ident("s");
    let consume = b.call("consume", vec![s1]);
    let consume = b.expr_stmt(consume);
    let ret = b.ret(None);
    let moving = b.block(vec![consume, ret]);
    let guard = b.bool_lit(true);
    let moving = b.arm(Some(guard), moving);
    let idle = b.block(Vec::new());
    let idle = b.arm(None, idle);
    let scrutinee = b.int(0);
    let matched = b.match_stmt(scrutinee, vec![moving, idle]);
    let s2 = b.ident("s");
    let print = b.call("println", vec![s2]);
    let print = b.expr_stmt(print);
    let module = main_module(b, vec![s, matched, print]);

    assert!(run_phase(&interner, &module, check_function).is_empty());
}

#[test]
fn break_carries_the_move_out_of_the_loop() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.str_lit("text");
    let s = b.let_("s", ValueType::owned(), init);
    let s1 = b.ident("s");
    let consume = b.call("consume", vec![s1]);
    let consume = b.expr_stmt(consume);
    let brk = b.break_stmt();
    let body = b.block(vec![consume, brk]);
    let looped = b.loop_stmt(body);
    let s2 = b.ident("s");
    let print = b.call("println", vec![s2]);
    let print = b.expr_stmt(print);
    let use_span = b.expr_span(s2);
    let module = main_module(b, vec![s, looped, print]);

    let diags = run_phase(&interner, &module, check_function);
    assert_eq!(codes(&diags), vec![ErrorCode::E2001]);
    assert_eq!(diags[0].primary_span(), Some(use_span));
}

#[test]
fn move_before_continue_reaches_the_next_iteration() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.str_lit("text");
    let s = b.let_("s", ValueType::owned(), init);
    let s1 = b.ident("s");
    let consume = b.call("consume", vec![s1]);
    let consume = b.expr_stmt(consume);
    let cont = b.continue_stmt();
    let then_block = b.block(vec![consume, cont]);
    let cond = b.bool_lit(true);
    let branch = b.if_else(cond, then_block, None);
    let body = b.block(vec![branch]);
    let cond = b.bool_lit(true);
    let looped = b.while_loop(cond, body);
    let module = main_module(b, vec![s, looped]);

    let diags = run_phase(&interner, &module, check_function);
    assert_eq!(codes(&diags), vec![ErrorCode::E2001]);
}

#[test]
fn loop_without_break_never_falls_through() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.str_lit("text");
    let s = b.let_("s", ValueType::owned(), init);
    let s1 = b.ident("s");
    let consume = b.call("consume", vec![s1]);
    let consume = b.expr_stmt(consume);
    let forever = b.block(Vec::new());
    let forever = b.loop_stmt(forever);
    let then_block = b.block(vec![consume, forever]);
    let cond = b.bool_lit(true);
    let branch = b.if_else(cond, then_block, None);
    let s2 = b.ident("s");
    let print = b.call("println", vec![s2]);
    let print = b.expr_stmt(print);
    let module = main_module(b, vec![s, branch, print]);

    assert!(run_phase(&interner, &module, check_function).is_empty());
}
