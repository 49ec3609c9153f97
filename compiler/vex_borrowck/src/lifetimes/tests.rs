use pretty_assertions::assert_eq;
use vex_diagnostic::{Diagnostic, ErrorCode};
use vex_ir::{
    Block, ExprId, Module, ModuleBuilder, RefMode, Span, StmtId, StringInterner, ValueType,
};

use super::check_function;
use crate::test_helpers::{check, codes, main_module, person};
use crate::{borrows, BuiltinRegistry, CheckerContext, FunctionAnnotations};

/// Run the borrow validator, then the lifetime analyzer, over the first
/// function.
fn analyze(interner: &StringInterner, module: &Module) -> (Vec<Diagnostic>, super::LifetimeBounds) {
    let builtins = BuiltinRegistry::standard();
    let base = CheckerContext::new(module, interner, &builtins);
    let Some((_, func)) = module.functions().next() else {
        return (Vec::new(), Vec::new());
    };
    let refs = borrows::check_function(&mut base.clone(), func).unwrap_or_default();
    let mut ctx = base.clone();
    let bounds = check_function(&mut ctx, func, &refs).unwrap_or_default();
    (ctx.into_diagnostics(), bounds)
}

#[test]
fn returning_reference_to_local() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.int(1);
    let x = b.let_mut("x", ValueType::copy(), init);
    let x1 = b.ident("x");
    let reference = b.exclusive_ref(x1);
    let ret = b.ret(Some(reference));
    let ret_span = b.stmt_span(ret);
    let module = main_module(b, vec![x, ret]);

    let (diags, _) = analyze(&interner, &module);
    assert_eq!(codes(&diags), vec![ErrorCode::E4001]);
    assert_eq!(diags[0].primary_span(), Some(ret_span));
    assert_eq!(
        diags[0].labels[0].message,
        "returns an exclusive reference to data owned by the current function"
    );
}

#[test]
fn returning_through_a_holder_and_a_struct() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.int(1);
    let x = b.let_("x", ValueType::copy(), init);
    let x1 = b.ident("x");
    let reference = b.shared_ref(x1);
    let r = b.let_("r", ValueType::reference(RefMode::Shared), reference);
    let r1 = b.ident("r");
    let wrapper = b.struct_lit("Wrapper", &[("inner", r1)]);
    let ret = b.ret(Some(wrapper));
    let module = main_module(b, vec![x, r, ret]);

    let (diags, _) = analyze(&interner, &module);
    assert_eq!(codes(&diags), vec![ErrorCode::E4001]);
}

#[test]
fn references_to_parameters_may_escape() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let param = b.param("input", false, ValueType::owned());
    let input = b.ident("input");
    let reference = b.shared_ref(input);
    let ret = b.ret(Some(reference));
    let body = b.block(vec![ret]);
    b.function("first", vec![param], body);
    let module = b.finish();

    let (diags, _) = analyze(&interner, &module);
    assert!(diags.is_empty());
}

#[test]
fn references_to_receiver_fields_may_escape() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let ty = person(&b);
    let receiver = b.param("self", false, ty);
    let this = b.ident("self");
    let field = b.field(this, "name");
    let reference = b.shared_ref(field);
    let ret = b.ret(Some(reference));
    let body = b.block(vec![ret]);
    b.method("name", receiver, Vec::new(), body);
    let module = b.finish();

    let (diags, _) = analyze(&interner, &module);
    assert!(diags.is_empty());
}

#[test]
fn heap_allocation_carries_no_borrow() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.int(1);
    let x = b.let_("x", ValueType::copy(), init);
    let x1 = b.ident("x");
    let boxed = b.heap(x1);
    let ret = b.ret(Some(boxed));
    let module = main_module(b, vec![x, ret]);

    let (diags, _) = analyze(&interner, &module);
    assert!(diags.is_empty());
}

#[test]
fn reference_outlives_inner_block() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let r = b.declare("r", true, ValueType::reference(RefMode::Shared));
    let init = b.int(5);
    let y = b.let_("y", ValueType::copy(), init);
    let r1 = b.ident("r");
    let y1 = b.ident("y");
    let reference = b.shared_ref(y1);
    let assign = b.assign(r1, reference);
    let inner = b.block(vec![y, assign]);
    let inner_span = inner.span;
    let borrow_span = b.expr_span(reference);
    let inner = b.block_stmt(inner);
    let module = main_module(b, vec![r, inner]);

    let (diags, _) = analyze(&interner, &module);
    assert_eq!(codes(&diags), vec![ErrorCode::E4002]);
    assert_eq!(diags[0].message, "`y` does not live long enough");
    assert_eq!(diags[0].primary_span(), Some(inner_span.end_point()));
    assert_eq!(
        diags[0].secondary_spans().collect::<Vec<_>>(),
        vec![borrow_span]
    );
}

#[test]
fn inner_holder_is_fine() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.int(5);
    let y = b.let_("y", ValueType::copy(), init);
    let y1 = b.ident("y");
    let reference = b.shared_ref(y1);
    let r = b.let_("r", ValueType::reference(RefMode::Shared), reference);
    let inner = b.block(vec![r]);
    let inner = b.block_stmt(inner);
    let module = main_module(b, vec![y, inner]);

    let (diags, _) = analyze(&interner, &module);
    assert!(diags.is_empty());
}

#[test]
fn use_after_scope_suggests_visible_name() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.int(1);
    let temp = b.let_("temp", ValueType::copy(), init);
    let init = b.int(2);
    let tmp = b.let_("tmp", ValueType::copy(), init);
    let inner = b.block(vec![tmp]);
    let inner = b.block_stmt(inner);
    let late = b.ident("tmp");
    let print = b.call("println", vec![late]);
    let print = b.expr_stmt(print);
    let late_span = b.expr_span(late);
    let module = main_module(b, vec![temp, inner, print]);

    let (diags, _) = analyze(&interner, &module);
    assert_eq!(codes(&diags), vec![ErrorCode::E4003]);
    assert_eq!(diags[0].primary_span(), Some(late_span));
    assert_eq!(diags[0].help(), Some("did you mean `temp`?"));
}

#[test]
fn bounds_follow_target_depth() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.int(1);
    let x = b.let_("x", ValueType::copy(), init);
    let x1 = b.ident("x");
    let reference = b.shared_ref(x1);
    let r = b.let_("r", ValueType::reference(RefMode::Shared), reference);
    let module = main_module(b, vec![x, r]);

    let (diags, bounds) = analyze(&interner, &module);
    assert!(diags.is_empty());
    // module 0, function 1, body 2
    assert_eq!(bounds, vec![(reference, 2)]);
}

#[test]
fn escape_label_falls_back_to_expression_mode() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.int(1);
    let x = b.let_("x", ValueType::copy(), init);
    let x1 = b.ident("x");
    let reference = b.shared_ref(x1);
    let ret = b.ret(Some(reference));
    let module = main_module(b, vec![x, ret]);
    let func = module.functions().next().map(|(_, f)| f.clone());
    let Some(func) = func else {
        panic!("module has no function");
    };

    let builtins = BuiltinRegistry::standard();
    let mut ctx = CheckerContext::new(&module, &interner, &builtins);
    let refs = FunctionAnnotations::default();
    let result = check_function(&mut ctx, &func, &refs);
    assert!(result.is_ok());
    let diags = ctx.into_diagnostics();
    assert_eq!(
        diags[0].labels[0].message,
        "returns a shared reference to data owned by the current function"
    );
}

// === Dereference and reborrow ===

#[test]
fn reborrow_of_local_escapes() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.int(1);
    let x = b.let_("x", ValueType::copy(), init);
    let x1 = b.ident("x");
    let reference = b.shared_ref(x1);
    let r = b.let_("r", ValueType::reference(RefMode::Shared), reference);
    let r1 = b.ident("r");
    let deref = b.deref(r1);
    let reborrow = b.shared_ref(deref);
    let ret = b.ret(Some(reborrow));
    let module = main_module(b, vec![x, r, ret]);

    let (diags, _) = analyze(&interner, &module);
    assert_eq!(codes(&diags), vec![ErrorCode::E4001]);
    assert_eq!(
        diags[0].message,
        "cannot return reference to local variable `x`"
    );
}

/// `let a = 0; let! out = &a; { let x = 1; let r = &x; out = <value>; }`
fn store_into_outer<'i>(
    interner: &'i StringInterner,
    value: impl FnOnce(&mut ModuleBuilder<'i>) -> (Vec<StmtId>, ExprId),
) -> Module {
    let mut b = ModuleBuilder::new(interner);
    let init = b.int(0);
    let a = b.let_("a", ValueType::copy(), init);
    let a1 = b.ident("a");
    let to_a = b.shared_ref(a1);
    let out = b.let_mut("out", ValueType::reference(RefMode::Shared), to_a);
    let init = b.int(1);
    let x = b.let_("x", ValueType::copy(), init);
    let x1 = b.ident("x");
    let to_x = b.shared_ref(x1);
    let r = b.let_("r", ValueType::reference(RefMode::Shared), to_x);
    let (setup, value) = value(&mut b);
    let out1 = b.ident("out");
    let store = b.assign(out1, value);
    let mut inner = vec![x, r];
    inner.extend(setup);
    inner.push(store);
    let inner = b.block(inner);
    let inner = b.block_stmt(inner);
    main_module(b, vec![a, out, inner])
}

#[test]
fn reborrow_stored_in_outer_binding_outlives_block() {
    let interner = StringInterner::new();
    let module = store_into_outer(&interner, |b| {
        let r = b.ident("r");
        let deref = b.deref(r);
        (Vec::new(), b.shared_ref(deref))
    });

    let (diags, _) = analyze(&interner, &module);
    assert_eq!(codes(&diags), vec![ErrorCode::E4002]);
    assert_eq!(diags[0].message, "`x` does not live long enough");
}

#[test]
fn reading_through_double_reference_outlives_block() {
    let interner = StringInterner::new();
    let module = store_into_outer(&interner, |b| {
        let r = b.ident("r");
        let to_r = b.shared_ref(r);
        let rr = b.let_("rr", ValueType::reference(RefMode::Shared), to_r);
        let rr1 = b.ident("rr");
        (vec![rr], b.deref(rr1))
    });

    let (diags, _) = analyze(&interner, &module);
    assert_eq!(codes(&diags), vec![ErrorCode::E4002]);
    assert_eq!(diags[0].message, "`x` does not live long enough");
}

#[test]
fn copying_through_a_reference_borrows_nothing() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.int(1);
    let x = b.let_("x", ValueType::copy(), init);
    let x1 = b.ident("x");
    let reference = b.shared_ref(x1);
    let r = b.let_("r", ValueType::reference(RefMode::Shared), reference);
    let r1 = b.ident("r");
    let deref = b.deref(r1);
    let y = b.let_("y", ValueType::copy(), deref);
    let y1 = b.ident("y");
    let ret = b.ret(Some(y1));
    let module = main_module(b, vec![x, r, y, ret]);

    let (diags, _) = analyze(&interner, &module);
    assert!(diags.is_empty());
}

// === Branches and loops ===

/// `let a = 0; let! out = &a;` then `wrap` around `{ let x = 1; out = &x; }`.
fn store_local_in<'i>(
    interner: &'i StringInterner,
    wrap: impl FnOnce(&mut ModuleBuilder<'i>, Block) -> StmtId,
) -> (Module, Span) {
    let mut b = ModuleBuilder::new(interner);
    let init = b.int(0);
    let a = b.let_("a", ValueType::copy(), init);
    let a1 = b.ident("a");
    let to_a = b.shared_ref(a1);
    let out = b.let_mut("out", ValueType::reference(RefMode::Shared), to_a);
    let init = b.int(1);
    let x = b.let_("x", ValueType::copy(), init);
    let out1 = b.ident("out");
    let x1 = b.ident("x");
    let to_x = b.shared_ref(x1);
    let store = b.assign(out1, to_x);
    let body = b.block(vec![x, store]);
    let body_end = body.span.end_point();
    let stmt = wrap(&mut b, body);
    (main_module(b, vec![a, out, stmt]), body_end)
}

#[test]
fn local_stored_from_a_branch_outlives_it() {
    let interner = StringInterner::new();
    let (module, body_end) = store_local_in(&interner, |b, body| {
        let cond = b.bool_lit(true);
        b.if_else(cond, body, None)
    });

    let (diags, _) = analyze(&interner, &module);
    assert_eq!(codes(&diags), vec![ErrorCode::E4002]);
    assert_eq!(diags[0].primary_span(), Some(body_end));
}

#[test]
fn local_stored_from_a_loop_body_outlives_it() {
    let interner = StringInterner::new();
    let (module, body_end) = store_local_in(&interner, |b, body| {
        let cond = b.bool_lit(true);
        b.while_loop(cond, body)
    });

    let outcome = check(&interner, &module);
    assert_eq!(codes(&outcome.diagnostics), vec![ErrorCode::E4002]);
    assert_eq!(outcome.diagnostics[0].primary_span(), Some(body_end));
}

#[test]
fn local_stored_before_break_outlives_the_loop_body() {
    let interner = StringInterner::new();
    let (module, body_end) = store_local_in(&interner, |b, mut body| {
        let brk = b.break_stmt();
        body.stmts.push(brk);
        b.loop_stmt(body)
    });

    let outcome = check(&interner, &module);
    assert_eq!(codes(&outcome.diagnostics), vec![ErrorCode::E4002]);
    assert_eq!(outcome.diagnostics[0].primary_span(), Some(body_end));
}
