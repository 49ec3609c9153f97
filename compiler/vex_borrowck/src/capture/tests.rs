use pretty_assertions::assert_eq;
use vex_ir::{ExprId, Module, ModuleBuilder, StringInterner, ValueType};

use super::{check_function, FunctionCaptures};
use crate::test_helpers::main_module;
use crate::{BuiltinRegistry, CaptureMode, CheckerContext, ClosureCapture};

fn captures(interner: &StringInterner, module: &Module) -> FunctionCaptures {
    let builtins = BuiltinRegistry::standard();
    let mut ctx = CheckerContext::new(module, interner, &builtins);
    let Some((_, func)) = module.functions().next() else {
        return FunctionCaptures::default();
    };
    let result = check_function(&mut ctx, func).unwrap_or_default();
    assert!(ctx.into_diagnostics().is_empty());
    result
}

fn mode_of(captures: &FunctionCaptures, closure: ExprId) -> Option<CaptureMode> {
    captures.get(&closure).map(|c| c.mode)
}

#[test]
fn reading_captures_is_callable() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.int(3);
    let n = b.let_("n", ValueType::copy(), init);
    let read = b.ident("n");
    let print = b.call("println", vec![read]);
    let print = b.expr_stmt(print);
    let body = b.block(vec![print]);
    let closure = b.closure(Vec::new(), body);
    let f = b.let_("f", ValueType::copy(), closure);
    let module = main_module(b, vec![n, f]);

    let result = captures(&interner, &module);
    assert_eq!(
        result.get(&closure),
        Some(&ClosureCapture {
            mode: CaptureMode::Callable,
            captures: vec![interner.intern("n")],
        })
    );
}

#[test]
fn assigning_a_capture_is_callable_mut() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.int(0);
    let count = b.let_mut("count", ValueType::copy(), init);
    let target = b.ident("count");
    let one = b.int(1);
    let assign = b.assign(target, one);
    let body = b.block(vec![assign]);
    let closure = b.closure(Vec::new(), body);
    let f = b.let_("f", ValueType::copy(), closure);
    let module = main_module(b, vec![count, f]);

    let result = captures(&interner, &module);
    assert_eq!(mode_of(&result, closure), Some(CaptureMode::CallableMut));
}

#[test]
fn mutating_builtin_is_callable_mut() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.call("vec_new", Vec::new());
    let v = b.let_mut("v", ValueType::owned(), init);
    let v1 = b.ident("v");
    let item = b.int(1);
    let push = b.call("vec_push", vec![v1, item]);
    let push = b.expr_stmt(push);
    let body = b.block(vec![push]);
    let closure = b.closure(Vec::new(), body);
    let f = b.let_("f", ValueType::copy(), closure);
    let module = main_module(b, vec![v, f]);

    let result = captures(&interner, &module);
    assert_eq!(mode_of(&result, closure), Some(CaptureMode::CallableMut));
}

#[test]
fn moving_a_capture_is_callable_once() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.str_lit("bye");
    let s = b.let_("s", ValueType::owned(), init);
    let s1 = b.ident("s");
    let consume = b.call("consume", vec![s1]);
    let consume = b.expr_stmt(consume);
    let body = b.block(vec![consume]);
    let closure = b.closure(Vec::new(), body);
    let f = b.let_("f", ValueType::copy(), closure);
    let module = main_module(b, vec![s, f]);

    let result = captures(&interner, &module);
    assert_eq!(mode_of(&result, closure), Some(CaptureMode::CallableOnce));
}

#[test]
fn moving_a_copy_capture_stays_callable() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.int(1);
    let n = b.let_("n", ValueType::copy(), init);
    let n1 = b.ident("n");
    let consume = b.call("consume", vec![n1]);
    let consume = b.expr_stmt(consume);
    let body = b.block(vec![consume]);
    let closure = b.closure(Vec::new(), body);
    let f = b.let_("f", ValueType::copy(), closure);
    let module = main_module(b, vec![n, f]);

    let result = captures(&interner, &module);
    assert_eq!(mode_of(&result, closure), Some(CaptureMode::Callable));
}

#[test]
fn params_and_body_locals_are_not_captures() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let param = b.param("item", false, ValueType::owned());
    let item = b.ident("item");
    let local = b.let_("copy", ValueType::owned(), item);
    let read = b.ident("copy");
    let consume = b.call("consume", vec![read]);
    let consume = b.expr_stmt(consume);
    let body = b.block(vec![local, consume]);
    let closure = b.closure(vec![param], body);
    let f = b.let_("f", ValueType::copy(), closure);
    let module = main_module(b, vec![f]);

    let result = captures(&interner, &module);
    assert_eq!(
        result.get(&closure),
        Some(&ClosureCapture {
            mode: CaptureMode::Callable,
            captures: Vec::new(),
        })
    );
}

#[test]
fn globals_are_not_captured() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let limit = b.int(10);
    b.constant("LIMIT", ValueType::copy(), limit);
    let read = b.ident("LIMIT");
    let print = b.call("println", vec![read]);
    let print = b.expr_stmt(print);
    let body = b.block(vec![print]);
    let closure = b.closure(Vec::new(), body);
    let f = b.let_("f", ValueType::copy(), closure);
    let module = main_module(b, vec![f]);

    let result = captures(&interner, &module);
    assert_eq!(result.get(&closure).map(|c| c.captures.len()), Some(0));
}

#[test]
fn nested_closure_uses_propagate_outwards() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.int(0);
    let total = b.let_mut("total", ValueType::copy(), init);
    let target = b.ident("total");
    let one = b.int(1);
    let assign = b.assign(target, one);
    let inner_body = b.block(vec![assign]);
    let inner = b.closure(Vec::new(), inner_body);
    let g = b.let_("g", ValueType::copy(), inner);
    let outer_body = b.block(vec![g]);
    let outer = b.closure(Vec::new(), outer_body);
    let f = b.let_("f", ValueType::copy(), outer);
    let module = main_module(b, vec![total, f]);

    let result = captures(&interner, &module);
    assert_eq!(mode_of(&result, inner), Some(CaptureMode::CallableMut));
    assert_eq!(mode_of(&result, outer), Some(CaptureMode::CallableMut));
    assert_eq!(
        result.get(&outer).map(|c| c.captures.clone()),
        Some(vec![interner.intern("total")])
    );
}

#[test]
fn strongest_use_wins() {
    let interner = StringInterner::new();
    let mut b = ModuleBuilder::new(&interner);
    let init = b.str_lit("text");
    let s = b.let_mut("s", ValueType::owned(), init);
    let s1 = b.ident("s");
    let reference = b.exclusive_ref(s1);
    let borrow = b.expr_stmt(reference);
    let s2 = b.ident("s");
    let consume = b.call("consume", vec![s2]);
    let consume = b.expr_stmt(consume);
    let s3 = b.ident("s");
    let print = b.call("println", vec![s3]);
    let print = b.expr_stmt(print);
    let body = b.block(vec![borrow, consume, print]);
    let closure = b.closure(Vec::new(), body);
    let f = b.let_("f", ValueType::copy(), closure);
    let module = main_module(b, vec![s, f]);

    let result = captures(&interner, &module);
    assert_eq!(mode_of(&result, closure), Some(CaptureMode::CallableOnce));
    assert_eq!(result.get(&closure).map(|c| c.captures.len()), Some(1));
}
