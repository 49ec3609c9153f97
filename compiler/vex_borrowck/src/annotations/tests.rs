use pretty_assertions::assert_eq;
use vex_ir::{ExprId, Name, RefMode};

use super::{AnnotatedModule, CaptureMode, ClosureCapture, RefAnnotation};
use crate::BindingId;

fn annotation(mode: RefMode, depth: u32) -> RefAnnotation {
    RefAnnotation {
        mode,
        target: Some(BindingId::new(1)),
        target_name: Some(Name::from_raw(7)),
        target_depth: depth,
        created_depth: depth,
        holder: None,
        lifetime_bound: Some(depth),
    }
}

fn sample() -> AnnotatedModule {
    let mut module = AnnotatedModule::default();
    module
        .references
        .insert(ExprId::new(9), annotation(RefMode::Exclusive, 3));
    module
        .references
        .insert(ExprId::new(2), annotation(RefMode::Shared, 2));
    module.closures.insert(
        ExprId::new(5),
        ClosureCapture {
            mode: CaptureMode::CallableMut,
            captures: vec![Name::from_raw(7)],
        },
    );
    module
}

#[test]
fn lookups_by_expression() {
    let module = sample();
    assert_eq!(
        module.reference(ExprId::new(2)).map(|a| a.mode),
        Some(RefMode::Shared)
    );
    assert!(module.reference(ExprId::new(5)).is_none());
    assert_eq!(
        module.closure(ExprId::new(5)).map(|c| c.mode),
        Some(CaptureMode::CallableMut)
    );
}

#[test]
fn sorted_references_follow_expression_order() {
    let module = sample();
    let order: Vec<ExprId> = module
        .sorted_references()
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(order, vec![ExprId::new(2), ExprId::new(9)]);
}

#[test]
fn capture_modes_are_ordered_by_strength() {
    assert!(CaptureMode::Callable < CaptureMode::CallableMut);
    assert!(CaptureMode::CallableMut < CaptureMode::CallableOnce);
}

#[cfg(feature = "cache")]
#[test]
fn survives_bincode() {
    let module = sample();
    let Ok(bytes) = module.to_bytes() else {
        panic!("encoding failed");
    };
    let Ok(decoded) = AnnotatedModule::from_bytes(&bytes) else {
        panic!("decoding failed");
    };
    assert_eq!(decoded, module);
}
