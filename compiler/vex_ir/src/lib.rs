//! Vex IR - syntax tree consumed by the safety checker.
//!
//! This crate contains the data the checker reads:
//! - Spans for source locations
//! - Names for interned identifiers
//! - The closed, arena-allocated syntax tree (`Module`, `Stmt`, `Expr`)
//! - Ownership classification of every binding (`ValueType`)
//! - `ModuleBuilder` for constructing trees programmatically
//! - `Module::validate` for trees decoded from untrusted bytes
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: Strings → `Name(u32)`
//! - **Flatten Everything**: No `Box<Expr>`, use `ExprId(u32)` / `StmtId(u32)` indices
//! - **Resolved Input**: every binding arrives with mutability and a
//!   `ValueType`, every reference expression with its mode
//!
//! With the `cache` feature every type implements serde's traits, which is
//! how drivers hand trees to the checker across process boundaries.

/// Compile-time assertion that a type has a specific size.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
pub mod ast;
pub mod builder;
mod ids;
mod interner;
mod name;
mod span;
mod validate;

pub use arena::SyntaxArena;
pub use ast::{
    BinaryOp, Block, ConstDef, Expr, ExprKind, ExternFn, FieldInit, FieldType, Function, Import,
    Item, Literal, MatchArm, Module, Param, RefMode, Stmt, StmtKind, TypeClass, ValueType,
};
pub use builder::ModuleBuilder;
pub use ids::{ExprId, StmtId};
pub use interner::{InternError, StringInterner, StringLookup};
pub use name::Name;
pub use span::Span;
pub use validate::ModuleError;
