//! Ownership, borrow, and lifetime checking for Vex.
//!
//! The checker runs after name resolution and type classification, and
//! before code generation. It consumes a [`vex_ir::Module`] and either
//! accepts it (producing an [`AnnotatedModule`]) or rejects it with
//! diagnostics. It never changes the tree.
//!
//! # Phases
//!
//! | Phase | Module         | Rejects                                        |
//! |-------|----------------|------------------------------------------------|
//! | 1     | [`mutability`] | assignment to immutable bindings (E1xxx)       |
//! | 2     | [`moves`]      | use after move, use before init (E2xxx)        |
//! | 3     | [`borrows`]    | exclusive-xor-shared violations (E3xxx)        |
//! | 4     | [`lifetimes`]  | references outliving their referents (E4xxx)   |
//! | 5     | [`capture`]    | nothing; classifies closure captures           |
//!
//! Each phase walks every function with its own [`CheckerContext`]: a
//! [`ScopeTree`] for lexical scopes and a [`BindingTable`] for per-binding
//! ownership state. Phases share nothing but the module, the name table,
//! the builtin registry, and (for phase 4) the reference annotations of
//! phase 3.
//!
//! # Entry Point
//!
//! [`check_module`] runs all phases and returns a [`CheckOutcome`].
//! Diagnostics of phases after the first failing one are provisional; see
//! [`CheckOutcome::is_provisional`].

mod annotations;
mod binding;
pub mod borrows;
mod builtins;
pub mod capture;
mod check;
mod context;
mod error;
mod flow;
mod ids;
pub mod lifetimes;
pub mod moves;
pub mod mutability;
pub mod place;
pub mod report;
mod scope;
pub mod suggest;

pub use annotations::{AnnotatedModule, CaptureMode, ClosureCapture, RefAnnotation};
pub use binding::{Binding, BindingKind, BindingTable, MovedFields, OwnershipState, StateSnapshot};
pub use borrows::FunctionAnnotations;
pub use builtins::{BuiltinRegistry, BuiltinSig, ParamEffect};
pub use check::{check_module, CheckOutcome, CheckerConfig};
pub use context::CheckerContext;
pub use error::{CheckError, ScopeError};
pub use ids::{BindingId, ScopeId};
pub use scope::{ScopeKind, ScopeTree};

#[cfg(test)]
mod test_helpers;

#[cfg(test)]
mod tests;
