//! Checker output attached to the syntax tree.
//!
//! Reference annotations are written by the borrow validator and completed
//! with a lifetime bound by the lifetime analyzer. Closure annotations come
//! from capture analysis. Both are keyed by the `ExprId` of the annotated
//! node.

use rustc_hash::FxHashMap;
use vex_ir::{ExprId, Name, RefMode};

use crate::BindingId;

/// Resolved facts about one reference expression.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct RefAnnotation {
    pub mode: RefMode,
    /// Referent binding, local to the function's walk. `None` when the
    /// place does not resolve to a binding (reborrows through `*`,
    /// unresolved names).
    pub target: Option<BindingId>,
    pub target_name: Option<Name>,
    /// Scope depth of the referent's declaration.
    pub target_depth: u32,
    /// Scope depth where the reference was created.
    pub created_depth: u32,
    /// First binding the reference was stored in.
    pub holder: Option<Name>,
    /// Depth of the innermost scope the reference may not outlive.
    pub lifetime_bound: Option<u32>,
}

/// How a closure uses what it captures.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum CaptureMode {
    /// Only reads captures; callable any number of times.
    Callable,
    /// Mutates a capture; callable repeatedly through an exclusive handle.
    CallableMut,
    /// Moves a captured value out; callable once.
    CallableOnce,
}

/// Capture analysis result for one closure expression.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ClosureCapture {
    pub mode: CaptureMode,
    /// Captured names in order of first use.
    pub captures: Vec<Name>,
}

/// Annotations for a whole module.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnotatedModule {
    pub references: FxHashMap<ExprId, RefAnnotation>,
    pub closures: FxHashMap<ExprId, ClosureCapture>,
}

impl AnnotatedModule {
    pub fn reference(&self, expr: ExprId) -> Option<&RefAnnotation> {
        self.references.get(&expr)
    }

    pub fn closure(&self, expr: ExprId) -> Option<&ClosureCapture> {
        self.closures.get(&expr)
    }

    /// Reference annotations in expression order.
    pub fn sorted_references(&self) -> Vec<(ExprId, &RefAnnotation)> {
        let mut refs: Vec<_> = self.references.iter().map(|(&id, a)| (id, a)).collect();
        refs.sort_by_key(|(id, _)| *id);
        refs
    }

    /// Encode with bincode.
    #[cfg(feature = "cache")]
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Decode bytes written by [`AnnotatedModule::to_bytes`].
    #[cfg(feature = "cache")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

#[cfg(test)]
mod tests;
