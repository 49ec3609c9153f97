//! Binding records and ownership states.
//!
//! Every declaration (global item, parameter, receiver, `let`) allocates a
//! [`Binding`] in the per-walk [`BindingTable`]. Shadowing allocates a new
//! binding; the shadowed one keeps its record and state.

use std::fmt;

use smallvec::SmallVec;
use vex_ir::{Name, Span, ValueType};

use crate::{BindingId, ScopeId};

/// How a binding was introduced.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum BindingKind {
    Local,
    Param,
    /// `self` in a method.
    Receiver,
    /// Module-level item: function, extern, constant, or import.
    Global,
}

impl BindingKind {
    /// Parameters and receivers carry a lifetime supplied by the caller.
    pub fn is_caller_owned(self) -> bool {
        matches!(self, BindingKind::Param | BindingKind::Receiver)
    }
}

/// Moved-out fields of a partially moved aggregate, with their move sites.
pub type MovedFields = SmallVec<[(Name, Span); 2]>;

/// Initialization and ownership state of a binding at a program point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OwnershipState {
    /// Declared without an initializer and not yet assigned.
    Uninitialized,
    /// Initialized on some control-flow paths only.
    ConditionallyInitialized,
    Owned,
    /// Ownership transferred away at `at`.
    Moved { at: Span },
    /// Some fields were moved out; the rest are still owned.
    PartiallyMoved { fields: MovedFields },
    /// The binding's scope has closed.
    Dropped,
}

impl OwnershipState {
    /// Merge the states of two control-flow paths.
    ///
    /// Moved on either path means moved afterwards; initialized on only one
    /// path means conditionally initialized.
    pub fn join(&self, other: &OwnershipState) -> OwnershipState {
        use OwnershipState::{
            ConditionallyInitialized, Dropped, Moved, Owned, PartiallyMoved, Uninitialized,
        };

        match (self, other) {
            (Dropped, _) | (_, Dropped) => Dropped,
            (Moved { at }, _) | (_, Moved { at }) => Moved { at: *at },
            (PartiallyMoved { fields: a }, PartiallyMoved { fields: b }) => {
                let mut fields = a.clone();
                for entry in b {
                    if !fields.iter().any(|(name, _)| *name == entry.0) {
                        fields.push(*entry);
                    }
                }
                PartiallyMoved { fields }
            }
            (PartiallyMoved { fields }, Owned) | (Owned, PartiallyMoved { fields }) => {
                PartiallyMoved {
                    fields: fields.clone(),
                }
            }
            (Owned, Owned) => Owned,
            (Uninitialized, Uninitialized) => Uninitialized,
            _ => ConditionallyInitialized,
        }
    }

    /// Whether the whole value may be read.
    pub fn is_usable(&self) -> bool {
        matches!(self, OwnershipState::Owned)
    }

    pub fn is_initialized(&self) -> bool {
        !matches!(
            self,
            OwnershipState::Uninitialized | OwnershipState::ConditionallyInitialized
        )
    }

    /// Move site of `field`, if it was moved out.
    pub fn moved_field(&self, field: Name) -> Option<Span> {
        match self {
            OwnershipState::PartiallyMoved { fields } => fields
                .iter()
                .find(|(name, _)| *name == field)
                .map(|(_, span)| *span),
            _ => None,
        }
    }
}

impl fmt::Display for OwnershipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnershipState::Uninitialized => f.write_str("uninitialized"),
            OwnershipState::ConditionallyInitialized => f.write_str("possibly-uninitialized"),
            OwnershipState::Owned => f.write_str("owned"),
            OwnershipState::Moved { .. } => f.write_str("moved"),
            OwnershipState::PartiallyMoved { .. } => f.write_str("partially moved"),
            OwnershipState::Dropped => f.write_str("dropped"),
        }
    }
}

/// A declared name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub id: BindingId,
    pub name: Name,
    pub scope: ScopeId,
    /// Span of the declaration.
    pub span: Span,
    pub declared_mutable: bool,
    pub ty: ValueType,
    pub kind: BindingKind,
    pub state: OwnershipState,
}

/// Snapshot of every binding's state, indexed by [`BindingId`].
pub type StateSnapshot = Vec<OwnershipState>;

/// Arena of bindings for one walk.
#[derive(Clone, Debug, Default)]
pub struct BindingTable {
    bindings: Vec<Binding>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a binding. Its id is filled in here.
    pub fn alloc(&mut self, mut binding: Binding) -> BindingId {
        let id = BindingId::new(u32::try_from(self.bindings.len()).unwrap_or(u32::MAX));
        binding.id = id;
        self.bindings.push(binding);
        id
    }

    #[inline]
    pub fn get(&self, id: BindingId) -> &Binding {
        &self.bindings[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: BindingId) -> &mut Binding {
        &mut self.bindings[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Capture the state of every binding allocated so far.
    pub fn snapshot(&self) -> StateSnapshot {
        self.bindings.iter().map(|b| b.state.clone()).collect()
    }

    /// Restore states from a snapshot.
    ///
    /// Bindings allocated after the snapshot keep their current state; they
    /// belong to scopes that have already closed.
    pub fn restore(&mut self, snapshot: &StateSnapshot) {
        for (binding, state) in self.bindings.iter_mut().zip(snapshot) {
            binding.state = state.clone();
        }
    }

    /// Replace each state with its join against `other`.
    pub fn join_with(&mut self, other: &StateSnapshot) {
        for (binding, state) in self.bindings.iter_mut().zip(other) {
            binding.state = binding.state.join(state);
        }
    }
}
