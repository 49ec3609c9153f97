//! Ownership classification carried by every binding.
//!
//! The front end resolves each binding's type down to what the checker
//! needs: whether values are copied or moved, the classification of each
//! named field, and whether the value is itself a reference.

use crate::Name;

/// Whether assigning or passing a value copies it or moves it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeClass {
    /// Primitives and references: duplicated on use.
    Copy,
    /// Owning values (strings, vectors, structs): ownership transfers on use.
    Move,
}

/// Reference mode.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum RefMode {
    /// `&x`: any number may coexist.
    Shared,
    /// `&!x`: at most one, and no shared references alongside it.
    Exclusive,
}

impl RefMode {
    /// Source-level sigil for this reference mode.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            RefMode::Shared => "&",
            RefMode::Exclusive => "&!",
        }
    }

    /// Word used in diagnostics ("shared borrow", "exclusive borrow").
    pub const fn describe(self) -> &'static str {
        match self {
            RefMode::Shared => "shared",
            RefMode::Exclusive => "exclusive",
        }
    }
}

/// A named field and how its values are transferred.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldType {
    pub name: Name,
    pub class: TypeClass,
}

/// Resolved type information for a binding.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueType {
    pub class: TypeClass,
    /// Fields of an aggregate, empty for scalars.
    pub fields: Vec<FieldType>,
    /// `Some` when the value is a reference of the given mode.
    pub reference: Option<RefMode>,
    /// A raw pointer (`*T`): dereferencing it needs an `unsafe` block.
    pub raw_pointer: bool,
}

impl ValueType {
    /// A `Copy` scalar such as `i32` or `bool`.
    pub fn copy() -> Self {
        ValueType {
            class: TypeClass::Copy,
            fields: Vec::new(),
            reference: None,
            raw_pointer: false,
        }
    }

    /// A `Move` scalar such as `String` or `Vec<T>`.
    pub fn owned() -> Self {
        ValueType {
            class: TypeClass::Move,
            fields: Vec::new(),
            reference: None,
            raw_pointer: false,
        }
    }

    /// A struct. Structs always move, regardless of their fields.
    pub fn structure(fields: Vec<FieldType>) -> Self {
        ValueType {
            class: TypeClass::Move,
            fields,
            reference: None,
            raw_pointer: false,
        }
    }

    /// A tuple: moves if any element moves.
    pub fn tuple(fields: Vec<FieldType>) -> Self {
        let class = if fields.iter().any(|f| f.class == TypeClass::Move) {
            TypeClass::Move
        } else {
            TypeClass::Copy
        };
        ValueType {
            class,
            fields,
            reference: None,
            raw_pointer: false,
        }
    }

    /// A reference. References are always `Copy`.
    pub fn reference(mode: RefMode) -> Self {
        ValueType {
            class: TypeClass::Copy,
            fields: Vec::new(),
            reference: Some(mode),
            raw_pointer: false,
        }
    }

    /// A raw pointer. Copied like a reference, but never tracked as one.
    pub fn raw_pointer() -> Self {
        ValueType {
            class: TypeClass::Copy,
            fields: Vec::new(),
            reference: None,
            raw_pointer: true,
        }
    }

    #[inline]
    pub fn is_copy(&self) -> bool {
        self.class == TypeClass::Copy
    }

    #[inline]
    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// Classification of a named field, if the type has one.
    pub fn field_class(&self, field: Name) -> Option<TypeClass> {
        self.fields.iter().find(|f| f.name == field).map(|f| f.class)
    }
}

impl Default for ValueType {
    fn default() -> Self {
        Self::copy()
    }
}
