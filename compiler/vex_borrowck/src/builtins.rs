//! Ownership effects of builtin functions.
//!
//! User-defined functions take ownership of every argument. Builtins are
//! more precise: each parameter declares whether it reads, moves, or
//! borrows its argument, whether the result borrows from the arguments,
//! and whether it is a raw pointer.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use vex_ir::RefMode;

/// What a builtin does with one argument.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamEffect {
    /// Reads (copies) the value; ownership stays with the caller.
    ReadOnly,
    /// Takes ownership.
    Moves,
    /// Borrows shared for the duration of the call.
    BorrowsShared,
    /// Borrows exclusively for the duration of the call.
    BorrowsExclusive,
}

impl ParamEffect {
    /// Reference mode of an implicit borrow, if the effect borrows.
    pub fn borrow_mode(self) -> Option<RefMode> {
        match self {
            ParamEffect::BorrowsShared => Some(RefMode::Shared),
            ParamEffect::BorrowsExclusive => Some(RefMode::Exclusive),
            ParamEffect::ReadOnly | ParamEffect::Moves => None,
        }
    }
}

/// Signature of one builtin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltinSig {
    pub params: SmallVec<[ParamEffect; 4]>,
    /// Effect for arguments past the declared parameters (variadics).
    pub rest: Option<ParamEffect>,
    /// The result holds a reference into one of the borrowed arguments.
    pub returns_borrowed: bool,
    /// The result is a raw pointer.
    pub returns_raw: bool,
}

impl BuiltinSig {
    pub fn new(params: &[ParamEffect]) -> Self {
        BuiltinSig {
            params: params.iter().copied().collect(),
            rest: None,
            returns_borrowed: false,
            returns_raw: false,
        }
    }

    #[must_use]
    pub fn variadic(mut self, rest: ParamEffect) -> Self {
        self.rest = Some(rest);
        self
    }

    #[must_use]
    pub fn borrowing_result(mut self) -> Self {
        self.returns_borrowed = true;
        self
    }

    #[must_use]
    pub fn raw_result(mut self) -> Self {
        self.returns_raw = true;
        self
    }

    /// Effect on argument `index`. Surplus arguments of a non-variadic
    /// builtin are treated as moved, like any unknown parameter.
    pub fn effect(&self, index: usize) -> ParamEffect {
        self.params
            .get(index)
            .copied()
            .or(self.rest)
            .unwrap_or(ParamEffect::Moves)
    }
}

/// Table of builtin signatures, keyed by callee name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltinRegistry {
    sigs: FxHashMap<String, BuiltinSig>,
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl BuiltinRegistry {
    /// A registry with no builtins: every callee takes ownership.
    pub fn empty() -> Self {
        BuiltinRegistry {
            sigs: FxHashMap::default(),
        }
    }

    /// The builtins of the Vex prelude.
    pub fn standard() -> Self {
        use ParamEffect::{BorrowsExclusive, BorrowsShared, Moves, ReadOnly};

        let mut registry = Self::empty();

        // I/O and assertions
        for name in ["print", "println", "eprint", "eprintln", "panic"] {
            registry.register(name, BuiltinSig::new(&[]).variadic(ReadOnly));
        }
        registry.register("assert", BuiltinSig::new(&[ReadOnly, ReadOnly]));
        registry.register("format", BuiltinSig::new(&[]).variadic(ReadOnly));

        // Memory
        registry.register("alloc", BuiltinSig::new(&[ReadOnly]).raw_result());
        registry.register("malloc", BuiltinSig::new(&[ReadOnly]).raw_result());
        registry.register("calloc", BuiltinSig::new(&[ReadOnly, ReadOnly]).raw_result());
        registry.register("free", BuiltinSig::new(&[Moves]));
        registry.register(
            "realloc",
            BuiltinSig::new(&[Moves, ReadOnly]).raw_result(),
        );
        registry.register("drop", BuiltinSig::new(&[Moves]));
        registry.register("sizeof", BuiltinSig::new(&[ReadOnly]));
        registry.register("clone", BuiltinSig::new(&[BorrowsShared]));

        // Strings
        registry.register("strlen", BuiltinSig::new(&[BorrowsShared]));
        registry.register("strcmp", BuiltinSig::new(&[BorrowsShared, BorrowsShared]));
        registry.register("strcat", BuiltinSig::new(&[BorrowsExclusive, BorrowsShared]));
        registry.register("string_from", BuiltinSig::new(&[BorrowsShared]));
        registry.register("string_free", BuiltinSig::new(&[Moves]));

        // Arrays and vectors
        registry.register("len", BuiltinSig::new(&[BorrowsShared]));
        registry.register("array_len", BuiltinSig::new(&[BorrowsShared]));
        registry.register(
            "array_get",
            BuiltinSig::new(&[BorrowsShared, ReadOnly]).borrowing_result(),
        );
        registry.register(
            "array_set",
            BuiltinSig::new(&[BorrowsExclusive, ReadOnly, Moves]),
        );
        registry.register("array_append", BuiltinSig::new(&[BorrowsExclusive, Moves]));
        registry.register("vec_push", BuiltinSig::new(&[BorrowsExclusive, Moves]));
        registry.register("vec_free", BuiltinSig::new(&[Moves]));

        // Maps
        registry.register(
            "hashmap_insert",
            BuiltinSig::new(&[BorrowsExclusive, Moves, Moves]),
        );
        registry.register(
            "hashmap_get",
            BuiltinSig::new(&[BorrowsShared, BorrowsShared]).borrowing_result(),
        );
        registry.register("hashmap_len", BuiltinSig::new(&[BorrowsShared]));
        registry.register(
            "hashmap_contains",
            BuiltinSig::new(&[BorrowsShared, BorrowsShared]),
        );
        registry.register(
            "hashmap_remove",
            BuiltinSig::new(&[BorrowsExclusive, BorrowsShared]),
        );
        registry.register("hashmap_clear", BuiltinSig::new(&[BorrowsExclusive]));
        registry.register("hashmap_free", BuiltinSig::new(&[Moves]));

        // Introspection
        for name in ["typeof", "type_id", "type_size", "type_align"] {
            registry.register(name, BuiltinSig::new(&[ReadOnly]));
        }

        registry
    }

    /// Add or replace a builtin.
    pub fn register(&mut self, name: &str, sig: BuiltinSig) {
        self.sigs.insert(name.to_owned(), sig);
    }

    pub fn get(&self, name: &str) -> Option<&BuiltinSig> {
        self.sigs.get(name)
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.sigs.contains_key(name)
    }

    /// Effect of `callee` on argument `index`. Unknown callees move.
    pub fn effect(&self, callee: &str, index: usize) -> ParamEffect {
        self.get(callee)
            .map_or(ParamEffect::Moves, |sig| sig.effect(index))
    }

    /// Whether a call to `callee` returns a reference into its arguments.
    pub fn returns_borrowed(&self, callee: &str) -> bool {
        self.get(callee).is_some_and(|sig| sig.returns_borrowed)
    }

    /// Whether a call to `callee` returns a raw pointer.
    pub fn returns_raw(&self, callee: &str) -> bool {
        self.get(callee).is_some_and(|sig| sig.returns_raw)
    }

    pub fn len(&self) -> usize {
        self.sigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sigs.is_empty()
    }
}
