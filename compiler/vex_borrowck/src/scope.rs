//! Lexical scope tracking.
//!
//! Scopes form a tree rooted at the module scope (depth 0, holding the
//! globals). Function parameters live at depth 1 and the function body at
//! depth 2; every nested block, branch arm, loop body, and closure adds one.
//!
//! Scopes are entered and exited with stack discipline: only the innermost
//! open scope can get a child or be closed. Closed scopes stay in the tree
//! so later queries (`is_ancestor`, depths of dropped bindings) still work.

use rustc_hash::FxHashMap;
use vex_ir::Name;

use crate::{BindingId, ScopeError, ScopeId};

/// What introduced a scope.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Module,
    Function,
    Block,
    Branch,
    Loop,
    Closure,
}

impl ScopeKind {
    /// Scopes that start a new body: returns and captures are relative to them.
    pub fn is_body_boundary(self) -> bool {
        matches!(self, ScopeKind::Function | ScopeKind::Closure)
    }
}

#[derive(Clone, Debug)]
struct Scope {
    parent: Option<ScopeId>,
    depth: u32,
    kind: ScopeKind,
    names: FxHashMap<Name, BindingId>,
    /// Declaration order, for drop order on exit.
    declared: Vec<BindingId>,
    open: bool,
}

/// Tree of lexical scopes with a stack of open ones.
#[derive(Clone, Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    stack: Vec<ScopeId>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// Create a tree holding only the open module scope.
    pub fn new() -> Self {
        ScopeTree {
            scopes: vec![Scope {
                parent: None,
                depth: 0,
                kind: ScopeKind::Module,
                names: FxHashMap::default(),
                declared: Vec::new(),
                open: true,
            }],
            stack: vec![ScopeId::ROOT],
        }
    }

    /// The innermost open scope.
    pub fn current(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or(ScopeId::ROOT)
    }

    pub fn current_depth(&self) -> u32 {
        self.depth(self.current())
    }

    /// Number of open scopes, including the module scope.
    pub fn open_count(&self) -> usize {
        self.stack.len()
    }

    /// Open a child of `parent`, which must be the innermost open scope.
    pub fn enter_scope(&mut self, parent: ScopeId, kind: ScopeKind) -> Result<ScopeId, ScopeError> {
        let innermost = self.current();
        if parent != innermost {
            return Err(ScopeError::NotInnermost {
                requested: parent,
                innermost,
            });
        }

        let id = ScopeId::new(u32::try_from(self.scopes.len()).unwrap_or(u32::MAX));
        let depth = self.depth(parent) + 1;
        self.scopes.push(Scope {
            parent: Some(parent),
            depth,
            kind,
            names: FxHashMap::default(),
            declared: Vec::new(),
            open: true,
        });
        self.stack.push(id);
        tracing::trace!(scope = id.raw(), depth, ?kind, "enter scope");
        Ok(id)
    }

    /// Close `id`, which must be the innermost open scope.
    ///
    /// Returns the bindings declared in it, in drop order (reverse
    /// declaration order).
    pub fn exit_scope(&mut self, id: ScopeId) -> Result<Vec<BindingId>, ScopeError> {
        if id == ScopeId::ROOT {
            return Err(ScopeError::ExitRoot);
        }
        let innermost = self.current();
        if id != innermost {
            if id.index() >= self.scopes.len() {
                return Err(ScopeError::Unknown(id));
            }
            return Err(ScopeError::NotInnermost {
                requested: id,
                innermost,
            });
        }

        self.stack.pop();
        let scope = &mut self.scopes[id.index()];
        scope.open = false;
        tracing::trace!(scope = id.raw(), dropped = scope.declared.len(), "exit scope");
        Ok(scope.declared.iter().rev().copied().collect())
    }

    /// Check whether `a` encloses `b` (or is `b`).
    pub fn is_ancestor(&self, a: ScopeId, b: ScopeId) -> bool {
        let mut cursor = Some(b);
        while let Some(id) = cursor {
            if id == a {
                return true;
            }
            cursor = self.scopes.get(id.index()).and_then(|s| s.parent);
        }
        false
    }

    pub fn depth(&self, id: ScopeId) -> u32 {
        self.scopes.get(id.index()).map_or(0, |s| s.depth)
    }

    pub fn kind(&self, id: ScopeId) -> ScopeKind {
        self.scopes
            .get(id.index())
            .map_or(ScopeKind::Module, |s| s.kind)
    }

    pub fn is_open(&self, id: ScopeId) -> bool {
        self.scopes.get(id.index()).is_some_and(|s| s.open)
    }

    /// Innermost open function or closure scope.
    pub fn body_boundary(&self) -> Option<ScopeId> {
        self.stack
            .iter()
            .rev()
            .copied()
            .find(|&id| self.kind(id).is_body_boundary())
    }

    /// Bind `name` in the innermost open scope.
    ///
    /// Returns the binding it shadows in that same scope, if any.
    pub fn declare(&mut self, name: Name, binding: BindingId) -> Option<BindingId> {
        let current = self.current();
        let scope = &mut self.scopes[current.index()];
        scope.declared.push(binding);
        scope.names.insert(name, binding)
    }

    /// Resolve `name` from the innermost open scope outwards.
    pub fn lookup(&self, name: Name) -> Option<BindingId> {
        self.stack
            .iter()
            .rev()
            .find_map(|id| self.scopes[id.index()].names.get(&name).copied())
    }

    /// Names visible from the innermost open scope, innermost first.
    pub fn visible_names(&self) -> impl Iterator<Item = Name> + '_ {
        self.stack
            .iter()
            .rev()
            .flat_map(|id| self.scopes[id.index()].names.keys().copied())
    }

    /// Total number of scopes ever created.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}
