//! Per-walk checker state.
//!
//! A [`CheckerContext`] is threaded through every walker. It owns the
//! scope tree, the binding table, and the diagnostics of one phase over one
//! function; nothing is shared between walks except the read-only module,
//! name table, and builtin registry.

use vex_diagnostic::Diagnostic;
use vex_ir::{
    Expr, ExprId, Function, Item, Module, Name, Param, Span, Stmt, StmtId, StringLookup,
    ValueType,
};

use crate::{
    Binding, BindingId, BindingKind, BindingTable, BuiltinRegistry, CheckError, OwnershipState,
    ScopeError, ScopeId, ScopeKind, ScopeTree,
};

/// Checker state for one phase over one function.
#[derive(Clone)]
pub struct CheckerContext<'a> {
    pub module: &'a Module,
    pub names: &'a (dyn StringLookup + Sync),
    pub builtins: &'a BuiltinRegistry,
    pub scopes: ScopeTree,
    pub bindings: BindingTable,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> CheckerContext<'a> {
    /// Create a context with every module-level item bound at depth 0.
    pub fn new(
        module: &'a Module,
        names: &'a (dyn StringLookup + Sync),
        builtins: &'a BuiltinRegistry,
    ) -> Self {
        let mut ctx = CheckerContext {
            module,
            names,
            builtins,
            scopes: ScopeTree::new(),
            bindings: BindingTable::new(),
            diagnostics: Vec::new(),
        };
        ctx.register_globals();
        ctx
    }

    fn register_globals(&mut self) {
        for item in &self.module.items {
            let ty = match item {
                Item::Const(c) => c.ty.clone(),
                Item::Function(_) | Item::Extern(_) | Item::Import(_) => ValueType::copy(),
            };
            self.declare(
                item.name(),
                item.span(),
                false,
                ty,
                BindingKind::Global,
                OwnershipState::Owned,
            );
        }
    }

    // Tree access

    #[inline]
    pub fn expr(&self, id: ExprId) -> &'a Expr {
        self.module.expr(id)
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &'a Stmt {
        self.module.stmt(id)
    }

    /// Source text of an interned name.
    #[inline]
    pub fn name(&self, name: Name) -> &'a str {
        self.names.lookup(name)
    }

    // Scopes

    /// Open a scope nested in the current one.
    pub fn enter(&mut self, kind: ScopeKind) -> Result<ScopeId, ScopeError> {
        let parent = self.scopes.current();
        self.scopes.enter_scope(parent, kind)
    }

    /// Close `id`, marking its bindings dropped. Returns them in drop order.
    pub fn exit(&mut self, id: ScopeId) -> Result<Vec<BindingId>, ScopeError> {
        let dropped = self.scopes.exit_scope(id)?;
        for &binding in &dropped {
            self.bindings.get_mut(binding).state = OwnershipState::Dropped;
        }
        Ok(dropped)
    }

    /// Open the function scope and bind the receiver and parameters in it.
    pub fn enter_function(&mut self, func: &Function) -> Result<ScopeId, ScopeError> {
        let scope = self.enter(ScopeKind::Function)?;
        if let Some(receiver) = &func.receiver {
            self.declare_param(receiver, BindingKind::Receiver);
        }
        for param in &func.params {
            self.declare_param(param, BindingKind::Param);
        }
        Ok(scope)
    }

    /// Close the function scope and check the scope stack is back at the
    /// module scope.
    pub fn exit_function(&mut self, func: &Function, scope: ScopeId) -> Result<(), CheckError> {
        self.exit(scope)?;
        let open = self.scopes.open_count();
        if open != 1 {
            return Err(CheckError::UnbalancedScopes {
                function: self.name(func.name).to_owned(),
                open: open - 1,
            });
        }
        Ok(())
    }

    // Bindings

    /// Declare a binding in the current scope.
    pub fn declare(
        &mut self,
        name: Name,
        span: Span,
        declared_mutable: bool,
        ty: ValueType,
        kind: BindingKind,
        state: OwnershipState,
    ) -> BindingId {
        let id = self.bindings.alloc(Binding {
            id: BindingId::new(0),
            name,
            scope: self.scopes.current(),
            span,
            declared_mutable,
            ty,
            kind,
            state,
        });
        self.scopes.declare(name, id);
        id
    }

    /// Declare an initialized parameter, receiver, or closure parameter.
    pub fn declare_param(&mut self, param: &Param, kind: BindingKind) -> BindingId {
        self.declare(
            param.name,
            param.span,
            param.mutable,
            param.ty.clone(),
            kind,
            OwnershipState::Owned,
        )
    }

    #[inline]
    pub fn resolve(&self, name: Name) -> Option<BindingId> {
        self.scopes.lookup(name)
    }

    #[inline]
    pub fn binding(&self, id: BindingId) -> &Binding {
        self.bindings.get(id)
    }

    #[inline]
    pub fn binding_mut(&mut self, id: BindingId) -> &mut Binding {
        self.bindings.get_mut(id)
    }

    /// Scope depth of a binding's declaration.
    pub fn binding_depth(&self, id: BindingId) -> u32 {
        self.scopes.depth(self.binding(id).scope)
    }

    /// Source text of a binding's name.
    pub fn binding_name(&self, id: BindingId) -> &'a str {
        self.name(self.binding(id).name)
    }

    // Diagnostics

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostic_count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
