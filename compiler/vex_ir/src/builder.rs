//! Programmatic construction of checker input.
//!
//! Front ends lower their own AST into a [`Module`]; tests and tools use
//! [`ModuleBuilder`] to write the same trees by hand. Every node gets a
//! fresh, strictly increasing span, and composite nodes cover the spans of
//! their children, so diagnostics built from builder trees sort in
//! construction order.

use crate::ast::{
    BinaryOp, Block, ConstDef, Expr, ExprKind, ExternFn, FieldInit, FieldType, Function, Import,
    Item, Literal, MatchArm, Module, Param, RefMode, Stmt, StmtKind, TypeClass, ValueType,
};
use crate::{ExprId, Name, Span, StmtId, StringInterner};

/// Incremental builder for a [`Module`].
pub struct ModuleBuilder<'a> {
    interner: &'a StringInterner,
    module: Module,
    cursor: u32,
}

impl<'a> ModuleBuilder<'a> {
    pub fn new(interner: &'a StringInterner) -> Self {
        ModuleBuilder {
            interner,
            module: Module::default(),
            cursor: 0,
        }
    }

    /// Intern a name.
    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// Field descriptor for [`ValueType::structure`] / [`ValueType::tuple`].
    pub fn field_type(&self, name: &str, class: TypeClass) -> FieldType {
        FieldType {
            name: self.name(name),
            class,
        }
    }

    fn fresh(&mut self) -> Span {
        let span = Span::new(self.cursor, self.cursor + 1);
        self.cursor += 2;
        span
    }

    fn alloc_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.module.arena.alloc_expr(Expr::new(kind, span))
    }

    fn alloc_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        self.module.arena.alloc_stmt(Stmt::new(kind, span))
    }

    pub fn expr_span(&self, id: ExprId) -> Span {
        self.module.arena.expr(id).span
    }

    pub fn stmt_span(&self, id: StmtId) -> Span {
        self.module.arena.stmt(id).span
    }

    /// Span of the bound name in a `let` statement.
    pub fn let_name_span(&self, id: StmtId) -> Span {
        match &self.module.arena.stmt(id).kind {
            StmtKind::Let { name_span, .. } => *name_span,
            _ => self.stmt_span(id),
        }
    }

    // Expressions

    pub fn int(&mut self, value: i64) -> ExprId {
        let span = self.fresh();
        self.alloc_expr(ExprKind::Lit(Literal::Int(value)), span)
    }

    pub fn bool_lit(&mut self, value: bool) -> ExprId {
        let span = self.fresh();
        self.alloc_expr(ExprKind::Lit(Literal::Bool(value)), span)
    }

    pub fn str_lit(&mut self, value: &str) -> ExprId {
        let span = self.fresh();
        let name = self.name(value);
        self.alloc_expr(ExprKind::Lit(Literal::Str(name)), span)
    }

    pub fn unit(&mut self) -> ExprId {
        let span = self.fresh();
        self.alloc_expr(ExprKind::Lit(Literal::Unit), span)
    }

    pub fn ident(&mut self, name: &str) -> ExprId {
        let span = self.fresh();
        let name = self.name(name);
        self.alloc_expr(ExprKind::Ident(name), span)
    }

    pub fn field(&mut self, base: ExprId, field: &str) -> ExprId {
        let span = self.expr_span(base).merge(self.fresh());
        let field = self.name(field);
        self.alloc_expr(ExprKind::Field { base, field }, span)
    }

    pub fn index(&mut self, base: ExprId, index: ExprId) -> ExprId {
        let span = self.expr_span(base).merge(self.fresh());
        self.alloc_expr(ExprKind::Index { base, index }, span)
    }

    /// `&place`
    pub fn shared_ref(&mut self, place: ExprId) -> ExprId {
        self.reference(RefMode::Shared, place)
    }

    /// `&!place`
    pub fn exclusive_ref(&mut self, place: ExprId) -> ExprId {
        self.reference(RefMode::Exclusive, place)
    }

    pub fn reference(&mut self, mode: RefMode, place: ExprId) -> ExprId {
        let span = self.fresh().merge(self.expr_span(place));
        self.alloc_expr(ExprKind::Ref { mode, place }, span)
    }

    pub fn deref(&mut self, operand: ExprId) -> ExprId {
        let span = self.fresh().merge(self.expr_span(operand));
        self.alloc_expr(ExprKind::Deref(operand), span)
    }

    pub fn call(&mut self, callee: &str, args: Vec<ExprId>) -> ExprId {
        let mut span = self.fresh();
        for &arg in &args {
            span = span.merge(self.expr_span(arg));
        }
        span = span.merge(self.fresh());
        let callee = self.name(callee);
        self.alloc_expr(ExprKind::Call { callee, args }, span)
    }

    pub fn struct_lit(&mut self, name: &str, fields: &[(&str, ExprId)]) -> ExprId {
        let mut span = self.fresh();
        let fields = fields
            .iter()
            .map(|&(field, value)| {
                span = span.merge(self.expr_span(value));
                FieldInit {
                    name: self.name(field),
                    value,
                }
            })
            .collect();
        span = span.merge(self.fresh());
        let name = self.name(name);
        self.alloc_expr(ExprKind::StructLit { name, fields }, span)
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        let span = self.expr_span(left).merge(self.expr_span(right));
        self.alloc_expr(ExprKind::Binary { op, left, right }, span)
    }

    /// `Box.new(value)`
    pub fn heap(&mut self, value: ExprId) -> ExprId {
        let span = self.fresh().merge(self.expr_span(value));
        self.alloc_expr(ExprKind::HeapAlloc(value), span)
    }

    pub fn closure(&mut self, params: Vec<Param>, body: Block) -> ExprId {
        let start = params.first().map_or(body.span, |p| p.span);
        let span = start.merge(body.span);
        self.alloc_expr(ExprKind::Closure { params, body }, span)
    }

    // Statements

    /// `let name = init`
    pub fn let_(&mut self, name: &str, ty: ValueType, init: ExprId) -> StmtId {
        self.let_stmt(name, false, ty, Some(init))
    }

    /// `let! name = init`
    pub fn let_mut(&mut self, name: &str, ty: ValueType, init: ExprId) -> StmtId {
        self.let_stmt(name, true, ty, Some(init))
    }

    /// `let name: T` / `let! name: T` without an initializer.
    pub fn declare(&mut self, name: &str, mutable: bool, ty: ValueType) -> StmtId {
        self.let_stmt(name, mutable, ty, None)
    }

    fn let_stmt(
        &mut self,
        name: &str,
        mutable: bool,
        ty: ValueType,
        init: Option<ExprId>,
    ) -> StmtId {
        let keyword = self.fresh();
        let name_span = self.fresh();
        let span = match init {
            Some(init) => keyword.merge(self.expr_span(init)),
            None => keyword.merge(name_span),
        };
        let name = self.name(name);
        self.alloc_stmt(
            StmtKind::Let {
                name,
                name_span,
                mutable,
                ty,
                init,
            },
            span,
        )
    }

    pub fn assign(&mut self, target: ExprId, value: ExprId) -> StmtId {
        let span = self.expr_span(target).merge(self.expr_span(value));
        self.alloc_stmt(
            StmtKind::Assign {
                target,
                value,
                compound: None,
            },
            span,
        )
    }

    /// `target op= value`
    pub fn compound_assign(&mut self, op: BinaryOp, target: ExprId, value: ExprId) -> StmtId {
        let span = self.expr_span(target).merge(self.expr_span(value));
        self.alloc_stmt(
            StmtKind::Assign {
                target,
                value,
                compound: Some(op),
            },
            span,
        )
    }

    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        let span = self.expr_span(expr);
        self.alloc_stmt(StmtKind::Expr(expr), span)
    }

    pub fn ret(&mut self, value: Option<ExprId>) -> StmtId {
        let keyword = self.fresh();
        let span = value.map_or(keyword, |v| keyword.merge(self.expr_span(v)));
        self.alloc_stmt(StmtKind::Return(value), span)
    }

    pub fn if_else(
        &mut self,
        cond: ExprId,
        then_block: Block,
        else_block: Option<Block>,
    ) -> StmtId {
        let keyword = self.fresh();
        let mut span = keyword.merge(then_block.span);
        if let Some(else_block) = &else_block {
            span = span.merge(else_block.span);
        }
        self.alloc_stmt(
            StmtKind::If {
                cond,
                then_block,
                else_block,
            },
            span,
        )
    }

    pub fn while_loop(&mut self, cond: ExprId, body: Block) -> StmtId {
        let span = self.fresh().merge(body.span);
        self.alloc_stmt(StmtKind::While { cond, body }, span)
    }

    /// `loop { body }`
    pub fn loop_stmt(&mut self, body: Block) -> StmtId {
        let span = self.fresh().merge(body.span);
        self.alloc_stmt(StmtKind::Loop { body }, span)
    }

    pub fn break_stmt(&mut self) -> StmtId {
        let span = self.fresh();
        self.alloc_stmt(StmtKind::Break, span)
    }

    pub fn continue_stmt(&mut self) -> StmtId {
        let span = self.fresh();
        self.alloc_stmt(StmtKind::Continue, span)
    }

    /// An arm for [`match_stmt`](Self::match_stmt).
    pub fn arm(&mut self, guard: Option<ExprId>, body: Block) -> MatchArm {
        let pattern = self.fresh();
        let span = pattern.merge(body.span);
        MatchArm { guard, body, span }
    }

    pub fn match_stmt(&mut self, scrutinee: ExprId, arms: Vec<MatchArm>) -> StmtId {
        let mut span = self.fresh().merge(self.expr_span(scrutinee));
        for arm in &arms {
            span = span.merge(arm.span);
        }
        self.alloc_stmt(StmtKind::Match { scrutinee, arms }, span)
    }

    /// `unsafe { ... }`
    pub fn unsafe_block(&mut self, block: Block) -> StmtId {
        let span = self.fresh().merge(block.span);
        self.alloc_stmt(StmtKind::Unsafe(block), span)
    }

    pub fn block_stmt(&mut self, block: Block) -> StmtId {
        let span = block.span;
        self.alloc_stmt(StmtKind::Block(block), span)
    }

    /// Close a block over `stmts`. The block ends at a fresh `}` span.
    pub fn block(&mut self, stmts: Vec<StmtId>) -> Block {
        let close = self.fresh();
        let span = stmts
            .first()
            .map_or(close, |&first| self.stmt_span(first).merge(close));
        Block { stmts, span }
    }

    pub fn param(&mut self, name: &str, mutable: bool, ty: ValueType) -> Param {
        let span = self.fresh();
        Param {
            name: self.name(name),
            mutable,
            ty,
            span,
        }
    }

    // Items

    /// Add a free function, returning its item index.
    pub fn function(&mut self, name: &str, params: Vec<Param>, body: Block) -> usize {
        self.push_function(name, None, params, body)
    }

    /// Add a method with a receiver, returning its item index.
    pub fn method(
        &mut self,
        name: &str,
        receiver: Param,
        params: Vec<Param>,
        body: Block,
    ) -> usize {
        self.push_function(name, Some(receiver), params, body)
    }

    fn push_function(
        &mut self,
        name: &str,
        receiver: Option<Param>,
        params: Vec<Param>,
        body: Block,
    ) -> usize {
        let start = receiver
            .as_ref()
            .or(params.first())
            .map_or(body.span, |p| p.span);
        let span = self.fresh().merge(start).merge(body.span);
        let name = self.name(name);
        self.push_item(Item::Function(Function {
            name,
            receiver,
            params,
            body,
            span,
        }))
    }

    pub fn extern_fn(&mut self, name: &str, params: Vec<Param>) -> usize {
        let span = self.fresh();
        let name = self.name(name);
        self.push_item(Item::Extern(ExternFn { name, params, span }))
    }

    pub fn constant(&mut self, name: &str, ty: ValueType, value: ExprId) -> usize {
        let span = self.fresh().merge(self.expr_span(value));
        let name = self.name(name);
        self.push_item(Item::Const(ConstDef {
            name,
            ty,
            value,
            span,
        }))
    }

    pub fn import(&mut self, name: &str) -> usize {
        let span = self.fresh();
        let name = self.name(name);
        self.push_item(Item::Import(Import { name, span }))
    }

    fn push_item(&mut self, item: Item) -> usize {
        self.module.items.push(item);
        self.module.items.len() - 1
    }

    pub fn finish(self) -> Module {
        self.module
    }
}
