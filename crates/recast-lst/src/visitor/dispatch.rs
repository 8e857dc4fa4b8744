// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The traversal driver: double dispatch with role reduction.
//!
//! [`visit_tree`] is the single entry point every child visit funnels
//! through. For each node it:
//!
//! 1. Returns the input untouched when the stop signal is set.
//! 2. Pushes a cursor frame for the node.
//! 3. Calls the variant-specific `visit_*` method (whose default walks the
//!    children).
//! 4. Applies each capability's generic visit, in the order declared by
//!    `nodes::capabilities`, aborting the reduction early if a visit
//!    changed the node's runtime kind — once the kind changed, no narrower
//!    role visit can apply.
//! 5. Pops the cursor frame.
//!
//! The typed slot helpers re-narrow a visited child to the role its slot
//! requires. A visitor that replaces a child with a node outside the slot's
//! role has produced a structurally invalid tree; that is a defect, and the
//! helpers fail fast rather than letting it propagate.

use std::sync::Arc;

use super::traits::{LstVisitor, VisitCtx};
use crate::nodes::{
    Block, Capability, Expression, Ident, NamedVariable, Parens, Statement, Tree, TypeTree,
};

/// Visit one node: variant dispatch followed by role reduction.
pub fn visit_tree<V: LstVisitor + ?Sized>(v: &mut V, tree: &Tree, ctx: &mut VisitCtx) -> Tree {
    if ctx.is_stopped() {
        return tree.clone();
    }
    ctx.push(tree.clone());
    let mut result = match tree {
        Tree::Module(n) => v.visit_module(n, ctx),
        Tree::Ident(n) => v.visit_ident(n, ctx),
        Tree::FieldAccess(n) => v.visit_field_access(n, ctx),
        Tree::Literal(n) => v.visit_literal(n, ctx),
        Tree::Unary(n) => v.visit_unary(n, ctx),
        Tree::Binary(n) => v.visit_binary(n, ctx),
        Tree::Assignment(n) => v.visit_assignment(n, ctx),
        Tree::Call(n) => v.visit_call(n, ctx),
        Tree::Parens(n) => v.visit_parens(n, ctx),
        Tree::Empty(n) => v.visit_empty(n, ctx),
        Tree::Block(n) => v.visit_block(n, ctx),
        Tree::If(n) => v.visit_if(n, ctx),
        Tree::WhileLoop(n) => v.visit_while_loop(n, ctx),
        Tree::Return(n) => v.visit_return(n, ctx),
        Tree::VariableDecls(n) => v.visit_variable_decls(n, ctx),
        Tree::NamedVariable(n) => v.visit_named_variable(n, ctx),
        Tree::MethodDecl(n) => v.visit_method_decl(n, ctx),
        Tree::ClassDecl(n) => v.visit_class_decl(n, ctx),
    };
    for cap in tree.capabilities() {
        if result.kind() != tree.kind() {
            break;
        }
        result = match cap {
            Capability::Statement => v.visit_statement(result, ctx),
            Capability::Expression => v.visit_expression(result, ctx),
            Capability::TypeTree => v.visit_type_tree(result, ctx),
        };
    }
    ctx.pop();
    result
}

/// Run a visitor over a whole tree with a fresh context.
pub fn run_visitor<V: LstVisitor + ?Sized>(v: &mut V, tree: &Tree) -> Tree {
    let mut ctx = VisitCtx::new();
    visit_tree(v, tree, &mut ctx)
}

/// Visit a child in expression position.
pub fn visit_expression_slot<V: LstVisitor + ?Sized>(
    v: &mut V,
    expression: &Expression,
    ctx: &mut VisitCtx,
) -> Expression {
    let visited = visit_tree(v, &expression.clone().into(), ctx);
    Expression::try_from(visited).unwrap_or_else(|tree| {
        panic!(
            "visitor replaced an expression child with a {} node",
            tree.kind()
        )
    })
}

/// Visit a child in statement position.
pub fn visit_statement_slot<V: LstVisitor + ?Sized>(
    v: &mut V,
    statement: &Statement,
    ctx: &mut VisitCtx,
) -> Statement {
    let visited = visit_tree(v, &statement.clone().into(), ctx);
    Statement::try_from(visited).unwrap_or_else(|tree| {
        panic!(
            "visitor replaced a statement child with a {} node",
            tree.kind()
        )
    })
}

/// Visit a child in type-reference position.
pub fn visit_type_tree_slot<V: LstVisitor + ?Sized>(
    v: &mut V,
    type_tree: &TypeTree,
    ctx: &mut VisitCtx,
) -> TypeTree {
    let visited = visit_tree(v, &type_tree.clone().into(), ctx);
    TypeTree::try_from(visited).unwrap_or_else(|tree| {
        panic!(
            "visitor replaced a type-reference child with a {} node",
            tree.kind()
        )
    })
}

/// Visit a child slot that must remain an identifier.
pub fn visit_ident_slot<V: LstVisitor + ?Sized>(
    v: &mut V,
    ident: &Arc<Ident>,
    ctx: &mut VisitCtx,
) -> Arc<Ident> {
    match visit_tree(v, &Tree::Ident(ident.clone()), ctx) {
        Tree::Ident(n) => n,
        other => panic!(
            "visitor replaced an identifier child with a {} node",
            other.kind()
        ),
    }
}

/// Visit a child slot that must remain a parenthesized expression.
pub fn visit_parens_slot<V: LstVisitor + ?Sized>(
    v: &mut V,
    parens: &Arc<Parens>,
    ctx: &mut VisitCtx,
) -> Arc<Parens> {
    match visit_tree(v, &Tree::Parens(parens.clone()), ctx) {
        Tree::Parens(n) => n,
        other => panic!(
            "visitor replaced a parenthesized child with a {} node",
            other.kind()
        ),
    }
}

/// Visit a child slot that must remain a block.
pub fn visit_block_slot<V: LstVisitor + ?Sized>(
    v: &mut V,
    block: &Arc<Block>,
    ctx: &mut VisitCtx,
) -> Arc<Block> {
    match visit_tree(v, &Tree::Block(block.clone()), ctx) {
        Tree::Block(n) => n,
        other => panic!("visitor replaced a block child with a {} node", other.kind()),
    }
}

/// Visit a child slot that must remain a named variable.
pub fn visit_named_variable_slot<V: LstVisitor + ?Sized>(
    v: &mut V,
    variable: &Arc<NamedVariable>,
    ctx: &mut VisitCtx,
) -> Arc<NamedVariable> {
    match visit_tree(v, &Tree::NamedVariable(variable.clone()), ctx) {
        Tree::NamedVariable(n) => n,
        other => panic!(
            "visitor replaced a variable declarator with a {} node",
            other.kind()
        ),
    }
}
