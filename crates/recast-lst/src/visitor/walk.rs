// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Walk functions: the default child traversal for each node variant.
//!
//! Every walk visits the node's trivia slots and children in source order
//! and reconstructs the node only when something changed, preserving the
//! node's identity in the copy. When nothing changed the original reference
//! comes back, which is what keeps untouched subtrees reference-identical
//! across a transformation.

use std::sync::Arc;

use super::dispatch::{
    visit_block_slot, visit_expression_slot, visit_ident_slot, visit_named_variable_slot,
    visit_parens_slot, visit_statement_slot, visit_type_tree_slot,
};
use super::traits::{LstVisitor, SpaceLoc, VisitCtx};
use crate::nodes::{
    Assignment, Binary, Block, Call, ClassDecl, Container, Empty, Expression, FieldAccess, Ident,
    If, LeftPadded, Literal, MethodDecl, Module, NamedVariable, Parens, Return, RightPadded,
    Statement, Tree, Unary, VariableDecls, WhileLoop,
};

/// Walk a right-padded statement sequence. Returns `None` when every
/// element and every delimiter space came back unchanged.
fn walk_statement_list<V: LstVisitor + ?Sized>(
    v: &mut V,
    list: &[RightPadded<Statement>],
    ctx: &mut VisitCtx,
) -> Option<Vec<RightPadded<Statement>>> {
    let mut changed = false;
    let mut out = Vec::with_capacity(list.len());
    for padded in list {
        let element = visit_statement_slot(v, &padded.element, ctx);
        let after = v.visit_space(&padded.after, SpaceLoc::StatementSuffix, ctx);
        if !element.ptr_eq(&padded.element) || !Arc::ptr_eq(&after, &padded.after) {
            changed = true;
        }
        out.push(RightPadded::new(element, after));
    }
    changed.then_some(out)
}

/// Walk an expression container (an argument list).
fn walk_expression_container<V: LstVisitor + ?Sized>(
    v: &mut V,
    container: &Container<Expression>,
    before_loc: SpaceLoc,
    after_loc: SpaceLoc,
    ctx: &mut VisitCtx,
) -> Option<Container<Expression>> {
    let before = v.visit_space(&container.before, before_loc, ctx);
    let mut changed = !Arc::ptr_eq(&before, &container.before);
    let mut elements = Vec::with_capacity(container.len());
    for padded in container {
        let element = visit_expression_slot(v, &padded.element, ctx);
        let after = v.visit_space(&padded.after, after_loc, ctx);
        if !element.ptr_eq(&padded.element) || !Arc::ptr_eq(&after, &padded.after) {
            changed = true;
        }
        elements.push(RightPadded::new(element, after));
    }
    changed.then_some(Container::new(before, elements))
}

/// Walk a statement container (a parameter list).
fn walk_statement_container<V: LstVisitor + ?Sized>(
    v: &mut V,
    container: &Container<Statement>,
    before_loc: SpaceLoc,
    after_loc: SpaceLoc,
    ctx: &mut VisitCtx,
) -> Option<Container<Statement>> {
    let before = v.visit_space(&container.before, before_loc, ctx);
    let mut changed = !Arc::ptr_eq(&before, &container.before);
    let mut elements = Vec::with_capacity(container.len());
    for padded in container {
        let element = visit_statement_slot(v, &padded.element, ctx);
        let after = v.visit_space(&padded.after, after_loc, ctx);
        if !element.ptr_eq(&padded.element) || !Arc::ptr_eq(&after, &padded.after) {
            changed = true;
        }
        elements.push(RightPadded::new(element, after));
    }
    changed.then_some(Container::new(before, elements))
}

pub fn walk_module<V: LstVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<Module>,
    ctx: &mut VisitCtx,
) -> Tree {
    let prefix = v.visit_space(&node.prefix, SpaceLoc::ModulePrefix, ctx);
    let statements = walk_statement_list(v, &node.statements, ctx);
    let eof = v.visit_space(&node.eof, SpaceLoc::ModuleEof, ctx);
    if Arc::ptr_eq(&prefix, &node.prefix) && statements.is_none() && Arc::ptr_eq(&eof, &node.eof)
    {
        return Tree::Module(node.clone());
    }
    let mut new = (**node).clone();
    new.prefix = prefix;
    if let Some(statements) = statements {
        new.statements = statements;
    }
    new.eof = eof;
    Tree::Module(Arc::new(new))
}

pub fn walk_ident<V: LstVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<Ident>,
    ctx: &mut VisitCtx,
) -> Tree {
    let prefix = v.visit_space(&node.prefix, SpaceLoc::IdentPrefix, ctx);
    if Arc::ptr_eq(&prefix, &node.prefix) {
        return Tree::Ident(node.clone());
    }
    Tree::Ident(Arc::new(node.with_prefix(prefix)))
}

pub fn walk_field_access<V: LstVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<FieldAccess>,
    ctx: &mut VisitCtx,
) -> Tree {
    let prefix = v.visit_space(&node.prefix, SpaceLoc::FieldAccessPrefix, ctx);
    let target = visit_expression_slot(v, &node.target, ctx);
    let dot = v.visit_space(&node.name.before, SpaceLoc::FieldAccessDot, ctx);
    let name = visit_ident_slot(v, &node.name.element, ctx);
    if Arc::ptr_eq(&prefix, &node.prefix)
        && target.ptr_eq(&node.target)
        && Arc::ptr_eq(&dot, &node.name.before)
        && Arc::ptr_eq(&name, &node.name.element)
    {
        return Tree::FieldAccess(node.clone());
    }
    let mut new = (**node).clone();
    new.prefix = prefix;
    new.target = target;
    new.name = LeftPadded::new(dot, name);
    Tree::FieldAccess(Arc::new(new))
}

pub fn walk_literal<V: LstVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<Literal>,
    ctx: &mut VisitCtx,
) -> Tree {
    let prefix = v.visit_space(&node.prefix, SpaceLoc::LiteralPrefix, ctx);
    if Arc::ptr_eq(&prefix, &node.prefix) {
        return Tree::Literal(node.clone());
    }
    Tree::Literal(Arc::new(node.with_prefix(prefix)))
}

pub fn walk_unary<V: LstVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<Unary>,
    ctx: &mut VisitCtx,
) -> Tree {
    let prefix = v.visit_space(&node.prefix, SpaceLoc::UnaryPrefix, ctx);
    let before = v.visit_space(&node.operator.before, SpaceLoc::UnaryOperator, ctx);
    let expression = visit_expression_slot(v, &node.expression, ctx);
    if Arc::ptr_eq(&prefix, &node.prefix)
        && Arc::ptr_eq(&before, &node.operator.before)
        && expression.ptr_eq(&node.expression)
    {
        return Tree::Unary(node.clone());
    }
    let mut new = (**node).clone();
    new.prefix = prefix;
    new.operator = LeftPadded::new(before, node.operator.element);
    new.expression = expression;
    Tree::Unary(Arc::new(new))
}

pub fn walk_binary<V: LstVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<Binary>,
    ctx: &mut VisitCtx,
) -> Tree {
    let prefix = v.visit_space(&node.prefix, SpaceLoc::BinaryPrefix, ctx);
    let left = visit_expression_slot(v, &node.left, ctx);
    let before = v.visit_space(&node.operator.before, SpaceLoc::BinaryOperator, ctx);
    let right = visit_expression_slot(v, &node.right, ctx);
    if Arc::ptr_eq(&prefix, &node.prefix)
        && left.ptr_eq(&node.left)
        && Arc::ptr_eq(&before, &node.operator.before)
        && right.ptr_eq(&node.right)
    {
        return Tree::Binary(node.clone());
    }
    let mut new = (**node).clone();
    new.prefix = prefix;
    new.left = left;
    new.operator = LeftPadded::new(before, node.operator.element);
    new.right = right;
    Tree::Binary(Arc::new(new))
}

pub fn walk_assignment<V: LstVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<Assignment>,
    ctx: &mut VisitCtx,
) -> Tree {
    let prefix = v.visit_space(&node.prefix, SpaceLoc::AssignmentPrefix, ctx);
    let target = visit_expression_slot(v, &node.target, ctx);
    let equals = v.visit_space(&node.value.before, SpaceLoc::AssignmentEquals, ctx);
    let value = visit_expression_slot(v, &node.value.element, ctx);
    if Arc::ptr_eq(&prefix, &node.prefix)
        && target.ptr_eq(&node.target)
        && Arc::ptr_eq(&equals, &node.value.before)
        && value.ptr_eq(&node.value.element)
    {
        return Tree::Assignment(node.clone());
    }
    let mut new = (**node).clone();
    new.prefix = prefix;
    new.target = target;
    new.value = LeftPadded::new(equals, value);
    Tree::Assignment(Arc::new(new))
}

pub fn walk_call<V: LstVisitor + ?Sized>(v: &mut V, node: &Arc<Call>, ctx: &mut VisitCtx) -> Tree {
    let prefix = v.visit_space(&node.prefix, SpaceLoc::CallPrefix, ctx);
    let mut receiver_changed = false;
    let receiver = node.receiver.as_ref().map(|padded| {
        let element = visit_expression_slot(v, &padded.element, ctx);
        let after = v.visit_space(&padded.after, SpaceLoc::CallReceiverSuffix, ctx);
        if !element.ptr_eq(&padded.element) || !Arc::ptr_eq(&after, &padded.after) {
            receiver_changed = true;
        }
        RightPadded::new(element, after)
    });
    let name = visit_ident_slot(v, &node.name, ctx);
    let arguments = walk_expression_container(
        v,
        &node.arguments,
        SpaceLoc::CallArguments,
        SpaceLoc::ArgumentSuffix,
        ctx,
    );
    if Arc::ptr_eq(&prefix, &node.prefix)
        && !receiver_changed
        && Arc::ptr_eq(&name, &node.name)
        && arguments.is_none()
    {
        return Tree::Call(node.clone());
    }
    let mut new = (**node).clone();
    new.prefix = prefix;
    new.receiver = receiver;
    new.name = name;
    if let Some(arguments) = arguments {
        new.arguments = arguments;
    }
    Tree::Call(Arc::new(new))
}

pub fn walk_parens<V: LstVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<Parens>,
    ctx: &mut VisitCtx,
) -> Tree {
    let prefix = v.visit_space(&node.prefix, SpaceLoc::ParensPrefix, ctx);
    let element = visit_expression_slot(v, &node.tree.element, ctx);
    let after = v.visit_space(&node.tree.after, SpaceLoc::ParensSuffix, ctx);
    if Arc::ptr_eq(&prefix, &node.prefix)
        && element.ptr_eq(&node.tree.element)
        && Arc::ptr_eq(&after, &node.tree.after)
    {
        return Tree::Parens(node.clone());
    }
    let mut new = (**node).clone();
    new.prefix = prefix;
    new.tree = RightPadded::new(element, after);
    Tree::Parens(Arc::new(new))
}

pub fn walk_empty<V: LstVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<Empty>,
    ctx: &mut VisitCtx,
) -> Tree {
    let prefix = v.visit_space(&node.prefix, SpaceLoc::EmptyPrefix, ctx);
    if Arc::ptr_eq(&prefix, &node.prefix) {
        return Tree::Empty(node.clone());
    }
    Tree::Empty(Arc::new(node.with_prefix(prefix)))
}

pub fn walk_block<V: LstVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<Block>,
    ctx: &mut VisitCtx,
) -> Tree {
    let prefix = v.visit_space(&node.prefix, SpaceLoc::BlockPrefix, ctx);
    let statements = walk_statement_list(v, &node.statements, ctx);
    let end = v.visit_space(&node.end, SpaceLoc::BlockEnd, ctx);
    if Arc::ptr_eq(&prefix, &node.prefix) && statements.is_none() && Arc::ptr_eq(&end, &node.end)
    {
        return Tree::Block(node.clone());
    }
    let mut new = (**node).clone();
    new.prefix = prefix;
    if let Some(statements) = statements {
        new.statements = statements;
    }
    new.end = end;
    Tree::Block(Arc::new(new))
}

pub fn walk_if<V: LstVisitor + ?Sized>(v: &mut V, node: &Arc<If>, ctx: &mut VisitCtx) -> Tree {
    let prefix = v.visit_space(&node.prefix, SpaceLoc::IfPrefix, ctx);
    let condition = visit_parens_slot(v, &node.condition, ctx);
    let then_stmt = visit_statement_slot(v, &node.then_part.element, ctx);
    let then_after = v.visit_space(&node.then_part.after, SpaceLoc::StatementSuffix, ctx);
    let mut else_changed = false;
    let else_part = node.else_part.as_ref().map(|padded| {
        let before = v.visit_space(&padded.before, SpaceLoc::ElseBefore, ctx);
        let element = visit_statement_slot(v, &padded.element.element, ctx);
        let after = v.visit_space(&padded.element.after, SpaceLoc::StatementSuffix, ctx);
        if !Arc::ptr_eq(&before, &padded.before)
            || !element.ptr_eq(&padded.element.element)
            || !Arc::ptr_eq(&after, &padded.element.after)
        {
            else_changed = true;
        }
        LeftPadded::new(before, RightPadded::new(element, after))
    });
    if Arc::ptr_eq(&prefix, &node.prefix)
        && Arc::ptr_eq(&condition, &node.condition)
        && then_stmt.ptr_eq(&node.then_part.element)
        && Arc::ptr_eq(&then_after, &node.then_part.after)
        && !else_changed
    {
        return Tree::If(node.clone());
    }
    let mut new = (**node).clone();
    new.prefix = prefix;
    new.condition = condition;
    new.then_part = RightPadded::new(then_stmt, then_after);
    new.else_part = else_part;
    Tree::If(Arc::new(new))
}

pub fn walk_while_loop<V: LstVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<WhileLoop>,
    ctx: &mut VisitCtx,
) -> Tree {
    let prefix = v.visit_space(&node.prefix, SpaceLoc::WhilePrefix, ctx);
    let condition = visit_parens_slot(v, &node.condition, ctx);
    let body_stmt = visit_statement_slot(v, &node.body.element, ctx);
    let body_after = v.visit_space(&node.body.after, SpaceLoc::StatementSuffix, ctx);
    if Arc::ptr_eq(&prefix, &node.prefix)
        && Arc::ptr_eq(&condition, &node.condition)
        && body_stmt.ptr_eq(&node.body.element)
        && Arc::ptr_eq(&body_after, &node.body.after)
    {
        return Tree::WhileLoop(node.clone());
    }
    let mut new = (**node).clone();
    new.prefix = prefix;
    new.condition = condition;
    new.body = RightPadded::new(body_stmt, body_after);
    Tree::WhileLoop(Arc::new(new))
}

pub fn walk_return<V: LstVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<Return>,
    ctx: &mut VisitCtx,
) -> Tree {
    let prefix = v.visit_space(&node.prefix, SpaceLoc::ReturnPrefix, ctx);
    let mut expr_changed = false;
    let expression = node.expression.as_ref().map(|expr| {
        let visited = visit_expression_slot(v, expr, ctx);
        if !visited.ptr_eq(expr) {
            expr_changed = true;
        }
        visited
    });
    if Arc::ptr_eq(&prefix, &node.prefix) && !expr_changed {
        return Tree::Return(node.clone());
    }
    let mut new = (**node).clone();
    new.prefix = prefix;
    new.expression = expression;
    Tree::Return(Arc::new(new))
}

pub fn walk_variable_decls<V: LstVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<VariableDecls>,
    ctx: &mut VisitCtx,
) -> Tree {
    let prefix = v.visit_space(&node.prefix, SpaceLoc::VariableDeclsPrefix, ctx);
    let mut type_changed = false;
    let type_expr = node.type_expr.as_ref().map(|tt| {
        let visited = visit_type_tree_slot(v, tt, ctx);
        if !visited.ptr_eq(tt) {
            type_changed = true;
        }
        visited
    });
    let mut vars_changed = false;
    let mut variables = Vec::with_capacity(node.variables.len());
    for padded in &node.variables {
        let element = visit_named_variable_slot(v, &padded.element, ctx);
        let after = v.visit_space(&padded.after, SpaceLoc::VariableSuffix, ctx);
        if !Arc::ptr_eq(&element, &padded.element) || !Arc::ptr_eq(&after, &padded.after) {
            vars_changed = true;
        }
        variables.push(RightPadded::new(element, after));
    }
    if Arc::ptr_eq(&prefix, &node.prefix) && !type_changed && !vars_changed {
        return Tree::VariableDecls(node.clone());
    }
    let mut new = (**node).clone();
    new.prefix = prefix;
    new.type_expr = type_expr;
    new.variables = variables;
    Tree::VariableDecls(Arc::new(new))
}

pub fn walk_named_variable<V: LstVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<NamedVariable>,
    ctx: &mut VisitCtx,
) -> Tree {
    let prefix = v.visit_space(&node.prefix, SpaceLoc::NamedVariablePrefix, ctx);
    let name = visit_ident_slot(v, &node.name, ctx);
    let mut init_changed = false;
    let initializer = node.initializer.as_ref().map(|padded| {
        let before = v.visit_space(&padded.before, SpaceLoc::InitializerEquals, ctx);
        let element = visit_expression_slot(v, &padded.element, ctx);
        if !Arc::ptr_eq(&before, &padded.before) || !element.ptr_eq(&padded.element) {
            init_changed = true;
        }
        LeftPadded::new(before, element)
    });
    if Arc::ptr_eq(&prefix, &node.prefix) && Arc::ptr_eq(&name, &node.name) && !init_changed {
        return Tree::NamedVariable(node.clone());
    }
    let mut new = (**node).clone();
    new.prefix = prefix;
    new.name = name;
    new.initializer = initializer;
    Tree::NamedVariable(Arc::new(new))
}

pub fn walk_method_decl<V: LstVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<MethodDecl>,
    ctx: &mut VisitCtx,
) -> Tree {
    let prefix = v.visit_space(&node.prefix, SpaceLoc::MethodPrefix, ctx);
    let mut type_changed = false;
    let return_type = node.return_type.as_ref().map(|tt| {
        let visited = visit_type_tree_slot(v, tt, ctx);
        if !visited.ptr_eq(tt) {
            type_changed = true;
        }
        visited
    });
    let name = visit_ident_slot(v, &node.name, ctx);
    let parameters = walk_statement_container(
        v,
        &node.parameters,
        SpaceLoc::MethodParameters,
        SpaceLoc::ParameterSuffix,
        ctx,
    );
    let mut body_changed = false;
    let body = node.body.as_ref().map(|block| {
        let visited = visit_block_slot(v, block, ctx);
        if !Arc::ptr_eq(&visited, block) {
            body_changed = true;
        }
        visited
    });
    if Arc::ptr_eq(&prefix, &node.prefix)
        && !type_changed
        && Arc::ptr_eq(&name, &node.name)
        && parameters.is_none()
        && !body_changed
    {
        return Tree::MethodDecl(node.clone());
    }
    let mut new = (**node).clone();
    new.prefix = prefix;
    new.return_type = return_type;
    new.name = name;
    if let Some(parameters) = parameters {
        new.parameters = parameters;
    }
    new.body = body;
    Tree::MethodDecl(Arc::new(new))
}

pub fn walk_class_decl<V: LstVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<ClassDecl>,
    ctx: &mut VisitCtx,
) -> Tree {
    let prefix = v.visit_space(&node.prefix, SpaceLoc::ClassPrefix, ctx);
    let name = visit_ident_slot(v, &node.name, ctx);
    let mut extends_changed = false;
    let extends = node.extends.as_ref().map(|padded| {
        let before = v.visit_space(&padded.before, SpaceLoc::ExtendsBefore, ctx);
        let element = visit_type_tree_slot(v, &padded.element, ctx);
        if !Arc::ptr_eq(&before, &padded.before) || !element.ptr_eq(&padded.element) {
            extends_changed = true;
        }
        LeftPadded::new(before, element)
    });
    let body = visit_block_slot(v, &node.body, ctx);
    if Arc::ptr_eq(&prefix, &node.prefix)
        && Arc::ptr_eq(&name, &node.name)
        && !extends_changed
        && Arc::ptr_eq(&body, &node.body)
    {
        return Tree::ClassDecl(node.clone());
    }
    let mut new = (**node).clone();
    new.prefix = prefix;
    new.name = name;
    new.extends = extends;
    new.body = body;
    Tree::ClassDecl(Arc::new(new))
}
