// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Minimum viable spacing.
//!
//! The final pipeline stage: insert the smallest amount of whitespace
//! needed to keep adjacent tokens lexically distinct after arbitrary
//! rewriting. A rewrite can butt a keyword against an identifier
//! (`returnx`) or stack sign operators (`a - b` rewritten with a unary
//! minus printing as `a--b`); this stage restores a single separating
//! space in exactly those positions and touches nothing else.

use std::sync::Arc;

use recast_lst::nodes::{
    Binary, BinaryOp, ClassDecl, Expression, If, LeftPadded, MethodDecl, Return, RightPadded,
    Statement, Tree, Unary, UnaryOp, VariableDecls,
};
use recast_lst::trivia::Space;
use recast_lst::visitor::{
    walk_binary, walk_class_decl, walk_if, walk_method_decl, walk_return, walk_unary,
    walk_variable_decls, LstVisitor, VisitCtx,
};

/// Inserts the minimal spacing required for the printed form to re-lex as
/// written.
#[derive(Default)]
pub struct MinimumViableSpacing;

impl MinimumViableSpacing {
    pub fn new() -> Self {
        Self
    }
}

fn single_space() -> Arc<Space> {
    Arc::new(Space::whitespace_only(" "))
}

/// The sign operator an expression's printed form starts with, if any.
fn leading_sign(expr: &Expression) -> Option<UnaryOp> {
    match expr {
        Expression::Unary(u) if u.operator.element.is_prefix() => Some(u.operator.element),
        _ => None,
    }
}

impl LstVisitor for MinimumViableSpacing {
    fn visit_return(&mut self, node: &Arc<Return>, ctx: &mut VisitCtx) -> Tree {
        let ret = match walk_return(self, node, ctx) {
            Tree::Return(ret) => ret,
            other => return other,
        };
        let expression = match &ret.expression {
            Some(expression) => expression,
            None => return Tree::Return(ret),
        };
        // `return(x)` still lexes; anything else needs a separator.
        if !expression.prefix().is_empty() || matches!(expression, Expression::Parens(_)) {
            return Tree::Return(ret);
        }
        let expression = expression.with_prefix(single_space());
        Tree::Return(Arc::new(ret.with_expression(Some(expression))))
    }

    fn visit_variable_decls(&mut self, node: &Arc<VariableDecls>, ctx: &mut VisitCtx) -> Tree {
        let decls = match walk_variable_decls(self, node, ctx) {
            Tree::VariableDecls(decls) => decls,
            other => return other,
        };
        if decls.type_expr.is_none() {
            return Tree::VariableDecls(decls);
        }
        let first = match decls.variables.first() {
            Some(first) => first,
            None => return Tree::VariableDecls(decls),
        };
        if !first.element.prefix.is_empty() || !first.element.name.prefix.is_empty() {
            return Tree::VariableDecls(decls);
        }
        let mut variables = decls.variables.clone();
        variables[0] = RightPadded::new(
            Arc::new(first.element.with_prefix(single_space())),
            first.after.clone(),
        );
        Tree::VariableDecls(Arc::new(decls.with_variables(variables)))
    }

    fn visit_method_decl(&mut self, node: &Arc<MethodDecl>, ctx: &mut VisitCtx) -> Tree {
        let method = match walk_method_decl(self, node, ctx) {
            Tree::MethodDecl(method) => method,
            other => return other,
        };
        if method.return_type.is_none() || !method.name.prefix.is_empty() {
            return Tree::MethodDecl(method);
        }
        let mut new = (*method).clone();
        new.name = Arc::new(method.name.with_prefix(single_space()));
        Tree::MethodDecl(Arc::new(new))
    }

    fn visit_class_decl(&mut self, node: &Arc<ClassDecl>, ctx: &mut VisitCtx) -> Tree {
        let class = match walk_class_decl(self, node, ctx) {
            Tree::ClassDecl(class) => class,
            other => return other,
        };
        let mut new = (*class).clone();
        let mut changed = false;
        if new.name.prefix.is_empty() {
            new.name = Arc::new(new.name.with_prefix(single_space()));
            changed = true;
        }
        if let Some(extends) = &new.extends {
            let mut before = extends.before.clone();
            let mut element = extends.element.clone();
            if before.is_empty() {
                before = single_space();
                changed = true;
            }
            if element.prefix().is_empty() {
                element = element.with_prefix(single_space());
                changed = true;
            }
            new.extends = Some(LeftPadded::new(before, element));
        }
        if !changed {
            return Tree::ClassDecl(class);
        }
        Tree::ClassDecl(Arc::new(new))
    }

    fn visit_if(&mut self, node: &Arc<If>, ctx: &mut VisitCtx) -> Tree {
        let if_node = match walk_if(self, node, ctx) {
            Tree::If(if_node) => if_node,
            other => return other,
        };
        let else_part = match &if_node.else_part {
            Some(else_part) => else_part,
            None => return Tree::If(if_node),
        };
        let stmt = &else_part.element.element;
        // `else{` and `else;` lex fine; `elsex` does not.
        let needs_space =
            !matches!(stmt, Statement::Block(_) | Statement::Empty(_)) && stmt.prefix().is_empty();
        if !needs_space {
            return Tree::If(if_node);
        }
        let else_part = LeftPadded::new(
            else_part.before.clone(),
            RightPadded::new(
                stmt.with_prefix(single_space()),
                else_part.element.after.clone(),
            ),
        );
        let mut new = (*if_node).clone();
        new.else_part = Some(else_part);
        Tree::If(Arc::new(new))
    }

    fn visit_binary(&mut self, node: &Arc<Binary>, ctx: &mut VisitCtx) -> Tree {
        let binary = match walk_binary(self, node, ctx) {
            Tree::Binary(binary) => binary,
            other => return other,
        };
        let fuses = match (binary.operator.element, leading_sign(&binary.right)) {
            (BinaryOp::Sub, Some(UnaryOp::Negative | UnaryOp::PreDecrement)) => true,
            (BinaryOp::Add, Some(UnaryOp::PreIncrement)) => true,
            _ => false,
        };
        if !fuses || !binary.right.prefix().is_empty() {
            return Tree::Binary(binary);
        }
        Tree::Binary(Arc::new(
            binary.with_right(binary.right.with_prefix(single_space())),
        ))
    }

    fn visit_unary(&mut self, node: &Arc<Unary>, ctx: &mut VisitCtx) -> Tree {
        let unary = match walk_unary(self, node, ctx) {
            Tree::Unary(unary) => unary,
            other => return other,
        };
        let fuses = matches!(
            (unary.operator.element, leading_sign(&unary.expression)),
            (
                UnaryOp::Negative,
                Some(UnaryOp::Negative | UnaryOp::PreDecrement)
            )
        );
        if !fuses || !unary.expression.prefix().is_empty() {
            return Tree::Unary(unary);
        }
        Tree::Unary(Arc::new(
            unary.with_expression(unary.expression.with_prefix(single_space())),
        ))
    }
}
