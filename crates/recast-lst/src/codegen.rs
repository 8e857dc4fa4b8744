// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Code generation: printing an LST back to source text.
//!
//! The printer is a pure fold over the tree. Each node emits its leading
//! trivia, its own lexical form, and its children in order, respecting
//! padded-child delimiter trivia. It makes no formatting decisions — every
//! byte of output comes from trivia slots or from a node's fixed lexical
//! form — so printing an unmodified tree reproduces the original source
//! exactly.

use std::fmt;

use crate::nodes::{
    Assignment, Binary, Block, Call, ClassDecl, Empty, Expression, FieldAccess, Ident, If,
    Literal, MethodDecl, Module, NamedVariable, Parens, Return, RightPadded, Statement, Tree,
    TypeTree, Unary, VariableDecls, WhileLoop,
};
use crate::trivia::{Comment, Space};

/// Accumulates printed source text.
#[derive(Debug, Default)]
pub struct CodegenState {
    buf: String,
}

impl CodegenState {
    pub fn add_token(&mut self, token: &str) {
        self.buf.push_str(token);
    }
}

impl fmt::Display for CodegenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}

/// Types that can print themselves into a [`CodegenState`].
pub trait Codegen {
    fn codegen(&self, state: &mut CodegenState);
}

/// Print a tree to a string.
pub fn print(tree: &Tree) -> String {
    let mut state = CodegenState::default();
    tree.codegen(&mut state);
    state.to_string()
}

impl Codegen for Comment {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_token(&self.text);
        state.add_token(&self.suffix);
    }
}

impl Codegen for Space {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_token(&self.whitespace);
        for comment in &self.comments {
            comment.codegen(state);
        }
    }
}

/// Print a statement from a statement sequence: the element, its delimiter
/// trivia, and the terminating semicolon for the simple statement forms.
fn terminated_statement(padded: &RightPadded<Statement>, state: &mut CodegenState) {
    padded.element.codegen(state);
    padded.after.codegen(state);
    if padded.element.terminated_by_semicolon() {
        state.add_token(";");
    }
}

impl Codegen for Module {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        for padded in &self.statements {
            terminated_statement(padded, state);
        }
        self.eof.codegen(state);
    }
}

impl Codegen for Ident {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token(&self.symbol.name);
    }
}

impl Codegen for FieldAccess {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        self.target.codegen(state);
        self.name.before.codegen(state);
        state.add_token(".");
        self.name.element.codegen(state);
    }
}

impl Codegen for Literal {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token(&self.source);
    }
}

impl Codegen for Unary {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        if self.operator.element.is_prefix() {
            state.add_token(self.operator.element.token());
            self.expression.codegen(state);
        } else {
            self.expression.codegen(state);
            self.operator.before.codegen(state);
            state.add_token(self.operator.element.token());
        }
    }
}

impl Codegen for Binary {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        self.left.codegen(state);
        self.operator.before.codegen(state);
        state.add_token(self.operator.element.token());
        self.right.codegen(state);
    }
}

impl Codegen for Assignment {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        self.target.codegen(state);
        self.value.before.codegen(state);
        state.add_token("=");
        self.value.element.codegen(state);
    }
}

impl Codegen for Call {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        if let Some(receiver) = &self.receiver {
            receiver.element.codegen(state);
            receiver.after.codegen(state);
            state.add_token(".");
        }
        self.name.codegen(state);
        self.arguments.before.codegen(state);
        state.add_token("(");
        let last = self.arguments.len().saturating_sub(1);
        for (i, padded) in self.arguments.iter().enumerate() {
            padded.element.codegen(state);
            padded.after.codegen(state);
            if i != last {
                state.add_token(",");
            }
        }
        state.add_token(")");
    }
}

impl Codegen for Parens {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token("(");
        self.tree.element.codegen(state);
        self.tree.after.codegen(state);
        state.add_token(")");
    }
}

impl Codegen for Empty {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
    }
}

impl Codegen for Block {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token("{");
        for padded in &self.statements {
            terminated_statement(padded, state);
        }
        self.end.codegen(state);
        state.add_token("}");
    }
}

impl Codegen for If {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token("if");
        self.condition.codegen(state);
        terminated_statement(&self.then_part, state);
        if let Some(else_part) = &self.else_part {
            else_part.before.codegen(state);
            state.add_token("else");
            terminated_statement(&else_part.element, state);
        }
    }
}

impl Codegen for WhileLoop {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token("while");
        self.condition.codegen(state);
        terminated_statement(&self.body, state);
    }
}

impl Codegen for Return {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token("return");
        if let Some(expression) = &self.expression {
            expression.codegen(state);
        }
    }
}

impl Codegen for NamedVariable {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        self.name.codegen(state);
        if let Some(initializer) = &self.initializer {
            initializer.before.codegen(state);
            state.add_token("=");
            initializer.element.codegen(state);
        }
    }
}

impl Codegen for VariableDecls {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        if let Some(type_expr) = &self.type_expr {
            type_expr.codegen(state);
        }
        let last = self.variables.len().saturating_sub(1);
        for (i, padded) in self.variables.iter().enumerate() {
            padded.element.codegen(state);
            padded.after.codegen(state);
            if i != last {
                state.add_token(",");
            }
        }
    }
}

impl Codegen for MethodDecl {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        if let Some(return_type) = &self.return_type {
            return_type.codegen(state);
        }
        self.name.codegen(state);
        self.parameters.before.codegen(state);
        state.add_token("(");
        let last = self.parameters.len().saturating_sub(1);
        for (i, padded) in self.parameters.iter().enumerate() {
            padded.element.codegen(state);
            padded.after.codegen(state);
            if i != last {
                state.add_token(",");
            }
        }
        state.add_token(")");
        match &self.body {
            Some(body) => body.codegen(state),
            // Abstract declaration.
            None => state.add_token(";"),
        }
    }
}

impl Codegen for ClassDecl {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token("class");
        self.name.codegen(state);
        if let Some(extends) = &self.extends {
            extends.before.codegen(state);
            state.add_token("extends");
            extends.element.codegen(state);
        }
        self.body.codegen(state);
    }
}

impl Codegen for Tree {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Tree::Module(n) => n.codegen(state),
            Tree::Ident(n) => n.codegen(state),
            Tree::FieldAccess(n) => n.codegen(state),
            Tree::Literal(n) => n.codegen(state),
            Tree::Unary(n) => n.codegen(state),
            Tree::Binary(n) => n.codegen(state),
            Tree::Assignment(n) => n.codegen(state),
            Tree::Call(n) => n.codegen(state),
            Tree::Parens(n) => n.codegen(state),
            Tree::Empty(n) => n.codegen(state),
            Tree::Block(n) => n.codegen(state),
            Tree::If(n) => n.codegen(state),
            Tree::WhileLoop(n) => n.codegen(state),
            Tree::Return(n) => n.codegen(state),
            Tree::VariableDecls(n) => n.codegen(state),
            Tree::NamedVariable(n) => n.codegen(state),
            Tree::MethodDecl(n) => n.codegen(state),
            Tree::ClassDecl(n) => n.codegen(state),
        }
    }
}

impl Codegen for Expression {
    fn codegen(&self, state: &mut CodegenState) {
        Tree::from(self.clone()).codegen(state);
    }
}

impl Codegen for Statement {
    fn codegen(&self, state: &mut CodegenState) {
        Tree::from(self.clone()).codegen(state);
    }
}

impl Codegen for TypeTree {
    fn codegen(&self, state: &mut CodegenState) {
        Tree::from(self.clone()).codegen(state);
    }
}
