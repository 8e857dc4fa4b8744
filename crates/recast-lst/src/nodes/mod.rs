// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The LST node model.
//!
//! The node set is closed: [`Tree`] enumerates every variant, each behind an
//! [`Arc`] so tree versions share untouched subtrees structurally. "Did this
//! subtree change" is therefore an O(1) [`Tree::ptr_eq`] check, and a
//! transformation that touches nothing returns the input tree itself.
//!
//! # Roles
//!
//! A variant can play several syntactic roles at once: an assignment is both
//! a statement and an expression, an identifier is both an expression and a
//! type reference. Role membership is declared per-variant in
//! [`capabilities`], an explicit table that also fixes the order in which
//! the visitor framework applies per-role visit logic (see
//! `visitor::dispatch`). The typed role enums [`Expression`], [`Statement`],
//! and [`TypeTree`] carry that membership into child slots.

mod expression;
mod statement;
mod traits;

pub use expression::{
    Assignment, Binary, BinaryOp, Call, Empty, FieldAccess, Ident, Literal, LiteralKind, Parens,
    Unary, UnaryOp,
};
pub use statement::{
    Block, ClassDecl, If, MethodDecl, Module, NamedVariable, Return, VariableDecls, WhileLoop,
};
pub use traits::{Container, LeftPadded, NodeId, RightPadded};

use std::fmt;
use std::sync::Arc;

use crate::trivia::Space;

/// Discriminant of a [`Tree`] variant, used for capability lookup and for
/// the "runtime type changed" checks in role reduction and the formatting
/// merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Module,
    Ident,
    FieldAccess,
    Literal,
    Unary,
    Binary,
    Assignment,
    Call,
    Parens,
    Empty,
    Block,
    If,
    WhileLoop,
    Return,
    VariableDecls,
    NamedVariable,
    MethodDecl,
    ClassDecl,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A syntactic role a node variant can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Statement,
    Expression,
    TypeTree,
}

/// Role membership per variant.
///
/// The slice order is the role-reduction order: after a node's
/// variant-specific visit, each capability's generic visit runs in this
/// order, each allowed to further transform the result.
pub fn capabilities(kind: NodeKind) -> &'static [Capability] {
    match kind {
        NodeKind::Module | NodeKind::NamedVariable => &[],
        NodeKind::Ident | NodeKind::FieldAccess => {
            &[Capability::Expression, Capability::TypeTree]
        }
        NodeKind::Literal | NodeKind::Binary | NodeKind::Parens => &[Capability::Expression],
        NodeKind::Unary | NodeKind::Assignment | NodeKind::Call | NodeKind::Empty => {
            &[Capability::Statement, Capability::Expression]
        }
        NodeKind::Block
        | NodeKind::If
        | NodeKind::WhileLoop
        | NodeKind::Return
        | NodeKind::VariableDecls
        | NodeKind::MethodDecl
        | NodeKind::ClassDecl => &[Capability::Statement],
    }
}

/// Any LST node. One variant per concrete node type, each structurally
/// shared behind an [`Arc`].
#[derive(Debug, Clone)]
pub enum Tree {
    Module(Arc<Module>),
    Ident(Arc<Ident>),
    FieldAccess(Arc<FieldAccess>),
    Literal(Arc<Literal>),
    Unary(Arc<Unary>),
    Binary(Arc<Binary>),
    Assignment(Arc<Assignment>),
    Call(Arc<Call>),
    Parens(Arc<Parens>),
    Empty(Arc<Empty>),
    Block(Arc<Block>),
    If(Arc<If>),
    WhileLoop(Arc<WhileLoop>),
    Return(Arc<Return>),
    VariableDecls(Arc<VariableDecls>),
    NamedVariable(Arc<NamedVariable>),
    MethodDecl(Arc<MethodDecl>),
    ClassDecl(Arc<ClassDecl>),
}

impl Tree {
    pub fn kind(&self) -> NodeKind {
        match self {
            Tree::Module(_) => NodeKind::Module,
            Tree::Ident(_) => NodeKind::Ident,
            Tree::FieldAccess(_) => NodeKind::FieldAccess,
            Tree::Literal(_) => NodeKind::Literal,
            Tree::Unary(_) => NodeKind::Unary,
            Tree::Binary(_) => NodeKind::Binary,
            Tree::Assignment(_) => NodeKind::Assignment,
            Tree::Call(_) => NodeKind::Call,
            Tree::Parens(_) => NodeKind::Parens,
            Tree::Empty(_) => NodeKind::Empty,
            Tree::Block(_) => NodeKind::Block,
            Tree::If(_) => NodeKind::If,
            Tree::WhileLoop(_) => NodeKind::WhileLoop,
            Tree::Return(_) => NodeKind::Return,
            Tree::VariableDecls(_) => NodeKind::VariableDecls,
            Tree::NamedVariable(_) => NodeKind::NamedVariable,
            Tree::MethodDecl(_) => NodeKind::MethodDecl,
            Tree::ClassDecl(_) => NodeKind::ClassDecl,
        }
    }

    pub fn id(&self) -> NodeId {
        match self {
            Tree::Module(n) => n.node_id,
            Tree::Ident(n) => n.node_id,
            Tree::FieldAccess(n) => n.node_id,
            Tree::Literal(n) => n.node_id,
            Tree::Unary(n) => n.node_id,
            Tree::Binary(n) => n.node_id,
            Tree::Assignment(n) => n.node_id,
            Tree::Call(n) => n.node_id,
            Tree::Parens(n) => n.node_id,
            Tree::Empty(n) => n.node_id,
            Tree::Block(n) => n.node_id,
            Tree::If(n) => n.node_id,
            Tree::WhileLoop(n) => n.node_id,
            Tree::Return(n) => n.node_id,
            Tree::VariableDecls(n) => n.node_id,
            Tree::NamedVariable(n) => n.node_id,
            Tree::MethodDecl(n) => n.node_id,
            Tree::ClassDecl(n) => n.node_id,
        }
    }

    pub fn prefix(&self) -> &Arc<Space> {
        match self {
            Tree::Module(n) => &n.prefix,
            Tree::Ident(n) => &n.prefix,
            Tree::FieldAccess(n) => &n.prefix,
            Tree::Literal(n) => &n.prefix,
            Tree::Unary(n) => &n.prefix,
            Tree::Binary(n) => &n.prefix,
            Tree::Assignment(n) => &n.prefix,
            Tree::Call(n) => &n.prefix,
            Tree::Parens(n) => &n.prefix,
            Tree::Empty(n) => &n.prefix,
            Tree::Block(n) => &n.prefix,
            Tree::If(n) => &n.prefix,
            Tree::WhileLoop(n) => &n.prefix,
            Tree::Return(n) => &n.prefix,
            Tree::VariableDecls(n) => &n.prefix,
            Tree::NamedVariable(n) => &n.prefix,
            Tree::MethodDecl(n) => &n.prefix,
            Tree::ClassDecl(n) => &n.prefix,
        }
    }

    /// Derive a tree with the prefix replaced, identity preserved. Returns
    /// `self` unchanged (same instance) when the prefix is already the given
    /// instance.
    pub fn with_prefix(&self, prefix: Arc<Space>) -> Tree {
        if Arc::ptr_eq(self.prefix(), &prefix) {
            return self.clone();
        }
        match self {
            Tree::Module(n) => Tree::Module(Arc::new(n.with_prefix(prefix))),
            Tree::Ident(n) => Tree::Ident(Arc::new(n.with_prefix(prefix))),
            Tree::FieldAccess(n) => Tree::FieldAccess(Arc::new(n.with_prefix(prefix))),
            Tree::Literal(n) => Tree::Literal(Arc::new(n.with_prefix(prefix))),
            Tree::Unary(n) => Tree::Unary(Arc::new(n.with_prefix(prefix))),
            Tree::Binary(n) => Tree::Binary(Arc::new(n.with_prefix(prefix))),
            Tree::Assignment(n) => Tree::Assignment(Arc::new(n.with_prefix(prefix))),
            Tree::Call(n) => Tree::Call(Arc::new(n.with_prefix(prefix))),
            Tree::Parens(n) => Tree::Parens(Arc::new(n.with_prefix(prefix))),
            Tree::Empty(n) => Tree::Empty(Arc::new(n.with_prefix(prefix))),
            Tree::Block(n) => Tree::Block(Arc::new(n.with_prefix(prefix))),
            Tree::If(n) => Tree::If(Arc::new(n.with_prefix(prefix))),
            Tree::WhileLoop(n) => Tree::WhileLoop(Arc::new(n.with_prefix(prefix))),
            Tree::Return(n) => Tree::Return(Arc::new(n.with_prefix(prefix))),
            Tree::VariableDecls(n) => Tree::VariableDecls(Arc::new(n.with_prefix(prefix))),
            Tree::NamedVariable(n) => Tree::NamedVariable(Arc::new(n.with_prefix(prefix))),
            Tree::MethodDecl(n) => Tree::MethodDecl(Arc::new(n.with_prefix(prefix))),
            Tree::ClassDecl(n) => Tree::ClassDecl(Arc::new(n.with_prefix(prefix))),
        }
    }

    /// Reference equality: true when both values are the same node instance.
    pub fn ptr_eq(&self, other: &Tree) -> bool {
        match (self, other) {
            (Tree::Module(a), Tree::Module(b)) => Arc::ptr_eq(a, b),
            (Tree::Ident(a), Tree::Ident(b)) => Arc::ptr_eq(a, b),
            (Tree::FieldAccess(a), Tree::FieldAccess(b)) => Arc::ptr_eq(a, b),
            (Tree::Literal(a), Tree::Literal(b)) => Arc::ptr_eq(a, b),
            (Tree::Unary(a), Tree::Unary(b)) => Arc::ptr_eq(a, b),
            (Tree::Binary(a), Tree::Binary(b)) => Arc::ptr_eq(a, b),
            (Tree::Assignment(a), Tree::Assignment(b)) => Arc::ptr_eq(a, b),
            (Tree::Call(a), Tree::Call(b)) => Arc::ptr_eq(a, b),
            (Tree::Parens(a), Tree::Parens(b)) => Arc::ptr_eq(a, b),
            (Tree::Empty(a), Tree::Empty(b)) => Arc::ptr_eq(a, b),
            (Tree::Block(a), Tree::Block(b)) => Arc::ptr_eq(a, b),
            (Tree::If(a), Tree::If(b)) => Arc::ptr_eq(a, b),
            (Tree::WhileLoop(a), Tree::WhileLoop(b)) => Arc::ptr_eq(a, b),
            (Tree::Return(a), Tree::Return(b)) => Arc::ptr_eq(a, b),
            (Tree::VariableDecls(a), Tree::VariableDecls(b)) => Arc::ptr_eq(a, b),
            (Tree::NamedVariable(a), Tree::NamedVariable(b)) => Arc::ptr_eq(a, b),
            (Tree::MethodDecl(a), Tree::MethodDecl(b)) => Arc::ptr_eq(a, b),
            (Tree::ClassDecl(a), Tree::ClassDecl(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn capabilities(&self) -> &'static [Capability] {
        capabilities(self.kind())
    }

    pub fn has_capability(&self, cap: Capability) -> bool {
        self.capabilities().contains(&cap)
    }
}

/// A node in expression position.
#[derive(Debug, Clone)]
pub enum Expression {
    Ident(Arc<Ident>),
    FieldAccess(Arc<FieldAccess>),
    Literal(Arc<Literal>),
    Unary(Arc<Unary>),
    Binary(Arc<Binary>),
    Assignment(Arc<Assignment>),
    Call(Arc<Call>),
    Parens(Arc<Parens>),
    Empty(Arc<Empty>),
}

impl Expression {
    pub fn kind(&self) -> NodeKind {
        Tree::from(self.clone()).kind()
    }

    pub fn id(&self) -> NodeId {
        Tree::from(self.clone()).id()
    }

    pub fn prefix(&self) -> Arc<Space> {
        Tree::from(self.clone()).prefix().clone()
    }

    pub fn with_prefix(&self, prefix: Arc<Space>) -> Expression {
        Expression::try_from(Tree::from(self.clone()).with_prefix(prefix))
            .expect("with_prefix preserves the variant")
    }

    pub fn ptr_eq(&self, other: &Expression) -> bool {
        Tree::from(self.clone()).ptr_eq(&other.clone().into())
    }

    /// The sub-expressions whose evaluation writes state, in evaluation
    /// order. Assignments, modifying unary operations, and calls report
    /// themselves; composite expressions pass through their operands'.
    pub fn side_effects(&self) -> Vec<Expression> {
        match self {
            Expression::Assignment(_) | Expression::Call(_) => vec![self.clone()],
            Expression::Unary(u) => {
                if u.operator.element.is_modifying() {
                    vec![self.clone()]
                } else {
                    u.expression.side_effects()
                }
            }
            Expression::Binary(b) => {
                let mut effects = b.left.side_effects();
                effects.extend(b.right.side_effects());
                effects
            }
            Expression::Parens(p) => p.tree.element.side_effects(),
            Expression::Ident(_) | Expression::FieldAccess(_) | Expression::Literal(_)
            | Expression::Empty(_) => Vec::new(),
        }
    }
}

/// A node in statement position.
#[derive(Debug, Clone)]
pub enum Statement {
    Unary(Arc<Unary>),
    Assignment(Arc<Assignment>),
    Call(Arc<Call>),
    Empty(Arc<Empty>),
    Block(Arc<Block>),
    If(Arc<If>),
    WhileLoop(Arc<WhileLoop>),
    Return(Arc<Return>),
    VariableDecls(Arc<VariableDecls>),
    MethodDecl(Arc<MethodDecl>),
    ClassDecl(Arc<ClassDecl>),
}

impl Statement {
    pub fn kind(&self) -> NodeKind {
        Tree::from(self.clone()).kind()
    }

    pub fn id(&self) -> NodeId {
        Tree::from(self.clone()).id()
    }

    pub fn prefix(&self) -> Arc<Space> {
        Tree::from(self.clone()).prefix().clone()
    }

    pub fn with_prefix(&self, prefix: Arc<Space>) -> Statement {
        Statement::try_from(Tree::from(self.clone()).with_prefix(prefix))
            .expect("with_prefix preserves the variant")
    }

    pub fn ptr_eq(&self, other: &Statement) -> bool {
        Tree::from(self.clone()).ptr_eq(&other.clone().into())
    }

    /// Whether the printer terminates this statement with a semicolon when
    /// it appears in a statement sequence. Lexical knowledge, not a
    /// formatting decision.
    pub fn terminated_by_semicolon(&self) -> bool {
        matches!(
            self,
            Statement::Unary(_)
                | Statement::Assignment(_)
                | Statement::Call(_)
                | Statement::Empty(_)
                | Statement::Return(_)
                | Statement::VariableDecls(_)
        )
    }
}

/// A node in type-reference position.
#[derive(Debug, Clone)]
pub enum TypeTree {
    Ident(Arc<Ident>),
    FieldAccess(Arc<FieldAccess>),
}

impl TypeTree {
    pub fn kind(&self) -> NodeKind {
        Tree::from(self.clone()).kind()
    }

    pub fn id(&self) -> NodeId {
        Tree::from(self.clone()).id()
    }

    pub fn prefix(&self) -> Arc<Space> {
        Tree::from(self.clone()).prefix().clone()
    }

    pub fn with_prefix(&self, prefix: Arc<Space>) -> TypeTree {
        TypeTree::try_from(Tree::from(self.clone()).with_prefix(prefix))
            .expect("with_prefix preserves the variant")
    }

    pub fn ptr_eq(&self, other: &TypeTree) -> bool {
        Tree::from(self.clone()).ptr_eq(&other.clone().into())
    }
}

impl From<Expression> for Tree {
    fn from(e: Expression) -> Tree {
        match e {
            Expression::Ident(n) => Tree::Ident(n),
            Expression::FieldAccess(n) => Tree::FieldAccess(n),
            Expression::Literal(n) => Tree::Literal(n),
            Expression::Unary(n) => Tree::Unary(n),
            Expression::Binary(n) => Tree::Binary(n),
            Expression::Assignment(n) => Tree::Assignment(n),
            Expression::Call(n) => Tree::Call(n),
            Expression::Parens(n) => Tree::Parens(n),
            Expression::Empty(n) => Tree::Empty(n),
        }
    }
}

impl From<Statement> for Tree {
    fn from(s: Statement) -> Tree {
        match s {
            Statement::Unary(n) => Tree::Unary(n),
            Statement::Assignment(n) => Tree::Assignment(n),
            Statement::Call(n) => Tree::Call(n),
            Statement::Empty(n) => Tree::Empty(n),
            Statement::Block(n) => Tree::Block(n),
            Statement::If(n) => Tree::If(n),
            Statement::WhileLoop(n) => Tree::WhileLoop(n),
            Statement::Return(n) => Tree::Return(n),
            Statement::VariableDecls(n) => Tree::VariableDecls(n),
            Statement::MethodDecl(n) => Tree::MethodDecl(n),
            Statement::ClassDecl(n) => Tree::ClassDecl(n),
        }
    }
}

impl From<TypeTree> for Tree {
    fn from(t: TypeTree) -> Tree {
        match t {
            TypeTree::Ident(n) => Tree::Ident(n),
            TypeTree::FieldAccess(n) => Tree::FieldAccess(n),
        }
    }
}

impl TryFrom<Tree> for Expression {
    type Error = Tree;

    fn try_from(tree: Tree) -> Result<Expression, Tree> {
        match tree {
            Tree::Ident(n) => Ok(Expression::Ident(n)),
            Tree::FieldAccess(n) => Ok(Expression::FieldAccess(n)),
            Tree::Literal(n) => Ok(Expression::Literal(n)),
            Tree::Unary(n) => Ok(Expression::Unary(n)),
            Tree::Binary(n) => Ok(Expression::Binary(n)),
            Tree::Assignment(n) => Ok(Expression::Assignment(n)),
            Tree::Call(n) => Ok(Expression::Call(n)),
            Tree::Parens(n) => Ok(Expression::Parens(n)),
            Tree::Empty(n) => Ok(Expression::Empty(n)),
            other => Err(other),
        }
    }
}

impl TryFrom<Tree> for Statement {
    type Error = Tree;

    fn try_from(tree: Tree) -> Result<Statement, Tree> {
        match tree {
            Tree::Unary(n) => Ok(Statement::Unary(n)),
            Tree::Assignment(n) => Ok(Statement::Assignment(n)),
            Tree::Call(n) => Ok(Statement::Call(n)),
            Tree::Empty(n) => Ok(Statement::Empty(n)),
            Tree::Block(n) => Ok(Statement::Block(n)),
            Tree::If(n) => Ok(Statement::If(n)),
            Tree::WhileLoop(n) => Ok(Statement::WhileLoop(n)),
            Tree::Return(n) => Ok(Statement::Return(n)),
            Tree::VariableDecls(n) => Ok(Statement::VariableDecls(n)),
            Tree::MethodDecl(n) => Ok(Statement::MethodDecl(n)),
            Tree::ClassDecl(n) => Ok(Statement::ClassDecl(n)),
            other => Err(other),
        }
    }
}

impl TryFrom<Tree> for TypeTree {
    type Error = Tree;

    fn try_from(tree: Tree) -> Result<TypeTree, Tree> {
        match tree {
            Tree::Ident(n) => Ok(TypeTree::Ident(n)),
            Tree::FieldAccess(n) => Ok(TypeTree::FieldAccess(n)),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::SymbolCache;

    fn ident(name: &str) -> Arc<Ident> {
        let symbols = SymbolCache::new();
        Arc::new(Ident::new(
            Arc::new(Space::whitespace_only("")),
            symbols.intern(name, None),
        ))
    }

    #[test]
    fn capability_table_is_total() {
        // Every variant has an entry, and multi-role variants list their
        // reduction order explicitly.
        let all = [
            NodeKind::Module,
            NodeKind::Ident,
            NodeKind::FieldAccess,
            NodeKind::Literal,
            NodeKind::Unary,
            NodeKind::Binary,
            NodeKind::Assignment,
            NodeKind::Call,
            NodeKind::Parens,
            NodeKind::Empty,
            NodeKind::Block,
            NodeKind::If,
            NodeKind::WhileLoop,
            NodeKind::Return,
            NodeKind::VariableDecls,
            NodeKind::NamedVariable,
            NodeKind::MethodDecl,
            NodeKind::ClassDecl,
        ];
        for kind in all {
            // Lookup must not panic; duplicates would break reduction.
            let caps = capabilities(kind);
            let mut deduped = caps.to_vec();
            deduped.dedup();
            assert_eq!(caps.len(), deduped.len(), "{} lists a role twice", kind);
        }
        assert_eq!(
            capabilities(NodeKind::Assignment),
            &[Capability::Statement, Capability::Expression]
        );
        assert_eq!(
            capabilities(NodeKind::Ident),
            &[Capability::Expression, Capability::TypeTree]
        );
    }

    #[test]
    fn with_prefix_preserves_identity() {
        let node = ident("x");
        let tree = Tree::Ident(node);
        let spaced = tree.with_prefix(Arc::new(Space::whitespace_only("  ")));
        assert_eq!(tree.id(), spaced.id());
        assert!(!tree.ptr_eq(&spaced));

        // Same prefix instance: no new node is made.
        let same = spaced.with_prefix(spaced.prefix().clone());
        assert!(spaced.ptr_eq(&same));
    }

    #[test]
    fn side_effects_pass_through_composites() {
        let empty = Arc::new(Space::whitespace_only(""));
        let target = Expression::Ident(ident("x"));
        let value = Expression::Literal(Arc::new(Literal::new(
            empty.clone(),
            "1",
            LiteralKind::Int,
            None,
        )));
        let assign = Expression::Assignment(Arc::new(Assignment::new(
            empty.clone(),
            target,
            LeftPadded::new(empty.clone(), value),
            None,
        )));
        let wrapped = Expression::Parens(Arc::new(Parens::new(
            empty.clone(),
            RightPadded::new(assign.clone(), empty.clone()),
        )));
        let effects = wrapped.side_effects();
        assert_eq!(effects.len(), 1);
        assert!(effects[0].ptr_eq(&assign));

        let pure = Expression::Ident(ident("y"));
        assert!(pure.side_effects().is_empty());
    }

    #[test]
    fn role_conversions_round_trip() {
        let expr = Expression::Ident(ident("x"));
        let tree: Tree = expr.clone().into();
        let back = Expression::try_from(tree.clone()).expect("ident is an expression");
        assert!(expr.ptr_eq(&back));
        assert!(TypeTree::try_from(tree.clone()).is_ok());
        assert!(Statement::try_from(tree).is_err());
    }
}
