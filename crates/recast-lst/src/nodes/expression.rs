// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Expression node variants.
//!
//! All nodes are immutable: construction assigns a fresh [`NodeId`], and the
//! `with_*` derivations return a new node carrying the same id. No public
//! mutators exist anywhere in the model.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::traits::{Container, LeftPadded, NodeId, RightPadded};
use super::Expression;
use crate::intern::{Symbol, TypeHandle};
use crate::trivia::Space;

/// An identifier occurrence. Doubles as a type reference when it appears in
/// type position.
#[derive(Debug, Clone)]
pub struct Ident {
    pub node_id: NodeId,
    pub prefix: Arc<Space>,
    /// Interned name + resolved type pair.
    pub symbol: Arc<Symbol>,
}

impl Ident {
    pub fn new(prefix: Arc<Space>, symbol: Arc<Symbol>) -> Self {
        Self {
            node_id: NodeId::fresh(),
            prefix,
            symbol,
        }
    }

    pub fn name(&self) -> &str {
        &self.symbol.name
    }

    pub fn tpe(&self) -> Option<TypeHandle> {
        self.symbol.tpe
    }

    pub fn with_prefix(&self, prefix: Arc<Space>) -> Self {
        Self {
            prefix,
            ..self.clone()
        }
    }

    pub fn with_symbol(&self, symbol: Arc<Symbol>) -> Self {
        Self {
            symbol,
            ..self.clone()
        }
    }
}

/// Qualified access: `target.name`. In type position this is a qualified
/// type reference.
#[derive(Debug, Clone)]
pub struct FieldAccess {
    pub node_id: NodeId,
    pub prefix: Arc<Space>,
    pub target: Expression,
    /// The name after the dot; `before` holds the trivia in front of the dot.
    pub name: LeftPadded<Arc<Ident>>,
    pub tpe: Option<TypeHandle>,
}

impl FieldAccess {
    pub fn new(
        prefix: Arc<Space>,
        target: Expression,
        name: LeftPadded<Arc<Ident>>,
        tpe: Option<TypeHandle>,
    ) -> Self {
        Self {
            node_id: NodeId::fresh(),
            prefix,
            target,
            name,
            tpe,
        }
    }

    pub fn with_prefix(&self, prefix: Arc<Space>) -> Self {
        Self {
            prefix,
            ..self.clone()
        }
    }

    pub fn with_target(&self, target: Expression) -> Self {
        Self {
            target,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    Int,
    Float,
    Str,
    Bool,
    Null,
}

/// A literal, stored as its verbatim source text so exotic spellings
/// (`0x1F`, `1_000`, escapes) survive the round trip.
#[derive(Debug, Clone)]
pub struct Literal {
    pub node_id: NodeId,
    pub prefix: Arc<Space>,
    pub source: String,
    pub kind: LiteralKind,
    pub tpe: Option<TypeHandle>,
}

impl Literal {
    pub fn new(
        prefix: Arc<Space>,
        source: impl Into<String>,
        kind: LiteralKind,
        tpe: Option<TypeHandle>,
    ) -> Self {
        Self {
            node_id: NodeId::fresh(),
            prefix,
            source: source.into(),
            kind,
            tpe,
        }
    }

    pub fn with_prefix(&self, prefix: Arc<Space>) -> Self {
        Self {
            prefix,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Negative,
    Not,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl UnaryOp {
    pub fn token(&self) -> &'static str {
        match self {
            UnaryOp::Negative => "-",
            UnaryOp::Not => "!",
            UnaryOp::PreIncrement | UnaryOp::PostIncrement => "++",
            UnaryOp::PreDecrement | UnaryOp::PostDecrement => "--",
        }
    }

    /// True when the operator token precedes the operand.
    pub fn is_prefix(&self) -> bool {
        matches!(
            self,
            UnaryOp::Negative | UnaryOp::Not | UnaryOp::PreIncrement | UnaryOp::PreDecrement
        )
    }

    /// True for the operators that write to their operand.
    pub fn is_modifying(&self) -> bool {
        matches!(
            self,
            UnaryOp::PreIncrement
                | UnaryOp::PreDecrement
                | UnaryOp::PostIncrement
                | UnaryOp::PostDecrement
        )
    }
}

/// A unary operation. The increment/decrement forms are also statements.
///
/// `operator.before` is meaningful for the postfix forms only (trivia
/// between the operand and the operator token); for prefix forms the node's
/// own prefix sits in front of the operator.
#[derive(Debug, Clone)]
pub struct Unary {
    pub node_id: NodeId,
    pub prefix: Arc<Space>,
    pub operator: LeftPadded<UnaryOp>,
    pub expression: Expression,
    pub tpe: Option<TypeHandle>,
}

impl Unary {
    pub fn new(
        prefix: Arc<Space>,
        operator: LeftPadded<UnaryOp>,
        expression: Expression,
        tpe: Option<TypeHandle>,
    ) -> Self {
        Self {
            node_id: NodeId::fresh(),
            prefix,
            operator,
            expression,
            tpe,
        }
    }

    pub fn with_prefix(&self, prefix: Arc<Space>) -> Self {
        Self {
            prefix,
            ..self.clone()
        }
    }

    pub fn with_expression(&self, expression: Expression) -> Self {
        Self {
            expression,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn token(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// A binary operation: `left op right`.
#[derive(Debug, Clone)]
pub struct Binary {
    pub node_id: NodeId,
    pub prefix: Arc<Space>,
    pub left: Expression,
    /// `before` holds the trivia in front of the operator token.
    pub operator: LeftPadded<BinaryOp>,
    pub right: Expression,
    pub tpe: Option<TypeHandle>,
}

impl Binary {
    pub fn new(
        prefix: Arc<Space>,
        left: Expression,
        operator: LeftPadded<BinaryOp>,
        right: Expression,
        tpe: Option<TypeHandle>,
    ) -> Self {
        Self {
            node_id: NodeId::fresh(),
            prefix,
            left,
            operator,
            right,
            tpe,
        }
    }

    pub fn with_prefix(&self, prefix: Arc<Space>) -> Self {
        Self {
            prefix,
            ..self.clone()
        }
    }

    pub fn with_left(&self, left: Expression) -> Self {
        Self {
            left,
            ..self.clone()
        }
    }

    pub fn with_right(&self, right: Expression) -> Self {
        Self {
            right,
            ..self.clone()
        }
    }
}

/// An assignment: `target = value`. Both a statement and an expression.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub node_id: NodeId,
    pub prefix: Arc<Space>,
    pub target: Expression,
    /// `before` holds the trivia in front of the `=` token.
    pub value: LeftPadded<Expression>,
    pub tpe: Option<TypeHandle>,
}

impl Assignment {
    pub fn new(
        prefix: Arc<Space>,
        target: Expression,
        value: LeftPadded<Expression>,
        tpe: Option<TypeHandle>,
    ) -> Self {
        Self {
            node_id: NodeId::fresh(),
            prefix,
            target,
            value,
            tpe,
        }
    }

    pub fn with_prefix(&self, prefix: Arc<Space>) -> Self {
        Self {
            prefix,
            ..self.clone()
        }
    }

    pub fn with_target(&self, target: Expression) -> Self {
        Self {
            target,
            ..self.clone()
        }
    }

    pub fn with_value(&self, value: LeftPadded<Expression>) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }
}

/// A call: `receiver.name(arguments)`. Both a statement and an expression.
#[derive(Debug, Clone)]
pub struct Call {
    pub node_id: NodeId,
    pub prefix: Arc<Space>,
    /// Optional receiver; `after` holds the trivia in front of the dot.
    pub receiver: Option<RightPadded<Expression>>,
    pub name: Arc<Ident>,
    pub arguments: Container<Expression>,
    pub tpe: Option<TypeHandle>,
    /// Resolved method descriptor, when known.
    pub method_type: Option<TypeHandle>,
}

impl Call {
    pub fn new(
        prefix: Arc<Space>,
        receiver: Option<RightPadded<Expression>>,
        name: Arc<Ident>,
        arguments: Container<Expression>,
        tpe: Option<TypeHandle>,
        method_type: Option<TypeHandle>,
    ) -> Self {
        Self {
            node_id: NodeId::fresh(),
            prefix,
            receiver,
            name,
            arguments,
            tpe,
            method_type,
        }
    }

    pub fn with_prefix(&self, prefix: Arc<Space>) -> Self {
        Self {
            prefix,
            ..self.clone()
        }
    }

    pub fn with_arguments(&self, arguments: Container<Expression>) -> Self {
        Self {
            arguments,
            ..self.clone()
        }
    }

    pub fn with_name(&self, name: Arc<Ident>) -> Self {
        Self {
            name,
            ..self.clone()
        }
    }
}

/// A parenthesized expression: `( tree )`.
#[derive(Debug, Clone)]
pub struct Parens {
    pub node_id: NodeId,
    pub prefix: Arc<Space>,
    /// The wrapped expression; `after` holds the trivia in front of the
    /// closing parenthesis.
    pub tree: RightPadded<Expression>,
}

impl Parens {
    pub fn new(prefix: Arc<Space>, tree: RightPadded<Expression>) -> Self {
        Self {
            node_id: NodeId::fresh(),
            prefix,
            tree,
        }
    }

    pub fn with_prefix(&self, prefix: Arc<Space>) -> Self {
        Self {
            prefix,
            ..self.clone()
        }
    }

    pub fn with_tree(&self, tree: RightPadded<Expression>) -> Self {
        Self {
            tree,
            ..self.clone()
        }
    }
}

/// A deliberately empty slot, usable wherever a statement or expression is
/// required (an empty statement, a hole left by a deletion).
#[derive(Debug, Clone)]
pub struct Empty {
    pub node_id: NodeId,
    pub prefix: Arc<Space>,
}

impl Empty {
    pub fn new(prefix: Arc<Space>) -> Self {
        Self {
            node_id: NodeId::fresh(),
            prefix,
        }
    }

    pub fn with_prefix(&self, prefix: Arc<Space>) -> Self {
        Self {
            prefix,
            ..self.clone()
        }
    }
}
