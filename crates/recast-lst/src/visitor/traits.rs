// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor trait and traversal context.
//!
//! The design follows a hybrid approach: macro-generated trait method
//! signatures with manual implementations where node names collide with
//! keywords. Every `visit_*` method receives the node and the traversal
//! context and returns the (possibly) transformed tree; the default
//! implementations delegate to the walk functions, which rebuild a node
//! only when one of its children changed and otherwise return the original
//! reference.

use std::sync::Arc;

use super::walk::{
    walk_assignment, walk_binary, walk_block, walk_call, walk_class_decl, walk_empty,
    walk_field_access, walk_ident, walk_if, walk_literal, walk_method_decl, walk_module,
    walk_named_variable, walk_parens, walk_return, walk_unary, walk_variable_decls,
    walk_while_loop,
};
use crate::cursor::Cursor;
use crate::nodes::{
    Assignment, Binary, Block, Call, ClassDecl, Empty, FieldAccess, Ident, If, Literal,
    MethodDecl, Module, NamedVariable, Parens, Return, Tree, Unary, VariableDecls, WhileLoop,
};
use crate::trivia::Space;

/// Identifies which trivia slot a [`LstVisitor::visit_space`] call is
/// visiting, so formatting passes can act positionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceLoc {
    ModulePrefix,
    ModuleEof,
    IdentPrefix,
    FieldAccessPrefix,
    FieldAccessDot,
    LiteralPrefix,
    UnaryPrefix,
    UnaryOperator,
    BinaryPrefix,
    BinaryOperator,
    AssignmentPrefix,
    AssignmentEquals,
    CallPrefix,
    CallReceiverSuffix,
    CallArguments,
    ArgumentSuffix,
    ParensPrefix,
    ParensSuffix,
    EmptyPrefix,
    BlockPrefix,
    StatementSuffix,
    BlockEnd,
    IfPrefix,
    ElseBefore,
    WhilePrefix,
    ReturnPrefix,
    VariableDeclsPrefix,
    NamedVariablePrefix,
    VariableSuffix,
    InitializerEquals,
    MethodPrefix,
    MethodParameters,
    ParameterSuffix,
    ClassPrefix,
    ExtendsBefore,
}

/// Traversal context threaded through every visit: the cursor for the node
/// being visited plus the stop signal.
#[derive(Debug)]
pub struct VisitCtx {
    cursor: Cursor,
    stopped: bool,
}

impl VisitCtx {
    pub fn new() -> Self {
        Self::with_cursor(Cursor::root())
    }

    /// Start traversal below an existing cursor chain, so ancestor queries
    /// see the surrounding context.
    pub fn with_cursor(cursor: Cursor) -> Self {
        Self {
            cursor,
            stopped: false,
        }
    }

    /// The cursor for the node currently being visited.
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Signal "stop traversing beyond this node": every subsequent visit in
    /// this traversal returns its input unchanged.
    pub fn stop_after(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub(crate) fn push(&mut self, node: Tree) {
        self.cursor = self.cursor.child(node);
    }

    pub(crate) fn pop(&mut self) {
        if let Some(parent) = self.cursor.parent() {
            self.cursor = parent;
        }
    }
}

impl Default for VisitCtx {
    fn default() -> Self {
        Self::new()
    }
}

/// Macro generating the per-variant visitor methods. Each default delegates
/// to the corresponding walk function.
macro_rules! visitor_methods {
    (
        $(
            $(#[$meta:meta])*
            $base:ident : $ty:ty
        ),* $(,)?
    ) => {
        paste::paste! {
            $(
                $(#[$meta])*
                #[doc = concat!("Visit a [`", stringify!($ty), "`] node.")]
                #[doc = ""]
                #[doc = "The default recurses into children and reconstructs the node"]
                #[doc = "only if a child changed; otherwise it returns the original"]
                #[doc = "reference."]
                fn [<visit_ $base>](&mut self, node: &Arc<$ty>, ctx: &mut VisitCtx) -> Tree {
                    [<walk_ $base>](self, node, ctx)
                }
            )*
        }
    };
}

/// A transformation over LST nodes.
///
/// Dispatch is double: the driver (`dispatch::visit_tree`) first calls the
/// variant-specific method, then each generic capability method the variant
/// declares, in the order fixed by `nodes::capabilities`. A capability
/// method that changes the node's runtime kind short-circuits the rest of
/// the reduction — a deliberate escape, not a fault.
pub trait LstVisitor {
    /// Generic visit applied to every node playing the statement role.
    fn visit_statement(&mut self, statement: Tree, ctx: &mut VisitCtx) -> Tree {
        let _ = ctx;
        statement
    }

    /// Generic visit applied to every node playing the expression role.
    fn visit_expression(&mut self, expression: Tree, ctx: &mut VisitCtx) -> Tree {
        let _ = ctx;
        expression
    }

    /// Generic visit applied to every node playing the type-reference role.
    fn visit_type_tree(&mut self, type_tree: Tree, ctx: &mut VisitCtx) -> Tree {
        let _ = ctx;
        type_tree
    }

    /// Visit one trivia slot. The default keeps the space as-is.
    fn visit_space(&mut self, space: &Arc<Space>, loc: SpaceLoc, ctx: &mut VisitCtx) -> Arc<Space> {
        let _ = (loc, ctx);
        space.clone()
    }

    visitor_methods! {
        module: Module,
        ident: Ident,
        field_access: FieldAccess,
        literal: Literal,
        unary: Unary,
        binary: Binary,
        assignment: Assignment,
        call: Call,
        parens: Parens,
        empty: Empty,
        block: Block,
        while_loop: WhileLoop,
        variable_decls: VariableDecls,
        named_variable: NamedVariable,
        method_decl: MethodDecl,
        class_decl: ClassDecl,
    }

    /// Visit an [`If`] node. Written out by hand: `if` cannot pass through
    /// the method-name macro.
    fn visit_if(&mut self, node: &Arc<If>, ctx: &mut VisitCtx) -> Tree {
        walk_if(self, node, ctx)
    }

    /// Visit a [`Return`] node. Written out by hand, like [`LstVisitor::visit_if`].
    fn visit_return(&mut self, node: &Arc<Return>, ctx: &mut VisitCtx) -> Tree {
        walk_return(self, node, ctx)
    }
}
