// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Inter-token spacing policy.
//!
//! Single spaces around binary operators, assignment and initializer
//! equals, `extends`, and `else`; tight delimiters (no space before commas,
//! dots, or argument parentheses; a single space after commas). Spaces that
//! carry comments or line breaks are never touched.

use std::sync::Arc;

use recast_lst::nodes::{
    Assignment, Binary, Call, If, LeftPadded, MethodDecl, NamedVariable, RightPadded, Tree,
    WhileLoop,
};
use recast_lst::trivia::Space;
use recast_lst::visitor::{
    walk_assignment, walk_binary, walk_call, walk_if, walk_method_decl, walk_named_variable,
    walk_while_loop, LstVisitor, SpaceLoc, VisitCtx,
};

use super::set_pad;

/// Applies the spacing policy around operators and delimiters.
#[derive(Default)]
pub struct Spaces;

impl Spaces {
    pub fn new() -> Self {
        Self
    }
}

impl LstVisitor for Spaces {
    fn visit_space(&mut self, space: &Arc<Space>, loc: SpaceLoc, ctx: &mut VisitCtx) -> Arc<Space> {
        let _ = ctx;
        match loc {
            SpaceLoc::BinaryOperator
            | SpaceLoc::AssignmentEquals
            | SpaceLoc::InitializerEquals
            | SpaceLoc::ExtendsBefore
            | SpaceLoc::ElseBefore => set_pad(space, " "),
            SpaceLoc::ArgumentSuffix
            | SpaceLoc::ParameterSuffix
            | SpaceLoc::VariableSuffix
            | SpaceLoc::CallArguments
            | SpaceLoc::MethodParameters
            | SpaceLoc::CallReceiverSuffix
            | SpaceLoc::FieldAccessDot
            | SpaceLoc::ParensSuffix => set_pad(space, ""),
            _ => space.clone(),
        }
    }

    fn visit_binary(&mut self, node: &Arc<Binary>, ctx: &mut VisitCtx) -> Tree {
        let binary = match walk_binary(self, node, ctx) {
            Tree::Binary(binary) => binary,
            other => return other,
        };
        let right_prefix = set_pad(&binary.right.prefix(), " ");
        if Arc::ptr_eq(&right_prefix, &binary.right.prefix()) {
            return Tree::Binary(binary);
        }
        Tree::Binary(Arc::new(
            binary.with_right(binary.right.with_prefix(right_prefix)),
        ))
    }

    fn visit_assignment(&mut self, node: &Arc<Assignment>, ctx: &mut VisitCtx) -> Tree {
        let assignment = match walk_assignment(self, node, ctx) {
            Tree::Assignment(assignment) => assignment,
            other => return other,
        };
        let value_prefix = set_pad(&assignment.value.element.prefix(), " ");
        if Arc::ptr_eq(&value_prefix, &assignment.value.element.prefix()) {
            return Tree::Assignment(assignment);
        }
        let value = LeftPadded::new(
            assignment.value.before.clone(),
            assignment.value.element.with_prefix(value_prefix),
        );
        Tree::Assignment(Arc::new(assignment.with_value(value)))
    }

    fn visit_named_variable(&mut self, node: &Arc<NamedVariable>, ctx: &mut VisitCtx) -> Tree {
        let variable = match walk_named_variable(self, node, ctx) {
            Tree::NamedVariable(variable) => variable,
            other => return other,
        };
        let initializer = match &variable.initializer {
            Some(initializer) => initializer,
            None => return Tree::NamedVariable(variable),
        };
        let init_prefix = set_pad(&initializer.element.prefix(), " ");
        if Arc::ptr_eq(&init_prefix, &initializer.element.prefix()) {
            return Tree::NamedVariable(variable);
        }
        let initializer = LeftPadded::new(
            initializer.before.clone(),
            initializer.element.with_prefix(init_prefix),
        );
        Tree::NamedVariable(Arc::new(variable.with_initializer(Some(initializer))))
    }

    fn visit_call(&mut self, node: &Arc<Call>, ctx: &mut VisitCtx) -> Tree {
        let call = match walk_call(self, node, ctx) {
            Tree::Call(call) => call,
            other => return other,
        };
        let mut changed = false;
        let elements: Vec<_> = call
            .arguments
            .iter()
            .enumerate()
            .map(|(i, padded)| {
                let want = if i == 0 { "" } else { " " };
                let prefix = set_pad(&padded.element.prefix(), want);
                if Arc::ptr_eq(&prefix, &padded.element.prefix()) {
                    padded.clone()
                } else {
                    changed = true;
                    RightPadded::new(padded.element.with_prefix(prefix), padded.after.clone())
                }
            })
            .collect();
        if !changed {
            return Tree::Call(call);
        }
        let arguments = call.arguments.clone().with_elements(elements);
        Tree::Call(Arc::new(call.with_arguments(arguments)))
    }

    fn visit_method_decl(&mut self, node: &Arc<MethodDecl>, ctx: &mut VisitCtx) -> Tree {
        let method = match walk_method_decl(self, node, ctx) {
            Tree::MethodDecl(method) => method,
            other => return other,
        };
        let mut changed = false;
        let elements: Vec<_> = method
            .parameters
            .iter()
            .enumerate()
            .map(|(i, padded)| {
                let want = if i == 0 { "" } else { " " };
                let prefix = set_pad(&padded.element.prefix(), want);
                if Arc::ptr_eq(&prefix, &padded.element.prefix()) {
                    padded.clone()
                } else {
                    changed = true;
                    RightPadded::new(padded.element.with_prefix(prefix), padded.after.clone())
                }
            })
            .collect();
        if !changed {
            return Tree::MethodDecl(method);
        }
        let mut new = (*method).clone();
        new.parameters = method.parameters.clone().with_elements(elements);
        Tree::MethodDecl(Arc::new(new))
    }

    fn visit_if(&mut self, node: &Arc<If>, ctx: &mut VisitCtx) -> Tree {
        let if_node = match walk_if(self, node, ctx) {
            Tree::If(if_node) => if_node,
            other => return other,
        };
        let cond_prefix = set_pad(&if_node.condition.prefix, " ");
        if Arc::ptr_eq(&cond_prefix, &if_node.condition.prefix) {
            return Tree::If(if_node);
        }
        let mut new = (*if_node).clone();
        new.condition = Arc::new(if_node.condition.with_prefix(cond_prefix));
        Tree::If(Arc::new(new))
    }

    fn visit_while_loop(&mut self, node: &Arc<WhileLoop>, ctx: &mut VisitCtx) -> Tree {
        let while_node = match walk_while_loop(self, node, ctx) {
            Tree::WhileLoop(while_node) => while_node,
            other => return other,
        };
        let cond_prefix = set_pad(&while_node.condition.prefix, " ");
        if Arc::ptr_eq(&cond_prefix, &while_node.condition.prefix) {
            return Tree::WhileLoop(while_node);
        }
        let mut new = (*while_node).clone();
        new.condition = Arc::new(while_node.condition.with_prefix(cond_prefix));
        Tree::WhileLoop(Arc::new(new))
    }
}
