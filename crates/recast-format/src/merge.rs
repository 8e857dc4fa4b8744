// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Structural formatting merge.
//!
//! [`merge_format`] reconciles trivia between two trees of matching shape:
//! `current` supplies the structure (and survives untouched on any shape
//! mismatch), `template` supplies the whitespace. The classic use is
//! inserting a freshly built fragment that must inherit the indentation and
//! spacing of its surroundings: build the fragment bare, then merge the
//! neighboring statement over it as the template.
//!
//! Per node pair:
//!
//! - identical instances are returned as-is (no-op fast path);
//! - mismatched variants abort the merge at that node, returning `current`
//!   completely unchanged — mismatched shapes cannot be reconciled, and the
//!   caller keeps `current`'s own trivia;
//! - otherwise the template's prefix whitespace is copied onto `current`,
//!   corresponding children merge pairwise by position (extra `current`
//!   children are kept as-is), and comment lists merge only when both sides
//!   have the same comment count — comment text is never invented or
//!   dropped, only the whitespace around comments is reconciled;
//! - padded children merge their wrapped element by the same rule and
//!   reconcile the delimiter trivia separately.
//!
//! The merge is a traversal of two trees in lockstep; it is written as
//! direct recursion over node pairs because a binary walk does not fit the
//! unary visitor signature.

use std::sync::Arc;

use tracing::trace;

use recast_lst::nodes::{
    Block, Container, Expression, Ident, LeftPadded, NamedVariable, Parens, RightPadded,
    Statement, Tree, TypeTree,
};
use recast_lst::trivia::{Comment, Space};

/// Merge `template`'s formatting onto `current`. Never changes `current`'s
/// structure; returns `current` untouched when shapes cannot be reconciled.
pub fn merge_format(current: &Tree, template: &Tree) -> Tree {
    if current.ptr_eq(template) {
        return current.clone();
    }
    if current.kind() != template.kind() {
        trace!(
            current = %current.kind(),
            template = %template.kind(),
            "shape mismatch, keeping current formatting"
        );
        return current.clone();
    }
    merge_matched(current, template)
}

/// Merge two spaces: template whitespace wins, comments reconcile only on
/// equal counts. Returns the `current` instance when nothing changes.
fn merge_space(current: &Arc<Space>, template: &Arc<Space>) -> Arc<Space> {
    if Arc::ptr_eq(current, template) {
        return current.clone();
    }
    let comments: Vec<Comment> = if current.comments.len() == template.comments.len() {
        current
            .comments
            .iter()
            .zip(&template.comments)
            .map(|(c, t)| Comment::new(c.text.clone(), t.suffix.clone(), c.multiline))
            .collect()
    } else {
        current.comments.clone()
    };
    let merged = Space::new(template.whitespace.clone(), comments);
    if merged == **current {
        current.clone()
    } else {
        Arc::new(merged)
    }
}

fn merge_expression(current: &Expression, template: &Expression) -> Expression {
    let merged = merge_format(&current.clone().into(), &template.clone().into());
    Expression::try_from(merged).expect("merge preserves the variant")
}

fn merge_statement(current: &Statement, template: &Statement) -> Statement {
    let merged = merge_format(&current.clone().into(), &template.clone().into());
    Statement::try_from(merged).expect("merge preserves the variant")
}

fn merge_type_tree(current: &TypeTree, template: &TypeTree) -> TypeTree {
    let merged = merge_format(&current.clone().into(), &template.clone().into());
    TypeTree::try_from(merged).expect("merge preserves the variant")
}

fn merge_ident(current: &Arc<Ident>, template: &Arc<Ident>) -> Arc<Ident> {
    let prefix = merge_space(&current.prefix, &template.prefix);
    if Arc::ptr_eq(&prefix, &current.prefix) {
        current.clone()
    } else {
        Arc::new(current.with_prefix(prefix))
    }
}

fn merge_parens(current: &Arc<Parens>, template: &Arc<Parens>) -> Arc<Parens> {
    match merge_format(
        &Tree::Parens(current.clone()),
        &Tree::Parens(template.clone()),
    ) {
        Tree::Parens(merged) => merged,
        _ => unreachable!("merge preserves the variant"),
    }
}

fn merge_block_node(current: &Arc<Block>, template: &Arc<Block>) -> Arc<Block> {
    match merge_format(
        &Tree::Block(current.clone()),
        &Tree::Block(template.clone()),
    ) {
        Tree::Block(merged) => merged,
        _ => unreachable!("merge preserves the variant"),
    }
}

/// Pairwise positional merge of statement sequences; extra `current`
/// elements are kept unchanged.
fn merge_statement_list(
    current: &[RightPadded<Statement>],
    template: &[RightPadded<Statement>],
) -> (Vec<RightPadded<Statement>>, bool) {
    let mut changed = false;
    let merged = current
        .iter()
        .enumerate()
        .map(|(i, padded)| match template.get(i) {
            Some(tmpl) => {
                let element = merge_statement(&padded.element, &tmpl.element);
                let after = merge_space(&padded.after, &tmpl.after);
                if !element.ptr_eq(&padded.element) || !Arc::ptr_eq(&after, &padded.after) {
                    changed = true;
                }
                RightPadded::new(element, after)
            }
            None => padded.clone(),
        })
        .collect();
    (merged, changed)
}

fn merge_expression_container(
    current: &Container<Expression>,
    template: &Container<Expression>,
) -> (Container<Expression>, bool) {
    let before = merge_space(&current.before, &template.before);
    let mut changed = !Arc::ptr_eq(&before, &current.before);
    let elements = current
        .iter()
        .enumerate()
        .map(|(i, padded)| match template.elements.get(i) {
            Some(tmpl) => {
                let element = merge_expression(&padded.element, &tmpl.element);
                let after = merge_space(&padded.after, &tmpl.after);
                if !element.ptr_eq(&padded.element) || !Arc::ptr_eq(&after, &padded.after) {
                    changed = true;
                }
                RightPadded::new(element, after)
            }
            None => padded.clone(),
        })
        .collect();
    (Container::new(before, elements), changed)
}

/// Merge two nodes already known to share a variant.
fn merge_matched(current: &Tree, template: &Tree) -> Tree {
    match (current, template) {
        (Tree::Module(cur), Tree::Module(tmpl)) => {
            let prefix = merge_space(&cur.prefix, &tmpl.prefix);
            let (statements, stmts_changed) =
                merge_statement_list(&cur.statements, &tmpl.statements);
            let eof = merge_space(&cur.eof, &tmpl.eof);
            if Arc::ptr_eq(&prefix, &cur.prefix) && !stmts_changed && Arc::ptr_eq(&eof, &cur.eof)
            {
                return current.clone();
            }
            let mut new = (**cur).clone();
            new.prefix = prefix;
            new.statements = statements;
            new.eof = eof;
            Tree::Module(Arc::new(new))
        }
        (Tree::Ident(cur), Tree::Ident(tmpl)) => Tree::Ident(merge_ident(cur, tmpl)),
        (Tree::FieldAccess(cur), Tree::FieldAccess(tmpl)) => {
            let prefix = merge_space(&cur.prefix, &tmpl.prefix);
            let target = merge_expression(&cur.target, &tmpl.target);
            let dot = merge_space(&cur.name.before, &tmpl.name.before);
            let name = merge_ident(&cur.name.element, &tmpl.name.element);
            if Arc::ptr_eq(&prefix, &cur.prefix)
                && target.ptr_eq(&cur.target)
                && Arc::ptr_eq(&dot, &cur.name.before)
                && Arc::ptr_eq(&name, &cur.name.element)
            {
                return current.clone();
            }
            let mut new = (**cur).clone();
            new.prefix = prefix;
            new.target = target;
            new.name = LeftPadded::new(dot, name);
            Tree::FieldAccess(Arc::new(new))
        }
        (Tree::Literal(cur), Tree::Literal(tmpl)) => {
            let prefix = merge_space(&cur.prefix, &tmpl.prefix);
            if Arc::ptr_eq(&prefix, &cur.prefix) {
                current.clone()
            } else {
                Tree::Literal(Arc::new(cur.with_prefix(prefix)))
            }
        }
        (Tree::Unary(cur), Tree::Unary(tmpl)) => {
            let prefix = merge_space(&cur.prefix, &tmpl.prefix);
            let before = merge_space(&cur.operator.before, &tmpl.operator.before);
            let expression = merge_expression(&cur.expression, &tmpl.expression);
            if Arc::ptr_eq(&prefix, &cur.prefix)
                && Arc::ptr_eq(&before, &cur.operator.before)
                && expression.ptr_eq(&cur.expression)
            {
                return current.clone();
            }
            let mut new = (**cur).clone();
            new.prefix = prefix;
            new.operator = LeftPadded::new(before, cur.operator.element);
            new.expression = expression;
            Tree::Unary(Arc::new(new))
        }
        (Tree::Binary(cur), Tree::Binary(tmpl)) => {
            let prefix = merge_space(&cur.prefix, &tmpl.prefix);
            let left = merge_expression(&cur.left, &tmpl.left);
            let before = merge_space(&cur.operator.before, &tmpl.operator.before);
            let right = merge_expression(&cur.right, &tmpl.right);
            if Arc::ptr_eq(&prefix, &cur.prefix)
                && left.ptr_eq(&cur.left)
                && Arc::ptr_eq(&before, &cur.operator.before)
                && right.ptr_eq(&cur.right)
            {
                return current.clone();
            }
            let mut new = (**cur).clone();
            new.prefix = prefix;
            new.left = left;
            new.operator = LeftPadded::new(before, cur.operator.element);
            new.right = right;
            Tree::Binary(Arc::new(new))
        }
        (Tree::Assignment(cur), Tree::Assignment(tmpl)) => {
            let prefix = merge_space(&cur.prefix, &tmpl.prefix);
            let target = merge_expression(&cur.target, &tmpl.target);
            let equals = merge_space(&cur.value.before, &tmpl.value.before);
            let value = merge_expression(&cur.value.element, &tmpl.value.element);
            if Arc::ptr_eq(&prefix, &cur.prefix)
                && target.ptr_eq(&cur.target)
                && Arc::ptr_eq(&equals, &cur.value.before)
                && value.ptr_eq(&cur.value.element)
            {
                return current.clone();
            }
            let mut new = (**cur).clone();
            new.prefix = prefix;
            new.target = target;
            new.value = LeftPadded::new(equals, value);
            Tree::Assignment(Arc::new(new))
        }
        (Tree::Call(cur), Tree::Call(tmpl)) => {
            let prefix = merge_space(&cur.prefix, &tmpl.prefix);
            let mut receiver_changed = false;
            let receiver = match (&cur.receiver, &tmpl.receiver) {
                (Some(c), Some(t)) => {
                    let element = merge_expression(&c.element, &t.element);
                    let after = merge_space(&c.after, &t.after);
                    if !element.ptr_eq(&c.element) || !Arc::ptr_eq(&after, &c.after) {
                        receiver_changed = true;
                    }
                    Some(RightPadded::new(element, after))
                }
                (c, _) => c.clone(),
            };
            let name = merge_ident(&cur.name, &tmpl.name);
            let (arguments, args_changed) =
                merge_expression_container(&cur.arguments, &tmpl.arguments);
            if Arc::ptr_eq(&prefix, &cur.prefix)
                && !receiver_changed
                && Arc::ptr_eq(&name, &cur.name)
                && !args_changed
            {
                return current.clone();
            }
            let mut new = (**cur).clone();
            new.prefix = prefix;
            new.receiver = receiver;
            new.name = name;
            new.arguments = arguments;
            Tree::Call(Arc::new(new))
        }
        (Tree::Parens(cur), Tree::Parens(tmpl)) => {
            let prefix = merge_space(&cur.prefix, &tmpl.prefix);
            let element = merge_expression(&cur.tree.element, &tmpl.tree.element);
            let after = merge_space(&cur.tree.after, &tmpl.tree.after);
            if Arc::ptr_eq(&prefix, &cur.prefix)
                && element.ptr_eq(&cur.tree.element)
                && Arc::ptr_eq(&after, &cur.tree.after)
            {
                return current.clone();
            }
            let mut new = (**cur).clone();
            new.prefix = prefix;
            new.tree = RightPadded::new(element, after);
            Tree::Parens(Arc::new(new))
        }
        (Tree::Empty(cur), Tree::Empty(tmpl)) => {
            let prefix = merge_space(&cur.prefix, &tmpl.prefix);
            if Arc::ptr_eq(&prefix, &cur.prefix) {
                current.clone()
            } else {
                Tree::Empty(Arc::new(cur.with_prefix(prefix)))
            }
        }
        (Tree::Block(cur), Tree::Block(tmpl)) => {
            let prefix = merge_space(&cur.prefix, &tmpl.prefix);
            let (statements, stmts_changed) =
                merge_statement_list(&cur.statements, &tmpl.statements);
            let end = merge_space(&cur.end, &tmpl.end);
            if Arc::ptr_eq(&prefix, &cur.prefix) && !stmts_changed && Arc::ptr_eq(&end, &cur.end)
            {
                return current.clone();
            }
            let mut new = (**cur).clone();
            new.prefix = prefix;
            new.statements = statements;
            new.end = end;
            Tree::Block(Arc::new(new))
        }
        (Tree::If(cur), Tree::If(tmpl)) => {
            let prefix = merge_space(&cur.prefix, &tmpl.prefix);
            let condition = merge_parens(&cur.condition, &tmpl.condition);
            let then_stmt = merge_statement(&cur.then_part.element, &tmpl.then_part.element);
            let then_after = merge_space(&cur.then_part.after, &tmpl.then_part.after);
            let mut else_changed = false;
            let else_part = match (&cur.else_part, &tmpl.else_part) {
                (Some(c), Some(t)) => {
                    let before = merge_space(&c.before, &t.before);
                    let element = merge_statement(&c.element.element, &t.element.element);
                    let after = merge_space(&c.element.after, &t.element.after);
                    if !Arc::ptr_eq(&before, &c.before)
                        || !element.ptr_eq(&c.element.element)
                        || !Arc::ptr_eq(&after, &c.element.after)
                    {
                        else_changed = true;
                    }
                    Some(LeftPadded::new(before, RightPadded::new(element, after)))
                }
                (c, _) => c.clone(),
            };
            if Arc::ptr_eq(&prefix, &cur.prefix)
                && Arc::ptr_eq(&condition, &cur.condition)
                && then_stmt.ptr_eq(&cur.then_part.element)
                && Arc::ptr_eq(&then_after, &cur.then_part.after)
                && !else_changed
            {
                return current.clone();
            }
            let mut new = (**cur).clone();
            new.prefix = prefix;
            new.condition = condition;
            new.then_part = RightPadded::new(then_stmt, then_after);
            new.else_part = else_part;
            Tree::If(Arc::new(new))
        }
        (Tree::WhileLoop(cur), Tree::WhileLoop(tmpl)) => {
            let prefix = merge_space(&cur.prefix, &tmpl.prefix);
            let condition = merge_parens(&cur.condition, &tmpl.condition);
            let body = merge_statement(&cur.body.element, &tmpl.body.element);
            let after = merge_space(&cur.body.after, &tmpl.body.after);
            if Arc::ptr_eq(&prefix, &cur.prefix)
                && Arc::ptr_eq(&condition, &cur.condition)
                && body.ptr_eq(&cur.body.element)
                && Arc::ptr_eq(&after, &cur.body.after)
            {
                return current.clone();
            }
            let mut new = (**cur).clone();
            new.prefix = prefix;
            new.condition = condition;
            new.body = RightPadded::new(body, after);
            Tree::WhileLoop(Arc::new(new))
        }
        (Tree::Return(cur), Tree::Return(tmpl)) => {
            let prefix = merge_space(&cur.prefix, &tmpl.prefix);
            let mut expr_changed = false;
            let expression = match (&cur.expression, &tmpl.expression) {
                (Some(c), Some(t)) => {
                    let merged = merge_expression(c, t);
                    if !merged.ptr_eq(c) {
                        expr_changed = true;
                    }
                    Some(merged)
                }
                (c, _) => c.clone(),
            };
            if Arc::ptr_eq(&prefix, &cur.prefix) && !expr_changed {
                return current.clone();
            }
            let mut new = (**cur).clone();
            new.prefix = prefix;
            new.expression = expression;
            Tree::Return(Arc::new(new))
        }
        (Tree::VariableDecls(cur), Tree::VariableDecls(tmpl)) => {
            let prefix = merge_space(&cur.prefix, &tmpl.prefix);
            let mut type_changed = false;
            let type_expr = match (&cur.type_expr, &tmpl.type_expr) {
                (Some(c), Some(t)) => {
                    let merged = merge_type_tree(c, t);
                    if !merged.ptr_eq(c) {
                        type_changed = true;
                    }
                    Some(merged)
                }
                (c, _) => c.clone(),
            };
            let mut vars_changed = false;
            let variables = cur
                .variables
                .iter()
                .enumerate()
                .map(|(i, padded)| match tmpl.variables.get(i) {
                    Some(t) => {
                        let element = merge_named_variable(&padded.element, &t.element);
                        let after = merge_space(&padded.after, &t.after);
                        if !Arc::ptr_eq(&element, &padded.element)
                            || !Arc::ptr_eq(&after, &padded.after)
                        {
                            vars_changed = true;
                        }
                        RightPadded::new(element, after)
                    }
                    None => padded.clone(),
                })
                .collect();
            if Arc::ptr_eq(&prefix, &cur.prefix) && !type_changed && !vars_changed {
                return current.clone();
            }
            let mut new = (**cur).clone();
            new.prefix = prefix;
            new.type_expr = type_expr;
            new.variables = variables;
            Tree::VariableDecls(Arc::new(new))
        }
        (Tree::NamedVariable(cur), Tree::NamedVariable(tmpl)) => {
            Tree::NamedVariable(merge_named_variable(cur, tmpl))
        }
        (Tree::MethodDecl(cur), Tree::MethodDecl(tmpl)) => {
            let prefix = merge_space(&cur.prefix, &tmpl.prefix);
            let mut type_changed = false;
            let return_type = match (&cur.return_type, &tmpl.return_type) {
                (Some(c), Some(t)) => {
                    let merged = merge_type_tree(c, t);
                    if !merged.ptr_eq(c) {
                        type_changed = true;
                    }
                    Some(merged)
                }
                (c, _) => c.clone(),
            };
            let name = merge_ident(&cur.name, &tmpl.name);
            let params_before = merge_space(&cur.parameters.before, &tmpl.parameters.before);
            let mut params_changed = !Arc::ptr_eq(&params_before, &cur.parameters.before);
            let params = cur
                .parameters
                .iter()
                .enumerate()
                .map(|(i, padded)| match tmpl.parameters.elements.get(i) {
                    Some(t) => {
                        let element = merge_statement(&padded.element, &t.element);
                        let after = merge_space(&padded.after, &t.after);
                        if !element.ptr_eq(&padded.element) || !Arc::ptr_eq(&after, &padded.after)
                        {
                            params_changed = true;
                        }
                        RightPadded::new(element, after)
                    }
                    None => padded.clone(),
                })
                .collect();
            let mut body_changed = false;
            let body = match (&cur.body, &tmpl.body) {
                (Some(c), Some(t)) => {
                    let merged = merge_block_node(c, t);
                    if !Arc::ptr_eq(&merged, c) {
                        body_changed = true;
                    }
                    Some(merged)
                }
                (c, _) => c.clone(),
            };
            if Arc::ptr_eq(&prefix, &cur.prefix)
                && !type_changed
                && Arc::ptr_eq(&name, &cur.name)
                && !params_changed
                && !body_changed
            {
                return current.clone();
            }
            let mut new = (**cur).clone();
            new.prefix = prefix;
            new.return_type = return_type;
            new.name = name;
            new.parameters = Container::new(params_before, params);
            new.body = body;
            Tree::MethodDecl(Arc::new(new))
        }
        (Tree::ClassDecl(cur), Tree::ClassDecl(tmpl)) => {
            let prefix = merge_space(&cur.prefix, &tmpl.prefix);
            let name = merge_ident(&cur.name, &tmpl.name);
            let mut extends_changed = false;
            let extends = match (&cur.extends, &tmpl.extends) {
                (Some(c), Some(t)) => {
                    let before = merge_space(&c.before, &t.before);
                    let element = merge_type_tree(&c.element, &t.element);
                    if !Arc::ptr_eq(&before, &c.before) || !element.ptr_eq(&c.element) {
                        extends_changed = true;
                    }
                    Some(LeftPadded::new(before, element))
                }
                (c, _) => c.clone(),
            };
            let body = merge_block_node(&cur.body, &tmpl.body);
            if Arc::ptr_eq(&prefix, &cur.prefix)
                && Arc::ptr_eq(&name, &cur.name)
                && !extends_changed
                && Arc::ptr_eq(&body, &cur.body)
            {
                return current.clone();
            }
            let mut new = (**cur).clone();
            new.prefix = prefix;
            new.name = name;
            new.extends = extends;
            new.body = body;
            Tree::ClassDecl(Arc::new(new))
        }
        // merge_format established matching kinds before dispatching here.
        _ => unreachable!("merge_matched requires matching variants"),
    }
}

fn merge_named_variable(
    current: &Arc<NamedVariable>,
    template: &Arc<NamedVariable>,
) -> Arc<NamedVariable> {
    let prefix = merge_space(&current.prefix, &template.prefix);
    let name = merge_ident(&current.name, &template.name);
    let mut init_changed = false;
    let initializer = match (&current.initializer, &template.initializer) {
        (Some(c), Some(t)) => {
            let before = merge_space(&c.before, &t.before);
            let element = merge_expression(&c.element, &t.element);
            if !Arc::ptr_eq(&before, &c.before) || !element.ptr_eq(&c.element) {
                init_changed = true;
            }
            Some(LeftPadded::new(before, element))
        }
        (c, _) => c.clone(),
    };
    if Arc::ptr_eq(&prefix, &current.prefix)
        && Arc::ptr_eq(&name, &current.name)
        && !init_changed
    {
        return current.clone();
    }
    let mut new = (**current).clone();
    new.prefix = prefix;
    new.name = name;
    new.initializer = initializer;
    Arc::new(new)
}
