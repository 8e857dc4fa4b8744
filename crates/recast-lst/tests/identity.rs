// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Identity-stability and role-reduction tests for the visitor framework.
//!
//! The contract under test: a visitor that does not touch a subtree
//! returns that subtree reference-identical to its input; multi-role nodes
//! run their capability visits in table order; a capability visit that
//! changes the node's runtime kind short-circuits the reduction; and the
//! stop signal freezes the rest of the traversal.

use std::sync::Arc;

use recast_lst::intern::Symbol;
use recast_lst::nodes::{
    Assignment, Call, Container, Empty, Expression, Ident, LeftPadded, Literal, LiteralKind,
    Module, NodeKind, RightPadded, Statement, Tree,
};
use recast_lst::visitor::{
    run_visitor, walk_assignment, walk_ident, LstVisitor, VisitCtx,
};
use recast_lst::{print, BuildSession};

fn expr_ident(session: &BuildSession, prefix: &str, name: &str) -> Expression {
    Expression::Ident(Arc::new(Ident::new(
        session.spaces.whitespace(prefix),
        session.symbols.intern(name, None),
    )))
}

fn int_lit(session: &BuildSession, prefix: &str, source: &str) -> Expression {
    Expression::Literal(Arc::new(Literal::new(
        session.spaces.whitespace(prefix),
        source,
        LiteralKind::Int,
        None,
    )))
}

fn call_tree(session: &BuildSession) -> Tree {
    Tree::Call(Arc::new(Call::new(
        session.spaces.whitespace(" "),
        None,
        Arc::new(Ident::new(
            session.spaces.empty(),
            session.symbols.intern("foo", None),
        )),
        Container::new(
            session.spaces.empty(),
            vec![
                RightPadded::new(expr_ident(session, "", "a"), session.spaces.empty()),
                RightPadded::new(expr_ident(session, " ", "b"), session.spaces.empty()),
            ],
        ),
        None,
        None,
    )))
}

struct Noop;

impl LstVisitor for Noop {}

#[test]
fn noop_visitor_returns_the_original_reference() {
    let session = BuildSession::new();
    let tree = call_tree(&session);
    let visited = run_visitor(&mut Noop, &tree);
    assert!(tree.ptr_eq(&visited));
}

/// Replaces the argument identifier `b` with `c`.
struct ReplaceArg {
    replacement: Arc<Symbol>,
}

impl LstVisitor for ReplaceArg {
    fn visit_ident(&mut self, node: &Arc<Ident>, ctx: &mut VisitCtx) -> Tree {
        if node.name() == "b" {
            Tree::Ident(Arc::new(Ident::new(
                node.prefix.clone(),
                self.replacement.clone(),
            )))
        } else {
            walk_ident(self, node, ctx)
        }
    }
}

#[test]
fn replacing_one_argument_keeps_siblings_reference_identical() {
    let session = BuildSession::new();
    let tree = call_tree(&session);
    let mut visitor = ReplaceArg {
        replacement: session.symbols.intern("c", None),
    };
    let visited = run_visitor(&mut visitor, &tree);

    assert_eq!(print(&visited), " foo(a, c)");
    assert_eq!(print(&tree), " foo(a, b)");
    // The call was rebuilt but kept its identity.
    assert!(!tree.ptr_eq(&visited));
    assert_eq!(tree.id(), visited.id());

    let (before, after) = match (&tree, &visited) {
        (Tree::Call(before), Tree::Call(after)) => (before, after),
        _ => panic!("expected calls"),
    };
    // Untouched children are the same instances, not copies.
    assert!(before.arguments.elements[0]
        .element
        .ptr_eq(&after.arguments.elements[0].element));
    assert!(Arc::ptr_eq(&before.name, &after.name));
    // The replaced child is a new node.
    assert!(!before.arguments.elements[1]
        .element
        .ptr_eq(&after.arguments.elements[1].element));
}

/// Records the order in which an assignment's visits run.
struct ReductionLog {
    events: Vec<&'static str>,
}

impl LstVisitor for ReductionLog {
    fn visit_assignment(&mut self, node: &Arc<Assignment>, ctx: &mut VisitCtx) -> Tree {
        self.events.push("variant");
        walk_assignment(self, node, ctx)
    }

    fn visit_statement(&mut self, statement: Tree, _ctx: &mut VisitCtx) -> Tree {
        if statement.kind() == NodeKind::Assignment {
            self.events.push("statement");
        }
        statement
    }

    fn visit_expression(&mut self, expression: Tree, _ctx: &mut VisitCtx) -> Tree {
        if expression.kind() == NodeKind::Assignment {
            self.events.push("expression");
        }
        expression
    }
}

#[test]
fn role_reduction_runs_variant_then_capabilities_in_table_order() {
    let session = BuildSession::new();
    let assignment = Tree::Assignment(Arc::new(Assignment::new(
        session.spaces.empty(),
        expr_ident(&session, "", "x"),
        LeftPadded::new(session.spaces.whitespace(" "), int_lit(&session, " ", "1")),
        None,
    )));
    let mut log = ReductionLog { events: vec![] };
    let visited = run_visitor(&mut log, &assignment);
    assert!(assignment.ptr_eq(&visited));
    assert_eq!(log.events, vec!["variant", "statement", "expression"]);
}

/// Narrows an assignment to an empty statement from the statement role.
struct NarrowToEmpty {
    expression_ran: bool,
}

impl LstVisitor for NarrowToEmpty {
    fn visit_statement(&mut self, statement: Tree, _ctx: &mut VisitCtx) -> Tree {
        if statement.kind() == NodeKind::Assignment {
            return Tree::Empty(Arc::new(Empty::new(statement.prefix().clone())));
        }
        statement
    }

    fn visit_expression(&mut self, expression: Tree, _ctx: &mut VisitCtx) -> Tree {
        if expression.kind() == NodeKind::Assignment {
            self.expression_ran = true;
        }
        expression
    }
}

#[test]
fn changing_the_runtime_kind_short_circuits_the_reduction() {
    let session = BuildSession::new();
    let assignment = Tree::Assignment(Arc::new(Assignment::new(
        session.spaces.empty(),
        expr_ident(&session, "", "x"),
        LeftPadded::new(session.spaces.whitespace(" "), int_lit(&session, " ", "1")),
        None,
    )));
    let mut visitor = NarrowToEmpty {
        expression_ran: false,
    };
    let visited = run_visitor(&mut visitor, &assignment);
    // The statement-role visit narrowed the node; the expression-role visit
    // never saw it.
    assert_eq!(visited.kind(), NodeKind::Empty);
    assert!(!visitor.expression_ran);
}

/// Rewrites literals, but stops the traversal after the first assignment.
struct StopAfterFirst {
    rewrites: usize,
}

impl LstVisitor for StopAfterFirst {
    fn visit_literal(&mut self, node: &Arc<Literal>, _ctx: &mut VisitCtx) -> Tree {
        self.rewrites += 1;
        Tree::Literal(Arc::new(Literal::new(
            node.prefix.clone(),
            "9",
            LiteralKind::Int,
            None,
        )))
    }

    fn visit_assignment(&mut self, node: &Arc<Assignment>, ctx: &mut VisitCtx) -> Tree {
        let result = walk_assignment(self, node, ctx);
        ctx.stop_after();
        result
    }
}

#[test]
fn stop_signal_freezes_the_rest_of_the_traversal() {
    let session = BuildSession::new();
    let first = Statement::Assignment(Arc::new(Assignment::new(
        session.spaces.empty(),
        expr_ident(&session, "", "a"),
        LeftPadded::new(session.spaces.whitespace(" "), int_lit(&session, " ", "1")),
        None,
    )));
    let second = Statement::Assignment(Arc::new(Assignment::new(
        session.spaces.whitespace("\n"),
        expr_ident(&session, "", "b"),
        LeftPadded::new(session.spaces.whitespace(" "), int_lit(&session, " ", "1")),
        None,
    )));
    let tree = Tree::Module(Arc::new(Module::new(
        session.spaces.empty(),
        vec![
            RightPadded::new(first, session.spaces.empty()),
            RightPadded::new(second.clone(), session.spaces.empty()),
        ],
        session.spaces.whitespace("\n"),
    )));

    let mut visitor = StopAfterFirst { rewrites: 0 };
    let visited = run_visitor(&mut visitor, &tree);

    assert_eq!(print(&visited), "a = 9;\nb = 1;\n");
    assert_eq!(visitor.rewrites, 1);
    // The frozen statement is the original instance.
    match &visited {
        Tree::Module(m) => assert!(m.statements[1].element.ptr_eq(&second)),
        other => panic!("expected module, got {:?}", other.kind()),
    }
}

/// A no-op traversal over a tree containing every variant must return the
/// original reference: every capability pair in the table reduces to
/// identity.
#[test]
fn role_reduction_is_total_over_the_node_set() {
    use recast_lst::nodes::{
        Binary, BinaryOp, Block, ClassDecl, FieldAccess, If, MethodDecl, NamedVariable, Parens,
        Return, TypeTree, Unary, UnaryOp, VariableDecls, WhileLoop,
    };
    let s = BuildSession::new();
    let sp = |ws: &str| s.spaces.whitespace(ws);
    let id = |prefix: &str, name: &str| {
        Arc::new(Ident::new(sp(prefix), s.symbols.intern(name, None)))
    };

    let field_access = Expression::FieldAccess(Arc::new(FieldAccess::new(
        sp(""),
        Expression::Ident(id("", "a")),
        LeftPadded::new(sp(""), id("", "b")),
        None,
    )));
    let binary = Expression::Binary(Arc::new(Binary::new(
        sp(" "),
        field_access,
        LeftPadded::new(sp(" "), BinaryOp::Sub),
        Expression::Parens(Arc::new(Parens::new(
            sp(" "),
            RightPadded::new(
                Expression::Unary(Arc::new(Unary::new(
                    sp(""),
                    LeftPadded::new(sp(""), UnaryOp::Negative),
                    int_lit(&s, "", "1"),
                    None,
                ))),
                sp(""),
            ),
        ))),
        None,
    )));
    let assignment = Statement::Assignment(Arc::new(Assignment::new(
        sp("\n        "),
        expr_ident(&s, "", "x"),
        LeftPadded::new(sp(" "), binary),
        None,
    )));
    let call = Statement::Call(Arc::new(Call::new(
        sp("\n        "),
        Some(RightPadded::new(expr_ident(&s, "", "obj"), sp(""))),
        id("", "log"),
        Container::new(sp(""), vec![RightPadded::new(expr_ident(&s, "", "x"), sp(""))]),
        None,
        None,
    )));
    let branch = Statement::If(Arc::new(If::new(
        sp("\n        "),
        Arc::new(Parens::new(
            sp(" "),
            RightPadded::new(expr_ident(&s, "", "x"), sp("")),
        )),
        RightPadded::new(
            Statement::Block(Arc::new(Block::new(sp(" "), vec![], sp("\n        ")))),
            sp(""),
        ),
        Some(LeftPadded::new(
            sp(" "),
            RightPadded::new(Statement::Empty(Arc::new(Empty::new(sp(" ")))), sp("")),
        )),
    )));
    let while_loop = Statement::WhileLoop(Arc::new(WhileLoop::new(
        sp("\n        "),
        Arc::new(Parens::new(
            sp(" "),
            RightPadded::new(expr_ident(&s, "", "x"), sp("")),
        )),
        RightPadded::new(
            Statement::Block(Arc::new(Block::new(sp(" "), vec![], sp("\n        ")))),
            sp(""),
        ),
    )));
    let ret = Statement::Return(Arc::new(Return::new(
        sp("\n        "),
        Some(expr_ident(&s, " ", "x")),
    )));
    let decls = Statement::VariableDecls(Arc::new(VariableDecls::new(
        sp("\n    "),
        Some(TypeTree::Ident(id("", "int"))),
        vec![RightPadded::new(
            Arc::new(NamedVariable::new(
                sp(" "),
                id("", "x"),
                Some(LeftPadded::new(sp(" "), int_lit(&s, " ", "1"))),
                None,
            )),
            sp(""),
        )],
    )));
    let method = Statement::MethodDecl(Arc::new(MethodDecl::new(
        sp("\n    "),
        Some(TypeTree::Ident(id("", "void"))),
        id(" ", "run"),
        Container::new(sp(""), vec![RightPadded::new(decls.clone(), sp(""))]),
        Some(Arc::new(Block::new(
            sp(" "),
            vec![
                RightPadded::new(assignment, sp("")),
                RightPadded::new(call, sp("")),
                RightPadded::new(branch, sp("")),
                RightPadded::new(while_loop, sp("")),
                RightPadded::new(ret, sp("")),
            ],
            sp("\n    "),
        ))),
        None,
    )));
    let class = Statement::ClassDecl(Arc::new(ClassDecl::new(
        sp(""),
        id(" ", "Foo"),
        Some(LeftPadded::new(sp(" "), TypeTree::Ident(id(" ", "Bar")))),
        Arc::new(Block::new(
            sp(" "),
            vec![RightPadded::new(method, sp(""))],
            sp("\n"),
        )),
        None,
    )));
    let tree = Tree::Module(Arc::new(Module::new(
        sp(""),
        vec![RightPadded::new(class, sp(""))],
        sp("\n"),
    )));

    let visited = run_visitor(&mut Noop, &tree);
    assert!(tree.ptr_eq(&visited));
    assert_eq!(print(&tree), print(&visited));
}
