// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Round-trip tests for the LST printer.
//!
//! These tests verify that `print(tree)` reproduces the exact source text a
//! tree was built to represent, trivia included. This is the fundamental
//! invariant transformation tooling relies on: a tree nothing touched
//! prints byte-identically.

use difference::assert_diff;
use itertools::Itertools;
use std::sync::Arc;

use recast_lst::nodes::{
    Assignment, Binary, BinaryOp, Block, Call, ClassDecl, Container, Empty, Expression,
    FieldAccess, Ident, If, LeftPadded, Literal, LiteralKind, MethodDecl, Module, NamedVariable,
    Parens, Return, RightPadded, Statement, Tree, TypeTree, Unary, UnaryOp, VariableDecls,
    WhileLoop,
};
use recast_lst::trivia::{Comment, Space};
use recast_lst::{print, BuildSession};

/// Helper to visualize whitespace differences in test output.
fn visualize(s: &str) -> String {
    s.replace(' ', "▩").lines().join("↩\n")
}

fn assert_prints(tree: &Tree, expected: &str) {
    let printed = print(tree);
    if printed != expected {
        let got = visualize(&printed);
        let want = visualize(expected);
        assert_diff!(want.as_ref(), got.as_ref(), "", 0);
    }
}

fn sp(session: &BuildSession, ws: &str) -> Arc<Space> {
    session.spaces.whitespace(ws)
}

fn ident(session: &BuildSession, prefix: &str, name: &str) -> Arc<Ident> {
    Arc::new(Ident::new(
        sp(session, prefix),
        session.symbols.intern(name, None),
    ))
}

fn expr_ident(session: &BuildSession, prefix: &str, name: &str) -> Expression {
    Expression::Ident(ident(session, prefix, name))
}

fn int_lit(session: &BuildSession, prefix: &str, source: &str) -> Expression {
    Expression::Literal(Arc::new(Literal::new(
        sp(session, prefix),
        source,
        LiteralKind::Int,
        None,
    )))
}

fn assign(
    session: &BuildSession,
    prefix: &str,
    target: Expression,
    value: Expression,
) -> Statement {
    Statement::Assignment(Arc::new(Assignment::new(
        sp(session, prefix),
        target,
        LeftPadded::new(sp(session, " "), value),
        None,
    )))
}

fn module(session: &BuildSession, statements: Vec<Statement>, eof: Arc<Space>) -> Tree {
    let statements = statements
        .into_iter()
        .map(|s| RightPadded::new(s, session.spaces.empty()))
        .collect();
    Tree::Module(Arc::new(Module::new(
        session.spaces.empty(),
        statements,
        eof,
    )))
}

#[test]
fn assignment_statement_round_trips() {
    let session = BuildSession::new();
    let tree = module(
        &session,
        vec![assign(
            &session,
            "",
            expr_ident(&session, "", "x"),
            int_lit(&session, " ", "1"),
        )],
        sp(&session, "\n"),
    );
    assert_prints(&tree, "x = 1;\n");
}

#[test]
fn call_expression_round_trips() {
    let session = BuildSession::new();
    let call = Tree::Call(Arc::new(Call::new(
        sp(&session, " "),
        None,
        ident(&session, "", "foo"),
        Container::new(
            session.spaces.empty(),
            vec![
                RightPadded::new(expr_ident(&session, "", "a"), session.spaces.empty()),
                RightPadded::new(expr_ident(&session, " ", "b"), session.spaces.empty()),
            ],
        ),
        None,
        None,
    )));
    assert_prints(&call, " foo(a, b)");
}

#[test]
fn field_access_and_empty_round_trip() {
    let session = BuildSession::new();
    let target = Expression::FieldAccess(Arc::new(FieldAccess::new(
        session.spaces.empty(),
        expr_ident(&session, "", "a"),
        LeftPadded::new(session.spaces.empty(), ident(&session, "", "b")),
        None,
    )));
    let value = Expression::FieldAccess(Arc::new(FieldAccess::new(
        sp(&session, " "),
        expr_ident(&session, "", "c"),
        LeftPadded::new(session.spaces.empty(), ident(&session, "", "d")),
        None,
    )));
    let assignment = Statement::Assignment(Arc::new(Assignment::new(
        session.spaces.empty(),
        target,
        LeftPadded::new(sp(&session, " "), value),
        None,
    )));
    let empty = Statement::Empty(Arc::new(Empty::new(sp(&session, "\n"))));
    let tree = module(&session, vec![assignment, empty], sp(&session, "\n"));
    assert_prints(&tree, "a.b = c.d;\n;\n");
}

#[test]
fn abstract_method_round_trips() {
    let session = BuildSession::new();
    let method = Statement::MethodDecl(Arc::new(MethodDecl::new(
        session.spaces.empty(),
        Some(TypeTree::Ident(ident(&session, "", "void"))),
        ident(&session, " ", "f"),
        Container::new(session.spaces.empty(), vec![]),
        None,
        None,
    )));
    let tree = module(&session, vec![method], session.spaces.empty());
    assert_prints(&tree, "void f();");
}

#[test]
fn trailing_comment_round_trips() {
    let session = BuildSession::new();
    let eof = session.spaces.intern(Space::new(
        " ",
        vec![Comment::new("// set", "\n", false)],
    ));
    let tree = module(
        &session,
        vec![assign(
            &session,
            "",
            expr_ident(&session, "", "x"),
            int_lit(&session, " ", "1"),
        )],
        eof,
    );
    assert_prints(&tree, "x = 1; // set\n");
}

/// One fixture covering the whole node set with realistic formatting.
fn class_fixture(session: &BuildSession) -> Tree {
    // x = x + 1;
    let increment = assign(
        session,
        "\n        ",
        expr_ident(session, "", "x"),
        Expression::Binary(Arc::new(Binary::new(
            sp(session, " "),
            expr_ident(session, "", "x"),
            LeftPadded::new(sp(session, " "), BinaryOp::Add),
            int_lit(session, " ", "1"),
            None,
        ))),
    );

    // if (x > 2) { obj.log(x); } else { x--; }
    let condition = Arc::new(Parens::new(
        sp(session, " "),
        RightPadded::new(
            Expression::Binary(Arc::new(Binary::new(
                session.spaces.empty(),
                expr_ident(session, "", "x"),
                LeftPadded::new(sp(session, " "), BinaryOp::Gt),
                int_lit(session, " ", "2"),
                None,
            ))),
            session.spaces.empty(),
        ),
    ));
    let log_call = Statement::Call(Arc::new(Call::new(
        sp(session, "\n            "),
        Some(RightPadded::new(
            expr_ident(session, "", "obj"),
            session.spaces.empty(),
        )),
        ident(session, "", "log"),
        Container::new(
            session.spaces.empty(),
            vec![RightPadded::new(
                expr_ident(session, "", "x"),
                session.spaces.empty(),
            )],
        ),
        None,
        None,
    )));
    let then_block = Statement::Block(Arc::new(Block::new(
        sp(session, " "),
        vec![RightPadded::new(log_call, session.spaces.empty())],
        sp(session, "\n        "),
    )));
    let decrement = Statement::Unary(Arc::new(Unary::new(
        sp(session, "\n            "),
        LeftPadded::new(session.spaces.empty(), UnaryOp::PostDecrement),
        expr_ident(session, "", "x"),
        None,
    )));
    let else_block = Statement::Block(Arc::new(Block::new(
        sp(session, " "),
        vec![RightPadded::new(decrement, session.spaces.empty())],
        sp(session, "\n        "),
    )));
    let if_stmt = Statement::If(Arc::new(If::new(
        sp(session, "\n        "),
        condition,
        RightPadded::new(then_block, session.spaces.empty()),
        Some(LeftPadded::new(
            sp(session, " "),
            RightPadded::new(else_block, session.spaces.empty()),
        )),
    )));

    // while (x < 10) { x = x + 2; }
    let while_cond = Arc::new(Parens::new(
        sp(session, " "),
        RightPadded::new(
            Expression::Binary(Arc::new(Binary::new(
                session.spaces.empty(),
                expr_ident(session, "", "x"),
                LeftPadded::new(sp(session, " "), BinaryOp::Lt),
                int_lit(session, " ", "10"),
                None,
            ))),
            session.spaces.empty(),
        ),
    ));
    let loop_body = Statement::Block(Arc::new(Block::new(
        sp(session, " "),
        vec![RightPadded::new(
            assign(
                session,
                "\n            ",
                expr_ident(session, "", "x"),
                Expression::Binary(Arc::new(Binary::new(
                    sp(session, " "),
                    expr_ident(session, "", "x"),
                    LeftPadded::new(sp(session, " "), BinaryOp::Add),
                    int_lit(session, " ", "2"),
                    None,
                ))),
            ),
            session.spaces.empty(),
        )],
        sp(session, "\n        "),
    )));
    let while_stmt = Statement::WhileLoop(Arc::new(WhileLoop::new(
        sp(session, "\n        "),
        while_cond,
        RightPadded::new(loop_body, session.spaces.empty()),
    )));

    let return_stmt = Statement::Return(Arc::new(Return::new(sp(session, "\n        "), None)));

    // void run() { ... }
    let run_body = Arc::new(Block::new(
        sp(session, " "),
        vec![
            RightPadded::new(increment, session.spaces.empty()),
            RightPadded::new(if_stmt, session.spaces.empty()),
            RightPadded::new(while_stmt, session.spaces.empty()),
            RightPadded::new(return_stmt, session.spaces.empty()),
        ],
        sp(session, "\n    "),
    ));
    let run = Statement::MethodDecl(Arc::new(MethodDecl::new(
        sp(session, "\n    "),
        Some(TypeTree::Ident(ident(session, "", "void"))),
        ident(session, " ", "run"),
        Container::new(session.spaces.empty(), vec![]),
        Some(run_body),
        None,
    )));

    // int x = 1;
    let field = Statement::VariableDecls(Arc::new(VariableDecls::new(
        sp(session, "\n    "),
        Some(TypeTree::Ident(ident(session, "", "int"))),
        vec![RightPadded::new(
            Arc::new(NamedVariable::new(
                sp(session, " "),
                ident(session, "", "x"),
                Some(LeftPadded::new(sp(session, " "), int_lit(session, " ", "1"))),
                None,
            )),
            session.spaces.empty(),
        )],
    )));

    // class Foo extends Bar { ... }
    let class_body = Arc::new(Block::new(
        sp(session, " "),
        vec![
            RightPadded::new(field, session.spaces.empty()),
            RightPadded::new(run, session.spaces.empty()),
        ],
        sp(session, "\n"),
    ));
    let class = Statement::ClassDecl(Arc::new(ClassDecl::new(
        session.spaces.empty(),
        ident(session, " ", "Foo"),
        Some(LeftPadded::new(
            sp(session, " "),
            TypeTree::Ident(ident(session, " ", "Bar")),
        )),
        class_body,
        None,
    )));

    let prefix = session
        .spaces
        .intern(Space::new("", vec![Comment::new("// entry", "\n", false)]));
    Tree::Module(Arc::new(Module::new(
        prefix,
        vec![RightPadded::new(class, session.spaces.empty())],
        sp(session, "\n"),
    )))
}

const CLASS_FIXTURE_TEXT: &str = "\
// entry
class Foo extends Bar {
    int x = 1;
    void run() {
        x = x + 1;
        if (x > 2) {
            obj.log(x);
        } else {
            x--;
        }
        while (x < 10) {
            x = x + 2;
        }
        return;
    }
}
";

#[test]
fn class_fixture_round_trips() {
    let session = BuildSession::new();
    let tree = class_fixture(&session);
    assert_prints(&tree, CLASS_FIXTURE_TEXT);
}

#[test]
fn trivia_is_shared_across_the_fixture() {
    let session = BuildSession::new();
    let tree = class_fixture(&session);
    // Structural sharing: the many "\n        " prefixes in the fixture all
    // intern to one instance, and the fixture still prints exactly.
    assert_prints(&tree, CLASS_FIXTURE_TEXT);
    let deep_indent = session.spaces.whitespace("\n        ");
    let again = session.spaces.whitespace("\n        ");
    assert!(Arc::ptr_eq(&deep_indent, &again));
}
