// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Tests for the structural formatting merge.

use std::sync::Arc;

use recast_format::merge_format;
use recast_lst::nodes::{
    Assignment, Empty, Expression, Ident, LeftPadded, Literal, LiteralKind, Module, Parens,
    RightPadded, Statement, Tree, WhileLoop,
};
use recast_lst::trivia::{Comment, Space};
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

fn assignment(session: &BuildSession, prefix: &str, name: &str, value: &str) -> Tree {
    Tree::Assignment(Arc::new(Assignment::new(
        session.spaces.whitespace(prefix),
        expr_ident(session, "", name),
        LeftPadded::new(
            session.spaces.whitespace(" "),
            int_lit(session, " ", value),
        ),
        None,
    )))
}

#[test]
fn merging_a_tree_with_itself_is_a_no_op() {
    let session = BuildSession::new();
    let tree = assignment(&session, "\n", "x", "1");
    let merged = merge_format(&tree, &tree);
    assert!(tree.ptr_eq(&merged));
}

#[test]
fn shape_mismatch_returns_current_completely_unchanged() {
    let session = BuildSession::new();
    let current = assignment(&session, "", "x", "1");
    let template = Tree::WhileLoop(Arc::new(WhileLoop::new(
        session.spaces.whitespace("\n    "),
        Arc::new(Parens::new(
            session.spaces.whitespace(" "),
            RightPadded::new(expr_ident(&session, "", "x"), session.spaces.empty()),
        )),
        RightPadded::new(
            Statement::Empty(Arc::new(Empty::new(session.spaces.empty()))),
            session.spaces.empty(),
        ),
    )));
    let merged = merge_format(&current, &template);
    assert!(current.ptr_eq(&merged));
    assert_eq!(print(&merged), "x = 1");
}

#[test]
fn template_indent_lands_on_a_synthesized_statement() {
    let session = BuildSession::new();
    // Freshly built fragment: no leading trivia at all.
    let current = assignment(&session, "", "x", "1");
    // The statement above the insertion point, with the block's indent.
    let template = assignment(&session, "\n    ", "count", "0");

    let merged = merge_format(&current, &template);
    assert_eq!(print(&merged), "\n    x = 1");
    // Identity of the fragment survives the merge.
    assert_eq!(merged.id(), current.id());

    // A structurally different template leaves the fragment's own (empty)
    // trivia untouched.
    let loop_template = Tree::WhileLoop(Arc::new(WhileLoop::new(
        session.spaces.whitespace("\n    "),
        Arc::new(Parens::new(
            session.spaces.whitespace(" "),
            RightPadded::new(expr_ident(&session, "", "x"), session.spaces.empty()),
        )),
        RightPadded::new(
            Statement::Empty(Arc::new(Empty::new(session.spaces.empty()))),
            session.spaces.empty(),
        ),
    )));
    let unmerged = merge_format(&current, &loop_template);
    assert!(current.ptr_eq(&unmerged));
    assert_eq!(print(&unmerged), "x = 1");
}

#[test]
fn comments_reconcile_only_on_equal_counts() {
    let session = BuildSession::new();
    let current = Tree::Empty(Arc::new(Empty::new(session.spaces.intern(Space::new(
        "",
        vec![Comment::new("// keep", " ", false)],
    )))));
    let template = Tree::Empty(Arc::new(Empty::new(session.spaces.intern(Space::new(
        "\n",
        vec![Comment::new("// other", "\n    ", false)],
    )))));

    let merged = merge_format(&current, &template);
    let prefix = merged.prefix();
    // Whitespace comes from the template, comment text from current.
    assert_eq!(prefix.whitespace, "\n");
    assert_eq!(prefix.comments.len(), 1);
    assert_eq!(prefix.comments[0].text, "// keep");
    assert_eq!(prefix.comments[0].suffix, "\n    ");
}

#[test]
fn unequal_comment_counts_leave_current_comments_alone() {
    let session = BuildSession::new();
    let current = Tree::Empty(Arc::new(Empty::new(session.spaces.intern(Space::new(
        " ",
        vec![Comment::new("// keep", " ", false)],
    )))));
    let template = Tree::Empty(Arc::new(Empty::new(session.spaces.whitespace("\n"))));

    let merged = merge_format(&current, &template);
    let prefix = merged.prefix();
    assert_eq!(prefix.whitespace, "\n");
    assert_eq!(prefix.comments.len(), 1);
    assert_eq!(prefix.comments[0].text, "// keep");
    // Comment whitespace was not reconciled: counts differ.
    assert_eq!(prefix.comments[0].suffix, " ");
}

#[test]
fn children_merge_pairwise_and_extras_survive() {
    let session = BuildSession::new();
    let current = Tree::Module(Arc::new(Module::new(
        session.spaces.empty(),
        vec![
            RightPadded::new(
                Statement::try_from(assignment(&session, "", "x", "1")).expect("statement"),
                session.spaces.empty(),
            ),
            RightPadded::new(
                Statement::try_from(assignment(&session, "\n", "y", "2")).expect("statement"),
                session.spaces.empty(),
            ),
        ],
        session.spaces.empty(),
    )));
    let template = Tree::Module(Arc::new(Module::new(
        session.spaces.empty(),
        vec![RightPadded::new(
            Statement::try_from(assignment(&session, "\n    ", "z", "3")).expect("statement"),
            session.spaces.empty(),
        )],
        session.spaces.empty(),
    )));

    let merged = merge_format(&current, &template);
    let (merged_module, current_module) = match (&merged, &current) {
        (Tree::Module(m), Tree::Module(c)) => (m, c),
        _ => panic!("expected modules"),
    };
    // First statement inherited the template's indent.
    assert_eq!(print(&merged), "\n    x = 1;\ny = 2;");
    // The unpaired second statement is the original instance.
    assert!(merged_module.statements[1]
        .element
        .ptr_eq(&current_module.statements[1].element));
}
