// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Formatting for recast LSTs: the structural formatting merge and the
//! autoformat pipeline.
//!
//! # Autoformat
//!
//! [`autoformat`] composes a fixed, ordered sequence of single-purpose
//! visitors. Each stage is independently a pure tree-to-tree transform;
//! they run strictly in sequence because later stages assume earlier
//! stages' normalization:
//!
//! 1. blank-line policy ([`stages::BlankLines`])
//! 2. brace/wrap policy ([`stages::WrappingAndBraces`])
//! 3. inter-token spacing ([`stages::Spaces`])
//! 4. indentation character normalization ([`stages::NormalizeIndentChar`])
//! 5. indentation depth ([`stages::TabsAndIndents`])
//! 6. line-ending normalization ([`stages::NormalizeLineEndings`])
//! 7. trailing-whitespace removal ([`stages::RemoveTrailingWhitespace`])
//! 8. minimum viable spacing ([`stages::MinimumViableSpacing`])
//!
//! [`autoformat_scoped`] bounds the pipeline to one statement subtree —
//! the shape used after inserting a synthesized fragment, so only the new
//! code is reformatted while the rest of the file stays byte-identical.
//!
//! # Formatting merge
//!
//! [`merge_format`] reconciles trivia between two trees of matching shape;
//! see the module docs in [`merge`].

pub mod merge;
pub mod stages;

pub use merge::merge_format;

use serde::{Deserialize, Serialize};
use tracing::debug;

use recast_lst::cursor::Cursor;
use recast_lst::nodes::{NodeId, Tree};
use recast_lst::visitor::{visit_tree, LstVisitor, VisitCtx};

use stages::{
    BlankLines, MinimumViableSpacing, NormalizeIndentChar, NormalizeLineEndings,
    RemoveTrailingWhitespace, Spaces, TabsAndIndents, WrappingAndBraces,
};

/// Formatting style configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatStyle {
    /// Width of one indent level, in spaces.
    pub indent_width: usize,
    /// Indent with tabs instead of spaces.
    pub use_tabs: bool,
    /// Line-ending sequence.
    pub newline: String,
    /// Maximum number of consecutive blank lines to keep.
    pub max_blank_lines: usize,
}

impl Default for FormatStyle {
    fn default() -> Self {
        Self {
            indent_width: 4,
            use_tabs: false,
            newline: "\n".to_string(),
            max_blank_lines: 1,
        }
    }
}

impl FormatStyle {
    /// One indent level in the configured character.
    pub fn indent_unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.indent_width)
        }
    }
}

fn run_stage<V: LstVisitor>(mut stage: V, name: &str, tree: &Tree, base: &Cursor) -> Tree {
    debug!(stage = name, "autoformat stage");
    let mut ctx = VisitCtx::with_cursor(base.clone());
    visit_tree(&mut stage, tree, &mut ctx)
}

/// Run the full pipeline below an existing cursor chain, so depth-aware
/// stages see the surrounding context.
fn run_stages(tree: &Tree, style: &FormatStyle, base: &Cursor) -> Tree {
    let tree = run_stage(BlankLines::new(style), "blank_lines", tree, base);
    let tree = run_stage(WrappingAndBraces::new(), "wrapping", &tree, base);
    let tree = run_stage(Spaces::new(), "spaces", &tree, base);
    let tree = run_stage(NormalizeIndentChar::new(style), "indent_char", &tree, base);
    let tree = run_stage(TabsAndIndents::new(style), "indent", &tree, base);
    let tree = run_stage(NormalizeLineEndings::new(style), "line_endings", &tree, base);
    let tree = run_stage(
        RemoveTrailingWhitespace::new(),
        "trailing_whitespace",
        &tree,
        base,
    );
    run_stage(MinimumViableSpacing::new(), "min_spacing", &tree, base)
}

/// Autoformat a whole tree.
pub fn autoformat(tree: &Tree, style: &FormatStyle) -> Tree {
    run_stages(tree, style, &Cursor::root())
}

/// Bounds the autoformat pipeline to the statement with the given id.
struct ScopedFormat {
    target: NodeId,
    style: FormatStyle,
}

impl LstVisitor for ScopedFormat {
    fn visit_statement(&mut self, statement: Tree, ctx: &mut VisitCtx) -> Tree {
        if statement.id() != self.target {
            return statement;
        }
        // Seed the pipeline with the ancestry above the target so the
        // indentation stage sees the real block depth, then stop: nothing
        // past this subtree is reformatted.
        let base = ctx.cursor().parent().unwrap_or_else(Cursor::root);
        let formatted = run_stages(&statement, &self.style, &base);
        ctx.stop_after();
        formatted
    }
}

/// Autoformat only the statement subtree with the given id, leaving every
/// other node of the tree untouched (reference-identical). Used to format
/// a freshly inserted fragment in place.
pub fn autoformat_scoped(tree: &Tree, target: NodeId, style: &FormatStyle) -> Tree {
    let mut scoped = ScopedFormat {
        target,
        style: style.clone(),
    };
    recast_lst::visitor::run_visitor(&mut scoped, tree)
}
