// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Brace and wrap policy.
//!
//! Two rules: an opening brace stays on the line of its owning statement
//! (a block prefix with no line break collapses to one space), and every
//! statement that is a direct child of a block starts on its own line.
//! Module-level statements keep their existing line structure; the first
//! statement of a file may legitimately sit at its very start.

use std::sync::Arc;

use recast_lst::nodes::{Capability, NodeKind, Tree};
use recast_lst::trivia::Space;
use recast_lst::visitor::{LstVisitor, SpaceLoc, VisitCtx};

use super::{is_node_prefix, parent_kind};

/// Enforces brace placement and statement wrapping.
#[derive(Default)]
pub struct WrappingAndBraces;

impl WrappingAndBraces {
    pub fn new() -> Self {
        Self
    }
}

impl LstVisitor for WrappingAndBraces {
    fn visit_space(&mut self, space: &Arc<Space>, loc: SpaceLoc, ctx: &mut VisitCtx) -> Arc<Space> {
        if loc == SpaceLoc::BlockEnd {
            // The closing brace of a non-empty block starts its own line.
            let non_empty = matches!(
                ctx.cursor().node(),
                Some(Tree::Block(block)) if !block.statements.is_empty()
            );
            if non_empty && !space.contains_newline() && space.comments.is_empty() {
                return Arc::new(Space::whitespace_only("\n"));
            }
            return space.clone();
        }
        if !is_node_prefix(loc) {
            return space.clone();
        }
        let in_block = parent_kind(ctx) == Some(NodeKind::Block);
        let is_statement = ctx
            .cursor()
            .node()
            .is_some_and(|node| node.has_capability(Capability::Statement));
        if in_block && is_statement {
            if space.contains_newline() {
                return space.clone();
            }
            let mut whitespace = String::from("\n");
            whitespace.push_str(space.whitespace.trim_start_matches([' ', '\t']));
            return Arc::new(Space::new(whitespace, space.comments.clone()));
        }
        if loc == SpaceLoc::BlockPrefix
            && !space.contains_newline()
            && space.comments.is_empty()
            && space.whitespace != " "
        {
            return Arc::new(Space::whitespace_only(" "));
        }
        space.clone()
    }
}
