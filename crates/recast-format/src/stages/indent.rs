// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Indentation depth.
//!
//! Statements that start on their own line are re-indented to one indent
//! unit per enclosing block; a block's closing brace aligns with the
//! statement that owns the block. Depth comes from the cursor, which is
//! also what lets a scoped reformat of a synthesized fragment inherit the
//! depth of its insertion point: the traversal is seeded with the cursor
//! chain above the fragment.

use std::sync::Arc;

use recast_lst::nodes::Capability;
use recast_lst::trivia::Space;
use recast_lst::visitor::{LstVisitor, SpaceLoc, VisitCtx};

use super::{enclosing_blocks, in_statement_position, is_node_prefix, map_space};
use crate::FormatStyle;

/// Rewrites line-start indentation to match block depth.
pub struct TabsAndIndents {
    unit: String,
}

impl TabsAndIndents {
    pub fn new(style: &FormatStyle) -> Self {
        Self {
            unit: style.indent_unit(),
        }
    }

    fn reindent(&self, space: &Arc<Space>, depth: usize) -> Arc<Space> {
        let indent = self.unit.repeat(depth);
        map_space(space, |run| match run.rfind('\n') {
            Some(idx) => {
                let mut out = run[..=idx].to_string();
                out.push_str(&indent);
                out
            }
            None => run.to_string(),
        })
    }
}

impl LstVisitor for TabsAndIndents {
    fn visit_space(&mut self, space: &Arc<Space>, loc: SpaceLoc, ctx: &mut VisitCtx) -> Arc<Space> {
        if loc == SpaceLoc::BlockEnd {
            if !space.contains_newline() {
                return space.clone();
            }
            return self.reindent(space, enclosing_blocks(ctx));
        }
        if !is_node_prefix(loc) || !space.contains_newline() {
            return space.clone();
        }
        let is_statement = ctx
            .cursor()
            .node()
            .is_some_and(|node| node.has_capability(Capability::Statement));
        if !is_statement || !in_statement_position(ctx) {
            return space.clone();
        }
        self.reindent(space, enclosing_blocks(ctx))
    }
}
