// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Blank-line policy: clamp runs of consecutive blank lines.

use std::sync::Arc;

use recast_lst::trivia::Space;
use recast_lst::visitor::{LstVisitor, SpaceLoc, VisitCtx};

use super::map_space;
use crate::FormatStyle;

/// Reduces any run of more than `max_blank_lines` blank lines to exactly
/// that many, preserving the indentation that follows the run.
pub struct BlankLines {
    max_blank_lines: usize,
}

impl BlankLines {
    pub fn new(style: &FormatStyle) -> Self {
        Self {
            max_blank_lines: style.max_blank_lines,
        }
    }
}

impl LstVisitor for BlankLines {
    fn visit_space(&mut self, space: &Arc<Space>, loc: SpaceLoc, ctx: &mut VisitCtx) -> Arc<Space> {
        let _ = (loc, ctx);
        let max_newlines = self.max_blank_lines + 1;
        map_space(space, |run| {
            let newlines = run.matches('\n').count();
            if newlines <= max_newlines {
                return run.to_string();
            }
            let indent = match run.rfind('\n') {
                Some(idx) => &run[idx + 1..],
                None => "",
            };
            let mut clamped = "\n".repeat(max_newlines);
            clamped.push_str(indent);
            clamped
        })
    }
}
