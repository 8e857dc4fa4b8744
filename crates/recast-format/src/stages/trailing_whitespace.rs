// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Trailing-whitespace removal: strip spaces and tabs that sit directly
//! before a line break. The final segment of a run is the current line's
//! indent and is kept.

use std::sync::Arc;

use recast_lst::trivia::Space;
use recast_lst::visitor::{LstVisitor, SpaceLoc, VisitCtx};

use super::map_space;

/// Removes whitespace immediately preceding line breaks.
#[derive(Default)]
pub struct RemoveTrailingWhitespace;

impl RemoveTrailingWhitespace {
    pub fn new() -> Self {
        Self
    }
}

impl LstVisitor for RemoveTrailingWhitespace {
    fn visit_space(&mut self, space: &Arc<Space>, loc: SpaceLoc, ctx: &mut VisitCtx) -> Arc<Space> {
        let _ = (loc, ctx);
        map_space(space, |run| {
            if !run.contains('\n') {
                return run.to_string();
            }
            let segments: Vec<&str> = run.split('\n').collect();
            let last = segments.len() - 1;
            segments
                .iter()
                .enumerate()
                .map(|(i, segment)| {
                    if i == last {
                        *segment
                    } else {
                        segment.trim_end_matches([' ', '\t'])
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
    }
}
