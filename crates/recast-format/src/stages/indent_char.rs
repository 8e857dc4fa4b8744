// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Indentation character normalization: tabs to spaces or spaces to tabs,
//! applied to the indent runs that follow line breaks. Whitespace before
//! the first line break (same-line padding and alignment) is left alone.

use std::sync::Arc;

use recast_lst::trivia::Space;
use recast_lst::visitor::{LstVisitor, SpaceLoc, VisitCtx};

use super::map_space;
use crate::FormatStyle;

/// Rewrites indent runs to use the configured indentation character.
pub struct NormalizeIndentChar {
    use_tabs: bool,
    indent_width: usize,
}

impl NormalizeIndentChar {
    pub fn new(style: &FormatStyle) -> Self {
        Self {
            use_tabs: style.use_tabs,
            indent_width: style.indent_width,
        }
    }

    fn convert(&self, segment: &str) -> String {
        if !self.use_tabs {
            return segment.replace('\t', &" ".repeat(self.indent_width));
        }
        // Spaces to tabs: each full group of indent_width leading spaces
        // becomes one tab; a trailing partial group is kept as spaces.
        let mut out = String::new();
        let mut pending = 0usize;
        for ch in segment.chars() {
            match ch {
                ' ' => {
                    pending += 1;
                    if pending == self.indent_width {
                        out.push('\t');
                        pending = 0;
                    }
                }
                '\t' => {
                    out.push_str(&" ".repeat(pending));
                    pending = 0;
                    out.push('\t');
                }
                other => {
                    out.push_str(&" ".repeat(pending));
                    pending = 0;
                    out.push(other);
                }
            }
        }
        out.push_str(&" ".repeat(pending));
        out
    }
}

impl LstVisitor for NormalizeIndentChar {
    fn visit_space(&mut self, space: &Arc<Space>, loc: SpaceLoc, ctx: &mut VisitCtx) -> Arc<Space> {
        let _ = (loc, ctx);
        map_space(space, |run| {
            if !run.contains('\n') {
                return run.to_string();
            }
            let mut segments = run.split('\n');
            let mut out = String::new();
            if let Some(first) = segments.next() {
                out.push_str(first);
            }
            for segment in segments {
                out.push('\n');
                out.push_str(&self.convert(segment));
            }
            out
        })
    }
}
