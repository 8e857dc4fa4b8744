// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Line-ending normalization.

use std::sync::Arc;

use recast_lst::trivia::Space;
use recast_lst::visitor::{LstVisitor, SpaceLoc, VisitCtx};

use super::map_space;
use crate::FormatStyle;

/// Rewrites every line break to the configured sequence.
pub struct NormalizeLineEndings {
    newline: String,
}

impl NormalizeLineEndings {
    pub fn new(style: &FormatStyle) -> Self {
        Self {
            newline: style.newline.clone(),
        }
    }
}

impl LstVisitor for NormalizeLineEndings {
    fn visit_space(&mut self, space: &Arc<Space>, loc: SpaceLoc, ctx: &mut VisitCtx) -> Arc<Space> {
        let _ = (loc, ctx);
        map_space(space, |run| {
            let unified = run.replace("\r\n", "\n").replace('\r', "\n");
            if self.newline == "\n" {
                unified
            } else {
                unified.replace('\n', &self.newline)
            }
        })
    }
}
