// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The autoformat pipeline stages.
//!
//! Each stage is a single-purpose visitor: a pure tree-to-tree transform
//! responsible for exactly one formatting concern. Stages run strictly in
//! the order fixed by [`crate::autoformat`], because later stages assume
//! earlier stages' normalization.

mod blank_lines;
mod indent;
mod indent_char;
mod line_endings;
mod min_spacing;
mod spaces;
mod trailing_whitespace;
mod wrapping;

pub use blank_lines::BlankLines;
pub use indent::TabsAndIndents;
pub use indent_char::NormalizeIndentChar;
pub use line_endings::NormalizeLineEndings;
pub use min_spacing::MinimumViableSpacing;
pub use spaces::Spaces;
pub use trailing_whitespace::RemoveTrailingWhitespace;
pub use wrapping::WrappingAndBraces;

use std::sync::Arc;

use recast_lst::nodes::NodeKind;
use recast_lst::trivia::{Comment, Space};
use recast_lst::visitor::{SpaceLoc, VisitCtx};

/// Apply a text transform to every whitespace run in a space (the leading
/// whitespace and each comment suffix). Returns the original instance when
/// nothing changes.
pub(crate) fn map_space(space: &Arc<Space>, mut f: impl FnMut(&str) -> String) -> Arc<Space> {
    let whitespace = f(&space.whitespace);
    let comments: Vec<Comment> = space
        .comments
        .iter()
        .map(|c| Comment::new(c.text.clone(), f(&c.suffix), c.multiline))
        .collect();
    if whitespace == space.whitespace && comments == space.comments {
        space.clone()
    } else {
        Arc::new(Space::new(whitespace, comments))
    }
}

/// Replace a pure-padding space with the wanted run. Spaces that carry
/// comments or line breaks are left alone — padding policy never destroys
/// line structure or comments.
pub(crate) fn set_pad(space: &Arc<Space>, want: &str) -> Arc<Space> {
    if space.comments.is_empty()
        && !space.whitespace.contains('\n')
        && space.whitespace != want
    {
        Arc::new(Space::whitespace_only(want))
    } else {
        space.clone()
    }
}

/// True for the trivia slot that is a node's own leading prefix.
pub(crate) fn is_node_prefix(loc: SpaceLoc) -> bool {
    matches!(
        loc,
        SpaceLoc::IdentPrefix
            | SpaceLoc::FieldAccessPrefix
            | SpaceLoc::LiteralPrefix
            | SpaceLoc::UnaryPrefix
            | SpaceLoc::BinaryPrefix
            | SpaceLoc::AssignmentPrefix
            | SpaceLoc::CallPrefix
            | SpaceLoc::ParensPrefix
            | SpaceLoc::EmptyPrefix
            | SpaceLoc::BlockPrefix
            | SpaceLoc::IfPrefix
            | SpaceLoc::WhilePrefix
            | SpaceLoc::ReturnPrefix
            | SpaceLoc::VariableDeclsPrefix
            | SpaceLoc::NamedVariablePrefix
            | SpaceLoc::MethodPrefix
            | SpaceLoc::ClassPrefix
    )
}

/// The kind of the node enclosing the one currently being visited.
pub(crate) fn parent_kind(ctx: &VisitCtx) -> Option<NodeKind> {
    let mut path = ctx.cursor().path_to_root();
    path.next();
    path.next().map(|tree| tree.kind())
}

/// True when the node being visited sits in statement position: it is a
/// direct child of a block or the module.
pub(crate) fn in_statement_position(ctx: &VisitCtx) -> bool {
    matches!(parent_kind(ctx), Some(NodeKind::Block) | Some(NodeKind::Module))
}

/// Number of blocks enclosing the node currently being visited.
pub(crate) fn enclosing_blocks(ctx: &VisitCtx) -> usize {
    ctx.cursor()
        .path_to_root()
        .skip(1)
        .filter(|tree| tree.kind() == NodeKind::Block)
        .count()
}
