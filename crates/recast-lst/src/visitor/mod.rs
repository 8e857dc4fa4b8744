// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor infrastructure for LST traversal and transformation.
//!
//! A visitor defines `visit_*` methods per node variant; the generic driver
//! ([`visit_tree`]) adds cursor management and role reduction on top. The
//! identity-preservation contract holds throughout: a visitor that touches
//! nothing returns the original tree, and any untouched subtree of a
//! transformed tree is reference-identical to the input's.
//!
//! # Example
//!
//! ```
//! use recast_lst::visitor::{LstVisitor, VisitCtx};
//! use recast_lst::nodes::{Ident, Tree};
//! use std::sync::Arc;
//!
//! struct CountIdents {
//!     count: usize,
//! }
//!
//! impl LstVisitor for CountIdents {
//!     fn visit_ident(&mut self, node: &Arc<Ident>, ctx: &mut VisitCtx) -> Tree {
//!         self.count += 1;
//!         recast_lst::visitor::walk_ident(self, node, ctx)
//!     }
//! }
//! ```

mod dispatch;
mod traits;
mod walk;

pub use dispatch::{
    run_visitor, visit_block_slot, visit_expression_slot, visit_ident_slot,
    visit_named_variable_slot, visit_parens_slot, visit_statement_slot, visit_tree,
    visit_type_tree_slot,
};
pub use traits::{LstVisitor, SpaceLoc, VisitCtx};
pub use walk::{
    walk_assignment, walk_binary, walk_block, walk_call, walk_class_decl, walk_empty,
    walk_field_access, walk_ident, walk_if, walk_literal, walk_method_decl, walk_module,
    walk_named_variable, walk_parens, walk_return, walk_unary, walk_variable_decls,
    walk_while_loop,
};
