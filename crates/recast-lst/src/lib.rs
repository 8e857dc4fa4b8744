// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A Lossless Semantic Tree (LST) library.
//!
//! This crate provides the core of a source-to-source transformation
//! engine: an immutable tree model that stores every byte of original
//! whitespace and comment trivia alongside semantic structure, a
//! double-dispatch visitor/cursor framework for rewriting it, and the
//! interning caches that keep repeated trivia, identifiers, and type
//! descriptors shared.
//!
//! # Overview
//!
//! - **Nodes** ([`nodes`]): the closed variant set, structurally shared
//!   behind [`std::sync::Arc`]. Nodes are never mutated; `with_*`
//!   derivations copy with identity preserved.
//! - **Trivia** ([`trivia`]): [`trivia::Space`] values interned by a
//!   session-scoped [`trivia::SpaceCache`].
//! - **Visitors** ([`visitor`]): transformations that rebuild only what
//!   they touch — an untouched subtree of the output is reference-identical
//!   to the input, so "did anything change" is an O(1) check.
//! - **Cursor** ([`cursor`]): an external path from a node to the root for
//!   scope queries and inter-pass messages.
//! - **Printing** ([`codegen`]): a pure fold that reproduces the original
//!   source exactly for an unmodified tree.
//! - **Persistence** ([`serialize`]): an identity-preserving encoding where
//!   interned instances are written once and back-referenced.
//!
//! # Quick start
//!
//! ```
//! use recast_lst::{print, BuildSession};
//! use recast_lst::nodes::{Ident, Tree};
//! use std::sync::Arc;
//!
//! let session = BuildSession::new();
//! let tree = Tree::Ident(Arc::new(Ident::new(
//!     session.spaces.whitespace(" "),
//!     session.symbols.intern("x", None),
//! )));
//! assert_eq!(print(&tree), " x");
//! ```
//!
//! Parsers for concrete source dialects are external collaborators: they
//! own a [`BuildSession`] and produce trees through the node constructors,
//! accounting for every input byte in exactly one trivia slot.

pub mod codegen;
pub mod cursor;
pub mod intern;
pub mod nodes;
pub mod serialize;
pub mod trivia;
pub mod visitor;

pub use codegen::{print, Codegen, CodegenState};
pub use cursor::{Cursor, CursorValue};
pub use intern::{InternMode, SymbolCache, TypeHandle, TypeRecord, TypeTable};
pub use nodes::{Capability, Expression, NodeId, NodeKind, Statement, Tree, TypeTree};
pub use serialize::{decode, encode, DecodeError};
pub use trivia::{Comment, Space, SpaceCache};
pub use visitor::{run_visitor, LstVisitor, SpaceLoc, VisitCtx};

/// The caches a construction session owns: trivia, symbols, and types.
///
/// Cache lifetime is an explicit choice of whoever parses or builds trees
/// — typically one session per parsed source set — rather than ambient
/// process-wide state. Sharing a session across threads is safe; interning
/// serializes internally.
#[derive(Debug)]
pub struct BuildSession {
    pub spaces: SpaceCache,
    pub symbols: SymbolCache,
    pub types: TypeTable,
}

impl BuildSession {
    /// A session with strict type interning.
    pub fn new() -> Self {
        Self::with_mode(InternMode::Strict)
    }

    /// A session with the given type-interning mode.
    pub fn with_mode(mode: InternMode) -> Self {
        Self {
            spaces: SpaceCache::new(),
            symbols: SymbolCache::new(),
            types: TypeTable::new(mode),
        }
    }
}

impl Default for BuildSession {
    fn default() -> Self {
        Self::new()
    }
}
