// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Core identity and padding types shared by all LST nodes.
//!
//! # Node identity
//!
//! [`NodeId`] provides stable identity for LST nodes. An id is assigned once
//! at construction and preserved by every `with_*` derivation, so external
//! markers and annotations can stay keyed to a node across any number of
//! tree versions. Ids never identify structure; reference equality
//! (`Arc::ptr_eq`) is the change-detection primitive, ids are the stable
//! name.
//!
//! # Padded children
//!
//! Delimiter tokens (the comma after an argument, the `=` of an
//! initializer, the closing parenthesis) have no semantic node of their own,
//! but the trivia around them must survive a round trip. Padded wrappers
//! give that trivia a slot:
//!
//! - [`LeftPadded`] — trivia before a delimiter that precedes the element
//!   (`= value`, `else ...`, `.name`).
//! - [`RightPadded`] — trivia after an element, before a following
//!   delimiter (`arg ,`, `stmt ;`).
//! - [`Container`] — a delimited, ordered element sequence (`( a, b )`),
//!   holding the trivia before the opening delimiter plus right-padded
//!   elements.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::trivia::Space;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// A stable, globally unique identifier for an LST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Draw a fresh id. Ids are process-unique and monotonically increasing.
    pub fn fresh() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Make sure future [`NodeId::fresh`] calls stay above `id`. Called when
    /// trees with pre-assigned ids are loaded from persistence.
    pub fn ensure_above(id: u64) {
        NEXT_NODE_ID.fetch_max(id + 1, Ordering::Relaxed);
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// An element preceded by trivia for a delimiter token in front of it.
#[derive(Debug, Clone)]
pub struct LeftPadded<T> {
    /// Trivia before the delimiter token.
    pub before: Arc<Space>,
    pub element: T,
}

impl<T> LeftPadded<T> {
    pub fn new(before: Arc<Space>, element: T) -> Self {
        Self { before, element }
    }

    pub fn with_before(self, before: Arc<Space>) -> Self {
        Self { before, ..self }
    }

    pub fn with_element(self, element: T) -> Self {
        Self { element, ..self }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LeftPadded<U> {
        LeftPadded {
            before: self.before,
            element: f(self.element),
        }
    }
}

/// An element followed by trivia for a delimiter token after it.
#[derive(Debug, Clone)]
pub struct RightPadded<T> {
    pub element: T,
    /// Trivia between the element and the delimiter token.
    pub after: Arc<Space>,
}

impl<T> RightPadded<T> {
    pub fn new(element: T, after: Arc<Space>) -> Self {
        Self { element, after }
    }

    pub fn with_element(self, element: T) -> Self {
        Self { element, ..self }
    }

    pub fn with_after(self, after: Arc<Space>) -> Self {
        Self { after, ..self }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RightPadded<U> {
        RightPadded {
            element: f(self.element),
            after: self.after,
        }
    }
}

/// A delimited, ordered sequence of right-padded elements.
///
/// Element order is semantically significant and preserved exactly,
/// including each element's delimiter trivia.
#[derive(Debug, Clone)]
pub struct Container<T> {
    /// Trivia before the opening delimiter.
    pub before: Arc<Space>,
    pub elements: Vec<RightPadded<T>>,
}

impl<T> Container<T> {
    pub fn new(before: Arc<Space>, elements: Vec<RightPadded<T>>) -> Self {
        Self { before, elements }
    }

    pub fn with_elements(self, elements: Vec<RightPadded<T>>) -> Self {
        Self { elements, ..self }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RightPadded<T>> {
        self.elements.iter()
    }
}

impl<'c, T> IntoIterator for &'c Container<T> {
    type Item = &'c RightPadded<T>;
    type IntoIter = std::slice::Iter<'c, RightPadded<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_unique_and_increasing() {
        let a = NodeId::fresh();
        let b = NodeId::fresh();
        assert!(b > a);
        assert_ne!(a, b);
    }

    #[test]
    fn ensure_above_guards_loaded_ids() {
        let loaded = NodeId::fresh().as_u64() + 1000;
        NodeId::ensure_above(loaded);
        assert!(NodeId::fresh().as_u64() > loaded);
    }

    #[test]
    fn padded_map_preserves_trivia() {
        let space = Arc::new(Space::whitespace_only(" "));
        let padded = RightPadded::new(1, space.clone()).map(|n| n + 1);
        assert_eq!(padded.element, 2);
        assert!(Arc::ptr_eq(&padded.after, &space));
    }
}
