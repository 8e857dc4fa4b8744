// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Cursors: externally held paths from a node up to the tree root.
//!
//! A cursor is a singly linked chain of frames. Nodes never store cursors
//! (or parent pointers); the traversal driver builds the chain as it
//! descends and hands each visit the cursor for the node being visited.
//! Pushing a frame is O(1) — the new frame points at the existing parent
//! chain, nothing is copied.
//!
//! Frames also carry key/value messages. One traversal phase can leave a
//! message on an enclosing frame for a later phase to read (for example
//! "stop rewriting past this point") without any process-wide mutable
//! state; messages live exactly as long as the cursor chain that holds them.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::nodes::{Capability, NodeKind, Tree};

/// What a cursor frame points at: the synthetic root above the tree, or a
/// node on the path.
#[derive(Debug, Clone)]
pub enum CursorValue {
    Root,
    Node(Tree),
}

#[derive(Debug)]
struct Frame {
    parent: Option<Cursor>,
    value: CursorValue,
    messages: RefCell<HashMap<String, Value>>,
}

/// A read-only path from a node to the tree root.
#[derive(Debug, Clone)]
pub struct Cursor {
    frame: Rc<Frame>,
}

impl Cursor {
    /// The synthetic frame above a tree's root node.
    pub fn root() -> Self {
        Self {
            frame: Rc::new(Frame {
                parent: None,
                value: CursorValue::Root,
                messages: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Push a child frame. O(1): the new frame links to `self`.
    pub fn child(&self, node: Tree) -> Cursor {
        Self {
            frame: Rc::new(Frame {
                parent: Some(self.clone()),
                value: CursorValue::Node(node),
                messages: RefCell::new(HashMap::new()),
            }),
        }
    }

    pub fn parent(&self) -> Option<Cursor> {
        self.frame.parent.clone()
    }

    pub fn value(&self) -> &CursorValue {
        &self.frame.value
    }

    /// The node this frame points at, unless this is the root frame.
    pub fn node(&self) -> Option<&Tree> {
        match &self.frame.value {
            CursorValue::Node(tree) => Some(tree),
            CursorValue::Root => None,
        }
    }

    /// Lazy sequence of the nodes on the path, from this frame's node up to
    /// the tree root. Finite and non-restartable.
    pub fn path_to_root(&self) -> PathToRoot {
        PathToRoot {
            next: Some(self.clone()),
        }
    }

    /// Nearest enclosing node (including this frame's own) of the given
    /// variant; `None` when no ancestor matches.
    pub fn first_enclosing(&self, kind: NodeKind) -> Option<Tree> {
        self.path_to_root().find(|tree| tree.kind() == kind)
    }

    /// Nearest enclosing node declaring the given capability.
    pub fn first_enclosing_capability(&self, cap: Capability) -> Option<Tree> {
        self.path_to_root().find(|tree| tree.has_capability(cap))
    }

    /// Attach a message to this frame.
    pub fn put_message(&self, key: impl Into<String>, value: Value) {
        self.frame.messages.borrow_mut().insert(key.into(), value);
    }

    /// Attach a message to the nearest frame (including this one) whose
    /// node satisfies the predicate. Returns false when no frame matches.
    pub fn put_message_on_first_enclosing(
        &self,
        pred: impl Fn(&Tree) -> bool,
        key: impl Into<String>,
        value: Value,
    ) -> bool {
        let mut current = Some(self.clone());
        while let Some(cursor) = current {
            if let Some(node) = cursor.node() {
                if pred(node) {
                    cursor.put_message(key, value);
                    return true;
                }
            }
            current = cursor.parent();
        }
        false
    }

    /// Read a message from this frame only.
    pub fn message(&self, key: &str) -> Option<Value> {
        self.frame.messages.borrow().get(key).cloned()
    }

    /// Read the nearest message with the given key, walking toward the root.
    pub fn nearest_message(&self, key: &str) -> Option<Value> {
        let mut current = Some(self.clone());
        while let Some(cursor) = current {
            if let Some(value) = cursor.message(key) {
                return Some(value);
            }
            current = cursor.parent();
        }
        None
    }

    /// Number of node frames between this frame and the root, inclusive of
    /// this frame's own node.
    pub fn depth(&self) -> usize {
        self.path_to_root().count()
    }
}

/// Iterator over the nodes from a cursor up to the tree root.
pub struct PathToRoot {
    next: Option<Cursor>,
}

impl Iterator for PathToRoot {
    type Item = Tree;

    fn next(&mut self) -> Option<Tree> {
        while let Some(cursor) = self.next.take() {
            self.next = cursor.parent();
            if let Some(node) = cursor.node() {
                return Some(node.clone());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::SymbolCache;
    use crate::nodes::{Block, Empty, Ident, Statement, RightPadded};
    use crate::trivia::Space;
    use serde_json::json;
    use std::sync::Arc;

    fn empty_space() -> Arc<Space> {
        Arc::new(Space::whitespace_only(""))
    }

    fn sample_chain() -> (Cursor, Tree, Tree) {
        let symbols = SymbolCache::new();
        let ident = Tree::Ident(Arc::new(Ident::new(
            empty_space(),
            symbols.intern("x", None),
        )));
        let block = Tree::Block(Arc::new(Block::new(
            empty_space(),
            vec![RightPadded::new(
                Statement::Empty(Arc::new(Empty::new(empty_space()))),
                empty_space(),
            )],
            empty_space(),
        )));
        let root = Cursor::root();
        let cursor = root.child(block.clone()).child(ident.clone());
        (cursor, block, ident)
    }

    #[test]
    fn path_to_root_walks_ancestors_in_order() {
        let (cursor, block, ident) = sample_chain();
        let path: Vec<Tree> = cursor.path_to_root().collect();
        assert_eq!(path.len(), 2);
        assert!(path[0].ptr_eq(&ident));
        assert!(path[1].ptr_eq(&block));
    }

    #[test]
    fn first_enclosing_finds_nearest_match_or_none() {
        let (cursor, block, _) = sample_chain();
        let found = cursor.first_enclosing(NodeKind::Block).expect("block above");
        assert!(found.ptr_eq(&block));
        assert!(cursor.first_enclosing(NodeKind::ClassDecl).is_none());
        assert!(cursor
            .first_enclosing_capability(Capability::Statement)
            .expect("block is a statement")
            .ptr_eq(&block));
    }

    #[test]
    fn messages_attach_to_nearest_matching_frame() {
        let (cursor, _, _) = sample_chain();
        let attached = cursor.put_message_on_first_enclosing(
            |tree| tree.kind() == NodeKind::Block,
            "stop",
            json!(true),
        );
        assert!(attached);
        // Not on the leaf frame itself.
        assert!(cursor.message("stop").is_none());
        // Visible walking upward.
        assert_eq!(cursor.nearest_message("stop"), Some(json!(true)));
        // A predicate nothing matches reports failure.
        assert!(!cursor.put_message_on_first_enclosing(
            |tree| tree.kind() == NodeKind::ClassDecl,
            "unused",
            json!(1),
        ));
    }

    #[test]
    fn messages_die_with_the_chain() {
        let (cursor, block, _) = sample_chain();
        cursor.put_message_on_first_enclosing(
            |tree| tree.kind() == NodeKind::Block,
            "stop",
            json!(true),
        );
        drop(cursor);
        // A fresh chain over the same nodes has no messages.
        let fresh = Cursor::root().child(block);
        assert!(fresh.nearest_message("stop").is_none());
    }
}
