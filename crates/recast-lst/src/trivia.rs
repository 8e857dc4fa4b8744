// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Trivia model and flyweight store.
//!
//! Every LST node carries a [`Space`]: the whitespace and comments that
//! appeared immediately before the node's first token in the original
//! source. Printing a node emits its space verbatim, which is what makes the
//! tree lossless.
//!
//! Most nodes in a real source file share one of a small number of distinct
//! spaces (`""`, `" "`, a newline plus the file's indent, ...), so spaces are
//! interned behind [`Arc`] by a [`SpaceCache`] owned by the construction
//! session. Structural sharing also makes "did this space change" an
//! `Arc::ptr_eq` check.

use std::sync::Arc;

use dashmap::DashSet;

/// A single comment plus the whitespace that follows it, up to and including
/// the newline (for line comments) or the next token (for block comments).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Comment {
    /// The comment text, verbatim, including its delimiters.
    pub text: String,
    /// Whitespace between this comment and whatever comes next.
    pub suffix: String,
    /// True for block (`/* ... */`) comments.
    pub multiline: bool,
}

impl Comment {
    pub fn new(text: impl Into<String>, suffix: impl Into<String>, multiline: bool) -> Self {
        Self {
            text: text.into(),
            suffix: suffix.into(),
            multiline,
        }
    }
}

/// Leading trivia for a node: whitespace followed by zero or more comments.
///
/// The `whitespace` field holds the bytes before the first comment (or before
/// the node's first token when there are no comments); each comment owns the
/// whitespace that follows it in its `suffix`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Space {
    pub whitespace: String,
    pub comments: Vec<Comment>,
}

impl Space {
    pub fn new(whitespace: impl Into<String>, comments: Vec<Comment>) -> Self {
        Self {
            whitespace: whitespace.into(),
            comments,
        }
    }

    /// A space containing only whitespace, no comments.
    pub fn whitespace_only(whitespace: impl Into<String>) -> Self {
        Self::new(whitespace, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.whitespace.is_empty() && self.comments.is_empty()
    }

    /// The whitespace run that directly precedes the node's first token:
    /// the last comment's suffix, or `whitespace` when there are no comments.
    pub fn last_whitespace(&self) -> &str {
        match self.comments.last() {
            Some(c) => &c.suffix,
            None => &self.whitespace,
        }
    }

    /// The indentation this space establishes: everything after the last
    /// newline of [`Space::last_whitespace`], or the whole run when it
    /// contains no newline.
    pub fn indent(&self) -> &str {
        let ws = self.last_whitespace();
        match memchr::memrchr(b'\n', ws.as_bytes()) {
            Some(idx) => &ws[idx + 1..],
            None => ws,
        }
    }

    pub fn contains_newline(&self) -> bool {
        self.whitespace.contains('\n') || self.comments.iter().any(|c| c.suffix.contains('\n'))
    }
}

/// Flyweight store for [`Space`] values.
///
/// `intern` collapses structurally equal spaces to one shared instance. The
/// cache is owned by whoever is constructing trees (a parser session, a test)
/// rather than being process-wide state; it is safe to share across threads.
#[derive(Debug)]
pub struct SpaceCache {
    spaces: DashSet<Arc<Space>>,
    empty: Arc<Space>,
    single: Arc<Space>,
    newline: Arc<Space>,
}

impl SpaceCache {
    pub fn new() -> Self {
        let spaces = DashSet::new();
        let empty = Arc::new(Space::whitespace_only(""));
        let single = Arc::new(Space::whitespace_only(" "));
        let newline = Arc::new(Space::whitespace_only("\n"));
        spaces.insert(empty.clone());
        spaces.insert(single.clone());
        spaces.insert(newline.clone());
        Self {
            spaces,
            empty,
            single,
            newline,
        }
    }

    /// Canonicalize a space, returning the shared instance for its value.
    pub fn intern(&self, space: Space) -> Arc<Space> {
        loop {
            if let Some(existing) = self.spaces.get(&space) {
                return existing.key().clone();
            }
            let arc = Arc::new(space.clone());
            if self.spaces.insert(arc.clone()) {
                return arc;
            }
            // Lost a race with a concurrent insert of the same value; retry
            // the lookup so both callers end up with the stored instance.
        }
    }

    /// Intern a comment-free whitespace run.
    pub fn whitespace(&self, ws: &str) -> Arc<Space> {
        match ws {
            "" => self.empty.clone(),
            " " => self.single.clone(),
            "\n" => self.newline.clone(),
            _ => self.intern(Space::whitespace_only(ws)),
        }
    }

    pub fn empty(&self) -> Arc<Space> {
        self.empty.clone()
    }

    pub fn single_space(&self) -> Arc<Space> {
        self.single.clone()
    }

    pub fn newline(&self) -> Arc<Space> {
        self.newline.clone()
    }

    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }
}

impl Default for SpaceCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_converges_to_one_instance() {
        let cache = SpaceCache::new();
        let a = cache.intern(Space::whitespace_only("\n    "));
        let b = cache.intern(Space::whitespace_only("\n    "));
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn intern_distinguishes_comments() {
        let cache = SpaceCache::new();
        let plain = cache.intern(Space::whitespace_only(" "));
        let commented = cache.intern(Space::new(
            " ",
            vec![Comment::new("// note", "\n", false)],
        ));
        assert!(!Arc::ptr_eq(&plain, &commented));
        assert_eq!(plain.whitespace, commented.whitespace);
    }

    #[test]
    fn common_spaces_are_preseeded() {
        let cache = SpaceCache::new();
        assert!(Arc::ptr_eq(&cache.empty(), &cache.whitespace("")));
        assert!(Arc::ptr_eq(&cache.single_space(), &cache.whitespace(" ")));
        assert!(Arc::ptr_eq(&cache.newline(), &cache.whitespace("\n")));
    }

    #[test]
    fn indent_is_text_after_last_newline() {
        let space = Space::whitespace_only("\n\n    ");
        assert_eq!(space.indent(), "    ");

        let no_newline = Space::whitespace_only("  ");
        assert_eq!(no_newline.indent(), "  ");

        let commented = Space::new(
            "\n",
            vec![Comment::new("// c", "\n\t", false)],
        );
        assert_eq!(commented.indent(), "\t");
    }

    #[test]
    fn last_whitespace_prefers_comment_suffix() {
        let commented = Space::new(" ", vec![Comment::new("/* x */", "  ", true)]);
        assert_eq!(commented.last_whitespace(), "  ");
        assert!(!commented.contains_newline());
    }
}
