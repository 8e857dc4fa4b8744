// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Interning caches for semantic types and identifiers.
//!
//! Type descriptors live in an arena of [`TypeRecord`]s addressed by
//! [`TypeHandle`]; nodes carry handles, never records. Interning collapses
//! structurally equal records to one handle so a type mentioned thousands of
//! times across a program is stored once.
//!
//! Cyclic type graphs (a class referencing itself through a member or its
//! supertype) are built through a [`TypeRecord::Shallow`] placeholder that
//! compares by name only; once the referenced type is fully built the
//! placeholder is resolved to the real record via [`TypeTable::resolve_shallow`].
//!
//! Two interning modes exist. `Strict` compares full structure before
//! reusing an existing record and stores contradictory same-named records as
//! distinct entries. `Relaxed` trades precision for a bounded footprint:
//! when a lookup only has a name to go on, any previously stored candidate
//! for that name may be returned.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock};

use dashmap::DashSet;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Handle addressing a record in a [`TypeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeHandle(pub u32);

impl TypeHandle {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHandle({})", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Boolean,
    Int,
    Float,
    String,
    Null,
    Void,
}

impl PrimitiveKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Float => "float",
            PrimitiveKind::String => "string",
            PrimitiveKind::Null => "null",
            PrimitiveKind::Void => "void",
        }
    }
}

/// A member slot of a class type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub tpe: TypeHandle,
}

/// A semantic type descriptor.
///
/// Handles embedded in a record address the same table the record lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRecord {
    Primitive(PrimitiveKind),
    Array {
        elem: TypeHandle,
    },
    Class {
        name: String,
        supertype: Option<TypeHandle>,
        members: Vec<Member>,
    },
    Method {
        name: String,
        declaring: Option<TypeHandle>,
        return_tpe: Option<TypeHandle>,
        parameters: Vec<TypeHandle>,
    },
    /// A type known only by name; placeholder that breaks cycles during
    /// construction and compares by name alone.
    Shallow {
        name: String,
    },
    /// Redirect left behind when a shallow placeholder is resolved or a
    /// decoded record is unified with an existing one.
    Link(TypeHandle),
}

impl TypeRecord {
    /// The name this record is indexed under, used to find interning
    /// candidates. Structure-only records key on their shape.
    fn name_key(&self) -> String {
        match self {
            TypeRecord::Primitive(kind) => kind.keyword().to_string(),
            TypeRecord::Array { elem } => format!("[{}]", elem.0),
            TypeRecord::Class { name, .. } => name.clone(),
            TypeRecord::Method { name, .. } => format!("{}()", name),
            TypeRecord::Shallow { name } => name.clone(),
            TypeRecord::Link(_) => String::new(),
        }
    }
}

/// How [`TypeTable::intern`] matches an incoming record against stored ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternMode {
    /// Full structural comparison; contradictory same-named records are
    /// stored as distinct entries, never silently unified.
    Strict,
    /// Same-named lookups may return any previously stored candidate,
    /// bounding memory at the cost of precision.
    Relaxed,
}

#[derive(Debug, Default)]
struct TableInner {
    records: Vec<TypeRecord>,
    by_name: HashMap<String, Vec<TypeHandle>>,
}

impl TableInner {
    fn canonical(&self, mut handle: TypeHandle) -> TypeHandle {
        while let Some(TypeRecord::Link(target)) = self.records.get(handle.index()) {
            handle = *target;
        }
        handle
    }

    fn record(&self, handle: TypeHandle) -> &TypeRecord {
        let canonical = self.canonical(handle);
        &self.records[canonical.index()]
    }

    /// Coinductive deep equality over handles: a pair already under
    /// comparison is assumed equal, which terminates on cyclic graphs and
    /// equates cycles of matching shape.
    fn handles_eq(&self, a: TypeHandle, b: TypeHandle, seen: &mut HashSet<(u32, u32)>) -> bool {
        let a = self.canonical(a);
        let b = self.canonical(b);
        if a == b {
            return true;
        }
        if !seen.insert((a.0, b.0)) {
            return true;
        }
        let eq = self.records_eq(&self.records[a.index()], &self.records[b.index()], seen);
        seen.remove(&(a.0, b.0));
        eq
    }

    fn opt_handles_eq(
        &self,
        a: Option<TypeHandle>,
        b: Option<TypeHandle>,
        seen: &mut HashSet<(u32, u32)>,
    ) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => self.handles_eq(a, b, seen),
            _ => false,
        }
    }

    fn records_eq(&self, a: &TypeRecord, b: &TypeRecord, seen: &mut HashSet<(u32, u32)>) -> bool {
        use TypeRecord::*;
        match (a, b) {
            // Shallow placeholders compare by name only, against anything
            // named. This is what makes recursion through a cycle terminate
            // during construction.
            (Shallow { name: a }, Shallow { name: b }) => a == b,
            (Shallow { name }, other) | (other, Shallow { name }) => {
                other.name_key() == *name
            }
            (Primitive(a), Primitive(b)) => a == b,
            (Array { elem: a }, Array { elem: b }) => self.handles_eq(*a, *b, seen),
            (
                Class {
                    name: an,
                    supertype: asup,
                    members: am,
                },
                Class {
                    name: bn,
                    supertype: bsup,
                    members: bm,
                },
            ) => {
                an == bn
                    && self.opt_handles_eq(*asup, *bsup, seen)
                    && am.len() == bm.len()
                    && am.iter().zip(bm).all(|(x, y)| {
                        x.name == y.name && self.handles_eq(x.tpe, y.tpe, seen)
                    })
            }
            (
                Method {
                    name: an,
                    declaring: ad,
                    return_tpe: ar,
                    parameters: ap,
                },
                Method {
                    name: bn,
                    declaring: bd,
                    return_tpe: br,
                    parameters: bp,
                },
            ) => {
                an == bn
                    && self.opt_handles_eq(*ad, *bd, seen)
                    && self.opt_handles_eq(*ar, *br, seen)
                    && ap.len() == bp.len()
                    && ap.iter().zip(bp).all(|(x, y)| self.handles_eq(*x, *y, seen))
            }
            _ => false,
        }
    }

    fn push(&mut self, record: TypeRecord, register: bool) -> TypeHandle {
        let handle = TypeHandle(self.records.len() as u32);
        let key = record.name_key();
        self.records.push(record);
        if register {
            self.by_name.entry(key).or_default().push(handle);
        }
        handle
    }
}

/// Arena of interned type records.
///
/// Concurrent lookups and inserts are serialized on one lock; contention is
/// low relative to traversal cost.
#[derive(Debug)]
pub struct TypeTable {
    inner: RwLock<TableInner>,
    mode: InternMode,
}

impl TypeTable {
    pub fn new(mode: InternMode) -> Self {
        Self {
            inner: RwLock::new(TableInner::default()),
            mode,
        }
    }

    pub fn strict() -> Self {
        Self::new(InternMode::Strict)
    }

    pub fn relaxed() -> Self {
        Self::new(InternMode::Relaxed)
    }

    pub fn mode(&self) -> InternMode {
        self.mode
    }

    /// Intern one record, returning the handle of the shared instance.
    ///
    /// In strict mode a structurally equal stored record is reused; a
    /// same-named but contradictory record is stored as an additional
    /// distinct entry under the same name. In relaxed mode the first stored
    /// candidate for the name wins.
    pub fn intern(&self, record: TypeRecord) -> TypeHandle {
        assert!(
            !matches!(record, TypeRecord::Link(_)),
            "links are internal bookkeeping and cannot be interned"
        );
        let mut inner = self.inner.write().expect("type table lock poisoned");
        let key = record.name_key();
        if let Some(candidates) = inner.by_name.get(&key) {
            match self.mode {
                InternMode::Relaxed => {
                    if let Some(first) = candidates.first() {
                        trace!(name = %key, handle = %first, "relaxed intern reuses candidate");
                        return *first;
                    }
                }
                InternMode::Strict => {
                    let candidates = candidates.clone();
                    for candidate in candidates {
                        let stored = inner.record(candidate).clone();
                        let mut seen = HashSet::new();
                        if inner.records_eq(&record, &stored, &mut seen) {
                            return inner.canonical(candidate);
                        }
                    }
                }
            }
        }
        inner.push(record, true)
    }

    /// Intern a whole (possibly cyclic) type graph at once.
    ///
    /// `records` reference each other by local index: a `TypeHandle(i)`
    /// inside a record addresses `records[i]`, not this table. Returns the
    /// table handle for each local index. Records that deep-equal an
    /// existing stored record are unified with it, so re-loading the same
    /// graph converges on the same handles.
    pub fn intern_graph(&self, records: Vec<TypeRecord>) -> Vec<TypeHandle> {
        let mut inner = self.inner.write().expect("type table lock poisoned");
        let base = inner.records.len() as u32;
        let remap = |h: TypeHandle| TypeHandle(h.0 + base);

        // Append the whole batch first so cyclic references resolve, then
        // unify each new record with an older equal one where possible.
        for record in records {
            let remapped = match record {
                TypeRecord::Primitive(kind) => TypeRecord::Primitive(kind),
                TypeRecord::Array { elem } => TypeRecord::Array { elem: remap(elem) },
                TypeRecord::Class {
                    name,
                    supertype,
                    members,
                } => TypeRecord::Class {
                    name,
                    supertype: supertype.map(remap),
                    members: members
                        .into_iter()
                        .map(|m| Member {
                            name: m.name,
                            tpe: remap(m.tpe),
                        })
                        .collect(),
                },
                TypeRecord::Method {
                    name,
                    declaring,
                    return_tpe,
                    parameters,
                } => TypeRecord::Method {
                    name,
                    declaring: declaring.map(remap),
                    return_tpe: return_tpe.map(remap),
                    parameters: parameters.into_iter().map(remap).collect(),
                },
                TypeRecord::Shallow { name } => TypeRecord::Shallow { name },
                TypeRecord::Link(target) => TypeRecord::Link(remap(target)),
            };
            inner.push(remapped, false);
        }

        let count = inner.records.len() as u32 - base;
        let mut out = Vec::with_capacity(count as usize);
        for i in 0..count {
            let handle = TypeHandle(base + i);
            // Canonicalize embedded handles through links created while
            // unifying earlier batch members.
            let canonicalized = {
                let rec = inner.records[handle.index()].clone();
                match rec {
                    TypeRecord::Array { elem } => TypeRecord::Array {
                        elem: inner.canonical(elem),
                    },
                    TypeRecord::Class {
                        name,
                        supertype,
                        members,
                    } => TypeRecord::Class {
                        name,
                        supertype: supertype.map(|h| inner.canonical(h)),
                        members: members
                            .into_iter()
                            .map(|m| Member {
                                name: m.name,
                                tpe: inner.canonical(m.tpe),
                            })
                            .collect(),
                    },
                    TypeRecord::Method {
                        name,
                        declaring,
                        return_tpe,
                        parameters,
                    } => TypeRecord::Method {
                        name,
                        declaring: declaring.map(|h| inner.canonical(h)),
                        return_tpe: return_tpe.map(|h| inner.canonical(h)),
                        parameters: parameters.into_iter().map(|h| inner.canonical(h)).collect(),
                    },
                    other => other,
                }
            };
            inner.records[handle.index()] = canonicalized;

            if matches!(inner.records[handle.index()], TypeRecord::Link(_)) {
                out.push(inner.canonical(handle));
                continue;
            }

            let key = inner.records[handle.index()].name_key();
            let mut unified = None;
            if let Some(candidates) = inner.by_name.get(&key) {
                let candidates: Vec<TypeHandle> =
                    candidates.iter().copied().filter(|c| c.0 < base).collect();
                for candidate in candidates {
                    let mut seen = HashSet::new();
                    if inner.handles_eq(handle, candidate, &mut seen) {
                        unified = Some(inner.canonical(candidate));
                        break;
                    }
                }
            }
            match unified {
                Some(existing) => {
                    inner.records[handle.index()] = TypeRecord::Link(existing);
                    out.push(existing);
                }
                None => {
                    inner.by_name.entry(key).or_default().push(handle);
                    out.push(handle);
                }
            }
        }
        out
    }

    /// Resolve a [`TypeRecord::Shallow`] placeholder to the fully built
    /// record it stood in for. Panics if `shallow` does not address a
    /// shallow record: that is a defect in tree construction.
    pub fn resolve_shallow(&self, shallow: TypeHandle, target: TypeHandle) {
        let mut inner = self.inner.write().expect("type table lock poisoned");
        let target = inner.canonical(target);
        match &inner.records[shallow.index()] {
            TypeRecord::Shallow { .. } => {
                inner.records[shallow.index()] = TypeRecord::Link(target);
            }
            other => panic!(
                "resolve_shallow called on a non-shallow record: {:?}",
                other
            ),
        }
    }

    /// The record a handle addresses, following resolution links.
    pub fn get(&self, handle: TypeHandle) -> TypeRecord {
        let inner = self.inner.read().expect("type table lock poisoned");
        inner.record(handle).clone()
    }

    /// Follow resolution links to the canonical handle.
    pub fn canonical(&self, handle: TypeHandle) -> TypeHandle {
        let inner = self.inner.read().expect("type table lock poisoned");
        inner.canonical(handle)
    }

    /// Deep structural equality between two handles; terminates on cyclic
    /// graphs.
    pub fn deep_eq(&self, a: TypeHandle, b: TypeHandle) -> bool {
        let inner = self.inner.read().expect("type table lock poisoned");
        let mut seen = HashSet::new();
        inner.handles_eq(a, b, &mut seen)
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("type table lock poisoned").records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Debug listing of the arena, one record per line.
    pub fn dump(&self) -> String {
        let inner = self.inner.read().expect("type table lock poisoned");
        let mut out = String::new();
        for (i, record) in inner.records.iter().enumerate() {
            out.push_str(&format!("{:>4}: {:?}\n", i, record));
        }
        out
    }
}

/// An identifier name paired with its resolved type, interned so repeated
/// occurrences across a program share one instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub name: String,
    pub tpe: Option<TypeHandle>,
}

/// Flyweight store for [`Symbol`]s.
#[derive(Debug, Default)]
pub struct SymbolCache {
    symbols: DashSet<Arc<Symbol>>,
}

impl SymbolCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&self, name: &str, tpe: Option<TypeHandle>) -> Arc<Symbol> {
        let symbol = Symbol {
            name: name.to_string(),
            tpe,
        };
        loop {
            if let Some(existing) = self.symbols.get(&symbol) {
                return existing.key().clone();
            }
            let arc = Arc::new(symbol.clone());
            if self.symbols.insert(arc.clone()) {
                return arc;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str, supertype: Option<TypeHandle>, members: Vec<Member>) -> TypeRecord {
        TypeRecord::Class {
            name: name.to_string(),
            supertype,
            members,
        }
    }

    #[test]
    fn strict_intern_converges() {
        let table = TypeTable::strict();
        let a = table.intern(class("A", None, vec![]));
        let b = table.intern(class("A", None, vec![]));
        assert_eq!(a, b);
    }

    #[test]
    fn strict_intern_keeps_contradictory_records_distinct() {
        let table = TypeTable::strict();
        let int = table.intern(TypeRecord::Primitive(PrimitiveKind::Int));
        let plain = table.intern(class("A", None, vec![]));
        let with_member = table.intern(class(
            "A",
            None,
            vec![Member {
                name: "x".to_string(),
                tpe: int,
            }],
        ));
        assert_ne!(plain, with_member);
        // Re-interning either shape still finds its own entry.
        assert_eq!(plain, table.intern(class("A", None, vec![])));
    }

    #[test]
    fn relaxed_intern_reuses_any_candidate() {
        let table = TypeTable::relaxed();
        let int = table.intern(TypeRecord::Primitive(PrimitiveKind::Int));
        let first = table.intern(class("A", None, vec![]));
        let second = table.intern(class(
            "A",
            None,
            vec![Member {
                name: "x".to_string(),
                tpe: int,
            }],
        ));
        assert_eq!(first, second);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn shallow_breaks_cycles_and_resolves() {
        let table = TypeTable::strict();
        // class Node { next: Node } built through a shallow placeholder.
        let shallow = table.intern(TypeRecord::Shallow {
            name: "Node".to_string(),
        });
        let node = table.intern(class(
            "Node",
            None,
            vec![Member {
                name: "next".to_string(),
                tpe: shallow,
            }],
        ));
        table.resolve_shallow(shallow, node);
        assert_eq!(table.canonical(shallow), node);
        // The now-cyclic record still compares equal to itself.
        assert!(table.deep_eq(node, node));
    }

    #[test]
    fn deep_eq_terminates_on_matching_cycles() {
        let table = TypeTable::strict();
        let graph = vec![
            class(
                "Node",
                None,
                vec![Member {
                    name: "next".to_string(),
                    tpe: TypeHandle(0),
                }],
            ),
        ];
        let first = table.intern_graph(graph.clone());
        let second = table.intern_graph(graph);
        assert_eq!(first[0], second[0]);
        assert!(table.deep_eq(first[0], second[0]));
    }

    #[test]
    fn intern_graph_unifies_mutual_recursion() {
        let table = TypeTable::strict();
        let graph = vec![
            class(
                "A",
                None,
                vec![Member {
                    name: "b".to_string(),
                    tpe: TypeHandle(1),
                }],
            ),
            class("B", Some(TypeHandle(0)), vec![]),
        ];
        let first = table.intern_graph(graph.clone());
        let len_after_first = table.len();
        let second = table.intern_graph(graph);
        assert_eq!(first, second);
        // The second batch only added link records, no new structure.
        assert_eq!(
            table.len(),
            len_after_first + 2,
        );
        assert!(matches!(table.get(first[0]), TypeRecord::Class { .. }));
    }

    #[test]
    fn symbols_intern_by_name_and_type() {
        let table = TypeTable::strict();
        let int = table.intern(TypeRecord::Primitive(PrimitiveKind::Int));
        let cache = SymbolCache::new();
        let a = cache.intern("x", Some(int));
        let b = cache.intern("x", Some(int));
        let untyped = cache.intern("x", None);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &untyped));
    }
}
