// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Identity-preserving tree serialization.
//!
//! Interned instances — spaces and type records — are encoded once, in a
//! table at the front of the document, and referenced everywhere else by
//! index. Decoding routes those references back through the session caches,
//! so two occurrences of the same reference token yield the same shared
//! instance after a reload, and re-loading a document into a session that
//! already holds equal instances re-shares them instead of duplicating.
//!
//! Node ids are persisted verbatim; after a load the process-wide id
//! counter is advanced past the largest loaded id so freshly built nodes
//! cannot collide.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::intern::{Member, PrimitiveKind, TypeHandle, TypeRecord, TypeTable};
use crate::nodes::{
    Assignment, Binary, BinaryOp, Block, Call, ClassDecl, Container, Empty, Expression,
    FieldAccess, Ident, If, LeftPadded, Literal, LiteralKind, MethodDecl, Module, NamedVariable,
    NodeId, Parens, Return, RightPadded, Statement, Tree, TypeTree, Unary, UnaryOp,
    VariableDecls, WhileLoop,
};
use crate::trivia::{Comment, Space};
use crate::BuildSession;

/// Failure decoding a persisted tree.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("unexpected value for `{field}`: expected {expected}")]
    Unexpected {
        field: &'static str,
        expected: &'static str,
    },
    #[error("unknown node kind `{0}`")]
    UnknownKind(String),
    #[error("space reference {0} out of range")]
    BadSpaceRef(usize),
    #[error("type reference {0} out of range")]
    BadTypeRef(usize),
    #[error("malformed enum value: {0}")]
    BadEnum(#[from] serde_json::Error),
}

// ============================================================================
// Encoding
// ============================================================================

struct Encoder<'t> {
    types: &'t TypeTable,
    space_ids: HashMap<*const Space, usize>,
    space_defs: Vec<Value>,
    type_ids: HashMap<TypeHandle, usize>,
    type_defs: Vec<Value>,
}

impl<'t> Encoder<'t> {
    fn new(types: &'t TypeTable) -> Self {
        Self {
            types,
            space_ids: HashMap::new(),
            space_defs: Vec::new(),
            type_ids: HashMap::new(),
            type_defs: Vec::new(),
        }
    }

    /// Back-reference token for a space instance. Keyed by pointer: two
    /// distinct instances stay distinct, one shared instance is written once.
    fn space_id(&mut self, space: &Arc<Space>) -> usize {
        let key = Arc::as_ptr(space);
        if let Some(&idx) = self.space_ids.get(&key) {
            return idx;
        }
        let idx = self.space_defs.len();
        self.space_defs.push(json!({
            "ws": space.whitespace,
            "comments": space
                .comments
                .iter()
                .map(|c| json!({"text": c.text, "suffix": c.suffix, "multiline": c.multiline}))
                .collect::<Vec<_>>(),
        }));
        self.space_ids.insert(key, idx);
        idx
    }

    /// Back-reference token for a type handle. The slot is reserved before
    /// the record is encoded so cyclic type graphs terminate.
    fn type_id(&mut self, handle: TypeHandle) -> usize {
        let canonical = self.types.canonical(handle);
        if let Some(&idx) = self.type_ids.get(&canonical) {
            return idx;
        }
        let idx = self.type_defs.len();
        self.type_ids.insert(canonical, idx);
        self.type_defs.push(Value::Null);
        let def = match self.types.get(canonical) {
            TypeRecord::Primitive(kind) => json!({
                "kind": "primitive",
                "primitive": serde_json::to_value(kind).expect("primitive kind serializes"),
            }),
            TypeRecord::Array { elem } => {
                let elem = self.type_id(elem);
                json!({"kind": "array", "elem": elem})
            }
            TypeRecord::Class {
                name,
                supertype,
                members,
            } => {
                let supertype = supertype.map(|h| self.type_id(h));
                let members = members
                    .iter()
                    .map(|m| {
                        let tpe = self.type_id(m.tpe);
                        json!({"name": m.name, "tpe": tpe})
                    })
                    .collect::<Vec<_>>();
                json!({"kind": "class", "name": name, "supertype": supertype, "members": members})
            }
            TypeRecord::Method {
                name,
                declaring,
                return_tpe,
                parameters,
            } => {
                let declaring = declaring.map(|h| self.type_id(h));
                let return_tpe = return_tpe.map(|h| self.type_id(h));
                let parameters = parameters
                    .iter()
                    .map(|h| self.type_id(*h))
                    .collect::<Vec<_>>();
                json!({
                    "kind": "method",
                    "name": name,
                    "declaring": declaring,
                    "return": return_tpe,
                    "parameters": parameters,
                })
            }
            TypeRecord::Shallow { name } => json!({"kind": "shallow", "name": name}),
            TypeRecord::Link(_) => unreachable!("canonical handles never address links"),
        };
        self.type_defs[idx] = def;
        idx
    }

    fn opt_type(&mut self, handle: Option<TypeHandle>) -> Value {
        match handle {
            Some(h) => json!(self.type_id(h)),
            None => Value::Null,
        }
    }

    fn symbol(&mut self, ident: &Ident) -> Value {
        json!({
            "name": ident.symbol.name,
            "tpe": match ident.symbol.tpe {
                Some(h) => json!(self.type_id(h)),
                None => Value::Null,
            },
        })
    }

    fn ident(&mut self, ident: &Arc<Ident>) -> Value {
        let prefix = self.space_id(&ident.prefix);
        let symbol = self.symbol(ident);
        json!({
            "kind": "Ident",
            "id": ident.node_id.as_u64(),
            "prefix": prefix,
            "symbol": symbol,
        })
    }

    fn statement_list(&mut self, list: &[RightPadded<Statement>]) -> Value {
        list.iter()
            .map(|padded| {
                let element = self.statement(&padded.element);
                let after = self.space_id(&padded.after);
                json!({"element": element, "after": after})
            })
            .collect::<Vec<_>>()
            .into()
    }

    fn expression(&mut self, e: &Expression) -> Value {
        self.tree(&e.clone().into())
    }

    fn statement(&mut self, s: &Statement) -> Value {
        self.tree(&s.clone().into())
    }

    fn type_tree(&mut self, t: &TypeTree) -> Value {
        self.tree(&t.clone().into())
    }

    fn tree(&mut self, tree: &Tree) -> Value {
        match tree {
            Tree::Module(n) => {
                let prefix = self.space_id(&n.prefix);
                let statements = self.statement_list(&n.statements);
                let eof = self.space_id(&n.eof);
                json!({
                    "kind": "Module",
                    "id": n.node_id.as_u64(),
                    "prefix": prefix,
                    "statements": statements,
                    "eof": eof,
                })
            }
            Tree::Ident(n) => self.ident(n),
            Tree::FieldAccess(n) => {
                let prefix = self.space_id(&n.prefix);
                let target = self.expression(&n.target);
                let dot = self.space_id(&n.name.before);
                let name = self.ident(&n.name.element);
                let tpe = self.opt_type(n.tpe);
                json!({
                    "kind": "FieldAccess",
                    "id": n.node_id.as_u64(),
                    "prefix": prefix,
                    "target": target,
                    "dot": dot,
                    "name": name,
                    "tpe": tpe,
                })
            }
            Tree::Literal(n) => {
                let prefix = self.space_id(&n.prefix);
                let tpe = self.opt_type(n.tpe);
                json!({
                    "kind": "Literal",
                    "id": n.node_id.as_u64(),
                    "prefix": prefix,
                    "source": n.source,
                    "literal": serde_json::to_value(n.kind).expect("literal kind serializes"),
                    "tpe": tpe,
                })
            }
            Tree::Unary(n) => {
                let prefix = self.space_id(&n.prefix);
                let before = self.space_id(&n.operator.before);
                let expression = self.expression(&n.expression);
                let tpe = self.opt_type(n.tpe);
                json!({
                    "kind": "Unary",
                    "id": n.node_id.as_u64(),
                    "prefix": prefix,
                    "op_before": before,
                    "op": serde_json::to_value(n.operator.element).expect("unary op serializes"),
                    "expression": expression,
                    "tpe": tpe,
                })
            }
            Tree::Binary(n) => {
                let prefix = self.space_id(&n.prefix);
                let left = self.expression(&n.left);
                let before = self.space_id(&n.operator.before);
                let right = self.expression(&n.right);
                let tpe = self.opt_type(n.tpe);
                json!({
                    "kind": "Binary",
                    "id": n.node_id.as_u64(),
                    "prefix": prefix,
                    "left": left,
                    "op_before": before,
                    "op": serde_json::to_value(n.operator.element).expect("binary op serializes"),
                    "right": right,
                    "tpe": tpe,
                })
            }
            Tree::Assignment(n) => {
                let prefix = self.space_id(&n.prefix);
                let target = self.expression(&n.target);
                let equals = self.space_id(&n.value.before);
                let value = self.expression(&n.value.element);
                let tpe = self.opt_type(n.tpe);
                json!({
                    "kind": "Assignment",
                    "id": n.node_id.as_u64(),
                    "prefix": prefix,
                    "target": target,
                    "equals": equals,
                    "value": value,
                    "tpe": tpe,
                })
            }
            Tree::Call(n) => {
                let prefix = self.space_id(&n.prefix);
                let receiver = n.receiver.as_ref().map(|padded| {
                    let element = self.expression(&padded.element);
                    let after = self.space_id(&padded.after);
                    json!({"element": element, "after": after})
                });
                let name = self.ident(&n.name);
                let args_before = self.space_id(&n.arguments.before);
                let arguments = n
                    .arguments
                    .iter()
                    .map(|padded| {
                        let element = self.expression(&padded.element);
                        let after = self.space_id(&padded.after);
                        json!({"element": element, "after": after})
                    })
                    .collect::<Vec<_>>();
                let tpe = self.opt_type(n.tpe);
                let method_type = self.opt_type(n.method_type);
                json!({
                    "kind": "Call",
                    "id": n.node_id.as_u64(),
                    "prefix": prefix,
                    "receiver": receiver,
                    "name": name,
                    "args_before": args_before,
                    "arguments": arguments,
                    "tpe": tpe,
                    "method_type": method_type,
                })
            }
            Tree::Parens(n) => {
                let prefix = self.space_id(&n.prefix);
                let element = self.expression(&n.tree.element);
                let after = self.space_id(&n.tree.after);
                json!({
                    "kind": "Parens",
                    "id": n.node_id.as_u64(),
                    "prefix": prefix,
                    "element": element,
                    "after": after,
                })
            }
            Tree::Empty(n) => {
                let prefix = self.space_id(&n.prefix);
                json!({
                    "kind": "Empty",
                    "id": n.node_id.as_u64(),
                    "prefix": prefix,
                })
            }
            Tree::Block(n) => {
                let prefix = self.space_id(&n.prefix);
                let statements = self.statement_list(&n.statements);
                let end = self.space_id(&n.end);
                json!({
                    "kind": "Block",
                    "id": n.node_id.as_u64(),
                    "prefix": prefix,
                    "statements": statements,
                    "end": end,
                })
            }
            Tree::If(n) => {
                let prefix = self.space_id(&n.prefix);
                let condition = self.tree(&Tree::Parens(n.condition.clone()));
                let then_stmt = self.statement(&n.then_part.element);
                let then_after = self.space_id(&n.then_part.after);
                let else_part = n.else_part.as_ref().map(|padded| {
                    let before = self.space_id(&padded.before);
                    let element = self.statement(&padded.element.element);
                    let after = self.space_id(&padded.element.after);
                    json!({"before": before, "element": element, "after": after})
                });
                json!({
                    "kind": "If",
                    "id": n.node_id.as_u64(),
                    "prefix": prefix,
                    "condition": condition,
                    "then": {"element": then_stmt, "after": then_after},
                    "else": else_part,
                })
            }
            Tree::WhileLoop(n) => {
                let prefix = self.space_id(&n.prefix);
                let condition = self.tree(&Tree::Parens(n.condition.clone()));
                let body = self.statement(&n.body.element);
                let after = self.space_id(&n.body.after);
                json!({
                    "kind": "WhileLoop",
                    "id": n.node_id.as_u64(),
                    "prefix": prefix,
                    "condition": condition,
                    "body": {"element": body, "after": after},
                })
            }
            Tree::Return(n) => {
                let prefix = self.space_id(&n.prefix);
                let expression = n.expression.as_ref().map(|e| self.expression(e));
                json!({
                    "kind": "Return",
                    "id": n.node_id.as_u64(),
                    "prefix": prefix,
                    "expression": expression,
                })
            }
            Tree::VariableDecls(n) => {
                let prefix = self.space_id(&n.prefix);
                let type_expr = n.type_expr.as_ref().map(|t| self.type_tree(t));
                let variables = n
                    .variables
                    .iter()
                    .map(|padded| {
                        let element = self.tree(&Tree::NamedVariable(padded.element.clone()));
                        let after = self.space_id(&padded.after);
                        json!({"element": element, "after": after})
                    })
                    .collect::<Vec<_>>();
                json!({
                    "kind": "VariableDecls",
                    "id": n.node_id.as_u64(),
                    "prefix": prefix,
                    "type_expr": type_expr,
                    "variables": variables,
                })
            }
            Tree::NamedVariable(n) => {
                let prefix = self.space_id(&n.prefix);
                let name = self.ident(&n.name);
                let initializer = n.initializer.as_ref().map(|padded| {
                    let before = self.space_id(&padded.before);
                    let element = self.expression(&padded.element);
                    json!({"before": before, "element": element})
                });
                let variable_type = self.opt_type(n.variable_type);
                json!({
                    "kind": "NamedVariable",
                    "id": n.node_id.as_u64(),
                    "prefix": prefix,
                    "name": name,
                    "initializer": initializer,
                    "variable_type": variable_type,
                })
            }
            Tree::MethodDecl(n) => {
                let prefix = self.space_id(&n.prefix);
                let return_type = n.return_type.as_ref().map(|t| self.type_tree(t));
                let name = self.ident(&n.name);
                let params_before = self.space_id(&n.parameters.before);
                let parameters = n
                    .parameters
                    .iter()
                    .map(|padded| {
                        let element = self.statement(&padded.element);
                        let after = self.space_id(&padded.after);
                        json!({"element": element, "after": after})
                    })
                    .collect::<Vec<_>>();
                let body = n.body.as_ref().map(|b| self.tree(&Tree::Block(b.clone())));
                let method_type = self.opt_type(n.method_type);
                json!({
                    "kind": "MethodDecl",
                    "id": n.node_id.as_u64(),
                    "prefix": prefix,
                    "return_type": return_type,
                    "name": name,
                    "params_before": params_before,
                    "parameters": parameters,
                    "body": body,
                    "method_type": method_type,
                })
            }
            Tree::ClassDecl(n) => {
                let prefix = self.space_id(&n.prefix);
                let name = self.ident(&n.name);
                let extends = n.extends.as_ref().map(|padded| {
                    let before = self.space_id(&padded.before);
                    let element = self.type_tree(&padded.element);
                    json!({"before": before, "element": element})
                });
                let body = self.tree(&Tree::Block(n.body.clone()));
                let class_type = self.opt_type(n.class_type);
                json!({
                    "kind": "ClassDecl",
                    "id": n.node_id.as_u64(),
                    "prefix": prefix,
                    "name": name,
                    "extends": extends,
                    "body": body,
                    "class_type": class_type,
                })
            }
        }
    }
}

/// Encode a tree to its persisted form.
pub fn encode(tree: &Tree, types: &TypeTable) -> Value {
    let mut encoder = Encoder::new(types);
    let tree_value = encoder.tree(tree);
    debug!(
        spaces = encoder.space_defs.len(),
        types = encoder.type_defs.len(),
        "encoded tree"
    );
    json!({
        "spaces": encoder.space_defs,
        "types": encoder.type_defs,
        "tree": tree_value,
    })
}

// ============================================================================
// Decoding
// ============================================================================

struct Decoder<'s> {
    session: &'s BuildSession,
    spaces: Vec<Arc<Space>>,
    type_handles: Vec<TypeHandle>,
    max_id: u64,
}

fn field<'v>(value: &'v Value, name: &'static str) -> Result<&'v Value, DecodeError> {
    value.get(name).ok_or(DecodeError::MissingField(name))
}

fn obj<'v>(value: &'v Value, name: &'static str) -> Result<&'v Map<String, Value>, DecodeError> {
    value.as_object().ok_or(DecodeError::Unexpected {
        field: name,
        expected: "object",
    })
}

fn as_usize(value: &Value, name: &'static str) -> Result<usize, DecodeError> {
    value
        .as_u64()
        .map(|n| n as usize)
        .ok_or(DecodeError::Unexpected {
            field: name,
            expected: "unsigned integer",
        })
}

fn as_str<'v>(value: &'v Value, name: &'static str) -> Result<&'v str, DecodeError> {
    value.as_str().ok_or(DecodeError::Unexpected {
        field: name,
        expected: "string",
    })
}

fn as_array<'v>(value: &'v Value, name: &'static str) -> Result<&'v Vec<Value>, DecodeError> {
    value.as_array().ok_or(DecodeError::Unexpected {
        field: name,
        expected: "array",
    })
}

fn opt<'v>(value: Option<&'v Value>) -> Option<&'v Value> {
    value.filter(|v| !v.is_null())
}

impl<'s> Decoder<'s> {
    fn new(session: &'s BuildSession) -> Self {
        Self {
            session,
            spaces: Vec::new(),
            type_handles: Vec::new(),
            max_id: 0,
        }
    }

    fn load_spaces(&mut self, defs: &[Value]) -> Result<(), DecodeError> {
        for def in defs {
            let ws = as_str(field(def, "ws")?, "ws")?;
            let mut comments = Vec::new();
            for c in as_array(field(def, "comments")?, "comments")? {
                comments.push(Comment::new(
                    as_str(field(c, "text")?, "text")?,
                    as_str(field(c, "suffix")?, "suffix")?,
                    field(c, "multiline")?.as_bool().ok_or(DecodeError::Unexpected {
                        field: "multiline",
                        expected: "boolean",
                    })?,
                ));
            }
            self.spaces
                .push(self.session.spaces.intern(Space::new(ws, comments)));
        }
        Ok(())
    }

    fn load_types(&mut self, defs: &[Value]) -> Result<(), DecodeError> {
        let mut records = Vec::with_capacity(defs.len());
        let local = |v: &Value, name| -> Result<TypeHandle, DecodeError> {
            let idx = as_usize(v, name)?;
            if idx >= defs.len() {
                return Err(DecodeError::BadTypeRef(idx));
            }
            Ok(TypeHandle(idx as u32))
        };
        for def in defs {
            let kind = as_str(field(def, "kind")?, "kind")?;
            let record = match kind {
                "primitive" => {
                    let kind: PrimitiveKind =
                        serde_json::from_value(field(def, "primitive")?.clone())?;
                    TypeRecord::Primitive(kind)
                }
                "array" => TypeRecord::Array {
                    elem: local(field(def, "elem")?, "elem")?,
                },
                "class" => {
                    let name = as_str(field(def, "name")?, "name")?.to_string();
                    let supertype = opt(def.get("supertype"))
                        .map(|v| local(v, "supertype"))
                        .transpose()?;
                    let mut members = Vec::new();
                    for m in as_array(field(def, "members")?, "members")? {
                        members.push(Member {
                            name: as_str(field(m, "name")?, "name")?.to_string(),
                            tpe: local(field(m, "tpe")?, "tpe")?,
                        });
                    }
                    TypeRecord::Class {
                        name,
                        supertype,
                        members,
                    }
                }
                "method" => {
                    let name = as_str(field(def, "name")?, "name")?.to_string();
                    let declaring = opt(def.get("declaring"))
                        .map(|v| local(v, "declaring"))
                        .transpose()?;
                    let return_tpe = opt(def.get("return"))
                        .map(|v| local(v, "return"))
                        .transpose()?;
                    let mut parameters = Vec::new();
                    for p in as_array(field(def, "parameters")?, "parameters")? {
                        parameters.push(local(p, "parameters")?);
                    }
                    TypeRecord::Method {
                        name,
                        declaring,
                        return_tpe,
                        parameters,
                    }
                }
                "shallow" => TypeRecord::Shallow {
                    name: as_str(field(def, "name")?, "name")?.to_string(),
                },
                other => return Err(DecodeError::UnknownKind(other.to_string())),
            };
            records.push(record);
        }
        self.type_handles = self.session.types.intern_graph(records);
        Ok(())
    }

    fn space(&self, value: &Value, name: &'static str) -> Result<Arc<Space>, DecodeError> {
        let idx = as_usize(value, name)?;
        self.spaces
            .get(idx)
            .cloned()
            .ok_or(DecodeError::BadSpaceRef(idx))
    }

    fn opt_type(&self, value: Option<&Value>) -> Result<Option<TypeHandle>, DecodeError> {
        match opt(value) {
            Some(v) => {
                let idx = as_usize(v, "tpe")?;
                self.type_handles
                    .get(idx)
                    .copied()
                    .map(Some)
                    .ok_or(DecodeError::BadTypeRef(idx))
            }
            None => Ok(None),
        }
    }

    fn node_id(&mut self, value: &Value) -> Result<NodeId, DecodeError> {
        let id = field(value, "id")?.as_u64().ok_or(DecodeError::Unexpected {
            field: "id",
            expected: "unsigned integer",
        })?;
        self.max_id = self.max_id.max(id);
        Ok(NodeId(id))
    }

    fn ident(&mut self, value: &Value) -> Result<Arc<Ident>, DecodeError> {
        match self.tree(value)? {
            Tree::Ident(n) => Ok(n),
            _ => Err(DecodeError::Unexpected {
                field: "name",
                expected: "Ident node",
            }),
        }
    }

    fn parens(&mut self, value: &Value) -> Result<Arc<Parens>, DecodeError> {
        match self.tree(value)? {
            Tree::Parens(n) => Ok(n),
            _ => Err(DecodeError::Unexpected {
                field: "condition",
                expected: "Parens node",
            }),
        }
    }

    fn block(&mut self, value: &Value) -> Result<Arc<Block>, DecodeError> {
        match self.tree(value)? {
            Tree::Block(n) => Ok(n),
            _ => Err(DecodeError::Unexpected {
                field: "body",
                expected: "Block node",
            }),
        }
    }

    fn expression(&mut self, value: &Value) -> Result<Expression, DecodeError> {
        Expression::try_from(self.tree(value)?).map_err(|_| DecodeError::Unexpected {
            field: "element",
            expected: "expression node",
        })
    }

    fn statement(&mut self, value: &Value) -> Result<Statement, DecodeError> {
        Statement::try_from(self.tree(value)?).map_err(|_| DecodeError::Unexpected {
            field: "element",
            expected: "statement node",
        })
    }

    fn type_tree(&mut self, value: &Value) -> Result<TypeTree, DecodeError> {
        TypeTree::try_from(self.tree(value)?).map_err(|_| DecodeError::Unexpected {
            field: "type_expr",
            expected: "type-reference node",
        })
    }

    fn statement_list(
        &mut self,
        value: &Value,
    ) -> Result<Vec<RightPadded<Statement>>, DecodeError> {
        let mut out = Vec::new();
        for entry in as_array(value, "statements")? {
            let element = self.statement(field(entry, "element")?)?;
            let after = self.space(field(entry, "after")?, "after")?;
            out.push(RightPadded::new(element, after));
        }
        Ok(out)
    }

    fn tree(&mut self, value: &Value) -> Result<Tree, DecodeError> {
        obj(value, "node")?;
        let kind = as_str(field(value, "kind")?, "kind")?;
        let node_id = self.node_id(value)?;
        let prefix = self.space(field(value, "prefix")?, "prefix")?;
        match kind {
            "Module" => Ok(Tree::Module(Arc::new(Module {
                node_id,
                prefix,
                statements: self.statement_list(field(value, "statements")?)?,
                eof: self.space(field(value, "eof")?, "eof")?,
            }))),
            "Ident" => {
                let symbol = field(value, "symbol")?;
                let name = as_str(field(symbol, "name")?, "name")?;
                let tpe = self.opt_type(symbol.get("tpe"))?;
                Ok(Tree::Ident(Arc::new(Ident {
                    node_id,
                    prefix,
                    symbol: self.session.symbols.intern(name, tpe),
                })))
            }
            "FieldAccess" => Ok(Tree::FieldAccess(Arc::new(FieldAccess {
                node_id,
                prefix,
                target: self.expression(field(value, "target")?)?,
                name: LeftPadded::new(
                    self.space(field(value, "dot")?, "dot")?,
                    self.ident(field(value, "name")?)?,
                ),
                tpe: self.opt_type(value.get("tpe"))?,
            }))),
            "Literal" => Ok(Tree::Literal(Arc::new(Literal {
                node_id,
                prefix,
                source: as_str(field(value, "source")?, "source")?.to_string(),
                kind: serde_json::from_value::<LiteralKind>(field(value, "literal")?.clone())?,
                tpe: self.opt_type(value.get("tpe"))?,
            }))),
            "Unary" => Ok(Tree::Unary(Arc::new(Unary {
                node_id,
                prefix,
                operator: LeftPadded::new(
                    self.space(field(value, "op_before")?, "op_before")?,
                    serde_json::from_value::<UnaryOp>(field(value, "op")?.clone())?,
                ),
                expression: self.expression(field(value, "expression")?)?,
                tpe: self.opt_type(value.get("tpe"))?,
            }))),
            "Binary" => Ok(Tree::Binary(Arc::new(Binary {
                node_id,
                prefix,
                left: self.expression(field(value, "left")?)?,
                operator: LeftPadded::new(
                    self.space(field(value, "op_before")?, "op_before")?,
                    serde_json::from_value::<BinaryOp>(field(value, "op")?.clone())?,
                ),
                right: self.expression(field(value, "right")?)?,
                tpe: self.opt_type(value.get("tpe"))?,
            }))),
            "Assignment" => Ok(Tree::Assignment(Arc::new(Assignment {
                node_id,
                prefix,
                target: self.expression(field(value, "target")?)?,
                value: LeftPadded::new(
                    self.space(field(value, "equals")?, "equals")?,
                    self.expression(field(value, "value")?)?,
                ),
                tpe: self.opt_type(value.get("tpe"))?,
            }))),
            "Call" => {
                let receiver = match opt(value.get("receiver")) {
                    Some(r) => Some(RightPadded::new(
                        self.expression(field(r, "element")?)?,
                        self.space(field(r, "after")?, "after")?,
                    )),
                    None => None,
                };
                let mut arguments = Vec::new();
                for entry in as_array(field(value, "arguments")?, "arguments")? {
                    arguments.push(RightPadded::new(
                        self.expression(field(entry, "element")?)?,
                        self.space(field(entry, "after")?, "after")?,
                    ));
                }
                Ok(Tree::Call(Arc::new(Call {
                    node_id,
                    prefix,
                    receiver,
                    name: self.ident(field(value, "name")?)?,
                    arguments: Container::new(
                        self.space(field(value, "args_before")?, "args_before")?,
                        arguments,
                    ),
                    tpe: self.opt_type(value.get("tpe"))?,
                    method_type: self.opt_type(value.get("method_type"))?,
                })))
            }
            "Parens" => Ok(Tree::Parens(Arc::new(Parens {
                node_id,
                prefix,
                tree: RightPadded::new(
                    self.expression(field(value, "element")?)?,
                    self.space(field(value, "after")?, "after")?,
                ),
            }))),
            "Empty" => Ok(Tree::Empty(Arc::new(Empty { node_id, prefix }))),
            "Block" => Ok(Tree::Block(Arc::new(Block {
                node_id,
                prefix,
                statements: self.statement_list(field(value, "statements")?)?,
                end: self.space(field(value, "end")?, "end")?,
            }))),
            "If" => {
                let then = field(value, "then")?;
                let else_part = match opt(value.get("else")) {
                    Some(e) => Some(LeftPadded::new(
                        self.space(field(e, "before")?, "before")?,
                        RightPadded::new(
                            self.statement(field(e, "element")?)?,
                            self.space(field(e, "after")?, "after")?,
                        ),
                    )),
                    None => None,
                };
                Ok(Tree::If(Arc::new(If {
                    node_id,
                    prefix,
                    condition: self.parens(field(value, "condition")?)?,
                    then_part: RightPadded::new(
                        self.statement(field(then, "element")?)?,
                        self.space(field(then, "after")?, "after")?,
                    ),
                    else_part,
                })))
            }
            "WhileLoop" => {
                let body = field(value, "body")?;
                Ok(Tree::WhileLoop(Arc::new(WhileLoop {
                    node_id,
                    prefix,
                    condition: self.parens(field(value, "condition")?)?,
                    body: RightPadded::new(
                        self.statement(field(body, "element")?)?,
                        self.space(field(body, "after")?, "after")?,
                    ),
                })))
            }
            "Return" => {
                let expression = match opt(value.get("expression")) {
                    Some(e) => Some(self.expression(e)?),
                    None => None,
                };
                Ok(Tree::Return(Arc::new(Return {
                    node_id,
                    prefix,
                    expression,
                })))
            }
            "VariableDecls" => {
                let type_expr = match opt(value.get("type_expr")) {
                    Some(t) => Some(self.type_tree(t)?),
                    None => None,
                };
                let mut variables = Vec::new();
                for entry in as_array(field(value, "variables")?, "variables")? {
                    let element = match self.tree(field(entry, "element")?)? {
                        Tree::NamedVariable(n) => n,
                        _ => {
                            return Err(DecodeError::Unexpected {
                                field: "variables",
                                expected: "NamedVariable node",
                            })
                        }
                    };
                    variables.push(RightPadded::new(
                        element,
                        self.space(field(entry, "after")?, "after")?,
                    ));
                }
                Ok(Tree::VariableDecls(Arc::new(VariableDecls {
                    node_id,
                    prefix,
                    type_expr,
                    variables,
                })))
            }
            "NamedVariable" => {
                let initializer = match opt(value.get("initializer")) {
                    Some(i) => Some(LeftPadded::new(
                        self.space(field(i, "before")?, "before")?,
                        self.expression(field(i, "element")?)?,
                    )),
                    None => None,
                };
                Ok(Tree::NamedVariable(Arc::new(NamedVariable {
                    node_id,
                    prefix,
                    name: self.ident(field(value, "name")?)?,
                    initializer,
                    variable_type: self.opt_type(value.get("variable_type"))?,
                })))
            }
            "MethodDecl" => {
                let return_type = match opt(value.get("return_type")) {
                    Some(t) => Some(self.type_tree(t)?),
                    None => None,
                };
                let mut parameters = Vec::new();
                for entry in as_array(field(value, "parameters")?, "parameters")? {
                    parameters.push(RightPadded::new(
                        self.statement(field(entry, "element")?)?,
                        self.space(field(entry, "after")?, "after")?,
                    ));
                }
                let body = match opt(value.get("body")) {
                    Some(b) => Some(self.block(b)?),
                    None => None,
                };
                Ok(Tree::MethodDecl(Arc::new(MethodDecl {
                    node_id,
                    prefix,
                    return_type,
                    name: self.ident(field(value, "name")?)?,
                    parameters: Container::new(
                        self.space(field(value, "params_before")?, "params_before")?,
                        parameters,
                    ),
                    body,
                    method_type: self.opt_type(value.get("method_type"))?,
                })))
            }
            "ClassDecl" => {
                let extends = match opt(value.get("extends")) {
                    Some(e) => Some(LeftPadded::new(
                        self.space(field(e, "before")?, "before")?,
                        self.type_tree(field(e, "element")?)?,
                    )),
                    None => None,
                };
                Ok(Tree::ClassDecl(Arc::new(ClassDecl {
                    node_id,
                    prefix,
                    name: self.ident(field(value, "name")?)?,
                    extends,
                    body: self.block(field(value, "body")?)?,
                    class_type: self.opt_type(value.get("class_type"))?,
                })))
            }
            other => Err(DecodeError::UnknownKind(other.to_string())),
        }
    }
}

/// Decode a persisted tree, re-sharing interned instances through the
/// session's caches.
pub fn decode(value: &Value, session: &BuildSession) -> Result<Tree, DecodeError> {
    let mut decoder = Decoder::new(session);
    let spaces = as_array(field(value, "spaces")?, "spaces")?;
    decoder.load_spaces(spaces)?;
    let types = as_array(field(value, "types")?, "types")?;
    decoder.load_types(types)?;
    let tree = decoder.tree(field(value, "tree")?)?;
    NodeId::ensure_above(decoder.max_id);
    debug!(spaces = decoder.spaces.len(), "decoded tree");
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::print;
    use crate::nodes::LiteralKind;

    fn session() -> BuildSession {
        BuildSession::new()
    }

    fn sample_tree(session: &BuildSession) -> Tree {
        let sp = |ws: &str| session.spaces.whitespace(ws);
        let target = Expression::Ident(Arc::new(Ident::new(
            sp(""),
            session.symbols.intern("x", None),
        )));
        let value = Expression::Literal(Arc::new(Literal::new(
            sp(" "),
            "42",
            LiteralKind::Int,
            None,
        )));
        let assign = Statement::Assignment(Arc::new(Assignment::new(
            sp(""),
            target,
            LeftPadded::new(sp(" "), value),
            None,
        )));
        Tree::Module(Arc::new(Module::new(
            sp(""),
            vec![RightPadded::new(assign, sp(""))],
            sp("\n"),
        )))
    }

    #[test]
    fn encode_decode_round_trips_text_and_ids() {
        let session = session();
        let tree = sample_tree(&session);
        let encoded = encode(&tree, &session.types);
        let decoded = decode(&encoded, &session).expect("decode");
        assert_eq!(print(&tree), print(&decoded));
        assert_eq!(tree.id(), decoded.id());
    }

    #[test]
    fn shared_spaces_decode_to_shared_instances() {
        let session = session();
        let tree = sample_tree(&session);
        let encoded = encode(&tree, &session.types);
        let decoded = decode(&encoded, &session).expect("decode");
        let (first, second) = match &decoded {
            Tree::Module(m) => {
                let assign = match &m.statements[0].element {
                    Statement::Assignment(a) => a.clone(),
                    other => panic!("expected assignment, got {:?}", other.kind()),
                };
                (assign.value.before.clone(), assign.value.element.prefix())
            }
            other => panic!("expected module, got {:?}", other.kind()),
        };
        // Both " " references decode to one shared instance.
        assert!(Arc::ptr_eq(&first, &second));

        // A second decode through the same session shares the same spaces.
        let again = decode(&encoded, &session).expect("decode twice");
        match (&decoded, &again) {
            (Tree::Module(a), Tree::Module(b)) => {
                assert!(Arc::ptr_eq(&a.prefix, &b.prefix));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn type_references_converge_across_decodes(){
        let session = session();
        let int = session.types.intern(TypeRecord::Primitive(PrimitiveKind::Int));
        let sym = session.symbols.intern("x", Some(int));
        let tree = Tree::Ident(Arc::new(Ident::new(session.spaces.empty(), sym)));
        let encoded = encode(&tree, &session.types);
        let first = decode(&encoded, &session).expect("decode");
        let second = decode(&encoded, &session).expect("decode");
        let handle_of = |t: &Tree| match t {
            Tree::Ident(n) => n.symbol.tpe.map(|h| session.types.canonical(h)),
            _ => None,
        };
        assert_eq!(handle_of(&first), handle_of(&second));
        assert_eq!(handle_of(&first), Some(session.types.canonical(int)));
    }

    #[test]
    fn decode_rejects_unknown_kind() {
        let session = session();
        let bad = json!({
            "spaces": [{"ws": "", "comments": []}],
            "types": [],
            "tree": {"kind": "Mystery", "id": 1, "prefix": 0},
        });
        match decode(&bad, &session) {
            Err(DecodeError::UnknownKind(kind)) => assert_eq!(kind, "Mystery"),
            other => panic!("expected UnknownKind, got {:?}", other.map(|t| t.kind())),
        }
    }

    #[test]
    fn decode_rejects_bad_space_ref() {
        let session = session();
        let bad = json!({
            "spaces": [],
            "types": [],
            "tree": {"kind": "Empty", "id": 1, "prefix": 5},
        });
        assert!(matches!(
            decode(&bad, &session),
            Err(DecodeError::BadSpaceRef(5))
        ));
    }
}
