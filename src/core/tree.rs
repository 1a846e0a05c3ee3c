//! Typed attribute tree produced by the converter
//!
//! Once built, a tree cannot be changed: the converter fills a
//! [`TreeBuilder`] and freezes it. Every node keeps its declared type, a
//! null included, so the host can check the tree against the descriptor
//! structurally.

use crate::core::schema::{AttributeType, ScalarKind};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// A scalar value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    String(String),
    Int64(i64),
    Bool(bool),
}

impl Scalar {
    /// Zero value of a scalar kind
    pub fn zero(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::String => Scalar::String(String::new()),
            ScalarKind::Int64 => Scalar::Int64(0),
            ScalarKind::Bool => Scalar::Bool(false),
        }
    }

    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::String(_) => ScalarKind::String,
            Scalar::Int64(_) => ScalarKind::Int64,
            Scalar::Bool(_) => ScalarKind::Bool,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::String(s) => serializer.serialize_str(s),
            Scalar::Int64(n) => serializer.serialize_i64(*n),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

/// A node of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    /// No value yet; the declared type is kept
    Null(AttributeType),
    Scalar(Scalar),
    List {
        element: ScalarKind,
        items: Vec<Scalar>,
    },
    Object(TypedTree),
    ObjectList {
        items: Vec<TypedTree>,
    },
}

impl TypedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null(_))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            TypedValue::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Scalar(Scalar::Int64(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            TypedValue::List { items, .. } => Some(items),
            _ => None,
        }
    }

    /// String elements of a `list(string)` node
    pub fn as_string_list(&self) -> Option<Vec<&str>> {
        self.as_list()?.iter().map(Scalar::as_str).collect()
    }

    pub fn as_object(&self) -> Option<&TypedTree> {
        match self {
            TypedValue::Object(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_object_list(&self) -> Option<&[TypedTree]> {
        match self {
            TypedValue::ObjectList { items } => Some(items),
            _ => None,
        }
    }
}

impl Serialize for TypedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TypedValue::Null(_) => serializer.serialize_none(),
            TypedValue::Scalar(scalar) => scalar.serialize(serializer),
            TypedValue::List { items, .. } => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            TypedValue::Object(tree) => tree.serialize(serializer),
            TypedValue::ObjectList { items } => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// Immutable mapping from attribute name to typed value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypedTree {
    attributes: BTreeMap<String, TypedValue>,
}

impl TypedTree {
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.attributes.get(name)
    }

    /// Look a node up by dotted path through nested objects
    pub fn at(&self, path: &str) -> Option<&TypedValue> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of nodes in the tree, nested ones included
    pub fn node_count(&self) -> usize {
        self.attributes
            .values()
            .map(|value| {
                1 + match value {
                    TypedValue::Object(tree) => tree.node_count(),
                    TypedValue::ObjectList { items } => items.iter().map(TypedTree::node_count).sum(),
                    _ => 0,
                }
            })
            .sum()
    }
}

impl Serialize for TypedTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.attributes.len()))?;
        for (name, value) in &self.attributes {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Collects the attributes of one tree level before freezing it
#[derive(Debug, Default)]
pub struct TreeBuilder {
    attributes: BTreeMap<String, TypedValue>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: TypedValue) {
        self.attributes.insert(name.into(), value);
    }

    pub fn build(self) -> TypedTree {
        TypedTree {
            attributes: self.attributes,
        }
    }
}
