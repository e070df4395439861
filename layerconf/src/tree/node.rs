//! Nodes of a [`ValueTree`](super::ValueTree).

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::name;

/// Shared handle to a branch. Each branch carries its own guard.
pub(crate) type BranchRef = Arc<Mutex<Branch>>;

/// A node is either an opaque leaf or a branch of named children.
#[derive(Debug)]
pub(crate) enum Node {
    Leaf(Value),
    Branch(BranchRef),
}

/// Named children plus the frozen flag.
#[derive(Debug, Default)]
pub(crate) struct Branch {
    pub(crate) children: BTreeMap<String, Node>,
    pub(crate) locked: bool,
}

impl Node {
    /// Build a detached node from a value, expanding objects into branches.
    ///
    /// `path` is the dotted name the node will live at and is only used for
    /// error reporting.
    pub(crate) fn from_value(path: &str, value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => {
                let mut children = BTreeMap::new();
                for (key, child) in map {
                    let child_path = name::join(path, &key);
                    name::validate_segment(&key, &child_path)?;
                    let node = Self::from_value(&child_path, child)?;
                    children.insert(key, node);
                }
                Ok(Self::Branch(Arc::new(Mutex::new(Branch {
                    children,
                    locked: false,
                }))))
            }
            other => Ok(Self::Leaf(other)),
        }
    }

    /// Materialize a snapshot of this node.
    pub(crate) fn export(&self) -> Value {
        match self {
            Self::Leaf(value) => value.clone(),
            Self::Branch(branch) => Value::Object(branch.lock().export()),
        }
    }
}

impl Branch {
    /// Materialize the children as a detached object.
    pub(crate) fn export(&self) -> Map<String, Value> {
        self.children
            .iter()
            .map(|(key, node)| (key.clone(), node.export()))
            .collect()
    }

    /// Lock this branch and every branch currently beneath it.
    pub(crate) fn freeze(&mut self) {
        self.locked = true;
        for child in self.children.values() {
            if let Node::Branch(branch) = child {
                branch.lock().freeze();
            }
        }
    }
}

/// Short human name for the kind of a value, used in error messages.
#[must_use]
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
