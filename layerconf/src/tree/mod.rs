//! Hierarchical value storage with set-once and freeze-on-read semantics.
//!
//! A [`ValueTree`] addresses values by dotted name. Object values are never
//! stored whole: every key becomes its own node, so `server.http.port` is
//! independently addressable after `server.http` was set to an object.
//!
//! # Rules
//!
//! - A value, once present at a name, can never be replaced.
//! - New keys may be added beside existing ones until the branch they would
//!   land in is frozen.
//! - [`ValueTree::get_and_lock`] on a branch freezes that branch and all its
//!   current descendants. Ancestors and not-yet-existing branches are
//!   unaffected, and reading a leaf freezes nothing.
//!
//! # Locking
//!
//! Each branch owns its own mutex. Walking a path acquires the child's guard
//! before the parent's guard is released, so operations on disjoint
//! subtrees only contend on the branches they share.
//!
//! # Examples
//!
//! ```
//! use layerconf::ValueTree;
//! use serde_json::json;
//!
//! let tree = ValueTree::new("example");
//! tree.set("server.http", json!({"port": 8000})).unwrap();
//! tree.set("server.http.address", json!("localhost")).unwrap();
//!
//! assert!(tree.set("server.http.port", json!(9000)).is_err());
//!
//! let http = tree.get_and_lock("server.http").unwrap();
//! assert_eq!(http, json!({"port": 8000, "address": "localhost"}));
//! assert!(tree.set("server.http.limit", json!(10)).unwrap_err().is_locked());
//! assert!(tree.set("server.batch", json!({})).is_ok());
//! ```

mod node;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::name;
use crate::source::Source;

pub(crate) use node::kind_of;
use node::{Branch, BranchRef, Node};

/// A dotted-name addressed store of values.
#[derive(Debug)]
pub struct ValueTree {
    label: String,
    root: BranchRef,
}

impl ValueTree {
    /// Creates an empty tree. The label only appears in log output.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            root: Arc::new(Mutex::new(Branch::default())),
        }
    }

    /// Creates a tree holding every top-level key of `object`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if any key, at any depth, violates the
    /// name grammar.
    pub fn from_object(label: impl Into<String>, object: Map<String, Value>) -> Result<Self> {
        let tree = Self::new(label);
        for (key, value) in object {
            tree.set(&key, value)?;
        }
        Ok(tree)
    }

    /// Store `value` at `path`, creating intermediate branches as needed.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] if any segment of `path`, or any key inside
    ///   an object `value`, violates the name grammar.
    /// - [`Error::AlreadyDefined`] if a value is already present at `path`,
    ///   or if a leaf sits where an intermediate branch is needed.
    /// - [`Error::Locked`] if the branch that would receive the new node is
    ///   frozen.
    pub fn set(&self, path: &str, value: Value) -> Result<()> {
        let segments = name::split(path)?;
        let Some((last, parents)) = segments.split_last() else {
            return Err(Error::InvalidName {
                segment: String::new(),
                name: path.to_string(),
            });
        };
        let node = Node::from_value(path, value)?;

        let mut guard = self.root.lock_arc();
        for (depth, segment) in parents.iter().enumerate() {
            let existing = match guard.children.get(*segment) {
                Some(Node::Branch(child)) => Some(Arc::clone(child)),
                Some(Node::Leaf(_)) => {
                    return Err(Error::AlreadyDefined {
                        name: segments[..=depth].join("."),
                    });
                }
                None => None,
            };
            let child = match existing {
                Some(child) => child,
                None => {
                    if guard.locked {
                        return Err(Error::Locked {
                            name: path.to_string(),
                        });
                    }
                    let child: BranchRef = Arc::new(Mutex::new(Branch::default()));
                    guard
                        .children
                        .insert((*segment).to_string(), Node::Branch(Arc::clone(&child)));
                    child
                }
            };
            guard = child.lock_arc();
        }

        if guard.children.contains_key(*last) {
            return Err(Error::AlreadyDefined {
                name: path.to_string(),
            });
        }
        if guard.locked {
            return Err(Error::Locked {
                name: path.to_string(),
            });
        }
        guard.children.insert((*last).to_string(), node);
        log::trace!("{}: set {path}", self.label);
        Ok(())
    }

    /// Read the value at `path` without freezing anything.
    ///
    /// Returns `None` if the name is invalid, if any segment is missing, or
    /// if a non-terminal segment is a leaf.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<Value> {
        self.lookup(path, false).ok()
    }

    /// Read the value at `path`, freezing it first if it is a branch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] for a malformed path and
    /// [`Error::NotDefined`] when nothing is stored there.
    pub fn get_and_lock(&self, path: &str) -> Result<Value> {
        self.lookup(path, true)
    }

    fn lookup(&self, path: &str, freeze: bool) -> Result<Value> {
        let segments = name::split(path)?;
        let not_defined = || Error::NotDefined {
            name: path.to_string(),
        };
        let (last, parents) = segments.split_last().ok_or_else(not_defined)?;

        let mut guard = self.root.lock_arc();
        for segment in parents {
            let child = match guard.children.get(*segment) {
                Some(Node::Branch(child)) => Arc::clone(child),
                _ => return Err(not_defined()),
            };
            guard = child.lock_arc();
        }

        match guard.children.get(*last) {
            None => Err(not_defined()),
            Some(Node::Leaf(value)) => Ok(value.clone()),
            Some(Node::Branch(branch)) => {
                let mut branch = branch.lock();
                if freeze && !branch.locked {
                    branch.freeze();
                    log::trace!("{}: locked {path}", self.label);
                }
                Ok(Value::Object(branch.export()))
            }
        }
    }

    /// Report whether a new value at `path` would land in a frozen branch.
    ///
    /// This is the dry-run counterpart of the [`Error::Locked`] check in
    /// [`ValueTree::set`]; it does not consider whether a value is already
    /// present.
    #[must_use]
    pub fn is_locked_at(&self, path: &str) -> bool {
        let Ok(segments) = name::split(path) else {
            return false;
        };
        let Some((_, parents)) = segments.split_last() else {
            return false;
        };

        let mut guard = self.root.lock_arc();
        for segment in parents {
            if guard.locked {
                return true;
            }
            let child = match guard.children.get(*segment) {
                Some(Node::Branch(child)) => Arc::clone(child),
                _ => return false,
            };
            guard = child.lock_arc();
        }
        guard.locked
    }

    /// Remove whatever is stored at `path`, including a whole subtree.
    ///
    /// Removing a missing name is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Locked`] if the containing branch is frozen or the
    /// node itself is a frozen branch.
    pub(crate) fn del(&self, path: &str) -> Result<()> {
        let segments = name::split(path)?;
        let Some((last, parents)) = segments.split_last() else {
            return Ok(());
        };

        let mut guard = self.root.lock_arc();
        for segment in parents {
            let child = match guard.children.get(*segment) {
                Some(Node::Branch(child)) => Arc::clone(child),
                _ => return Ok(()),
            };
            guard = child.lock_arc();
        }

        let target_locked = match guard.children.get(*last) {
            None => return Ok(()),
            Some(Node::Leaf(_)) => false,
            Some(Node::Branch(branch)) => branch.lock().locked,
        };
        if guard.locked || target_locked {
            return Err(Error::Locked {
                name: path.to_string(),
            });
        }
        guard.children.remove(*last);
        log::trace!("{}: deleted {path}", self.label);
        Ok(())
    }

    /// Overlay `other` onto this tree, one top-level key at a time.
    ///
    /// Each top-level key of `other` replaces the whole subtree at the same
    /// key here. Keys only present here are left alone. Nested objects are
    /// not unified below the first level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Locked`] if a replaced key sits in a frozen branch.
    ///
    /// # Examples
    ///
    /// ```
    /// use layerconf::ValueTree;
    /// use serde_json::json;
    ///
    /// let base = ValueTree::new("base");
    /// base.set("port", json!(8000)).unwrap();
    /// base.set("address", json!("localhost")).unwrap();
    ///
    /// let overlay = ValueTree::new("overlay");
    /// overlay.set("port", json!(9000)).unwrap();
    ///
    /// base.merge(&overlay).unwrap();
    /// assert_eq!(
    ///     serde_json::Value::Object(base.value()),
    ///     json!({"port": 9000, "address": "localhost"})
    /// );
    /// ```
    pub fn merge(&self, other: &ValueTree) -> Result<()> {
        // Snapshot first so merging a tree into itself cannot deadlock.
        let overlay = other.value();
        for (key, value) in overlay {
            self.del(&key)?;
            self.set(&key, value)?;
        }
        Ok(())
    }

    /// Export a fully materialized snapshot of the whole tree.
    #[must_use]
    pub fn value(&self) -> Map<String, Value> {
        self.root.lock().export()
    }
}

impl Source for ValueTree {
    fn get(&self, name: &str) -> Option<Value> {
        self.lookup(name, false).ok()
    }
}

/// Shallow merge of two objects: `overlay` keys replace `base` keys.
///
/// # Errors
///
/// Returns [`Error::InvalidName`] if either object holds a key that
/// violates the name grammar.
pub(crate) fn merge_objects(
    base: Map<String, Value>,
    overlay: Map<String, Value>,
) -> Result<Map<String, Value>> {
    let merged = ValueTree::from_object("a", base)?;
    let overlay = ValueTree::from_object("b", overlay)?;
    merged.merge(&overlay)?;
    Ok(merged.value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_tree_has_nothing() {
        let tree = ValueTree::new("test");
        assert_eq!(tree.get(""), None);
        assert_eq!(tree.get("a"), None);
        assert!(tree.get_and_lock("a").unwrap_err().is_not_defined());
    }

    #[test]
    fn test_scalar_is_set_once() {
        let tree = ValueTree::new("test");
        tree.set("a", json!(1)).unwrap();
        assert_eq!(tree.get("a"), Some(json!(1)));

        let err = tree.set("a", json!(1)).unwrap_err();
        assert!(matches!(err, Error::AlreadyDefined { ref name } if name == "a"));
        assert!(tree.set("a", json!(2)).is_err());
        assert_eq!(tree.get("a"), Some(json!(1)));
    }

    #[test]
    fn test_array_is_a_leaf() {
        let tree = ValueTree::new("test");
        tree.set("c", json!(["one", "two", "three"])).unwrap();
        assert_eq!(tree.get("c"), Some(json!(["one", "two", "three"])));
        assert!(tree.set("c", json!("four")).is_err());
        assert_eq!(tree.get("c.one"), None);
    }

    #[test]
    fn test_object_members_are_addressable() {
        let tree = ValueTree::new("test");
        tree.set("d", json!({"one": 1, "two": 2, "three": 3}))
            .unwrap();

        assert_eq!(tree.get("d"), Some(json!({"one": 1, "two": 2, "three": 3})));
        assert_eq!(tree.get("d.one"), Some(json!(1)));
        assert_eq!(tree.get("d.three"), Some(json!(3)));
        assert!(tree.set("d", json!("four")).is_err());
        assert!(tree.set("d.three", json!(3)).is_err());
        assert!(tree.set("d.three", json!(4)).is_err());
    }

    #[test]
    fn test_sibling_can_be_added_before_lock() {
        let tree = ValueTree::new("test");
        tree.set("d", json!({"one": 1})).unwrap();
        tree.set("d.four", json!(4)).unwrap();
        assert_eq!(tree.get("d.four"), Some(json!(4)));
        assert_eq!(tree.get("d"), Some(json!({"one": 1, "four": 4})));
    }

    #[test]
    fn test_intermediate_branches_are_created() {
        let tree = ValueTree::new("test");
        tree.set("rpc.server.http.port", json!(8000)).unwrap();
        assert_eq!(
            tree.get("rpc"),
            Some(json!({"server": {"http": {"port": 8000}}}))
        );
    }

    #[test]
    fn test_leaf_blocks_deeper_set() {
        let tree = ValueTree::new("test");
        tree.set("a", json!(1)).unwrap();
        let err = tree.set("a.b", json!(2)).unwrap_err();
        assert!(matches!(err, Error::AlreadyDefined { ref name } if name == "a"));
    }

    #[test]
    fn test_get_through_leaf_is_not_found() {
        let tree = ValueTree::new("test");
        tree.set("a", json!({"b": 1})).unwrap();
        assert_eq!(tree.get("a.b.c"), None);
        assert_eq!(tree.get("a.x"), None);
    }

    #[test]
    fn test_invalid_names_rejected() {
        let tree = ValueTree::new("test");
        assert!(matches!(
            tree.set("a._b", json!(1)),
            Err(Error::InvalidName { .. })
        ));
        assert!(matches!(
            tree.set("a", json!({"ok": {"bad-": 1}})),
            Err(Error::InvalidName { .. })
        ));
        // Nothing half-written.
        assert_eq!(tree.get("a"), None);
    }

    #[test]
    fn test_lock_blocks_new_children() {
        let tree = ValueTree::new("test");
        tree.set("p", json!({"x": 1, "q": {"y": 2}})).unwrap();
        tree.get_and_lock("p").unwrap();

        assert!(tree.set("p.z", json!(3)).unwrap_err().is_locked());
        assert!(tree.set("p.q.z", json!(3)).unwrap_err().is_locked());
        assert!(tree.set("p.new.z", json!(3)).unwrap_err().is_locked());
        assert!(tree.set("sibling", json!(3)).is_ok());
    }

    #[test]
    fn test_existing_value_reported_before_lock() {
        let tree = ValueTree::new("test");
        tree.set("p", json!({"x": 1})).unwrap();
        tree.get_and_lock("p").unwrap();
        assert!(matches!(
            tree.set("p.x", json!(2)),
            Err(Error::AlreadyDefined { .. })
        ));
    }

    #[test]
    fn test_lock_does_not_reach_ancestors() {
        let tree = ValueTree::new("test");
        tree.set("a.b", json!({"c": 1})).unwrap();
        tree.get_and_lock("a.b").unwrap();

        assert!(tree.set("a.b.d", json!(2)).unwrap_err().is_locked());
        assert!(tree.set("a.e", json!(2)).is_ok());
        assert!(!tree.is_locked_at("a.f"));
        assert!(tree.is_locked_at("a.b.d"));
    }

    #[test]
    fn test_lock_does_not_reach_future_branches() {
        let tree = ValueTree::new("test");
        tree.set("a", json!({"b": 1})).unwrap();
        tree.get_and_lock("a").unwrap();
        tree.set("other.x", json!(1)).unwrap();
        assert!(tree.set("other.y", json!(2)).is_ok());
    }

    #[test]
    fn test_leaf_read_and_miss_lock_nothing() {
        let tree = ValueTree::new("test");
        tree.set("a", json!({"b": 1})).unwrap();
        tree.get_and_lock("a.b").unwrap();
        assert!(tree.get_and_lock("a.missing").is_err());
        assert!(tree.set("a.c", json!(2)).is_ok());
    }

    #[test]
    fn test_plain_get_does_not_lock() {
        let tree = ValueTree::new("test");
        tree.set("a", json!({"b": 1})).unwrap();
        assert!(tree.get("a").is_some());
        assert!(tree.set("a.c", json!(2)).is_ok());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let tree = ValueTree::new("test");
        tree.set("a", json!({"b": 1})).unwrap();
        let mut snapshot = tree.get("a").unwrap();
        snapshot["b"] = json!(99);
        assert_eq!(tree.get("a.b"), Some(json!(1)));
    }

    #[test]
    fn test_del_removes_subtree() {
        let tree = ValueTree::new("test");
        tree.set("a", json!({"b": {"c": 1}, "d": 2})).unwrap();
        tree.del("a.b").unwrap();
        assert_eq!(tree.get("a"), Some(json!({"d": 2})));
        tree.del("a.missing").unwrap();
        tree.del("nothing.here").unwrap();
    }

    #[test]
    fn test_del_refuses_frozen_branches() {
        let tree = ValueTree::new("test");
        tree.set("a", json!({"b": {"c": 1}})).unwrap();
        tree.get_and_lock("a.b").unwrap();
        assert!(tree.del("a.b").unwrap_err().is_locked());
        assert!(tree.del("a.b.c").unwrap_err().is_locked());
    }

    #[test]
    fn test_merge_is_shallow() {
        let base = ValueTree::from_object(
            "base",
            json!({"http": {"port": 8000, "address": "localhost"}, "limit": 10})
                .as_object()
                .cloned()
                .unwrap(),
        )
        .unwrap();
        let overlay = ValueTree::from_object(
            "overlay",
            json!({"http": {"port": 9000}}).as_object().cloned().unwrap(),
        )
        .unwrap();

        base.merge(&overlay).unwrap();

        // `http` is replaced whole; `address` does not survive.
        assert_eq!(
            Value::Object(base.value()),
            json!({"http": {"port": 9000}, "limit": 10})
        );
    }

    #[test]
    fn test_merge_objects_overrides_top_level() {
        let merged = merge_objects(
            json!({"port": 8000, "address": "localhost"})
                .as_object()
                .cloned()
                .unwrap(),
            json!({"port": 9000}).as_object().cloned().unwrap(),
        )
        .unwrap();
        assert_eq!(
            Value::Object(merged),
            json!({"port": 9000, "address": "localhost"})
        );
    }

    #[test]
    fn test_tree_as_source() {
        let tree = ValueTree::new("static");
        tree.set("server", json!({"http": {"port": 9000}})).unwrap();
        let source: &dyn Source = &tree;
        assert_eq!(source.get("server.http.port"), Some(json!(9000)));
        assert_eq!(source.get("server.batch"), None);
        // Reading through the source never freezes.
        assert!(tree.set("server.http.address", json!("x")).is_ok());
    }

    #[test]
    fn test_concurrent_disjoint_sets() {
        let tree = Arc::new(ValueTree::new("test"));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let tree = Arc::clone(&tree);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        tree.set(&format!("t{i}.k{j}"), json!(j)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        for i in 0..8 {
            assert_eq!(tree.get(&format!("t{i}.k49")), Some(json!(49)));
        }
    }
}
