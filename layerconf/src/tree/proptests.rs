//! Property-based tests for the value tree.

use super::ValueTree;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

// Strategy for generating valid name segments
fn segment_strategy() -> impl Strategy<Value = String> {
    "[a-z]([a-z0-9_-]{0,6}[a-z0-9])?"
}

fn path_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment_strategy(), 1..5)
}

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::from),
        Just(Value::Null),
    ]
}

fn object_strategy() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map(segment_strategy(), scalar_strategy(), 0..6)
        .prop_map(|entries| entries.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        max_shrink_iters: 2000,
        .. ProptestConfig::default()
    })]

    // A value can be set once and is read back unchanged
    #[test]
    fn set_once_keeps_first_value(
        path in path_strategy(),
        first in scalar_strategy(),
        second in scalar_strategy()
    ) {
        let path = path.join(".");
        let tree = ValueTree::new("prop");
        tree.set(&path, first.clone()).unwrap();
        let is_already_defined = matches!(
            tree.set(&path, second),
            Err(crate::Error::AlreadyDefined { .. })
        );
        prop_assert!(is_already_defined);
        prop_assert_eq!(tree.get(&path), Some(first));
    }

    // Freezing a branch blocks new children beneath it but not beside it
    #[test]
    fn lock_blocks_only_the_addressed_branch(
        object in object_strategy(),
        child in segment_strategy(),
        sibling in segment_strategy()
    ) {
        prop_assume!(!object.contains_key(&child));
        prop_assume!(sibling != "p");

        let tree = ValueTree::new("prop");
        tree.set("p", Value::Object(object)).unwrap();
        tree.get_and_lock("p").unwrap();

        prop_assert!(tree.set(&format!("p.{child}"), json!(1)).unwrap_err().is_locked());
        prop_assert!(tree.set(&sibling, json!(1)).is_ok());
    }

    // Merge takes every top-level key from the overlay and keeps the rest
    #[test]
    fn merge_overlay_wins_at_top_level(
        base in object_strategy(),
        overlay in object_strategy()
    ) {
        let merged = super::merge_objects(base.clone(), overlay.clone()).unwrap();

        for (key, value) in &overlay {
            prop_assert_eq!(merged.get(key), Some(value));
        }
        for (key, value) in &base {
            if !overlay.contains_key(key) {
                prop_assert_eq!(merged.get(key), Some(value));
            }
        }
        prop_assert!(merged.keys().all(|k| base.contains_key(k) || overlay.contains_key(k)));
    }

    // Exported snapshots round-trip through a fresh tree
    #[test]
    fn export_is_stable(object in object_strategy()) {
        let tree = ValueTree::from_object("prop", object.clone()).unwrap();
        prop_assert_eq!(tree.value(), object);
    }
}
