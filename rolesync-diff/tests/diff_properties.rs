//! Property-based tests for the change processor.
//!
//! - Correctness: to_add / to_remove are exactly the one-sided keys
//! - Idempotence: diffing a collection against itself is empty
//! - Symmetry: swapping the inputs swaps to_add and to_remove
//! - Empty inputs degenerate to "add everything" / "remove everything"

use proptest::prelude::*;
use rolesync_diff::{ChangeSet, KeyedItem};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
struct Entitlement {
    value: String,
    kind: String,
    endpoint: String,
}

impl KeyedItem for Entitlement {
    type Key = (String, String, String);

    fn key(&self) -> Self::Key {
        (self.value.clone(), self.kind.clone(), self.endpoint.clone())
    }
}

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn entitlement_strategy() -> impl Strategy<Value = Entitlement> {
    (
        prop::sample::select(vec!["admin", "read", "write", "a|b"]),
        prop::sample::select(vec!["group", "role", "b"]),
        prop::sample::select(vec!["ad", "sap", "ad|sap"]),
    )
        .prop_map(|(value, kind, endpoint)| Entitlement {
            value: value.to_string(),
            kind: kind.to_string(),
            endpoint: endpoint.to_string(),
        })
}

fn collection_strategy() -> impl Strategy<Value = Vec<Entitlement>> {
    prop::collection::vec(entitlement_strategy(), 0..12)
}

fn keys(items: &[Entitlement]) -> BTreeSet<(String, String, String)> {
    items.iter().map(KeyedItem::key).collect()
}

proptest! {
    /// to_add holds exactly the keys only in new; to_remove exactly those only in old.
    #[test]
    fn diff_matches_set_difference(old in collection_strategy(), new in collection_strategy()) {
        let changes = ChangeSet::between(&old, &new);
        let old_keys = keys(&old);
        let new_keys = keys(&new);

        let expected_add: BTreeSet<_> = new_keys.difference(&old_keys).cloned().collect();
        let expected_remove: BTreeSet<_> = old_keys.difference(&new_keys).cloned().collect();

        prop_assert_eq!(keys(&changes.to_add), expected_add);
        prop_assert_eq!(keys(&changes.to_remove), expected_remove);
        prop_assert_eq!(changes.to_add.len(), keys(&changes.to_add).len());
        prop_assert_eq!(changes.to_remove.len(), keys(&changes.to_remove).len());
    }

    /// Diffing a collection against itself is a no-op.
    #[test]
    fn diff_is_idempotent(items in collection_strategy()) {
        prop_assert!(ChangeSet::between(&items, &items).is_empty());
    }

    /// diff(old, new).to_add == diff(new, old).to_remove, as key sets.
    #[test]
    fn diff_is_symmetric(old in collection_strategy(), new in collection_strategy()) {
        let forward = ChangeSet::between(&old, &new);
        let backward = ChangeSet::between(&new, &old);

        prop_assert_eq!(keys(&forward.to_add), keys(&backward.to_remove));
        prop_assert_eq!(keys(&forward.to_remove), keys(&backward.to_add));
    }

    /// Empty old adds everything; empty new removes everything.
    #[test]
    fn empty_side_degenerates(items in collection_strategy()) {
        let empty: Vec<Entitlement> = Vec::new();

        let from_empty = ChangeSet::between(&empty, &items);
        prop_assert_eq!(keys(&from_empty.to_add), keys(&items));
        prop_assert!(from_empty.to_remove.is_empty());

        let to_empty = ChangeSet::between(&items, &empty);
        prop_assert_eq!(keys(&to_empty.to_remove), keys(&items));
        prop_assert!(to_empty.to_add.is_empty());
    }

    /// Applying the change set to old reproduces new's key set.
    #[test]
    fn applying_changes_converges(old in collection_strategy(), new in collection_strategy()) {
        let changes = ChangeSet::between(&old, &new);
        let mut applied = keys(&old);
        for item in &changes.to_remove {
            applied.remove(&item.key());
        }
        for item in &changes.to_add {
            applied.insert(item.key());
        }
        prop_assert_eq!(applied, keys(&new));
    }
}

#[test]
fn both_empty_is_empty() {
    let empty: Vec<Entitlement> = Vec::new();
    assert!(ChangeSet::between(&empty, &empty).is_empty());
}
