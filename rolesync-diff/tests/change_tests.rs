use pretty_assertions::assert_eq;
use rolesync_diff::{
    ChangeSet, CollectionSide, ExtractionError, KeyedItem, OpKind, Operation, diff_by,
    extract_items, process_changes,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Owner {
    name: String,
    rank: String,
}

impl KeyedItem for Owner {
    type Key = (String, String);

    fn key(&self) -> Self::Key {
        (self.name.clone(), self.rank.clone())
    }
}

fn owner(name: &str, rank: &str) -> Owner {
    Owner {
        name: name.to_string(),
        rank: rank.to_string(),
    }
}

// ── ChangeSet::between ──────────────────────────────────────────

#[test]
fn added_item_is_reported() {
    let old = vec![owner("A", "1")];
    let new = vec![owner("A", "1"), owner("B", "2")];

    let changes = ChangeSet::between(&old, &new);
    assert_eq!(changes.to_add, vec![owner("B", "2")]);
    assert!(changes.to_remove.is_empty());
}

#[test]
fn removed_item_is_reported() {
    let old = vec![owner("A", "1"), owner("B", "2")];
    let new = vec![owner("B", "2")];

    let changes = ChangeSet::between(&old, &new);
    assert!(changes.to_add.is_empty());
    assert_eq!(changes.to_remove, vec![owner("A", "1")]);
}

#[test]
fn rank_change_is_remove_plus_add() {
    let old = vec![owner("alice", "1")];
    let new = vec![owner("alice", "2")];

    let changes = ChangeSet::between(&old, &new);
    assert_eq!(changes.to_remove, vec![owner("alice", "1")]);
    assert_eq!(changes.to_add, vec![owner("alice", "2")]);
    assert_eq!(changes.len(), 2);
}

#[test]
fn order_of_inputs_does_not_matter() {
    let old = vec![owner("c", "1"), owner("a", "1")];
    let new = vec![owner("a", "1"), owner("c", "1")];

    assert!(ChangeSet::between(&old, &new).is_empty());
}

#[test]
fn delimiter_lookalikes_are_distinct_keys() {
    let old = vec![owner("A|B", "C")];
    let new = vec![owner("A", "B|C")];

    let changes = ChangeSet::between(&old, &new);
    assert_eq!(changes.to_remove, vec![owner("A|B", "C")]);
    assert_eq!(changes.to_add, vec![owner("A", "B|C")]);
}

#[test]
fn duplicate_keys_collapse_to_last_occurrence() {
    #[derive(Debug, Clone, PartialEq)]
    struct Tagged {
        id: u32,
        note: &'static str,
    }

    let old: Vec<Tagged> = Vec::new();
    let new = vec![
        Tagged { id: 1, note: "first" },
        Tagged { id: 1, note: "second" },
    ];

    let changes = diff_by(&old, &new, |t| t.id);
    assert_eq!(changes.to_add, vec![Tagged { id: 1, note: "second" }]);
}

#[test]
fn non_key_changes_are_invisible() {
    #[derive(Debug, Clone, PartialEq)]
    struct Member {
        name: &'static str,
        display: &'static str,
    }

    let old = vec![Member { name: "bob", display: "Bob" }];
    let new = vec![Member { name: "bob", display: "Robert" }];

    assert!(diff_by(&old, &new, |m| m.name).is_empty());
}

// ── into_operations ─────────────────────────────────────────────

#[test]
fn operations_emit_removes_before_adds_in_key_order() {
    let old = vec![owner("z", "1"), owner("m", "1"), owner("keep", "1")];
    let new = vec![owner("keep", "1"), owner("d", "1"), owner("b", "1")];

    let ops = ChangeSet::between(&old, &new).into_operations(|o, _| o.name.clone());
    assert_eq!(
        ops,
        vec![
            Operation::remove("m".to_string()),
            Operation::remove("z".to_string()),
            Operation::add("b".to_string()),
            Operation::add("d".to_string()),
        ]
    );
}

#[test]
fn payload_builder_receives_kind() {
    let ops = ChangeSet::between(&[owner("a", "1")], &[owner("b", "1")])
        .into_operations(|o, kind| format!("{kind}:{}", o.name));

    assert_eq!(ops[0].payload, "REMOVE:a");
    assert_eq!(ops[1].payload, "ADD:b");
}

#[test]
fn operation_map_keeps_kind() {
    let op = Operation::remove(3).map(|n| n * 2);
    assert_eq!(op.kind, OpKind::Remove);
    assert_eq!(op.payload, 6);
}

#[test]
fn op_kind_wire_format() {
    assert_eq!(serde_json::to_string(&OpKind::Add).unwrap(), "\"ADD\"");
    assert_eq!(serde_json::to_string(&OpKind::Remove).unwrap(), "\"REMOVE\"");
    assert_eq!(OpKind::Remove.to_string(), "REMOVE");
}

// ── extract_items / process_changes ─────────────────────────────

#[test]
fn absent_and_null_collections_are_empty() {
    let none: Vec<Owner> = extract_items(None, CollectionSide::Old).unwrap();
    let null: Vec<Owner> = extract_items(Some(&json!(null)), CollectionSide::New).unwrap();
    assert!(none.is_empty());
    assert!(null.is_empty());
}

#[test]
fn process_changes_owner_scenario() {
    let state = json!([{ "name": "alice", "rank": "1" }]);
    let plan = json!([
        { "name": "alice", "rank": "1" },
        { "name": "bob", "rank": "2" }
    ]);

    let ops = process_changes(Some(&state), Some(&plan), Owner::key, |o: &Owner, kind| {
        (o.name.clone(), o.rank.clone(), kind)
    })
    .unwrap();

    assert_eq!(
        ops,
        vec![Operation::add(("bob".to_string(), "2".to_string(), OpKind::Add))]
    );
}

#[test]
fn process_changes_rejects_non_list() {
    let plan = json!({ "name": "alice" });
    let err = process_changes(None, Some(&plan), Owner::key, |o: &Owner, _| o.clone()).unwrap_err();

    assert!(matches!(
        err,
        ExtractionError::NotAList {
            side: CollectionSide::New,
            found: "object"
        }
    ));
}

#[test]
fn process_changes_rejects_malformed_element() {
    let state = json!([{ "name": "alice", "rank": "1" }, { "name": 7 }]);
    let err = process_changes(Some(&state), None, Owner::key, |o: &Owner, _| o.clone()).unwrap_err();

    assert_eq!(err.side(), CollectionSide::Old);
    match err {
        ExtractionError::Malformed { index, .. } => assert_eq!(index, 1),
        other => panic!("unexpected error: {other}"),
    }
}
