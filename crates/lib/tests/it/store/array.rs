//! Array operation integration tests

use pathstore::{Event, Store, bus::topics, path};
use serde_json::json;

use crate::helpers::*;

#[test]
fn test_append_then_remove_restores_clean_state() {
    let store = friends_store();
    let friends_id = store.node(path!["friends"]).unwrap().id();

    store
        .array()
        .append(path!["friends"], json!({"name": ""}))
        .unwrap();
    assert_eq!(store.dirty_ids(), [friends_id]);
    assert_eq!(
        store.get(path!["friends", 2]),
        Some(json!({"name": ""}))
    );

    store.array().remove(path!["friends"], 2).unwrap();
    assert!(store.dirty_ids().is_empty());
    assert!(!store.is_dirty());
    assert_eq!(store.get_values(), friends_value());
}

#[test]
fn test_move_and_move_back_is_clean() {
    let store = Store::new(json!({"list": ["a", "b", "c", "d"]}));

    store.array().move_item(path!["list"], 0, 3).unwrap();
    assert_eq!(store.get(path!["list"]), Some(json!(["b", "c", "d", "a"])));
    assert!(store.is_dirty());

    store.array().move_item(path!["list"], 3, 0).unwrap();
    assert_eq!(store.get(path!["list"]), Some(json!(["a", "b", "c", "d"])));
    assert!(!store.is_dirty());
    assert!(!store.node(path!["list"]).unwrap().meta().is_dirty());
}

#[test]
fn test_moves_keep_item_identity() {
    let store = Store::new(json!({"list": ["a", "b"]}));
    let first = store.node(path!["list", 0]).unwrap().id();

    store.array().move_item(path!["list"], 0, 1).unwrap();
    assert_eq!(store.node(path!["list", 1]).unwrap().id(), first);
}

#[test]
fn test_dirty_published_only_on_set_change() {
    let store = friends_store();
    let dirty = count(&store, topics::DIRTY);

    store.array().append(path!["friends"], json!({"name": "Lenny"})).unwrap();
    store.array().append(path!["friends"], json!({"name": "Carl"})).unwrap();
    assert_eq!(dirty.get(), 1);

    store.array().remove_many(path!["friends"], 2, 2).unwrap();
    assert_eq!(dirty.get(), 2);
    assert!(!store.is_dirty());
}

#[test]
fn test_array_publishes_node_snapshot() {
    let store = friends_store();
    let (path_events, _a) = record(&store, "friends");
    let (value_events, _b) = record(&store, topics::VALUE);

    store.array().prepend(path!["friends"], json!({"name": "Moe"})).unwrap();

    let events = path_events.borrow();
    let Event::Node(snapshot) = &events[0] else {
        panic!("expected a node snapshot");
    };
    assert_eq!(snapshot.items().unwrap().len(), 3);
    assert!(snapshot.meta().is_dirty());

    let changed = value_events.borrow()[0].as_changed().unwrap().clone();
    assert_eq!(changed.display_path, "friends");
    assert_eq!(
        changed.node.to_value()[0],
        json!({"name": "Moe"})
    );
}

#[test]
fn test_insert_and_splice() {
    let store = Store::new(json!({"list": [1, 5]}));
    store
        .array()
        .insert(path!["list"], 1, [json!(2), json!(3)])
        .unwrap();
    store.array().splice(path!["list"], 3, 1, [4, 5]).unwrap();
    assert_eq!(store.get(path!["list"]), Some(json!([1, 2, 3, 4, 5])));
}

#[test]
fn test_array_ops_on_non_arrays_fail() {
    let store = friends_store();
    let err = store
        .array()
        .append(path!["friends", 0, "name"], "x")
        .unwrap_err();
    assert!(err.is_type_error());
    assert!(
        err.to_string().contains("friends[0].name"),
        "unexpected message: {err}"
    );

    let err = store.array().move_item(path!["enemies"], 0, 1).unwrap_err();
    assert!(err.is_type_error());
}

#[test]
fn test_array_replaced_by_set_value_keeps_baseline() {
    let store = Store::new(json!({"list": ["a"]}));
    store.set_value(path!["list"], json!(["a"])).unwrap();

    // New children have new ids, so the structure differs from the baseline
    store.array().move_item(path!["list"], 0, 0).unwrap();
    assert!(store.node(path!["list"]).unwrap().meta().is_dirty());
}

#[test]
fn test_removing_item_drops_its_dirty_children() {
    let store = friends_store();
    let friends_id = store.node(path!["friends"]).unwrap().id();
    store.set_value(path!["friends", 1, "name"], "Lenny").unwrap();

    store.array().remove(path!["friends"], 1).unwrap();
    assert_eq!(store.dirty_ids(), [friends_id]);
}
