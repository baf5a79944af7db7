//! Reset integration tests

use std::collections::HashMap;

use pathstore::{Event, Store, bus::topics, path, validation::FieldError};
use serde_json::json;

use crate::helpers::*;

#[test]
fn test_reset_clears_dirty_and_errors() {
    let store = friends_store();
    store.set_value(path!["friends", 0, "name"], "Lenny").unwrap();
    store.array().append(path!["friends"], json!({"name": "Carl"})).unwrap();
    store
        .add_error(path!["friends", 1, "name"], FieldError::new("x", "y"))
        .unwrap();
    assert!(store.is_dirty());

    store.reset().unwrap();

    assert!(!store.is_dirty());
    assert!(store.errors().is_empty());
    assert_eq!(store.get_values(), friends_value());
    assert!(store.flatten().iter().all(|entry| entry.node.meta().error().is_none()));
}

#[test]
fn test_reset_fires_each_path_once() {
    let store = friends_store();
    let paths: Vec<String> = store
        .flatten()
        .into_iter()
        .map(|entry| entry.display_path)
        .collect();
    let counters: HashMap<String, _> = paths
        .iter()
        .map(|display| (display.clone(), count(&store, display)))
        .collect();

    store.reset().unwrap();

    for (display, counter) in &counters {
        assert_eq!(counter.get(), 1, "topic '{display}' fired {} times", counter.get());
    }
}

#[test]
fn test_reset_publish_order() {
    let store = friends_store();
    let order = record_order(
        &store,
        &[
            "",
            "friends",
            "friends[1].name",
            topics::DIRTY,
            topics::ERRORS,
            topics::RESET,
        ],
    );

    store.reset().unwrap();

    assert_eq!(
        *order.borrow(),
        ["", "friends", "friends[1].name", "dirty", "errors", "reset"]
    );
}

#[test]
fn test_reset_payloads() {
    let store = friends_store();
    let (name_events, _a) = record(&store, "friends[0].name");
    let (dirty_events, _b) = record(&store, topics::DIRTY);
    let (reset_events, _c) = record(&store, topics::RESET);

    store.set_value(path!["friends", 0, "name"], "Lenny").unwrap();
    store.reset().unwrap();

    assert_eq!(
        name_events.borrow().last(),
        Some(&Event::Value(json!("Homer")))
    );
    assert_eq!(
        dirty_events.borrow().last(),
        Some(&Event::Dirty(Vec::new()))
    );
    let events = reset_events.borrow();
    let Event::Reset(root) = &events[0] else {
        panic!("expected the new root");
    };
    assert_eq!(root.to_value(), friends_value());
}

#[test]
fn test_reset_assigns_new_ids() {
    let store = friends_store();
    let before: Vec<_> = store.flatten().iter().map(|e| e.node.id()).collect();

    store.reset().unwrap();

    let after: Vec<_> = store.flatten().iter().map(|e| e.node.id()).collect();
    assert_eq!(before.len(), after.len());
    assert!(before.iter().all(|id| !after.contains(id)));
}

#[test]
fn test_reset_to_new_defaults() {
    let store = Store::new(json!({"name": "Homer"}));
    store
        .reset_to(json!({"name": "Marge", "kids": ["Bart"]}))
        .unwrap();

    assert_eq!(store.get(path!["kids", 0]), Some(json!("Bart")));
    store.set_value(path!["name"], "Homer").unwrap();
    assert!(store.is_dirty());

    store.reset().unwrap();
    assert_eq!(store.get(path!["name"]), Some(json!("Marge")));
}
