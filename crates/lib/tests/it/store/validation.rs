//! Validation and error bookkeeping integration tests

use pathstore::{
    Event,
    Store,
    bus::topics,
    node::MetaUpdate,
    path,
    store::{ErrorOptions, StoreError},
    validation::{FieldError, Rule, RuleSet},
};
use serde_json::{Value, json};

use crate::helpers::*;

fn require(store: &Store, path: &pathstore::Path) {
    store
        .set_meta(path, MetaUpdate::new().validations(vec![Rule::required("Required")]))
        .unwrap();
}

#[test]
fn test_required_attaches_and_clears_on_change() {
    let store = on_change_store(json!({"name": ""}));
    let path = path!["name"];
    require(&store, &path);

    store.validate(&path).unwrap();
    let error = store.node(&path).unwrap().meta().error().cloned().unwrap();
    assert_eq!(error.kind, "required");
    assert_eq!(error.message, "Required");

    store.set_value(&path, "Homer").unwrap();
    assert!(store.node(&path).unwrap().meta().error().is_none());
    assert!(store.errors().is_empty());
}

#[test]
fn test_on_change_validates_on_every_write() {
    let store = on_change_store(json!({"age": 40}));
    store
        .set_meta(
            path!["age"],
            MetaUpdate::new().validations(vec![
                Rule::min(18.0, "Too young"),
                Rule::max(120.0, "Too old"),
            ]),
        )
        .unwrap();

    store.set_value(path!["age"], 12).unwrap();
    assert_eq!(store.errors()[0].node.meta().error().unwrap().kind, "min");

    store.set_value(path!["age"], 130).unwrap();
    assert_eq!(store.errors()[0].node.meta().error().unwrap().kind, "max");

    store.set_value(path!["age"], "50").unwrap();
    assert!(store.errors().is_empty());
}

#[test]
fn test_validate_store_collects_every_failure() {
    let store = friends_store();
    store.set_value(path!["friends", 0, "name"], "").unwrap();
    store.set_value(path!["friends", 1, "name"], "").unwrap();
    require(&store, &path!["friends", 0, "name"]);
    require(&store, &path!["friends", 1, "name"]);

    let err = store.validate_store().unwrap_err();
    assert!(err.is_validation_failure());
    let entries = err.validation_entries().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].display_path, "friends[0].name");
    assert_eq!(entries[0].path, path!["friends", 0, "name"]);
    assert_eq!(entries[1].display_path, "friends[1].name");
    assert_eq!(entries[1].path, path!["friends", 1, "name"]);
    assert!(entries.iter().all(|entry| entry.node.meta().error().is_some()));
}

#[test]
fn test_validate_store_passes_without_errors() {
    let store = friends_store();
    require(&store, &path!["friends", 0, "name"]);
    store.validate_store().unwrap();
    assert!(store.errors().is_empty());
}

#[test]
fn test_array_length_rules() {
    let store = friends_store();
    store
        .set_meta(
            path!["friends"],
            MetaUpdate::new().validations(vec![Rule::max_length(2, "At most two friends")]),
        )
        .unwrap();

    store.array().append(path!["friends"], json!({"name": "Lenny"})).unwrap();
    let err = store.validate_store().unwrap_err();
    let entries = err.validation_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].display_path, "friends");
    assert_eq!(
        entries[0].node.meta().error().unwrap().value,
        Some(json!(2))
    );
}

#[test]
fn test_malformed_regex_never_fires() {
    let store = Store::new(json!({"code": "ABC"}));
    store
        .set_meta(
            path!["code"],
            MetaUpdate::new().validations(vec![Rule::regex("([a-z", "broken")]),
        )
        .unwrap();
    store.validate_store().unwrap();
}

#[test]
fn test_custom_rule_sees_whole_store() {
    let store = Store::new(json!({"password": "secret", "confirm": "secrets"}));
    store
        .set_meta(
            path!["confirm"],
            MetaUpdate::new().validations(vec![Rule::custom(
                |value: &Value, values: &Value| value == &values["password"],
                "Passwords must match",
            )]),
        )
        .unwrap();

    let err = store.validate_store().unwrap_err();
    assert_eq!(err.validation_entries().unwrap()[0].display_path, "confirm");

    store.clear_errors().unwrap();
    store.set_value(path!["confirm"], "secret").unwrap();
    store.validate_store().unwrap();
}

#[test]
fn test_errors_topic_fires_only_on_list_change() {
    let store = friends_store();
    let errors = count(&store, topics::ERRORS);
    let meta = count(&store, topics::META);
    let per_path = count(&store, "friends[0].name");
    let path = path!["friends", 0, "name"];

    store.add_error(&path, FieldError::new("custom", "one")).unwrap();
    store.add_error(&path, FieldError::new("custom", "two")).unwrap();
    assert_eq!(errors.get(), 1);
    assert_eq!(meta.get(), 2);
    assert_eq!(per_path.get(), 2);

    store.clear_error(&path).unwrap();
    store.clear_error(&path).unwrap();
    assert_eq!(errors.get(), 2);
    assert_eq!(meta.get(), 4);
    assert_eq!(per_path.get(), 4);
}

#[test]
fn test_silent_error_options() {
    let store = friends_store();
    let errors = count(&store, topics::ERRORS);
    let path = path!["friends", 1, "name"];

    store
        .add_error_with(&path, FieldError::new("server", "Taken"), ErrorOptions::silent())
        .unwrap();
    assert_eq!(errors.get(), 0);
    assert_eq!(store.errors().len(), 1);

    store.clear_error_with(&path, ErrorOptions::silent()).unwrap();
    assert_eq!(errors.get(), 0);
    assert!(store.errors().is_empty());
}

#[test]
fn test_error_ops_on_missing_path() {
    let store = friends_store();
    let err = store
        .add_error(path!["nobody"], FieldError::new("x", "y"))
        .unwrap_err();
    assert!(matches!(
        err,
        pathstore::Error::Store(StoreError::PathNotFound { .. })
    ));
    assert!(store.clear_error(path!["nobody"]).unwrap_err().is_not_found());
}

#[test]
fn test_clear_errors_touches_every_node() {
    let store = friends_store();
    let meta = count(&store, topics::META);
    store
        .add_error(path!["friends", 0], FieldError::new("x", "y"))
        .unwrap();

    store.clear_errors().unwrap();
    assert!(store.errors().is_empty());
    // one for add_error, then one per node (root, friends, 2 items, 2 names)
    assert_eq!(meta.get(), 1 + 6);
}

#[test]
fn test_rule_set_from_json() {
    let store = friends_store();
    let rules = RuleSet::from_json(
        r#"{
            "friends[0].name": [{"type": "minLength", "value": 6, "message": "Too short"}],
            "friends": [{"type": "minLength", "value": 1, "message": "Add a friend"}]
        }"#,
    )
    .unwrap();
    store.apply_rules(&rules).unwrap();

    let err = store.validate_store().unwrap_err();
    let entries = err.validation_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].display_path, "friends[0].name");
}

#[test]
fn test_submit_runs_validate_store() {
    let store = friends_store();
    require(&store, &path!["friends", 0, "name"]);

    assert_eq!(store.submit(None).unwrap(), friends_value());

    store.set_value(path!["friends", 0, "name"], "").unwrap();
    let err = store.submit(None).unwrap_err();
    assert_eq!(err.validation_entries().unwrap().len(), 1);
}

#[test]
fn test_submit_clears_stale_errors_first() {
    let store = friends_store();
    store
        .add_error(path!["friends", 1], FieldError::new("server", "stale"))
        .unwrap();

    store.submit(None).unwrap();
    assert!(store.errors().is_empty());
}

#[test]
fn test_error_follows_node_when_items_shift() {
    let store = friends_store();
    store
        .add_error(path!["friends", 1, "name"], FieldError::new("server", "Taken"))
        .unwrap();

    store.array().remove(path!["friends"], 0).unwrap();

    let errors = store.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].display_path, "friends[0].name");
    assert_eq!(errors[0].node.to_value(), json!("Barney"));
    assert_eq!(errors[0].node.meta().error().unwrap().message, "Taken");
}

#[test]
fn test_removed_node_leaves_error_list() {
    let store = friends_store();
    let (events, _sub) = record(&store, topics::ERRORS);
    store
        .add_error(path!["friends", 0, "name"], FieldError::new("server", "Taken"))
        .unwrap();

    store.array().remove(path!["friends"], 0).unwrap();

    assert!(store.errors().is_empty());
    assert_eq!(events.borrow().len(), 2);
    assert_eq!(events.borrow().last(), Some(&Event::Errors(Vec::new())));
    store.validate_store().unwrap();
}

#[test]
fn test_structural_replace_drops_descendant_errors() {
    let store = friends_store();
    store
        .add_error(path!["friends", 1, "name"], FieldError::new("server", "Taken"))
        .unwrap();

    store
        .set_value(path!["friends"], json!([{"name": "Homer"}, {"name": "Moe"}]))
        .unwrap();
    assert!(store.errors().is_empty());
}
