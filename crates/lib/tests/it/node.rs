//! Node factory and tree addressing integration tests

use pathstore::node::{Node, NodeValue, WriteOptions, flatten, resolve, write};
use pathstore::path;
use pathstore::value::ValueShape;
use serde_json::json;

#[test]
fn test_parse_inverts_create() {
    let value = json!({
        "name": "Homer",
        "age": 39,
        "employed": true,
        "spouse": null,
        "kids": [{"name": "Bart"}, {"name": "Lisa", "instruments": ["sax"]}]
    });
    assert_eq!(Node::from_value(&value).to_value(), value);
}

#[test]
fn test_resolve_reads_nested_values() {
    let root = Node::from_value(&json!({"kids": [{"name": "Bart"}, {"name": "Lisa"}]}));

    let lisa = resolve(&root, &path!["kids", 1, "name"].to_storage_path()).unwrap();
    assert_eq!(lisa.to_value(), json!("Lisa"));
    assert_eq!(lisa.shape(), ValueShape::Primitive);

    assert!(resolve(&root, &path!["kids", 2, "name"].to_storage_path()).is_none());
    assert!(resolve(&root, &path!["kids", "name"].to_storage_path()).is_none());
}

#[test]
fn test_default_value_is_a_snapshot() {
    let root = Node::from_value(&json!({"kids": ["Bart"]}));
    let kids = resolve(&root, &path!["kids"].to_storage_path()).unwrap();
    assert_eq!(kids.meta().default_value(), &json!(["Bart"]));
    assert!(!kids.meta().is_dirty());
    assert!(!kids.meta().is_touched());
    assert!(kids.meta().error().is_none());
    assert!(kids.meta().validations().is_none());
}

#[test]
fn test_write_deep_path_into_empty_tree() {
    let mut root = Node::from_value(&json!({}));
    write(
        &mut root,
        &path!["a", "b", 1, "c"].to_storage_path(),
        Node::from_value(&json!(true)),
        WriteOptions::validate_ancestors(),
    );

    assert_eq!(root.to_value(), json!({"a": {"b": [null, {"c": true}]}}));
    for entry in flatten(&root) {
        assert!(
            entry.node.meta().is_established(),
            "{} should be established",
            entry
        );
    }

    let list = resolve(&root, &path!["a", "b"].to_storage_path()).unwrap();
    let NodeValue::Array {
        items,
        default_field_ids,
    } = list.value()
    else {
        panic!("expected an array at a.b");
    };
    assert_eq!(default_field_ids.len(), items.len());
}

#[test]
fn test_flatten_visits_parents_first() {
    let root = Node::from_value(&json!({"a": {"b": [1]}, "c": 2}));
    let entries = flatten(&root);
    let paths: Vec<&str> = entries.iter().map(|e| e.display_path.as_str()).collect();
    assert_eq!(paths, ["", "a", "a.b", "a.b[0]", "c"]);

    for entry in &entries {
        assert_eq!(entry.path.to_display_path(), entry.display_path);
        assert_eq!(
            resolve(&root, &entry.path.to_storage_path()).unwrap().id(),
            entry.node.id()
        );
    }
}
