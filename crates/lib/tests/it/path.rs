//! Path codec integration tests

use pathstore::path;
use pathstore::path::{Path, Segment, StoragePath};
use proptest::prelude::*;

#[test]
fn test_bracketed_numbers_become_indices() {
    assert_eq!(
        Path::from_display_path("items[0].nested.name"),
        path!["items", 0, "nested", "name"]
    );
}

#[test]
fn test_dotted_numbers_stay_keys() {
    let path = Path::from_display_path("items.100.nested.name");
    assert_eq!(path, path!["items", "100", "nested", "name"]);
    assert_eq!(path.segments()[1], Segment::Key("100".to_string()));
}

#[test]
fn test_storage_path_interleaves_value_tokens() {
    let storage = path!["set", 0, "obj", "name"].to_storage_path();
    let rendered: Vec<String> = storage.segments().iter().map(|s| s.to_string()).collect();
    assert_eq!(
        rendered,
        ["value", "set", "value", "0", "value", "obj", "value", "name"]
    );
    assert!(storage.segments()[3].is_index());
}

#[test]
fn test_root_paths() {
    assert_eq!(path![].to_display_path(), "");
    assert_eq!(path![].to_storage_path(), StoragePath::root());
    assert_eq!(Path::from_display_path(""), path![]);
}

#[test]
fn test_from_str_and_display_agree() {
    let path: Path = "friends[1].name".parse().unwrap();
    assert_eq!(path.to_string(), "friends[1].name");
    assert_eq!(path.parent().unwrap().to_string(), "friends[1]");
}

/// A dot chunk: a key, optionally followed by one bracketed index.
fn chunk() -> impl Strategy<Value = Vec<Segment>> {
    ("[a-z_][a-z0-9_]{0,8}", proptest::option::of(0usize..1000)).prop_map(|(key, index)| {
        let mut segments = vec![Segment::Key(key)];
        segments.extend(index.map(Segment::Index));
        segments
    })
}

fn display_grammar_path() -> impl Strategy<Value = Path> {
    proptest::collection::vec(chunk(), 0..6)
        .prop_map(|chunks| chunks.into_iter().flatten().collect::<Path>())
}

proptest! {
    #[test]
    fn prop_display_path_round_trip(path in display_grammar_path()) {
        let display = path.to_display_path();
        let decoded = Path::from_display_path(&display);
        prop_assert_eq!(decoded.to_storage_path(), path.to_storage_path());
        prop_assert_eq!(decoded, path);
    }

    #[test]
    fn prop_storage_path_shape(path in display_grammar_path()) {
        let storage = path.to_storage_path();
        prop_assert_eq!(storage.len(), path.len() * 2);
        prop_assert_eq!(storage.to_path(), path);
    }
}
