//! Property-based tests for merging, deduplication and path patterns.
//!
//! Documents are generated with a fixed type per key so that every merge is
//! well-formed: `name` is always a scalar, `items` always a list and
//! `settings` always a mapping of scalars.

#[cfg(test)]
mod proptest_tests {
    use crate::config::PolicyConfig;
    use crate::dedup::Deduplicator;
    use crate::document::{key, Document};
    use crate::merge::merge_documents;
    use crate::path::PathPattern;
    use crate::policy::AllowedPathPolicy;
    use proptest::prelude::*;
    use serde_yaml::{Mapping, Value};

    fn document_strategy() -> impl Strategy<Value = Document> {
        (
            proptest::option::of("[a-z]{1,6}"),
            proptest::option::of(proptest::collection::vec(0i64..100, 0..4)),
            proptest::option::of(proptest::collection::btree_map(
                "[a-c]",
                "[a-z]{0,4}",
                0..3,
            )),
        )
            .prop_map(|(name, items, settings)| {
                let mut document = Document::new();
                if let Some(name) = name {
                    document.insert(key("name"), Value::String(name));
                }
                if let Some(items) = items {
                    document.insert(
                        key("items"),
                        Value::Sequence(items.into_iter().map(Value::from).collect()),
                    );
                }
                if let Some(settings) = settings {
                    let mut mapping = Mapping::new();
                    for (k, v) in settings {
                        mapping.insert(key(&k), Value::String(v));
                    }
                    document.insert(key("settings"), Value::Mapping(mapping));
                }
                document
            })
    }

    /// A file entry for one of a few paths: a base declaration, an append
    /// fragment, or an append fragment with a different mode.
    fn file_entry_strategy() -> impl Strategy<Value = Value> {
        (0usize..3, 0usize..3, "[a-z]{1,4}").prop_map(|(path, shape, text)| {
            let mut entry = Mapping::new();
            entry.insert(key("path"), Value::from(format!("/etc/file{}", path)));
            let mut inline = Mapping::new();
            inline.insert(key("inline"), Value::from(text));
            match shape {
                0 => {
                    entry.insert(key("contents"), Value::Mapping(inline));
                }
                1 => {
                    entry.insert(key("append"), Value::Sequence(vec![Value::Mapping(inline)]));
                }
                _ => {
                    entry.insert(key("mode"), Value::from(420));
                    entry.insert(key("append"), Value::Sequence(vec![Value::Mapping(inline)]));
                }
            }
            Value::Mapping(entry)
        })
    }

    fn storage_document(files: Vec<Value>) -> Document {
        let mut storage = Mapping::new();
        storage.insert(key("files"), Value::Sequence(files));
        let mut document = Document::new();
        document.insert(key("storage"), Value::Mapping(storage));
        document
    }

    proptest! {
        /// Property: merging is associative in fragment order
        #[test]
        fn merge_is_associative(
            a in document_strategy(),
            b in document_strategy(),
            c in document_strategy(),
        ) {
            let left_first = merge_documents(vec![
                merge_documents(vec![a.clone(), b.clone()]).unwrap(),
                c.clone(),
            ])
            .unwrap();
            let right_first = merge_documents(vec![
                a,
                merge_documents(vec![b, c]).unwrap(),
            ])
            .unwrap();
            prop_assert_eq!(left_first, right_first);
        }

        /// Property: an empty document is a neutral element
        #[test]
        fn merge_with_empty_is_identity(a in document_strategy()) {
            let merged = merge_documents(vec![Document::new(), a.clone(), Document::new()]).unwrap();
            prop_assert_eq!(merged, a);
        }

        /// Property: merged lists hold every item of both sides in order
        #[test]
        fn merge_concatenates_lists(
            left in proptest::collection::vec(0i64..100, 0..5),
            right in proptest::collection::vec(0i64..100, 0..5),
        ) {
            let as_document = |items: &[i64]| {
                let mut document = Document::new();
                document.insert(
                    key("items"),
                    Value::Sequence(items.iter().copied().map(Value::from).collect()),
                );
                document
            };
            let merged = merge_documents(vec![as_document(&left), as_document(&right)]).unwrap();

            let expected: Vec<i64> = left.iter().chain(right.iter()).copied().collect();
            prop_assert_eq!(merged, as_document(&expected));
        }

        /// Property: deduplicating a deduplicated document changes nothing
        #[test]
        fn dedup_is_idempotent(files in proptest::collection::vec(file_entry_strategy(), 0..8)) {
            let policy = AllowedPathPolicy::new(&PolicyConfig::default()).unwrap();
            let dedup = Deduplicator::new(&policy);

            let mut once = storage_document(files);
            if dedup.deduplicate(&mut once).is_ok() {
                let mut twice = once.clone();
                dedup.deduplicate(&mut twice).unwrap();
                prop_assert_eq!(once, twice);
            }
        }

        /// Property: deduplicated file lists hold each path once
        #[test]
        fn dedup_leaves_unique_paths(files in proptest::collection::vec(file_entry_strategy(), 0..8)) {
            let policy = AllowedPathPolicy::new(&PolicyConfig::default()).unwrap();
            let mut document = storage_document(files);
            if Deduplicator::new(&policy).deduplicate(&mut document).is_ok() {
                let paths: Vec<&str> = document
                    .get("storage")
                    .and_then(|storage| storage.get("files"))
                    .and_then(Value::as_sequence)
                    .map(|files| files.iter().filter_map(|f| f["path"].as_str()).collect())
                    .unwrap_or_default();
                let mut sorted = paths.clone();
                sorted.sort_unstable();
                sorted.dedup();
                prop_assert_eq!(sorted.len(), paths.len());
            }
        }

        /// Property: a literal relative pattern matches itself under any parent
        #[test]
        fn literal_pattern_matches_below_any_parent(
            name in "[a-z]{1,8}\\.conf",
            parents in proptest::collection::vec("[a-z]{1,5}", 0..4),
        ) {
            let pattern = PathPattern::new(&name).unwrap();
            let path = format!("/{}", parents.iter().chain(std::iter::once(&name)).cloned().collect::<Vec<_>>().join("/"));
            prop_assert!(pattern.matches(&path));
        }

        /// Property: `/*` matches exactly the top-level paths
        #[test]
        fn root_star_matches_only_top_level(parts in proptest::collection::vec("[a-z]{1,5}", 1..4)) {
            let pattern = PathPattern::new("/*").unwrap();
            let path = format!("/{}", parts.join("/"));
            prop_assert_eq!(pattern.matches(&path), parts.len() == 1);
        }
    }
}
