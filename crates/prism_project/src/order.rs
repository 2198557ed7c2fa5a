//! Collection ordering.
//!
//! A sequence with a native order-by (a query builder, say) is asked to
//! order itself. Anything else is materialized and sorted in memory by
//! the key. Ordering never fails: when it cannot be done the elements
//! keep their original order and a diagnostic is recorded.

use prism_core::{
    DiagnosticKind, Diagnostics, Direction, GraphSequence, GraphValue, NativeOrder, Scalar,
};
use std::cmp::Ordering;

/// Order the elements of `sequence` by `key`.
///
/// In memory, the natural order of the data is taken to be newest first,
/// so `Asc` (chronological) sorts the keys descending and `Desc` sorts
/// them ascending. The sort is stable, which keeps ties in their
/// original relative order and makes ordering idempotent.
///
/// `path` locates the collection in diagnostic messages.
pub fn order_sequence<'s>(
    sequence: &'s dyn GraphSequence,
    key: &str,
    direction: Direction,
    path: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<GraphValue<'s>> {
    match sequence.native_order_by(key, direction) {
        NativeOrder::Ordered(elements) => {
            tracing::debug!(path, key, %direction, "ordered by native capability");
            elements
        }
        NativeOrder::UnknownKey => {
            diagnostics.record(
                DiagnosticKind::InvalidOrderField,
                format!("Cannot order {} by {}: unknown field", path, key),
            );
            sequence.elements()
        }
        NativeOrder::Unsupported => {
            sort_in_memory(sequence.elements(), key, direction, path, diagnostics)
        }
    }
}

fn sort_in_memory<'s>(
    elements: Vec<GraphValue<'s>>,
    key: &str,
    direction: Direction,
    path: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<GraphValue<'s>> {
    let keys = match sort_keys(&elements, key) {
        Ok(keys) => keys,
        Err((kind, reason)) => {
            diagnostics.record(kind, format!("Cannot order {} by {}: {}", path, key, reason));
            return elements;
        }
    };

    // Comparability is shared by kind, so the first key covers every pair.
    if let Some(first) = keys.first() {
        if let Some(i) = keys.iter().position(|other| first.compare(other).is_none()) {
            diagnostics.record(
                DiagnosticKind::UnorderableCollection,
                format!(
                    "Cannot order {} by {}: {} and {} values are not comparable",
                    path,
                    key,
                    first.kind_name(),
                    keys[i].kind_name()
                ),
            );
            return elements;
        }
    }

    let mut indexed: Vec<(Scalar, GraphValue<'s>)> = keys.into_iter().zip(elements).collect();
    indexed.sort_by(|(a, _), (b, _)| {
        let ordering = a.compare(b).unwrap_or(Ordering::Equal);
        match direction {
            Direction::Asc => ordering.reverse(),
            Direction::Desc => ordering,
        }
    });
    indexed.into_iter().map(|(_, element)| element).collect()
}

fn sort_keys(
    elements: &[GraphValue<'_>],
    key: &str,
) -> Result<Vec<Scalar>, (DiagnosticKind, String)> {
    elements
        .iter()
        .enumerate()
        .map(|(i, element)| match sort_key(element, key) {
            SortKey::Value(value) => Ok(value),
            SortKey::Missing => Err((
                DiagnosticKind::InvalidOrderField,
                format!("element {} has no such field", i),
            )),
            SortKey::NotScalar => Err((
                DiagnosticKind::UnorderableCollection,
                format!("element {} is not a plain value", i),
            )),
        })
        .collect()
}

enum SortKey {
    Value(Scalar),
    Missing,
    NotScalar,
}

fn sort_key(element: &GraphValue<'_>, key: &str) -> SortKey {
    let GraphValue::Object(object) = element else {
        return SortKey::Missing;
    };
    match object.get_attribute(key) {
        Some(GraphValue::Scalar(value)) => SortKey::Value(value),
        Some(_) => SortKey::NotScalar,
        None => SortKey::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::{GraphObject, JsonArray, Schema};
    use proptest::prelude::*;
    use serde_json::json;

    #[derive(Debug, Clone)]
    struct Post {
        id: i64,
        created_at: Option<Scalar>,
    }

    impl Post {
        fn new(id: i64, created_at: impl Into<Scalar>) -> Self {
            Self {
                id,
                created_at: Some(created_at.into()),
            }
        }
    }

    impl GraphObject for Post {
        fn type_name(&self) -> &str {
            "Post"
        }

        fn schema(&self) -> Schema {
            Schema::new(["id", "created_at"], Vec::<String>::new())
        }

        fn get_attribute(&self, name: &str) -> Option<GraphValue<'_>> {
            match name {
                "id" => Some(GraphValue::scalar(self.id)),
                "created_at" => self.created_at.clone().map(GraphValue::Scalar),
                _ => None,
            }
        }
    }

    /// A sequence that orders itself by `id` only
    struct Relation(Vec<Post>);

    impl GraphSequence for Relation {
        fn elements(&self) -> Vec<GraphValue<'_>> {
            self.0.elements()
        }

        fn native_order_by(&self, key: &str, direction: Direction) -> NativeOrder<'_> {
            if key != "id" {
                return NativeOrder::UnknownKey;
            }
            let mut posts: Vec<&Post> = self.0.iter().collect();
            posts.sort_by_key(|post| post.id);
            if direction == Direction::Desc {
                posts.reverse();
            }
            NativeOrder::Ordered(posts.into_iter().map(GraphValue::object).collect())
        }
    }

    fn ids(elements: &[GraphValue<'_>]) -> Vec<i64> {
        elements
            .iter()
            .map(|element| match element {
                GraphValue::Object(object) => match object.get_attribute("id") {
                    Some(GraphValue::Scalar(Scalar::Int(id))) => id,
                    other => panic!("unexpected id {:?}", other),
                },
                other => panic!("unexpected element {:?}", other),
            })
            .collect()
    }

    fn posts() -> Vec<Post> {
        vec![
            Post::new(1, "2024-01-02"),
            Post::new(2, "2024-01-03"),
            Post::new(3, "2024-01-01"),
        ]
    }

    #[test]
    fn test_in_memory_directions() {
        let posts = posts();
        let mut diagnostics = Diagnostics::new();

        let asc = order_sequence(&posts, "created_at", Direction::Asc, "posts", &mut diagnostics);
        assert_eq!(ids(&asc), vec![2, 1, 3]);

        let desc = order_sequence(&posts, "created_at", Direction::Desc, "posts", &mut diagnostics);
        assert_eq!(ids(&desc), vec![3, 1, 2]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_missing_key_keeps_order() {
        let mut posts = posts();
        posts[1].created_at = None;
        let mut diagnostics = Diagnostics::new();

        let ordered =
            order_sequence(&posts, "created_at", Direction::Asc, "posts", &mut diagnostics);
        assert_eq!(ids(&ordered), vec![1, 2, 3]);
        assert!(diagnostics.contains(DiagnosticKind::InvalidOrderField));
    }

    #[test]
    fn test_unknown_key_keeps_order() {
        let posts = posts();
        let mut diagnostics = Diagnostics::new();

        let ordered =
            order_sequence(&posts, "published_at", Direction::Desc, "posts", &mut diagnostics);
        assert_eq!(ids(&ordered), vec![1, 2, 3]);
        assert_eq!(diagnostics.entries()[0].kind, DiagnosticKind::InvalidOrderField);
    }

    #[test]
    fn test_incomparable_keys_keep_order() {
        let posts = vec![Post::new(1, "yesterday"), Post::new(2, 5), Post::new(3, "today")];
        let mut diagnostics = Diagnostics::new();

        let ordered =
            order_sequence(&posts, "created_at", Direction::Desc, "posts", &mut diagnostics);
        assert_eq!(ids(&ordered), vec![1, 2, 3]);
        assert!(diagnostics.contains(DiagnosticKind::UnorderableCollection));
    }

    #[test]
    fn test_mixed_numbers_are_comparable() {
        let posts = vec![Post::new(1, 2.5), Post::new(2, 1), Post::new(3, 3)];
        let mut diagnostics = Diagnostics::new();

        let ordered =
            order_sequence(&posts, "created_at", Direction::Desc, "posts", &mut diagnostics);
        assert_eq!(ids(&ordered), vec![2, 1, 3]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_large_integers_order_exactly() {
        let posts = vec![
            Post::new(1, (1i64 << 53) + 1),
            Post::new(2, u64::MAX),
            Post::new(3, (1u64 << 53) as f64),
            Post::new(4, 1i64 << 53),
        ];
        let mut diagnostics = Diagnostics::new();

        let ordered =
            order_sequence(&posts, "created_at", Direction::Desc, "posts", &mut diagnostics);
        assert_eq!(ids(&ordered), vec![3, 4, 1, 2]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_structured_keys_keep_order() {
        let doc = json!([
            {"id": 1, "created_at": {"seconds": 20}},
            {"id": 2, "created_at": {"seconds": 10}},
            {"id": 3, "created_at": [30]},
        ]);
        let array = JsonArray::new(doc.as_array().unwrap());
        let mut diagnostics = Diagnostics::new();

        let ordered =
            order_sequence(&array, "created_at", Direction::Asc, "posts", &mut diagnostics);
        assert_eq!(ids(&ordered), vec![1, 2, 3]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.entries()[0].kind, DiagnosticKind::UnorderableCollection);
        assert!(diagnostics.entries()[0].message.contains("created_at"));
    }

    #[test]
    fn test_native_capability_is_used() {
        let relation = Relation(posts());
        let mut diagnostics = Diagnostics::new();

        let ordered = order_sequence(&relation, "id", Direction::Desc, "posts", &mut diagnostics);
        assert_eq!(ids(&ordered), vec![3, 2, 1]);

        let ordered = order_sequence(&relation, "id", Direction::Asc, "posts", &mut diagnostics);
        assert_eq!(ids(&ordered), vec![1, 2, 3]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_native_unknown_key_records_diagnostic() {
        let relation = Relation(posts());
        let mut diagnostics = Diagnostics::new();

        let ordered =
            order_sequence(&relation, "created_at", Direction::Asc, "blog.posts", &mut diagnostics);
        assert_eq!(ids(&ordered), vec![1, 2, 3]);
        assert!(diagnostics.entries()[0].message.contains("blog.posts"));
    }

    #[test]
    fn test_ties_keep_relative_order() {
        let posts = vec![
            Post::new(1, "b"),
            Post::new(2, "a"),
            Post::new(3, "b"),
            Post::new(4, "a"),
        ];
        let mut diagnostics = Diagnostics::new();

        let asc = order_sequence(&posts, "created_at", Direction::Asc, "posts", &mut diagnostics);
        assert_eq!(ids(&asc), vec![1, 3, 2, 4]);
        let desc = order_sequence(&posts, "created_at", Direction::Desc, "posts", &mut diagnostics);
        assert_eq!(ids(&desc), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_empty_sequence() {
        let posts: Vec<Post> = Vec::new();
        let mut diagnostics = Diagnostics::new();
        let ordered =
            order_sequence(&posts, "created_at", Direction::Asc, "posts", &mut diagnostics);
        assert!(ordered.is_empty());
        assert!(diagnostics.is_empty());
    }

    fn reorder(posts: &[Post], direction: Direction) -> Vec<Post> {
        let owned = posts.to_vec();
        let mut diagnostics = Diagnostics::new();
        let ordered = order_sequence(&owned, "created_at", direction, "posts", &mut diagnostics);
        ids(&ordered)
            .into_iter()
            .filter_map(|id| posts.iter().find(|post| post.id == id).cloned())
            .collect()
    }

    proptest! {
        #[test]
        fn prop_ordering_is_idempotent(
            stamps in prop::collection::vec(0i64..5, 0..12),
            asc in any::<bool>(),
        ) {
            let direction = if asc { Direction::Asc } else { Direction::Desc };
            let posts: Vec<Post> = stamps
                .iter()
                .enumerate()
                .map(|(i, stamp)| Post::new(i as i64, *stamp))
                .collect();

            let once = reorder(&posts, direction);
            let twice = reorder(&once, direction);
            let once_ids: Vec<i64> = once.iter().map(|post| post.id).collect();
            let twice_ids: Vec<i64> = twice.iter().map(|post| post.id).collect();
            prop_assert_eq!(once_ids, twice_ids);
        }
    }
}
