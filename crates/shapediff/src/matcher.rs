//! Sequence matching: deciding which elements of two sequences correspond.
//!
//! The matcher only produces operations over indices; the walker turns them
//! into changes, choosing path segments and recursing into matched pairs.

use std::collections::HashMap;

use shapediff_types::Value;

/// One step of a sequence comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeqOp {
    /// `new[new]` has no counterpart in the old sequence.
    Create { new: usize },
    /// `old[old]` and `new[new]` correspond and are compared in depth.
    Update { old: usize, new: usize },
    /// `old[old]` has no counterpart in the new sequence.
    Delete { old: usize },
}

/// Match position by position.
///
/// Every shared position is an update; trailing elements of the longer
/// sequence are creations or deletions.
pub fn by_position(old_len: usize, new_len: usize) -> Vec<SeqOp> {
    let shared = old_len.min(new_len);
    let mut ops: Vec<SeqOp> = (0..shared).map(|i| SeqOp::Update { old: i, new: i }).collect();
    ops.extend((shared..new_len).map(|j| SeqOp::Create { new: j }));
    ops.extend((shared..old_len).map(|i| SeqOp::Delete { old: i }));
    ops
}

/// Match scalar sequences with two independent cursors.
///
/// Equal elements advance both cursors. On a mismatch the old element is
/// read as deleted when the next old element equals the current new one;
/// otherwise the new element is read as inserted. Leftovers on either side
/// become deletions or creations. This reproduces single insertions and
/// deletions exactly, but it is not a minimal edit script, and swapping
/// `old` and `new` does not always yield the inverted operations.
pub fn by_edits(old: &[Value], new: &[Value]) -> Vec<SeqOp> {
    let mut ops = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < old.len() && j < new.len() {
        if old[i].equivalent(&new[j]) {
            i += 1;
            j += 1;
        } else if old.get(i + 1).is_some_and(|next| next.equivalent(&new[j])) {
            ops.push(SeqOp::Delete { old: i });
            i += 1;
        } else {
            ops.push(SeqOp::Create { new: j });
            j += 1;
        }
    }

    ops.extend((i..old.len()).map(|i| SeqOp::Delete { old: i }));
    ops.extend((j..new.len()).map(|j| SeqOp::Create { new: j }));
    ops
}

/// Match elements by identity key.
///
/// Deletions come first in old order, then creations in new order, then
/// updates of keys present on both sides in old order. When a key repeats
/// within one sequence, its last occurrence is the one matched.
pub fn by_identity(old_keys: &[String], new_keys: &[String]) -> Vec<SeqOp> {
    let old_index = last_positions(old_keys);
    let new_index = last_positions(new_keys);
    let mut ops = Vec::new();

    for (i, key) in old_keys.iter().enumerate() {
        if old_index.get(key.as_str()) == Some(&i) && !new_index.contains_key(key.as_str()) {
            ops.push(SeqOp::Delete { old: i });
        }
    }
    for (j, key) in new_keys.iter().enumerate() {
        if new_index.get(key.as_str()) == Some(&j) && !old_index.contains_key(key.as_str()) {
            ops.push(SeqOp::Create { new: j });
        }
    }
    for (i, key) in old_keys.iter().enumerate() {
        if old_index.get(key.as_str()) != Some(&i) {
            continue;
        }
        if let Some(&j) = new_index.get(key.as_str()) {
            ops.push(SeqOp::Update { old: i, new: j });
        }
    }
    ops
}

fn last_positions(keys: &[String]) -> HashMap<&str, usize> {
    keys.iter()
        .enumerate()
        .map(|(i, key)| (key.as_str(), i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::Int).collect()
    }

    fn keys(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn position_updates_then_trailing() {
        assert_eq!(
            by_position(3, 1),
            vec![
                SeqOp::Update { old: 0, new: 0 },
                SeqOp::Delete { old: 1 },
                SeqOp::Delete { old: 2 },
            ]
        );
        assert_eq!(
            by_position(1, 2),
            vec![SeqOp::Update { old: 0, new: 0 }, SeqOp::Create { new: 1 }]
        );
        assert!(by_position(0, 0).is_empty());
    }

    #[test]
    fn edits_append() {
        assert_eq!(by_edits(&ints(&[1, 2, 3]), &ints(&[1, 2, 3, 4])), vec![SeqOp::Create { new: 3 }]);
    }

    #[test]
    fn edits_delete_middle() {
        assert_eq!(by_edits(&ints(&[1, 2, 3]), &ints(&[1, 3])), vec![SeqOp::Delete { old: 1 }]);
    }

    #[test]
    fn edits_delete_then_append() {
        assert_eq!(
            by_edits(&ints(&[1, 2, 3]), &ints(&[1, 3, 4])),
            vec![SeqOp::Delete { old: 1 }, SeqOp::Create { new: 2 }]
        );
    }

    #[test]
    fn edits_replacement_is_create_then_delete() {
        assert_eq!(
            by_edits(&ints(&[1, 2]), &ints(&[1, 5])),
            vec![SeqOp::Create { new: 1 }, SeqOp::Delete { old: 1 }]
        );
    }

    #[test]
    fn edits_are_not_symmetric() {
        assert_eq!(by_edits(&ints(&[1, 2, 1]), &ints(&[2, 1])), vec![SeqOp::Delete { old: 0 }]);
        assert_eq!(
            by_edits(&ints(&[2, 1]), &ints(&[1, 2, 1])),
            vec![SeqOp::Delete { old: 0 }, SeqOp::Create { new: 1 }, SeqOp::Create { new: 2 }]
        );
    }

    #[test]
    fn edits_from_and_to_empty() {
        assert_eq!(
            by_edits(&[], &ints(&[7, 8])),
            vec![SeqOp::Create { new: 0 }, SeqOp::Create { new: 1 }]
        );
        assert_eq!(by_edits(&ints(&[7]), &[]), vec![SeqOp::Delete { old: 0 }]);
    }

    #[test]
    fn identity_orders_deletes_creates_updates() {
        let ops = by_identity(&keys(&["a", "b", "c"]), &keys(&["d", "c", "a"]));
        assert_eq!(
            ops,
            vec![
                SeqOp::Delete { old: 1 },
                SeqOp::Create { new: 0 },
                SeqOp::Update { old: 0, new: 2 },
                SeqOp::Update { old: 2, new: 1 },
            ]
        );
    }

    #[test]
    fn identity_duplicates_collapse_to_last() {
        let ops = by_identity(&keys(&["a", "a"]), &keys(&["a"]));
        assert_eq!(ops, vec![SeqOp::Update { old: 1, new: 0 }]);

        let ops = by_identity(&keys(&["a", "a"]), &[]);
        assert_eq!(ops, vec![SeqOp::Delete { old: 1 }]);
    }

    fn distinct_values() -> impl Strategy<Value = Vec<i64>> {
        proptest::collection::btree_set(0i64..50, 0..8).prop_map(|set| set.into_iter().collect())
    }

    proptest! {
        #[test]
        fn single_insertion_is_one_create(base in distinct_values(), at in any::<prop::sample::Index>()) {
            let mut new = base.clone();
            let position = at.index(base.len() + 1);
            new.insert(position, 100);
            let ops = by_edits(&ints(&base), &ints(&new));
            prop_assert_eq!(ops, vec![SeqOp::Create { new: position }]);
        }

        #[test]
        fn single_deletion_is_one_delete(base in distinct_values(), at in any::<prop::sample::Index>()) {
            prop_assume!(!base.is_empty());
            let position = at.index(base.len());
            let mut new = base.clone();
            new.remove(position);
            let ops = by_edits(&ints(&base), &ints(&new));
            prop_assert_eq!(ops, vec![SeqOp::Delete { old: position }]);
        }

        #[test]
        fn edits_balance_lengths(old in prop::collection::vec(0i64..4, 0..8), new in prop::collection::vec(0i64..4, 0..8)) {
            let ops = by_edits(&ints(&old), &ints(&new));
            let creates = ops.iter().filter(|op| matches!(op, SeqOp::Create { .. })).count();
            let deletes = ops.iter().filter(|op| matches!(op, SeqOp::Delete { .. })).count();
            prop_assert_eq!(old.len() + creates, new.len() + deletes);
        }

        #[test]
        fn identical_sequences_match_fully(values in prop::collection::vec(0i64..4, 0..8)) {
            prop_assert!(by_edits(&ints(&values), &ints(&values)).is_empty());
        }
    }
}
