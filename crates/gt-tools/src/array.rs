//! Sequence helpers

use std::collections::HashSet;
use std::hash::Hash;

use gt_core::value::loosely_equal;
use gt_core::Value;

/// Drop repeated elements, keeping the first occurrence of each
///
/// `None` (no sequence at all) gives an empty vector.
pub fn delete_duplicates<T: Eq + Hash + Clone>(items: Option<&[T]>) -> Vec<T> {
    let Some(items) = items else {
        return Vec::new();
    };
    let mut seen = HashSet::with_capacity(items.len());
    items
        .iter()
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}

/// Drop repeated elements of a JSON array, keeping first occurrences
///
/// Primitives are compared by value (`1` and `1.0` are the same); arrays and
/// objects are never treated as duplicates of one another. Anything other
/// than an array gives an empty vector.
pub fn delete_duplicate_values(value: &Value) -> Vec<Value> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    let mut unique: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.iter().any(|kept| loosely_equal(kept, item)) {
            unique.push(item.clone());
        }
    }
    unique
}
