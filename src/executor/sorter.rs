//! Result sorting
//!
//! Multi-key, stable sort over JSON documents. Keys are applied in order,
//! the first key being the most significant.

use std::cmp::Ordering;

use serde_json::Value;

use crate::query::{SortDirection, SortKey};

use super::filters::lookup_path;

/// Sorts result documents
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts documents by the given keys. Equal documents keep their order.
    pub fn sort(documents: &mut [Value], keys: &[SortKey]) {
        if keys.is_empty() {
            return;
        }

        documents.sort_by(|a, b| {
            keys.iter()
                .map(|key| {
                    let ordering = Self::compare_values(
                        lookup_path(a, &key.field),
                        lookup_path(b, &key.field),
                    );
                    match key.direction {
                        SortDirection::Ascending => ordering,
                        SortDirection::Descending => ordering.reverse(),
                    }
                })
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }

    /// Compares two JSON values for sorting.
    ///
    /// Ordering rules:
    /// - missing < null < bool < number < string < array < object
    /// - For same types, natural ordering
    fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a_val), Some(b_val)) => {
                let a_type = type_order(a_val);
                let b_type = type_order(b_val);

                if a_type != b_type {
                    return a_type.cmp(&b_type);
                }

                compare_same_type(a_val, b_val).unwrap_or(Ordering::Equal)
            }
        }
    }
}

fn type_order(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Orders two values of the same scalar JSON type.
///
/// `None` when the types differ or are not comparable.
pub fn compare_same_type(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(a_b), Value::Bool(b_b)) => Some(a_b.cmp(b_b)),
        (Value::Number(a_n), Value::Number(b_n)) => {
            if let (Some(ai), Some(bi)) = (a_n.as_i64(), b_n.as_i64()) {
                return Some(ai.cmp(&bi));
            }
            if let (Some(au), Some(bu)) = (a_n.as_u64(), b_n.as_u64()) {
                return Some(au.cmp(&bu));
            }
            let a_f = a_n.as_f64()?;
            let b_f = b_n.as_f64()?;
            a_f.partial_cmp(&b_f)
        }
        (Value::String(a_s), Value::String(b_s)) => Some(a_s.cmp(b_s)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(docs: &[Value]) -> Vec<&str> {
        docs.iter().map(|d| d["id"].as_str().unwrap()).collect()
    }

    #[test]
    fn test_sort_ascending() {
        let mut docs = vec![
            json!({"id": "c", "age": 30}),
            json!({"id": "a", "age": 20}),
            json!({"id": "b", "age": 25}),
        ];
        ResultSorter::sort(&mut docs, &[SortKey::asc("age")]);
        assert_eq!(ids(&docs), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sort_descending() {
        let mut docs = vec![
            json!({"id": "c", "age": 30}),
            json!({"id": "a", "age": 20}),
            json!({"id": "b", "age": 25}),
        ];
        ResultSorter::sort(&mut docs, &[SortKey::desc("age")]);
        assert_eq!(ids(&docs), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_sort_stable() {
        let mut docs = vec![
            json!({"id": "a", "age": 25}),
            json!({"id": "b", "age": 25}),
            json!({"id": "c", "age": 25}),
        ];
        ResultSorter::sort(&mut docs, &[SortKey::asc("age")]);
        assert_eq!(ids(&docs), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_first_key_is_most_significant() {
        let mut docs = vec![
            json!({"id": "a", "item_id": 1, "item_category": "z"}),
            json!({"id": "b", "item_id": 2, "item_category": "y"}),
            json!({"id": "c", "item_id": 2, "item_category": "x"}),
        ];
        ResultSorter::sort(
            &mut docs,
            &[SortKey::desc("item_id"), SortKey::asc("item_category")],
        );
        assert_eq!(ids(&docs), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_missing_sorts_first() {
        let mut docs = vec![json!({"id": "a", "age": 1}), json!({"id": "b"})];
        ResultSorter::sort(&mut docs, &[SortKey::asc("age")]);
        assert_eq!(ids(&docs), vec!["b", "a"]);
    }

    #[test]
    fn test_compare_same_type() {
        assert_eq!(compare_same_type(&json!(1), &json!(1.5)), Some(Ordering::Less));
        assert_eq!(compare_same_type(&json!(1), &json!("1")), None);
    }
}
