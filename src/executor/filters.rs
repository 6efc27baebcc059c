//! Clause evaluation against JSON documents
//!
//! Follows document-store matching rules: comparisons only hold between
//! values of the same JSON type, `$ne` matches a missing field, and an
//! existence clause needs the field present and non-null. A clause on an
//! array field holds when any element satisfies it; `$ne` holds when no
//! element equals the operand.

use std::cmp::Ordering;

use regex::Regex;
use serde_json::Value;

use crate::query::{ExistenceClause, FilterClause, FilterOperator};

use super::errors::{ExecutionError, ExecutionResult};
use super::sorter::compare_same_type;

/// Resolves a dotted path inside a document
pub fn lookup_path<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |current, segment| current.get(segment))
}

/// A filter clause with its pattern compiled
#[derive(Debug, Clone)]
struct CompiledClause<'a> {
    clause: &'a FilterClause,
    pattern: Option<Regex>,
}

/// Evaluates a plan's clauses against documents
#[derive(Debug, Clone)]
pub struct PredicateFilter<'a> {
    filters: Vec<CompiledClause<'a>>,
    existence: &'a [ExistenceClause],
}

impl<'a> PredicateFilter<'a> {
    /// Compiles regex operands once for the whole scan
    pub fn new(filters: &'a [FilterClause], existence: &'a [ExistenceClause]) -> ExecutionResult<Self> {
        let filters = filters
            .iter()
            .map(|clause| {
                let pattern = if clause.operator.is_regex() {
                    let source = clause.operand.as_str().unwrap_or_default();
                    Some(Regex::new(source).map_err(|e| {
                        ExecutionError::UnsupportedPattern {
                            pattern: source.to_string(),
                            reason: e.to_string(),
                        }
                    })?)
                } else {
                    None
                };
                Ok(CompiledClause { clause, pattern })
            })
            .collect::<ExecutionResult<Vec<_>>>()?;

        Ok(Self { filters, existence })
    }

    /// Whether a document satisfies every clause
    pub fn matches(&self, document: &Value) -> bool {
        self.existence
            .iter()
            .all(|e| lookup_path(document, &e.field).is_some_and(|v| !v.is_null()))
            && self
                .filters
                .iter()
                .all(|compiled| Self::matches_clause(document, compiled))
    }

    fn matches_clause(document: &Value, compiled: &CompiledClause<'_>) -> bool {
        let clause = compiled.clause;
        let actual = lookup_path(document, &clause.field);

        let operand = &clause.operand;

        match clause.operator {
            FilterOperator::Eq => any_element(actual, |v| values_equal(v, operand)),
            FilterOperator::Ne => !any_element(actual, |v| values_equal(v, operand)),
            FilterOperator::Lt => Self::compare(actual, operand, Ordering::is_lt),
            FilterOperator::Lte => Self::compare(actual, operand, Ordering::is_le),
            FilterOperator::Gt => Self::compare(actual, operand, Ordering::is_gt),
            FilterOperator::Gte => Self::compare(actual, operand, Ordering::is_ge),
            FilterOperator::RegexAnchored | FilterOperator::RegexContains => {
                match &compiled.pattern {
                    Some(pattern) => any_element(actual, |v| {
                        v.as_str().is_some_and(|s| pattern.is_match(s))
                    }),
                    None => false,
                }
            }
        }
    }

    fn compare(actual: Option<&Value>, bound: &Value, accept: fn(Ordering) -> bool) -> bool {
        any_element(actual, |v| compare_same_type(v, bound).is_some_and(accept))
    }
}

/// Applies `test` to a scalar, or to each element of an array
fn any_element(actual: Option<&Value>, test: impl Fn(&Value) -> bool) -> bool {
    match actual {
        Some(Value::Array(items)) => items.iter().any(test),
        Some(value) => test(value),
        None => false,
    }
}

/// Equality with numbers compared by value, so `5` equals `5.0`
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare_same_type(a, b) == Some(Ordering::Equal),
        _ => a == b,
    }
}
