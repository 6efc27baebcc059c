//! Filter token parser
//!
//! Each non-control parameter value is split on commas. The first character
//! of each piece selects the comparison:
//!
//! | sigil | operator | operand |
//! |---|---|---|
//! | `<` | lt | after sigil |
//! | `[` | lte | after sigil |
//! | `>` | gt | after sigil |
//! | `]` | gte | after sigil |
//! | `^` | regex, anchored | whole value |
//! | `*` | regex, contains | after sigil |
//! | `!` | ne | after sigil |
//! | other | eq | whole value |
//!
//! A sigil with nothing after it produces no clause.

use serde_json::Value;

/// Comparison applied by a filter clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    RegexAnchored,
    RegexContains,
}

impl FilterOperator {
    /// Operator selected by a leading character, if it is a sigil
    pub fn from_sigil(sigil: char) -> Option<Self> {
        match sigil {
            '<' => Some(FilterOperator::Lt),
            '[' => Some(FilterOperator::Lte),
            '>' => Some(FilterOperator::Gt),
            ']' => Some(FilterOperator::Gte),
            '^' => Some(FilterOperator::RegexAnchored),
            '*' => Some(FilterOperator::RegexContains),
            '!' => Some(FilterOperator::Ne),
            _ => None,
        }
    }

    /// Ordering comparisons
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            FilterOperator::Lt | FilterOperator::Lte | FilterOperator::Gt | FilterOperator::Gte
        )
    }

    pub fn is_regex(&self) -> bool {
        matches!(
            self,
            FilterOperator::RegexAnchored | FilterOperator::RegexContains
        )
    }

    /// Store-level operator name
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "$eq",
            FilterOperator::Ne => "$ne",
            FilterOperator::Lt => "$lt",
            FilterOperator::Lte => "$lte",
            FilterOperator::Gt => "$gt",
            FilterOperator::Gte => "$gte",
            FilterOperator::RegexAnchored | FilterOperator::RegexContains => "$regex",
        }
    }
}

/// Untyped clause straight from the query string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterToken {
    pub field: String,
    pub operator: FilterOperator,
    pub operand: String,
}

/// Clause with its operand converted to the field's type
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub field: String,
    pub operator: FilterOperator,
    pub operand: Value,
}

/// Field that must be present and non-null
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistenceClause {
    pub field: String,
}

/// Classifies one comma-free value by its sigil.
///
/// Returns `None` for an empty value or a bare sigil.
pub fn parse_filter_value(value: &str) -> Option<(FilterOperator, &str)> {
    let first = value.chars().next()?;

    match FilterOperator::from_sigil(first) {
        Some(_) if value.len() < 2 => None,
        // The anchor is part of the pattern
        Some(FilterOperator::RegexAnchored) => Some((FilterOperator::RegexAnchored, value)),
        Some(op) => Some((op, &value[first.len_utf8()..])),
        None => Some((FilterOperator::Eq, value)),
    }
}

/// Parses every comma-separated value of one filter parameter
pub fn parse_filter_param(field: &str, raw: &str) -> Vec<FilterToken> {
    raw.split(',')
        .filter_map(parse_filter_value)
        .map(|(operator, operand)| FilterToken {
            field: field.to_string(),
            operator,
            operand: operand.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigils() {
        assert_eq!(parse_filter_value(">5"), Some((FilterOperator::Gt, "5")));
        assert_eq!(parse_filter_value("<5"), Some((FilterOperator::Lt, "5")));
        assert_eq!(parse_filter_value("[5"), Some((FilterOperator::Lte, "5")));
        assert_eq!(parse_filter_value("]5"), Some((FilterOperator::Gte, "5")));
        assert_eq!(parse_filter_value("!5"), Some((FilterOperator::Ne, "5")));
        assert_eq!(
            parse_filter_value("*gun"),
            Some((FilterOperator::RegexContains, "gun"))
        );
    }

    #[test]
    fn test_anchored_regex_keeps_sigil() {
        assert_eq!(
            parse_filter_value("^Orion"),
            Some((FilterOperator::RegexAnchored, "^Orion"))
        );
    }

    #[test]
    fn test_plain_value_is_equality() {
        assert_eq!(parse_filter_value("foo"), Some((FilterOperator::Eq, "foo")));
    }

    #[test]
    fn test_bare_sigil_and_empty_are_dropped() {
        assert_eq!(parse_filter_value("!"), None);
        assert_eq!(parse_filter_value(">"), None);
        assert_eq!(parse_filter_value(""), None);
    }

    #[test]
    fn test_comma_values_are_conjunctive_clauses() {
        let tokens = parse_filter_param("item_id", ">5,<10,,!");
        assert_eq!(
            tokens,
            vec![
                FilterToken {
                    field: "item_id".to_string(),
                    operator: FilterOperator::Gt,
                    operand: "5".to_string(),
                },
                FilterToken {
                    field: "item_id".to_string(),
                    operator: FilterOperator::Lt,
                    operand: "10".to_string(),
                },
            ]
        );
    }
}
