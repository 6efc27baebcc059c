//! Query Compiler Tests
//!
//! - Sigils classify filter values; a bare sigil yields no clause
//! - Paging defaults and clamping
//! - Sort keys keep their order and direction
//! - Compilation is deterministic and checks fields against the catalog

use std::sync::Arc;

use census::query::{
    parse_filter_param, CollectionCatalog, ControlParams, FilterOperator, QueryError,
    QueryPlanBuilder, SortDirection, SortKey, DEFAULT_LIMIT, MAX_LIMIT,
};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn builder() -> QueryPlanBuilder {
    QueryPlanBuilder::new(Arc::new(CollectionCatalog::builtin()))
}

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// =============================================================================
// Token Parser Tests
// =============================================================================

#[test]
fn test_greater_than_sigil() {
    let tokens = parse_filter_param("x", ">5");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].field, "x");
    assert_eq!(tokens[0].operator, FilterOperator::Gt);
    assert_eq!(tokens[0].operand, "5");
}

#[test]
fn test_bare_sigil_yields_no_clause() {
    assert!(parse_filter_param("x", "!").is_empty());
}

#[test]
fn test_plain_value_is_equality() {
    let tokens = parse_filter_param("x", "foo");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].operator, FilterOperator::Eq);
    assert_eq!(tokens[0].operand, "foo");
}

#[test]
fn test_comma_separated_values_are_separate_clauses() {
    let tokens = parse_filter_param("x", "]1,<10,!");
    let operators: Vec<_> = tokens.iter().map(|t| t.operator).collect();
    assert_eq!(operators, vec![FilterOperator::Gte, FilterOperator::Lt]);
}

// =============================================================================
// Control Parameter Tests
// =============================================================================

#[test]
fn test_paging_defaults() {
    let control = ControlParams::parse(Vec::<(&str, &str)>::new()).unwrap();
    assert_eq!(control.start, 0);
    assert_eq!(control.limit, DEFAULT_LIMIT);
    assert_eq!(DEFAULT_LIMIT, 100);
}

#[test]
fn test_limit_is_clamped() {
    let control = ControlParams::parse([("c:limit", "50000")]).unwrap();
    assert_eq!(control.limit, MAX_LIMIT);
    assert_eq!(MAX_LIMIT, 10_000);
}

#[test]
fn test_sort_keys_keep_order() {
    let control = ControlParams::parse([("c:sort", "item_id:-1,item_category")]).unwrap();
    assert_eq!(
        control.sort,
        vec![
            SortKey {
                field: "item_id".to_string(),
                direction: SortDirection::Descending,
            },
            SortKey {
                field: "item_category".to_string(),
                direction: SortDirection::Ascending,
            },
        ]
    );
}

// =============================================================================
// Plan Builder Tests
// =============================================================================

/// The same request compiles to the same plan every time.
#[test]
fn test_compilation_is_deterministic() {
    let request = params(&[
        ("faction_id", "]1,<4"),
        ("code_tag", "^N"),
        ("c:show", "faction_id,code_tag"),
        ("c:sort", "faction_id:-1"),
        ("c:has", "image_set_id"),
        ("c:limit", "2"),
    ]);

    let first = builder().build("faction", &request).unwrap();
    for _ in 0..50 {
        let again = builder().build("faction", &request).unwrap();
        assert_eq!(again.to_pipeline(), first.to_pipeline());
    }
}

#[test]
fn test_pipeline_stage_order() {
    let plan = builder()
        .build(
            "world",
            &params(&[("world_id", ">5"), ("c:sort", "world_id"), ("c:start", "10")]),
        )
        .unwrap();

    let pipeline = plan.to_pipeline();
    assert_eq!(
        pipeline,
        vec![
            json!({"$match": {"$and": [{"world_id": {"$gt": 5}}]}}),
            json!({"$project": {"_id": 0}}),
            json!({"$sort": {"world_id": 1}}),
            json!({"$skip": 10}),
            json!({"$limit": 100}),
        ]
    );
}

#[test]
fn test_only_fire_group_is_enriched() {
    let plan = builder().build("fire_group", &[]).unwrap();
    assert!(plan.enrichment.is_some());
    assert_eq!(plan.to_pipeline().last().unwrap()["$lookup"]["as"], "fire_group_to_fire_mode");

    let plan = builder().build("fire_mode", &[]).unwrap();
    assert!(plan.enrichment.is_none());
}

#[test]
fn test_unknown_collection_and_field() {
    assert_eq!(
        builder().build("zone", &[]).unwrap_err(),
        QueryError::UnknownCollection("zone".to_string())
    );
    assert!(matches!(
        builder().build("world", &params(&[("c:show", "population")])),
        Err(QueryError::UnknownField { .. })
    ));
}
