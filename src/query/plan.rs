//! Immutable query plan
//!
//! A plan holds everything the executor needs for one request. It is built
//! fresh per request and never mutated afterwards. [`QueryPlan::to_pipeline`]
//! renders it as document-store aggregation stages in a fixed order:
//! match, project, sort, skip, limit, then the enrichment lookup.

use serde_json::{json, Map, Value};

use super::filter::{ExistenceClause, FilterClause};
use super::params::SortKey;

/// Field the store always adds and a projection always removes
pub const STORE_ID_FIELD: &str = "_id";

/// Include and exclude lists. Includes apply first, then excludes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Projection {
    /// Renders the projection document, `_id` always excluded
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        doc.insert(STORE_ID_FIELD.to_string(), json!(0));
        for field in &self.include {
            doc.insert(field.clone(), json!(1));
        }
        for field in &self.exclude {
            doc.insert(field.clone(), json!(0));
        }
        Value::Object(doc)
    }
}

/// Fixed lookup that attaches a fire group's primary fire mode link, and
/// that link's fire group, to each result.
///
/// This is a special case for one collection and not a join mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentStage {
    pub from: &'static str,
    pub local_field: &'static str,
    pub foreign_field: &'static str,
    pub output: &'static str,
    /// Only links with this index are attached
    pub fire_mode_index: i64,
    pub nested_from: &'static str,
    pub nested_output: &'static str,
}

impl EnrichmentStage {
    /// Collection the enrichment applies to
    pub const SOURCE_COLLECTION: &'static str = "fire_group";

    const FIRE_GROUP: EnrichmentStage = EnrichmentStage {
        from: "fire_group_to_fire_mode",
        local_field: "fire_group_id",
        foreign_field: "fire_group_id",
        output: "fire_group_to_fire_mode",
        fire_mode_index: 0,
        nested_from: "fire_group",
        nested_output: "fire_mode_to_fire_group",
    };

    /// Enrichment for a collection, if it has one
    pub fn for_collection(collection: &str) -> Option<Self> {
        (collection == Self::SOURCE_COLLECTION).then_some(Self::FIRE_GROUP)
    }

    /// Renders the two-level `$lookup` stage
    pub fn to_stage(&self) -> Value {
        json!({
            "$lookup": {
                "from": self.from,
                "localField": self.local_field,
                "foreignField": self.foreign_field,
                "pipeline": [
                    { "$match": { "$expr": { "$eq": [self.fire_mode_index, "$fire_mode_index"] } } },
                    { "$project": { STORE_ID_FIELD: 0 } },
                    {
                        "$lookup": {
                            "from": self.nested_from,
                            "localField": self.local_field,
                            "foreignField": self.foreign_field,
                            "as": self.nested_output,
                        }
                    }
                ],
                "as": self.output,
            }
        })
    }
}

/// Compiled query for one collection
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub collection: String,
    /// Conjunctive filter clauses, in request order
    pub filters: Vec<FilterClause>,
    /// Conjunctive existence clauses, in request order
    pub existence: Vec<ExistenceClause>,
    pub projection: Projection,
    /// Sort keys, most significant first
    pub sort: Vec<SortKey>,
    pub skip: u64,
    pub limit: u64,
    pub enrichment: Option<EnrichmentStage>,
    /// Whether the caller asked for elapsed time
    pub timing: bool,
}

impl QueryPlan {
    /// Renders the match document: existence checks then filters, joined
    /// with `$and`. No clauses renders an empty document.
    pub fn match_document(&self) -> Value {
        let mut clauses: Vec<Value> = self
            .existence
            .iter()
            .map(|e| single_field(&e.field, json!({ "$ne": null })))
            .collect();

        clauses.extend(self.filters.iter().map(|f| {
            single_field(
                &f.field,
                single_field(f.operator.as_str(), f.operand.clone()),
            )
        }));

        if clauses.is_empty() {
            json!({})
        } else {
            json!({ "$and": clauses })
        }
    }

    /// Sort document with keys in significance order
    pub fn sort_document(&self) -> Value {
        let mut doc = Map::new();
        for key in &self.sort {
            doc.insert(key.field.clone(), json!(key.direction.as_i32()));
        }
        Value::Object(doc)
    }

    /// Renders the plan as aggregation stages
    pub fn to_pipeline(&self) -> Vec<Value> {
        let mut stages = vec![
            json!({ "$match": self.match_document() }),
            json!({ "$project": self.projection.to_document() }),
        ];

        if !self.sort.is_empty() {
            stages.push(json!({ "$sort": self.sort_document() }));
        }

        stages.push(json!({ "$skip": self.skip }));
        stages.push(json!({ "$limit": self.limit }));

        if let Some(enrichment) = &self.enrichment {
            stages.push(enrichment.to_stage());
        }

        stages
    }
}

fn single_field(key: &str, value: Value) -> Value {
    let mut doc = Map::new();
    doc.insert(key.to_string(), value);
    Value::Object(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::filter::FilterOperator;

    fn plan(collection: &str) -> QueryPlan {
        QueryPlan {
            collection: collection.to_string(),
            filters: vec![FilterClause {
                field: "fire_group_id".to_string(),
                operator: FilterOperator::Gt,
                operand: json!(5),
            }],
            existence: vec![ExistenceClause {
                field: "spool_up_time_ms".to_string(),
            }],
            projection: Projection {
                include: vec!["fire_group_id".to_string()],
                exclude: vec!["fire_mode_ids".to_string()],
            },
            sort: vec![SortKey::desc("fire_group_id")],
            skip: 10,
            limit: 20,
            enrichment: EnrichmentStage::for_collection(collection),
            timing: false,
        }
    }

    #[test]
    fn test_stage_order() {
        let stages = plan("fire_group").to_pipeline();
        let names: Vec<&str> = stages
            .iter()
            .map(|s| s.as_object().unwrap().keys().next().unwrap().as_str())
            .collect();
        assert_eq!(
            names,
            vec!["$match", "$project", "$sort", "$skip", "$limit", "$lookup"]
        );
    }

    #[test]
    fn test_match_document() {
        assert_eq!(
            plan("world").match_document(),
            json!({
                "$and": [
                    { "spool_up_time_ms": { "$ne": null } },
                    { "fire_group_id": { "$gt": 5 } }
                ]
            })
        );
    }

    #[test]
    fn test_projection_document() {
        assert_eq!(
            plan("world").projection.to_document(),
            json!({ "_id": 0, "fire_group_id": 1, "fire_mode_ids": 0 })
        );
    }

    #[test]
    fn test_enrichment_only_on_fire_group() {
        assert!(EnrichmentStage::for_collection("world").is_none());
        let stages = plan("world").to_pipeline();
        assert_eq!(stages.len(), 5);
    }

    #[test]
    fn test_enrichment_stage_shape() {
        let stage = EnrichmentStage::for_collection("fire_group").unwrap().to_stage();
        assert_eq!(
            stage,
            json!({
                "$lookup": {
                    "from": "fire_group_to_fire_mode",
                    "localField": "fire_group_id",
                    "foreignField": "fire_group_id",
                    "pipeline": [
                        { "$match": { "$expr": { "$eq": [0, "$fire_mode_index"] } } },
                        { "$project": { "_id": 0 } },
                        {
                            "$lookup": {
                                "from": "fire_group",
                                "localField": "fire_group_id",
                                "foreignField": "fire_group_id",
                                "as": "fire_mode_to_fire_group"
                            }
                        }
                    ],
                    "as": "fire_group_to_fire_mode"
                }
            })
        );
    }

    #[test]
    fn test_empty_plan_renders_empty_match() {
        let mut empty = plan("world");
        empty.filters.clear();
        empty.existence.clear();
        empty.sort.clear();
        assert_eq!(empty.match_document(), json!({}));
        assert_eq!(empty.to_pipeline().len(), 4);
    }
}
