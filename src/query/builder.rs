//! Query plan builder
//!
//! Compiles a collection name and raw `(name, value)` request parameters
//! into a [`QueryPlan`]. Pure: no I/O, and the same input always yields the
//! same plan.

use std::sync::Arc;

use super::collection::{CollectionCatalog, CollectionDescriptor};
use super::errors::QueryResult;
use super::filter::{parse_filter_param, ExistenceClause, FilterClause, FilterOperator};
use super::params::{is_control_param, ControlParams};
use super::plan::{EnrichmentStage, Projection, QueryPlan};

/// Builds plans against a collection catalog
#[derive(Debug, Clone)]
pub struct QueryPlanBuilder {
    catalog: Arc<CollectionCatalog>,
}

impl QueryPlanBuilder {
    pub fn new(catalog: Arc<CollectionCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &CollectionCatalog {
        &self.catalog
    }

    /// Compiles one request.
    ///
    /// Parameters are read in the order given; repeated filter parameters
    /// add clauses, they never replace earlier ones.
    pub fn build(&self, collection: &str, params: &[(String, String)]) -> QueryResult<QueryPlan> {
        let descriptor = self.catalog.require(collection)?;

        let control =
            ControlParams::parse(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;

        for field in control
            .show
            .iter()
            .chain(&control.hide)
            .chain(&control.has)
            .chain(control.sort.iter().map(|k| &k.field))
        {
            descriptor.require_field(field)?;
        }

        let mut filters = Vec::new();
        for (name, value) in params.iter().filter(|(k, _)| !is_control_param(k)) {
            for token in parse_filter_param(name, value) {
                filters.push(typed_clause(
                    descriptor,
                    &token.field,
                    token.operator,
                    &token.operand,
                )?);
            }
        }

        let existence = control
            .has
            .iter()
            .map(|field| ExistenceClause {
                field: field.clone(),
            })
            .collect();

        Ok(QueryPlan {
            collection: descriptor.name.to_string(),
            filters,
            existence,
            projection: Projection {
                include: control.show,
                exclude: control.hide,
            },
            sort: control.sort,
            skip: control.start,
            limit: control.limit,
            enrichment: EnrichmentStage::for_collection(descriptor.name),
            timing: control.timing,
        })
    }
}

fn typed_clause(
    descriptor: &CollectionDescriptor,
    field: &str,
    operator: FilterOperator,
    operand: &str,
) -> QueryResult<FilterClause> {
    Ok(FilterClause {
        field: field.to_string(),
        operator,
        operand: descriptor.type_operand(field, operator, operand)?,
    })
}
