//! Ad-hoc collection query compiler
//!
//! Turns the flat parameter list of a collection request into an immutable
//! [`QueryPlan`]:
//!
//! - `c:`-prefixed parameters control paging, projection, sorting, existence
//!   checks and timing
//! - every other parameter filters on the field it names, its values
//!   classified by leading sigil
//! - fields are checked, and operands typed, against the collection catalog
//!
//! Compilation is deterministic and performs no I/O.

mod builder;
mod collection;
mod errors;
mod filter;
mod params;
mod plan;
mod response;

pub use builder::QueryPlanBuilder;
pub use collection::{CollectionCatalog, CollectionDescriptor, FieldAccessor, FieldKind};
pub use errors::{ErrorResponse, QueryError, QueryResult};
pub use filter::{
    parse_filter_param, parse_filter_value, ExistenceClause, FilterClause, FilterOperator,
    FilterToken,
};
pub use params::{
    is_control_param, ControlParams, SortDirection, SortKey, CONTROL_PREFIX, DEFAULT_LIMIT,
    MAX_LIMIT,
};
pub use plan::{EnrichmentStage, Projection, QueryPlan, STORE_ID_FIELD};
pub use response::{CollectionCount, DataResponse, Datatype};
