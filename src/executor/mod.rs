//! Plan execution for census collections
//!
//! Consumes [`QueryPlan`](crate::query::QueryPlan)s and produces ordered
//! result pages.
//!
//! # Execution Flow (strict order)
//!
//! 1. Match documents against existence and filter clauses
//! 2. Apply the projection, always dropping the store id
//! 3. Apply sort (if specified)
//! 4. Apply skip and limit
//! 5. Attach enrichment lookups (fire groups only)
//!
//! The store behind the flow is reached through [`PlanExecutor`]; the
//! [`MemoryStore`] implementation is what the server runs against.

mod datatypes;
mod errors;
mod executor;
mod filters;
mod memory;
mod result;
mod sorter;

pub use datatypes::{DatatypeCache, DEFAULT_LISTING_TTL};
pub use errors::{ExecutionError, ExecutionResult};
pub use executor::{execute_timed, ExecutorFuture, PlanExecutor};
pub use filters::{lookup_path, PredicateFilter};
pub use memory::MemoryStore;
pub use result::QueryOutcome;
pub use sorter::{compare_same_type, ResultSorter};
