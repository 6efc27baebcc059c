//! HTTP adapter for the query compiler
//!
//! Thin layer: request parameters go to the plan builder, plans go to the
//! executor, pages come back in the response envelope.

mod query_routes;
mod server;

pub use query_routes::{query_routes, QueryState};
pub use server::{build_router, CensusServer};
