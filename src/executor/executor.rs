//! Plan executor boundary
//!
//! The document store that runs a plan sits behind [`PlanExecutor`]. The
//! crate ships an in-memory implementation; production deployments plug in
//! their store here.

use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use serde_json::Value;

use crate::query::{Datatype, QueryPlan};

use super::errors::ExecutionResult;
use super::result::QueryOutcome;

/// Boxed future returned by executor methods
pub type ExecutorFuture<'a, T> = Pin<Box<dyn Future<Output = ExecutionResult<T>> + Send + 'a>>;

/// Runs query plans against a document store
pub trait PlanExecutor: Send + Sync {
    /// Runs one plan and returns its page of documents, in order
    fn execute<'a>(&'a self, plan: &'a QueryPlan) -> ExecutorFuture<'a, Vec<Value>>;

    /// Lists every collection with its document count
    fn list_collections(&self) -> ExecutorFuture<'_, Vec<Datatype>>;
}

/// Runs a plan and measures the wall-clock time the executor took
pub async fn execute_timed(
    executor: &dyn PlanExecutor,
    plan: &QueryPlan,
) -> ExecutionResult<QueryOutcome> {
    let started = Instant::now();
    let documents = executor.execute(plan).await?;
    Ok(QueryOutcome::new(documents, started.elapsed()))
}
