//! Result types for plan execution

use std::time::Duration;

use serde_json::Value;

use crate::query::DataResponse;

/// Documents returned for one plan, with the time the executor took
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// Documents in result order
    pub documents: Vec<Value>,
    /// Wall-clock time spent inside the executor
    pub elapsed: Duration,
}

impl QueryOutcome {
    pub fn new(documents: Vec<Value>, elapsed: Duration) -> Self {
        Self { documents, elapsed }
    }

    /// Returns true if no documents matched
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns the number of results
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Wraps the documents in the response envelope for `collection`.
    ///
    /// Elapsed time is only reported when `timing` is set.
    pub fn into_response(self, collection: &str, timing: bool) -> DataResponse<Value> {
        let elapsed = timing.then_some(self.elapsed);
        DataResponse::new(self.documents, collection, elapsed)
    }
}
