//! Collection query routes
//!
//! - `GET /get` lists every collection with its document count
//! - `GET /count` counts the collections
//! - `GET /get/:collection` compiles the query string into a plan, runs
//!   it and wraps the page in the response envelope

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::executor::{execute_timed, DatatypeCache, PlanExecutor};
use crate::observability::{Event, Logger};
use crate::query::{CollectionCount, DataResponse, QueryPlanBuilder};

// ==================
// Shared State
// ==================

/// State shared across query handlers
pub struct QueryState {
    pub builder: QueryPlanBuilder,
    pub executor: Arc<dyn PlanExecutor>,
    pub datatypes: DatatypeCache,
}

impl QueryState {
    pub fn new(
        builder: QueryPlanBuilder,
        executor: Arc<dyn PlanExecutor>,
        datatypes: DatatypeCache,
    ) -> Self {
        Self {
            builder,
            executor,
            datatypes,
        }
    }
}

// ==================
// Routes
// ==================

pub fn query_routes(state: Arc<QueryState>) -> Router {
    Router::new()
        .route("/get", get(list_datatypes))
        .route("/count", get(count_datatypes))
        .route("/get/:collection", get(query_collection))
        .with_state(state)
}

async fn list_datatypes(State(state): State<Arc<QueryState>>) -> Response {
    match state.datatypes.get(state.executor.as_ref()).await {
        Ok(listing) => Json(DataResponse::new(listing.to_vec(), "datatype", None)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn count_datatypes(State(state): State<Arc<QueryState>>) -> Response {
    match state.datatypes.count(state.executor.as_ref()).await {
        Ok(count) => Json(CollectionCount::from(count)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn query_collection(
    State(state): State<Arc<QueryState>>,
    Path(collection): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let plan = match state.builder.build(&collection, &params) {
        Ok(plan) => plan,
        Err(e) => {
            Logger::warn(
                Event::QueryRejected,
                &[("collection", &collection), ("error", &e.to_string())],
            );
            return e.into_response();
        }
    };

    Logger::trace(
        Event::QueryPlanned,
        &[
            ("collection", &plan.collection),
            ("pipeline", &Value::Array(plan.to_pipeline()).to_string()),
        ],
    );

    match execute_timed(state.executor.as_ref(), &plan).await {
        Ok(outcome) => {
            Logger::info(
                Event::QueryExecuted,
                &[
                    ("collection", &plan.collection),
                    ("elapsed_us", &outcome.elapsed.as_micros().to_string()),
                    ("returned", &outcome.len().to_string()),
                ],
            );
            Json(outcome.into_response(&plan.collection, plan.timing)).into_response()
        }
        Err(e) => {
            Logger::error(
                Event::QueryRejected,
                &[("collection", &plan.collection), ("error", &e.to_string())],
            );
            e.into_response()
        }
    }
}
