//! In-memory document store
//!
//! Holds built collections as JSON documents and evaluates plans over them
//! stage by stage, in the order the plan renders: match, project, sort,
//! skip, limit, enrichment. Collections are replaced whole, so a running
//! query keeps reading the snapshot it started with.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde_json::{Map, Value};

use crate::ingestion::{CollectionSink, SinkFuture};
use crate::query::{Datatype, EnrichmentStage, Projection, QueryPlan, STORE_ID_FIELD};

use super::errors::{ExecutionError, ExecutionResult};
use super::executor::{ExecutorFuture, PlanExecutor};
use super::filters::{lookup_path, PredicateFilter};
use super::sorter::{compare_same_type, ResultSorter};

type Collection = Arc<Vec<Value>>;

/// Collections held in memory, keyed by name
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a collection, replacing any previous version
    pub fn insert(&self, name: impl Into<String>, documents: Vec<Value>) {
        self.collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(name.into(), Arc::new(documents));
    }

    /// Snapshot of a collection
    pub fn collection(&self, name: &str) -> Option<Collection> {
        self.collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .cloned()
    }

    /// Collection names and counts, sorted by name
    pub fn datatypes(&self) -> Vec<Datatype> {
        self.collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(name, docs)| Datatype::new(name.clone(), docs.len() as u64))
            .collect()
    }

    /// Evaluates a plan synchronously
    pub fn run(&self, plan: &QueryPlan) -> ExecutionResult<Vec<Value>> {
        let source = self
            .collection(&plan.collection)
            .ok_or_else(|| ExecutionError::CollectionUnavailable(plan.collection.clone()))?;

        let filter = PredicateFilter::new(&plan.filters, &plan.existence)?;
        let mut documents: Vec<Value> = source
            .iter()
            .filter(|doc| filter.matches(doc))
            .map(|doc| project(doc, &plan.projection))
            .collect();

        ResultSorter::sort(&mut documents, &plan.sort);

        let skip = usize::try_from(plan.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(plan.limit).unwrap_or(usize::MAX);
        let mut page: Vec<Value> = documents.into_iter().skip(skip).take(limit).collect();

        if let Some(enrichment) = &plan.enrichment {
            self.enrich(&mut page, enrichment);
        }

        Ok(page)
    }

    fn enrich(&self, page: &mut [Value], stage: &EnrichmentStage) {
        let links = self.collection(stage.from).unwrap_or_default();
        let nested = self.collection(stage.nested_from).unwrap_or_default();
        let index = Value::from(stage.fire_mode_index);

        for doc in page.iter_mut() {
            let key = doc.get(stage.local_field).cloned().unwrap_or(Value::Null);

            let attached: Vec<Value> = links
                .iter()
                .filter(|link| same_key(link.get(stage.foreign_field), &key))
                .filter(|link| same_key(link.get("fire_mode_index"), &index))
                .map(|link| {
                    let mut link = link.clone();
                    if let Value::Object(map) = &mut link {
                        map.remove(STORE_ID_FIELD);
                    }
                    let link_key = link.get(stage.local_field).cloned().unwrap_or(Value::Null);
                    let groups: Vec<Value> = nested
                        .iter()
                        .filter(|group| same_key(group.get(stage.foreign_field), &link_key))
                        .cloned()
                        .collect();
                    if let Value::Object(map) = &mut link {
                        map.insert(stage.nested_output.to_string(), Value::Array(groups));
                    }
                    link
                })
                .collect();

            if let Value::Object(map) = doc {
                map.insert(stage.output.to_string(), Value::Array(attached));
            }
        }
    }
}

/// Lookup key equality; a missing key matches null
fn same_key(actual: Option<&Value>, expected: &Value) -> bool {
    let actual = actual.unwrap_or(&Value::Null);
    compare_same_type(actual, expected) == Some(std::cmp::Ordering::Equal)
}

/// Applies includes, then excludes, and always drops the store id
fn project(doc: &Value, projection: &Projection) -> Value {
    let mut projected = if projection.include.is_empty() {
        doc.clone()
    } else {
        let mut kept = Value::Object(Map::new());
        for path in &projection.include {
            if let Some(value) = lookup_path(doc, path) {
                insert_path(&mut kept, path, value.clone());
            }
        }
        kept
    };

    remove_path(&mut projected, STORE_ID_FIELD);
    for path in &projection.exclude {
        remove_path(&mut projected, path);
    }
    projected
}

fn insert_path(target: &mut Value, path: &str, value: Value) {
    let mut current = target;
    let mut segments = path.split('.').peekable();

    while let Some(segment) = segments.next() {
        let Value::Object(map) = current else { return };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

fn remove_path(target: &mut Value, path: &str) {
    match path.rsplit_once('.') {
        Some((parent, leaf)) => {
            let parent = parent
                .split('.')
                .try_fold(target, |current, segment| current.get_mut(segment));
            if let Some(Value::Object(map)) = parent {
                map.remove(leaf);
            }
        }
        None => {
            if let Value::Object(map) = target {
                map.remove(path);
            }
        }
    }
}

impl PlanExecutor for MemoryStore {
    fn execute<'a>(&'a self, plan: &'a QueryPlan) -> ExecutorFuture<'a, Vec<Value>> {
        Box::pin(async move { self.run(plan) })
    }

    fn list_collections(&self) -> ExecutorFuture<'_, Vec<Datatype>> {
        Box::pin(async move { Ok(self.datatypes()) })
    }
}

impl CollectionSink for MemoryStore {
    fn replace_collection<'a>(&'a self, name: &'a str, documents: Vec<Value>) -> SinkFuture<'a> {
        Box::pin(async move {
            self.insert(name, documents);
            Ok(())
        })
    }
}
