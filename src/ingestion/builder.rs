//! Collection builders
//!
//! A builder turns the decoded client datasheets into the documents of one
//! queryable collection. After each refresh every registered builder runs;
//! one failing builder is logged and does not stop its siblings.

use std::future::Future;
use std::pin::Pin;

use serde_json::{json, Value};

use crate::observability::{Event, Logger};
use crate::shutdown::Shutdown;

use super::cache::ClientData;
use super::errors::{IngestionError, IngestionResult};

/// Boxed future returned by [`CollectionSink::replace_collection`]
pub type SinkFuture<'a> = Pin<Box<dyn Future<Output = IngestionResult<()>> + Send + 'a>>;

/// Destination for built collections
pub trait CollectionSink: Send + Sync {
    /// Publishes `documents` as the whole content of `name`
    fn replace_collection<'a>(&'a self, name: &'a str, documents: Vec<Value>) -> SinkFuture<'a>;
}

/// Builds one collection from client data
pub trait CollectionBuilder: Send + Sync {
    /// Name of the collection this builder publishes
    fn collection(&self) -> &'static str;

    fn build(&self, data: &ClientData) -> IngestionResult<Vec<Value>>;
}

/// Outcome of one build pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub built: Vec<&'static str>,
    pub failed: Vec<&'static str>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs every builder and publishes what each produced.
///
/// Only cancellation aborts the pass.
pub async fn run_builders(
    builders: &[Box<dyn CollectionBuilder>],
    data: &ClientData,
    sink: &dyn CollectionSink,
    shutdown: &Shutdown,
) -> IngestionResult<BuildReport> {
    let mut report = BuildReport::default();

    for builder in builders {
        if shutdown.is_triggered() {
            return Err(IngestionError::Cancelled);
        }

        let collection = builder.collection();
        let published = match builder.build(data) {
            Ok(documents) => {
                let count = documents.len();
                sink.replace_collection(collection, documents)
                    .await
                    .map(|()| count)
            }
            Err(e) => Err(e),
        };

        match published {
            Ok(count) => {
                Logger::info(
                    Event::CollectionBuilt,
                    &[("collection", collection), ("documents", &count.to_string())],
                );
                report.built.push(collection);
            }
            Err(e) => {
                Logger::error(
                    Event::CollectionBuildFailed,
                    &[("collection", collection), ("error", &e.to_string())],
                );
                report.failed.push(collection);
            }
        }
    }

    Ok(report)
}

/// Builders for every collection derived from client datasheets
pub fn default_builders() -> Vec<Box<dyn CollectionBuilder>> {
    vec![
        Box::new(CurrencyBuilder),
        Box::new(ExperienceBuilder),
        Box::new(FactionBuilder),
        Box::new(ImageSetBuilder),
    ]
}

pub struct CurrencyBuilder;

impl CollectionBuilder for CurrencyBuilder {
    fn collection(&self) -> &'static str {
        "currency"
    }

    fn build(&self, data: &ClientData) -> IngestionResult<Vec<Value>> {
        let mut rows: Vec<_> = data.require_currency()?.iter().collect();
        rows.sort_by_key(|c| c.id);
        Ok(rows
            .into_iter()
            .map(|c| {
                json!({
                    "currency_id": c.id,
                    "name_id": c.name_id,
                    "description_id": c.description_id,
                    "icon_image_set_id": c.icon_id,
                    "map_icon_image_set_id": c.map_icon_id,
                    "inventory_cap": c.value_max,
                })
            })
            .collect())
    }
}

pub struct ExperienceBuilder;

impl CollectionBuilder for ExperienceBuilder {
    fn collection(&self) -> &'static str {
        "experience"
    }

    fn build(&self, data: &ClientData) -> IngestionResult<Vec<Value>> {
        let mut rows: Vec<_> = data.require_experience()?.iter().collect();
        rows.sort_by_key(|e| e.id);
        Ok(rows
            .into_iter()
            .map(|e| {
                json!({
                    "experience_id": e.id,
                    "award_type_id": e.award_type_id,
                    "name_id": e.string_id,
                    "xp": e.xp,
                    "notify_radius": e.notify_radius,
                })
            })
            .collect())
    }
}

pub struct FactionBuilder;

impl CollectionBuilder for FactionBuilder {
    fn collection(&self) -> &'static str {
        "faction"
    }

    fn build(&self, data: &ClientData) -> IngestionResult<Vec<Value>> {
        let mut rows: Vec<_> = data.require_factions()?.iter().collect();
        rows.sort_by_key(|f| f.id);
        Ok(rows
            .into_iter()
            .map(|f| {
                json!({
                    "faction_id": f.id,
                    "name_id": f.name_id,
                    "short_name_id": f.short_name_id,
                    "image_set_id": f.icon_id,
                    "hud_tint_rgb": f.hud_tint_rgb,
                    "code_tag": f.code_tag,
                    "user_selectable": f.user_selectable,
                })
            })
            .collect())
    }
}

pub struct ImageSetBuilder;

impl CollectionBuilder for ImageSetBuilder {
    fn collection(&self) -> &'static str {
        "image_set"
    }

    fn build(&self, data: &ClientData) -> IngestionResult<Vec<Value>> {
        let mut rows: Vec<_> = data.require_image_set_mappings()?.iter().collect();
        rows.sort_by_key(|m| (m.image_set_id, m.image_id));
        Ok(rows
            .into_iter()
            .map(|m| {
                json!({
                    "image_set_id": m.image_set_id,
                    "image_id": m.image_id,
                    "image_type": m.image_type,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasheet::{Faction, ImageSetMapping, ImageType};
    use crate::executor::MemoryStore;

    fn data() -> ClientData {
        ClientData {
            factions: Some(vec![
                Faction {
                    id: 3,
                    name_id: 30,
                    short_name_id: None,
                    icon_id: Some(18),
                    hud_tint_rgb: 0xff0000,
                    code_tag: "TR".to_string(),
                    user_selectable: true,
                },
                Faction {
                    id: 1,
                    name_id: 10,
                    short_name_id: Some(11),
                    icon_id: None,
                    hud_tint_rgb: 0x440e62,
                    code_tag: "VS".to_string(),
                    user_selectable: true,
                },
            ]),
            image_set_mappings: Some(vec![ImageSetMapping {
                image_set_id: 18,
                image_id: 77,
                image_type: ImageType::Massive,
            }]),
            ..ClientData::default()
        }
    }

    #[test]
    fn test_faction_documents_sorted_by_id() {
        let docs = FactionBuilder.build(&data()).unwrap();
        assert_eq!(docs[0]["faction_id"], json!(1));
        assert_eq!(docs[0]["image_set_id"], Value::Null);
        assert_eq!(docs[1]["code_tag"], json!("TR"));
    }

    #[test]
    fn test_image_type_written_by_name() {
        let docs = ImageSetBuilder.build(&data()).unwrap();
        assert_eq!(docs, vec![json!({"image_set_id": 18, "image_id": 77, "image_type": "Massive"})]);
    }

    #[tokio::test]
    async fn test_failed_builder_does_not_stop_siblings() {
        let store = MemoryStore::new();
        let report = run_builders(&default_builders(), &data(), &store, &Shutdown::never())
            .await
            .unwrap();

        assert_eq!(report.built, vec!["faction", "image_set"]);
        assert_eq!(report.failed, vec!["currency", "experience"]);
        assert!(!report.is_clean());
        assert_eq!(store.collection("faction").unwrap().len(), 2);
        assert!(store.collection("currency").is_none());
    }

    #[tokio::test]
    async fn test_cancelled_pass() {
        let (trigger, shutdown) = crate::shutdown::channel();
        trigger.trigger();
        let err = run_builders(&default_builders(), &data(), &MemoryStore::new(), &shutdown)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
