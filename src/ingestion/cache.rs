//! Client data cache
//!
//! Holds the decoded client datasheets for one refresh cycle. A refresh
//! decodes every sheet into a new [`ClientData`] and swaps it in whole, so
//! readers see either the previous snapshot or the complete new one.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::datasheet::{
    ClientDatasheet, Currency, DatasheetSerializer, Experience, Faction, ImageSetMapping,
};
use crate::observability::{Event, Logger};
use crate::shutdown::Shutdown;

use super::errors::{IngestionError, IngestionResult};
use super::source::DatasheetSource;

/// One published snapshot of the client datasheets
#[derive(Debug, Clone, Default)]
pub struct ClientData {
    pub currency: Option<Vec<Currency>>,
    pub experience: Option<Vec<Experience>>,
    pub factions: Option<Vec<Faction>>,
    pub image_set_mappings: Option<Vec<ImageSetMapping>>,
    /// When this snapshot was populated; `None` for an empty snapshot
    pub last_populated: Option<DateTime<Utc>>,
}

fn require<'a, T: ClientDatasheet>(section: &'a Option<Vec<T>>) -> IngestionResult<&'a [T]> {
    section
        .as_deref()
        .ok_or(IngestionError::MissingUpstreamData(T::FILE_NAME))
}

impl ClientData {
    pub fn require_currency(&self) -> IngestionResult<&[Currency]> {
        require(&self.currency)
    }

    pub fn require_experience(&self) -> IngestionResult<&[Experience]> {
        require(&self.experience)
    }

    pub fn require_factions(&self) -> IngestionResult<&[Faction]> {
        require(&self.factions)
    }

    pub fn require_image_set_mappings(&self) -> IngestionResult<&[ImageSetMapping]> {
        require(&self.image_set_mappings)
    }
}

/// Shared, swappable client data snapshot
#[derive(Debug, Default)]
pub struct ClientDataCache {
    serializer: DatasheetSerializer,
    current: RwLock<Arc<ClientData>>,
}

impl ClientDataCache {
    pub fn new(serializer: DatasheetSerializer) -> Self {
        Self {
            serializer,
            current: RwLock::new(Arc::new(ClientData::default())),
        }
    }

    /// The snapshot currently published
    pub fn current(&self) -> Arc<ClientData> {
        Arc::clone(&self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }

    pub fn last_populated(&self) -> Option<DateTime<Utc>> {
        self.current().last_populated
    }

    /// Decodes every known datasheet and publishes the result.
    ///
    /// Nothing is published unless every sheet decodes.
    pub async fn repopulate(
        &self,
        source: &dyn DatasheetSource,
        shutdown: &Shutdown,
    ) -> IngestionResult<Arc<ClientData>> {
        let started = Utc::now();
        let snapshot = Arc::new(ClientData {
            currency: Some(self.load::<Currency>(source, shutdown).await?),
            experience: Some(self.load::<Experience>(source, shutdown).await?),
            factions: Some(self.load::<Faction>(source, shutdown).await?),
            image_set_mappings: Some(self.load::<ImageSetMapping>(source, shutdown).await?),
            last_populated: Some(started),
        });

        self.publish(Arc::clone(&snapshot));
        Logger::info(
            Event::ClientDataPublished,
            &[("populated_at", &started.to_rfc3339())],
        );
        Ok(snapshot)
    }

    /// Replaces the published snapshot with an empty one
    pub fn clear(&self) {
        self.publish(Arc::new(ClientData::default()));
    }

    fn publish(&self, snapshot: Arc<ClientData>) {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = snapshot;
    }

    async fn load<T: ClientDatasheet>(
        &self,
        source: &dyn DatasheetSource,
        shutdown: &Shutdown,
    ) -> IngestionResult<Vec<T>> {
        if shutdown.is_triggered() {
            return Err(IngestionError::Cancelled);
        }

        let bytes = source.read(T::FILE_NAME).await?;
        let records = self
            .serializer
            .deserialize_until::<T>(&bytes, shutdown)
            .map_err(|e| IngestionError::datasheet(T::FILE_NAME, e))?;

        Logger::info(
            Event::DatasheetLoaded,
            &[("file", T::FILE_NAME), ("records", &records.len().to_string())],
        );
        Ok(records)
    }
}
