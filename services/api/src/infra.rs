use chrono::{DateTime, Utc};
use coffee_nearby::stores::{RepositoryError, StoreId, StoreRecord, StoreRepository};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local vote store keyed by upstream id.
#[derive(Default, Clone)]
pub struct InMemoryStoreRepository {
    records: Arc<Mutex<HashMap<StoreId, StoreRecord>>>,
}

impl InMemoryStoreRepository {
    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<StoreId, StoreRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl StoreRepository for InMemoryStoreRepository {
    fn fetch(&self, id: &StoreId) -> Result<Option<StoreRecord>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn upsert(&self, record: StoreRecord) -> Result<StoreRecord, RepositoryError> {
        let mut guard = self.lock()?;
        let stored = guard.entry(record.id.clone()).or_insert(record);
        Ok(stored.clone())
    }

    fn favourite(&self, id: &StoreId, at: DateTime<Utc>) -> Result<StoreRecord, RepositoryError> {
        let mut guard = self.lock()?;
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.voting = record.voting.saturating_add(1);
        record.updated_at = at;
        Ok(record.clone())
    }
}
