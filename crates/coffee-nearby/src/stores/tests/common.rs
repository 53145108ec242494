use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::to_bytes;
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::stores::domain::{Coordinates, StoreId, StoreQuery, DEFAULT_QUERY};
use crate::stores::places::{
    PlaceLocation, PlaceRecord, PlaceSearch, PlacesError, PlacesSearchResponse,
};
use crate::stores::service::{CoffeeStoreService, SearchDefaults};
use crate::stores::votes::{RepositoryError, StoreRecord, StoreRepository};

pub(super) fn defaults() -> SearchDefaults {
    SearchDefaults {
        coordinates: Coordinates::toronto(),
        query: DEFAULT_QUERY.to_string(),
        limit: 6,
    }
}

pub(super) fn joes() -> PlaceRecord {
    PlaceRecord {
        fsq_id: "abc123".to_string(),
        name: "Joe's".to_string(),
        location: PlaceLocation {
            address: Some("1 Main St".to_string()),
            neighborhood: Some(vec!["Downtown".to_string(), "Old Town".to_string()]),
            cross_street: None,
        },
    }
}

pub(super) fn bean_co() -> PlaceRecord {
    PlaceRecord {
        fsq_id: "xyz".to_string(),
        name: "Bean Co".to_string(),
        location: PlaceLocation {
            address: None,
            neighborhood: None,
            cross_street: Some("5th & Main".to_string()),
        },
    }
}

/// Canned upstream that records every query it receives.
#[derive(Default)]
pub(super) struct FakePlaces {
    pub(super) results: Option<Vec<PlaceRecord>>,
    pub(super) queries: Mutex<Vec<StoreQuery>>,
}

impl FakePlaces {
    pub(super) fn with_results(results: Vec<PlaceRecord>) -> Self {
        Self {
            results: Some(results),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn recorded(&self) -> Vec<StoreQuery> {
        self.queries.lock().expect("queries mutex poisoned").clone()
    }
}

#[async_trait]
impl PlaceSearch for FakePlaces {
    async fn search(&self, query: &StoreQuery) -> Result<PlacesSearchResponse, PlacesError> {
        self.queries
            .lock()
            .expect("queries mutex poisoned")
            .push(query.clone());
        Ok(PlacesSearchResponse {
            results: self.results.clone(),
        })
    }
}

/// Upstream that always fails with a non-success status.
pub(super) struct FailingPlaces;

#[async_trait]
impl PlaceSearch for FailingPlaces {
    async fn search(&self, _query: &StoreQuery) -> Result<PlacesSearchResponse, PlacesError> {
        Err(PlacesError::Status(reqwest::StatusCode::UNAUTHORIZED))
    }
}

/// Upstream that never answers. Signals once a search starts and again when
/// the in-flight search is dropped.
pub(super) struct StalledPlaces {
    pub(super) started: Mutex<Option<oneshot::Sender<()>>>,
    pub(super) dropped: Mutex<Option<oneshot::Sender<()>>>,
}

#[async_trait]
impl PlaceSearch for StalledPlaces {
    async fn search(&self, _query: &StoreQuery) -> Result<PlacesSearchResponse, PlacesError> {
        let _drop_signal = self.dropped.lock().expect("dropped mutex poisoned").take();
        let started = self.started.lock().expect("started mutex poisoned").take();
        if let Some(started) = started {
            let _ = started.send(());
        }
        std::future::pending::<()>().await;
        Ok(PlacesSearchResponse::default())
    }
}

/// Upstream answering with one store per search, named after the searched
/// latitude. A search at `stall_latitude` never answers; it signals once
/// started and again when dropped.
#[derive(Default)]
pub(super) struct CityPlaces {
    pub(super) stall_latitude: Option<f64>,
    pub(super) started: Mutex<Option<oneshot::Sender<()>>>,
    pub(super) dropped: Mutex<Option<oneshot::Sender<()>>>,
}

impl CityPlaces {
    pub(super) fn stalling_at(
        latitude: f64,
        started: oneshot::Sender<()>,
        dropped: oneshot::Sender<()>,
    ) -> Self {
        Self {
            stall_latitude: Some(latitude),
            started: Mutex::new(Some(started)),
            dropped: Mutex::new(Some(dropped)),
        }
    }
}

#[async_trait]
impl PlaceSearch for CityPlaces {
    async fn search(&self, query: &StoreQuery) -> Result<PlacesSearchResponse, PlacesError> {
        let latitude = query.coordinates.latitude;
        if self.stall_latitude == Some(latitude) {
            let _drop_signal = self.dropped.lock().expect("dropped mutex poisoned").take();
            let started = self.started.lock().expect("started mutex poisoned").take();
            if let Some(started) = started {
                let _ = started.send(());
            }
            std::future::pending::<()>().await;
        }
        Ok(PlacesSearchResponse {
            results: Some(vec![PlaceRecord {
                fsq_id: format!("store-{latitude}"),
                name: format!("Cafe at {latitude}"),
                location: PlaceLocation::default(),
            }]),
        })
    }
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<HashMap<StoreId, StoreRecord>>,
    pub(super) upserts: AtomicUsize,
}

impl MemoryRepository {
    pub(super) fn voting(&self, id: &str) -> Option<u32> {
        self.records
            .lock()
            .expect("records mutex poisoned")
            .get(&StoreId::new(id))
            .map(|record| record.voting)
    }

    pub(super) fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }
}

impl StoreRepository for MemoryRepository {
    fn fetch(&self, id: &StoreId) -> Result<Option<StoreRecord>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("records mutex poisoned")
            .get(id)
            .cloned())
    }

    fn upsert(&self, record: StoreRecord) -> Result<StoreRecord, RepositoryError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        let mut guard = self.records.lock().expect("records mutex poisoned");
        Ok(guard.entry(record.id.clone()).or_insert(record).clone())
    }

    fn favourite(&self, id: &StoreId, at: DateTime<Utc>) -> Result<StoreRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("records mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.voting += 1;
        record.updated_at = at;
        Ok(record.clone())
    }
}

pub(super) struct UnavailableRepository;

impl StoreRepository for UnavailableRepository {
    fn fetch(&self, _id: &StoreId) -> Result<Option<StoreRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn upsert(&self, _record: StoreRecord) -> Result<StoreRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn favourite(&self, _id: &StoreId, _at: DateTime<Utc>) -> Result<StoreRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn service<P, R>(places: P, repository: R) -> Arc<CoffeeStoreService<P, R>>
where
    P: PlaceSearch + 'static,
    R: StoreRepository + 'static,
{
    Arc::new(CoffeeStoreService::new(
        Arc::new(places),
        Arc::new(repository),
        defaults(),
    ))
}

pub(super) fn shared_service<P, R>(
    places: Arc<P>,
    repository: Arc<R>,
) -> Arc<CoffeeStoreService<P, R>>
where
    P: PlaceSearch + 'static,
    R: StoreRepository + 'static,
{
    Arc::new(CoffeeStoreService::new(places, repository, defaults()))
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("body is json")
}
