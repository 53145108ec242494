use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::domain::{
    find_by_id, CoffeeStore, Coordinates, CoordinatesError, StoreId, StoreQuery,
    StoreQueryError,
};
use super::normalizer::{normalize_response, NormalizedStores};
use super::places::{PlaceSearch, PlacesError};
use super::votes::{RepositoryError, StoreRecord, StoreRepository};
use crate::config::PlacesConfig;

/// Defaults applied when a caller leaves parts of a search unspecified.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchDefaults {
    pub coordinates: Coordinates,
    pub query: String,
    pub limit: u32,
}

impl From<&PlacesConfig> for SearchDefaults {
    fn from(config: &PlacesConfig) -> Self {
        Self {
            coordinates: config.default_coordinates,
            query: config.query.clone(),
            limit: config.default_limit,
        }
    }
}

/// Service composing the places search, the normalizer, and the vote repository.
pub struct CoffeeStoreService<P, R> {
    places: Arc<P>,
    repository: Arc<R>,
    defaults: SearchDefaults,
}

impl<P, R> CoffeeStoreService<P, R>
where
    P: PlaceSearch + 'static,
    R: StoreRepository + 'static,
{
    pub fn new(places: Arc<P>, repository: Arc<R>, defaults: SearchDefaults) -> Self {
        Self {
            places,
            repository,
            defaults,
        }
    }

    /// Builds a query, filling gaps from the configured defaults.
    pub fn query_for(
        &self,
        coordinates: Option<Coordinates>,
        limit: Option<u32>,
    ) -> Result<StoreQuery, StoreServiceError> {
        StoreQuery::new(
            coordinates.unwrap_or(self.defaults.coordinates),
            self.defaults.query.clone(),
            limit.unwrap_or(self.defaults.limit),
        )
        .map_err(StoreServiceError::from)
    }

    /// One upstream search, normalized in upstream order.
    pub async fn nearby(&self, query: &StoreQuery) -> Result<NormalizedStores, StoreServiceError> {
        let response = self.places.search(query).await?;
        let normalized = normalize_response(response);
        debug!(
            ll = %query.coordinates,
            limit = query.limit,
            found = normalized.stores.len(),
            "normalized nearby stores"
        );
        Ok(normalized)
    }

    pub async fn default_nearby(&self) -> Result<NormalizedStores, StoreServiceError> {
        let query = self.query_for(None, None)?;
        self.nearby(&query).await
    }

    /// Runs the default search and scans it for `id`.
    pub async fn find_nearby_by_id(
        &self,
        id: &str,
    ) -> Result<Option<CoffeeStore>, StoreServiceError> {
        let normalized = self.default_nearby().await?;
        Ok(find_by_id(&normalized.stores, id).cloned())
    }

    /// Persisted records matching `id`; empty when it was never stored.
    pub fn get(&self, id: &StoreId) -> Result<Vec<StoreRecord>, StoreServiceError> {
        Ok(self.repository.fetch(id)?.into_iter().collect())
    }

    /// Persists `store` with zero votes, or returns the existing record.
    pub fn create(&self, store: CoffeeStore) -> Result<StoreRecord, StoreServiceError> {
        if store.id.as_str().trim().is_empty() {
            return Err(StoreServiceError::MissingField("id"));
        }
        if store.name.trim().is_empty() {
            return Err(StoreServiceError::MissingField("name"));
        }

        let record = self
            .repository
            .upsert(StoreRecord::from_store(store, Utc::now()))?;
        info!(id = %record.id, voting = record.voting, "coffee store persisted");
        Ok(record)
    }

    pub fn favourite(&self, id: &StoreId) -> Result<StoreRecord, StoreServiceError> {
        if id.as_str().trim().is_empty() {
            return Err(StoreServiceError::MissingField("id"));
        }

        let record = self.repository.favourite(id, Utc::now())?;
        info!(id = %record.id, voting = record.voting, "coffee store upvoted");
        Ok(record)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreServiceError {
    #[error(transparent)]
    Places(#[from] PlacesError),
    #[error(transparent)]
    Query(#[from] StoreQueryError),
    #[error(transparent)]
    Coordinates(#[from] CoordinatesError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("{0} is missing")]
    MissingField(&'static str),
}
