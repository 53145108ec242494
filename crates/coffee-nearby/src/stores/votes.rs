use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{CoffeeStore, StoreId};

/// Persisted store with its vote tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRecord {
    pub id: StoreId,
    pub name: String,
    pub address: String,
    pub neighbourhood: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
    pub voting: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoreRecord {
    /// Fresh record with zero votes. Any incoming vote count is ignored.
    pub fn from_store(store: CoffeeStore, now: DateTime<Utc>) -> Self {
        Self {
            id: store.id,
            name: store.name,
            address: store.address,
            neighbourhood: store.neighbourhood,
            img_url: store.img_url,
            voting: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_store(&self) -> CoffeeStore {
        CoffeeStore {
            id: self.id.clone(),
            name: self.name.clone(),
            address: self.address.clone(),
            neighbourhood: self.neighbourhood.clone(),
            img_url: self.img_url.clone(),
            voting: self.voting,
        }
    }
}

/// Storage abstraction for persisted stores and their votes.
pub trait StoreRepository: Send + Sync {
    fn fetch(&self, id: &StoreId) -> Result<Option<StoreRecord>, RepositoryError>;
    /// Inserts `record` unless the id already exists, in which case the stored
    /// record is returned unchanged.
    fn upsert(&self, record: StoreRecord) -> Result<StoreRecord, RepositoryError>;
    /// Adds one vote and returns the updated record.
    fn favourite(&self, id: &StoreId, at: DateTime<Utc>) -> Result<StoreRecord, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("store not found")]
    NotFound,
    #[error("store repository unavailable: {0}")]
    Unavailable(String),
}
