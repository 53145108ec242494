//! Nearby coffee store search, normalization, and persisted upvotes.

pub mod domain;
pub mod normalizer;
pub mod places;
pub mod router;
pub mod service;
pub mod session;
pub mod state;
pub mod votes;

#[cfg(test)]
mod tests;

pub use domain::{
    find_by_id, CoffeeStore, Coordinates, CoordinatesError, StoreId, StoreQuery, StoreQueryError,
    DEFAULT_QUERY, PLACEHOLDER_IMAGE_URL,
};
pub use normalizer::{normalize_place, normalize_response, NormalizedStores};
pub use places::{
    build_search_url, PlaceLocation, PlaceRecord, PlaceSearch, PlacesClient, PlacesError,
    PlacesSearchResponse,
};
pub use router::{store_router, RESULTS_MISSING_HEADER};
pub use service::{CoffeeStoreService, SearchDefaults, StoreServiceError};
pub use session::{SessionEvent, StoreSession};
pub use state::{reduce, StoreAction, StoreContext, StoreState};
pub use votes::{RepositoryError, StoreRecord, StoreRepository};
