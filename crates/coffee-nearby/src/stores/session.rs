use std::sync::Arc;

use tokio::task::{AbortHandle, JoinSet};
use tracing::{debug, error, warn};

use super::domain::{CoffeeStore, Coordinates, StoreId};
use super::normalizer::NormalizedStores;
use super::places::PlaceSearch;
use super::service::{CoffeeStoreService, StoreServiceError};
use super::state::{StoreAction, StoreContext};
use super::votes::{RepositoryError, StoreRecord, StoreRepository};

/// Outcome of one background request, applied by [`StoreSession::next_event`].
#[derive(Debug)]
pub enum SessionEvent {
    NearbyLoaded(Result<NormalizedStores, StoreServiceError>),
    Persisted(Result<StoreRecord, StoreServiceError>),
    Upvoted(Result<Vec<StoreRecord>, StoreServiceError>),
}

/// A finished task. Searches carry the generation they were started under.
struct Finished {
    search: Option<u64>,
    event: SessionEvent,
}

/// Work owned by one browsing context.
///
/// Requests run on a [`JoinSet`]; dropping the session aborts whatever is
/// still in flight so late responses never touch discarded state. A new
/// [`locate`](Self::locate) supersedes the previous search the same way.
pub struct StoreSession<P, R> {
    service: Arc<CoffeeStoreService<P, R>>,
    context: StoreContext,
    store: Option<CoffeeStore>,
    voting_count: u32,
    search_generation: u64,
    current_search: Option<AbortHandle>,
    tasks: JoinSet<Finished>,
}

impl<P, R> StoreSession<P, R>
where
    P: PlaceSearch + 'static,
    R: StoreRepository + 'static,
{
    pub fn new(service: Arc<CoffeeStoreService<P, R>>, context: StoreContext) -> Self {
        Self {
            service,
            context,
            store: None,
            voting_count: 0,
            search_generation: 0,
            current_search: None,
            tasks: JoinSet::new(),
        }
    }

    pub fn store(&self) -> Option<&CoffeeStore> {
        self.store.as_ref()
    }

    pub fn voting_count(&self) -> u32 {
        self.voting_count
    }

    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Records the position and searches around it; results land in the context.
    /// Any search still running for an earlier position is cancelled.
    pub fn locate(&mut self, coordinates: Coordinates, limit: Option<u32>) {
        if let Some(previous) = self.current_search.take() {
            previous.abort();
        }
        self.search_generation += 1;
        let generation = self.search_generation;
        self.context.dispatch(StoreAction::SetLatLong(coordinates));

        let service = Arc::clone(&self.service);
        let handle = self.tasks.spawn(async move {
            let result = match service.query_for(Some(coordinates), limit) {
                Ok(query) => service.nearby(&query).await,
                Err(err) => Err(err),
            };
            Finished {
                search: Some(generation),
                event: SessionEvent::NearbyLoaded(result),
            }
        });
        self.current_search = Some(handle);
    }

    /// Resolves the store for `id` from `prefetched`, then the shared context,
    /// then persisted records, and persists it if found. Returns whether a
    /// store was resolved.
    pub fn open(&mut self, id: &StoreId, prefetched: Option<CoffeeStore>) -> bool {
        let resolved = prefetched
            .filter(|store| &store.id == id)
            .or_else(|| self.context.find_store(id.as_str()))
            .or_else(|| self.persisted(id));

        let Some(store) = resolved else {
            warn!(%id, "no coffee store available for detail view");
            return false;
        };

        self.voting_count = store.voting;
        self.store = Some(store.clone());

        let service = Arc::clone(&self.service);
        self.tasks.spawn(async move {
            Finished {
                search: None,
                event: SessionEvent::Persisted(service.create(store)),
            }
        });
        true
    }

    /// Sends one upvote for the open store. No-op when nothing is open.
    pub fn upvote(&mut self) {
        let Some(id) = self.store.as_ref().map(|store| store.id.clone()) else {
            return;
        };

        let service = Arc::clone(&self.service);
        self.tasks.spawn(async move {
            let result = match service.favourite(&id) {
                Ok(record) => Ok(vec![record]),
                Err(StoreServiceError::Repository(RepositoryError::NotFound)) => Ok(Vec::new()),
                Err(err) => Err(err),
            };
            Finished {
                search: None,
                event: SessionEvent::Upvoted(result),
            }
        });
    }

    /// Waits for the next finished request and applies it. Superseded
    /// searches are discarded. `None` once idle.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        loop {
            match self.tasks.join_next().await? {
                Ok(Finished { search: Some(generation), .. })
                    if generation != self.search_generation =>
                {
                    debug!(generation, "discarding superseded nearby search");
                }
                Ok(Finished { event, .. }) => {
                    self.apply(&event);
                    return Some(event);
                }
                Err(err) if err.is_cancelled() => {
                    debug!("superseded nearby search cancelled");
                }
                Err(err) => error!(error = %err, "store session task did not complete"),
            }
        }
    }

    /// Applies every outstanding request.
    pub async fn settle(&mut self) {
        while self.next_event().await.is_some() {}
    }

    fn persisted(&self, id: &StoreId) -> Option<CoffeeStore> {
        match self.service.get(id) {
            Ok(records) => records.first().map(StoreRecord::to_store),
            Err(err) => {
                error!(%id, error = %err, "error loading persisted coffee store");
                None
            }
        }
    }

    fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::NearbyLoaded(Ok(normalized)) => {
                self.context
                    .dispatch(StoreAction::SetCoffeeStores(normalized.stores.clone()));
            }
            SessionEvent::NearbyLoaded(Err(err)) => {
                error!(error = %err, "error loading nearby coffee stores");
            }
            SessionEvent::Persisted(Ok(record)) => {
                let is_open = self
                    .store
                    .as_ref()
                    .is_some_and(|store| store.id == record.id);
                // A local upvote may already have landed; counts only move forward.
                if is_open {
                    self.voting_count = self.voting_count.max(record.voting);
                    self.store = Some(record.to_store());
                }
            }
            SessionEvent::Persisted(Err(err)) => {
                error!(error = %err, "error creating coffee store");
            }
            SessionEvent::Upvoted(Ok(records)) => {
                if !records.is_empty() {
                    self.voting_count += 1;
                }
            }
            SessionEvent::Upvoted(Err(err)) => {
                error!(error = %err, "error upvoting the coffee store");
            }
        }
    }
}
