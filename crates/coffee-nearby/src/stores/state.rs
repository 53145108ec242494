//! Shared store-results state with a pure reducer.
//!
//! Components hold a [`StoreContext`] handle instead of reading ambient
//! globals. Every change goes through [`StoreContext::dispatch`], which runs
//! [`reduce`] and notifies subscribers.

use std::sync::Arc;

use tokio::sync::watch;

use super::domain::{find_by_id, CoffeeStore, Coordinates};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    pub lat_long: Option<Coordinates>,
    pub coffee_stores: Vec<CoffeeStore>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    SetLatLong(Coordinates),
    SetCoffeeStores(Vec<CoffeeStore>),
}

pub fn reduce(state: StoreState, action: StoreAction) -> StoreState {
    match action {
        StoreAction::SetLatLong(lat_long) => StoreState {
            lat_long: Some(lat_long),
            ..state
        },
        StoreAction::SetCoffeeStores(coffee_stores) => StoreState {
            coffee_stores,
            ..state
        },
    }
}

/// Provider handle. Clones share the same state.
#[derive(Debug, Clone)]
pub struct StoreContext {
    sender: Arc<watch::Sender<StoreState>>,
}

impl Default for StoreContext {
    fn default() -> Self {
        Self::new(StoreState::default())
    }
}

impl StoreContext {
    pub fn new(initial: StoreState) -> Self {
        let (sender, _receiver) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn dispatch(&self, action: StoreAction) {
        self.sender.send_modify(|state| {
            let current = std::mem::take(state);
            *state = reduce(current, action);
        });
    }

    pub fn snapshot(&self) -> StoreState {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.sender.subscribe()
    }

    pub fn find_store(&self, id: &str) -> Option<CoffeeStore> {
        find_by_id(&self.sender.borrow().coffee_stores, id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::domain::StoreId;

    fn store(id: &str) -> CoffeeStore {
        CoffeeStore {
            id: StoreId::new(id),
            name: format!("Store {id}"),
            address: String::new(),
            neighbourhood: String::new(),
            img_url: None,
            voting: 0,
        }
    }

    #[test]
    fn set_lat_long_keeps_stores() {
        let state = StoreState {
            lat_long: None,
            coffee_stores: vec![store("a")],
        };
        let next = reduce(state, StoreAction::SetLatLong(Coordinates::toronto()));
        assert_eq!(next.lat_long, Some(Coordinates::toronto()));
        assert_eq!(next.coffee_stores.len(), 1);
    }

    #[test]
    fn set_coffee_stores_keeps_position() {
        let state = StoreState {
            lat_long: Some(Coordinates::toronto()),
            coffee_stores: vec![store("a")],
        };
        let next = reduce(
            state,
            StoreAction::SetCoffeeStores(vec![store("b"), store("c")]),
        );
        assert_eq!(next.lat_long, Some(Coordinates::toronto()));
        let ids: Vec<&str> = next.coffee_stores.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn dispatch_notifies_subscribers() {
        let context = StoreContext::default();
        let mut receiver = context.subscribe();

        context.dispatch(StoreAction::SetCoffeeStores(vec![store("a")]));

        receiver.changed().await.expect("sender alive");
        assert_eq!(receiver.borrow().coffee_stores.len(), 1);
        assert_eq!(context.find_store("a").map(|s| s.name), Some("Store a".to_string()));
        assert!(context.find_store("b").is_none());
    }

    #[test]
    fn clones_share_state() {
        let context = StoreContext::default();
        let other = context.clone();
        other.dispatch(StoreAction::SetLatLong(Coordinates::toronto()));
        assert_eq!(context.snapshot().lat_long, Some(Coordinates::toronto()));
    }
}
