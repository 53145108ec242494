use tracing::warn;

use super::domain::{CoffeeStore, StoreId};
use super::places::{PlaceRecord, PlacesSearchResponse};

/// Normalized result set, plus whether the upstream body lacked `results`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedStores {
    pub stores: Vec<CoffeeStore>,
    pub results_missing: bool,
}

pub fn normalize_response(response: PlacesSearchResponse) -> NormalizedStores {
    match response.results {
        Some(results) => NormalizedStores {
            stores: results
                .into_iter()
                .filter(|record| {
                    let keep = !record.fsq_id.trim().is_empty();
                    if !keep {
                        warn!(name = %record.name, "skipping place without fsq_id");
                    }
                    keep
                })
                .map(normalize_place)
                .collect(),
            results_missing: false,
        },
        None => {
            warn!("places response carried no results field; treating as empty");
            NormalizedStores {
                stores: Vec::new(),
                results_missing: true,
            }
        }
    }
}

pub fn normalize_place(record: PlaceRecord) -> CoffeeStore {
    let PlaceRecord {
        fsq_id,
        name,
        location,
    } = record;

    let neighbourhood = location
        .neighborhood
        .and_then(|list| list.into_iter().next())
        .filter(|first| !first.is_empty())
        .or(location.cross_street.filter(|street| !street.is_empty()))
        .unwrap_or_default();

    CoffeeStore {
        id: StoreId(fsq_id),
        name,
        address: location.address.unwrap_or_default(),
        neighbourhood,
        img_url: None,
        voting: 0,
    }
}
