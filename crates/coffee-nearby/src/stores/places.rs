use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use super::domain::StoreQuery;
use crate::config::PlacesConfig;

/// Body of a places-search response. `results` stays optional so a body
/// without the field can be told apart from an empty result list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlacesSearchResponse {
    #[serde(default)]
    pub results: Option<Vec<PlaceRecord>>,
}

/// Raw place as returned upstream. Missing fields decode as empty strings
/// so one sparse record cannot fail the whole page.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceRecord {
    #[serde(default)]
    pub fsq_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: PlaceLocation,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceLocation {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<Vec<String>>,
    #[serde(default)]
    pub cross_street: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PlacesError {
    #[error("FOURSQUARE_API_KEY is not configured")]
    MissingApiKey,
    #[error("invalid places endpoint '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("places request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("places service answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("places response was not valid JSON: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Outbound search seam so the store service can run against a fake upstream.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search(&self, query: &StoreQuery) -> Result<PlacesSearchResponse, PlacesError>;
}

/// HTTP client for the places-search endpoint.
#[derive(Debug, Clone)]
pub struct PlacesClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PlacesClient {
    pub fn from_config(config: &PlacesConfig) -> Result<Self, PlacesError> {
        let api_key = config.api_key.clone().ok_or(PlacesError::MissingApiKey)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(PlacesError::Transport)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key,
        })
    }

    pub fn search_url(&self, query: &StoreQuery) -> Result<Url, PlacesError> {
        build_search_url(&self.base_url, query)
    }
}

/// Search URL carrying `query`, `ll` and `limit`.
pub fn build_search_url(base_url: &str, query: &StoreQuery) -> Result<Url, PlacesError> {
    let ll = query.coordinates.to_string();
    let limit = query.limit.to_string();
    Url::parse_with_params(
        base_url,
        &[
            ("query", query.query.as_str()),
            ("ll", ll.as_str()),
            ("limit", limit.as_str()),
        ],
    )
    .map_err(|err| PlacesError::InvalidUrl {
        url: base_url.to_string(),
        reason: err.to_string(),
    })
}

#[async_trait]
impl PlaceSearch for PlacesClient {
    async fn search(&self, query: &StoreQuery) -> Result<PlacesSearchResponse, PlacesError> {
        let url = self.search_url(query)?;
        debug!(%url, "querying places service");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, self.api_key.as_str())
            .send()
            .await
            .map_err(PlacesError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlacesError::Status(status));
        }

        response
            .json::<PlacesSearchResponse>()
            .await
            .map_err(PlacesError::Decode)
    }
}
