use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_QUERY: &str = "coffee stores";
pub const MAX_LIMIT: u32 = 50;

/// Shown wherever a store has no photo of its own.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://images.unsplash.com/photo-1504753793650-d4a2b783c15e?ixid=MnwxMjA3fDB8MHxwaG90by1wYWdlfHx8fGVufDB8fHx8&ixlib=rb-1.2.1&auto=format&fit=crop&w=2000&q=80";

/// Upstream place identifier, used as routing key and persistence key alike.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(pub String);

impl StoreId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Uniform store record produced by normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeStore {
    pub id: StoreId,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub neighbourhood: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
    #[serde(default)]
    pub voting: u32,
}

impl CoffeeStore {
    pub fn image_url(&self) -> &str {
        self.img_url.as_deref().unwrap_or(PLACEHOLDER_IMAGE_URL)
    }
}

/// First store whose id equals `id`, scanning in order.
pub fn find_by_id<'a>(stores: &'a [CoffeeStore], id: &str) -> Option<&'a CoffeeStore> {
    stores.iter().find(|store| store.id.as_str() == id)
}

/// Latitude/longitude pair rendered upstream as `lat,long`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinatesError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinatesError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinatesError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Fallback city location used when no position is supplied.
    pub fn toronto() -> Self {
        Self {
            latitude: 43.65267326999575,
            longitude: -79.39545615725015,
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl FromStr for Coordinates {
    type Err = CoordinatesError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (lat, long) = raw
            .split_once(',')
            .ok_or_else(|| CoordinatesError::Malformed(raw.to_string()))?;
        let latitude = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| CoordinatesError::Malformed(raw.to_string()))?;
        let longitude = long
            .trim()
            .parse::<f64>()
            .map_err(|_| CoordinatesError::Malformed(raw.to_string()))?;
        Self::new(latitude, longitude)
    }
}

impl Serialize for Coordinates {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Coordinates {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinatesError {
    #[error("expected `lat,long`, got '{0}'")]
    Malformed(String),
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// One places-search request.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreQuery {
    pub coordinates: Coordinates,
    pub query: String,
    pub limit: u32,
}

impl StoreQuery {
    pub fn new(
        coordinates: Coordinates,
        query: impl Into<String>,
        limit: u32,
    ) -> Result<Self, StoreQueryError> {
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(StoreQueryError::LimitOutOfRange(limit));
        }
        let query = query.into();
        if query.trim().is_empty() {
            return Err(StoreQueryError::EmptyQuery);
        }
        Ok(Self {
            coordinates,
            query,
            limit,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreQueryError {
    #[error("limit {0} must be between 1 and {MAX_LIMIT}")]
    LimitOutOfRange(u32),
    #[error("search query must not be empty")]
    EmptyQuery,
}
