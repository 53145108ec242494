use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::warn;

use super::domain::{CoffeeStore, Coordinates, StoreId};
use super::places::PlaceSearch;
use super::service::{CoffeeStoreService, StoreServiceError};
use super::votes::{RepositoryError, StoreRecord, StoreRepository};
use crate::error::AppError;

/// Set on nearby responses whose upstream body had no `results` field.
pub const RESULTS_MISSING_HEADER: HeaderName = HeaderName::from_static("x-results-missing");

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LocationParams {
    #[serde(default)]
    pub(crate) lat_long: Option<String>,
    #[serde(default)]
    pub(crate) limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdParams {
    #[serde(default)]
    pub(crate) id: Option<String>,
}

/// Body accepted by the create endpoint. A `voting` field is ignored since
/// new records always start at zero.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateStoreRequest {
    #[serde(default)]
    pub(crate) id: Option<String>,
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) img_url: Option<String>,
    #[serde(default)]
    pub(crate) neighbourhood: Option<String>,
    #[serde(default)]
    pub(crate) address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FavouriteRequest {
    #[serde(default)]
    pub(crate) id: Option<String>,
}

/// Router exposing nearby search and the persisted-vote endpoints.
pub fn store_router<P, R>(service: Arc<CoffeeStoreService<P, R>>) -> Router
where
    P: PlaceSearch + 'static,
    R: StoreRepository + 'static,
{
    Router::new()
        .route(
            "/api/getCoffeeStoresByLocation",
            get(nearby_handler::<P, R>),
        )
        .route("/api/getCoffeeStoreById", get(get_by_id_handler::<P, R>))
        .route("/api/createCoffeeStore", post(create_handler::<P, R>))
        .route(
            "/api/favouriteCoffeeStoreById",
            put(favourite_handler::<P, R>),
        )
        .with_state(service)
}

pub(crate) async fn nearby_handler<P, R>(
    State(service): State<Arc<CoffeeStoreService<P, R>>>,
    Query(params): Query<LocationParams>,
) -> Result<Response, AppError>
where
    P: PlaceSearch + 'static,
    R: StoreRepository + 'static,
{
    let coordinates = params
        .lat_long
        .as_deref()
        .map(str::parse::<Coordinates>)
        .transpose()
        .map_err(StoreServiceError::from)?;

    let query = service.query_for(coordinates, params.limit)?;
    let normalized = service.nearby(&query).await?;

    let mut response = (StatusCode::OK, Json(normalized.stores)).into_response();
    if normalized.results_missing {
        response
            .headers_mut()
            .insert(RESULTS_MISSING_HEADER, HeaderValue::from_static("true"));
    }
    Ok(response)
}

pub(crate) async fn get_by_id_handler<P, R>(
    State(service): State<Arc<CoffeeStoreService<P, R>>>,
    Query(params): Query<IdParams>,
) -> Result<Response, AppError>
where
    P: PlaceSearch + 'static,
    R: StoreRepository + 'static,
{
    let id = required(params.id, "id")?;
    let records = service.get(&StoreId(id))?;
    Ok((StatusCode::OK, Json(records)).into_response())
}

pub(crate) async fn create_handler<P, R>(
    State(service): State<Arc<CoffeeStoreService<P, R>>>,
    Json(request): Json<CreateStoreRequest>,
) -> Result<Response, AppError>
where
    P: PlaceSearch + 'static,
    R: StoreRepository + 'static,
{
    let id = required(request.id, "id")?;
    let name = required(request.name, "name")?;

    let store = CoffeeStore {
        id: StoreId(id),
        name,
        address: request.address.unwrap_or_default(),
        neighbourhood: request.neighbourhood.unwrap_or_default(),
        img_url: request.img_url.filter(|url| !url.is_empty()),
        voting: 0,
    };

    let record = service.create(store)?;
    Ok((StatusCode::OK, Json(vec![record])).into_response())
}

pub(crate) async fn favourite_handler<P, R>(
    State(service): State<Arc<CoffeeStoreService<P, R>>>,
    Json(request): Json<FavouriteRequest>,
) -> Result<Response, AppError>
where
    P: PlaceSearch + 'static,
    R: StoreRepository + 'static,
{
    let id = StoreId(required(request.id, "id")?);

    match service.favourite(&id) {
        Ok(record) => Ok((StatusCode::OK, Json(vec![record])).into_response()),
        Err(StoreServiceError::Repository(RepositoryError::NotFound)) => {
            warn!(%id, "upvote for a store that was never persisted");
            Ok((StatusCode::OK, Json(Vec::<StoreRecord>::new())).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, StoreServiceError> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or(StoreServiceError::MissingField(field))
}
