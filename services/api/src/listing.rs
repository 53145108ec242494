use clap::Args;
use coffee_nearby::config::AppConfig;
use coffee_nearby::error::AppError;
use coffee_nearby::stores::{
    find_by_id, CoffeeStore, CoffeeStoreService, Coordinates, PlacesClient, SearchDefaults,
};
use coffee_nearby::telemetry;
use std::sync::Arc;

use crate::infra::InMemoryStoreRepository;

#[derive(Args, Debug)]
pub(crate) struct NearbyArgs {
    /// Location to search around as `lat,long` (defaults to the configured city)
    #[arg(long, value_parser = parse_coordinates)]
    pub(crate) lat_long: Option<Coordinates>,
    /// Maximum number of stores to request
    #[arg(long)]
    pub(crate) limit: Option<u32>,
    /// Override the configured search text
    #[arg(long)]
    pub(crate) query: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct StoreArgs {
    /// Upstream identifier of the store
    #[arg(long)]
    pub(crate) id: String,
    /// Location to search around as `lat,long` (defaults to the configured city)
    #[arg(long, value_parser = parse_coordinates)]
    pub(crate) lat_long: Option<Coordinates>,
}

pub(crate) fn parse_coordinates(raw: &str) -> Result<Coordinates, String> {
    raw.parse::<Coordinates>().map_err(|err| err.to_string())
}

type CliService = CoffeeStoreService<PlacesClient, InMemoryStoreRepository>;

fn build_service(query: Option<String>) -> Result<CliService, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let mut defaults = SearchDefaults::from(&config.places);
    if let Some(query) = query {
        defaults.query = query;
    }

    let places = PlacesClient::from_config(&config.places)?;
    Ok(CoffeeStoreService::new(
        Arc::new(places),
        Arc::new(InMemoryStoreRepository::default()),
        defaults,
    ))
}

pub(crate) async fn run_nearby(args: NearbyArgs) -> Result<(), AppError> {
    let NearbyArgs {
        lat_long,
        limit,
        query,
    } = args;

    let service = build_service(query)?;
    let query = service.query_for(lat_long, limit)?;
    let normalized = service.nearby(&query).await?;

    println!(
        "Coffee stores near {} (\"{}\", limit {})",
        query.coordinates, query.query, query.limit
    );
    if normalized.results_missing {
        println!("Places service returned no results field; nothing to list");
    } else if normalized.stores.is_empty() {
        println!("No stores found");
    }
    for store in &normalized.stores {
        println!("- {}", summary_line(store));
    }

    Ok(())
}

pub(crate) async fn run_store(args: StoreArgs) -> Result<(), AppError> {
    let StoreArgs { id, lat_long } = args;

    let service = build_service(None)?;
    let query = service.query_for(lat_long, None)?;
    let normalized = service.nearby(&query).await?;

    match find_by_id(&normalized.stores, &id) {
        Some(store) => render_store(store),
        None => println!("No store with id {id} near {}", query.coordinates),
    }

    Ok(())
}

pub(crate) fn summary_line(store: &CoffeeStore) -> String {
    let mut line = format!("{} [{}]", store.name, store.id);
    if !store.address.is_empty() {
        line.push_str(&format!(" | {}", store.address));
    }
    if !store.neighbourhood.is_empty() {
        line.push_str(&format!(" | {}", store.neighbourhood));
    }
    line
}

fn render_store(store: &CoffeeStore) {
    println!("{}", store.name);
    println!("Id: {}", store.id);
    println!("Address: {}", store.address);
    if !store.neighbourhood.is_empty() {
        println!("Neighbourhood: {}", store.neighbourhood);
    }
    println!("Votes: {}", store.voting);
    println!("Image: {}", store.image_url());
}
