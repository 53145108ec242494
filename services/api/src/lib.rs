mod cli;
mod infra;
mod listing;
mod routes;
mod server;

use coffee_nearby::error::AppError;

pub use infra::InMemoryStoreRepository;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
