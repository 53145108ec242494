use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryStoreRepository};
use crate::routes::with_store_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use coffee_nearby::config::AppConfig;
use coffee_nearby::error::AppError;
use coffee_nearby::stores::{CoffeeStoreService, PlacesClient, SearchDefaults};
use coffee_nearby::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let places = Arc::new(PlacesClient::from_config(&config.places)?);
    let repository = Arc::new(InMemoryStoreRepository::default());
    let store_service = Arc::new(CoffeeStoreService::new(
        places,
        repository,
        SearchDefaults::from(&config.places),
    ));

    let app = with_store_routes(store_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        default_ll = %config.places.default_coordinates,
        "coffee store locator ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
