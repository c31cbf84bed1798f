use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryContributionStore};
use crate::routes::with_contribution_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use contribution::config::AppConfig;
use contribution::error::AppError;
use contribution::telemetry;
use contribution::workflows::contribution::{
    ContributionRepository, ContributionService, JsonFileStore,
};
use std::sync::atomic::{AtomicBool, Ordering};
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
    if let Some(city) = args.city.take() {
        config.contribution.city_name = city;
    }
    if let Some(store_dir) = args.store_dir.take() {
        config.contribution.store_dir = Some(store_dir);
    }

    telemetry::init(&config.telemetry)?;

    match config.contribution.store_dir.clone() {
        Some(dir) => {
            let store = JsonFileStore::open(dir)?;
            info!(store = %store.dir().display(), "persisting contribution tables as json files");
            serve(config, Arc::new(store)).await
        }
        None => {
            info!("no store directory configured; contribution tables are kept in memory");
            serve(config, Arc::new(InMemoryContributionStore::default())).await
        }
    }
}

async fn serve<R>(config: AppConfig, repository: Arc<R>) -> Result<(), AppError>
where
    R: ContributionRepository + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(ContributionService::new(
        repository,
        config.contribution.city_name.clone(),
    ));

    let app = with_contribution_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        city = %config.contribution.city_name,
        "contribution service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
