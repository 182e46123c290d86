use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use competence_tracker::catalog::CompetenceService;
use competence_tracker::config::AppConfig;
use competence_tracker::error::AppError;
use competence_tracker::telemetry;
use tracing::{info, warn};

use crate::cli::ServeArgs;
use crate::infra::{seed_catalog, AppState, InMemoryCompetenceRepository};
use crate::routes::with_catalog_routes;

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

    let repository = Arc::new(InMemoryCompetenceRepository::default());
    let service = Arc::new(CompetenceService::new(repository));

    if args.seed {
        match seed_catalog(&service) {
            Ok(count) => info!(count, "starter catalog loaded"),
            Err(error) => warn!(%error, "starter catalog failed to load"),
        }
    }

    let app = with_catalog_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "competence tracker api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
