use crate::cli::ServeArgs;
use crate::infra::{desk_config, AppState, InMemoryRecordRepository};
use crate::routes::with_contract_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use rentflow::config::AppConfig;
use rentflow::error::AppError;
use rentflow::telemetry;
use rentflow::workflows::contracts::ContractDeskService;
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

    let repository = if args.seed_demo {
        Arc::new(InMemoryRecordRepository::with_sample_records())
    } else {
        Arc::new(InMemoryRecordRepository::default())
    };
    let contract_service = Arc::new(ContractDeskService::new(
        repository,
        desk_config(&config.desk),
    ));

    let app = with_contract_routes(contract_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "contract desk ready");

    axum::serve(listener, app).await?;
    Ok(())
}
