use crate::cli::ServeArgs;
use crate::error::ApiError;
use crate::infra::{load_engine, AppState, TableOverrides};
use crate::routes::router;
use axum_prometheus::PrometheusMetricLayer;
use safety_index::config::AppConfig;
use safety_index::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), ApiError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let engine = load_engine(&config.scoring, TableOverrides::default())?;
    info!(
        kpis = engine.catalog().len(),
        profiles = engine.registry().profiles().len(),
        strategy = engine.settings().discipline_strategy.label(),
        "scoring engine assembled"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        engine: Arc::new(engine),
    };

    let app = router(app_state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "safety index service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
