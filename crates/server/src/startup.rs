use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use service::monitoring::{collect_once, MetricSource, MonitoringContext, SystemSampler};
use tokio::{net::TcpListener, sync::Mutex, task::JoinHandle};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::observability::{ANOMALIES_DETECTED_TOTAL, INCIDENTS_PREDICTED_TOTAL, METRIC_SAMPLES_TOTAL};
use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad bind address: {e}")).into())
}

/// Connect to the store, apply migrations when enabled and assemble handler state.
pub async fn prepare(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.auto_migrate {
        migration::Migrator::up(&db, None)
            .await
            .map_err(|e| StartupError::Migration(e.to_string()))?;
        info!("migrations applied");
    }
    Ok(AppState::new(db, &cfg.monitoring))
}

pub fn build_app(state: AppState) -> Router {
    routes::build_router(state, build_cors())
}

/// Background incident scan; the first tick fires after one full period.
pub fn spawn_incident_scan(state: AppState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
        loop {
            ticker.tick().await;
            info!("running incident prediction scan");
            let predictions = state.monitoring.lock().await.predictor.predict();
            INCIDENTS_PREDICTED_TOTAL.inc_by(predictions.len() as u64);
            if !predictions.is_empty() {
                warn!(count = predictions.len(), "potential incidents predicted");
            }
        }
    })
}

/// Background sampling of `source` into the monitoring context, one batch per
/// period; the first batch is taken after one full period.
pub fn spawn_metric_collector<S>(
    monitoring: Arc<Mutex<MonitoringContext>>,
    every: Duration,
    mut source: S,
) -> JoinHandle<()>
where
    S: MetricSource + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
        loop {
            ticker.tick().await;
            let stats = {
                let mut ctx = monitoring.lock().await;
                collect_once(&mut ctx, &mut source)
            };
            METRIC_SAMPLES_TOTAL.inc_by(stats.samples as u64);
            ANOMALIES_DETECTED_TOTAL.inc_by(stats.anomalies as u64);
        }
    })
}

/// Serve `state` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(state);
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Public entry: build the app from a loaded config and run the HTTP server
/// until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = prepare(&cfg).await?;
    let scan = spawn_incident_scan(state.clone(), Duration::from_secs(cfg.monitoring.scan_interval_secs));
    let collector = cfg.monitoring.collect_system_metrics.then(|| {
        let every = Duration::from_secs(cfg.monitoring.collect_interval_secs);
        info!(every_secs = cfg.monitoring.collect_interval_secs, "system metric collection enabled");
        spawn_metric_collector(state.monitoring.clone(), every, SystemSampler::new())
    });

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting server");
    let listener = TcpListener::bind(addr).await?;
    let result = serve(listener, state, shutdown_signal()).await;
    scan.abort();
    if let Some(collector) = collector {
        collector.abort();
    }
    info!("server stopped");
    result
}
