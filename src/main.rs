use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kubudget_core::app_state::build_app_state;
use kubudget_core::config::AppConfig;
use kubudget_core::core::client::inventory::KubeInventory;
use kubudget_core::core::client::kube_client::build_kube_client;
use kubudget_core::core::client::prometheus_client::PrometheusClient;
use kubudget_core::debug::run_debug;
use kubudget_core::routes::app_router;

/// Stdout always; a daily rolling file as well when `LOG_DIR` is set. The
/// returned guard must live as long as the process to flush the file writer.
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout = fmt::layer().with_target(false);

    match env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty()) {
        Some(dir) => {
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "kubudget.log"));
            tracing_subscriber::registry()
                .with(filter)
                .with(stdout)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(filter).with(stdout).init();
            None
        }
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_tracing();

    let config = AppConfig::from_env();
    info!("Starting kubudget (prometheus: {})", config.prometheus_url);

    let kube = build_kube_client(config.kube_config_path.as_deref()).await?;
    let prometheus = PrometheusClient::new(&config.prometheus_url, config.prometheus_timeout)?;

    let state = build_app_state(
        Arc::new(KubeInventory::new(kube)),
        Arc::new(prometheus),
        config.rate_model(),
    );

    if config.debug_mode {
        run_debug(&state).await;
        return Ok(());
    }

    let app = app_router(config.request_timeout).with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
