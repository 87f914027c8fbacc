use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use tokio::net::TcpListener;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, AppState};
use service::{file::FileServerCfgStore, ServerCfgService};

/// Resolve the configured host/port into a socket address.
fn load_bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let addr = cfg.bind_addr();
    addr.parse()
        .map_err(|source| StartupError::InvalidAddr { addr, source })
}

/// Build the router around a `ServerCfg.json` file store.
pub fn build_app(cfg: &AppConfig) -> Router {
    let store = FileServerCfgStore::new(&cfg.store.path);
    let service = ServerCfgService::new(Arc::new(store));
    routes::build_router(AppState::new(service))
}

/// Serve `app` on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Public entry: check the environment, bind, and serve until Ctrl+C.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    common::env::ensure_store_dir(&cfg.store.path)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create directory for {}: {e}", cfg.store.path))?;
    common::env::check_store_file(&cfg.store.path).await;

    let app = build_app(&cfg);

    let addr = load_bind_addr(&cfg)?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr: addr.to_string(), source })?;
    info!(%addr, store = %cfg.store.path, "listener started");

    serve(listener, app, shutdown_signal()).await?;
    info!("listener stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!(event = "shutdown_signal", "received Ctrl+C, shutting down");
    }
}
