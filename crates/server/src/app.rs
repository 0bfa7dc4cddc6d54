use std::future::Future;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use forehead_core::pipeline::locate_forehead_use_case::LocateForeheadUseCase;
use tokio::net::TcpListener;

use crate::handlers::detect_forehead;

pub const DETECT_FOREHEAD_PATH: &str = "/detect-forehead";

/// Shared request state. The locator owns the detector pool; handlers only
/// ever borrow detectors through it.
#[derive(Clone)]
pub struct AppState {
    pub locator: Arc<LocateForeheadUseCase>,
}

impl AppState {
    pub fn new(locator: LocateForeheadUseCase) -> Self {
        Self {
            locator: Arc::new(locator),
        }
    }
}

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route(DETECT_FOREHEAD_PATH, post(detect_forehead))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Bind `host:port`. `host` may be a name such as `localhost` or a bare
/// IPv6 address such as `::`.
pub async fn bind(host: &str, port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind((host, port)).await
}

/// Serve `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        log::info!("Listening on http://{addr}{DETECT_FOREHEAD_PATH}");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}
