//! HTTP surface: router, shared state and server lifecycle.
//!
//! The router is built explicitly from an [`AppState`] passed by value; there
//! is no global route registration. Every request gets a `tower-http` trace
//! span, and a panicking handler is turned into a 500 instead of dropping the
//! connection.

/// Route handlers
pub mod handlers;
/// Query and form parameter parsing
pub mod params;
/// HTML rendering and display formatting
pub mod views;

use crate::errors::Result;
use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{error, info};

/// State shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Connection pool
    pub db: Arc<DatabaseConnection>,
    /// Grade used when a request has no `grado` parameter
    pub default_grade: i64,
}

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::ledger))
        .route("/editar-consumos", get(handlers::edit_consumption))
        .route("/guardar-consumos-dia", post(handlers::save_day))
        .route("/registrar-consumo", post(handlers::register_consumption))
        .route("/editar-pagos", get(handlers::edit_payments))
        .route("/registrar-pago", post(handlers::register_payment))
        .route("/eliminar-pago", post(handlers::remove_payment))
        .route("/ver-consumo-semanal", get(handlers::weekly_statement_page))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the application on `listener` until Ctrl+C or SIGTERM.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let address = listener.local_addr()?;
    info!("Kiosk ledger listening on http://{address}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
