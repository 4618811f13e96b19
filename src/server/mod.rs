//! Submission endpoint
//!
//! Re-validates incoming applications with the same [`FormSchema`] the wizard
//! uses. Nothing is persisted: accepted applications are logged and
//! acknowledged with a fresh reference.

pub mod error;
pub mod routes;

use axum::routing::post;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tracing::info;

use crate::protocol::SUBMISSION_PATH;
use crate::schema::FormSchema;

pub use error::ServerError;
pub use routes::{method_not_allowed, submit_application};

/// Shared state for the handlers
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub schema: FormSchema,
}

impl AppState {
    pub fn new(schema: FormSchema) -> Arc<Self> {
        Arc::new(Self { schema })
    }
}

/// Router exposing the submission endpoint
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            SUBMISSION_PATH,
            post(submit_application).fallback(method_not_allowed),
        )
        .with_state(state)
}

/// Bind `address` and serve until Ctrl+C or SIGTERM
pub async fn serve(address: &str, state: Arc<AppState>) -> Result<(), ServerError> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(|e| ServerError::Bind {
            address: address.to_string(),
            source: e,
        })?;
    let local = listener.local_addr().map_err(ServerError::Io)?;
    info!(address = %local, path = SUBMISSION_PATH, "submission endpoint listening");

    serve_listener(listener, state, shutdown_signal()).await
}

/// Serve on an already-bound listener until `shutdown` completes
pub async fn serve_listener(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Io)?;
    info!("submission endpoint stopped");
    Ok(())
}

/// Address the endpoint URL would be served from, for log lines
pub fn endpoint_url(address: &SocketAddr) -> String {
    format!("http://{}{}", address, SUBMISSION_PATH)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
