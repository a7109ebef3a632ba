use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use log::{error, info, warn};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::middleware::{log_request, require_session};
use crate::protocol::handlers;
use crate::server::state::AppState;
use crate::storage::filetype::human_size;

/// Room for multipart boundaries and the text fields around the file
const FORM_OVERHEAD: u64 = 1024 * 1024;

pub struct Server {
    state: AppState,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        let config = &state.config;

        info!("Storage drives: {:?}", state.volumes.ids());
        for volume in state.volumes.iter() {
            if !volume.is_mounted() {
                warn!(
                    "Drive {} root {} is not present, it will be hidden",
                    volume.id(),
                    volume.root().display()
                );
            }
        }
        info!("Max upload size: {}", human_size(config.max_file_size));
        if config.uses_default_password() {
            warn!("Using the default password, set DRIVE_EXPLORER_PASSWORD!");
        }

        Self { state }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub async fn start(&self) -> std::io::Result<()> {
        let socket = self.state.config.listen_socket();

        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(e);
            }
        };

        info!("Access at: http://{}", socket);

        axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
    }
}

/// Assembles the API. Everything except `/health` and `/api/login` sits
/// behind the session gate.
pub fn build_router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.config.max_file_size.saturating_add(FORM_OVERHEAD))
        .unwrap_or(usize::MAX);

    let protected = Router::new()
        .route("/api/logout", post(handlers::logout))
        .route("/api/drives", get(handlers::drives))
        .route("/api/usage", get(handlers::usage))
        .route("/api/browse", get(handlers::browse))
        .route(
            "/api/upload",
            post(handlers::upload).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/download", get(handlers::download))
        .route("/api/preview", get(handlers::preview))
        .route("/api/delete", post(handlers::delete))
        .route("/api/mkdir", post(handlers::mkdir))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/login", post(handlers::login))
        .merge(protected)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
