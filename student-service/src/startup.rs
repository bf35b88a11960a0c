//! Application startup and lifecycle management.

use crate::config::{StoreBackend, StudentConfig};
use crate::handlers;
use crate::services::{InMemoryStore, MongoDb, StudentRepository};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn StudentRepository>,
}

/// Opens the configured store and makes sure its indexes exist.
pub async fn connect_repository(
    config: &StudentConfig,
) -> Result<Arc<dyn StudentRepository>, AppError> {
    let repository: Arc<dyn StudentRepository> = match config.store.backend {
        StoreBackend::MongoDb => Arc::new(
            MongoDb::connect(
                config.mongodb.uri.expose_secret(),
                &config.mongodb.database,
            )
            .await?,
        ),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory student store; records are not persisted");
            Arc::new(InMemoryStore::new())
        }
    };

    repository.initialize_indexes().await.map_err(|e| {
        tracing::error!("Failed to initialize database indexes: {}", e);
        e
    })?;

    Ok(repository)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/students",
            post(handlers::create_student).get(handlers::list_students),
        )
        .route(
            "/students/:id",
            get(handlers::fetch_student)
                .patch(handlers::update_student)
                .delete(handlers::delete_student),
        )
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Outermost so the trace span already sees the request id.
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    state: AppState,
}

impl Application {
    pub async fn build(config: StudentConfig) -> Result<Self, AppError> {
        let repository = connect_repository(&config).await?;

        Self::build_with_repository(config, repository).await
    }

    /// Like [`Application::build`] but with an already constructed store.
    pub async fn build_with_repository(
        config: StudentConfig,
        repository: Arc<dyn StudentRepository>,
    ) -> Result<Self, AppError> {
        let state = AppState { repository };

        let router = build_router(state.clone());

        // Port 0 picks a random port, which the tests rely on.
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            router,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn repository(&self) -> Arc<dyn StudentRepository> {
        self.state.repository.clone()
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Service shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
