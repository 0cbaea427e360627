//! Proxy HTTP server.
//!
//! Mounts the task, assignment and flow-event routes under `/api` and a
//! plain-text banner at `/`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::domain::models::ServerConfig;
use crate::domain::ports::UpstreamApi;
use crate::services::{
    AssignmentService, FlowMetadataStore, QueryContract, TaskHistoryService, TaskQueryService,
};

/// Shared state for the proxy routes.
pub struct AppState {
    pub queue: TaskQueryService,
    pub history: TaskHistoryService,
    pub assignment: AssignmentService,
    pub flow_store: Arc<FlowMetadataStore>,
}

impl AppState {
    /// Wire the services around one upstream client and one metadata store.
    pub fn new(upstream: Arc<dyn UpstreamApi>, contract: QueryContract) -> Self {
        let flow_store = Arc::new(FlowMetadataStore::new());
        Self {
            queue: TaskQueryService::new(upstream.clone(), flow_store.clone(), contract.clone()),
            history: TaskHistoryService::new(upstream.clone(), flow_store.clone(), contract.clone()),
            assignment: AssignmentService::new(upstream, contract),
            flow_store,
        }
    }
}

/// Build the router.
pub fn build_router(state: Arc<AppState>, enable_cors: bool) -> Router {
    let api = Router::new()
        .route("/tasks/queue", get(handlers::list_queue))
        .route("/tasks/history", get(handlers::list_history))
        .route("/tasks/{task_id}/assign", post(handlers::assign_task))
        .route("/flow-events", post(handlers::record_flow_event))
        .route("/health", get(handlers::health));

    let app = Router::new()
        .route("/", get(handlers::banner))
        .nest("/api", api)
        .with_state(state);

    if enable_cors {
        app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
            .layer(TraceLayer::new_for_http())
    } else {
        app.layer(TraceLayer::new_for_http())
    }
}

/// Cherry Picker HTTP server.
pub struct CherryPickerHttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl CherryPickerHttpServer {
    pub fn new(state: AppState, config: ServerConfig) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone(), self.config.enable_cors)
    }

    async fn bind(&self) -> Result<(TcpListener, SocketAddr)> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.config.host, self.config.port))?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        Ok((listener, addr))
    }

    /// Start the server.
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Start the server with a shutdown signal.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let (listener, addr) = self.bind().await?;
        let router = self.router();

        tracing::info!("Cherry Picker backend listening on {}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server error")?;

        tracing::info!("Cherry Picker backend stopped");
        Ok(())
    }
}
