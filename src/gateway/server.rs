use axum::http::StatusCode;
use axum::{
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::gateway::config::GatewayConfig;
use crate::gateway::handlers;
use crate::gateway::middleware;
use crate::gateway::upstream::UpstreamClient;

/// Axum application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub upstream: Arc<UpstreamClient>,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Self {
        let upstream = Arc::new(UpstreamClient::new(
            config.request_timeout,
            &config.upstream_proxy,
        ));
        Self {
            config: Arc::new(config),
            upstream,
        }
    }
}

/// Build the gateway router. Non-POST on the chat routes falls through
/// to the JSON 405 handler.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/chat",
            post(handlers::chat::handle_chat).fallback(method_not_allowed),
        )
        .route(
            "/api/chat/stream",
            post(handlers::chat::handle_chat_stream).fallback(method_not_allowed),
        )
        .route("/healthz", get(health_check_handler))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .layer(middleware::cors_layer())
        .with_state(state)
}

/// Gateway server instance
pub struct GatewayServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl GatewayServer {
    /// Start the server. Returns the instance and the accept-loop task.
    pub async fn start(
        config: GatewayConfig,
    ) -> Result<(Self, tokio::task::JoinHandle<()>), String> {
        let addr = format!("{}:{}", config.get_bind_address(), config.port);
        let app = build_router(AppState::new(config));

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| format!("Failed to bind address {}: {}", addr, e))?;

        tracing::info!("Chat gateway listening at http://{}", addr);

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            use hyper::server::conn::http1;
            use hyper_util::rt::TokioIo;
            use hyper_util::service::TowerToHyperService;

            loop {
                tokio::select! {
                    res = listener.accept() => {
                        match res {
                            Ok((stream, _)) => {
                                let io = TokioIo::new(stream);
                                let service = TowerToHyperService::new(app.clone());

                                tokio::task::spawn(async move {
                                    if let Err(err) = http1::Builder::new()
                                        .serve_connection(io, service)
                                        .await
                                    {
                                        debug!("Connection handling finished or errored: {:?}", err);
                                    }
                                });
                            }
                            Err(e) => {
                                error!("Failed to accept connection: {:?}", e);
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::info!("Chat gateway stopped listening");
                        break;
                    }
                }
            }
        });

        Ok((
            Self {
                shutdown_tx: Some(shutdown_tx),
            },
            handle,
        ))
    }

    /// Stop the server
    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

/// Health check handler
async fn health_check_handler() -> Response {
    Json(serde_json::json!({
        "status": "ok"
    }))
    .into_response()
}
