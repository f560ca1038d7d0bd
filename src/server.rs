//! Router assembly and server lifecycle.

use crate::ai::{GeminiGenerationClient, GenerationService};
use crate::config::{Config, ImageDecoding};
use crate::routes;
use crate::Result;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Per-process handler settings, fixed at startup.
#[derive(Debug, Clone, Copy)]
pub struct RelaySettings {
    pub image_decoding: ImageDecoding,
    pub expose_error_traces: bool,
    pub max_body_bytes: usize,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            image_decoding: ImageDecoding::Raw,
            expose_error_traces: false,
            max_body_bytes: 20 * 1024 * 1024,
        }
    }
}

impl RelaySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            image_decoding: config.image_decoding,
            expose_error_traces: config.expose_error_traces,
            max_body_bytes: config.max_body_bytes,
        }
    }
}

/// Shared application state. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn GenerationService>,
    pub settings: RelaySettings,
}

impl AppState {
    pub fn new(generator: Arc<dyn GenerationService>, settings: RelaySettings) -> Self {
        Self {
            generator,
            settings,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let max_body_bytes = state.settings.max_body_bytes;

    Router::new()
        .route("/", get(routes::home))
        .route("/api/health", get(routes::health_check))
        .route("/api/chat", post(routes::chat))
        .route("/api/generate-image", post(routes::generate_image))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_owned)
                    .unwrap_or_else(|| Uuid::new_v4().to_string());

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
}

/// Bound listener plus router, ready to serve.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the Gemini-backed application from configuration.
    pub async fn build(config: Config) -> Result<Self> {
        let generator = GeminiGenerationClient::from_config(&config, reqwest::Client::new());
        tracing::info!(
            chat_model = %config.chat_model,
            multimodal_model = %config.multimodal_model,
            "Initialized Gemini generation client"
        );

        let state = AppState::new(Arc::new(generator), RelaySettings::from_config(&config));
        Self::bind(config.port, state).await
    }

    /// Bind all interfaces on `port` (0 picks a random port) with the given state.
    pub async fn bind(port: u16, state: AppState) -> Result<Self> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            e
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        tracing::info!("Listening on 0.0.0.0:{}", self.port);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
