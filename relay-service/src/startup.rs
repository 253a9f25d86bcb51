//! Application startup and lifecycle management.

use crate::config::{LimitsConfig, RelayConfig, RelayProfile};
use crate::handlers;
use crate::services::providers::gemini::{GeminiConfig, GeminiProvider};
use crate::services::providers::GenerativeProvider;
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub profile: Arc<RelayProfile>,
    pub provider: Arc<dyn GenerativeProvider>,
}

impl AppState {
    pub fn new(profile: RelayProfile, provider: Arc<dyn GenerativeProvider>) -> Self {
        Self {
            profile: Arc::new(profile),
            provider,
        }
    }
}

pub fn build_router(state: AppState, limits: &LimitsConfig) -> Router {
    let api_routes = Router::new()
        .route("/api/media-process", post(handlers::relay::media_process))
        .route("/api/translate", post(handlers::relay::translate))
        .route("/api/create", post(handlers::relay::create))
        .route("/api/sub-gen", post(handlers::relay::sub_gen))
        // In-flight cap covers relay calls only
        .route_layer(GlobalConcurrencyLimitLayer::new(limits.max_in_flight));

    Router::new()
        .route("/", get(handlers::health::liveness))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .merge(api_routes)
        .with_state(state)
        // Inline media needs far more than the default extractor limit
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(limits.max_body_bytes))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(CorsLayer::permissive())
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
            Ok(mut sigterm) => {
                sigterm.recv().await;
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

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application backed by the Gemini provider.
    pub async fn build(config: RelayConfig) -> Result<Self, AppError> {
        let provider = GeminiProvider::new(GeminiConfig {
            api_key: config.gemini.api_key.clone(),
            base_url: config.gemini.base_url.clone(),
            timeout: config.gemini.timeout(),
        })
        .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;

        tracing::info!(
            base_url = %config.gemini.base_url,
            configured = config.gemini.is_configured(),
            "Initialized Gemini provider"
        );

        Self::build_with_provider(config, Arc::new(provider)).await
    }

    /// Build the application with an explicit provider.
    pub async fn build_with_provider(
        config: RelayConfig,
        provider: Arc<dyn GenerativeProvider>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(config.relay, provider);
        let router = build_router(state, &config.limits);

        // Port 0 binds a random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Relay service: HTTP on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}
