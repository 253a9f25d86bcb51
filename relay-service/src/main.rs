use relay_service::config::RelayConfig;
use relay_service::services::metrics::init_metrics;
use relay_service::startup::Application;
use service_core::error::AppError;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load configuration - fail fast if invalid
    let config = RelayConfig::load()?;

    init_tracing(
        "relay-service",
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    );

    if let Err(e) = init_metrics() {
        tracing::warn!("Failed to install Prometheus recorder: {}", e);
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.common.environment,
        port = config.common.port,
        "Starting relay service"
    );

    if !config.gemini.is_configured() {
        tracing::warn!("API_KEY is not set; relay endpoints will fail until it is configured");
    }

    let app = Application::build(config).await?;
    app.run_until_stopped().await?;

    Ok(())
}
