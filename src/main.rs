use rust_tax_portal::config::Config;
use rust_tax_portal::controller::LookupPayController;
use rust_tax_portal::handlers::{self, AppState};
use rust_tax_portal::portal_client::PortalClient;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the portal.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - The collaborator client and the Lookup-and-Pay controller.
/// - HTTP routes and middleware.
///
/// It then starts the Axum server.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Ok if the server runs successfully, or an error if initialization fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_tax_portal=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    let client = PortalClient::new(&config.api_base_url, config.http_timeout)
        .map_err(|e| anyhow::anyhow!("Failed to initialize portal client: {}", e))?;
    tracing::info!("✓ Portal client initialized: {}", client.base_url());

    let app_state = Arc::new(AppState {
        controller: LookupPayController::new(client),
    });

    let app = handlers::router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Portal listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
