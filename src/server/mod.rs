//! HTTP server wiring
//!
//! Builds the router for the three inbound routes and owns the shared
//! per-process state: the code-flow client, the outbound HTTP client, and
//! the read-only settings derived at startup.

pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::{CodeFlowClient, CodeFlowConfig};
use crate::config::Settings;

/// Outbound calls must not hang past the inbound request's patience.
const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state shared across handlers. Read-only after startup, so
/// concurrent requests need no coordination.
pub struct AppState {
    pub code_flow: CodeFlowClient,
    /// Shared client for the downstream API call
    pub http_client: reqwest::Client,
    /// Absolute callback URL registered with the identity provider
    pub callback_url: String,
    pub audience: String,
    pub scope: String,
    pub forecast_api_url: String,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/Home/InvokeApi", get(handlers::invoke_api))
        .route(
            "/Home/InvokeApiCallback",
            get(handlers::invoke_api_callback),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// Routes:
/// - GET /                        - landing page with a login link
/// - GET /Home/InvokeApi          - redirect to the provider authorize URL
/// - GET /Home/InvokeApiCallback  - code exchange + downstream API call
///
/// # Errors
/// Returns error if the outbound client cannot be built or binding fails
pub async fn start_server(settings: Settings) -> anyhow::Result<()> {
    let http_client = reqwest::Client::builder()
        .timeout(OUTBOUND_TIMEOUT)
        .build()?;

    let code_flow = CodeFlowClient::new(
        CodeFlowConfig::for_domain(
            &settings.auth.domain,
            settings.auth.client_id.clone(),
            settings.auth.client_secret.clone(),
        ),
        http_client.clone(),
    );

    let state = Arc::new(AppState {
        code_flow,
        http_client,
        callback_url: settings.callback_url(),
        audience: settings.auth.audience.clone(),
        scope: settings.auth.scope.clone(),
        forecast_api_url: settings.forecast_api_url.clone(),
    });

    let app = router(state);

    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = TcpListener::bind(&addr).await?;

    info!("[INFO] Listening on {}", addr);
    info!("[INFO] Available endpoints:");
    info!("  GET    /                        - Landing page");
    info!("  GET    /Home/InvokeApi          - Start authorization code flow");
    info!("  GET    /Home/InvokeApiCallback  - Provider callback");

    axum::serve(listener, app).await?;

    Ok(())
}
