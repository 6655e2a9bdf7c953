// Authorization Code flow demo server
//
// Redirects the browser to the identity provider, exchanges the callback
// code for an access token, and calls the downstream forecast API with it.

use code_flow_client::{start_server, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Fail fast on incomplete configuration
    let settings = Settings::from_env()?;

    println!("Authorization Code Flow Client");
    println!();
    println!("[OK] Provider domain: {}", settings.auth.domain);
    println!("[OK] Client id: {}", settings.auth.client_id);
    println!("[OK] Callback URL: {}", settings.callback_url());
    println!("[OK] Downstream API: {}", settings.forecast_api_url);
    println!();
    println!(
        "[INFO] Starting server on {}:{}",
        settings.host, settings.port
    );
    println!();
    println!("[INFO] Available endpoints:");
    println!(
        "  GET    http://{}:{}/                        - Landing page",
        settings.host, settings.port
    );
    println!(
        "  GET    http://{}:{}/Home/InvokeApi          - Start authorization",
        settings.host, settings.port
    );
    println!(
        "  GET    http://{}:{}/Home/InvokeApiCallback  - Provider callback",
        settings.host, settings.port
    );
    println!();

    start_server(settings).await?;

    Ok(())
}
