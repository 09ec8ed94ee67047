use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use gbp_reviews_relay::{api, AppState, Config, SharedState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gbp_reviews_relay=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    info!("gbp-reviews-relay v{}", env!("CARGO_PKG_VERSION"));
    info!("Listening on {}:{}", config.host, config.port);

    let missing = config.missing_oauth_settings();
    if !missing.is_empty() {
        warn!("OAuth settings not configured: {}", missing.join(", "));
    }
    if config.google_refresh_token.is_none() {
        warn!("GOOGLE_REFRESH_TOKEN not set; visit /api/authorize to obtain one");
    }
    info!("Serving reviews for {}", config.parent_resource());

    let addr = format!("{}:{}", config.host, config.port);
    let state: SharedState = Arc::new(AppState::from_config(config)?);

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server ready ✓");
    axum::serve(listener, app).await?;

    Ok(())
}
