pub mod api;
pub mod config;
pub mod error;
pub mod providers;
pub mod reviews;

pub use config::Config;
pub use error::RelayError;

use std::sync::Arc;

use providers::{GoogleProvider, OAuthProvider};
use reviews::ReviewsApi;

/// Shared application state passed to all API handlers.
///
/// Everything in here is read-only after startup.
pub struct AppState {
    pub config: Config,
    pub provider: Box<dyn OAuthProvider>,
    pub reviews: ReviewsApi,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wire the Google provider and reviews client around one HTTP client
    /// that carries the configured outbound timeout.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            provider: Box::new(GoogleProvider::new(&config, http.clone())),
            reviews: ReviewsApi::new(config.reviews_api_base.clone(), http),
            config,
        })
    }
}
