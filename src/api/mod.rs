//! HTTP surface of the relay, mounted under /api:
//! - /api/reviews   — reviews pass-through for the storefront (CORS-enabled)
//! - /api/authorize — start the one-time OAuth setup
//! - /api/callback  — OAuth redirect target, shows the refresh token
//! - /api/status    — health check

pub mod routes;

use crate::config::AllowedOrigins;
use crate::SharedState;
use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .nest("/api", routes::api_router(state, cors))
        .layer(TraceLayer::new_for_http())
}

/// Cross-origin policy for the reviews endpoint.
pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let allow_origin = match origins {
        AllowedOrigins::Any => AllowOrigin::from(Any),
        AllowedOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin {origin:?}");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(values)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET])
}
