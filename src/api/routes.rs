//! Route handlers for the reviews relay.
//!
//! All handlers receive `SharedState` via Axum state extraction. Setup is a
//! manual, operator-driven sequence: authorize → (consent in browser) →
//! callback → (operator stores the refresh token) → reviews.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::RelayError;
use crate::providers::BUSINESS_MANAGE_SCOPE;
use crate::reviews::ReviewsQuery;
use crate::SharedState;

pub fn api_router(state: SharedState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/reviews", get(reviews).layer(cors))
        .route("/authorize", get(authorize))
        .route("/callback", get(callback))
        .with_state(state)
}

async fn status() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "gbp-reviews-relay",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// =============================================================================
// Reviews
// =============================================================================

/// GET /api/reviews — Latest reviews for the configured location, verbatim.
async fn reviews(State(state): State<SharedState>) -> Result<Response, RelayError> {
    let refresh_token = state
        .config
        .google_refresh_token
        .as_deref()
        .ok_or(RelayError::RefreshTokenNotConfigured)?;

    let tokens = state.provider.refresh_token(refresh_token).await?;

    let query = ReviewsQuery::newest(state.config.parent_resource());
    let body = state
        .reviews
        .list_reviews(&tokens.access_token, &query)
        .await?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

// =============================================================================
// OAuth setup
// =============================================================================

/// GET /api/authorize — Redirect the operator to Google's consent screen.
async fn authorize(State(state): State<SharedState>) -> Response {
    let url = state
        .provider
        .auth_url(&[BUSINESS_MANAGE_SCOPE], &state.config.google_redirect_uri);

    info!("Redirecting to Google consent screen");
    // axum's Redirect only offers 303, 307 and 308
    (StatusCode::FOUND, [(header::LOCATION, url)]).into_response()
}

#[derive(Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    /// Set by Google instead of `code` when the user declines consent.
    error: Option<String>,
}

/// GET /api/callback — Exchange the code and display the refresh token once.
async fn callback(
    State(state): State<SharedState>,
    Query(q): Query<CallbackQuery>,
) -> Result<Html<String>, RelayError> {
    if let Some(reason) = q.error {
        return Err(RelayError::ConsentDenied(reason));
    }

    let code = q
        .code
        .filter(|c| !c.is_empty())
        .ok_or(RelayError::MissingCode)?;

    let tokens = state
        .provider
        .exchange_code(&code, &state.config.google_redirect_uri)
        .await?;

    let refresh_token = tokens
        .refresh_token
        .filter(|t| !t.is_empty())
        .ok_or(RelayError::RefreshTokenNotIssued)?;

    info!("Authorization code exchanged; refresh token issued");
    Ok(Html(refresh_token_page(&refresh_token)))
}

fn refresh_token_page(refresh_token: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head><meta charset="utf-8"><title>Authorization Successful</title></head>
  <body>
    <h1>Authorization Successful!</h1>
    <p>Your Refresh Token is:</p>
    <pre style="font-size: 1.2em; background-color: #eee; padding: 20px; border-radius: 5px; word-wrap: break-word;">{token}</pre>
    <p><b>ACTION REQUIRED:</b> Copy this token and store it in the server environment as <code>GOOGLE_REFRESH_TOKEN</code>, then restart the relay. You can now close this window.</p>
  </body>
</html>
"#,
        token = html_escape(refresh_token),
    )
}

/// Escapes text for HTML display.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
