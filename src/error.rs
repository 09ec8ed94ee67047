use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Body returned when an upstream call fails. The cause is logged, not exposed.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to fetch Google Reviews.";

/// Unified error type for the reviews relay.
///
/// Every variant is terminal for the request and answers 500. Reviews-path
/// variants render as JSON `{"error": ...}`; setup-flow variants render as
/// plain text for the operator's browser.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    // ── Reviews path ────────────────────────────────────────────────────
    #[error("Refresh Token not configured on the server.")]
    RefreshTokenNotConfigured,

    #[error("Upstream error: {0}")]
    Upstream(String),

    // ── Setup flow ──────────────────────────────────────────────────────
    #[error("Missing authorization code in callback request.")]
    MissingCode,

    #[error("Authorization was not granted: {0}")]
    ConsentDenied(String),

    #[error("Failed to get refresh token. {0}")]
    ExchangeFailed(String),

    #[error(
        "Refresh token was not provided by Google. Did you already authorize this app? \
         Remove its access in your Google account settings and authorize again, \
         or set GOOGLE_FORCE_CONSENT=true."
    )]
    RefreshTokenNotIssued,
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        RelayError::Upstream(e.to_string())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;

        match &self {
            RelayError::RefreshTokenNotConfigured => {
                tracing::warn!("Reviews requested but GOOGLE_REFRESH_TOKEN is not set");
                (status, axum::Json(json!({ "error": self.to_string() }))).into_response()
            }
            RelayError::Upstream(detail) => {
                tracing::error!("Error fetching reviews: {detail}");
                (status, axum::Json(json!({ "error": UPSTREAM_FAILURE_MESSAGE }))).into_response()
            }
            RelayError::MissingCode
            | RelayError::ConsentDenied(_)
            | RelayError::ExchangeFailed(_)
            | RelayError::RefreshTokenNotIssued => {
                tracing::error!("Error getting refresh token: {self}");
                (
                    status,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    self.to_string(),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: RelayError) -> (StatusCode, Option<String>, String) {
        let resp = err.into_response();
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_upstream_detail_is_not_rendered() {
        let (status, content_type, body) =
            render(RelayError::Upstream("invalid_grant: Token has been revoked".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(body, r#"{"error":"Failed to fetch Google Reviews."}"#);
    }

    #[tokio::test]
    async fn test_missing_refresh_token_mentions_configuration() {
        let (status, _, body) = render(RelayError::RefreshTokenNotConfigured).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("not configured"));
    }

    #[tokio::test]
    async fn test_setup_flow_errors_are_plain_text() {
        let (status, content_type, body) = render(RelayError::RefreshTokenNotIssued).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
        assert!(body.contains("already authorize"));

        let (status, _, body) = render(RelayError::ExchangeFailed("invalid_grant".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Failed to get refresh token. invalid_grant");
    }

    #[tokio::test]
    async fn test_callback_rejections_answer_500_with_own_message() {
        let (status, content_type, missing) = render(RelayError::MissingCode).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
        assert!(missing.contains("Missing authorization code"));

        let (status, _, denied) = render(RelayError::ConsentDenied("access_denied".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(denied.contains("access_denied"));
        assert_ne!(missing, denied);
    }
}
