use async_trait::async_trait;
use serde::Deserialize;

use super::traits::{OAuthProvider, TokenSet};
use crate::config::Config;
use crate::error::RelayError;

/// Scope required to read reviews through the Business Profile API.
pub const BUSINESS_MANAGE_SCOPE: &str = "https://www.googleapis.com/auth/business.manage";

/// Google OAuth 2.0 provider.
///
/// Refresh tokens are only issued with `access_type=offline`, and Google
/// issues them on first consent only unless `prompt=consent` is sent.
pub struct GoogleProvider {
    client_id: String,
    client_secret: String,
    auth_endpoint: String,
    token_endpoint: String,
    force_consent: bool,
    http: reqwest::Client,
}

// Raw token response from Google's token endpoint
#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    token_type: String,
    expires_in: Option<u64>,
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: String,
    error_description: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".into()
}

impl From<GoogleTokenResponse> for TokenSet {
    fn from(resp: GoogleTokenResponse) -> Self {
        TokenSet {
            access_token: resp.access_token,
            refresh_token: resp.refresh_token,
            token_type: resp.token_type,
            expires_in: resp.expires_in,
            scope: resp.scope,
        }
    }
}

impl GoogleProvider {
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            auth_endpoint: config.auth_url.clone(),
            token_endpoint: config.token_url.clone(),
            force_consent: config.force_consent,
            http,
        }
    }

    /// POST a grant to the token endpoint. Errors are returned as plain
    /// descriptions so each caller can pick its own error kind.
    async fn token_request(&self, form: &[(&str, &str)]) -> Result<GoogleTokenResponse, String> {
        let resp = self
            .http
            .post(&self.token_endpoint)
            .form(form)
            .send()
            .await
            .map_err(|e| format!("token request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(describe_token_error(status, &body));
        }

        resp.json()
            .await
            .map_err(|e| format!("failed to parse token response: {e}"))
    }
}

#[async_trait]
impl OAuthProvider for GoogleProvider {
    fn auth_url(&self, scopes: &[&str], redirect_uri: &str) -> String {
        let scope_str = scopes.join(" ");
        let separator = if self.auth_endpoint.contains('?') { '&' } else { '?' };
        let mut url = format!(
            "{endpoint}{separator}\
             client_id={client_id}\
             &redirect_uri={redirect_uri}\
             &response_type=code\
             &scope={scope}\
             &access_type=offline",
            endpoint = self.auth_endpoint,
            client_id = urlencoding(&self.client_id),
            redirect_uri = urlencoding(redirect_uri),
            scope = urlencoding(&scope_str),
        );
        if self.force_consent {
            url.push_str("&prompt=consent");
        }
        url
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenSet, RelayError> {
        let token_resp = self
            .token_request(&[
                ("code", code),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .await
            .map_err(RelayError::ExchangeFailed)?;

        Ok(token_resp.into())
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, RelayError> {
        let token_resp = self
            .token_request(&[
                ("refresh_token", refresh_token),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
                ("grant_type", "refresh_token"),
            ])
            .await
            .map_err(|e| RelayError::Upstream(format!("access token refresh: {e}")))?;

        Ok(token_resp.into())
    }
}

fn describe_token_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<GoogleErrorResponse>(body) {
        Ok(GoogleErrorResponse {
            error,
            error_description: Some(description),
        }) => format!("Google returned {status}: {error} ({description})"),
        Ok(GoogleErrorResponse { error, .. }) => format!("Google returned {status}: {error}"),
        Err(_) => format!("Google returned {status}: {body}"),
    }
}

/// Simple percent-encoding for URL parameters.
fn urlencoding(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(token_url: &str) -> Config {
        let token_url = token_url.to_string();
        Config::from_lookup(move |key| match key {
            "GOOGLE_CLIENT_ID" => Some("client-123.apps.googleusercontent.com".into()),
            "GOOGLE_CLIENT_SECRET" => Some("shh".into()),
            "GOOGLE_TOKEN_URL" => Some(token_url.clone()),
            _ => None,
        })
        .unwrap()
    }

    fn query_of(url: &str) -> HashMap<String, String> {
        url::Url::parse(url)
            .unwrap()
            .query_pairs()
            .into_owned()
            .collect()
    }

    #[test]
    fn test_auth_url_requests_offline_business_scope() {
        let provider = GoogleProvider::new(&test_config("http://unused"), reqwest::Client::new());
        let url = provider.auth_url(&[BUSINESS_MANAGE_SCOPE], "https://relay.example.com/api/callback");

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        let query = query_of(&url);
        assert_eq!(query["client_id"], "client-123.apps.googleusercontent.com");
        assert_eq!(query["scope"], BUSINESS_MANAGE_SCOPE);
        assert_eq!(query["access_type"], "offline");
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["redirect_uri"], "https://relay.example.com/api/callback");
        assert!(!query.contains_key("prompt"));
    }

    #[test]
    fn test_auth_url_force_consent() {
        let mut config = test_config("http://unused");
        config.force_consent = true;
        let provider = GoogleProvider::new(&config, reqwest::Client::new());
        let query = query_of(&provider.auth_url(&[BUSINESS_MANAGE_SCOPE], "http://localhost/cb"));
        assert_eq!(query["prompt"], "consent");
    }

    #[tokio::test]
    async fn test_exchange_code_returns_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=auth-code-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.access",
                "refresh_token": "1//refresh",
                "token_type": "Bearer",
                "expires_in": 3599,
                "scope": BUSINESS_MANAGE_SCOPE,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(
            &test_config(&format!("{}/token", server.uri())),
            reqwest::Client::new(),
        );
        let tokens = provider
            .exchange_code("auth-code-1", "http://localhost/cb")
            .await
            .unwrap();
        assert_eq!(tokens.access_token, "ya29.access");
        assert_eq!(tokens.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(tokens.expires_in, Some(3599));
    }

    #[tokio::test]
    async fn test_exchange_code_failure_carries_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Malformed auth code.",
            })))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(
            &test_config(&format!("{}/token", server.uri())),
            reqwest::Client::new(),
        );
        let err = provider
            .exchange_code("bad", "http://localhost/cb")
            .await
            .unwrap_err();
        match err {
            RelayError::ExchangeFailed(detail) => {
                assert!(detail.contains("invalid_grant"));
                assert!(detail.contains("Malformed auth code."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refresh_failure_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(
            &test_config(&format!("{}/token", server.uri())),
            reqwest::Client::new(),
        );
        let err = provider.refresh_token("1//revoked").await.unwrap_err();
        assert!(matches!(err, RelayError::Upstream(_)));
    }
}
