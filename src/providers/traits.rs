use async_trait::async_trait;

use crate::error::RelayError;

/// Tokens returned from an OAuth provider after code exchange or refresh.
#[derive(Debug, Clone)]
pub struct TokenSet {
    pub access_token: String,
    /// Only issued on first consent, or when consent is explicitly re-prompted.
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
}

/// OAuth 2.0 authorization-code client.
///
/// Implementations hold only immutable client credentials. Per-call
/// values such as the refresh token are passed in, so one provider can be
/// shared by concurrent requests.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Build the consent URL the operator's browser is redirected to.
    fn auth_url(&self, scopes: &[&str], redirect_uri: &str) -> String;

    /// Exchange an authorization code for a token pair.
    async fn exchange_code(&self, code: &str, redirect_uri: &str)
        -> Result<TokenSet, RelayError>;

    /// Mint a short-lived access token from a refresh token.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, RelayError>;
}
