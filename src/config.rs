use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_REVIEWS_API_BASE: &str = "https://mybusiness.googleapis.com/v4";

/// Which origins may read the reviews endpoint cross-origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

impl AllowedOrigins {
    /// Parse `*` or a comma-separated origin list. Empty input means any origin.
    pub fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            AllowedOrigins::Any
        } else {
            AllowedOrigins::List(origins)
        }
    }
}

/// Application configuration, loaded once from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // ── Server ──────────────────────────────────────────────────────────
    pub host: String,
    pub port: u16,

    // ── OAuth client ────────────────────────────────────────────────────
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,
    /// Issued once by `/api/callback` and stored by the operator.
    /// Absent until the setup flow has been completed.
    pub google_refresh_token: Option<String>,
    /// Adds `prompt=consent` so Google re-issues a refresh token on every approval.
    pub force_consent: bool,

    // ── Reviews target ──────────────────────────────────────────────────
    pub account_id: String,
    pub location_id: String,

    // ── HTTP ────────────────────────────────────────────────────────────
    pub allowed_origins: AllowedOrigins,
    /// Timeout applied to every outbound call to Google.
    pub http_timeout: Duration,

    // ── Endpoints (overridable for tests and egress proxies) ────────────
    pub auth_url: String,
    pub token_url: String,
    pub reviews_api_base: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).unwrap_or_default();
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());

        let http_timeout_secs: u64 = var_or("HTTP_TIMEOUT_SECS", "10")
            .trim()
            .parse()
            .context("Invalid HTTP_TIMEOUT_SECS")?;

        Ok(Config {
            host: var_or("HOST", "0.0.0.0"),
            port: var_or("PORT", "3000")
                .trim()
                .parse()
                .context("Invalid PORT")?,

            google_client_id: var("GOOGLE_CLIENT_ID"),
            google_client_secret: var("GOOGLE_CLIENT_SECRET"),
            google_redirect_uri: var("GOOGLE_REDIRECT_URI"),
            google_refresh_token: lookup("GOOGLE_REFRESH_TOKEN")
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            force_consent: parse_flag(&var("GOOGLE_FORCE_CONSENT")),

            account_id: var("YOUR_GOOGLE_ACCOUNT_ID"),
            location_id: var("YOUR_GOOGLE_LOCATION_ID"),

            allowed_origins: AllowedOrigins::parse(&var_or("CORS_ALLOWED_ORIGINS", "*")),
            http_timeout: Duration::from_secs(http_timeout_secs),

            auth_url: var_or("GOOGLE_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: var_or("GOOGLE_TOKEN_URL", DEFAULT_TOKEN_URL),
            reviews_api_base: var_or("GOOGLE_REVIEWS_API_BASE", DEFAULT_REVIEWS_API_BASE),
        })
    }

    /// Resource name the reviews are listed under, e.g. `accounts/123/locations/456`.
    pub fn parent_resource(&self) -> String {
        format!(
            "accounts/{}/locations/{}",
            self.account_id, self.location_id
        )
    }

    /// Names of the OAuth settings that are empty. These are not fatal;
    /// the relay still starts so the operator can finish setup.
    pub fn missing_oauth_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.google_client_id.is_empty() {
            missing.push("GOOGLE_CLIENT_ID");
        }
        if self.google_client_secret.is_empty() {
            missing.push("GOOGLE_CLIENT_SECRET");
        }
        if self.google_redirect_uri.is_empty() {
            missing.push("GOOGLE_REDIRECT_URI");
        }
        missing
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
