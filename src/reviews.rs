//! Client for the Business Profile reviews-listing endpoint.
//!
//! The relay has no schema ownership over reviews: successful bodies are
//! returned as raw bytes so the storefront sees exactly what Google sent.

use bytes::Bytes;
use serde::de::IgnoredAny;

use crate::error::RelayError;

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const NEWEST_FIRST: &str = "updateTime desc";

/// Parameters for one reviews-listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewsQuery {
    /// e.g. `accounts/12345/locations/67890`
    pub parent: String,
    pub page_size: u32,
    pub order_by: String,
}

impl ReviewsQuery {
    /// Up to 50 reviews for `parent`, most recently updated first.
    pub fn newest(parent: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            page_size: DEFAULT_PAGE_SIZE,
            order_by: NEWEST_FIRST.into(),
        }
    }
}

pub struct ReviewsApi {
    base_url: String,
    http: reqwest::Client,
}

impl ReviewsApi {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    /// List reviews and return the upstream body unmodified.
    pub async fn list_reviews(
        &self,
        access_token: &str,
        query: &ReviewsQuery,
    ) -> Result<Bytes, RelayError> {
        let url = format!("{}/{}/reviews", self.base_url, query.parent);
        let page_size = query.page_size.to_string();

        let resp = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("pageSize", page_size.as_str()),
                ("orderBy", query.order_by.as_str()),
            ])
            .send()
            .await
            .map_err(|e| RelayError::Upstream(format!("reviews request failed: {e}")))?;

        let status = resp.status();
        let body = resp.bytes().await?;

        if !status.is_success() {
            return Err(RelayError::Upstream(format!(
                "reviews list returned {status}: {}",
                String::from_utf8_lossy(&body)
            )));
        }

        serde_json::from_slice::<IgnoredAny>(&body)
            .map_err(|e| RelayError::Upstream(format!("reviews body is not JSON: {e}")))?;

        Ok(body)
    }
}
