use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::{Value, json};

use crate::config::ResolvedConfig;
use crate::domain::{Seed, SeedId, SortMode};
use crate::error::SeedsError;

pub trait CatalogClient: Send + Sync {
    /// Reads the whole `seeds` collection in one round trip, ordered by the
    /// store on `order`'s column.
    fn fetch_all(&self, order: SortMode, descending: bool) -> Result<Vec<Seed>, SeedsError>;

    /// Writes `current + 1` into the row's `views` column. Not atomic: the
    /// caller supplies the count it last saw.
    fn increment_views(&self, id: &SeedId, current: u64) -> Result<(), SeedsError>;
}

#[derive(Clone)]
pub struct CatalogHttpClient {
    client: Client,
    base_url: String,
}

impl CatalogHttpClient {
    pub fn new(config: &ResolvedConfig) -> Result<Self, SeedsError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("vulkanseeds/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| SeedsError::Transport(err.to_string()))?,
        );
        if !config.anon_key.is_empty() {
            headers.insert(
                "apikey",
                HeaderValue::from_str(&config.anon_key)
                    .map_err(|err| SeedsError::ConfigParse(format!("anon_key: {err}")))?,
            );
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", config.anon_key))
                    .map_err(|err| SeedsError::ConfigParse(format!("anon_key: {err}")))?,
            );
        }
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| SeedsError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config.store_url.clone(),
        })
    }

    pub fn list_url(base_url: &str, order: SortMode, descending: bool) -> String {
        let direction = if descending { "desc" } else { "asc" };
        format!(
            "{}/rest/v1/seeds?select=*&order={}.{}",
            base_url.trim_end_matches('/'),
            order.order_field(),
            direction
        )
    }

    pub fn row_url(base_url: &str, id: &SeedId) -> Result<Url, SeedsError> {
        let mut url = Url::parse(&format!("{}/rest/v1/seeds", base_url.trim_end_matches('/')))
            .map_err(|err| SeedsError::ConfigParse(format!("store_url: {err}")))?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{}", id.as_str()));
        Ok(url)
    }

    /// PATCH body for a row whose count was last seen as `current`.
    pub fn views_patch(current: u64) -> Value {
        json!({ "views": current.saturating_add(1) })
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, SeedsError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "seed store request failed".to_string());
        Err(SeedsError::TransportStatus { status, message })
    }
}

impl CatalogClient for CatalogHttpClient {
    fn fetch_all(&self, order: SortMode, descending: bool) -> Result<Vec<Seed>, SeedsError> {
        let url = Self::list_url(&self.base_url, order, descending);
        tracing::debug!(%url, "fetching seeds");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| SeedsError::Transport(err.to_string()))?;
        let response = Self::handle_status(response)?;
        response
            .json::<Vec<Seed>>()
            .map_err(|err| SeedsError::Transport(err.to_string()))
    }

    fn increment_views(&self, id: &SeedId, current: u64) -> Result<(), SeedsError> {
        let url = Self::row_url(&self.base_url, id)?;
        tracing::debug!(%url, current, "incrementing views");
        let response = self
            .client
            .patch(url)
            .header("Prefer", "return=minimal")
            .json(&Self::views_patch(current))
            .send()
            .map_err(|err| SeedsError::Transport(err.to_string()))?;
        Self::handle_status(response)?;
        Ok(())
    }
}
