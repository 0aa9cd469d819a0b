//! TMDB (The Movie Database) API client.
//!
//! Only the two search endpoints are used. The first result is taken as the
//! match; TMDB orders results by relevance.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{year_from_date, CanonicalTitle};
use super::{ExternalCatalog, ExternalCatalogError};

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// TMDB API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// TMDB API key. Empty disables verification.
    #[serde(default)]
    pub api_key: String,
    /// Base URL (default: https://api.themoviedb.org/3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TmdbConfig {
    /// Whether an API key has been provided.
    pub fn is_enabled(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// TMDB API client.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Result<Self, ExternalCatalogError> {
        if !config.is_enabled() {
            return Err(ExternalCatalogError::NotConfigured(
                "TMDB API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
        })
    }

    async fn search(
        &self,
        endpoint: &str,
        query: &str,
        year_param: &str,
        year: Option<u32>,
    ) -> Result<Response, ExternalCatalogError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let mut request = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("query", query)]);

        if let Some(y) = year {
            request = request.query(&[(year_param, y.to_string())]);
        }

        let response = request.send().await?;

        let status = response.status();
        if status == 401 {
            return Err(ExternalCatalogError::NotConfigured(
                "Invalid TMDB API key".to_string(),
            ));
        }
        if status == 429 {
            return Err(ExternalCatalogError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExternalCatalogError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ExternalCatalog for TmdbClient {
    fn name(&self) -> &str {
        "tmdb"
    }

    async fn search_film(
        &self,
        title: &str,
        year: Option<u32>,
    ) -> Result<Option<CanonicalTitle>, ExternalCatalogError> {
        debug!("TMDB movie search: query='{}', year={:?}", title, year);

        let response = self.search("search/movie", title, "year", year).await?;
        let search_result: TmdbSearchResponse<TmdbMovieResult> =
            response.json().await.map_err(|e| {
                ExternalCatalogError::ParseError(format!(
                    "Failed to parse movie search response: {}",
                    e
                ))
            })?;

        Ok(search_result
            .results
            .into_iter()
            .next()
            .map(|movie| movie.into_canonical(year)))
    }

    async fn search_show(
        &self,
        title: &str,
        year: Option<u32>,
    ) -> Result<Option<CanonicalTitle>, ExternalCatalogError> {
        debug!("TMDB TV search: query='{}', year={:?}", title, year);

        let response = self
            .search("search/tv", title, "first_air_date_year", year)
            .await?;
        let search_result: TmdbSearchResponse<TmdbTvResult> =
            response.json().await.map_err(|e| {
                ExternalCatalogError::ParseError(format!(
                    "Failed to parse TV search response: {}",
                    e
                ))
            })?;

        Ok(search_result
            .results
            .into_iter()
            .next()
            .map(|show| show.into_canonical(year)))
    }
}

// ============================================================================
// TMDB API response types (internal)
// ============================================================================

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieResult {
    title: String,
    release_date: Option<String>,
}

impl TmdbMovieResult {
    fn into_canonical(self, queried_year: Option<u32>) -> CanonicalTitle {
        let year = year_from_date(self.release_date.as_deref()).or(queried_year);
        CanonicalTitle::new(self.title, year)
    }
}

#[derive(Debug, Deserialize)]
struct TmdbTvResult {
    name: String,
    first_air_date: Option<String>,
}

impl TmdbTvResult {
    fn into_canonical(self, queried_year: Option<u32>) -> CanonicalTitle {
        let year = year_from_date(self.first_air_date.as_deref()).or(queried_year);
        CanonicalTitle::new(self.name, year)
    }
}
