//! External catalog lookups used to canonicalize titles.
//!
//! Verification is optional. When no catalog is configured, or a lookup
//! fails, callers keep the parsed title and year.

mod tmdb;
mod types;

pub use tmdb::{TmdbClient, TmdbConfig};
pub use types::CanonicalTitle;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when interacting with external catalogs.
#[derive(Debug, Error)]
pub enum ExternalCatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// A catalog that can canonicalize film and show titles.
#[async_trait]
pub trait ExternalCatalog: Send + Sync {
    /// Name of the catalog, for logs.
    fn name(&self) -> &str;

    /// Look up a film. `Ok(None)` means no match.
    async fn search_film(
        &self,
        title: &str,
        year: Option<u32>,
    ) -> Result<Option<CanonicalTitle>, ExternalCatalogError>;

    /// Look up a show by title and first-air year. `Ok(None)` means no match.
    async fn search_show(
        &self,
        title: &str,
        year: Option<u32>,
    ) -> Result<Option<CanonicalTitle>, ExternalCatalogError>;
}
