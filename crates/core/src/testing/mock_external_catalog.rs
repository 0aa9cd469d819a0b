//! Mock external catalog for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::external_catalog::{CanonicalTitle, ExternalCatalog, ExternalCatalogError};
use crate::parser::MediaKind;

/// A recorded lookup for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedLookup {
    pub kind: MediaKind,
    pub title: String,
    pub year: Option<u32>,
}

/// Mock implementation of the ExternalCatalog trait.
///
/// Provides controllable behavior for testing:
/// - Answer lookups from configured titles (case-insensitive)
/// - Track lookups for assertions
/// - Simulate failures
#[derive(Debug)]
pub struct MockExternalCatalog {
    /// Canonical films by lowercase query title.
    films: Arc<RwLock<HashMap<String, CanonicalTitle>>>,
    /// Canonical shows by lowercase query title.
    shows: Arc<RwLock<HashMap<String, CanonicalTitle>>>,
    /// Recorded lookups.
    lookups: Arc<RwLock<Vec<RecordedLookup>>>,
    /// If set, the next lookup will fail with this error.
    next_error: Arc<RwLock<Option<ExternalCatalogError>>>,
}

impl Default for MockExternalCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExternalCatalog {
    /// Create a new mock that knows no titles.
    pub fn new() -> Self {
        Self {
            films: Arc::new(RwLock::new(HashMap::new())),
            shows: Arc::new(RwLock::new(HashMap::new())),
            lookups: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Answer film lookups for `query` with `canonical`.
    pub async fn add_film(&self, query: &str, canonical: CanonicalTitle) {
        self.films
            .write()
            .await
            .insert(query.to_lowercase(), canonical);
    }

    /// Answer show lookups for `query` with `canonical`.
    pub async fn add_show(&self, query: &str, canonical: CanonicalTitle) {
        self.shows
            .write()
            .await
            .insert(query.to_lowercase(), canonical);
    }

    /// Make the next lookup fail with the given error.
    pub async fn set_next_error(&self, error: ExternalCatalogError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get all recorded lookups.
    pub async fn recorded_lookups(&self) -> Vec<RecordedLookup> {
        self.lookups.read().await.clone()
    }

    /// Clear recorded lookups.
    pub async fn clear_lookups(&self) {
        self.lookups.write().await.clear();
    }

    async fn lookup(
        &self,
        kind: MediaKind,
        title: &str,
        year: Option<u32>,
    ) -> Result<Option<CanonicalTitle>, ExternalCatalogError> {
        self.lookups.write().await.push(RecordedLookup {
            kind,
            title: title.to_string(),
            year,
        });

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        let table = match kind {
            MediaKind::Film => &self.films,
            MediaKind::Episode => &self.shows,
        };
        Ok(table.read().await.get(&title.to_lowercase()).cloned())
    }
}

#[async_trait]
impl ExternalCatalog for MockExternalCatalog {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search_film(
        &self,
        title: &str,
        year: Option<u32>,
    ) -> Result<Option<CanonicalTitle>, ExternalCatalogError> {
        self.lookup(MediaKind::Film, title, year).await
    }

    async fn search_show(
        &self,
        title: &str,
        year: Option<u32>,
    ) -> Result<Option<CanonicalTitle>, ExternalCatalogError> {
        self.lookup(MediaKind::Episode, title, year).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_answers_case_insensitively() {
        let catalog = MockExternalCatalog::new();
        catalog
            .add_show("the office", CanonicalTitle::new("The Office", Some(2005)))
            .await;

        let found = catalog.search_show("The Office", None).await.unwrap();
        assert_eq!(found, Some(CanonicalTitle::new("The Office", Some(2005))));
        assert_eq!(catalog.search_film("The Office", None).await.unwrap(), None);
        assert_eq!(catalog.recorded_lookups().await.len(), 2);
    }

    #[tokio::test]
    async fn test_mock_error_injection_is_one_shot() {
        let catalog = MockExternalCatalog::new();
        catalog
            .set_next_error(ExternalCatalogError::RateLimitExceeded)
            .await;

        assert!(catalog.search_film("Heat", None).await.is_err());
        assert!(catalog.search_film("Heat", None).await.is_ok());

        catalog.clear_lookups().await;
        assert!(catalog.recorded_lookups().await.is_empty());
    }
}
