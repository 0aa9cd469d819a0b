//! Types returned by external catalogs.

use serde::{Deserialize, Serialize};

/// Canonical title and year of a film or show as known to a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalTitle {
    pub title: String,
    pub year: Option<u32>,
}

impl CanonicalTitle {
    pub fn new(title: impl Into<String>, year: Option<u32>) -> Self {
        Self {
            title: title.into(),
            year,
        }
    }
}

/// Year from an ISO date such as "1999-03-31".
pub(crate) fn year_from_date(date: Option<&str>) -> Option<u32> {
    date.and_then(|d| d.get(..4)).and_then(|y| y.parse().ok())
}
