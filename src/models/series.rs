use serde::{Deserialize, Serialize};

use crate::utils::CatalogError;

/// A named grouping of paintings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub start_period: Option<String>,
    pub end_period: Option<String>,
    /// Number of associated paintings
    pub painting_count: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewSeries {
    pub name: String,
    pub description: Option<String>,
    pub start_period: Option<String>,
    pub end_period: Option<String>,
}

impl NewSeries {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_period(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_period = Some(start.into());
        self.end_period = Some(end.into());
        self
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::validation("Series name must not be empty"));
        }
        Ok(())
    }
}

/// Partial update for a series
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub start_period: Option<Option<String>>,
    pub end_period: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct SeriesFilter {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Series starting at or after this period
    pub start_from: Option<String>,
    /// Series ending at or before this period
    pub end_until: Option<String>,
}
