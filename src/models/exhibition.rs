use serde::{Deserialize, Serialize};

use crate::utils::CatalogError;

/// An event at which paintings are displayed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Exhibition {
    pub id: i64,
    pub name: String,
    pub theme: Option<String>,
    /// Solo, group, online, ...
    pub kind: Option<String>,
    pub artists: Option<String>,
    pub date: Option<String>,
    pub venue: Option<String>,
    pub curator: Option<String>,
    pub organizer: Option<String>,
    pub period: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewExhibition {
    pub name: String,
    pub theme: Option<String>,
    pub kind: Option<String>,
    pub artists: Option<String>,
    pub date: Option<String>,
    pub venue: Option<String>,
    pub curator: Option<String>,
    pub organizer: Option<String>,
    pub period: Option<String>,
}

impl NewExhibition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::validation("Exhibition name must not be empty"));
        }
        Ok(())
    }
}

/// Partial update for an exhibition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExhibitionUpdate {
    pub name: Option<String>,
    pub theme: Option<Option<String>>,
    pub kind: Option<Option<String>>,
    pub artists: Option<Option<String>>,
    pub date: Option<Option<String>>,
    pub venue: Option<Option<String>>,
    pub curator: Option<Option<String>>,
    pub organizer: Option<Option<String>>,
    pub period: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct ExhibitionFilter {
    pub name: Option<String>,
    pub venue: Option<String>,
    /// Substring of the date field, usually a year
    pub year: Option<String>,
    /// Only exhibitions with at least one painting
    pub only_with_paintings: bool,
}

/// Exhibition search row with its painting count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExhibitionSummary {
    pub id: i64,
    pub name: String,
    pub date: Option<String>,
    pub venue: Option<String>,
    pub painting_count: i64,
}
