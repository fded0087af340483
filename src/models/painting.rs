use serde::{Deserialize, Serialize};

use crate::utils::CatalogError;

/// A catalogued artwork
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Painting {
    pub id: i64,
    pub title: String,
    pub technique: Option<String>,
    /// Free-text size descriptor, e.g. "50x70 cm"
    pub size: Option<String>,
    /// Free text, usually a year
    pub creation_date: Option<String>,
    /// Where the painting is kept right now (free text)
    pub location: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Fields for inserting a painting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPainting {
    pub title: String,
    pub technique: Option<String>,
    pub size: Option<String>,
    pub creation_date: Option<String>,
    pub location: Option<String>,
}

impl NewPainting {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_technique(mut self, technique: impl Into<String>) -> Self {
        self.technique = Some(technique.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_creation_date(mut self, date: impl Into<String>) -> Self {
        self.creation_date = Some(date.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.title.trim().is_empty() {
            return Err(CatalogError::validation("Painting title must not be empty"));
        }
        Ok(())
    }
}

/// Partial update: only `Some` fields are written.
///
/// Optional columns take `Some(None)` to be cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaintingUpdate {
    pub title: Option<String>,
    pub technique: Option<Option<String>>,
    pub size: Option<Option<String>>,
    pub creation_date: Option<Option<String>>,
    pub location: Option<Option<String>>,
}

impl PaintingUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.technique.is_none()
            && self.size.is_none()
            && self.creation_date.is_none()
            && self.location.is_none()
    }
}

/// Simple search: every non-empty field is a case-insensitive substring match
#[derive(Debug, Clone, Default)]
pub struct PaintingFilter {
    pub title: Option<String>,
    pub technique: Option<String>,
    pub size: Option<String>,
    pub creation_date: Option<String>,
    pub location: Option<String>,
}

/// Search over paintings joined with their latest price, series and exhibitions
#[derive(Debug, Clone, Default)]
pub struct AdvancedFilter {
    pub basic: PaintingFilter,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Substring of a series name
    pub series: Option<String>,
    /// Substring of an exhibition name
    pub exhibition: Option<String>,
}

/// One row of an advanced search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaintingSearchRow {
    pub painting: Painting,
    /// Amount of the most recent price by evaluation date
    pub latest_price: Option<f64>,
    /// Comma-separated series names
    pub series_names: Option<String>,
    /// Comma-separated exhibition names
    pub exhibition_names: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(NewPainting::new("Still Life").validate().is_ok());
        assert!(matches!(
            NewPainting::new("   ").validate(),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn test_update_is_empty() {
        assert!(PaintingUpdate::default().is_empty());
        let update = PaintingUpdate {
            location: Some(None),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
