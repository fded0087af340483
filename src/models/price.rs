use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::CatalogError;

/// A valuation of a painting at a given date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub id: i64,
    pub painting_id: i64,
    pub amount: f64,
    pub evaluation_date: NaiveDate,
    pub notes: Option<String>,
    /// At most one active price per painting
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrice {
    pub painting_id: i64,
    pub amount: f64,
    pub evaluation_date: NaiveDate,
    pub notes: Option<String>,
    pub active: bool,
}

impl NewPrice {
    /// New active price
    pub fn new(painting_id: i64, amount: f64, evaluation_date: NaiveDate) -> Self {
        Self {
            painting_id,
            amount,
            evaluation_date,
            notes: None,
            active: true,
        }
    }

    /// Record a price for history only, leaving the current one untouched
    pub fn historical(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(CatalogError::validation(format!(
                "Invalid price amount: {}",
                self.amount
            )));
        }
        Ok(())
    }
}

/// Min/max/average over a painting's price history
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceStatistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub average: Option<f64>,
    pub count: i64,
}

/// Painting with its active price, from a price range query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedPainting {
    pub painting_id: i64,
    pub title: String,
    pub amount: f64,
    pub evaluation_date: NaiveDate,
}
