use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One stay of a painting at a venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: i64,
    pub painting_id: i64,
    pub venue: String,
    pub entry_date: NaiveDate,
    pub exit_date: Option<NaiveDate>,
    pub notes: Option<String>,
    /// At most one current record per painting
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLocation {
    pub painting_id: i64,
    pub venue: String,
    pub entry_date: NaiveDate,
    pub exit_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl NewLocation {
    pub fn new(painting_id: i64, venue: impl Into<String>, entry_date: NaiveDate) -> Self {
        Self {
            painting_id,
            venue: venue.into(),
            entry_date,
            exit_date: None,
            notes: None,
        }
    }

    pub fn with_exit(mut self, exit_date: NaiveDate) -> Self {
        self.exit_date = Some(exit_date);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// A stay without an exit date is where the painting is now
    pub fn is_current(&self) -> bool {
        self.exit_date.is_none()
    }
}

/// Distinct venue with the number of stays recorded there
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueSummary {
    pub venue: String,
    pub stays: i64,
}

/// A painting that is or was at a venue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaintingAtVenue {
    pub painting_id: i64,
    pub title: String,
    pub entry_date: NaiveDate,
    pub exit_date: Option<NaiveDate>,
    pub is_current: bool,
}

/// Length of one stay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeAtLocation {
    pub venue: String,
    pub entry_date: NaiveDate,
    pub exit_date: Option<NaiveDate>,
    pub days: i64,
}
