use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A photograph of a painting. Only the path is stored; the file lives in the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: i64,
    pub painting_id: i64,
    pub path: PathBuf,
    pub description: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPhoto {
    pub painting_id: i64,
    pub path: PathBuf,
    pub description: Option<String>,
}

impl NewPhoto {
    pub fn new(painting_id: i64, path: impl Into<PathBuf>) -> Self {
        Self {
            painting_id,
            path: path.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
