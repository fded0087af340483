//! Pinacoteca - catalog of paintings, series and exhibitions
//!
//! Records live in SQLite; photographs and documents live in a folder mirror
//! with one directory per painting and per exhibition.

pub mod db;
pub mod library;
pub mod models;
pub mod services;
pub mod utils;

// Re-exports
pub use db::Database;
pub use library::Library;
pub use models::*;
pub use utils::{CatalogError, CatalogResult};
