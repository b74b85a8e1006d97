//! Types for portfolio images.

use serde::Serialize;

/// A stored image row.
#[derive(Debug, Clone, Serialize)]
pub struct ImageRecord {
    pub id: i64,
    pub filename: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub uploaded_at: Option<String>,
    pub file_size: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub is_background: bool,
    pub is_slideshow_background: bool,
}

/// Partial update of an image row. `None` fields are left untouched;
/// `categories` replaces the whole association set when present.
#[derive(Debug, Clone, Default)]
pub struct ImageUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub categories: Option<Vec<String>>,
}
