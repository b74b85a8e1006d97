//! Types for gallery categories.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub display_order: i64,
}

/// A category together with how many images it holds, for the gallery
/// filter bar.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub id: i64,
    pub name: String,
    pub image_count: i64,
}
