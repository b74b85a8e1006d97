//! Types for the key/value settings table.

use serde::Serialize;

/// System config key holding the featured image filename.
pub const FEATURED_IMAGE_KEY: &str = "featured_image";

#[derive(Debug, Clone, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: Option<String>,
    pub data_type: String,
    pub description: Option<String>,
}
