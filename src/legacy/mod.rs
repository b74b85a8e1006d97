//! Reader for the legacy file-based portfolio listing.
//!
//! Before the relational store existed, the portfolio lived in a JSON
//! array maintained by hand. The boot migration imports it exactly once,
//! when the images table is still empty. The file is never written.

use serde::Deserialize;
use std::path::Path;

use crate::error::Result;

/// One entry of the legacy portfolio array.
///
/// Older files used `image` for the filename; newer exports used
/// `filename`. Both are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyEntry {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, alias = "image")]
    pub filename: Option<String>,

    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub created_at: Option<String>,
}

/// Load the legacy portfolio listing. A missing file is an empty portfolio.
pub fn load(path: &Path) -> Result<Vec<LegacyEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    let entries: Vec<LegacyEntry> = serde_json::from_str(&content)?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let entries = load(Path::new("/nonexistent/portfolio.json")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_accepts_image_field_alias() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolio.json");
        std::fs::write(
            &path,
            r#"[
                {"title": "Heron", "image": "heron.jpg", "categories": ["Wildlife"]},
                {"title": "Dunes", "filename": "dunes.jpg", "categories": []}
            ]"#,
        )
        .unwrap();

        let entries = load(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].filename.as_deref(), Some("heron.jpg"));
        assert_eq!(entries[1].filename.as_deref(), Some("dunes.jpg"));
    }
}
