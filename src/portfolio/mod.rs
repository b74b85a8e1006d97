//! Read path for the public gallery.
//!
//! Assembles display-ready items from the store. The gallery is lenient:
//! a failed category lookup for one image substitutes the fallback
//! category and moves on, so a single bad row never blanks the site.

use serde::Serialize;
use tracing::warn;

use crate::config::Config;
use crate::db::{CategoryCount, ImageRecord, Store, FEATURED_IMAGE_KEY};
use crate::error::Result;

/// One gallery entry, shaped for direct serialization to the frontend.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub filename: String,
    pub url: String,
    pub categories: Vec<String>,
    pub uploaded_at: Option<String>,
}

fn to_item(store: &Store, config: &Config, image: ImageRecord) -> GalleryItem {
    let categories = match store.categories_for_image(image.id) {
        Ok(names) if !names.is_empty() => names,
        Ok(_) => vec![config.gallery.fallback_category.clone()],
        Err(e) => {
            warn!("category lookup failed for image {}: {}", image.id, e);
            vec![config.gallery.fallback_category.clone()]
        }
    };

    let title = match image.title {
        Some(t) if !t.is_empty() => t,
        _ => format!("Image {}", image.id),
    };

    GalleryItem {
        id: image.id,
        title,
        description: image.description.unwrap_or_default(),
        url: config.assets.image_url(&image.filename),
        filename: image.filename,
        categories,
        uploaded_at: image.uploaded_at,
    }
}

/// All images in insertion order, each with its categories (or the
/// fallback set; never empty).
pub fn gallery(store: &Store, config: &Config) -> Result<Vec<GalleryItem>> {
    let images = store.list_images()?;
    Ok(images
        .into_iter()
        .map(|image| to_item(store, config, image))
        .collect())
}

/// Categories with image counts, in display order, for the filter bar.
pub fn categories_with_counts(store: &Store) -> Result<Vec<CategoryCount>> {
    store.category_counts()
}

/// The featured image, resolved from system config with a first-image
/// fallback when unset.
pub fn featured(store: &Store, config: &Config) -> Result<Option<GalleryItem>> {
    if let Some(filename) = store.config_get(FEATURED_IMAGE_KEY)? {
        if !filename.is_empty() {
            if let Some(image) = store.image_by_filename(&filename)? {
                return Ok(Some(to_item(store, config, image)));
            }
            warn!("featured image '{}' has no row, falling back", filename);
        }
    }
    Ok(store
        .first_image()?
        .map(|image| to_item(store, config, image)))
}

/// The current page background, falling back to the first image.
pub fn background(store: &Store, config: &Config) -> Result<Option<GalleryItem>> {
    if let Some(image) = store.background_image()? {
        return Ok(Some(to_item(store, config, image)));
    }
    Ok(store
        .first_image()?
        .map(|image| to_item(store, config, image)))
}
