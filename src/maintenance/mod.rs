//! One-off maintenance operations for a deployed database.
//!
//! These repair the kinds of damage a long-lived portfolio accumulates:
//! titles polluted by upload suffixes, rows whose asset file vanished,
//! and files no row references (e.g. left behind by an upload whose
//! insert failed).

use regex::Regex;
use tracing::info;
use walkdir::WalkDir;

use crate::config::Config;
use crate::db::{ImageRecord, Store};
use crate::error::Result;

const MIGRATED_PREFIX: &str = "Migrated from volume - ";

/// Strip trailing hex-code suffixes from titles and the legacy import
/// prefix from descriptions. Returns the number of rows changed.
pub fn scrub_titles(store: &Store) -> Result<usize> {
    let hex_suffix = Regex::new(r"\s+[A-Fa-f0-9]{6,8}$").expect("static pattern");

    let mut updated = 0;
    for image in store.list_images()? {
        let clean_title = image
            .title
            .as_deref()
            .map(|t| hex_suffix.replace(t, "").trim().to_string());
        let clean_description = image.description.as_deref().map(|d| {
            d.strip_prefix(MIGRATED_PREFIX)
                .unwrap_or(d)
                .trim()
                .to_string()
        });

        if clean_title != image.title || clean_description != image.description {
            store.update_image_fields(
                image.id,
                clean_title.as_deref(),
                clean_description.as_deref(),
            )?;
            updated += 1;
        }
    }

    if updated > 0 {
        info!("scrubbed titles/descriptions on {} images", updated);
    }
    Ok(updated)
}

/// Image rows whose asset file no longer exists on disk.
pub fn find_missing_files(store: &Store, config: &Config) -> Result<Vec<ImageRecord>> {
    let mut missing = Vec::new();
    for image in store.list_images()? {
        if !config.assets.dir.join(&image.filename).exists() {
            missing.push(image);
        }
    }
    Ok(missing)
}

/// Files in the assets directory that no image row references.
pub fn find_orphan_files(store: &Store, config: &Config) -> Result<Vec<String>> {
    if !config.assets.dir.exists() {
        return Ok(Vec::new());
    }
    let mut orphans = Vec::new();
    for entry in WalkDir::new(&config.assets.dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let filename = entry.file_name().to_string_lossy().to_string();
        if store.image_by_filename(&filename)?.is_none() {
            orphans.push(filename);
        }
    }
    orphans.sort();
    Ok(orphans)
}

/// Delete rows whose asset file is gone. Returns the number removed.
pub fn remove_rows_missing_files(store: &Store, config: &Config) -> Result<usize> {
    let missing = find_missing_files(store, config)?;
    let mut removed = 0;
    for image in &missing {
        if store.delete_image_row(image.id)? {
            info!("removed row for missing file {}", image.filename);
            removed += 1;
        }
    }
    Ok(removed)
}
