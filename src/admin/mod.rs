//! Write path for the admin dashboard.
//!
//! Every operation validates its input and returns a typed error the
//! HTTP layer maps onto a `{success, message}` response. Uploads write
//! the asset file before the database row; a failed insert therefore
//! leaves an orphaned file behind (known gap, the maintenance module
//! can find them).

pub mod files;

use tracing::{info, warn};

use crate::config::Config;
use crate::db::{ImageUpdate, Store, FEATURED_IMAGE_KEY};
use crate::error::{Error, Result};

/// One file of an upload batch, as received by the HTTP layer.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

/// A validated-on-entry upload request.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub title: String,
    pub description: String,
    pub categories: Vec<String>,
    pub files: Vec<IncomingFile>,
}

#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub image_ids: Vec<i64>,
    pub filenames: Vec<String>,
}

/// Create one image row (plus asset file and category links) per
/// uploaded file. Multi-file uploads number their titles.
pub fn upload(store: &Store, config: &Config, upload: NewUpload) -> Result<UploadOutcome> {
    if upload.title.trim().is_empty() {
        return Err(Error::validation("Please enter an image title"));
    }
    if upload.description.trim().is_empty() {
        return Err(Error::validation("Please enter a description"));
    }
    if upload.categories.is_empty() {
        return Err(Error::validation("Please select at least one category"));
    }
    if upload.files.is_empty() {
        return Err(Error::validation("Please select at least one image file"));
    }

    let multi = upload.files.len() > 1;
    let mut outcome = UploadOutcome {
        image_ids: Vec::new(),
        filenames: Vec::new(),
    };

    for (index, file) in upload.files.iter().enumerate() {
        let filename = files::unique_filename(&upload.title, &file.original_name, index);

        // The file lands on disk first; the row references it afterwards
        files::save_asset(config, &filename, &file.bytes)?;

        let dimensions = image::load_from_memory(&file.bytes)
            .map(|img| (img.width() as i64, img.height() as i64))
            .ok();

        let title = if multi {
            format!("{} {}", upload.title.trim(), index + 1)
        } else {
            upload.title.trim().to_string()
        };

        let image_id = store.insert_image(
            &filename,
            Some(&title),
            Some(upload.description.trim()),
            Some(file.bytes.len() as i64),
            dimensions.map(|(w, _)| w),
            dimensions.map(|(_, h)| h),
            None,
        )?;
        store.set_image_categories(image_id, &upload.categories)?;

        info!("uploaded image {} as {}", image_id, filename);
        outcome.image_ids.push(image_id);
        outcome.filenames.push(filename);
    }

    Ok(outcome)
}

/// Patch title/description and optionally replace the category set.
pub fn update_image(store: &Store, id: i64, update: ImageUpdate) -> Result<()> {
    if store.get_image(id)?.is_none() {
        return Err(Error::not_found("image", id));
    }
    store.update_image_fields(id, update.title.as_deref(), update.description.as_deref())?;
    if let Some(categories) = &update.categories {
        store.set_image_categories(id, categories)?;
    }
    Ok(())
}

/// Delete an image: asset file, row, and join rows (cascade).
pub fn delete_image(store: &Store, config: &Config, id: i64) -> Result<()> {
    let image = store
        .get_image(id)?
        .ok_or_else(|| Error::not_found("image", id))?;

    match files::remove_asset(config, &image.filename) {
        Ok(true) => {}
        Ok(false) => warn!("asset file {} already missing on delete", image.filename),
        Err(e) => warn!("could not remove asset file {}: {}", image.filename, e),
    }

    store.delete_image_row(id)?;
    info!("deleted image {} ({})", id, image.filename);
    Ok(())
}

/// Delete a set of images; unknown ids are skipped. Returns how many
/// rows were removed.
pub fn bulk_delete(store: &Store, config: &Config, ids: &[i64]) -> Result<usize> {
    if ids.is_empty() {
        return Err(Error::validation("No images selected"));
    }
    let mut deleted = 0;
    for &id in ids {
        match delete_image(store, config, id) {
            Ok(()) => deleted += 1,
            Err(Error::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(deleted)
}

/// Replace the category set of every listed image. Returns how many
/// images were updated.
pub fn bulk_assign_categories(
    store: &Store,
    ids: &[i64],
    categories: &[String],
) -> Result<usize> {
    if ids.is_empty() {
        return Err(Error::validation("No images selected"));
    }
    if categories.is_empty() {
        return Err(Error::validation("No categories selected"));
    }
    let mut updated = 0;
    for &id in ids {
        if store.get_image(id)?.is_none() {
            continue;
        }
        store.set_image_categories(id, categories)?;
        updated += 1;
    }
    Ok(updated)
}

/// Make one image the page background (exclusive).
pub fn set_background(store: &Store, id: i64) -> Result<()> {
    store.set_background(id)
}

/// Record an image as featured in system config.
pub fn set_featured(store: &Store, id: i64) -> Result<()> {
    let image = store
        .get_image(id)?
        .ok_or_else(|| Error::not_found("image", id))?;
    store.config_set(FEATURED_IMAGE_KEY, &image.filename)
}

/// Compare a login attempt against the configured dashboard password.
/// An empty configured password locks the dashboard entirely.
pub fn check_password(config: &Config, attempt: &str) -> bool {
    !config.admin.password.is_empty() && config.admin.password == attempt
}

// ============================================================================
// Category management
// ============================================================================

pub fn create_category(store: &Store, name: &str) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Please enter a category name"));
    }
    if store.category_by_name(name)?.is_some() {
        return Err(Error::validation(format!(
            "Category '{name}' already exists"
        )));
    }
    store.create_category(name)
}

pub fn rename_category(store: &Store, id: i64, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Please enter a category name"));
    }
    if let Some(existing) = store.category_by_name(name)? {
        if existing.id != id {
            return Err(Error::validation(format!(
                "Category '{name}' already exists"
            )));
        }
    }
    store.rename_category(id, name)
}

/// Remove a category; its join rows cascade, images stay.
pub fn delete_category(store: &Store, id: i64) -> Result<()> {
    if !store.delete_category(id)? {
        return Err(Error::not_found("category", id));
    }
    Ok(())
}

/// Rewrite category display order to match the given id list.
pub fn reorder_categories(store: &Store, ids: &[i64]) -> Result<()> {
    store.reorder_categories(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn test_setup() -> (TempDir, Store, Config) {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.db_path = dir.path().join("test.db");
        config.assets.dir = dir.path().join("assets");
        config.legacy.portfolio_file = dir.path().join("none.json");
        let store = Store::open(&config.db_path).unwrap();
        migrate::run(&store, &config);
        (dir, store, config)
    }

    fn file(name: &str) -> IncomingFile {
        IncomingFile {
            original_name: name.to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
        }
    }

    fn valid_upload(files: Vec<IncomingFile>) -> NewUpload {
        NewUpload {
            title: "Sunset Over Lake".to_string(),
            description: "Evening light".to_string(),
            categories: vec!["Landscapes".to_string()],
            files,
        }
    }

    #[test]
    fn test_upload_validation() {
        let (_dir, store, config) = test_setup();

        let mut missing_title = valid_upload(vec![file("a.jpg")]);
        missing_title.title = "  ".to_string();
        assert!(matches!(
            upload(&store, &config, missing_title),
            Err(Error::Validation(_))
        ));

        let mut no_categories = valid_upload(vec![file("a.jpg")]);
        no_categories.categories.clear();
        assert!(matches!(
            upload(&store, &config, no_categories),
            Err(Error::Validation(_))
        ));

        let no_files = valid_upload(vec![]);
        assert!(matches!(
            upload(&store, &config, no_files),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_multi_upload_distinct_filenames_and_numbered_titles() {
        let (_dir, store, config) = test_setup();
        let outcome = upload(
            &store,
            &config,
            valid_upload(vec![file("a.jpg"), file("b.jpg"), file("c.jpg")]),
        )
        .unwrap();

        assert_eq!(outcome.image_ids.len(), 3);
        let unique: HashSet<&String> = outcome.filenames.iter().collect();
        assert_eq!(unique.len(), 3);

        // Each file exists on disk and each row carries a numbered title
        for (i, filename) in outcome.filenames.iter().enumerate() {
            assert!(config.assets.dir.join(filename).exists());
            let image = store.image_by_filename(filename).unwrap().unwrap();
            assert_eq!(image.title.as_deref(), Some(format!("Sunset Over Lake {}", i + 1).as_str()));
            assert_eq!(
                store.categories_for_image(image.id).unwrap(),
                vec!["Landscapes".to_string()]
            );
        }
    }

    #[test]
    fn test_single_upload_keeps_plain_title() {
        let (_dir, store, config) = test_setup();
        let outcome = upload(&store, &config, valid_upload(vec![file("a.jpg")])).unwrap();
        let image = store.get_image(outcome.image_ids[0]).unwrap().unwrap();
        assert_eq!(image.title.as_deref(), Some("Sunset Over Lake"));
        assert_eq!(image.file_size, Some(4));
    }

    #[test]
    fn test_update_image_is_partial() {
        let (_dir, store, config) = test_setup();
        let outcome = upload(&store, &config, valid_upload(vec![file("a.jpg")])).unwrap();
        let id = outcome.image_ids[0];

        update_image(
            &store,
            id,
            ImageUpdate {
                title: Some("Dusk Over Lake".to_string()),
                description: None,
                categories: Some(vec!["Nature".to_string()]),
            },
        )
        .unwrap();

        let image = store.get_image(id).unwrap().unwrap();
        assert_eq!(image.title.as_deref(), Some("Dusk Over Lake"));
        assert_eq!(image.description.as_deref(), Some("Evening light"));
        assert_eq!(
            store.categories_for_image(id).unwrap(),
            vec!["Nature".to_string()]
        );

        assert!(matches!(
            update_image(&store, 9999, ImageUpdate::default()),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_delete_removes_file_and_joins() {
        let (_dir, store, config) = test_setup();
        let outcome = upload(&store, &config, valid_upload(vec![file("a.jpg")])).unwrap();
        let id = outcome.image_ids[0];
        let path = config.assets.dir.join(&outcome.filenames[0]);
        assert!(path.exists());

        delete_image(&store, &config, id).unwrap();

        assert!(!path.exists());
        assert!(store.get_image(id).unwrap().is_none());
        assert!(store.categories_for_image(id).unwrap().is_empty());
        assert_eq!(crate::portfolio::gallery(&store, &config).unwrap().len(), 0);
    }

    #[test]
    fn test_bulk_delete_skips_unknown_ids() {
        let (_dir, store, config) = test_setup();
        let outcome = upload(
            &store,
            &config,
            valid_upload(vec![file("a.jpg"), file("b.jpg")]),
        )
        .unwrap();

        let mut ids = outcome.image_ids.clone();
        ids.push(9999);
        let deleted = bulk_delete(&store, &config, &ids).unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.count_images().unwrap(), 0);
    }

    #[test]
    fn test_bulk_assign_replaces_category_set() {
        let (_dir, store, config) = test_setup();
        let outcome = upload(
            &store,
            &config,
            valid_upload(vec![file("a.jpg"), file("b.jpg")]),
        )
        .unwrap();

        let updated = bulk_assign_categories(
            &store,
            &outcome.image_ids,
            &["Wildlife".to_string(), "Events".to_string()],
        )
        .unwrap();
        assert_eq!(updated, 2);

        for id in &outcome.image_ids {
            assert_eq!(
                store.categories_for_image(*id).unwrap(),
                vec!["Wildlife".to_string(), "Events".to_string()]
            );
        }
    }

    #[test]
    fn test_set_background_is_exclusive() {
        let (_dir, store, config) = test_setup();
        let outcome = upload(
            &store,
            &config,
            valid_upload(vec![file("a.jpg"), file("b.jpg")]),
        )
        .unwrap();
        let (first, second) = (outcome.image_ids[0], outcome.image_ids[1]);

        set_background(&store, first).unwrap();
        set_background(&store, second).unwrap();

        assert!(!store.get_image(first).unwrap().unwrap().is_background);
        assert!(store.get_image(second).unwrap().unwrap().is_background);
    }

    #[test]
    fn test_set_featured_writes_config() {
        let (_dir, store, config) = test_setup();
        let outcome = upload(&store, &config, valid_upload(vec![file("a.jpg")])).unwrap();
        set_featured(&store, outcome.image_ids[0]).unwrap();
        assert_eq!(
            store.config_get(FEATURED_IMAGE_KEY).unwrap(),
            Some(outcome.filenames[0].clone())
        );

        assert!(matches!(
            set_featured(&store, 9999),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let (_dir, store, _config) = test_setup();
        assert!(matches!(
            create_category(&store, "Wildlife"),
            Err(Error::Validation(_))
        ));
        let id = create_category(&store, "Astro").unwrap();
        assert!(matches!(
            rename_category(&store, id, "Wildlife"),
            Err(Error::Validation(_))
        ));
        rename_category(&store, id, "Astrophotography").unwrap();
    }

    #[test]
    fn test_check_password() {
        let mut config = Config::default();
        assert!(!check_password(&config, ""));
        config.admin.password = "orchid".to_string();
        assert!(check_password(&config, "orchid"));
        assert!(!check_password(&config, "Orchid"));
    }
}
