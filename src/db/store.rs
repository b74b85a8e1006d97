//! SQLite store implementation.

use chrono::Utc;
use rusqlite::Connection;
use std::path::Path;

use super::categories::{Category, CategoryCount};
use super::images::ImageRecord;
use super::settings::ConfigEntry;
use super::slideshow::{SlideshowEntry, SlideshowSettings};
use crate::error::{Error, Result};

pub struct Store {
    pub(crate) conn: Connection,
}

fn row_to_image(row: &rusqlite::Row<'_>) -> rusqlite::Result<ImageRecord> {
    Ok(ImageRecord {
        id: row.get(0)?,
        filename: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        uploaded_at: row.get(4)?,
        file_size: row.get(5)?,
        width: row.get(6)?,
        height: row.get(7)?,
        is_background: row.get::<_, i64>(8)? != 0,
        is_slideshow_background: row.get::<_, i64>(9)? != 0,
    })
}

const IMAGE_COLUMNS: &str = "id, filename, title, description, uploaded_at, \
                             file_size, width, height, is_background, is_slideshow_background";

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    // ========================================================================
    // Image operations
    // ========================================================================

    #[allow(clippy::too_many_arguments)]
    pub fn insert_image(
        &self,
        filename: &str,
        title: Option<&str>,
        description: Option<&str>,
        file_size: Option<i64>,
        width: Option<i64>,
        height: Option<i64>,
        uploaded_at: Option<&str>,
    ) -> Result<i64> {
        let uploaded_at = uploaded_at
            .map(|s| s.to_string())
            .unwrap_or_else(|| Utc::now().to_rfc3339());
        self.conn.execute(
            r#"
            INSERT INTO images (filename, title, description, file_size, width, height, uploaded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            rusqlite::params![filename, title, description, file_size, width, height, uploaded_at],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_image(&self, id: i64) -> Result<Option<ImageRecord>> {
        let result = self.conn.query_row(
            &format!("SELECT {IMAGE_COLUMNS} FROM images WHERE id = ?"),
            [id],
            row_to_image,
        );
        match result {
            Ok(image) => Ok(Some(image)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn image_by_filename(&self, filename: &str) -> Result<Option<ImageRecord>> {
        let result = self.conn.query_row(
            &format!("SELECT {IMAGE_COLUMNS} FROM images WHERE filename = ?"),
            [filename],
            row_to_image,
        );
        match result {
            Ok(image) => Ok(Some(image)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All images in insertion order.
    pub fn list_images(&self) -> Result<Vec<ImageRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {IMAGE_COLUMNS} FROM images ORDER BY id"))?;
        let images = stmt
            .query_map([], row_to_image)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(images)
    }

    pub fn first_image(&self) -> Result<Option<ImageRecord>> {
        let result = self.conn.query_row(
            &format!("SELECT {IMAGE_COLUMNS} FROM images ORDER BY id LIMIT 1"),
            [],
            row_to_image,
        );
        match result {
            Ok(image) => Ok(Some(image)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn count_images(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Update title/description, leaving `None` fields untouched.
    pub fn update_image_fields(
        &self,
        id: i64,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<()> {
        let changed = self.conn.execute(
            r#"
            UPDATE images
            SET title = COALESCE(?, title), description = COALESCE(?, description)
            WHERE id = ?
            "#,
            rusqlite::params![title, description, id],
        )?;
        if changed == 0 {
            return Err(Error::not_found("image", id));
        }
        Ok(())
    }

    /// Join rows cascade via the schema's foreign keys.
    pub fn delete_image_row(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM images WHERE id = ?", rusqlite::params![id])?;
        Ok(deleted > 0)
    }

    /// Make `id` the background image, clearing the flag everywhere else.
    pub fn set_background(&self, id: i64) -> Result<()> {
        if self.get_image(id)?.is_none() {
            return Err(Error::not_found("image", id));
        }
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("UPDATE images SET is_background = 0 WHERE is_background = 1", [])?;
        tx.execute(
            "UPDATE images SET is_background = 1 WHERE id = ?",
            rusqlite::params![id],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn background_image(&self) -> Result<Option<ImageRecord>> {
        let result = self.conn.query_row(
            &format!("SELECT {IMAGE_COLUMNS} FROM images WHERE is_background = 1 LIMIT 1"),
            [],
            row_to_image,
        );
        match result {
            Ok(image) => Ok(Some(image)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ========================================================================
    // Category operations
    // ========================================================================

    pub fn create_category(&self, name: &str) -> Result<i64> {
        let next_order: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(display_order), 0) + 1 FROM categories",
            [],
            |row| row.get(0),
        )?;
        self.conn.execute(
            "INSERT INTO categories (name, display_order) VALUES (?, ?)",
            rusqlite::params![name, next_order],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let result = self.conn.query_row(
            "SELECT id, name, display_order FROM categories WHERE name = ?",
            [name],
            |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    display_order: row.get(2)?,
                })
            },
        );
        match result {
            Ok(category) => Ok(Some(category)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_or_create_category(&self, name: &str) -> Result<i64> {
        if let Some(category) = self.category_by_name(name)? {
            Ok(category.id)
        } else {
            self.create_category(name)
        }
    }

    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, display_order FROM categories ORDER BY display_order, name",
        )?;
        let categories = stmt
            .query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    display_order: row.get(2)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(categories)
    }

    pub fn count_categories(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn rename_category(&self, id: i64, name: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE categories SET name = ? WHERE id = ?",
            rusqlite::params![name, id],
        )?;
        if changed == 0 {
            return Err(Error::not_found("category", id));
        }
        Ok(())
    }

    pub fn delete_category(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?", rusqlite::params![id])?;
        Ok(deleted > 0)
    }

    /// Rewrite display_order to match list position.
    pub fn reorder_categories(&self, ids: &[i64]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for (position, id) in ids.iter().enumerate() {
            let changed = tx.execute(
                "UPDATE categories SET display_order = ? WHERE id = ?",
                rusqlite::params![position as i64 + 1, id],
            )?;
            if changed == 0 {
                return Err(Error::not_found("category", *id));
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Category names for one image, in category display order.
    pub fn categories_for_image(&self, image_id: i64) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT c.name
            FROM categories c
            JOIN image_categories ic ON ic.category_id = c.id
            WHERE ic.image_id = ?
            ORDER BY c.display_order, c.name
            "#,
        )?;
        let names = stmt
            .query_map([image_id], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(names)
    }

    /// Replace an image's category set. Unknown names are created.
    pub fn set_image_categories(&self, image_id: i64, names: &[String]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM image_categories WHERE image_id = ?",
            rusqlite::params![image_id],
        )?;
        for name in names {
            let category_id = self.get_or_create_category(name)?;
            tx.execute(
                "INSERT OR IGNORE INTO image_categories (image_id, category_id) VALUES (?, ?)",
                rusqlite::params![image_id, category_id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn category_counts(&self) -> Result<Vec<CategoryCount>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT c.id, c.name, COUNT(ic.image_id) as image_count
            FROM categories c
            LEFT JOIN image_categories ic ON ic.category_id = c.id
            GROUP BY c.id
            ORDER BY c.display_order, c.name
            "#,
        )?;
        let counts = stmt
            .query_map([], |row| {
                Ok(CategoryCount {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    image_count: row.get(2)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(counts)
    }

    // ========================================================================
    // System config operations
    // ========================================================================

    pub fn config_get(&self, key: &str) -> Result<Option<String>> {
        let result = self.conn.query_row(
            "SELECT value FROM system_config WHERE key = ?",
            [key],
            |row| row.get::<_, Option<String>>(0),
        );
        match result {
            Ok(value) => Ok(value),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn config_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO system_config (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
            "#,
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    /// Full-row insert used by the boot seed; never overwrites.
    pub fn config_seed(&self, entry: &ConfigEntry) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT OR IGNORE INTO system_config (key, value, data_type, description)
            VALUES (?, ?, ?, ?)
            "#,
            rusqlite::params![entry.key, entry.value, entry.data_type, entry.description],
        )?;
        Ok(())
    }

    pub fn count_config(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM system_config", [], |row| row.get(0))?;
        Ok(count)
    }

    // ========================================================================
    // Slideshow operations
    // ========================================================================

    pub fn active_slideshow_count(&self) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM slideshow_backgrounds WHERE is_active = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Membership row (id, is_active) for an image, active or not.
    pub fn slideshow_membership(&self, image_id: i64) -> Result<Option<(i64, bool)>> {
        let result = self.conn.query_row(
            "SELECT id, is_active FROM slideshow_backgrounds WHERE image_id = ?",
            [image_id],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)? != 0)),
        );
        match result {
            Ok(membership) => Ok(Some(membership)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn next_slideshow_order(&self) -> Result<i64> {
        let next: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(display_order), 0) + 1 FROM slideshow_backgrounds WHERE is_active = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    pub fn insert_slideshow_row(&self, image_id: i64, display_order: i64) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO slideshow_backgrounds (image_id, display_order) VALUES (?, ?)",
            rusqlite::params![image_id, display_order],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn activate_slideshow_row(&self, id: i64, display_order: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE slideshow_backgrounds SET is_active = 1, display_order = ? WHERE id = ?",
            rusqlite::params![display_order, id],
        )?;
        Ok(())
    }

    pub fn deactivate_slideshow_for_image(&self, image_id: i64) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE slideshow_backgrounds SET is_active = 0 WHERE image_id = ? AND is_active = 1",
            rusqlite::params![image_id],
        )?;
        Ok(changed > 0)
    }

    /// Keep the denormalized images flag in step with the membership table.
    pub fn set_slideshow_flag(&self, image_id: i64, on: bool) -> Result<()> {
        self.conn.execute(
            "UPDATE images SET is_slideshow_background = ? WHERE id = ?",
            rusqlite::params![on as i64, image_id],
        )?;
        Ok(())
    }

    pub fn set_slideshow_order(&self, membership_id: i64, display_order: i64) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE slideshow_backgrounds SET display_order = ? WHERE id = ? AND is_active = 1",
            rusqlite::params![display_order, membership_id],
        )?;
        Ok(changed > 0)
    }

    /// Active membership joined to images, in rotation order.
    pub fn slideshow_entries(&self) -> Result<Vec<SlideshowEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT sb.id, sb.image_id, i.filename, i.title, sb.display_order
            FROM slideshow_backgrounds sb
            JOIN images i ON i.id = sb.image_id
            WHERE sb.is_active = 1
            ORDER BY sb.display_order
            "#,
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(SlideshowEntry {
                    id: row.get(0)?,
                    image_id: row.get(1)?,
                    filename: row.get(2)?,
                    title: row.get(3)?,
                    display_order: row.get(4)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(entries)
    }

    pub fn slideshow_settings_row(&self) -> Result<Option<SlideshowSettings>> {
        let result = self.conn.query_row(
            "SELECT transition_ms, fade_ms, autoplay, pause_on_hover FROM slideshow_settings WHERE id = 1",
            [],
            |row| {
                Ok(SlideshowSettings {
                    transition_ms: row.get(0)?,
                    fade_ms: row.get(1)?,
                    autoplay: row.get::<_, i64>(2)? != 0,
                    pause_on_hover: row.get::<_, i64>(3)? != 0,
                })
            },
        );
        match result {
            Ok(settings) => Ok(Some(settings)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn insert_default_slideshow_settings(&self) -> Result<()> {
        self.conn
            .execute("INSERT OR IGNORE INTO slideshow_settings (id) VALUES (1)", [])?;
        Ok(())
    }

    pub fn update_slideshow_settings(&self, settings: &SlideshowSettings) -> Result<()> {
        self.conn.execute(
            r#"
            UPDATE slideshow_settings
            SET transition_ms = ?, fade_ms = ?, autoplay = ?, pause_on_hover = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = 1
            "#,
            rusqlite::params![
                settings.transition_ms,
                settings.fade_ms,
                settings.autoplay as i64,
                settings.pause_on_hover as i64
            ],
        )?;
        Ok(())
    }
}
