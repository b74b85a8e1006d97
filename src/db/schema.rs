pub const SCHEMA: &str = r#"
-- Images table: one row per uploaded photo
CREATE TABLE IF NOT EXISTS images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filename TEXT NOT NULL UNIQUE,
    title TEXT,
    description TEXT,
    uploaded_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,

    -- File metadata
    file_size INTEGER,
    width INTEGER,
    height INTEGER,

    -- Display flags
    is_background INTEGER NOT NULL DEFAULT 0,            -- exclusive: at most one row set
    is_slideshow_background INTEGER NOT NULL DEFAULT 0   -- denormalized from slideshow_backgrounds
);

CREATE INDEX IF NOT EXISTS idx_images_title ON images(title);
CREATE INDEX IF NOT EXISTS idx_images_uploaded_at ON images(uploaded_at);
CREATE INDEX IF NOT EXISTS idx_images_background ON images(is_background);

-- Gallery categories, in display order
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    display_order INTEGER NOT NULL DEFAULT 0
);

-- Image to category mapping (many-to-many)
CREATE TABLE IF NOT EXISTS image_categories (
    image_id INTEGER NOT NULL,
    category_id INTEGER NOT NULL,
    PRIMARY KEY (image_id, category_id),
    FOREIGN KEY (image_id) REFERENCES images(id) ON DELETE CASCADE,
    FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_image_categories_image ON image_categories(image_id);
CREATE INDEX IF NOT EXISTS idx_image_categories_category ON image_categories(category_id);

-- Generic key/value settings (e.g. which image is featured)
CREATE TABLE IF NOT EXISTS system_config (
    key TEXT PRIMARY KEY,
    value TEXT,
    data_type TEXT NOT NULL DEFAULT 'string',
    description TEXT,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- Ordered slideshow membership; rows are soft-removed, never reused by order
CREATE TABLE IF NOT EXISTS slideshow_backgrounds (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    image_id INTEGER NOT NULL,
    display_order INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    added_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (image_id) REFERENCES images(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_slideshow_backgrounds_active ON slideshow_backgrounds(is_active, display_order);

-- Singleton row of slideshow playback settings
CREATE TABLE IF NOT EXISTS slideshow_settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    transition_ms INTEGER NOT NULL DEFAULT 5000,
    fade_ms INTEGER NOT NULL DEFAULT 1000,
    autoplay INTEGER NOT NULL DEFAULT 1,
    pause_on_hover INTEGER NOT NULL DEFAULT 1,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;

/// A schema change applied after the initial deployment.
///
/// Versions are tracked in `PRAGMA user_version` and applied in order.
/// Each step must be idempotent on its own: column additions are guarded
/// by a trial read, so a database whose `user_version` was lost (or that
/// predates version tracking) converges to the same schema.
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    /// Column guard: skip the SQL when this (table, column) already reads.
    pub adds_column: Option<(&'static str, &'static str)>,
    pub sql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "add images.is_slideshow_background",
        adds_column: Some(("images", "is_slideshow_background")),
        sql: "ALTER TABLE images ADD COLUMN is_slideshow_background INTEGER NOT NULL DEFAULT 0",
    },
    Migration {
        version: 2,
        description: "add slideshow_backgrounds.is_active",
        adds_column: Some(("slideshow_backgrounds", "is_active")),
        sql: "ALTER TABLE slideshow_backgrounds ADD COLUMN is_active INTEGER NOT NULL DEFAULT 1",
    },
    Migration {
        version: 3,
        description: "index active slideshow rows by display order",
        adds_column: None,
        sql: "CREATE INDEX IF NOT EXISTS idx_slideshow_backgrounds_active ON slideshow_backgrounds(is_active, display_order)",
    },
];
