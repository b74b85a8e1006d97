//! Boot-time migration.
//!
//! Runs once per process start, before anything serves traffic, and is
//! safe against a database in any prior schema state. Every step is
//! caught and logged rather than propagated: a deployment with a
//! half-migrated database still boots and serves what it can.

use rusqlite::Connection;
use tracing::{info, warn};

use super::schema::{MIGRATIONS, SCHEMA};
use super::settings::ConfigEntry;
use super::store::Store;
use crate::config::Config;
use crate::error::Result;
use crate::legacy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Applied,
    Skipped(String),
    Failed(String),
}

#[derive(Debug)]
pub struct StepReport {
    pub name: String,
    pub outcome: StepOutcome,
}

/// Per-step record of what the boot migration did.
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub steps: Vec<StepReport>,
}

impl MigrationReport {
    fn record(&mut self, name: &str, result: Result<StepOutcome>) {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("migration step '{}' failed: {}", name, e);
                StepOutcome::Failed(e.to_string())
            }
        };
        self.steps.push(StepReport {
            name: name.to_string(),
            outcome,
        });
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &StepReport> {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Failed(_)))
    }

    pub fn log_summary(&self) {
        for step in &self.steps {
            match &step.outcome {
                StepOutcome::Applied => info!("boot migration: {} applied", step.name),
                StepOutcome::Skipped(reason) => {
                    info!("boot migration: {} skipped ({})", step.name, reason)
                }
                StepOutcome::Failed(e) => warn!("boot migration: {} FAILED: {}", step.name, e),
            }
        }
    }
}

/// Run the full boot migration. Never returns an error: failures are
/// recorded in the report and the remaining steps still run.
pub fn run(store: &Store, config: &Config) -> MigrationReport {
    let mut report = MigrationReport::default();

    report.record("create tables", create_tables(store));
    report.record("apply schema migrations", apply_migrations(store));
    report.record("seed categories", seed_categories(store, config));
    report.record("seed system config", seed_system_config(store));
    report.record("import legacy portfolio", import_legacy(store, config));

    report
}

fn create_tables(store: &Store) -> Result<StepOutcome> {
    store.conn.execute_batch(SCHEMA)?;
    Ok(StepOutcome::Applied)
}

/// Probe for a column with a trial read; an unknown column fails to prepare.
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    conn.prepare(&format!("SELECT {column} FROM {table} LIMIT 1"))
        .is_ok()
}

fn schema_version(conn: &Connection) -> Result<i32> {
    let version = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(version)
}

/// Apply every pending migration in version order.
///
/// `PRAGMA user_version` tracks the last applied version, but each step
/// also guards itself (column adds via trial read), so a database whose
/// version counter was lost converges instead of erroring.
fn apply_migrations(store: &Store) -> Result<StepOutcome> {
    let current = schema_version(&store.conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version <= current {
            continue;
        }
        let already_present = migration
            .adds_column
            .map(|(table, column)| column_exists(&store.conn, table, column))
            .unwrap_or(false);
        if !already_present {
            store.conn.execute_batch(migration.sql)?;
            info!(
                "applied schema migration v{}: {}",
                migration.version, migration.description
            );
            applied += 1;
        }
        store
            .conn
            .pragma_update(None, "user_version", migration.version)?;
    }

    if applied == 0 {
        Ok(StepOutcome::Skipped("schema up to date".to_string()))
    } else {
        Ok(StepOutcome::Applied)
    }
}

/// Seed the default category list, only into an empty table.
fn seed_categories(store: &Store, config: &Config) -> Result<StepOutcome> {
    let count = store.count_categories()?;
    if count > 0 {
        return Ok(StepOutcome::Skipped(format!("{count} categories exist")));
    }
    for name in &config.gallery.default_categories {
        store.create_category(name)?;
    }
    info!(
        "seeded {} default categories",
        config.gallery.default_categories.len()
    );
    Ok(StepOutcome::Applied)
}

fn default_config_entries() -> Vec<ConfigEntry> {
    vec![
        ConfigEntry {
            key: "featured_image".to_string(),
            value: Some(String::new()),
            data_type: "string".to_string(),
            description: Some("Filename of the image featured on the home page".to_string()),
        },
        ConfigEntry {
            key: "site_title".to_string(),
            value: Some("Lumina Photography".to_string()),
            data_type: "string".to_string(),
            description: Some("Title shown in the site header".to_string()),
        },
        ConfigEntry {
            key: "contact_email".to_string(),
            value: Some(String::new()),
            data_type: "string".to_string(),
            description: Some("Address shown on the contact page".to_string()),
        },
    ]
}

/// Seed system config rows, only into an empty table.
fn seed_system_config(store: &Store) -> Result<StepOutcome> {
    let count = store.count_config()?;
    if count > 0 {
        return Ok(StepOutcome::Skipped(format!("{count} config rows exist")));
    }
    for entry in default_config_entries() {
        store.config_seed(&entry)?;
    }
    Ok(StepOutcome::Applied)
}

/// Import the legacy file-based portfolio, only when the images table is
/// empty. Entries without a filename are skipped; category names are
/// resolved or created as needed.
fn import_legacy(store: &Store, config: &Config) -> Result<StepOutcome> {
    let image_count = store.count_images()?;
    if image_count > 0 {
        return Ok(StepOutcome::Skipped(format!("{image_count} images exist")));
    }

    let entries = legacy::load(&config.legacy.portfolio_file)?;
    if entries.is_empty() {
        return Ok(StepOutcome::Skipped("no legacy portfolio file".to_string()));
    }

    let mut imported = 0;
    for entry in &entries {
        let filename = match entry.filename.as_deref() {
            Some(f) if !f.is_empty() => f,
            _ => {
                warn!("legacy entry {:?} has no filename, skipping", entry.title);
                continue;
            }
        };
        if store.image_by_filename(filename)?.is_some() {
            continue;
        }
        let image_id = store.insert_image(
            filename,
            entry.title.as_deref(),
            entry.description.as_deref(),
            None,
            None,
            None,
            entry.created_at.as_deref(),
        )?;
        if !entry.categories.is_empty() {
            store.set_image_categories(image_id, &entry.categories)?;
        }
        imported += 1;
    }

    info!("imported {} legacy portfolio entries", imported);
    Ok(StepOutcome::Applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::Store;
    use tempfile::TempDir;

    fn test_setup() -> (TempDir, Store, Config) {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.db_path = dir.path().join("test.db");
        config.assets.dir = dir.path().join("assets");
        config.legacy.portfolio_file = dir.path().join("portfolio-data.json");
        let store = Store::open(&config.db_path).unwrap();
        (dir, store, config)
    }

    #[test]
    fn test_fresh_boot_seeds_defaults() {
        let (_dir, store, config) = test_setup();
        let report = run(&store, &config);
        assert_eq!(report.failed_steps().count(), 0);

        assert_eq!(store.count_categories().unwrap(), 6);
        assert_eq!(store.count_config().unwrap(), 3);
        assert_eq!(store.count_images().unwrap(), 0);
    }

    #[test]
    fn test_second_boot_is_idempotent() {
        let (_dir, store, config) = test_setup();
        run(&store, &config);
        let report = run(&store, &config);
        assert_eq!(report.failed_steps().count(), 0);

        // No duplicate seeds
        assert_eq!(store.count_categories().unwrap(), 6);
        assert_eq!(store.count_config().unwrap(), 3);

        // Seed steps report as skipped the second time around
        let seed = report.steps.iter().find(|s| s.name == "seed categories").unwrap();
        assert!(matches!(seed.outcome, StepOutcome::Skipped(_)));
    }

    #[test]
    fn test_migrations_converge_old_schema() {
        let (_dir, store, config) = test_setup();

        // A database from before the slideshow column existed
        store
            .conn
            .execute_batch(
                r#"
                CREATE TABLE images (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    filename TEXT NOT NULL UNIQUE,
                    title TEXT,
                    description TEXT,
                    uploaded_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                    file_size INTEGER,
                    width INTEGER,
                    height INTEGER,
                    is_background INTEGER NOT NULL DEFAULT 0
                );
                INSERT INTO images (filename, title) VALUES ('old.jpg', 'Old');
                "#,
            )
            .unwrap();
        assert!(!column_exists(&store.conn, "images", "is_slideshow_background"));

        let report = run(&store, &config);
        assert_eq!(report.failed_steps().count(), 0);
        assert!(column_exists(&store.conn, "images", "is_slideshow_background"));

        // Existing data survives and the new column reads as its default
        let image = store.image_by_filename("old.jpg").unwrap().unwrap();
        assert!(!image.is_slideshow_background);

        // Version counter is at the latest migration
        let version = schema_version(&store.conn).unwrap();
        assert_eq!(version, MIGRATIONS.last().unwrap().version);
    }

    #[test]
    fn test_legacy_import_runs_once() {
        let (_dir, store, config) = test_setup();
        std::fs::write(
            &config.legacy.portfolio_file,
            r#"[
                {"title": "Heron at Dawn", "description": "Early light", "image": "heron.jpg",
                 "categories": ["Wildlife", "Nature"], "created_at": "2023-04-01T09:30:00Z"},
                {"title": "No File Entry", "categories": ["Events"]},
                {"title": "Dunes", "image": "dunes.jpg", "categories": []}
            ]"#,
        )
        .unwrap();

        let report = run(&store, &config);
        assert_eq!(report.failed_steps().count(), 0);

        // Entry without a filename is skipped
        assert_eq!(store.count_images().unwrap(), 2);

        let heron = store.image_by_filename("heron.jpg").unwrap().unwrap();
        assert_eq!(heron.title.as_deref(), Some("Heron at Dawn"));
        assert_eq!(heron.uploaded_at.as_deref(), Some("2023-04-01T09:30:00Z"));
        assert_eq!(
            store.categories_for_image(heron.id).unwrap(),
            vec!["Wildlife".to_string(), "Nature".to_string()]
        );

        // Non-empty table blocks a re-import
        let report = run(&store, &config);
        let import = report
            .steps
            .iter()
            .find(|s| s.name == "import legacy portfolio")
            .unwrap();
        assert!(matches!(import.outcome, StepOutcome::Skipped(_)));
        assert_eq!(store.count_images().unwrap(), 2);
    }

    #[test]
    fn test_failed_step_does_not_abort_boot() {
        let (_dir, store, config) = test_setup();
        // Corrupt legacy file: the import step fails, everything else runs
        std::fs::write(&config.legacy.portfolio_file, "not json").unwrap();

        let report = run(&store, &config);
        assert_eq!(report.failed_steps().count(), 1);
        assert_eq!(store.count_categories().unwrap(), 6);
        assert_eq!(store.count_config().unwrap(), 3);
    }
}
