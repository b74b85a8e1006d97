use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default)]
    pub assets: AssetsConfig,

    #[serde(default)]
    pub gallery: GalleryConfig,

    #[serde(default)]
    pub legacy: LegacyConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Flat directory holding the image files referenced by the database.
    #[serde(default = "default_assets_dir")]
    pub dir: PathBuf,

    /// URL prefix the HTTP layer serves the assets directory under.
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
}

fn default_assets_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lumina")
        .join("assets")
}

fn default_url_prefix() -> String {
    "/static/assets/".to_string()
}

impl AssetsConfig {
    /// Public URL for an image filename.
    pub fn image_url(&self, filename: &str) -> String {
        format!("{}{}", self.url_prefix, filename)
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: default_assets_dir(),
            url_prefix: default_url_prefix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// Categories seeded into an empty database, in display order.
    #[serde(default = "default_categories")]
    pub default_categories: Vec<String>,

    /// Category name substituted when an image has no associations.
    #[serde(default = "default_fallback_category")]
    pub fallback_category: String,
}

fn default_categories() -> Vec<String> {
    vec![
        "Wildlife".to_string(),
        "Landscapes".to_string(),
        "Portraits".to_string(),
        "Events".to_string(),
        "Nature".to_string(),
        "Miscellaneous".to_string(),
    ]
}

fn default_fallback_category() -> String {
    "Miscellaneous".to_string()
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            default_categories: default_categories(),
            fallback_category: default_fallback_category(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyConfig {
    /// JSON portfolio listing imported once into an empty database.
    #[serde(default = "default_portfolio_file")]
    pub portfolio_file: PathBuf,
}

fn default_portfolio_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lumina")
        .join("portfolio-data.json")
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            portfolio_file: default_portfolio_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminConfig {
    /// Shared dashboard password, compared by the HTTP layer at login.
    #[serde(default)]
    pub password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            assets: AssetsConfig::default(),
            gallery: GalleryConfig::default(),
            legacy: LegacyConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lumina")
        .join("lumina.db")
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            // Create default config
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lumina")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}
