//! Asset file handling for uploads.
//!
//! Filenames are derived from the upload title, so several files sharing
//! one title must be disambiguated: every file gets a short random
//! suffix, and files beyond the first also get a sequence number.

use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::Config;
use crate::error::Result;

/// Lowercase a title into a hyphenated filename stem.
pub fn slugify(title: &str) -> String {
    let mut slug = String::new();
    let mut prev_dash = false;
    for ch in title.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            prev_dash = false;
        } else if !prev_dash && !slug.is_empty() {
            slug.push('-');
            prev_dash = true;
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "image".to_string()
    } else {
        slug
    }
}

/// Lowercased extension of the original upload, dot included. Uploads
/// without an extension are treated as JPEG.
pub fn file_extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_else(|| ".jpg".to_string())
}

/// Generate a filename for the `index`-th file of an upload batch.
///
/// N files uploaded under the same title always produce N distinct
/// names: `{slug}-{uuid8}{ext}` for the first, `{slug}-{n}-{uuid8}{ext}`
/// for the rest.
pub fn unique_filename(title: &str, original_name: &str, index: usize) -> String {
    let slug = slugify(title);
    let unique = Uuid::new_v4().simple().to_string();
    let short = &unique[..8];
    let ext = file_extension(original_name);
    if index == 0 {
        format!("{slug}-{short}{ext}")
    } else {
        format!("{slug}-{}-{short}{ext}", index + 1)
    }
}

/// Write upload bytes into the assets directory, creating it if needed.
pub fn save_asset(config: &Config, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(&config.assets.dir)?;
    let path = config.assets.dir.join(filename);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// Remove an asset file. A file that is already gone is not an error.
pub fn remove_asset(config: &Config, filename: &str) -> Result<bool> {
    let path = config.assets.dir.join(filename);
    if path.exists() {
        std::fs::remove_file(&path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Sunset Over Lake"), "sunset-over-lake");
        assert_eq!(slugify("  Spaces   Galore  "), "spaces-galore");
        assert_eq!(slugify("Special@#$Characters"), "special-characters");
        assert_eq!(slugify(""), "image");
    }

    #[test]
    fn test_file_extension_defaults_to_jpg() {
        assert_eq!(file_extension("photo.PNG"), ".png");
        assert_eq!(file_extension("photo"), ".jpg");
    }

    #[test]
    fn test_unique_filenames_never_collide() {
        let a = unique_filename("Sunset", "a.jpg", 0);
        let b = unique_filename("Sunset", "b.jpg", 0);
        assert_ne!(a, b);
        assert!(a.starts_with("sunset-"));
        assert!(a.ends_with(".jpg"));
    }

    #[test]
    fn test_sequence_number_beyond_first_file() {
        let second = unique_filename("Sunset", "x.jpg", 1);
        assert!(second.starts_with("sunset-2-"));
        let third = unique_filename("Sunset", "x.jpg", 2);
        assert!(third.starts_with("sunset-3-"));
    }
}
