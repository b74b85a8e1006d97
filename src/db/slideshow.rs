//! Types for slideshow membership and playback settings.

use serde::Serialize;

/// An active slideshow membership row joined to its image.
#[derive(Debug, Clone, Serialize)]
pub struct SlideshowEntry {
    pub id: i64,
    pub image_id: i64,
    pub filename: String,
    pub title: Option<String>,
    pub display_order: i64,
}

/// The playback settings singleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideshowSettings {
    pub transition_ms: i64,
    pub fade_ms: i64,
    pub autoplay: bool,
    pub pause_on_hover: bool,
}

impl Default for SlideshowSettings {
    fn default() -> Self {
        Self {
            transition_ms: 5000,
            fade_ms: 1000,
            autoplay: true,
            pause_on_hover: true,
        }
    }
}
