use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::error::ArtboardResult;

/// Settings for an [`Artboard`](crate::artboard::Artboard)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtboardConfig {
    /// How far outside the surface, in pixels, document-level moves still extend a stroke
    pub capture_margin: f32,
    /// Colour the surface is filled with on attach and clear
    pub background: Color32,
    /// Maximum number of retained snapshots, `None` keeps everything
    pub history_limit: Option<usize>,
    /// Suggested file name for downloads
    pub download_name: String,
}

impl Default for ArtboardConfig {
    fn default() -> Self {
        Self {
            capture_margin: 50.0,
            background: Color32::WHITE,
            history_limit: None,
            download_name: "image.png".to_string(),
        }
    }
}

impl ArtboardConfig {
    /// Parse a config from JSON, missing fields keep their defaults
    pub fn from_json(json: &str) -> ArtboardResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> ArtboardResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
