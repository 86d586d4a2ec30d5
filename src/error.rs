use thiserror::Error;

/// Errors surfaced by the artboard's control surface.
///
/// Stroke, clear and history operations never fail: when their preconditions
/// are not met they simply do nothing. Only tool switching, colour parsing,
/// configuration loading and image export report errors.
#[derive(Debug, Error)]
pub enum ArtboardError {
    /// A tool switch was requested while a stroke is in progress
    #[error("Tool busy: cannot switch away from {active} while a stroke is in progress")]
    ToolBusy { active: &'static str },

    #[error("Invalid colour: {0}")]
    InvalidColor(String),

    #[error("Failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type ArtboardResult<T> = Result<T, ArtboardError>;
