//! The drawing surface contract.
//!
//! Brushes paint through [`Surface`], a 2D paint context with ambient state:
//! colour, width, alpha and compositing persist between calls until changed.
//! [`RasterSurface`] is the in-process implementation backed by an RGBA buffer.

mod path;
mod raster;

use egui::{Color32, Rect};
use serde::{Deserialize, Serialize};

use crate::error::ArtboardResult;
use crate::geometry::Point;

pub use path::Path;
pub use raster::RasterSurface;

/// Unpremultiplied RGBA pixels, row-major, the unit of region reads and writes
pub type PixelRegion = image::RgbaImage;

/// How new paint combines with what is already on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompositeOp {
    /// Normal painting
    #[default]
    SourceOver,
    /// Darkens: source and destination colours are multiplied
    Multiply,
    /// Removes destination coverage where the source paints
    DestinationOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Ambient paint settings shared by consecutive draw calls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintState {
    pub stroke_color: Color32,
    pub fill_color: Color32,
    pub line_width: f32,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub global_alpha: f32,
    pub composite: CompositeOp,
    pub shadow_color: Color32,
    pub shadow_blur: f32,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            stroke_color: Color32::BLACK,
            fill_color: Color32::BLACK,
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            global_alpha: 1.0,
            composite: CompositeOp::SourceOver,
            shadow_color: Color32::TRANSPARENT,
            shadow_blur: 0.0,
        }
    }
}

impl PaintState {
    /// Back to opaque, normal compositing and no shadow
    pub fn reset_blending(&mut self) {
        self.global_alpha = 1.0;
        self.composite = CompositeOp::SourceOver;
        self.shadow_blur = 0.0;
    }

    /// True if alpha and compositing are at their defaults
    pub fn is_baseline(&self) -> bool {
        self.global_alpha == 1.0 && self.composite == CompositeOp::SourceOver
    }
}

/// Encodings the surface can export to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Bmp => "image/bmp",
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Bmp => image::ImageFormat::Bmp,
        }
    }

    /// Guess a format from a mime type such as `image/jpeg`. Unknown types fall back to PNG.
    pub fn from_mime(mime: &str) -> Self {
        match mime {
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/bmp" => Self::Bmp,
            _ => Self::Png,
        }
    }
}

/// A mutable raster with a 2D paint context.
///
/// Path operations build a current path that [`Surface::stroke`] renders with
/// the ambient [`PaintState`]. Region reads clamp to the surface bounds.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn state(&self) -> &PaintState;
    fn state_mut(&mut self) -> &mut PaintState;

    /// Push the current paint state
    fn save(&mut self);
    /// Pop the most recently saved paint state. Does nothing if none was saved.
    fn restore(&mut self);

    fn begin_path(&mut self);
    fn move_to(&mut self, point: Point);
    fn line_to(&mut self, point: Point);
    fn quadratic_curve_to(&mut self, control: Point, to: Point);
    fn bezier_curve_to(&mut self, control1: Point, control2: Point, to: Point);
    /// Render the current path with the ambient stroke settings
    fn stroke(&mut self);

    /// Fill a rectangle with the ambient fill colour, honouring alpha and compositing
    fn fill_rect(&mut self, rect: Rect);

    /// Copy out a region. Returns an empty region if the clamped area is empty.
    fn get_image_data(&self, x: i32, y: i32, width: u32, height: u32) -> PixelRegion;
    /// Write a region verbatim, bypassing alpha and compositing
    fn put_image_data(&mut self, region: &PixelRegion, x: i32, y: i32);
    /// Draw a region scaled into `dest`, honouring alpha and compositing
    fn draw_image(&mut self, region: &PixelRegion, dest: Rect);

    /// Encode the whole surface
    fn encode(&self, format: ExportFormat) -> ArtboardResult<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_blending() {
        let mut state = PaintState {
            global_alpha: 0.3,
            composite: CompositeOp::Multiply,
            shadow_blur: 2.0,
            ..Default::default()
        };
        assert!(!state.is_baseline());
        state.reset_blending();
        assert!(state.is_baseline());
        assert_eq!(state.shadow_blur, 0.0);
    }

    #[test]
    fn test_export_format_from_mime() {
        assert_eq!(ExportFormat::from_mime("image/jpeg"), ExportFormat::Jpeg);
        assert_eq!(ExportFormat::from_mime("image/webp"), ExportFormat::Png);
        assert_eq!(ExportFormat::Bmp.mime_type(), "image/bmp");
    }
}
