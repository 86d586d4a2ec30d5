use egui::{Rect, Vec2};
use serde::{Deserialize, Serialize};

use super::{Cursor, Tool};
use crate::geometry::{Point, distance};
use crate::surface::{CompositeOp, PixelRegion, Surface};

pub(super) const NAME: &str = "Smudge";

/// Movements shorter than this are ignored to avoid amplifying jitter
pub const MIN_SMUDGE_DISTANCE: f32 = 2.0;
const SMEAR_COPIES: usize = 5;
/// Fraction of the motion vector the last copy is dragged along
const DRAG: f32 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmudgeConfig {
    pub stroke_width: f32,
    /// Opacity of each smeared copy
    pub strength: f32,
}

impl Default for SmudgeConfig {
    fn default() -> Self {
        Self {
            stroke_width: 30.0,
            strength: 0.8,
        }
    }
}

/// Drags the pixels under the pointer along the direction of motion
pub struct Smudge {
    config: SmudgeConfig,
    last_point: Option<Point>,
    buffer: Option<PixelRegion>,
}

// Custom Debug implementation to avoid dumping the pixel buffer
impl std::fmt::Debug for Smudge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Smudge")
            .field("config", &self.config)
            .field("last_point", &self.last_point)
            .field("buffer", &self.buffer.as_ref().map(|b| b.dimensions()))
            .finish()
    }
}

impl Smudge {
    pub fn new(config: SmudgeConfig) -> Self {
        Self {
            config,
            last_point: None,
            buffer: None,
        }
    }

    /// Copy the square around `center`, clamped to the surface.
    /// `None` when the clamped square is empty.
    fn capture(&self, center: Point, surface: &dyn Surface) -> Option<PixelRegion> {
        let radius = self.config.stroke_width;
        let x = (center.x - radius).max(0.0).floor();
        let y = (center.y - radius).max(0.0).floor();
        let width = (surface.width() as f32 - x).min(radius * 2.0).floor();
        let height = (surface.height() as f32 - y).min(radius * 2.0).floor();
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        let region = surface.get_image_data(x as i32, y as i32, width as u32, height as u32);
        (region.width() > 0 && region.height() > 0).then_some(region)
    }

    /// Dimensions of the captured region, if any
    pub fn buffer_size(&self) -> Option<(u32, u32)> {
        self.buffer.as_ref().map(|b| b.dimensions())
    }
}

impl Tool for Smudge {
    fn name(&self) -> &'static str {
        NAME
    }

    fn cursor(&self) -> Option<Cursor> {
        Some(Cursor::circle(self.config.stroke_width))
    }

    fn start_stroke(&mut self, point: Point, surface: &mut dyn Surface) {
        self.last_point = Some(point);
        self.buffer = self.capture(point, surface);
    }

    fn continue_stroke(&mut self, point: Point, surface: &mut dyn Surface) {
        let (Some(last), Some(buffer)) = (self.last_point, self.buffer.as_ref()) else {
            self.last_point = Some(point);
            return;
        };

        if distance(last, point) < MIN_SMUDGE_DISTANCE {
            return;
        }

        let motion = point - last;
        let radius = self.config.stroke_width;
        // Edge captures are smaller than the brush square; draw them unscaled
        let size = Vec2::new(buffer.width() as f32, buffer.height() as f32);
        let state = surface.state_mut();
        state.global_alpha = self.config.strength;
        state.composite = CompositeOp::SourceOver;

        for i in 0..SMEAR_COPIES {
            let factor = (i + 1) as f32 / SMEAR_COPIES as f32;
            let origin = point - Vec2::splat(radius) + motion * factor * DRAG;
            surface.draw_image(buffer, Rect::from_min_size(origin, size));
        }

        self.buffer = self.capture(point, surface);
        self.last_point = Some(point);
    }

    fn end_stroke(&mut self, surface: &mut dyn Surface) {
        let state = surface.state_mut();
        state.global_alpha = 1.0;
        state.composite = CompositeOp::SourceOver;
        self.last_point = None;
        self.buffer = None;
    }
}
