use egui::{Color32, Vec2};
use serde::{Deserialize, Serialize};

use super::{Cursor, Tool};
use crate::color::lighten;
use crate::geometry::Point;
use crate::random::{RandomSource, StdRandom};
use crate::surface::{CompositeOp, LineCap, LineJoin, Surface};

pub(super) const NAME: &str = "Oil Paint";

const BRUSH_STROKES: usize = 5;
/// Sub-strokes after this index are multiplied in to mix pigment
const LAST_OPAQUE_STROKE: usize = 2;
const OPAQUE_ALPHA: f32 = 0.8;
/// Spread of the per-stroke lightness change, in HSL percentage points
const LIGHTNESS_SPREAD: f32 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OilPaintConfig {
    pub color: Color32,
    pub stroke_width: f32,
    /// Strength of the multiplied pigment-mixing strokes
    pub blending: f32,
}

impl Default for OilPaintConfig {
    fn default() -> Self {
        Self {
            color: Color32::from_rgb(0x8b, 0x45, 0x13),
            stroke_width: 25.0,
            blending: 0.6,
        }
    }
}

/// Thick paint with per-bristle colour variation and multiplied mixing passes
pub struct OilPaint {
    config: OilPaintConfig,
    random: Box<dyn RandomSource>,
    last_point: Option<Point>,
}

impl OilPaint {
    pub fn new(config: OilPaintConfig) -> Self {
        Self::with_random(config, Box::new(StdRandom::from_entropy()))
    }

    pub fn with_random(config: OilPaintConfig, random: Box<dyn RandomSource>) -> Self {
        Self {
            config,
            random,
            last_point: None,
        }
    }
}

impl Tool for OilPaint {
    fn name(&self) -> &'static str {
        NAME
    }

    fn cursor(&self) -> Option<Cursor> {
        Some(Cursor::circle(self.config.stroke_width))
    }

    fn start_stroke(&mut self, point: Point, surface: &mut dyn Surface) {
        let state = surface.state_mut();
        state.global_alpha = OPAQUE_ALPHA;
        state.stroke_color = self.config.color;
        state.line_cap = LineCap::Round;
        state.line_join = LineJoin::Round;
        state.composite = CompositeOp::SourceOver;
        self.last_point = Some(point);
    }

    fn continue_stroke(&mut self, point: Point, surface: &mut dyn Surface) {
        let Some(last) = self.last_point.replace(point) else {
            return;
        };

        let width = self.config.stroke_width;
        for i in 0..BRUSH_STROKES {
            let variation = (self.random.next() - 0.5) * LIGHTNESS_SPREAD;
            let line_width = width + (self.random.next() - 0.5) * 4.0;
            let offset = Vec2::new(
                (self.random.next() - 0.5) * width * 0.3,
                (self.random.next() - 0.5) * width * 0.3,
            );

            let state = surface.state_mut();
            state.stroke_color = lighten(self.config.color, variation);
            state.line_width = line_width.max(0.0);
            if i > LAST_OPAQUE_STROKE {
                state.composite = CompositeOp::Multiply;
                state.global_alpha = self.config.blending * 0.5;
            } else {
                state.composite = CompositeOp::SourceOver;
                state.global_alpha = OPAQUE_ALPHA;
            }

            surface.begin_path();
            surface.move_to(last + offset);
            surface.line_to(point + offset);
            surface.stroke();
        }
    }

    fn end_stroke(&mut self, surface: &mut dyn Surface) {
        let state = surface.state_mut();
        state.global_alpha = 1.0;
        state.composite = CompositeOp::SourceOver;
        self.last_point = None;
    }
}
