use std::f32::consts::TAU;

use egui::{Color32, Vec2};
use serde::{Deserialize, Serialize};

use super::{Cursor, Tool};
use crate::geometry::Point;
use crate::random::{RandomSource, StdRandom};
use crate::surface::{CompositeOp, LineCap, LineJoin, Surface};

pub(super) const NAME: &str = "Crayon";

const TEXTURE_STROKES: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrayonConfig {
    pub color: Color32,
    pub stroke_width: f32,
    /// Base opacity of the wax
    pub pressure: f32,
}

impl Default for CrayonConfig {
    fn default() -> Self {
        Self {
            color: Color32::from_rgb(0xdc, 0x14, 0x3c),
            stroke_width: 12.0,
            pressure: 0.6,
        }
    }
}

/// Waxy crayon built from overlapping sub-strokes spread around the pointer
pub struct Crayon {
    config: CrayonConfig,
    random: Box<dyn RandomSource>,
    last_point: Option<Point>,
}

impl Crayon {
    pub fn new(config: CrayonConfig) -> Self {
        Self::with_random(config, Box::new(StdRandom::from_entropy()))
    }

    pub fn with_random(config: CrayonConfig, random: Box<dyn RandomSource>) -> Self {
        Self {
            config,
            random,
            last_point: None,
        }
    }
}

impl Tool for Crayon {
    fn name(&self) -> &'static str {
        NAME
    }

    fn cursor(&self) -> Option<Cursor> {
        Some(Cursor::circle(self.config.stroke_width))
    }

    fn start_stroke(&mut self, point: Point, surface: &mut dyn Surface) {
        let state = surface.state_mut();
        state.global_alpha = self.config.pressure;
        state.stroke_color = self.config.color;
        state.line_cap = LineCap::Round;
        state.line_join = LineJoin::Round;
        state.composite = CompositeOp::Multiply;
        self.last_point = Some(point);
    }

    fn continue_stroke(&mut self, point: Point, surface: &mut dyn Surface) {
        let Some(last) = self.last_point.replace(point) else {
            return;
        };

        let offset_radius = self.config.stroke_width * 0.4;
        for i in 0..TEXTURE_STROKES {
            let angle = i as f32 / TEXTURE_STROKES as f32 * TAU;
            let offset = Vec2::new(
                angle.cos() * offset_radius * self.random.next(),
                angle.sin() * offset_radius * self.random.next(),
            );

            let state = surface.state_mut();
            state.line_width = (self.config.stroke_width * (0.3 + self.random.next() * 0.7)).max(1.0);
            // Uneven buildup
            state.global_alpha = self.config.pressure * (0.2 + self.random.next() * 0.6);

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
