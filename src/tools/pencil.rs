use egui::Color32;
use serde::{Deserialize, Serialize};

use super::{Cursor, Tool};
use crate::geometry::Point;
use crate::random::{RandomSource, StdRandom};
use crate::surface::{CompositeOp, LineCap, LineJoin, Surface};

pub(super) const NAME: &str = "Pencil";

/// Largest deviation from the configured width applied to a segment
pub const WIDTH_JITTER: f32 = 0.25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PencilConfig {
    pub color: Color32,
    pub stroke_width: f32,
    pub opacity: f32,
}

impl Default for PencilConfig {
    fn default() -> Self {
        Self {
            color: Color32::from_rgb(0x2c, 0x2c, 0x2c),
            stroke_width: 3.0,
            opacity: 0.8,
        }
    }
}

/// Thin graphite line, multiplied onto the surface with slight width jitter
pub struct Pencil {
    config: PencilConfig,
    random: Box<dyn RandomSource>,
    last_point: Option<Point>,
}

impl Pencil {
    pub fn new(config: PencilConfig) -> Self {
        Self::with_random(config, Box::new(StdRandom::from_entropy()))
    }

    pub fn with_random(config: PencilConfig, random: Box<dyn RandomSource>) -> Self {
        Self {
            config,
            random,
            last_point: None,
        }
    }

    pub fn config(&self) -> &PencilConfig {
        &self.config
    }
}

impl Tool for Pencil {
    fn name(&self) -> &'static str {
        NAME
    }

    fn cursor(&self) -> Option<Cursor> {
        Some(Cursor::circle(self.config.stroke_width))
    }

    fn start_stroke(&mut self, point: Point, surface: &mut dyn Surface) {
        let state = surface.state_mut();
        state.global_alpha = self.config.opacity;
        state.line_width = self.config.stroke_width;
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

        let variation = (self.random.next() - 0.5) * 2.0 * WIDTH_JITTER;
        surface.state_mut().line_width = self.config.stroke_width + variation;
        surface.begin_path();
        surface.move_to(last);
        surface.line_to(point);
        surface.stroke();
    }

    fn end_stroke(&mut self, surface: &mut dyn Surface) {
        let state = surface.state_mut();
        state.global_alpha = 1.0;
        state.composite = CompositeOp::SourceOver;
        self.last_point = None;
    }
}
