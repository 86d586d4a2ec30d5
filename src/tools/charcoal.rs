use egui::{Color32, Vec2};
use serde::{Deserialize, Serialize};

use super::{Cursor, Tool};
use crate::geometry::Point;
use crate::random::{RandomSource, StdRandom};
use crate::surface::{CompositeOp, LineCap, LineJoin, Surface};

pub(super) const NAME: &str = "Charcoal";

const ALPHA: f32 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharcoalConfig {
    pub color: Color32,
    pub stroke_width: f32,
    /// Scatter of each bristle as a fraction of the stroke width
    pub roughness: f32,
}

impl Default for CharcoalConfig {
    fn default() -> Self {
        Self {
            color: Color32::from_rgb(0x1a, 0x1a, 0x1a),
            stroke_width: 15.0,
            roughness: 0.7,
        }
    }
}

/// Grainy stick: many thin scattered bristle lines per segment
pub struct Charcoal {
    config: CharcoalConfig,
    random: Box<dyn RandomSource>,
    last_point: Option<Point>,
}

impl Charcoal {
    pub fn new(config: CharcoalConfig) -> Self {
        Self::with_random(config, Box::new(StdRandom::from_entropy()))
    }

    pub fn with_random(config: CharcoalConfig, random: Box<dyn RandomSource>) -> Self {
        Self {
            config,
            random,
            last_point: None,
        }
    }

    /// One bristle per three pixels of width
    pub fn bristle_count(&self) -> usize {
        (self.config.stroke_width / 3.0).floor().max(0.0) as usize
    }
}

impl Tool for Charcoal {
    fn name(&self) -> &'static str {
        NAME
    }

    fn cursor(&self) -> Option<Cursor> {
        Some(Cursor::circle(self.config.stroke_width))
    }

    fn start_stroke(&mut self, point: Point, surface: &mut dyn Surface) {
        let state = surface.state_mut();
        state.global_alpha = ALPHA;
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

        let scatter = self.config.stroke_width * self.config.roughness;
        for _ in 0..self.bristle_count() {
            let offset = Vec2::new(
                (self.random.next() - 0.5) * scatter,
                (self.random.next() - 0.5) * scatter,
            );
            surface.state_mut().line_width = self.random.next() * 3.0 + 1.0;
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
