use egui::Color32;
use serde::{Deserialize, Serialize};

use super::{Cursor, Tool};
use crate::geometry::{Point, lerp};
use crate::random::{RandomSource, StdRandom};
use crate::surface::{CompositeOp, LineCap, LineJoin, Surface};

pub(super) const NAME: &str = "Acrylic";

/// Random draws above this add a pooled-paint pass (one segment in five)
const BUILDUP_THRESHOLD: f32 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcrylicConfig {
    pub color: Color32,
    pub stroke_width: f32,
    pub opacity: f32,
}

impl Default for AcrylicConfig {
    fn default() -> Self {
        Self {
            color: Color32::from_rgb(0xff, 0x6b, 0x35),
            stroke_width: 20.0,
            opacity: 0.9,
        }
    }
}

/// Solid, smooth paint with an occasional translucent buildup pass
pub struct Acrylic {
    config: AcrylicConfig,
    random: Box<dyn RandomSource>,
    last_point: Option<Point>,
}

impl Acrylic {
    pub fn new(config: AcrylicConfig) -> Self {
        Self::with_random(config, Box::new(StdRandom::from_entropy()))
    }

    pub fn with_random(config: AcrylicConfig, random: Box<dyn RandomSource>) -> Self {
        Self {
            config,
            random,
            last_point: None,
        }
    }
}

impl Tool for Acrylic {
    fn name(&self) -> &'static str {
        NAME
    }

    fn cursor(&self) -> Option<Cursor> {
        Some(Cursor::circle(self.config.stroke_width))
    }

    fn start_stroke(&mut self, point: Point, surface: &mut dyn Surface) {
        let state = surface.state_mut();
        state.global_alpha = self.config.opacity;
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

        let texture = (self.random.next() - 0.5) * 2.0;
        surface.state_mut().line_width = (self.config.stroke_width + texture).max(1.0);
        surface.begin_path();
        surface.move_to(last);
        surface.bezier_curve_to(lerp(last, point, 0.3), lerp(last, point, 0.7), point);
        surface.stroke();

        if self.random.next() > BUILDUP_THRESHOLD {
            let state = surface.state_mut();
            state.global_alpha = self.config.opacity * 0.3;
            state.line_width = self.config.stroke_width * 0.6;
            surface.begin_path();
            surface.move_to(last);
            surface.line_to(point);
            surface.stroke();
            surface.state_mut().global_alpha = self.config.opacity;
        }
    }

    fn end_stroke(&mut self, surface: &mut dyn Surface) {
        let state = surface.state_mut();
        state.global_alpha = 1.0;
        state.composite = CompositeOp::SourceOver;
        self.last_point = None;
    }
}
