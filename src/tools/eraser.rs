use serde::{Deserialize, Serialize};

use super::{Cursor, Tool};
use crate::geometry::Point;
use crate::surface::{CompositeOp, LineCap, LineJoin, Surface};

pub(super) const NAME: &str = "Eraser";

/// The eraser tool for removing content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EraserConfig {
    pub stroke_width: f32,
}

impl Default for EraserConfig {
    fn default() -> Self {
        Self { stroke_width: 20.0 }
    }
}

/// Clears pixels back to transparent along the stroke
#[derive(Debug, Clone)]
pub struct Eraser {
    config: EraserConfig,
    last_point: Option<Point>,
}

impl Eraser {
    pub fn new(config: EraserConfig) -> Self {
        Self {
            config,
            last_point: None,
        }
    }
}

impl Tool for Eraser {
    fn name(&self) -> &'static str {
        NAME
    }

    fn cursor(&self) -> Option<Cursor> {
        Some(Cursor::circle(self.config.stroke_width))
    }

    fn start_stroke(&mut self, point: Point, surface: &mut dyn Surface) {
        let state = surface.state_mut();
        state.global_alpha = 1.0;
        state.line_width = self.config.stroke_width;
        state.line_cap = LineCap::Round;
        state.line_join = LineJoin::Round;
        state.composite = CompositeOp::DestinationOut;

        // A tap still erases a dot
        surface.begin_path();
        surface.move_to(point);
        surface.stroke();
        self.last_point = Some(point);
    }

    fn continue_stroke(&mut self, point: Point, surface: &mut dyn Surface) {
        let Some(last) = self.last_point.replace(point) else {
            return;
        };
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
