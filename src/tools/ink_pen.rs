use egui::Color32;
use serde::{Deserialize, Serialize};

use super::{Cursor, Tool};
use crate::geometry::{Point, distance, midpoint};
use crate::surface::{CompositeOp, LineCap, LineJoin, Surface};

pub(super) const NAME: &str = "Ink Pen";

const INITIAL_PRESSURE: f32 = 0.5;
const MIN_PRESSURE: f32 = 0.3;
/// Weight of the previous estimate in the pressure average
const PRESSURE_SMOOTHING: f32 = 0.7;
const INK_BLEED: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InkPenConfig {
    pub color: Color32,
    pub stroke_width: f32,
    /// Ink opacity
    pub flow: f32,
}

impl Default for InkPenConfig {
    fn default() -> Self {
        Self {
            color: Color32::from_rgb(0x00, 0x00, 0x80),
            stroke_width: 4.0,
            flow: 0.9,
        }
    }
}

/// Pressure the pen settles towards after moving `distance` pixels in one event
pub fn target_pressure(distance: f32) -> f32 {
    (1.0 - distance * 0.01).clamp(MIN_PRESSURE, 1.0)
}

/// Fine pen whose width follows a smoothed, motion-derived pressure estimate
pub struct InkPen {
    config: InkPenConfig,
    last_point: Option<Point>,
    pressure: f32,
}

impl InkPen {
    pub fn new(config: InkPenConfig) -> Self {
        Self {
            config,
            last_point: None,
            pressure: INITIAL_PRESSURE,
        }
    }

    /// Current pressure estimate
    pub fn pressure(&self) -> f32 {
        self.pressure
    }
}

impl Tool for InkPen {
    fn name(&self) -> &'static str {
        NAME
    }

    fn cursor(&self) -> Option<Cursor> {
        Some(Cursor::circle(self.config.stroke_width))
    }

    fn start_stroke(&mut self, point: Point, surface: &mut dyn Surface) {
        let state = surface.state_mut();
        state.global_alpha = self.config.flow;
        state.stroke_color = self.config.color;
        state.line_cap = LineCap::Round;
        state.line_join = LineJoin::Round;
        state.shadow_color = self.config.color;
        state.shadow_blur = INK_BLEED;
        self.last_point = Some(point);
        self.pressure = INITIAL_PRESSURE;
    }

    fn continue_stroke(&mut self, point: Point, surface: &mut dyn Surface) {
        let Some(last) = self.last_point.replace(point) else {
            return;
        };

        let target = target_pressure(distance(last, point));
        self.pressure = self.pressure * PRESSURE_SMOOTHING + target * (1.0 - PRESSURE_SMOOTHING);

        surface.state_mut().line_width = self.config.stroke_width * self.pressure;
        surface.begin_path();
        surface.move_to(last);
        surface.quadratic_curve_to(last, midpoint(last, point));
        surface.stroke();
    }

    fn end_stroke(&mut self, surface: &mut dyn Surface) {
        let state = surface.state_mut();
        state.global_alpha = 1.0;
        state.composite = CompositeOp::SourceOver;
        state.shadow_blur = 0.0;
        self.last_point = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RasterSurface;

    #[test]
    fn test_target_pressure_clamped() {
        assert_eq!(target_pressure(0.0), 1.0);
        assert!((target_pressure(50.0) - 0.5).abs() < 1e-5);
        assert_eq!(target_pressure(500.0), MIN_PRESSURE);
    }

    #[test]
    fn test_pressure_is_smoothed_and_reset() {
        let mut surface = RasterSurface::filled(100, 100, Color32::WHITE);
        let mut pen = InkPen::new(InkPenConfig::default());
        pen.start_stroke(Point::new(10.0, 10.0), &mut surface);
        pen.continue_stroke(Point::new(10.0, 10.0), &mut surface);
        // 0.5 * 0.7 + 1.0 * 0.3
        assert!((pen.pressure() - 0.65).abs() < 1e-5);
        assert!((surface.state().line_width - 4.0 * 0.65).abs() < 1e-5);

        pen.end_stroke(&mut surface);
        assert_eq!(surface.state().shadow_blur, 0.0);
        pen.start_stroke(Point::new(10.0, 10.0), &mut surface);
        assert_eq!(pen.pressure(), INITIAL_PRESSURE);
    }
}
