use std::f32::consts::PI;

use egui::{Color32, Vec2};
use serde::{Deserialize, Serialize};

use super::{Cursor, Tool};
use crate::geometry::{Point, distance, midpoint};
use crate::surface::{CompositeOp, LineCap, LineJoin, Surface};
use crate::util::time::{Clock, SystemClock};

pub(super) const NAME: &str = "Calligraphy";

/// Width fraction of a stroke drawn along the nib
pub const MIN_ANGLE_MULTIPLIER: f32 = 0.2;
/// Floor of the slow-down applied to fast strokes
pub const MIN_SPEED_MULTIPLIER: f32 = 0.3;
/// Width lost per pixel/ms of pointer speed
const SPEED_FALLOFF: f32 = 0.02;
/// Time deltas are floored to this many milliseconds
const MIN_TIME_DELTA: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalligraphyConfig {
    pub color: Color32,
    pub stroke_width: f32,
    /// Nib angle in degrees, measured like `atan2` in surface space
    pub angle: f32,
}

impl Default for CalligraphyConfig {
    fn default() -> Self {
        Self {
            color: Color32::BLACK,
            stroke_width: 20.0,
            angle: 45.0,
        }
    }
}

/// Width multiplier for a stroke heading in `direction` with the nib at
/// `pen_angle_degrees`: `MIN_ANGLE_MULTIPLIER` along the nib, 1 across it.
pub fn angle_multiplier(direction: Vec2, pen_angle_degrees: f32) -> f32 {
    let stroke_angle = direction.y.atan2(direction.x);
    // Direction along the nib is irrelevant, so fold into [0, pi/2]
    let diff = (stroke_angle - pen_angle_degrees.to_radians()).rem_euclid(PI);
    let folded = diff.min(PI - diff);
    folded.sin() * (1.0 - MIN_ANGLE_MULTIPLIER) + MIN_ANGLE_MULTIPLIER
}

/// Width multiplier for a pointer speed in pixels per millisecond
pub fn speed_multiplier(speed: f32) -> f32 {
    (1.0 - speed * SPEED_FALLOFF).max(MIN_SPEED_MULTIPLIER)
}

#[derive(Clone, Copy)]
struct Nib {
    last_point: Point,
    last_mid: Point,
    last_time: f64,
    last_width: f32,
}

/// Broad-nib pen: width follows stroke direction against the nib and slows down with speed
pub struct Calligraphy {
    config: CalligraphyConfig,
    clock: Box<dyn Clock>,
    nib: Option<Nib>,
}

impl Calligraphy {
    pub fn new(config: CalligraphyConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: CalligraphyConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            nib: None,
        }
    }

    /// Width for a segment covering `delta` in `millis`
    pub fn segment_width(&self, delta: Vec2, millis: f64) -> f32 {
        let speed = delta.length() / millis.max(MIN_TIME_DELTA) as f32;
        self.config.stroke_width
            * angle_multiplier(delta, self.config.angle)
            * speed_multiplier(speed)
    }
}

impl Tool for Calligraphy {
    fn name(&self) -> &'static str {
        NAME
    }

    fn cursor(&self) -> Option<Cursor> {
        Some(Cursor::circle(self.config.stroke_width))
    }

    fn start_stroke(&mut self, point: Point, surface: &mut dyn Surface) {
        let state = surface.state_mut();
        state.stroke_color = self.config.color;
        state.line_cap = LineCap::Round;
        state.line_join = LineJoin::Round;
        self.nib = Some(Nib {
            last_point: point,
            last_mid: point,
            last_time: self.clock.now_millis(),
            last_width: self.config.stroke_width,
        });
    }

    fn continue_stroke(&mut self, point: Point, surface: &mut dyn Surface) {
        let now = self.clock.now_millis();
        let Some(nib) = self.nib else {
            self.nib = Some(Nib {
                last_point: point,
                last_mid: point,
                last_time: now,
                last_width: self.config.stroke_width,
            });
            return;
        };
        if distance(nib.last_point, point) == 0.0 {
            return;
        }

        let width = self.segment_width(point - nib.last_point, now - nib.last_time);
        let mid = midpoint(nib.last_point, point);
        surface.state_mut().line_width = width;
        surface.begin_path();
        surface.move_to(nib.last_mid);
        surface.quadratic_curve_to(nib.last_point, mid);
        surface.stroke();

        self.nib = Some(Nib {
            last_point: point,
            last_mid: mid,
            last_time: now,
            last_width: width,
        });
    }

    fn end_stroke(&mut self, surface: &mut dyn Surface) {
        // Finish the half segment between the last midpoint and the pointer
        if let Some(nib) = self.nib.take() {
            if nib.last_mid != nib.last_point {
                surface.state_mut().line_width = nib.last_width;
                surface.begin_path();
                surface.move_to(nib.last_mid);
                surface.line_to(nib.last_point);
                surface.stroke();
            }
        }
        let state = surface.state_mut();
        state.global_alpha = 1.0;
        state.composite = CompositeOp::SourceOver;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_to_nib_is_thinnest() {
        let along = Vec2::new(1.0, 1.0);
        assert!((angle_multiplier(along, 45.0) - MIN_ANGLE_MULTIPLIER).abs() < 1e-5);
        // Drawing backwards along the nib is the same edge
        assert!((angle_multiplier(-along, 45.0) - MIN_ANGLE_MULTIPLIER).abs() < 1e-5);
    }

    #[test]
    fn test_perpendicular_to_nib_is_widest() {
        assert!((angle_multiplier(Vec2::new(1.0, -1.0), 45.0) - 1.0).abs() < 1e-5);
        assert!((angle_multiplier(Vec2::new(-1.0, 1.0), 45.0) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_angle_multiplier_stays_in_range() {
        for degrees in (0..360).step_by(7) {
            let radians = (degrees as f32).to_radians();
            let m = angle_multiplier(Vec2::new(radians.cos(), radians.sin()), 45.0);
            assert!((MIN_ANGLE_MULTIPLIER - 1e-5..=1.0 + 1e-5).contains(&m), "{degrees}: {m}");
        }
    }

    #[test]
    fn test_speed_multiplier_is_floored() {
        assert_eq!(speed_multiplier(0.0), 1.0);
        assert!((speed_multiplier(10.0) - 0.8).abs() < 1e-5);
        assert_eq!(speed_multiplier(1000.0), MIN_SPEED_MULTIPLIER);
    }

    #[test]
    fn test_segment_width_floors_time_delta() {
        let pen = Calligraphy::new(CalligraphyConfig::default());
        let delta = Vec2::new(10.0, -10.0);
        assert_eq!(pen.segment_width(delta, 0.0), pen.segment_width(delta, 1.0));
    }
}
