#![allow(dead_code)]

use std::sync::Arc;

use artboard::surface::{ExportFormat, PaintState, PixelRegion, RasterSurface, Surface};
use artboard::{ArtboardEvent, ArtboardResult, EventHandler};
use egui::Rect;
use parking_lot::Mutex;

/// Collects every event an artboard emits
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<ArtboardEvent>>>,
}

impl Recorder {
    pub fn handler(&self) -> Box<dyn EventHandler> {
        Box::new(self.clone())
    }

    pub fn events(&self) -> Vec<ArtboardEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, predicate: impl Fn(&ArtboardEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }

    pub fn starts(&self) -> usize {
        self.count(|e| matches!(e, ArtboardEvent::StrokeStarted { .. }))
    }

    pub fn continues(&self) -> usize {
        self.count(|e| matches!(e, ArtboardEvent::StrokeContinued { .. }))
    }

    pub fn ends(&self) -> usize {
        self.count(|e| matches!(e, ArtboardEvent::StrokeEnded { .. }))
    }
}

impl EventHandler for Recorder {
    fn handle_event(&mut self, event: &ArtboardEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Raster surface that remembers the paint state of every `stroke` call
pub struct RecordingSurface {
    pub inner: RasterSurface,
    pub strokes: Vec<PaintState>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            inner: RasterSurface::new(width, height),
            strokes: Vec::new(),
        }
    }

    pub fn widths(&self) -> Vec<f32> {
        self.strokes.iter().map(|s| s.line_width).collect()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.inner.width()
    }
    fn height(&self) -> u32 {
        self.inner.height()
    }
    fn state(&self) -> &PaintState {
        self.inner.state()
    }
    fn state_mut(&mut self) -> &mut PaintState {
        self.inner.state_mut()
    }
    fn save(&mut self) {
        self.inner.save()
    }
    fn restore(&mut self) {
        self.inner.restore()
    }
    fn begin_path(&mut self) {
        self.inner.begin_path()
    }
    fn move_to(&mut self, point: egui::Pos2) {
        self.inner.move_to(point)
    }
    fn line_to(&mut self, point: egui::Pos2) {
        self.inner.line_to(point)
    }
    fn quadratic_curve_to(&mut self, control: egui::Pos2, to: egui::Pos2) {
        self.inner.quadratic_curve_to(control, to)
    }
    fn bezier_curve_to(&mut self, control1: egui::Pos2, control2: egui::Pos2, to: egui::Pos2) {
        self.inner.bezier_curve_to(control1, control2, to)
    }
    fn stroke(&mut self) {
        self.strokes.push(*self.inner.state());
        self.inner.stroke()
    }
    fn fill_rect(&mut self, rect: Rect) {
        self.inner.fill_rect(rect)
    }
    fn get_image_data(&self, x: i32, y: i32, width: u32, height: u32) -> PixelRegion {
        self.inner.get_image_data(x, y, width, height)
    }
    fn put_image_data(&mut self, region: &PixelRegion, x: i32, y: i32) {
        self.inner.put_image_data(region, x, y)
    }
    fn draw_image(&mut self, region: &PixelRegion, dest: Rect) {
        self.inner.draw_image(region, dest)
    }
    fn encode(&self, format: ExportFormat) -> ArtboardResult<Vec<u8>> {
        self.inner.encode(format)
    }
}
