//! The stroke interaction engine.
//!
//! [`Artboard`] owns the attached surface, the active tool and the history,
//! and turns targeted pointer input into exactly one `start_stroke`, any
//! number of `continue_stroke` and exactly one `end_stroke` per stroke. The
//! `drawing` flag is the only gate: every entry point checks it before acting,
//! so overlapping surface and document deliveries of the same pointer session
//! never double-start or double-end a stroke.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::{debug, trace, warn};

use crate::config::ArtboardConfig;
use crate::error::{ArtboardError, ArtboardResult};
use crate::event::{ArtboardEvent, EventBus, EventHandler};
use crate::geometry::{Point, is_inside, mouse_button_is_down, surface_rect, within_margin};
use crate::history::History;
use crate::input::{InputEvent, InputTarget};
use crate::surface::{ExportFormat, Surface};
use crate::tools::{Cursor, Tool};

pub struct Artboard<S: Surface> {
    surface: Option<S>,
    tool: Box<dyn Tool>,
    drawing: bool,
    history: Option<History>,
    events: EventBus,
    config: ArtboardConfig,
}

impl<S: Surface> std::fmt::Debug for Artboard<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artboard")
            .field("attached", &self.surface.is_some())
            .field("tool", &self.tool.name())
            .field("drawing", &self.drawing)
            .field("history", &self.history)
            .field("events", &self.events)
            .field("config", &self.config)
            .finish()
    }
}

impl<S: Surface> Artboard<S> {
    /// Creates an artboard with undo history and no surface attached yet
    pub fn new(tool: Box<dyn Tool>, config: ArtboardConfig) -> Self {
        Self {
            surface: None,
            tool,
            drawing: false,
            history: Some(Self::new_history(&config)),
            events: EventBus::new(),
            config,
        }
    }

    /// Creates an artboard that keeps no snapshots; undo and redo do nothing
    pub fn without_history(tool: Box<dyn Tool>, config: ArtboardConfig) -> Self {
        Self {
            history: None,
            ..Self::new(tool, config)
        }
    }

    fn new_history(config: &ArtboardConfig) -> History {
        match config.history_limit {
            Some(limit) => History::with_limit(limit),
            None => History::new(),
        }
    }

    /// Attach a surface, fill it with the background colour and record it as
    /// the history baseline. Returns the previously attached surface.
    pub fn attach_surface(&mut self, mut surface: S) -> Option<S> {
        let previous = self.detach_surface();

        Self::fill_background(&mut surface, &self.config);
        if let Some(history) = &mut self.history {
            *history = Self::new_history(&self.config);
            history.record_snapshot(&surface);
        }
        debug!(
            "Artboard: attached {}x{} surface",
            surface.width(),
            surface.height()
        );
        self.surface = Some(surface);
        previous
    }

    /// Detach the surface, ending any stroke in progress first
    pub fn detach_surface(&mut self) -> Option<S> {
        self.end_stroke();
        self.surface.take()
    }

    fn fill_background(surface: &mut S, config: &ArtboardConfig) {
        let rect = surface_rect(surface.width(), surface.height());
        surface.save();
        let state = surface.state_mut();
        state.reset_blending();
        state.fill_color = config.background;
        surface.fill_rect(rect);
        surface.restore();
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.events.subscribe(handler);
    }

    /// Feed one pointer event observed on `target`
    pub fn handle_event(&mut self, target: InputTarget, event: InputEvent) {
        let Some((width, height)) = self.surface.as_ref().map(|s| (s.width(), s.height())) else {
            return;
        };
        trace!("Artboard: {target:?} event at {:?}", event.pos());

        match (target, event) {
            (InputTarget::Surface, InputEvent::Down { pos, primary, .. }) => {
                if !primary {
                    return;
                }
                if !is_inside(pos, width, height) {
                    warn!("Artboard: surface pointer down outside bounds at {pos:?}");
                    return;
                }
                self.start_stroke(pos);
            }
            (InputTarget::Surface, InputEvent::Move { pos, .. }) => self.continue_stroke(pos),
            (InputTarget::Surface, InputEvent::Up { .. }) => self.end_stroke(),
            (InputTarget::Surface, InputEvent::Enter { pos, buttons }) => {
                // Button pressed elsewhere and dragged in: a new stroke, never a resumed one
                if mouse_button_is_down(buttons) {
                    self.start_stroke(pos);
                }
            }
            (InputTarget::Surface, InputEvent::Leave { .. }) => {}
            (InputTarget::Document, InputEvent::Move { pos, .. }) => {
                if self.drawing
                    && !is_inside(pos, width, height)
                    && within_margin(pos, width, height, self.config.capture_margin)
                {
                    self.continue_stroke(pos);
                }
            }
            (InputTarget::Document, InputEvent::Up { .. }) => self.end_stroke(),
            (InputTarget::Document, _) => {}
        }
    }

    /// Begin a stroke at `point`. Does nothing while a stroke is active or
    /// without a surface.
    pub fn start_stroke(&mut self, point: Point) {
        if self.drawing {
            return;
        }
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        surface.save();
        surface.state_mut().reset_blending();
        self.drawing = true;
        debug!("Artboard: {} stroke started at {point:?}", self.tool.name());
        self.tool.start_stroke(point, surface);
        self.events.emit(ArtboardEvent::StrokeStarted {
            point,
            tool: self.tool.name(),
        });
    }

    /// Forward a point to the active stroke, if there is one
    pub fn continue_stroke(&mut self, point: Point) {
        if !self.drawing {
            return;
        }
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        trace!("Artboard: stroke continued to {point:?}");
        self.tool.continue_stroke(point, surface);
        self.events.emit(ArtboardEvent::StrokeContinued { point });
    }

    /// Finish the active stroke and record a snapshot of the result
    pub fn end_stroke(&mut self) {
        if !self.drawing {
            return;
        }
        self.drawing = false;
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        self.tool.end_stroke(surface);
        debug!("Artboard: {} stroke ended", self.tool.name());
        self.events.emit(ArtboardEvent::StrokeEnded {
            tool: self.tool.name(),
        });
        surface.restore();
        self.record_snapshot();
    }

    fn record_snapshot(&mut self) {
        let (Some(surface), Some(history)) = (self.surface.as_ref(), self.history.as_mut()) else {
            return;
        };
        history.record_snapshot(surface);
        self.events.emit(ArtboardEvent::SnapshotRecorded {
            depth: history.past_len(),
        });
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn tool(&self) -> &dyn Tool {
        self.tool.as_ref()
    }

    /// Swap the active tool. Refused while a stroke is in progress.
    pub fn set_tool(&mut self, tool: Box<dyn Tool>) -> ArtboardResult<()> {
        if self.drawing {
            return Err(ArtboardError::ToolBusy {
                active: self.tool.name(),
            });
        }
        let old = self.tool.name();
        self.tool = tool;
        debug!("Artboard: tool changed from {old} to {}", self.tool.name());
        self.events.emit(ArtboardEvent::ToolChanged {
            old,
            new: self.tool.name(),
        });
        Ok(())
    }

    /// Cursor for the active tool
    pub fn cursor(&self) -> Option<Cursor> {
        self.tool.cursor()
    }

    pub fn config(&self) -> &ArtboardConfig {
        &self.config
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn history(&self) -> Option<&History> {
        self.history.as_ref()
    }

    /// Refill the surface with the background colour and record the result
    pub fn clear(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        Self::fill_background(surface, &self.config);
        debug!("Artboard: cleared");
        self.events.emit(ArtboardEvent::Cleared);
        self.record_snapshot();
    }

    /// Step back one snapshot. Does nothing mid-stroke or with only the baseline left.
    pub fn undo(&mut self) -> bool {
        if self.drawing {
            return false;
        }
        let (Some(surface), Some(history)) = (self.surface.as_mut(), self.history.as_mut()) else {
            return false;
        };
        let undone = history.undo(surface);
        if undone {
            self.events.emit(ArtboardEvent::Undone);
        }
        undone
    }

    /// Re-apply the last undone snapshot, if any
    pub fn redo(&mut self) -> bool {
        if self.drawing {
            return false;
        }
        let (Some(surface), Some(history)) = (self.surface.as_mut(), self.history.as_mut()) else {
            return false;
        };
        let redone = history.redo(surface);
        if redone {
            self.events.emit(ArtboardEvent::Redone);
        }
        redone
    }

    pub fn can_undo(&self) -> bool {
        !self.drawing && self.history.as_ref().is_some_and(History::can_undo)
    }

    pub fn can_redo(&self) -> bool {
        !self.drawing && self.history.as_ref().is_some_and(History::can_redo)
    }

    /// Encode the surface into `format`. `None` without a surface.
    pub fn encode(&self, format: ExportFormat) -> ArtboardResult<Option<Vec<u8>>> {
        self.surface.as_ref().map(|s| s.encode(format)).transpose()
    }

    /// The surface as a `data:` URI. `None` without a surface.
    pub fn image_data_uri(&self, format: ExportFormat) -> ArtboardResult<Option<String>> {
        Ok(self.encode(format)?.map(|bytes| {
            format!("data:{};base64,{}", format.mime_type(), BASE64.encode(bytes))
        }))
    }

    /// Write the encoded surface to `path`. Returns false without a surface.
    pub fn download(&self, path: impl AsRef<Path>, format: ExportFormat) -> ArtboardResult<bool> {
        let Some(bytes) = self.encode(format)? else {
            return Ok(false);
        };
        std::fs::write(path.as_ref(), bytes)?;
        debug!("Artboard: saved image to {}", path.as_ref().display());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use egui::Color32;

    use super::*;
    use crate::input::PointerKind;
    use crate::surface::RasterSurface;
    use crate::tools::ToolKind;

    fn artboard() -> Artboard<RasterSurface> {
        let mut artboard = Artboard::new(
            ToolKind::Pencil.build(Color32::BLACK, 3.0),
            ArtboardConfig::default(),
        );
        artboard.attach_surface(RasterSurface::new(40, 30));
        artboard
    }

    fn down(x: f32, y: f32) -> InputEvent {
        InputEvent::Down {
            pos: Point::new(x, y),
            kind: PointerKind::Mouse,
            primary: true,
        }
    }

    #[test]
    fn test_attach_fills_background_and_records_baseline() {
        let artboard = artboard();
        let surface = artboard.surface().unwrap();
        assert_eq!(surface.pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(surface.pixel(39, 29), Some([255, 255, 255, 255]));
        assert_eq!(artboard.history().unwrap().past_len(), 1);
        assert!(!artboard.can_undo());
    }

    #[test]
    fn test_secondary_button_does_not_draw() {
        let mut artboard = artboard();
        artboard.handle_event(
            InputTarget::Surface,
            InputEvent::Down {
                pos: Point::new(5.0, 5.0),
                kind: PointerKind::Mouse,
                primary: false,
            },
        );
        assert!(!artboard.is_drawing());
    }

    #[test]
    fn test_document_down_is_ignored() {
        let mut artboard = artboard();
        artboard.handle_event(InputTarget::Document, down(5.0, 5.0));
        assert!(!artboard.is_drawing());
    }

    #[test]
    fn test_stroke_end_restores_state_and_snapshots() {
        let mut artboard = artboard();
        artboard.handle_event(InputTarget::Surface, down(5.0, 5.0));
        assert!(artboard.is_drawing());
        assert_eq!(artboard.surface().unwrap().saved_depth(), 1);

        artboard.handle_event(
            InputTarget::Surface,
            InputEvent::Move {
                pos: Point::new(20.0, 5.0),
                kind: PointerKind::Mouse,
            },
        );
        artboard.handle_event(
            InputTarget::Surface,
            InputEvent::Up {
                pos: Point::new(20.0, 5.0),
                kind: PointerKind::Mouse,
            },
        );

        let surface = artboard.surface().unwrap();
        assert!(!artboard.is_drawing());
        assert_eq!(surface.saved_depth(), 0);
        assert!(surface.state().is_baseline());
        assert_eq!(artboard.history().unwrap().past_len(), 2);
    }

    #[test]
    fn test_clear_records_snapshot() {
        let mut artboard = artboard();
        artboard.clear();
        assert_eq!(artboard.history().unwrap().past_len(), 2);
        assert!(artboard.undo());
        assert!(artboard.redo());
    }

    #[test]
    fn test_without_history() {
        let mut artboard: Artboard<RasterSurface> = Artboard::without_history(
            ToolKind::Eraser.build(Color32::BLACK, 4.0),
            ArtboardConfig::default(),
        );
        artboard.attach_surface(RasterSurface::new(10, 10));
        artboard.start_stroke(Point::new(5.0, 5.0));
        artboard.end_stroke();
        assert!(artboard.history().is_none());
        assert!(!artboard.undo());
    }

    #[test]
    fn test_image_data_uri() {
        let artboard = artboard();
        let uri = artboard.image_data_uri(ExportFormat::Png).unwrap().unwrap();
        assert!(uri.starts_with("data:image/png;base64,iVBOR"));

        let detached: Artboard<RasterSurface> =
            Artboard::new(ToolKind::Pencil.build(Color32::BLACK, 3.0), ArtboardConfig::default());
        assert_eq!(detached.image_data_uri(ExportFormat::Png).unwrap(), None);
    }

    #[test]
    fn test_detach_ends_stroke() {
        let mut artboard = artboard();
        artboard.start_stroke(Point::new(1.0, 1.0));
        let surface = artboard.detach_surface().unwrap();
        assert!(!artboard.is_drawing());
        assert_eq!(surface.saved_depth(), 0);
        assert!(artboard.surface().is_none());
    }
}
