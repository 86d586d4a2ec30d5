use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::surface::Surface;

pub mod cursor;

mod acrylic;
mod calligraphy;
mod charcoal;
mod crayon;
mod eraser;
mod ink_pen;
mod oil_paint;
mod pencil;
mod smudge;

pub use acrylic::{Acrylic, AcrylicConfig};
pub use calligraphy::{Calligraphy, CalligraphyConfig, angle_multiplier, speed_multiplier};
pub use charcoal::{Charcoal, CharcoalConfig};
pub use crayon::{Crayon, CrayonConfig};
pub use cursor::Cursor;
pub use eraser::{Eraser, EraserConfig};
pub use ink_pen::{InkPen, InkPenConfig};
pub use oil_paint::{OilPaint, OilPaintConfig};
pub use pencil::{Pencil, PencilConfig};
pub use smudge::{Smudge, SmudgeConfig};

/// Tool trait defines the stroke lifecycle every brush implements.
///
/// All three lifecycle callbacks are optional; the defaults do nothing.
/// Tools paint directly onto the surface they are handed and keep any
/// per-stroke scratch state to themselves, reset on `start_stroke`.
pub trait Tool: Send {
    /// Return the display name of the tool
    fn name(&self) -> &'static str;

    /// Pointer shape to show while this tool is active
    fn cursor(&self) -> Option<Cursor> {
        None
    }

    /// Called once when a stroke begins at `point`.
    /// Should (re-)initialise every ambient paint setting the tool relies on.
    fn start_stroke(&mut self, _point: Point, _surface: &mut dyn Surface) {}

    /// Called for every pointer position received while the stroke is active
    fn continue_stroke(&mut self, _point: Point, _surface: &mut dyn Surface) {}

    /// Called once when the stroke ends.
    /// Should leave alpha at 1 and compositing at source-over.
    fn end_stroke(&mut self, _surface: &mut dyn Surface) {}
}

/// Enum representing all available brushes, used to build tools by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolKind {
    #[default]
    Pencil,
    Charcoal,
    Calligraphy,
    Crayon,
    InkPen,
    OilPaint,
    Acrylic,
    Smudge,
    Eraser,
}

impl ToolKind {
    pub const ALL: [ToolKind; 9] = [
        Self::Pencil,
        Self::Charcoal,
        Self::Calligraphy,
        Self::Crayon,
        Self::InkPen,
        Self::OilPaint,
        Self::Acrylic,
        Self::Smudge,
        Self::Eraser,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Pencil => pencil::NAME,
            Self::Charcoal => charcoal::NAME,
            Self::Calligraphy => calligraphy::NAME,
            Self::Crayon => crayon::NAME,
            Self::InkPen => ink_pen::NAME,
            Self::OilPaint => oil_paint::NAME,
            Self::Acrylic => acrylic::NAME,
            Self::Smudge => smudge::NAME,
            Self::Eraser => eraser::NAME,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// True if the brush paints with a colour of its own
    pub fn uses_color(self) -> bool {
        !matches!(self, Self::Smudge | Self::Eraser)
    }

    /// Build a fresh tool with the brush's defaults, overriding colour and width
    pub fn build(self, color: Color32, stroke_width: f32) -> Box<dyn Tool> {
        match self {
            Self::Pencil => Box::new(Pencil::new(PencilConfig {
                color,
                stroke_width,
                ..Default::default()
            })),
            Self::Charcoal => Box::new(Charcoal::new(CharcoalConfig {
                color,
                stroke_width,
                ..Default::default()
            })),
            Self::Calligraphy => Box::new(Calligraphy::new(CalligraphyConfig {
                color,
                stroke_width,
                ..Default::default()
            })),
            Self::Crayon => Box::new(Crayon::new(CrayonConfig {
                color,
                stroke_width,
                ..Default::default()
            })),
            Self::InkPen => Box::new(InkPen::new(InkPenConfig {
                color,
                stroke_width,
                ..Default::default()
            })),
            Self::OilPaint => Box::new(OilPaint::new(OilPaintConfig {
                color,
                stroke_width,
                ..Default::default()
            })),
            Self::Acrylic => Box::new(Acrylic::new(AcrylicConfig {
                color,
                stroke_width,
                ..Default::default()
            })),
            Self::Smudge => Box::new(Smudge::new(SmudgeConfig {
                stroke_width,
                ..Default::default()
            })),
            Self::Eraser => Box::new(Eraser::new(EraserConfig { stroke_width })),
        }
    }
}

// Factory function to create a new tool of the specified name
pub fn new_tool(name: &str, color: Color32, stroke_width: f32) -> Option<Box<dyn Tool>> {
    ToolKind::from_name(name).map(|kind| kind.build(color, stroke_width))
}
