#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod artboard;
pub mod color;
pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod history;
pub mod input;
pub mod random;
pub mod surface;
pub mod tools;
pub mod util;

pub use app::PaintApp;
pub use artboard::Artboard;
pub use config::ArtboardConfig;
pub use error::{ArtboardError, ArtboardResult};
pub use event::{ArtboardEvent, EventBus, EventHandler};
pub use history::{History, Snapshot};
pub use input::{InputEvent, InputTarget, PointerKind};
pub use surface::{ExportFormat, PaintState, PixelRegion, RasterSurface, Surface};
pub use tools::{Tool, ToolKind};
