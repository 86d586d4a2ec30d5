use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use egui::{Color32, ColorImage, Rect, Stroke, TextureHandle, TextureOptions, pos2, vec2};
use log::{info, warn};

use crate::artboard::Artboard;
use crate::color::to_hex;
use crate::config::ArtboardConfig;
use crate::event::{ArtboardEvent, EventHandler};
use crate::input::InputHandler;
use crate::surface::{ExportFormat, RasterSurface, Surface};
use crate::tools::ToolKind;

const MIN_STROKE_WIDTH: f32 = 1.0;
const MAX_STROKE_WIDTH: f32 = 80.0;

/// Brush settings restored when the app restarts
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct AppSettings {
    pub tool: ToolKind,
    pub color: Color32,
    pub stroke_width: f32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            tool: ToolKind::Pencil,
            color: Color32::from_rgb(0x2c, 0x2c, 0x2c),
            stroke_width: 3.0,
        }
    }
}

/// Flags the texture for re-upload whenever the artboard reports a change
struct RepaintOnChange(Arc<AtomicBool>);

impl EventHandler for RepaintOnChange {
    fn handle_event(&mut self, event: &ArtboardEvent) {
        if !matches!(event, ArtboardEvent::ToolChanged { .. }) {
            self.0.store(true, Ordering::Relaxed);
        }
    }
}

pub struct PaintApp {
    artboard: Artboard<RasterSurface>,
    input: InputHandler,
    settings: AppSettings,
    /// Settings changed but the tool could not be rebuilt yet
    settings_pending: bool,
    texture: Option<TextureHandle>,
    dirty: Arc<AtomicBool>,
    status: Option<String>,
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings: AppSettings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        Self::with_settings(settings, ArtboardConfig::default())
    }

    pub fn with_settings(settings: AppSettings, config: ArtboardConfig) -> Self {
        let artboard = Artboard::new(
            settings.tool.build(settings.color, settings.stroke_width),
            config,
        );
        let dirty = Arc::new(AtomicBool::new(true));
        artboard.subscribe(Box::new(RepaintOnChange(dirty.clone())));

        Self {
            artboard,
            input: InputHandler::new(),
            settings,
            settings_pending: false,
            texture: None,
            dirty,
            status: None,
        }
    }

    pub fn artboard(&self) -> &Artboard<RasterSurface> {
        &self.artboard
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Rebuild the tool from the current settings once no stroke is active
    fn apply_settings(&mut self) {
        if !self.settings_pending {
            return;
        }
        let tool = self
            .settings
            .tool
            .build(self.settings.color, self.settings.stroke_width);
        match self.artboard.set_tool(tool) {
            Ok(()) => self.settings_pending = false,
            Err(err) => warn!("{err}"),
        }
    }

    fn download(&mut self) {
        let name = self.artboard.config().download_name.clone();
        let format = std::path::Path::new(&name)
            .extension()
            .and_then(image::ImageFormat::from_extension)
            .map(|format| ExportFormat::from_mime(format.to_mime_type()))
            .unwrap_or_default();

        self.status = Some(match self.artboard.download(&name, format) {
            Ok(true) => {
                info!("Saved {name}");
                format!("Saved {name}")
            }
            Ok(false) => "Nothing to save yet".to_string(),
            Err(err) => {
                warn!("{err}");
                err.to_string()
            }
        });
    }

    fn tools_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("tools_panel")
            .resizable(true)
            .default_width(180.0)
            .show(ctx, |ui| {
                ui.heading("Brushes");

                for kind in ToolKind::ALL {
                    if ui
                        .selectable_label(self.settings.tool == kind, kind.name())
                        .clicked()
                    {
                        info!("Tool selected from UI: {}", kind.name());
                        self.settings.tool = kind;
                        self.settings_pending = true;
                    }
                }
                ui.separator();

                ui.add_enabled_ui(self.settings.tool.uses_color(), |ui| {
                    ui.horizontal(|ui| {
                        ui.label("Colour");
                        if ui.color_edit_button_srgba(&mut self.settings.color).changed() {
                            self.settings_pending = true;
                        }
                        ui.monospace(to_hex(self.settings.color));
                    });
                });
                let slider = egui::Slider::new(
                    &mut self.settings.stroke_width,
                    MIN_STROKE_WIDTH..=MAX_STROKE_WIDTH,
                )
                .text("Width");
                if ui.add(slider).changed() {
                    self.settings_pending = true;
                }
                ui.separator();

                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(self.artboard.can_undo(), egui::Button::new("Undo"))
                        .clicked()
                    {
                        self.artboard.undo();
                    }
                    if ui
                        .add_enabled(self.artboard.can_redo(), egui::Button::new("Redo"))
                        .clicked()
                    {
                        self.artboard.redo();
                    }
                });
                ui.horizontal(|ui| {
                    if ui.button("Clear").clicked() {
                        self.artboard.clear();
                    }
                    if ui.button("Download").clicked() {
                        self.download();
                    }
                });

                if let Some(history) = self.artboard.history() {
                    ui.label(format!(
                        "History: {} past, {} future",
                        history.past_len(),
                        history.future_len()
                    ));
                }
                if let Some(status) = &self.status {
                    ui.label(status);
                }
            });
    }

    fn upload_texture(&mut self, ctx: &egui::Context) {
        let Some(surface) = self.artboard.surface() else {
            return;
        };
        if !self.dirty.swap(false, Ordering::Relaxed) && self.texture.is_some() {
            return;
        }

        let image = ColorImage::from_rgba_unmultiplied(
            [surface.width() as usize, surface.height() as usize],
            surface.pixels().as_raw(),
        );
        if let Some(texture) = &mut self.texture {
            texture.set(image, TextureOptions::NEAREST);
        } else {
            self.texture = Some(ctx.load_texture("artboard", image, TextureOptions::NEAREST));
        }
    }

    fn central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::drag());
            let rect = response.rect;

            if self.artboard.surface().is_none() {
                let width = rect.width().max(1.0) as u32;
                let height = rect.height().max(1.0) as u32;
                self.artboard.attach_surface(RasterSurface::new(width, height));
                self.dirty.store(true, Ordering::Relaxed);
            }
            let Some(size) = self
                .artboard
                .surface()
                .map(|s| vec2(s.width() as f32, s.height() as f32))
            else {
                return;
            };
            let surface_rect = Rect::from_min_size(rect.min, size);

            for (target, event) in self.input.process_input(ctx, surface_rect) {
                self.artboard.handle_event(target, event);
            }
            if !self.artboard.is_drawing() {
                self.apply_settings();
            }

            self.upload_texture(ctx);
            if let Some(texture) = &self.texture {
                painter.image(
                    texture.id(),
                    surface_rect,
                    Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }

            if let (Some(cursor), Some(hover)) = (self.artboard.cursor(), response.hover_pos()) {
                painter.circle_stroke(hover, cursor.radius(), Stroke::new(1.0, Color32::DARK_GRAY));
            }
        });
    }
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (undo, redo) = ctx.input(|i| {
            let z = i.modifiers.command && i.key_pressed(egui::Key::Z);
            (z && !i.modifiers.shift, z && i.modifiers.shift)
        });
        if undo {
            self.artboard.undo();
        }
        if redo {
            self.artboard.redo();
        }

        self.tools_panel(ctx);
        self.central_panel(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_survive_json() {
        let settings = AppSettings {
            tool: ToolKind::OilPaint,
            color: Color32::from_rgb(1, 2, 3),
            stroke_width: 12.0,
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(serde_json::from_str::<AppSettings>(&json).unwrap(), settings);
        assert_eq!(serde_json::from_str::<AppSettings>("{}").unwrap(), AppSettings::default());
    }

    #[test]
    fn test_pending_settings_wait_for_stroke_end() {
        let mut app = PaintApp::with_settings(AppSettings::default(), ArtboardConfig::default());
        app.artboard.attach_surface(RasterSurface::new(20, 20));
        app.artboard.start_stroke(pos2(5.0, 5.0));

        app.settings.tool = ToolKind::Eraser;
        app.settings_pending = true;
        app.apply_settings();
        assert!(app.settings_pending);
        assert_eq!(app.artboard.tool().name(), ToolKind::Pencil.name());

        app.artboard.end_stroke();
        app.apply_settings();
        assert!(!app.settings_pending);
        assert_eq!(app.artboard.tool().name(), ToolKind::Eraser.name());
    }
}
