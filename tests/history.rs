mod common;

use artboard::random::SequenceRandom;
use artboard::surface::RasterSurface;
use artboard::tools::{Crayon, CrayonConfig, ToolKind};
use artboard::{Artboard, ArtboardConfig, ArtboardEvent, History};
use common::Recorder;
use egui::{Color32, Pos2};

fn artboard() -> Artboard<RasterSurface> {
    let mut artboard = Artboard::new(
        ToolKind::InkPen.build(Color32::BLACK, 6.0),
        ArtboardConfig::default(),
    );
    artboard.attach_surface(RasterSurface::new(60, 60));
    artboard
}

fn stroke(artboard: &mut Artboard<RasterSurface>, from: Pos2, to: Pos2) {
    artboard.start_stroke(from);
    for i in 1..=10 {
        artboard.continue_stroke(from.lerp(to, i as f32 / 10.0));
    }
    artboard.end_stroke();
}

fn pixels(artboard: &Artboard<RasterSurface>) -> image::RgbaImage {
    artboard.surface().unwrap().pixels().clone()
}

#[test]
fn test_undo_redo_stroke_is_pixel_exact() {
    let mut artboard = artboard();
    let before = pixels(&artboard);
    stroke(&mut artboard, Pos2::new(5.0, 5.0), Pos2::new(55.0, 50.0));
    let after = pixels(&artboard);
    assert_ne!(before, after);

    assert!(artboard.undo());
    assert_eq!(pixels(&artboard), before);
    assert!(artboard.redo());
    assert_eq!(pixels(&artboard), after);
}

#[test]
fn test_new_snapshot_after_undo_drops_redo() {
    let mut artboard = artboard();
    stroke(&mut artboard, Pos2::new(5.0, 5.0), Pos2::new(55.0, 5.0));
    artboard.undo();
    assert!(artboard.can_redo());

    stroke(&mut artboard, Pos2::new(5.0, 30.0), Pos2::new(55.0, 30.0));
    let current = pixels(&artboard);
    assert!(!artboard.can_redo());
    assert!(!artboard.redo());
    assert_eq!(pixels(&artboard), current);
}

#[test]
fn test_two_strokes_two_undos_restore_baseline() {
    let mut artboard = artboard();
    let baseline = pixels(&artboard);
    stroke(&mut artboard, Pos2::new(5.0, 5.0), Pos2::new(55.0, 55.0));
    stroke(&mut artboard, Pos2::new(55.0, 5.0), Pos2::new(5.0, 55.0));

    assert!(artboard.undo());
    assert!(artboard.undo());
    assert_eq!(pixels(&artboard), baseline);
    // Nothing before the baseline
    assert!(!artboard.undo());
    assert_eq!(pixels(&artboard), baseline);
}

#[test]
fn test_clear_is_undoable() {
    let mut artboard = artboard();
    stroke(&mut artboard, Pos2::new(5.0, 5.0), Pos2::new(55.0, 55.0));
    let drawn = pixels(&artboard);

    artboard.clear();
    assert_eq!(artboard.surface().unwrap().pixel(30, 30), Some([255, 255, 255, 255]));
    assert!(artboard.undo());
    assert_eq!(pixels(&artboard), drawn);
}

#[test]
fn test_undo_is_refused_mid_stroke() {
    let mut artboard = artboard();
    stroke(&mut artboard, Pos2::new(5.0, 5.0), Pos2::new(55.0, 55.0));
    artboard.start_stroke(Pos2::new(30.0, 5.0));
    assert!(!artboard.can_undo());
    assert!(!artboard.undo());
    artboard.end_stroke();
    assert!(artboard.can_undo());
}

#[test]
fn test_history_events() {
    let mut artboard = artboard();
    let recorder = Recorder::default();
    artboard.subscribe(recorder.handler());

    artboard.clear();
    artboard.undo();
    artboard.redo();
    artboard.redo();

    assert_eq!(
        recorder.events(),
        vec![
            ArtboardEvent::Cleared,
            ArtboardEvent::SnapshotRecorded { depth: 2 },
            ArtboardEvent::Undone,
            ArtboardEvent::Redone,
        ]
    );
}

#[test]
fn test_history_limit_from_config() {
    let crayon = Crayon::with_random(CrayonConfig::default(), Box::new(SequenceRandom::constant(0.3)));
    let mut artboard = Artboard::new(
        Box::new(crayon),
        ArtboardConfig {
            history_limit: Some(3),
            ..Default::default()
        },
    );
    artboard.attach_surface(RasterSurface::new(60, 60));
    let baseline = pixels(&artboard);

    for y in [10.0, 20.0, 30.0, 40.0] {
        stroke(&mut artboard, Pos2::new(5.0, y), Pos2::new(55.0, y));
    }
    assert_eq!(artboard.history().map(History::past_len), Some(3));

    while artboard.undo() {}
    assert_eq!(pixels(&artboard), baseline);
}

#[test]
fn test_reattach_starts_fresh_history() {
    let mut artboard = artboard();
    stroke(&mut artboard, Pos2::new(5.0, 5.0), Pos2::new(55.0, 55.0));
    let old = artboard.attach_surface(RasterSurface::new(30, 30));

    assert_eq!(old.map(|s| s.pixels().dimensions()), Some((60, 60)));
    assert_eq!(artboard.history().map(History::past_len), Some(1));
    assert!(!artboard.can_undo());
}
