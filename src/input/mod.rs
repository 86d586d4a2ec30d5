//! Pointer input as the artboard sees it.
//!
//! Events carry positions already converted to surface pixel space and are
//! delivered with an [`InputTarget`] saying whether the surface itself or the
//! surrounding document received them.

use crate::geometry::Point;

pub mod egui_input;

pub use egui_input::InputHandler;

/// Which device produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
}

/// Where an event was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    /// The drawing surface
    Surface,
    /// The document around it
    Document,
}

/// Represents the pointer events the stroke engine reacts to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Button pressed or contact started
    Down {
        pos: Point,
        kind: PointerKind,
        /// True for the primary mouse button and for touches
        primary: bool,
    },
    /// Pointer moved, with or without buttons held
    Move { pos: Point, kind: PointerKind },
    /// Button released or contact ended
    Up { pos: Point, kind: PointerKind },
    /// Pointer entered the surface with `buttons` held (bit 0 is primary)
    Enter { pos: Point, buttons: u16 },
    /// Pointer left the surface
    Leave { pos: Point },
}

impl InputEvent {
    pub fn pos(&self) -> Point {
        match *self {
            Self::Down { pos, .. }
            | Self::Move { pos, .. }
            | Self::Up { pos, .. }
            | Self::Enter { pos, .. }
            | Self::Leave { pos } => pos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_for_every_variant() {
        let pos = Point::new(3.0, 4.0);
        let events = [
            InputEvent::Down {
                pos,
                kind: PointerKind::Touch,
                primary: true,
            },
            InputEvent::Move {
                pos,
                kind: PointerKind::Mouse,
            },
            InputEvent::Up {
                pos,
                kind: PointerKind::Mouse,
            },
            InputEvent::Enter { pos, buttons: 1 },
            InputEvent::Leave { pos },
        ];
        assert!(events.iter().all(|event| event.pos() == pos));
    }
}
