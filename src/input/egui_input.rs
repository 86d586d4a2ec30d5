use egui::{Context, Event, PointerButton, Pos2, Rect, TouchPhase};
use log::trace;

use super::{InputEvent, InputTarget, PointerKind};
use crate::geometry::{PRIMARY_BUTTON_MASK, surface_point};

/// Converts raw egui pointer events into targeted [`InputEvent`]s.
///
/// egui reports pointer positions for the whole window, so the handler keeps
/// track of whether the pointer is over the surface rect and synthesises
/// `Enter`/`Leave` when that changes.
#[derive(Debug, Default)]
pub struct InputHandler {
    inside: bool,
    buttons: u16,
    kind: PointerKind,
}

fn button_mask(button: PointerButton) -> u16 {
    match button {
        PointerButton::Primary => PRIMARY_BUTTON_MASK,
        PointerButton::Secondary => 1 << 1,
        PointerButton::Middle => 1 << 2,
        PointerButton::Extra1 => 1 << 3,
        PointerButton::Extra2 => 1 << 4,
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently held buttons as a bit mask
    pub fn buttons(&self) -> u16 {
        self.buttons
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }

    /// Process this frame's raw egui input for a surface drawn at `surface_rect`
    pub fn process_input(&mut self, ctx: &Context, surface_rect: Rect) -> Vec<(InputTarget, InputEvent)> {
        let raw = ctx.input(|input| input.events.clone());
        self.process_events(&raw, surface_rect)
    }

    /// Same as [`process_input`](Self::process_input) on an explicit event list
    pub fn process_events(&mut self, raw: &[Event], surface_rect: Rect) -> Vec<(InputTarget, InputEvent)> {
        let mut events = Vec::new();
        for event in raw {
            match event {
                Event::Touch { phase, .. } => {
                    // egui mirrors touches as pointer events; only note the device
                    self.kind = PointerKind::Touch;
                    if matches!(phase, TouchPhase::End | TouchPhase::Cancel) {
                        self.buttons &= !PRIMARY_BUTTON_MASK;
                    }
                }
                Event::PointerMoved(pos) => {
                    self.track_containment(*pos, surface_rect, &mut events);
                    let target = self.target();
                    events.push((
                        target,
                        InputEvent::Move {
                            pos: surface_point(*pos, surface_rect.min),
                            kind: self.kind,
                        },
                    ));
                }
                Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    ..
                } => {
                    self.track_containment(*pos, surface_rect, &mut events);
                    let target = self.target();
                    let local = surface_point(*pos, surface_rect.min);
                    if *pressed {
                        self.buttons |= button_mask(*button);
                        events.push((
                            target,
                            InputEvent::Down {
                                pos: local,
                                kind: self.kind,
                                primary: *button == PointerButton::Primary,
                            },
                        ));
                    } else {
                        self.buttons &= !button_mask(*button);
                        events.push((
                            target,
                            InputEvent::Up {
                                pos: local,
                                kind: self.kind,
                            },
                        ));
                    }
                }
                Event::PointerGone => {
                    if self.inside {
                        self.inside = false;
                        events.push((
                            InputTarget::Surface,
                            InputEvent::Leave {
                                pos: Pos2::new(-1.0, -1.0),
                            },
                        ));
                    }
                    self.kind = PointerKind::Mouse;
                }
                _ => {}
            }
        }

        if !events.is_empty() {
            trace!("InputHandler: {} events", events.len());
        }
        events
    }

    fn target(&self) -> InputTarget {
        if self.inside {
            InputTarget::Surface
        } else {
            InputTarget::Document
        }
    }

    fn track_containment(&mut self, pos: Pos2, surface_rect: Rect, events: &mut Vec<(InputTarget, InputEvent)>) {
        let inside = surface_rect.contains(pos);
        if inside == self.inside {
            return;
        }
        self.inside = inside;
        let local = surface_point(pos, surface_rect.min);
        let event = if inside {
            InputEvent::Enter {
                pos: local,
                buttons: self.buttons,
            }
        } else {
            InputEvent::Leave { pos: local }
        };
        events.push((InputTarget::Surface, event));
    }
}
