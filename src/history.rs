use std::sync::Arc;

use log::debug;

use crate::surface::{PixelRegion, Surface};

/// A full copy of the surface's pixels at one instant
#[derive(Clone, PartialEq)]
pub struct Snapshot {
    pixels: Arc<PixelRegion>,
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("dimensions", &self.pixels.dimensions())
            .finish()
    }
}

impl Snapshot {
    /// Copy the entire surface
    pub fn capture(surface: &dyn Surface) -> Self {
        Self {
            pixels: Arc::new(surface.get_image_data(0, 0, surface.width(), surface.height())),
        }
    }

    pub fn pixels(&self) -> &PixelRegion {
        &self.pixels
    }

    /// Paint this snapshot back over the whole surface
    pub fn restore_to(&self, surface: &mut dyn Surface) {
        surface.put_image_data(&self.pixels, 0, 0);
    }
}

/// Manages whole-surface snapshots for undo/redo.
///
/// `past` ends with the snapshot matching the current surface; its first entry
/// is the baseline, which undo never removes. `future` holds undone snapshots
/// and is cleared whenever a new snapshot is recorded.
#[derive(Debug, Clone, Default)]
pub struct History {
    past: Vec<Snapshot>,
    future: Vec<Snapshot>,
    /// Maximum length of `past`, `None` for unbounded
    limit: Option<usize>,
}

impl History {
    /// Creates a new empty, unbounded history
    pub fn new() -> Self {
        Self::default()
    }

    /// History keeping at most `limit` past snapshots (at least the baseline and one more)
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit.max(2)),
            ..Self::default()
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Push the current surface contents, invalidating any redo targets
    pub fn record_snapshot(&mut self, surface: &dyn Surface) {
        self.push(Snapshot::capture(surface));
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        self.past.push(snapshot);
        self.future.clear();

        if let Some(limit) = self.limit {
            // Keep the baseline, drop the oldest snapshots after it
            while self.past.len() > limit {
                self.past.remove(1);
            }
        }
        debug!("History: recorded snapshot, depth {}", self.past.len());
    }

    /// Step back one snapshot. Returns false if only the baseline is left.
    pub fn undo(&mut self, surface: &mut dyn Surface) -> bool {
        if self.past.len() <= 1 {
            return false;
        }
        let Some(current) = self.past.pop() else {
            return false;
        };
        if let Some(previous) = self.past.last() {
            previous.restore_to(surface);
        }
        self.future.push(current);
        debug!(
            "History: undo, depth {} with {} redoable",
            self.past.len(),
            self.future.len()
        );
        true
    }

    /// Re-apply the most recently undone snapshot. Returns false if there is none.
    pub fn redo(&mut self, surface: &mut dyn Surface) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        next.restore_to(surface);
        self.past.push(next);
        debug!(
            "History: redo, depth {} with {} redoable",
            self.past.len(),
            self.future.len()
        );
        true
    }

    /// Returns true if there are snapshots that can be undone
    pub fn can_undo(&self) -> bool {
        self.past.len() > 1
    }

    /// Returns true if there are snapshots that can be redone
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// The snapshot matching the current surface, if any
    pub fn current(&self) -> Option<&Snapshot> {
        self.past.last()
    }

    /// Forget every snapshot, including the baseline
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}
