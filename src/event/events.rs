use crate::geometry::Point;

/// Notifications emitted by the artboard as strokes and history change
#[derive(Debug, Clone, PartialEq)]
pub enum ArtboardEvent {
    StrokeStarted {
        point: Point,
        tool: &'static str,
    },
    StrokeContinued {
        point: Point,
    },
    StrokeEnded {
        tool: &'static str,
    },
    /// The surface was refilled with the background colour
    Cleared,
    SnapshotRecorded {
        depth: usize,
    },
    Undone,
    Redone,
    ToolChanged {
        old: &'static str,
        new: &'static str,
    },
}
