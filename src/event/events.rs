use crate::gallery::DrawingId;

/// Changes to the sketchbook that callers may need to redraw for
#[derive(Debug, Clone, PartialEq)]
pub enum SketchEvent {
    StrokeCommitted { stroke_count: usize },
    Undone { stroke_count: usize },
    Redone { stroke_count: usize },
    CanvasCleared,
    SaveStarted,
    SaveFailed,
    DrawingSaved { id: DrawingId },
    DrawingLoaded { id: DrawingId },
    DrawingDeleted { id: DrawingId },
}
