use log::debug;

use crate::canvas::CanvasState;
use crate::stroke::StrokeRef;

/// Linear undo/redo over one canvas.
///
/// Undone strokes wait in `undone` (most recent last) until redone or until a
/// new stroke is committed, which discards them: redo only applies to the exact
/// state a stroke was undone from.
#[derive(Debug, Default)]
pub struct HistoryStack {
    undone: Vec<StrokeRef>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a freshly captured stroke and drop any pending redo.
    pub fn commit(&mut self, canvas: &mut CanvasState, stroke: StrokeRef) {
        canvas.add_stroke(stroke);
        if !self.undone.is_empty() {
            debug!("Discarding {} redoable strokes after new commit", self.undone.len());
            self.undone.clear();
        }
    }

    /// Move the last committed stroke onto the redo stack.
    ///
    /// Returns `None` when there is nothing to undo.
    pub fn undo(&mut self, canvas: &mut CanvasState) -> Option<StrokeRef> {
        let Some(stroke) = canvas.remove_last_stroke() else {
            debug!("Nothing to undo");
            return None;
        };
        self.undone.push(stroke.clone());
        Some(stroke)
    }

    /// Put the most recently undone stroke back on the canvas.
    ///
    /// Returns `None` when there is nothing to redo.
    pub fn redo(&mut self, canvas: &mut CanvasState) -> Option<StrokeRef> {
        let Some(stroke) = self.undone.pop() else {
            debug!("Nothing to redo");
            return None;
        };
        canvas.add_stroke(stroke.clone());
        Some(stroke)
    }

    /// Empty the canvas. Pending redo entries survive a clear.
    pub fn clear(&mut self, canvas: &mut CanvasState) -> usize {
        let removed = canvas.len();
        canvas.clear();
        removed
    }

    pub fn undone(&self) -> &[StrokeRef] {
        &self.undone
    }

    pub fn can_undo(&self, canvas: &CanvasState) -> bool {
        !canvas.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }
}
