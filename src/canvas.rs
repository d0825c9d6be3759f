use std::sync::Arc;

use crate::stroke::{Stroke, StrokeRef};

/// The active, editable surface.
///
/// Strokes are kept in drawing order, which is also their z-order.
#[derive(Debug, Default, Clone)]
pub struct CanvasState {
    strokes: Vec<StrokeRef>,
}

impl CanvasState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a canvas holding fresh copies of `strokes`.
    pub fn from_strokes<'a>(strokes: impl IntoIterator<Item = &'a Stroke>) -> Self {
        Self {
            strokes: strokes.into_iter().map(|s| Arc::new(s.clone())).collect(),
        }
    }

    pub fn add_stroke(&mut self, stroke: StrokeRef) {
        self.strokes.push(stroke);
    }

    pub fn strokes(&self) -> &[StrokeRef] {
        &self.strokes
    }

    pub fn remove_last_stroke(&mut self) -> Option<StrokeRef> {
        self.strokes.pop()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    /// Deep copy of the current strokes, detached from this canvas.
    pub fn freeze(&self) -> Vec<Stroke> {
        self.strokes.iter().map(|s| Stroke::clone(s)).collect()
    }
}
