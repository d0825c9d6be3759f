use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Whether a stroke lays down ink or masks the ink beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrokeMode {
    #[default]
    Draw,
    Erase,
}

// Immutable stroke, shared once committed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    points: Vec<Pos2>,
    color: Color32,
    width: f32,
    mode: StrokeMode,
}

// Mutable stroke for the gesture in progress
#[derive(Debug, Clone)]
pub struct StrokeBuilder {
    points: Vec<Pos2>,
    color: Color32,
    width: f32,
    mode: StrokeMode,
}

/// Reference-counted stroke as stored in a canvas.
///
/// Two `StrokeRef`s denote the same stroke only if they point to the same
/// allocation, see [`same_stroke`].
pub type StrokeRef = Arc<Stroke>;

/// Identity comparison for committed strokes.
pub fn same_stroke(a: &StrokeRef, b: &StrokeRef) -> bool {
    Arc::ptr_eq(a, b)
}

impl Stroke {
    pub fn new(color: Color32, width: f32, mode: StrokeMode, points: Vec<Pos2>) -> Self {
        Self {
            points,
            color,
            width,
            mode,
        }
    }

    pub fn new_ref(color: Color32, width: f32, mode: StrokeMode, points: Vec<Pos2>) -> StrokeRef {
        Arc::new(Self::new(color, width, mode, points))
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn mode(&self) -> StrokeMode {
        self.mode
    }

    pub fn is_erase(&self) -> bool {
        self.mode == StrokeMode::Erase
    }

    /// A stroke with a single sample renders as a dot.
    pub fn is_dot(&self) -> bool {
        self.points.len() == 1
    }
}

impl StrokeBuilder {
    pub fn new(color: Color32, width: f32, mode: StrokeMode) -> Self {
        Self {
            points: Vec::new(),
            color,
            width,
            mode,
        }
    }

    pub fn add_point(&mut self, point: Pos2) {
        self.points.push(point);
    }

    /// Replace the style the stroke will be committed with
    pub fn restyle(&mut self, color: Color32, width: f32, mode: StrokeMode) {
        self.color = color;
        self.width = width;
        self.mode = mode;
    }

    pub fn last_point(&self) -> Option<Pos2> {
        self.points.last().copied()
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn mode(&self) -> StrokeMode {
        self.mode
    }

    /// Freeze into a shareable stroke. Returns `None` when no sample was recorded.
    pub fn finish(self) -> Option<StrokeRef> {
        if self.points.is_empty() {
            return None;
        }
        Some(Arc::new(Stroke::new(self.color, self.width, self.mode, self.points)))
    }

    // Copy of the in-progress stroke for previews
    pub fn to_stroke(&self) -> Stroke {
        Stroke::new(self.color, self.width, self.mode, self.points.clone())
    }
}
