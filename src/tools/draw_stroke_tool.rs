use egui::Pos2;
use log::{debug, warn};

use crate::input::PointerEvent;
use crate::stroke::{Stroke, StrokeBuilder, StrokeRef};
use crate::style::StrokeStyle;

/// Turns one press-move-release gesture into a single stroke.
///
/// Style is read again when the gesture is committed, so the stroke carries
/// the brush settings in effect at release. The live preview keeps the
/// settings from the press.
#[derive(Debug, Default)]
pub struct StrokeCapture {
    // Transient state: the stroke being drawn (if any)
    current_stroke: Option<StrokeBuilder>,
}

impl StrokeCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.current_stroke.is_some()
    }

    /// Feed one pointer event. Returns the finished stroke when the gesture ends.
    pub fn handle_event(&mut self, event: PointerEvent, style: &StrokeStyle) -> Option<StrokeRef> {
        match event {
            PointerEvent::Down(pos) => self.on_pointer_down(pos, style),
            PointerEvent::Move(pos) => {
                self.on_pointer_move(pos);
                None
            }
            PointerEvent::Up(pos) => self.on_pointer_up(pos, style),
            PointerEvent::Cancel => self.finish(style),
        }
    }

    /// Start a new stroke. A gesture still in progress is committed first and returned.
    pub fn on_pointer_down(&mut self, pos: Pos2, style: &StrokeStyle) -> Option<StrokeRef> {
        let previous = self.finish(style);
        if previous.is_some() {
            warn!("Pointer pressed during an unfinished gesture; committing it first");
        }

        let mut stroke = StrokeBuilder::new(style.stroke_color, style.effective_width(), style.mode());
        stroke.add_point(pos);
        self.current_stroke = Some(stroke);
        previous
    }

    pub fn on_pointer_move(&mut self, pos: Pos2) {
        if let Some(stroke) = &mut self.current_stroke {
            if stroke.last_point() != Some(pos) {
                stroke.add_point(pos);
            }
        }
    }

    pub fn on_pointer_up(&mut self, pos: Pos2, style: &StrokeStyle) -> Option<StrokeRef> {
        self.on_pointer_move(pos);
        self.finish(style)
    }

    /// Commit the gesture with the samples gathered so far, styled by `style`.
    pub fn finish(&mut self, style: &StrokeStyle) -> Option<StrokeRef> {
        let mut builder = self.current_stroke.take()?;
        builder.restyle(style.stroke_color, style.effective_width(), style.mode());
        let stroke = builder.finish()?;
        debug!("Captured {:?} stroke with {} points", stroke.mode(), stroke.points().len());
        Some(stroke)
    }

    /// Drop the gesture in progress without producing a stroke.
    pub fn abort(&mut self) {
        self.current_stroke = None;
    }

    /// Snapshot of the in-progress stroke for live rendering
    pub fn preview(&self) -> Option<Stroke> {
        self.current_stroke.as_ref().map(StrokeBuilder::to_stroke)
    }
}

/// Capture a whole gesture given as ordered samples.
///
/// Zero samples produce no stroke; one sample produces a dot.
pub fn capture_gesture(samples: &[Pos2], style: &StrokeStyle) -> Option<StrokeRef> {
    let (first, rest) = samples.split_first()?;
    let mut capture = StrokeCapture::new();
    capture.on_pointer_down(*first, style);
    for pos in rest {
        capture.on_pointer_move(*pos);
    }
    capture.finish(style)
}
