use egui::Pos2;
use log::{debug, info, warn};

use crate::canvas::CanvasState;
use crate::error::{ExportError, RasterizeError, SaveError};
use crate::event::{EventBus, SketchEvent};
use crate::export::{DownloadSink, ExportService};
use crate::gallery::{DrawingId, DrawingRepository};
use crate::history::HistoryStack;
use crate::input::PointerEvent;
use crate::raster::{Rasterizer, Snapshot};
use crate::stroke::{Stroke, StrokeRef};
use crate::style::StrokeStyle;
use crate::tools::{StrokeCapture, capture_gesture};

/// A save waiting for its snapshot.
///
/// Holds the frozen strokes; hand it back to [`Sketchbook::finish_save`] or
/// [`Sketchbook::cancel_save`].
#[derive(Debug)]
#[must_use = "a pending save blocks the canvas until finished or cancelled"]
pub struct PendingSave {
    name: String,
    strokes: Vec<StrokeRef>,
}

impl PendingSave {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Strokes to rasterize, in drawing order
    pub fn strokes(&self) -> Vec<StrokeRef> {
        self.strokes.clone()
    }

    fn frozen(&self) -> Vec<Stroke> {
        self.strokes.iter().map(|s| Stroke::clone(s)).collect()
    }
}

/// The drawing tool's state: active canvas, its history, and saved drawings.
///
/// All operations run on one logical event loop. The only step that may
/// suspend is rasterization during a save; while it is pending the canvas is
/// frozen and pointer input, undo, redo, clear and load are ignored.
#[derive(Debug, Default)]
pub struct Sketchbook {
    canvas: CanvasState,
    history: HistoryStack,
    capture: StrokeCapture,
    drawings: DrawingRepository,
    event_bus: EventBus,
    save_pending: bool,
}

impl Sketchbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with previously stored drawings and an empty canvas.
    pub fn with_drawings(drawings: DrawingRepository) -> Self {
        Self {
            drawings,
            ..Self::default()
        }
    }

    pub fn canvas(&self) -> &CanvasState {
        &self.canvas
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn drawings(&self) -> &DrawingRepository {
        &self.drawings
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn is_save_pending(&self) -> bool {
        self.save_pending
    }

    pub fn can_undo(&self) -> bool {
        !self.save_pending && self.history.can_undo(&self.canvas)
    }

    pub fn can_redo(&self) -> bool {
        !self.save_pending && self.history.can_redo()
    }

    /// The stroke currently being drawn, if any
    pub fn preview(&self) -> Option<Stroke> {
        self.capture.preview()
    }

    /// Feed a pointer event. Returns true when it completed and committed a stroke.
    pub fn handle_pointer(&mut self, event: PointerEvent, style: &StrokeStyle) -> bool {
        if self.save_pending {
            debug!("Ignoring pointer input while a save is pending");
            return false;
        }
        match self.capture.handle_event(event, style) {
            Some(stroke) => {
                self.commit(stroke);
                true
            }
            None => false,
        }
    }

    /// Capture a complete gesture at once. Zero samples commit nothing.
    pub fn draw_gesture(&mut self, samples: &[Pos2], style: &StrokeStyle) -> bool {
        if self.save_pending {
            debug!("Ignoring gesture while a save is pending");
            return false;
        }
        match capture_gesture(samples, style) {
            Some(stroke) => {
                self.commit(stroke);
                true
            }
            None => false,
        }
    }

    fn commit(&mut self, stroke: StrokeRef) {
        self.history.commit(&mut self.canvas, stroke);
        self.event_bus.emit(SketchEvent::StrokeCommitted {
            stroke_count: self.canvas.len(),
        });
    }

    pub fn undo(&mut self) -> bool {
        if self.save_pending {
            return false;
        }
        if self.history.undo(&mut self.canvas).is_none() {
            return false;
        }
        self.event_bus.emit(SketchEvent::Undone {
            stroke_count: self.canvas.len(),
        });
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.save_pending {
            return false;
        }
        if self.history.redo(&mut self.canvas).is_none() {
            return false;
        }
        self.event_bus.emit(SketchEvent::Redone {
            stroke_count: self.canvas.len(),
        });
        true
    }

    /// Erase the whole canvas. Redo entries are kept.
    pub fn clear_canvas(&mut self) -> bool {
        if self.save_pending {
            return false;
        }
        self.capture.abort();
        let removed = self.history.clear(&mut self.canvas);
        debug!("Cleared {} strokes", removed);
        self.event_bus.emit(SketchEvent::CanvasCleared);
        true
    }

    /// Freeze the canvas for saving.
    ///
    /// A gesture still in progress is committed first, styled by `style`.
    /// Returns `Ok(None)` for an empty canvas and [`SaveError::InProgress`] if
    /// another save is pending.
    pub fn begin_save(
        &mut self,
        name: &str,
        style: &StrokeStyle,
    ) -> Result<Option<PendingSave>, SaveError> {
        if self.save_pending {
            return Err(SaveError::InProgress);
        }
        if let Some(stroke) = self.capture.finish(style) {
            self.commit(stroke);
        }
        if self.canvas.is_empty() {
            debug!("Nothing to save");
            return Ok(None);
        }

        self.save_pending = true;
        self.event_bus.emit(SketchEvent::SaveStarted);
        Ok(Some(PendingSave {
            name: name.to_owned(),
            strokes: self.canvas.strokes().to_vec(),
        }))
    }

    /// Complete a save with the rasterizer's result.
    ///
    /// On success the drawing is stored and the canvas is cleared. The redo
    /// stack survives the clear, like any other clear. On failure nothing is
    /// stored and the canvas is left as it was.
    pub fn finish_save(
        &mut self,
        pending: PendingSave,
        snapshot: Result<Snapshot, RasterizeError>,
    ) -> Result<Option<DrawingId>, SaveError> {
        self.save_pending = false;

        let snapshot = match snapshot {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Save of '{}' failed: {}", pending.name, e);
                self.event_bus.emit(SketchEvent::SaveFailed);
                return Err(e.into());
            }
        };

        let Some(id) = self.drawings.save(&pending.name, pending.frozen(), snapshot) else {
            return Ok(None);
        };
        self.history.clear(&mut self.canvas);
        self.event_bus.emit(SketchEvent::DrawingSaved { id });
        Ok(Some(id))
    }

    /// Abandon a pending save without storing anything.
    pub fn cancel_save(&mut self, pending: PendingSave) {
        debug!("Cancelled save of '{}'", pending.name);
        self.save_pending = false;
    }

    /// Rasterize and store the canvas as a named drawing.
    pub async fn save(
        &mut self,
        name: &str,
        rasterizer: &dyn Rasterizer,
        style: &StrokeStyle,
    ) -> Result<Option<DrawingId>, SaveError> {
        let Some(pending) = self.begin_save(name, style)? else {
            return Ok(None);
        };
        let snapshot = rasterizer
            .rasterize(pending.strokes(), style.background_color)
            .await;
        self.finish_save(pending, snapshot)
    }

    /// Replace the canvas with a copy of a saved drawing's strokes.
    pub fn load(&mut self, id: DrawingId) -> bool {
        if self.save_pending {
            debug!("Ignoring load while a save is pending");
            return false;
        }
        let Some(strokes) = self.drawings.load(id) else {
            debug!("Load of unknown drawing {}", id);
            return false;
        };

        self.capture.abort();
        self.canvas = CanvasState::from_strokes(strokes);
        self.history = HistoryStack::new();
        info!("Loaded drawing {} with {} strokes", id, self.canvas.len());
        self.event_bus.emit(SketchEvent::DrawingLoaded { id });
        true
    }

    pub fn delete(&mut self, id: DrawingId) -> bool {
        if self.drawings.delete(id).is_none() {
            return false;
        }
        self.event_bus.emit(SketchEvent::DrawingDeleted { id });
        true
    }

    /// Send a saved drawing's snapshot to a download sink
    pub fn download(
        &self,
        id: DrawingId,
        export: &ExportService,
        sink: &dyn DownloadSink,
    ) -> Result<(), ExportError> {
        let drawing = self.drawings.get(id).ok_or(ExportError::NotFound(id))?;
        export.download(drawing, sink)
    }
}
