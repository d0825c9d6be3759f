use std::cell::RefCell;
use std::rc::Rc;

use eframe_sketchbook::event::{EventHandler, SketchEvent};
use eframe_sketchbook::raster::encode_png;
use eframe_sketchbook::{
    ExportError, ExportService, MemorySink, PointerEvent, RasterConfig, RasterizeError, Rasterizer,
    SaveError, Sketchbook, Snapshot, SoftwareRasterizer, StrokeRef, StrokeStyle,
};
use egui::{Color32, Pos2};
use futures::executor::block_on;
use futures::future::{BoxFuture, FutureExt};

const SMALL: RasterConfig = RasterConfig {
    width: 32,
    height: 24,
};

/// Rasterizer that always fails, for all-or-nothing checks
struct FailingRasterizer;

impl Rasterizer for FailingRasterizer {
    fn rasterize(
        &self,
        _strokes: Vec<StrokeRef>,
        _background: Color32,
    ) -> BoxFuture<'static, Result<Snapshot, RasterizeError>> {
        futures::future::ready(Err(RasterizeError::Cancelled)).boxed()
    }
}

struct Recorder(Rc<RefCell<Vec<SketchEvent>>>);

impl EventHandler for Recorder {
    fn handle_event(&mut self, event: &SketchEvent) {
        self.0.borrow_mut().push(event.clone());
    }
}

fn draw_strokes(sketchbook: &mut Sketchbook, count: usize) {
    let style = StrokeStyle::default();
    for i in 0..count {
        let y = i as f32 * 4.0;
        assert!(sketchbook.draw_gesture(&[Pos2::new(1.0, y), Pos2::new(20.0, y)], &style));
    }
}

fn save(sketchbook: &mut Sketchbook, name: &str) -> Result<Option<eframe_sketchbook::DrawingId>, SaveError> {
    let rasterizer = SoftwareRasterizer::new(SMALL);
    block_on(sketchbook.save(name, &rasterizer, &StrokeStyle::default()))
}

#[test]
fn test_draw_undo_save_keeps_two_strokes() {
    let mut sketchbook = Sketchbook::new();
    draw_strokes(&mut sketchbook, 3);
    assert!(sketchbook.undo());

    let id = save(&mut sketchbook, "Three minus one").unwrap().unwrap();

    let drawing = sketchbook.drawings().get(id).unwrap();
    assert_eq!(drawing.strokes().len(), 2);
    assert!(sketchbook.canvas().is_empty());
}

#[test]
fn test_save_clears_canvas_but_keeps_redo() {
    let mut sketchbook = Sketchbook::new();
    draw_strokes(&mut sketchbook, 2);
    let undone = sketchbook.canvas().strokes()[1].clone();
    sketchbook.undo();

    let id = save(&mut sketchbook, "Cat").unwrap().unwrap();

    assert!(sketchbook.canvas().is_empty());
    assert!(sketchbook.can_redo());
    assert!(sketchbook.redo());
    assert_eq!(sketchbook.canvas().len(), 1);
    assert!(std::sync::Arc::ptr_eq(&sketchbook.canvas().strokes()[0], &undone));
    // The stored drawing is unaffected by the redo.
    assert_eq!(sketchbook.drawings().get(id).unwrap().strokes().len(), 1);
}

#[test]
fn test_empty_save_creates_nothing() {
    let mut sketchbook = Sketchbook::new();

    assert!(save(&mut sketchbook, "Nothing").unwrap().is_none());
    assert!(sketchbook.drawings().is_empty());
    assert!(!sketchbook.is_save_pending());
}

#[test]
fn test_duplicate_names() {
    let mut sketchbook = Sketchbook::new();
    draw_strokes(&mut sketchbook, 1);
    save(&mut sketchbook, "Sunset").unwrap();
    draw_strokes(&mut sketchbook, 1);
    save(&mut sketchbook, "Sunset").unwrap();

    let names: Vec<&str> = sketchbook.drawings().iter().map(|d| d.name()).collect();
    assert_eq!(names, ["Sunset", "Sunset (0)"]);
}

#[test]
fn test_load_copies_strokes_with_fresh_history() {
    let mut sketchbook = Sketchbook::new();
    draw_strokes(&mut sketchbook, 2);
    let id = save(&mut sketchbook, "Pair").unwrap().unwrap();

    draw_strokes(&mut sketchbook, 1);
    sketchbook.undo();
    assert!(sketchbook.can_redo());

    assert!(sketchbook.load(id));
    let drawing = sketchbook.drawings().get(id).unwrap();
    let loaded: Vec<_> = sketchbook.canvas().strokes().iter().map(|s| (**s).clone()).collect();
    assert_eq!(loaded, drawing.strokes());
    assert!(sketchbook.history().undone().is_empty());

    // Editing the loaded canvas leaves the saved drawing alone.
    sketchbook.undo();
    assert_eq!(sketchbook.drawings().get(id).unwrap().strokes().len(), 2);
    assert_eq!(sketchbook.drawings().len(), 1);
}

#[test]
fn test_load_unknown_is_noop() {
    let mut sketchbook = Sketchbook::new();
    draw_strokes(&mut sketchbook, 1);
    let id = save(&mut sketchbook, "Gone").unwrap().unwrap();
    sketchbook.delete(id);

    draw_strokes(&mut sketchbook, 2);
    assert!(!sketchbook.load(id));
    assert_eq!(sketchbook.canvas().len(), 2);
}

#[test]
fn test_delete_keeps_order_of_others() {
    let mut sketchbook = Sketchbook::new();
    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        draw_strokes(&mut sketchbook, 1);
        ids.push(save(&mut sketchbook, name).unwrap().unwrap());
    }

    assert!(sketchbook.delete(ids[1]));
    let names: Vec<&str> = sketchbook.drawings().iter().map(|d| d.name()).collect();
    assert_eq!(names, ["A", "C"]);

    assert!(!sketchbook.delete(ids[1]));
    assert_eq!(sketchbook.drawings().len(), 2);
}

#[test]
fn test_failed_rasterize_changes_nothing() {
    let mut sketchbook = Sketchbook::new();
    draw_strokes(&mut sketchbook, 2);

    let result = block_on(sketchbook.save("Broken", &FailingRasterizer, &StrokeStyle::default()));

    assert!(matches!(result, Err(SaveError::Rasterize(RasterizeError::Cancelled))));
    assert!(sketchbook.drawings().is_empty());
    assert_eq!(sketchbook.canvas().len(), 2);
    assert!(!sketchbook.is_save_pending());
}

#[test]
fn test_pending_save_blocks_edits() {
    let mut sketchbook = Sketchbook::new();
    let style = StrokeStyle::default();
    draw_strokes(&mut sketchbook, 1);

    let pending = sketchbook.begin_save("Busy", &style).unwrap().unwrap();
    assert!(matches!(sketchbook.begin_save("Again", &style), Err(SaveError::InProgress)));

    assert!(!sketchbook.handle_pointer(PointerEvent::Down(Pos2::new(1.0, 1.0)), &style));
    assert!(!sketchbook.handle_pointer(PointerEvent::Up(Pos2::new(2.0, 2.0)), &style));
    assert!(!sketchbook.draw_gesture(&[Pos2::ZERO], &style));
    assert!(!sketchbook.undo());
    assert!(!sketchbook.clear_canvas());
    assert_eq!(sketchbook.canvas().len(), 1);

    let snapshot = encode_png(&pending.strokes(), Color32::WHITE, SMALL);
    let id = sketchbook.finish_save(pending, snapshot).unwrap().unwrap();

    assert_eq!(sketchbook.drawings().get(id).unwrap().name(), "Busy");
    assert!(sketchbook.canvas().is_empty());
    assert!(sketchbook.draw_gesture(&[Pos2::ZERO], &style));
}

#[test]
fn test_cancel_save_releases_canvas() {
    let mut sketchbook = Sketchbook::new();
    draw_strokes(&mut sketchbook, 1);

    let pending = sketchbook.begin_save("Later", &StrokeStyle::default()).unwrap().unwrap();
    sketchbook.cancel_save(pending);

    assert!(!sketchbook.is_save_pending());
    assert!(sketchbook.drawings().is_empty());
    assert_eq!(sketchbook.canvas().len(), 1);
}

#[test]
fn test_begin_save_commits_open_gesture() {
    let mut sketchbook = Sketchbook::new();
    let style = StrokeStyle::default();
    sketchbook.handle_pointer(PointerEvent::Down(Pos2::new(3.0, 3.0)), &style);
    sketchbook.handle_pointer(PointerEvent::Move(Pos2::new(6.0, 3.0)), &style);

    let commit_style = StrokeStyle {
        stroke_color: Color32::BLUE,
        ..Default::default()
    };
    let pending = sketchbook.begin_save("Open", &commit_style).unwrap().unwrap();
    assert_eq!(pending.strokes().len(), 1);
    assert_eq!(pending.strokes()[0].color(), Color32::BLUE);
    sketchbook.cancel_save(pending);
}

#[test]
fn test_pointer_stream_commits_on_release() {
    let mut sketchbook = Sketchbook::new();
    let style = StrokeStyle::default();

    assert!(!sketchbook.handle_pointer(PointerEvent::Down(Pos2::new(1.0, 1.0)), &style));
    assert!(!sketchbook.handle_pointer(PointerEvent::Move(Pos2::new(2.0, 1.0)), &style));
    assert!(sketchbook.preview().is_some());
    assert!(sketchbook.handle_pointer(PointerEvent::Up(Pos2::new(3.0, 1.0)), &style));

    assert_eq!(sketchbook.canvas().len(), 1);
    assert_eq!(sketchbook.canvas().strokes()[0].points().len(), 3);
    assert!(sketchbook.preview().is_none());
}

#[test]
fn test_download_uses_stored_snapshot() {
    let mut sketchbook = Sketchbook::new();
    draw_strokes(&mut sketchbook, 2);
    let id = save(&mut sketchbook, "Sunset").unwrap().unwrap();

    // The live canvas changes after saving; the export must not.
    draw_strokes(&mut sketchbook, 3);

    let sink = MemorySink::new();
    let export = ExportService::new();
    sketchbook.download(id, &export, &sink).unwrap();

    let downloads = sink.take();
    assert_eq!(downloads.len(), 1);
    assert_eq!(downloads[0].file_name, "Sunset.png");
    assert_eq!(downloads[0].mime_type, "image/png");
    assert_eq!(downloads[0].bytes, sketchbook.drawings().get(id).unwrap().snapshot().bytes);
}

#[test]
fn test_download_unknown_drawing() {
    let mut sketchbook = Sketchbook::new();
    draw_strokes(&mut sketchbook, 1);
    let id = save(&mut sketchbook, "Temp").unwrap().unwrap();
    sketchbook.delete(id);

    let result = sketchbook.download(id, &ExportService::new(), &MemorySink::new());
    assert!(matches!(result, Err(ExportError::NotFound(missing)) if missing == id));
}

#[test]
fn test_events_follow_mutations() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut sketchbook = Sketchbook::new();
    sketchbook.event_bus().subscribe(Box::new(Recorder(events.clone())));

    draw_strokes(&mut sketchbook, 2);
    sketchbook.undo();
    sketchbook.redo();
    sketchbook.undo();
    sketchbook.undo();
    sketchbook.undo();
    let id = {
        draw_strokes(&mut sketchbook, 1);
        save(&mut sketchbook, "E").unwrap().unwrap()
    };

    assert_eq!(
        *events.borrow(),
        vec![
            SketchEvent::StrokeCommitted { stroke_count: 1 },
            SketchEvent::StrokeCommitted { stroke_count: 2 },
            SketchEvent::Undone { stroke_count: 1 },
            SketchEvent::Redone { stroke_count: 2 },
            SketchEvent::Undone { stroke_count: 1 },
            SketchEvent::Undone { stroke_count: 0 },
            SketchEvent::StrokeCommitted { stroke_count: 1 },
            SketchEvent::SaveStarted,
            SketchEvent::DrawingSaved { id },
        ]
    );
}
