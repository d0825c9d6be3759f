use eframe_sketchbook::{
    CanvasState, HistoryStack, PointerEvent, StrokeCapture, StrokeMode, StrokeStyle, capture_gesture,
};
use egui::{Color32, Pos2};

fn samples(n: usize) -> Vec<Pos2> {
    (0..n).map(|i| Pos2::new(i as f32 * 3.0, i as f32)).collect()
}

#[test]
fn test_gesture_appends_exactly_one_stroke() {
    let style = StrokeStyle::default();
    let mut canvas = CanvasState::new();
    let mut history = HistoryStack::new();

    for n in 1..6 {
        let before = canvas.len();
        let stroke = capture_gesture(&samples(n), &style).unwrap();
        history.commit(&mut canvas, stroke);

        assert_eq!(canvas.len(), before + 1);
        assert_eq!(canvas.strokes().last().unwrap().points().len(), n);
    }
}

#[test]
fn test_commit_clears_undone() {
    let style = StrokeStyle::default();
    let mut canvas = CanvasState::new();
    let mut history = HistoryStack::new();

    history.commit(&mut canvas, capture_gesture(&samples(2), &style).unwrap());
    history.commit(&mut canvas, capture_gesture(&samples(3), &style).unwrap());
    history.undo(&mut canvas);
    history.undo(&mut canvas);
    assert_eq!(history.undone().len(), 2);

    history.commit(&mut canvas, capture_gesture(&samples(1), &style).unwrap());
    assert!(history.undone().is_empty());
    assert!(!history.can_redo());
}

#[test]
fn test_zero_samples_commit_nothing() {
    assert!(capture_gesture(&[], &StrokeStyle::default()).is_none());
}

#[test]
fn test_tap_yields_dot() {
    let mut capture = StrokeCapture::new();
    let style = StrokeStyle::default();
    let pos = Pos2::new(7.0, 8.0);

    assert!(capture.handle_event(PointerEvent::Down(pos), &style).is_none());
    let stroke = capture.handle_event(PointerEvent::Up(pos), &style).unwrap();

    assert!(stroke.is_dot());
    assert_eq!(stroke.points(), &[pos]);
}

#[test]
fn test_erase_mode_uses_eraser_width() {
    let style = StrokeStyle {
        stroke_width: 3.0,
        eraser_width: 25.0,
        stroke_color: Color32::RED,
        erase_mode: true,
        ..Default::default()
    };
    let stroke = capture_gesture(&samples(4), &style).unwrap();

    assert_eq!(stroke.mode(), StrokeMode::Erase);
    assert_eq!(stroke.width(), 25.0);
}

#[test]
fn test_draw_mode_uses_brush_style() {
    let style = StrokeStyle {
        stroke_width: 3.0,
        stroke_color: Color32::RED,
        ..Default::default()
    };
    let stroke = capture_gesture(&samples(4), &style).unwrap();

    assert_eq!(stroke.mode(), StrokeMode::Draw);
    assert_eq!(stroke.width(), 3.0);
    assert_eq!(stroke.color(), Color32::RED);
}
