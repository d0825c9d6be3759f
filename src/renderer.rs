use eframe::egui::{self, Color32, Painter, Pos2, Rect, Shape};

use crate::stroke::Stroke;

/// Paints canvas strokes with egui.
///
/// Erase strokes are painted in the background color, in list order, so they
/// hide whatever was drawn before them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    /// Fill `rect` with the background and draw `strokes` followed by the preview
    pub fn render<'a>(
        &self,
        painter: &Painter,
        rect: Rect,
        background: Color32,
        strokes: impl IntoIterator<Item = &'a Stroke>,
        preview: Option<&Stroke>,
    ) {
        painter.rect_filled(rect, 0.0, background);
        let painter = painter.with_clip_rect(rect);
        let origin = rect.min.to_vec2();

        for stroke in strokes {
            paint_stroke(&painter, stroke, origin, background);
        }
        if let Some(stroke) = preview {
            paint_stroke(&painter, stroke, origin, background);
        }
    }
}

fn paint_stroke(painter: &Painter, stroke: &Stroke, origin: egui::Vec2, background: Color32) {
    painter.extend(stroke_shapes(stroke, origin, background));
}

/// Shapes for one stroke: a polyline plus round caps and joins at every point.
/// A single point becomes a dot.
fn stroke_shapes(stroke: &Stroke, origin: egui::Vec2, background: Color32) -> Vec<Shape> {
    let color = if stroke.is_erase() { background } else { stroke.color() };
    let radius = stroke.width() / 2.0;
    let points: Vec<Pos2> = stroke.points().iter().map(|p| *p + origin).collect();

    let mut shapes = Vec::with_capacity(points.len() + 1);
    if points.len() > 1 {
        shapes.push(Shape::line(points.clone(), egui::Stroke::new(stroke.width(), color)));
    }
    shapes.extend(points.into_iter().map(|point| Shape::circle_filled(point, radius, color)));
    shapes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::StrokeMode;
    use eframe::egui::epaint::CircleShape;

    fn circles(shapes: &[Shape]) -> Vec<(Pos2, f32, Color32)> {
        shapes
            .iter()
            .filter_map(|shape| match shape {
                Shape::Circle(CircleShape { center, radius, fill, .. }) => Some((*center, *radius, *fill)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_line_is_offset_into_canvas() {
        let stroke = Stroke::new(
            Color32::RED,
            3.0,
            StrokeMode::Draw,
            vec![Pos2::new(1.0, 1.0), Pos2::new(9.0, 9.0)],
        );
        let shapes = stroke_shapes(&stroke, egui::vec2(10.0, 20.0), Color32::WHITE);

        assert_eq!(shapes.len(), 3);
        let Shape::Path(path) = &shapes[0] else {
            panic!("expected a polyline first, got {:?}", shapes[0]);
        };
        assert_eq!(path.points, vec![Pos2::new(11.0, 21.0), Pos2::new(19.0, 29.0)]);
        assert!(!path.closed);
        assert_eq!(path.stroke.width, 3.0);
        assert_eq!(
            circles(&shapes),
            vec![
                (Pos2::new(11.0, 21.0), 1.5, Color32::RED),
                (Pos2::new(19.0, 29.0), 1.5, Color32::RED),
            ]
        );
    }

    #[test]
    fn test_erase_dot_uses_background() {
        let stroke = Stroke::new(Color32::RED, 8.0, StrokeMode::Erase, vec![Pos2::new(5.0, 5.0)]);
        let shapes = stroke_shapes(&stroke, egui::Vec2::ZERO, Color32::LIGHT_BLUE);

        assert_eq!(shapes.len(), 1);
        assert_eq!(circles(&shapes), vec![(Pos2::new(5.0, 5.0), 4.0, Color32::LIGHT_BLUE)]);
    }

    #[test]
    fn test_empty_stroke_paints_nothing() {
        let stroke = Stroke::new(Color32::RED, 2.0, StrokeMode::Draw, Vec::new());
        assert!(stroke_shapes(&stroke, egui::Vec2::ZERO, Color32::WHITE).is_empty());
    }

    #[test]
    fn test_render_runs_inside_a_frame() {
        let ctx = egui::Context::default();
        let rect = Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(100.0, 100.0));
        let strokes = vec![
            Stroke::new(Color32::RED, 3.0, StrokeMode::Draw, vec![Pos2::new(1.0, 1.0), Pos2::new(9.0, 9.0)]),
            Stroke::new(Color32::RED, 8.0, StrokeMode::Erase, vec![Pos2::new(5.0, 5.0)]),
        ];

        let output = ctx.run(egui::RawInput::default(), |ctx| {
            let painter = Painter::new(ctx.clone(), egui::LayerId::background(), rect);
            Renderer::new().render(&painter, rect, Color32::WHITE, &strokes, strokes.first());
        });

        let shapes: Vec<Shape> = output.shapes.into_iter().map(|clipped| clipped.shape).collect();
        // Two dots per line stroke (the preview repeats the first), one for the eraser.
        assert_eq!(circles(&shapes).len(), 5);
        assert_eq!(circles(&shapes)[2], (Pos2::new(5.0, 5.0), 4.0, Color32::WHITE));
        assert!(shapes.iter().any(|shape| matches!(shape, Shape::Rect(_))));
    }
}
