use egui::{Context, PointerButton, Pos2, Rect};

/// Pointer stream consumed by the stroke capture engine.
///
/// Positions are canvas-local: `(0, 0)` is the top-left corner of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Primary button pressed on the canvas
    Down(Pos2),
    /// Pointer moved while the button is held
    Move(Pos2),
    /// Primary button released
    Up(Pos2),
    /// Pointer left without a release; the gesture ends where it was
    Cancel,
}

/// Handles converting raw egui input into canvas-local pointer events
#[derive(Debug, Default)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    gesture_active: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process this frame's egui input for the canvas occupying `canvas_rect`
    pub fn process_input(&mut self, ctx: &Context, canvas_rect: Rect) -> Vec<PointerEvent> {
        let to_local = |pos: Pos2| Pos2::new(pos.x - canvas_rect.min.x, pos.y - canvas_rect.min.y);

        ctx.input(|input| {
            let mut events = Vec::new();
            let hover = input.pointer.hover_pos();

            if input.pointer.button_pressed(PointerButton::Primary) {
                if let Some(pos) = hover.filter(|pos| canvas_rect.contains(*pos)) {
                    self.gesture_active = true;
                    events.push(PointerEvent::Down(to_local(pos)));
                }
            } else if self.gesture_active {
                // A release in the same frame the pointer leaves still counts as a release.
                if input.pointer.button_released(PointerButton::Primary) {
                    self.gesture_active = false;
                    let pos = hover.or(self.last_pointer_pos).unwrap_or(canvas_rect.min);
                    events.push(PointerEvent::Up(to_local(pos)));
                } else {
                    match hover {
                        Some(pos) if Some(pos) != self.last_pointer_pos => {
                            events.push(PointerEvent::Move(to_local(pos)));
                        }
                        Some(_) => {}
                        None => {
                            self.gesture_active = false;
                            events.push(PointerEvent::Cancel);
                        }
                    }
                }
            }

            self.last_pointer_pos = hover;
            events
        })
    }
}
