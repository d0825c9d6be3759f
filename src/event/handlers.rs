use crate::event::{EventHandler, SketchEvent};

/// Asks egui for a new frame whenever the sketchbook changes
#[derive(Debug)]
pub struct RepaintHandler {
    ctx: egui::Context,
}

impl RepaintHandler {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl EventHandler for RepaintHandler {
    fn handle_event(&mut self, _event: &SketchEvent) {
        self.ctx.request_repaint();
    }
}
