use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::stroke::StrokeMode;

/// Smallest width a committed stroke may have.
pub const MIN_STROKE_WIDTH: f32 = 0.5;

/// Brush settings supplied by the UI and read when a gesture starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeStyle {
    pub stroke_width: f32,
    pub eraser_width: f32,
    pub stroke_color: Color32,
    pub background_color: Color32,
    /// When set, new strokes are erase strokes drawn with `eraser_width`.
    pub erase_mode: bool,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            stroke_width: 5.0,
            eraser_width: 20.0,
            stroke_color: Color32::BLACK,
            background_color: Color32::WHITE,
            erase_mode: false,
        }
    }
}

impl StrokeStyle {
    pub fn mode(&self) -> StrokeMode {
        if self.erase_mode {
            StrokeMode::Erase
        } else {
            StrokeMode::Draw
        }
    }

    /// Width actually drawn for the current mode.
    pub fn effective_width(&self) -> f32 {
        let width = match self.mode() {
            StrokeMode::Draw => self.stroke_width,
            StrokeMode::Erase => self.eraser_width,
        };
        if width.is_finite() {
            width.max(MIN_STROKE_WIDTH)
        } else {
            MIN_STROKE_WIDTH
        }
    }
}

/// Pixel dimensions of rasterized snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}
