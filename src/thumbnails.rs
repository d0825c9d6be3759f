use std::collections::HashMap;

use egui::{ColorImage, Context, TextureHandle, TextureOptions};
use thiserror::Error;

use crate::gallery::{Drawing, DrawingId};

/// Errors that can occur while turning a snapshot into a texture
#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("Failed to decode snapshot: {0}")]
    Decode(#[from] image::ImageError),
}

/// Gallery preview textures, one per saved drawing.
///
/// Drawings never change after saving, so an entry stays valid until the
/// drawing is deleted.
#[derive(Default)]
pub struct ThumbnailCache {
    textures: HashMap<DrawingId, TextureHandle>,
}

impl std::fmt::Debug for ThumbnailCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThumbnailCache")
            .field("textures", &self.textures.len())
            .finish()
    }
}

impl ThumbnailCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets or creates the texture for a drawing's snapshot
    pub fn get_or_load(&mut self, ctx: &Context, drawing: &Drawing) -> Result<TextureHandle, ThumbnailError> {
        if let Some(handle) = self.textures.get(&drawing.id()) {
            return Ok(handle.clone());
        }

        let decoded = image::load_from_memory(&drawing.snapshot().bytes)?.to_rgba8();
        let size = [decoded.width() as usize, decoded.height() as usize];
        let image = ColorImage::from_rgba_unmultiplied(size, decoded.as_raw());

        let handle = ctx.load_texture(format!("drawing_{}", drawing.id()), image, TextureOptions::LINEAR);
        self.textures.insert(drawing.id(), handle.clone());
        Ok(handle)
    }

    /// Drop textures of drawings that no longer exist
    pub fn retain<'a>(&mut self, live: impl IntoIterator<Item = &'a Drawing>) {
        let live: Vec<DrawingId> = live.into_iter().map(Drawing::id).collect();
        self.textures.retain(|id, _| live.contains(id));
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}
