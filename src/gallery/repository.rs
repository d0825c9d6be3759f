use log::{debug, info, warn};

use super::{Drawing, DrawingId};
use crate::raster::Snapshot;
use crate::stroke::Stroke;
use crate::util::time;

/// Saved drawings in creation order
#[derive(Debug, Clone, Default)]
pub struct DrawingRepository {
    drawings: Vec<Drawing>,
}

impl DrawingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a repository from previously stored drawings, keeping their order.
    /// Entries repeating an earlier id are dropped.
    pub fn from_drawings(drawings: Vec<Drawing>) -> Self {
        let mut repository = Self::new();
        for drawing in drawings {
            if repository.get(drawing.id()).is_some() {
                warn!("Skipping drawing with duplicate id {}", drawing.id());
                continue;
            }
            repository.drawings.push(drawing);
        }
        repository
    }

    /// Store a finished drawing under a unique name.
    ///
    /// Returns `None` without touching the repository when `strokes` is empty.
    pub fn save(&mut self, name: &str, strokes: Vec<Stroke>, snapshot: Snapshot) -> Option<DrawingId> {
        if strokes.is_empty() {
            debug!("Ignoring save of an empty canvas");
            return None;
        }

        let (base_name, name) = self.resolve_name(name);
        let drawing = Drawing::new(name, base_name, strokes, snapshot, time::timestamp_secs());
        let id = drawing.id();
        info!(
            "Saved drawing '{}' ({}) with {} strokes",
            drawing.name(),
            id,
            drawing.strokes().len()
        );
        self.drawings.push(drawing);
        Some(id)
    }

    /// Pick the stored name for a requested one.
    ///
    /// An empty request becomes `Drawing <n+1>`. A name already in use gets a
    /// ` (k)` suffix where `k` is the number of drawings sharing the base name
    /// minus one, so the second "Sunset" is "Sunset (0)" and the third "Sunset (1)".
    /// `k` is bumped further if that name is itself taken.
    pub fn resolve_name(&self, requested: &str) -> (String, String) {
        let base = if requested.trim().is_empty() {
            format!("Drawing {}", self.drawings.len() + 1)
        } else {
            requested.to_owned()
        };

        if !self.contains_name(&base) {
            return (base.clone(), base);
        }

        let same_base = self.drawings.iter().filter(|d| d.base_name() == base).count();
        let mut k = same_base.saturating_sub(1);
        loop {
            let candidate = format!("{base} ({k})");
            if !self.contains_name(&candidate) {
                return (base, candidate);
            }
            k += 1;
        }
    }

    fn contains_name(&self, name: &str) -> bool {
        self.drawings.iter().any(|d| d.name() == name)
    }

    /// Remove a drawing. Returns `None` if no drawing has that id.
    pub fn delete(&mut self, id: DrawingId) -> Option<Drawing> {
        let Some(index) = self.drawings.iter().position(|d| d.id() == id) else {
            debug!("Delete of unknown drawing {}", id);
            return None;
        };
        let drawing = self.drawings.remove(index);
        info!("Deleted drawing '{}' ({})", drawing.name(), id);
        Some(drawing)
    }

    /// Strokes of a drawing, for copying into a fresh canvas.
    pub fn load(&self, id: DrawingId) -> Option<&[Stroke]> {
        self.get(id).map(Drawing::strokes)
    }

    pub fn get(&self, id: DrawingId) -> Option<&Drawing> {
        self.drawings.iter().find(|d| d.id() == id)
    }

    /// Drawings in creation order. Each call starts a new pass.
    pub fn iter(&self) -> std::slice::Iter<'_, Drawing> {
        self.drawings.iter()
    }

    pub fn len(&self) -> usize {
        self.drawings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawings.is_empty()
    }
}

impl<'a> IntoIterator for &'a DrawingRepository {
    type Item = &'a Drawing;
    type IntoIter = std::slice::Iter<'a, Drawing>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
