mod persistence;
mod repository;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::raster::Snapshot;
use crate::stroke::Stroke;

pub use persistence::{GalleryPersistence, PersistenceError, PersistenceResult};
pub use repository::DrawingRepository;

/// Opaque, never reused identifier of a saved drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrawingId(Uuid);

impl DrawingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DrawingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DrawingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A finished work: frozen strokes plus the snapshot rendered from them.
///
/// Drawings are never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    id: DrawingId,
    name: String,
    /// Name as requested by the user, before any collision suffix
    base_name: String,
    strokes: Vec<Stroke>,
    snapshot: Snapshot,
    /// Seconds since the UNIX epoch
    created_at: u64,
}

impl Drawing {
    pub(crate) fn new(
        name: String,
        base_name: String,
        strokes: Vec<Stroke>,
        snapshot: Snapshot,
        created_at: u64,
    ) -> Self {
        Self {
            id: DrawingId::new(),
            name,
            base_name,
            strokes,
            snapshot,
            created_at,
        }
    }

    pub fn id(&self) -> DrawingId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }
}
