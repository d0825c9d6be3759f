use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Drawing, DrawingRepository};

const GALLERY_FILE: &str = "gallery.json";

/// Errors that can occur during gallery persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize gallery: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to write gallery: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("Failed to read gallery file: {0}")]
    ReadError(String),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// On-disk form of the gallery
#[derive(Debug, Serialize, Deserialize)]
struct GalleryFile {
    /// Version of the application that wrote the file
    version: String,
    drawings: Vec<Drawing>,
}

/// Stores the drawing repository as JSON in a directory
#[derive(Debug, Clone)]
pub struct GalleryPersistence {
    dir: PathBuf,
}

impl GalleryPersistence {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn file_path(&self) -> PathBuf {
        self.dir.join(GALLERY_FILE)
    }

    /// Write every drawing, in order, replacing any earlier file
    pub fn save(&self, repository: &DrawingRepository) -> PersistenceResult<()> {
        let file = GalleryFile {
            version: env!("CARGO_PKG_VERSION").to_string(),
            drawings: repository.iter().cloned().collect(),
        };

        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string(&file)?;
        write_atomic(&self.file_path(), json.as_bytes())?;

        info!("Stored {} drawings in {}", repository.len(), self.file_path().display());
        Ok(())
    }

    /// Read the stored gallery. A missing file yields an empty repository.
    pub fn load(&self) -> PersistenceResult<DrawingRepository> {
        let json = match fs::read_to_string(self.file_path()) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(DrawingRepository::new()),
            Err(e) => return Err(PersistenceError::ReadError(e.to_string())),
        };

        let file: GalleryFile = serde_json::from_str(&json)?;
        if file.version != env!("CARGO_PKG_VERSION") {
            warn!(
                "Gallery version {} differs from current version {}",
                file.version,
                env!("CARGO_PKG_VERSION")
            );
        }
        Ok(DrawingRepository::from_drawings(file.drawings))
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}
