#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod canvas;
pub mod error;
pub mod event;
pub mod export;
pub mod gallery;
pub mod history;
pub mod input;
pub mod raster;
pub mod renderer;
pub mod session;
pub mod stroke;
pub mod style;
pub mod thumbnails;
pub mod tools;
pub mod util;

/// Application id, also used for the storage directory
pub const APP_NAME: &str = "eframe_sketchbook";

pub use app::SketchbookApp;
pub use canvas::CanvasState;
pub use error::{ExportError, RasterizeError, SaveError};
pub use export::{DownloadSink, ExportService, FileSink, MemorySink};
#[cfg(target_arch = "wasm32")]
pub use export::BrowserDownloadSink;
pub use gallery::{Drawing, DrawingId, DrawingRepository, GalleryPersistence};
pub use history::HistoryStack;
pub use input::{InputHandler, PointerEvent};
pub use raster::{Rasterizer, Snapshot, SnapshotFormat, SoftwareRasterizer};
pub use renderer::Renderer;
pub use session::{PendingSave, Sketchbook};
pub use stroke::{Stroke, StrokeMode, StrokeRef};
pub use style::{RasterConfig, StrokeStyle};
pub use tools::{StrokeCapture, capture_gesture};
