use std::fs;
use std::path::PathBuf;

use log::info;
use parking_lot::Mutex;

use crate::error::ExportError;
use crate::gallery::Drawing;
use crate::raster::Snapshot;

/// Receives finished downloads, e.g. a browser save dialog or a folder on disk
pub trait DownloadSink {
    fn deliver(&self, file_name: &str, mime_type: &str, bytes: &[u8]) -> Result<(), ExportError>;
}

/// Hands out stored snapshots. Never re-renders and never looks at the live canvas.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    /// The drawing's snapshot, exactly as stored at save time
    pub fn export<'a>(&self, drawing: &'a Drawing) -> &'a Snapshot {
        drawing.snapshot()
    }

    /// `<name>.<ext>` for the drawing's snapshot format
    pub fn file_name(&self, drawing: &Drawing) -> String {
        format!("{}.{}", drawing.name(), drawing.snapshot().format.extension())
    }

    pub fn download(&self, drawing: &Drawing, sink: &dyn DownloadSink) -> Result<(), ExportError> {
        let file_name = self.file_name(drawing);
        let snapshot = self.export(drawing);
        sink.deliver(&file_name, snapshot.format.mime_type(), &snapshot.bytes)?;
        info!("Exported '{}' ({} bytes)", file_name, snapshot.bytes.len());
        Ok(())
    }
}

/// Writes downloads into a directory
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for FileSink {
    fn deliver(&self, file_name: &str, _mime_type: &str, bytes: &[u8]) -> Result<(), ExportError> {
        fs::create_dir_all(&self.dir)?;
        // Names are user supplied; keep them inside the target directory.
        let safe_name: String = file_name
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        fs::write(self.dir.join(safe_name), bytes)?;
        Ok(())
    }
}

/// A finished download kept in memory
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Collects downloads in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    downloads: Mutex<Vec<Download>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.downloads.lock().clone()
    }

    pub fn take(&self) -> Vec<Download> {
        std::mem::take(&mut *self.downloads.lock())
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&self, file_name: &str, mime_type: &str, bytes: &[u8]) -> Result<(), ExportError> {
        self.downloads.lock().push(Download {
            file_name: file_name.to_owned(),
            mime_type: mime_type.to_owned(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}

/// Triggers a browser download through a temporary object URL
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserDownloadSink;

#[cfg(target_arch = "wasm32")]
impl BrowserDownloadSink {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_arch = "wasm32")]
impl DownloadSink for BrowserDownloadSink {
    fn deliver(&self, file_name: &str, mime_type: &str, bytes: &[u8]) -> Result<(), ExportError> {
        use wasm_bindgen::JsCast as _;

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| ExportError::Browser("no document".to_owned()))?;

        let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
        let options = web_sys::BlobPropertyBag::new();
        options.set_type(mime_type);
        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(js_error)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_error)?;

        let anchor: web_sys::HtmlAnchorElement = document
            .create_element("a")
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| ExportError::Browser("created element is not an anchor".to_owned()))?;
        anchor.set_href(&url);
        anchor.set_download(file_name);
        anchor.click();

        web_sys::Url::revoke_object_url(&url).map_err(js_error)?;
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
fn js_error(value: wasm_bindgen::JsValue) -> ExportError {
    ExportError::Browser(format!("{value:?}"))
}
