use std::sync::Arc;
use std::task::{Context as TaskContext, Poll, Wake, Waker};

use eframe::egui;
use futures::FutureExt as _;
use futures::future::BoxFuture;
use log::{error, warn};

use crate::error::{ExportError, RasterizeError};
use crate::event::RepaintHandler;
use crate::export::{DownloadSink, ExportService};
use crate::gallery::{DrawingId, GalleryPersistence};
use crate::input::InputHandler;
use crate::raster::{Rasterizer, Snapshot, SoftwareRasterizer};
use crate::renderer::Renderer;
use crate::session::{PendingSave, Sketchbook};
use crate::style::{RasterConfig, StrokeStyle};
use crate::thumbnails::ThumbnailCache;

type SnapshotFuture = BoxFuture<'static, Result<Snapshot, RasterizeError>>;

/// Wakes the UI when the rasterizer finishes, so nothing polls between frames
struct RepaintWaker {
    ctx: egui::Context,
}

impl Wake for RepaintWaker {
    fn wake(self: Arc<Self>) {
        self.ctx.request_repaint();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.ctx.request_repaint();
    }
}

fn repaint_waker(ctx: &egui::Context) -> Waker {
    Waker::from(Arc::new(RepaintWaker { ctx: ctx.clone() }))
}

/// Settings restored across restarts
#[derive(serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(default)]
struct AppSettings {
    style: StrokeStyle,
    raster: RasterConfig,
}

/// The drawing-tool shell: tool panel, canvas and gallery around a [`Sketchbook`].
pub struct SketchbookApp {
    settings: AppSettings,
    sketchbook: Sketchbook,
    input: InputHandler,
    renderer: Renderer,
    rasterizer: SoftwareRasterizer,
    export: ExportService,
    sink: Option<Box<dyn DownloadSink>>,
    persistence: Option<GalleryPersistence>,
    thumbnails: ThumbnailCache,
    drawing_name: String,
    pending_save: Option<(PendingSave, SnapshotFuture)>,
    status: Option<String>,
}

impl SketchbookApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings: AppSettings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let persistence = gallery_dir().map(GalleryPersistence::new);
        let drawings = match &persistence {
            Some(persistence) => persistence.load().unwrap_or_else(|e| {
                error!("Failed to load gallery: {}", e);
                Default::default()
            }),
            None => Default::default(),
        };

        let sketchbook = Sketchbook::with_drawings(drawings);
        sketchbook
            .event_bus()
            .subscribe(Box::new(RepaintHandler::new(cc.egui_ctx.clone())));

        Self {
            rasterizer: SoftwareRasterizer::new(settings.raster),
            settings,
            sketchbook,
            input: InputHandler::new(),
            renderer: Renderer::new(),
            export: ExportService::new(),
            sink: download_sink(),
            persistence,
            thumbnails: ThumbnailCache::new(),
            drawing_name: String::new(),
            pending_save: None,
            status: None,
        }
    }

    fn store_gallery(&mut self) {
        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.save(self.sketchbook.drawings()) {
                error!("Failed to store gallery: {}", e);
                self.status = Some(format!("Could not store gallery: {e}"));
            }
        }
    }

    fn start_save(&mut self) {
        match self.sketchbook.begin_save(&self.drawing_name, &self.settings.style) {
            Ok(Some(pending)) => {
                let future = self
                    .rasterizer
                    .rasterize(pending.strokes(), self.settings.style.background_color);
                self.pending_save = Some((pending, future));
            }
            Ok(None) => self.status = Some("Nothing to save yet".to_owned()),
            Err(e) => warn!("{}", e),
        }
    }

    /// Drive the rasterizer without blocking the frame
    fn poll_save(&mut self, ctx: &egui::Context) {
        let Some((_, future)) = &mut self.pending_save else {
            return;
        };
        let waker = repaint_waker(ctx);
        let mut task_cx = TaskContext::from_waker(&waker);
        let Poll::Ready(result) = future.poll_unpin(&mut task_cx) else {
            return;
        };
        let Some((pending, _)) = self.pending_save.take() else {
            return;
        };

        match self.sketchbook.finish_save(pending, result) {
            Ok(_) => {
                self.drawing_name.clear();
                self.status = None;
                self.store_gallery();
            }
            Err(e) => self.status = Some(format!("Save failed: {e}")),
        }
    }

    fn tools_panel(&mut self, ui: &mut egui::Ui) {
        let style = &mut self.settings.style;
        ui.heading("Tools");
        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Color:");
            egui::color_picker::color_edit_button_srgba(
                ui,
                &mut style.stroke_color,
                egui::color_picker::Alpha::Opaque,
            );
        });
        ui.horizontal(|ui| {
            ui.label("Background:");
            egui::color_picker::color_edit_button_srgba(
                ui,
                &mut style.background_color,
                egui::color_picker::Alpha::Opaque,
            );
        });
        ui.add(egui::Slider::new(&mut style.stroke_width, 1.0..=50.0).text("Brush"));
        ui.add(egui::Slider::new(&mut style.eraser_width, 1.0..=100.0).text("Eraser"));
        ui.checkbox(&mut style.erase_mode, "Erase");

        ui.separator();
        ui.horizontal(|ui| {
            if ui.add_enabled(self.sketchbook.can_undo(), egui::Button::new("Undo")).clicked() {
                self.sketchbook.undo();
            }
            if ui.add_enabled(self.sketchbook.can_redo(), egui::Button::new("Redo")).clicked() {
                self.sketchbook.redo();
            }
            if ui
                .add_enabled(!self.sketchbook.is_save_pending(), egui::Button::new("Clear"))
                .clicked()
            {
                self.sketchbook.clear_canvas();
            }
        });

        ui.separator();
        ui.label("Name:");
        ui.text_edit_singleline(&mut self.drawing_name);
        let can_save = !self.sketchbook.is_save_pending() && !self.sketchbook.canvas().is_empty();
        if ui.add_enabled(can_save, egui::Button::new("Save")).clicked() {
            self.start_save();
        }
        if self.sketchbook.is_save_pending() {
            ui.spinner();
        }
        if let Some(status) = &self.status {
            ui.label(status);
        }
    }

    fn gallery_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Gallery");
        ui.separator();

        let ctx = ui.ctx().clone();
        let mut to_load: Option<DrawingId> = None;
        let mut to_delete: Option<DrawingId> = None;
        let mut to_download: Option<DrawingId> = None;

        egui::ScrollArea::vertical().show(ui, |ui| {
            for drawing in self.sketchbook.drawings() {
                ui.group(|ui| {
                    ui.label(drawing.name());
                    match self.thumbnails.get_or_load(&ctx, drawing) {
                        Ok(texture) => {
                            ui.add(egui::Image::new(&texture).max_width(160.0));
                        }
                        Err(e) => {
                            ui.label(format!("No preview: {e}"));
                        }
                    }
                    ui.horizontal(|ui| {
                        if ui.button("Load").clicked() {
                            to_load = Some(drawing.id());
                        }
                        if ui.button("Download").clicked() {
                            to_download = Some(drawing.id());
                        }
                        if ui.button("Delete").clicked() {
                            to_delete = Some(drawing.id());
                        }
                    });
                });
            }
        });

        if let Some(id) = to_load {
            self.sketchbook.load(id);
        }
        if let Some(id) = to_download {
            let result = match &self.sink {
                Some(sink) => self.sketchbook.download(id, &self.export, sink.as_ref()),
                None => Err(ExportError::Unavailable),
            };
            if let Err(e) = result {
                error!("Download failed: {}", e);
                self.status = Some(format!("Download failed: {e}"));
            }
        }
        if let Some(id) = to_delete {
            if self.sketchbook.delete(id) {
                self.thumbnails.retain(self.sketchbook.drawings());
                self.store_gallery();
            }
        }
    }
}

impl eframe::App for SketchbookApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_save(ctx);

        egui::SidePanel::left("tools_panel").show(ctx, |ui| self.tools_panel(ui));
        egui::SidePanel::right("gallery_panel").show(ctx, |ui| self.gallery_panel(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            let raster = self.rasterizer.config();
            let size = egui::vec2(raster.width as f32, raster.height as f32);
            let (response, painter) = ui.allocate_painter(size, egui::Sense::drag());

            for event in self.input.process_input(ctx, response.rect) {
                self.sketchbook.handle_pointer(event, &self.settings.style);
            }

            let strokes = self.sketchbook.canvas().strokes().iter().map(|s| &**s);
            let preview = self.sketchbook.preview();
            self.renderer.render(
                &painter,
                response.rect,
                self.settings.style.background_color,
                strokes,
                preview.as_ref(),
            );
        });
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn gallery_dir() -> Option<std::path::PathBuf> {
    eframe::storage_dir(crate::APP_NAME)
}

#[cfg(target_arch = "wasm32")]
fn gallery_dir() -> Option<std::path::PathBuf> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
fn download_sink() -> Option<Box<dyn DownloadSink>> {
    let Some(dir) = gallery_dir() else {
        warn!("No storage directory; downloads are disabled");
        return None;
    };
    Some(Box::new(crate::export::FileSink::new(dir.join("downloads"))))
}

#[cfg(target_arch = "wasm32")]
fn download_sink() -> Option<Box<dyn DownloadSink>> {
    Some(Box::new(crate::export::BrowserDownloadSink::new()))
}
