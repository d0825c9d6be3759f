use std::io::Cursor;

use egui::{Color32, Pos2};
use futures::future::{BoxFuture, FutureExt};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::RasterizeError;
use crate::stroke::StrokeRef;
use crate::style::RasterConfig;

/// Encoding of a stored snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SnapshotFormat {
    #[default]
    Png,
}

impl SnapshotFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SnapshotFormat::Png => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            SnapshotFormat::Png => "image/png",
        }
    }
}

/// Encoded raster image of a finished drawing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(with = "bytes_serde")]
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: SnapshotFormat,
}

/// Stores encoded image bytes as a base64 string instead of a number array
mod bytes_serde {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        STANDARD.encode(bytes).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

/// Produces a snapshot from an ordered stroke list.
///
/// The returned future may complete later; saving waits for it before
/// committing anything.
pub trait Rasterizer {
    fn rasterize(
        &self,
        strokes: Vec<StrokeRef>,
        background: Color32,
    ) -> BoxFuture<'static, Result<Snapshot, RasterizeError>>;
}

/// CPU rasterizer writing PNG through the `image` crate
#[derive(Debug, Clone, Default)]
pub struct SoftwareRasterizer {
    config: RasterConfig,
}

impl SoftwareRasterizer {
    pub fn new(config: RasterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> RasterConfig {
        self.config
    }
}

impl Rasterizer for SoftwareRasterizer {
    #[cfg(not(target_arch = "wasm32"))]
    fn rasterize(
        &self,
        strokes: Vec<StrokeRef>,
        background: Color32,
    ) -> BoxFuture<'static, Result<Snapshot, RasterizeError>> {
        let (sender, receiver) = futures::channel::oneshot::channel();
        let config = self.config;
        std::thread::spawn(move || {
            // The receiver may be gone if the save was abandoned.
            let _ = sender.send(encode_png(&strokes, background, config));
        });
        async move {
            match receiver.await {
                Ok(result) => result,
                Err(_) => Err(RasterizeError::Cancelled),
            }
        }
        .boxed()
    }

    #[cfg(target_arch = "wasm32")]
    fn rasterize(
        &self,
        strokes: Vec<StrokeRef>,
        background: Color32,
    ) -> BoxFuture<'static, Result<Snapshot, RasterizeError>> {
        futures::future::ready(encode_png(&strokes, background, self.config)).boxed()
    }
}

/// Render strokes in order over the background and encode the result as PNG.
pub fn encode_png(
    strokes: &[StrokeRef],
    background: Color32,
    config: RasterConfig,
) -> Result<Snapshot, RasterizeError> {
    let image = render(strokes, background, config)?;

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    debug!(
        "Encoded {}x{} snapshot of {} strokes ({} bytes)",
        config.width,
        config.height,
        strokes.len(),
        bytes.len()
    );

    Ok(Snapshot {
        bytes,
        width: config.width,
        height: config.height,
        format: SnapshotFormat::Png,
    })
}

/// Paint strokes into an RGBA buffer. Erase strokes paint the background color.
pub fn render(
    strokes: &[StrokeRef],
    background: Color32,
    config: RasterConfig,
) -> Result<RgbaImage, RasterizeError> {
    let RasterConfig { width, height } = config;
    if width == 0 || height == 0 {
        return Err(RasterizeError::InvalidDimensions { width, height });
    }

    let mut image = RgbaImage::from_pixel(width, height, to_rgba(background));
    for stroke in strokes {
        let color = if stroke.is_erase() {
            to_rgba(background)
        } else {
            to_rgba(stroke.color())
        };
        let radius = stroke.width() / 2.0;

        match stroke.points() {
            [] => {}
            [dot] => stamp_disc(&mut image, *dot, radius, color),
            points => {
                for segment in points.windows(2) {
                    draw_segment(&mut image, segment[0], segment[1], radius, color);
                }
            }
        }
    }
    Ok(image)
}

fn to_rgba(color: Color32) -> Rgba<u8> {
    Rgba(color.to_srgba_unmultiplied())
}

fn draw_segment(image: &mut RgbaImage, from: Pos2, to: Pos2, radius: f32, color: Rgba<u8>) {
    let (width, height) = image.dimensions();
    let bounds = [
        -radius as f64,
        -radius as f64,
        width as f64 + radius as f64,
        height as f64 + radius as f64,
    ];
    let Some((from, to)) = clip_segment(from, to, bounds) else {
        return;
    };

    // The clipped length is bounded by the image diagonal.
    let length = from.distance(to);
    let spacing = (radius * 0.5).max(0.5);
    let steps = (length / spacing).ceil().max(1.0) as usize;

    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        stamp_disc(image, from.lerp(to, t), radius, color);
    }
}

/// Liang-Barsky clip of a segment against `[min_x, min_y, max_x, max_y]`.
///
/// Works in `f64` so far-away endpoints keep sub-pixel precision once clipped.
fn clip_segment(from: Pos2, to: Pos2, bounds: [f64; 4]) -> Option<(Pos2, Pos2)> {
    if !(from.x.is_finite() && from.y.is_finite() && to.x.is_finite() && to.y.is_finite()) {
        return None;
    }
    let [min_x, min_y, max_x, max_y] = bounds;
    let (x0, y0) = (from.x as f64, from.y as f64);
    let (dx, dy) = (to.x as f64 - x0, to.y as f64 - y0);

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [(-dx, x0 - min_x), (dx, max_x - x0), (-dy, y0 - min_y), (dy, max_y - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| Pos2::new((x0 + dx * t) as f32, (y0 + dy * t) as f32);
    Some((at(t0), at(t1)))
}

fn stamp_disc(image: &mut RgbaImage, center: Pos2, radius: f32, color: Rgba<u8>) {
    if !center.x.is_finite() || !center.y.is_finite() {
        return;
    }
    let (width, height) = image.dimensions();
    let min_x = (center.x - radius).floor().max(0.0) as u32;
    let min_y = (center.y - radius).floor().max(0.0) as u32;
    let max_x = (center.x + radius).ceil().min(width as f32 - 1.0);
    let max_y = (center.y + radius).ceil().min(height as f32 - 1.0);
    if max_x < 0.0 || max_y < 0.0 {
        return;
    }
    let radius_sq = radius * radius;

    for y in min_y..=max_y as u32 {
        for x in min_x..=max_x as u32 {
            let dx = x as f32 + 0.5 - center.x;
            let dy = y as f32 + 0.5 - center.y;
            // The pixel under the center is always covered so thin strokes stay visible.
            let contains_center = dx.abs() <= 0.5 && dy.abs() <= 0.5;
            if contains_center || dx * dx + dy * dy <= radius_sq {
                image.put_pixel(x, y, color);
            }
        }
    }
}
