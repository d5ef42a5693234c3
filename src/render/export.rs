use std::path::Path;

use crate::foundation::core::{Affine, Canvas};
use crate::foundation::error::{InkError, InkResult};
use crate::model::layer::Layer;
use crate::render::cpu::{CpuRasterizer, FrameRGBA};

/// Default thumbnail size (16:9).
pub const DEFAULT_THUMBNAIL: Canvas = Canvas {
    width: 48,
    height: 27,
};

/// Thumbnail settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThumbnailOpts {
    /// Output size in pixels.
    pub size: Canvas,
}

impl Default for ThumbnailOpts {
    fn default() -> Self {
        Self {
            size: DEFAULT_THUMBNAIL,
        }
    }
}

impl ThumbnailOpts {
    /// Read `INKSTACK_THUMBNAIL_SIZE` (`<w>x<h>`), falling back to the default on absent or bad
    /// values.
    pub fn from_env() -> Self {
        let size = std::env::var("INKSTACK_THUMBNAIL_SIZE")
            .ok()
            .and_then(|v| parse_size(&v))
            .unwrap_or(DEFAULT_THUMBNAIL);
        Self { size }
    }
}

pub(crate) fn parse_size(s: &str) -> Option<Canvas> {
    let (w, h) = s.trim().split_once(['x', 'X'])?;
    let canvas = Canvas {
        width: w.trim().parse().ok()?,
        height: h.trim().parse().ok()?,
    };
    canvas.validate().ok()?;
    Some(canvas)
}

/// Uniform scale that fits `canvas` inside `size`, centered.
pub fn fit_transform(canvas: Canvas, size: Canvas) -> Affine {
    if canvas.width == 0 || canvas.height == 0 {
        return Affine::IDENTITY;
    }
    let sx = f64::from(size.width) / f64::from(canvas.width);
    let sy = f64::from(size.height) / f64::from(canvas.height);
    let s = sx.min(sy);
    let dx = (f64::from(size.width) - f64::from(canvas.width) * s) / 2.0;
    let dy = (f64::from(size.height) - f64::from(canvas.height) * s) / 2.0;
    Affine::translate((dx, dy)) * Affine::scale(s)
}

/// Render one layer's strokes, scaled down to a thumbnail. Visibility is ignored.
pub fn render_thumbnail(
    raster: &mut CpuRasterizer,
    canvas: Canvas,
    layer: &Layer,
    opts: ThumbnailOpts,
) -> InkResult<FrameRGBA> {
    raster.rasterize_layers(
        opts.size,
        std::iter::once(layer),
        fit_transform(canvas, opts.size),
    )
}

/// Flatten every visible layer, fully revealed, bottom-most first.
///
/// `layers` is in stack order (index 0 on top).
#[tracing::instrument(skip(raster, layers), fields(layers = layers.len()))]
pub fn render_snapshot(
    raster: &mut CpuRasterizer,
    canvas: Canvas,
    layers: &[Layer],
) -> InkResult<FrameRGBA> {
    raster.rasterize_layers(
        canvas,
        layers.iter().rev().filter(|l| l.visible),
        Affine::IDENTITY,
    )
}

/// Write a frame as a straight-alpha PNG, creating parent directories.
pub fn write_png(frame: &FrameRGBA, path: &Path) -> InkResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            InkError::io(format!("create output dir '{}': {e}", parent.display()))
        })?;
    }
    image::save_buffer_with_format(
        path,
        &frame.to_straight(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| InkError::io(format!("write png '{}': {e}", path.display())))?;
    tracing::debug!(path = %path.display(), "wrote png");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/export.rs"]
mod tests;
