use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, Canvas, ColorF};
use crate::foundation::error::{InkError, InkResult};
use crate::foundation::math::{mul_div255_u8, unpremul_u8};
use crate::model::layer::Layer;
use crate::render::compositor::{CommandList, ink_points};
use crate::render::geometry::InkGeometry;
use crate::render::style::{InkStyle, StyleKey, resolve_color};

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha copy of the pixel data.
    pub fn to_straight(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = px[3];
            px[0] = unpremul_u8(px[0], a);
            px[1] = unpremul_u8(px[1], a);
            px[2] = unpremul_u8(px[2], a);
        }
        out
    }

    /// Return `true` if every pixel is fully transparent.
    pub fn is_blank(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }
}

/// Options for [`CpuRasterizer`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuRasterizerOpts {
    pub(crate) clear_rgba: Option<[u8; 4]>,
}

impl CpuRasterizerOpts {
    /// Return options with a straight RGBA8 background placed under every frame.
    pub fn with_clear_rgba(mut self, clear: Option<[u8; 4]>) -> Self {
        self.clear_rgba = clear;
        self
    }
}

/// CPU rasterizer for ink command lists, powered by `vello_cpu`.
///
/// Rasterizing the same `Arc<CommandList>` twice in a row returns the previous pixels.
pub struct CpuRasterizer {
    opts: CpuRasterizerOpts,
    ctx: Option<vello_cpu::RenderContext>,
    last: Option<(Arc<CommandList>, FrameRGBA)>,
}

impl Default for CpuRasterizer {
    fn default() -> Self {
        Self::new(CpuRasterizerOpts::default())
    }
}

impl CpuRasterizer {
    /// Create a rasterizer.
    pub fn new(opts: CpuRasterizerOpts) -> Self {
        Self {
            opts,
            ctx: None,
            last: None,
        }
    }

    /// Rasterize a recorded command list.
    pub fn rasterize(&mut self, list: &Arc<CommandList>) -> InkResult<FrameRGBA> {
        if let Some((prev, frame)) = &self.last
            && Arc::ptr_eq(prev, list)
        {
            return Ok(frame.clone());
        }

        let (w, h) = list.canvas.validate()?;
        let frame = self.with_ctx_mut(w, h, |ctx| {
            if list.clear.a > 0.0 {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(color_to_cpu(list.clear));
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(w),
                    f64::from(h),
                ));
            }
            for draw in &list.draws {
                fill_ink(
                    ctx,
                    &draw.geometry.outline(&draw.style),
                    draw.brush.color,
                    Affine::IDENTITY,
                );
            }
            Ok(())
        })?;

        self.last = Some((Arc::clone(list), frame.clone()));
        Ok(frame)
    }

    /// Rasterize fully revealed layers in iteration order, each isolated at its own opacity.
    ///
    /// Callers pass layers bottom-most first. `transform` maps canvas space into `size`.
    pub fn rasterize_layers<'a>(
        &mut self,
        size: Canvas,
        layers: impl IntoIterator<Item = &'a Layer>,
        transform: Affine,
    ) -> InkResult<FrameRGBA> {
        let (w, h) = size.validate()?;
        self.with_ctx_mut(w, h, |ctx| {
            for layer in layers {
                let opacity = layer.opacity() as f32;
                if opacity <= 0.0 {
                    continue;
                }
                if opacity < 1.0 {
                    ctx.push_opacity_layer(opacity);
                }
                for stroke in &layer.strokes {
                    let count = stroke.reveal_point_count();
                    let points = ink_points(stroke, 0..count, 100.0);
                    let geometry = InkGeometry::build(&points)?;
                    let style = InkStyle::build(&StyleKey::from_attributes(stroke.attributes()))?;
                    let color = resolve_color(stroke.attributes(), 1.0);
                    fill_ink(ctx, &geometry.outline(&style), color, transform);
                }
                if opacity < 1.0 {
                    ctx.pop_layer();
                }
            }
            Ok(())
        })
    }

    fn with_ctx_mut(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> InkResult<()>,
    ) -> InkResult<FrameRGBA> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        f(&mut ctx)?;
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        let mut data = pixmap.data_as_u8_slice().to_vec();
        if let Some(bg) = self.opts.clear_rgba {
            fill_under(&mut data, bg);
        }
        let expected = usize::from(width) * usize::from(height) * 4;
        if data.len() != expected {
            return Err(InkError::resource("rasterized pixmap byte len mismatch"));
        }
        Ok(FrameRGBA {
            width: u32::from(width),
            height: u32::from(height),
            data,
            premultiplied: true,
        })
    }
}

fn fill_ink(ctx: &mut vello_cpu::RenderContext, outline: &BezPath, color: ColorF, tr: Affine) {
    if outline.elements().is_empty() || color.a <= 0.0 {
        return;
    }
    ctx.set_transform(affine_to_cpu(tr));
    ctx.set_paint(color_to_cpu(color));
    ctx.fill_path(&bezpath_to_cpu(outline));
}

/// Composite a straight RGBA8 background under premultiplied pixels.
fn fill_under(data: &mut [u8], bg: [u8; 4]) {
    let [r, g, b, a] = bg;
    let bg_a = u16::from(a);
    let bg_premul = [
        mul_div255_u8(u16::from(r), bg_a),
        mul_div255_u8(u16::from(g), bg_a),
        mul_div255_u8(u16::from(b), bg_a),
        a,
    ];
    for px in data.chunks_exact_mut(4) {
        let inv = 255 - u16::from(px[3]);
        for (c, bgc) in px.iter_mut().zip(bg_premul) {
            *c = c.saturating_add(mul_div255_u8(u16::from(bgc), inv));
        }
    }
}

fn color_to_cpu(c: ColorF) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::new([c.r, c.g, c.b, c.a.clamp(0.0, 1.0)])
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
