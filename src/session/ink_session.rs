use std::sync::Arc;

use crate::animation::anim::SampleCtx;
use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange};
use crate::foundation::error::{InkError, InkResult};
use crate::io::document::InkShape;
use crate::render::compositor::{
    CommandList, CompositorOpts, CompositorStats, FrameCompositor, FrameParams, LayerList,
};
use crate::render::cpu::{CpuRasterizer, CpuRasterizerOpts, FrameRGBA};
use crate::session::sink::{FrameSink, SinkConfig};

/// Options for [`InkSession`].
#[derive(Clone, Copy, Debug)]
pub struct InkSessionOpts {
    /// Output size.
    pub canvas: Canvas,
    /// Timeline frame rate.
    pub fps: Fps,
    /// Clip length in frames; animated parameters are sampled against it.
    pub duration: u64,
    /// Compositor behaviour.
    pub compositor: CompositorOpts,
    /// Rasterizer behaviour (background color).
    pub raster: CpuRasterizerOpts,
}

impl Default for InkSessionOpts {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1920,
                height: 1080,
            },
            fps: Fps { num: 30, den: 1 },
            duration: 150,
            compositor: CompositorOpts::default(),
            raster: CpuRasterizerOpts::default(),
        }
    }
}

/// Range render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames in the requested range.
    pub frames_total: u64,
    /// Frames rasterized from a new command list.
    pub frames_rendered: u64,
    /// Frames whose command list was reused from the previous frame.
    pub frames_reused: u64,
}

/// Per-frame renderer for one ink shape.
///
/// Holds the compositor caches and the rasterizer across frames, so consecutive frames with equal
/// inputs cost one comparison.
pub struct InkSession {
    shape: InkShape,
    layers: LayerList,
    opts: InkSessionOpts,
    compositor: FrameCompositor,
    raster: CpuRasterizer,
}

impl InkSession {
    /// Validate `shape` and the output settings and set up a session.
    pub fn new(shape: InkShape, opts: InkSessionOpts) -> InkResult<Self> {
        shape.validate()?;
        opts.canvas.validate()?;
        Fps::new(opts.fps.num, opts.fps.den)?;
        if opts.duration == 0 {
            return Err(InkError::validation("session duration must be > 0 frames"));
        }
        let layers = shape.layer_list();
        Ok(Self {
            shape,
            layers,
            opts,
            compositor: FrameCompositor::new(opts.compositor),
            raster: CpuRasterizer::new(opts.raster),
        })
    }

    /// Rendered shape.
    pub fn shape(&self) -> &InkShape {
        &self.shape
    }

    /// Session options.
    pub fn opts(&self) -> &InkSessionOpts {
        &self.opts
    }

    /// Replace the layer stack, e.g. after an edit.
    pub fn set_layers(&mut self, layers: LayerList) {
        self.shape.layers = layers.to_vec();
        self.layers = layers;
    }

    /// Toggle live-edit passthrough.
    pub fn set_editing(&mut self, editing: bool) {
        self.shape.editing = editing;
    }

    /// Sampling context for `frame`.
    pub fn sample_ctx(&self, frame: FrameIndex) -> SampleCtx {
        SampleCtx {
            frame,
            duration: self.opts.duration,
        }
    }

    /// Reveal parameters at `frame`.
    pub fn frame_params(&self, frame: FrameIndex) -> InkResult<FrameParams> {
        self.shape.frame_params(self.sample_ctx(frame))
    }

    /// Command list for `frame`, shared with the previous frame when nothing changed.
    pub fn compose(&mut self, frame: FrameIndex) -> InkResult<Arc<CommandList>> {
        let params = self.frame_params(frame)?;
        self.compositor
            .compose(self.opts.canvas, &self.layers, params, self.shape.editing)
    }

    /// Render one frame to premultiplied RGBA8.
    pub fn render_frame(&mut self, frame: FrameIndex) -> InkResult<FrameRGBA> {
        let list = self.compose(frame)?;
        self.raster.rasterize(&list)
    }

    /// Render a frame range and stream frames into a sink in increasing order.
    #[tracing::instrument(skip(self, sink), fields(start = range.start.0, end = range.end.0))]
    pub fn render_range(
        &mut self,
        range: FrameRange,
        sink: &mut dyn FrameSink,
    ) -> InkResult<RenderStats> {
        if range.is_empty() {
            return Err(InkError::validation("render_range range must be non-empty"));
        }
        let (width, height) = self.opts.canvas.validate()?;
        sink.begin(SinkConfig {
            width: u32::from(width),
            height: u32::from(height),
            fps: self.opts.fps,
        })?;

        let mut stats = RenderStats {
            frames_total: range.len_frames(),
            ..RenderStats::default()
        };
        let mut prev: Option<Arc<CommandList>> = None;
        for idx in range.frames() {
            let list = self.compose(idx)?;
            if prev.as_ref().is_some_and(|p| Arc::ptr_eq(p, &list)) {
                stats.frames_reused += 1;
            } else {
                stats.frames_rendered += 1;
            }
            let frame = self.raster.rasterize(&list)?;
            sink.push_frame(idx, &frame)?;
            prev = Some(list);
        }
        sink.end()?;

        tracing::debug!(
            frames = stats.frames_total,
            reused = stats.frames_reused,
            fps = self.opts.fps.as_f64(),
            "range rendered"
        );
        Ok(stats)
    }

    /// Compositor counters.
    pub fn stats(&self) -> CompositorStats {
        self.compositor.stats()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/ink_session.rs"]
mod tests;
