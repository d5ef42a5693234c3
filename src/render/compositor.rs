use std::sync::Arc;

use crate::foundation::core::{Canvas, ColorF};
use crate::foundation::error::InkResult;
use crate::model::layer::Layer;
use crate::model::stroke::Stroke;
use crate::render::cache::{ResourceCache, ResourceCacheStats};
use crate::render::geometry::{GeometryKey, InkGeometry, InkPoint};
use crate::render::reveal::RevealWindow;
use crate::render::style::{InkStyle, SolidBrush, StyleKey, resolve_color};

/// Immutable, ordered layer list as handed to the compositor (index 0 is the topmost layer).
pub type LayerList = Arc<[Layer]>;

/// Animation values resolved by the host for one output frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameParams {
    /// Stroke thickness in percent.
    pub thickness: f64,
    /// Revealed length in percent.
    pub length_pct: f64,
    /// Reveal offset in percent.
    pub offset_pct: f64,
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            thickness: 100.0,
            length_pct: 100.0,
            offset_pct: 0.0,
        }
    }
}

/// One ink draw call.
#[derive(Clone, Debug)]
pub struct DrawInk {
    /// Shared ink geometry.
    pub geometry: Arc<InkGeometry>,
    /// Shared ink style.
    pub style: Arc<InkStyle>,
    /// Shared solid brush.
    pub brush: Arc<SolidBrush>,
}

/// Recorded offscreen target: a transparent clear followed by ink draws, bottom-most first.
#[derive(Clone, Debug)]
pub struct CommandList {
    /// Target size.
    pub canvas: Canvas,
    /// Clear color (transparent).
    pub clear: ColorF,
    /// Draw calls in painter's order.
    pub draws: Vec<DrawInk>,
}

impl CommandList {
    fn open(canvas: Canvas) -> Self {
        Self {
            canvas,
            clear: ColorF {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 0.0,
            },
            draws: Vec::new(),
        }
    }
}

/// Inputs that determine a composite frame. Equal snapshots produce identical command lists.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSnapshot {
    /// Target size.
    pub canvas: Canvas,
    /// Thickness in percent.
    pub thickness: f64,
    /// Layers in stack order.
    pub layers: LayerList,
    /// Editing passthrough flag.
    pub editing: bool,
    /// Reveal window derived from length/offset.
    pub window: RevealWindow,
}

/// Compositor options.
#[derive(Clone, Copy, Debug)]
pub struct CompositorOpts {
    /// Reuse the previous command list when the snapshot is unchanged.
    pub memoize: bool,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self { memoize: true }
    }
}

/// Compositor counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompositorStats {
    /// Frames whose command list was rebuilt.
    pub frames_built: u64,
    /// Frames served from the memoized command list.
    pub frames_reused: u64,
    /// Ink geometry cache counters.
    pub geometry: ResourceCacheStats,
    /// Ink style cache counters.
    pub styles: ResourceCacheStats,
    /// Brush cache counters.
    pub brushes: ResourceCacheStats,
}

/// Total reveal points of all visible strokes.
pub fn total_visible_points(layers: &[Layer]) -> usize {
    layers
        .iter()
        .filter(|l| l.visible)
        .map(Layer::reveal_point_count)
        .sum()
}

/// Converts layer stacks into memoized, cache-backed ink command lists.
pub struct FrameCompositor {
    opts: CompositorOpts,
    geometries: ResourceCache<GeometryKey, Arc<InkGeometry>>,
    styles: ResourceCache<StyleKey, Arc<InkStyle>>,
    brushes: ResourceCache<ColorF, Arc<SolidBrush>>,
    last: Option<(RenderSnapshot, Arc<CommandList>)>,
    frames_built: u64,
    frames_reused: u64,
}

impl Default for FrameCompositor {
    fn default() -> Self {
        Self::new(CompositorOpts::default())
    }
}

impl FrameCompositor {
    /// Create a compositor with empty caches.
    pub fn new(opts: CompositorOpts) -> Self {
        Self {
            opts,
            geometries: ResourceCache::new("ink-geometry"),
            styles: ResourceCache::new("ink-style"),
            brushes: ResourceCache::new("brush"),
            last: None,
            frames_built: 0,
            frames_reused: 0,
        }
    }

    /// Build the snapshot for the given inputs without rendering.
    pub fn snapshot(
        canvas: Canvas,
        layers: &LayerList,
        params: FrameParams,
        editing: bool,
    ) -> RenderSnapshot {
        let total = total_visible_points(layers);
        RenderSnapshot {
            canvas,
            thickness: params.thickness,
            layers: Arc::clone(layers),
            editing,
            window: RevealWindow::from_percentages(total, params.offset_pct, params.length_pct),
        }
    }

    /// Produce the command list for one frame.
    ///
    /// Returns the previous list unchanged when the snapshot equals the last one. A resource
    /// construction failure aborts the frame and leaves the memoized state untouched.
    #[tracing::instrument(skip(self, layers), fields(layers = layers.len()))]
    pub fn compose(
        &mut self,
        canvas: Canvas,
        layers: &LayerList,
        params: FrameParams,
        editing: bool,
    ) -> InkResult<Arc<CommandList>> {
        let snapshot = Self::snapshot(canvas, layers, params, editing);

        if self.opts.memoize
            && let Some((prev, list)) = &self.last
            && *prev == snapshot
        {
            self.frames_reused = self.frames_reused.saturating_add(1);
            tracing::debug!("snapshot unchanged; reusing command list");
            return Ok(Arc::clone(list));
        }

        self.geometries.begin_frame();
        self.styles.begin_frame();
        self.brushes.begin_frame();

        let mut list = CommandList::open(canvas);
        if !snapshot.editing {
            self.record_layers(&snapshot, &mut list)?;
        }

        let swept =
            self.geometries.end_frame() + self.styles.end_frame() + self.brushes.end_frame();
        tracing::debug!(
            draws = list.draws.len(),
            point_from = snapshot.window.point_from,
            point_length = snapshot.window.point_length,
            swept,
            "rebuilt command list"
        );

        let list = Arc::new(list);
        self.last = Some((snapshot, Arc::clone(&list)));
        self.frames_built = self.frames_built.saturating_add(1);
        Ok(list)
    }

    fn record_layers(&mut self, snapshot: &RenderSnapshot, list: &mut CommandList) -> InkResult<()> {
        let mut cursor = snapshot.window.cursor();
        for layer in snapshot.layers.iter().rev().filter(|l| l.visible) {
            for stroke in &layer.strokes {
                let count = stroke.reveal_point_count();
                let Some(range) = cursor.advance(count) else {
                    continue;
                };
                // Partial slices below two points would draw a degenerate sub-stroke.
                if range.len() < 2 && count != 1 {
                    tracing::trace!(count, revealed = range.len(), "skipping sliver");
                    continue;
                }
                let points = ink_points(stroke, range, snapshot.thickness);
                let draw = self.resources_for(stroke, layer.opacity(), points)?;
                list.draws.push(draw);
            }
        }
        Ok(())
    }

    fn resources_for(
        &mut self,
        stroke: &Stroke,
        layer_opacity: f64,
        points: Vec<InkPoint>,
    ) -> InkResult<DrawInk> {
        let attrs = stroke.attributes();
        let geometry = self
            .geometries
            .get_or_create(GeometryKey::new(points), |k| {
                InkGeometry::build(k.points()).map(Arc::new)
            })?;
        let style = self
            .styles
            .get_or_create(StyleKey::from_attributes(attrs), |k| {
                InkStyle::build(k).map(Arc::new)
            })?;
        let brush = self
            .brushes
            .get_or_create(resolve_color(attrs, layer_opacity), |c| {
                SolidBrush::build(c).map(Arc::new)
            })?;
        Ok(DrawInk {
            geometry,
            style,
            brush,
        })
    }

    /// The memoized snapshot, if any.
    pub fn last_snapshot(&self) -> Option<&RenderSnapshot> {
        self.last.as_ref().map(|(s, _)| s)
    }

    /// Forget the memoized frame so the next call rebuilds.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Counters for frames and caches.
    pub fn stats(&self) -> CompositorStats {
        CompositorStats {
            frames_built: self.frames_built,
            frames_reused: self.frames_reused,
            geometry: self.geometries.stats(),
            styles: self.styles.stats(),
            brushes: self.brushes.stats(),
        }
    }
}

/// Ink points for the revealed `range` of a stroke's reveal points.
pub(crate) fn ink_points(
    stroke: &Stroke,
    range: std::ops::Range<usize>,
    thickness: f64,
) -> Vec<InkPoint> {
    let width = stroke.attributes().width;
    let scale = thickness / 100.0;
    stroke.reveal_points()[range]
        .iter()
        .map(|p| InkPoint {
            x: p.x,
            y: p.y,
            radius: (width * f64::from(stroke.pressure_factor(p)) * scale) as f32,
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
