//! Inkstack is a layered ink engine for animated pen drawings.
//!
//! Strokes live on an ordered stack of layers. Each output frame is composited from a partial
//! reveal of those strokes, driven by animated thickness, length and offset parameters:
//!
//! - Load an [`InkShape`] (layers plus reveal parameters)
//! - Create an [`InkSession`] and render single frames or stream a range into a [`FrameSink`]
//! - Edit layers and strokes through an [`Editor`] with full undo/redo
//!
//! Rendering goes through a mark-and-sweep [`ResourceCache`] per resource kind and a memoized
//! [`FrameCompositor`], so unchanged frames reuse the previous command list.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod edit;
pub(crate) mod io;
pub(crate) mod model;
pub(crate) mod render;
pub(crate) mod session;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, ColorF, Fps, FrameIndex, FrameRange, Point, Rgba8, Vec2,
};
pub use crate::foundation::error::{InkError, InkResult};

pub use crate::animation::anim::{Anim, InterpMode, Keyframe, Keyframes, Lerp, SampleCtx};
pub use crate::animation::ease::Ease;
pub use crate::animation::param::{PARAM_LARGE, Param};

pub use crate::model::layer::Layer;
pub use crate::model::stroke::{
    DEFAULT_PRESSURE, DrawingAttributes, MAX_NIB_SIZE, Stroke, StylusPoint, StylusTip,
};

pub use crate::render::cache::{ResourceCache, ResourceCacheStats};
pub use crate::render::compositor::{
    CommandList, CompositorOpts, CompositorStats, DrawInk, FrameCompositor, FrameParams,
    LayerList, RenderSnapshot, total_visible_points,
};
pub use crate::render::cpu::{CpuRasterizer, CpuRasterizerOpts, FrameRGBA};
pub use crate::render::export::{
    DEFAULT_THUMBNAIL, ThumbnailOpts, fit_transform, render_snapshot, render_thumbnail, write_png,
};
pub use crate::render::geometry::{GeometryKey, InkGeometry, InkPoint, InkSegment};
pub use crate::render::reveal::{RevealCursor, RevealWindow};
pub use crate::render::style::{InkStyle, NibShape, SolidBrush, StyleKey, resolve_color};

pub use crate::io::document::{DOCUMENT_FORMAT_VERSION, InkShape};
pub use crate::io::settings::{
    BrushKind, BrushPreset, EraserMode, EraserPreset, MIN_THICKNESS, MouseWheelAction,
    PanelLayout, Settings, ToolbarLayout,
};
pub use crate::io::strokes::{STROKES_FORMAT_VERSION, StrokeFile};

pub use crate::edit::aggregate::{
    AggregatedView, DisplayStroke, EditedStroke, StrokeDiff, StrokeKey,
};
pub use crate::edit::editor::{EditOutcome, EditingMode, Editor, EditorEvent, EditorOpts};
pub use crate::edit::history::{AddedStrokes, Command, History, LayerProperty, RemovedStrokes};
pub use crate::edit::stack::{DEFAULT_LAYER_PREFIX, LayerId, LayerStack, default_name};

pub use crate::session::ink_session::{InkSession, InkSessionOpts, RenderStats};
pub use crate::session::sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig};
