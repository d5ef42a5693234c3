use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{InkError, InkResult};
use crate::model::stroke::{DrawingAttributes, MAX_NIB_SIZE, StylusTip};

/// Smallest accepted brush thickness.
pub const MIN_THICKNESS: f64 = 0.1;

/// Drawing tool selected in the editor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushKind {
    /// Smooth round pen.
    #[default]
    Pen,
    /// Translucent square-tipped marker.
    Highlighter,
    /// Round pen without curve fitting.
    Pencil,
    /// Stroke or point eraser.
    Eraser,
}

/// What the mouse wheel does over the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseWheelAction {
    /// Change the brush thickness.
    #[default]
    PenSize,
    /// Zoom the canvas.
    Zoom,
}

/// Toolbar docking position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolbarLayout {
    /// Docked at the top.
    #[default]
    Top,
    /// Docked at the bottom.
    Bottom,
    /// Docked on the left.
    Left,
    /// Docked on the right.
    Right,
}

/// Eraser behaviour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EraserMode {
    /// Erase whole strokes.
    #[default]
    Stroke,
    /// Erase only the touched points, splitting strokes.
    Point,
}

/// Preset for one drawing brush.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BrushPreset {
    /// Straight stroke color.
    pub color: Rgba8,
    thickness: f64,
    /// Use pen pressure.
    pub pressure: bool,
}

impl Default for BrushPreset {
    fn default() -> Self {
        Self::new(Rgba8::WHITE, 10.0)
    }
}

impl BrushPreset {
    /// Pressure-sensitive preset.
    pub fn new(color: Rgba8, thickness: f64) -> Self {
        let mut p = Self {
            color,
            thickness: 10.0,
            pressure: true,
        };
        p.set_thickness(thickness);
        p
    }

    /// Brush thickness, within `[MIN_THICKNESS, MAX_NIB_SIZE]`.
    pub fn thickness(&self) -> f64 {
        self.thickness.clamp(MIN_THICKNESS, MAX_NIB_SIZE)
    }

    /// Set the thickness, clamped into `[MIN_THICKNESS, MAX_NIB_SIZE]`.
    pub fn set_thickness(&mut self, thickness: f64) {
        self.thickness = if thickness.is_nan() {
            MIN_THICKNESS
        } else {
            thickness.clamp(MIN_THICKNESS, MAX_NIB_SIZE)
        };
    }
}

/// Eraser preset.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EraserPreset {
    /// Eraser size; stored like a brush so the wheel action can resize it.
    pub brush: BrushPreset,
    /// Stroke or point erasing.
    pub mode: EraserMode,
}

impl Default for EraserPreset {
    fn default() -> Self {
        Self {
            brush: BrushPreset::new(Rgba8::WHITE, 20.0),
            mode: EraserMode::Stroke,
        }
    }
}

/// Last-used placement of one floating panel.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PanelLayout {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Shown or hidden.
    pub visible: bool,
    /// Stacking order among panels.
    pub z_index: i32,
    /// Drawn translucent.
    pub translucent: bool,
    /// Kept above other windows.
    pub always_on_top: bool,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            visible: true,
            z_index: 0,
            translucent: false,
            always_on_top: false,
        }
    }
}

/// Persisted editor preferences.
///
/// Unknown or missing fields fall back to defaults so older files keep loading.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Selected drawing tool.
    pub brush: BrushKind,
    /// Mouse wheel behaviour.
    pub mouse_wheel: MouseWheelAction,
    /// Toolbar position.
    pub toolbar: ToolbarLayout,
    /// Pen preset.
    pub pen: BrushPreset,
    /// Highlighter preset.
    pub highlighter: BrushPreset,
    /// Pencil preset.
    pub pencil: BrushPreset,
    /// Eraser preset.
    pub eraser: EraserPreset,
    /// Panel placements keyed by panel name.
    pub layout: BTreeMap<String, PanelLayout>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            brush: BrushKind::Pen,
            mouse_wheel: MouseWheelAction::PenSize,
            toolbar: ToolbarLayout::Top,
            pen: BrushPreset::new(Rgba8::WHITE, 10.0),
            highlighter: BrushPreset::new(Rgba8::YELLOW, 20.0),
            pencil: BrushPreset::new(Rgba8::GRAY, 5.0),
            eraser: EraserPreset::default(),
            layout: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Parse settings JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> InkResult<Self> {
        serde_json::from_reader(r).map_err(|e| InkError::serde(format!("parse settings JSON: {e}")))
    }

    /// Load settings from `path`. A missing or unreadable file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let loaded = File::open(path)
            .map_err(|e| InkError::io(format!("open settings '{}': {e}", path.display())))
            .and_then(|f| Self::from_reader(BufReader::new(f)));
        match loaded {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(error = %e, "using default settings");
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> InkResult<()> {
        let path = path.as_ref();
        let f = File::create(path)
            .map_err(|e| InkError::io(format!("create settings '{}': {e}", path.display())))?;
        let mut w = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut w, self)
            .map_err(|e| InkError::serde(format!("write settings JSON: {e}")))?;
        w.flush()
            .map_err(|e| InkError::io(format!("flush settings '{}': {e}", path.display())))
    }

    /// Preset backing `kind`.
    pub fn preset(&self, kind: BrushKind) -> &BrushPreset {
        match kind {
            BrushKind::Pen => &self.pen,
            BrushKind::Highlighter => &self.highlighter,
            BrushKind::Pencil => &self.pencil,
            BrushKind::Eraser => &self.eraser.brush,
        }
    }

    /// Mutable preset backing `kind`.
    pub fn preset_mut(&mut self, kind: BrushKind) -> &mut BrushPreset {
        match kind {
            BrushKind::Pen => &mut self.pen,
            BrushKind::Highlighter => &mut self.highlighter,
            BrushKind::Pencil => &mut self.pencil,
            BrushKind::Eraser => &mut self.eraser.brush,
        }
    }

    /// Stroke style for new strokes drawn with `kind`.
    pub fn drawing_attributes(&self, kind: BrushKind) -> DrawingAttributes {
        let preset = self.preset(kind);
        let t = preset.thickness();
        let mut da = DrawingAttributes {
            color: preset.color,
            width: t,
            height: t,
            tip: StylusTip::Round,
            highlighter: kind == BrushKind::Highlighter,
            fit_to_curve: true,
            ignore_pressure: !preset.pressure,
        };
        match kind {
            BrushKind::Pen => {}
            BrushKind::Highlighter => {
                da.tip = StylusTip::Square;
                da.width = t / 2.0;
            }
            BrushKind::Pencil => da.fit_to_curve = false,
            BrushKind::Eraser => da.tip = StylusTip::Square,
        }
        da
    }
}

#[cfg(test)]
#[path = "../../tests/unit/io/settings.rs"]
mod tests;
