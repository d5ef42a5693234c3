use crate::foundation::math::clamp01;
use crate::model::stroke::Stroke;

/// Named, ordered container of strokes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "LayerRecord")]
pub struct Layer {
    /// Display name.
    pub name: String,
    /// Hidden layers are skipped by rendering and reveal accounting.
    pub visible: bool,
    /// Locked layers reject stroke edits.
    pub locked: bool,
    opacity: f64,
    /// Strokes in insertion order.
    pub strokes: Vec<Stroke>,
}

#[derive(serde::Deserialize)]
struct LayerRecord {
    name: String,
    #[serde(default = "yes")]
    visible: bool,
    #[serde(default)]
    locked: bool,
    #[serde(default = "full")]
    opacity: f64,
    #[serde(default)]
    strokes: Vec<Stroke>,
}

fn yes() -> bool {
    true
}

fn full() -> f64 {
    1.0
}

impl From<LayerRecord> for Layer {
    fn from(r: LayerRecord) -> Self {
        let mut layer = Layer::new(r.name);
        layer.visible = r.visible;
        layer.locked = r.locked;
        layer.set_opacity(r.opacity);
        layer.strokes = r.strokes;
        layer
    }
}

impl Layer {
    /// Visible, unlocked, fully opaque empty layer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            locked: false,
            opacity: 1.0,
            strokes: Vec::new(),
        }
    }

    /// Layer opacity in `[0, 1]`.
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Set opacity, clamped into `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = clamp01(opacity);
    }

    /// Builder-style opacity setter.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.set_opacity(opacity);
        self
    }

    /// Total reveal points across this layer's strokes.
    pub fn reveal_point_count(&self) -> usize {
        self.strokes.iter().map(Stroke::reveal_point_count).sum()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/layer.rs"]
mod tests;
