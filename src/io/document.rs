use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use crate::animation::anim::SampleCtx;
use crate::animation::param::Param;
use crate::foundation::error::{InkError, InkResult};
use crate::model::layer::Layer;
use crate::render::compositor::{FrameParams, LayerList};

/// Current document format version.
pub const DOCUMENT_FORMAT_VERSION: u32 = 1;

fn current_version() -> u32 {
    DOCUMENT_FORMAT_VERSION
}

/// Persisted ink shape: the layer stack plus the three animated reveal parameters.
///
/// Layers are stored top-most first.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InkShape {
    /// Format version.
    #[serde(default = "current_version")]
    pub version: u32,
    /// Layers, index 0 on top.
    pub layers: Vec<Layer>,
    /// Thickness in percent.
    #[serde(default = "Param::thickness")]
    pub thickness: Param,
    /// Revealed length in percent.
    #[serde(default = "Param::length")]
    pub length: Param,
    /// Reveal offset in percent.
    #[serde(default = "Param::offset")]
    pub offset: Param,
    /// Live-edit passthrough: frames render without ink.
    #[serde(default)]
    pub editing: bool,
}

impl Default for InkShape {
    fn default() -> Self {
        Self::new(vec![Layer::new("Layer 1")])
    }
}

impl InkShape {
    /// Shape with default parameters.
    pub fn new(layers: Vec<Layer>) -> Self {
        Self {
            version: DOCUMENT_FORMAT_VERSION,
            layers,
            thickness: Param::thickness(),
            length: Param::length(),
            offset: Param::offset(),
            editing: false,
        }
    }

    /// Parse a document from JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> InkResult<Self> {
        let shape: Self = serde_json::from_reader(r)
            .map_err(|e| InkError::serde(format!("parse ink document JSON: {e}")))?;
        shape.validate()?;
        Ok(shape)
    }

    /// Parse a document from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> InkResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            InkError::io(format!("open ink document '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Serialize as pretty JSON.
    pub fn to_writer<W: Write>(&self, w: W) -> InkResult<()> {
        serde_json::to_writer_pretty(w, self)
            .map_err(|e| InkError::serde(format!("write ink document JSON: {e}")))
    }

    /// Write to disk.
    pub fn save(&self, path: impl AsRef<Path>) -> InkResult<()> {
        let path = path.as_ref();
        let f = File::create(path).map_err(|e| {
            InkError::io(format!("create ink document '{}': {e}", path.display()))
        })?;
        let mut w = BufWriter::new(f);
        self.to_writer(&mut w)?;
        w.flush()
            .map_err(|e| InkError::io(format!("flush ink document '{}': {e}", path.display())))
    }

    /// Check version, layer count and parameters.
    pub fn validate(&self) -> InkResult<()> {
        if self.version != DOCUMENT_FORMAT_VERSION {
            return Err(InkError::validation(format!(
                "unsupported ink document version {} (expected {DOCUMENT_FORMAT_VERSION})",
                self.version
            )));
        }
        if self.layers.is_empty() {
            return Err(InkError::validation("ink document needs at least one layer"));
        }
        self.thickness.validate()?;
        self.length.validate()?;
        self.offset.validate()
    }

    /// Immutable layer snapshot for rendering.
    pub fn layer_list(&self) -> LayerList {
        Arc::from(self.layers.as_slice())
    }

    /// Resolve the reveal parameters for one frame.
    pub fn frame_params(&self, ctx: SampleCtx) -> InkResult<FrameParams> {
        Ok(FrameParams {
            thickness: self.thickness.value_at(ctx)?,
            length_pct: self.length.value_at(ctx)?,
            offset_pct: self.offset.value_at(ctx)?,
        })
    }

    /// Stroke and reveal-point totals over all layers, visible or not.
    pub fn counts(&self) -> (usize, usize) {
        let strokes = self.layers.iter().map(|l| l.strokes.len()).sum();
        let points = self.layers.iter().map(Layer::reveal_point_count).sum();
        (strokes, points)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/io/document.rs"]
mod tests;
