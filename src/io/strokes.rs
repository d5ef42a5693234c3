use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::foundation::error::{InkError, InkResult};
use crate::model::stroke::Stroke;

/// Current stroke interchange format version.
pub const STROKES_FORMAT_VERSION: u32 = 1;

/// Single-layer stroke interchange file: points plus style, nothing else.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrokeFile {
    /// Format version; only [`STROKES_FORMAT_VERSION`] is accepted.
    pub version: u32,
    /// Strokes in insertion order.
    pub strokes: Vec<Stroke>,
}

impl StrokeFile {
    /// Wrap strokes in the current format version.
    pub fn new(strokes: Vec<Stroke>) -> Self {
        Self {
            version: STROKES_FORMAT_VERSION,
            strokes,
        }
    }

    /// Parse and validate a stroke file. Every stroke is checked; any failure rejects the file.
    pub fn from_reader<R: std::io::Read>(r: R) -> InkResult<Self> {
        let file: Self = serde_json::from_reader(r)
            .map_err(|e| InkError::serde(format!("parse stroke file: {e}")))?;
        if file.version != STROKES_FORMAT_VERSION {
            return Err(InkError::validation(format!(
                "unsupported stroke file version {} (expected {STROKES_FORMAT_VERSION})",
                file.version
            )));
        }
        Ok(file)
    }

    /// Read a stroke file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> InkResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .map_err(|e| InkError::io(format!("open stroke file '{}': {e}", path.display())))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Serialize as JSON.
    pub fn to_writer<W: Write>(&self, w: W) -> InkResult<()> {
        serde_json::to_writer(w, self)
            .map_err(|e| InkError::serde(format!("write stroke file: {e}")))
    }

    /// Write to disk.
    pub fn save(&self, path: impl AsRef<Path>) -> InkResult<()> {
        let path = path.as_ref();
        let f = File::create(path)
            .map_err(|e| InkError::io(format!("create stroke file '{}': {e}", path.display())))?;
        let mut w = BufWriter::new(f);
        self.to_writer(&mut w)?;
        w.flush()
            .map_err(|e| InkError::io(format!("flush stroke file '{}': {e}", path.display())))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/io/strokes.rs"]
mod tests;
