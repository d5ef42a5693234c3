use std::path::PathBuf;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{InkError, InkResult};
use crate::render::cpu::FrameRGBA;
use crate::render::export::write_png;

/// Configuration provided to a [`FrameSink`] at the start of a range render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Timeline frame rate.
    pub fps: Fps,
}

/// Sink contract for consuming rendered frames in timeline order.
///
/// `push_frame` is called in strictly increasing `FrameIndex` order within the requested range.
pub trait FrameSink {
    /// Called once before the first frame.
    fn begin(&mut self, cfg: SinkConfig) -> InkResult<()>;
    /// Consume one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> InkResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> InkResult<()>;
}

/// In-memory sink for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    /// Frames in timeline order.
    pub frames: Vec<(FrameIndex, FrameRGBA)>,
}

impl InMemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration of the last range, if one was started.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> InkResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> InkResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> InkResult<()> {
        Ok(())
    }
}

/// Writes each frame as `<dir>/<prefix><index:05>.png`.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
    written: Vec<PathBuf>,
    open: bool,
}

impl PngSequenceSink {
    /// Sink writing into `dir` (created on [`FrameSink::begin`]).
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            written: Vec::new(),
            open: false,
        }
    }

    /// Path a frame is written to.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("{}{:05}.png", self.prefix, idx.0))
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> InkResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            InkError::io(format!("create frame dir '{}': {e}", self.dir.display()))
        })?;
        tracing::debug!(dir = %self.dir.display(), width = cfg.width, height = cfg.height, "png sequence started");
        self.written.clear();
        self.open = true;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> InkResult<()> {
        if !self.open {
            return Err(InkError::validation("png sequence sink used before begin"));
        }
        let path = self.frame_path(idx);
        write_png(frame, &path)?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> InkResult<()> {
        self.open = false;
        tracing::debug!(frames = self.written.len(), "png sequence finished");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/sink.rs"]
mod tests;
