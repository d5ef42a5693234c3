use std::collections::HashMap;
use std::path::Path;

use crate::edit::aggregate::{AggregatedView, EditedStroke, StrokeDiff, StrokeKey};
use crate::edit::history::{AddedStrokes, Command, History, LayerProperty, RemovedStrokes};
use crate::edit::stack::{LayerId, LayerStack};
use crate::foundation::core::Canvas;
use crate::foundation::error::{InkError, InkResult};
use crate::io::settings::{BrushKind, EraserMode, Settings};
use crate::io::strokes::StrokeFile;
use crate::model::layer::Layer;
use crate::model::stroke::DrawingAttributes;
use crate::render::compositor::LayerList;
use crate::render::cpu::{CpuRasterizer, FrameRGBA};
use crate::render::export::{ThumbnailOpts, render_snapshot, render_thumbnail, write_png};

/// What pointer input on the canvas does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditingMode {
    /// Input is ignored (selected layer locked).
    None,
    /// Draw new strokes.
    Ink,
    /// Erase whole strokes.
    EraseByStroke,
    /// Erase touched points.
    EraseByPoint,
    /// Select strokes of the selected layer.
    Select,
}

impl EditingMode {
    /// `true` for both eraser modes.
    pub fn is_erasing(self) -> bool {
        matches!(self, Self::EraseByStroke | Self::EraseByPoint)
    }
}

/// State change notification; drain with [`Editor::drain_events`].
#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    /// Layers were inserted, removed, moved or renamed.
    LayersChanged,
    /// The selected layer changed.
    SelectionChanged(Option<LayerId>),
    /// A layer property changed.
    LayerPropertyChanged {
        /// Layer id.
        id: LayerId,
        /// New value.
        property: LayerProperty,
    },
    /// Stroke contents of these layers changed.
    StrokesChanged {
        /// Affected layers.
        layers: Vec<LayerId>,
    },
    /// Undo/redo availability may have changed.
    HistoryChanged {
        /// Undo is possible.
        can_undo: bool,
        /// Redo is possible.
        can_redo: bool,
    },
    /// The derived editing mode changed.
    EditingModeChanged(EditingMode),
}

/// Result of applying a stroke edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// Recorded and applied.
    Applied,
    /// Nothing to do.
    Unchanged,
    /// Rejected and rolled back (locked layer or no target); nothing recorded.
    Reverted,
}

/// Editor options.
#[derive(Clone, Copy, Debug)]
pub struct EditorOpts {
    /// Drawing canvas size.
    pub canvas: Canvas,
    /// Thumbnail settings.
    pub thumbnails: ThumbnailOpts,
}

impl Default for EditorOpts {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1920,
                height: 1080,
            },
            thumbnails: ThumbnailOpts::from_env(),
        }
    }
}

/// Layer editing session: stack, undo history, aggregated view and thumbnails.
pub struct Editor {
    opts: EditorOpts,
    stack: LayerStack,
    history: History,
    view: AggregatedView,
    settings: Settings,
    select_mode: bool,
    mode: EditingMode,
    thumbnails: HashMap<LayerId, FrameRGBA>,
    raster: CpuRasterizer,
    events: Vec<EditorEvent>,
}

impl Editor {
    /// Edit the given layers (top-most first). Empty input starts with one layer.
    ///
    /// Empty and generated layer names are renumbered on load.
    pub fn new(layers: Vec<Layer>, settings: Settings, opts: EditorOpts) -> Self {
        let mut stack = LayerStack::from_layers(layers);
        stack.renumber();
        let view = AggregatedView::build(&stack);
        let mut editor = Self {
            opts,
            stack,
            history: History::new(),
            view,
            settings,
            select_mode: false,
            mode: EditingMode::Ink,
            thumbnails: HashMap::new(),
            raster: CpuRasterizer::default(),
            events: Vec::new(),
        };
        editor.mode = editor.derive_mode();
        editor
    }

    /// Layer stack.
    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    /// Aggregated view of visible strokes, as the editing surface shows them.
    pub fn view(&self) -> &AggregatedView {
        &self.view
    }

    /// Current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Canvas size.
    pub fn canvas(&self) -> Canvas {
        self.opts.canvas
    }

    /// Immutable layer snapshot for rendering.
    pub fn layer_list(&self) -> LayerList {
        self.stack.snapshot()
    }

    /// Take all pending notifications.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    // --- tools ---

    /// Current editing mode.
    pub fn editing_mode(&self) -> EditingMode {
        self.mode
    }

    fn derive_mode(&self) -> EditingMode {
        if self.stack.selected_layer().is_some_and(|l| l.locked) {
            return EditingMode::None;
        }
        if self.select_mode {
            return EditingMode::Select;
        }
        match self.settings.brush {
            BrushKind::Eraser => match self.settings.eraser.mode {
                EraserMode::Stroke => EditingMode::EraseByStroke,
                EraserMode::Point => EditingMode::EraseByPoint,
            },
            _ => EditingMode::Ink,
        }
    }

    fn sync_mode(&mut self) {
        let mode = self.derive_mode();
        if mode != self.mode {
            self.mode = mode;
            self.events.push(EditorEvent::EditingModeChanged(mode));
        }
    }

    /// Select a drawing tool; leaves select mode.
    pub fn set_brush(&mut self, kind: BrushKind) {
        self.settings.brush = kind;
        self.select_mode = false;
        self.sync_mode();
    }

    /// Choose stroke or point erasing.
    pub fn set_eraser_mode(&mut self, mode: EraserMode) {
        self.settings.eraser.mode = mode;
        self.sync_mode();
    }

    /// Enter or leave stroke selection.
    pub fn set_select_mode(&mut self, on: bool) {
        self.select_mode = on;
        self.sync_mode();
    }

    /// Style for strokes drawn with the current tool.
    pub fn drawing_attributes(&self) -> DrawingAttributes {
        self.settings.drawing_attributes(self.settings.brush)
    }

    /// Keep only selected strokes that belong to the selected layer.
    ///
    /// Outside select mode, or without a selected layer, the selection is returned unchanged.
    pub fn filter_selection(&self, selected: &[StrokeKey]) -> Vec<StrokeKey> {
        let Some(target) = self.stack.selected() else {
            return selected.to_vec();
        };
        if self.mode != EditingMode::Select {
            return selected.to_vec();
        }
        selected
            .iter()
            .copied()
            .filter(|&k| self.view.owner_of(k) == Some(target))
            .collect()
    }

    // --- layers ---

    /// Select a layer (not undoable).
    pub fn select_layer(&mut self, id: Option<LayerId>) -> InkResult<()> {
        if self.stack.selected() == id {
            return Ok(());
        }
        self.stack.set_selected(id)?;
        self.events.push(EditorEvent::SelectionChanged(id));
        self.sync_mode();
        Ok(())
    }

    /// Insert an empty layer on top and select it.
    pub fn add_layer(&mut self) -> InkResult<LayerId> {
        let id = self.stack.alloc_id();
        let cmd = Command::InsertLayer {
            id,
            index: 0,
            layer: Layer::new(""),
            prev_selected: self.stack.selected(),
        };
        self.execute(cmd)?;
        tracing::debug!(?id, layers = self.stack.len(), "added layer");
        Ok(id)
    }

    /// Remove the selected layer. Returns `false` when refused (no selection or last layer).
    pub fn remove_selected_layer(&mut self) -> InkResult<bool> {
        let Some(id) = self.stack.selected() else {
            return Ok(false);
        };
        if self.stack.len() <= 1 {
            return Ok(false);
        }
        let index = self
            .stack
            .index_of(id)
            .ok_or_else(|| InkError::validation("selected layer is not in the stack"))?;
        let layer = self
            .stack
            .get(id)
            .cloned()
            .ok_or_else(|| InkError::validation("selected layer is not in the stack"))?;
        self.execute(Command::RemoveLayer { id, index, layer })?;
        Ok(true)
    }

    /// Move the layer at `from` to `to`. Returns `false` for out-of-range or no-op moves.
    pub fn move_layer(&mut self, from: usize, to: usize) -> InkResult<bool> {
        let len = self.stack.len();
        if from >= len || to >= len || from == to {
            return Ok(false);
        }
        self.execute(Command::MoveLayer { from, to })?;
        Ok(true)
    }

    /// Move the selected layer one step towards the top.
    pub fn move_selected_up(&mut self) -> InkResult<bool> {
        match self.selected_index() {
            Some(i) if i > 0 => self.move_layer(i, i - 1),
            _ => Ok(false),
        }
    }

    /// Move the selected layer one step towards the bottom.
    pub fn move_selected_down(&mut self) -> InkResult<bool> {
        match self.selected_index() {
            Some(i) if i + 1 < self.stack.len() => self.move_layer(i, i + 1),
            _ => Ok(false),
        }
    }

    fn selected_index(&self) -> Option<usize> {
        self.stack.selected().and_then(|id| self.stack.index_of(id))
    }

    /// Change one layer property as an undoable step. Returns `false` if the value is unchanged.
    pub fn set_layer_property(&mut self, id: LayerId, property: LayerProperty) -> InkResult<bool> {
        let layer = self
            .stack
            .get(id)
            .ok_or_else(|| InkError::validation(format!("unknown layer {id:?}")))?;
        let old = property.read(layer);
        let mut candidate = layer.clone();
        property.write(&mut candidate);
        if property.read(&candidate) == old {
            return Ok(false);
        }
        self.execute(Command::SetProperty {
            id,
            old,
            new: property,
        })?;
        Ok(true)
    }

    // --- strokes ---

    /// Diff `edited` (the editing surface's new stroke list) against the view and apply it.
    pub fn apply_stroke_edit(&mut self, edited: &[EditedStroke]) -> InkResult<EditOutcome> {
        let diff = self.view.diff(edited)?;
        self.apply_stroke_diff(diff)
    }

    /// Apply a stroke diff against the current view.
    ///
    /// While erasing, removals from non-selected layers are dropped. Edits touching a locked layer,
    /// or adding strokes without a selected layer, are rolled back and not recorded.
    pub fn apply_stroke_diff(&mut self, mut diff: StrokeDiff) -> InkResult<EditOutcome> {
        if self.history.is_replaying() {
            return Ok(EditOutcome::Unchanged);
        }
        let target = self.stack.selected();

        if self.mode.is_erasing() {
            let entries = self.view.entries();
            diff.removed
                .retain(|&i| entries.get(i).is_some_and(|e| Some(e.layer) == target));
        }
        if diff.is_empty() {
            return Ok(EditOutcome::Unchanged);
        }
        if target.is_none() && !diff.added.is_empty() {
            tracing::debug!("stroke edit without target layer reverted");
            return Ok(EditOutcome::Reverted);
        }

        let mut removed: Vec<RemovedStrokes> = Vec::new();
        diff.removed.sort_unstable();
        diff.removed.dedup();
        for &i in &diff.removed {
            let entry = self
                .view
                .entries()
                .get(i)
                .ok_or_else(|| InkError::validation(format!("stroke view index {i} out of range")))?;
            let layer = self
                .stack
                .get(entry.layer)
                .ok_or_else(|| InkError::validation("stroke view is stale"))?;
            if layer.locked {
                tracing::debug!(layer = %layer.name, "erase on locked layer reverted");
                return Ok(EditOutcome::Reverted);
            }
            let stroke = layer
                .strokes
                .get(entry.index)
                .cloned()
                .ok_or_else(|| InkError::validation("stroke view is stale"))?;
            match removed.iter_mut().find(|r| r.layer == entry.layer) {
                Some(r) => r.strokes.push((entry.index, stroke)),
                None => removed.push(RemovedStrokes {
                    layer: entry.layer,
                    strokes: vec![(entry.index, stroke)],
                }),
            }
        }
        for r in &mut removed {
            r.strokes.sort_by_key(|(i, _)| *i);
        }

        let added = match target {
            Some(id) if !diff.added.is_empty() => {
                let layer = self
                    .stack
                    .get(id)
                    .ok_or_else(|| InkError::validation("selected layer is not in the stack"))?;
                if layer.locked {
                    tracing::debug!(layer = %layer.name, "drawing on locked layer reverted");
                    return Ok(EditOutcome::Reverted);
                }
                let removed_here = removed
                    .iter()
                    .find(|r| r.layer == id)
                    .map_or(0, |r| r.strokes.len());
                Some(AddedStrokes {
                    layer: id,
                    at: layer.strokes.len() - removed_here,
                    strokes: diff.added,
                })
            }
            _ => None,
        };

        self.execute(Command::EditStrokes { removed, added })?;
        Ok(EditOutcome::Applied)
    }

    /// Append strokes from an interchange file to the selected layer as one undoable step.
    ///
    /// Returns `false` without touching anything when there is no unlocked selected layer or the
    /// file is not a valid stroke file.
    pub fn import_strokes<R: std::io::Read>(&mut self, r: R) -> InkResult<bool> {
        let Some(id) = self.stack.selected() else {
            return Ok(false);
        };
        let Some(layer) = self.stack.get(id) else {
            return Ok(false);
        };
        if layer.locked {
            return Ok(false);
        }
        let file = match StrokeFile::from_reader(r) {
            Ok(f) => f,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring invalid stroke file");
                return Ok(false);
            }
        };
        if file.strokes.is_empty() {
            return Ok(false);
        }
        let cmd = Command::EditStrokes {
            removed: Vec::new(),
            added: Some(AddedStrokes {
                layer: id,
                at: layer.strokes.len(),
                strokes: file.strokes,
            }),
        };
        self.execute(cmd)?;
        Ok(true)
    }

    /// [`Editor::import_strokes`] from a file. An unreadable file is a no-op.
    pub fn import_strokes_from(&mut self, path: impl AsRef<Path>) -> InkResult<bool> {
        let path = path.as_ref();
        match std::fs::File::open(path) {
            Ok(f) => self.import_strokes(std::io::BufReader::new(f)),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "cannot open stroke file");
                Ok(false)
            }
        }
    }

    /// Strokes of the selected layer in interchange form.
    pub fn export_strokes(&self) -> Option<StrokeFile> {
        self.stack
            .selected_layer()
            .map(|l| StrokeFile::new(l.strokes.clone()))
    }

    /// Write the selected layer's strokes to `path`. Returns `false` without a selected layer.
    pub fn export_strokes_to(&self, path: impl AsRef<Path>) -> InkResult<bool> {
        match self.export_strokes() {
            Some(file) => file.save(path).map(|()| true),
            None => Ok(false),
        }
    }

    /// Rasterize every visible layer at canvas size.
    pub fn snapshot_image(&mut self) -> InkResult<FrameRGBA> {
        let layers = self.stack.to_layers();
        render_snapshot(&mut self.raster, self.opts.canvas, &layers)
    }

    /// Write [`Editor::snapshot_image`] as PNG.
    pub fn export_snapshot(&mut self, path: impl AsRef<Path>) -> InkResult<()> {
        let frame = self.snapshot_image()?;
        write_png(&frame, path.as_ref())
    }

    /// Thumbnail of a layer, rendered on first request after a change.
    pub fn thumbnail(&mut self, id: LayerId) -> InkResult<&FrameRGBA> {
        if !self.thumbnails.contains_key(&id) {
            let layer = self
                .stack
                .get(id)
                .ok_or_else(|| InkError::validation(format!("unknown layer {id:?}")))?;
            let frame = render_thumbnail(&mut self.raster, self.opts.canvas, layer, self.opts.thumbnails)?;
            self.thumbnails.insert(id, frame);
        }
        self.thumbnails
            .get(&id)
            .ok_or_else(|| InkError::resource("thumbnail cache lost an entry"))
    }

    // --- history ---

    /// Undo the newest step. Returns `false` when there was nothing to undo.
    pub fn undo(&mut self) -> InkResult<bool> {
        let cmd = self.history.undo(&mut self.stack)?.cloned();
        self.after_replay(cmd, true)
    }

    /// Redo the newest undone step. Returns `false` when there was nothing to redo.
    pub fn redo(&mut self) -> InkResult<bool> {
        let cmd = self.history.redo(&mut self.stack)?.cloned();
        self.after_replay(cmd, false)
    }

    /// Whether [`Editor::undo`] would do anything.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether [`Editor::redo`] would do anything.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn after_replay(&mut self, cmd: Option<Command>, undone: bool) -> InkResult<bool> {
        let Some(cmd) = cmd else {
            return Ok(false);
        };
        self.announce(&cmd, undone);
        self.push_history_event();
        Ok(true)
    }

    fn execute(&mut self, cmd: Command) -> InkResult<()> {
        cmd.apply(&mut self.stack)?;
        self.announce(&cmd, false);
        self.history.record(cmd);
        self.push_history_event();
        Ok(())
    }

    fn push_history_event(&mut self) {
        self.events.push(EditorEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    fn announce(&mut self, cmd: &Command, undone: bool) {
        match cmd {
            Command::InsertLayer { id, .. } | Command::RemoveLayer { id, .. } => {
                self.thumbnails.remove(id);
                self.events.push(EditorEvent::LayersChanged);
                self.events
                    .push(EditorEvent::SelectionChanged(self.stack.selected()));
            }
            Command::MoveLayer { .. } => self.events.push(EditorEvent::LayersChanged),
            Command::SetProperty { id, old, new } => {
                let property = if undone { old } else { new };
                if matches!(property, LayerProperty::Opacity(_)) {
                    self.thumbnails.remove(id);
                }
                self.events.push(EditorEvent::LayerPropertyChanged {
                    id: *id,
                    property: property.clone(),
                });
            }
            Command::EditStrokes { .. } => {
                let layers = cmd.affected_layers();
                for id in &layers {
                    self.thumbnails.remove(id);
                }
                self.events.push(EditorEvent::StrokesChanged { layers });
            }
        }
        self.view.rebuild(&self.stack);
        self.sync_mode();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/edit/editor.rs"]
mod tests;
