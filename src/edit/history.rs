use crate::edit::stack::{LayerId, LayerStack};
use crate::foundation::error::{InkError, InkResult};
use crate::model::layer::Layer;
use crate::model::stroke::Stroke;

/// Editable layer property with its value.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerProperty {
    /// Display name.
    Name(String),
    /// Visibility.
    Visible(bool),
    /// Lock state.
    Locked(bool),
    /// Opacity in `[0, 1]`.
    Opacity(f64),
}

impl LayerProperty {
    /// Current value of the same property on `layer`.
    pub fn read(&self, layer: &Layer) -> Self {
        match self {
            Self::Name(_) => Self::Name(layer.name.clone()),
            Self::Visible(_) => Self::Visible(layer.visible),
            Self::Locked(_) => Self::Locked(layer.locked),
            Self::Opacity(_) => Self::Opacity(layer.opacity()),
        }
    }

    /// Write this value into `layer`.
    pub fn write(&self, layer: &mut Layer) {
        match self {
            Self::Name(v) => layer.name.clone_from(v),
            Self::Visible(v) => layer.visible = *v,
            Self::Locked(v) => layer.locked = *v,
            Self::Opacity(v) => layer.set_opacity(*v),
        }
    }

}

/// Strokes removed from one layer, with their former positions (ascending).
#[derive(Clone, Debug, PartialEq)]
pub struct RemovedStrokes {
    /// Owning layer.
    pub layer: LayerId,
    /// `(index, stroke)` pairs in ascending index order.
    pub strokes: Vec<(usize, Stroke)>,
}

/// Strokes appended to one layer.
#[derive(Clone, Debug, PartialEq)]
pub struct AddedStrokes {
    /// Target layer.
    pub layer: LayerId,
    /// Index of the first appended stroke.
    pub at: usize,
    /// Appended strokes in order.
    pub strokes: Vec<Stroke>,
}

/// One undoable structural mutation, stored with enough data to apply and revert it.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// A layer was inserted.
    InsertLayer {
        /// Layer id.
        id: LayerId,
        /// Insert position.
        index: usize,
        /// Inserted contents.
        layer: Layer,
        /// Selection before the insert.
        prev_selected: Option<LayerId>,
    },
    /// A layer was removed.
    RemoveLayer {
        /// Layer id.
        id: LayerId,
        /// Former position.
        index: usize,
        /// Removed contents.
        layer: Layer,
    },
    /// A layer moved.
    MoveLayer {
        /// Old position.
        from: usize,
        /// New position.
        to: usize,
    },
    /// A layer property changed.
    SetProperty {
        /// Layer id.
        id: LayerId,
        /// Value before.
        old: LayerProperty,
        /// Value after.
        new: LayerProperty,
    },
    /// Strokes were erased and/or drawn.
    EditStrokes {
        /// Removals per layer.
        removed: Vec<RemovedStrokes>,
        /// Additions to the target layer.
        added: Option<AddedStrokes>,
    },
}

impl Command {
    /// Layers whose contents this command touches.
    pub fn affected_layers(&self) -> Vec<LayerId> {
        match self {
            Self::InsertLayer { id, .. }
            | Self::RemoveLayer { id, .. }
            | Self::SetProperty { id, .. } => vec![*id],
            Self::MoveLayer { .. } => Vec::new(),
            Self::EditStrokes { removed, added } => {
                let mut ids: Vec<LayerId> = removed.iter().map(|r| r.layer).collect();
                if let Some(a) = added {
                    ids.push(a.layer);
                }
                ids.sort_unstable();
                ids.dedup();
                ids
            }
        }
    }

    /// Perform the mutation.
    pub fn apply(&self, stack: &mut LayerStack) -> InkResult<()> {
        match self {
            Self::InsertLayer {
                id, index, layer, ..
            } => {
                stack.insert_with_id(*index, *id, layer.clone())?;
                stack.set_selected(Some(*id))?;
                stack.renumber();
            }
            Self::RemoveLayer { id, .. } => {
                stack.remove(*id)?;
                stack.renumber();
            }
            Self::MoveLayer { from, to } => {
                stack.move_layer(*from, *to)?;
                stack.renumber();
            }
            Self::SetProperty { id, new, .. } => new.write(stack.require_mut(*id)?),
            Self::EditStrokes { removed, added } => {
                check_removals(stack, removed)?;
                if let Some(a) = added {
                    let len = layer_of(stack, a.layer)?
                        .strokes
                        .len()
                        .checked_sub(removed_from(removed, a.layer));
                    if len != Some(a.at) {
                        return Err(InkError::validation("stroke append position is stale"));
                    }
                }
                for r in removed {
                    let layer = stack.require_mut(r.layer)?;
                    for (index, _) in r.strokes.iter().rev() {
                        layer.strokes.remove(*index);
                    }
                }
                if let Some(a) = added {
                    stack
                        .require_mut(a.layer)?
                        .strokes
                        .extend(a.strokes.iter().cloned());
                }
            }
        }
        Ok(())
    }

    /// Undo the mutation.
    pub fn revert(&self, stack: &mut LayerStack) -> InkResult<()> {
        match self {
            Self::InsertLayer {
                id, prev_selected, ..
            } => {
                stack.remove(*id)?;
                let restored = match prev_selected {
                    Some(p) if stack.index_of(*p).is_some() => Some(*p),
                    _ => stack.id_at(0),
                };
                stack.set_selected(restored)?;
                stack.renumber();
            }
            Self::RemoveLayer { id, index, layer } => {
                stack.insert_with_id(*index, *id, layer.clone())?;
                stack.set_selected(Some(*id))?;
                stack.renumber();
            }
            Self::MoveLayer { from, to } => {
                stack.move_layer(*to, *from)?;
                stack.renumber();
            }
            Self::SetProperty { id, old, .. } => old.write(stack.require_mut(*id)?),
            Self::EditStrokes { removed, added } => {
                if let Some(a) = added {
                    let layer = layer_of(stack, a.layer)?;
                    if layer.strokes.len() != a.at + a.strokes.len()
                        || !layer.strokes.ends_with(&a.strokes)
                    {
                        return Err(InkError::validation("appended strokes are no longer last"));
                    }
                }
                for r in removed {
                    let mut len = layer_of(stack, r.layer)?.strokes.len();
                    if let Some(a) = added.as_ref().filter(|a| a.layer == r.layer) {
                        len -= a.strokes.len();
                    }
                    for (index, _) in &r.strokes {
                        if *index > len {
                            return Err(InkError::validation("stroke restore position is stale"));
                        }
                        len += 1;
                    }
                }

                if let Some(a) = added {
                    stack.require_mut(a.layer)?.strokes.truncate(a.at);
                }
                for r in removed {
                    let layer = stack.require_mut(r.layer)?;
                    for (index, stroke) in &r.strokes {
                        layer.strokes.insert(*index, stroke.clone());
                    }
                }
            }
        }
        Ok(())
    }
}

fn layer_of(stack: &LayerStack, id: LayerId) -> InkResult<&Layer> {
    stack
        .get(id)
        .ok_or_else(|| InkError::validation(format!("unknown layer {id:?}")))
}

fn removed_from(removed: &[RemovedStrokes], id: LayerId) -> usize {
    removed
        .iter()
        .filter(|r| r.layer == id)
        .map(|r| r.strokes.len())
        .sum()
}

/// Every recorded removal must still match the stroke at its position, in ascending order.
fn check_removals(stack: &LayerStack, removed: &[RemovedStrokes]) -> InkResult<()> {
    for r in removed {
        let layer = layer_of(stack, r.layer)?;
        if !r.strokes.windows(2).all(|w| w[0].0 < w[1].0) {
            return Err(InkError::validation("removed stroke positions must ascend"));
        }
        for (index, stroke) in &r.strokes {
            if layer.strokes.get(*index) != Some(stroke) {
                return Err(InkError::validation(format!(
                    "stroke {index} of layer '{}' does not match the recorded edit",
                    layer.name
                )));
            }
        }
    }
    Ok(())
}

/// Undo and redo stacks of [`Command`]s.
///
/// Recording is suppressed while a command is being replayed.
#[derive(Debug, Default)]
pub struct History {
    undo: Vec<Command>,
    redo: Vec<Command>,
    replaying: bool,
}

impl History {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an already applied command and clear the redo stack.
    ///
    /// Returns `false` without recording while a replay is in progress.
    pub fn record(&mut self, cmd: Command) -> bool {
        if self.replaying {
            tracing::trace!("ignoring command recorded during replay");
            return false;
        }
        self.undo.push(cmd);
        self.redo.clear();
        true
    }

    /// Revert the newest command. `Ok(None)` when there is nothing to undo.
    pub fn undo(&mut self, stack: &mut LayerStack) -> InkResult<Option<&Command>> {
        let Some(cmd) = self.undo.pop() else {
            return Ok(None);
        };
        self.replaying = true;
        let res = cmd.revert(stack);
        self.replaying = false;
        if let Err(e) = res {
            self.undo.push(cmd);
            return Err(e);
        }
        self.redo.push(cmd);
        Ok(self.redo.last())
    }

    /// Re-apply the newest undone command. `Ok(None)` when there is nothing to redo.
    pub fn redo(&mut self, stack: &mut LayerStack) -> InkResult<Option<&Command>> {
        let Some(cmd) = self.redo.pop() else {
            return Ok(None);
        };
        self.replaying = true;
        let res = cmd.apply(stack);
        self.replaying = false;
        if let Err(e) = res {
            self.redo.push(cmd);
            return Err(e);
        }
        self.undo.push(cmd);
        Ok(self.undo.last())
    }

    /// `true` while [`History::undo`] or [`History::redo`] is mutating the stack.
    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    /// Whether [`History::undo`] would do anything.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether [`History::redo`] would do anything.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of undoable commands.
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Number of redoable commands.
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/edit/history.rs"]
mod tests;
