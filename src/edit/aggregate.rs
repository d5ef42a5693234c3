use std::collections::HashSet;

use crate::edit::stack::{LayerId, LayerStack};
use crate::foundation::error::{InkError, InkResult};
use crate::model::layer::Layer;
use crate::model::stroke::Stroke;

/// Identity of one displayed stroke. A view never hands out the same key twice, even across
/// rebuilds, so keys from a stale view are detected instead of matching the wrong stroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrokeKey(u64);

/// One entry of the aggregated view.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayStroke {
    /// Identity reported back by the editing surface.
    pub key: StrokeKey,
    /// Stroke as shown while editing: layer opacity folded into alpha, highlighter flag cleared.
    pub stroke: Stroke,
    /// Owning layer.
    pub layer: LayerId,
    /// Position of the original stroke in its layer.
    pub index: usize,
}

/// One stroke of the editing surface's list after an edit.
#[derive(Clone, Debug, PartialEq)]
pub enum EditedStroke {
    /// A stroke that was already displayed.
    Kept(StrokeKey),
    /// A stroke drawn (or split off by the point eraser) during the edit.
    New(Stroke),
}

/// Flattened list of all visible strokes, bottom layer first, with a map back to their owners.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AggregatedView {
    entries: Vec<DisplayStroke>,
    next_key: u64,
}

/// Difference between a view and an edited copy of it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrokeDiff {
    /// View positions that disappeared, ascending.
    pub removed: Vec<usize>,
    /// Strokes that were not in the view.
    pub added: Vec<Stroke>,
}

impl StrokeDiff {
    /// `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

impl AggregatedView {
    /// Build the view from the visible layers of `stack`.
    pub fn build(stack: &LayerStack) -> Self {
        let mut view = Self::default();
        view.rebuild(stack);
        view
    }

    /// Rebuild from `stack` with fresh keys.
    pub fn rebuild(&mut self, stack: &LayerStack) {
        self.entries.clear();
        for (id, layer) in stack.iter().rev().filter(|(_, l)| l.visible) {
            for (index, stroke) in layer.strokes.iter().enumerate() {
                self.entries.push(DisplayStroke {
                    key: StrokeKey(self.next_key),
                    stroke: display_stroke(stroke, layer),
                    layer: id,
                    index,
                });
                self.next_key += 1;
            }
        }
    }

    /// Entries in view order.
    pub fn entries(&self) -> &[DisplayStroke] {
        &self.entries
    }

    /// Display strokes in view order.
    pub fn strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.entries.iter().map(|e| &e.stroke)
    }

    /// Every entry as [`EditedStroke::Kept`], the starting point of an edit.
    pub fn kept(&self) -> Vec<EditedStroke> {
        self.entries.iter().map(|e| EditedStroke::Kept(e.key)).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no visible layer holds strokes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for `key`.
    pub fn get(&self, key: StrokeKey) -> Option<&DisplayStroke> {
        self.position(key).map(|i| &self.entries[i])
    }

    /// Owning layer of a displayed stroke.
    pub fn owner_of(&self, key: StrokeKey) -> Option<LayerId> {
        self.get(key).map(|e| e.layer)
    }

    fn position(&self, key: StrokeKey) -> Option<usize> {
        // Keys are handed out in ascending view order.
        self.entries.binary_search_by_key(&key, |e| e.key).ok()
    }

    /// Difference between this view and `edited`.
    ///
    /// Entries whose key is absent from `edited` are removals; [`EditedStroke::New`] items are
    /// additions. A key this view does not hold is rejected.
    pub fn diff(&self, edited: &[EditedStroke]) -> InkResult<StrokeDiff> {
        let mut kept = HashSet::with_capacity(edited.len());
        let mut added = Vec::new();
        for item in edited {
            match item {
                EditedStroke::Kept(key) => {
                    if self.position(*key).is_none() {
                        return Err(InkError::validation(format!(
                            "stroke {key:?} is not part of the current view"
                        )));
                    }
                    kept.insert(*key);
                }
                EditedStroke::New(stroke) => added.push(stroke.clone()),
            }
        }
        let removed = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !kept.contains(&e.key))
            .map(|(i, _)| i)
            .collect();
        Ok(StrokeDiff { removed, added })
    }
}

/// Stroke as drawn by the live editing surface on a layer.
fn display_stroke(stroke: &Stroke, layer: &Layer) -> Stroke {
    let mut attrs = *stroke.attributes();
    let alpha = f64::from(attrs.color.a);
    attrs.color.a = if attrs.highlighter {
        attrs.highlighter = false;
        (alpha / 2.0 * layer.opacity()) as u8
    } else {
        (alpha * layer.opacity()) as u8
    };
    stroke.with_attributes(attrs)
}

#[cfg(test)]
#[path = "../../tests/unit/edit/aggregate.rs"]
mod tests;
