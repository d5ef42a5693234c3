use crate::foundation::error::{InkError, InkResult};
use crate::model::layer::Layer;
use crate::render::compositor::LayerList;

/// Stable identity of a layer inside one [`LayerStack`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub(crate) u64);

/// Prefix of generated layer names.
pub const DEFAULT_LAYER_PREFIX: &str = "Layer";

/// Ordered layer stack. Index 0 is the top-most layer.
///
/// Always holds at least one layer; the selection is either `None` or a live member.
#[derive(Clone, Debug)]
pub struct LayerStack {
    entries: Vec<(LayerId, Layer)>,
    selected: Option<LayerId>,
    next_id: u64,
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStack {
    /// One empty, selected layer named `Layer 1`.
    pub fn new() -> Self {
        let mut stack = Self {
            entries: Vec::new(),
            selected: None,
            next_id: 0,
        };
        let id = stack.alloc_id();
        stack.entries.push((id, Layer::new(default_name(1))));
        stack.selected = Some(id);
        stack
    }

    /// Adopt loaded layers (top-most first) and select the top one. Empty input yields [`Self::new`].
    pub fn from_layers(layers: Vec<Layer>) -> Self {
        if layers.is_empty() {
            return Self::new();
        }
        let mut stack = Self {
            entries: Vec::with_capacity(layers.len()),
            selected: None,
            next_id: 0,
        };
        for layer in layers {
            let id = stack.alloc_id();
            stack.entries.push((id, layer));
        }
        stack.selected = stack.entries.first().map(|(id, _)| *id);
        stack
    }

    /// Reserve a fresh id; ids are never reused within one stack.
    pub(crate) fn alloc_id(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when the stack holds no layers; never the case for a constructed stack.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Layers with their ids, top-most first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (LayerId, &Layer)> {
        self.entries.iter().map(|(id, l)| (*id, l))
    }

    /// Ids, top-most first.
    pub fn ids(&self) -> Vec<LayerId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    /// Position of `id`, if present.
    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.entries.iter().position(|(i, _)| *i == id)
    }

    /// Id at `index`.
    pub fn id_at(&self, index: usize) -> Option<LayerId> {
        self.entries.get(index).map(|(id, _)| *id)
    }

    /// Layer by id.
    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.entries.iter().find(|(i, _)| *i == id).map(|(_, l)| l)
    }

    /// Mutable layer by id.
    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.entries
            .iter_mut()
            .find(|(i, _)| *i == id)
            .map(|(_, l)| l)
    }

    pub(crate) fn require_mut(&mut self, id: LayerId) -> InkResult<&mut Layer> {
        self.get_mut(id)
            .ok_or_else(|| InkError::validation(format!("unknown layer {id:?}")))
    }

    /// Insert a new layer at `index` (0 = top) and return its id.
    pub fn insert(&mut self, index: usize, layer: Layer) -> InkResult<LayerId> {
        let id = self.alloc_id();
        self.insert_with_id(index, id, layer)?;
        Ok(id)
    }

    /// Re-insert a layer under a known id, as when undoing a removal.
    pub(crate) fn insert_with_id(&mut self, index: usize, id: LayerId, layer: Layer) -> InkResult<()> {
        if index > self.entries.len() {
            return Err(InkError::validation(format!(
                "layer index {index} out of range (len {})",
                self.entries.len()
            )));
        }
        if self.index_of(id).is_some() {
            return Err(InkError::validation(format!("layer {id:?} already present")));
        }
        self.entries.insert(index, (id, layer));
        self.next_id = self.next_id.max(id.0 + 1);
        Ok(())
    }

    /// Remove a layer, returning its former index and contents.
    ///
    /// The last remaining layer cannot be removed. If the removed layer was selected, the layer now
    /// at the same index (or the top layer) becomes selected.
    pub fn remove(&mut self, id: LayerId) -> InkResult<(usize, Layer)> {
        let index = self
            .index_of(id)
            .ok_or_else(|| InkError::validation(format!("unknown layer {id:?}")))?;
        if self.entries.len() <= 1 {
            return Err(InkError::validation("cannot remove the last layer"));
        }
        let (_, layer) = self.entries.remove(index);
        if self.selected == Some(id) {
            self.selected = self
                .id_at(index)
                .or_else(|| self.entries.first().map(|(id, _)| *id));
        }
        Ok((index, layer))
    }

    /// Move the layer at `from` so that it ends up at `to`.
    pub fn move_layer(&mut self, from: usize, to: usize) -> InkResult<()> {
        let len = self.entries.len();
        if from >= len || to >= len {
            return Err(InkError::validation(format!(
                "layer move {from} -> {to} out of range (len {len})"
            )));
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        Ok(())
    }

    /// Selected layer id.
    pub fn selected(&self) -> Option<LayerId> {
        self.selected
    }

    /// Selected layer.
    pub fn selected_layer(&self) -> Option<&Layer> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Change the selection. Unknown ids are rejected.
    pub fn set_selected(&mut self, id: Option<LayerId>) -> InkResult<()> {
        if let Some(id) = id
            && self.index_of(id).is_none()
        {
            return Err(InkError::validation(format!("unknown layer {id:?}")));
        }
        self.selected = id;
        Ok(())
    }

    /// Rename every generated or empty name so that the bottom layer is `Layer 1`.
    ///
    /// Custom names are left alone.
    pub fn renumber(&mut self) {
        let len = self.entries.len();
        for (i, (_, layer)) in self.entries.iter_mut().enumerate() {
            if layer.name.is_empty() || is_default_name(&layer.name) {
                layer.name = default_name(len - i);
            }
        }
    }

    /// Immutable copy of the layers for rendering, top-most first.
    pub fn snapshot(&self) -> LayerList {
        self.entries.iter().map(|(_, l)| l.clone()).collect::<Vec<_>>().into()
    }

    /// Owned copy of the layers, top-most first.
    pub fn to_layers(&self) -> Vec<Layer> {
        self.entries.iter().map(|(_, l)| l.clone()).collect()
    }
}

/// Generated name for the layer `n` positions from the bottom (1-based).
pub fn default_name(n: usize) -> String {
    format!("{DEFAULT_LAYER_PREFIX} {n}")
}

fn is_default_name(name: &str) -> bool {
    name.strip_prefix(DEFAULT_LAYER_PREFIX)
        .and_then(|rest| rest.strip_prefix(' '))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
#[path = "../../tests/unit/edit/stack.rs"]
mod tests;
