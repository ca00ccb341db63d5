// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shared stack of armed dismissal layers.

use smallvec::SmallVec;
use understory_document::NodeId;

/// Identifier of an armed layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct LayerId(u64);

/// One armed dismissal region.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    /// Identifier.
    pub id: LayerId,
    /// Root of the floating content.
    pub floating: NodeId,
    /// Root of the reference (trigger), if any.
    pub reference: Option<NodeId>,
    /// Dimming backdrop, if any.
    pub backdrop: Option<NodeId>,
    /// Whether a press outside the layer dismisses it. Escape-only layers
    /// (tooltips) still count for the topmost check.
    pub dismiss_outside: bool,
}

/// Armed layers in arm order (last is topmost).
#[derive(Clone, Debug, Default)]
pub struct LayerStack {
    layers: SmallVec<[Layer; 4]>,
    next_id: u64,
}

impl LayerStack {
    /// An empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a layer on top.
    pub fn arm(
        &mut self,
        floating: NodeId,
        reference: Option<NodeId>,
        backdrop: Option<NodeId>,
    ) -> LayerId {
        self.push(floating, reference, backdrop, true)
    }

    /// Push a layer that only takes part in Escape handling.
    pub fn arm_escape_only(&mut self, floating: NodeId, reference: Option<NodeId>) -> LayerId {
        self.push(floating, reference, None, false)
    }

    fn push(
        &mut self,
        floating: NodeId,
        reference: Option<NodeId>,
        backdrop: Option<NodeId>,
        dismiss_outside: bool,
    ) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);
        self.layers.push(Layer {
            id,
            floating,
            reference,
            backdrop,
            dismiss_outside,
        });
        tracing::debug!(?id, dismiss_outside, depth = self.layers.len(), "layer armed");
        id
    }

    /// Remove a layer wherever it sits. Returns whether it was armed.
    pub fn disarm(&mut self, id: LayerId) -> bool {
        let Some(pos) = self.layers.iter().position(|l| l.id == id) else {
            return false;
        };
        self.layers.remove(pos);
        tracing::debug!(?id, depth = self.layers.len(), "layer disarmed");
        true
    }

    /// The layer with identifier `id`.
    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// The most recently armed layer.
    pub fn topmost(&self) -> Option<&Layer> {
        self.layers.last()
    }

    /// Whether `id` is the most recently armed layer.
    pub fn is_topmost(&self, id: LayerId) -> bool {
        self.topmost().is_some_and(|l| l.id == id)
    }

    /// Layers armed after `id`, oldest first. Empty if `id` is not armed.
    pub fn above(&self, id: LayerId) -> &[Layer] {
        match self.layers.iter().position(|l| l.id == id) {
            Some(pos) => &self.layers[pos + 1..],
            None => &[],
        }
    }

    /// Number of armed layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether no layer is armed.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Armed layers, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }
}
