// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-overlay dismissal decisions.

use understory_document::{Document, NodeId};
use understory_events::{Key, KeyEvent, Preventable, Propagating};

use crate::stack::{LayerId, LayerStack};

/// Why an overlay was asked to close.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DismissReason {
    /// Pointer pressed outside the overlay, its trigger, and any nested overlay.
    OutsidePointer,
    /// Pointer pressed on the dimming backdrop itself.
    Backdrop,
    /// Escape pressed while this overlay was the topmost one.
    Escape,
}

/// Dismissal state for one overlay.
#[derive(Clone, Debug, Default)]
pub struct DismissalCoordinator {
    layer: Option<LayerId>,
}

impl DismissalCoordinator {
    /// A disarmed coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a layer for this overlay, replacing any previous one.
    pub fn arm(
        &mut self,
        stack: &mut LayerStack,
        floating: NodeId,
        reference: Option<NodeId>,
        backdrop: Option<NodeId>,
    ) -> LayerId {
        self.disarm(stack);
        let id = stack.arm(floating, reference, backdrop);
        self.layer = Some(id);
        id
    }

    /// Arm a layer that Escape can dismiss but outside presses cannot.
    pub fn arm_escape_only(
        &mut self,
        stack: &mut LayerStack,
        floating: NodeId,
        reference: Option<NodeId>,
    ) -> LayerId {
        self.disarm(stack);
        let id = stack.arm_escape_only(floating, reference);
        self.layer = Some(id);
        id
    }

    /// Disarm this overlay's layer. Returns whether one was armed.
    pub fn disarm(&mut self, stack: &mut LayerStack) -> bool {
        self.layer.take().is_some_and(|id| stack.disarm(id))
    }

    /// Whether a layer is armed.
    pub fn is_armed(&self) -> bool {
        self.layer.is_some()
    }

    /// The armed layer.
    pub fn layer(&self) -> Option<LayerId> {
        self.layer
    }

    /// Decide whether a pointer press on `target` dismisses this overlay.
    ///
    /// `None` as target means the press hit no element at all, which is outside.
    pub fn on_pointer_down(
        &self,
        stack: &LayerStack,
        doc: &Document,
        target: Option<NodeId>,
    ) -> Option<DismissReason> {
        let layer = stack.get(self.layer?)?;
        if !layer.dismiss_outside {
            return None;
        }
        let Some(target) = target.filter(|&t| doc.is_alive(t)) else {
            return Some(DismissReason::OutsidePointer);
        };
        if doc.element(target).is_some_and(|e| e.is_disabled()) {
            tracing::trace!(?target, "press on disabled element ignored");
            return None;
        }
        if layer.backdrop == Some(target) {
            return Some(DismissReason::Backdrop);
        }
        let inside = |root: NodeId| doc.contains(root, target);
        if !doc.is_alive(layer.floating) {
            // Nothing to dismiss from yet.
            return None;
        }
        if inside(layer.floating) || layer.reference.is_some_and(inside) {
            return None;
        }
        let nested = stack
            .above(layer.id)
            .iter()
            .any(|l| inside(l.floating) || l.backdrop.is_some_and(inside));
        if nested {
            return None;
        }
        Some(DismissReason::OutsidePointer)
    }

    /// Decide whether a key press dismisses this overlay.
    ///
    /// Escape dismisses only the topmost layer, and only if no one stopped its
    /// propagation. A dismissing Escape is stopped and its default prevented.
    pub fn on_key(&self, stack: &LayerStack, event: &mut KeyEvent) -> Option<DismissReason> {
        let id = self.layer?;
        if event.key != Key::Escape || event.is_propagation_stopped() || !stack.is_topmost(id) {
            return None;
        }
        event.stop_propagation();
        event.prevent_default();
        Some(DismissReason::Escape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use understory_document::{Element, ElementFlags};

    struct Fixture {
        doc: Document,
        stack: LayerStack,
        trigger: NodeId,
        floating: NodeId,
        inside: NodeId,
        outside: NodeId,
    }

    fn fixture() -> Fixture {
        let mut doc = Document::new();
        let body = doc.body();
        let trigger = doc.insert(Some(body), Element::button("trigger"));
        let outside = doc.insert(Some(body), Element::button("elsewhere"));
        let floating = doc.mount_in_layer(Element::generic());
        let inside = doc.insert(Some(floating), Element::button("inside"));
        Fixture {
            doc,
            stack: LayerStack::new(),
            trigger,
            floating,
            inside,
            outside,
        }
    }

    #[test]
    fn outside_dismisses_inside_and_trigger_do_not() {
        let mut f = fixture();
        let mut d = DismissalCoordinator::new();
        d.arm(&mut f.stack, f.floating, Some(f.trigger), None);

        assert_eq!(d.on_pointer_down(&f.stack, &f.doc, Some(f.inside)), None);
        assert_eq!(d.on_pointer_down(&f.stack, &f.doc, Some(f.trigger)), None);
        assert_eq!(
            d.on_pointer_down(&f.stack, &f.doc, Some(f.outside)),
            Some(DismissReason::OutsidePointer)
        );
        assert_eq!(
            d.on_pointer_down(&f.stack, &f.doc, None),
            Some(DismissReason::OutsidePointer)
        );
    }

    #[test]
    fn disabled_targets_are_ignored() {
        let mut f = fixture();
        f.doc.set_flag(f.outside, ElementFlags::DISABLED, true);
        let mut d = DismissalCoordinator::new();
        d.arm(&mut f.stack, f.floating, Some(f.trigger), None);
        assert_eq!(d.on_pointer_down(&f.stack, &f.doc, Some(f.outside)), None);
    }

    #[test]
    fn backdrop_itself_dismisses_but_not_its_content() {
        let mut doc = Document::new();
        let backdrop = doc.mount_in_layer(Element::generic());
        let content = doc.insert(Some(backdrop), Element::generic());
        let button = doc.insert(Some(content), Element::button("ok"));
        let mut stack = LayerStack::new();
        let mut d = DismissalCoordinator::new();
        d.arm(&mut stack, content, None, Some(backdrop));

        assert_eq!(
            d.on_pointer_down(&stack, &doc, Some(backdrop)),
            Some(DismissReason::Backdrop)
        );
        assert_eq!(d.on_pointer_down(&stack, &doc, Some(button)), None);
    }

    #[test]
    fn disarmed_coordinator_never_dismisses() {
        let mut f = fixture();
        let mut d = DismissalCoordinator::new();
        d.arm(&mut f.stack, f.floating, Some(f.trigger), None);
        assert!(d.disarm(&mut f.stack));
        assert!(f.stack.is_empty());
        assert_eq!(d.on_pointer_down(&f.stack, &f.doc, Some(f.outside)), None);
        assert_eq!(d.on_key(&f.stack, &mut KeyEvent::new(Key::Escape)), None);
    }

    #[test]
    fn escape_respects_stopped_propagation_and_other_keys() {
        let mut f = fixture();
        let mut d = DismissalCoordinator::new();
        d.arm(&mut f.stack, f.floating, Some(f.trigger), None);
        let mut stopped = KeyEvent::new(Key::Escape);
        stopped.stop_propagation();
        assert_eq!(d.on_key(&f.stack, &mut stopped), None);
        assert_eq!(d.on_key(&f.stack, &mut KeyEvent::new(Key::Enter)), None);
        let mut esc = KeyEvent::new(Key::Escape);
        assert_eq!(d.on_key(&f.stack, &mut esc), Some(DismissReason::Escape));
        assert!(esc.is_default_prevented());
    }

    #[test]
    fn escape_only_layer_ignores_presses_but_takes_escape_first() {
        let mut f = fixture();
        let mut outer = DismissalCoordinator::new();
        outer.arm(&mut f.stack, f.floating, Some(f.trigger), None);
        let tip = f.doc.mount_in_layer(Element::generic());
        let mut inner = DismissalCoordinator::new();
        inner.arm_escape_only(&mut f.stack, tip, Some(f.inside));

        assert_eq!(inner.on_pointer_down(&f.stack, &f.doc, Some(f.outside)), None);
        // A press on the tooltip is nested, so the outer layer stays too.
        assert_eq!(outer.on_pointer_down(&f.stack, &f.doc, Some(tip)), None);

        let mut esc = KeyEvent::new(Key::Escape);
        assert_eq!(outer.on_key(&f.stack, &mut esc), None);
        assert_eq!(inner.on_key(&f.stack, &mut esc), Some(DismissReason::Escape));
        assert!(esc.is_propagation_stopped());

        assert!(inner.disarm(&mut f.stack));
        let mut esc = KeyEvent::new(Key::Escape);
        assert_eq!(outer.on_key(&f.stack, &mut esc), Some(DismissReason::Escape));
    }

    #[test]
    fn rearming_replaces_the_layer() {
        let mut f = fixture();
        let mut d = DismissalCoordinator::new();
        let first = d.arm(&mut f.stack, f.floating, None, None);
        let second = d.arm(&mut f.stack, f.floating, None, None);
        assert_ne!(first, second);
        assert_eq!(f.stack.len(), 1);
    }
}
