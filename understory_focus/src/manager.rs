// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus capture on open, cyclic trap while open, and restore on close.

use understory_document::{Document, NodeId};
use understory_events::{Key, KeyEvent, Preventable};

/// Focus manager for one floating root.
///
/// One open episode runs [`FocusManager::on_open`], any number of
/// [`FocusManager::constrain`] calls, then [`FocusManager::on_close`]. The
/// snapshot of the previously focused element is single use: closing consumes
/// it.
///
/// ```rust
/// use understory_document::{Document, Element};
/// use understory_events::{Key, KeyEvent, Modifiers};
/// use understory_focus::FocusManager;
///
/// let mut doc = Document::new();
/// let trigger = doc.insert(Some(doc.body()), Element::button("Open"));
/// doc.focus(trigger);
///
/// let panel = doc.mount_in_layer(Element::generic());
/// let first = doc.insert(Some(panel), Element::button("First"));
/// let last = doc.insert(Some(panel), Element::button("Last"));
///
/// let mut focus = FocusManager::new();
/// focus.on_open(&mut doc, panel, Some(trigger));
/// assert_eq!(doc.focused(), Some(first));
///
/// // Shift+Tab on the first element wraps to the last.
/// let mut back = KeyEvent::new(Key::Tab).with_modifiers(Modifiers::SHIFT);
/// assert!(focus.constrain(&mut doc, &mut back));
/// assert_eq!(doc.focused(), Some(last));
///
/// focus.on_close(&mut doc);
/// assert_eq!(doc.focused(), Some(trigger));
/// ```
#[derive(Clone, Debug, Default)]
pub struct FocusManager {
    root: Option<NodeId>,
    trigger: Option<NodeId>,
    snapshot: Option<NodeId>,
}

impl FocusManager {
    /// An idle manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an open episode is in progress.
    pub fn is_active(&self) -> bool {
        self.root.is_some()
    }

    /// The floating root of the current episode.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// The element that was focused when the current episode began.
    pub fn snapshot(&self) -> Option<NodeId> {
        self.snapshot
    }

    /// Where focus goes when `root` opens: an autofocus element, else the first
    /// interactive element, else the root itself.
    pub fn initial_focus(doc: &Document, root: NodeId) -> NodeId {
        doc.autofocus_target(root)
            .or_else(|| doc.interactive_descendants(root).first().copied())
            .unwrap_or(root)
    }

    /// Begin an episode: remember the focused element and move focus into `root`.
    ///
    /// Returns the element that received focus, if any.
    pub fn on_open(
        &mut self,
        doc: &mut Document,
        root: NodeId,
        trigger: Option<NodeId>,
    ) -> Option<NodeId> {
        self.snapshot = doc.focused();
        self.trigger = trigger;
        self.root = Some(root);
        let target = Self::initial_focus(doc, root);
        if doc.focus(target) {
            tracing::trace!(?root, ?target, "initial focus");
            Some(target)
        } else {
            None
        }
    }

    /// End the episode: restore focus to the trigger if it is still mounted,
    /// else to the snapshot if it is still mounted, else leave focus alone.
    ///
    /// Returns the element that received focus, if any.
    pub fn on_close(&mut self, doc: &mut Document) -> Option<NodeId> {
        let trigger = self.trigger.take();
        let snapshot = self.snapshot.take();
        if self.root.take().is_none() {
            return None;
        }
        let restored = [trigger, snapshot]
            .into_iter()
            .flatten()
            .find(|&n| doc.is_alive(n) && doc.focus(n));
        tracing::trace!(?restored, "focus restored");
        restored
    }

    /// Forget the episode without moving focus.
    pub fn release(&mut self) {
        self.root = None;
        self.trigger = None;
        self.snapshot = None;
    }

    /// Keep Tab and Shift+Tab inside the root.
    ///
    /// Moves focus cyclically among the root's interactive descendants, queried
    /// fresh on every call. Focus outside the root is pulled back to the first
    /// (or, for Shift+Tab, the last) interactive descendant. Returns whether the
    /// event was handled; handled events have their default prevented.
    pub fn constrain(&self, doc: &mut Document, event: &mut KeyEvent) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        if event.key != Key::Tab || event.is_default_prevented() || !doc.is_alive(root) {
            return false;
        }
        event.prevent_default();
        let backward = event.shift();
        let candidates = doc.interactive_descendants(root);
        let (Some(&first), Some(&last)) = (candidates.first(), candidates.last()) else {
            doc.focus(root);
            return true;
        };

        let target = match doc.focused().filter(|&f| doc.contains(root, f)) {
            None => {
                if backward {
                    last
                } else {
                    first
                }
            }
            Some(current) => {
                // Tree order relative to the focused element, which may itself
                // be a non-tabbable node inside the root.
                let order: alloc::vec::Vec<NodeId> = doc.descendants(root).collect();
                let at = order.iter().position(|&n| n == current).unwrap_or(0);
                let rank = |n: NodeId| order.iter().position(|&o| o == n).unwrap_or(0);
                if backward {
                    candidates
                        .iter()
                        .rev()
                        .copied()
                        .find(|&c| rank(c) < at)
                        .unwrap_or(last)
                } else {
                    candidates
                        .iter()
                        .copied()
                        .find(|&c| rank(c) > at)
                        .unwrap_or(first)
                }
            }
        };
        doc.focus(target);
        tracing::trace!(?target, backward, "focus trap step");
        true
    }
}
