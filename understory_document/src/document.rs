// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core document implementation: structure, focus, layers, layout commits, queries.

use alloc::vec::Vec;
use kurbo::{Point, Rect, Size};
use smallvec::SmallVec;

use crate::damage::Damage;
use crate::types::{Aria, Element, ElementFlags, NodeId};

/// Identifier of a layout observer registered with [`Document::observe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct ObserverId(u64);

/// Identifier of a scroll lock acquired with [`Document::lock_scroll`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScrollLockId(u64);

/// A headless element tree.
///
/// The document owns two roots: [`Document::body`], where the host builds its
/// regular content, and [`Document::layer`], a detached top-level layer that
/// overlays render into so their stacking does not depend on where their
/// trigger lives.
///
/// Bounds and viewport changes do **not** take effect immediately. They are
/// batched and applied when [`Document::commit`] is called, which reports the
/// change as [`Damage`] and tells registered observers what moved.
///
/// ## Example
///
/// ```rust
/// use kurbo::Rect;
/// use understory_document::{Document, Element};
///
/// let mut doc = Document::new();
/// let body = doc.body();
/// let button = doc.insert(Some(body), Element::button("Open"));
///
/// assert!(doc.is_interactive(button));
/// assert!(doc.focus(button));
/// assert_eq!(doc.focused(), Some(button));
///
/// // Layout changes are batched until commit.
/// doc.set_bounds(button, Rect::new(0.0, 0.0, 80.0, 24.0));
/// assert_eq!(doc.bounds(button), Some(Rect::ZERO));
/// let damage = doc.commit();
/// assert_eq!(damage.moved, vec![button]);
/// assert_eq!(doc.bounds(button), Some(Rect::new(0.0, 0.0, 80.0, 24.0)));
/// ```
pub struct Document {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    body: NodeId,
    layer: NodeId,
    focused: Option<NodeId>,
    viewport: Rect,
    pending_viewport: Option<Rect>,
    epoch: u64,
    observers: Vec<(ObserverId, NodeId)>,
    next_observer: u64,
    scroll_locks: SmallVec<[ScrollLockId; 2]>,
    next_scroll_lock: u64,
}

impl core::fmt::Debug for Document {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Document")
            .field("nodes_alive", &alive)
            .field("focused", &self.focused)
            .field("viewport", &self.viewport)
            .field("epoch", &self.epoch)
            .field("observers", &self.observers.len())
            .field("scroll_locks", &self.scroll_locks.len())
            .finish_non_exhaustive()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    element: Element,
    pending_bounds: Option<Rect>,
}

impl Node {
    fn new(generation: u32, element: Element) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            element,
            pending_bounds: None,
        }
    }
}

impl Document {
    /// Default viewport used by [`Document::new`].
    pub const DEFAULT_VIEWPORT: Size = Size::new(1024.0, 768.0);

    /// Create a document with an empty body, an empty layer, and the default viewport.
    pub fn new() -> Self {
        Self::with_viewport(Self::DEFAULT_VIEWPORT)
    }

    /// Create a document with an empty body and layer and a viewport of `size` at the origin.
    pub fn with_viewport(size: Size) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            body: NodeId::new(0, 0),
            layer: NodeId::new(0, 0),
            focused: None,
            viewport: Rect::from_origin_size(Point::ORIGIN, size),
            pending_viewport: None,
            epoch: 0,
            observers: Vec::new(),
            next_observer: 0,
            scroll_locks: SmallVec::new(),
            next_scroll_lock: 0,
        };
        doc.body = doc.insert(None, Element::generic());
        doc.layer = doc.insert(None, Element::generic().with_z_index(i32::MAX));
        doc
    }

    /// Root of the regular content.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Root of the detached top-level layer (portal target).
    pub fn layer(&self) -> NodeId {
        self.layer
    }

    /// Insert a new element as a child of `parent` (or as a root if `None`).
    pub fn insert(&mut self, parent: Option<NodeId>, element: Element) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, element));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, element)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        if let Some(p) = parent
            && self.is_alive(p)
        {
            self.node_mut(p).children.push(id);
            self.node_mut(id).parent = Some(p);
        }
        id
    }

    /// Render an element into the detached top-level layer.
    pub fn mount_in_layer(&mut self, element: Element) -> NodeId {
        let layer = self.layer;
        self.insert(Some(layer), element)
    }

    /// Remove an element and its subtree.
    ///
    /// Returns the removed identifiers in tree order. If the focused element
    /// was removed, focus returns to the document. The body and layer roots
    /// cannot be removed.
    pub fn remove(&mut self, id: NodeId) -> Vec<NodeId> {
        if !self.is_alive(id) || id == self.body || id == self.layer {
            return Vec::new();
        }
        let removed: Vec<NodeId> = self.descendants(id).collect();
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|c| *c != id);
        }
        if let Some(focused) = self.focused
            && removed.contains(&focused)
        {
            tracing::trace!("focused element removed; focus returns to the document");
            self.focused = None;
        }
        for r in &removed {
            self.nodes[r.idx()] = None;
            self.free_list.push(r.idx());
        }
        removed
    }

    /// Returns true if `id` refers to a live element.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .is_some_and(|n| n.generation == id.1)
    }

    /// Returns the element data of a live node.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.node_opt(id).map(|n| &n.element)
    }

    /// Returns the accessibility attributes of a live node.
    pub fn aria(&self, id: NodeId) -> Option<&Aria> {
        self.node_opt(id).map(|n| &n.element.aria)
    }

    /// Returns the accessibility attributes of a live node for mutation.
    pub fn aria_mut(&mut self, id: NodeId) -> Option<&mut Aria> {
        self.node_opt_mut(id).map(|n| &mut n.element.aria)
    }

    /// Returns the visible label of a live node.
    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.node_opt(id).map(|n| n.element.label.as_str())
    }

    /// Update the visible label.
    pub fn set_label(&mut self, id: NodeId, label: &str) {
        if let Some(n) = self.node_opt_mut(id)
            && n.element.label != label
        {
            n.element.label.clear();
            n.element.label.push_str(label);
        }
    }

    /// Returns the flags of a live node.
    pub fn flags(&self, id: NodeId) -> Option<ElementFlags> {
        self.node_opt(id).map(|n| n.element.flags)
    }

    /// Replace the flags of a live node.
    pub fn set_flags(&mut self, id: NodeId, flags: ElementFlags) {
        if let Some(n) = self.node_opt_mut(id) {
            n.element.flags = flags;
        }
        if !flags.contains(ElementFlags::VISIBLE)
            || flags.intersects(ElementFlags::DISABLED | ElementFlags::HIDDEN)
        {
            self.drop_focus_within(id);
        }
    }

    /// Set or clear a single flag.
    pub fn set_flag(&mut self, id: NodeId, flag: ElementFlags, on: bool) {
        if let Some(mut flags) = self.flags(id) {
            flags.set(flag, on);
            self.set_flags(id, flags);
        }
    }

    /// Update the explicit tab index.
    pub fn set_tab_index(&mut self, id: NodeId, tab_index: Option<i32>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.element.tab_index = tab_index;
        }
    }

    /// Returns the committed bounds of a live node.
    pub fn bounds(&self, id: NodeId) -> Option<Rect> {
        self.node_opt(id).map(|n| n.element.bounds)
    }

    /// Update bounds; takes effect on the next [`Document::commit`].
    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) {
        if let Some(n) = self.node_opt_mut(id) {
            n.pending_bounds = Some(bounds);
        }
    }

    /// Returns the parent of a node if live, or `None` for roots or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Get the children of a node, or empty slice if node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        match self.node_opt(id) {
            Some(n) => &n.children,
            None => &[],
        }
    }

    /// Whether `node` is `ancestor` or lies inside its subtree.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.is_alive(ancestor) || !self.is_alive(node) {
            return false;
        }
        let mut current = Some(node);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.parent_of(c);
        }
        false
    }

    /// Iterate `root` and its descendants in tree order (depth-first, pre-order).
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            root,
            next: self.is_alive(root).then_some(root),
        }
    }

    /// Get the next node in depth-first traversal order.
    ///
    /// Returns `None` if no next node exists or if the current node is stale.
    /// This is a standard tree traversal that does not wrap around.
    pub fn next_depth_first(&self, current: NodeId) -> Option<NodeId> {
        if !self.is_alive(current) {
            return None;
        }
        self.next_in_order(current, None)
    }

    /// Get the previous node in reverse depth-first traversal order.
    ///
    /// Returns `None` if no previous node exists or if the current node is stale.
    pub fn prev_depth_first(&self, current: NodeId) -> Option<NodeId> {
        if !self.is_alive(current) {
            return None;
        }
        if let Some(prev_sibling) = self.prev_sibling(current) {
            return Some(self.last_in_subtree(prev_sibling));
        }
        self.parent_of(current)
    }

    /// Whether the node or any ancestor is invisible, hidden, or aria-hidden.
    pub fn is_effectively_hidden(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            let Some(n) = self.node_opt(c) else {
                return true;
            };
            let flags = n.element.flags;
            if !flags.contains(ElementFlags::VISIBLE)
                || flags.intersects(ElementFlags::HIDDEN | ElementFlags::ARIA_HIDDEN)
            {
                return true;
            }
            current = n.parent;
        }
        false
    }

    /// Whether the element takes part in sequential keyboard navigation.
    ///
    /// Buttons, links, and form controls qualify unless removed with a
    /// negative tab index; other elements qualify with a non-negative tab
    /// index. Disabled and (effectively) hidden elements never qualify.
    pub fn is_interactive(&self, id: NodeId) -> bool {
        let Some(n) = self.node_opt(id) else {
            return false;
        };
        let e = &n.element;
        let tabbable = match e.tab_index {
            Some(t) => t >= 0,
            None => e.kind.is_natively_focusable(),
        };
        tabbable && !e.is_disabled() && !self.is_effectively_hidden(id)
    }

    /// Interactive elements inside `root` (inclusive), in tree order.
    ///
    /// This is a live query: it walks the current subtree on every call.
    pub fn interactive_descendants(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&id| self.is_interactive(id))
            .collect()
    }

    /// First element inside `root` carrying [`ElementFlags::AUTOFOCUS`] that can take focus.
    pub fn autofocus_target(&self, root: NodeId) -> Option<NodeId> {
        self.descendants(root).find(|&id| {
            self.flags(id)
                .is_some_and(|f| f.contains(ElementFlags::AUTOFOCUS))
                && self.can_focus(id)
        })
    }

    /// Whether [`Document::focus`] would accept `id`.
    pub fn can_focus(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|e| !e.is_disabled()) && !self.is_effectively_hidden(id)
    }

    /// The element holding document focus, if any.
    pub fn focused(&self) -> Option<NodeId> {
        self.focused.filter(|&f| self.is_alive(f))
    }

    /// Move document focus to `id`. Returns false (and leaves focus unchanged)
    /// when the element is stale, disabled, or hidden.
    pub fn focus(&mut self, id: NodeId) -> bool {
        if !self.can_focus(id) {
            return false;
        }
        self.focused = Some(id);
        true
    }

    /// Clear document focus.
    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// The committed viewport in document coordinates.
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Resize the viewport; takes effect on the next [`Document::commit`].
    pub fn set_viewport_size(&mut self, size: Size) {
        let base = self.pending_viewport.unwrap_or(self.viewport);
        self.pending_viewport = Some(Rect::from_origin_size(base.origin(), size));
    }

    /// Scroll the viewport so its top-left corner sits at `origin`; takes
    /// effect on the next [`Document::commit`].
    pub fn scroll_to(&mut self, origin: Point) {
        let base = self.pending_viewport.unwrap_or(self.viewport);
        self.pending_viewport = Some(Rect::from_origin_size(origin, base.size()));
    }

    /// Acquire a background scroll lock.
    pub fn lock_scroll(&mut self) -> ScrollLockId {
        self.next_scroll_lock += 1;
        let id = ScrollLockId(self.next_scroll_lock);
        self.scroll_locks.push(id);
        id
    }

    /// Release a scroll lock. Returns false if it was not held.
    pub fn unlock_scroll(&mut self, id: ScrollLockId) -> bool {
        let before = self.scroll_locks.len();
        self.scroll_locks.retain(|l| *l != id);
        before != self.scroll_locks.len()
    }

    /// Whether any scroll lock is held.
    pub fn is_scroll_locked(&self) -> bool {
        !self.scroll_locks.is_empty()
    }

    /// Register a layout observer for `node`.
    ///
    /// The observer is listed in [`Damage::notified`] whenever a commit moves
    /// the node or changes the viewport.
    pub fn observe(&mut self, node: NodeId) -> ObserverId {
        self.next_observer += 1;
        let id = ObserverId(self.next_observer);
        self.observers.push((id, node));
        id
    }

    /// Unregister a layout observer. Returns false if it was not registered.
    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(o, _)| *o != id);
        before != self.observers.len()
    }

    /// Number of registered layout observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Current commit counter.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Apply batched bounds and viewport changes and return the damage.
    pub fn commit(&mut self) -> Damage {
        let mut damage = Damage::default();

        if let Some(vp) = self.pending_viewport.take()
            && vp != self.viewport
        {
            self.viewport = vp;
            damage.viewport_changed = true;
        }

        for (i, slot) in self.nodes.iter_mut().enumerate() {
            let Some(node) = slot else { continue };
            let Some(new_bounds) = node.pending_bounds.take() else {
                continue;
            };
            let old = node.element.bounds;
            if old == new_bounds {
                continue;
            }
            node.element.bounds = new_bounds;
            if old.width() > 0.0 && old.height() > 0.0 {
                damage.dirty_rects.push(old);
            }
            if new_bounds.width() > 0.0 && new_bounds.height() > 0.0 {
                damage.dirty_rects.push(new_bounds);
            }
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            damage.moved.push(NodeId::new(i as u32, node.generation));
        }

        for &(observer, node) in &self.observers {
            if !self.is_alive(node) {
                continue;
            }
            if damage.viewport_changed || damage.moved.contains(&node) {
                damage.notified.push(observer);
            }
        }

        if !damage.is_empty() {
            self.epoch += 1;
        }
        damage.epoch = self.epoch;
        damage
    }

    /// Topmost visible element whose bounds contain `point`.
    ///
    /// Among candidates, higher `z_index` wins (inherited from the nearest
    /// ancestor that sets one higher); if that ties, deeper elements win; if that
    /// also ties, the newer [`NodeId`] wins.
    pub fn hit_test_point(&self, point: Point) -> Option<NodeId> {
        let mut best: Option<(NodeId, i32, usize)> = None;
        for root in [self.body, self.layer] {
            for id in self.descendants(root) {
                if self.is_effectively_hidden(id) {
                    continue;
                }
                let Some(node) = self.node_opt(id) else {
                    continue;
                };
                if !node.element.bounds.contains(point) {
                    continue;
                }
                let (z, depth) = self.stacking(id);
                let better = match best {
                    None => true,
                    Some((best_id, best_z, best_depth)) => {
                        z > best_z
                            || (z == best_z
                                && (depth > best_depth
                                    || (depth == best_depth && id_is_newer(id, best_id))))
                    }
                };
                if better {
                    best = Some((id, z, depth));
                }
            }
        }
        best.map(|(id, _, _)| id)
    }

    // --- internals ---

    fn stacking(&self, id: NodeId) -> (i32, usize) {
        let mut z = i32::MIN;
        let mut depth = 0;
        let mut current = Some(id);
        while let Some(c) = current {
            if let Some(n) = self.node_opt(c) {
                z = z.max(n.element.z_index);
                current = n.parent;
                depth += 1;
            } else {
                break;
            }
        }
        (z, depth)
    }

    fn drop_focus_within(&mut self, id: NodeId) {
        if let Some(f) = self.focused
            && self.contains(id, f)
        {
            self.focused = None;
        }
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    /// Access a node; panics if `id` is stale.
    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn next_in_order(&self, current: NodeId, bound: Option<NodeId>) -> Option<NodeId> {
        if let Some(&first_child) = self.node(current).children.first() {
            return Some(first_child);
        }
        let mut node = current;
        loop {
            if Some(node) == bound {
                return None;
            }
            if let Some(next_sibling) = self.next_sibling(node) {
                return Some(next_sibling);
            }
            node = self.parent_of(node)?;
        }
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent_of(node)?;
        let siblings = &self.node(parent).children;
        let pos = siblings.iter().position(|&id| id == node)?;
        siblings.get(pos + 1).copied()
    }

    fn prev_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent_of(node)?;
        let siblings = &self.node(parent).children;
        let pos = siblings.iter().position(|&id| id == node)?;
        pos.checked_sub(1).and_then(|p| siblings.get(p).copied())
    }

    fn last_in_subtree(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(&last) = self.node(current).children.last() {
            current = last;
        }
        current
    }
}

#[inline]
fn id_is_newer(a: NodeId, b: NodeId) -> bool {
    (a.1 > b.1) || (a.1 == b.1 && a.0 > b.0)
}

/// Iterator over a subtree in tree order, returned by [`Document::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    doc: &'a Document,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.next_in_order(current, Some(self.root));
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ElementKind;
    use alloc::vec;

    fn sample() -> (Document, NodeId, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let panel = doc.insert(Some(body), Element::generic());
        let a = doc.insert(Some(panel), Element::button("a"));
        let group = doc.insert(Some(panel), Element::generic());
        let b = doc.insert(Some(group), Element::button("b"));
        (doc, panel, a, group, b)
    }

    #[test]
    fn descendants_in_tree_order_and_bounded() {
        let (mut doc, panel, a, group, b) = sample();
        let after = doc.insert(Some(doc.body()), Element::button("after"));
        let order: Vec<_> = doc.descendants(panel).collect();
        assert_eq!(order, vec![panel, a, group, b]);
        assert!(!order.contains(&after), "iteration must stay inside the root");
    }

    #[test]
    fn depth_first_traversal_is_symmetric() {
        let (doc, panel, a, group, b) = sample();
        assert_eq!(doc.next_depth_first(panel), Some(a));
        assert_eq!(doc.next_depth_first(a), Some(group));
        assert_eq!(doc.next_depth_first(group), Some(b));
        assert_eq!(doc.prev_depth_first(b), Some(group));
        assert_eq!(doc.prev_depth_first(group), Some(a));
        assert_eq!(doc.prev_depth_first(a), Some(panel));
    }

    #[test]
    fn interactive_query_skips_disabled_hidden_and_negative_tab_index() {
        let mut doc = Document::new();
        let body = doc.body();
        let root = doc.insert(Some(body), Element::generic());
        let ok = doc.insert(Some(root), Element::button("ok"));
        let disabled = doc.insert(
            Some(root),
            Element::button("disabled").with_flags(ElementFlags::DISABLED),
        );
        let hidden_parent = doc.insert(
            Some(root),
            Element::generic().with_flags(ElementFlags::ARIA_HIDDEN),
        );
        let _inside_hidden = doc.insert(Some(hidden_parent), Element::button("inside"));
        let removed = doc.insert(Some(root), Element::button("removed").with_tab_index(-1));
        let tabbable_div = doc.insert(Some(root), Element::generic().with_tab_index(0));
        let link = doc.insert(
            Some(root),
            Element {
                kind: ElementKind::Link,
                ..Element::default()
            },
        );

        assert_eq!(doc.interactive_descendants(root), vec![ok, tabbable_div, link]);
        assert!(!doc.is_interactive(disabled));
        assert!(!doc.is_interactive(removed));
        // Programmatic focus still reaches tabindex=-1 elements.
        assert!(doc.focus(removed));
        assert!(!doc.focus(disabled));
    }

    #[test]
    fn removing_focused_subtree_drops_focus() {
        let (mut doc, panel, a, _group, b) = sample();
        assert!(doc.focus(b));
        let removed = doc.remove(panel);
        assert_eq!(removed.len(), 4);
        assert!(!doc.is_alive(a));
        assert_eq!(doc.focused(), None);
    }

    #[test]
    fn liveness_insert_remove_reuse() {
        let mut doc = Document::new();
        let body = doc.body();
        let a = doc.insert(Some(body), Element::generic());
        doc.remove(a);
        assert!(!doc.is_alive(a));
        let b = doc.insert(Some(body), Element::generic());
        assert!(doc.is_alive(b));
        assert_ne!(a, b, "generation must bump on slot reuse");
        assert!(doc.element(a).is_none());
    }

    #[test]
    fn roots_cannot_be_removed_and_layer_is_detached() {
        let mut doc = Document::new();
        assert!(doc.remove(doc.body()).is_empty());
        let panel = doc.mount_in_layer(Element::generic());
        assert!(doc.contains(doc.layer(), panel));
        assert!(!doc.contains(doc.body(), panel));
    }

    #[test]
    fn commit_notifies_observers_of_moved_nodes_and_viewport() {
        let (mut doc, panel, a, _group, b) = sample();
        let watch_a = doc.observe(a);
        let watch_b = doc.observe(b);
        doc.set_bounds(a, Rect::new(0.0, 0.0, 10.0, 10.0));
        let damage = doc.commit();
        assert!(damage.notifies(watch_a));
        assert!(!damage.notifies(watch_b));
        assert_eq!(damage.union_rect(), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));

        doc.scroll_to(Point::new(0.0, 100.0));
        let damage = doc.commit();
        assert!(damage.viewport_changed);
        assert!(damage.notifies(watch_a) && damage.notifies(watch_b));
        assert_eq!(doc.viewport().y0, 100.0);

        // Unchanged commits are empty and do not advance the epoch.
        let epoch = doc.epoch();
        doc.set_bounds(panel, Rect::ZERO);
        assert!(doc.commit().is_empty());
        assert_eq!(doc.epoch(), epoch);

        assert!(doc.unobserve(watch_a));
        assert!(!doc.unobserve(watch_a));
        assert_eq!(doc.observer_count(), 1);
    }

    #[test]
    fn scroll_locks_stack() {
        let mut doc = Document::new();
        let outer = doc.lock_scroll();
        let inner = doc.lock_scroll();
        assert!(doc.unlock_scroll(inner));
        assert!(doc.is_scroll_locked());
        assert!(doc.unlock_scroll(outer));
        assert!(!doc.is_scroll_locked());
    }

    #[test]
    fn hit_test_prefers_layer_and_z() {
        let mut doc = Document::new();
        let body = doc.body();
        let under = doc.insert(
            Some(body),
            Element::button("under").with_bounds(Rect::new(0.0, 0.0, 100.0, 100.0)),
        );
        let over = doc.mount_in_layer(
            Element::generic().with_bounds(Rect::new(50.0, 50.0, 150.0, 150.0)),
        );
        assert_eq!(doc.hit_test_point(Point::new(10.0, 10.0)), Some(under));
        assert_eq!(doc.hit_test_point(Point::new(60.0, 60.0)), Some(over));
        doc.set_flag(over, ElementFlags::HIDDEN, true);
        assert_eq!(doc.hit_test_point(Point::new(60.0, 60.0)), Some(under));
    }
}
