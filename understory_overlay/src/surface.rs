// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Floating content shared by the layered primitives: mounting in the
//! detached layer, anchoring, focus capture, dismissal, and scroll lock.

use alloc::rc::{Rc, Weak};
use core::fmt;

use kurbo::{Point, Rect, Size};
use smallvec::SmallVec;
use understory_anchor::{AnchorPair, Position, PositionAdapter, PositionConfig};
use understory_document::{Damage, Element, NodeId, NodeRef, Role, ScrollLockId};
use understory_dismiss::{DismissReason, DismissalCoordinator};
use understory_events::{
    Event, EventKind, Handler, Key, KeyEvent, ListenerId, PointerEvent, Propagating, compose,
};
use understory_focus::FocusManager;

use crate::env::{Component, Env, EventCx};

/// Builds floating content into its freshly mounted root.
pub type Content = Rc<dyn Fn(&mut Env, NodeId)>;

/// Host hooks run before floating content is dismissed.
///
/// A hook that prevents the event's default keeps the content open.
#[derive(Default)]
pub struct DismissHooks {
    /// Escape pressed while this content is the topmost layer.
    pub on_escape_key_down: Option<Handler<KeyEvent>>,
    /// Pointer pressed outside the content and its trigger.
    pub on_pointer_down_outside: Option<Handler<PointerEvent>>,
}

impl fmt::Debug for DismissHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DismissHooks")
            .field("on_escape_key_down", &self.on_escape_key_down.is_some())
            .field("on_pointer_down_outside", &self.on_pointer_down_outside.is_some())
            .finish()
    }
}

/// Dismissal layer armed while content is open.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum LayerKind {
    /// Outside presses and Escape.
    Full,
    /// Escape only; presses elsewhere leave the content alone.
    EscapeOnly,
}

/// Static behavior of one kind of floating content.
#[derive(Copy, Clone, Debug)]
pub(crate) struct SurfaceKind {
    pub(crate) role: Role,
    pub(crate) layer: LayerKind,
    /// Capture focus on open, trap Tab, restore on close.
    pub(crate) trap_focus: bool,
    /// Mount a full-viewport backdrop behind the content.
    pub(crate) backdrop: bool,
    pub(crate) lock_scroll: bool,
    pub(crate) modal: bool,
}

/// Mounted floating content and everything acquired for it.
pub(crate) struct Surface {
    pub(crate) kind: SurfaceKind,
    pub(crate) size: Size,
    pub(crate) hooks: DismissHooks,
    pub(crate) content: Option<Content>,
    floating: NodeRef,
    backdrop: Option<NodeId>,
    anchor: Option<PositionAdapter>,
    focus: FocusManager,
    dismiss: DismissalCoordinator,
    listeners: SmallVec<[ListenerId; 2]>,
    layout: Option<ListenerId>,
    scroll_lock: Option<ScrollLockId>,
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("kind", &self.kind)
            .field("root", &self.floating.get())
            .field("backdrop", &self.backdrop)
            .field("layer", &self.dismiss.layer())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Surface {
    /// Content anchored to `reference` with `position`, or centered when `None`.
    pub(crate) fn new(kind: SurfaceKind, reference: NodeRef, position: Option<PositionConfig>) -> Self {
        let floating = NodeRef::new();
        let anchor = position.map(|config| {
            PositionAdapter::new(
                AnchorPair {
                    reference,
                    floating: floating.clone(),
                },
                config,
            )
        });
        Self {
            kind,
            size: Size::new(160.0, 80.0),
            hooks: DismissHooks::default(),
            content: None,
            floating,
            backdrop: None,
            anchor,
            focus: FocusManager::new(),
            dismiss: DismissalCoordinator::new(),
            listeners: SmallVec::new(),
            layout: None,
            scroll_lock: None,
        }
    }

    pub(crate) fn root(&self) -> Option<NodeId> {
        self.floating.get()
    }

    pub(crate) fn backdrop(&self) -> Option<NodeId> {
        self.backdrop
    }

    pub(crate) fn is_mounted(&self) -> bool {
        self.floating.get().is_some()
    }

    /// Whether every resource acquired on open has been released.
    pub(crate) fn is_released(&self) -> bool {
        self.listeners.is_empty()
            && self.layout.is_none()
            && self.scroll_lock.is_none()
            && !self.dismiss.is_armed()
            && !self.focus.is_active()
            && self.anchor.as_ref().is_none_or(|a| !a.is_tracking())
    }

    pub(crate) fn position(&self) -> Option<Position> {
        self.anchor.as_ref().map(PositionAdapter::position)
    }

    pub(crate) fn set_position_config(&mut self, config: PositionConfig) {
        if let Some(a) = self.anchor.as_mut() {
            a.set_config(config);
        }
    }

    /// Mount an empty root in the detached layer, attaching `owner` to it.
    pub(crate) fn mount(&mut self, env: &mut Env, owner: &Rc<dyn Component>) -> NodeId {
        let viewport = env.doc().viewport();
        let mut element = Element::generic().with_role(self.kind.role);
        element.aria.modal = self.kind.modal;
        element.bounds = if self.anchor.is_some() {
            Rect::from_origin_size(Point::ORIGIN, self.size)
        } else {
            let origin = viewport.center() - self.size.to_vec2() / 2.0;
            Rect::from_origin_size(origin, self.size)
        };
        let root = if self.kind.backdrop {
            let backdrop = env.doc_mut().mount_in_layer(
                Element::generic()
                    .with_role(Role::Presentation)
                    .with_bounds(viewport),
            );
            env.attach(backdrop, owner.clone());
            self.backdrop = Some(backdrop);
            env.doc_mut().insert(Some(backdrop), element)
        } else {
            env.doc_mut().mount_in_layer(element)
        };
        env.attach(root, owner.clone());
        self.floating.set(Some(root));
        tracing::debug!(?root, role = ?self.kind.role, "floating content mounted");
        root
    }

    /// Acquire listeners, layer, scroll lock, position tracking, and focus for
    /// the mounted root.
    pub(crate) fn activate(
        &mut self,
        env: &mut Env,
        owner: &Rc<dyn Component>,
        trigger: Option<NodeId>,
    ) {
        let Some(root) = self.root() else {
            return;
        };
        match self.kind.layer {
            LayerKind::Full => {
                self.dismiss
                    .arm(env.layers_mut(), root, trigger, self.backdrop);
                self.listeners.push(env.listen(EventKind::Key, owner.clone()));
                self.listeners
                    .push(env.listen(EventKind::PointerDown, owner.clone()));
            }
            LayerKind::EscapeOnly => {
                self.dismiss
                    .arm_escape_only(env.layers_mut(), root, trigger);
                self.listeners.push(env.listen(EventKind::Key, owner.clone()));
            }
        }
        if self.kind.lock_scroll {
            self.scroll_lock = Some(env.doc_mut().lock_scroll());
        }
        if let Some(anchor) = self.anchor.as_mut() {
            anchor.sync(env.doc_mut(), true);
            let weak: Weak<dyn Component> = Rc::downgrade(owner);
            self.layout = Some(env.watch_layout(weak));
        }
        if self.kind.trap_focus {
            self.focus.on_open(env.doc_mut(), root, trigger);
        }
    }

    /// Release everything and unmount. Focus returns to the trigger (or the
    /// element focused before opening) when `restore_focus` is set.
    pub(crate) fn deactivate(&mut self, env: &mut Env, restore_focus: bool) {
        for id in self.listeners.drain(..) {
            env.unlisten(id);
        }
        if let Some(id) = self.layout.take() {
            env.unwatch_layout(id);
        }
        self.dismiss.disarm(env.layers_mut());
        if let Some(lock) = self.scroll_lock.take() {
            env.doc_mut().unlock_scroll(lock);
        }
        if let Some(anchor) = self.anchor.as_mut() {
            anchor.stop(env.doc_mut());
        }
        let outer = self.backdrop.take().or_else(|| self.floating.get());
        self.floating.set(None);
        if let Some(node) = outer {
            env.remove_subtree(node);
            tracing::debug!(?node, "floating content unmounted");
        }
        if restore_focus {
            self.focus.on_close(env.doc_mut());
        } else {
            self.focus.release();
        }
    }

    /// Follow a layout commit.
    pub(crate) fn on_layout(&mut self, env: &mut Env, damage: &Damage) {
        if let Some(anchor) = self.anchor.as_mut()
            && anchor.on_layout(env.doc_mut(), damage)
        {
            tracing::trace!(position = ?anchor.position(), "floating content repositioned");
        }
    }

    /// Run the document-level dismissal and trap rules for one event.
    ///
    /// Returns the dismissal reason when the content should close.
    pub(crate) fn on_document_event(
        &mut self,
        env: &mut Env,
        event: &mut Event,
        cx: &EventCx,
    ) -> Option<DismissReason> {
        let layer = self.dismiss.layer()?;
        match event {
            Event::Key(k) if k.key == Key::Escape => {
                if k.is_propagation_stopped() || !env.layers().is_topmost(layer) {
                    return None;
                }
                let mut reason = None;
                let dismiss = &self.dismiss;
                compose(k, self.hooks.on_escape_key_down.as_mut(), |k| {
                    reason = dismiss.on_key(env.layers(), k);
                });
                reason
            }
            Event::Key(k) if k.key == Key::Tab => {
                if self.kind.trap_focus && !self.focus_in_later_layer(env) {
                    self.focus.constrain(env.doc_mut(), k);
                }
                None
            }
            Event::PointerDown(p) => {
                let reason = self
                    .dismiss
                    .on_pointer_down(env.layers(), env.doc(), cx.target)?;
                let mut fire = false;
                compose(p, self.hooks.on_pointer_down_outside.as_mut(), |_| {
                    fire = true;
                });
                fire.then_some(reason)
            }
            _ => None,
        }
    }

    fn focus_in_later_layer(&self, env: &Env) -> bool {
        let (Some(layer), Some(focused)) = (self.dismiss.layer(), env.doc().focused()) else {
            return false;
        };
        env.layers()
            .above(layer)
            .iter()
            .any(|l| env.doc().contains(l.floating, focused))
    }
}
