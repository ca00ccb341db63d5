// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tooltip: a description shown after the pointer or focus rests on a trigger.
//!
//! Opening and closing are both delayed. Entering the trigger (or the
//! tooltip itself) cancels a pending close; leaving cancels a pending open.
//! Tooltips never take focus. While shown, a tooltip arms an Escape-only
//! layer: the first Escape hides it and goes no further, and presses
//! elsewhere leave it to its hover and focus delays.

use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::fmt;

use kurbo::Size;
use understory_anchor::{Placement, Position, PositionConfig};
use understory_disclosure::{Controllable, OnChange};
use understory_document::{Damage, Element, NodeId, NodeRef, RefTarget, Role, merge_refs};
use understory_events::timer::{HoverChange, HoverIntent};
use understory_events::{Event, EventKind, ListenerId, Outcome};

use crate::env::{Component, Env, EventCx};
use crate::scope::{Provider, Scope, UsageError};
use crate::surface::{LayerKind, Surface, SurfaceKind};

/// Open and close delays of a tooltip, in milliseconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct TooltipDelays {
    /// Delay between enter and open.
    pub open_ms: u64,
    /// Delay between leave and close.
    pub close_ms: u64,
}

impl Default for TooltipDelays {
    fn default() -> Self {
        Self {
            open_ms: 150,
            close_ms: 150,
        }
    }
}

/// Configuration of a [`Tooltip`].
pub struct TooltipProps {
    /// Controlled open state.
    pub open: Option<bool>,
    /// Initial open state when uncontrolled.
    pub default_open: bool,
    /// Called with every requested open state.
    pub on_open_change: Option<OnChange<bool>>,
    /// Open and close delays.
    pub delays: TooltipDelays,
    /// Preferred placement relative to the trigger.
    pub placement: Placement,
}

impl Default for TooltipProps {
    fn default() -> Self {
        Self {
            open: None,
            default_open: false,
            on_open_change: None,
            delays: TooltipDelays::default(),
            placement: Placement::TOP,
        }
    }
}

impl fmt::Debug for TooltipProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TooltipProps")
            .field("open", &self.open)
            .field("default_open", &self.default_open)
            .field("delays", &self.delays)
            .field("placement", &self.placement)
            .finish_non_exhaustive()
    }
}

struct TooltipInner {
    me: Weak<RefCell<Self>>,
    open: Controllable<bool>,
    intent: HoverIntent,
    trigger_ref: NodeRef,
    trigger: Option<NodeId>,
    surface: Surface,
    tick: Option<ListenerId>,
    detached: bool,
}

impl fmt::Debug for TooltipInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TooltipInner")
            .field("open", &self.open)
            .field("intent", &self.intent)
            .field("trigger", &self.trigger)
            .field("surface", &self.surface)
            .finish_non_exhaustive()
    }
}

const SURFACE: SurfaceKind = SurfaceKind {
    role: Role::Tooltip,
    layer: LayerKind::EscapeOnly,
    trap_focus: false,
    backdrop: false,
    lock_scroll: false,
    modal: false,
};

impl TooltipInner {
    fn owner(&self) -> Option<Rc<dyn Component>> {
        let me: Rc<dyn Component> = self.me.upgrade()?;
        Some(me)
    }

    fn schedule(&self, env: &mut Env) {
        let me: Weak<dyn Component> = self.me.clone();
        env.schedule(me);
    }

    fn apply(&mut self, env: &mut Env, change: Option<HoverChange>) {
        let Some(change) = change else {
            // A timer may have been armed or cancelled.
            self.schedule(env);
            return;
        };
        let open = change == HoverChange::Open;
        tracing::debug!(open, "tooltip hover intent settled");
        self.open.request_change(open);
        self.schedule(env);
    }

    fn on_event(&mut self, env: &mut Env, event: &mut Event, cx: &EventCx) {
        let now = env.now();
        let open = *self.open.get();
        let Some(node) = cx.node else {
            match event {
                Event::Tick(now) => {
                    let change = self.intent.poll(*now);
                    if change.is_some() {
                        self.apply(env, change);
                    }
                }
                _ => {
                    if let Some(reason) = self.surface.on_document_event(env, event, cx) {
                        tracing::debug!(?reason, "tooltip dismissed");
                        self.intent.cancel();
                        self.apply(env, Some(HoverChange::Close));
                    }
                }
            }
            return;
        };
        let on_trigger = Some(node) == self.trigger;
        let on_content = self.surface.root() == Some(node);
        if (!on_trigger && !on_content) || !cx.at_target() {
            return;
        }
        match event {
            Event::PointerEnter => {
                let change = self.intent.enter(now, open);
                self.apply(env, change);
            }
            Event::Focus if on_trigger => {
                let change = self.intent.enter(now, open);
                self.apply(env, change);
            }
            Event::PointerLeave => {
                let change = self.intent.leave(now, open);
                self.apply(env, change);
            }
            Event::Blur if on_trigger => {
                let change = self.intent.leave(now, open);
                self.apply(env, change);
            }
            _ => {}
        }
    }

    fn sync(&mut self, env: &mut Env) -> Option<(NodeId, Option<crate::surface::Content>)> {
        if let Some(t) = self.trigger
            && !env.doc().is_alive(t)
        {
            tracing::debug!("tooltip trigger removed; tearing down");
            self.trigger = None;
            self.trigger_ref.set(None);
            self.detached = true;
            self.intent.cancel();
            self.open.request_change(false);
            self.release(env);
            return None;
        }
        let want = *self.open.get() && !self.detached;
        let mounted = match (want, self.surface.is_mounted()) {
            (true, false) => {
                let owner = self.owner()?;
                let root = self.surface.mount(env, &owner);
                Some((root, self.surface.content.clone()))
            }
            (false, true) => {
                self.surface.deactivate(env, false);
                None
            }
            _ => None,
        };
        self.sync_listeners(env);
        self.update_trigger(env);
        mounted
    }

    fn sync_listeners(&mut self, env: &mut Env) {
        let want_tick = self.intent.is_pending() && !self.detached;
        match (want_tick, self.tick) {
            (true, None) => {
                if let Some(owner) = self.owner() {
                    self.tick = Some(env.listen(EventKind::Tick, owner));
                }
            }
            (false, Some(id)) => {
                env.unlisten(id);
                self.tick = None;
            }
            _ => {}
        }
    }

    fn release(&mut self, env: &mut Env) {
        self.surface.deactivate(env, false);
        if let Some(id) = self.tick.take() {
            env.unlisten(id);
        }
    }

    fn update_trigger(&self, env: &mut Env) {
        let Some(t) = self.trigger else {
            return;
        };
        let root = self.surface.root();
        if let Some(aria) = env.doc_mut().aria_mut(t) {
            aria.described_by = root;
        }
    }
}

impl Component for RefCell<TooltipInner> {
    fn handle(&self, env: &mut Env, event: &mut Event, cx: &EventCx) -> Outcome {
        match self.try_borrow_mut() {
            Ok(mut this) => this.on_event(env, event, cx),
            Err(_) => tracing::warn!(kind = ?event.kind(), "re-entrant event skipped"),
        }
        Outcome::Continue
    }

    fn reconcile(&self, env: &mut Env) {
        let mounted = match self.try_borrow_mut() {
            Ok(mut this) => this.sync(env),
            Err(_) => {
                tracing::warn!("re-entrant reconcile skipped");
                return;
            }
        };
        let Some((root, content)) = mounted else {
            return;
        };
        if let Some(build) = content {
            build(env, root);
        }
        if let Ok(mut this) = self.try_borrow_mut()
            && let Some(owner) = this.owner()
        {
            let trigger = this.trigger;
            this.surface.activate(env, &owner, trigger);
            this.sync_listeners(env);
            this.update_trigger(env);
        }
    }

    fn on_layout(&self, env: &mut Env, damage: &Damage) {
        if let Ok(mut this) = self.try_borrow_mut() {
            this.surface.on_layout(env, damage);
        }
    }
}

/// A delayed description attached to a trigger.
///
/// ```rust
/// use understory_document::Element;
/// use understory_overlay::{Env, Scope, Tooltip, TooltipContent, TooltipProps, TooltipTrigger};
///
/// let mut env = Env::new();
/// let body = env.doc().body();
/// let tooltip = Tooltip::new(TooltipProps::default());
/// let scope = tooltip.provide(&Scope::new());
/// let trigger = TooltipTrigger::within(&scope)?.mount(&mut env, body, Element::button("?"));
/// TooltipContent::within(&scope)?.text("Keyboard shortcuts").mount(&mut env);
///
/// env.pointer_enter(trigger);
/// env.advance_to(100);
/// assert!(!tooltip.is_open());
/// env.advance_to(150);
/// assert!(tooltip.is_open());
/// assert_eq!(env.doc().aria(trigger).unwrap().described_by, tooltip.content());
///
/// env.pointer_leave(trigger);
/// env.advance_to(300);
/// assert!(!tooltip.is_open());
/// # Ok::<(), understory_overlay::UsageError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Tooltip(Rc<RefCell<TooltipInner>>);

impl Provider for Tooltip {
    const NAME: &'static str = "Tooltip";
}

impl Tooltip {
    /// Create a tooltip.
    pub fn new(props: TooltipProps) -> Self {
        let open = Controllable::from_props(props.open, props.default_open, props.on_open_change);
        let trigger_ref = NodeRef::new();
        Self(Rc::new_cyclic(|me| {
            RefCell::new(TooltipInner {
                me: me.clone(),
                open,
                intent: HoverIntent::new(props.delays.open_ms, props.delays.close_ms),
                surface: Surface::new(
                    SURFACE,
                    trigger_ref.clone(),
                    Some(PositionConfig::with_placement(props.placement)),
                ),
                trigger_ref,
                trigger: None,
                tick: None,
                detached: false,
            })
        }))
    }

    /// A scope providing this tooltip to its parts.
    pub fn provide(&self, scope: &Scope) -> Scope {
        scope.provide(self.clone())
    }

    fn with<R>(&self, f: impl FnOnce(&mut TooltipInner) -> R) -> Option<R> {
        match self.0.try_borrow_mut() {
            Ok(mut this) => Some(f(&mut this)),
            Err(_) => {
                tracing::warn!("tooltip is busy; call ignored");
                None
            }
        }
    }

    /// Whether the tooltip is open.
    pub fn is_open(&self) -> bool {
        self.0.try_borrow().is_ok_and(|this| *this.open.get())
    }

    /// Whether an open or close delay is running.
    pub fn is_pending(&self) -> bool {
        self.0.try_borrow().is_ok_and(|this| this.intent.is_pending())
    }

    /// Request an open state immediately, cancelling any pending delay.
    pub fn set_open(&self, env: &mut Env, open: bool) {
        self.with(|this| {
            this.intent.cancel();
            this.open.request_change(open);
            this.schedule(env);
        });
        env.flush();
    }

    /// Pass new `open` props from the owner.
    pub fn sync_open(&self, env: &mut Env, open: Option<bool>) {
        self.with(|this| {
            this.open.sync_props(open);
            this.schedule(env);
        });
        env.flush();
    }

    /// The mounted trigger.
    pub fn trigger(&self) -> Option<NodeId> {
        self.0.try_borrow().ok().and_then(|this| this.trigger)
    }

    /// Root of the tooltip while open.
    pub fn content(&self) -> Option<NodeId> {
        self.0.try_borrow().ok().and_then(|this| this.surface.root())
    }

    /// Last computed position of the tooltip.
    pub fn position(&self) -> Option<Position> {
        self.0
            .try_borrow()
            .ok()
            .and_then(|this| this.surface.position())
    }

    /// Whether nothing is mounted, no timer listener is armed, and no
    /// observer is held.
    pub fn is_released(&self) -> bool {
        self.0.try_borrow().is_ok_and(|this| {
            !this.surface.is_mounted()
                && this.surface.is_released()
                && this.tick.is_none()
        })
    }

    /// Tear everything down, close, and detach from the trigger.
    pub fn unmount(&self, env: &mut Env) {
        let owner: Rc<dyn Component> = self.0.clone();
        self.with(|this| {
            this.intent.cancel();
            this.open.request_change(false);
            this.release(env);
            if let Some(t) = this.trigger.take() {
                if let Some(aria) = env.doc_mut().aria_mut(t) {
                    aria.described_by = None;
                }
                env.detach(t, &owner);
            }
            this.trigger_ref.set(None);
            this.detached = true;
        });
        env.flush();
    }
}

/// The element a [`Tooltip`] describes.
#[derive(Debug)]
pub struct TooltipTrigger {
    tooltip: Tooltip,
    node_ref: Option<RefTarget>,
}

impl TooltipTrigger {
    /// The trigger of the innermost tooltip in `scope`.
    pub fn within(scope: &Scope) -> Result<Self, UsageError> {
        Ok(Self {
            tooltip: scope.require("TooltipTrigger")?,
            node_ref: None,
        })
    }

    /// Also deliver the trigger element to `target`.
    pub fn with_ref(mut self, target: impl Into<RefTarget>) -> Self {
        self.node_ref = Some(target.into());
        self
    }

    /// Insert `element` under `parent` as the trigger.
    pub fn mount(self, env: &mut Env, parent: NodeId, element: Element) -> NodeId {
        let node = env.doc_mut().insert(Some(parent), element);
        let owner: Rc<dyn Component> = self.tooltip.0.clone();
        env.attach(node, owner.clone());
        let extra = self.node_ref;
        self.tooltip.with(|this| {
            if let Some(old) = this.trigger.replace(node) {
                env.detach(old, &owner);
            }
            this.detached = false;
            merge_refs([Some(RefTarget::Slot(this.trigger_ref.clone())), extra]).set(Some(node));
            this.schedule(env);
        });
        env.flush();
        node
    }
}

/// The floating description of a [`Tooltip`].
#[derive(Debug)]
pub struct TooltipContent {
    tooltip: Tooltip,
    size: Size,
    text: Option<alloc::string::String>,
}

impl TooltipContent {
    /// The content of the innermost tooltip in `scope`.
    pub fn within(scope: &Scope) -> Result<Self, UsageError> {
        Ok(Self {
            tooltip: scope.require("TooltipContent")?,
            size: Size::new(160.0, 32.0),
            text: None,
        })
    }

    /// Size of the floating root.
    pub fn size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Plain text shown as the tooltip's label.
    pub fn text(mut self, text: impl Into<alloc::string::String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Register plain-text content.
    pub fn mount(self, env: &mut Env) {
        let text = self.text.clone().unwrap_or_default();
        self.render(env, move |env, root| env.doc_mut().set_label(root, &text));
    }

    /// Register a content builder; it runs each time the tooltip opens.
    pub fn render(self, env: &mut Env, build: impl Fn(&mut Env, NodeId) + 'static) {
        let size = self.size;
        self.tooltip.with(|this| {
            if this.surface.is_mounted() {
                this.surface.deactivate(env, false);
            }
            this.surface.size = size;
            this.surface.content = Some(Rc::new(build));
            this.schedule(env);
        });
        env.flush();
    }
}
