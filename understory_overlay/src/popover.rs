// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Popover: a trigger toggling anchored, dismissable floating content.
//!
//! The open/closed machine in this module also drives [`crate::Menu`] and
//! [`crate::Dialog`]; they differ only in their surface kind, trigger mode,
//! and the extra item handling a menu adds.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::fmt;

use kurbo::Size;
use smallvec::SmallVec;
use understory_anchor::{Placement, Position, PositionConfig};
use understory_disclosure::{Controllable, OnChange};
use understory_document::{Damage, Element, NodeId, NodeRef, RefTarget, Role, merge_refs};
use understory_events::{Event, Handler, KeyEvent, Outcome, PointerEvent};

use crate::env::{Component, Env, EventCx};
use crate::menu::MenuState;
use crate::scope::{Provider, Scope, UsageError};
use crate::surface::{Content, DismissHooks, LayerKind, Surface, SurfaceKind};

/// Configuration of a [`Popover`].
pub struct PopoverProps {
    /// Controlled open state. `Some` makes the owner the authority.
    pub open: Option<bool>,
    /// Initial open state when uncontrolled.
    pub default_open: bool,
    /// Called with every requested open state, in both modes.
    pub on_open_change: Option<OnChange<bool>>,
    /// Preferred placement relative to the trigger.
    pub placement: Placement,
}

impl Default for PopoverProps {
    fn default() -> Self {
        Self {
            open: None,
            default_open: false,
            on_open_change: None,
            placement: Placement::BOTTOM,
        }
    }
}

impl fmt::Debug for PopoverProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopoverProps")
            .field("open", &self.open)
            .field("default_open", &self.default_open)
            .field("placement", &self.placement)
            .finish_non_exhaustive()
    }
}

/// What activating the trigger does.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum TriggerMode {
    Toggle,
    OpenOnly,
}

pub(crate) struct PopoverInner {
    me: Weak<RefCell<Self>>,
    pub(crate) name: &'static str,
    pub(crate) open: Controllable<bool>,
    mode: TriggerMode,
    trigger_ref: NodeRef,
    trigger: Option<NodeId>,
    pub(crate) surface: Surface,
    pub(crate) menu: Option<MenuState>,
    closers: SmallVec<[NodeId; 2]>,
    detached: bool,
}

impl fmt::Debug for PopoverInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopoverInner")
            .field("name", &self.name)
            .field("open", &self.open)
            .field("mode", &self.mode)
            .field("trigger", &self.trigger)
            .field("surface", &self.surface)
            .field("detached", &self.detached)
            .finish_non_exhaustive()
    }
}

impl PopoverInner {
    fn owner(&self) -> Option<Rc<dyn Component>> {
        let me: Rc<dyn Component> = self.me.upgrade()?;
        Some(me)
    }

    pub(crate) fn schedule(&self, env: &mut Env) {
        let me: Weak<dyn Component> = self.me.clone();
        env.schedule(me);
    }

    pub(crate) fn request_open(&mut self, env: &mut Env, open: bool) {
        if self.open.request_change(open) {
            tracing::debug!(primitive = self.name, open, "open state requested");
        }
        self.schedule(env);
    }

    fn on_event(
        &mut self,
        env: &mut Env,
        event: &mut Event,
        cx: &EventCx,
    ) -> Option<Rc<dyn Fn()>> {
        let Some(node) = cx.node else {
            if let Some(reason) = self.surface.on_document_event(env, event, cx) {
                tracing::debug!(primitive = self.name, ?reason, "dismissed");
                self.request_open(env, false);
            }
            return None;
        };
        if Some(node) == self.trigger {
            self.on_trigger(env, event);
            return None;
        }
        if self.closers.contains(&node) && matches!(event, Event::Click) {
            self.request_open(env, false);
            return None;
        }
        if self.menu.is_some() && cx.at_target() {
            return self.on_menu_event(env, event, node);
        }
        None
    }

    fn on_trigger(&mut self, env: &mut Env, event: &mut Event) {
        let open = *self.open.get();
        match event {
            Event::Click => match self.mode {
                TriggerMode::Toggle => self.request_open(env, !open),
                TriggerMode::OpenOnly if !open => self.request_open(env, true),
                TriggerMode::OpenOnly => {}
            },
            Event::Key(k) => {
                let Some(menu) = self.menu.as_mut() else {
                    return;
                };
                if menu.on_trigger_key(k) && !open {
                    self.request_open(env, true);
                }
            }
            _ => {}
        }
    }

    /// Bring the mounted content in line with the open state.
    ///
    /// Returns the fresh root and its builder when content was just mounted.
    fn sync(&mut self, env: &mut Env) -> Option<(NodeId, Option<Content>)> {
        if let Some(t) = self.trigger
            && !env.doc().is_alive(t)
        {
            tracing::debug!(primitive = self.name, "trigger removed; tearing down");
            self.trigger = None;
            self.trigger_ref.set(None);
            self.detached = true;
            self.teardown(env, false);
            self.open.request_change(false);
            return None;
        }
        if let Some(root) = self.surface.root()
            && !env.doc().is_alive(root)
        {
            tracing::debug!(primitive = self.name, "content removed while open");
            self.teardown(env, false);
            self.open.request_change(false);
        }
        let want = *self.open.get() && !self.detached;
        let mounted = match (want, self.surface.is_mounted()) {
            (true, false) => {
                let owner = self.owner()?;
                let root = self.surface.mount(env, &owner);
                Some((root, self.surface.content.clone()))
            }
            (false, true) => {
                self.teardown(env, true);
                None
            }
            _ => None,
        };
        self.update_trigger(env);
        mounted
    }

    fn activate(&mut self, env: &mut Env) {
        let Some(owner) = self.owner() else {
            return;
        };
        self.surface.activate(env, &owner, self.trigger);
        if let (Some(menu), Some(root)) = (self.menu.as_mut(), self.surface.root()) {
            menu.after_open(env, root);
        }
        self.update_trigger(env);
        tracing::debug!(primitive = self.name, root = ?self.surface.root(), "opened");
    }

    fn teardown(&mut self, env: &mut Env, restore_focus: bool) {
        if !self.surface.is_mounted() && self.surface.is_released() {
            return;
        }
        self.surface.deactivate(env, restore_focus);
        self.closers.clear();
        if let Some(menu) = self.menu.as_mut() {
            menu.reset();
        }
        tracing::debug!(primitive = self.name, restore_focus, "closed");
    }

    fn update_trigger(&self, env: &mut Env) {
        let Some(t) = self.trigger else {
            return;
        };
        let expanded = self.surface.is_mounted();
        let root = self.surface.root();
        let role = self.surface.kind.role;
        if let Some(aria) = env.doc_mut().aria_mut(t) {
            aria.expanded = Some(expanded);
            aria.has_popup = Some(role);
            aria.controls = root;
        }
    }
}

impl Component for RefCell<PopoverInner> {
    fn handle(&self, env: &mut Env, event: &mut Event, cx: &EventCx) -> Outcome {
        let deferred = {
            let Ok(mut this) = self.try_borrow_mut() else {
                tracing::warn!(kind = ?event.kind(), "re-entrant event skipped");
                return Outcome::Continue;
            };
            this.on_event(env, event, cx)
        };
        if let Some(on_select) = deferred {
            on_select();
        }
        Outcome::Continue
    }

    fn reconcile(&self, env: &mut Env) {
        let mounted = {
            let Ok(mut this) = self.try_borrow_mut() else {
                tracing::warn!("re-entrant reconcile skipped");
                return;
            };
            this.sync(env)
        };
        let Some((root, content)) = mounted else {
            return;
        };
        if let Some(build) = content {
            build(env, root);
        }
        match self.try_borrow_mut() {
            Ok(mut this) => this.activate(env),
            Err(_) => tracing::warn!("content builder kept the primitive borrowed"),
        }
    }

    fn on_layout(&self, env: &mut Env, damage: &Damage) {
        if let Ok(mut this) = self.try_borrow_mut() {
            this.surface.on_layout(env, damage);
        }
    }
}

/// Shared open/closed machine behind popovers, menus, and dialogs.
#[derive(Clone, Debug)]
pub(crate) struct Disclosure(pub(crate) Rc<RefCell<PopoverInner>>);

impl Disclosure {
    pub(crate) fn new(
        name: &'static str,
        kind: SurfaceKind,
        mode: TriggerMode,
        open: Controllable<bool>,
        position: Option<PositionConfig>,
        menu: Option<MenuState>,
    ) -> Self {
        let trigger_ref = NodeRef::new();
        Self(Rc::new_cyclic(|me| {
            RefCell::new(PopoverInner {
                me: me.clone(),
                name,
                open,
                mode,
                surface: Surface::new(kind, trigger_ref.clone(), position),
                trigger_ref,
                trigger: None,
                menu,
                closers: SmallVec::new(),
                detached: false,
            })
        }))
    }

    /// Run `f` on the machine unless it is mid-dispatch.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut PopoverInner) -> R) -> Option<R> {
        match self.0.try_borrow_mut() {
            Ok(mut this) => Some(f(&mut this)),
            Err(_) => {
                tracing::warn!("primitive is busy; call ignored");
                None
            }
        }
    }

    fn read<R>(&self, f: impl FnOnce(&PopoverInner) -> R) -> Option<R> {
        self.0.try_borrow().ok().map(|this| f(&this))
    }

    fn owner(&self) -> Rc<dyn Component> {
        self.0.clone()
    }

    pub(crate) fn is_open(&self) -> bool {
        self.read(|this| *this.open.get()).unwrap_or(false)
    }

    pub(crate) fn set_open(&self, env: &mut Env, open: bool) {
        self.with(|this| this.request_open(env, open));
        env.flush();
    }

    pub(crate) fn sync_open(&self, env: &mut Env, open: Option<bool>) {
        self.with(|this| {
            this.open.sync_props(open);
            this.schedule(env);
        });
        env.flush();
    }

    pub(crate) fn trigger(&self) -> Option<NodeId> {
        self.read(|this| this.trigger).flatten()
    }

    pub(crate) fn content(&self) -> Option<NodeId> {
        self.read(|this| this.surface.root()).flatten()
    }

    pub(crate) fn backdrop(&self) -> Option<NodeId> {
        self.read(|this| this.surface.backdrop()).flatten()
    }

    pub(crate) fn position(&self) -> Option<Position> {
        self.read(|this| this.surface.position()).flatten()
    }

    pub(crate) fn is_released(&self) -> bool {
        self.read(|this| !this.surface.is_mounted() && this.surface.is_released())
            .unwrap_or(false)
    }

    pub(crate) fn set_placement(&self, placement: Placement) {
        self.with(|this| {
            this.surface
                .set_position_config(PositionConfig::with_placement(placement));
        });
    }

    pub(crate) fn mount_trigger(
        &self,
        env: &mut Env,
        parent: NodeId,
        element: Element,
        extra: Option<RefTarget>,
    ) -> NodeId {
        let node = env.doc_mut().insert(Some(parent), element);
        let owner = self.owner();
        env.attach(node, owner.clone());
        self.with(|this| {
            if let Some(old) = this.trigger.replace(node) {
                env.detach(old, &owner);
            }
            this.detached = false;
            merge_refs([Some(RefTarget::Slot(this.trigger_ref.clone())), extra]).set(Some(node));
            this.update_trigger(env);
            this.schedule(env);
        });
        env.flush();
        node
    }

    pub(crate) fn set_content(
        &self,
        env: &mut Env,
        size: Size,
        hooks: DismissHooks,
        content: Content,
    ) {
        self.with(|this| {
            // Content registered while open replaces what is mounted.
            if this.surface.is_mounted() {
                this.teardown(env, false);
            }
            this.surface.size = size;
            this.surface.hooks = hooks;
            this.surface.content = Some(content);
            this.schedule(env);
        });
        env.flush();
    }

    pub(crate) fn mount_closer(&self, env: &mut Env, parent: NodeId, element: Element) -> NodeId {
        let node = env.doc_mut().insert(Some(parent), element);
        env.attach(node, self.owner());
        self.with(|this| this.closers.push(node));
        node
    }

    /// Insert a title under `parent` and label the content root with it.
    pub(crate) fn mount_title(&self, env: &mut Env, parent: NodeId, element: Element) -> NodeId {
        let node = env.doc_mut().insert(Some(parent), element);
        if let Some(root) = self.content()
            && let Some(aria) = env.doc_mut().aria_mut(root)
        {
            aria.labelled_by = Some(node);
        }
        node
    }

    pub(crate) fn unmount(&self, env: &mut Env) {
        let owner = self.owner();
        self.with(|this| {
            this.teardown(env, false);
            this.open.request_change(false);
            if let Some(t) = this.trigger.take() {
                env.detach(t, &owner);
            }
            this.trigger_ref.set(None);
            this.detached = true;
            this.update_trigger(env);
        });
        env.flush();
    }
}

/// A trigger and anchored floating content.
///
/// ```rust
/// use kurbo::Point;
/// use understory_document::Element;
/// use understory_overlay::{Env, Popover, PopoverContent, PopoverProps, PopoverTrigger, Scope};
///
/// let mut env = Env::new();
/// let body = env.doc().body();
/// let popover = Popover::new(PopoverProps::default());
/// let scope = popover.provide(&Scope::new());
///
/// let trigger = PopoverTrigger::within(&scope)?.mount(&mut env, body, Element::button("Share"));
/// PopoverContent::within(&scope)?.render(&mut env, |env, root| {
///     env.doc_mut().insert(Some(root), Element::button("Copy link"));
/// });
///
/// env.click(trigger);
/// assert!(popover.is_open());
/// assert!(popover.content().is_some());
///
/// // A press on empty space dismisses it.
/// env.pointer_down(None, Point::new(900.0, 700.0));
/// assert!(!popover.is_open());
/// assert_eq!(env.doc().focused(), Some(trigger));
/// # Ok::<(), understory_overlay::UsageError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Popover(pub(crate) Disclosure);

impl Provider for Popover {
    const NAME: &'static str = "Popover";
}

impl Popover {
    /// Kind of floating content a popover mounts.
    pub(crate) const SURFACE: SurfaceKind = SurfaceKind {
        role: Role::Dialog,
        layer: LayerKind::Full,
        trap_focus: true,
        backdrop: false,
        lock_scroll: false,
        modal: false,
    };

    /// Create a popover. Nothing is mounted until its parts are.
    pub fn new(props: PopoverProps) -> Self {
        let open = Controllable::from_props(props.open, props.default_open, props.on_open_change);
        Self(Disclosure::new(
            Self::NAME,
            Self::SURFACE,
            TriggerMode::Toggle,
            open,
            Some(PositionConfig::with_placement(props.placement)),
            None,
        ))
    }

    /// A scope providing this popover to its parts.
    pub fn provide(&self, scope: &Scope) -> Scope {
        scope.provide(self.clone())
    }

    /// Whether the popover is open.
    pub fn is_open(&self) -> bool {
        self.0.is_open()
    }

    /// Request an open state, as the trigger would.
    pub fn set_open(&self, env: &mut Env, open: bool) {
        self.0.set_open(env, open);
    }

    /// Pass new `open` props from the owner.
    pub fn sync_open(&self, env: &mut Env, open: Option<bool>) {
        self.0.sync_open(env, open);
    }

    /// Change the preferred placement.
    pub fn set_placement(&self, placement: Placement) {
        self.0.set_placement(placement);
    }

    /// The mounted trigger.
    pub fn trigger(&self) -> Option<NodeId> {
        self.0.trigger()
    }

    /// Root of the floating content while open.
    pub fn content(&self) -> Option<NodeId> {
        self.0.content()
    }

    /// Last computed position of the content.
    pub fn position(&self) -> Option<Position> {
        self.0.position()
    }

    /// Whether no content is mounted and every listener, observer, and layer
    /// acquired for it has been released.
    pub fn is_released(&self) -> bool {
        self.0.is_released()
    }

    /// Tear everything down, close, and detach from the trigger.
    pub fn unmount(&self, env: &mut Env) {
        self.0.unmount(env);
    }
}

/// The element that toggles a [`Popover`].
#[derive(Debug)]
pub struct PopoverTrigger {
    popover: Popover,
    node_ref: Option<RefTarget>,
}

impl PopoverTrigger {
    /// The trigger of the innermost popover in `scope`.
    pub fn within(scope: &Scope) -> Result<Self, UsageError> {
        Ok(Self {
            popover: scope.require("PopoverTrigger")?,
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
        self.popover.0.mount_trigger(env, parent, element, self.node_ref)
    }
}

/// Floating content of a [`Popover`].
#[derive(Debug)]
pub struct PopoverContent {
    popover: Popover,
    size: Size,
    hooks: DismissHooks,
}

impl PopoverContent {
    /// The content of the innermost popover in `scope`.
    pub fn within(scope: &Scope) -> Result<Self, UsageError> {
        Ok(Self {
            popover: scope.require("PopoverContent")?,
            size: Size::new(240.0, 120.0),
            hooks: DismissHooks::default(),
        })
    }

    /// Size of the floating root.
    pub fn size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Run before Escape dismisses; preventing the default keeps it open.
    pub fn on_escape_key_down(mut self, hook: impl FnMut(&mut KeyEvent) + 'static) -> Self {
        self.hooks.on_escape_key_down = Some(Box::new(hook) as Handler<KeyEvent>);
        self
    }

    /// Run before an outside press dismisses; preventing the default keeps it open.
    pub fn on_pointer_down_outside(
        mut self,
        hook: impl FnMut(&mut PointerEvent) + 'static,
    ) -> Self {
        self.hooks.on_pointer_down_outside = Some(Box::new(hook) as Handler<PointerEvent>);
        self
    }

    /// Register the content builder. It runs each time the popover opens,
    /// with the freshly mounted root.
    pub fn render(self, env: &mut Env, build: impl Fn(&mut Env, NodeId) + 'static) {
        self.popover
            .0
            .set_content(env, self.size, self.hooks, Rc::new(build));
    }
}

/// A button inside popover content that closes it.
#[derive(Debug)]
pub struct PopoverClose {
    popover: Popover,
}

impl PopoverClose {
    /// The close button of the innermost popover in `scope`.
    pub fn within(scope: &Scope) -> Result<Self, UsageError> {
        Ok(Self {
            popover: scope.require("PopoverClose")?,
        })
    }

    /// Insert `element` under `parent` as a close button.
    pub fn mount(self, env: &mut Env, parent: NodeId, element: Element) -> NodeId {
        self.popover.0.mount_closer(env, parent, element)
    }
}
