// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dialog: modal content centered over a dimming backdrop.
//!
//! The trigger only opens. While open, background scroll is locked, focus is
//! trapped inside the content, and the content closes on Escape, on a press
//! outside it (including the backdrop), or through a [`DialogClose`] button.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::fmt;

use kurbo::Size;
use understory_disclosure::{Controllable, OnChange};
use understory_document::{Element, NodeId, RefTarget, Role};
use understory_events::{Handler, KeyEvent, PointerEvent};

use crate::env::Env;
use crate::popover::{Disclosure, TriggerMode};
use crate::scope::{Provider, Scope, UsageError};
use crate::surface::{DismissHooks, LayerKind, SurfaceKind};

/// Configuration of a [`Dialog`].
#[derive(Default)]
pub struct DialogProps {
    /// Controlled open state.
    pub open: Option<bool>,
    /// Initial open state when uncontrolled.
    pub default_open: bool,
    /// Called with every requested open state.
    pub on_open_change: Option<OnChange<bool>>,
}

impl fmt::Debug for DialogProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogProps")
            .field("open", &self.open)
            .field("default_open", &self.default_open)
            .finish_non_exhaustive()
    }
}

/// A modal dialog.
///
/// ```rust
/// use understory_document::Element;
/// use understory_events::{Key, KeyEvent};
/// use understory_overlay::{Dialog, DialogContent, DialogProps, DialogTrigger, Env, Scope};
///
/// let mut env = Env::new();
/// let body = env.doc().body();
/// let dialog = Dialog::new(DialogProps::default());
/// let scope = dialog.provide(&Scope::new());
///
/// let trigger = DialogTrigger::within(&scope)?.mount(&mut env, body, Element::button("Delete"));
/// DialogContent::within(&scope)?.render(&mut env, |env, root| {
///     env.doc_mut().insert(Some(root), Element::button("Confirm"));
/// });
///
/// env.focus(trigger);
/// env.key(KeyEvent::new(Key::Enter));
/// assert!(dialog.is_open());
/// assert!(env.doc().is_scroll_locked());
///
/// env.key(KeyEvent::new(Key::Escape));
/// assert!(!dialog.is_open());
/// assert!(!env.doc().is_scroll_locked());
/// assert_eq!(env.doc().focused(), Some(trigger));
/// # Ok::<(), understory_overlay::UsageError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Dialog(Disclosure);

impl Provider for Dialog {
    const NAME: &'static str = "Dialog";
}

impl Dialog {
    const SURFACE: SurfaceKind = SurfaceKind {
        role: Role::Dialog,
        layer: LayerKind::Full,
        trap_focus: true,
        backdrop: true,
        lock_scroll: true,
        modal: true,
    };

    /// Create a dialog.
    pub fn new(props: DialogProps) -> Self {
        let open = Controllable::from_props(props.open, props.default_open, props.on_open_change);
        Self(Disclosure::new(
            Self::NAME,
            Self::SURFACE,
            TriggerMode::OpenOnly,
            open,
            None,
            None,
        ))
    }

    /// A scope providing this dialog to its parts.
    pub fn provide(&self, scope: &Scope) -> Scope {
        scope.provide(self.clone())
    }

    /// Whether the dialog is open.
    pub fn is_open(&self) -> bool {
        self.0.is_open()
    }

    /// Request an open state.
    pub fn set_open(&self, env: &mut Env, open: bool) {
        self.0.set_open(env, open);
    }

    /// Pass new `open` props from the owner.
    pub fn sync_open(&self, env: &mut Env, open: Option<bool>) {
        self.0.sync_open(env, open);
    }

    /// The mounted trigger.
    pub fn trigger(&self) -> Option<NodeId> {
        self.0.trigger()
    }

    /// Root of the dialog content while open.
    pub fn content(&self) -> Option<NodeId> {
        self.0.content()
    }

    /// The backdrop behind the content while open.
    pub fn backdrop(&self) -> Option<NodeId> {
        self.0.backdrop()
    }

    /// Whether nothing is mounted or held.
    pub fn is_released(&self) -> bool {
        self.0.is_released()
    }

    /// Tear everything down, close, and detach from the trigger.
    pub fn unmount(&self, env: &mut Env) {
        self.0.unmount(env);
    }
}

/// The element that opens a [`Dialog`].
#[derive(Debug)]
pub struct DialogTrigger {
    dialog: Dialog,
    node_ref: Option<RefTarget>,
}

impl DialogTrigger {
    /// The trigger of the innermost dialog in `scope`.
    pub fn within(scope: &Scope) -> Result<Self, UsageError> {
        Ok(Self {
            dialog: scope.require("DialogTrigger")?,
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
        self.dialog
            .0
            .mount_trigger(env, parent, element, self.node_ref)
    }
}

/// The modal content of a [`Dialog`].
#[derive(Debug)]
pub struct DialogContent {
    dialog: Dialog,
    size: Size,
    hooks: DismissHooks,
}

impl DialogContent {
    /// The content of the innermost dialog in `scope`.
    pub fn within(scope: &Scope) -> Result<Self, UsageError> {
        Ok(Self {
            dialog: scope.require("DialogContent")?,
            size: Size::new(480.0, 320.0),
            hooks: DismissHooks::default(),
        })
    }

    /// Size of the content; it is centered in the viewport.
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

    /// Register the content builder; it runs each time the dialog opens.
    pub fn render(self, env: &mut Env, build: impl Fn(&mut Env, NodeId) + 'static) {
        self.dialog
            .0
            .set_content(env, self.size, self.hooks, Rc::new(build));
    }
}

/// A button inside dialog content that closes it.
#[derive(Debug)]
pub struct DialogClose {
    dialog: Dialog,
}

impl DialogClose {
    /// The close button of the innermost dialog in `scope`.
    pub fn within(scope: &Scope) -> Result<Self, UsageError> {
        Ok(Self {
            dialog: scope.require("DialogClose")?,
        })
    }

    /// Insert `element` under `parent` as a close button.
    pub fn mount(self, env: &mut Env, parent: NodeId, element: Element) -> NodeId {
        self.dialog.0.mount_closer(env, parent, element)
    }
}

/// The heading that labels a [`Dialog`]'s content.
#[derive(Debug)]
pub struct DialogTitle {
    dialog: Dialog,
}

impl DialogTitle {
    /// The title of the innermost dialog in `scope`.
    pub fn within(scope: &Scope) -> Result<Self, UsageError> {
        Ok(Self {
            dialog: scope.require("DialogTitle")?,
        })
    }

    /// Insert `element` under `parent` and label the content with it.
    pub fn mount(self, env: &mut Env, parent: NodeId, element: Element) -> NodeId {
        self.dialog.0.mount_title(env, parent, element)
    }
}
