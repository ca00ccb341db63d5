// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Accordion: stacked headings that each reveal a panel.
//!
//! In [`AccordionKind::Single`] mode at most one item is open; activating a
//! different item moves the open state to it, and activating the open item
//! closes it only when the accordion is collapsible. In
//! [`AccordionKind::Multiple`] mode each activation toggles one item
//! independently of the others.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use hashbrown::HashSet;
use understory_disclosure::{Controllable, OnChange};
use understory_document::{Element, ElementFlags, NodeId, Orientation, Role};
use understory_events::{Event, Key, Outcome, Preventable};
use understory_focus::roving::{Activation, RovingController};

use crate::env::{Component, Env, EventCx};
use crate::scope::{ItemId, Provider, Scope, UsageError};

/// How many items of an [`Accordion`] can be open at once.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum AccordionKind {
    /// At most one item.
    #[default]
    Single,
    /// Any subset of items.
    Multiple,
}

/// The open items of an [`Accordion`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccordionValue {
    /// The open item of a single accordion.
    Single(Option<ItemId>),
    /// The open items of a multiple accordion.
    Multiple(HashSet<ItemId>),
}

impl AccordionValue {
    /// Nothing open.
    pub fn empty(kind: AccordionKind) -> Self {
        match kind {
            AccordionKind::Single => Self::Single(None),
            AccordionKind::Multiple => Self::Multiple(HashSet::new()),
        }
    }

    /// The kind this value belongs to.
    pub fn kind(&self) -> AccordionKind {
        match self {
            Self::Single(_) => AccordionKind::Single,
            Self::Multiple(_) => AccordionKind::Multiple,
        }
    }

    /// Whether `id` is open.
    pub fn is_open(&self, id: &str) -> bool {
        match self {
            Self::Single(open) => open.as_ref().is_some_and(|o| o.as_str() == id),
            Self::Multiple(open) => open.contains(id),
        }
    }

    /// Number of open items.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(open) => usize::from(open.is_some()),
            Self::Multiple(open) => open.len(),
        }
    }

    /// Whether no item is open.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value after activating `id`.
    ///
    /// `collapsible` only matters in single mode, where it decides whether
    /// activating the open item closes it.
    pub fn toggled(&self, id: &ItemId, collapsible: bool) -> Self {
        match self {
            Self::Single(Some(open)) if open == id => {
                if collapsible {
                    Self::Single(None)
                } else {
                    self.clone()
                }
            }
            Self::Single(_) => Self::Single(Some(id.clone())),
            Self::Multiple(open) => {
                let mut next = open.clone();
                if !next.remove(id) {
                    next.insert(id.clone());
                }
                Self::Multiple(next)
            }
        }
    }

    /// The value after opening `id`, leaving open items in place where the
    /// kind allows it.
    fn with_open(&self, id: &ItemId) -> Self {
        match self {
            Self::Single(_) => Self::Single(Some(id.clone())),
            Self::Multiple(open) => {
                let mut next = open.clone();
                next.insert(id.clone());
                Self::Multiple(next)
            }
        }
    }

    /// Convert to `kind`, keeping what fits.
    fn coerce(self, kind: AccordionKind) -> Self {
        match (self, kind) {
            (Self::Multiple(open), AccordionKind::Single) => {
                tracing::warn!(open = open.len(), "multiple value given to a single accordion");
                Self::Single(open.into_iter().min())
            }
            (Self::Single(open), AccordionKind::Multiple) => {
                tracing::warn!("single value given to a multiple accordion");
                Self::Multiple(open.into_iter().collect())
            }
            (value, _) => value,
        }
    }
}

/// Configuration of an [`Accordion`].
pub struct AccordionProps {
    /// Single or multiple.
    pub kind: AccordionKind,
    /// Controlled open items.
    pub value: Option<AccordionValue>,
    /// Initial open items when uncontrolled.
    pub default_value: Option<AccordionValue>,
    /// Called with every requested value.
    pub on_value_change: Option<OnChange<AccordionValue>>,
    /// In single mode, whether the open item can be closed again.
    pub collapsible: bool,
}

impl Default for AccordionProps {
    fn default() -> Self {
        Self {
            kind: AccordionKind::Single,
            value: None,
            default_value: None,
            on_value_change: None,
            collapsible: true,
        }
    }
}

impl fmt::Debug for AccordionProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccordionProps")
            .field("kind", &self.kind)
            .field("value", &self.value)
            .field("default_value", &self.default_value)
            .field("collapsible", &self.collapsible)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct Entry {
    id: ItemId,
    disabled: bool,
    trigger: Option<NodeId>,
    panel: Option<NodeId>,
}

struct AccordionInner {
    me: Weak<RefCell<Self>>,
    kind: AccordionKind,
    collapsible: bool,
    value: Controllable<AccordionValue>,
    items: Vec<Entry>,
    roving: RovingController,
}

impl fmt::Debug for AccordionInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccordionInner")
            .field("kind", &self.kind)
            .field("collapsible", &self.collapsible)
            .field("value", &self.value)
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl AccordionInner {
    fn schedule(&self, env: &mut Env) {
        let me: Weak<dyn Component> = self.me.clone();
        env.schedule(me);
    }

    fn toggle(&mut self, env: &mut Env, index: usize) {
        let Some(entry) = self.items.get(index) else {
            return;
        };
        if entry.disabled {
            tracing::trace!(item = ?entry.id, "disabled accordion item ignored");
            return;
        }
        let next = self.value.get().toggled(&entry.id, self.collapsible);
        tracing::debug!(item = ?entry.id, open = next.is_open(entry.id.as_str()), "accordion item toggled");
        self.value.request_change(next);
        self.schedule(env);
    }

    fn on_event(&mut self, env: &mut Env, event: &mut Event, node: NodeId) {
        let Some(index) = self.items.iter().position(|e| e.trigger == Some(node)) else {
            return;
        };
        match event {
            Event::Click => self.toggle(env, index),
            Event::Key(k) => {
                if !matches!(k.key, Key::ArrowDown | Key::ArrowUp | Key::Home | Key::End) {
                    return;
                }
                let triggers: Vec<NodeId> = self
                    .items
                    .iter()
                    .filter(|e| !e.disabled)
                    .filter_map(|e| e.trigger)
                    .filter(|&t| env.doc().can_focus(t))
                    .collect();
                let labels: Vec<&str> = triggers
                    .iter()
                    .map(|&t| env.doc().label(t).unwrap_or_default())
                    .collect();
                let current = triggers.iter().position(|&t| t == node);
                let mv = self.roving.on_key(k.key, &labels, current, env.now());
                if !mv.handled {
                    return;
                }
                k.prevent_default();
                if let Some(next) = mv.next_index.and_then(|i| triggers.get(i).copied()) {
                    env.request_focus(next);
                }
            }
            _ => {}
        }
    }

    fn sync(&mut self, env: &mut Env) {
        let value = self.value.get();
        for entry in &mut self.items {
            if entry.trigger.is_some_and(|t| !env.doc().is_alive(t)) {
                entry.trigger = None;
            }
            if entry.panel.is_some_and(|p| !env.doc().is_alive(p)) {
                entry.panel = None;
            }
            let open = value.is_open(entry.id.as_str());
            let doc = env.doc_mut();
            if let Some(t) = entry.trigger
                && let Some(aria) = doc.aria_mut(t)
            {
                aria.expanded = Some(open);
                aria.controls = entry.panel;
            }
            if let Some(p) = entry.panel {
                if let Some(aria) = doc.aria_mut(p) {
                    aria.role = Some(Role::Region);
                    aria.labelled_by = entry.trigger;
                }
                doc.set_flag(p, ElementFlags::HIDDEN, !open);
            }
        }
    }
}

impl Component for RefCell<AccordionInner> {
    fn handle(&self, env: &mut Env, event: &mut Event, cx: &EventCx) -> Outcome {
        let Some(node) = cx.node else {
            return Outcome::Continue;
        };
        match self.try_borrow_mut() {
            Ok(mut this) => this.on_event(env, event, node),
            Err(_) => tracing::warn!(kind = ?event.kind(), "re-entrant event skipped"),
        }
        Outcome::Continue
    }

    fn reconcile(&self, env: &mut Env) {
        match self.try_borrow_mut() {
            Ok(mut this) => this.sync(env),
            Err(_) => tracing::warn!("re-entrant reconcile skipped"),
        }
    }
}

/// A set of collapsible sections.
///
/// ```rust
/// use understory_document::Element;
/// use understory_overlay::{
///     Accordion, AccordionItem, AccordionPanel, AccordionProps, AccordionTrigger, Env, Scope,
/// };
///
/// let mut env = Env::new();
/// let body = env.doc().body();
/// let accordion = Accordion::new(AccordionProps::default());
/// let scope = accordion.provide(&Scope::new());
///
/// let mut triggers = Vec::new();
/// for id in ["shipping", "returns"] {
///     let item = AccordionItem::within(&scope, id)?.register(&mut env)?;
///     triggers.push(AccordionTrigger::within(&item)?.mount(&mut env, body, Element::button(id)));
///     AccordionPanel::within(&item)?.mount(&mut env, body, Element::generic());
/// }
///
/// env.click(triggers[0]);
/// assert!(accordion.is_open("shipping"));
/// env.click(triggers[1]);
/// assert!(!accordion.is_open("shipping"));
/// assert!(accordion.is_open("returns"));
/// # Ok::<(), understory_overlay::UsageError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Accordion(Rc<RefCell<AccordionInner>>);

impl Provider for Accordion {
    const NAME: &'static str = "Accordion";
}

impl Accordion {
    /// Create an accordion.
    pub fn new(props: AccordionProps) -> Self {
        let kind = props.kind;
        let default = props
            .default_value
            .map_or_else(|| AccordionValue::empty(kind), |v| v.coerce(kind));
        let value = Controllable::from_props(
            props.value.map(|v| v.coerce(kind)),
            default,
            props.on_value_change,
        );
        Self(Rc::new_cyclic(|me| {
            RefCell::new(AccordionInner {
                me: me.clone(),
                kind,
                collapsible: props.collapsible,
                value,
                items: Vec::new(),
                roving: RovingController::new(Orientation::Vertical, Activation::Manual),
            })
        }))
    }

    /// A scope providing this accordion to its items.
    pub fn provide(&self, scope: &Scope) -> Scope {
        scope.provide(self.clone())
    }

    fn with<R>(&self, f: impl FnOnce(&mut AccordionInner) -> R) -> Option<R> {
        match self.0.try_borrow_mut() {
            Ok(mut this) => Some(f(&mut this)),
            Err(_) => {
                tracing::warn!("accordion is busy; call ignored");
                None
            }
        }
    }

    fn owner(&self) -> Rc<dyn Component> {
        self.0.clone()
    }

    /// Single or multiple.
    pub fn kind(&self) -> AccordionKind {
        self.0.borrow().kind
    }

    /// The current open items.
    pub fn value(&self) -> AccordionValue {
        self.0.borrow().value.get().clone()
    }

    /// Whether the item `id` is open.
    pub fn is_open(&self, id: &str) -> bool {
        self.0
            .try_borrow()
            .is_ok_and(|this| this.value.get().is_open(id))
    }

    /// Activate the item `id` as if its trigger were clicked.
    pub fn toggle(&self, env: &mut Env, id: &str) {
        self.with(|this| {
            if let Some(index) = this.items.iter().position(|e| e.id.as_str() == id) {
                this.toggle(env, index);
            } else {
                tracing::debug!(id, "unknown accordion item");
            }
        });
        env.flush();
    }

    /// Request a new value.
    pub fn set_value(&self, env: &mut Env, value: AccordionValue) {
        self.with(|this| {
            let value = value.coerce(this.kind);
            this.value.request_change(value);
            this.schedule(env);
        });
        env.flush();
    }

    /// Pass a new `value` prop from the owner.
    pub fn sync_value(&self, env: &mut Env, value: Option<AccordionValue>) {
        self.with(|this| {
            let kind = this.kind;
            this.value.sync_props(value.map(|v| v.coerce(kind)));
            this.schedule(env);
        });
        env.flush();
    }

    /// The trigger of item `id`.
    pub fn trigger(&self, id: &str) -> Option<NodeId> {
        let this = self.0.try_borrow().ok()?;
        this.items.iter().find(|e| e.id.as_str() == id)?.trigger
    }

    /// The panel of item `id`.
    pub fn panel(&self, id: &str) -> Option<NodeId> {
        let this = self.0.try_borrow().ok()?;
        this.items.iter().find(|e| e.id.as_str() == id)?.panel
    }
}

/// One section of an [`Accordion`].
#[derive(Debug)]
pub struct AccordionItem {
    accordion: Accordion,
    scope: Scope,
    id: ItemId,
    disabled: bool,
    default_open: bool,
}

/// The item a trigger or panel belongs to.
#[derive(Clone, Debug)]
struct ItemCx {
    accordion: Accordion,
    id: ItemId,
}

impl Provider for ItemCx {
    const NAME: &'static str = "AccordionItem";
}

impl AccordionItem {
    /// An item of the innermost accordion in `scope`.
    pub fn within(scope: &Scope, id: impl Into<ItemId>) -> Result<Self, UsageError> {
        Ok(Self {
            accordion: scope.require("AccordionItem")?,
            scope: scope.clone(),
            id: id.into(),
            disabled: false,
            default_open: false,
        })
    }

    /// Exclude the item from toggling and keyboard navigation.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Open the item initially.
    ///
    /// Only applies to an uncontrolled accordion that has not changed yet; in
    /// single mode only while no other item is open.
    pub fn default_open(mut self, default_open: bool) -> Self {
        self.default_open = default_open;
        self
    }

    /// Register the item, returning the scope its trigger and panel are
    /// built in.
    pub fn register(self, env: &mut Env) -> Result<Scope, UsageError> {
        let Self {
            accordion,
            scope,
            id,
            disabled,
            default_open,
        } = self;
        let registered = accordion.with(|this| {
            if this.items.iter().any(|e| e.id == id) {
                return Err(UsageError::DuplicateItem {
                    part: "AccordionItem",
                    id: id.clone(),
                });
            }
            this.items.push(Entry {
                id: id.clone(),
                disabled,
                trigger: None,
                panel: None,
            });
            let current = this.value.get();
            if default_open
                && (current.kind() == AccordionKind::Multiple || current.is_empty())
            {
                let next = current.with_open(&id);
                if this.value.reseed(next) {
                    tracing::debug!(item = ?id, "accordion item open by default");
                }
            }
            this.schedule(env);
            Ok(())
        });
        registered.unwrap_or(Ok(()))?;
        env.flush();
        Ok(scope.provide(ItemCx { accordion, id }))
    }
}

/// The heading button of an accordion item.
#[derive(Debug)]
pub struct AccordionTrigger {
    item: ItemCx,
}

impl AccordionTrigger {
    /// The trigger of the innermost registered item in `scope`.
    pub fn within(scope: &Scope) -> Result<Self, UsageError> {
        Ok(Self {
            item: scope.require("AccordionTrigger")?,
        })
    }

    /// Insert `element` under `parent` as the item's trigger.
    pub fn mount(self, env: &mut Env, parent: NodeId, mut element: Element) -> NodeId {
        let ItemCx { accordion, id } = self.item;
        let disabled = accordion
            .0
            .try_borrow()
            .is_ok_and(|this| this.items.iter().any(|e| e.id == id && e.disabled));
        if disabled {
            element.flags |= ElementFlags::DISABLED;
        }
        let node = env.doc_mut().insert(Some(parent), element);
        let owner = accordion.owner();
        env.attach(node, owner.clone());
        accordion.with(|this| {
            if let Some(entry) = this.items.iter_mut().find(|e| e.id == id)
                && let Some(old) = entry.trigger.replace(node)
            {
                env.detach(old, &owner);
            }
            this.schedule(env);
        });
        env.flush();
        node
    }
}

/// The collapsible region of an accordion item.
#[derive(Debug)]
pub struct AccordionPanel {
    item: ItemCx,
}

impl AccordionPanel {
    /// The panel of the innermost registered item in `scope`.
    pub fn within(scope: &Scope) -> Result<Self, UsageError> {
        Ok(Self {
            item: scope.require("AccordionPanel")?,
        })
    }

    /// Insert `element` under `parent` as the item's panel.
    pub fn mount(self, env: &mut Env, parent: NodeId, element: Element) -> NodeId {
        let ItemCx { accordion, id } = self.item;
        let node = env
            .doc_mut()
            .insert(Some(parent), element.with_role(Role::Region));
        accordion.with(|this| {
            if let Some(entry) = this.items.iter_mut().find(|e| e.id == id) {
                entry.panel = Some(node);
            }
            this.schedule(env);
        });
        env.flush();
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;
    use alloc::vec;
    use understory_events::KeyEvent;

    struct Fixture {
        env: Env,
        accordion: Accordion,
        triggers: Vec<NodeId>,
        panels: Vec<NodeId>,
    }

    fn fixture(props: AccordionProps, items: &[(&str, bool)]) -> Fixture {
        let mut env = Env::new();
        let body = env.doc().body();
        let accordion = Accordion::new(props);
        let scope = accordion.provide(&Scope::new());
        let mut triggers = Vec::new();
        let mut panels = Vec::new();
        for &(id, disabled) in items {
            let item = AccordionItem::within(&scope, id)
                .unwrap()
                .disabled(disabled)
                .register(&mut env)
                .unwrap();
            triggers.push(
                AccordionTrigger::within(&item)
                    .unwrap()
                    .mount(&mut env, body, Element::button(id)),
            );
            panels.push(
                AccordionPanel::within(&item)
                    .unwrap()
                    .mount(&mut env, body, Element::generic()),
            );
        }
        Fixture {
            env,
            accordion,
            triggers,
            panels,
        }
    }

    fn abc(kind: AccordionKind, collapsible: bool) -> Fixture {
        fixture(
            AccordionProps {
                kind,
                collapsible,
                ..AccordionProps::default()
            },
            &[("a", false), ("b", false), ("c", false)],
        )
    }

    #[test]
    fn toggled_follows_the_kind() {
        let a = ItemId::from("a");
        let b = ItemId::from("b");
        let single = AccordionValue::Single(Some(a.clone()));
        assert_eq!(single.toggled(&a, true), AccordionValue::Single(None));
        assert_eq!(single.toggled(&a, false), single);
        assert_eq!(single.toggled(&b, false), AccordionValue::Single(Some(b.clone())));

        let multiple = AccordionValue::empty(AccordionKind::Multiple)
            .toggled(&a, false)
            .toggled(&b, false)
            .toggled(&a, false);
        assert!(!multiple.is_open("a"));
        assert!(multiple.is_open("b"));
        assert_eq!(multiple.len(), 1);
    }

    #[test]
    fn single_moves_the_open_item() {
        let mut f = abc(AccordionKind::Single, true);
        f.env.click(f.triggers[0]);
        f.env.click(f.triggers[1]);
        assert_eq!(f.accordion.value(), AccordionValue::Single(Some("b".into())));
        f.env.click(f.triggers[1]);
        assert!(f.accordion.value().is_empty());
    }

    #[test]
    fn non_collapsible_keeps_the_open_item() {
        let mut f = abc(AccordionKind::Single, false);
        f.env.click(f.triggers[2]);
        f.env.click(f.triggers[2]);
        assert!(f.accordion.is_open("c"));
    }

    #[test]
    fn multiple_toggles_independently() {
        let mut f = abc(AccordionKind::Multiple, true);
        f.env.click(f.triggers[0]);
        f.env.click(f.triggers[1]);
        f.env.click(f.triggers[0]);
        let AccordionValue::Multiple(open) = f.accordion.value() else {
            panic!("multiple accordion holds a set");
        };
        assert_eq!(open, [ItemId::from("b")].into_iter().collect::<HashSet<_>>());
    }

    #[test]
    fn aria_follows_the_value() {
        let mut f = abc(AccordionKind::Single, true);
        let doc = f.env.doc();
        assert_eq!(doc.aria(f.triggers[0]).unwrap().expanded, Some(false));
        assert_eq!(doc.aria(f.triggers[0]).unwrap().controls, Some(f.panels[0]));
        assert_eq!(doc.aria(f.panels[0]).unwrap().labelled_by, Some(f.triggers[0]));
        assert_eq!(doc.aria(f.panels[0]).unwrap().role, Some(Role::Region));
        assert!(doc.flags(f.panels[0]).unwrap().contains(ElementFlags::HIDDEN));

        f.env.focus(f.triggers[0]);
        f.env.key(KeyEvent::new(Key::Enter));
        let doc = f.env.doc();
        assert_eq!(doc.aria(f.triggers[0]).unwrap().expanded, Some(true));
        assert!(!doc.flags(f.panels[0]).unwrap().contains(ElementFlags::HIDDEN));
    }

    #[test]
    fn disabled_items_are_skipped() {
        let mut f = fixture(
            AccordionProps::default(),
            &[("a", false), ("b", true), ("c", false)],
        );
        f.env.click(f.triggers[1]);
        assert!(f.accordion.value().is_empty());
        f.accordion.toggle(&mut f.env, "b");
        assert!(f.accordion.value().is_empty());

        f.env.focus(f.triggers[0]);
        let ev = f.env.key(KeyEvent::new(Key::ArrowDown));
        assert!(ev.is_default_prevented());
        assert_eq!(f.env.doc().focused(), Some(f.triggers[2]));
        f.env.key(KeyEvent::new(Key::ArrowDown));
        assert_eq!(f.env.doc().focused(), Some(f.triggers[0]));
        f.env.key(KeyEvent::new(Key::End));
        assert_eq!(f.env.doc().focused(), Some(f.triggers[2]));
    }

    #[test]
    fn navigation_stays_within_one_accordion() {
        let mut f = abc(AccordionKind::Single, true);
        let body = f.env.doc().body();
        let other = Accordion::new(AccordionProps::default());
        let scope = other.provide(&Scope::new());
        let item = AccordionItem::within(&scope, "x")
            .unwrap()
            .register(&mut f.env)
            .unwrap();
        let foreign = AccordionTrigger::within(&item)
            .unwrap()
            .mount(&mut f.env, body, Element::button("x"));

        f.env.focus(f.triggers[2]);
        f.env.key(KeyEvent::new(Key::ArrowDown));
        assert_eq!(f.env.doc().focused(), Some(f.triggers[0]));
        f.env.focus(foreign);
        f.env.key(KeyEvent::new(Key::ArrowUp));
        assert_eq!(f.env.doc().focused(), Some(foreign));
    }

    #[test]
    fn default_open_seeds_only_a_pristine_uncontrolled_value() {
        let mut env = Env::new();
        let accordion = Accordion::new(AccordionProps::default());
        let scope = accordion.provide(&Scope::new());
        AccordionItem::within(&scope, "a")
            .unwrap()
            .default_open(true)
            .register(&mut env)
            .unwrap();
        AccordionItem::within(&scope, "b")
            .unwrap()
            .default_open(true)
            .register(&mut env)
            .unwrap();
        assert_eq!(accordion.value(), AccordionValue::Single(Some("a".into())));

        let controlled = Accordion::new(AccordionProps {
            value: Some(AccordionValue::Single(None)),
            ..AccordionProps::default()
        });
        let scope = controlled.provide(&Scope::new());
        AccordionItem::within(&scope, "a")
            .unwrap()
            .default_open(true)
            .register(&mut env)
            .unwrap();
        assert!(controlled.value().is_empty());
    }

    #[test]
    fn controlled_value_only_reports() {
        let seen = Rc::new(RefCell::new(vec![]));
        let sink = seen.clone();
        let mut f = fixture(
            AccordionProps {
                kind: AccordionKind::Multiple,
                value: Some(AccordionValue::empty(AccordionKind::Multiple)),
                on_value_change: Some(Box::new(move |v: &AccordionValue| {
                    sink.borrow_mut().push(v.len());
                })),
                ..AccordionProps::default()
            },
            &[("a", false), ("b", false)],
        );
        f.env.click(f.triggers[0]);
        assert!(f.accordion.value().is_empty());
        assert_eq!(*seen.borrow(), [1]);

        let open: HashSet<ItemId> = [ItemId::from("a")].into_iter().collect();
        f.accordion
            .sync_value(&mut f.env, Some(AccordionValue::Multiple(open)));
        assert!(f.accordion.is_open("a"));
        assert_eq!(f.env.doc().aria(f.triggers[0]).unwrap().expanded, Some(true));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut env = Env::new();
        let accordion = Accordion::new(AccordionProps::default());
        let scope = accordion.provide(&Scope::new());
        AccordionItem::within(&scope, "a")
            .unwrap()
            .register(&mut env)
            .unwrap();
        let err = AccordionItem::within(&scope, "a")
            .unwrap()
            .register(&mut env)
            .unwrap_err();
        assert_eq!(
            err,
            UsageError::DuplicateItem {
                part: "AccordionItem",
                id: "a".into(),
            }
        );
        assert!(matches!(
            AccordionTrigger::within(&scope),
            Err(UsageError::MissingProvider {
                provider: "AccordionItem",
                ..
            })
        ));
    }
}
