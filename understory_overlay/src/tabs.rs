// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tabs: a list of tabs selecting which one of several panels is shown.
//!
//! The tab list is a single tab stop: the selected tab has tab index 0 and
//! the others -1. Arrow keys along the list's orientation, Home, and End
//! move focus and select the newly focused tab at once.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use understory_disclosure::{Controllable, OnChange};
use understory_document::{Element, ElementFlags, NodeId, Orientation, Role};
use understory_events::{Event, Outcome, Preventable};
use understory_focus::roving::{Activation, RovingController};

use crate::env::{Component, Env, EventCx};
use crate::scope::{ItemId, Provider, Scope, UsageError};

/// Configuration of [`Tabs`].
#[derive(Default)]
pub struct TabsProps {
    /// Controlled selected tab.
    pub value: Option<ItemId>,
    /// Initially selected tab when uncontrolled.
    pub default_value: Option<ItemId>,
    /// Called with every requested selection.
    pub on_value_change: Option<OnChange<Option<ItemId>>>,
    /// Layout axis of the tab list.
    pub orientation: Orientation,
}

impl fmt::Debug for TabsProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabsProps")
            .field("value", &self.value)
            .field("default_value", &self.default_value)
            .field("orientation", &self.orientation)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct TabEntry {
    id: ItemId,
    node: NodeId,
    disabled: bool,
    panel: Option<NodeId>,
}

struct TabsInner {
    me: Weak<RefCell<Self>>,
    value: Controllable<Option<ItemId>>,
    roving: RovingController,
    list: Option<NodeId>,
    tabs: Vec<TabEntry>,
    /// Panels mounted before their tab.
    orphans: Vec<(ItemId, NodeId)>,
}

impl fmt::Debug for TabsInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabsInner")
            .field("value", &self.value)
            .field("orientation", &self.roving.orientation)
            .field("list", &self.list)
            .field("tabs", &self.tabs)
            .finish_non_exhaustive()
    }
}

impl TabsInner {
    fn schedule(&self, env: &mut Env) {
        let me: Weak<dyn Component> = self.me.clone();
        env.schedule(me);
    }

    fn select(&mut self, env: &mut Env, index: usize) {
        let Some(tab) = self.tabs.get(index) else {
            return;
        };
        if tab.disabled {
            tracing::trace!(tab = ?tab.id, "disabled tab ignored");
            return;
        }
        if self.value.request_change(Some(tab.id.clone())) {
            tracing::debug!(tab = ?tab.id, "tab selected");
        }
        self.schedule(env);
    }

    fn on_event(&mut self, env: &mut Env, event: &mut Event, node: NodeId) {
        let Some(index) = self.tabs.iter().position(|t| t.node == node) else {
            return;
        };
        match event {
            Event::Click => self.select(env, index),
            Event::Key(k) => {
                let enabled: Vec<usize> = (0..self.tabs.len())
                    .filter(|&i| !self.tabs[i].disabled && env.doc().is_alive(self.tabs[i].node))
                    .collect();
                let labels: Vec<&str> = enabled
                    .iter()
                    .map(|&i| env.doc().label(self.tabs[i].node).unwrap_or_default())
                    .collect();
                let current = enabled.iter().position(|&i| i == index);
                let mv = self.roving.on_key(k.key, &labels, current, env.now());
                if !mv.handled {
                    return;
                }
                k.prevent_default();
                let Some(next) = mv.next_index.and_then(|i| enabled.get(i).copied()) else {
                    return;
                };
                env.request_focus(self.tabs[next].node);
                if mv.activate {
                    self.select(env, next);
                }
            }
            _ => {}
        }
    }

    fn sync(&mut self, env: &mut Env) {
        let doc = env.doc();
        self.tabs.retain(|t| doc.is_alive(t.node));
        self.orphans.retain(|(_, p)| doc.is_alive(*p));
        for tab in &mut self.tabs {
            if tab.panel.is_some_and(|p| !doc.is_alive(p)) {
                tab.panel = None;
            }
        }
        let selected = self.value.get().clone();
        // With nothing selected, the first enabled tab is the tab stop.
        let stop = match selected.as_ref() {
            Some(id) => self.tabs.iter().position(|t| &t.id == id),
            None => self.tabs.iter().position(|t| !t.disabled),
        };
        let orientation = self.roving.orientation;
        let doc = env.doc_mut();
        if let Some(list) = self.list
            && let Some(aria) = doc.aria_mut(list)
        {
            aria.orientation = Some(orientation);
        }
        for (i, tab) in self.tabs.iter().enumerate() {
            let on = selected.as_ref() == Some(&tab.id);
            if let Some(aria) = doc.aria_mut(tab.node) {
                aria.selected = Some(on);
                aria.controls = tab.panel;
            }
            doc.set_tab_index(tab.node, Some(if stop == Some(i) { 0 } else { -1 }));
            if let Some(panel) = tab.panel {
                if let Some(aria) = doc.aria_mut(panel) {
                    aria.labelled_by = Some(tab.node);
                }
                doc.set_flag(panel, ElementFlags::HIDDEN, !on);
            }
        }
        for (id, panel) in &self.orphans {
            let on = selected.as_ref() == Some(id);
            doc.set_flag(*panel, ElementFlags::HIDDEN, !on);
        }
    }
}

impl Component for RefCell<TabsInner> {
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

/// A set of tabs and their panels.
///
/// ```rust
/// use understory_document::{Element, Orientation};
/// use understory_events::{Key, KeyEvent};
/// use understory_overlay::{Env, Scope, Tab, TabList, TabPanel, Tabs, TabsProps};
///
/// let mut env = Env::new();
/// let body = env.doc().body();
/// let tabs = Tabs::new(TabsProps {
///     default_value: Some("account".into()),
///     ..TabsProps::default()
/// });
/// let scope = tabs.provide(&Scope::new());
/// let list = TabList::within(&scope)?.mount(&mut env, body, Element::generic());
/// for id in ["account", "billing"] {
///     Tab::within(&scope, id)?.mount(&mut env, list, Element::button(id))?;
///     TabPanel::within(&scope, id)?.mount(&mut env, body, Element::generic());
/// }
///
/// env.focus(tabs.tab("account").unwrap());
/// env.key(KeyEvent::new(Key::ArrowRight));
/// assert_eq!(tabs.value().as_ref().map(|v| v.as_str()), Some("billing"));
/// assert_eq!(env.doc().focused(), tabs.tab("billing"));
/// assert_eq!(env.doc().aria(list).unwrap().orientation, Some(Orientation::Horizontal));
/// # Ok::<(), understory_overlay::UsageError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Tabs(Rc<RefCell<TabsInner>>);

impl Provider for Tabs {
    const NAME: &'static str = "Tabs";
}

impl Tabs {
    /// Create a tab set.
    pub fn new(props: TabsProps) -> Self {
        let value = match props.value {
            Some(v) => Controllable::controlled(Some(v), props.on_value_change),
            None => Controllable::uncontrolled(props.default_value, props.on_value_change),
        };
        Self(Rc::new_cyclic(|me| {
            RefCell::new(TabsInner {
                me: me.clone(),
                value,
                roving: RovingController::new(props.orientation, Activation::Automatic),
                list: None,
                tabs: Vec::new(),
                orphans: Vec::new(),
            })
        }))
    }

    /// A scope providing these tabs to their parts.
    pub fn provide(&self, scope: &Scope) -> Scope {
        scope.provide(self.clone())
    }

    fn with<R>(&self, f: impl FnOnce(&mut TabsInner) -> R) -> Option<R> {
        match self.0.try_borrow_mut() {
            Ok(mut this) => Some(f(&mut this)),
            Err(_) => {
                tracing::warn!("tabs are busy; call ignored");
                None
            }
        }
    }

    /// The selected tab.
    pub fn value(&self) -> Option<ItemId> {
        self.0.try_borrow().ok()?.value.get().clone()
    }

    /// Layout axis of the tab list.
    pub fn orientation(&self) -> Orientation {
        self.0.borrow().roving.orientation
    }

    /// Select the tab `id` as if it were clicked.
    pub fn select(&self, env: &mut Env, id: &str) {
        self.with(|this| {
            if let Some(index) = this.tabs.iter().position(|t| t.id.as_str() == id) {
                this.select(env, index);
            } else {
                tracing::debug!(id, "unknown tab");
            }
        });
        env.flush();
    }

    /// Pass a new `value` prop from the owner.
    pub fn sync_value(&self, env: &mut Env, value: Option<ItemId>) {
        self.with(|this| {
            this.value.sync_props(Some(value));
            this.schedule(env);
        });
        env.flush();
    }

    /// The tab element of `id`.
    pub fn tab(&self, id: &str) -> Option<NodeId> {
        let this = self.0.try_borrow().ok()?;
        this.tabs.iter().find(|t| t.id.as_str() == id).map(|t| t.node)
    }

    /// The panel element of `id`.
    pub fn panel(&self, id: &str) -> Option<NodeId> {
        let this = self.0.try_borrow().ok()?;
        this.tabs
            .iter()
            .find(|t| t.id.as_str() == id)
            .and_then(|t| t.panel)
            .or_else(|| {
                this.orphans
                    .iter()
                    .find(|(o, _)| o.as_str() == id)
                    .map(|&(_, p)| p)
            })
    }
}

/// The container of the tabs.
#[derive(Debug)]
pub struct TabList {
    tabs: Tabs,
}

impl TabList {
    /// The tab list of the innermost tabs in `scope`.
    pub fn within(scope: &Scope) -> Result<Self, UsageError> {
        Ok(Self {
            tabs: scope.require("TabList")?,
        })
    }

    /// Insert `element` under `parent` as the tab list.
    pub fn mount(self, env: &mut Env, parent: NodeId, element: Element) -> NodeId {
        let node = env
            .doc_mut()
            .insert(Some(parent), element.with_role(Role::TabList));
        self.tabs.with(|this| {
            this.list = Some(node);
            this.schedule(env);
        });
        env.flush();
        node
    }
}

/// One tab.
#[derive(Debug)]
pub struct Tab {
    tabs: Tabs,
    id: ItemId,
    disabled: bool,
}

impl Tab {
    /// A tab of the innermost tabs in `scope`.
    pub fn within(scope: &Scope, id: impl Into<ItemId>) -> Result<Self, UsageError> {
        Ok(Self {
            tabs: scope.require("Tab")?,
            id: id.into(),
            disabled: false,
        })
    }

    /// Exclude the tab from selection and keyboard navigation.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Insert `element` under `parent` (normally the tab list) as the tab.
    pub fn mount(
        self,
        env: &mut Env,
        parent: NodeId,
        mut element: Element,
    ) -> Result<NodeId, UsageError> {
        let Self { tabs, id, disabled } = self;
        let taken = tabs
            .0
            .try_borrow()
            .is_ok_and(|this| this.tabs.iter().any(|t| t.id == id));
        if taken {
            return Err(UsageError::DuplicateItem { part: "Tab", id });
        }
        if disabled {
            element.flags |= ElementFlags::DISABLED;
        }
        let node = env
            .doc_mut()
            .insert(Some(parent), element.with_role(Role::Tab));
        let owner: Rc<dyn Component> = tabs.0.clone();
        env.attach(node, owner);
        tabs.with(|this| {
            let panel = this
                .orphans
                .iter()
                .position(|(o, _)| *o == id)
                .map(|i| this.orphans.swap_remove(i).1);
            this.tabs.push(TabEntry {
                id,
                node,
                disabled,
                panel,
            });
            this.schedule(env);
        });
        env.flush();
        Ok(node)
    }
}

/// The content shown while its tab is selected.
#[derive(Debug)]
pub struct TabPanel {
    tabs: Tabs,
    id: ItemId,
}

impl TabPanel {
    /// The panel for tab `id` of the innermost tabs in `scope`.
    pub fn within(scope: &Scope, id: impl Into<ItemId>) -> Result<Self, UsageError> {
        Ok(Self {
            tabs: scope.require("TabPanel")?,
            id: id.into(),
        })
    }

    /// Insert `element` under `parent` as the panel.
    pub fn mount(self, env: &mut Env, parent: NodeId, element: Element) -> NodeId {
        let Self { tabs, id } = self;
        let node = env
            .doc_mut()
            .insert(Some(parent), element.with_role(Role::TabPanel));
        tabs.with(|this| {
            match this.tabs.iter_mut().find(|t| t.id == id) {
                Some(tab) => tab.panel = Some(node),
                None => this.orphans.push((id, node)),
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
    use understory_events::{EventKind, Key, KeyEvent};

    struct Fixture {
        env: Env,
        tabs: Tabs,
        list: NodeId,
        ids: [&'static str; 3],
    }

    fn fixture(props: TabsProps, disabled: Option<usize>) -> Fixture {
        let mut env = Env::new();
        let body = env.doc().body();
        let tabs = Tabs::new(props);
        let scope = tabs.provide(&Scope::new());
        let list = TabList::within(&scope)
            .unwrap()
            .mount(&mut env, body, Element::generic());
        let ids = ["one", "two", "three"];
        for (i, id) in ids.into_iter().enumerate() {
            Tab::within(&scope, id)
                .unwrap()
                .disabled(disabled == Some(i))
                .mount(&mut env, list, Element::button(id))
                .unwrap();
            TabPanel::within(&scope, id)
                .unwrap()
                .mount(&mut env, body, Element::generic());
        }
        Fixture {
            env,
            tabs,
            list,
            ids,
        }
    }

    fn selected(f: &Fixture) -> Option<&'static str> {
        let value = f.tabs.value()?;
        f.ids.into_iter().find(|id| *id == value.as_str())
    }

    #[test]
    fn roving_tab_index_follows_selection() {
        let mut f = fixture(TabsProps::default(), None);
        let doc = f.env.doc();
        let one = f.tabs.tab("one").unwrap();
        let two = f.tabs.tab("two").unwrap();
        assert_eq!(doc.element(one).unwrap().tab_index, Some(0));
        assert_eq!(doc.element(two).unwrap().tab_index, Some(-1));

        f.env.click(two);
        let doc = f.env.doc();
        assert_eq!(doc.element(one).unwrap().tab_index, Some(-1));
        assert_eq!(doc.element(two).unwrap().tab_index, Some(0));
        assert_eq!(doc.aria(two).unwrap().selected, Some(true));
        assert_eq!(doc.aria(two).unwrap().controls, f.tabs.panel("two"));
        assert_eq!(doc.aria(f.list).unwrap().role, Some(Role::TabList));
    }

    #[test]
    fn only_the_selected_panel_is_shown() {
        let mut f = fixture(
            TabsProps {
                default_value: Some("two".into()),
                ..TabsProps::default()
            },
            None,
        );
        let hidden = |f: &Fixture, id: &str| {
            f.env
                .doc()
                .flags(f.tabs.panel(id).unwrap())
                .unwrap()
                .contains(ElementFlags::HIDDEN)
        };
        assert!(hidden(&f, "one"));
        assert!(!hidden(&f, "two"));
        f.tabs.select(&mut f.env, "three");
        assert!(hidden(&f, "two"));
        assert!(!hidden(&f, "three"));
        let panel = f.tabs.panel("three").unwrap();
        assert_eq!(f.env.doc().aria(panel).unwrap().labelled_by, f.tabs.tab("three"));
    }

    #[test]
    fn arrows_move_and_activate_with_wrap() {
        let mut f = fixture(
            TabsProps {
                default_value: Some("three".into()),
                ..TabsProps::default()
            },
            None,
        );
        f.env.focus(f.tabs.tab("three").unwrap());
        let ev = f.env.key(KeyEvent::new(Key::ArrowRight));
        assert!(ev.is_default_prevented());
        assert_eq!(selected(&f), Some("one"));
        assert_eq!(f.env.doc().focused(), f.tabs.tab("one"));

        f.env.key(KeyEvent::new(Key::End));
        assert_eq!(selected(&f), Some("three"));

        // Vertical keys mean nothing to a horizontal list.
        let ev = f.env.key(KeyEvent::new(Key::ArrowDown));
        assert!(!ev.is_default_prevented());
        assert_eq!(selected(&f), Some("three"));
    }

    #[test]
    fn vertical_lists_use_up_and_down() {
        let mut f = fixture(
            TabsProps {
                orientation: Orientation::Vertical,
                default_value: Some("one".into()),
                ..TabsProps::default()
            },
            Some(1),
        );
        assert_eq!(
            f.env.doc().aria(f.list).unwrap().orientation,
            Some(Orientation::Vertical)
        );
        f.env.focus(f.tabs.tab("one").unwrap());
        f.env.key(KeyEvent::new(Key::ArrowDown));
        assert_eq!(selected(&f), Some("three"));
        f.env.key(KeyEvent::new(Key::ArrowUp));
        assert_eq!(selected(&f), Some("one"));
        f.tabs.select(&mut f.env, "two");
        assert_eq!(selected(&f), Some("one"));
    }

    #[test]
    fn controlled_selection_waits_for_the_owner() {
        let mut f = fixture(
            TabsProps {
                value: Some("one".into()),
                ..TabsProps::default()
            },
            None,
        );
        f.env.click(f.tabs.tab("two").unwrap());
        assert_eq!(selected(&f), Some("one"));
        f.tabs.sync_value(&mut f.env, Some("two".into()));
        assert_eq!(selected(&f), Some("two"));
        let two = f.tabs.tab("two").unwrap();
        assert_eq!(f.env.doc().element(two).unwrap().tab_index, Some(0));
    }

    #[test]
    fn duplicate_tabs_are_rejected() {
        let mut f = fixture(TabsProps::default(), None);
        let scope = f.tabs.provide(&Scope::new());
        let err = Tab::within(&scope, "two")
            .unwrap()
            .mount(&mut f.env, f.list, Element::button("again"))
            .unwrap_err();
        assert!(matches!(err, UsageError::DuplicateItem { part: "Tab", .. }));
    }

    /// Records focus changes on the elements it is attached to.
    #[derive(Default)]
    struct FocusLog(RefCell<Vec<(EventKind, NodeId)>>);

    impl Component for FocusLog {
        fn handle(&self, _env: &mut Env, event: &mut Event, cx: &EventCx) -> Outcome {
            let kind = event.kind();
            if matches!(kind, EventKind::Focus | EventKind::Blur)
                && let Some(node) = cx.node
                && cx.at_target()
            {
                self.0.borrow_mut().push((kind, node));
            }
            Outcome::Continue
        }

        fn reconcile(&self, _env: &mut Env) {}
    }

    #[test]
    fn arrow_moves_deliver_blur_and_focus() {
        let mut f = fixture(TabsProps::default(), None);
        let one = f.tabs.tab("one").unwrap();
        let two = f.tabs.tab("two").unwrap();
        let log = Rc::new(FocusLog::default());
        f.env.attach(one, log.clone());
        f.env.attach(two, log.clone());
        f.env.focus(one);
        f.env.key(KeyEvent::new(Key::ArrowRight));
        assert_eq!(f.env.doc().focused(), Some(two));
        assert_eq!(
            *log.0.borrow(),
            [
                (EventKind::Focus, one),
                (EventKind::Blur, one),
                (EventKind::Focus, two),
            ]
        );
    }
}
