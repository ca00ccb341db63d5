// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Menu: a popover whose content is a list of actions.
//!
//! Items are navigated with the arrow keys, Home, End, and typeahead; the
//! focused item is exposed as the content's active descendant. Activating an
//! item runs its callback and, by default, closes the menu.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Size;
use smallvec::SmallVec;
use understory_anchor::{Alignment, Placement, Position, PositionConfig, Side};
use understory_disclosure::{Controllable, OnChange};
use understory_document::{Document, Element, ElementKind, NodeId, Orientation, RefTarget, Role};
use understory_events::{Event, Handler, Key, KeyEvent, PointerEvent, Preventable};
use understory_focus::roving::{Activation, RovingController};

use crate::env::Env;
use crate::popover::{Disclosure, PopoverInner, TriggerMode};
use crate::scope::{Provider, Scope, UsageError};
use crate::surface::{DismissHooks, LayerKind, SurfaceKind};

/// Callback run when a menu item is selected.
pub type OnSelect = Rc<dyn Fn()>;

/// Configuration of a [`Menu`].
pub struct MenuProps {
    /// Controlled open state.
    pub open: Option<bool>,
    /// Initial open state when uncontrolled.
    pub default_open: bool,
    /// Called with every requested open state.
    pub on_open_change: Option<OnChange<bool>>,
    /// Preferred placement relative to the trigger.
    pub placement: Placement,
    /// Close after an item is selected.
    pub close_on_select: bool,
}

impl Default for MenuProps {
    fn default() -> Self {
        Self {
            open: None,
            default_open: false,
            on_open_change: None,
            placement: Placement::new(Side::Bottom, Alignment::Start),
            close_on_select: true,
        }
    }
}

impl fmt::Debug for MenuProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuProps")
            .field("open", &self.open)
            .field("default_open", &self.default_open)
            .field("placement", &self.placement)
            .field("close_on_select", &self.close_on_select)
            .finish_non_exhaustive()
    }
}

struct MenuEntry {
    node: NodeId,
    on_select: Option<OnSelect>,
}

/// Item bookkeeping and roving state of an open menu.
pub(crate) struct MenuState {
    roving: RovingController,
    items: SmallVec<[MenuEntry; 8]>,
    close_on_select: bool,
    focus_last: bool,
    active: Option<NodeId>,
}

impl fmt::Debug for MenuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuState")
            .field("items", &self.items.len())
            .field("close_on_select", &self.close_on_select)
            .field("focus_last", &self.focus_last)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl MenuState {
    fn new(close_on_select: bool) -> Self {
        Self {
            roving: RovingController::new(Orientation::Vertical, Activation::Manual)
                .with_typeahead(),
            items: SmallVec::new(),
            close_on_select,
            focus_last: false,
            active: None,
        }
    }

    /// Arrow keys on the trigger open the menu. Returns whether the key opens it.
    pub(crate) fn on_trigger_key(&mut self, k: &mut KeyEvent) -> bool {
        match k.key {
            Key::ArrowDown => self.focus_last = false,
            Key::ArrowUp => self.focus_last = true,
            _ => return false,
        }
        k.prevent_default();
        true
    }

    /// Focus the first (or last) enabled item once content is built.
    pub(crate) fn after_open(&mut self, env: &mut Env, root: NodeId) {
        let enabled = self.enabled(env.doc());
        let on_item = env.doc().focused().is_some_and(|f| enabled.contains(&f));
        let pick = if core::mem::take(&mut self.focus_last) {
            enabled.last()
        } else if on_item {
            None
        } else {
            enabled.first()
        };
        if let Some(&item) = pick {
            env.request_focus(item);
        }
        self.sync_active(env.doc_mut(), root);
    }

    pub(crate) fn reset(&mut self) {
        self.items.clear();
        self.roving.reset();
        self.focus_last = false;
        self.active = None;
    }

    fn enabled(&self, doc: &Document) -> Vec<NodeId> {
        self.items
            .iter()
            .map(|e| e.node)
            .filter(|&n| doc.can_focus(n))
            .collect()
    }

    fn sync_active(&mut self, doc: &mut Document, root: NodeId) {
        self.active = doc
            .focused()
            .filter(|f| self.items.iter().any(|e| e.node == *f));
        if let Some(aria) = doc.aria_mut(root) {
            aria.active_descendant = self.active;
        }
    }
}

impl PopoverInner {
    pub(crate) fn on_menu_event(
        &mut self,
        env: &mut Env,
        event: &mut Event,
        node: NodeId,
    ) -> Option<OnSelect> {
        let root = self.surface.root()?;
        let menu = self.menu.as_mut()?;
        let index = menu.items.iter().position(|e| e.node == node)?;
        match event {
            Event::Click => self.select(env, index),
            Event::PointerEnter => {
                env.request_focus(node);
                None
            }
            Event::Focus | Event::Blur => {
                menu.sync_active(env.doc_mut(), root);
                None
            }
            Event::Key(k) => match k.key {
                Key::Enter | Key::Space => {
                    // Buttons are activated through the synthesized click.
                    if env.doc().element(node).is_some_and(|e| e.kind == ElementKind::Button) {
                        return None;
                    }
                    k.prevent_default();
                    self.select(env, index)
                }
                Key::Tab => {
                    self.request_open(env, false);
                    None
                }
                key => {
                    let enabled = menu.enabled(env.doc());
                    let labels: Vec<&str> = enabled
                        .iter()
                        .map(|&n| env.doc().label(n).unwrap_or_default())
                        .collect();
                    let current = enabled.iter().position(|&n| n == node);
                    let mv = menu.roving.on_key(key, &labels, current, env.now());
                    if !mv.handled {
                        return None;
                    }
                    k.prevent_default();
                    if let Some(next) = mv.next_index.and_then(|i| enabled.get(i).copied()) {
                        env.request_focus(next);
                    }
                    None
                }
            },
            _ => None,
        }
    }

    fn select(&mut self, env: &mut Env, index: usize) -> Option<OnSelect> {
        let menu = self.menu.as_ref()?;
        let entry = menu.items.get(index)?;
        tracing::debug!(item = ?entry.node, "menu item selected");
        let on_select = entry.on_select.clone();
        if menu.close_on_select {
            self.request_open(env, false);
        }
        on_select
    }
}

/// A trigger opening a list of actions.
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use understory_document::Element;
/// use understory_events::{Key, KeyEvent};
/// use understory_overlay::{Env, Menu, MenuContent, MenuItem, MenuProps, MenuTrigger, Scope};
///
/// let mut env = Env::new();
/// let body = env.doc().body();
/// let menu = Menu::new(MenuProps::default());
/// let scope = menu.provide(&Scope::new());
/// let saved = Rc::new(Cell::new(false));
///
/// let trigger = MenuTrigger::within(&scope)?.mount(&mut env, body, Element::button("File"));
/// let items = scope.clone();
/// let flag = saved.clone();
/// MenuContent::within(&scope)?.render(&mut env, move |env, root| {
///     for label in ["New", "Open", "Save"] {
///         let item = MenuItem::within(&items).unwrap();
///         let item = if label == "Save" {
///             let flag = flag.clone();
///             item.on_select(move || flag.set(true))
///         } else {
///             item
///         };
///         item.mount(env, root, Element::button(label));
///     }
/// });
///
/// env.focus(trigger);
/// env.key(KeyEvent::new(Key::ArrowDown));
/// assert!(menu.is_open());
/// env.key(KeyEvent::new(Key::Character('s')));
/// assert_eq!(env.doc().label(menu.active_item().unwrap()), Some("Save"));
/// env.key(KeyEvent::new(Key::Enter));
/// assert!(saved.get());
/// assert!(!menu.is_open());
/// # Ok::<(), understory_overlay::UsageError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Menu(Disclosure);

impl Provider for Menu {
    const NAME: &'static str = "Menu";
}

impl Menu {
    const SURFACE: SurfaceKind = SurfaceKind {
        role: Role::Menu,
        layer: LayerKind::Full,
        trap_focus: true,
        backdrop: false,
        lock_scroll: false,
        modal: false,
    };

    /// Create a menu.
    pub fn new(props: MenuProps) -> Self {
        let open = Controllable::from_props(props.open, props.default_open, props.on_open_change);
        Self(Disclosure::new(
            Self::NAME,
            Self::SURFACE,
            TriggerMode::Toggle,
            open,
            Some(PositionConfig::with_placement(props.placement)),
            Some(MenuState::new(props.close_on_select)),
        ))
    }

    /// A scope providing this menu to its parts.
    pub fn provide(&self, scope: &Scope) -> Scope {
        scope.provide(self.clone())
    }

    /// Whether the menu is open.
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

    /// Root of the menu content while open.
    pub fn content(&self) -> Option<NodeId> {
        self.0.content()
    }

    /// The highlighted item.
    pub fn active_item(&self) -> Option<NodeId> {
        let this = self.0.0.try_borrow().ok()?;
        this.menu.as_ref()?.active
    }

    /// Last computed position of the content.
    pub fn position(&self) -> Option<Position> {
        self.0.position()
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

/// The element that opens a [`Menu`].
#[derive(Debug)]
pub struct MenuTrigger {
    menu: Menu,
    node_ref: Option<RefTarget>,
}

impl MenuTrigger {
    /// The trigger of the innermost menu in `scope`.
    pub fn within(scope: &Scope) -> Result<Self, UsageError> {
        Ok(Self {
            menu: scope.require("MenuTrigger")?,
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
        self.menu.0.mount_trigger(env, parent, element, self.node_ref)
    }
}

/// The list of items of a [`Menu`].
#[derive(Debug)]
pub struct MenuContent {
    menu: Menu,
    size: Size,
    hooks: DismissHooks,
}

impl MenuContent {
    /// The content of the innermost menu in `scope`.
    pub fn within(scope: &Scope) -> Result<Self, UsageError> {
        Ok(Self {
            menu: scope.require("MenuContent")?,
            size: Size::new(180.0, 160.0),
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

    /// Register the item builder; it runs each time the menu opens.
    pub fn render(self, env: &mut Env, build: impl Fn(&mut Env, NodeId) + 'static) {
        self.menu
            .0
            .set_content(env, self.size, self.hooks, Rc::new(build));
    }
}

/// One action in a [`Menu`].
pub struct MenuItem {
    menu: Menu,
    on_select: Option<OnSelect>,
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("menu", &self.menu)
            .field("on_select", &self.on_select.is_some())
            .finish()
    }
}

impl MenuItem {
    /// An item of the innermost menu in `scope`.
    pub fn within(scope: &Scope) -> Result<Self, UsageError> {
        Ok(Self {
            menu: scope.require("MenuItem")?,
            on_select: None,
        })
    }

    /// Run `f` when the item is selected.
    pub fn on_select(mut self, f: impl Fn() + 'static) -> Self {
        self.on_select = Some(Rc::new(f));
        self
    }

    /// Insert `element` under `parent` as a menu item.
    ///
    /// Disabled elements stay in the menu but are skipped by navigation and
    /// never selected.
    pub fn mount(self, env: &mut Env, parent: NodeId, mut element: Element) -> NodeId {
        element.aria.role = Some(Role::MenuItem);
        if element.kind == ElementKind::Generic && element.tab_index.is_none() {
            element.tab_index = Some(-1);
        }
        let node = env.doc_mut().insert(Some(parent), element);
        env.attach(node, self.menu.0.0.clone());
        let on_select = self.on_select;
        self.menu.0.with(|this| {
            if let Some(menu) = this.menu.as_mut() {
                menu.items.push(MenuEntry { node, on_select });
            }
        });
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use understory_document::ElementFlags;

    struct Fixture {
        env: Env,
        menu: Menu,
        trigger: NodeId,
        selected: Rc<RefCell<Vec<&'static str>>>,
    }

    fn fixture(props: MenuProps, disabled: &'static [&'static str]) -> Fixture {
        let mut env = Env::new();
        let body = env.doc().body();
        let menu = Menu::new(props);
        let scope = menu.provide(&Scope::new());
        let trigger = MenuTrigger::within(&scope)
            .unwrap()
            .mount(&mut env, body, Element::button("Edit"));
        let selected = Rc::new(RefCell::new(Vec::new()));
        let log = selected.clone();
        let inner = scope.clone();
        MenuContent::within(&scope)
            .unwrap()
            .render(&mut env, move |env, root| {
                for label in ["Undo", "Redo", "Cut", "Copy", "Paste"] {
                    let log = log.clone();
                    let mut element = Element::button(label);
                    if disabled.contains(&label) {
                        element = element.with_flags(ElementFlags::DISABLED);
                    }
                    MenuItem::within(&inner)
                        .unwrap()
                        .on_select(move || log.borrow_mut().push(label))
                        .mount(env, root, element);
                }
            });
        Fixture {
            env,
            menu,
            trigger,
            selected,
        }
    }

    fn active_label(f: &Fixture) -> Option<&str> {
        f.env.doc().label(f.menu.active_item()?)
    }

    #[test]
    fn arrow_up_on_trigger_focuses_the_last_item() {
        let mut f = fixture(MenuProps::default(), &[]);
        f.env.focus(f.trigger);
        let ev = f.env.key(KeyEvent::new(Key::ArrowUp));
        assert!(ev.is_default_prevented());
        assert_eq!(active_label(&f), Some("Paste"));
        assert_eq!(
            f.env.doc().aria(f.trigger).unwrap().has_popup,
            Some(Role::Menu)
        );
    }

    #[test]
    fn navigation_wraps_and_skips_disabled_items() {
        let mut f = fixture(MenuProps::default(), &["Redo", "Paste"]);
        f.env.focus(f.trigger);
        f.env.key(KeyEvent::new(Key::ArrowDown));
        assert_eq!(active_label(&f), Some("Undo"));
        f.env.key(KeyEvent::new(Key::ArrowDown));
        assert_eq!(active_label(&f), Some("Cut"));
        f.env.key(KeyEvent::new(Key::End));
        assert_eq!(active_label(&f), Some("Copy"));
        f.env.key(KeyEvent::new(Key::ArrowDown));
        assert_eq!(active_label(&f), Some("Undo"));
        f.env.key(KeyEvent::new(Key::ArrowUp));
        assert_eq!(active_label(&f), Some("Copy"));
    }

    #[test]
    fn typeahead_jumps_to_matching_item() {
        let mut f = fixture(MenuProps::default(), &[]);
        f.env.focus(f.trigger);
        f.env.key(KeyEvent::new(Key::ArrowDown));
        f.env.key(KeyEvent::new(Key::Character('p')));
        assert_eq!(active_label(&f), Some("Paste"));
        f.env.advance_to(1000);
        f.env.key(KeyEvent::new(Key::Character('c')));
        assert_eq!(active_label(&f), Some("Cut"));
    }

    #[test]
    fn click_selects_and_closes() {
        let mut f = fixture(MenuProps::default(), &[]);
        f.env.click(f.trigger);
        let copy = f.env.doc().children_of(f.menu.content().unwrap())[3];
        f.env.click(copy);
        assert_eq!(*f.selected.borrow(), ["Copy"]);
        assert!(!f.menu.is_open());
        assert!(f.menu.is_released());
        assert_eq!(f.env.doc().focused(), Some(f.trigger));
    }

    #[test]
    fn disabled_items_are_never_selected() {
        let mut f = fixture(MenuProps::default(), &["Cut"]);
        f.env.click(f.trigger);
        let cut = f.env.doc().children_of(f.menu.content().unwrap())[2];
        f.env.click(cut);
        assert!(f.selected.borrow().is_empty());
        assert!(f.menu.is_open());
    }

    #[test]
    fn stays_open_when_configured() {
        let mut f = fixture(
            MenuProps {
                close_on_select: false,
                ..MenuProps::default()
            },
            &[],
        );
        f.env.click(f.trigger);
        let undo = f.env.doc().children_of(f.menu.content().unwrap())[0];
        f.env.click(undo);
        f.env.click(undo);
        assert_eq!(*f.selected.borrow(), ["Undo", "Undo"]);
        assert!(f.menu.is_open());
    }

    #[test]
    fn hover_highlights() {
        let mut f = fixture(MenuProps::default(), &[]);
        f.env.click(f.trigger);
        let redo = f.env.doc().children_of(f.menu.content().unwrap())[1];
        f.env.pointer_enter(redo);
        assert_eq!(f.menu.active_item(), Some(redo));
        assert_eq!(f.env.doc().focused(), Some(redo));
        let root = f.menu.content().unwrap();
        assert_eq!(f.env.doc().aria(root).unwrap().active_descendant, Some(redo));

        // Focus moved by the host keeps the highlight in step.
        let cut = f.env.doc().children_of(root)[2];
        f.env.focus(cut);
        assert_eq!(f.menu.active_item(), Some(cut));
    }

    #[test]
    fn tab_closes_the_menu() {
        let mut f = fixture(MenuProps::default(), &[]);
        f.env.focus(f.trigger);
        f.env.key(KeyEvent::new(Key::ArrowDown));
        f.env.key(KeyEvent::new(Key::Tab));
        assert!(!f.menu.is_open());
    }
}
