// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Combobox: a text input filtering a floating list of options.
//!
//! The combobox tracks four pieces of state: whether the list is open, the
//! query typed into the input, the highlighted option (an index into the
//! filtered options), and the committed value. The committed value may be
//! controlled by the owner; the rest is held here.
//!
//! Typing or focusing opens the list. The arrow keys move the highlight and
//! stop at either end; Enter commits the highlighted option and writes its
//! label into the input. Escape and outside presses close the list without
//! committing. Tab commits an option whose label matches the query exactly.

use alloc::rc::{Rc, Weak};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use kurbo::{Rect, Size};
use understory_anchor::{Alignment, Placement, Position, PositionConfig, Side};
use understory_disclosure::{Controllable, OnChange};
use understory_document::{Damage, Element, ElementFlags, NodeId, NodeRef, Role};
use understory_events::{Event, Key, Outcome, Preventable};
use understory_focus::{Navigation, WrapMode, step};

use crate::env::{Component, Env, EventCx};
use crate::scope::{ItemId, Provider, Scope, UsageError};
use crate::surface::{LayerKind, Surface, SurfaceKind};

/// Height of one row of the list.
const ROW_HEIGHT: f64 = 32.0;
/// Width of the list when the combobox has no laid-out width.
const MIN_LIST_WIDTH: f64 = 200.0;

/// One selectable option.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComboboxOption {
    /// Identity of the option; the committed value.
    pub id: ItemId,
    /// Text shown in the list and written to the input on commit.
    pub label: String,
    /// Disabled options are shown but cannot be highlighted or committed.
    pub disabled: bool,
}

impl ComboboxOption {
    /// An enabled option.
    pub fn new(id: impl Into<ItemId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            disabled: false,
        }
    }

    /// Set whether the option is disabled.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Decides whether an option matches a query.
pub type Filter = Rc<dyn Fn(&ComboboxOption, &str) -> bool>;

/// Case-insensitive substring match on the option's label.
pub fn default_filter(option: &ComboboxOption, query: &str) -> bool {
    option
        .label
        .to_lowercase()
        .contains(&query.to_lowercase())
}

/// Configuration of a [`Combobox`].
pub struct ComboboxProps {
    /// The options, in display order. Ids are unique.
    pub options: Vec<ComboboxOption>,
    /// Controlled committed value; `Some(None)` is a controlled empty value.
    pub value: Option<Option<ItemId>>,
    /// Initial committed value when uncontrolled.
    pub default_value: Option<ItemId>,
    /// Called with every requested value.
    pub on_change: Option<OnChange<Option<ItemId>>>,
    /// Replaces [`default_filter`].
    pub filter: Option<Filter>,
    /// Show a clear button while the query is not empty.
    pub clearable: bool,
    /// Ignore all interaction.
    pub disabled: bool,
    /// Text of the status row shown when nothing matches.
    pub no_results_text: String,
    /// Preferred placement of the list relative to the input.
    pub placement: Placement,
}

impl Default for ComboboxProps {
    fn default() -> Self {
        Self {
            options: Vec::new(),
            value: None,
            default_value: None,
            on_change: None,
            filter: None,
            clearable: true,
            disabled: false,
            no_results_text: "No results".to_string(),
            placement: Placement::new(Side::Bottom, Alignment::Start),
        }
    }
}

impl fmt::Debug for ComboboxProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComboboxProps")
            .field("options", &self.options.len())
            .field("value", &self.value)
            .field("default_value", &self.default_value)
            .field("clearable", &self.clearable)
            .field("disabled", &self.disabled)
            .field("placement", &self.placement)
            .finish_non_exhaustive()
    }
}

const SURFACE: SurfaceKind = SurfaceKind {
    role: Role::Listbox,
    layer: LayerKind::Full,
    trap_focus: false,
    backdrop: false,
    lock_scroll: false,
    modal: false,
};

struct ComboboxInner {
    me: Weak<RefCell<Self>>,
    options: Vec<ComboboxOption>,
    filter: Option<Filter>,
    value: Controllable<Option<ItemId>>,
    query: String,
    open: bool,
    /// Index into the filtered options.
    active: Option<usize>,
    clearable: bool,
    disabled: bool,
    no_results_text: String,
    root: NodeId,
    input_ref: NodeRef,
    input: Option<NodeId>,
    clear: Option<NodeId>,
    caret: Option<NodeId>,
    surface: Surface,
    /// Rendered rows, one per filtered option.
    rows: Vec<NodeId>,
    status: Option<NodeId>,
    dirty: bool,
    detached: bool,
}

impl fmt::Debug for ComboboxInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComboboxInner")
            .field("value", &self.value)
            .field("query", &self.query)
            .field("open", &self.open)
            .field("active", &self.active)
            .field("root", &self.root)
            .field("input", &self.input)
            .field("surface", &self.surface)
            .finish_non_exhaustive()
    }
}

impl ComboboxInner {
    fn owner(&self) -> Option<Rc<dyn Component>> {
        let me: Rc<dyn Component> = self.me.upgrade()?;
        Some(me)
    }

    fn schedule(&self, env: &mut Env) {
        let me: Weak<dyn Component> = self.me.clone();
        env.schedule(me);
    }

    fn matches(&self, option: &ComboboxOption) -> bool {
        match &self.filter {
            Some(filter) => filter(option, &self.query),
            None => default_filter(option, &self.query),
        }
    }

    /// Indices into `options` of the options matching the query.
    fn filtered(&self) -> Vec<usize> {
        (0..self.options.len())
            .filter(|&i| self.matches(&self.options[i]))
            .collect()
    }

    fn label_of(&self, id: Option<&ItemId>) -> String {
        id.and_then(|id| self.options.iter().find(|o| &o.id == id))
            .map(|o| o.label.clone())
            .unwrap_or_default()
    }

    fn set_open(&mut self, env: &mut Env, open: bool) {
        if self.open != open {
            tracing::debug!(open, "combobox list toggled");
            self.open = open;
            self.dirty = true;
        }
        self.schedule(env);
    }

    /// Move the highlight, skipping disabled options and stopping at the ends.
    fn highlight(&mut self, nav: Navigation) {
        let filtered = self.filtered();
        let enabled = |i: usize| !self.options[filtered[i]].disabled;
        let next = step(filtered.len(), self.active, nav, WrapMode::Never, enabled);
        self.active = next.or(self.active);
        tracing::trace!(?nav, active = ?self.active, "combobox highlight");
    }

    fn commit(&mut self, env: &mut Env, index: usize) {
        let filtered = self.filtered();
        let Some(option) = filtered.get(index).map(|&i| &self.options[i]) else {
            return;
        };
        if option.disabled {
            tracing::trace!(option = ?option.id, "disabled option ignored");
            return;
        }
        let (id, label) = (option.id.clone(), option.label.clone());
        tracing::debug!(option = ?id, "combobox value committed");
        self.value.request_change(Some(id));
        self.query = label;
        self.set_open(env, false);
        self.dirty = true;
    }

    fn clear(&mut self, env: &mut Env) {
        tracing::debug!("combobox cleared");
        self.value.request_change(None);
        self.query.clear();
        self.active = None;
        self.dirty = true;
        self.schedule(env);
    }

    fn on_input_key(&mut self, env: &mut Env, k: &mut understory_events::KeyEvent) {
        match k.key {
            Key::ArrowDown => {
                k.prevent_default();
                if self.open {
                    self.highlight(Navigation::Next);
                } else {
                    self.active = None;
                    self.highlight(Navigation::First);
                    self.set_open(env, true);
                }
            }
            Key::ArrowUp => {
                k.prevent_default();
                if self.open {
                    self.highlight(Navigation::Prev);
                } else {
                    self.active = None;
                    self.highlight(Navigation::Last);
                    self.set_open(env, true);
                }
            }
            Key::Home if self.open => {
                k.prevent_default();
                self.highlight(Navigation::First);
            }
            Key::End if self.open => {
                k.prevent_default();
                self.highlight(Navigation::Last);
            }
            Key::Enter if self.open => {
                if let Some(index) = self.active {
                    k.prevent_default();
                    self.commit(env, index);
                }
            }
            Key::Tab => {
                let filtered = self.filtered();
                let exact = filtered
                    .iter()
                    .position(|&i| self.options[i].label == self.query);
                if let Some(index) = exact {
                    self.commit(env, index);
                }
                self.set_open(env, false);
            }
            _ => return,
        }
        self.schedule(env);
    }

    fn on_event(&mut self, env: &mut Env, event: &mut Event, cx: &EventCx) {
        let Some(node) = cx.node else {
            if let Some(reason) = self.surface.on_document_event(env, event, cx) {
                tracing::debug!(?reason, "combobox list dismissed");
                self.set_open(env, false);
            }
            return;
        };
        if self.disabled {
            return;
        }
        if Some(node) == self.input {
            match event {
                Event::Focus => self.set_open(env, true),
                Event::Input(text) => {
                    self.query = core::mem::take(text);
                    self.active = None;
                    self.highlight(Navigation::First);
                    self.dirty = true;
                    self.set_open(env, true);
                }
                Event::Key(k) => self.on_input_key(env, k),
                _ => {}
            }
        } else if Some(node) == self.clear || Some(node) == self.caret {
            match event {
                // Keep focus in the input.
                Event::PointerDown(p) => p.prevent_default(),
                Event::Click if Some(node) == self.clear => self.clear(env),
                Event::Click => {
                    let open = !self.open;
                    self.set_open(env, open);
                }
                _ => {}
            }
        } else if let Some(index) = self.rows.iter().position(|&r| r == node) {
            match event {
                Event::PointerDown(p) => p.prevent_default(),
                Event::PointerEnter => {
                    let filtered = self.filtered();
                    if filtered
                        .get(index)
                        .is_some_and(|&i| !self.options[i].disabled)
                    {
                        self.active = Some(index);
                        self.schedule(env);
                    }
                }
                Event::Click => self.commit(env, index),
                _ => {}
            }
        }
    }

    fn sync(&mut self, env: &mut Env) {
        if let Some(input) = self.input
            && !env.doc().is_alive(input)
        {
            tracing::debug!("combobox input removed; tearing down");
            self.input = None;
            self.input_ref.set(None);
            self.detached = true;
            self.close(env);
            self.open = false;
            self.active = None;
        }
        if let Some(root) = self.surface.root()
            && !env.doc().is_alive(root)
        {
            tracing::debug!("combobox list removed while open");
            self.close(env);
            self.open = false;
        }
        let want = self.open && !self.disabled && !self.detached && self.input.is_some();
        match (want, self.surface.is_mounted()) {
            (true, false) => self.mount(env),
            (true, true) if self.dirty => self.render(env),
            (false, true) => self.close(env),
            _ => {}
        }
        self.dirty = false;
        self.update_parts(env);
    }

    fn mount(&mut self, env: &mut Env) {
        let Some(owner) = self.owner() else {
            return;
        };
        let width = env
            .doc()
            .bounds(self.root)
            .map_or(0.0, |b| b.width())
            .max(MIN_LIST_WIDTH);
        self.surface.size = Size::new(width, ROW_HEIGHT);
        self.surface.mount(env, &owner);
        self.render(env);
        self.surface.activate(env, &owner, Some(self.root));
    }

    /// Rebuild the rows of the mounted list.
    fn render(&mut self, env: &mut Env) {
        let (Some(root), Some(owner)) = (self.surface.root(), self.owner()) else {
            return;
        };
        for node in self.rows.drain(..).chain(self.status.take()) {
            env.detach(node, &owner);
            env.doc_mut().remove(node);
        }
        let filtered = self.filtered();
        for &i in &filtered {
            let option = &self.options[i];
            let mut element = Element::button(option.label.as_str()).with_role(Role::Option);
            element.tab_index = Some(-1);
            if option.disabled {
                element.flags |= ElementFlags::DISABLED;
            }
            let row = env.doc_mut().insert(Some(root), element);
            env.attach(row, owner.clone());
            self.rows.push(row);
        }
        if filtered.is_empty() {
            let status = Element::generic()
                .with_role(Role::Status)
                .with_label(self.no_results_text.as_str());
            self.status = Some(env.doc_mut().insert(Some(root), status));
        }
        if let Some(bounds) = env.doc().bounds(root) {
            let rows = filtered.len().max(1) as f64;
            let size = Size::new(bounds.width(), rows * ROW_HEIGHT);
            env.doc_mut()
                .set_bounds(root, Rect::from_origin_size(bounds.origin(), size));
        }
        tracing::trace!(rows = filtered.len(), "combobox list rendered");
    }

    fn close(&mut self, env: &mut Env) {
        if let Some(owner) = self.owner() {
            for row in self.rows.drain(..) {
                env.detach(row, &owner);
            }
        }
        self.status = None;
        if self.surface.is_mounted() || !self.surface.is_released() {
            self.surface.deactivate(env, false);
        }
    }

    fn update_parts(&self, env: &mut Env) {
        let filtered = self.filtered();
        let selected = self.value.get().clone();
        let active_row = self.active.and_then(|i| self.rows.get(i).copied());
        let listbox = self.surface.root();
        let open = listbox.is_some();
        let doc = env.doc_mut();
        if let Some(input) = self.input {
            doc.set_label(input, &self.query);
            doc.set_flag(input, ElementFlags::DISABLED, self.disabled);
            if let Some(aria) = doc.aria_mut(input) {
                aria.role = Some(Role::Combobox);
                aria.expanded = Some(open);
                aria.controls = listbox;
                aria.active_descendant = active_row;
            }
        }
        if let Some(clear) = self.clear {
            let visible = self.clearable && !self.query.is_empty() && !self.disabled;
            doc.set_flag(clear, ElementFlags::HIDDEN, !visible);
        }
        if let Some(caret) = self.caret {
            doc.set_flag(caret, ElementFlags::DISABLED, self.disabled);
            doc.set_label(caret, if open { "Close options" } else { "Open options" });
            if let Some(aria) = doc.aria_mut(caret) {
                aria.expanded = Some(open);
            }
        }
        for (row_index, (&row, &i)) in self.rows.iter().zip(&filtered).enumerate() {
            let on = selected.as_ref() == Some(&self.options[i].id) || self.active == Some(row_index);
            if let Some(aria) = doc.aria_mut(row) {
                aria.selected = Some(on);
            }
        }
    }
}

impl Component for RefCell<ComboboxInner> {
    fn handle(&self, env: &mut Env, event: &mut Event, cx: &EventCx) -> Outcome {
        match self.try_borrow_mut() {
            Ok(mut this) => this.on_event(env, event, cx),
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

    fn on_layout(&self, env: &mut Env, damage: &Damage) {
        if let Ok(mut this) = self.try_borrow_mut() {
            this.surface.on_layout(env, damage);
        }
    }
}

/// A text input with a filtered list of options.
///
/// ```rust
/// use understory_overlay::{
///     Combobox, ComboboxInput, ComboboxOption, ComboboxProps, Env, Scope,
/// };
/// use understory_events::{Key, KeyEvent};
///
/// let mut env = Env::new();
/// let body = env.doc().body();
/// let combobox = Combobox::new(
///     &mut env,
///     body,
///     ComboboxProps {
///         options: ["Alpha", "Bravo", "Charlie", "Delta"]
///             .into_iter()
///             .map(|l| ComboboxOption::new(l.to_lowercase(), l))
///             .collect(),
///         ..ComboboxProps::default()
///     },
/// );
/// let scope = combobox.provide(&Scope::new());
/// let input = ComboboxInput::within(&scope)?.mount(&mut env);
///
/// env.focus(input);
/// env.input(input, "ch");
/// assert_eq!(combobox.filtered_labels(), ["Charlie"]);
/// env.key(KeyEvent::new(Key::Enter));
/// assert_eq!(combobox.value().as_ref().map(|v| v.as_str()), Some("charlie"));
/// assert_eq!(env.doc().label(input), Some("Charlie"));
/// assert!(!combobox.is_open());
/// # Ok::<(), understory_overlay::UsageError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Combobox(Rc<RefCell<ComboboxInner>>);

impl Provider for Combobox {
    const NAME: &'static str = "Combobox";
}

impl Combobox {
    /// Create a combobox, mounting its wrapper element under `parent`.
    ///
    /// Presses inside the wrapper or the list never close the list.
    pub fn new(env: &mut Env, parent: NodeId, props: ComboboxProps) -> Self {
        let root = env.doc_mut().insert(Some(parent), Element::generic());
        let value =
            Controllable::from_props(props.value, props.default_value, props.on_change);
        let input_ref = NodeRef::new();
        let config = PositionConfig {
            offset_px: 6.0,
            ..PositionConfig::with_placement(props.placement)
        };
        let combobox = Self(Rc::new_cyclic(|me| {
            let mut inner = ComboboxInner {
                me: me.clone(),
                options: props.options,
                filter: props.filter,
                value,
                query: String::new(),
                open: false,
                active: None,
                clearable: props.clearable,
                disabled: props.disabled,
                no_results_text: props.no_results_text,
                root,
                surface: Surface::new(SURFACE, input_ref.clone(), Some(config)),
                input_ref,
                input: None,
                clear: None,
                caret: None,
                rows: Vec::new(),
                status: None,
                dirty: false,
                detached: false,
            };
            inner.query = inner.label_of(inner.value.get().as_ref());
            RefCell::new(inner)
        }));
        let owner: Rc<dyn Component> = combobox.0.clone();
        env.attach(root, owner);
        combobox
    }

    /// A scope providing this combobox to its parts.
    pub fn provide(&self, scope: &Scope) -> Scope {
        scope.provide(self.clone())
    }

    fn with<R>(&self, f: impl FnOnce(&mut ComboboxInner) -> R) -> Option<R> {
        match self.0.try_borrow_mut() {
            Ok(mut this) => Some(f(&mut this)),
            Err(_) => {
                tracing::warn!("combobox is busy; call ignored");
                None
            }
        }
    }

    fn mount_part(
        &self,
        env: &mut Env,
        element: Element,
        slot: impl FnOnce(&mut ComboboxInner, NodeId),
    ) -> NodeId {
        let root = self.0.borrow().root;
        let node = env.doc_mut().insert(Some(root), element);
        let owner: Rc<dyn Component> = self.0.clone();
        env.attach(node, owner);
        self.with(|this| {
            slot(this, node);
            this.schedule(env);
        });
        env.flush();
        node
    }

    /// The wrapper element.
    pub fn root(&self) -> NodeId {
        self.0.borrow().root
    }

    /// The mounted input.
    pub fn input(&self) -> Option<NodeId> {
        self.0.try_borrow().ok()?.input
    }

    /// Root of the list while open.
    pub fn listbox(&self) -> Option<NodeId> {
        self.0.try_borrow().ok()?.surface.root()
    }

    /// Whether the list is open.
    pub fn is_open(&self) -> bool {
        self.0.try_borrow().is_ok_and(|this| this.open)
    }

    /// Open or close the list.
    pub fn set_open(&self, env: &mut Env, open: bool) {
        self.with(|this| {
            if !this.disabled {
                this.set_open(env, open);
            }
        });
        env.flush();
    }

    /// The committed value.
    pub fn value(&self) -> Option<ItemId> {
        self.0.try_borrow().ok()?.value.get().clone()
    }

    /// Text of the input.
    pub fn query(&self) -> String {
        self.0
            .try_borrow()
            .map(|this| this.query.clone())
            .unwrap_or_default()
    }

    /// Labels of the options matching the query, in display order.
    pub fn filtered_labels(&self) -> Vec<String> {
        let Ok(this) = self.0.try_borrow() else {
            return Vec::new();
        };
        this.filtered()
            .into_iter()
            .map(|i| this.options[i].label.clone())
            .collect()
    }

    /// Whether any option matches the query.
    pub fn has_results(&self) -> bool {
        self.0
            .try_borrow()
            .is_ok_and(|this| this.options.iter().any(|o| this.matches(o)))
    }

    /// The highlighted option.
    pub fn active_option(&self) -> Option<ItemId> {
        let this = self.0.try_borrow().ok()?;
        let i = *this.filtered().get(this.active?)?;
        Some(this.options[i].id.clone())
    }

    /// The list row showing option `id`, while open.
    pub fn option_node(&self, id: &str) -> Option<NodeId> {
        let this = self.0.try_borrow().ok()?;
        let row = this
            .filtered()
            .into_iter()
            .position(|i| this.options[i].id.as_str() == id)?;
        this.rows.get(row).copied()
    }

    /// The "no results" status row, while open and nothing matches.
    pub fn status(&self) -> Option<NodeId> {
        self.0.try_borrow().ok()?.status
    }

    /// Replace the options. Ids must be unique.
    pub fn set_options(
        &self,
        env: &mut Env,
        options: Vec<ComboboxOption>,
    ) -> Result<(), UsageError> {
        for (i, o) in options.iter().enumerate() {
            if options[..i].iter().any(|p| p.id == o.id) {
                return Err(UsageError::DuplicateItem {
                    part: "ComboboxOption",
                    id: o.id.clone(),
                });
            }
        }
        self.with(|this| {
            this.options = options;
            this.active = None;
            this.dirty = true;
            this.schedule(env);
        });
        env.flush();
        Ok(())
    }

    /// Enable or disable the whole combobox.
    pub fn set_disabled(&self, env: &mut Env, disabled: bool) {
        self.with(|this| {
            this.disabled = disabled;
            this.schedule(env);
        });
        env.flush();
    }

    /// Pass a new `value` prop from the owner; the input text follows the
    /// value's label.
    pub fn sync_value(&self, env: &mut Env, value: Option<ItemId>) {
        self.with(|this| {
            this.value.sync_props(Some(value));
            if !this.value.is_controlled() {
                return;
            }
            this.query = this.label_of(this.value.get().as_ref());
            this.dirty = true;
            this.schedule(env);
        });
        env.flush();
    }

    /// Reset the value and the query.
    pub fn clear(&self, env: &mut Env) {
        self.with(|this| this.clear(env));
        env.flush();
    }

    /// Whether the list is unmounted and nothing it acquired is held.
    pub fn is_released(&self) -> bool {
        self.0
            .try_borrow()
            .is_ok_and(|this| !this.surface.is_mounted() && this.surface.is_released())
    }

    /// Last computed position of the list.
    pub fn position(&self) -> Option<Position> {
        self.0.try_borrow().ok()?.surface.position()
    }

    /// Tear everything down and remove the wrapper.
    pub fn unmount(&self, env: &mut Env) {
        let owner: Rc<dyn Component> = self.0.clone();
        let root = self.with(|this| {
            this.open = false;
            this.close(env);
            this.detached = true;
            for node in [this.input.take(), this.clear.take(), this.caret.take()]
                .into_iter()
                .flatten()
            {
                env.detach(node, &owner);
            }
            this.input_ref.set(None);
            this.root
        });
        if let Some(root) = root {
            env.detach(root, &owner);
            env.remove(root);
        }
    }
}

/// The text input of a [`Combobox`].
#[derive(Debug)]
pub struct ComboboxInput {
    combobox: Combobox,
    element: Element,
}

impl ComboboxInput {
    /// The input of the innermost combobox in `scope`.
    pub fn within(scope: &Scope) -> Result<Self, UsageError> {
        Ok(Self {
            combobox: scope.require("ComboboxInput")?,
            element: Element::input(),
        })
    }

    /// Use `element` instead of a plain input.
    pub fn element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    /// Insert the input into the combobox wrapper.
    pub fn mount(self, env: &mut Env) -> NodeId {
        let element = self.element.with_role(Role::Combobox);
        self.combobox.mount_part(env, element, |this, node| {
            this.input = Some(node);
            this.input_ref.set(Some(node));
            this.detached = false;
        })
    }
}

/// The button resetting a [`Combobox`].
#[derive(Debug)]
pub struct ComboboxClear {
    combobox: Combobox,
}

impl ComboboxClear {
    /// The clear button of the innermost combobox in `scope`.
    pub fn within(scope: &Scope) -> Result<Self, UsageError> {
        Ok(Self {
            combobox: scope.require("ComboboxClear")?,
        })
    }

    /// Insert the clear button into the combobox wrapper.
    pub fn mount(self, env: &mut Env) -> NodeId {
        self.combobox
            .mount_part(env, Element::button("Clear"), |this, node| {
                this.clear = Some(node);
            })
    }
}

/// The button toggling the list of a [`Combobox`].
#[derive(Debug)]
pub struct ComboboxCaret {
    combobox: Combobox,
}

impl ComboboxCaret {
    /// The caret button of the innermost combobox in `scope`.
    pub fn within(scope: &Scope) -> Result<Self, UsageError> {
        Ok(Self {
            combobox: scope.require("ComboboxCaret")?,
        })
    }

    /// Insert the caret button into the combobox wrapper.
    pub fn mount(self, env: &mut Env) -> NodeId {
        self.combobox
            .mount_part(env, Element::button("Open options"), |this, node| {
                this.caret = Some(node);
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;
    use alloc::vec;
    use kurbo::Point;
    use understory_events::{EventKind, KeyEvent, Propagating};

    struct Fixture {
        env: Env,
        combobox: Combobox,
        input: NodeId,
        clear: NodeId,
        caret: NodeId,
    }

    fn options() -> Vec<ComboboxOption> {
        ["Alpha", "Bravo", "Charlie", "Delta"]
            .into_iter()
            .map(|l| ComboboxOption::new(l.to_lowercase(), l))
            .collect()
    }

    fn fixture(props: ComboboxProps) -> Fixture {
        let mut env = Env::new();
        let body = env.doc().body();
        let combobox = Combobox::new(&mut env, body, props);
        let scope = combobox.provide(&Scope::new());
        let input = ComboboxInput::within(&scope).unwrap().mount(&mut env);
        let clear = ComboboxClear::within(&scope).unwrap().mount(&mut env);
        let caret = ComboboxCaret::within(&scope).unwrap().mount(&mut env);
        Fixture {
            env,
            combobox,
            input,
            clear,
            caret,
        }
    }

    fn basic() -> Fixture {
        fixture(ComboboxProps {
            options: options(),
            ..ComboboxProps::default()
        })
    }

    fn press(f: &mut Fixture, key: Key) -> KeyEvent {
        f.env.key(KeyEvent::new(key))
    }

    fn active(f: &Fixture) -> Option<String> {
        f.combobox.active_option().map(|id| id.as_str().to_string())
    }

    #[test]
    fn focus_opens_and_aria_follows() {
        let mut f = basic();
        assert_eq!(f.env.doc().aria(f.input).unwrap().expanded, Some(false));
        f.env.focus(f.input);
        assert!(f.combobox.is_open());
        let listbox = f.combobox.listbox().unwrap();
        let aria = f.env.doc().aria(f.input).unwrap();
        assert_eq!(aria.role, Some(Role::Combobox));
        assert_eq!(aria.expanded, Some(true));
        assert_eq!(aria.controls, Some(listbox));
        assert_eq!(f.env.doc().aria(listbox).unwrap().role, Some(Role::Listbox));
        assert_eq!(f.env.doc().children_of(listbox).len(), 4);
        assert_eq!(f.env.doc().focused(), Some(f.input));
    }

    #[test]
    fn typing_filters_and_highlights_the_first_match() {
        let mut f = basic();
        f.env.focus(f.input);
        f.env.input(f.input, "a");
        assert_eq!(
            f.combobox.filtered_labels(),
            ["Alpha", "Bravo", "Charlie", "Delta"]
        );
        f.env.input(f.input, "ch");
        assert_eq!(f.combobox.filtered_labels(), ["Charlie"]);
        assert_eq!(active(&f).as_deref(), Some("charlie"));
        let row = f.combobox.option_node("charlie").unwrap();
        let aria = f.env.doc().aria(f.input).unwrap();
        assert_eq!(aria.active_descendant, Some(row));
        assert_eq!(f.env.doc().aria(row).unwrap().selected, Some(true));

        press(&mut f, Key::Enter);
        assert_eq!(f.combobox.value().as_ref().map(ItemId::as_str), Some("charlie"));
        assert_eq!(f.combobox.query(), "Charlie");
        assert_eq!(f.env.doc().label(f.input), Some("Charlie"));
        assert!(!f.combobox.is_open());
        assert!(f.combobox.is_released());
    }

    #[test]
    fn arrows_clamp_and_skip_disabled_options() {
        let mut opts = options();
        opts[1].disabled = true;
        let mut f = fixture(ComboboxProps {
            options: opts,
            ..ComboboxProps::default()
        });
        f.env.focus(f.input);
        f.combobox.set_open(&mut f.env, false);

        let ev = press(&mut f, Key::ArrowDown);
        assert!(ev.is_default_prevented());
        assert!(f.combobox.is_open());
        assert_eq!(active(&f).as_deref(), Some("alpha"));
        press(&mut f, Key::ArrowDown);
        assert_eq!(active(&f).as_deref(), Some("charlie"));
        press(&mut f, Key::ArrowDown);
        press(&mut f, Key::ArrowDown);
        assert_eq!(active(&f).as_deref(), Some("delta"));
        press(&mut f, Key::Home);
        assert_eq!(active(&f).as_deref(), Some("alpha"));
        press(&mut f, Key::ArrowUp);
        assert_eq!(active(&f).as_deref(), Some("alpha"));

        f.combobox.set_open(&mut f.env, false);
        press(&mut f, Key::ArrowUp);
        assert!(f.combobox.is_open());
        assert_eq!(active(&f).as_deref(), Some("delta"));
    }

    #[test]
    fn home_and_end_do_nothing_while_closed() {
        let mut f = basic();
        f.env.focus(f.input);
        f.combobox.set_open(&mut f.env, false);
        let ev = press(&mut f, Key::End);
        assert!(!ev.is_default_prevented());
        assert!(!f.combobox.is_open());
        assert_eq!(active(&f), None);
    }

    #[test]
    fn escape_closes_without_committing() {
        let mut f = basic();
        f.env.focus(f.input);
        f.env.input(f.input, "br");
        let ev = press(&mut f, Key::Escape);
        assert!(ev.is_propagation_stopped());
        assert!(!f.combobox.is_open());
        assert_eq!(f.combobox.value(), None);
        assert_eq!(f.combobox.query(), "br");
        assert!(f.env.layers().is_empty());
        assert_eq!(f.env.total_listeners(), 0);
    }

    #[test]
    fn tab_commits_only_an_exact_label() {
        let mut f = basic();
        f.env.focus(f.input);
        f.env.input(f.input, "delt");
        press(&mut f, Key::Tab);
        assert_eq!(f.combobox.value(), None);
        assert!(!f.combobox.is_open());

        f.env.input(f.input, "Delta");
        press(&mut f, Key::Tab);
        assert_eq!(f.combobox.value().as_ref().map(ItemId::as_str), Some("delta"));
    }

    #[test]
    fn enter_skips_a_disabled_highlight() {
        let mut f = fixture(ComboboxProps {
            options: vec![ComboboxOption::new("x", "Xray").disabled(true)],
            ..ComboboxProps::default()
        });
        f.env.focus(f.input);
        f.env.input(f.input, "x");
        assert_eq!(active(&f), None);
        let ev = press(&mut f, Key::Enter);
        assert!(!ev.is_default_prevented());
        assert_eq!(f.combobox.value(), None);
        let row = f.combobox.option_node("x").unwrap();
        f.env.click(row);
        assert_eq!(f.combobox.value(), None);
    }

    #[test]
    fn empty_results_show_a_status_row() {
        let mut f = basic();
        f.env.focus(f.input);
        f.env.input(f.input, "zulu");
        assert!(!f.combobox.has_results());
        let status = f.combobox.status().unwrap();
        assert_eq!(f.env.doc().aria(status).unwrap().role, Some(Role::Status));
        assert_eq!(f.env.doc().label(status), Some("No results"));
        f.env.input(f.input, "z");
        assert!(f.combobox.status().is_some());
        f.env.input(f.input, "");
        assert!(f.combobox.has_results());
        assert_eq!(f.combobox.status(), None);
    }

    #[test]
    fn pointer_highlights_and_clicks_commit() {
        let mut f = basic();
        f.env.focus(f.input);
        let bravo = f.combobox.option_node("bravo").unwrap();
        f.env.pointer_enter(bravo);
        assert_eq!(active(&f).as_deref(), Some("bravo"));
        let ev = f.env.pointer_down(Some(bravo), Point::ZERO);
        assert!(ev.is_default_prevented());
        assert!(f.combobox.is_open());
        assert_eq!(f.env.doc().focused(), Some(f.input));
        f.env.click(bravo);
        assert_eq!(f.combobox.value().as_ref().map(ItemId::as_str), Some("bravo"));
        assert_eq!(f.combobox.query(), "Bravo");
        assert!(!f.combobox.is_open());
    }

    #[test]
    fn outside_press_closes_but_wrapper_presses_do_not() {
        let mut f = basic();
        f.env.focus(f.input);
        f.env.pointer_down(Some(f.input), Point::ZERO);
        assert!(f.combobox.is_open());
        let body = f.env.doc().body();
        f.env.pointer_down(Some(body), Point::ZERO);
        assert!(!f.combobox.is_open());
        assert_eq!(f.env.listener_count(EventKind::PointerDown), 0);
    }

    #[test]
    fn caret_toggles_and_clear_resets() {
        let mut f = basic();
        assert!(f.env.doc().flags(f.clear).unwrap().contains(ElementFlags::HIDDEN));
        f.env.click(f.caret);
        assert!(f.combobox.is_open());
        assert_eq!(f.env.doc().label(f.caret), Some("Close options"));
        f.env.click(f.caret);
        assert!(!f.combobox.is_open());

        f.env.focus(f.input);
        f.env.input(f.input, "alp");
        press(&mut f, Key::Enter);
        assert!(!f.env.doc().flags(f.clear).unwrap().contains(ElementFlags::HIDDEN));
        f.env.click(f.clear);
        assert_eq!(f.combobox.value(), None);
        assert_eq!(f.combobox.query(), "");
        assert_eq!(active(&f), None);
        assert!(f.env.doc().flags(f.clear).unwrap().contains(ElementFlags::HIDDEN));
    }

    #[test]
    fn disabled_combobox_ignores_interaction() {
        let mut f = fixture(ComboboxProps {
            options: options(),
            disabled: true,
            ..ComboboxProps::default()
        });
        assert!(!f.env.focus(f.input));
        f.env.input(f.input, "a");
        f.env.click(f.caret);
        assert!(!f.combobox.is_open());
        assert_eq!(f.combobox.query(), "");
    }

    #[test]
    fn controlled_value_resyncs_the_query() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut f = fixture(ComboboxProps {
            options: options(),
            value: Some(Some("alpha".into())),
            on_change: Some(Box::new(move |v: &Option<ItemId>| {
                sink.borrow_mut().push(v.clone());
            })),
            ..ComboboxProps::default()
        });
        assert_eq!(f.combobox.query(), "Alpha");
        f.env.focus(f.input);
        f.env.input(f.input, "del");
        press(&mut f, Key::Enter);
        assert_eq!(*seen.borrow(), [Some(ItemId::from("delta"))]);
        assert_eq!(f.combobox.value().as_ref().map(ItemId::as_str), Some("alpha"));

        f.combobox.sync_value(&mut f.env, Some("bravo".into()));
        assert_eq!(f.combobox.query(), "Bravo");
        assert_eq!(f.env.doc().label(f.input), Some("Bravo"));
    }

    #[test]
    fn custom_filter_and_duplicate_options() {
        let starts: Filter = Rc::new(|o: &ComboboxOption, q: &str| o.label.starts_with(q));
        let mut f = fixture(ComboboxProps {
            options: options(),
            filter: Some(starts),
            ..ComboboxProps::default()
        });
        f.env.focus(f.input);
        f.env.input(f.input, "D");
        assert_eq!(f.combobox.filtered_labels(), ["Delta"]);
        let err = f
            .combobox
            .set_options(
                &mut f.env,
                vec![ComboboxOption::new("a", "A"), ComboboxOption::new("a", "B")],
            )
            .unwrap_err();
        assert!(matches!(err, UsageError::DuplicateItem { .. }));
    }

    #[test]
    fn removing_the_input_tears_the_list_down() {
        let mut f = basic();
        f.env.focus(f.input);
        assert!(f.combobox.listbox().is_some());
        f.env.remove(f.input);
        assert!(f.combobox.is_released());
        assert!(f.env.layers().is_empty());
        assert_eq!(f.env.total_listeners(), 0);
        assert_eq!(f.env.layout_watchers(), 0);

        // A new input starts closed until it is focused or typed into.
        let scope = f.combobox.provide(&Scope::new());
        let input = ComboboxInput::within(&scope).unwrap().mount(&mut f.env);
        assert!(!f.combobox.is_open());
        assert!(f.combobox.listbox().is_none());
        assert_eq!(f.env.doc().aria(input).unwrap().expanded, Some(false));
    }
}
