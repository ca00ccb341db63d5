// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host environment: document, shared listener registry, layer stack,
//! clock, and the reconcile queue.

use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use kurbo::Point;
use smallvec::SmallVec;
use understory_document::{Damage, Document, ElementKind, NodeId};
use understory_dismiss::LayerStack;
use understory_events::{
    Dispatch, Event, EventKind, Key, KeyEvent, ListenerId, ListenerRegistry, Outcome, Phase,
    PointerEvent, Preventable, dispatcher, target_and_bubble,
};

/// Reconcile passes allowed per drain before the queue is abandoned.
const MAX_RECONCILE_PASSES: usize = 1024;

/// Where in a dispatch a component is being called.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EventCx {
    /// Propagation phase.
    pub phase: Phase,
    /// Element whose handler is running; `None` for document-level listeners.
    pub node: Option<NodeId>,
    /// Event target, if the event has one.
    pub target: Option<NodeId>,
}

impl EventCx {
    /// Whether the handler runs for the event's own target.
    pub fn at_target(&self) -> bool {
        self.phase == Phase::Target
    }
}

/// A mounted primitive as seen by the environment.
///
/// Handlers only update state and schedule the component; structural work
/// (mounting content, moving focus, arming layers) happens in
/// [`Component::reconcile`], which the environment runs after the dispatch
/// that caused it.
pub trait Component {
    /// Handle one dispatch step.
    fn handle(&self, env: &mut Env, event: &mut Event, cx: &EventCx) -> Outcome;

    /// Bring derived state (mounted content, listeners, focus) in line with
    /// the current value.
    fn reconcile(&self, env: &mut Env);

    /// Layout was committed.
    fn on_layout(&self, env: &mut Env, damage: &Damage) {
        let _ = (env, damage);
    }
}

type Shared = Rc<dyn Component>;

/// Host environment driving every mounted primitive.
///
/// The host forwards native input through the event methods ([`Env::key`],
/// [`Env::pointer_down`], and friends), advances the clock with
/// [`Env::advance_to`], and applies layout with [`Env::commit_layout`].
/// Every event method returns only after all reconciliation it caused has
/// run.
pub struct Env {
    doc: Document,
    layers: LayerStack,
    listeners: ListenerRegistry<EventKind, Shared>,
    layout: ListenerRegistry<(), Weak<dyn Component>>,
    handlers: HashMap<NodeId, SmallVec<[Shared; 2]>>,
    queue: Vec<Weak<dyn Component>>,
    pending_focus: Option<NodeId>,
    draining: bool,
    now: u64,
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("doc", &self.doc)
            .field("layers", &self.layers)
            .field("listeners", &self.listeners.len())
            .field("handlers", &self.handlers.len())
            .field("queued", &self.queue.len())
            .field("pending_focus", &self.pending_focus)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::with_document(Document::new())
    }
}

impl Env {
    /// An environment over a fresh document.
    pub fn new() -> Self {
        Self::default()
    }

    /// An environment over an existing document.
    pub fn with_document(doc: Document) -> Self {
        Self {
            doc,
            layers: LayerStack::new(),
            listeners: ListenerRegistry::new(),
            layout: ListenerRegistry::new(),
            handlers: HashMap::new(),
            queue: Vec::new(),
            pending_focus: None,
            draining: false,
            now: 0,
        }
    }

    /// The document.
    pub fn doc(&self) -> &Document {
        &self.doc
    }

    /// The document, for host-side layout and structure edits.
    ///
    /// Remove elements with [`Env::remove`] rather than through the document
    /// so the primitives that own them can tear down.
    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Armed dismissal layers.
    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// Number of document-level listeners of `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.count(kind)
    }

    /// Number of document-level listeners of any kind.
    pub fn total_listeners(&self) -> usize {
        self.listeners.len()
    }

    /// Number of components waiting for layout commits.
    pub fn layout_watchers(&self) -> usize {
        self.layout.len()
    }

    /// Current time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Deliver a key press to the focused element.
    ///
    /// Enter or Space on a focused button whose default was not prevented
    /// activates it. Returns the event with the flags set by handlers.
    pub fn key(&mut self, event: KeyEvent) -> KeyEvent {
        let target = self.doc.focused();
        let mut ev = Event::Key(event);
        self.dispatch(&mut ev, target);
        let Event::Key(event) = ev else {
            unreachable!("handlers cannot change the event variant")
        };
        if !event.is_default_prevented()
            && matches!(event.key, Key::Enter | Key::Space)
            && let Some(t) = target
            && self.doc.element(t).is_some_and(|e| e.kind == ElementKind::Button)
        {
            self.click(t);
        }
        event
    }

    /// Deliver a pointer press on `target` (`None` when nothing was hit).
    ///
    /// Unless a handler prevented the default, an interactive target then
    /// takes focus.
    pub fn pointer_down(&mut self, target: Option<NodeId>, position: Point) -> PointerEvent {
        let mut ev = Event::PointerDown(PointerEvent::new(position));
        self.dispatch(&mut ev, target);
        let Event::PointerDown(event) = ev else {
            unreachable!("handlers cannot change the event variant")
        };
        if !event.is_default_prevented()
            && let Some(t) = target
            && self.doc.is_interactive(t)
        {
            self.focus(t);
        }
        event
    }

    /// Deliver a pointer press at `position`, hit testing for the target.
    pub fn pointer_down_at(&mut self, position: Point) -> PointerEvent {
        let target = self.doc.hit_test_point(position);
        self.pointer_down(target, position)
    }

    /// Activate `target` (pointer click, or keyboard activation of a button).
    pub fn click(&mut self, target: NodeId) {
        if self.doc.element(target).is_some_and(|e| e.is_disabled()) {
            tracing::trace!(?target, "click on disabled element ignored");
            return;
        }
        self.dispatch(&mut Event::Click, Some(target));
    }

    /// Pointer entered `node`.
    pub fn pointer_enter(&mut self, node: NodeId) {
        self.dispatch(&mut Event::PointerEnter, Some(node));
    }

    /// Pointer left `node`.
    pub fn pointer_leave(&mut self, node: NodeId) {
        self.dispatch(&mut Event::PointerLeave, Some(node));
    }

    /// Move focus to `node`, delivering blur and focus events.
    ///
    /// Returns whether `node` holds focus afterwards.
    pub fn focus(&mut self, node: NodeId) -> bool {
        let previous = self.doc.focused();
        if previous == Some(node) {
            return true;
        }
        if !self.doc.focus(node) {
            return false;
        }
        if let Some(p) = previous {
            self.dispatch(&mut Event::Blur, Some(p));
        }
        self.dispatch(&mut Event::Focus, Some(node));
        self.doc.focused() == Some(node)
    }

    /// Drop focus to the document, delivering a blur event.
    pub fn blur(&mut self) {
        if let Some(p) = self.doc.focused() {
            self.doc.blur();
            self.dispatch(&mut Event::Blur, Some(p));
        }
    }

    /// Text of `node` changed to `text`.
    pub fn input(&mut self, node: NodeId, text: &str) {
        self.dispatch(&mut Event::Input(String::from(text)), Some(node));
    }

    /// Advance the clock and let timers fire.
    pub fn advance_to(&mut self, now: u64) {
        if now < self.now {
            tracing::warn!(now, current = self.now, "clock moved backwards; ignored");
            return;
        }
        self.now = now;
        self.dispatch(&mut Event::Tick(now), None);
    }

    /// Apply pending layout and let positioned content follow it.
    ///
    /// Positions written while handling the commit are committed in the same
    /// call, so the returned damage reflects the final layout.
    pub fn commit_layout(&mut self) -> Damage {
        let mut total = Damage::default();
        for _ in 0..3 {
            let damage = self.doc.commit();
            if damage.is_empty() {
                break;
            }
            for (_, watcher) in self.layout.snapshot(()) {
                if let Some(c) = watcher.upgrade() {
                    c.on_layout(self, &damage);
                }
            }
            total.extend(damage);
        }
        total.epoch = self.doc.epoch();
        self.drain();
        total
    }

    /// Remove `node` and its subtree; primitives owning removed elements tear down.
    pub fn remove(&mut self, node: NodeId) {
        self.remove_subtree(node);
        self.drain();
    }

    /// Run pending reconciliation now.
    pub fn flush(&mut self) {
        self.drain();
    }

    pub(crate) fn remove_subtree(&mut self, node: NodeId) {
        for gone in self.doc.remove(node) {
            if let Some(owners) = self.handlers.remove(&gone) {
                for owner in owners {
                    self.schedule(Rc::downgrade(&owner));
                }
            }
        }
    }

    pub(crate) fn listen(&mut self, kind: EventKind, component: Shared) -> ListenerId {
        self.listeners.arm(kind, component)
    }

    pub(crate) fn unlisten(&mut self, id: ListenerId) {
        self.listeners.disarm(id);
    }

    pub(crate) fn watch_layout(&mut self, component: Weak<dyn Component>) -> ListenerId {
        self.layout.arm((), component)
    }

    pub(crate) fn unwatch_layout(&mut self, id: ListenerId) {
        self.layout.disarm(id);
    }

    /// Route events targeting `node` (or bubbling through it) to `component`.
    pub(crate) fn attach(&mut self, node: NodeId, component: Shared) {
        self.handlers.entry(node).or_default().push(component);
    }

    pub(crate) fn detach(&mut self, node: NodeId, component: &Shared) {
        if let Some(owners) = self.handlers.get_mut(&node) {
            owners.retain(|o| !Rc::ptr_eq(o, component));
            if owners.is_empty() {
                self.handlers.remove(&node);
            }
        }
    }

    pub(crate) fn layers_mut(&mut self) -> &mut LayerStack {
        &mut self.layers
    }

    /// Queue `component` for reconciliation after the current dispatch.
    pub(crate) fn schedule(&mut self, component: Weak<dyn Component>) {
        if !self.queue.iter().any(|q| Weak::ptr_eq(q, &component)) {
            self.queue.push(component);
        }
    }

    /// Move focus to `node` through [`Env::focus`] once the reconcile queue
    /// settles. A later request replaces an earlier one.
    pub(crate) fn request_focus(&mut self, node: NodeId) {
        self.pending_focus = Some(node);
    }

    fn dispatch(&mut self, event: &mut Event, target: Option<NodeId>) {
        let kind = event.kind();
        let mut seq: Vec<Dispatch<Step>> = self
            .listeners
            .snapshot(kind)
            .into_iter()
            .map(|(id, component)| {
                Dispatch::capture(Step {
                    listener: Some(id),
                    node: None,
                    component,
                })
            })
            .collect();
        if let Some(t) = target.filter(|&t| self.doc.is_alive(t)) {
            let mut path = Vec::from([t]);
            while let Some(parent) = path.last().and_then(|&n| self.doc.parent_of(n)) {
                path.push(parent);
            }
            for d in target_and_bubble(&path) {
                let Some(owners) = self.handlers.get(&d.node) else {
                    continue;
                };
                seq.extend(owners.iter().map(|component| Dispatch {
                    phase: d.phase,
                    node: Step {
                        listener: None,
                        node: Some(d.node),
                        component: component.clone(),
                    },
                }));
            }
        }
        let stopped = dispatcher::run(&seq, event, |d, ev| {
            if let Some(id) = d.node.listener
                && !self.listeners.is_armed(id)
            {
                return Outcome::Continue;
            }
            let cx = EventCx {
                phase: d.phase,
                node: d.node.node,
                target,
            };
            let outcome = d.node.component.handle(self, ev, &cx);
            if ev.is_propagation_stopped() {
                Outcome::Stop
            } else {
                outcome
            }
        });
        if let Some(at) = stopped {
            tracing::trace!(?kind, phase = ?at.phase, node = ?at.node.node, "propagation stopped");
        }
        self.drain();
    }

    fn drain(&mut self) {
        if self.draining {
            return;
        }
        self.draining = true;
        let mut passes = 0;
        loop {
            passes += 1;
            if passes > MAX_RECONCILE_PASSES {
                tracing::warn!(queued = self.queue.len(), "reconcile did not settle; dropping queue");
                self.queue.clear();
                self.pending_focus = None;
                break;
            }
            if !self.queue.is_empty() {
                let next = self.queue.remove(0);
                if let Some(component) = next.upgrade() {
                    component.reconcile(self);
                }
            } else if let Some(node) = self.pending_focus.take() {
                // Blur and focus handlers only schedule; the loop picks that up.
                if !self.focus(node) {
                    tracing::trace!(?node, "requested focus not taken");
                }
            } else {
                break;
            }
        }
        self.draining = false;
    }
}

struct Step {
    listener: Option<ListenerId>,
    node: Option<NodeId>,
    component: Shared,
}
