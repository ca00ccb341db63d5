// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input payloads: keys, modifiers, key and pointer events, and handler composition.

use alloc::boxed::Box;
use alloc::string::String;
use kurbo::Point;

/// Logical key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Up arrow.
    ArrowUp,
    /// Down arrow.
    ArrowDown,
    /// Left arrow.
    ArrowLeft,
    /// Right arrow.
    ArrowRight,
    /// Home.
    Home,
    /// End.
    End,
    /// Enter / Return.
    Enter,
    /// Escape.
    Escape,
    /// Tab (use [`Modifiers::SHIFT`] for backward traversal).
    Tab,
    /// Space bar.
    Space,
    /// A printable character.
    Character(char),
    /// Any other key.
    Other,
}

impl Key {
    /// The printable character carried by this key, if any.
    pub fn as_char(self) -> Option<char> {
        match self {
            Self::Character(c) => Some(c),
            Self::Space => Some(' '),
            _ => None,
        }
    }
}

bitflags::bitflags! {
    /// Keyboard modifiers held during an event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT   = 0b0001;
        /// Control.
        const CONTROL = 0b0010;
        /// Alt / Option.
        const ALT     = 0b0100;
        /// Meta / Command / Super.
        const META    = 0b1000;
    }
}

/// Events whose default action can be cancelled.
pub trait Preventable {
    /// Cancel the default action.
    fn prevent_default(&mut self);
    /// Whether the default action was cancelled.
    fn is_default_prevented(&self) -> bool;
}

/// Events that propagate through a dispatch sequence.
pub trait Propagating {
    /// Stop delivery to later listeners.
    fn stop_propagation(&mut self);
    /// Whether a listener stopped delivery.
    fn is_propagation_stopped(&self) -> bool;
}

/// A key press.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// Key pressed.
    pub key: Key,
    /// Modifiers held.
    pub modifiers: Modifiers,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl KeyEvent {
    /// A key press with no modifiers.
    pub const fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Add modifiers.
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// A printable character key.
    pub const fn character(c: char) -> Self {
        Self::new(Key::Character(c))
    }

    /// Whether Shift is held.
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

impl Preventable for KeyEvent {
    fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

impl Propagating for KeyEvent {
    fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Mouse button identifier (0 is primary).
pub type Button = u8;

/// A pointer press.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerEvent {
    /// Position in document coordinates.
    pub position: Point,
    /// Button pressed.
    pub button: Button,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl PointerEvent {
    /// A primary-button press at `position`.
    pub const fn new(position: Point) -> Self {
        Self {
            position,
            button: 0,
            default_prevented: false,
            propagation_stopped: false,
        }
    }
}

impl Preventable for PointerEvent {
    fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

impl Propagating for PointerEvent {
    fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Kind of [`Event`], used as the listener registry key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`Event::Key`].
    Key,
    /// [`Event::PointerDown`].
    PointerDown,
    /// [`Event::Click`].
    Click,
    /// [`Event::PointerEnter`].
    PointerEnter,
    /// [`Event::PointerLeave`].
    PointerLeave,
    /// [`Event::Focus`].
    Focus,
    /// [`Event::Blur`].
    Blur,
    /// [`Event::Input`].
    Input,
    /// [`Event::Tick`].
    Tick,
}

/// An event delivered by the host.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Key press on the focused element.
    Key(KeyEvent),
    /// Pointer press.
    PointerDown(PointerEvent),
    /// Activation (pointer click, or Enter/Space on a button).
    Click,
    /// Pointer entered an element.
    PointerEnter,
    /// Pointer left an element.
    PointerLeave,
    /// Element received focus.
    Focus,
    /// Element lost focus.
    Blur,
    /// Text of an input changed.
    Input(String),
    /// The clock advanced to the given time in milliseconds.
    Tick(u64),
}

impl Event {
    /// Kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Key(_) => EventKind::Key,
            Self::PointerDown(_) => EventKind::PointerDown,
            Self::Click => EventKind::Click,
            Self::PointerEnter => EventKind::PointerEnter,
            Self::PointerLeave => EventKind::PointerLeave,
            Self::Focus => EventKind::Focus,
            Self::Blur => EventKind::Blur,
            Self::Input(_) => EventKind::Input,
            Self::Tick(_) => EventKind::Tick,
        }
    }

    /// Whether a listener stopped propagation of this event.
    pub fn is_propagation_stopped(&self) -> bool {
        match self {
            Self::Key(k) => k.is_propagation_stopped(),
            Self::PointerDown(p) => p.is_propagation_stopped(),
            _ => false,
        }
    }
}

/// A host-supplied event handler.
pub type Handler<E> = Box<dyn FnMut(&mut E)>;

/// Run a user handler, then ours unless the user prevented the default.
///
/// Returns whether our handler ran.
///
/// ```
/// use understory_events::{Handler, Key, KeyEvent, Preventable, compose};
///
/// let mut user: Handler<KeyEvent> = Box::new(|ev: &mut KeyEvent| {
///     if ev.key == Key::Escape {
///         ev.prevent_default();
///     }
/// });
///
/// let mut closed = false;
/// let mut ev = KeyEvent::new(Key::Escape);
/// assert!(!compose(&mut ev, Some(&mut user), |_| closed = true));
/// assert!(!closed);
///
/// let mut ev = KeyEvent::new(Key::Enter);
/// assert!(compose(&mut ev, Some(&mut user), |_| closed = true));
/// assert!(closed);
/// ```
pub fn compose<E: Preventable>(
    event: &mut E,
    user: Option<&mut Handler<E>>,
    ours: impl FnOnce(&mut E),
) -> bool {
    if let Some(user) = user {
        user(event);
    }
    if event.is_default_prevented() {
        return false;
    }
    ours(event);
    true
}
