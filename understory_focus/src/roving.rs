// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Roving navigation: one focus stop moving across a list of sibling items.
//!
//! [`RovingController::on_key`] maps a key to a move over the collection the
//! caller queried for this key press. Forward and backward keys depend on the
//! orientation (Right/Left when horizontal, Down/Up when vertical); Home and
//! End jump to the ends; movement wraps by default. Keys outside that set
//! leave the index unchanged.
//!
//! ```rust
//! use understory_document::Orientation;
//! use understory_events::Key;
//! use understory_focus::roving::{Activation, RovingController};
//!
//! let tabs = ["Account", "Billing", "Security"];
//! let mut roving = RovingController::new(Orientation::Horizontal, Activation::Automatic);
//!
//! let mv = roving.on_key(Key::ArrowRight, &tabs, Some(2), 0);
//! assert_eq!(mv.next_index, Some(0));
//! assert!(mv.activate);
//!
//! // Vertical keys mean nothing to a horizontal tab list.
//! let mv = roving.on_key(Key::ArrowDown, &tabs, Some(1), 0);
//! assert!(!mv.handled);
//! assert_eq!(mv.next_index, Some(1));
//! ```

use understory_document::Orientation;
use understory_events::Key;

use crate::typeahead::Typeahead;
use crate::{Navigation, WrapMode, step};

/// Whether moving to an item also activates it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Activation {
    /// Moving only moves focus; Enter/Space activates.
    #[default]
    Manual,
    /// Moving also activates the newly focused item.
    Automatic,
}

/// Result of a roving key press.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RovingMove {
    /// Index to focus next. Equal to the current index when nothing moved.
    pub next_index: Option<usize>,
    /// Whether the item at `next_index` should be activated.
    pub activate: bool,
    /// Whether the key was a navigation key (its default should be prevented).
    pub handled: bool,
}

impl RovingMove {
    const fn unchanged(current: Option<usize>) -> Self {
        Self {
            next_index: current,
            activate: false,
            handled: false,
        }
    }
}

/// Maps navigation keys to moves over an ordered collection.
#[derive(Clone, Debug)]
pub struct RovingController {
    /// Layout axis of the collection.
    pub orientation: Orientation,
    /// Whether moves activate.
    pub activation: Activation,
    /// Edge behavior.
    pub wrap: WrapMode,
    typeahead: Option<Typeahead>,
}

impl RovingController {
    /// A wrapping controller without typeahead.
    pub fn new(orientation: Orientation, activation: Activation) -> Self {
        Self {
            orientation,
            activation,
            wrap: WrapMode::Wrap,
            typeahead: None,
        }
    }

    /// Enable typeahead (menu-style content).
    pub fn with_typeahead(mut self) -> Self {
        self.typeahead = Some(Typeahead::new());
        self
    }

    /// Whether typeahead is enabled.
    pub fn has_typeahead(&self) -> bool {
        self.typeahead.is_some()
    }

    /// Map a key press to a move.
    ///
    /// `labels` is the collection as currently rendered (enabled items only),
    /// `current` the index of the focused item within it, and `now` the time
    /// in milliseconds (for the typeahead window).
    pub fn on_key<S: AsRef<str>>(
        &mut self,
        key: Key,
        labels: &[S],
        current: Option<usize>,
        now: u64,
    ) -> RovingMove {
        let (forward, backward) = match self.orientation {
            Orientation::Horizontal => (Key::ArrowRight, Key::ArrowLeft),
            Orientation::Vertical => (Key::ArrowDown, Key::ArrowUp),
        };
        let nav = match key {
            k if k == forward => Navigation::Next,
            k if k == backward => Navigation::Prev,
            Key::Home => Navigation::First,
            Key::End => Navigation::Last,
            Key::Character(c) if Typeahead::accepts(c) => {
                let Some(ta) = self.typeahead.as_mut() else {
                    return RovingMove::unchanged(current);
                };
                let found = ta.type_char(c, now, labels, current);
                tracing::trace!(buffer = ta.buffer(), ?found, "typeahead");
                return self.moved(found.or(current));
            }
            _ => return RovingMove::unchanged(current),
        };
        let next = step(labels.len(), current, nav, self.wrap, |_| true);
        tracing::trace!(?nav, ?current, ?next, "roving step");
        self.moved(next.or(current))
    }

    /// Clear typeahead state (for example when the content closes).
    pub fn reset(&mut self) {
        if let Some(ta) = self.typeahead.as_mut() {
            ta.reset();
        }
    }

    fn moved(&self, next_index: Option<usize>) -> RovingMove {
        RovingMove {
            next_index,
            activate: self.activation == Activation::Automatic && next_index.is_some(),
            handled: true,
        }
    }
}
