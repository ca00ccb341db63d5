// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Disclosure: a value container that works the same way whether
//! the integrator owns the state or the primitive does.
//!
//! A [`Controllable`] is created once per primitive instance from its props:
//!
//! - **Controlled** (`value: Some(v)`): the owner is the authority.
//!   [`Controllable::request_change`] only forwards the request to the change
//!   callback; the held value changes when the owner passes a new value with
//!   [`Controllable::sync_props`].
//! - **Uncontrolled** (`value: None`): the container is the authority, seeded
//!   once from the default. Requests are applied and then reported to the
//!   callback. Later props never reseed it.
//!
//! The callback fires in both modes, so owners can observe transitions
//! regardless of who holds authority. Requests equal to the current value are
//! dropped without notification.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use understory_disclosure::Controllable;
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let sink = log.clone();
//!
//! // Uncontrolled: the container applies the change.
//! let mut open = Controllable::from_props(None, false, Some(Box::new(move |v: &bool| sink.borrow_mut().push(*v))));
//! open.request_change(true);
//! assert!(*open.get());
//!
//! // Controlled: the container asks, the owner decides.
//! let mut owned = Controllable::from_props(Some(false), false, None);
//! owned.request_change(true);
//! assert!(!*owned.get());
//! owned.sync_props(Some(true));
//! assert!(*owned.get());
//!
//! assert_eq!(*log.borrow(), [true]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::boxed::Box;
use core::fmt;

/// Change notification callback.
pub type OnChange<V> = Box<dyn FnMut(&V)>;

/// Who holds the authoritative value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Authority {
    /// The owner supplies the value.
    Controlled,
    /// The container holds the value.
    Uncontrolled,
}

/// A controlled-or-uncontrolled value with change notification.
pub struct Controllable<V> {
    authority: Authority,
    value: V,
    on_change: Option<OnChange<V>>,
    pristine: bool,
}

impl<V: fmt::Debug> fmt::Debug for Controllable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controllable")
            .field("authority", &self.authority)
            .field("value", &self.value)
            .field("pristine", &self.pristine)
            .finish_non_exhaustive()
    }
}

impl<V: Clone + PartialEq + fmt::Debug> Controllable<V> {
    /// Pick the mode from props: `value` present means controlled.
    pub fn from_props(value: Option<V>, default: V, on_change: Option<OnChange<V>>) -> Self {
        match value {
            Some(v) => Self::controlled(v, on_change),
            None => Self::uncontrolled(default, on_change),
        }
    }

    /// A controlled container holding the owner's current value.
    pub fn controlled(value: V, on_change: Option<OnChange<V>>) -> Self {
        Self {
            authority: Authority::Controlled,
            value,
            on_change,
            pristine: true,
        }
    }

    /// An uncontrolled container seeded with `initial`.
    pub fn uncontrolled(initial: V, on_change: Option<OnChange<V>>) -> Self {
        Self {
            authority: Authority::Uncontrolled,
            value: initial,
            on_change,
            pristine: true,
        }
    }

    /// The current value.
    pub fn get(&self) -> &V {
        &self.value
    }

    /// Who holds the authoritative value.
    pub fn authority(&self) -> Authority {
        self.authority
    }

    /// Whether the owner holds the authoritative value.
    pub fn is_controlled(&self) -> bool {
        self.authority == Authority::Controlled
    }

    /// Whether no change has been requested since creation.
    pub fn is_pristine(&self) -> bool {
        self.pristine
    }

    /// Request a transition to `next`.
    ///
    /// Uncontrolled containers apply the value first. The callback fires in
    /// both modes. Returns whether the request differed from the current value.
    pub fn request_change(&mut self, next: V) -> bool {
        if next == self.value {
            return false;
        }
        self.pristine = false;
        tracing::trace!(authority = ?self.authority, from = ?self.value, to = ?next, "change requested");
        if self.authority == Authority::Uncontrolled {
            self.value = next;
            if let Some(cb) = self.on_change.as_mut() {
                cb(&self.value);
            }
        } else if let Some(cb) = self.on_change.as_mut() {
            cb(&next);
        }
        true
    }

    /// Adopt new props from the owner.
    ///
    /// Controlled containers take the new value; uncontrolled ones ignore it.
    /// The mode chosen at creation never changes.
    pub fn sync_props(&mut self, value: Option<V>) {
        match (self.authority, value) {
            (Authority::Controlled, Some(v)) => self.value = v,
            (Authority::Controlled, None) => {
                tracing::warn!("controlled value removed; keeping the last supplied value");
            }
            (Authority::Uncontrolled, Some(_)) => {
                tracing::warn!("uncontrolled container cannot become controlled; value ignored");
            }
            (Authority::Uncontrolled, None) => {}
        }
    }

    /// Reseed an uncontrolled container that has not changed yet.
    ///
    /// Returns whether the value was applied. Controlled and already-changed
    /// containers are left alone. No callback fires.
    pub fn reseed(&mut self, value: V) -> bool {
        if self.authority != Authority::Uncontrolled || !self.pristine {
            return false;
        }
        self.value = value;
        true
    }

    /// Replace the change callback.
    pub fn set_on_change(&mut self, on_change: Option<OnChange<V>>) {
        self.on_change = on_change;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    fn recorder<V: Clone + 'static>() -> (Rc<RefCell<Vec<V>>>, OnChange<V>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        (log, Box::new(move |v: &V| sink.borrow_mut().push(v.clone())))
    }

    #[test]
    fn controlled_forwards_without_applying() {
        let (log, cb) = recorder();
        let mut c = Controllable::from_props(Some(false), true, Some(cb));
        assert!(c.is_controlled());
        assert!(c.request_change(true));
        assert!(!*c.get());
        assert_eq!(*log.borrow(), [true]);
    }

    #[test]
    fn uncontrolled_applies_then_notifies() {
        let (log, cb) = recorder();
        let mut c = Controllable::from_props(None, 1_u8, Some(cb));
        c.request_change(2);
        c.request_change(2);
        assert_eq!(*c.get(), 2);
        assert_eq!(*log.borrow(), [2]);
    }

    #[test]
    fn uncontrolled_is_seeded_once() {
        let mut c: Controllable<bool> = Controllable::from_props(None, true, None);
        c.sync_props(None);
        c.sync_props(Some(false));
        assert!(*c.get());
        assert!(!c.is_controlled());
    }

    #[test]
    fn reseed_only_while_pristine_and_uncontrolled() {
        let mut c: Controllable<u8> = Controllable::uncontrolled(0, None);
        assert!(c.reseed(5));
        c.request_change(6);
        assert!(!c.reseed(7));
        assert_eq!(*c.get(), 6);

        let mut owned: Controllable<u8> = Controllable::controlled(0, None);
        assert!(!owned.reseed(5));
        assert_eq!(*owned.get(), 0);
    }

    #[test]
    fn controlled_keeps_last_value_when_owner_drops_it() {
        let mut c: Controllable<u8> = Controllable::controlled(3, None);
        c.sync_props(None);
        assert_eq!(*c.get(), 3);
        assert_eq!(c.authority(), Authority::Controlled);
    }
}
