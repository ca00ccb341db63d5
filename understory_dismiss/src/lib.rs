// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Dismiss: outside-interaction and Escape dismissal for overlays.
//!
//! Every open overlay arms one [`Layer`] in a shared [`LayerStack`]. The
//! stack is process-wide: nested overlays (a menu inside a dialog) each arm
//! and disarm their own layer, in any order, without knowing about each
//! other.
//!
//! A [`DismissalCoordinator`] answers two questions for its layer:
//!
//! - **Pointer-down**: does a press on `target` dismiss? It does when the
//!   target is outside the floating root, outside the reference (trigger),
//!   and outside every layer armed after this one. Presses on disabled
//!   elements never dismiss. A layer with a backdrop also dismisses when the
//!   press lands on the backdrop itself.
//! - **Escape**: only the topmost layer reacts, and it stops propagation so
//!   enclosing overlays never see the key. Nested overlays close innermost
//!   first.
//!
//! ```rust
//! use understory_document::{Document, Element};
//! use understory_dismiss::{DismissReason, DismissalCoordinator, LayerStack};
//! use understory_events::{Key, KeyEvent, Propagating};
//!
//! let mut doc = Document::new();
//! let mut stack = LayerStack::new();
//!
//! let outer_trigger = doc.insert(Some(doc.body()), Element::button("Outer"));
//! let outer = doc.mount_in_layer(Element::generic());
//! let inner_trigger = doc.insert(Some(outer), Element::button("Inner"));
//! let inner = doc.mount_in_layer(Element::generic());
//! let item = doc.insert(Some(inner), Element::button("Item"));
//!
//! let mut outer_dismiss = DismissalCoordinator::new();
//! outer_dismiss.arm(&mut stack, outer, Some(outer_trigger), None);
//! let mut inner_dismiss = DismissalCoordinator::new();
//! inner_dismiss.arm(&mut stack, inner, Some(inner_trigger), None);
//!
//! // A press inside the inner overlay dismisses neither.
//! assert_eq!(outer_dismiss.on_pointer_down(&stack, &doc, Some(item)), None);
//! assert_eq!(inner_dismiss.on_pointer_down(&stack, &doc, Some(item)), None);
//!
//! // Escape reaches the inner overlay only.
//! let mut esc = KeyEvent::new(Key::Escape);
//! assert_eq!(outer_dismiss.on_key(&stack, &mut esc), None);
//! assert_eq!(inner_dismiss.on_key(&stack, &mut esc), Some(DismissReason::Escape));
//! assert!(esc.is_propagation_stopped());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod coordinator;
mod stack;

pub use coordinator::{DismissReason, DismissalCoordinator};
pub use stack::{Layer, LayerId, LayerStack};
