// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Document: a headless element tree for overlay primitives.
//!
//! Overlay widgets (popovers, dialogs, menus, listboxes, tooltips) need a small
//! set of things from the host document, and nothing more:
//!
//! - A hierarchy of elements with identity, so "is the click inside the panel?"
//!   can be answered with [`Document::contains`].
//! - A single focused element, and a live query for the interactive elements of
//!   a subtree ([`Document::interactive_descendants`]) to trap and restore focus.
//! - A detached top-level layer ([`Document::layer`]) that floating surfaces are
//!   mounted into, so their stacking does not depend on where their trigger lives.
//! - Layout data and a viewport, updated in batches and committed with
//!   [`Document::commit`], which reports [`Damage`] and the layout observers
//!   ([`Document::observe`]) that must react.
//! - Accessibility attributes ([`Aria`]) that widgets keep in sync with their state.
//!
//! ## Not a layout engine
//!
//! This crate does not measure or arrange anything. The host computes element
//! bounds with whatever layout system it uses and writes them with
//! [`Document::set_bounds`]; widgets read them back after a commit.
//!
//! ## API overview
//!
//! - [`Document`]: element storage, focus, layer, viewport, observers, scroll locks.
//! - [`Element`]: per-element data (kind, bounds, flags, tab index, label, [`Aria`]).
//! - [`ElementFlags`]: visibility, disabled, aria-hidden, autofocus, hidden.
//! - [`NodeId`]: generational handle of an element.
//! - [`NodeRef`] / [`RefTarget`] / [`merge_refs`]: shared element references.
//!
//! ```rust
//! use understory_document::{Document, Element, ElementFlags};
//!
//! let mut doc = Document::new();
//! let panel = doc.mount_in_layer(Element::generic());
//! let first = doc.insert(Some(panel), Element::button("First"));
//! let off = doc.insert(Some(panel), Element::button("Off").with_flags(ElementFlags::DISABLED));
//! let last = doc.insert(Some(panel), Element::button("Last"));
//!
//! assert_eq!(doc.interactive_descendants(panel), vec![first, last]);
//! assert!(!doc.focus(off));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod damage;
mod document;
mod refs;
mod types;

pub use damage::Damage;
pub use document::{Descendants, Document, ObserverId, ScrollLockId};
pub use refs::{NodeRef, RefTarget, merge_refs};
pub use types::{Aria, Element, ElementFlags, ElementKind, NodeId, Orientation, Role};
