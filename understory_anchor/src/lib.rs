// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Anchor: floating element positioning for overlay primitives.
//!
//! Floating content (popover panels, menus, listboxes, tooltips) is placed
//! against a reference element using one of twelve [`Placement`]s, then
//! adjusted to stay inside the viewport:
//!
//! 1. **offset**: keep `offset_px` between reference and floating element.
//! 2. **flip**: if the preferred side overflows the padded viewport and the
//!    opposite side overflows less, use the opposite side.
//! 3. **shift**: clamp along the cross axis into the padded viewport.
//!
//! The math sits behind the [`ComputePosition`] trait; [`FloatingPositioner`]
//! is the default engine, and a host may swap in its own.
//!
//! [`PositionAdapter`] ties an engine to an [`AnchorPair`] in an
//! [`understory_document::Document`]. A one-shot [`PositionAdapter::anchor`]
//! computes from committed layout; [`PositionAdapter::sync`] starts continuous
//! tracking while the primitive is open, and [`PositionAdapter::on_layout`]
//! recomputes after every layout commit that moved either element or changed
//! the viewport. Closing, or unmounting either element, releases every
//! observer.
//!
//! ```
//! use kurbo::Rect;
//! use understory_anchor::{AnchorPair, Placement, PositionAdapter, PositionConfig};
//! use understory_document::{Document, Element};
//!
//! let mut doc = Document::new();
//! let trigger = doc.insert(
//!     Some(doc.body()),
//!     Element::button("Open").with_bounds(Rect::new(10.0, 10.0, 90.0, 34.0)),
//! );
//! let panel = doc.mount_in_layer(Element::generic().with_bounds(Rect::new(0.0, 0.0, 120.0, 60.0)));
//!
//! let pair = AnchorPair::default();
//! pair.reference.set(Some(trigger));
//! pair.floating.set(Some(panel));
//!
//! let mut adapter = PositionAdapter::new(pair, PositionConfig::with_placement(Placement::TOP));
//! adapter.sync(&mut doc, true);
//! doc.commit();
//!
//! // No room above: flipped below the trigger and shifted off the left edge.
//! assert_eq!(doc.bounds(panel), Some(Rect::new(8.0, 42.0, 128.0, 102.0)));
//!
//! adapter.sync(&mut doc, false);
//! assert_eq!(doc.observer_count(), 0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod adapter;
mod compute;
mod placement;

pub use adapter::{AnchorPair, PositionAdapter};
pub use compute::{ComputePosition, FloatingPositioner, Position, PositionConfig, Strategy};
pub use placement::{Alignment, ParsePlacementError, Placement, Side};
