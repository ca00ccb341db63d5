// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Focus: focus management for overlay primitives.
//!
//! This crate covers two related jobs:
//!
//! - **Focus manager** ([`FocusManager`]): when floating content opens, remember
//!   what was focused and move focus inside; while open, keep Tab and Shift+Tab
//!   cycling among the content's interactive elements; when it closes, put focus
//!   back on the trigger (or the remembered element).
//! - **Roving navigation** ([`roving::RovingController`]): map arrow, Home/End,
//!   and typeahead keys to a move over an ordered collection of items, for menus,
//!   tab lists, accordion triggers, and listbox options.
//!
//! Both work over a live view of the document: collections and interactive
//! descendants are recomputed from current content on every key press, so they
//! always match what is rendered.
//!
//! The linear stepping rule they share is exposed as [`step`]:
//!
//! ```rust
//! use understory_focus::{Navigation, WrapMode, step};
//!
//! let enabled = [true, false, true, true];
//! let is_enabled = |i: usize| enabled[i];
//!
//! // Disabled entries are skipped.
//! assert_eq!(step(4, Some(0), Navigation::Next, WrapMode::Wrap, is_enabled), Some(2));
//! // Wrapping from the end returns to the first enabled entry…
//! assert_eq!(step(4, Some(3), Navigation::Next, WrapMode::Wrap, is_enabled), Some(0));
//! // …while clamping stops at the edge.
//! assert_eq!(step(4, Some(3), Navigation::Next, WrapMode::Never, is_enabled), None);
//! // With nothing selected, Next starts at the beginning and Prev at the end.
//! assert_eq!(step(4, None, Navigation::Prev, WrapMode::Wrap, is_enabled), Some(3));
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for dependencies.
//! - `libm`: enables `no_std` + `alloc` builds that rely on `libm` for floating-point math.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod manager;
pub mod roving;
pub mod typeahead;

pub use manager::FocusManager;

/// Direction of a linear focus move.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Navigation {
    /// Move to the next candidate (Tab, or the forward arrow).
    Next,
    /// Move to the previous candidate (Shift+Tab, or the backward arrow).
    Prev,
    /// Jump to the first candidate (Home).
    First,
    /// Jump to the last candidate (End).
    Last,
}

/// What happens at the ends of a sequence.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// Stop at the edges; moving past an edge yields no candidate.
    Never,
    /// Wrap around: past the last comes the first, and vice versa.
    #[default]
    Wrap,
}

/// Pick the next index in a sequence of `len` entries.
///
/// Entries for which `enabled` returns false are skipped. `current` is the
/// index focus moves from; when `None` (or out of range), [`Navigation::Next`]
/// starts at the first enabled entry and [`Navigation::Prev`] at the last.
/// Returns `None` when no enabled entry qualifies.
pub fn step(
    len: usize,
    current: Option<usize>,
    nav: Navigation,
    wrap: WrapMode,
    enabled: impl Fn(usize) -> bool,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = current.filter(|&c| c < len);
    match (nav, current) {
        (Navigation::First, _) | (Navigation::Next, None) => (0..len).find(|&i| enabled(i)),
        (Navigation::Last, _) | (Navigation::Prev, None) => (0..len).rev().find(|&i| enabled(i)),
        (Navigation::Next, Some(c)) => {
            let ahead = (c + 1..len).find(|&i| enabled(i));
            match wrap {
                WrapMode::Never => ahead,
                WrapMode::Wrap => ahead.or_else(|| (0..=c).find(|&i| enabled(i))),
            }
        }
        (Navigation::Prev, Some(c)) => {
            let behind = (0..c).rev().find(|&i| enabled(i));
            match wrap {
                WrapMode::Never => behind,
                WrapMode::Wrap => behind.or_else(|| (c..len).rev().find(|&i| enabled(i))),
            }
        }
    }
}
