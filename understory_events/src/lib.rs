// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Events: deterministic event plumbing for overlay primitives.
//!
//! This crate holds the pieces of an event model that do not depend on any
//! particular document or widget:
//!
//! - [`Key`], [`Modifiers`], [`KeyEvent`], [`PointerEvent`], and [`Event`] payloads.
//!   Key and pointer events carry "default prevented" and "propagation stopped"
//!   flags that handlers set and later handlers observe.
//! - [`compose`]: run a host handler first, then the primitive's own handler
//!   unless the host prevented the default.
//! - [`Dispatch`], [`Phase`], [`Outcome`], and [`dispatcher::run`]: walk a
//!   capture → target → bubble sequence and honor stop outcomes.
//! - [`ListenerRegistry`]: document-level listeners keyed by [`EventKind`], in
//!   registration order, armed and disarmed by id.
//! - [`timer::TimerSlot`] and [`timer::HoverIntent`]: timestamp-driven timers.
//!
//! All state machines take the current time as an argument; nothing here
//! reads a clock or spawns work.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod dispatcher;
mod input;
mod listeners;
pub mod timer;
mod types;

pub use input::{
    Button, Event, EventKind, Handler, Key, KeyEvent, Modifiers, PointerEvent, Preventable,
    Propagating, compose,
};
pub use listeners::{ListenerId, ListenerRegistry};
pub use types::{Dispatch, Outcome, Phase, target_and_bubble};
