// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Overlay: headless disclosure and overlay primitives.
//!
//! This crate assembles the engines of the sibling crates into seven
//! primitives:
//!
//! - [`Popover`]: non-modal floating content toggled by a trigger.
//! - [`Menu`]: a popover of actions with roving focus and typeahead.
//! - [`Dialog`]: modal content with a backdrop, focus trap, and scroll lock.
//! - [`Tooltip`]: a delayed description of its trigger.
//! - [`Accordion`]: collapsible sections, single or multiple.
//! - [`Tabs`]: one selected tab out of a list, with its panel.
//! - [`Combobox`]: a text input filtering a floating list of options.
//!
//! ## Composition
//!
//! Each primitive is a shared handle. Its parts (triggers, content, items)
//! find it through a [`Scope`]: the primitive provides itself, and each part
//! is built with `Part::within(&scope)`, which fails with
//! [`UsageError::MissingProvider`] when no such primitive is in scope.
//!
//! ## The environment
//!
//! The host owns an [`Env`]: the document, the listener registry, the
//! dismissal layer stack, and the clock. Native input is forwarded through
//! its event methods. Primitives react in two steps: event handlers update
//! state and schedule the primitive, and the environment reconciles every
//! scheduled primitive (mounting content, moving focus, arming layers)
//! before the event method returns.
//!
//! Values such as a popover's open state are controllable: with a value in
//! the props, the primitive only reports requested changes and the owner
//! passes the new value back with `sync_*`.
//!
//! ```rust
//! use understory_document::Element;
//! use understory_events::{Key, KeyEvent};
//! use understory_overlay::{
//!     Dialog, DialogClose, DialogContent, DialogProps, DialogTrigger, Env, Scope,
//! };
//!
//! let mut env = Env::new();
//! let body = env.doc().body();
//! let dialog = Dialog::new(DialogProps::default());
//! let scope = dialog.provide(&Scope::new());
//!
//! let trigger = DialogTrigger::within(&scope)?.mount(&mut env, body, Element::button("Delete"));
//! let parts = scope.clone();
//! DialogContent::within(&scope)?.render(&mut env, move |env, root| {
//!     if let Ok(close) = DialogClose::within(&parts) {
//!         close.mount(env, root, Element::button("Cancel"));
//!     }
//! });
//!
//! env.focus(trigger);
//! env.key(KeyEvent::new(Key::Enter));
//! assert!(dialog.is_open());
//! assert!(env.doc().is_scroll_locked());
//! assert_ne!(env.doc().focused(), Some(trigger));
//!
//! env.key(KeyEvent::new(Key::Escape));
//! assert!(!dialog.is_open());
//! assert_eq!(env.doc().focused(), Some(trigger));
//! assert!(dialog.is_released());
//! # Ok::<(), understory_overlay::UsageError>(())
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod accordion;
mod combobox;
mod dialog;
mod env;
mod menu;
mod popover;
mod scope;
mod surface;
mod tabs;
mod tooltip;

pub use accordion::{
    Accordion, AccordionItem, AccordionKind, AccordionPanel, AccordionProps, AccordionTrigger,
    AccordionValue,
};
pub use combobox::{
    Combobox, ComboboxCaret, ComboboxClear, ComboboxInput, ComboboxOption, ComboboxProps, Filter,
    default_filter,
};
pub use dialog::{Dialog, DialogClose, DialogContent, DialogProps, DialogTitle, DialogTrigger};
pub use env::{Component, Env, EventCx};
pub use menu::{Menu, MenuContent, MenuItem, MenuProps, MenuTrigger, OnSelect};
pub use popover::{Popover, PopoverClose, PopoverContent, PopoverProps, PopoverTrigger};
pub use scope::{ItemId, Provider, Scope, UsageError};
pub use surface::{Content, DismissHooks};
pub use tabs::{Tab, TabList, TabPanel, Tabs, TabsProps};
pub use tooltip::{Tooltip, TooltipContent, TooltipDelays, TooltipProps, TooltipTrigger};
