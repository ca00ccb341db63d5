// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A menu opened from a trigger near the bottom edge of the viewport.
//!
//! This example shows:
//! - opening a menu from the keyboard and walking its items,
//! - the content flipping above the trigger when there is no room below,
//! - selection closing the menu and returning focus to the trigger.
//!
//! Run:
//! - `cargo run -p understory_demos --example menu_flip`
//! - `RUST_LOG=understory_overlay=debug cargo run -p understory_demos --example menu_flip`

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Rect, Size};
use tracing_subscriber::EnvFilter;
use understory_document::Element;
use understory_events::{Key, KeyEvent};
use understory_overlay::{Env, Menu, MenuContent, MenuItem, MenuProps, MenuTrigger, Scope, UsageError};

fn main() -> Result<(), UsageError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut env = Env::new();
    let body = env.doc().body();
    let menu = Menu::new(MenuProps::default());
    let scope = menu.provide(&Scope::new());

    // 1024x768 viewport; the trigger sits 20px above the bottom edge.
    let trigger = MenuTrigger::within(&scope)?.mount(
        &mut env,
        body,
        Element::button("Actions").with_bounds(Rect::new(40.0, 718.0, 140.0, 748.0)),
    );

    let chosen = Rc::new(RefCell::new(None));
    let items = scope.clone();
    let sink = chosen.clone();
    MenuContent::within(&scope)?
        .size(Size::new(160.0, 120.0))
        .render(&mut env, move |env, root| {
            for label in ["Rename", "Duplicate", "Delete"] {
                let Ok(item) = MenuItem::within(&items) else {
                    return;
                };
                let sink = sink.clone();
                item.on_select(move || *sink.borrow_mut() = Some(label))
                    .mount(env, root, Element::button(label));
            }
        });

    env.focus(trigger);
    env.key(KeyEvent::new(Key::ArrowDown));
    env.commit_layout();
    println!("open: {}", menu.is_open());
    if let Some(position) = menu.position() {
        println!(
            "content at ({}, {}) placed {}",
            position.x, position.y, position.placement
        );
    }

    env.key(KeyEvent::new(Key::ArrowDown));
    if let Some(active) = menu.active_item() {
        println!("active item: {:?}", env.doc().label(active));
    }
    env.key(KeyEvent::new(Key::Enter));

    println!("selected: {:?}", chosen.borrow());
    println!("open after select: {}", menu.is_open());
    println!("focus back on trigger: {}", env.doc().focused() == Some(trigger));
    Ok(())
}
