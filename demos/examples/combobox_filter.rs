// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typing into a combobox and committing a filtered option.
//!
//! Run:
//! - `cargo run -p understory_demos --example combobox_filter`

use std::cell::RefCell;
use std::rc::Rc;

use tracing_subscriber::EnvFilter;
use understory_events::{Key, KeyEvent};
use understory_overlay::{
    Combobox, ComboboxCaret, ComboboxClear, ComboboxInput, ComboboxOption, ComboboxProps, Env,
    ItemId, Scope, UsageError,
};

fn main() -> Result<(), UsageError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut env = Env::new();
    let body = env.doc().body();
    let committed: Rc<RefCell<Vec<Option<ItemId>>>> = Rc::default();
    let sink = committed.clone();
    let options = ["Alpha", "Bravo", "Charlie", "Delta", "Echo"]
        .into_iter()
        .map(|label| ComboboxOption::new(label.to_lowercase(), label))
        .chain([ComboboxOption::new("chi", "Chi").disabled(true)])
        .collect();
    let combobox = Combobox::new(
        &mut env,
        body,
        ComboboxProps {
            options,
            on_change: Some(Box::new(move |v: &Option<ItemId>| {
                sink.borrow_mut().push(v.clone());
            })),
            ..ComboboxProps::default()
        },
    );
    let scope = combobox.provide(&Scope::new());
    let input = ComboboxInput::within(&scope)?.mount(&mut env);
    ComboboxClear::within(&scope)?.mount(&mut env);
    ComboboxCaret::within(&scope)?.mount(&mut env);

    env.focus(input);
    for query in ["c", "ch", "chx"] {
        env.input(input, query);
        println!(
            "{query:>4}: {:?} (results: {})",
            combobox.filtered_labels(),
            combobox.has_results()
        );
    }

    env.input(input, "ch");
    // Chi is disabled, so the highlight stays on Charlie.
    env.key(KeyEvent::new(Key::ArrowDown));
    println!("active: {:?}", combobox.active_option());
    env.key(KeyEvent::new(Key::Enter));

    println!("value: {:?}", combobox.value());
    println!("query: {:?}", combobox.query());
    println!("changes: {:?}", committed.borrow());

    combobox.clear(&mut env);
    println!("after clear: {:?}", combobox.value());
    Ok(())
}
