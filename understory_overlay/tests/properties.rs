// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Properties of the assembled primitives under random interaction sequences.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashSet;
use kurbo::Point;
use proptest::prelude::*;
use understory_document::{Element, NodeId};
use understory_events::{Key, KeyEvent};
use understory_overlay::{
    Accordion, AccordionItem, AccordionKind, AccordionPanel, AccordionProps, AccordionTrigger,
    AccordionValue, Combobox, ComboboxInput, ComboboxOption, ComboboxProps, Env, ItemId, Popover,
    PopoverContent, PopoverProps, PopoverTrigger, Scope, Tab, TabList, TabPanel, Tabs, TabsProps,
    Tooltip, TooltipContent, TooltipDelays, TooltipProps, TooltipTrigger, default_filter,
};

#[derive(Clone, Copy, Debug)]
enum Action {
    Trigger,
    Escape,
    Outside,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Trigger),
        Just(Action::Escape),
        Just(Action::Outside),
    ]
}

struct PopoverFixture {
    env: Env,
    popover: Popover,
    trigger: NodeId,
    outside: NodeId,
}

fn popover_fixture(props: PopoverProps) -> PopoverFixture {
    let mut env = Env::new();
    let body = env.doc().body();
    let popover = Popover::new(props);
    let scope = popover.provide(&Scope::new());
    let trigger = PopoverTrigger::within(&scope)
        .unwrap()
        .mount(&mut env, body, Element::button("Open"));
    let outside = env.doc_mut().insert(Some(body), Element::button("Elsewhere"));
    PopoverContent::within(&scope)
        .unwrap()
        .render(&mut env, |env, root| {
            env.doc_mut().insert(Some(root), Element::button("Inside"));
        });
    PopoverFixture {
        env,
        popover,
        trigger,
        outside,
    }
}

fn apply(f: &mut PopoverFixture, action: Action) {
    match action {
        Action::Trigger => f.env.click(f.trigger),
        Action::Escape => {
            f.env.key(KeyEvent::new(Key::Escape));
        }
        Action::Outside => {
            f.env.pointer_down(Some(f.outside), Point::ZERO);
        }
    }
}

proptest! {
    #[test]
    fn uncontrolled_popover_follows_its_inputs(actions in prop::collection::vec(action(), 0..24)) {
        let mut f = popover_fixture(PopoverProps::default());
        f.env.focus(f.trigger);
        let mut open = false;
        for a in actions {
            apply(&mut f, a);
            open = match a {
                Action::Trigger => !open,
                Action::Escape | Action::Outside => false,
            };
            prop_assert_eq!(f.popover.is_open(), open);
            if open {
                prop_assert_eq!(f.env.layers().len(), 1);
                prop_assert!(f.popover.content().is_some());
            } else {
                prop_assert!(f.env.layers().is_empty());
                prop_assert_eq!(f.env.total_listeners(), 0);
                prop_assert_eq!(f.env.layout_watchers(), 0);
                prop_assert!(f.popover.is_released());
            }
        }
    }

    #[test]
    fn controlled_popover_never_diverges(actions in prop::collection::vec(action(), 0..24)) {
        let requests = Rc::new(RefCell::new(Vec::new()));
        let sink = requests.clone();
        let mut f = popover_fixture(PopoverProps {
            open: Some(false),
            on_open_change: Some(Box::new(move |v: &bool| sink.borrow_mut().push(*v))),
            ..PopoverProps::default()
        });
        let mut presses = 0;
        for a in actions {
            apply(&mut f, a);
            if matches!(a, Action::Trigger) {
                presses += 1;
            }
            prop_assert!(!f.popover.is_open());
            prop_assert!(f.popover.content().is_none());
        }
        prop_assert_eq!(requests.borrow().len(), presses);
        prop_assert!(requests.borrow().iter().all(|v| *v));
    }

    #[test]
    fn multiple_accordion_is_a_fold_of_toggles(clicks in prop::collection::vec(0_usize..4, 0..20)) {
        let mut env = Env::new();
        let body = env.doc().body();
        let accordion = Accordion::new(AccordionProps {
            kind: AccordionKind::Multiple,
            ..AccordionProps::default()
        });
        let scope = accordion.provide(&Scope::new());
        let ids = ["a", "b", "c", "d"];
        let mut triggers = Vec::new();
        for id in ids {
            let item = AccordionItem::within(&scope, id).unwrap().register(&mut env).unwrap();
            triggers.push(AccordionTrigger::within(&item).unwrap().mount(&mut env, body, Element::button(id)));
            AccordionPanel::within(&item).unwrap().mount(&mut env, body, Element::generic());
        }
        let mut expected = HashSet::new();
        for i in clicks {
            env.click(triggers[i]);
            let id = ItemId::from(ids[i]);
            if !expected.remove(&id) {
                expected.insert(id);
            }
        }
        prop_assert_eq!(accordion.value(), AccordionValue::Multiple(expected));
    }

    #[test]
    fn single_accordion_keeps_the_last_clicked_item(clicks in prop::collection::vec(0_usize..3, 1..20)) {
        let mut env = Env::new();
        let body = env.doc().body();
        let accordion = Accordion::new(AccordionProps {
            collapsible: false,
            ..AccordionProps::default()
        });
        let scope = accordion.provide(&Scope::new());
        let ids = ["a", "b", "c"];
        let mut triggers = Vec::new();
        for id in ids {
            let item = AccordionItem::within(&scope, id).unwrap().register(&mut env).unwrap();
            triggers.push(AccordionTrigger::within(&item).unwrap().mount(&mut env, body, Element::button(id)));
            AccordionPanel::within(&item).unwrap().mount(&mut env, body, Element::generic());
        }
        let last = *clicks.last().unwrap();
        for i in clicks {
            env.click(triggers[i]);
        }
        prop_assert_eq!(accordion.value().len(), 1);
        prop_assert!(accordion.is_open(ids[last]));
    }

    #[test]
    fn tab_arrows_wrap_around(keys in prop::collection::vec(
        prop_oneof![Just(Key::ArrowRight), Just(Key::ArrowLeft), Just(Key::Home), Just(Key::End)],
        0..20,
    )) {
        let mut env = Env::new();
        let body = env.doc().body();
        let tabs = Tabs::new(TabsProps {
            default_value: Some("one".into()),
            ..TabsProps::default()
        });
        let scope = tabs.provide(&Scope::new());
        let list = TabList::within(&scope).unwrap().mount(&mut env, body, Element::generic());
        let ids = ["one", "two", "three"];
        for id in ids {
            Tab::within(&scope, id).unwrap().mount(&mut env, list, Element::button(id)).unwrap();
            TabPanel::within(&scope, id).unwrap().mount(&mut env, body, Element::generic());
        }
        env.focus(tabs.tab("one").unwrap());
        let mut index = 0_usize;
        for key in keys {
            env.key(KeyEvent::new(key));
            index = match key {
                Key::ArrowRight => (index + 1) % 3,
                Key::ArrowLeft => (index + 2) % 3,
                Key::Home => 0,
                _ => 2,
            };
            let value = tabs.value();
            prop_assert_eq!(value.as_ref().map(|v| v.as_str()), Some(ids[index]));
            prop_assert_eq!(env.doc().focused(), tabs.tab(ids[index]));
        }
    }

    #[test]
    fn leaving_before_the_delay_never_opens(open_ms in 1_u64..500, dwell in 0_u64..500) {
        let dwell = dwell % open_ms;
        let mut env = Env::new();
        let body = env.doc().body();
        let tooltip = Tooltip::new(TooltipProps {
            delays: TooltipDelays { open_ms, close_ms: 100 },
            ..TooltipProps::default()
        });
        let scope = tooltip.provide(&Scope::new());
        let trigger = TooltipTrigger::within(&scope)
            .unwrap()
            .mount(&mut env, body, Element::button("Info"));
        TooltipContent::within(&scope).unwrap().text("Details").mount(&mut env);

        env.pointer_enter(trigger);
        env.advance_to(dwell);
        env.pointer_leave(trigger);
        env.advance_to(dwell + 2 * open_ms + 1000);
        prop_assert!(!tooltip.is_open());
        prop_assert!(tooltip.content().is_none());
        prop_assert!(tooltip.is_released());
        prop_assert_eq!(env.total_listeners(), 0);
    }

    #[test]
    fn combobox_lists_exactly_the_matching_options(query in "[a-z]{0,3}") {
        let labels = ["Alpha", "Bravo", "Charlie", "Delta", "Echo"];
        let options: Vec<_> = labels
            .iter()
            .map(|l| ComboboxOption::new(l.to_lowercase(), *l))
            .collect();
        let expected: Vec<String> = options
            .iter()
            .filter(|o| default_filter(o, &query))
            .map(|o| o.label.clone())
            .collect();

        let mut env = Env::new();
        let body = env.doc().body();
        let combobox = Combobox::new(&mut env, body, ComboboxProps {
            options,
            ..ComboboxProps::default()
        });
        let scope = combobox.provide(&Scope::new());
        let input = ComboboxInput::within(&scope).unwrap().mount(&mut env);
        env.focus(input);
        env.input(input, &query);
        prop_assert!(combobox.is_open());
        prop_assert_eq!(combobox.filtered_labels(), expected.clone());
        prop_assert_eq!(combobox.has_results(), !expected.is_empty());
        prop_assert_eq!(combobox.status().is_some(), expected.is_empty());
    }
}

#[test]
fn combobox_query_narrows_to_charlie() {
    let mut env = Env::new();
    let body = env.doc().body();
    let options = ["Alpha", "Bravo", "Charlie"]
        .into_iter()
        .map(|l| ComboboxOption::new(l.to_lowercase(), l))
        .collect();
    let combobox = Combobox::new(
        &mut env,
        body,
        ComboboxProps {
            options,
            ..ComboboxProps::default()
        },
    );
    let scope = combobox.provide(&Scope::new());
    let input = ComboboxInput::within(&scope).unwrap().mount(&mut env);
    env.focus(input);
    env.input(input, "ch");
    assert_eq!(combobox.filtered_labels(), ["Charlie"]);
    env.key(KeyEvent::new(Key::Enter));
    assert_eq!(combobox.value().as_ref().map(|v| v.as_str()), Some("charlie"));
    assert!(!combobox.is_open());
    assert_eq!(combobox.query(), "Charlie");
}

#[test]
fn nested_popovers_close_innermost_first() {
    let mut env = Env::new();
    let body = env.doc().body();
    let outer = Popover::new(PopoverProps::default());
    let outer_scope = outer.provide(&Scope::new());
    let outer_trigger = PopoverTrigger::within(&outer_scope)
        .unwrap()
        .mount(&mut env, body, Element::button("Outer"));
    let inner = Popover::new(PopoverProps::default());
    let inner_scope = inner.provide(&outer_scope);
    PopoverContent::within(&outer_scope)
        .unwrap()
        .render(&mut env, move |env, root| {
            PopoverTrigger::within(&inner_scope)
                .unwrap()
                .mount(env, root, Element::button("Inner"));
            PopoverContent::within(&inner_scope)
                .unwrap()
                .render(env, |env, root| {
                    env.doc_mut().insert(Some(root), Element::button("Deep"));
                });
        });

    env.focus(outer_trigger);
    env.click(outer_trigger);
    let inner_trigger = inner.trigger().unwrap();
    env.click(inner_trigger);
    assert_eq!(env.layers().len(), 2);

    // Pressing inside the inner content is not outside the outer one.
    let deep = env.doc().children_of(inner.content().unwrap())[0];
    env.pointer_down(Some(deep), Point::ZERO);
    assert!(inner.is_open());
    assert!(outer.is_open());

    env.key(KeyEvent::new(Key::Escape));
    assert!(!inner.is_open());
    assert!(outer.is_open());
    assert_eq!(env.doc().focused(), Some(inner_trigger));

    env.key(KeyEvent::new(Key::Escape));
    assert!(!outer.is_open());
    assert_eq!(env.doc().focused(), Some(outer_trigger));
    assert!(inner.is_released());
    assert!(outer.is_released());
    assert!(env.layers().is_empty());
    assert_eq!(env.total_listeners(), 0);
}

#[test]
fn removing_the_trigger_tears_down_an_open_popover() {
    let mut f = popover_fixture(PopoverProps {
        default_open: true,
        ..PopoverProps::default()
    });
    let root = f.popover.content().unwrap();
    f.env.remove(f.trigger);
    assert!(!f.env.doc().is_alive(root));
    assert!(f.env.layers().is_empty());
    assert_eq!(f.env.total_listeners(), 0);
    assert!(f.popover.is_released());
}
