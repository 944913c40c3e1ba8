//! Scripted versions of the component example pages, rendered as markup.
//!
//! Run with `RUST_LOG=debug` to watch the component lifecycle.

use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::Context as _;
use veil_core::prelude::*;
use veil_ui::*;
use web_time::Duration;

const PRESETS: &str = include_str!("presets.json");

type Presets = BTreeMap<String, ChildOptions>;

fn preset(presets: &Presets, name: &str) -> anyhow::Result<ChildOptions> {
    presets
        .get(name)
        .cloned()
        .with_context(|| format!("missing transition preset `{name}`"))
}

fn show<O: Into<Option<String>>>(label: &str, markup: O) {
    match markup.into() {
        Some(m) => println!("  {label:<10} {m}"),
        None => println!("  {label:<10} (unmounted)"),
    }
}

/// Run one frame, then let `ms` pass.
fn settle(t: &Transition, clock: &ManualClock, ms: u64) {
    t.next_frame();
    clock.advance(Duration::from_millis(ms));
    t.tick();
}

fn disclosure() {
    println!("disclosure");
    let d = Disclosure::new();
    let button = d.button();
    let panel = d.panel(PassProps::new());

    for _ in 0..3 {
        button.on_click();
        show("button", button.render(&mut Markup, &PassProps::new()));
        show("panel", panel.render(&mut Markup));
    }
}

fn menu(clock: &ManualClock) {
    println!("menu");
    let menu = Menu::with_clock(MenuOptions::default(), Rc::new(clock.clone()));
    let items = [
        menu.item("Account settings", false),
        menu.item("Documentation", false),
        menu.item("New feature (soon)", true),
        menu.item("Sign out", false),
    ];
    let list = menu.items(PassProps::new().class("outline-none"));
    let item_props = PassProps::new().class_fn(|s: &ItemSlot| {
        let tone = if s.active { "bg-gray-100 text-gray-900" } else { "text-gray-700" };
        let cursor = if s.disabled { " cursor-not-allowed opacity-50" } else { "" };
        format!("block px-4 py-2 {tone}{cursor}")
    });

    let button = menu.button();
    button.on_key_down(&KeyEvent::new(Key::Enter));
    for effect in menu.next_frame() {
        log::info!("host effect: {effect:?}");
    }

    for key in [Key::ArrowDown, Key::ArrowDown, Key::ArrowDown] {
        list.on_key_down(&KeyEvent::new(key));
    }
    list.on_key_down(&KeyEvent::char('d'));

    show("button", button.render(&mut Markup, &PassProps::new()));
    show("items", list.render(&mut Markup));
    for item in &items {
        show("item", item.render(&mut Markup, &item_props));
    }

    clock.advance(menu.options().typeahead_timeout);
    menu.tick();

    let response = list.on_key_down(&KeyEvent::new(Key::Escape));
    log::info!("escape: {response:?}");
    for effect in menu.next_frame() {
        log::info!("host effect: {effect:?}");
    }
    show("items", list.render(&mut Markup));
}

fn dropdown(presets: &Presets, clock: &ManualClock) -> anyhow::Result<()> {
    println!("dropdown transition");
    let t = Transition::with_clock(false, preset(presets, "dropdown")?, Rc::new(clock.clone()));
    let pass = PassProps::new().class("absolute right-0 w-56 mt-2 origin-top-right");

    for open in [true, false] {
        t.set_show(open);
        show("start", t.render(t.root(), &mut Markup, &pass));
        t.next_frame();
        show("frame", t.render(t.root(), &mut Markup, &pass));
        clock.advance(Duration::from_millis(150));
        t.tick();
        show("done", t.render(t.root(), &mut Markup, &pass));
    }
    Ok(())
}

fn peek_a_boo(presets: &Presets, clock: &ManualClock) -> anyhow::Result<()> {
    println!("peek-a-boo");
    let t = Transition::with_clock(true, preset(presets, "peek_a_boo")?, Rc::new(clock.clone()));
    let pass = PassProps::new().class("p-4 bg-white rounded-md shadow");

    show("initial", t.render(t.root(), &mut Markup, &pass));
    t.toggle();
    settle(&t, clock, 300);
    show("hidden", t.render(t.root(), &mut Markup, &pass));
    t.toggle();
    settle(&t, clock, 300);
    show("shown", t.render(t.root(), &mut Markup, &pass));
    Ok(())
}

fn nested(presets: &Presets, clock: &ManualClock) -> anyhow::Result<()> {
    println!("nested hidden boxes");
    let t = Transition::with_clock(
        true,
        ChildOptions::new().unmount(false),
        Rc::new(clock.clone()),
    );
    let boxed = preset(presets, "box")?;

    // Box > Box > [Box > Box, Box > Box > Box > Box]
    let make = || TransitionChild::from_context(boxed.clone());
    let boxes = t.provide(|| -> veil_core::Result<Vec<TransitionChild>> {
        let outer = make()?;
        let inner = outer.provide(|| -> veil_core::Result<Vec<TransitionChild>> {
            let wrapper = make()?;
            let branches = wrapper.provide(|| -> veil_core::Result<Vec<TransitionChild>> {
                let left = make()?;
                let left_leaf = left.provide(make)?;
                let right = make()?;
                let deep = right.provide(|| -> veil_core::Result<Vec<TransitionChild>> {
                    let a = make()?;
                    let b = a.provide(|| -> veil_core::Result<Vec<TransitionChild>> {
                        let b = make()?;
                        let c = b.provide(make)?;
                        Ok(vec![b, c])
                    })?;
                    Ok(std::iter::once(a).chain(b).collect())
                })?;
                Ok([left, left_leaf, right].into_iter().chain(deep).collect())
            })?;
            Ok(std::iter::once(wrapper).chain(branches).collect())
        })?;
        log::info!("mounted {} boxes", inner.len() + 1);
        Ok(std::iter::once(outer).chain(inner).collect())
    })?;

    t.set_show(false);
    settle(&t, clock, 300);
    for event in t.drain_events() {
        log::info!("{:?} {:?}", event.node, event.kind);
    }
    for b in &boxes {
        show("box", b.render(&mut Markup, &PassProps::new()));
    }
    show("root", t.render(t.root(), &mut Markup, &PassProps::new()));
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let presets: Presets =
        serde_json::from_str(PRESETS).context("parsing transition presets")?;
    log::info!("loaded {} transition presets", presets.len());

    let clock = ManualClock::new();
    disclosure();
    menu(&clock);
    dropdown(&presets, &clock)?;
    peek_a_boo(&presets, &clock)?;
    nested(&presets, &clock)?;
    Ok(())
}
