#[cfg(test)]
mod tests {
    use crate::*;
    use std::rc::Rc;
    use veil_core::semantics::aria;
    use veil_core::*;
    use web_time::Duration;

    #[test]
    fn test_disclosure_controls_follow_panel_link() {
        let d = Disclosure::with_ids("db", "dp");
        let button = d.button();
        let panel = d.panel(PassProps::new());

        // Closed with the unmount strategy: no element, no link.
        assert_eq!(panel.render(&mut Markup), None);
        assert!(!button.props().has(aria::CONTROLS));

        button.on_click();
        panel.render(&mut Markup);
        assert!(d.state().linked_panel);
        assert_eq!(button.props().get(aria::CONTROLS), Some(&AttrValue::from("dp")));

        button.on_click();
        assert!(!d.state().linked_panel);
        assert!(!button.props().has(aria::CONTROLS));
    }

    #[test]
    fn test_disclosure_hidden_panel_stays_linked() {
        let d = Disclosure::with_ids("db", "dp");
        let panel = d.panel(PassProps::new().unmount(false));

        insta::assert_snapshot!(
            panel.render(&mut Markup).unwrap(),
            @r#"<div id="dp" style="display: none;" hidden>"#
        );
        assert!(d.state().linked_panel);

        d.toggle();
        d.toggle();
        assert!(d.state().linked_panel);

        drop(panel);
        assert!(!d.state().linked_panel);
    }

    #[test]
    fn test_disclosure_markup() {
        let d = Disclosure::with_ids("db", "dp");
        let button = d.button();
        let panel = d.panel(PassProps::new().class_fn(|s: &OpenSlot| {
            if s.open { "panel open".into() } else { "panel".into() }
        }));

        d.toggle();
        panel.render(&mut Markup);
        insta::assert_snapshot!(
            button.render(&mut Markup, &PassProps::new()).unwrap(),
            @r#"<button id="db" aria-controls="dp" aria-expanded="true" type="button">"#
        );
        insta::assert_snapshot!(
            panel.render(&mut Markup).unwrap(),
            @r#"<div id="dp" class="panel open">"#
        );
    }

    #[test]
    fn test_static_panel_renders_while_closed() {
        let d = Disclosure::new();
        let panel = d.panel(PassProps::new().is_static(true));
        assert_eq!(panel.visibility(), Visibility::Shown);
        assert!(panel.render(&mut Markup).is_some());
        assert!(d.state().linked_panel);
    }

    #[test]
    fn test_panel_lifetime_follows_scope() {
        let d = Disclosure::new();
        let scope = Scope::new();
        let child = scope.child();
        let panel = d.panel(PassProps::new().unmount(false));
        panel.render(&mut Markup);
        child.keep(panel);
        assert!(d.state().linked_panel);

        scope.dispose();
        assert!(!d.state().linked_panel);
    }

    #[test]
    fn test_components_from_context() {
        let d = Disclosure::new();
        let (button, panel) = d.provide(|| {
            (
                DisclosureButton::from_context().unwrap(),
                DisclosurePanel::from_context(PassProps::new()).unwrap(),
            )
        });
        button.on_click();
        assert!(d.is_open());
        assert_eq!(panel.id(), d.state().panel_id);

        let err = DisclosurePanel::from_context(PassProps::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "<Disclosure.Panel /> is missing a parent <Disclosure /> component."
        );
        let err = MenuItem::from_context("x", false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "<Menu.Item /> is missing a parent <Menu /> component."
        );
        let err = MenuButton::from_context().unwrap_err();
        assert_eq!(
            err,
            Error::MissingContext {
                component: "Menu.Button".into(),
                provider: "Menu",
            }
        );
    }

    fn menu(navigation: NavigationPolicy, clock: &ManualClock) -> (Menu, Vec<MenuItem>) {
        let menu = Menu::with_ids(
            "mb",
            "mi",
            MenuOptions {
                navigation,
                ..MenuOptions::default()
            },
            Rc::new(clock.clone()),
        );
        let items = vec![
            menu.item("Account settings", false),
            menu.item("New feature (soon)", true),
            menu.item("Documentation", false),
            menu.item("Sign out", false),
        ];
        (menu, items)
    }

    fn active(menu: &Menu, items: &[MenuItem]) -> Option<usize> {
        items.iter().position(|item| item.is_active()).filter(|_| menu.is_open())
    }

    #[test]
    fn test_menu_arrow_down_skips_disabled_and_clamps() {
        let clock = ManualClock::new();
        let (menu, items) = menu(NavigationPolicy::Clamp, &clock);
        let list = menu.items(PassProps::new());
        menu.open();

        let mut seen = Vec::new();
        for _ in 0..5 {
            list.on_key_down(&KeyEvent::new(Key::ArrowDown));
            seen.push(active(&menu, &items));
        }
        assert_eq!(seen, vec![Some(0), Some(2), Some(3), Some(3), Some(3)]);

        for _ in 0..3 {
            list.on_key_down(&KeyEvent::new(Key::ArrowUp));
        }
        assert_eq!(active(&menu, &items), Some(0));
    }

    #[test]
    fn test_menu_arrow_down_wraps() {
        let clock = ManualClock::new();
        let (menu, items) = menu(NavigationPolicy::Wrap, &clock);
        let list = menu.items(PassProps::new());
        menu.open();

        let mut seen = Vec::new();
        for _ in 0..5 {
            list.on_key_down(&KeyEvent::new(Key::ArrowDown));
            seen.push(active(&menu, &items));
        }
        assert_eq!(seen, vec![Some(0), Some(2), Some(3), Some(0), Some(2)]);

        list.on_key_down(&KeyEvent::new(Key::Home));
        list.on_key_down(&KeyEvent::new(Key::ArrowUp));
        assert_eq!(active(&menu, &items), Some(3));
    }

    #[test]
    fn test_menu_typeahead_resets_after_timeout() {
        let clock = ManualClock::new();
        let menu = Menu::with_clock(MenuOptions::default(), Rc::new(clock.clone()));
        let items = [
            menu.item("apple", false),
            menu.item("abacus", false),
            menu.item("banana", false),
        ];
        let list = menu.items(PassProps::new());
        menu.open();

        list.on_key_down(&KeyEvent::char('a'));
        assert!(items[0].is_active());
        clock.advance(Duration::from_millis(200));
        menu.tick();
        list.on_key_down(&KeyEvent::char('b'));
        assert!(items[1].is_active());
        assert_eq!(menu.state().search_query, "ab");

        // Each key restarts the timer.
        clock.advance(Duration::from_millis(200));
        menu.tick();
        assert_eq!(menu.state().search_query, "ab");

        clock.advance(Duration::from_millis(150));
        menu.tick();
        assert_eq!(menu.state().search_query, "");
        assert_eq!(menu.pending_tasks(), 0);

        list.on_key_down(&KeyEvent::char('a'));
        assert!(items[0].is_active());
    }

    #[test]
    fn test_menu_typeahead_space_and_disabled_items() {
        let clock = ManualClock::new();
        let (menu, items) = menu(NavigationPolicy::Clamp, &clock);
        let list = menu.items(PassProps::new());
        menu.open();

        // "new feature (soon)" is disabled and never matches.
        list.on_key_down(&KeyEvent::char('n'));
        assert_eq!(active(&menu, &items), None);

        clock.advance(Duration::from_millis(400));
        menu.tick();
        list.on_key_down(&KeyEvent::char('S'));
        list.on_key_down(&KeyEvent::char('i'));
        let r = list.on_key_down(&KeyEvent::new(Key::Space));
        assert!(r.prevent_default);
        assert!(menu.is_open());
        assert_eq!(menu.state().search_query, "si ");
        assert_eq!(active(&menu, &items), Some(3));
    }

    #[test]
    fn test_menu_escape_returns_focus_to_button() {
        let clock = ManualClock::new();
        let (menu, _items) = menu(NavigationPolicy::Clamp, &clock);
        let list = menu.items(PassProps::new());
        menu.open();

        let r = list.on_key_down(&KeyEvent::new(Key::Escape));
        assert!(r.prevent_default);
        assert!(!menu.is_open());
        assert_eq!(menu.next_frame(), vec![Effect::Focus("mb".into())]);
    }

    #[test]
    fn test_menu_enter_clicks_active_item() {
        let clock = ManualClock::new();
        let (menu, items) = menu(NavigationPolicy::Clamp, &clock);
        let list = menu.items(PassProps::new());

        menu.button().on_key_down(&KeyEvent::new(Key::Enter));
        menu.next_frame();
        list.on_key_down(&KeyEvent::new(Key::End));

        let r = list.on_key_down(&KeyEvent::new(Key::Enter));
        assert_eq!(r.effects.as_slice(), &[Effect::Click(items[3].id().to_string())]);
        assert!(!menu.is_open());
        assert_eq!(menu.next_frame(), vec![Effect::Focus("mb".into())]);
    }

    #[test]
    fn test_menu_controls_only_when_items_rendered() {
        let clock = ManualClock::new();
        let (menu, _items) = menu(NavigationPolicy::Clamp, &clock);
        let button = menu.button();
        let list = menu.items(PassProps::new());

        assert_eq!(list.render(&mut Markup), None);
        assert!(!button.props().has(aria::CONTROLS));

        menu.open();
        list.render(&mut Markup);
        assert_eq!(button.props().get(aria::CONTROLS), Some(&AttrValue::from("mi")));

        let stat = menu.items(PassProps::new().is_static(true));
        menu.close();
        assert!(stat.render(&mut Markup).is_some());
        assert!(button.props().has(aria::CONTROLS));
    }

    #[test]
    fn test_menu_markup() {
        let clock = ManualClock::new();
        let (menu, items) = menu(NavigationPolicy::Clamp, &clock);
        let list = menu.items(PassProps::new());
        let item_class = PassProps::new().class_fn(|s: &ItemSlot| {
            match (s.active, s.disabled) {
                (_, true) => "item disabled".into(),
                (true, _) => "item bg-gray-100".into(),
                _ => "item".into(),
            }
        });

        menu.open();
        list.render(&mut Markup);
        items[0].on_pointer_move();

        insta::assert_snapshot!(
            menu.button().render(&mut Markup, &PassProps::new()).unwrap(),
            @r#"<button id="mb" aria-controls="mi" aria-expanded="true" aria-haspopup="true" type="button">"#
        );
        let rendered = list.render(&mut Markup).unwrap();
        assert_eq!(
            rendered,
            format!(
                r#"<div id="mi" aria-activedescendant="{}" aria-labelledby="mb" role="menu" tabindex="-1">"#,
                items[0].id()
            )
        );
        let first = items[0].render(&mut Markup, &item_class).unwrap();
        assert!(first.contains(r#"class="item bg-gray-100""#), "{first}");
        let soon = items[1].render(&mut Markup, &item_class).unwrap();
        assert!(soon.contains(r#"aria-disabled="true""#), "{soon}");
        assert!(soon.contains(r#"class="item disabled""#), "{soon}");
    }

    #[test]
    fn test_menu_items_unregister_with_scope() {
        let clock = ManualClock::new();
        let menu = Menu::with_clock(MenuOptions::default(), Rc::new(clock.clone()));
        let scope = Scope::new();
        scope.keep(menu.item("one", false));
        scope.keep(menu.item("two", false));
        let three = menu.item("three", false);
        menu.open();
        menu.dispatch(MenuAction::GoToItem(Focus::Last));
        assert!(three.is_active());

        scope.dispose();
        assert_eq!(menu.state().items.len(), 1);
        assert!(three.is_active());
    }

    #[test]
    fn test_menu_disabling_the_active_item() {
        let clock = ManualClock::new();
        let (menu, items) = menu(NavigationPolicy::Clamp, &clock);
        menu.open();
        items[2].on_focus();
        assert!(items[2].is_active());

        items[2].set_disabled(true);
        assert!(!items[2].is_active());
        assert_eq!(items[2].slot(), ItemSlot { active: false, disabled: true });
    }

    #[test]
    fn test_dropdown_transition_around_menu() {
        let clock = ManualClock::new();
        let options = ChildOptions::new().classes(
            TransitionClasses::new()
                .enter("transition ease-out duration-75")
                .enter_from("transform opacity-0 scale-95")
                .enter_to("transform opacity-100 scale-100")
                .leave("transition ease-in duration-150")
                .leave_from("transform opacity-100 scale-100")
                .leave_to("transform opacity-0 scale-95"),
        );
        let t = Transition::with_clock(false, options, Rc::new(clock.clone()));
        let (menu, _items) = menu(NavigationPolicy::Clamp, &clock);
        let _sync = {
            let t = t.clone();
            menu.subscribe(move |s| t.set_show(s.is_open()))
        };

        menu.button().on_click();
        assert_eq!(t.phase(t.root()), Some(Phase::Entering));
        t.next_frame();
        clock.advance(Duration::from_millis(75));
        t.tick();
        assert_eq!(t.phase(t.root()), Some(Phase::Entered));

        menu.button().on_click();
        t.next_frame();
        assert_eq!(
            t.classes(t.root()),
            "transition ease-in duration-150 transform opacity-0 scale-95"
        );
        clock.advance(Duration::from_millis(150));
        t.tick();
        assert_eq!(t.render(t.root(), &mut Markup, &PassProps::new()), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_menu_options_from_json() {
        let options: MenuOptions =
            serde_json::from_str(r#"{ "typeahead_timeout_ms": 500, "navigation": "wrap" }"#).unwrap();
        assert_eq!(options.typeahead_timeout, Duration::from_millis(500));
        assert_eq!(options.navigation, NavigationPolicy::Wrap);

        let options: MenuOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, MenuOptions::default());
    }
}
