#[cfg(test)]
mod tests {
    use crate::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use web_time::Duration;

    #[derive(Debug)]
    enum Op {
        Push(u32),
        Clear,
    }

    struct Log;
    impl Reducer for Log {
        type State = Vec<u32>;
        type Action = Op;

        fn reduce(state: &Vec<u32>, action: Op) -> Vec<u32> {
            match action {
                Op::Push(n) => {
                    let mut next = state.clone();
                    next.push(n);
                    next
                }
                Op::Clear => Vec::new(),
            }
        }
    }

    #[test]
    fn test_store_dispatch() {
        let store = Store::<Log>::new(Vec::new());
        store.dispatch(Op::Push(1));
        store.dispatch(Op::Push(2));
        assert_eq!(store.state(), vec![1, 2]);

        store.dispatch(Op::Clear);
        assert!(store.with(|s| s.is_empty()));
    }

    #[test]
    fn test_store_reentrant_dispatch_is_queued() {
        let store = Store::<Log>::new(Vec::new());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let weak = store.downgrade();
        let seen2 = seen.clone();
        let _sub = store.subscribe(move |s: &Vec<u32>| {
            seen2.borrow_mut().push(s.clone());
            if s.last() == Some(&1)
                && let Some(store) = weak.upgrade()
            {
                store.dispatch(Op::Push(10));
            }
        });
        let _second = store.subscribe(|_| {});

        store.dispatch(Op::Push(1));

        // The nested dispatch runs only after every subscriber saw [1].
        assert_eq!(*seen.borrow(), vec![vec![1], vec![1, 10]]);
        assert_eq!(store.state(), vec![1, 10]);
    }

    #[test]
    fn test_store_unsubscribe() {
        let store = Store::<Log>::new(Vec::new());
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        let sub = store.subscribe(move |_| *c.borrow_mut() += 1);

        store.dispatch(Op::Push(1));
        sub.run();
        store.dispatch(Op::Push(2));

        assert_eq!(*count.borrow(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_store_skips_unchanged_state() {
        let store = Store::<Log>::new(Vec::new());
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        let _sub = store.subscribe(move |_| *c.borrow_mut() += 1);

        store.dispatch(Op::Clear);
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_scope_explicit_dispose() {
        let order = Rc::new(RefCell::new(Vec::new()));

        let scope = Scope::new();
        let child = scope.child();
        let o = order.clone();
        scope.add_disposer(move || o.borrow_mut().push("parent"));
        let o = order.clone();
        child.add_disposer(move || o.borrow_mut().push("child"));

        assert!(order.borrow().is_empty());
        scope.dispose();
        assert_eq!(*order.borrow(), vec!["child", "parent"]);

        // Idempotent
        scope.dispose();
        assert_eq!(order.borrow().len(), 2);
    }

    #[test]
    fn test_scope_keep_drops_on_dispose() {
        struct Flag(Rc<RefCell<bool>>);
        impl Drop for Flag {
            fn drop(&mut self) {
                *self.0.borrow_mut() = true;
            }
        }

        let dropped = Rc::new(RefCell::new(false));
        let scope = Scope::new();
        scope.keep(Flag(dropped.clone()));
        assert!(!*dropped.borrow());
        scope.dispose();
        assert!(*dropped.borrow());
    }

    #[test]
    fn test_current_scope() {
        assert!(current_scope().is_none());
        let scope = Scope::new();
        scope.run(|| {
            let inner = current_scope().expect("scope is current inside run");
            inner.add_disposer(|| {});
        });
        assert!(current_scope().is_none());
    }

    #[test]
    fn test_dispose_runs_once() {
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        let d = Dispose::new(move || *c.borrow_mut() += 1);
        let d2 = d.clone();
        d.run();
        d2.run();
        assert_eq!(*count.borrow(), 1);
        assert!(d2.is_disposed());
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Accordion(&'static str);
    impl Context for Accordion {
        const PROVIDER: &'static str = "Accordion";
    }

    #[test]
    fn test_context_nearest_provider_wins() {
        provide(Accordion("outer"), || {
            assert_eq!(try_use_context::<Accordion>(), Some(Accordion("outer")));
            provide(Accordion("inner"), || {
                assert_eq!(try_use_context::<Accordion>(), Some(Accordion("inner")));
            });
            assert_eq!(try_use_context::<Accordion>(), Some(Accordion("outer")));
        });
        assert_eq!(try_use_context::<Accordion>(), None);
    }

    #[test]
    fn test_context_missing_names_both_components() {
        let err = use_context::<Accordion>("Accordion.Item").unwrap_err();
        assert_eq!(
            err,
            Error::MissingContext {
                component: "Accordion.Item".into(),
                provider: "Accordion",
            }
        );
        assert_eq!(
            err.to_string(),
            "<Accordion.Item /> is missing a parent <Accordion /> component."
        );
    }

    #[test]
    fn test_ids_are_unique() {
        let a = element_id("menu-button");
        let b = element_id("menu-button");
        assert_ne!(a, b);
        assert!(a.starts_with("veil-menu-button-"));
    }

    #[test]
    fn test_key_from_dom() {
        assert_eq!(Key::from_dom(" "), Key::Space);
        assert_eq!(Key::from_dom("ArrowDown"), Key::ArrowDown);
        assert_eq!(Key::from_dom("a"), Key::Character('a'));
        assert_eq!(Key::from_dom("F5"), Key::F(5));
        assert_eq!(Key::from_dom("Shift"), Key::Other("Shift".into()));
    }

    #[test]
    fn test_visibility_features() {
        let rs = Features::RENDER_STRATEGY;
        let both = Features::RENDER_STRATEGY | Features::STATIC;

        assert_eq!(visibility(rs, false, true, true), Visibility::Shown);
        assert_eq!(visibility(rs, false, true, false), Visibility::Omitted);
        assert_eq!(visibility(rs, false, false, false), Visibility::Hidden);
        assert_eq!(visibility(both, true, true, false), Visibility::Shown);
        // `static` is ignored unless the part supports it
        assert_eq!(visibility(rs, true, true, false), Visibility::Omitted);
        assert_eq!(visibility(Features::empty(), false, true, false), Visibility::Shown);
    }

    #[test]
    fn test_render_merges_ours_over_passthrough() {
        let ours = Props::new(Tag::element("button"))
            .id("b1")
            .attr(semantics::aria::TYPE, "button")
            .listen(Listeners::CLICK);
        let pass = PassProps::<bool>::new()
            .as_tag(Tag::element("a"))
            .attr("type", "submit")
            .attr("data-x", "1")
            .class_fn(|active| if *active { "on".into() } else { "off".into() });

        let out = render(&mut Markup, ours, &pass, &true, Features::empty(), true);
        insta::assert_snapshot!(out.unwrap(), @r#"<a id="b1" class="on" data-x="1" type="button">"#);
    }

    #[test]
    fn test_render_hidden_strategy() {
        let ours = Props::new(Tag::element("div")).id("p1");
        let pass = PassProps::<()>::new().unmount(false);

        let out = render(&mut Markup, ours.clone(), &pass, &(), Features::RENDER_STRATEGY, false);
        insta::assert_snapshot!(out.unwrap(), @r#"<div id="p1" style="display: none;" hidden>"#);

        let unmounted = PassProps::<()>::new();
        let out = render(&mut Markup, ours, &unmounted, &(), Features::RENDER_STRATEGY, false);
        assert_eq!(out, None);
    }

    #[test]
    fn test_task_queue_frames_and_timeouts() {
        let clock = ManualClock::new();
        let mut q = TaskQueue::new(Rc::new(clock.clone()));

        q.set_timeout(Duration::from_millis(200), "late");
        let early = q.set_timeout(Duration::from_millis(100), "early");
        q.request_frame("frame");
        assert_eq!(q.len(), 3);

        assert_eq!(q.take_frame(), vec!["frame"]);
        assert!(q.take_due().is_empty());

        clock.advance(Duration::from_millis(250));
        assert_eq!(q.take_due(), vec!["early", "late"]);
        assert!(q.is_empty());
        assert!(!q.cancel(early));
    }

    #[test]
    fn test_task_queue_cancel() {
        let clock = ManualClock::new();
        let mut q = TaskQueue::new(Rc::new(clock.clone()));
        let id = q.set_timeout(Duration::from_millis(10), 1);
        assert!(q.cancel(id));
        clock.advance(Duration::from_millis(20));
        assert!(q.take_due().is_empty());
        assert_eq!(q.next_deadline(), None);
    }

    #[test]
    fn test_task_queue_cancel_where() {
        let clock = ManualClock::new();
        let mut q = TaskQueue::new(Rc::new(clock.clone()));
        q.request_frame(1);
        q.request_frame(2);
        q.set_timeout(Duration::from_millis(10), 3);
        assert_eq!(q.cancel_where(|t| *t != 2), 2);
        assert_eq!(q.take_frame(), vec![2]);
        assert!(q.is_empty());
    }
}
