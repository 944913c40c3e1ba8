//! Enter/leave class orchestration for a tree of nested transitions.
//!
//! A `Transition` root wraps a `show` flag. Nested children follow it and a
//! node only reports `Left` after its own leave finished and every
//! registered child is hidden, so deep trees unmount from the leaves up.
//!
//! ```rust
//! use std::rc::Rc;
//! use veil_core::*;
//! use veil_ui::transition::*;
//! use web_time::Duration;
//!
//! let clock = ManualClock::new();
//! let fade = TransitionClasses::new()
//!     .enter("transition duration-100")
//!     .enter_from("opacity-0")
//!     .enter_to("opacity-100");
//! let t = Transition::with_clock(false, ChildOptions::new().classes(fade), Rc::new(clock.clone()));
//!
//! t.set_show(true);
//! assert_eq!(t.classes(t.root()), "transition duration-100 opacity-0");
//! t.next_frame();
//! assert_eq!(t.classes(t.root()), "transition duration-100 opacity-100");
//! clock.advance(Duration::from_millis(100));
//! t.tick();
//! assert_eq!(t.phase(t.root()), Some(Phase::Entered));
//! ```

mod classes;
mod tree;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use veil_core::*;

pub use classes::{ChildOptions, ClassList, Timing, TransitionClasses, TransitionHooks};
pub use tree::{NodeKey, Phase, TransitionEvent, TransitionEventKind, TreeState};

use crate::OpenSlot;
use tree::TransitionTree;

struct TransitionInner {
    tree: RefCell<TransitionTree>,
    /// Lifecycle events not yet drained by the host.
    events: RefCell<Vec<TransitionEvent>>,
}

/// Handle to a transition tree. Clones share the same tree.
#[derive(Clone)]
pub struct Transition {
    inner: Rc<TransitionInner>,
}

/// What `Transition.Child` resolves from the ambient context: the tree and
/// the node new children attach to.
#[derive(Clone)]
pub struct TransitionContext {
    pub transition: Transition,
    pub parent: NodeKey,
}

impl Context for TransitionContext {
    const PROVIDER: &'static str = "Transition";
}

impl Transition {
    pub fn new(show: bool, options: ChildOptions) -> Self {
        Self::with_clock(show, options, Rc::new(SystemClock))
    }

    pub fn with_clock(show: bool, options: ChildOptions, clock: Rc<dyn Clock>) -> Self {
        let mut events = Vec::new();
        let tree = TransitionTree::new(show, options, clock, &mut events);
        let t = Self {
            inner: Rc::new(TransitionInner {
                tree: RefCell::new(tree),
                events: RefCell::new(Vec::new()),
            }),
        };
        t.deliver(events);
        t
    }

    pub fn root(&self) -> NodeKey {
        self.inner.tree.borrow().root
    }

    pub fn show(&self) -> bool {
        self.inner.tree.borrow().show()
    }

    /// Start entering (`true`) or leaving (`false`) every node. A change of
    /// direction aborts the running one.
    pub fn set_show(&self, show: bool) {
        self.update(|tree, events| tree.set_show(show, events));
    }

    pub fn toggle(&self) {
        let show = self.show();
        self.set_show(!show);
    }

    /// Attach a child under `parent`. It is removed when the handle drops.
    pub fn child(&self, parent: NodeKey, options: ChildOptions) -> TransitionChild {
        let key = self.update(|tree, events| tree.add_child(parent, options, events));
        TransitionChild {
            transition: Rc::downgrade(&self.inner),
            key,
        }
    }

    /// Run work deferred to the next animation frame.
    pub fn next_frame(&self) {
        self.update(|tree, events| tree.next_frame(events));
    }

    /// Run transitions whose duration has elapsed.
    pub fn tick(&self) {
        self.update(|tree, events| tree.tick(events));
    }

    pub fn pending_tasks(&self) -> usize {
        self.inner.tree.borrow().pending_tasks()
    }

    pub fn drain_events(&self) -> Vec<TransitionEvent> {
        std::mem::take(&mut *self.inner.events.borrow_mut())
    }

    pub fn phase(&self, key: NodeKey) -> Option<Phase> {
        self.inner.tree.borrow().nodes.get(key).map(|n| n.phase)
    }

    pub fn tree_state(&self, key: NodeKey) -> Option<TreeState> {
        self.inner.tree.borrow().nodes.get(key).map(|n| n.state)
    }

    /// Transition classes currently applied to `key`.
    pub fn classes(&self, key: NodeKey) -> String {
        self.inner
            .tree
            .borrow()
            .nodes
            .get(key)
            .map(|n| n.applied.to_string())
            .unwrap_or_default()
    }

    pub fn provide<R>(&self, f: impl FnOnce() -> R) -> R {
        provide(
            TransitionContext {
                transition: self.clone(),
                parent: self.root(),
            },
            f,
        )
    }

    /// Render `key`. Caller classes come first, then the transition classes.
    /// The node's own `unmount` option decides the render strategy.
    pub fn render<R: Renderable>(
        &self,
        key: NodeKey,
        renderer: &mut R,
        pass: &PassProps<OpenSlot>,
    ) -> R::Output {
        let tree = self.inner.tree.borrow();
        let Some(node) = tree.nodes.get(key) else {
            log::warn!("transition: rendering unknown node {key:?}");
            return renderer.omitted();
        };
        if !tree.ancestors_present(key) {
            return renderer.omitted();
        }

        let visible = node.state == TreeState::Visible;
        let pass = pass.clone().unmount(node.options.unmount);
        render(
            renderer,
            Props::new(Tag::element("div")).class(node.applied.to_string()),
            &pass,
            &OpenSlot { open: visible },
            Features::RENDER_STRATEGY,
            visible,
        )
    }

    fn update<T>(&self, f: impl FnOnce(&mut TransitionTree, &mut Vec<TransitionEvent>) -> T) -> T {
        let mut events = Vec::new();
        let out = f(&mut self.inner.tree.borrow_mut(), &mut events);
        self.deliver(events);
        out
    }

    /// Log `events` and run their hooks. The tree is not borrowed here, so
    /// hooks may drive the transition again.
    fn deliver(&self, events: Vec<TransitionEvent>) {
        for event in events {
            log::debug!("transition: {:?} {:?}", event.node, event.kind);
            self.inner.events.borrow_mut().push(event);

            let hook = {
                let tree = self.inner.tree.borrow();
                tree.nodes.get(event.node).and_then(|n| {
                    let hooks = &n.options.hooks;
                    match event.kind {
                        TransitionEventKind::BeforeEnter => hooks.before_enter.clone(),
                        TransitionEventKind::AfterEnter => hooks.after_enter.clone(),
                        TransitionEventKind::BeforeLeave => hooks.before_leave.clone(),
                        TransitionEventKind::AfterLeave => hooks.after_leave.clone(),
                    }
                })
            };
            if let Some(hook) = hook {
                hook();
            }
        }
    }
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("tree", &self.inner.tree)
            .finish()
    }
}

impl std::fmt::Debug for TransitionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionContext")
            .field("parent", &self.parent)
            .finish()
    }
}

/// A mounted `Transition.Child`.
#[derive(Debug)]
pub struct TransitionChild {
    transition: Weak<TransitionInner>,
    key: NodeKey,
}

impl TransitionChild {
    /// Attach under the nearest provided transition node.
    pub fn from_context(options: ChildOptions) -> Result<Self> {
        let ctx = use_context::<TransitionContext>("Transition.Child")?;
        Ok(ctx.transition.child(ctx.parent, options))
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn transition(&self) -> Option<Transition> {
        self.transition.upgrade().map(|inner| Transition { inner })
    }

    pub fn child(&self, options: ChildOptions) -> Option<TransitionChild> {
        Some(self.transition()?.child(self.key, options))
    }

    pub fn phase(&self) -> Option<Phase> {
        self.transition()?.phase(self.key)
    }

    pub fn classes(&self) -> String {
        self.transition()
            .map(|t| t.classes(self.key))
            .unwrap_or_default()
    }

    /// Make this node the parent of children created inside `f`.
    pub fn provide<R>(&self, f: impl FnOnce() -> R) -> R {
        match self.transition() {
            Some(transition) => provide(
                TransitionContext {
                    transition,
                    parent: self.key,
                },
                f,
            ),
            None => f(),
        }
    }

    pub fn render<R: Renderable>(&self, renderer: &mut R, pass: &PassProps<OpenSlot>) -> R::Output {
        match self.transition() {
            Some(t) => t.render(self.key, renderer, pass),
            None => renderer.omitted(),
        }
    }
}

impl Drop for TransitionChild {
    fn drop(&mut self) {
        if let Some(t) = self.transition() {
            t.update(|tree, events| tree.remove(self.key, events));
        }
    }
}
