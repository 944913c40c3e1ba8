use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};
use veil_core::{Clock, TaskId, TaskQueue};

use super::classes::{ChildOptions, ClassList};

new_key_type! {
    /// A node of a transition tree: the root or a nested child.
    pub struct NodeKey;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Entering,
    Entered,
    Leaving,
    Left,
}

/// Whether a node counts as shown for its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeState {
    Visible,
    Hidden,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionEventKind {
    BeforeEnter,
    AfterEnter,
    BeforeLeave,
    AfterLeave,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionEvent {
    pub node: NodeKey,
    pub kind: TransitionEventKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Task {
    /// Swap the `from` classes for the `to` classes.
    Frame(NodeKey),
    /// The running enter or leave has elapsed.
    Done(NodeKey),
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
    pub(crate) options: ChildOptions,
    pub(crate) state: TreeState,
    pub(crate) phase: Phase,
    /// Transition classes currently on the element.
    pub(crate) applied: ClassList,
    in_flight: Option<TaskId>,
    /// Direct children that registered, with their last reported state.
    nesting: Vec<(NodeKey, TreeState)>,
}

impl Node {
    fn new(parent: Option<NodeKey>, options: ChildOptions, visible: bool) -> Self {
        let (state, phase) = if visible {
            (TreeState::Visible, Phase::Entered)
        } else {
            (TreeState::Hidden, Phase::Left)
        };
        let applied = if visible {
            options.classes.entered.clone()
        } else {
            ClassList::new()
        };
        Self {
            parent,
            children: Vec::new(),
            options,
            state,
            phase,
            applied,
            in_flight: None,
            nesting: Vec::new(),
        }
    }

    fn has_visible_children(&self) -> bool {
        self.nesting
            .iter()
            .any(|(_, state)| *state == TreeState::Visible)
    }
}

/// The node arena plus the deferred work driving it. Every mutating method
/// appends the lifecycle events it caused to `events`.
#[derive(Debug)]
pub(crate) struct TransitionTree {
    pub(crate) nodes: SlotMap<NodeKey, Node>,
    pub(crate) root: NodeKey,
    show: bool,
    tasks: TaskQueue<Task>,
}

impl TransitionTree {
    pub(crate) fn new(
        show: bool,
        options: ChildOptions,
        clock: Rc<dyn Clock>,
        events: &mut Vec<TransitionEvent>,
    ) -> Self {
        let appear = show && options.appear;
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(None, options, show && !appear));
        let mut tree = Self {
            nodes,
            root,
            show,
            tasks: TaskQueue::new(clock),
        };
        if appear {
            tree.enter(root, events);
        }
        tree
    }

    pub(crate) fn show(&self) -> bool {
        self.show
    }

    pub(crate) fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub(crate) fn add_child(
        &mut self,
        parent: NodeKey,
        options: ChildOptions,
        events: &mut Vec<TransitionEvent>,
    ) -> NodeKey {
        let parent = if self.nodes.contains_key(parent) {
            parent
        } else {
            log::warn!("transition: child added to unknown node {parent:?}, using the root");
            self.root
        };
        let p = &self.nodes[parent];
        let entering = p.phase == Phase::Entering;
        let visible = p.state == TreeState::Visible && p.phase == Phase::Entered;

        let key = self
            .nodes
            .insert(Node::new(Some(parent), options, visible));
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(key);
            if visible {
                p.nesting.push((key, TreeState::Visible));
            }
        }
        if entering {
            // Joins an enter already under way (e.g. `appear`).
            self.enter(key, events);
        }
        key
    }

    /// Drop `key` and its subtree, as when the host unmounts it.
    pub(crate) fn remove(&mut self, key: NodeKey, events: &mut Vec<TransitionEvent>) {
        if key == self.root {
            return;
        }
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        let parent = node.parent;

        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            if let Some(node) = self.nodes.remove(k) {
                if let Some(id) = node.in_flight {
                    self.tasks.cancel(id);
                }
                stack.extend(node.children);
            }
        }

        if let Some(parent) = parent
            && let Some(p) = self.nodes.get_mut(parent)
        {
            p.children.retain(|c| *c != key);
            p.nesting.retain(|(c, _)| *c != key);
            self.try_complete(parent, events);
        }
    }

    pub(crate) fn set_show(&mut self, show: bool, events: &mut Vec<TransitionEvent>) {
        if self.show == show {
            return;
        }
        self.show = show;
        log::debug!("transition: show={show}");

        for key in self.pre_order() {
            if show {
                self.enter(key, events);
            } else if self.nodes[key].state == TreeState::Visible {
                self.leave(key, events);
            }
        }
    }

    fn pre_order(&self) -> Vec<NodeKey> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(key) = stack.pop() {
            if let Some(node) = self.nodes.get(key) {
                out.push(key);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Abort whatever `key` is doing and strip its transition classes.
    fn cancel(&mut self, key: NodeKey) {
        let node = &mut self.nodes[key];
        if let Some(id) = node.in_flight.take() {
            self.tasks.cancel(id);
        }
        node.applied.clear();
    }

    fn enter(&mut self, key: NodeKey, events: &mut Vec<TransitionEvent>) {
        self.cancel(key);
        let node = &mut self.nodes[key];
        node.state = TreeState::Visible;
        node.phase = Phase::Entering;
        let classes = &node.options.classes;
        node.applied.add_all(&classes.enter);
        node.applied.add_all(&classes.enter_from);
        let parent = node.parent;

        if let Some(parent) = parent {
            self.report(parent, key, TreeState::Visible);
        }
        events.push(TransitionEvent {
            node: key,
            kind: TransitionEventKind::BeforeEnter,
        });
        let id = self.tasks.request_frame(Task::Frame(key));
        self.nodes[key].in_flight = Some(id);
    }

    fn leave(&mut self, key: NodeKey, events: &mut Vec<TransitionEvent>) {
        self.cancel(key);
        let node = &mut self.nodes[key];
        node.phase = Phase::Leaving;
        let classes = &node.options.classes;
        node.applied.add_all(&classes.leave);
        node.applied.add_all(&classes.leave_from);

        events.push(TransitionEvent {
            node: key,
            kind: TransitionEventKind::BeforeLeave,
        });
        let id = self.tasks.request_frame(Task::Frame(key));
        self.nodes[key].in_flight = Some(id);
    }

    /// Record `child`'s state in `parent`'s nesting registry.
    fn report(&mut self, parent: NodeKey, child: NodeKey, state: TreeState) {
        let Some(p) = self.nodes.get_mut(parent) else {
            return;
        };
        match p.nesting.iter_mut().find(|(c, _)| *c == child) {
            Some(entry) => entry.1 = state,
            None => p.nesting.push((child, state)),
        }
    }

    fn on_frame(&mut self, key: NodeKey, events: &mut Vec<TransitionEvent>) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        node.in_flight = None;
        let classes = &node.options.classes;
        let timing = match node.phase {
            Phase::Entering => {
                node.applied.remove_all(&classes.enter_from);
                node.applied.add_all(&classes.enter_to);
                node.options.enter_timing()
            }
            Phase::Leaving => {
                node.applied.remove_all(&classes.leave_from);
                node.applied.add_all(&classes.leave_to);
                node.options.leave_timing()
            }
            phase => {
                log::warn!("transition: frame for settled node {key:?} ({phase:?})");
                return;
            }
        };

        if timing.total().is_zero() {
            self.finish(key, events);
        } else {
            let id = self.tasks.set_timeout(timing.total(), Task::Done(key));
            self.nodes[key].in_flight = Some(id);
        }
    }

    fn finish(&mut self, key: NodeKey, events: &mut Vec<TransitionEvent>) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        node.in_flight = None;
        node.applied.clear();
        let phase = node.phase;
        match phase {
            Phase::Entering => {
                node.phase = Phase::Entered;
                node.applied.add_all(&node.options.classes.entered);
                events.push(TransitionEvent {
                    node: key,
                    kind: TransitionEventKind::AfterEnter,
                });
            }
            Phase::Leaving => self.try_complete(key, events),
            _ => {}
        }
    }

    /// Finish a leave once the node's own transition is over and no
    /// registered child is still visible, then let the parent re-check.
    fn try_complete(&mut self, key: NodeKey, events: &mut Vec<TransitionEvent>) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        if node.phase != Phase::Leaving || node.in_flight.is_some() || node.has_visible_children() {
            return;
        }

        node.state = TreeState::Hidden;
        node.phase = Phase::Left;
        node.applied.clear();
        let unmount = node.options.unmount;
        let parent = node.parent;
        events.push(TransitionEvent {
            node: key,
            kind: TransitionEventKind::AfterLeave,
        });

        if let Some(parent) = parent {
            if unmount {
                if let Some(p) = self.nodes.get_mut(parent) {
                    p.nesting.retain(|(c, _)| *c != key);
                }
            } else {
                self.report(parent, key, TreeState::Hidden);
            }
            self.try_complete(parent, events);
        }
    }

    pub(crate) fn next_frame(&mut self, events: &mut Vec<TransitionEvent>) {
        for task in self.tasks.take_frame() {
            if let Task::Frame(key) = task {
                self.on_frame(key, events);
            }
        }
    }

    pub(crate) fn tick(&mut self, events: &mut Vec<TransitionEvent>) {
        for task in self.tasks.take_due() {
            if let Task::Done(key) = task {
                self.finish(key, events);
            }
        }
    }

    /// The element exists: visible, or hidden with the hidden strategy.
    fn is_present(&self, key: NodeKey) -> bool {
        self.nodes
            .get(key)
            .is_some_and(|n| n.state == TreeState::Visible || !n.options.unmount)
    }

    /// Every ancestor of `key` still has an element to hold it.
    pub(crate) fn ancestors_present(&self, key: NodeKey) -> bool {
        let mut cur = self.nodes.get(key).and_then(|n| n.parent);
        while let Some(k) = cur {
            if !self.is_present(k) {
                return false;
            }
            cur = self.nodes.get(k).and_then(|n| n.parent);
        }
        true
    }
}
