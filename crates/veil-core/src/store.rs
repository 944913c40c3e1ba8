use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use crate::Dispose;

/// Pure transition function over a component's state.
///
/// `reduce` must be total over `Action`: every action yields a state, even if
/// it is the unchanged input.
pub trait Reducer: 'static {
    type State: Clone + Debug + PartialEq;
    type Action: Debug;

    fn reduce(state: &Self::State, action: Self::Action) -> Self::State;
}

pub type SubId = usize;

type Subscriber<S> = Rc<dyn Fn(&S)>;

/// Single-writer state holder. Cloning yields another handle to the same state.
pub struct Store<R: Reducer> {
    inner: Rc<StoreInner<R>>,
}

/// Non-owning store handle for subscribers that must not keep it alive.
pub struct WeakStore<R: Reducer> {
    inner: Weak<StoreInner<R>>,
}

struct StoreInner<R: Reducer> {
    state: RefCell<R::State>,
    subs: RefCell<Vec<(SubId, Subscriber<R::State>)>>,
    next_sub: Cell<SubId>,
    queue: RefCell<VecDeque<R::Action>>,
    dispatching: Cell<bool>,
}

impl<R: Reducer> Store<R> {
    pub fn new(initial: R::State) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(initial),
                subs: RefCell::new(Vec::new()),
                next_sub: Cell::new(0),
                queue: RefCell::new(VecDeque::new()),
                dispatching: Cell::new(false),
            }),
        }
    }

    pub fn state(&self) -> R::State {
        self.inner.state.borrow().clone()
    }

    /// Read the state without cloning it.
    pub fn with<T>(&self, f: impl FnOnce(&R::State) -> T) -> T {
        f(&self.inner.state.borrow())
    }

    /// Apply `action`. Re-entrant calls (from subscribers) are queued and run
    /// in order once the current reduction has notified everyone.
    pub fn dispatch(&self, action: R::Action) {
        self.inner.queue.borrow_mut().push_back(action);
        if self.inner.dispatching.replace(true) {
            return;
        }

        struct Reset<'a>(&'a Cell<bool>);
        impl Drop for Reset<'_> {
            fn drop(&mut self) {
                self.0.set(false);
            }
        }
        let _reset = Reset(&self.inner.dispatching);

        loop {
            let Some(action) = self.inner.queue.borrow_mut().pop_front() else {
                break;
            };
            log::trace!("{}: {:?}", short_name::<R>(), action);

            let next = R::reduce(&self.inner.state.borrow(), action);
            if *self.inner.state.borrow() == next {
                continue;
            }
            *self.inner.state.borrow_mut() = next.clone();

            let subs: Vec<Subscriber<R::State>> = self
                .inner
                .subs
                .borrow()
                .iter()
                .map(|(_, s)| s.clone())
                .collect();
            for s in subs {
                s(&next);
            }
        }
    }

    /// Called after every state change. Dropping the returned handle does not
    /// unsubscribe; call `Dispose::run`.
    pub fn subscribe(&self, f: impl Fn(&R::State) + 'static) -> Dispose {
        let id = self.inner.next_sub.get();
        self.inner.next_sub.set(id + 1);
        self.inner.subs.borrow_mut().push((id, Rc::new(f)));

        let weak = Rc::downgrade(&self.inner);
        Dispose::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.subs.borrow_mut().retain(|(sid, _)| *sid != id);
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subs.borrow().len()
    }

    pub fn downgrade(&self) -> WeakStore<R> {
        WeakStore {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<R: Reducer> WeakStore<R> {
    pub fn upgrade(&self) -> Option<Store<R>> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R: Reducer> Clone for WeakStore<R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R: Reducer> std::fmt::Debug for Store<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.inner.state.borrow())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

fn short_name<R>() -> &'static str {
    let full = std::any::type_name::<R>();
    full.rsplit("::").next().unwrap_or(full)
}
