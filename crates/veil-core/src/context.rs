//! # Ambient context
//!
//! Components are normally wired by passing their owner explicitly
//! (`disclosure.button()`). Bindings that compose implicitly can instead
//! `provide` an owner for a subtree and resolve it with `use_context`:
//!
//! ```rust
//! use veil_core::*;
//!
//! #[derive(Clone, Debug)]
//! struct Tabs(u32);
//! impl Context for Tabs {
//!     const PROVIDER: &'static str = "Tabs";
//! }
//!
//! provide(Tabs(3), || {
//!     assert_eq!(use_context::<Tabs>("Tabs.List").unwrap().0, 3);
//! });
//!
//! let err = use_context::<Tabs>("Tabs.List").unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "<Tabs.List /> is missing a parent <Tabs /> component."
//! );
//! ```

use std::any::{Any, TypeId};
use std::cell::RefCell;

use crate::Error;

/// A value that can be provided to a subtree.
pub trait Context: Clone + 'static {
    /// Component name reported when a consumer has no provider.
    const PROVIDER: &'static str;
}

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<(TypeId, Box<dyn Any>)>> = const { RefCell::new(Vec::new()) };
}

/// Make `value` visible to `use_context` calls made inside `f`.
pub fn provide<T: Context, R>(value: T, f: impl FnOnce() -> R) -> R {
    // Non-panicking frame guard (ensures pop on unwind)
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            CONTEXT_STACK.with(|st| {
                st.borrow_mut().pop();
            });
        }
    }

    CONTEXT_STACK.with(|st| {
        st.borrow_mut()
            .push((TypeId::of::<T>(), Box::new(value)))
    });
    let _guard = Guard;
    f()
}

/// Nearest provided `T`, if any.
pub fn try_use_context<T: Context>() -> Option<T> {
    CONTEXT_STACK.with(|st| {
        st.borrow()
            .iter()
            .rev()
            .filter(|(id, _)| *id == TypeId::of::<T>())
            .find_map(|(_, v)| v.downcast_ref::<T>().cloned())
    })
}

/// Nearest provided `T`, or a `MissingContext` error naming `component`.
pub fn use_context<T: Context>(component: &str) -> Result<T, Error> {
    try_use_context::<T>().ok_or_else(|| {
        log::warn!("{component} rendered outside of {}", T::PROVIDER);
        Error::MissingContext {
            component: component.to_string(),
            provider: T::PROVIDER,
        }
    })
}
