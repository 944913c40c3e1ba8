//! Headless, accessible Disclosure, Menu and Transition components.
//!
//! Each component owns its state in a `veil_core::Store` and hands the host
//! resolved props (ids, ARIA attributes, listened events) through a
//! `Renderable`. Sub-components are created from their owner
//! (`disclosure.button()`, `menu.item(..)`, `transition.child(..)`) or, for
//! bindings that compose implicitly, resolved from the ambient context.

pub mod disclosure;
pub mod menu;
pub mod transition;

#[cfg(feature = "serde")]
mod millis;

mod tests;

pub use disclosure::{
    Disclosure, DisclosureAction, DisclosureButton, DisclosurePanel, DisclosurePhase,
    DisclosureState,
};
pub use menu::{
    Focus, ItemData, ItemSlot, Menu, MenuAction, MenuButton, MenuItem, MenuItems, MenuOptions,
    MenuPhase, MenuState, NavigationPolicy,
};
pub use transition::{
    ChildOptions, ClassList, NodeKey, Phase, Timing, Transition, TransitionChild,
    TransitionClasses, TransitionContext, TransitionEvent, TransitionEventKind, TransitionHooks,
    TreeState,
};

/// Render-prop argument for parts that only expose open/closed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpenSlot {
    pub open: bool,
}
