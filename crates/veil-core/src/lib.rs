//! # Stores, Scopes, and Rendering
//!
//! Veil components are headless: they own state and react to input, but never
//! paint anything themselves. `veil-core` holds the pieces every component is
//! built from:
//!
//! - `Store<R>`: single-writer reducer state with ordered dispatch.
//! - `Scope` / `Dispose`: mount/unmount lifetimes with cleanup.
//! - `provide` / `use_context`: an ambient context stack for bindings that
//!   compose implicitly.
//! - `Renderable` / `render`: the capability a host framework implements.
//! - `TaskQueue` / `Clock`: deferred "next frame" and timeout work.
//!
//! ## Stores
//!
//! A component describes its transitions as a pure reducer:
//!
//! ```rust
//! use veil_core::*;
//!
//! #[derive(Debug)]
//! enum Action {
//!     Bump,
//! }
//!
//! struct Counter;
//! impl Reducer for Counter {
//!     type State = u32;
//!     type Action = Action;
//!
//!     fn reduce(state: &u32, action: Action) -> u32 {
//!         match action {
//!             Action::Bump => state + 1,
//!         }
//!     }
//! }
//!
//! let store = Store::<Counter>::new(0);
//! store.dispatch(Action::Bump);
//! assert_eq!(store.state(), 1);
//! ```
//!
//! Dispatches issued from inside a subscriber are queued and applied after
//! the current one, so no two reductions ever interleave.
//!
//! ## Scopes and cleanup
//!
//! ```rust
//! use veil_core::*;
//!
//! let scope = Scope::new();
//! scope.add_disposer(|| log::debug!("unmounted"));
//! scope.dispose();
//! ```
//!
//! Component handles (panels, menu items) unregister themselves when dropped;
//! `Scope::keep` ties their lifetime to a subtree.
//!
//! ## Rendering
//!
//! Hosts implement `Renderable`. Components compute `Props` (tag, id, ARIA
//! attributes, listened events) and `render` decides whether the element is
//! shown, rendered hidden, or omitted. `Markup` is a small reference renderer
//! that prints HTML start tags.

pub mod clock;
pub mod context;
pub mod effects;
pub mod error;
pub mod ids;
pub mod input;
pub mod prelude;
pub mod render;
pub mod scope;
pub mod semantics;
pub mod store;
pub mod tasks;
pub mod tests;

pub use clock::*;
pub use context::*;
pub use effects::*;
pub use error::*;
pub use ids::*;
pub use input::*;
pub use render::*;
pub use scope::*;
pub use semantics::*;
pub use store::*;
pub use tasks::*;
