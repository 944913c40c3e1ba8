pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::context::{Context, provide, try_use_context, use_context};
pub use crate::effects::Dispose;
pub use crate::error::{Error, Result};
pub use crate::ids::{element_id, use_id};
pub use crate::input::{Effect, EventResponse, Key, KeyEvent, Modifiers};
pub use crate::render::{
    AttrValue, ClassName, Features, Listeners, Markup, PassProps, Props, RenderStrategy,
    Renderable, Tag, Visibility, render,
};
pub use crate::scope::{Scope, current_scope};
pub use crate::semantics::Role;
pub use crate::store::{Reducer, Store, WeakStore};
pub use crate::tasks::{TaskId, TaskQueue};
