//! WAI-ARIA menu button: a trigger, a popup list of items, keyboard
//! navigation and typeahead.
//!
//! Focus moves the way the host expects: handlers return `EventResponse`s
//! with immediate effects, and work that has to wait for the popup to be
//! painted is queued for the next frame (`Menu::next_frame`). The typeahead
//! buffer resets through a timeout (`Menu::tick`).

mod state;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use veil_core::semantics::aria;
use veil_core::*;
use web_time::Duration;

pub use state::{
    Focus, ItemData, MenuAction, MenuItemEntry, MenuPhase, MenuReducer, MenuState,
    NavigationPolicy, calculate_active_index,
};

use crate::OpenSlot;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MenuOptions {
    /// Idle time after which the typeahead query is cleared.
    #[cfg_attr(feature = "serde", serde(with = "crate::millis", rename = "typeahead_timeout_ms"))]
    pub typeahead_timeout: Duration,
    pub navigation: NavigationPolicy,
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            typeahead_timeout: Duration::from_millis(350),
            navigation: NavigationPolicy::Clamp,
        }
    }
}

/// Render-prop argument for a menu item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemSlot {
    pub active: bool,
    pub disabled: bool,
}

/// Work deferred to the next frame.
enum MenuTask {
    FocusButton,
    FocusItems,
    GoTo(Focus),
}

enum MenuTimer {
    ClearSearch,
}

#[derive(Debug)]
struct MenuInner {
    store: Store<MenuReducer>,
    frames: RefCell<TaskQueue<MenuTask>>,
    timers: RefCell<TaskQueue<MenuTimer>>,
    options: MenuOptions,
    search_timer: Cell<Option<TaskId>>,
    items_rendered: Cell<bool>,
}

/// State owner for one menu. Clones share the same state.
#[derive(Clone, Debug)]
pub struct Menu {
    inner: Rc<MenuInner>,
}

impl Context for Menu {
    const PROVIDER: &'static str = "Menu";
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}

impl Menu {
    pub fn new() -> Self {
        Self::with_options(MenuOptions::default())
    }

    pub fn with_options(options: MenuOptions) -> Self {
        Self::with_clock(options, Rc::new(SystemClock))
    }

    pub fn with_clock(options: MenuOptions, clock: Rc<dyn Clock>) -> Self {
        Self::with_ids(
            element_id("menu-button"),
            element_id("menu-items"),
            options,
            clock,
        )
    }

    pub fn with_ids(
        button_id: impl Into<String>,
        items_id: impl Into<String>,
        options: MenuOptions,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let state = MenuState::new(button_id.into(), items_id.into(), options.navigation);
        log::debug!("menu mounted: {} ({:?})", state.button_id, options.navigation);
        Self {
            inner: Rc::new(MenuInner {
                store: Store::new(state),
                frames: RefCell::new(TaskQueue::new(clock.clone())),
                timers: RefCell::new(TaskQueue::new(clock)),
                options,
                search_timer: Cell::new(None),
                items_rendered: Cell::new(false),
            }),
        }
    }

    pub fn state(&self) -> MenuState {
        self.inner.store.state()
    }

    pub fn is_open(&self) -> bool {
        self.inner.store.with(MenuState::is_open)
    }

    pub fn slot(&self) -> OpenSlot {
        OpenSlot {
            open: self.is_open(),
        }
    }

    pub fn options(&self) -> &MenuOptions {
        &self.inner.options
    }

    pub fn active_item_id(&self) -> Option<String> {
        self.inner
            .store
            .with(|s| s.active_item().map(|item| item.id.clone()))
    }

    pub fn dispatch(&self, action: MenuAction) {
        self.inner.store.dispatch(action);
    }

    pub fn subscribe(&self, f: impl Fn(&MenuState) + 'static) -> Dispose {
        self.inner.store.subscribe(f)
    }

    pub fn open(&self) {
        self.dispatch(MenuAction::OpenMenu);
    }

    /// Close the menu. Focus and navigation queued by opening it are
    /// dropped.
    pub fn close(&self) {
        self.dispatch(MenuAction::CloseMenu);
        let stale = self
            .inner
            .frames
            .borrow_mut()
            .cancel_where(|t| matches!(t, MenuTask::FocusItems | MenuTask::GoTo(_)));
        if stale > 0 {
            log::trace!("menu closed, dropped {stale} frame task(s)");
        }
    }

    pub fn button(&self) -> MenuButton {
        MenuButton { menu: self.clone() }
    }

    pub fn items(&self, props: PassProps<OpenSlot>) -> MenuItems {
        MenuItems {
            menu: self.clone(),
            props,
        }
    }

    /// Mount an item at the end of the list. It unregisters itself when
    /// dropped.
    pub fn item(&self, label: &str, disabled: bool) -> MenuItem {
        MenuItem::mount(self.clone(), ItemData::new(label, disabled))
    }

    pub fn provide<R>(&self, f: impl FnOnce() -> R) -> R {
        provide(self.clone(), f)
    }

    /// The menu itself renders as a fragment by default.
    pub fn render<R: Renderable>(&self, renderer: &mut R, pass: &PassProps<OpenSlot>) -> R::Output {
        render(
            renderer,
            Props::new(Tag::Fragment),
            pass,
            &self.slot(),
            Features::empty(),
            true,
        )
    }

    /// Run work deferred to the next animation frame. Returns the focus
    /// moves the host has to perform.
    pub fn next_frame(&self) -> Vec<Effect> {
        let tasks = self.inner.frames.borrow_mut().take_frame();
        let (button_id, items_id) = self
            .inner
            .store
            .with(|s| (s.button_id.clone(), s.items_id.clone()));

        let mut effects = Vec::new();
        for task in tasks {
            match task {
                MenuTask::FocusButton => effects.push(Effect::Focus(button_id.clone())),
                // Closed through a raw `dispatch` since the frame was requested.
                MenuTask::FocusItems | MenuTask::GoTo(_) if !self.is_open() => {}
                MenuTask::FocusItems => effects.push(Effect::Focus(items_id.clone())),
                MenuTask::GoTo(focus) => self.dispatch(MenuAction::GoToItem(focus)),
            }
        }
        effects
    }

    /// Run expired timers.
    pub fn tick(&self) {
        let due = self.inner.timers.borrow_mut().take_due();
        for MenuTimer::ClearSearch in due {
            self.inner.search_timer.set(None);
            self.dispatch(MenuAction::ClearSearch);
        }
    }

    pub fn pending_tasks(&self) -> usize {
        self.inner.frames.borrow().len() + self.inner.timers.borrow().len()
    }

    /// A pointer went down on an element that is neither the button nor the
    /// items. `target_focusable` tells whether that element takes focus.
    pub fn on_outside_pointer_down(&self, target_focusable: bool) -> EventResponse {
        if !self.is_open() {
            return EventResponse::ignored();
        }
        self.close();
        if target_focusable {
            return EventResponse::ignored();
        }
        let button_id = self.inner.store.with(|s| s.button_id.clone());
        EventResponse::prevented().with(Effect::Focus(button_id))
    }

    fn request_frame(&self, task: MenuTask) {
        self.inner.frames.borrow_mut().request_frame(task);
    }

    fn search(&self, value: String) {
        self.dispatch(MenuAction::Search(value));

        let mut timers = self.inner.timers.borrow_mut();
        if let Some(prev) = self.inner.search_timer.take() {
            timers.cancel(prev);
        }
        let id = timers.set_timeout(self.inner.options.typeahead_timeout, MenuTimer::ClearSearch);
        self.inner.search_timer.set(Some(id));
    }
}

#[derive(Clone, Debug)]
pub struct MenuButton {
    menu: Menu,
}

impl MenuButton {
    pub fn from_context() -> Result<Self> {
        use_context::<Menu>("Menu.Button").map(|m| m.button())
    }

    pub fn on_key_down(&self, event: &KeyEvent) -> EventResponse {
        let first = match event.key {
            Key::Space | Key::Enter | Key::ArrowDown => Focus::First,
            Key::ArrowUp => Focus::Last,
            _ => return EventResponse::ignored(),
        };
        self.menu.open();
        self.menu.request_frame(MenuTask::FocusItems);
        self.menu.request_frame(MenuTask::GoTo(first));
        EventResponse::prevented()
    }

    pub fn on_click(&self) -> EventResponse {
        if self.menu.is_open() {
            self.menu.close();
            self.menu.request_frame(MenuTask::FocusButton);
            EventResponse::ignored()
        } else {
            self.menu.open();
            self.menu.request_frame(MenuTask::FocusItems);
            EventResponse::prevented()
        }
    }

    pub fn props(&self) -> Props {
        let state = self.menu.state();
        let controls = self
            .menu
            .inner
            .items_rendered
            .get()
            .then(|| state.items_id.clone());
        Props::new(Tag::element("button"))
            .id(state.button_id.as_str())
            .attr(aria::TYPE, "button")
            .attr(aria::HASPOPUP, true)
            .attr_opt(aria::CONTROLS, controls)
            .attr_opt(aria::EXPANDED, state.is_open().then_some(true))
            .listen(Listeners::CLICK | Listeners::KEY_DOWN)
    }

    pub fn render<R: Renderable>(&self, renderer: &mut R, pass: &PassProps<OpenSlot>) -> R::Output {
        render(
            renderer,
            self.props(),
            pass,
            &self.menu.slot(),
            Features::empty(),
            true,
        )
    }
}

#[derive(Debug)]
pub struct MenuItems {
    menu: Menu,
    props: PassProps<OpenSlot>,
}

impl MenuItems {
    const FEATURES: Features = Features::RENDER_STRATEGY.union(Features::STATIC);

    pub fn from_context(props: PassProps<OpenSlot>) -> Result<Self> {
        use_context::<Menu>("Menu.Items").map(|m| m.items(props))
    }

    pub fn on_key_down(&self, event: &KeyEvent) -> EventResponse {
        let menu = &self.menu;
        let query_active = menu.inner.store.with(|s| !s.search_query.is_empty());

        match &event.key {
            // A space inside a query is part of the label being typed.
            Key::Space if query_active => {
                menu.search(" ".to_string());
                EventResponse::prevented()
            }
            Key::Space | Key::Enter => {
                let active = menu.active_item_id();
                menu.close();
                menu.request_frame(MenuTask::FocusButton);
                match active {
                    Some(id) => EventResponse::prevented().with(Effect::Click(id)),
                    None => EventResponse::prevented(),
                }
            }
            Key::ArrowDown => self.go_to(Focus::Next),
            Key::ArrowUp => self.go_to(Focus::Previous),
            Key::Home | Key::PageUp => self.go_to(Focus::First),
            Key::End | Key::PageDown => self.go_to(Focus::Last),
            Key::Escape => {
                menu.close();
                menu.request_frame(MenuTask::FocusButton);
                EventResponse::prevented()
            }
            Key::Tab => EventResponse::prevented(),
            Key::Character(c) => {
                menu.search(c.to_string());
                EventResponse::ignored()
            }
            _ => EventResponse::ignored(),
        }
    }

    fn go_to(&self, focus: Focus) -> EventResponse {
        self.menu.dispatch(MenuAction::GoToItem(focus));
        EventResponse::prevented()
    }

    pub fn props(&self) -> Props {
        let state = self.menu.state();
        Props::new(Tag::element("div"))
            .id(state.items_id.as_str())
            .attr(aria::ROLE, Role::Menu.as_str())
            .attr(aria::TABINDEX, -1i64)
            .attr(aria::LABELLEDBY, state.button_id.as_str())
            .attr_opt(
                aria::ACTIVEDESCENDANT,
                state.active_item().map(|item| item.id.clone()),
            )
            .listen(Listeners::KEY_DOWN)
    }

    pub fn visibility(&self) -> Visibility {
        visibility(
            Self::FEATURES,
            self.props.is_static,
            self.props.unmount,
            self.menu.is_open(),
        )
    }

    pub fn render<R: Renderable>(&self, renderer: &mut R) -> R::Output {
        self.menu
            .inner
            .items_rendered
            .set(self.visibility() != Visibility::Omitted);
        render(
            renderer,
            self.props(),
            &self.props,
            &self.menu.slot(),
            Self::FEATURES,
            self.menu.is_open(),
        )
    }
}

impl Drop for MenuItems {
    fn drop(&mut self) {
        self.menu.inner.items_rendered.set(false);
    }
}

/// A mounted menu item.
#[derive(Debug)]
pub struct MenuItem {
    menu: Menu,
    id: String,
    registration: Dispose,
}

impl MenuItem {
    fn mount(menu: Menu, data: ItemData) -> Self {
        let id = element_id("menu-item");
        menu.dispatch(MenuAction::RegisterItem {
            id: id.clone(),
            data,
        });

        let weak = menu.inner.store.downgrade();
        let item_id = id.clone();
        let registration = Dispose::new(move || {
            if let Some(store) = weak.upgrade() {
                store.dispatch(MenuAction::UnregisterItem(item_id));
            }
        });

        Self {
            menu,
            id,
            registration,
        }
    }

    pub fn from_context(label: &str, disabled: bool) -> Result<Self> {
        use_context::<Menu>("Menu.Item").map(|m| m.item(label, disabled))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn data(&self) -> ItemData {
        self.menu.inner.store.with(|s| {
            s.index_of(&self.id)
                .map(|i| s.items[i].data.clone())
                .unwrap_or_default()
        })
    }

    pub fn is_disabled(&self) -> bool {
        self.data().disabled
    }

    pub fn is_active(&self) -> bool {
        self.menu.active_item_id().as_deref() == Some(self.id.as_str())
    }

    pub fn slot(&self) -> ItemSlot {
        ItemSlot {
            active: self.is_active(),
            disabled: self.is_disabled(),
        }
    }

    pub fn set_disabled(&self, disabled: bool) {
        let data = ItemData {
            disabled,
            ..self.data()
        };
        self.update(data);
    }

    pub fn set_label(&self, label: &str) {
        let data = ItemData::new(label, self.is_disabled());
        self.update(data);
    }

    fn update(&self, data: ItemData) {
        self.menu.dispatch(MenuAction::UpdateItem {
            id: self.id.clone(),
            data,
        });
    }

    pub fn on_click(&self) -> EventResponse {
        if self.is_disabled() {
            return EventResponse::prevented();
        }
        self.menu.close();
        self.menu.request_frame(MenuTask::FocusButton);
        EventResponse::ignored()
    }

    pub fn on_focus(&self) -> EventResponse {
        let focus = if self.is_disabled() {
            Focus::Nothing
        } else {
            Focus::Specific(self.id.clone())
        };
        self.menu.dispatch(MenuAction::GoToItem(focus));
        EventResponse::ignored()
    }

    pub fn on_pointer_move(&self) -> EventResponse {
        if self.is_disabled() || self.is_active() {
            return EventResponse::ignored();
        }
        self.menu
            .dispatch(MenuAction::GoToItem(Focus::Specific(self.id.clone())));
        EventResponse::ignored()
    }

    pub fn on_pointer_leave(&self) -> EventResponse {
        if self.is_disabled() || !self.is_active() {
            return EventResponse::ignored();
        }
        self.menu.dispatch(MenuAction::GoToItem(Focus::Nothing));
        EventResponse::ignored()
    }

    pub fn props(&self) -> Props {
        Props::new(Tag::element("a"))
            .id(self.id.as_str())
            .attr(aria::ROLE, Role::MenuItem.as_str())
            .attr(aria::TABINDEX, -1i64)
            .attr_opt(aria::DISABLED, self.is_disabled().then_some(true))
            .listen(
                Listeners::CLICK
                    | Listeners::FOCUS
                    | Listeners::POINTER_MOVE
                    | Listeners::POINTER_LEAVE,
            )
    }

    pub fn render<R: Renderable>(&self, renderer: &mut R, pass: &PassProps<ItemSlot>) -> R::Output {
        render(
            renderer,
            self.props(),
            pass,
            &self.slot(),
            Features::empty(),
            true,
        )
    }
}

impl Drop for MenuItem {
    fn drop(&mut self) {
        self.registration.run();
    }
}
