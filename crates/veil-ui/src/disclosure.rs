//! WAI-ARIA disclosure: a button that shows and hides a panel.
//!
//! ```rust
//! use veil_core::*;
//! use veil_ui::Disclosure;
//!
//! let disclosure = Disclosure::new();
//! let button = disclosure.button();
//! let panel = disclosure.panel(PassProps::new());
//!
//! button.on_click();
//! assert!(disclosure.is_open());
//!
//! // The panel links itself once its element is rendered.
//! panel.render(&mut Markup);
//! assert!(button.props().has(semantics::aria::CONTROLS));
//! ```

use std::cell::Cell;
use std::rc::Rc;

use veil_core::semantics::aria;
use veil_core::*;

use crate::OpenSlot;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisclosurePhase {
    Open,
    Closed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisclosureState {
    pub phase: DisclosurePhase,
    /// A panel is mounted and its element is present.
    pub linked_panel: bool,
    pub button_id: String,
    pub panel_id: String,
}

impl DisclosureState {
    pub fn is_open(&self) -> bool {
        self.phase == DisclosurePhase::Open
    }
}

#[derive(Debug)]
pub enum DisclosureAction {
    Toggle,
    SetButtonId(String),
    SetPanelId(String),
    LinkPanel,
    UnlinkPanel,
}

pub struct DisclosureReducer;

impl Reducer for DisclosureReducer {
    type State = DisclosureState;
    type Action = DisclosureAction;

    fn reduce(state: &DisclosureState, action: DisclosureAction) -> DisclosureState {
        let mut next = state.clone();
        match action {
            DisclosureAction::Toggle => {
                next.phase = match state.phase {
                    DisclosurePhase::Open => DisclosurePhase::Closed,
                    DisclosurePhase::Closed => DisclosurePhase::Open,
                }
            }
            DisclosureAction::SetButtonId(id) => next.button_id = id,
            DisclosureAction::SetPanelId(id) => next.panel_id = id,
            DisclosureAction::LinkPanel => next.linked_panel = true,
            DisclosureAction::UnlinkPanel => next.linked_panel = false,
        }
        next
    }
}

/// State owner for one disclosure. Clones share the same state.
#[derive(Clone, Debug)]
pub struct Disclosure {
    store: Store<DisclosureReducer>,
}

impl Context for Disclosure {
    const PROVIDER: &'static str = "Disclosure";
}

impl Default for Disclosure {
    fn default() -> Self {
        Self::new()
    }
}

impl Disclosure {
    pub fn new() -> Self {
        Self::with_ids(
            element_id("disclosure-button"),
            element_id("disclosure-panel"),
        )
    }

    pub fn with_ids(button_id: impl Into<String>, panel_id: impl Into<String>) -> Self {
        let store = Store::<DisclosureReducer>::new(DisclosureState {
            phase: DisclosurePhase::Closed,
            linked_panel: false,
            button_id: button_id.into(),
            panel_id: panel_id.into(),
        });
        log::debug!("disclosure mounted: {:?}", store.with(|s| s.button_id.clone()));
        Self { store }
    }

    pub fn state(&self) -> DisclosureState {
        self.store.state()
    }

    pub fn is_open(&self) -> bool {
        self.store.with(DisclosureState::is_open)
    }

    pub fn slot(&self) -> OpenSlot {
        OpenSlot {
            open: self.is_open(),
        }
    }

    pub fn dispatch(&self, action: DisclosureAction) {
        self.store.dispatch(action);
    }

    pub fn toggle(&self) {
        self.dispatch(DisclosureAction::Toggle);
    }

    pub fn subscribe(&self, f: impl Fn(&DisclosureState) + 'static) -> Dispose {
        self.store.subscribe(f)
    }

    pub fn button(&self) -> DisclosureButton {
        DisclosureButton {
            disclosure: self.clone(),
            disabled: false,
        }
    }

    /// Mount a panel. It unlinks itself when dropped.
    pub fn panel(&self, props: PassProps<OpenSlot>) -> DisclosurePanel {
        DisclosurePanel::mount(self.clone(), props)
    }

    /// Run `f` with this disclosure as the ambient provider.
    pub fn provide<R>(&self, f: impl FnOnce() -> R) -> R {
        provide(self.clone(), f)
    }

    /// The disclosure itself renders as a fragment by default.
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
}

#[derive(Clone, Debug)]
pub struct DisclosureButton {
    disclosure: Disclosure,
    disabled: bool,
}

impl DisclosureButton {
    pub fn from_context() -> Result<Self> {
        use_context::<Disclosure>("Disclosure.Button").map(|d| d.button())
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn on_key_down(&self, event: &KeyEvent) -> EventResponse {
        match event.key {
            Key::Space | Key::Enter => {
                self.disclosure.toggle();
                EventResponse::prevented()
            }
            _ => EventResponse::ignored(),
        }
    }

    pub fn on_click(&self) -> EventResponse {
        if self.disabled {
            return EventResponse::ignored();
        }
        self.disclosure.toggle();
        EventResponse::ignored()
    }

    pub fn props(&self) -> Props {
        let state = self.disclosure.state();
        let mut props = Props::new(Tag::element("button"))
            .id(state.button_id.as_str())
            .attr(aria::TYPE, "button")
            .attr_opt(aria::EXPANDED, state.is_open().then_some(true))
            .attr_opt(
                aria::CONTROLS,
                state.linked_panel.then(|| state.panel_id.clone()),
            )
            .listen(Listeners::CLICK | Listeners::KEY_DOWN);
        if self.disabled {
            props = props.attr("disabled", true);
        }
        props
    }

    pub fn render<R: Renderable>(&self, renderer: &mut R, pass: &PassProps<OpenSlot>) -> R::Output {
        render(
            renderer,
            self.props(),
            pass,
            &self.disclosure.slot(),
            Features::empty(),
            true,
        )
    }
}

/// A mounted panel.
#[derive(Debug)]
pub struct DisclosurePanel {
    disclosure: Disclosure,
    props: PassProps<OpenSlot>,
    unmount: Rc<Cell<bool>>,
    subscription: Dispose,
}

impl DisclosurePanel {
    const FEATURES: Features = Features::RENDER_STRATEGY.union(Features::STATIC);

    fn mount(disclosure: Disclosure, props: PassProps<OpenSlot>) -> Self {
        let unmount = Rc::new(Cell::new(props.unmount));

        // Closing with the unmount strategy removes the element, so the
        // button must stop pointing at it.
        let weak = disclosure.store.downgrade();
        let flag = unmount.clone();
        let subscription = disclosure.store.subscribe(move |state| {
            if state.phase == DisclosurePhase::Closed
                && flag.get()
                && state.linked_panel
                && let Some(store) = weak.upgrade()
            {
                store.dispatch(DisclosureAction::UnlinkPanel);
            }
        });

        Self {
            disclosure,
            props,
            unmount,
            subscription,
        }
    }

    pub fn from_context(props: PassProps<OpenSlot>) -> Result<Self> {
        use_context::<Disclosure>("Disclosure.Panel").map(|d| d.panel(props))
    }

    pub fn id(&self) -> String {
        self.disclosure.store.with(|s| s.panel_id.clone())
    }

    /// Replace the caller props, e.g. after the host re-renders with a
    /// different `unmount`.
    pub fn set_props(&mut self, props: PassProps<OpenSlot>) {
        self.unmount.set(props.unmount);
        self.props = props;
        let state = self.disclosure.state();
        if state.phase == DisclosurePhase::Closed && self.props.unmount && state.linked_panel {
            self.disclosure.dispatch(DisclosureAction::UnlinkPanel);
        }
    }

    pub fn visibility(&self) -> Visibility {
        visibility(
            Self::FEATURES,
            self.props.is_static,
            self.props.unmount,
            self.disclosure.is_open(),
        )
    }

    pub fn render<R: Renderable>(&self, renderer: &mut R) -> R::Output {
        if self.visibility() != Visibility::Omitted && !self.disclosure.state().linked_panel {
            // Element attached.
            self.disclosure.dispatch(DisclosureAction::LinkPanel);
        }

        let state = self.disclosure.state();
        render(
            renderer,
            Props::new(Tag::element("div")).id(state.panel_id.as_str()),
            &self.props,
            &OpenSlot {
                open: state.is_open(),
            },
            Self::FEATURES,
            state.is_open(),
        )
    }
}

impl Drop for DisclosurePanel {
    fn drop(&mut self) {
        self.subscription.run();
        self.disclosure.dispatch(DisclosureAction::UnlinkPanel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_alternates_with_click_count() {
        let d = Disclosure::new();
        let button = d.button();
        for clicks in 1..=7 {
            button.on_click();
            let expected = if clicks % 2 == 1 {
                DisclosurePhase::Open
            } else {
                DisclosurePhase::Closed
            };
            assert_eq!(d.state().phase, expected, "after {clicks} clicks");
        }
    }

    #[test]
    fn enter_and_space_toggle_and_prevent_default() {
        let d = Disclosure::new();
        let button = d.button();

        let r = button.on_key_down(&KeyEvent::new(Key::Enter));
        assert!(r.prevent_default);
        assert!(d.is_open());

        let r = button.on_key_down(&KeyEvent::new(Key::Space));
        assert!(r.prevent_default);
        assert!(!d.is_open());

        let r = button.on_key_down(&KeyEvent::char('x'));
        assert!(!r.prevent_default);
        assert!(!d.is_open());
    }

    #[test]
    fn disabled_button_ignores_clicks() {
        let d = Disclosure::new();
        let button = d.button().disabled(true);
        button.on_click();
        assert!(!d.is_open());
        assert_eq!(button.props().get("disabled"), Some(&AttrValue::Bool(true)));
    }

    #[test]
    fn reducer_is_total() {
        let s = DisclosureState {
            phase: DisclosurePhase::Closed,
            linked_panel: false,
            button_id: "b".into(),
            panel_id: "p".into(),
        };
        let s = DisclosureReducer::reduce(&s, DisclosureAction::SetButtonId("b2".into()));
        let s = DisclosureReducer::reduce(&s, DisclosureAction::SetPanelId("p2".into()));
        let s = DisclosureReducer::reduce(&s, DisclosureAction::LinkPanel);
        assert_eq!(s.button_id, "b2");
        assert_eq!(s.panel_id, "p2");
        assert!(s.linked_panel);
        let s = DisclosureReducer::reduce(&s, DisclosureAction::UnlinkPanel);
        assert!(!s.linked_panel);
    }
}
