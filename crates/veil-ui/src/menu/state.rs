use veil_core::Reducer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuPhase {
    Open,
    Closed,
}

/// What happens when keyboard navigation runs past either end of the list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NavigationPolicy {
    /// Stay on the current item.
    #[default]
    Clamp,
    /// Continue from the other end.
    Wrap,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemData {
    /// Lower-cased, trimmed label used for typeahead.
    pub text_value: String,
    pub disabled: bool,
}

impl ItemData {
    pub fn new(label: &str, disabled: bool) -> Self {
        Self {
            text_value: label.trim().to_lowercase(),
            disabled,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuItemEntry {
    pub id: String,
    pub data: ItemData,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuState {
    pub phase: MenuPhase,
    pub button_id: String,
    pub items_id: String,
    /// Mounted items in document order.
    pub items: Vec<MenuItemEntry>,
    /// Always an enabled item, or `None`.
    pub active_item_index: Option<usize>,
    pub search_query: String,
    pub navigation: NavigationPolicy,
}

impl MenuState {
    pub fn new(button_id: String, items_id: String, navigation: NavigationPolicy) -> Self {
        Self {
            phase: MenuPhase::Closed,
            button_id,
            items_id,
            items: Vec::new(),
            active_item_index: None,
            search_query: String::new(),
            navigation,
        }
    }

    pub fn is_open(&self) -> bool {
        self.phase == MenuPhase::Open
    }

    pub fn active_item(&self) -> Option<&MenuItemEntry> {
        self.active_item_index.and_then(|i| self.items.get(i))
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Focus {
    First,
    Previous,
    Next,
    Last,
    Specific(String),
    Nothing,
}

#[derive(Debug)]
pub enum MenuAction {
    OpenMenu,
    CloseMenu,
    GoToItem(Focus),
    /// Append to the typeahead query.
    Search(String),
    ClearSearch,
    RegisterItem { id: String, data: ItemData },
    UnregisterItem(String),
    UpdateItem { id: String, data: ItemData },
}

/// Index the active pointer moves to for `focus`. Disabled items are never
/// chosen; when nothing qualifies the current index is kept.
pub fn calculate_active_index(
    items: &[MenuItemEntry],
    current: Option<usize>,
    focus: &Focus,
    policy: NavigationPolicy,
) -> Option<usize> {
    let len = items.len();
    let enabled = |i: &usize| !items[*i].data.disabled;

    let found = match focus {
        Focus::Nothing => return None,
        Focus::First => (0..len).find(enabled),
        Focus::Last => (0..len).rev().find(enabled),
        Focus::Next => {
            let start = current.map_or(0, |c| c + 1);
            (start..len).find(enabled).or_else(|| match policy {
                NavigationPolicy::Wrap => (0..len).find(enabled),
                NavigationPolicy::Clamp => None,
            })
        }
        Focus::Previous => {
            let end = current.unwrap_or(len);
            (0..end).rev().find(enabled).or_else(|| match policy {
                NavigationPolicy::Wrap => (0..len).rev().find(enabled),
                NavigationPolicy::Clamp => None,
            })
        }
        Focus::Specific(id) => items
            .iter()
            .position(|item| item.id == *id)
            .filter(enabled),
    };

    found.or(current)
}

pub struct MenuReducer;

impl Reducer for MenuReducer {
    type State = MenuState;
    type Action = MenuAction;

    fn reduce(state: &MenuState, action: MenuAction) -> MenuState {
        match action {
            MenuAction::OpenMenu => MenuState {
                phase: MenuPhase::Open,
                ..state.clone()
            },
            MenuAction::CloseMenu => MenuState {
                phase: MenuPhase::Closed,
                active_item_index: None,
                ..state.clone()
            },
            MenuAction::GoToItem(focus) => {
                let active = calculate_active_index(
                    &state.items,
                    state.active_item_index,
                    &focus,
                    state.navigation,
                );
                if state.search_query.is_empty() && state.active_item_index == active {
                    return state.clone();
                }
                MenuState {
                    search_query: String::new(),
                    active_item_index: active,
                    ..state.clone()
                }
            }
            MenuAction::Search(value) => {
                let search_query = format!("{}{}", state.search_query, value.to_lowercase());
                let found = state.items.iter().position(|item| {
                    !item.data.disabled && item.data.text_value.starts_with(&search_query)
                });
                let active_item_index = match found {
                    Some(i) => Some(i),
                    None => state.active_item_index,
                };
                MenuState {
                    search_query,
                    active_item_index,
                    ..state.clone()
                }
            }
            MenuAction::ClearSearch => MenuState {
                search_query: String::new(),
                ..state.clone()
            },
            MenuAction::RegisterItem { id, data } => {
                let mut next = state.clone();
                match next.index_of(&id) {
                    Some(i) => next.items[i].data = data,
                    None => next.items.push(MenuItemEntry { id, data }),
                }
                next
            }
            MenuAction::UnregisterItem(id) => {
                let Some(idx) = state.index_of(&id) else {
                    log::warn!("menu: unregistering unknown item {id}");
                    return state.clone();
                };
                let mut next = state.clone();
                next.items.remove(idx);
                next.active_item_index = match state.active_item_index {
                    Some(active) if active == idx => None,
                    Some(active) if active > idx => Some(active - 1),
                    other => other,
                };
                next
            }
            MenuAction::UpdateItem { id, data } => {
                let Some(idx) = state.index_of(&id) else {
                    log::warn!("menu: updating unknown item {id}");
                    return state.clone();
                };
                let mut next = state.clone();
                if data.disabled && next.active_item_index == Some(idx) {
                    next.active_item_index = None;
                }
                next.items[idx].data = data;
                next
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(spec: &[(&str, bool)]) -> Vec<MenuItemEntry> {
        spec.iter()
            .enumerate()
            .map(|(i, (label, disabled))| MenuItemEntry {
                id: format!("item-{i}"),
                data: ItemData::new(label, *disabled),
            })
            .collect()
    }

    #[test]
    fn next_skips_disabled_and_clamps() {
        let list = items(&[("a", false), ("b", true), ("c", false)]);
        let clamp = NavigationPolicy::Clamp;
        assert_eq!(calculate_active_index(&list, None, &Focus::Next, clamp), Some(0));
        assert_eq!(calculate_active_index(&list, Some(0), &Focus::Next, clamp), Some(2));
        assert_eq!(calculate_active_index(&list, Some(2), &Focus::Next, clamp), Some(2));
    }

    #[test]
    fn previous_skips_disabled_and_wraps() {
        let list = items(&[("a", true), ("b", false), ("c", false)]);
        let wrap = NavigationPolicy::Wrap;
        assert_eq!(calculate_active_index(&list, None, &Focus::Previous, wrap), Some(2));
        assert_eq!(calculate_active_index(&list, Some(1), &Focus::Previous, wrap), Some(2));
        assert_eq!(
            calculate_active_index(&list, Some(1), &Focus::Previous, NavigationPolicy::Clamp),
            Some(1)
        );
    }

    #[test]
    fn first_last_and_specific() {
        let list = items(&[("a", true), ("b", false), ("c", false), ("d", true)]);
        let p = NavigationPolicy::Clamp;
        assert_eq!(calculate_active_index(&list, None, &Focus::First, p), Some(1));
        assert_eq!(calculate_active_index(&list, None, &Focus::Last, p), Some(2));
        assert_eq!(
            calculate_active_index(&list, None, &Focus::Specific("item-2".into()), p),
            Some(2)
        );
        // Disabled or unknown targets keep the current item.
        assert_eq!(
            calculate_active_index(&list, Some(1), &Focus::Specific("item-3".into()), p),
            Some(1)
        );
        assert_eq!(
            calculate_active_index(&list, Some(1), &Focus::Specific("nope".into()), p),
            Some(1)
        );
        assert_eq!(calculate_active_index(&list, Some(1), &Focus::Nothing, p), None);
    }

    #[test]
    fn all_disabled_has_no_active_item() {
        let list = items(&[("a", true), ("b", true)]);
        for focus in [Focus::First, Focus::Last, Focus::Next, Focus::Previous] {
            assert_eq!(
                calculate_active_index(&list, None, &focus, NavigationPolicy::Wrap),
                None
            );
        }
    }

    fn state_with(list: Vec<MenuItemEntry>, active: Option<usize>) -> MenuState {
        MenuState {
            items: list,
            active_item_index: active,
            ..MenuState::new("b".into(), "i".into(), NavigationPolicy::Clamp)
        }
    }

    #[test]
    fn unregister_keeps_pointer_on_same_item() {
        let s = state_with(items(&[("a", false), ("b", false), ("c", false)]), Some(2));
        let s = MenuReducer::reduce(&s, MenuAction::UnregisterItem("item-0".into()));
        assert_eq!(s.active_item().map(|i| i.id.as_str()), Some("item-2"));

        let s = MenuReducer::reduce(&s, MenuAction::UnregisterItem("item-2".into()));
        assert_eq!(s.active_item_index, None);
    }

    #[test]
    fn disabling_the_active_item_clears_it() {
        let s = state_with(items(&[("a", false), ("b", false)]), Some(1));
        let s = MenuReducer::reduce(
            &s,
            MenuAction::UpdateItem {
                id: "item-1".into(),
                data: ItemData::new("b", true),
            },
        );
        assert_eq!(s.active_item_index, None);
        assert!(s.items[1].data.disabled);
    }

    #[test]
    fn close_clears_active_item() {
        let s = state_with(items(&[("a", false)]), Some(0));
        let s = MenuReducer::reduce(&s, MenuAction::OpenMenu);
        let s = MenuReducer::reduce(&s, MenuAction::CloseMenu);
        assert_eq!(s.phase, MenuPhase::Closed);
        assert_eq!(s.active_item_index, None);
    }

    #[test]
    fn go_to_item_clears_search() {
        let mut s = state_with(items(&[("alpha", false), ("beta", false)]), None);
        s = MenuReducer::reduce(&s, MenuAction::Search("b".into()));
        assert_eq!(s.search_query, "b");
        assert_eq!(s.active_item_index, Some(1));

        s = MenuReducer::reduce(&s, MenuAction::GoToItem(Focus::First));
        assert_eq!(s.search_query, "");
        assert_eq!(s.active_item_index, Some(0));
    }
}
