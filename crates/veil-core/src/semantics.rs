/// WAI-ARIA role of a rendered part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Menu,
    MenuItem,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Menu => "menu",
            Role::MenuItem => "menuitem",
        }
    }
}

/// Attribute names the components control.
pub mod aria {
    pub const ROLE: &str = "role";
    pub const EXPANDED: &str = "aria-expanded";
    pub const CONTROLS: &str = "aria-controls";
    pub const HASPOPUP: &str = "aria-haspopup";
    pub const LABELLEDBY: &str = "aria-labelledby";
    pub const ACTIVEDESCENDANT: &str = "aria-activedescendant";
    pub const DISABLED: &str = "aria-disabled";
    pub const TABINDEX: &str = "tabindex";
    pub const TYPE: &str = "type";
    pub const STYLE: &str = "style";
}
