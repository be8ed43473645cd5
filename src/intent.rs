//! Named user intents, the only way a front-end changes controller state.

use ratatui::layout::Rect;

use crate::api::types::Role;
use crate::dropdown::DropdownId;
use crate::navigation::Page;
use crate::resource::{DraftField, ResourceKind};
use crate::session::CredentialField;

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    // Session
    SetLoginField(CredentialField, String),
    Login,
    Logout,
    SetRegisterField(CredentialField, String),
    Register,

    // Navigation
    Navigate(Page),
    OpenRegister(Role),
    BackToLogin,
    Open(Page),
    BackToDashboard,
    /// Load the current page's data again.
    Reload,

    // Resources
    Refresh(ResourceKind),
    Search(ResourceKind, String),
    BeginCreate(ResourceKind),
    BeginEdit(ResourceKind, String),
    CancelForm(ResourceKind),
    SetField(ResourceKind, DraftField, String),
    Save(ResourceKind),
    RequestRemove(ResourceKind, String),
    ConfirmRemove(ResourceKind, bool),

    // Dropdowns
    ToggleDropdown(DropdownId),
    /// Commit `value` for the dropdown and close it.
    SelectOption(DropdownId, String),
    MoveHighlight(DropdownId, isize),
    PointerDown { x: u16, y: u16 },
    /// Where each dropdown was drawn on the last frame.
    DropdownRegions(Vec<(DropdownId, Rect)>),

    DismissError,
    Quit,
}

impl Intent {
    /// Whether this starts a new user action, which clears the last error.
    ///
    /// Typing, pointer movement and layout updates do not count.
    pub fn is_action(&self) -> bool {
        !matches!(
            self,
            Intent::SetLoginField(..)
                | Intent::SetRegisterField(..)
                | Intent::SetField(..)
                | Intent::ToggleDropdown(_)
                | Intent::SelectOption(..)
                | Intent::MoveHighlight(..)
                | Intent::PointerDown { .. }
                | Intent::DropdownRegions(_)
                | Intent::Quit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_clear_errors_typing_does_not() {
        assert!(Intent::Save(ResourceKind::Course).is_action());
        assert!(Intent::Login.is_action());
        assert!(!Intent::SetField(ResourceKind::Course, DraftField::Name, "F".into()).is_action());
        assert!(!Intent::PointerDown { x: 1, y: 1 }.is_action());
    }
}
