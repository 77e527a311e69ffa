//! Keyboard input handling
//!
//! Maps key presses to viewer actions. Pointer input goes straight to the
//! grid's dispatcher; only keys need a translation table.

use winit::keyboard::{KeyCode, ModifiersState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerAction {
    /// Scroll by whole rows (negative is up)
    ScrollRows(i32),
    /// Scroll by whole viewports
    ScrollPages(i32),
    Home,
    End,
    /// Scroll horizontally by logical pixels
    ScrollColumns(f64),
    PreviousPage,
    NextPage,
    SelectAll,
    ClearSelection,
    ToggleStripes,
    CycleTheme,
    Quit,
}

const COLUMN_STEP: f64 = 60.0;

pub fn action_for_key(key: KeyCode, modifiers: ModifiersState) -> Option<ViewerAction> {
    let cmd = modifiers.control_key() || modifiers.super_key();
    let action = match key {
        KeyCode::ArrowUp => ViewerAction::ScrollRows(-1),
        KeyCode::ArrowDown => ViewerAction::ScrollRows(1),
        KeyCode::ArrowLeft => ViewerAction::ScrollColumns(-COLUMN_STEP),
        KeyCode::ArrowRight => ViewerAction::ScrollColumns(COLUMN_STEP),
        KeyCode::PageUp => ViewerAction::ScrollPages(-1),
        KeyCode::PageDown => ViewerAction::ScrollPages(1),
        KeyCode::Home => ViewerAction::Home,
        KeyCode::End => ViewerAction::End,
        KeyCode::BracketLeft => ViewerAction::PreviousPage,
        KeyCode::BracketRight => ViewerAction::NextPage,
        KeyCode::KeyA if cmd => ViewerAction::SelectAll,
        KeyCode::Escape => ViewerAction::ClearSelection,
        KeyCode::KeyS if !cmd => ViewerAction::ToggleStripes,
        KeyCode::KeyT if !cmd => ViewerAction::CycleTheme,
        KeyCode::KeyQ | KeyCode::KeyW if cmd => ViewerAction::Quit,
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_keys() {
        let none = ModifiersState::empty();
        assert_eq!(action_for_key(KeyCode::PageDown, none), Some(ViewerAction::ScrollPages(1)));
        assert_eq!(action_for_key(KeyCode::ArrowUp, none), Some(ViewerAction::ScrollRows(-1)));
        assert_eq!(action_for_key(KeyCode::KeyX, none), None);
    }

    #[test]
    fn test_modifier_keys() {
        assert_eq!(
            action_for_key(KeyCode::KeyA, ModifiersState::CONTROL),
            Some(ViewerAction::SelectAll)
        );
        assert_eq!(action_for_key(KeyCode::KeyA, ModifiersState::empty()), None);
        assert_eq!(
            action_for_key(KeyCode::KeyQ, ModifiersState::SUPER),
            Some(ViewerAction::Quit)
        );
    }
}
