use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::action::Action;
use crate::app::Mode;

/// Map a key event to a semantic action based on current mode.
pub fn map_key(key: KeyEvent, mode: &Mode) -> Action {
    match mode {
        Mode::Normal => map_normal(key),
        Mode::Carry { .. } => map_carry(key),
        Mode::Input { .. } => map_input(key),
        Mode::Confirm { .. } => map_confirm(key),
        Mode::Help => match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Action::Quit,
            _ => Action::None,
        },
    }
}

fn map_normal(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => Action::FocusPrevColumn,
        KeyCode::Char('l') | KeyCode::Right => Action::FocusNextColumn,
        KeyCode::Char('j') | KeyCode::Down => Action::SelectNextCard,
        KeyCode::Char('k') | KeyCode::Up => Action::SelectPrevCard,
        KeyCode::Char('m') | KeyCode::Char(' ') => Action::PickUpCard,
        KeyCode::Char('n') | KeyCode::Char('a') => Action::NewCard,
        KeyCode::Char('e') | KeyCode::Enter => Action::EditCard,
        KeyCode::Char('d') => Action::DeleteCard,
        KeyCode::Char('w') => Action::SetWipLimit,
        KeyCode::Char('r') => Action::ReloadBoard,
        KeyCode::Char('?') => Action::ShowHelp,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        _ => Action::None,
    }
}

fn map_carry(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => Action::CarryPrevColumn,
        KeyCode::Char('l') | KeyCode::Right => Action::CarryNextColumn,
        KeyCode::Enter | KeyCode::Char(' ') => Action::DropCard,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::CancelCarry,
        KeyCode::Esc | KeyCode::Char('q') => Action::CancelCarry,
        _ => Action::None,
    }
}

fn map_input(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter => Action::InputConfirm,
        KeyCode::Esc => Action::InputCancel,
        KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::InputHome,
        KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::InputEnd,
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Action::InputDeleteWord
        }
        KeyCode::Char(c) => Action::InputChar(c),
        KeyCode::Backspace => Action::InputBackspace,
        KeyCode::Left => Action::InputLeft,
        KeyCode::Right => Action::InputRight,
        KeyCode::Home => Action::InputHome,
        KeyCode::End => Action::InputEnd,
        _ => Action::None,
    }
}

fn map_confirm(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => Action::Confirm,
        KeyCode::Char('n') | KeyCode::Esc => Action::Deny,
        _ => Action::None,
    }
}

// ---------------------------------------------------------------------------
// Binding registry — single source of truth for keybinding documentation.
// Used by the help overlay and the carry-mode hint popup.
// ---------------------------------------------------------------------------

/// A documented keybinding for display in help/hints.
pub struct Binding {
    pub key: &'static str,
    pub description: &'static str,
}

/// A group of related bindings (one section in the help overlay).
pub struct BindingGroup {
    pub name: &'static str,
    pub bindings: &'static [Binding],
}

pub const BINDING_GROUPS: &[BindingGroup] = &[
    BindingGroup {
        name: "Navigate",
        bindings: &[
            Binding { key: "h/l", description: "focus previous/next column" },
            Binding { key: "j/k", description: "select next/previous card" },
        ],
    },
    BindingGroup {
        name: "Cards",
        bindings: &[
            Binding { key: "n", description: "new card (disabled while Ready is full)" },
            Binding { key: "e", description: "edit card text" },
            Binding { key: "d", description: "delete card" },
            Binding { key: "m", description: "pick up card to move it" },
        ],
    },
    BindingGroup {
        name: "Carry",
        bindings: &[
            Binding { key: "h/l", description: "hover previous/next column" },
            Binding { key: "enter", description: "drop here" },
            Binding { key: "esc", description: "put the card back" },
        ],
    },
    BindingGroup {
        name: "Board",
        bindings: &[
            Binding { key: "w", description: "set WIP limit for focused column" },
            Binding { key: "r", description: "reload from store" },
            Binding { key: "?", description: "help" },
            Binding { key: "q", description: "quit" },
        ],
    },
];

/// Bindings shown in the hint popup while carrying a card.
pub fn carry_bindings() -> &'static [Binding] {
    BINDING_GROUPS
        .iter()
        .find(|g| g.name == "Carry")
        .map(|g| g.bindings)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn normal_mode_picks_up_card() {
        assert_eq!(map_key(key(KeyCode::Char('m')), &Mode::Normal), Action::PickUpCard);
    }

    #[test]
    fn carry_mode_drops_on_enter_and_cancels_on_esc() {
        let mode = Mode::Carry { over: 1 };
        assert_eq!(map_key(key(KeyCode::Enter), &mode), Action::DropCard);
        assert_eq!(map_key(key(KeyCode::Esc), &mode), Action::CancelCarry);
    }

    #[test]
    fn carry_mode_retargets_with_h_l() {
        let mode = Mode::Carry { over: 0 };
        assert_eq!(map_key(key(KeyCode::Char('h')), &mode), Action::CarryPrevColumn);
        assert_eq!(map_key(key(KeyCode::Char('l')), &mode), Action::CarryNextColumn);
    }

    #[test]
    fn input_mode_captures_plain_chars() {
        let mode = Mode::Input {
            prompt: "New card",
            buf: crate::app::TextBuffer::empty(),
            on_confirm: crate::app::InputTarget::NewCardText,
        };
        assert_eq!(map_key(key(KeyCode::Char('q')), &mode), Action::InputChar('q'));
        assert_eq!(map_key(key(KeyCode::Enter), &mode), Action::InputConfirm);
    }

    #[test]
    fn ctrl_w_deletes_word_in_input_mode() {
        let mode = Mode::Input {
            prompt: "New card",
            buf: crate::app::TextBuffer::empty(),
            on_confirm: crate::app::InputTarget::NewCardText,
        };
        let ev = KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ev, &mode), Action::InputDeleteWord);
    }
}
