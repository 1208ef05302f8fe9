use cellgrid_core::{CommitDirection, Direction, EngineMode, GridAction};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub(crate) fn plain_char(key: KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c)
            if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
        {
            Some(c)
        }
        _ => None,
    }
}

/// Editor keys shared by every built-in keymap; unbound characters insert.
pub(crate) fn translate_edit(key: KeyEvent) -> Option<GridAction> {
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    match key.code {
        KeyCode::Esc => Some(GridAction::CancelEdit),
        KeyCode::Enter if shift => Some(GridAction::Commit(CommitDirection::Up)),
        KeyCode::Enter => Some(GridAction::Commit(CommitDirection::Down)),
        KeyCode::Tab if shift => Some(GridAction::Commit(CommitDirection::Left)),
        KeyCode::Tab => Some(GridAction::Commit(CommitDirection::Right)),
        KeyCode::BackTab => Some(GridAction::Commit(CommitDirection::Left)),
        KeyCode::Backspace => Some(GridAction::Backspace),
        KeyCode::Char('h') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(GridAction::Backspace)
        }
        KeyCode::Delete => Some(GridAction::DeleteForward),
        KeyCode::Left => Some(GridAction::CursorLeft),
        KeyCode::Right => Some(GridAction::CursorRight),
        KeyCode::Home => Some(GridAction::CursorHome),
        KeyCode::End => Some(GridAction::CursorEnd),
        _ => plain_char(key).map(GridAction::InsertChar),
    }
}

pub(crate) fn translate_standard(mode: EngineMode, key: KeyEvent) -> Option<GridAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    match mode {
        EngineMode::Navigate => match key.code {
            KeyCode::Up if shift => Some(GridAction::Extend(Direction::Up)),
            KeyCode::Down if shift => Some(GridAction::Extend(Direction::Down)),
            KeyCode::Left if shift => Some(GridAction::Extend(Direction::Left)),
            KeyCode::Right if shift => Some(GridAction::Extend(Direction::Right)),
            KeyCode::Up => Some(GridAction::Move(Direction::Up)),
            KeyCode::Down => Some(GridAction::Move(Direction::Down)),
            KeyCode::Left => Some(GridAction::Move(Direction::Left)),
            KeyCode::Right => Some(GridAction::Move(Direction::Right)),
            KeyCode::Tab if shift => Some(GridAction::Move(Direction::Left)),
            KeyCode::Tab => Some(GridAction::Move(Direction::Right)),
            KeyCode::BackTab => Some(GridAction::Move(Direction::Left)),

            KeyCode::PageUp => Some(GridAction::PageUp),
            KeyCode::PageDown => Some(GridAction::PageDown),
            KeyCode::Home if ctrl => Some(GridAction::GotoFirst),
            KeyCode::End if ctrl => Some(GridAction::GotoLast),
            KeyCode::Home => Some(GridAction::RowStart),
            KeyCode::End => Some(GridAction::RowEnd),

            KeyCode::Enter | KeyCode::F(2) => Some(GridAction::BeginEdit),
            KeyCode::Delete | KeyCode::Backspace => Some(GridAction::DeleteSelection),

            KeyCode::Char('z') if ctrl && shift => Some(GridAction::Redo),
            KeyCode::Char('Z') if ctrl => Some(GridAction::Redo),
            KeyCode::Char('z') if ctrl => Some(GridAction::Undo),
            KeyCode::Char('y') if ctrl => Some(GridAction::Redo),
            KeyCode::Char('c') if ctrl => Some(GridAction::Copy),
            KeyCode::Char('x') if ctrl => Some(GridAction::Cut),
            KeyCode::Char('v') if ctrl => Some(GridAction::Paste),
            KeyCode::Char('a') if ctrl => Some(GridAction::SelectAll),

            // Typing over a cell replaces its value.
            _ => plain_char(key).map(GridAction::StartTyping),
        },
        EngineMode::Edit => translate_edit(key),
    }
}

pub(crate) fn translate_vim(mode: EngineMode, key: KeyEvent) -> Option<GridAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match mode {
        EngineMode::Navigate => match key.code {
            KeyCode::Char('r') if ctrl => Some(GridAction::Redo),
            KeyCode::Char('f') if ctrl => Some(GridAction::PageDown),
            KeyCode::Char('b') if ctrl => Some(GridAction::PageUp),
            KeyCode::Char('a') if ctrl => Some(GridAction::SelectAll),
            KeyCode::Char('u') => Some(GridAction::Undo),

            KeyCode::Up | KeyCode::Char('k') => Some(GridAction::Move(Direction::Up)),
            KeyCode::Down | KeyCode::Char('j') => Some(GridAction::Move(Direction::Down)),
            KeyCode::Left | KeyCode::Char('h') => Some(GridAction::Move(Direction::Left)),
            KeyCode::Right | KeyCode::Char('l') => Some(GridAction::Move(Direction::Right)),
            KeyCode::Char('K') => Some(GridAction::Extend(Direction::Up)),
            KeyCode::Char('J') => Some(GridAction::Extend(Direction::Down)),
            KeyCode::Char('H') => Some(GridAction::Extend(Direction::Left)),
            KeyCode::Char('L') => Some(GridAction::Extend(Direction::Right)),
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
                Some(GridAction::Move(Direction::Left))
            }
            KeyCode::Tab => Some(GridAction::Move(Direction::Right)),
            KeyCode::BackTab => Some(GridAction::Move(Direction::Left)),

            KeyCode::PageUp => Some(GridAction::PageUp),
            KeyCode::PageDown => Some(GridAction::PageDown),
            KeyCode::Char('0') | KeyCode::Home => Some(GridAction::RowStart),
            KeyCode::Char('$') | KeyCode::End => Some(GridAction::RowEnd),
            KeyCode::Char('g') => Some(GridAction::GotoFirst),
            KeyCode::Char('G') => Some(GridAction::GotoLast),

            KeyCode::Enter | KeyCode::F(2) | KeyCode::Char('i') | KeyCode::Char('a') => {
                Some(GridAction::BeginEdit)
            }
            KeyCode::Char('x') | KeyCode::Delete => Some(GridAction::DeleteSelection),
            KeyCode::Char('y') => Some(GridAction::Copy),
            KeyCode::Char('d') => Some(GridAction::Cut),
            KeyCode::Char('p') => Some(GridAction::Paste),
            _ => None,
        },
        EngineMode::Edit => translate_edit(key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn standard_typing_starts_edit() {
        assert_eq!(
            translate_standard(EngineMode::Navigate, key(KeyCode::Char('Q'), KeyModifiers::SHIFT)),
            Some(GridAction::StartTyping('Q'))
        );
        assert_eq!(
            translate_standard(EngineMode::Navigate, key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(GridAction::Copy)
        );
    }

    #[test]
    fn shift_arrows_extend() {
        assert_eq!(
            translate_standard(EngineMode::Navigate, key(KeyCode::Down, KeyModifiers::SHIFT)),
            Some(GridAction::Extend(Direction::Down))
        );
    }

    #[test]
    fn edit_mode_commit_directions() {
        let enter = key(KeyCode::Enter, KeyModifiers::NONE);
        let shift_enter = key(KeyCode::Enter, KeyModifiers::SHIFT);
        assert_eq!(
            translate_edit(enter),
            Some(GridAction::Commit(CommitDirection::Down))
        );
        assert_eq!(
            translate_edit(shift_enter),
            Some(GridAction::Commit(CommitDirection::Up))
        );
        assert_eq!(
            translate_edit(key(KeyCode::BackTab, KeyModifiers::SHIFT)),
            Some(GridAction::Commit(CommitDirection::Left))
        );
        assert_eq!(
            translate_edit(key(KeyCode::Char('j'), KeyModifiers::NONE)),
            Some(GridAction::InsertChar('j'))
        );
    }

    #[test]
    fn vim_letters_navigate_instead_of_typing() {
        assert_eq!(
            translate_vim(EngineMode::Navigate, key(KeyCode::Char('j'), KeyModifiers::NONE)),
            Some(GridAction::Move(Direction::Down))
        );
        assert_eq!(
            translate_vim(EngineMode::Navigate, key(KeyCode::Char('q'), KeyModifiers::NONE)),
            None
        );
    }
}
