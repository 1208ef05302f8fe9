//! Keyboard-level actions.
//!
//! Hosts translate their key events into [`GridAction`]s and feed them to
//! `SheetEngine::dispatch`, which keeps key handling apart from behavior.

use crate::editable::CommitDirection;
use crate::selection::Direction;

/// Which key table applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineMode {
    /// Moving the active cell and selection.
    Navigate,
    /// A cell editor is open.
    Edit,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerModifiers {
    /// Extend the current rect to the pressed cell.
    pub shift: bool,
    /// Start an additional disjoint rect.
    pub ctrl: bool,
}

impl PointerModifiers {
    pub const NONE: PointerModifiers = PointerModifiers {
        shift: false,
        ctrl: false,
    };
    pub const SHIFT: PointerModifiers = PointerModifiers {
        shift: true,
        ctrl: false,
    };
    pub const CTRL: PointerModifiers = PointerModifiers {
        shift: false,
        ctrl: true,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridAction {
    /// Move the active cell one step, collapsing the selection.
    Move(Direction),
    /// Grow the current rect one step.
    Extend(Direction),
    PageUp,
    PageDown,
    /// First column of the active row.
    RowStart,
    /// Last used column of the active row.
    RowEnd,
    GotoFirst,
    /// Bottom-right of the used area.
    GotoLast,
    SelectAll,

    /// Open the editor with the current value (Enter/F2).
    BeginEdit,
    /// Open the editor replacing the value with this character.
    StartTyping(char),
    InsertChar(char),
    Backspace,
    DeleteForward,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    Commit(CommitDirection),
    CancelEdit,

    DeleteSelection,
    Undo,
    Redo,
    Copy,
    Cut,
    Paste,
}

impl GridAction {
    /// Actions that only make sense with an open editor.
    pub fn requires_editor(self) -> bool {
        matches!(
            self,
            GridAction::InsertChar(_)
                | GridAction::Backspace
                | GridAction::DeleteForward
                | GridAction::CursorLeft
                | GridAction::CursorRight
                | GridAction::CursorHome
                | GridAction::CursorEnd
                | GridAction::Commit(_)
                | GridAction::CancelEdit
        )
    }
}
