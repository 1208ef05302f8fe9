//! Pointer gestures and keyboard action dispatch.

use cellgrid_formula::CellAddress;

use super::SheetEngine;
use crate::action::{GridAction, PointerModifiers};
use crate::editable::{CommitDirection, EditTrigger};
use crate::viewport::CellKind;

impl SheetEngine {
    /// Press at `(x, y)`. Plain press starts a new selection drag, shift
    /// extends the last rect, ctrl starts a disjoint rect. A press while
    /// editing commits the edit in place first.
    pub fn pointer_down(&mut self, x: f32, y: f32, modifiers: PointerModifiers) {
        if self.editor.is_editing() {
            self.commit_edit(CommitDirection::Stay);
        }
        self.selection.cancel_fill();
        let address = self.resolve_address(x, y);
        if modifiers.ctrl {
            self.selection.add_disjoint_selection(address);
        } else if modifiers.shift {
            self.selection.extend_selection(address);
        } else {
            self.selection.begin_selection(address);
        }
    }

    /// Pointer motion: grows the drag rect or the fill draft.
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if self.editor.is_editing() {
            return;
        }
        if self.selection.is_filling() {
            let address = self.resolve_address(x, y);
            self.selection.update_fill(address);
        } else if self.selection.is_dragging() {
            let address = self.resolve_address(x, y);
            self.selection.extend_selection(address);
        }
    }

    /// Tooltip content for the pointer at `(x, y)`: the cell under it and
    /// its display text. Headers and empty cells show nothing.
    pub fn hover(&mut self, x: f32, y: f32) -> Option<(CellAddress, String)> {
        self.visible_range();
        let kind = self.with_layout(|viewport, sizes| viewport.kind_at(x, y, sizes));
        let CellKind::Data(address) = kind else {
            self.hovered = None;
            return None;
        };
        self.hovered = Some(address);
        let text = self.display_value(address);
        (!text.is_empty()).then_some((address, text))
    }

    /// The pointer left the grid.
    pub fn pointer_leave(&mut self) {
        self.hovered = None;
    }

    /// Release: commits a selection drag, or runs the fill.
    pub fn pointer_up(&mut self) {
        if self.selection.is_filling() {
            let target = self.selection.end_fill();
            if target.is_some() {
                self.fill(self.selection.active_cell(), target);
            }
        } else if self.selection.is_dragging() {
            self.selection.end_selection();
        }
    }

    /// Press on the fill handle of the current selection.
    pub fn pointer_down_on_fill_handle(&mut self) -> bool {
        if self.editor.is_editing() {
            return false;
        }
        self.selection.begin_fill();
        true
    }

    /// Double activation opens the editor on the cell under the pointer.
    pub fn double_click(&mut self, x: f32, y: f32) -> bool {
        if self.editor.is_editing() {
            self.commit_edit(CommitDirection::Stay);
        }
        let address = self.resolve_address(x, y);
        self.selection.end_selection();
        self.selection.set_active_cell(address);
        self.begin_edit(EditTrigger::DoubleActivation)
    }

    /// Apply a keyboard action. Returns false when it does not apply in the
    /// current mode (editor actions while navigating and the reverse).
    pub fn dispatch(&mut self, action: GridAction) -> bool {
        if action.requires_editor() != self.editor.is_editing() {
            tracing::trace!(?action, "action ignored in current mode");
            return false;
        }
        match action {
            GridAction::Move(direction) => self.move_active_cell(direction, false),
            GridAction::Extend(direction) => self.move_active_cell(direction, true),
            GridAction::PageUp => self.page(-1, false),
            GridAction::PageDown => self.page(1, false),
            GridAction::RowStart => self.row_start(false),
            GridAction::RowEnd => self.row_end(false),
            GridAction::GotoFirst => self.goto_first(),
            GridAction::GotoLast => self.goto_last(),
            GridAction::SelectAll => self.select_all(),

            GridAction::BeginEdit => return self.begin_edit(EditTrigger::Key),
            GridAction::StartTyping(c) => return self.begin_edit(EditTrigger::Typed(c)),
            GridAction::InsertChar(c) => self.editor.insert_char(c),
            GridAction::Backspace => self.editor.backspace(),
            GridAction::DeleteForward => self.editor.delete_forward(),
            GridAction::CursorLeft => self.editor.cursor_left(),
            GridAction::CursorRight => self.editor.cursor_right(),
            GridAction::CursorHome => self.editor.cursor_home(),
            GridAction::CursorEnd => self.editor.cursor_end(),
            GridAction::Commit(direction) => return self.commit_edit(direction).is_some(),
            GridAction::CancelEdit => return self.cancel_edit(),

            GridAction::DeleteSelection => {
                self.delete_selection();
            }
            GridAction::Undo => return self.undo(),
            GridAction::Redo => return self.redo(),
            GridAction::Copy => {
                self.copy();
            }
            GridAction::Cut => {
                self.cut();
            }
            GridAction::Paste => return self.paste().is_some(),
        }
        true
    }
}
