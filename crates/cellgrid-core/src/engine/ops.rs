use cellgrid_formula::{CellAddress, CellValue};

use super::SheetEngine;
use crate::editable::{CommitDirection, EditCommit, EditTrigger};
use crate::history::Patch;
use crate::selection::{Direction, SelectionRect};
use crate::sheet::ChangeSet;

impl SheetEngine {
    // --- navigation ---

    pub fn move_active_cell(&mut self, direction: Direction, extend: bool) {
        self.selection.move_active_cell(direction, extend);
        self.scroll_into_view(self.selection.extent());
    }

    pub fn move_by(&mut self, rows: isize, columns: isize, extend: bool) {
        self.selection.move_by(rows, columns, extend);
        self.scroll_into_view(self.selection.extent());
    }

    pub fn move_to(&mut self, address: CellAddress, extend: bool) {
        self.selection.move_to(address, extend);
        self.scroll_into_view(self.selection.extent());
    }

    pub fn select_all(&mut self) {
        self.selection.select_all();
    }

    /// Replace the selection; see [`crate::selection::Selection::set_selection`].
    pub fn set_selection(&mut self, active: CellAddress, rects: &[SelectionRect]) {
        self.selection.set_selection(active, rects);
        self.scroll_into_view(self.selection.active_cell());
    }

    /// Add `rect` as another disjoint range, as a ctrl-drag would.
    pub fn add_selection(&mut self, rect: SelectionRect) {
        self.selection.add_disjoint_selection(rect.top_left());
        self.selection.extend_selection(rect.bottom_right());
        self.selection.end_selection();
        self.scroll_into_view(self.selection.active_cell());
    }

    pub fn page(&mut self, pages: isize, extend: bool) {
        let rows = self.page_rows() as isize;
        self.move_by(rows * pages, 0, extend);
    }

    pub fn row_start(&mut self, extend: bool) {
        let row = self.selection.extent().row;
        self.move_to(CellAddress::new(row, 1), extend);
    }

    /// Last used column of the row, or the first column when it is empty.
    pub fn row_end(&mut self, extend: bool) {
        let row = self.selection.extent().row;
        let column = self.sheet.last_used_column(row).unwrap_or(1);
        self.move_to(CellAddress::new(row, column), extend);
    }

    pub fn goto_first(&mut self) {
        self.move_to(CellAddress::new(1, 1), false);
    }

    /// Bottom-right corner of the used area.
    pub fn goto_last(&mut self) {
        let last = self.sheet.used_extent().unwrap_or(CellAddress::new(1, 1));
        self.move_to(last, false);
    }

    // --- editing ---

    /// Open the editor on the active cell. Returns false if already editing.
    pub fn begin_edit(&mut self, trigger: EditTrigger) -> bool {
        let address = self.selection.active_cell();
        let current = self.sheet.get_value(address);
        let started = self.editor.begin(address, current, trigger);
        if started {
            tracing::debug!(%address, "edit started");
        }
        started
    }

    pub fn edit_buffer(&self) -> Option<&str> {
        self.editor.session().map(|session| session.buffer.as_str())
    }

    pub fn type_text(&mut self, text: &str) {
        self.editor.insert_str(text);
    }

    /// Close the editor, store the parsed value and advance the active cell.
    ///
    /// An unchanged value records nothing, but the cursor still advances.
    pub fn commit_edit(&mut self, direction: CommitDirection) -> Option<EditCommit> {
        let commit = self.editor.commit()?;
        if commit.is_change() {
            self.history.push(Patch::Cell {
                address: commit.address,
                previous: commit.previous_value.clone(),
                new: commit.new_value.clone(),
            });
            self.commit_changes(ChangeSet::single(commit.address, commit.new_value.clone()));
        }
        let (rows, columns) = match direction {
            CommitDirection::Down => (1, 0),
            CommitDirection::Up => (-1, 0),
            CommitDirection::Right => (0, 1),
            CommitDirection::Left => (0, -1),
            CommitDirection::Stay => (0, 0),
        };
        let bounds = self.selection.bounds();
        let next = commit
            .address
            .offset(rows, columns, bounds.row_count, bounds.column_count);
        self.selection.set_active_cell(next);
        self.scroll_into_view(next);
        tracing::debug!(address = %commit.address, changed = commit.is_change(), "edit committed");
        Some(commit)
    }

    /// Discard the edit buffer. Nothing else is touched.
    pub fn cancel_edit(&mut self) -> bool {
        self.selection.cancel_fill();
        self.editor.cancel()
    }

    /// Clear every stored cell in the selection. Returns the number of
    /// cells cleared; already-empty cells are skipped.
    pub fn delete_selection(&mut self) -> usize {
        let rects: Vec<SelectionRect> = self.selection.all_rects().collect();
        self.delete_rects(&rects)
    }

    /// Clear every stored cell in `rects` as one undoable step. An empty
    /// list clears the active cell.
    pub fn delete_rects(&mut self, rects: &[SelectionRect]) -> usize {
        let bounds = self.selection.bounds();
        let mut rects: Vec<SelectionRect> = rects.iter().map(|r| r.clamped(bounds)).collect();
        if rects.is_empty() {
            rects.push(SelectionRect::cell(self.selection.active_cell()));
        }
        let changes: ChangeSet = rects
            .iter()
            .flat_map(|rect| self.sheet.defined_in(*rect))
            .map(|address| (address, CellValue::Empty))
            .collect();
        if changes.is_empty() {
            return 0;
        }

        let cleared = changes.len();
        let bounds = rects
            .iter()
            .skip(1)
            .fold(rects[0], |acc, rect| acc.union(rect));
        let patch = Patch::range(self.selection.active_cell(), bounds, changes.clone(), |a| {
            self.sheet.get_value(a)
        });
        self.history.push(patch);
        self.commit_changes(changes);
        cleared
    }

    /// Copy `source`'s value into every cell of `target` as one undoable step,
    /// then select `target`. Cells already holding the value are skipped; when
    /// none remain (or `target` is absent) nothing is recorded and this
    /// returns false.
    pub fn fill(&mut self, source: CellAddress, target: Option<SelectionRect>) -> bool {
        let Some(target) = target else {
            return false;
        };
        let target = target.clamped(self.selection.bounds());
        let value = self.sheet.get_value(source);
        let changes: ChangeSet = target
            .addresses()
            .filter(|a| self.sheet.get_value(*a) != value)
            .map(|a| (a, value.clone()))
            .collect();
        if changes.is_empty() {
            return false;
        }
        let patch = Patch::range(source, target, changes.clone(), |a| self.sheet.get_value(a));
        self.history.push(patch);
        self.commit_changes(changes);

        let active = if target.contains(source) {
            source
        } else {
            target.top_left()
        };
        self.selection.set_selection(active, &[target]);
        tracing::debug!(%source, %target, "filled");
        true
    }

    // --- history ---

    /// Revert the newest patch. No-op on an empty log or while editing.
    pub fn undo(&mut self) -> bool {
        if self.editor.is_editing() {
            return false;
        }
        let Some(patch) = self.history.undo().cloned() else {
            return false;
        };
        self.commit_changes(patch.undo_changes());
        self.restore_selection(&patch);
        true
    }

    /// Re-apply the newest undone patch.
    pub fn redo(&mut self) -> bool {
        if self.editor.is_editing() {
            return false;
        }
        let Some(patch) = self.history.redo().cloned() else {
            return false;
        };
        self.commit_changes(patch.redo_changes());
        self.restore_selection(&patch);
        true
    }

    fn restore_selection(&mut self, patch: &Patch) {
        match patch {
            Patch::Cell { address, .. } => self.selection.set_active_cell(*address),
            Patch::Range { anchor, bounds, .. } => {
                self.selection.set_selection(*anchor, &[*bounds])
            }
        }
        self.scroll_into_view(patch.anchor());
    }
}
