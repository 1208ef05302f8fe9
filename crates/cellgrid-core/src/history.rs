//! Undo/redo patch log.
//!
//! A patch stores both sides of a mutation, so undo applies `previous` and
//! redo applies `new`; the patch itself moves between the two stacks
//! unchanged. Previous values include explicit empties, which is what lets
//! an undo clear cells that were blank before.

use cellgrid_formula::{CellAddress, CellValue};

use crate::selection::SelectionRect;
use crate::sheet::ChangeSet;

/// Default maximum number of undo entries to keep.
pub const DEFAULT_UNDO_LIMIT: usize = 100;

#[derive(Clone, Debug, PartialEq)]
pub enum Patch {
    /// One cell changed (edit commit, paste anchor).
    Cell {
        address: CellAddress,
        previous: CellValue,
        new: CellValue,
    },
    /// Many cells changed at once (fill, delete, opt-in paste/cut).
    Range {
        anchor: CellAddress,
        bounds: SelectionRect,
        previous: ChangeSet,
        new: ChangeSet,
    },
}

impl Patch {
    /// Build a range patch from the new values, reading the old ones.
    pub fn range(
        anchor: CellAddress,
        bounds: SelectionRect,
        new: ChangeSet,
        previous_of: impl Fn(CellAddress) -> CellValue,
    ) -> Self {
        let previous = new
            .iter()
            .map(|(address, _)| (*address, previous_of(*address)))
            .collect();
        Patch::Range {
            anchor,
            bounds,
            previous,
            new,
        }
    }

    /// Changes that undo this patch.
    pub fn undo_changes(&self) -> ChangeSet {
        match self {
            Patch::Cell {
                address, previous, ..
            } => ChangeSet::single(*address, previous.clone()),
            Patch::Range { previous, .. } => previous.clone(),
        }
    }

    /// Changes that redo this patch.
    pub fn redo_changes(&self) -> ChangeSet {
        match self {
            Patch::Cell { address, new, .. } => ChangeSet::single(*address, new.clone()),
            Patch::Range { new, .. } => new.clone(),
        }
    }

    /// Cell that becomes active after undo or redo.
    pub fn anchor(&self) -> CellAddress {
        match self {
            Patch::Cell { address, .. } => *address,
            Patch::Range { anchor, .. } => *anchor,
        }
    }

    /// Selection restored by undo or redo; point patches collapse onto the cell.
    pub fn bounds(&self) -> SelectionRect {
        match self {
            Patch::Cell { address, .. } => SelectionRect::cell(*address),
            Patch::Range { bounds, .. } => *bounds,
        }
    }
}

/// Bounded undo and redo stacks.
#[derive(Clone, Debug)]
pub struct UndoLog {
    undo_stack: Vec<Patch>,
    redo_stack: Vec<Patch>,
    limit: usize,
}

impl Default for UndoLog {
    fn default() -> Self {
        UndoLog::with_limit(DEFAULT_UNDO_LIMIT)
    }
}

impl UndoLog {
    pub fn with_limit(limit: usize) -> Self {
        UndoLog {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record a new patch. Clears the redo stack; drops the oldest patch
    /// beyond the limit.
    pub fn push(&mut self, patch: Patch) {
        self.undo_stack.push(patch);
        self.redo_stack.clear();
        if self.undo_stack.len() > self.limit {
            self.undo_stack.remove(0);
        }
    }

    /// Pop the newest patch and move it to the redo stack.
    pub fn undo(&mut self) -> Option<&Patch> {
        let patch = self.undo_stack.pop()?;
        self.redo_stack.push(patch);
        self.redo_stack.last()
    }

    /// Pop the newest undone patch and move it back to the undo stack.
    pub fn redo(&mut self) -> Option<&Patch> {
        let patch = self.redo_stack.pop()?;
        self.undo_stack.push(patch);
        self.undo_stack.last()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
