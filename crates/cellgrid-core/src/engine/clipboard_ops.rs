use cellgrid_formula::CellValue;

use super::SheetEngine;
use crate::clipboard::ClipboardBlock;
use crate::history::Patch;
use crate::selection::SelectionRect;
use crate::sheet::ChangeSet;

impl SheetEngine {
    /// Copy the primary rect and write it to the clipboard as TSV.
    pub fn copy(&mut self) -> ClipboardBlock {
        let rect = self.selection.primary_rect();
        let block = ClipboardBlock::from_rect(&self.sheet, rect);
        let text = block.to_tsv();
        if !self.clipboard.set_text(text.clone()) {
            tracing::warn!(%rect, "clipboard rejected copied text");
        }
        tracing::debug!(%rect, "copied");
        self.copied = Some((text, block.clone()));
        block
    }

    /// Copy, then clear the primary rect.
    ///
    /// Records no undo entry unless `history.undoable_cut` is set.
    pub fn cut(&mut self) -> ClipboardBlock {
        let block = self.copy();
        let rect = self.selection.primary_rect();
        let changes: ChangeSet = self
            .sheet
            .defined_in(rect)
            .into_iter()
            .map(|address| (address, CellValue::Empty))
            .collect();
        if changes.is_empty() {
            return block;
        }
        if self.config.history.undoable_cut {
            let patch = Patch::range(self.selection.active_cell(), rect, changes.clone(), |a| {
                self.sheet.get_value(a)
            });
            self.history.push(patch);
        }
        self.commit_changes(changes);
        block
    }

    /// Current clipboard contents, if any.
    pub fn clipboard_text(&mut self) -> Option<String> {
        self.clipboard.get_text()
    }

    /// Paste whatever the clipboard holds at the active cell.
    pub fn paste(&mut self) -> Option<SelectionRect> {
        let Some(text) = self.clipboard.get_text() else {
            tracing::debug!("clipboard empty");
            return None;
        };
        let block = match &self.copied {
            Some((copied_text, block)) if *copied_text == text => block.clone(),
            _ => ClipboardBlock::parse_tsv(&text),
        };
        self.paste_block(&block)
    }

    /// Write `block` with its top-left at the active cell, clipped to the
    /// grid. Returns the written rect; `None` for an empty block.
    ///
    /// Only the anchor cell is recorded for undo unless
    /// `history.undoable_paste` is set.
    pub fn paste_block(&mut self, block: &ClipboardBlock) -> Option<SelectionRect> {
        if block.is_empty() {
            return None;
        }
        let anchor = self.selection.active_cell();
        let bounds = self.selection.bounds();
        let rect = SelectionRect {
            top: anchor.row,
            left: anchor.column,
            bottom: (anchor.row + block.height() - 1).min(bounds.row_count),
            right: (anchor.column + block.width() - 1).min(bounds.column_count),
        };
        let rows = block.rows();
        let changes: ChangeSet = rect
            .addresses()
            .map(|a| (a, rows[a.row - rect.top][a.column - rect.left].clone()))
            .collect();

        let patch = if self.config.history.undoable_paste {
            Patch::range(anchor, rect, changes.clone(), |a| self.sheet.get_value(a))
        } else {
            Patch::Cell {
                address: anchor,
                previous: self.sheet.get_value(anchor),
                new: changes.get(&anchor).cloned().unwrap_or_default(),
            }
        };
        self.history.push(patch);
        self.commit_changes(changes);

        if !rect.is_single_cell() {
            self.selection.set_selection(anchor, &[rect]);
        }
        tracing::debug!(%rect, "pasted");
        Some(rect)
    }
}
