use cellgrid_formula::{CellAddress, CellValue, FormulaEngine, format_number};

use crate::action::EngineMode;
use crate::clipboard::{ClipboardBlock, ClipboardProvider, MemoryClipboard};
use crate::config::GridConfig;
use crate::editable::EditableController;
use crate::history::UndoLog;
use crate::resolver::FormulaResolver;
use crate::selection::{GridBounds, Selection};
use crate::sheet::{ChangeHandler, ChangeSet, Sheet};
use crate::viewport::{Sizer, TextMeasurer, Viewport};

/// Interaction state for one sheet: selection, editor, undo log, layout
/// caches and the collaborators that read and write cells.
pub struct SheetEngine {
    pub(crate) sheet: Sheet,
    pub(crate) config: GridConfig,
    pub(crate) selection: Selection,
    pub(crate) editor: EditableController,
    pub(crate) history: UndoLog,
    pub(crate) viewport: Viewport,
    pub(crate) sizer: Sizer,
    pub(crate) clipboard: Box<dyn ClipboardProvider>,
    pub(crate) resolver: Box<dyn FormulaResolver>,
    pub(crate) on_change: ChangeHandler,
    /// Last block this engine copied, with the text it was written as.
    /// Pasting that same text reuses the block so values keep their type.
    pub(crate) copied: Option<(String, ClipboardBlock)>,
    /// Data cell under the pointer, until it leaves the grid.
    pub(crate) hovered: Option<CellAddress>,
}

impl SheetEngine {
    /// Engine with an in-memory clipboard, the Rhai formula resolver and a
    /// change handler that merges into the sheet's grid.
    pub fn new(sheet: Sheet, config: GridConfig) -> Self {
        let bounds = GridBounds::new(config.row_count, config.column_count);
        SheetEngine {
            selection: Selection::new(bounds),
            editor: EditableController::new(),
            history: UndoLog::with_limit(config.history.limit),
            viewport: Viewport::new(&config),
            sizer: Sizer::from_config(&config),
            clipboard: Box::new(MemoryClipboard::new()),
            resolver: Box::new(FormulaEngine::new(sheet.grid())),
            on_change: sheet.merge_handler(),
            copied: None,
            hovered: None,
            sheet,
            config,
        }
    }

    /// Replace the change handler. It must merge into this sheet's grid,
    /// which is what every later read sees.
    pub fn with_change_handler(mut self, handler: ChangeHandler) -> Self {
        self.on_change = handler;
        self
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardProvider>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_resolver(mut self, resolver: Box<dyn FormulaResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_measurer(mut self, measurer: Box<dyn TextMeasurer>) -> Self {
        self.sizer = self.sizer.with_measurer(measurer);
        self.viewport.invalidate_from(CellAddress::new(1, 1), true);
        self
    }

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn editor(&self) -> &EditableController {
        &self.editor
    }

    pub fn history(&self) -> &UndoLog {
        &self.history
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn hovered_cell(&self) -> Option<CellAddress> {
        self.hovered
    }

    pub fn active_cell(&self) -> CellAddress {
        self.selection.active_cell()
    }

    pub fn mode(&self) -> EngineMode {
        if self.editor.is_editing() {
            EngineMode::Edit
        } else {
            EngineMode::Navigate
        }
    }

    /// Live read of the stored value.
    pub fn get_value(&self, address: CellAddress) -> CellValue {
        self.sheet.get_value(address)
    }

    /// What a cell shows: formulas resolved, numbers formatted.
    pub fn display_value(&self, address: CellAddress) -> String {
        display_text(&self.sheet, self.resolver.as_ref(), address)
    }

    /// Hand a change set to the change handler and drop layout caches from
    /// its top-left corner. Empty sets are never delivered.
    pub(crate) fn commit_changes(&mut self, changes: ChangeSet) -> bool {
        let Some(bounds) = changes.bounds() else {
            return false;
        };
        (self.on_change)(self.sheet.name(), &changes);
        tracing::debug!(
            sheet = self.sheet.name(),
            cells = changes.len(),
            %bounds,
            "changes committed"
        );
        self.invalidate_from(bounds.top_left());
        true
    }

    pub(crate) fn invalidate_from(&mut self, address: CellAddress) {
        self.sizer.invalidate_from(address);
        self.viewport.invalidate_from(address, true);
    }
}

pub(crate) fn display_text(
    sheet: &Sheet,
    resolver: &dyn FormulaResolver,
    address: CellAddress,
) -> String {
    match sheet.get_value(address) {
        CellValue::Empty => String::new(),
        CellValue::Number(n) => format_number(n),
        CellValue::Text(text) => match text.strip_prefix('=') {
            Some(expression) => resolver.display(address, expression),
            None => text,
        },
    }
}
