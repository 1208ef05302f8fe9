use cellgrid_formula::CellAddress;

use super::SheetEngine;
use super::state::display_text;
use crate::viewport::{CellRect, ItemSizes, Viewport, VisibleRange};

impl SheetEngine {
    /// Run a layout query with sizes measured from displayed text.
    pub(super) fn with_layout<R>(
        &mut self,
        f: impl FnOnce(&mut Viewport, &mut dyn ItemSizes) -> R,
    ) -> R {
        let sheet = &self.sheet;
        let resolver = self.resolver.as_ref();
        let text = |address: CellAddress| display_text(sheet, resolver, address);
        let mut sizes = self.sizer.measure(&text);
        f(&mut self.viewport, &mut sizes)
    }

    /// Current visible range, re-measuring when it moved.
    ///
    /// Widths depend on the visible rows and heights on the visible columns,
    /// so a moved range drops those sizes and the range is computed again.
    /// Two passes settle it in practice.
    pub fn visible_range(&mut self) -> VisibleRange {
        let mut range = self.with_layout(|viewport, sizes| viewport.visible_range(sizes));
        for _ in 0..2 {
            let (widths, heights) = self
                .sizer
                .set_visible_range(range.rows.clone(), range.columns.clone());
            if !widths && !heights {
                break;
            }
            if widths {
                self.viewport.invalidate_columns_from(1);
            }
            if heights {
                self.viewport.invalidate_rows_from(1);
            }
            range = self.with_layout(|viewport, sizes| viewport.visible_range(sizes));
        }
        tracing::trace!(?range, "visible range");
        range
    }

    pub fn resolve_address(&mut self, x: f32, y: f32) -> CellAddress {
        self.visible_range();
        self.with_layout(|viewport, sizes| viewport.resolve_address(x, y, sizes))
    }

    /// Screen rectangle of a cell, for placing an editor overlay.
    pub fn cell_rect(&mut self, address: CellAddress) -> CellRect {
        self.visible_range();
        self.with_layout(|viewport, sizes| viewport.cell_rect(address, sizes))
    }

    pub fn column_width(&mut self, column: usize) -> f32 {
        self.visible_range();
        self.with_layout(|_, sizes| sizes.column_width(column))
    }

    pub fn row_height(&mut self, row: usize) -> f32 {
        self.visible_range();
        self.with_layout(|_, sizes| sizes.row_height(row))
    }

    pub fn scroll_to(&mut self, x: f32, y: f32) -> VisibleRange {
        self.viewport.scroll_to(x, y);
        self.visible_range()
    }

    pub fn scroll_by(&mut self, dx: f32, dy: f32) -> VisibleRange {
        self.viewport.scroll_by(dx, dy);
        self.visible_range()
    }

    pub fn resize(&mut self, width: f32, height: f32) -> VisibleRange {
        self.viewport.set_size(width, height);
        self.visible_range()
    }

    pub fn scroll_into_view(&mut self, address: CellAddress) -> bool {
        let moved = self.with_layout(|viewport, sizes| viewport.scroll_into_view(address, sizes));
        if moved {
            self.visible_range();
        }
        moved
    }

    /// Whether the host should re-render; clears the request.
    pub fn take_relayout_request(&mut self) -> bool {
        self.viewport.take_relayout_request()
    }

    /// Rows moved by page up/down: the visible rows without overscan.
    pub(crate) fn page_rows(&mut self) -> usize {
        let range = self.visible_range();
        let visible = range.rows.end().saturating_sub(*range.rows.start()) + 1;
        visible
            .saturating_sub(2 * self.config.layout.overscan)
            .max(1)
    }
}
