//! Virtualized layout: maps scroll position and pointer coordinates onto
//! logical cells.
//!
//! Both axes share one index space. Index 0 is the header row/column and data
//! lives at `1..=count`. The first `frozen_rows` rows and `frozen_columns`
//! columns (counting the headers) stay pinned while the rest scrolls.
//! Positions are in pixels relative to the grid origin.

pub mod offsets;
pub mod sizer;

use std::ops::RangeInclusive;

use cellgrid_formula::{CellAddress, column_letters};

use crate::config::GridConfig;
use crate::selection::GridBounds;

pub use offsets::OffsetCache;
pub use sizer::{MeasuredSizes, MonospaceMeasurer, ResizeStrategy, Sizer, TextMeasurer};

/// Size source for layout queries.
pub trait ItemSizes {
    fn column_width(&mut self, column: usize) -> f32;
    fn row_height(&mut self, row: usize) -> f32;
}

/// Screen rectangle of a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CellRect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Data rows and columns of the scrolling area that need rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibleRange {
    pub rows: RangeInclusive<usize>,
    pub columns: RangeInclusive<usize>,
}

/// What sits at an index-space position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Corner,
    ColumnHeader { column: usize },
    RowHeader { row: usize },
    Data(CellAddress),
}

impl CellKind {
    pub fn at(row: usize, column: usize) -> Self {
        match (row, column) {
            (0, 0) => CellKind::Corner,
            (0, column) => CellKind::ColumnHeader { column },
            (row, 0) => CellKind::RowHeader { row },
            (row, column) => CellKind::Data(CellAddress::new(row, column)),
        }
    }

    pub fn is_header(&self) -> bool {
        !matches!(self, CellKind::Data(_))
    }

    /// `"C"` for column 3, `"7"` for row 7.
    pub fn header_label(&self) -> Option<String> {
        match self {
            CellKind::ColumnHeader { column } => Some(column_letters(*column)),
            CellKind::RowHeader { row } => Some(row.to_string()),
            CellKind::Corner | CellKind::Data(_) => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Viewport {
    bounds: GridBounds,
    rows: OffsetCache,
    columns: OffsetCache,
    frozen_rows: usize,
    frozen_columns: usize,
    overscan: usize,
    width: f32,
    height: f32,
    scroll_x: f32,
    scroll_y: f32,
    relayout_requested: bool,
}

impl Viewport {
    pub fn new(config: &GridConfig) -> Self {
        let layout = &config.layout;
        Viewport {
            bounds: GridBounds::new(config.row_count, config.column_count),
            rows: OffsetCache::new(config.row_count + 1, layout.default_row_height),
            columns: OffsetCache::new(config.column_count + 1, layout.default_column_width),
            frozen_rows: config.frozen_rows,
            frozen_columns: config.frozen_columns,
            overscan: layout.overscan,
            width: layout.viewport_width,
            height: layout.viewport_height,
            scroll_x: 0.0,
            scroll_y: 0.0,
            relayout_requested: false,
        }
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn scroll(&self) -> (f32, f32) {
        (self.scroll_x, self.scroll_y)
    }

    pub fn frozen(&self) -> (usize, usize) {
        (self.frozen_rows, self.frozen_columns)
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.scroll_x = self.scroll_x.min(self.max_scroll_x());
        self.scroll_y = self.scroll_y.min(self.max_scroll_y());
    }

    fn max_scroll_x(&self) -> f32 {
        (self.columns.total_size() - self.width).max(0.0)
    }

    fn max_scroll_y(&self) -> f32 {
        (self.rows.total_size() - self.height).max(0.0)
    }

    /// Scroll to `(x, y)`, clamped to `[0, total - viewport]` on each axis.
    pub fn scroll_to(&mut self, x: f32, y: f32) {
        self.scroll_x = x.clamp(0.0, self.max_scroll_x());
        self.scroll_y = y.clamp(0.0, self.max_scroll_y());
    }

    pub fn scroll_by(&mut self, dx: f32, dy: f32) {
        self.scroll_to(self.scroll_x + dx, self.scroll_y + dy);
    }

    /// Pointer position to the data cell under it, clamped into the grid.
    pub fn resolve_address(&mut self, x: f32, y: f32, sizes: &mut dyn ItemSizes) -> CellAddress {
        let row = locate(&mut self.rows, y, self.frozen_rows, self.scroll_y, |r| {
            sizes.row_height(r)
        });
        let column = locate(&mut self.columns, x, self.frozen_columns, self.scroll_x, |c| {
            sizes.column_width(c)
        });
        self.bounds.clamp(CellAddress::new(row, column))
    }

    /// What lies under `(x, y)`. Unlike [`Viewport::resolve_address`],
    /// headers are reported as headers; data cells are still clamped.
    pub fn kind_at(&mut self, x: f32, y: f32, sizes: &mut dyn ItemSizes) -> CellKind {
        let row = locate(&mut self.rows, y, self.frozen_rows, self.scroll_y, |r| {
            sizes.row_height(r)
        });
        let column = locate(&mut self.columns, x, self.frozen_columns, self.scroll_x, |c| {
            sizes.column_width(c)
        });
        match CellKind::at(row, column) {
            CellKind::Data(address) => CellKind::Data(self.bounds.clamp(address)),
            header => header,
        }
    }

    pub fn visible_range(&mut self, sizes: &mut dyn ItemSizes) -> VisibleRange {
        let rows = visible_on_axis(
            &mut self.rows,
            self.frozen_rows,
            self.scroll_y,
            self.height,
            self.overscan,
            |r| sizes.row_height(r),
        );
        let columns = visible_on_axis(
            &mut self.columns,
            self.frozen_columns,
            self.scroll_x,
            self.width,
            self.overscan,
            |c| sizes.column_width(c),
        );
        VisibleRange { rows, columns }
    }

    pub fn cell_rect(&mut self, address: CellAddress, sizes: &mut dyn ItemSizes) -> CellRect {
        let mut row_height = |r| sizes.row_height(r);
        let y = self.rows.offset_of(address.row, &mut row_height);
        let height = self.rows.size_of(address.row, &mut row_height);
        let mut column_width = |c| sizes.column_width(c);
        let x = self.columns.offset_of(address.column, &mut column_width);
        let width = self.columns.size_of(address.column, &mut column_width);
        CellRect {
            x: if address.column >= self.frozen_columns { x - self.scroll_x } else { x },
            y: if address.row >= self.frozen_rows { y - self.scroll_y } else { y },
            width,
            height,
        }
    }

    /// Scroll the minimum needed to show a non-frozen cell in full. Returns
    /// whether the scroll position changed.
    pub fn scroll_into_view(&mut self, address: CellAddress, sizes: &mut dyn ItemSizes) -> bool {
        let before = self.scroll();
        reveal(
            &mut self.rows,
            address.row,
            self.frozen_rows,
            &mut self.scroll_y,
            self.height,
            |r| sizes.row_height(r),
        );
        reveal(
            &mut self.columns,
            address.column,
            self.frozen_columns,
            &mut self.scroll_x,
            self.width,
            |c| sizes.column_width(c),
        );
        before != self.scroll()
    }

    /// Forget offsets at and after the address's row and column.
    pub fn invalidate_from(&mut self, address: CellAddress, force_relayout: bool) {
        self.rows.invalidate_from(address.row);
        self.columns.invalidate_from(address.column);
        if force_relayout {
            self.relayout_requested = true;
        }
        tracing::trace!(%address, force_relayout, "viewport offsets invalidated");
    }

    pub fn invalidate_rows_from(&mut self, row: usize) {
        self.rows.invalidate_from(row);
    }

    pub fn invalidate_columns_from(&mut self, column: usize) {
        self.columns.invalidate_from(column);
    }

    pub fn relayout_requested(&self) -> bool {
        self.relayout_requested
    }

    /// Read and clear the relayout flag.
    pub fn take_relayout_request(&mut self) -> bool {
        std::mem::take(&mut self.relayout_requested)
    }
}

fn locate(
    cache: &mut OffsetCache,
    position: f32,
    frozen: usize,
    scroll: f32,
    mut size_of: impl FnMut(usize) -> f32,
) -> usize {
    let frozen_extent = cache.offset_of(frozen, &mut size_of);
    let content = if position < frozen_extent { position } else { position + scroll };
    cache.index_at(content, &mut size_of)
}

fn visible_on_axis(
    cache: &mut OffsetCache,
    frozen: usize,
    scroll: f32,
    extent: f32,
    overscan: usize,
    mut size_of: impl FnMut(usize) -> f32,
) -> RangeInclusive<usize> {
    let last = cache.count().saturating_sub(1).max(1);
    let frozen_extent = cache.offset_of(frozen, &mut size_of);
    let first = cache.index_at(frozen_extent + scroll, &mut size_of);
    let end = (cache.index_at(scroll + extent, &mut size_of) + overscan).min(last);
    let start = first.saturating_sub(overscan).max(frozen).max(1).min(end);
    start..=end
}

fn reveal(
    cache: &mut OffsetCache,
    index: usize,
    frozen: usize,
    scroll: &mut f32,
    extent: f32,
    mut size_of: impl FnMut(usize) -> f32,
) {
    if index < frozen {
        return;
    }
    let frozen_extent = cache.offset_of(frozen, &mut size_of);
    let start = cache.offset_of(index, &mut size_of);
    let end = start + cache.size_of(index, &mut size_of);
    if start - *scroll < frozen_extent {
        *scroll = start - frozen_extent;
    } else if end - *scroll > extent {
        *scroll = (end - extent).min(start - frozen_extent);
    }
    *scroll = scroll.max(0.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl ItemSizes for Fixed {
        fn column_width(&mut self, column: usize) -> f32 {
            if column == 0 { 46.0 } else { 100.0 }
        }

        fn row_height(&mut self, _row: usize) -> f32 {
            22.0
        }
    }

    fn a1(name: &str) -> CellAddress {
        CellAddress::from_a1(name).unwrap()
    }

    fn viewport() -> Viewport {
        Viewport::new(&GridConfig::default())
    }

    #[test]
    fn resolves_pointer_to_cell() {
        let mut vp = viewport();
        assert_eq!(vp.resolve_address(196.0, 52.0, &mut Fixed), a1("B2"));
        assert_eq!(vp.resolve_address(146.0, 44.0, &mut Fixed), a1("B2"));
        assert_eq!(vp.resolve_address(145.9, 43.9, &mut Fixed), a1("A1"));
    }

    #[test]
    fn header_and_far_positions_clamp_into_grid() {
        let mut vp = viewport();
        assert_eq!(vp.resolve_address(10.0, 10.0, &mut Fixed), a1("A1"));
        assert_eq!(vp.resolve_address(1.0e7, 1.0e7, &mut Fixed), a1("ALL1000"));
    }

    #[test]
    fn kind_at_reports_headers() {
        let mut vp = viewport();
        assert_eq!(vp.kind_at(10.0, 10.0, &mut Fixed), CellKind::Corner);
        assert_eq!(
            vp.kind_at(200.0, 10.0, &mut Fixed),
            CellKind::ColumnHeader { column: 2 }
        );
        assert_eq!(vp.kind_at(10.0, 50.0, &mut Fixed), CellKind::RowHeader { row: 2 });
        assert_eq!(vp.kind_at(196.0, 52.0, &mut Fixed), CellKind::Data(a1("B2")));
    }

    #[test]
    fn scrolled_positions_skip_frozen_header() {
        let mut vp = viewport();
        vp.scroll_to(0.0, 220.0);
        assert_eq!(vp.resolve_address(50.0, 30.0, &mut Fixed), a1("A11"));
        assert_eq!(vp.resolve_address(50.0, 10.0, &mut Fixed), a1("A1"));
    }

    #[test]
    fn scroll_is_clamped() {
        let mut vp = viewport();
        vp.scroll_to(-5.0, 1.0e9);
        assert_eq!(vp.scroll(), (0.0, 1001.0 * 22.0 - 600.0));
    }

    #[test]
    fn visible_range_includes_overscan() {
        let mut vp = viewport();
        let range = vp.visible_range(&mut Fixed);
        assert_eq!(range.rows, 1..=29);
        assert_eq!(range.columns, 1..=10);

        vp.scroll_to(0.0, 220.0);
        let range = vp.visible_range(&mut Fixed);
        assert_eq!(*range.rows.start(), 9);
    }

    #[test]
    fn scroll_into_view_moves_minimally() {
        let mut vp = viewport();
        assert!(vp.scroll_into_view(a1("A40"), &mut Fixed));
        assert_eq!(vp.scroll().1, 902.0 - 600.0);
        assert!(vp.scroll_into_view(a1("A5"), &mut Fixed));
        assert_eq!(vp.scroll().1, 110.0 - 22.0);
        assert!(!vp.scroll_into_view(a1("A6"), &mut Fixed));
    }

    #[test]
    fn cell_rect_follows_scroll() {
        let mut vp = viewport();
        let rect = vp.cell_rect(a1("B2"), &mut Fixed);
        assert_eq!(
            rect,
            CellRect {
                x: 146.0,
                y: 44.0,
                width: 100.0,
                height: 22.0
            }
        );
        vp.scroll_to(50.0, 0.0);
        assert_eq!(vp.cell_rect(a1("B2"), &mut Fixed).x, 96.0);
        assert!(vp.cell_rect(a1("B2"), &mut Fixed).contains(100.0, 50.0));
    }

    #[test]
    fn invalidation_raises_relayout_request() {
        let mut vp = viewport();
        vp.invalidate_from(a1("C3"), false);
        assert!(!vp.take_relayout_request());
        vp.invalidate_from(a1("C3"), true);
        assert!(vp.take_relayout_request());
        assert!(!vp.relayout_requested());
    }

    #[test]
    fn cell_kind_by_position() {
        assert_eq!(CellKind::at(0, 0), CellKind::Corner);
        assert_eq!(CellKind::at(0, 3).header_label().as_deref(), Some("C"));
        assert_eq!(CellKind::at(7, 0).header_label().as_deref(), Some("7"));
        assert_eq!(CellKind::at(2, 2), CellKind::Data(a1("B2")));
        assert!(!CellKind::at(2, 2).is_header());
    }
}
