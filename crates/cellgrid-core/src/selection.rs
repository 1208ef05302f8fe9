//! Selection state: active cell, selection rectangles and drag drafts.
//!
//! Invariants kept by every operation:
//! - rects are normalized and clamped to the grid, never zero-area
//! - the active cell lies inside some rect (committed or draft)
//! - the last rect is the one extended by drag, shift-click or shift-arrows

use serde::{Deserialize, Serialize};
use std::fmt;

use cellgrid_formula::CellAddress;

/// An inclusive rectangle of cells, `top <= bottom` and `left <= right`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionRect {
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
}

impl SelectionRect {
    pub fn cell(address: CellAddress) -> Self {
        SelectionRect {
            top: address.row,
            left: address.column,
            bottom: address.row,
            right: address.column,
        }
    }

    /// Normalized rectangle with `a` and `b` as opposite corners.
    pub fn spanning(a: CellAddress, b: CellAddress) -> Self {
        SelectionRect {
            top: a.row.min(b.row),
            left: a.column.min(b.column),
            bottom: a.row.max(b.row),
            right: a.column.max(b.column),
        }
    }

    pub fn top_left(&self) -> CellAddress {
        CellAddress::new(self.top, self.left)
    }

    pub fn bottom_right(&self) -> CellAddress {
        CellAddress::new(self.bottom, self.right)
    }

    pub fn rows(&self) -> usize {
        self.bottom - self.top + 1
    }

    pub fn columns(&self) -> usize {
        self.right - self.left + 1
    }

    pub fn area(&self) -> usize {
        self.rows().saturating_mul(self.columns())
    }

    pub fn is_single_cell(&self) -> bool {
        self.top == self.bottom && self.left == self.right
    }

    pub fn contains(&self, address: CellAddress) -> bool {
        (self.top..=self.bottom).contains(&address.row)
            && (self.left..=self.right).contains(&address.column)
    }

    pub fn union(&self, other: &SelectionRect) -> Self {
        SelectionRect {
            top: self.top.min(other.top),
            left: self.left.min(other.left),
            bottom: self.bottom.max(other.bottom),
            right: self.right.max(other.right),
        }
    }

    pub fn clamped(&self, bounds: GridBounds) -> Self {
        SelectionRect::spanning(
            bounds.clamp(self.top_left()),
            bounds.clamp(self.bottom_right()),
        )
    }

    /// Every address, row-major.
    pub fn addresses(&self) -> impl Iterator<Item = CellAddress> + use<> {
        let (top, bottom, left, right) = (self.top, self.bottom, self.left, self.right);
        (top..=bottom).flat_map(move |row| (left..=right).map(move |col| CellAddress::new(row, col)))
    }
}

impl fmt::Display for SelectionRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.top_left())
        } else {
            write!(f, "{}:{}", self.top_left(), self.bottom_right())
        }
    }
}

impl std::str::FromStr for SelectionRect {
    type Err = String;

    /// `A1` or `A1:C3`, corners in any order.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((a, b)) => Ok(SelectionRect::spanning(a.parse()?, b.parse()?)),
            None => Ok(SelectionRect::cell(s.parse()?)),
        }
    }
}

/// Logical grid extents; data addresses are `[1, row_count] × [1, column_count]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridBounds {
    pub row_count: usize,
    pub column_count: usize,
}

impl GridBounds {
    pub fn new(row_count: usize, column_count: usize) -> Self {
        GridBounds {
            row_count: row_count.max(1),
            column_count: column_count.max(1),
        }
    }

    pub fn clamp(&self, address: CellAddress) -> CellAddress {
        CellAddress::new(
            address.row.clamp(1, self.row_count),
            address.column.clamp(1, self.column_count),
        )
    }

    pub fn contains(&self, address: CellAddress) -> bool {
        (1..=self.row_count).contains(&address.row)
            && (1..=self.column_count).contains(&address.column)
    }

    pub fn full(&self) -> SelectionRect {
        SelectionRect {
            top: 1,
            left: 1,
            bottom: self.row_count,
            right: self.column_count,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// (row delta, column delta)
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

/// Per-sheet selection state.
#[derive(Clone, Debug)]
pub struct Selection {
    bounds: GridBounds,
    active_cell: CellAddress,
    /// Far corner of the last rect; keyboard extension moves it.
    extent: CellAddress,
    rects: Vec<SelectionRect>,
    /// Rect being drawn by a modifier drag, appended on release.
    draft: Option<SelectionRect>,
    dragging: bool,
    fill_draft: Option<SelectionRect>,
    filling: bool,
}

impl Selection {
    pub fn new(bounds: GridBounds) -> Self {
        let origin = CellAddress::new(1, 1);
        Selection {
            bounds,
            active_cell: origin,
            extent: origin,
            rects: vec![SelectionRect::cell(origin)],
            draft: None,
            dragging: false,
            fill_draft: None,
            filling: false,
        }
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn active_cell(&self) -> CellAddress {
        self.active_cell
    }

    /// Committed rects, in creation order.
    pub fn rects(&self) -> &[SelectionRect] {
        &self.rects
    }

    pub fn draft(&self) -> Option<SelectionRect> {
        self.draft
    }

    /// Committed rects followed by the draft, if any.
    pub fn all_rects(&self) -> impl Iterator<Item = SelectionRect> + '_ {
        self.rects.iter().copied().chain(self.draft)
    }

    /// The rect copy and cut operate on.
    pub fn primary_rect(&self) -> SelectionRect {
        self.rects
            .first()
            .copied()
            .or(self.draft)
            .unwrap_or_else(|| SelectionRect::cell(self.active_cell))
    }

    pub fn last_rect(&self) -> SelectionRect {
        self.draft
            .or_else(|| self.rects.last().copied())
            .unwrap_or_else(|| SelectionRect::cell(self.active_cell))
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_filling(&self) -> bool {
        self.filling
    }

    pub fn fill_draft(&self) -> Option<SelectionRect> {
        self.fill_draft
    }

    pub fn contains(&self, address: CellAddress) -> bool {
        self.all_rects().any(|rect| rect.contains(address))
    }

    /// Whether a row header should render as selected.
    pub fn is_row_highlighted(&self, row: usize) -> bool {
        self.active_cell.row == row || self.all_rects().any(|r| (r.top..=r.bottom).contains(&row))
    }

    /// Whether a column header should render as selected.
    pub fn is_column_highlighted(&self, column: usize) -> bool {
        self.active_cell.column == column
            || self.all_rects().any(|r| (r.left..=r.right).contains(&column))
    }

    /// Pointer press without modifiers: a fresh single-cell selection.
    pub fn begin_selection(&mut self, address: CellAddress) {
        self.set_active_cell(address);
        self.dragging = true;
    }

    /// Grow the last rect (or the draft) to span from the active cell to
    /// `address`. The active cell does not move.
    pub fn extend_selection(&mut self, address: CellAddress) {
        let address = self.bounds.clamp(address);
        self.extent = address;
        let rect = SelectionRect::spanning(self.active_cell, address);
        if self.draft.is_some() {
            self.draft = Some(rect);
        } else if let Some(last) = self.rects.last_mut() {
            *last = rect;
        } else {
            self.rects.push(rect);
        }
    }

    /// Modifier press: start another rect, kept as a draft until release.
    pub fn add_disjoint_selection(&mut self, address: CellAddress) {
        if let Some(draft) = self.draft.take() {
            self.rects.push(draft);
        }
        let address = self.bounds.clamp(address);
        self.active_cell = address;
        self.extent = address;
        self.draft = Some(SelectionRect::cell(address));
        self.dragging = true;
    }

    /// Pointer release: the draft joins the committed rects.
    pub fn end_selection(&mut self) {
        self.dragging = false;
        if let Some(draft) = self.draft.take() {
            self.rects.push(draft);
        }
    }

    /// One step in `direction`, clamped at the grid edge.
    pub fn move_active_cell(&mut self, direction: Direction, extend: bool) {
        let (rows, columns) = direction.delta();
        self.move_by(rows, columns, extend);
    }

    pub fn move_by(&mut self, rows: isize, columns: isize, extend: bool) {
        let GridBounds {
            row_count,
            column_count,
        } = self.bounds;
        if extend {
            let target = self.extent.offset(rows, columns, row_count, column_count);
            self.extend_selection(target);
        } else {
            let target = self
                .active_cell
                .offset(rows, columns, row_count, column_count);
            self.set_active_cell(target);
        }
    }

    /// Jump to an address, extending the last rect when `extend` is set.
    pub fn move_to(&mut self, address: CellAddress, extend: bool) {
        if extend {
            self.extend_selection(address);
        } else {
            self.set_active_cell(address);
        }
    }

    /// Where keyboard extension currently points.
    pub fn extent(&self) -> CellAddress {
        self.extent
    }

    pub fn select_all(&mut self) {
        let full = self.bounds.full();
        self.rects = vec![full];
        self.draft = None;
        self.active_cell = self.bounds.clamp(self.active_cell);
        self.extent = full.bottom_right();
    }

    /// Collapse the selection onto a single cell.
    pub fn set_active_cell(&mut self, address: CellAddress) {
        let address = self.bounds.clamp(address);
        self.active_cell = address;
        self.extent = address;
        self.rects = vec![SelectionRect::cell(address)];
        self.draft = None;
    }

    /// Replace the selection. The active cell gets its own rect when no
    /// given rect contains it.
    pub fn set_selection(&mut self, active: CellAddress, rects: &[SelectionRect]) {
        let active = self.bounds.clamp(active);
        let mut rects: Vec<SelectionRect> = rects.iter().map(|r| r.clamped(self.bounds)).collect();
        if !rects.iter().any(|r| r.contains(active)) {
            rects.push(SelectionRect::cell(active));
        }
        self.extent = match rects.last() {
            Some(last) if last.top_left() == active => last.bottom_right(),
            Some(last) if last.bottom_right() == active => last.top_left(),
            _ => active,
        };
        self.active_cell = active;
        self.rects = rects;
        self.draft = None;
    }

    /// Start a fill-handle drag.
    pub fn begin_fill(&mut self) {
        self.filling = true;
        self.fill_draft = None;
    }

    /// Fill draft = bounding rect of the last rect and the pointer cell.
    pub fn update_fill(&mut self, address: CellAddress) {
        if !self.filling {
            return;
        }
        let address = self.bounds.clamp(address);
        self.fill_draft = Some(self.last_rect().union(&SelectionRect::cell(address)));
    }

    /// Finish a fill drag. Returns the target when it grew past the selection.
    pub fn end_fill(&mut self) -> Option<SelectionRect> {
        self.filling = false;
        let draft = self.fill_draft.take()?;
        (draft != self.last_rect()).then_some(draft)
    }

    pub fn cancel_fill(&mut self) {
        self.filling = false;
        self.fill_draft = None;
    }
}
