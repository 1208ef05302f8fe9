//! Content-driven column widths and row heights.
//!
//! A column is as wide as the widest displayed text among the visible rows
//! (or a sample of them), never narrower than `min_column_width`. Row heights
//! stay at the default unless auto height is enabled. Header index 0 on each
//! axis has a fixed size.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::RangeInclusive;

use cellgrid_formula::CellAddress;

use super::ItemSizes;
use crate::config::GridConfig;

/// Which visible items are measured when sizing a column or row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeStrategy {
    /// Every visible item.
    #[default]
    Full,
    /// At most this many evenly spaced visible items.
    Sampled(usize),
}

impl ResizeStrategy {
    /// Indices of `range` that get measured.
    pub fn sample(self, range: RangeInclusive<usize>) -> Vec<usize> {
        let (start, end) = (*range.start(), *range.end());
        if start > end {
            return Vec::new();
        }
        let len = end - start + 1;
        match self {
            ResizeStrategy::Sampled(n) if n < len => match n {
                0 => Vec::new(),
                1 => vec![start],
                n => (0..n).map(|i| start + i * (len - 1) / (n - 1)).collect(),
            },
            _ => range.collect(),
        }
    }
}

/// Measures rendered text.
pub trait TextMeasurer {
    fn text_width(&self, text: &str) -> f32;
    fn line_height(&self) -> f32;
}

/// Fixed advance per character, one line per `\n`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMeasurer {
    pub char_width: f32,
    pub line_height: f32,
}

impl TextMeasurer for MonospaceMeasurer {
    fn text_width(&self, text: &str) -> f32 {
        text.lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0) as f32
            * self.char_width
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }
}

pub struct Sizer {
    strategy: ResizeStrategy,
    header_column_width: f32,
    header_row_height: f32,
    min_column_width: f32,
    default_row_height: f32,
    cell_padding: f32,
    auto_row_height: bool,
    measurer: Box<dyn TextMeasurer>,
    column_widths: HashMap<usize, f32>,
    row_heights: HashMap<usize, f32>,
    visible_rows: RangeInclusive<usize>,
    visible_columns: RangeInclusive<usize>,
}

impl Sizer {
    pub fn from_config(config: &GridConfig) -> Self {
        let layout = &config.layout;
        let sizing = &config.sizing;
        // Until the first layout pass, assume the top-left screenful.
        let rows = (layout.viewport_height / layout.default_row_height).ceil() as usize;
        let columns = (layout.viewport_width / layout.default_column_width).ceil() as usize;
        Sizer {
            strategy: sizing.strategy,
            header_column_width: layout.header_column_width,
            header_row_height: layout.header_row_height,
            min_column_width: sizing.min_column_width,
            default_row_height: layout.default_row_height,
            cell_padding: sizing.cell_padding,
            auto_row_height: sizing.auto_row_height,
            measurer: Box::new(MonospaceMeasurer {
                char_width: sizing.char_width,
                line_height: sizing.line_height,
            }),
            column_widths: HashMap::new(),
            row_heights: HashMap::new(),
            visible_rows: 1..=rows.clamp(1, config.row_count),
            visible_columns: 1..=columns.clamp(1, config.column_count),
        }
    }

    pub fn with_measurer(mut self, measurer: Box<dyn TextMeasurer>) -> Self {
        self.measurer = measurer;
        self.invalidate_all();
        self
    }

    pub fn strategy(&self) -> ResizeStrategy {
        self.strategy
    }

    pub fn visible_rows(&self) -> RangeInclusive<usize> {
        self.visible_rows.clone()
    }

    pub fn visible_columns(&self) -> RangeInclusive<usize> {
        self.visible_columns.clone()
    }

    /// Record which data rows and columns are on screen. Widths depend on the
    /// visible rows and heights on the visible columns, so a change drops the
    /// dependent cache. Returns `(widths_dropped, heights_dropped)`.
    pub fn set_visible_range(
        &mut self,
        rows: RangeInclusive<usize>,
        columns: RangeInclusive<usize>,
    ) -> (bool, bool) {
        let widths_dropped = rows != self.visible_rows;
        let heights_dropped = columns != self.visible_columns && self.auto_row_height;
        if widths_dropped {
            self.visible_rows = rows;
            self.column_widths.clear();
        }
        if columns != self.visible_columns {
            self.visible_columns = columns;
            if self.auto_row_height {
                self.row_heights.clear();
            }
        }
        (widths_dropped, heights_dropped)
    }

    pub fn column_width(&mut self, column: usize, text: &dyn Fn(CellAddress) -> String) -> f32 {
        if column == 0 {
            return self.header_column_width;
        }
        if let Some(width) = self.column_widths.get(&column) {
            return *width;
        }
        let widest = self
            .strategy
            .sample(self.visible_rows.clone())
            .into_iter()
            .map(|row| self.measurer.text_width(&text(CellAddress::new(row, column))))
            .fold(0.0, f32::max);
        let width = (widest + self.cell_padding).max(self.min_column_width);
        self.column_widths.insert(column, width);
        width
    }

    pub fn row_height(&mut self, row: usize, text: &dyn Fn(CellAddress) -> String) -> f32 {
        if row == 0 {
            return self.header_row_height;
        }
        if !self.auto_row_height {
            return self.default_row_height;
        }
        if let Some(height) = self.row_heights.get(&row) {
            return *height;
        }
        let lines = self
            .strategy
            .sample(self.visible_columns.clone())
            .into_iter()
            .map(|column| text(CellAddress::new(row, column)).lines().count())
            .max()
            .unwrap_or(1)
            .max(1);
        let height = (lines as f32 * self.measurer.line_height() + self.cell_padding)
            .max(self.default_row_height);
        self.row_heights.insert(row, height);
        height
    }

    /// Drop cached sizes for the address's row and column and everything after.
    pub fn invalidate_from(&mut self, address: CellAddress) {
        self.column_widths.retain(|column, _| *column < address.column);
        self.row_heights.retain(|row, _| *row < address.row);
    }

    pub fn invalidate_all(&mut self) {
        self.column_widths.clear();
        self.row_heights.clear();
    }

    /// Borrow the sizer together with a display-text source.
    pub fn measure<'a>(&'a mut self, text: &'a dyn Fn(CellAddress) -> String) -> MeasuredSizes<'a> {
        MeasuredSizes { sizer: self, text }
    }
}

/// [`ItemSizes`] backed by a [`Sizer`] and the displayed text of cells.
pub struct MeasuredSizes<'a> {
    sizer: &'a mut Sizer,
    text: &'a dyn Fn(CellAddress) -> String,
}

impl ItemSizes for MeasuredSizes<'_> {
    fn column_width(&mut self, column: usize) -> f32 {
        self.sizer.column_width(column, self.text)
    }

    fn row_height(&mut self, row: usize) -> f32 {
        self.sizer.row_height(row, self.text)
    }
}
