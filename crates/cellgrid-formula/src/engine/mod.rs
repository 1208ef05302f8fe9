//! Formula engine API.
//!
//! - [`CellValue`], [`Grid`] - cell contents and the shared sparse storage
//! - [`CellAddress`] - 1-based addresses with A1 parsing and formatting
//! - [`detect_cycle`] - circular reference detection
//! - [`extract_dependencies`] - references named by a formula
//! - [`preprocess_formula`] - rewrite spreadsheet syntax into Rhai
//! - [`FormulaEngine`] - the Rhai engine with built-ins registered
//! - [`format_dynamic`] - format values for display

mod cell;
mod cell_ref;
mod cycle;
mod deps;
mod eval;
mod format;
mod preprocess;

pub use cell::{CellValue, Grid, new_grid};
pub use cell_ref::{CellAddress, column_letters};
pub use cycle::{detect_cycle, detect_cycle_from};
pub use deps::{MAX_RANGE_CELLS, extract_dependencies, parse_range};
pub use eval::FormulaEngine;
pub use format::{format_dynamic, format_number};
pub use preprocess::preprocess_formula;

pub use rhai::Dynamic;
