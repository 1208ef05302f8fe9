//! cellgrid-formula - cell model, A1 addressing and formula evaluation.
//!
//! The interaction engine treats formula evaluation as an external, pull-based
//! collaborator. This crate provides the default one: formulas are rewritten
//! into Rhai scripts whose cell accessors read the shared [`Grid`] live.

pub mod builtins;
pub mod engine;
pub mod error;

pub use engine::{
    CellAddress, CellValue, FormulaEngine, Grid, column_letters, detect_cycle, detect_cycle_from,
    extract_dependencies, format_dynamic, format_number, new_grid, parse_range, preprocess_formula,
};
pub use error::FormulaError;
