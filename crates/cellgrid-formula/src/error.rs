//! Formula evaluation errors.

use thiserror::Error;

use crate::engine::CellAddress;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("Circular reference through {at}")]
    Cycle { at: CellAddress },

    #[error("Formula error: {0}")]
    Eval(String),
}

impl FormulaError {
    /// The marker shown in place of the cell's value.
    pub fn marker(&self) -> &'static str {
        match self {
            FormulaError::Cycle { .. } => "#CYCLE!",
            FormulaError::Eval(_) => "#ERR!",
        }
    }
}
