//! Formula resolution seam.
//!
//! The engine stores formulas verbatim and only asks a resolver for display
//! values. Hosts with their own calculation engine implement
//! [`FormulaResolver`]; the default is the Rhai-backed [`FormulaEngine`].

use cellgrid_formula::{CellAddress, CellValue, FormulaEngine, FormulaError};

pub trait FormulaResolver {
    /// Evaluate `expression` (no leading `=`) stored at `address`.
    fn resolve(&self, address: CellAddress, expression: &str) -> Result<CellValue, FormulaError>;

    /// Text shown for the formula cell; error markers on failure.
    fn display(&self, address: CellAddress, expression: &str) -> String {
        match self.resolve(address, expression) {
            Ok(value) => value.to_string(),
            Err(err) => err.marker().to_string(),
        }
    }
}

impl FormulaResolver for FormulaEngine {
    fn resolve(&self, address: CellAddress, expression: &str) -> Result<CellValue, FormulaError> {
        self.evaluate_value(Some(address), expression)
    }

    fn display(&self, address: CellAddress, expression: &str) -> String {
        FormulaEngine::display(self, Some(address), expression)
    }
}
