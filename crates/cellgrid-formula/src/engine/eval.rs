//! Rhai engine creation and formula evaluation.
//!
//! [`FormulaEngine`] owns a Rhai engine whose built-ins read the shared
//! [`Grid`]. Evaluation is pull-based: nothing is cached, every call reads
//! the cells it references at that moment.

use rhai::Engine;

use super::cycle::detect_cycle_from;
use super::format::format_dynamic;
use super::preprocess::preprocess_formula;
use super::{CellAddress, CellValue, Dynamic, Grid};
use crate::error::FormulaError;

/// Evaluates formula expressions against a live grid.
pub struct FormulaEngine {
    engine: Engine,
    grid: Grid,
}

impl FormulaEngine {
    pub fn new(grid: Grid) -> Self {
        let mut engine = Engine::new();
        // Registered operators (integer division) must win over the built-in ones.
        engine.set_fast_operators(false);
        crate::builtins::register_builtins(&mut engine, grid.clone());
        FormulaEngine { engine, grid }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Evaluate `expression` (without the leading `=`) as if stored at `origin`.
    pub fn evaluate(
        &self,
        origin: Option<CellAddress>,
        expression: &str,
    ) -> Result<Dynamic, FormulaError> {
        if let Some(path) = detect_cycle_from(origin, expression, &self.grid) {
            let at = path.last().copied().or(origin).unwrap_or(CellAddress::new(1, 1));
            tracing::debug!(%at, "circular reference");
            return Err(FormulaError::Cycle { at });
        }

        let script = preprocess_formula(expression);
        self.engine.eval::<Dynamic>(&script).map_err(|err| {
            tracing::debug!(expression, %err, "formula evaluation failed");
            FormulaError::Eval(err.to_string())
        })
    }

    /// Evaluate and convert the result into a cell value.
    pub fn evaluate_value(
        &self,
        origin: Option<CellAddress>,
        expression: &str,
    ) -> Result<CellValue, FormulaError> {
        let value = self.evaluate(origin, expression)?;
        if value.is_unit() {
            Ok(CellValue::Empty)
        } else if let Ok(n) = value.as_float() {
            Ok(CellValue::Number(n))
        } else if let Ok(n) = value.as_int() {
            Ok(CellValue::Number(n as f64))
        } else {
            Ok(CellValue::Text(format_dynamic(&value)))
        }
    }

    /// Display text for a formula: the formatted result or an error marker.
    pub fn display(&self, origin: Option<CellAddress>, expression: &str) -> String {
        match self.evaluate(origin, expression) {
            Ok(value) => format_dynamic(&value),
            Err(err) => err.marker().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::new_grid;

    fn a1(name: &str) -> CellAddress {
        CellAddress::from_a1(name).unwrap()
    }

    #[test]
    fn evaluates_against_live_grid() {
        let grid = new_grid();
        let engine = FormulaEngine::new(grid.clone());
        grid.insert(a1("B2"), CellValue::Number(10.0));
        assert_eq!(engine.display(Some(a1("E2")), "SUM(B2, 4)"), "14");

        grid.insert(a1("B2"), CellValue::Number(1.0));
        assert_eq!(engine.display(Some(a1("E2")), "SUM(B2, 4)"), "5");
    }

    #[test]
    fn sum_of_literals() {
        let engine = FormulaEngine::new(new_grid());
        assert_eq!(engine.display(None, "SUM(2,2)"), "4");
        assert_eq!(
            engine.evaluate_value(None, "SUM(2,2)"),
            Ok(CellValue::Number(4.0))
        );
    }

    #[test]
    fn cycle_marker() {
        let grid = new_grid();
        grid.insert(a1("A1"), CellValue::Text("=B1".into()));
        grid.insert(a1("B1"), CellValue::Text("=A1".into()));
        let engine = FormulaEngine::new(grid);
        assert_eq!(engine.display(Some(a1("A1")), "B1"), "#CYCLE!");
        assert!(matches!(
            engine.evaluate(Some(a1("C1")), "A1"),
            Err(FormulaError::Cycle { .. })
        ));
    }

    #[test]
    fn error_marker() {
        let engine = FormulaEngine::new(new_grid());
        assert_eq!(engine.display(None, "SUM(("), "#ERR!");
        assert_eq!(engine.display(None, "nope(1)"), "#ERR!");
    }

    #[test]
    fn text_results() {
        let grid = new_grid();
        grid.insert(a1("A1"), CellValue::Text("Hello".into()));
        let engine = FormulaEngine::new(grid);
        assert_eq!(
            engine.evaluate_value(None, "A1 & \" World\""),
            Ok(CellValue::Text("Hello World".into()))
        );
    }
}
