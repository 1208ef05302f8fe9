//! Circular reference detection for formula cells.
//!
//! Formula values are resolved on demand, so a cycle (A1 -> B1 -> A1) would
//! recurse forever. Evaluation runs a depth-first search over the formulas
//! reachable from the cell first and refuses to evaluate when it finds one.

use std::collections::HashSet;

use super::deps::extract_dependencies;
use super::{CellAddress, Grid};

/// Detect circular references starting from a cell.
/// Returns the path ending in the repeated cell if one is found.
pub fn detect_cycle(start: &CellAddress, grid: &Grid) -> Option<Vec<CellAddress>> {
    let mut search = Search::new(grid);
    if search.visit(*start) {
        Some(search.path)
    } else {
        None
    }
}

/// Like [`detect_cycle`], for an expression that is about to be evaluated at
/// `origin` but may not be stored in the grid yet.
pub fn detect_cycle_from(
    origin: Option<CellAddress>,
    expression: &str,
    grid: &Grid,
) -> Option<Vec<CellAddress>> {
    let mut search = Search::new(grid);
    if let Some(origin) = origin {
        search.visiting.insert(origin);
        search.path.push(origin);
    }
    for dep in extract_dependencies(expression) {
        if search.visit(dep) {
            return Some(search.path);
        }
    }
    None
}

struct Search<'a> {
    grid: &'a Grid,
    visiting: HashSet<CellAddress>,
    finished: HashSet<CellAddress>,
    path: Vec<CellAddress>,
}

impl<'a> Search<'a> {
    fn new(grid: &'a Grid) -> Self {
        Search {
            grid,
            visiting: HashSet::new(),
            finished: HashSet::new(),
            path: Vec::new(),
        }
    }

    fn visit(&mut self, current: CellAddress) -> bool {
        if self.visiting.contains(&current) {
            self.path.push(current);
            return true;
        }
        if self.finished.contains(&current) {
            return false;
        }

        let deps = match self.grid.get(&current) {
            Some(entry) => match entry.value().formula() {
                Some(expression) => extract_dependencies(expression),
                None => return false,
            },
            None => return false,
        };

        self.visiting.insert(current);
        self.path.push(current);

        for dep in deps {
            if self.visit(dep) {
                return true;
            }
        }

        self.path.pop();
        self.visiting.remove(&current);
        self.finished.insert(current);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CellValue, new_grid};

    fn grid_with(cells: &[(&str, &str)]) -> Grid {
        let grid = new_grid();
        for (a1, input) in cells {
            let address = CellAddress::from_a1(a1).unwrap();
            grid.insert(address, CellValue::from_input(input));
        }
        grid
    }

    #[test]
    fn finds_indirect_cycle() {
        let grid = grid_with(&[("A1", "=B1"), ("B1", "=C1+1"), ("C1", "=A1")]);
        let path = detect_cycle(&CellAddress::new(1, 1), &grid).unwrap();
        assert_eq!(path.first(), path.last());
    }

    #[test]
    fn acyclic_chain_is_fine() {
        let grid = grid_with(&[("A1", "=B1"), ("B1", "=C1+1"), ("C1", "5")]);
        assert!(detect_cycle(&CellAddress::new(1, 1), &grid).is_none());
    }

    #[test]
    fn self_reference_through_range() {
        let grid = grid_with(&[("A3", "=SUM(A1:A3)")]);
        assert!(detect_cycle(&CellAddress::new(3, 1), &grid).is_some());
    }

    #[test]
    fn unsaved_expression_against_origin() {
        let grid = grid_with(&[("B1", "=A1*2")]);
        let origin = Some(CellAddress::new(1, 1));
        assert!(detect_cycle_from(origin, "B1+1", &grid).is_some());
        assert!(detect_cycle_from(None, "B1+1", &grid).is_none());
    }
}
