//! Sheet storage and change sets.
//!
//! A [`Sheet`] is a name plus a handle to the shared sparse [`Grid`]. The
//! engine never mutates the grid directly: every mutation is a [`ChangeSet`]
//! handed to the sheet's change handler, which merges it.

use std::collections::BTreeMap;
use std::collections::btree_map;

use cellgrid_formula::{CellAddress, CellValue, Grid, new_grid};

use crate::selection::SelectionRect;

/// Mapping of addresses to new values, iterated row-major.
/// [`CellValue::Empty`] is an explicit clear.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChangeSet {
    entries: BTreeMap<CellAddress, CellValue>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(address: CellAddress, value: CellValue) -> Self {
        let mut changes = Self::new();
        changes.insert(address, value);
        changes
    }

    pub fn insert(&mut self, address: CellAddress, value: CellValue) {
        self.entries.insert(address, value);
    }

    pub fn get(&self, address: &CellAddress) -> Option<&CellValue> {
        self.entries.get(address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, CellAddress, CellValue> {
        self.entries.iter()
    }

    /// The row-major first address.
    pub fn first_address(&self) -> Option<CellAddress> {
        self.entries.keys().next().copied()
    }

    /// Smallest rectangle covering every address.
    pub fn bounds(&self) -> Option<SelectionRect> {
        let mut keys = self.entries.keys();
        let first = *keys.next()?;
        Some(keys.fold(SelectionRect::cell(first), |rect, a| {
            rect.union(&SelectionRect::cell(*a))
        }))
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = (&'a CellAddress, &'a CellValue);
    type IntoIter = btree_map::Iter<'a, CellAddress, CellValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(CellAddress, CellValue)> for ChangeSet {
    fn from_iter<T: IntoIterator<Item = (CellAddress, CellValue)>>(iter: T) -> Self {
        ChangeSet {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Invoked once per committed change set with the sheet name.
pub type ChangeHandler = Box<dyn FnMut(&str, &ChangeSet)>;

/// A named sheet. Clones share the same grid.
#[derive(Clone)]
pub struct Sheet {
    name: String,
    grid: Grid,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Sheet {
            name: name.into(),
            grid: new_grid(),
        }
    }

    /// Seed a sheet at session start. Empty values are skipped.
    pub fn with_cells(
        name: impl Into<String>,
        cells: impl IntoIterator<Item = (CellAddress, CellValue)>,
    ) -> Self {
        let sheet = Sheet::new(name);
        for (address, value) in cells {
            if !value.is_empty() {
                sheet.grid.insert(address, value);
            }
        }
        sheet
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A handle to the live storage.
    pub fn grid(&self) -> Grid {
        self.grid.clone()
    }

    /// O(1) read; untouched addresses are empty.
    pub fn get_value(&self, address: CellAddress) -> CellValue {
        self.grid
            .get(&address)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    pub fn is_defined(&self, address: CellAddress) -> bool {
        self.grid.contains_key(&address)
    }

    /// Number of stored cells.
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Bottom-right corner of the used area.
    pub fn used_extent(&self) -> Option<CellAddress> {
        self.grid.iter().map(|entry| *entry.key()).fold(None, |acc, a| {
            Some(match acc {
                None => a,
                Some(b) => CellAddress::new(b.row.max(a.row), b.column.max(a.column)),
            })
        })
    }

    /// Stored addresses inside `rect`, row-major. Large rects scan the
    /// stored cells instead of probing every address.
    pub fn defined_in(&self, rect: SelectionRect) -> Vec<CellAddress> {
        let mut found: Vec<CellAddress> = if rect.area() > self.grid.len() {
            self.grid
                .iter()
                .map(|entry| *entry.key())
                .filter(|address| rect.contains(*address))
                .collect()
        } else {
            rect.addresses().filter(|a| self.grid.contains_key(a)).collect()
        };
        found.sort();
        found
    }

    /// Rightmost stored column in `row`.
    pub fn last_used_column(&self, row: usize) -> Option<usize> {
        self.grid
            .iter()
            .filter(|entry| entry.key().row == row)
            .map(|entry| entry.key().column)
            .max()
    }

    /// A change handler that merges into this sheet's grid.
    pub fn merge_handler(&self) -> ChangeHandler {
        let grid = self.grid.clone();
        Box::new(move |_, changes| merge_into(&grid, changes))
    }
}

/// Merge a change set into a grid; empty values remove their entry.
pub fn merge_into(grid: &Grid, changes: &ChangeSet) {
    for (address, value) in changes {
        if value.is_empty() {
            grid.remove(address);
        } else {
            grid.insert(*address, value.clone());
        }
    }
}
