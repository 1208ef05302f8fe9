//! Cell address parsing and formatting.
//!
//! Converts between spreadsheet-style references ("A1", "B2", "AA100") and
//! 1-based row/column coordinates. Row 0 and column 0 are reserved for the
//! headers, so a data address is always at least (1, 1).
//!
//! ```
//! use cellgrid_formula::CellAddress;
//!
//! let address: CellAddress = "B3".parse().unwrap();
//! assert_eq!(address.row, 3);
//! assert_eq!(address.column, 2);
//! assert_eq!(address.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A cell position, 1-based. Ordering is row-major.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellAddress {
    pub row: usize,
    pub column: usize,
}

impl CellAddress {
    pub const fn new(row: usize, column: usize) -> CellAddress {
        CellAddress { row, column }
    }

    /// Parse A1 notation. Returns None for malformed input or a zero row.
    pub fn from_a1(name: &str) -> Option<CellAddress> {
        let caps = a1_re().captures(name.trim())?;
        let letters = &caps["letters"];
        let numbers = &caps["numbers"];

        let mut column = 0usize;
        for c in letters.to_ascii_uppercase().bytes() {
            let digit = (c - b'A') as usize + 1;
            column = column.checked_mul(26)?.checked_add(digit)?;
        }

        let row = numbers.parse::<usize>().ok()?;
        if row == 0 {
            return None;
        }

        Some(CellAddress::new(row, column))
    }

    /// Move by a signed delta, saturating at 1 and at the given extents.
    pub fn offset(self, rows: isize, columns: isize, row_count: usize, column_count: usize) -> Self {
        CellAddress {
            row: self.row.saturating_add_signed(rows).clamp(1, row_count.max(1)),
            column: self
                .column
                .saturating_add_signed(columns)
                .clamp(1, column_count.max(1)),
        }
    }
}

/// Column letters for a 1-based column (1 -> A, 26 -> Z, 27 -> AA).
/// Column 0 has no letters.
pub fn column_letters(column: usize) -> String {
    let mut result = String::new();
    let mut n = column as u128;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}

fn a1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$").expect("A1 regex must compile")
    })
}

impl std::str::FromStr for CellAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_a1(s).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.column), self.row)
    }
}
