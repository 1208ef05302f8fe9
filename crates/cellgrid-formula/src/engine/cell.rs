//! Cell contents and the shared sparse grid.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::cell_ref::CellAddress;

/// Sparse cell storage shared between the interaction engine and the formula
/// resolver. Only touched addresses have entries; clones share the same map.
pub type Grid = Arc<DashMap<CellAddress, CellValue>>;

pub fn new_grid() -> Grid {
    Arc::new(DashMap::new())
}

/// A stored cell value.
///
/// Text starting with `=` is a formula reference; it is stored verbatim and
/// its computed value is produced on demand, never written back.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    /// Parse what a user typed into a cell.
    pub fn from_input(input: &str) -> CellValue {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        if trimmed.starts_with('=') {
            return CellValue::Text(trimmed.to_string());
        }
        if trimmed.len() >= 2
            && let Some(inner) = trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"'))
        {
            return CellValue::Text(inner.to_string());
        }
        if looks_numeric(trimmed)
            && let Ok(n) = trimmed.parse::<f64>()
            && n.is_finite()
        {
            return CellValue::Number(n);
        }
        CellValue::Text(trimmed.to_string())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn is_formula(&self) -> bool {
        self.formula().is_some()
    }

    /// The expression of a formula value, without the leading `=`.
    pub fn formula(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => s.strip_prefix('='),
            _ => None,
        }
    }

    /// The text an editor shows for this value. [`CellValue::from_input`]
    /// reads it back as the same value, so text that would parse as
    /// something else ("12", padded or quoted text) comes back quoted.
    pub fn to_input(&self) -> String {
        match self {
            CellValue::Text(s) if CellValue::from_input(s) != *self => format!("\"{s}\""),
            other => other.to_string(),
        }
    }
}

/// Leading zeros ("007") stay text so identifiers survive a round trip.
fn looks_numeric(s: &str) -> bool {
    let digits = s.trim_start_matches(['-', '+']);
    if digits.len() > 1 && digits.starts_with('0') && !digits[1..].starts_with('.') {
        return false;
    }
    s.chars().any(|c| c.is_ascii_digit())
        && s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::from_input(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::from_input(&value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}
