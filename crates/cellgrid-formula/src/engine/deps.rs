//! Dependency extraction from formula strings.
//!
//! Finds every cell a formula reads: single references (`A1`) and ranges
//! (`B2:C5`). References inside string literals and function names that
//! happen to look like cells (`LOG10(`) are ignored.

use regex::Regex;
use std::sync::OnceLock;

use super::cell_ref::CellAddress;

/// Ranges larger than this are not expanded into individual dependencies.
pub const MAX_RANGE_CELLS: usize = 1_000_000;

/// Extract all cell references from a formula expression as dependencies.
pub fn extract_dependencies(expression: &str) -> Vec<CellAddress> {
    let mut deps = Vec::new();
    let expression = strip_string_literals(expression);

    for caps in range_re().captures_iter(&expression) {
        let (Some(start), Some(end)) = (
            CellAddress::from_a1(&caps[1]),
            CellAddress::from_a1(&caps[2]),
        ) else {
            continue;
        };
        let (top, bottom) = (start.row.min(end.row), start.row.max(end.row));
        let (left, right) = (start.column.min(end.column), start.column.max(end.column));

        let Some(cell_count) = (bottom - top + 1).checked_mul(right - left + 1) else {
            continue;
        };
        if cell_count > MAX_RANGE_CELLS {
            continue;
        }
        for row in top..=bottom {
            for column in left..=right {
                deps.push(CellAddress::new(row, column));
            }
        }
    }

    let without_ranges = range_re().replace_all(&expression, " ");
    for m in cell_re().find_iter(&without_ranges) {
        if followed_by_paren(&without_ranges, m.end()) {
            continue;
        }
        if let Some(address) = CellAddress::from_a1(m.as_str()) {
            deps.push(address);
        }
    }

    deps
}

/// Parse a range like "A1:B5" into its two corners, as written.
pub fn parse_range(range: &str) -> Option<(CellAddress, CellAddress)> {
    let (start, end) = range.split_once(':')?;
    Some((CellAddress::from_a1(start)?, CellAddress::from_a1(end)?))
}

pub(crate) fn range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b([A-Za-z]{1,3}[0-9]+):([A-Za-z]{1,3}[0-9]+)\b")
            .expect("range reference regex must compile")
    })
}

pub(crate) fn cell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[A-Za-z]{1,3}[0-9]+\b").expect("cell reference regex must compile")
    })
}

/// True when the next non-space character after `end` opens a call.
pub(crate) fn followed_by_paren(text: &str, end: usize) -> bool {
    text[end..].trim_start().starts_with('(')
}

fn strip_string_literals(expression: &str) -> String {
    let mut out = String::with_capacity(expression.len());
    let mut in_string = false;
    let mut escaped = false;

    for ch in expression.chars() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(' ');
                continue;
            }
            if ch == '\\' {
                escaped = true;
                out.push(' ');
                continue;
            }
            if ch == '"' {
                in_string = false;
                out.push('"');
            } else {
                out.push(' ');
            }
        } else if ch == '"' {
            in_string = true;
            out.push('"');
        } else {
            out.push(ch);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_references() {
        let deps = extract_dependencies("SUM(B2, 4) + a1");
        assert_eq!(deps, vec![CellAddress::new(2, 2), CellAddress::new(1, 1)]);
    }

    #[test]
    fn ranges_expand_row_major() {
        let deps = extract_dependencies("SUM(B1:A2)");
        assert_eq!(
            deps,
            vec![
                CellAddress::new(1, 1),
                CellAddress::new(1, 2),
                CellAddress::new(2, 1),
                CellAddress::new(2, 2),
            ]
        );
    }

    #[test]
    fn ignores_strings_and_function_names() {
        let deps = extract_dependencies("CONCAT(\"A1\", LOG10(2))");
        assert!(deps.is_empty());
    }

    #[test]
    fn skips_over_limit_ranges() {
        let deps = extract_dependencies("SUM(A1:ZZZ1000000)+B2");
        assert_eq!(deps, vec![CellAddress::new(2, 2)]);
    }

    #[test]
    fn parse_range_keeps_corners() {
        assert_eq!(
            parse_range("C3:A1"),
            Some((CellAddress::new(3, 3), CellAddress::new(1, 1)))
        );
        assert!(parse_range("A1").is_none());
    }
}
