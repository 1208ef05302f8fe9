//! Formula preprocessing.
//!
//! Spreadsheet formulas are rewritten into Rhai before evaluation:
//!
//! - **Ranges**: `A1:B5` → `RANGE(1, 1, 5, 2)` (row/column order)
//! - **References**: `B2` → `CELL(2, 2)`
//! - **Function names**: built-ins are matched case-insensitively (`sum(` → `SUM(`)
//! - **Operators**: `<>` → `!=`, `=` → `==`, `^` → `**`, `&` → `+`
//! - **Booleans**: `TRUE`/`FALSE` → `true`/`false`
//!
//! String literals are copied through untouched.

use regex::Regex;
use std::sync::OnceLock;

use super::cell_ref::CellAddress;
use super::deps::{cell_re, followed_by_paren, range_re};
use crate::builtins::is_builtin;

/// Rewrite a formula expression (without the leading `=`) into a Rhai script.
pub fn preprocess_formula(expression: &str) -> String {
    let bytes = expression.as_bytes();
    let mut out = String::with_capacity(expression.len() + 16);
    let mut seg_start = 0;
    let mut in_string = false;
    let mut backslashes = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            if b == b'\\' {
                backslashes += 1;
                i += 1;
                continue;
            }
            if b == b'"' && backslashes.is_multiple_of(2) {
                out.push_str(&expression[seg_start..=i]);
                in_string = false;
                seg_start = i + 1;
            }
            backslashes = 0;
            i += 1;
            continue;
        }

        if b == b'"' {
            out.push_str(&rewrite_segment(&expression[seg_start..i]));
            in_string = true;
            seg_start = i;
            backslashes = 0;
        }
        i += 1;
    }

    if seg_start < expression.len() {
        if in_string {
            out.push_str(&expression[seg_start..]);
        } else {
            out.push_str(&rewrite_segment(&expression[seg_start..]));
        }
    }

    out
}

fn rewrite_segment(segment: &str) -> String {
    let with_ranges = range_re().replace_all(segment, |caps: &regex::Captures| {
        match (
            CellAddress::from_a1(&caps[1]),
            CellAddress::from_a1(&caps[2]),
        ) {
            (Some(start), Some(end)) => format!(
                "RANGE({}, {}, {}, {})",
                start.row, start.column, end.row, end.column
            ),
            _ => caps[0].to_string(),
        }
    });

    let with_names = function_name_re().replace_all(&with_ranges, |caps: &regex::Captures| {
        let upper = caps[1].to_ascii_uppercase();
        if is_builtin(&upper) {
            format!("{}{}", upper, &caps[2])
        } else {
            caps[0].to_string()
        }
    });

    let mut with_cells = String::with_capacity(with_names.len());
    let mut last = 0;
    for m in cell_re().find_iter(&with_names) {
        with_cells.push_str(&with_names[last..m.start()]);
        match CellAddress::from_a1(m.as_str()) {
            Some(address) if !followed_by_paren(&with_names, m.end()) => {
                with_cells.push_str(&format!("CELL({}, {})", address.row, address.column));
            }
            _ => with_cells.push_str(m.as_str()),
        }
        last = m.end();
    }
    with_cells.push_str(&with_names[last..]);

    let with_bools = bool_re().replace_all(&with_cells, |caps: &regex::Captures| {
        caps[0].to_ascii_lowercase()
    });

    rewrite_operators(&with_bools)
}

fn rewrite_operators(segment: &str) -> String {
    let chars: Vec<char> = segment.chars().collect();
    let mut out = String::with_capacity(segment.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();
        match c {
            '<' if next == Some('>') => {
                out.push_str("!=");
                i += 2;
                continue;
            }
            '^' => out.push_str("**"),
            '&' if next == Some('&') => {
                out.push_str("&&");
                i += 2;
                continue;
            }
            '&' => out.push('+'),
            '=' if !matches!(prev, Some('<' | '>' | '!' | '='))
                && next != Some('=') =>
            {
                out.push_str("==")
            }
            _ => out.push(c),
        }
        i += 1;
    }
    out
}

fn function_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)(\s*\()").expect("function name regex must compile")
    })
}

fn bool_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?i:true|false)\b").expect("boolean regex must compile"))
}
