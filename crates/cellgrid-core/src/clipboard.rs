//! Clipboard abstraction and the rectangular block format.
//!
//! Blocks travel as tab-separated text: tab between fields, newline between
//! rows. Fields containing a tab, newline or quote are wrapped in quotes with
//! inner quotes doubled, which is what spreadsheet applications exchange.

use cellgrid_formula::CellValue;

use crate::selection::SelectionRect;
use crate::sheet::Sheet;

/// Trait for clipboard operations.
pub trait ClipboardProvider {
    /// Get text from clipboard.
    fn get_text(&mut self) -> Option<String>;

    /// Set text to clipboard.
    fn set_text(&mut self, text: String) -> bool;
}

/// Process-local clipboard; the default, and what tests use.
#[derive(Clone, Debug, Default)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        MemoryClipboard {
            text: Some(text.into()),
        }
    }
}

impl ClipboardProvider for MemoryClipboard {
    fn get_text(&mut self) -> Option<String> {
        self.text.clone()
    }

    fn set_text(&mut self, text: String) -> bool {
        self.text = Some(text);
        true
    }
}

/// System clipboard implementation using arboard.
#[cfg(feature = "system-clipboard")]
pub struct SystemClipboard;

#[cfg(feature = "system-clipboard")]
impl SystemClipboard {
    /// Fails when no system clipboard can be opened (headless session).
    pub fn new() -> crate::error::Result<Self> {
        arboard::Clipboard::new()
            .map(|_| SystemClipboard)
            .map_err(|err| crate::error::GridError::Clipboard(err.to_string()))
    }
}

#[cfg(feature = "system-clipboard")]
impl ClipboardProvider for SystemClipboard {
    fn get_text(&mut self) -> Option<String> {
        let mut cb = arboard::Clipboard::new().ok()?;
        cb.get_text().ok()
    }

    fn set_text(&mut self, text: String) -> bool {
        let mut cb = match arboard::Clipboard::new() {
            Ok(cb) => cb,
            Err(err) => {
                tracing::warn!(%err, "system clipboard unavailable");
                return false;
            }
        };
        cb.set_text(text).is_ok()
    }
}

/// A rectangular block of values, row-major. Every row has the same width.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClipboardBlock {
    rows: Vec<Vec<CellValue>>,
}

impl ClipboardBlock {
    /// Build from rows, padding short rows with empties.
    pub fn from_rows(mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return Self::default();
        }
        for row in &mut rows {
            row.resize(width, CellValue::Empty);
        }
        ClipboardBlock { rows }
    }

    /// Read a rectangle from the sheet; empty cells become empty fields.
    pub fn from_rect(sheet: &Sheet, rect: SelectionRect) -> Self {
        let rows = (rect.top..=rect.bottom)
            .map(|row| {
                (rect.left..=rect.right)
                    .map(|column| sheet.get_value(cellgrid_formula::CellAddress::new(row, column)))
                    .collect()
            })
            .collect();
        ClipboardBlock { rows }
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0 || self.width() == 0
    }

    pub fn to_tsv(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|value| escape_field(&value.to_string()))
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parse tab-separated text. One trailing newline is ignored.
    pub fn parse_tsv(text: &str) -> Self {
        let text = text
            .strip_suffix("\r\n")
            .or_else(|| text.strip_suffix('\n'))
            .unwrap_or(text);
        if text.is_empty() {
            return Self::default();
        }

        let mut rows: Vec<Vec<CellValue>> = Vec::new();
        let mut row: Vec<CellValue> = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut at_field_start = true;
        let mut chars = text.chars().peekable();

        while let Some(ch) = chars.next() {
            if in_quotes {
                if ch == '"' {
                    if chars.peek() == Some(&'"') {
                        field.push('"');
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                } else {
                    field.push(ch);
                }
                continue;
            }

            match ch {
                '"' if at_field_start => {
                    in_quotes = true;
                    at_field_start = false;
                }
                '\t' => {
                    row.push(CellValue::from_input(&std::mem::take(&mut field)));
                    at_field_start = true;
                }
                '\r' if chars.peek() == Some(&'\n') => {}
                '\n' => {
                    row.push(CellValue::from_input(&std::mem::take(&mut field)));
                    rows.push(std::mem::take(&mut row));
                    at_field_start = true;
                }
                _ => {
                    field.push(ch);
                    at_field_start = false;
                }
            }
        }
        row.push(CellValue::from_input(&field));
        rows.push(row);

        Self::from_rows(rows)
    }
}

fn escape_field(value: &str) -> String {
    if value.contains(['\t', '\n', '\r', '"']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn parses_rows_and_fields() {
        let block = ClipboardBlock::parse_tsv("a\tb\n1\t\n");
        assert_eq!(block.height(), 2);
        assert_eq!(block.width(), 2);
        assert_eq!(
            block.rows(),
            &[
                vec![text("a"), text("b")],
                vec![CellValue::Number(1.0), CellValue::Empty]
            ]
        );
    }

    #[test]
    fn quoted_fields_keep_separators() {
        let block = ClipboardBlock::parse_tsv("\"x\ty\"\t\"say \"\"hi\"\"\"\r\n\"two\nlines\"\tz");
        assert_eq!(
            block.rows(),
            &[
                vec![text("x\ty"), text("say \"hi\"")],
                vec![text("two\nlines"), text("z")]
            ]
        );
    }

    #[test]
    fn ragged_rows_are_padded() {
        let block = ClipboardBlock::parse_tsv("a\nb\tc\td");
        assert_eq!(block.width(), 3);
        assert_eq!(block.rows()[0], vec![text("a"), CellValue::Empty, CellValue::Empty]);
    }

    #[test]
    fn empty_text_is_empty_block() {
        assert!(ClipboardBlock::parse_tsv("").is_empty());
        assert!(ClipboardBlock::parse_tsv("\n").is_empty());
    }

    #[test]
    fn serializes_with_quoting() {
        let block = ClipboardBlock::from_rows(vec![
            vec![text("a\tb"), CellValue::Number(2.0)],
            vec![CellValue::Empty, text("=SUM(A1:A2)")],
        ]);
        assert_eq!(block.to_tsv(), "\"a\tb\"\t2\n\t=SUM(A1:A2)");
        assert_eq!(ClipboardBlock::parse_tsv(&block.to_tsv()), block);
    }

    #[test]
    fn memory_clipboard_round_trip() {
        let mut clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.get_text(), None);
        assert!(clipboard.set_text("hello".to_string()));
        assert_eq!(clipboard.get_text().as_deref(), Some("hello"));
    }
}
