//! In-place cell editing.
//!
//! A two-state machine: `Idle` or `Editing` one cell. The controller owns
//! only the edit buffer; committing hands back an [`EditCommit`] and the
//! engine turns it into a change set, patch and cursor advance.

use cellgrid_formula::{CellAddress, CellValue};

/// How an edit was started.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditTrigger {
    /// Double-click or double-tap on the cell.
    DoubleActivation,
    /// Enter or F2: the buffer starts with the current value.
    Key,
    /// A printable character replaces the value.
    Typed(char),
    /// Host request with optional initial text.
    Programmatic(Option<String>),
}

/// Where the active cell goes after a commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitDirection {
    Down,
    Up,
    Right,
    Left,
    Stay,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EditSession {
    pub address: CellAddress,
    pub previous_value: CellValue,
    pub buffer: String,
    /// Byte offset into `buffer`, always on a char boundary.
    pub cursor: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum EditState {
    #[default]
    Idle,
    Editing(EditSession),
}

/// Result of leaving edit mode by commit.
#[derive(Clone, Debug, PartialEq)]
pub struct EditCommit {
    pub address: CellAddress,
    pub previous_value: CellValue,
    pub new_value: CellValue,
}

impl EditCommit {
    pub fn is_change(&self) -> bool {
        self.previous_value != self.new_value
    }
}

#[derive(Clone, Debug, Default)]
pub struct EditableController {
    state: EditState,
}

impl EditableController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing(_))
    }

    pub fn session(&self) -> Option<&EditSession> {
        match &self.state {
            EditState::Editing(session) => Some(session),
            EditState::Idle => None,
        }
    }

    /// Idle -> Editing. Returns false if an edit is already in progress.
    pub fn begin(&mut self, address: CellAddress, current: CellValue, trigger: EditTrigger) -> bool {
        if self.is_editing() {
            return false;
        }
        let buffer = match trigger {
            EditTrigger::DoubleActivation | EditTrigger::Key => current.to_input(),
            EditTrigger::Typed(c) => c.to_string(),
            EditTrigger::Programmatic(initial) => initial.unwrap_or_else(|| current.to_input()),
        };
        let cursor = buffer.len();
        self.state = EditState::Editing(EditSession {
            address,
            previous_value: current,
            buffer,
            cursor,
        });
        true
    }

    /// Editing -> Idle, producing the parsed value.
    pub fn commit(&mut self) -> Option<EditCommit> {
        match std::mem::take(&mut self.state) {
            EditState::Editing(session) => Some(EditCommit {
                address: session.address,
                new_value: CellValue::from_input(&session.buffer),
                previous_value: session.previous_value,
            }),
            EditState::Idle => None,
        }
    }

    /// Editing -> Idle, discarding the buffer.
    pub fn cancel(&mut self) -> bool {
        let was_editing = self.is_editing();
        self.state = EditState::Idle;
        was_editing
    }

    fn session_mut(&mut self) -> Option<&mut EditSession> {
        match &mut self.state {
            EditState::Editing(session) => Some(session),
            EditState::Idle => None,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if let Some(s) = self.session_mut() {
            s.buffer.insert(s.cursor, c);
            s.cursor += c.len_utf8();
        }
    }

    pub fn insert_str(&mut self, text: &str) {
        if let Some(s) = self.session_mut() {
            s.buffer.insert_str(s.cursor, text);
            s.cursor += text.len();
        }
    }

    pub fn backspace(&mut self) {
        if let Some(s) = self.session_mut()
            && s.cursor > 0
        {
            let start = prev_boundary(&s.buffer, s.cursor);
            s.buffer.drain(start..s.cursor);
            s.cursor = start;
        }
    }

    pub fn delete_forward(&mut self) {
        if let Some(s) = self.session_mut()
            && s.cursor < s.buffer.len()
        {
            let end = next_boundary(&s.buffer, s.cursor);
            s.buffer.drain(s.cursor..end);
        }
    }

    pub fn cursor_left(&mut self) {
        if let Some(s) = self.session_mut()
            && s.cursor > 0
        {
            s.cursor = prev_boundary(&s.buffer, s.cursor);
        }
    }

    pub fn cursor_right(&mut self) {
        if let Some(s) = self.session_mut()
            && s.cursor < s.buffer.len()
        {
            s.cursor = next_boundary(&s.buffer, s.cursor);
        }
    }

    pub fn cursor_home(&mut self) {
        if let Some(s) = self.session_mut() {
            s.cursor = 0;
        }
    }

    pub fn cursor_end(&mut self) {
        if let Some(s) = self.session_mut() {
            s.cursor = s.buffer.len();
        }
    }
}

fn prev_boundary(buffer: &str, cursor: usize) -> usize {
    let mut pos = cursor - 1;
    while pos > 0 && !buffer.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

fn next_boundary(buffer: &str, cursor: usize) -> usize {
    let mut pos = cursor + 1;
    while pos < buffer.len() && !buffer.is_char_boundary(pos) {
        pos += 1;
    }
    pos
}
