use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use cellgrid_core::{EngineMode, GridAction};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::KeymapError;

/// Which keys drive the engine.
///
/// The built-ins live in `defaults.rs`; a custom keymap is a pair of key
/// tables (one per engine mode) optionally layered over a built-in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Keymap {
    /// Arrows, Enter/F2 to edit, typing replaces the cell, Ctrl+C/X/V/Z/Y.
    Standard,
    /// hjkl navigation, HJKL extends, `i` to edit.
    Vim,
    Custom(CustomKeymap),
}

impl Keymap {
    /// Built-in keymap by name, ignoring case.
    pub fn builtin(name: &str) -> Option<Keymap> {
        if name.eq_ignore_ascii_case("standard") {
            Some(Keymap::Standard)
        } else if name.eq_ignore_ascii_case("vim") {
            Some(Keymap::Vim)
        } else {
            None
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Keymap::Standard => "standard",
            Keymap::Vim => "vim",
            Keymap::Custom(custom) => &custom.name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomKeymap {
    pub name: String,
    pub description: Option<String>,
    /// Consulted for keys neither table binds.
    pub base: Option<Box<Keymap>>,
    pub navigate: KeyTable,
    pub edit: KeyTable,
}

impl CustomKeymap {
    pub fn table(&self, mode: EngineMode) -> &KeyTable {
        match mode {
            EngineMode::Navigate => &self.navigate,
            EngineMode::Edit => &self.edit,
        }
    }

    /// Own bindings first, then the base keymap. Printable characters the
    /// editor does not otherwise bind are always inserted.
    pub(crate) fn translate(&self, mode: EngineMode, key: KeyEvent) -> Option<GridAction> {
        self.table(mode)
            .lookup(key)
            .or_else(|| {
                self.base
                    .as_deref()
                    .and_then(|base| super::translate(base, mode, key))
            })
            .or_else(|| match mode {
                EngineMode::Edit => super::defaults::plain_char(key).map(GridAction::InsertChar),
                EngineMode::Navigate => None,
            })
    }
}

/// Exact key-to-action bindings for one engine mode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyTable(HashMap<KeyCombo, GridAction>);

impl KeyTable {
    pub fn lookup(&self, key: KeyEvent) -> Option<GridAction> {
        self.0.get(&KeyCombo::from_event(key)).copied()
    }

    /// Returns the action previously bound to `combo`, if any.
    pub fn bind(&mut self, combo: KeyCombo, action: GridAction) -> Option<GridAction> {
        self.0.insert(combo, action)
    }
}

/// A key plus modifiers, written `C-z`, `S-Down`, `M-C-x`, `F2`, `C--`.
///
/// Shift on a character key is folded into the character (`S-a` is `A`),
/// matching what terminals report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

const MODIFIER_NAMES: &[(&str, KeyModifiers)] = &[
    ("c", KeyModifiers::CONTROL),
    ("ctrl", KeyModifiers::CONTROL),
    ("control", KeyModifiers::CONTROL),
    ("m", KeyModifiers::ALT),
    ("alt", KeyModifiers::ALT),
    ("meta", KeyModifiers::ALT),
    ("s", KeyModifiers::SHIFT),
    ("shift", KeyModifiers::SHIFT),
];

/// Named keys. The first name listed for a code is the one displayed.
const KEY_NAMES: &[(&str, KeyCode)] = &[
    ("Enter", KeyCode::Enter),
    ("Return", KeyCode::Enter),
    ("Esc", KeyCode::Esc),
    ("Escape", KeyCode::Esc),
    ("Backspace", KeyCode::Backspace),
    ("Delete", KeyCode::Delete),
    ("Del", KeyCode::Delete),
    ("Tab", KeyCode::Tab),
    ("BackTab", KeyCode::BackTab),
    ("Home", KeyCode::Home),
    ("End", KeyCode::End),
    ("PageUp", KeyCode::PageUp),
    ("PageDown", KeyCode::PageDown),
    ("Left", KeyCode::Left),
    ("Right", KeyCode::Right),
    ("Up", KeyCode::Up),
    ("Down", KeyCode::Down),
    ("Space", KeyCode::Char(' ')),
    ("Minus", KeyCode::Char('-')),
    ("Dash", KeyCode::Char('-')),
    ("Plus", KeyCode::Char('+')),
    ("Comma", KeyCode::Char(',')),
    ("Period", KeyCode::Char('.')),
    ("Slash", KeyCode::Char('/')),
    ("Backslash", KeyCode::Char('\\')),
    ("Semicolon", KeyCode::Char(';')),
    ("Quote", KeyCode::Char('\'')),
    ("DoubleQuote", KeyCode::Char('"')),
    ("Dollar", KeyCode::Char('$')),
    ("Equal", KeyCode::Char('=')),
];

impl KeyCombo {
    pub fn new(code: KeyCode, mut modifiers: KeyModifiers) -> Self {
        let code = match code {
            KeyCode::Char(c) if modifiers.contains(KeyModifiers::SHIFT) => {
                modifiers.remove(KeyModifiers::SHIFT);
                KeyCode::Char(c.to_ascii_uppercase())
            }
            other => other,
        };
        KeyCombo { code, modifiers }
    }

    pub fn from_event(key: KeyEvent) -> Self {
        KeyCombo::new(key.code, key.modifiers)
    }

    pub fn to_event(self) -> KeyEvent {
        KeyEvent::new(self.code, self.modifiers)
    }
}

impl FromStr for KeyCombo {
    type Err = KeymapError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let (prefix, key) = split_combo(input)?;
        let mut modifiers = KeyModifiers::NONE;
        for part in prefix.into_iter().flat_map(|p| p.split('-')) {
            let part = part.trim();
            let flag = MODIFIER_NAMES
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(part))
                .map(|(_, flag)| *flag)
                .ok_or_else(|| KeymapError::UnknownModifier(part.to_string()))?;
            if modifiers.contains(flag) {
                return Err(KeymapError::DuplicateModifier(part.to_string()));
            }
            modifiers.insert(flag);
        }
        Ok(KeyCombo::new(key_code(key)?, modifiers))
    }
}

/// `C-S-x` -> (`C-S`, `x`). A trailing `--` names the minus key.
fn split_combo(input: &str) -> Result<(Option<&str>, &str), KeymapError> {
    if input.chars().count() == 1 {
        return Ok((None, input));
    }
    if let Some(prefix) = input.strip_suffix("--")
        && !prefix.is_empty()
    {
        return Ok((Some(prefix), "-"));
    }
    match input.rsplit_once('-') {
        None => Ok((None, input)),
        Some((prefix, key)) if !prefix.is_empty() && !key.is_empty() => Ok((Some(prefix), key)),
        Some(_) => Err(KeymapError::UnknownKey(input.to_string())),
    }
}

fn key_code(name: &str) -> Result<KeyCode, KeymapError> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }
    if let Some(n) = name
        .strip_prefix(['f', 'F'])
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|n| (1..=12).contains(n))
    {
        return Ok(KeyCode::F(n));
    }
    KEY_NAMES
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
        .ok_or_else(|| KeymapError::UnknownKey(name.to_string()))
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, prefix) in [
            (KeyModifiers::CONTROL, "C-"),
            (KeyModifiers::ALT, "M-"),
            (KeyModifiers::SHIFT, "S-"),
        ] {
            if self.modifiers.contains(flag) {
                f.write_str(prefix)?;
            }
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("Space"),
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::F(n) => write!(f, "F{n}"),
            code => match KEY_NAMES.iter().find(|(_, known)| *known == code) {
                Some((name, _)) => f.write_str(name),
                None => write!(f, "{code:?}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn combo(s: &str) -> KeyCombo {
        s.parse().expect("combo")
    }

    #[test]
    fn modifiers_and_named_keys() {
        assert_eq!(combo("C-z"), KeyCombo::new(KeyCode::Char('z'), KeyModifiers::CONTROL));
        assert_eq!(combo("S-Down").modifiers, KeyModifiers::SHIFT);
        assert_eq!(combo("ctrl-alt-PageUp").modifiers, KeyModifiers::CONTROL | KeyModifiers::ALT);
        assert_eq!(combo("F2").code, KeyCode::F(2));
        assert_eq!(combo("C--"), KeyCombo::new(KeyCode::Char('-'), KeyModifiers::CONTROL));
        assert_eq!(combo("-").code, KeyCode::Char('-'));
        assert_eq!(combo("é").code, KeyCode::Char('é'));
    }

    #[test]
    fn shift_folds_into_characters() {
        assert_eq!(combo("S-a"), combo("A"));
        assert_eq!(combo("C-S-z"), KeyCombo::new(KeyCode::Char('Z'), KeyModifiers::CONTROL));
        let event = KeyEvent::new(KeyCode::Char('J'), KeyModifiers::SHIFT);
        assert_eq!(KeyCombo::from_event(event), combo("J"));
    }

    #[test]
    fn rejects_bad_combos() {
        assert!(matches!("C-NotAKey".parse::<KeyCombo>(), Err(KeymapError::UnknownKey(_))));
        assert!(matches!("F13".parse::<KeyCombo>(), Err(KeymapError::UnknownKey(_))));
        assert!(matches!("C-".parse::<KeyCombo>(), Err(KeymapError::UnknownKey(_))));
        assert!(matches!("C-C-s".parse::<KeyCombo>(), Err(KeymapError::DuplicateModifier(_))));
        assert!(matches!("X-s".parse::<KeyCombo>(), Err(KeymapError::UnknownModifier(_))));
    }

    #[test]
    fn display_reads_back() {
        for text in ["C-Z", "M-S-Down", "Space", "F11", "BackTab", "C--"] {
            assert_eq!(combo(text).to_string(), text);
            assert_eq!(combo(&combo(text).to_string()), combo(text));
        }
        assert_eq!(combo("return").to_string(), "Enter");
    }

    #[test]
    fn custom_keymap_layers_over_base() {
        let mut navigate = KeyTable::default();
        navigate.bind(combo("n"), GridAction::Undo);
        let custom = CustomKeymap {
            name: "mine".into(),
            description: None,
            base: Some(Box::new(Keymap::Vim)),
            navigate,
            edit: KeyTable::default(),
        };
        let press = |s: &str| combo(s).to_event();
        assert_eq!(custom.translate(EngineMode::Navigate, press("n")), Some(GridAction::Undo));
        assert_eq!(
            custom.translate(EngineMode::Navigate, press("j")),
            Some(GridAction::Move(cellgrid_core::Direction::Down))
        );
        assert_eq!(custom.translate(EngineMode::Edit, press("q")), Some(GridAction::InsertChar('q')));

        let bare = CustomKeymap { base: None, ..custom };
        assert_eq!(bare.translate(EngineMode::Navigate, press("j")), None);
    }
}
