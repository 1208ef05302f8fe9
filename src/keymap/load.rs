//! Keymap selection: built-ins plus custom tables from `keymaps.toml`.
//!
//! ```toml
//! default = "mine"
//!
//! [keymaps.mine]
//! description = "vim with a few extras"
//! extends = "vim"
//!
//! [keymaps.mine.navigate]
//! "C-s" = "copy"
//!
//! [keymaps.mine.edit]
//! "C-Enter" = "commit_stay"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cellgrid_core::{CommitDirection, Direction, GridAction};
use directories::ProjectDirs;
use serde::Deserialize;

use super::types::{CustomKeymap, KeyCombo, KeyTable, Keymap};
use crate::error::KeymapError;

const MAX_FILE_BYTES: u64 = 1024 * 1024;
const MAX_BINDINGS_PER_MODE: usize = 512;
const FALLBACK: &str = "standard";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct KeymapsFile {
    default: Option<String>,
    #[serde(default)]
    keymaps: BTreeMap<String, KeymapEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct KeymapEntry {
    description: Option<String>,
    extends: Option<String>,
    #[serde(default)]
    navigate: BTreeMap<String, String>,
    #[serde(default)]
    edit: BTreeMap<String, String>,
}

/// Action names accepted in keymap files.
const ACTIONS: &[(&str, GridAction)] = &[
    ("move_left", GridAction::Move(Direction::Left)),
    ("move_right", GridAction::Move(Direction::Right)),
    ("move_up", GridAction::Move(Direction::Up)),
    ("move_down", GridAction::Move(Direction::Down)),
    ("extend_left", GridAction::Extend(Direction::Left)),
    ("extend_right", GridAction::Extend(Direction::Right)),
    ("extend_up", GridAction::Extend(Direction::Up)),
    ("extend_down", GridAction::Extend(Direction::Down)),
    ("page_up", GridAction::PageUp),
    ("page_down", GridAction::PageDown),
    ("row_start", GridAction::RowStart),
    ("row_end", GridAction::RowEnd),
    ("goto_first", GridAction::GotoFirst),
    ("goto_last", GridAction::GotoLast),
    ("select_all", GridAction::SelectAll),
    ("begin_edit", GridAction::BeginEdit),
    ("backspace", GridAction::Backspace),
    ("delete_forward", GridAction::DeleteForward),
    ("cursor_left", GridAction::CursorLeft),
    ("cursor_right", GridAction::CursorRight),
    ("cursor_home", GridAction::CursorHome),
    ("cursor_end", GridAction::CursorEnd),
    ("commit_down", GridAction::Commit(CommitDirection::Down)),
    ("commit_up", GridAction::Commit(CommitDirection::Up)),
    ("commit_right", GridAction::Commit(CommitDirection::Right)),
    ("commit_left", GridAction::Commit(CommitDirection::Left)),
    ("commit_stay", GridAction::Commit(CommitDirection::Stay)),
    ("cancel_edit", GridAction::CancelEdit),
    ("delete", GridAction::DeleteSelection),
    ("undo", GridAction::Undo),
    ("redo", GridAction::Redo),
    ("copy", GridAction::Copy),
    ("cut", GridAction::Cut),
    ("paste", GridAction::Paste),
];

fn action_named(name: &str) -> Option<GridAction> {
    let name = name.trim();
    ACTIONS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, action)| *action)
}

/// Pick the keymap named on the command line, else the file's `default`,
/// else `standard`. Never fails; everything skipped along the way comes
/// back as a warning and the built-in `standard` keymap is the last resort.
pub fn load_keymap(
    requested: Option<&str>,
    keymap_file: Option<&PathBuf>,
) -> (Keymap, Vec<String>) {
    let mut warnings = Vec::new();
    let file = match keymap_file {
        Some(path) => read_keymaps(path, true),
        None => match user_keymaps_path() {
            Some(path) => read_keymaps(&path, false),
            None => Ok(None),
        },
    }
    .unwrap_or_else(|err| {
        warnings.push(err.to_string());
        None
    })
    .unwrap_or_default();

    let name = requested
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .or(file.default.as_deref())
        .unwrap_or(FALLBACK);

    match resolve(name, &file) {
        Ok(keymap) => (keymap, warnings),
        Err(errors) => {
            warnings.extend(errors.iter().map(ToString::to_string));
            warnings.push(format!(
                "Falling back to built-in '{FALLBACK}' keymap for '{name}'"
            ));
            (Keymap::Standard, warnings)
        }
    }
}

fn user_keymaps_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "cellgrid")?;
    Some(dirs.config_dir().join("keymaps.toml"))
}

/// A missing user file is fine; a missing explicit one is reported.
fn read_keymaps(path: &Path, explicit: bool) -> Result<Option<KeymapsFile>, KeymapError> {
    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return if explicit {
                Err(KeymapError::FileNotFound(path.to_path_buf()))
            } else {
                Ok(None)
            };
        }
        Err(source) => {
            return Err(KeymapError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if size > MAX_FILE_BYTES {
        return Err(KeymapError::TooLarge {
            path: path.to_path_buf(),
            size,
            max: MAX_FILE_BYTES,
        });
    }
    let text = std::fs::read_to_string(path).map_err(|source| KeymapError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text)
        .map(Some)
        .map_err(|source| KeymapError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// File entries shadow built-ins of the same name.
fn resolve(name: &str, file: &KeymapsFile) -> Result<Keymap, Vec<KeymapError>> {
    match file.keymaps.get(name) {
        Some(entry) => build_custom(name, entry),
        None => Keymap::builtin(name)
            .ok_or_else(|| vec![KeymapError::UnknownKeymap(name.to_string())]),
    }
}

fn build_custom(name: &str, entry: &KeymapEntry) -> Result<Keymap, Vec<KeymapError>> {
    let mut errors = Vec::new();
    let base = entry.extends.as_deref().and_then(|base| {
        let found = Keymap::builtin(base);
        if found.is_none() {
            errors.push(KeymapError::UnknownBase {
                name: name.to_string(),
                base: base.to_string(),
            });
        }
        found.map(Box::new)
    });
    let navigate = key_table("navigate", &entry.navigate, &mut errors);
    let edit = key_table("edit", &entry.edit, &mut errors);
    if !errors.is_empty() {
        return Err(errors);
    }

    let custom = CustomKeymap {
        name: name.to_string(),
        description: entry.description.clone(),
        base,
        navigate,
        edit,
    };
    tracing::debug!(
        keymap = %custom.name,
        description = custom.description.as_deref().unwrap_or(""),
        extends = entry.extends.as_deref().unwrap_or("-"),
        "loaded custom keymap"
    );
    Ok(Keymap::Custom(custom))
}

fn key_table(
    mode: &'static str,
    raw: &BTreeMap<String, String>,
    errors: &mut Vec<KeymapError>,
) -> KeyTable {
    let mut table = KeyTable::default();
    if raw.len() > MAX_BINDINGS_PER_MODE {
        errors.push(KeymapError::TooManyBindings {
            mode,
            count: raw.len(),
            max: MAX_BINDINGS_PER_MODE,
        });
        return table;
    }
    for (key, action_name) in raw {
        let combo = match key.parse::<KeyCombo>() {
            Ok(combo) => combo,
            Err(err) => {
                errors.push(KeymapError::BadKey {
                    key: key.clone(),
                    mode,
                    source: Box::new(err),
                });
                continue;
            }
        };
        let Some(action) = action_named(action_name) else {
            errors.push(KeymapError::UnknownAction {
                action: action_name.clone(),
                mode,
            });
            continue;
        };
        // "C-s" and "ctrl-s" are the same key.
        if table.bind(combo, action).is_some() {
            errors.push(KeymapError::DuplicateBinding {
                combo: combo.to_string(),
                mode,
            });
        }
    }
    table
}
