//! Keymap translation layer.
//!
//! Keys are translated to [`GridAction`]s here so the engine never sees
//! raw key events.
//! - Standard keymap: spreadsheet-style, typing replaces the active cell.
//! - Vim keymap: letter keys navigate; edit mode is shared with standard.
//! - Custom keymaps from `keymaps.toml`, optionally extending a built-in.

mod defaults;
mod load;
mod types;

pub use load::load_keymap;
pub use types::{KeyCombo, Keymap};

use cellgrid_core::{EngineMode, GridAction};
use crossterm::event::KeyEvent;

/// Translate a key event to an action based on the current keymap and mode.
///
/// Returns `None` if the key has no binding in the current context.
pub fn translate(keymap: &Keymap, mode: EngineMode, key: KeyEvent) -> Option<GridAction> {
    match keymap {
        Keymap::Standard => defaults::translate_standard(mode, key),
        Keymap::Vim => defaults::translate_vim(mode, key),
        Keymap::Custom(custom) => custom.translate(mode, key),
    }
}
