//! Error types for the cellgrid driver

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while running a command script
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown command at line {line}: {command}")]
    UnknownCommand { line: usize, command: String },

    #[error("Bad argument at line {line}: {message}")]
    BadArgument { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, ScriptError>;

/// Problems found while loading keymaps. None of them is fatal: the loader
/// reports each one as a warning and falls back to a built-in keymap.
#[derive(Error, Debug)]
pub enum KeymapError {
    #[error("Keymap file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Refusing to read {}: file too large ({size} bytes, max {max})", .path.display())]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Keymap '{0}' not found")]
    UnknownKeymap(String),

    #[error("Keymap '{name}' extends unknown keymap '{base}'")]
    UnknownBase { name: String, base: String },

    #[error("unknown key '{0}'")]
    UnknownKey(String),

    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),

    #[error("duplicate modifier '{0}'")]
    DuplicateModifier(String),

    #[error("Invalid key '{key}' in {mode} bindings: {source}")]
    BadKey {
        key: String,
        mode: &'static str,
        source: Box<KeymapError>,
    },

    #[error("Unknown action '{action}' in {mode} bindings")]
    UnknownAction { action: String, mode: &'static str },

    #[error("Key '{combo}' is bound twice in {mode} bindings")]
    DuplicateBinding { combo: String, mode: &'static str },

    #[error("Too many {mode} bindings: {count} (max {max})")]
    TooManyBindings {
        mode: &'static str,
        count: usize,
        max: usize,
    },
}
