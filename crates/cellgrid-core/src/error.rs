//! Error types for cellgrid core.
//!
//! Interactive operations never fail (they clamp or no-op); only the edges
//! that touch the outside world return these.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Refusing to read {}: file too large ({} bytes, max {})", .path.display(), .size, .max)]
    ConfigTooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),
}

pub type Result<T> = std::result::Result<T, GridError>;
