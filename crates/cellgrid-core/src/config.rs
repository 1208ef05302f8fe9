//! Engine configuration.
//!
//! Every field has a default, so an empty TOML file (or none at all) yields
//! the stock 1000×1000 grid with a single frozen header row and column.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GridError, Result};
use crate::viewport::ResizeStrategy;

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub row_count: usize,
    pub column_count: usize,
    /// Leading rows pinned while scrolling, counting the header row.
    pub frozen_rows: usize,
    /// Leading columns pinned while scrolling, counting the header column.
    pub frozen_columns: usize,
    pub layout: LayoutConfig,
    pub sizing: SizingConfig,
    pub history: HistoryConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub default_column_width: f32,
    pub default_row_height: f32,
    pub header_column_width: f32,
    pub header_row_height: f32,
    /// Extra rows/columns materialized beyond the visible edge.
    pub overscan: usize,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizingConfig {
    pub strategy: ResizeStrategy,
    pub min_column_width: f32,
    pub char_width: f32,
    pub line_height: f32,
    pub cell_padding: f32,
    pub auto_row_height: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    pub limit: usize,
    /// Record a full range patch for multi-cell paste instead of the anchor only.
    pub undoable_paste: bool,
    /// Record a range patch for cut.
    pub undoable_cut: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            row_count: 1000,
            column_count: 1000,
            frozen_rows: 1,
            frozen_columns: 1,
            layout: LayoutConfig::default(),
            sizing: SizingConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            default_column_width: 100.0,
            default_row_height: 22.0,
            header_column_width: 46.0,
            header_row_height: 22.0,
            overscan: 2,
            viewport_width: 800.0,
            viewport_height: 600.0,
        }
    }
}

impl Default for SizingConfig {
    fn default() -> Self {
        SizingConfig {
            strategy: ResizeStrategy::Full,
            min_column_width: 100.0,
            char_width: 7.0,
            line_height: 16.0,
            cell_padding: 10.0,
            auto_row_height: false,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            limit: 100,
            undoable_paste: false,
            undoable_cut: false,
        }
    }
}

impl GridConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GridConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, refusing oversized files.
    pub fn load(path: &Path) -> Result<Self> {
        let size = std::fs::metadata(path)?.len();
        if size > MAX_CONFIG_FILE_BYTES {
            return Err(GridError::ConfigTooLarge {
                path: path.to_path_buf(),
                size,
                max: MAX_CONFIG_FILE_BYTES,
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load the explicit path if given, else the user config file if it
    /// exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match user_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.row_count == 0 || self.column_count == 0 {
            return Err(GridError::InvalidConfig(
                "row_count and column_count must be at least 1".to_string(),
            ));
        }
        if self.frozen_rows > self.row_count + 1 || self.frozen_columns > self.column_count + 1 {
            return Err(GridError::InvalidConfig(format!(
                "frozen area {}x{} exceeds the grid",
                self.frozen_rows, self.frozen_columns
            )));
        }
        let layout = &self.layout;
        let sizes = [
            ("layout.default_column_width", layout.default_column_width),
            ("layout.default_row_height", layout.default_row_height),
            ("layout.header_column_width", layout.header_column_width),
            ("layout.header_row_height", layout.header_row_height),
            ("sizing.char_width", self.sizing.char_width),
            ("sizing.line_height", self.sizing.line_height),
        ];
        for (name, value) in sizes {
            if !(value.is_finite() && value > 0.0) {
                return Err(GridError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if !(layout.viewport_width >= 0.0 && layout.viewport_height >= 0.0) {
            return Err(GridError::InvalidConfig(
                "viewport size must not be negative".to_string(),
            ));
        }
        if let ResizeStrategy::Sampled(0) = self.sizing.strategy {
            return Err(GridError::InvalidConfig(
                "sizing.strategy sampled needs at least one sample".to_string(),
            ));
        }
        Ok(())
    }
}

/// `<config dir>/cellgrid/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "cellgrid")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
