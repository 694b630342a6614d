//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/crushrs/settings.toml (or platform equivalent)

use crate::board::{DEFAULT_COLS, DEFAULT_ROWS};
use crate::error::{EngineError, SettingsError};
use crate::tile::DEFAULT_PALETTE;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Engine settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub board: BoardSettings,
    pub engine: EngineSettings,
    pub session: SessionSettings,
    pub output: OutputSettings,
}

/// Board shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    pub rows: usize,
    pub cols: usize,
    /// Number of candy colours
    pub palette: u8,
}

/// Resolution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Fills tried before giving up on a match-free board
    pub seed_attempts: u32,
    /// Pause after each cascade pass, for watching the board settle
    pub pass_delay_ms: u64,
    /// Fresh boards tried in a row when the current one has no legal move
    pub reseed_limit: u32,
}

/// Session counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub moves: u32,
    pub target_score: u64,
    pub target_step: u64,
    /// Fixed seed for reproducible sessions
    pub seed: Option<u64>,
}

/// Output settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Print each turn result as a JSON line
    pub json: bool,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            palette: DEFAULT_PALETTE,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            seed_attempts: 1000,
            pass_delay_ms: 0,
            reseed_limit: 16,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            moves: 20,
            target_score: 60,
            target_step: 30,
            seed: None,
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "crushrs", "crushrs").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from the config directory, or fall back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Using default settings: {}", e);
                Self::default()
            }
        }
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save settings to the config directory
    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::settings_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save settings to a specific file, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| SettingsError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let contents = toml::to_string_pretty(self)?;

        fs::write(path, contents).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject boards the engine cannot play on
    pub fn validate(&self) -> Result<(), EngineError> {
        let BoardSettings { rows, cols, palette } = self.board;
        if rows < 3 || cols < 3 {
            return Err(EngineError::InvalidDimensions { rows, cols });
        }
        if !(3..=9).contains(&palette) {
            return Err(EngineError::InvalidPalette(palette));
        }
        Ok(())
    }
}
