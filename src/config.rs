use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::auth::Account;
use crate::catalog::AnswerVariant;

pub const APP_NAME: &str = "sheetcards";
pub const CONFIG_FILE: &str = "sheetcards.toml";

/// Which remote grid variant this install talks to. One interface, chosen
/// once at startup; there are no forked code paths past this point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    /// Spreadsheet values API, addressed by spreadsheet id.
    Sheets { spreadsheet_id: String },
    /// Published CSV export; `{sheet}` in the URL is replaced per level.
    Csv { url: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Single correct answer per row, or an ordered pair of sub-answers.
    pub answers: AnswerVariant,
    /// Highest level offered by the level navigation.
    pub levels: u32,
    /// 1-based sheet row the session starts on.
    pub first_row: usize,
    /// Timer granularity while an exercise clock runs.
    pub tick_millis: u64,
    pub source: SourceConfig,
    /// Accounts offered by the picker (Sheets variant only).
    #[serde(default)]
    pub accounts: Vec<Account>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            answers: AnswerVariant::Single,
            levels: 10,
            first_row: 1,
            tick_millis: 100,
            source: SourceConfig::Sheets {
                spreadsheet_id: String::new(),
            },
            accounts: Vec::new(),
        }
    }
}

impl Config {
    pub fn config_file_path() -> io::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| io::Error::other("unable to determine config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Load from the standard location, falling back to defaults when no
    /// file exists yet.
    pub fn load() -> io::Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| io::Error::other(format!("failed to parse {}: {}", path.display(), e)))
    }

    pub fn save(&self) -> io::Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| io::Error::other(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)
    }
}
