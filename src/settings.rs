use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::charts::ChartKind;
use crate::error::{Result, TallyError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
    #[serde(default = "default_chart")]
    pub default_chart: ChartKind,
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_top_n() -> usize {
    5
}

fn default_histogram_bins() -> usize {
    10
}

fn default_chart() -> ChartKind {
    ChartKind::Pie
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            top_n: default_top_n(),
            histogram_bins: default_histogram_bins(),
            default_chart: default_chart(),
        }
    }
}

impl Settings {
    /// Update one setting by its JSON key, validating the new value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let positive = |v: &str| -> Result<usize> {
            match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(TallyError::Settings(format!("{key} must be a positive integer, got {v:?}"))),
            }
        };
        match key {
            "currency_symbol" => self.currency_symbol = value.to_string(),
            "top_n" => self.top_n = positive(value)?,
            "histogram_bins" => self.histogram_bins = positive(value)?,
            "default_chart" => self.default_chart = value.parse()?,
            _ => return Err(TallyError::Settings(format!("unknown setting {key:?}"))),
        }
        Ok(())
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tally")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings_from(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    let content = std::fs::read_to_string(path).unwrap_or_default();
    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!("Ignoring unreadable settings file {}: {e}", path.display());
        Settings::default()
    })
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| TallyError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(&settings_path(), settings)
}
