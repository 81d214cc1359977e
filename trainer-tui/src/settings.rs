//! Persisted engine settings: executable path and per-query time budget.

use engine::{EngineSessionConfig, MAX_MOVETIME_MS, MIN_MOVETIME_MS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub engine_path: Option<String>,
    pub engine_time_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine_path: None,
            engine_time_ms: 1_000,
        }
    }
}

impl Settings {
    pub fn clamped(mut self) -> Self {
        self.engine_time_ms = self.engine_time_ms.clamp(MIN_MOVETIME_MS, MAX_MOVETIME_MS);
        self
    }

    pub fn engine_config(&self) -> EngineSessionConfig {
        EngineSessionConfig {
            path: self.engine_path.as_ref().map(PathBuf::from),
            movetime_ms: self.engine_time_ms,
        }
    }
}

fn default_settings_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".traintty")
}

fn settings_path_in(dir: PathBuf) -> PathBuf {
    dir.join("settings.json")
}

/// Load settings, falling back to defaults when the file is missing or
/// unreadable. Out-of-range time budgets are clamped on the way in.
pub fn load_or_default() -> Settings {
    match load_from(default_settings_dir()) {
        Ok(Some(settings)) => settings.clamped(),
        Ok(None) => Settings::default(),
        Err(e) => {
            tracing::warn!("failed to load settings: {}", e);
            Settings::default()
        }
    }
}

fn load_from(dir: PathBuf) -> Result<Option<Settings>, String> {
    let path = settings_path_in(dir);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| format!("failed to read settings file: {}", e))?;
    let settings: Settings = serde_json::from_str(&contents)
        .map_err(|e| format!("failed to parse settings file: {}", e))?;

    Ok(Some(settings))
}

/// Save settings to disk.
pub fn save(settings: &Settings) -> Result<PathBuf, String> {
    save_to(settings, default_settings_dir())
}

fn save_to(settings: &Settings, dir: PathBuf) -> Result<PathBuf, String> {
    std::fs::create_dir_all(&dir).map_err(|e| format!("failed to create directory: {}", e))?;

    let path = settings_path_in(dir);
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| format!("failed to serialize settings: {}", e))?;
    std::fs::write(&path, json).map_err(|e| format!("failed to write settings file: {}", e))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            engine_path: Some("/usr/bin/stockfish".to_string()),
            engine_time_ms: 2_500,
        };

        save_to(&settings, dir.path().to_path_buf()).unwrap();
        let loaded = load_from(dir.path().to_path_buf()).unwrap();
        assert_eq!(loaded, Some(settings));
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_from(dir.path().to_path_buf()).unwrap(), None);
    }

    #[test]
    fn clamping_bounds_the_time_budget() {
        let settings = Settings {
            engine_path: None,
            engine_time_ms: 5,
        };
        assert_eq!(settings.clamped().engine_time_ms, MIN_MOVETIME_MS);

        let settings = Settings {
            engine_path: None,
            engine_time_ms: 1_000_000,
        };
        assert_eq!(settings.clamped().engine_time_ms, MAX_MOVETIME_MS);
    }

    #[test]
    fn engine_config_carries_path_and_budget() {
        let settings = Settings {
            engine_path: Some("/opt/sf".to_string()),
            engine_time_ms: 750,
        };
        let config = settings.engine_config();
        assert_eq!(config.path, Some(PathBuf::from("/opt/sf")));
        assert_eq!(config.movetime_ms, 750);
    }
}
