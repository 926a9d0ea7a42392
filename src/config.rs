//! Persisted user settings (lives in the OS config directory).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::timeline::{MAX_PIXELS_PER_DAY, MIN_PIXELS_PER_DAY};

pub const DEFAULT_PIXELS_PER_DAY: f32 = 56.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Horizontal scale; also the pointer-to-day conversion factor.
    pub pixels_per_day: f32,
    pub row_height: f32,
    pub row_gap: f32,
    /// Items file opened on startup, if any.
    pub last_items_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pixels_per_day: DEFAULT_PIXELS_PER_DAY,
            row_height: 40.0,
            row_gap: 10.0,
            last_items_file: None,
        }
    }
}

impl Settings {
    /// Location of `settings.json`, falling back to the working directory.
    pub fn default_path() -> PathBuf {
        match directories::ProjectDirs::from("", "", "GanttLanes") {
            Some(dirs) => dirs.config_dir().join("settings.json"),
            None => PathBuf::from("settings.json"),
        }
    }

    /// Load settings, using defaults for anything missing or unreadable.
    pub fn load(path: &Path) -> Self {
        let settings = match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!("Ignoring malformed settings {:?}: {}", path, e);
                    Settings::default()
                }
            },
            Err(_) => Settings::default(),
        };
        settings.sanitized()
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Clamp geometry into usable ranges.
    pub fn sanitized(mut self) -> Self {
        let defaults = Settings::default();
        if !self.pixels_per_day.is_finite() || self.pixels_per_day <= 0.0 {
            tracing::warn!(
                pixels_per_day = self.pixels_per_day,
                "Invalid pixels_per_day, using default"
            );
            self.pixels_per_day = defaults.pixels_per_day;
        }
        self.pixels_per_day = self
            .pixels_per_day
            .clamp(MIN_PIXELS_PER_DAY, MAX_PIXELS_PER_DAY);
        if !self.row_height.is_finite() || self.row_height < 12.0 {
            self.row_height = defaults.row_height;
        }
        if !self.row_gap.is_finite() || self.row_gap < 0.0 {
            self.row_gap = defaults.row_gap;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("nope.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "pixels_per_day": 30.0 }"#).unwrap();
        let settings = Settings::load(&path);
        assert_eq!(settings.pixels_per_day, 30.0);
        assert_eq!(settings.row_height, 40.0);
    }

    #[test]
    fn bad_values_are_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "pixels_per_day": -3.0, "row_gap": -1.0 }"#).unwrap();
        let settings = Settings::load(&path);
        assert_eq!(settings.pixels_per_day, DEFAULT_PIXELS_PER_DAY);
        assert_eq!(settings.row_gap, 10.0);

        std::fs::write(&path, "not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            pixels_per_day: 24.0,
            last_items_file: Some(PathBuf::from("items.json")),
            ..Default::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
    }
}
