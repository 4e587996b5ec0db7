use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tetris_core::{ColorMode, SpawnCheck};

pub const DEFAULT_GRAVITY_INTERVAL_MS: u64 = 500;
const MIN_GRAVITY_INTERVAL_MS: u64 = 25;
const MAX_HISTORY_FRAMES: usize = 100_000;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("settings file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameplaySettings {
    pub gravity_interval_ms: u64,
    /// Fixed RNG seed; `None` picks a fresh one per launch.
    pub seed: Option<u64>,
    pub color_mode: ColorMode,
    pub spawn_check: SpawnCheck,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            gravity_interval_ms: DEFAULT_GRAVITY_INTERVAL_MS,
            seed: None,
            color_mode: ColorMode::Random,
            spawn_check: SpawnCheck::Deferred,
        }
    }
}

impl GameplaySettings {
    pub fn gravity_interval(&self) -> Duration {
        Duration::from_millis(self.gravity_interval_ms)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VideoSettings {
    pub vsync: bool,
    pub frame_rate_hz: u32,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            vsync: true,
            frame_rate_hz: 60,
        }
    }
}

impl VideoSettings {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate_hz.max(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub gameplay: GameplaySettings,
    #[serde(default)]
    pub video: VideoSettings,
    /// Frames of state history kept by the windowed runner.
    #[serde(default = "default_history_frames")]
    pub history_frames: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            gameplay: GameplaySettings::default(),
            video: VideoSettings::default(),
            history_frames: default_history_frames(),
        }
    }
}

impl GameSettings {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        self.gameplay.gravity_interval_ms = self
            .gameplay
            .gravity_interval_ms
            .max(MIN_GRAVITY_INTERVAL_MS);
        self.video.frame_rate_hz = self.video.frame_rate_hz.clamp(1, 240);
        self.history_frames = self.history_frames.clamp(1, MAX_HISTORY_FRAMES);
        self
    }
}

fn default_version() -> u32 {
    1
}

fn default_history_frames() -> usize {
    2_048
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `TETRIS_SETTINGS_PATH`, else `$XDG_CONFIG_HOME/tetris/settings.json`, else
    /// `$HOME/.config/tetris/settings.json`, else `./tetris/settings.json`.
    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("TETRIS_SETTINGS_PATH") {
            return Self::new(explicit);
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));

        Self::new(base.join("tetris").join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn try_load(&self) -> Result<GameSettings, SettingsError> {
        let bytes = fs::read(&self.path).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })?;
        let settings: GameSettings =
            serde_json::from_slice(&bytes).map_err(|source| SettingsError::Parse {
                path: self.path.clone(),
                source,
            })?;
        Ok(settings.sanitized())
    }

    /// Like `try_load`, but a missing or unreadable file yields the defaults.
    pub fn load(&self) -> GameSettings {
        match self.try_load() {
            Ok(settings) => settings,
            Err(SettingsError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                GameSettings::default()
            }
            Err(err) => {
                tracing::warn!("{err}; using default settings");
                GameSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &GameSettings) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let text = serde_json::to_string_pretty(settings).map_err(|source| SettingsError::Parse {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, text).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        process,
        time::{SystemTime, UNIX_EPOCH},
    };

    fn unique_settings_path(test_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!(
            "tetris_settings_{test_name}_{}_{}/settings.json",
            process::id(),
            nanos
        ))
    }

    #[test]
    fn defaults_match_reference_tick() {
        let s = GameSettings::default();
        assert_eq!(s.gameplay.gravity_interval(), Duration::from_millis(500));
        assert_eq!(s.gameplay.color_mode, ColorMode::Random);
        assert_eq!(s.gameplay.spawn_check, SpawnCheck::Deferred);
    }

    #[test]
    fn sanitized_clamps_expected_fields() {
        let mut s = GameSettings {
            version: 42,
            ..GameSettings::default()
        };
        s.gameplay.gravity_interval_ms = 0;
        s.video.frame_rate_hz = 0;
        s.history_frames = 0;

        let s = s.sanitized();
        assert_eq!(s.version, 1);
        assert_eq!(s.gameplay.gravity_interval_ms, MIN_GRAVITY_INTERVAL_MS);
        assert_eq!(s.video.frame_rate_hz, 1);
        assert_eq!(s.history_frames, 1);
    }

    #[test]
    fn serde_defaults_fill_missing_sections() {
        let parsed: GameSettings = serde_json::from_str(
            r#"{"gameplay":{"gravity_interval_ms":300,"seed":7,"color_mode":"by_shape","spawn_check":"immediate"}}"#,
        )
        .expect("settings JSON should parse");
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.gameplay.seed, Some(7));
        assert_eq!(parsed.gameplay.color_mode, ColorMode::ByShape);
        assert_eq!(parsed.video, VideoSettings::default());
        assert_eq!(parsed.history_frames, default_history_frames());
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = unique_settings_path("roundtrip");
        let store = SettingsStore::new(&path);
        let mut settings = GameSettings::default();
        settings.gameplay.seed = Some(99);
        settings.video.vsync = false;

        store.save(&settings).expect("save settings");
        assert_eq!(store.try_load().expect("load settings"), settings);

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn load_falls_back_to_defaults_on_garbage() {
        let path = unique_settings_path("garbage");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"not json").unwrap();

        let store = SettingsStore::new(&path);
        assert!(matches!(store.try_load(), Err(SettingsError::Parse { .. })));
        assert_eq!(store.load(), GameSettings::default());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let store = SettingsStore::new(unique_settings_path("missing"));
        assert_eq!(store.load(), GameSettings::default());
    }
}
