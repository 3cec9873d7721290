use crate::error::{PlayerError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

/// User-tunable player settings, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub visualizer: VisualizerConfig,
    pub transport: TransportConfig,
    /// Extensions offered by the open-file dialog.
    pub audio_extensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    pub bar_count: usize,
    pub min_height: f64,
    pub max_height: f64,
    pub idle_height: f64,
    pub playing_alpha: f64,
    pub idle_alpha: f64,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            bar_count: 30,
            min_height: 20.0,
            max_height: 150.0,
            idle_height: 10.0,
            playing_alpha: 0.15,
            idle_alpha: 0.10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub position_tick_ms: u64,
    pub visualizer_tick_ms: u64,
    /// Minimum slider movement (0-100 scale) before the engine position is
    /// pushed to the slider.
    pub hysteresis: f64,
    /// Issue normalized seeks while the slider is being dragged, in addition
    /// to the time-based seek on release.
    pub live_seek_while_dragging: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            position_tick_ms: 200,
            visualizer_tick_ms: 50,
            hysteresis: 1.0,
            live_seek_while_dragging: true,
        }
    }
}

impl TransportConfig {
    pub fn position_interval(&self) -> Duration {
        Duration::from_millis(self.position_tick_ms)
    }

    pub fn visualizer_interval(&self) -> Duration {
        Duration::from_millis(self.visualizer_tick_ms)
    }
}

fn default_extensions() -> Vec<String> {
    ["mp3", "wav", "aac", "ogg"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            visualizer: VisualizerConfig::default(),
            transport: TransportConfig::default(),
            audio_extensions: default_extensions(),
        }
    }
}

impl PlayerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save the config to a JSON file at the given path.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Load a config from a JSON file. Sections missing from the file keep
    /// their defaults; the result is validated before it is returned.
    pub fn load_from_file(path: &Path) -> Result<PlayerConfig> {
        let mut file = File::open(path)?;
        let mut json = String::new();
        file.read_to_string(&mut json)?;
        let mut config: PlayerConfig = serde_json::from_str(&json)?;
        if config.audio_extensions.is_empty() {
            config.audio_extensions = default_extensions();
        }
        config.validate()?;
        Ok(config)
    }

    /// Like [`PlayerConfig::load_from_file`], but a missing file yields the
    /// defaults instead of an error.
    pub fn load_or_default(path: &Path) -> Result<PlayerConfig> {
        if !path.exists() {
            tracing::debug!(?path, "no config file, using defaults");
            return Ok(Self::new());
        }
        Self::load_from_file(path)
    }

    pub fn validate(&self) -> Result<()> {
        let vis = &self.visualizer;
        if vis.bar_count == 0 {
            return Err(PlayerError::Config("bar_count must be at least 1".into()));
        }
        if !(vis.min_height >= 0.0 && vis.min_height <= vis.max_height) {
            return Err(PlayerError::Config(format!(
                "min_height {} must be within 0..=max_height {}",
                vis.min_height, vis.max_height
            )));
        }
        for (name, alpha) in [
            ("playing_alpha", vis.playing_alpha),
            ("idle_alpha", vis.idle_alpha),
        ] {
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(PlayerError::Config(format!(
                    "{name} must be in (0, 1], got {alpha}"
                )));
            }
        }
        let transport = &self.transport;
        if transport.position_tick_ms == 0 || transport.visualizer_tick_ms == 0 {
            return Err(PlayerError::Config("tick intervals must be positive".into()));
        }
        if transport.hysteresis < 0.0 {
            return Err(PlayerError::Config("hysteresis must not be negative".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_player_constants() {
        let config = PlayerConfig::new();
        assert_eq!(config.visualizer.bar_count, 30);
        assert_eq!(config.visualizer.min_height, 20.0);
        assert_eq!(config.visualizer.max_height, 150.0);
        assert_eq!(config.visualizer.idle_height, 10.0);
        assert_eq!(config.transport.position_tick_ms, 200);
        assert_eq!(config.transport.visualizer_tick_ms, 50);
        assert_eq!(config.audio_extensions, vec!["mp3", "wav", "aac", "ogg"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("player.json");
        let mut config = PlayerConfig::new();
        config.visualizer.bar_count = 12;
        config.transport.hysteresis = 2.5;
        config.save_to_file(&path).unwrap();

        let loaded = PlayerConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("player.json");
        std::fs::write(&path, r#"{ "visualizer": { "bar_count": 8 } }"#).unwrap();

        let loaded = PlayerConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.visualizer.bar_count, 8);
        assert_eq!(loaded.visualizer.max_height, 150.0);
        assert_eq!(loaded.transport, TransportConfig::default());
        assert_eq!(loaded.audio_extensions.len(), 4);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = PlayerConfig::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, PlayerConfig::new());
    }

    #[test]
    fn test_rejects_inverted_heights() {
        let mut config = PlayerConfig::new();
        config.visualizer.min_height = 200.0;
        assert!(matches!(config.validate(), Err(PlayerError::Config(_))));
    }

    #[test]
    fn test_rejects_zero_alpha_and_zero_interval() {
        let mut config = PlayerConfig::new();
        config.visualizer.idle_alpha = 0.0;
        assert!(config.validate().is_err());

        let mut config = PlayerConfig::new();
        config.transport.position_tick_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("player.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            PlayerConfig::load_from_file(&path),
            Err(PlayerError::Config(_))
        ));
    }
}
