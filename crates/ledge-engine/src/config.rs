//! Engine configuration.
//!
//! Run length, timing, level selection and logging, plus the simulation,
//! character and platform tuning tables. Configuration can be loaded from
//! and saved to a TOML file.

use ledge_gameplay::{CharacterConfig, PlatformConfig};
use ledge_kernel::SimulationConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "ledge.toml";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Timing ===
    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Ticks to simulate before exiting
    pub ticks: u64,
    /// Longest frame fed to the fixed timestep, in seconds
    pub max_frame_time: f32,
    /// Random frame time variation, as a fraction of one tick
    pub frame_jitter: f32,

    // === Level ===
    /// Level file to load (None = generate one)
    pub level: Option<PathBuf>,
    /// Seed for generated levels and frame jitter
    pub seed: u64,
    /// Generated level width in tiles
    pub level_width: usize,
    /// Generated level height in tiles
    pub level_height: usize,

    // === Logging ===
    /// Ticks between player status lines (0 = never)
    pub log_interval: u64,
    /// Emit JSON log lines
    pub log_json: bool,

    // === Tuning ===
    /// Broad phase and map edges
    pub simulation: SimulationConfig,
    /// Character movement
    pub character: CharacterConfig,
    /// Moving platforms
    pub platform: PlatformConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            ticks: 600,
            max_frame_time: 0.25,
            frame_jitter: 0.3,

            level: None,
            seed: 1,
            level_width: 48,
            level_height: 24,

            log_interval: 60,
            log_json: false,

            simulation: SimulationConfig::default(),
            character: CharacterConfig::default(),
            platform: PlatformConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from `ledge.toml` in the working directory.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str::<Self>(&contents) {
                    Ok(mut config) => {
                        config.validate();
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamp values to sensible ranges.
    pub fn validate(&mut self) {
        self.tick_rate = self.tick_rate.clamp(10, 1000);
        self.max_frame_time = self.max_frame_time.clamp(self.fixed_dt(), 1.0);
        self.frame_jitter = self.frame_jitter.clamp(0.0, 0.9);
        self.level_width = self.level_width.clamp(16, 1024);
        self.level_height = self.level_height.clamp(10, 1024);

        self.simulation.validate();
        self.character.validate();
        self.platform.validate();
    }

    /// Length of one tick in seconds.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledge_kernel::BorderPolicy;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.tick_rate, 60);
        assert!(config.level.is_none());
        assert_eq!(config.simulation.area_width, 16);
        assert!((config.fixed_dt() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();
        config.tick_rate = 1;
        config.frame_jitter = 5.0;
        config.simulation.area_width = 0;

        config.validate();

        assert_eq!(config.tick_rate, 10);
        assert_eq!(config.frame_jitter, 0.9);
        assert_eq!(config.simulation.area_width, 1);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("ledge.toml");

        let mut config = EngineConfig::default();
        config.ticks = 1234;
        config.level = Some(PathBuf::from("levels/cave.ron"));
        config.simulation.border = BorderPolicy::Open;
        config.character.walk_speed = 120.0;

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_partial_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("ledge.toml");
        fs::write(&config_path, "ticks = 30\n\n[character]\njump_speed = 300.0\n").expect("write");

        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded.ticks, 30);
        assert_eq!(loaded.character.jump_speed, 300.0);
        assert_eq!(loaded.character.walk_speed, 160.0);
        assert_eq!(loaded.tick_rate, 60);
    }

    #[test]
    fn test_config_load_missing_or_invalid() {
        let config = EngineConfig::load_from("/nonexistent/path/ledge.toml");
        assert_eq!(config, EngineConfig::default());

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "ticks = \"many\"").expect("write");
        assert_eq!(EngineConfig::load_from(&config_path), EngineConfig::default());
    }

    #[test]
    fn test_config_toml_serialization() {
        let toml_str = toml::to_string_pretty(&EngineConfig::default()).expect("Failed to serialize");
        assert!(toml_str.contains("tick_rate"));
        assert!(toml_str.contains("[simulation]"));
        assert!(toml_str.contains("border = \"solid\""));
    }
}
