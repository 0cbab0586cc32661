//! Engine configuration with sensible defaults and JSON persistence.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. `run()` reads the file named by [`CONFIG_ENV_VAR`] if it is set and
//! falls back to the defaults otherwise.

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::engine_state::voxels::chunk::CHUNK_HEIGHT;
use crate::error::ConfigError;

/// Environment variable holding the path of the config file.
pub const CONFIG_ENV_VAR: &str = "VOXEL_MESHER_CONFIG";

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Radius, in chunks, of the square area loaded around the origin.
    pub render_distance: i32,
    /// Worker threads for generation and meshing (0 = available parallelism).
    pub worker_threads: usize,
    /// Random block edits applied after the initial load.
    pub demo_edits: usize,
    /// How long to wait for the task pipeline to drain, in milliseconds.
    pub idle_timeout_ms: u64,
    /// Terrain generation settings.
    pub terrain: TerrainConfig,
}

/// Terrain generation strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMethod {
    /// Rolling hills from 2D Perlin noise.
    Perlin,
    /// A flat plain at `base_height`.
    Flat,
}

/// Terrain configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Which generator to use.
    pub method: GenerationMethod,
    /// Noise seed.
    pub seed: u32,
    /// Factor applied to world coordinates before sampling noise.
    pub scale: f64,
    /// Surface height where the noise is zero.
    pub base_height: i32,
    /// Largest deviation from `base_height`, in blocks.
    pub amplitude: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            render_distance: 4,
            worker_threads: 0,
            demo_edits: 64,
            idle_timeout_ms: 30_000,
            terrain: TerrainConfig::default(),
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            method: GenerationMethod::Perlin,
            seed: 0,
            scale: 0.02,
            base_height: 64,
            amplitude: 16.0,
        }
    }
}

impl EngineConfig {
    /// Loads a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: EngineConfig =
            serde_json::from_str(&contents).map_err(ConfigError::ParseError)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads the file named by [`CONFIG_ENV_VAR`], or returns the defaults if it is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(Path::new(&path)),
            None => {
                info!("{} not set, using default config", CONFIG_ENV_VAR);
                Ok(Self::default())
            }
        }
    }

    /// Saves the config as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let serialized = serde_json::to_string_pretty(self).map_err(ConfigError::SerializeError)?;
        std::fs::write(path, serialized).map_err(ConfigError::WriteError)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render_distance < 0 {
            return Err(ConfigError::Invalid {
                field: "render_distance",
                reason: format!("must not be negative, got {}", self.render_distance),
            });
        }
        if !(0..CHUNK_HEIGHT as i32).contains(&self.terrain.base_height) {
            return Err(ConfigError::Invalid {
                field: "terrain.base_height",
                reason: format!(
                    "must lie within 0..{}, got {}",
                    CHUNK_HEIGHT, self.terrain.base_height
                ),
            });
        }
        if !self.terrain.scale.is_finite() || !self.terrain.amplitude.is_finite() {
            return Err(ConfigError::Invalid {
                field: "terrain",
                reason: String::from("scale and amplitude must be finite"),
            });
        }
        Ok(())
    }

    /// Number of worker threads to start, resolving 0 to the available parallelism.
    pub fn worker_count(&self) -> usize {
        match self.worker_threads {
            0 => std::thread::available_parallelism().map_or(1, |count| count.get()),
            count => count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.worker_count() >= 1);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = EngineConfig::default();
        config.render_distance = 2;
        config.terrain.method = GenerationMethod::Flat;

        config.save(&path).unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "worker_threads": 3, "terrain": { "method": "flat" } }"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.worker_threads, 3);
        assert_eq!(config.worker_count(), 3);
        assert_eq!(config.terrain.method, GenerationMethod::Flat);
        assert_eq!(config.terrain.base_height, 64);
        assert_eq!(config.render_distance, 4);
    }

    #[test]
    fn malformed_files_are_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(EngineConfig::load(&path), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn missing_files_are_read_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = EngineConfig::load(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut config = EngineConfig::default();
        config.render_distance = -1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "render_distance", .. })
        ));

        let mut config = EngineConfig::default();
        config.terrain.base_height = CHUNK_HEIGHT as i32;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "terrain.base_height", .. })
        ));
    }
}
