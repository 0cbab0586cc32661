//! # Terrain Module
//!
//! Height-map terrain strategies. A generator only answers "how high is the
//! ground at this column"; turning heights into blocks is done by chunk
//! creation, so meshing can be exercised with synthetic chunks that never
//! touch noise.

use std::sync::Arc;

use noise::{NoiseFn, Perlin};

use crate::config::{GenerationMethod, TerrainConfig};

/// Supplies the ground height of every world column.
///
/// Implementations must be deterministic: the same column always yields the
/// same height.
pub trait TerrainGenerator: Send + Sync {
    /// Height of the surface block at world column `(world_x, world_z)`.
    fn height_at(&self, world_x: i32, world_z: i32) -> i32;
}

/// The same height everywhere.
#[derive(Copy, Clone, Debug)]
pub struct FlatTerrain {
    /// Height of the surface block.
    pub height: i32,
}

impl TerrainGenerator for FlatTerrain {
    fn height_at(&self, _world_x: i32, _world_z: i32) -> i32 {
        self.height
    }
}

/// Rolling hills sampled from 2D Perlin noise.
pub struct PerlinTerrain {
    perlin: Perlin,
    scale: f64,
    base_height: i32,
    amplitude: f64,
}

impl PerlinTerrain {
    /// Creates a generator.
    ///
    /// # Arguments
    /// * `seed` - Noise seed
    /// * `scale` - Factor applied to world coordinates before sampling
    /// * `base_height` - Surface height where the noise is zero
    /// * `amplitude` - Largest deviation from `base_height`, in blocks
    pub fn new(seed: u32, scale: f64, base_height: i32, amplitude: f64) -> Self {
        PerlinTerrain {
            perlin: Perlin::new(seed),
            scale,
            base_height,
            amplitude,
        }
    }
}

impl TerrainGenerator for PerlinTerrain {
    fn height_at(&self, world_x: i32, world_z: i32) -> i32 {
        let sample = self
            .perlin
            .get([world_x as f64 * self.scale, world_z as f64 * self.scale]);
        self.base_height + (sample * self.amplitude).round() as i32
    }
}

/// Builds the generator selected by `config`.
pub fn from_config(config: &TerrainConfig) -> Arc<dyn TerrainGenerator> {
    match config.method {
        GenerationMethod::Perlin => Arc::new(PerlinTerrain::new(
            config.seed,
            config.scale,
            config.base_height,
            config.amplitude,
        )),
        GenerationMethod::Flat => Arc::new(FlatTerrain {
            height: config.base_height,
        }),
    }
}
