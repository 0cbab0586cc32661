//! # Chunk Creation Module
//!
//! Constructors that populate a fresh chunk: terrain generation from a height
//! map, plus the synthetic fixtures used by tests and benchmarks.
//!
//! ## Column Layout
//!
//! For a column whose surface is at height `h`:
//! - `y == h` is grass
//! - the `SOIL_DEPTH` layers below it are dirt
//! - everything further down is stone
//! - everything above is air

use log::debug;

use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::terrain::TerrainGenerator;

use super::{Chunk, ChunkPosition, CHUNK_HEIGHT, CHUNK_LENGTH, CHUNK_WIDTH};

/// Number of dirt layers between the grass surface and the stone below.
pub const SOIL_DEPTH: usize = 3;

/// The block a generated column holds at layer `y` when its surface is at `surface`.
pub fn column_block(y: usize, surface: usize) -> BlockType {
    if y > surface {
        BlockType::AIR
    } else if y == surface {
        BlockType::GRASS
    } else if y + SOIL_DEPTH >= surface {
        BlockType::DIRT
    } else {
        BlockType::STONE
    }
}

impl Chunk {
    /// Generates terrain for the chunk at `position`.
    ///
    /// Heights outside the chunk are clamped, so every column has at least a
    /// grass block at the floor and never pokes above the world.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    /// * `terrain` - Height map sampled once per column
    pub fn generate(position: ChunkPosition, terrain: &dyn TerrainGenerator) -> Self {
        let mut chunk = Chunk::new(position);
        let origin = chunk.world_origin();

        for x in 0..CHUNK_LENGTH {
            for z in 0..CHUNK_WIDTH {
                let height = terrain.height_at(origin.x + x as i32, origin.z + z as i32);
                let surface = height.clamp(0, CHUNK_HEIGHT as i32 - 1) as usize;
                for y in 0..=surface {
                    chunk.put(x, y, z, column_block(y, surface));
                }
            }
        }

        debug!(
            "Generated chunk ({}, {}) with {} blocks",
            position.x,
            position.y,
            chunk.solid_count()
        );
        chunk
    }

    /// Creates an all-air chunk.
    pub fn empty(position: ChunkPosition) -> Self {
        Chunk::new(position)
    }

    /// Creates a chunk filled with stone up to (excluding) layer `height`.
    pub fn solid(position: ChunkPosition, height: usize) -> Self {
        let mut chunk = Chunk::new(position);
        for y in 0..height.min(CHUNK_HEIGHT) {
            for x in 0..CHUNK_LENGTH {
                for z in 0..CHUNK_WIDTH {
                    chunk.put(x, y, z, BlockType::STONE);
                }
            }
        }
        chunk
    }

    /// Creates a chunk with a 3D checkerboard of dirt up to (excluding) layer `height`.
    ///
    /// No two solid blocks touch, so every solid block shows all six faces.
    pub fn checkerboard(position: ChunkPosition, height: usize) -> Self {
        let mut chunk = Chunk::new(position);
        for y in 0..height.min(CHUNK_HEIGHT) {
            for x in 0..CHUNK_LENGTH {
                for z in 0..CHUNK_WIDTH {
                    if (x + y + z) % 2 == 0 {
                        chunk.put(x, y, z, BlockType::DIRT);
                    }
                }
            }
        }
        chunk
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point2;

    use super::*;
    use crate::engine_state::voxels::chunk::neighbors::NoNeighbors;
    use crate::engine_state::voxels::terrain::FlatTerrain;

    #[test]
    fn columns_follow_soil_rules() {
        let surface = 10;
        assert_eq!(column_block(11, surface), BlockType::AIR);
        assert_eq!(column_block(10, surface), BlockType::GRASS);
        assert_eq!(column_block(9, surface), BlockType::DIRT);
        assert_eq!(column_block(7, surface), BlockType::DIRT);
        assert_eq!(column_block(6, surface), BlockType::STONE);
        assert_eq!(column_block(0, surface), BlockType::STONE);
    }

    #[test]
    fn shallow_columns_have_no_stone() {
        assert_eq!(column_block(0, 0), BlockType::GRASS);
        assert_eq!(column_block(0, 2), BlockType::DIRT);
    }

    #[test]
    fn flat_terrain_fills_every_column() {
        let chunk = Chunk::generate(Point2::new(-1, 4), &FlatTerrain { height: 20 });
        assert_eq!(chunk.solid_count(), CHUNK_LENGTH * CHUNK_WIDTH * 21);
        assert_eq!(chunk.get(0, 20, 15), BlockType::GRASS);
        assert_eq!(chunk.get(7, 17, 3), BlockType::DIRT);
        assert_eq!(chunk.get(7, 16, 3), BlockType::STONE);
        assert_eq!(chunk.get(7, 21, 3), BlockType::AIR);
    }

    #[test]
    fn heights_are_clamped_to_the_chunk() {
        let low = Chunk::generate(Point2::new(0, 0), &FlatTerrain { height: -5 });
        assert_eq!(low.get(0, 0, 0), BlockType::GRASS);

        let high = Chunk::generate(Point2::new(0, 0), &FlatTerrain { height: 1000 });
        assert_eq!(high.get(0, CHUNK_HEIGHT - 1, 0), BlockType::GRASS);
    }

    #[test]
    fn checkerboard_shows_every_face() {
        let mut chunk = Chunk::checkerboard(Point2::new(0, 0), 4);
        chunk.rebuild(&NoNeighbors);
        assert_eq!(chunk.face_count(), chunk.solid_count() * 6);
    }

    #[test]
    fn solid_slab_shows_only_its_shell() {
        let mut chunk = Chunk::solid(Point2::new(0, 0), 2);
        chunk.rebuild(&NoNeighbors);
        let top_and_bottom = 2 * CHUNK_LENGTH * CHUNK_WIDTH;
        let sides = 2 * 2 * (CHUNK_LENGTH + CHUNK_WIDTH);
        assert_eq!(chunk.face_count(), top_and_bottom + sides);
    }
}
