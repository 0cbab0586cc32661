//! # World Module
//!
//! This module provides the `World` struct which manages the loaded chunks of the
//! voxel world. It is the only place chunks are linked to and unlinked from their
//! neighbors.
//!
//! ## Architecture
//!
//! The world is sparse: only chunks that were requested are kept in memory, in a
//! hash map keyed by chunk position. Each chunk sits behind its own lock so that
//! workers can mesh different chunks at the same time. The map itself is owned by
//! the engine thread and never shared.
//!
//! ## Neighbor Links
//!
//! When a chunk is inserted, it and each loaded horizontal neighbor get weak
//! links to one another and the neighbor's facing border is marked dirty, since
//! faces it drew toward open air may now be covered. Removal undoes both steps.
//! Locks are always taken one at a time.

use std::collections::{HashMap, HashSet};

use cgmath::{Point2, Point3};
use log::{debug, warn};
use thiserror::Error;

use crate::core::MtResource;
use crate::engine_state::voxels::block::{block_side::BlockSide, block_type::BlockType};
use crate::engine_state::voxels::chunk::{
    neighbor_position, Chunk, ChunkPosition, CHUNK_HEIGHT, CHUNK_LENGTH, CHUNK_WIDTH,
};

/// Errors from world-space block access.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// The position is above or below the world.
    #[error("block y {0} is outside the world height 0..{max}", max = CHUNK_HEIGHT)]
    OutOfWorld(i32),
    /// The chunk holding the position is not loaded.
    #[error("chunk ({}, {}) is not loaded", .0.x, .0.y)]
    ChunkNotLoaded(ChunkPosition),
}

/// A world-space block position split into its chunk and chunk-local coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LocalPosition {
    /// The chunk holding the block
    pub chunk: ChunkPosition,
    /// Chunk-local coordinates
    pub block: Point3<usize>,
}

impl LocalPosition {
    /// Splits a world-space position.
    ///
    /// # Errors
    /// [`WorldError::OutOfWorld`] if `y` is outside the world height.
    pub fn from_world(position: Point3<i32>) -> Result<Self, WorldError> {
        if !(0..CHUNK_HEIGHT as i32).contains(&position.y) {
            return Err(WorldError::OutOfWorld(position.y));
        }
        let length = CHUNK_LENGTH as i32;
        let width = CHUNK_WIDTH as i32;
        Ok(LocalPosition {
            chunk: Point2::new(position.x.div_euclid(length), position.z.div_euclid(width)),
            block: Point3::new(
                position.x.rem_euclid(length) as usize,
                position.y as usize,
                position.z.rem_euclid(width) as usize,
            ),
        })
    }

    /// The horizontal edges of its chunk this block touches.
    pub fn touching_edges(&self) -> Vec<BlockSide> {
        let mut edges = Vec::new();
        if self.block.x == 0 {
            edges.push(BlockSide::LEFT);
        }
        if self.block.x == CHUNK_LENGTH - 1 {
            edges.push(BlockSide::RIGHT);
        }
        if self.block.z == 0 {
            edges.push(BlockSide::BACK);
        }
        if self.block.z == CHUNK_WIDTH - 1 {
            edges.push(BlockSide::FRONT);
        }
        edges
    }
}

/// The set of loaded chunks.
#[derive(Default)]
pub struct World {
    chunks: HashMap<ChunkPosition, MtResource<Chunk>>,
    /// Chunks whose generation was started but not yet inserted
    generating: HashSet<ChunkPosition>,
}

impl World {
    /// Creates an empty world.
    pub fn new() -> Self {
        World::default()
    }

    /// Returns the chunk at `position`, if loaded.
    pub fn get_chunk_at(&self, position: ChunkPosition) -> Option<MtResource<Chunk>> {
        self.chunks.get(&position).cloned()
    }

    /// Returns `true` if the chunk at `position` is loaded.
    pub fn contains_chunk(&self, position: ChunkPosition) -> bool {
        self.chunks.contains_key(&position)
    }

    /// Positions of all loaded chunks.
    pub fn chunk_positions(&self) -> impl Iterator<Item = &ChunkPosition> {
        self.chunks.keys()
    }

    /// Number of loaded chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Claims `position` for generation.
    ///
    /// # Returns
    /// `false` if the chunk is already loaded or being generated.
    pub fn begin_generation(&mut self, position: ChunkPosition) -> bool {
        if self.chunks.contains_key(&position) {
            return false;
        }
        self.generating.insert(position)
    }

    /// Drops the claim on `position`; a generated chunk arriving later is discarded.
    ///
    /// # Returns
    /// `true` if the chunk was being generated.
    pub fn cancel_generation(&mut self, position: ChunkPosition) -> bool {
        self.generating.remove(&position)
    }

    /// Returns `true` if the chunk at `position` is being generated.
    pub fn is_generating(&self, position: ChunkPosition) -> bool {
        self.generating.contains(&position)
    }

    /// Number of chunks being generated.
    pub fn generating_count(&self) -> usize {
        self.generating.len()
    }

    /// Adds a chunk and links it with its loaded neighbors.
    ///
    /// # Returns
    /// The positions whose meshes are now stale: the new chunk followed by each
    /// neighbor it was linked to. Empty if a chunk was already loaded there, in
    /// which case `chunk` is dropped.
    pub fn insert_chunk(&mut self, chunk: Chunk) -> Vec<ChunkPosition> {
        let position = chunk.position;
        self.generating.remove(&position);
        if self.chunks.contains_key(&position) {
            warn!("Chunk {:?} is already loaded, dropping the duplicate", position);
            return Vec::new();
        }

        let resource = MtResource::new(chunk);
        let mut affected = vec![position];

        for side in BlockSide::HORIZONTAL {
            let Some(neighbor) = self.chunks.get(&neighbor_position(position, side)) else {
                continue;
            };
            {
                let mut neighbor = neighbor.get_mut();
                neighbor.neighbors.link(side.opposite(), resource.downgrade());
                neighbor.mark_border_dirty(side.opposite());
                affected.push(neighbor.position);
            }
            resource.get_mut().neighbors.link(side, neighbor.downgrade());
        }

        debug!(
            "Inserted chunk {:?} with {} neighbors",
            position,
            affected.len() - 1
        );
        self.chunks.insert(position, resource);
        affected
    }

    /// Removes a chunk and unlinks it from its neighbors.
    ///
    /// Tasks still holding the chunk keep it alive until they finish, but no
    /// neighbor will resolve to it anymore.
    ///
    /// # Returns
    /// The neighbors whose border must be remeshed, or `None` if the chunk was not loaded.
    pub fn remove_chunk(&mut self, position: ChunkPosition) -> Option<Vec<ChunkPosition>> {
        self.chunks.remove(&position)?;

        let mut affected = Vec::new();
        for side in BlockSide::HORIZONTAL {
            let adjacent = neighbor_position(position, side);
            if let Some(neighbor) = self.chunks.get(&adjacent) {
                let mut neighbor = neighbor.get_mut();
                neighbor.neighbors.unlink(side.opposite());
                if neighbor.mark_border_dirty(side.opposite()) > 0 {
                    affected.push(adjacent);
                }
            }
        }

        debug!("Removed chunk {:?}", position);
        Some(affected)
    }

    /// Reads a block in world coordinates.
    ///
    /// # Errors
    /// [`WorldError::OutOfWorld`] above or below the world,
    /// [`WorldError::ChunkNotLoaded`] if the chunk is missing.
    pub fn get_block(&self, position: Point3<i32>) -> Result<BlockType, WorldError> {
        let local = LocalPosition::from_world(position)?;
        let chunk = self
            .chunks
            .get(&local.chunk)
            .ok_or(WorldError::ChunkNotLoaded(local.chunk))?;
        let block_type = chunk.get().get(local.block.x, local.block.y, local.block.z);
        Ok(block_type)
    }

    /// Writes a block in world coordinates.
    ///
    /// An edit on a chunk edge also dirties the neighbor's section across that
    /// edge, since the neighbor's face toward the edited cell may have changed.
    ///
    /// # Returns
    /// The positions of every chunk that needs a new mesh.
    ///
    /// # Errors
    /// [`WorldError::OutOfWorld`] above or below the world,
    /// [`WorldError::ChunkNotLoaded`] if the chunk is missing.
    pub fn put_block(
        &mut self,
        position: Point3<i32>,
        block_type: BlockType,
    ) -> Result<Vec<ChunkPosition>, WorldError> {
        let local = LocalPosition::from_world(position)?;
        let chunk = self
            .chunks
            .get(&local.chunk)
            .ok_or(WorldError::ChunkNotLoaded(local.chunk))?;
        chunk
            .get_mut()
            .put(local.block.x, local.block.y, local.block.z, block_type);

        let mut affected = vec![local.chunk];
        for side in local.touching_edges() {
            let adjacent = neighbor_position(local.chunk, side);
            if let Some(neighbor) = self.chunks.get(&adjacent) {
                neighbor.get_mut().mark_section_dirty_at(local.block.y);
                affected.push(adjacent);
            }
        }
        Ok(affected)
    }
}
