//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which generates chunk terrain
//! on a worker. The finished chunk is handed back by value and only enters the
//! world on the owning thread, where it is linked to its neighbors.

use std::sync::Arc;

use log::warn;

use crate::engine_state::{
    buffer_state::BufferWriteCommand,
    rendering::tasks::chunk_mesh_generation_task::request_chunk_mesh,
    task_management::task::{Task, TaskContext, TaskResult},
    voxels::{
        chunk::{Chunk, ChunkPosition},
        terrain::TerrainGenerator,
    },
};

/// A task that generates chunk data off the owning thread.
pub struct ChunkGenerationTask {
    /// The position of the chunk to generate (in chunk coordinates)
    position: ChunkPosition,
    /// Height map shared by all generation tasks
    terrain: Arc<dyn TerrainGenerator>,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// The caller must have claimed `position` with `World::begin_generation`.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates where the chunk should be generated
    /// * `terrain` - The height map to sample
    pub fn new(position: ChunkPosition, terrain: Arc<dyn TerrainGenerator>) -> Self {
        ChunkGenerationTask { position, terrain }
    }
}

impl Task for ChunkGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        Box::new(ChunkGenerationTaskResult {
            chunk: Chunk::generate(self.position, self.terrain.as_ref()),
        })
    }
}

/// The result of a chunk generation task.
pub struct ChunkGenerationTaskResult {
    /// The generated chunk, not yet part of the world
    chunk: Chunk,
}

impl TaskResult for ChunkGenerationTaskResult {
    /// Inserts the chunk and schedules meshes for it and every neighbor whose
    /// border it covers.
    ///
    /// A chunk whose generation was cancelled in the meantime is dropped.
    fn handle_result(
        self: Box<Self>,
        context: &mut TaskContext<'_>,
    ) -> (Vec<Box<dyn Task + Send>>, Vec<BufferWriteCommand>) {
        let position = self.chunk.position;
        if !context.world.is_generating(position) {
            warn!("Chunk {:?} was cancelled during generation, dropping it", position);
            return (Vec::new(), Vec::new());
        }

        let affected = context.world.insert_chunk(self.chunk);
        let tasks = affected
            .into_iter()
            .filter_map(|position| request_chunk_mesh(context, position))
            .collect();

        (tasks, Vec::new())
    }
}
