//! Task for generating mesh data for chunks in a background thread.
//!
//! This module contains the `ChunkMeshGenerationTask` which builds the dirty
//! sections of one chunk on a worker. The build only read-locks the chunk; the
//! result installs the meshes under the write lock on the owning thread.

use log::{debug, warn};

use crate::{
    core::MtResource,
    engine_state::{
        buffer_state::BufferWriteCommand,
        rendering::meshing::build_chunk_meshes,
        task_management::task::{Task, TaskContext, TaskResult},
        voxels::chunk::{section::SectionMesh, Chunk, ChunkPosition},
    },
};

/// Builds the dirty sections of one chunk.
pub struct ChunkMeshGenerationTask {
    chunk: MtResource<Chunk>,
    position: ChunkPosition,
}

impl ChunkMeshGenerationTask {
    /// Creates a task for `chunk`. Use [`request_chunk_mesh`] to respect the
    /// one-build-per-chunk rule.
    pub fn new(chunk: MtResource<Chunk>) -> Self {
        let position = chunk.get().position;
        ChunkMeshGenerationTask { chunk, position }
    }
}

/// Creates a mesh task for the chunk at `position` if one is needed and none is
/// already running.
///
/// # Returns
/// `None` if the chunk is not loaded, already clean, or already being built (the
/// request is then parked and re-issued when that build finishes).
pub fn request_chunk_mesh(
    context: &mut TaskContext<'_>,
    position: ChunkPosition,
) -> Option<Box<dyn Task + Send>> {
    let chunk = context.world.get_chunk_at(position)?;
    if !chunk.get().is_dirty() {
        return None;
    }
    if !context.mesh_manager.request_mesh(position) {
        return None;
    }
    Some(Box::new(ChunkMeshGenerationTask::new(chunk)))
}

impl Task for ChunkMeshGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let meshes = build_chunk_meshes(&self.chunk);
        Box::new(ChunkMeshGenerationTaskResult {
            chunk: self.chunk.clone(),
            position: self.position,
            meshes,
        })
    }
}

/// Section meshes built for one chunk, waiting to be installed.
pub struct ChunkMeshGenerationTaskResult {
    chunk: MtResource<Chunk>,
    position: ChunkPosition,
    meshes: Vec<SectionMesh>,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    fn handle_result(
        self: Box<Self>,
        context: &mut TaskContext<'_>,
    ) -> (Vec<Box<dyn Task + Send>>, Vec<BufferWriteCommand>) {
        let ChunkMeshGenerationTaskResult {
            chunk,
            position,
            meshes,
        } = *self;

        let mut write_commands = Vec::new();
        let mut still_dirty = false;
        match context.world.get_chunk_at(position) {
            Some(current) if current.ptr_eq(&chunk) => {
                let mut chunk = current.get_mut();
                write_commands = context.mesh_manager.prepare_mesh_for_write(&mut chunk, meshes);
                still_dirty = chunk.is_dirty();
                debug!(
                    "Meshed chunk {:?}: {} sections written",
                    position,
                    write_commands.len()
                );
            }
            _ => warn!("Dropping meshes of unloaded chunk {:?}", position),
        }

        let mut tasks: Vec<Box<dyn Task + Send>> = Vec::new();
        if context.mesh_manager.finish(position, still_dirty) {
            match context.world.get_chunk_at(position) {
                Some(current) => tasks.push(Box::new(ChunkMeshGenerationTask::new(current))),
                None => context.mesh_manager.abandon(position),
            }
        }

        (tasks, write_commands)
    }
}
