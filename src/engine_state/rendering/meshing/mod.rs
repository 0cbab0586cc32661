//! Mesh generation and scheduling for voxel rendering.
//!
//! This module converts chunk data into packed vertex buffers and keeps track of
//! which chunks are being meshed.
//!
//! # Architecture
//! - `mesh/`: The assembler, face encoder and [`MeshBuffer`]
//! - `culling`: Per-face visibility tests
//! - [`MeshManager`]: Allows at most one in-flight build per chunk and turns
//!   finished builds into buffer write commands
//! - [`build_chunk_meshes`]: The lock discipline for building a shared chunk
//!
//! # Locking
//! A build never holds two locks at once. The chunk's dirty section revisions
//! are recorded and its neighbor links cloned out under one read lock. Each
//! neighbor's facing edge is then copied under its own short read lock, and only
//! after that is the chunk itself read-locked for the build. Installing the
//! result takes the chunk's write lock on the owning thread.
//!
//! Recording revisions before the edges are copied matters: a neighbor that is
//! loaded, unloaded or edited in between dirties the border section again, so
//! the installed mesh leaves it dirty and the chunk is rebuilt.

use std::collections::HashSet;

use log::{debug, warn};

use crate::{
    core::MtResource,
    engine_state::{
        buffer_state::{BufferWriteCommand, SectionKey},
        voxels::chunk::{
            neighbors::NeighborSnapshot, section::SectionMesh, Chunk, ChunkPosition,
        },
    },
};

pub mod culling;
mod mesh;

pub use mesh::*;

/// Builds meshes for the dirty sections of a shared chunk.
///
/// Runs on a worker thread. The chunk is only read; the returned meshes are
/// installed later with [`Chunk::install_meshes`].
pub fn build_chunk_meshes(chunk: &MtResource<Chunk>) -> Vec<SectionMesh> {
    let (revisions, links) = {
        let chunk = chunk.get();
        (chunk.dirty_revisions(), chunk.neighbors.clone())
    };
    let snapshot = NeighborSnapshot::capture(&links);
    let chunk = chunk.get();
    chunk.build_sections(&snapshot, &revisions)
}

/// Tracks mesh builds so that no chunk is meshed concurrently with itself.
///
/// A request for a chunk whose build is still running is parked and re-issued
/// once that build finishes. Builds are never cancelled.
#[derive(Debug, Default)]
pub struct MeshManager {
    /// Chunks with a build currently running
    in_flight: HashSet<ChunkPosition>,
    /// Chunks requested again while their build was running
    pending: HashSet<ChunkPosition>,
    /// Number of builds started
    builds_started: u64,
    /// Number of builds whose result was installed
    builds_installed: u64,
}

impl MeshManager {
    /// Creates a new mesh manager with nothing in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks to mesh the chunk at `position`.
    ///
    /// # Returns
    /// `true` if the caller should start a build now. `false` if one is already
    /// running; the request is then remembered and honored when it finishes.
    pub fn request_mesh(&mut self, position: ChunkPosition) -> bool {
        if self.in_flight.contains(&position) {
            debug!("Mesh for chunk {:?} already in flight, parking request", position);
            self.pending.insert(position);
            return false;
        }
        self.in_flight.insert(position);
        self.builds_started += 1;
        true
    }

    /// Records that the build for `position` finished.
    ///
    /// # Arguments
    /// * `still_dirty` - Whether the chunk changed again while it was being built
    ///
    /// # Returns
    /// `true` if another build must start right away; the chunk stays in flight.
    pub fn finish(&mut self, position: ChunkPosition, still_dirty: bool) -> bool {
        let was_pending = self.pending.remove(&position);
        if was_pending || still_dirty {
            self.builds_started += 1;
            return true;
        }
        self.in_flight.remove(&position);
        false
    }

    /// Drops all tracking for `position`, e.g. when a rebuild can no longer start
    /// because the chunk was unloaded.
    pub fn abandon(&mut self, position: ChunkPosition) {
        self.in_flight.remove(&position);
        self.pending.remove(&position);
    }

    /// Forgets a parked request for an unloaded chunk. A running build is left
    /// to finish; its result is discarded by the caller.
    pub fn forget(&mut self, position: ChunkPosition) {
        self.pending.remove(&position);
    }

    /// Returns `true` if a build for `position` is running.
    pub fn is_in_flight(&self, position: ChunkPosition) -> bool {
        self.in_flight.contains(&position)
    }

    /// Number of chunks with a running build.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns `true` if nothing is running or parked.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty() && self.pending.is_empty()
    }

    /// Number of builds started so far.
    pub fn builds_started(&self) -> u64 {
        self.builds_started
    }

    /// Number of builds whose meshes were installed.
    pub fn builds_installed(&self) -> u64 {
        self.builds_installed
    }

    /// Installs finished section meshes into `chunk` and prepares the matching
    /// buffer writes.
    ///
    /// # Arguments
    /// * `chunk` - The chunk the meshes were built from, write-locked by the caller
    /// * `meshes` - Output of [`build_chunk_meshes`]
    ///
    /// # Returns
    /// One write command per section whose mesh was replaced.
    pub fn prepare_mesh_for_write(
        &mut self,
        chunk: &mut Chunk,
        meshes: Vec<SectionMesh>,
    ) -> Vec<BufferWriteCommand> {
        let built = meshes.len();
        let installed = chunk.install_meshes(meshes);
        if installed.len() < built {
            warn!(
                "Skipped {} stale section meshes for chunk {:?}",
                built - installed.len(),
                chunk.position
            );
        }
        self.builds_installed += 1;

        installed
            .into_iter()
            .map(|section| {
                let key = SectionKey {
                    position: chunk.position,
                    section,
                };
                BufferWriteCommand {
                    name: format!(
                        "Vertex Write - Chunk Position {:?} - Section {}",
                        chunk.position, section
                    ),
                    key,
                    mesh: chunk.section(section).mesh().clone(),
                }
            })
            .collect()
    }
}
