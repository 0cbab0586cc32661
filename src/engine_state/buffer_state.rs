//! # Buffer State Module
//!
//! This module is the hand-off point between the meshing engine and whatever
//! rendering backend uploads the geometry. It keeps the latest vertex buffer of
//! every chunk section plus one shared index buffer, and tracks how much memory
//! the buffers use.
//!
//! ## Architecture
//!
//! Buffers are keyed by [`SectionKey`]. A write replaces the section's previous
//! buffer; the mesh itself is shared (`Arc`) with the chunk that produced it, so
//! handing it over copies nothing. Because every face uses the same index
//! pattern, one index buffer sized for the largest mesh serves all sections.
//!
//! Consumers must only draw buffers that were written after the section's last
//! rebuild; the engine never hands over a mesh of a dirty section.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use log::debug;

use crate::engine_state::{
    rendering::meshing::{build_indices, MeshBuffer},
    voxels::chunk::ChunkPosition,
};

/// Identifies the vertex buffer of one section of one chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SectionKey {
    /// Position of the chunk
    pub position: ChunkPosition,
    /// Index of the section within the chunk, counted from the bottom
    pub section: usize,
}

/// Usage statistics for the buffers.
#[derive(Debug, Default, Clone, Copy)]
pub struct BufferAnalytics {
    /// Bytes held by vertex buffers
    pub vertex_memory: u64,
    /// Bytes held by the shared index buffer
    pub index_memory: u64,
    /// Number of writes performed
    pub times_written: u64,
    /// Number of buffers released
    pub times_released: u64,
}

/// Command for replacing the vertex buffer of one section.
pub struct BufferWriteCommand {
    /// Descriptive name for the command (for debugging)
    pub name: String,
    /// Target buffer
    pub key: SectionKey,
    /// New contents
    pub mesh: Arc<MeshBuffer>,
}

impl Debug for BufferWriteCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferWriteCommand")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("bytes", &self.mesh.byte_len())
            .finish()
    }
}

/// Registry of the vertex buffers ready to be drawn.
#[derive(Debug, Default)]
pub struct BufferState {
    /// Latest vertex buffer of each section
    buffers: HashMap<SectionKey, Arc<MeshBuffer>>,
    /// Index buffer shared by every section
    index_buffer: Vec<u32>,
    /// Usage statistics
    buffer_analytics: BufferAnalytics,
}

impl BufferState {
    /// Creates an empty buffer state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a write command.
    ///
    /// An empty mesh removes the section's buffer; there is nothing to draw.
    /// The shared index buffer grows to cover the largest mesh seen.
    pub fn write(&mut self, buffer_command: BufferWriteCommand) {
        let BufferWriteCommand { name, key, mesh } = buffer_command;
        debug!("{} ({} bytes)", name, mesh.byte_len());

        self.grow_index_buffer(mesh.face_count());
        let previous = if mesh.is_empty() {
            self.buffers.remove(&key)
        } else {
            self.buffer_analytics.vertex_memory += mesh.byte_len() as u64;
            self.buffers.insert(key, mesh)
        };
        if let Some(previous) = previous {
            self.buffer_analytics.vertex_memory -= previous.byte_len() as u64;
        }
        self.buffer_analytics.times_written += 1;
    }

    fn grow_index_buffer(&mut self, face_count: usize) {
        let current_faces = self.index_buffer.len() / 6;
        if face_count > current_faces {
            self.index_buffer = build_indices(face_count);
            self.buffer_analytics.index_memory =
                std::mem::size_of_val(self.index_buffer.as_slice()) as u64;
        }
    }

    /// Drops every buffer of the chunk at `position`.
    ///
    /// # Returns
    /// The number of buffers removed.
    pub fn release_chunk(&mut self, position: ChunkPosition) -> usize {
        let before = self.buffers.len();
        let analytics = &mut self.buffer_analytics;
        self.buffers.retain(|key, mesh| {
            if key.position != position {
                return true;
            }
            analytics.vertex_memory -= mesh.byte_len() as u64;
            false
        });
        let released = before - self.buffers.len();
        self.buffer_analytics.times_released += released as u64;
        debug!("Released {} buffers of chunk {:?}", released, position);
        released
    }

    /// The vertex buffer of a section, if it has anything to draw.
    pub fn get_buffer(&self, key: SectionKey) -> Option<&Arc<MeshBuffer>> {
        self.buffers.get(&key)
    }

    /// The raw bytes of a section's vertex buffer and their length.
    pub fn vertex_bytes(&self, key: SectionKey) -> Option<(&[u8], usize)> {
        self.buffers
            .get(&key)
            .map(|mesh| (mesh.as_bytes(), mesh.byte_len()))
    }

    /// The shared index buffer. Draw `6 * face_count` indices of it per section.
    pub fn indices(&self) -> &[u32] {
        &self.index_buffer
    }

    /// The shared index buffer as raw bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.index_buffer)
    }

    /// All sections with something to draw.
    pub fn keys(&self) -> impl Iterator<Item = &SectionKey> {
        self.buffers.keys()
    }

    /// Number of sections with something to draw.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Number of faces across all buffers.
    pub fn total_faces(&self) -> usize {
        self.buffers.values().map(|mesh| mesh.face_count()).sum()
    }

    /// Number of vertices across all buffers.
    pub fn total_vertices(&self) -> usize {
        self.buffers.values().map(|mesh| mesh.vertex_count()).sum()
    }

    /// Gets the total used memory across all buffers.
    ///
    /// # Returns
    /// Total used memory in bytes
    pub fn get_total_used_memory(&self) -> u64 {
        self.buffer_analytics.vertex_memory + self.buffer_analytics.index_memory
    }

    /// Usage statistics.
    pub fn analytics(&self) -> BufferAnalytics {
        self.buffer_analytics
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point2;

    use super::*;
    use crate::engine_state::voxels::{
        block::{block_side::BlockSide, block_type::BlockType},
        chunk::voxel_grid::VoxelGrid,
        chunk::neighbors::NoNeighbors,
    };
    use crate::engine_state::rendering::meshing::build_mesh;

    fn command(position: ChunkPosition, section: usize, mesh: MeshBuffer) -> BufferWriteCommand {
        BufferWriteCommand {
            name: String::from("test write"),
            key: SectionKey { position, section },
            mesh: Arc::new(mesh),
        }
    }

    fn cube_mesh() -> MeshBuffer {
        let mut grid = VoxelGrid::<2, 2, 2>::new();
        grid.put(0, 0, 0, BlockType::STONE);
        build_mesh(&grid, &NoNeighbors)
    }

    #[test]
    fn writes_replace_and_track_memory() {
        let mut state = BufferState::new();
        let position = Point2::new(0, 0);
        state.write(command(position, 0, cube_mesh()));
        state.write(command(position, 0, cube_mesh()));

        assert_eq!(state.buffer_count(), 1);
        assert_eq!(state.total_faces(), 6);
        assert_eq!(state.analytics().vertex_memory, 96);
        assert_eq!(state.analytics().times_written, 2);
        assert_eq!(state.indices().len(), 36);
        assert_eq!(state.index_bytes().len(), 144);
    }

    #[test]
    fn empty_meshes_remove_buffers() {
        let mut state = BufferState::new();
        let position = Point2::new(3, 3);
        state.write(command(position, 2, cube_mesh()));
        state.write(command(position, 2, MeshBuffer::new()));

        assert_eq!(state.buffer_count(), 0);
        assert_eq!(state.analytics().vertex_memory, 0);
    }

    #[test]
    fn release_drops_only_that_chunk() {
        let mut state = BufferState::new();
        state.write(command(Point2::new(0, 0), 0, cube_mesh()));
        state.write(command(Point2::new(0, 0), 5, cube_mesh()));
        state.write(command(Point2::new(1, 0), 0, cube_mesh()));

        assert_eq!(state.release_chunk(Point2::new(0, 0)), 2);
        assert_eq!(state.buffer_count(), 1);
        let (bytes, len) = state
            .vertex_bytes(SectionKey { position: Point2::new(1, 0), section: 0 })
            .unwrap();
        assert_eq!(bytes.len(), len);
        assert_eq!(BlockSide::ALL.len() * 16, len);
    }
}
