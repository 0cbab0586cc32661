//! # Section Module
//!
//! A section is a fixed-height horizontal slice of a chunk with its own blocks
//! and its own mesh, so an edit only remeshes the slice it touched.
//!
//! ## Dirty Tracking
//!
//! Every `put` bumps the section's revision. A mesh remembers the revision it
//! was built from and the section is dirty whenever the two differ. Builds run
//! under a shared lock and are installed later under the exclusive one, so an
//! edit that lands in between leaves the section dirty rather than being lost.

use std::sync::Arc;

use crate::engine_state::rendering::meshing::MeshBuffer;
use crate::engine_state::voxels::block::block_type::BlockType;

use super::{voxel_grid::VoxelGrid, CHUNK_LENGTH, CHUNK_WIDTH, SECTION_HEIGHT};

/// The block storage of one section.
pub type SectionGrid = VoxelGrid<CHUNK_LENGTH, SECTION_HEIGHT, CHUNK_WIDTH>;

/// One vertical slice of a chunk.
#[derive(Debug)]
pub struct Section {
    grid: SectionGrid,
    mesh: Arc<MeshBuffer>,
    /// Bumped on every edit
    revision: u64,
    /// Revision the current mesh was built from
    meshed_revision: u64,
}

/// A mesh built for one section, waiting to be installed.
#[derive(Debug)]
pub struct SectionMesh {
    /// Index of the section within its chunk.
    pub section: usize,
    /// Revision of the blocks the mesh was built from.
    pub revision: u64,
    /// The built geometry.
    pub mesh: MeshBuffer,
}

impl Section {
    /// Creates an all-air section that still needs its first mesh.
    pub fn new() -> Self {
        Section {
            grid: SectionGrid::new(),
            mesh: Arc::new(MeshBuffer::new()),
            revision: 1,
            meshed_revision: 0,
        }
    }

    /// Reads a block in section-local coordinates.
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockType {
        self.grid.get(x, y, z)
    }

    /// Writes a block in section-local coordinates and marks the section dirty.
    pub fn put(&mut self, x: usize, y: usize, z: usize, block_type: BlockType) {
        self.grid.put(x, y, z, block_type);
        self.mark_dirty();
    }

    /// Forces a remesh, e.g. after a neighbor changed.
    pub fn mark_dirty(&mut self) {
        self.revision += 1;
    }

    /// Current edit revision.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns `true` if the mesh is stale. A dirty mesh must be rebuilt before it is drawn.
    pub fn is_dirty(&self) -> bool {
        self.revision != self.meshed_revision
    }

    /// Returns `true` if the section holds only air.
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Read access to the blocks.
    pub fn grid(&self) -> &SectionGrid {
        &self.grid
    }

    /// The most recently installed mesh. Check [`Section::is_dirty`] before drawing it.
    pub fn mesh(&self) -> &Arc<MeshBuffer> {
        &self.mesh
    }

    /// Installs a mesh built from `revision`.
    ///
    /// # Returns
    /// `false` (and keeps the current mesh) if a newer build was already installed.
    pub fn install_mesh(&mut self, revision: u64, mesh: MeshBuffer) -> bool {
        if revision < self.meshed_revision {
            return false;
        }
        self.mesh = Arc::new(mesh);
        self.meshed_revision = revision;
        true
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_section_needs_a_mesh() {
        let section = Section::new();
        assert!(section.is_dirty());
        assert!(section.is_empty());
    }

    #[test]
    fn install_clears_dirty_and_put_sets_it() {
        let mut section = Section::new();
        assert!(section.install_mesh(section.revision(), MeshBuffer::new()));
        assert!(!section.is_dirty());

        section.put(1, 2, 3, BlockType::STONE);
        assert!(section.is_dirty());
        assert_eq!(section.get(1, 2, 3), BlockType::STONE);
    }

    #[test]
    fn edit_during_build_stays_dirty() {
        let mut section = Section::new();
        let built_from = section.revision();
        section.put(0, 0, 0, BlockType::DIRT);

        assert!(section.install_mesh(built_from, MeshBuffer::new()));
        assert!(section.is_dirty());
    }

    #[test]
    fn older_build_does_not_replace_newer() {
        let mut section = Section::new();
        let old = section.revision();
        section.mark_dirty();
        let new = section.revision();

        assert!(section.install_mesh(new, MeshBuffer::new()));
        assert!(!section.install_mesh(old, MeshBuffer::new()));
        assert!(!section.is_dirty());
    }
}
