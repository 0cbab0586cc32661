//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a 16x256x16 column of blocks split
//! into sixteen 16-block-high sections, each meshed on its own.
//!
//! ## Sections
//!
//! A chunk never stores one big grid. Each [`section::Section`] owns a
//! 16x16x16 grid and the mesh built from it, so editing a block only remeshes
//! the slice it lives in (and the slice next to it when the edit sits on a
//! section seam). The chunk as a whole still behaves as one [`BlockGrid`], which
//! is what lets the face culler look across section seams without treating them
//! as world boundaries.
//!
//! ## Neighbors
//!
//! Horizontal neighbors are held as weak handles in [`neighbors::ChunkNeighbors`].
//! They are only used for face culling and never keep another chunk alive.

use std::ops::Range;

use cgmath::{Point2, Point3, Vector3};
use static_assertions::const_assert;

use crate::engine_state::rendering::meshing::build_mesh_in_layers;
use crate::engine_state::voxels::block::block_side::BlockSide;
use crate::engine_state::voxels::block::block_type::BlockType;

use neighbors::{BorderPlane, ChunkNeighbors, NeighborResolver};
use section::{Section, SectionMesh};
use voxel_grid::BlockGrid;

pub mod chunk_creation;
pub mod chunk_iteration;
pub mod neighbors;
pub mod section;
pub mod voxel_grid;

/// Size of a chunk along x, in blocks.
pub const CHUNK_LENGTH: usize = 16;
/// Size of a chunk along y, in blocks. This is the full height of the world.
pub const CHUNK_HEIGHT: usize = 256;
/// Size of a chunk along z, in blocks.
pub const CHUNK_WIDTH: usize = 16;
/// Height of one section, in blocks.
pub const SECTION_HEIGHT: usize = 16;
/// Number of sections stacked in a chunk.
pub const SECTIONS_PER_CHUNK: usize = CHUNK_HEIGHT / SECTION_HEIGHT;

const_assert!(CHUNK_HEIGHT % SECTION_HEIGHT == 0);

/// Position of a chunk on the horizontal chunk grid, as `(x, z)` in chunk units.
pub type ChunkPosition = Point2<i32>;

/// Returns the position of the chunk across `side` from `position`.
///
/// # Panics
/// Panics for `TOP` and `BOTTOM`; chunks do not tile vertically.
pub fn neighbor_position(position: ChunkPosition, side: BlockSide) -> ChunkPosition {
    assert!(
        side.horizontal_index().is_some(),
        "chunks only neighbor along X or Z, got {side:?}"
    );
    let offset = side.offset();
    Point2::new(position.x + offset.x, position.y + offset.z)
}

/// A 16x256x16 column of the world.
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: ChunkPosition,

    /// Bottom to top; section `i` covers layers `i * SECTION_HEIGHT..(i + 1) * SECTION_HEIGHT`.
    sections: Vec<Section>,

    /// Weak links to the four horizontal neighbors, used only for culling.
    pub neighbors: ChunkNeighbors,
}

impl Chunk {
    /// Creates an all-air chunk. Every section starts dirty.
    pub fn new(position: ChunkPosition) -> Self {
        Chunk {
            position,
            sections: (0..SECTIONS_PER_CHUNK).map(|_| Section::new()).collect(),
            neighbors: ChunkNeighbors::default(),
        }
    }

    /// World-space block coordinates of this chunk's `(0, 0, 0)` corner.
    pub fn world_origin(&self) -> Point3<i32> {
        Point3::new(
            self.position.x * CHUNK_LENGTH as i32,
            0,
            self.position.y * CHUNK_WIDTH as i32,
        )
    }

    fn section_of(y: usize) -> (usize, usize) {
        assert!(
            y < CHUNK_HEIGHT,
            "block y {y} is outside the chunk height {CHUNK_HEIGHT}"
        );
        (y / SECTION_HEIGHT, y % SECTION_HEIGHT)
    }

    /// Reads the block at chunk-local `(x, y, z)`.
    ///
    /// # Panics
    /// Panics if any coordinate is out of range.
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockType {
        let (index, local_y) = Self::section_of(y);
        self.sections[index].get(x, local_y, z)
    }

    /// Writes the block at chunk-local `(x, y, z)`.
    ///
    /// The owning section becomes dirty. A write on a section's top or bottom
    /// layer dirties the section across that seam too, since one of its faces may
    /// have been covered or uncovered.
    ///
    /// # Panics
    /// Panics if any coordinate is out of range.
    pub fn put(&mut self, x: usize, y: usize, z: usize, block_type: BlockType) {
        let (index, local_y) = Self::section_of(y);
        self.sections[index].put(x, local_y, z, block_type);

        if local_y == 0 && index > 0 {
            self.sections[index - 1].mark_dirty();
        }
        if local_y == SECTION_HEIGHT - 1 && index + 1 < SECTIONS_PER_CHUNK {
            self.sections[index + 1].mark_dirty();
        }
    }

    /// The section at `index`, counted from the bottom.
    pub fn section(&self, index: usize) -> &Section {
        &self.sections[index]
    }

    /// All sections, bottom to top.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Layers covered by the section at `index`.
    pub fn section_layers(index: usize) -> Range<usize> {
        index * SECTION_HEIGHT..(index + 1) * SECTION_HEIGHT
    }

    /// Returns `true` if any section needs a new mesh.
    pub fn is_dirty(&self) -> bool {
        self.sections.iter().any(Section::is_dirty)
    }

    /// Indices of the sections that need a new mesh.
    pub fn dirty_sections(&self) -> impl Iterator<Item = usize> + '_ {
        self.sections
            .iter()
            .enumerate()
            .filter(|(_, section)| section.is_dirty())
            .map(|(index, _)| index)
    }

    /// Marks the section containing layer `y` dirty.
    pub fn mark_section_dirty_at(&mut self, y: usize) {
        let (index, _) = Self::section_of(y);
        self.sections[index].mark_dirty();
    }

    /// Marks every section dirty.
    pub fn mark_all_dirty(&mut self) {
        self.sections.iter_mut().for_each(Section::mark_dirty);
    }

    /// Marks dirty the sections whose blocks on the `side` edge could gain or
    /// lose a face when the neighbor across that edge changes.
    ///
    /// Sections with nothing solid on that edge emit no faces toward it and stay clean.
    ///
    /// # Returns
    /// The number of sections marked.
    pub fn mark_border_dirty(&mut self, side: BlockSide) -> usize {
        let mut marked = 0;
        for section in &mut self.sections {
            if !section.is_empty() && BorderPlane::capture(section.grid(), side).has_solid() {
                section.mark_dirty();
                marked += 1;
            }
        }
        marked
    }

    /// Number of non-air blocks in the chunk.
    pub fn solid_count(&self) -> usize {
        self.sections.iter().map(|section| section.grid().solid_count()).sum()
    }

    /// Dirty sections paired with the revision a build of them would cover.
    pub fn dirty_revisions(&self) -> Vec<(usize, u64)> {
        self.sections
            .iter()
            .enumerate()
            .filter(|(_, section)| section.is_dirty())
            .map(|(index, section)| (index, section.revision()))
            .collect()
    }

    /// Builds meshes for every dirty section without modifying the chunk.
    ///
    /// This only needs shared access, so it can run while other chunks are being
    /// meshed. The results are handed to [`Chunk::install_meshes`].
    ///
    /// # Arguments
    /// * `resolver` - Answers queries that cross the chunk's X or Z edges
    pub fn build_dirty_sections<R: NeighborResolver + ?Sized>(&self, resolver: &R) -> Vec<SectionMesh> {
        self.build_sections(resolver, &self.dirty_revisions())
    }

    /// Builds the listed sections, tagging each mesh with the given revision
    /// rather than the section's current one.
    ///
    /// Revisions must be read before the neighbor data in `resolver` is
    /// captured. A neighbor change that lands in between bumps the revision
    /// again, so the installed mesh leaves the section dirty.
    pub fn build_sections<R: NeighborResolver + ?Sized>(
        &self,
        resolver: &R,
        revisions: &[(usize, u64)],
    ) -> Vec<SectionMesh> {
        revisions
            .iter()
            .map(|&(index, revision)| SectionMesh {
                section: index,
                revision,
                mesh: if self.sections[index].is_empty() {
                    Default::default()
                } else {
                    build_mesh_in_layers(self, resolver, Self::section_layers(index))
                },
            })
            .collect()
    }

    /// Installs built section meshes.
    ///
    /// # Returns
    /// The indices of the sections whose mesh was replaced. A mesh built from an
    /// older revision than the installed one is skipped.
    pub fn install_meshes(&mut self, meshes: Vec<SectionMesh>) -> Vec<usize> {
        let mut installed = Vec::with_capacity(meshes.len());
        for SectionMesh { section, revision, mesh } in meshes {
            if self.sections[section].install_mesh(revision, mesh) {
                installed.push(section);
            }
        }
        installed
    }

    /// Builds and installs every dirty section in one go.
    ///
    /// # Returns
    /// The indices of the rebuilt sections.
    pub fn rebuild<R: NeighborResolver + ?Sized>(&mut self, resolver: &R) -> Vec<usize> {
        let meshes = self.build_dirty_sections(resolver);
        self.install_meshes(meshes)
    }

    /// Total faces across all installed section meshes.
    pub fn face_count(&self) -> usize {
        self.sections.iter().map(|section| section.mesh().face_count()).sum()
    }
}

impl BlockGrid for Chunk {
    fn dimensions(&self) -> Vector3<usize> {
        Vector3::new(CHUNK_LENGTH, CHUNK_HEIGHT, CHUNK_WIDTH)
    }

    fn block_at(&self, x: usize, y: usize, z: usize) -> BlockType {
        self.get(x, y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::neighbors::NoNeighbors;

    #[test]
    fn put_dirties_only_the_touched_section() {
        let mut chunk = Chunk::new(Point2::new(0, 0));
        chunk.rebuild(&NoNeighbors);
        assert!(!chunk.is_dirty());

        chunk.put(3, 40, 3, BlockType::STONE);
        assert_eq!(chunk.dirty_sections().collect::<Vec<_>>(), vec![2]);
        assert_eq!(chunk.get(3, 40, 3), BlockType::STONE);
    }

    #[test]
    fn seam_writes_dirty_both_sections() {
        let mut chunk = Chunk::new(Point2::new(0, 0));
        chunk.rebuild(&NoNeighbors);

        chunk.put(0, 32, 0, BlockType::DIRT);
        assert_eq!(chunk.dirty_sections().collect::<Vec<_>>(), vec![1, 2]);

        chunk.rebuild(&NoNeighbors);
        chunk.put(0, 47, 0, BlockType::DIRT);
        assert_eq!(chunk.dirty_sections().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn section_seams_are_culled() {
        let mut chunk = Chunk::new(Point2::new(0, 0));
        chunk.put(5, 15, 5, BlockType::STONE);
        chunk.put(5, 16, 5, BlockType::STONE);
        chunk.rebuild(&NoNeighbors);

        // Two stacked blocks show ten faces, split across the seam.
        assert_eq!(chunk.section(0).mesh().face_count(), 5);
        assert_eq!(chunk.section(1).mesh().face_count(), 5);
        assert_eq!(chunk.face_count(), 10);
    }

    #[test]
    fn border_dirtying_skips_sections_without_edge_blocks() {
        let mut chunk = Chunk::new(Point2::new(0, 0));
        chunk.put(CHUNK_LENGTH - 1, 0, 4, BlockType::STONE);
        chunk.put(0, 100, 4, BlockType::STONE);
        chunk.rebuild(&NoNeighbors);

        assert_eq!(chunk.mark_border_dirty(BlockSide::RIGHT), 1);
        assert_eq!(chunk.dirty_sections().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn edit_between_build_and_install_is_kept() {
        let mut chunk = Chunk::new(Point2::new(0, 0));
        chunk.put(1, 1, 1, BlockType::GRASS);
        let built = chunk.build_dirty_sections(&NoNeighbors);
        chunk.put(2, 1, 1, BlockType::GRASS);

        chunk.install_meshes(built);
        assert!(chunk.section(0).is_dirty());
    }

    #[test]
    fn neighbor_positions() {
        let origin = Point2::new(2, -3);
        assert_eq!(neighbor_position(origin, BlockSide::RIGHT), Point2::new(3, -3));
        assert_eq!(neighbor_position(origin, BlockSide::LEFT), Point2::new(1, -3));
        assert_eq!(neighbor_position(origin, BlockSide::FRONT), Point2::new(2, -2));
        assert_eq!(neighbor_position(origin, BlockSide::BACK), Point2::new(2, -4));
    }

    #[test]
    #[should_panic(expected = "outside the chunk height")]
    fn reading_above_the_world_panics() {
        Chunk::new(Point2::new(0, 0)).get(0, CHUNK_HEIGHT, 0);
    }
}
