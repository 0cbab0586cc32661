//! # Voxel Grid Module
//!
//! A dense, fixed-size 3D array of block types with bounds-checked access.
//!
//! ## Memory Layout
//!
//! Blocks are stored y-major: one horizontal `L x W` plane after another, and
//! within a plane one row of `L` blocks per z. The dimensions are const
//! generics, so a grid's size is part of its type and index math never depends
//! on runtime values.

use cgmath::Vector3;

use crate::engine_state::voxels::block::block_type::BlockType;

use super::{CHUNK_HEIGHT, CHUNK_LENGTH, CHUNK_WIDTH};

/// Read access to a block volume, shared by plain grids and sectioned chunks.
///
/// The face culler and mesh assembler work against this trait, so they run
/// unchanged over a small test grid or a full chunk.
pub trait BlockGrid {
    /// Size of the volume along x, y and z.
    fn dimensions(&self) -> Vector3<usize>;

    /// The block at an in-range position.
    ///
    /// # Panics
    /// Implementations panic when the position lies outside [`BlockGrid::dimensions`].
    fn block_at(&self, x: usize, y: usize, z: usize) -> BlockType;

    /// Returns `true` if the signed position lies inside the volume.
    fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        let dimensions = self.dimensions();
        (0..dimensions.x as i32).contains(&x)
            && (0..dimensions.y as i32).contains(&y)
            && (0..dimensions.z as i32).contains(&z)
    }
}

/// A dense `L x H x W` block array owned by a single chunk or section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelGrid<const L: usize, const H: usize, const W: usize> {
    blocks: Box<[BlockType]>,
    solid_count: usize,
}

impl<const L: usize, const H: usize, const W: usize> VoxelGrid<L, H, W> {
    /// Size along x.
    pub const LENGTH: usize = L;
    /// Size along y.
    pub const HEIGHT: usize = H;
    /// Size along z.
    pub const WIDTH: usize = W;
    /// Number of cells.
    pub const VOLUME: usize = L * H * W;

    /// Evaluated on construction; a grid the packed vertex cannot address does not compile.
    const FITS_PACKED_VERTEX: () = assert!(
        L > 0 && H > 0 && W > 0 && L <= CHUNK_LENGTH && H <= CHUNK_HEIGHT && W <= CHUNK_WIDTH,
        "grid dimensions exceed the packed vertex position fields"
    );

    /// Creates a grid filled with air.
    pub fn new() -> Self {
        Self::filled(BlockType::AIR)
    }

    /// Creates a grid where every cell holds `block_type`.
    pub fn filled(block_type: BlockType) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::FITS_PACKED_VERTEX;
        VoxelGrid {
            blocks: vec![block_type; Self::VOLUME].into_boxed_slice(),
            solid_count: if block_type.is_solid() { Self::VOLUME } else { 0 },
        }
    }

    #[inline]
    fn index(x: usize, y: usize, z: usize) -> usize {
        assert!(
            x < L && y < H && z < W,
            "block ({x}, {y}, {z}) is outside the {L}x{H}x{W} grid"
        );
        x + L * (z + W * y)
    }

    /// Reads the block at `(x, y, z)`.
    ///
    /// # Panics
    /// Panics if any coordinate is out of range. Coordinates are never wrapped or clamped.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockType {
        self.blocks[Self::index(x, y, z)]
    }

    /// Writes the block at `(x, y, z)`. Writing `AIR` removes a block.
    ///
    /// # Panics
    /// Panics if any coordinate is out of range.
    pub fn put(&mut self, x: usize, y: usize, z: usize, block_type: BlockType) {
        let cell = &mut self.blocks[Self::index(x, y, z)];
        match (cell.is_solid(), block_type.is_solid()) {
            (false, true) => self.solid_count += 1,
            (true, false) => self.solid_count -= 1,
            _ => {}
        }
        *cell = block_type;
    }

    /// Reads a signed position, returning `None` outside the grid.
    pub fn get_checked(&self, x: i32, y: i32, z: i32) -> Option<BlockType> {
        BlockGrid::contains(self, x, y, z).then(|| self.get(x as usize, y as usize, z as usize))
    }

    /// Number of non-air cells.
    pub fn solid_count(&self) -> usize {
        self.solid_count
    }

    /// Returns `true` if every cell is air.
    pub fn is_empty(&self) -> bool {
        self.solid_count == 0
    }
}

impl<const L: usize, const H: usize, const W: usize> Default for VoxelGrid<L, H, W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const L: usize, const H: usize, const W: usize> BlockGrid for VoxelGrid<L, H, W> {
    fn dimensions(&self) -> Vector3<usize> {
        Vector3::new(L, H, W)
    }

    fn block_at(&self, x: usize, y: usize, z: usize) -> BlockType {
        self.get(x, y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_as_air() {
        let grid = VoxelGrid::<4, 4, 4>::new();
        assert!(grid.is_empty());
        assert_eq!(grid.get(3, 3, 3), BlockType::AIR);
    }

    #[test]
    fn put_and_get_round_trip() {
        let mut grid = VoxelGrid::<4, 8, 2>::new();
        grid.put(3, 7, 1, BlockType::STONE);
        grid.put(0, 0, 0, BlockType::GRASS);
        assert_eq!(grid.get(3, 7, 1), BlockType::STONE);
        assert_eq!(grid.get(0, 0, 0), BlockType::GRASS);
        assert_eq!(grid.get(1, 0, 0), BlockType::AIR);
        assert_eq!(grid.solid_count(), 2);
    }

    #[test]
    fn solid_count_tracks_overwrites() {
        let mut grid = VoxelGrid::<2, 2, 2>::new();
        grid.put(1, 1, 1, BlockType::DIRT);
        grid.put(1, 1, 1, BlockType::STONE);
        assert_eq!(grid.solid_count(), 1);
        grid.put(1, 1, 1, BlockType::AIR);
        assert!(grid.is_empty());

        let full = VoxelGrid::<2, 2, 2>::filled(BlockType::STONE);
        assert_eq!(full.solid_count(), 8);
    }

    #[test]
    fn checked_reads_reject_out_of_range() {
        let grid = VoxelGrid::<2, 3, 4>::filled(BlockType::DIRT);
        assert_eq!(grid.get_checked(1, 2, 3), Some(BlockType::DIRT));
        assert_eq!(grid.get_checked(-1, 0, 0), None);
        assert_eq!(grid.get_checked(2, 0, 0), None);
        assert_eq!(grid.get_checked(0, 3, 0), None);
        assert_eq!(grid.get_checked(0, 0, 4), None);
    }

    #[test]
    #[should_panic(expected = "outside the 2x2x2 grid")]
    fn out_of_range_read_panics() {
        let grid = VoxelGrid::<2, 2, 2>::new();
        grid.get(0, 2, 0);
    }

    #[test]
    #[should_panic(expected = "outside the 2x2x2 grid")]
    fn out_of_range_write_panics() {
        let mut grid = VoxelGrid::<2, 2, 2>::new();
        grid.put(2, 0, 0, BlockType::STONE);
    }
}
