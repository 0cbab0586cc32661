//! # Chunk Iteration Module
//!
//! This module provides an iterator that walks a block volume in meshing order
//! and yields only the non-air blocks.
//!
//! ## Traversal Order
//!
//! `x` is the outer axis, `y` the middle and `z` the inner one. The order only
//! decides where a face lands in the vertex buffer; every face carries its own
//! coordinates, so any order produces the same geometry.

use std::ops::Range;

use cgmath::Point3;

use crate::engine_state::voxels::block::block_type::BlockType;

use super::voxel_grid::BlockGrid;

/// An iterator over all non-air blocks of a grid within a range of layers.
pub struct ChunkBlockIterator<'a, G: BlockGrid + ?Sized> {
    /// The volume being walked
    grid: &'a G,
    /// Layers to visit; the full height for plain grids, one section for chunks
    layers: Range<usize>,
    /// Size of the volume, cached at construction
    length: usize,
    width: usize,
    /// Next position to inspect
    local_x: usize,
    local_y: usize,
    local_z: usize,
}

impl<'a, G: BlockGrid + ?Sized> ChunkBlockIterator<'a, G> {
    /// Creates an iterator over every layer of `grid`.
    pub fn new(grid: &'a G) -> Self {
        let height = grid.dimensions().y;
        Self::in_layers(grid, 0..height)
    }

    /// Creates an iterator over the layers in `layers` only.
    ///
    /// # Panics
    /// Panics if `layers` reaches past the top of the grid.
    pub fn in_layers(grid: &'a G, layers: Range<usize>) -> Self {
        let dimensions = grid.dimensions();
        assert!(
            layers.end <= dimensions.y,
            "layers {layers:?} exceed grid height {}",
            dimensions.y
        );
        ChunkBlockIterator {
            grid,
            local_x: 0,
            local_y: layers.start,
            local_z: 0,
            layers,
            length: dimensions.x,
            width: dimensions.z,
        }
    }

    /// Steps to the next cell in x, y, z order. Returns `false` when done.
    fn advance(&mut self) -> bool {
        self.local_z += 1;
        if self.local_z == self.width {
            self.local_z = 0;
            self.local_y += 1;
            if self.local_y == self.layers.end {
                self.local_y = self.layers.start;
                self.local_x += 1;
            }
        }
        self.local_x < self.length
    }
}

impl<G: BlockGrid + ?Sized> Iterator for ChunkBlockIterator<'_, G> {
    type Item = (Point3<usize>, BlockType);

    fn next(&mut self) -> Option<Self::Item> {
        if self.layers.is_empty() || self.width == 0 {
            return None;
        }

        while self.local_x < self.length {
            let position = Point3::new(self.local_x, self.local_y, self.local_z);
            let block_type = self.grid.block_at(position.x, position.y, position.z);
            self.advance();
            if block_type.is_solid() {
                return Some((position, block_type));
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::voxel_grid::VoxelGrid;

    #[test]
    fn empty_grid_yields_nothing() {
        let grid = VoxelGrid::<3, 3, 3>::new();
        assert_eq!(ChunkBlockIterator::new(&grid).count(), 0);
    }

    #[test]
    fn walks_x_then_y_then_z() {
        let mut grid = VoxelGrid::<2, 2, 2>::new();
        grid.put(1, 0, 0, BlockType::STONE);
        grid.put(0, 1, 1, BlockType::DIRT);
        grid.put(0, 0, 1, BlockType::GRASS);

        let visited: Vec<_> = ChunkBlockIterator::new(&grid)
            .map(|(position, block_type)| ((position.x, position.y, position.z), block_type))
            .collect();
        assert_eq!(
            visited,
            vec![
                ((0, 0, 1), BlockType::GRASS),
                ((0, 1, 1), BlockType::DIRT),
                ((1, 0, 0), BlockType::STONE),
            ]
        );
    }

    #[test]
    fn layer_range_limits_the_walk() {
        let grid = VoxelGrid::<2, 4, 2>::filled(BlockType::STONE);
        let visited: Vec<_> = ChunkBlockIterator::in_layers(&grid, 1..3).collect();
        assert_eq!(visited.len(), 8);
        assert!(visited.iter().all(|(position, _)| (1..3).contains(&position.y)));
    }
}
