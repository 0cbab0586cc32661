//! Face visibility tests.
//!
//! A face is drawn when the cell it faces is transparent. Cells inside the grid
//! are read directly; cells past an X or Z edge go through the neighbor
//! resolver; cells above or below the grid are outside the world and always
//! count as open.

use cgmath::Point3;

use crate::engine_state::voxels::{
    block::block_side::BlockSide,
    chunk::{neighbors::NeighborResolver, voxel_grid::BlockGrid},
};

/// Decides whether the `side` face of the block at `position` is visible.
///
/// # Arguments
/// * `grid` - The volume being meshed
/// * `resolver` - Answers lookups that leave `grid` along X or Z
/// * `position` - A solid block inside `grid`
/// * `side` - The face to test
///
/// # Panics
/// Panics (in debug builds) if the block at `position` is air; air is skipped
/// before any face is tested.
pub fn is_face_visible<G, R>(grid: &G, resolver: &R, position: Point3<usize>, side: BlockSide) -> bool
where
    G: BlockGrid + ?Sized,
    R: NeighborResolver + ?Sized,
{
    debug_assert!(
        grid.block_at(position.x, position.y, position.z).is_solid(),
        "culling queried for air at {position:?}"
    );

    let offset = side.offset();
    let x = position.x as i32 + offset.x;
    let y = position.y as i32 + offset.y;
    let z = position.z as i32 + offset.z;

    if !(0..grid.dimensions().y as i32).contains(&y) {
        return true;
    }

    let neighbor = if grid.contains(x, y, z) {
        grid.block_at(x as usize, y as usize, z as usize)
    } else {
        resolver.resolve(side, x, y, z)
    };
    neighbor.is_transparent()
}

/// Visibility of all six faces of the block at `position`, in [`BlockSide`] order.
pub fn visible_faces<G, R>(grid: &G, resolver: &R, position: Point3<usize>) -> [bool; 6]
where
    G: BlockGrid + ?Sized,
    R: NeighborResolver + ?Sized,
{
    BlockSide::ALL.map(|side| is_face_visible(grid, resolver, position, side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{
        block::block_type::BlockType,
        chunk::{
            neighbors::{NeighborSnapshot, NoNeighbors},
            voxel_grid::VoxelGrid,
        },
    };

    type Grid = VoxelGrid<3, 3, 3>;

    #[test]
    fn lone_block_shows_every_face() {
        let mut grid = Grid::new();
        grid.put(1, 1, 1, BlockType::STONE);
        assert_eq!(visible_faces(&grid, &NoNeighbors, Point3::new(1, 1, 1)), [true; 6]);
    }

    #[test]
    fn covered_faces_are_hidden() {
        let mut grid = Grid::new();
        grid.put(1, 1, 1, BlockType::STONE);
        grid.put(1, 2, 1, BlockType::DIRT);
        grid.put(2, 1, 1, BlockType::GRASS);

        let faces = visible_faces(&grid, &NoNeighbors, Point3::new(1, 1, 1));
        assert!(!faces[BlockSide::TOP as usize]);
        assert!(!faces[BlockSide::RIGHT as usize]);
        assert!(faces[BlockSide::LEFT as usize]);
        assert!(faces[BlockSide::BOTTOM as usize]);
    }

    #[test]
    fn vertical_world_edges_always_draw() {
        let grid = Grid::filled(BlockType::STONE);
        assert!(is_face_visible(&grid, &NoNeighbors, Point3::new(0, 2, 0), BlockSide::TOP));
        assert!(is_face_visible(&grid, &NoNeighbors, Point3::new(0, 0, 0), BlockSide::BOTTOM));
        assert!(!is_face_visible(&grid, &NoNeighbors, Point3::new(1, 1, 1), BlockSide::TOP));
    }

    #[test]
    fn horizontal_edges_ask_the_resolver() {
        let grid = Grid::filled(BlockType::STONE);
        let east = Grid::filled(BlockType::DIRT);
        let snapshot = NeighborSnapshot::from_grids([Some(&east), None, None, None]);

        assert!(!is_face_visible(&grid, &snapshot, Point3::new(2, 0, 0), BlockSide::RIGHT));
        assert!(is_face_visible(&grid, &snapshot, Point3::new(0, 0, 0), BlockSide::LEFT));
        assert!(is_face_visible(&grid, &snapshot, Point3::new(0, 0, 2), BlockSide::FRONT));
    }
}
