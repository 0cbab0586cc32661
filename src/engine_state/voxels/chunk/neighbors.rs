//! # Chunk Neighbors Module
//!
//! Cross-chunk boundary lookups used by face culling.
//!
//! A chunk keeps weak handles to its four horizontal neighbors. Before a mesh
//! build, the facing edge plane of each live neighbor is copied into a
//! [`NeighborSnapshot`] under a short read lock, so the build itself never holds
//! a neighbor's lock and never observes a neighbor mid-unload. A missing or
//! unloaded neighbor resolves to open air, which keeps the outer faces of a
//! partially loaded world visible.

use crate::core::{MtResource, WeakMtResource};
use crate::engine_state::voxels::block::{block_side::BlockSide, block_type::BlockType};

use super::{voxel_grid::BlockGrid, Chunk};

/// Answers block queries that fall one step outside a grid along X or Z.
pub trait NeighborResolver {
    /// Returns the block at `(x, y, z)`, given in the querying grid's local
    /// coordinates, where the position lies one step past the grid across `side`.
    ///
    /// # Panics
    /// Implementations panic for `TOP`/`BOTTOM`; chunks never tile vertically.
    fn resolve(&self, side: BlockSide, x: i32, y: i32, z: i32) -> BlockType;
}

/// Resolver for an isolated grid: everything outside is air.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoNeighbors;

impl NeighborResolver for NoNeighbors {
    fn resolve(&self, side: BlockSide, _x: i32, _y: i32, _z: i32) -> BlockType {
        assert!(
            side.horizontal_index().is_some(),
            "neighbor queries cross X or Z only, got {side:?}"
        );
        BlockType::AIR
    }
}

/// A copy of one edge plane of a neighboring volume.
#[derive(Clone, Debug)]
pub struct BorderPlane {
    /// Blocks stored row by row: `blocks[y * span + along]`
    blocks: Vec<BlockType>,
    /// Extent along the edge (z for X edges, x for Z edges)
    span: usize,
    height: usize,
    /// Extent of the neighbor across the edge, used to wrap the crossing coordinate
    depth: i32,
    /// The neighbor-local coordinate of this plane across the edge
    edge: i32,
}

impl BorderPlane {
    /// Copies the plane of `grid` lying on its `edge` side.
    ///
    /// # Panics
    /// Panics if `edge` is `TOP` or `BOTTOM`.
    pub fn capture<G: BlockGrid + ?Sized>(grid: &G, edge: BlockSide) -> Self {
        let dimensions = grid.dimensions();
        let (span, depth, edge_coordinate) = match edge {
            BlockSide::RIGHT => (dimensions.z, dimensions.x, dimensions.x - 1),
            BlockSide::LEFT => (dimensions.z, dimensions.x, 0),
            BlockSide::FRONT => (dimensions.x, dimensions.z, dimensions.z - 1),
            BlockSide::BACK => (dimensions.x, dimensions.z, 0),
            BlockSide::TOP | BlockSide::BOTTOM => {
                panic!("border planes are horizontal edges only, got {edge:?}")
            }
        };

        let mut blocks = Vec::with_capacity(span * dimensions.y);
        for y in 0..dimensions.y {
            for along in 0..span {
                let block_type = match edge {
                    BlockSide::RIGHT | BlockSide::LEFT => grid.block_at(edge_coordinate, y, along),
                    _ => grid.block_at(along, y, edge_coordinate),
                };
                blocks.push(block_type);
            }
        }

        BorderPlane {
            blocks,
            span,
            height: dimensions.y,
            depth: depth as i32,
            edge: edge_coordinate as i32,
        }
    }

    /// Reads the plane at a querying-grid position that crossed into the neighbor.
    ///
    /// `crossing` is the coordinate along the crossed axis; it is wrapped into the
    /// neighbor's local space and must land on this plane.
    fn get(&self, crossing: i32, y: i32, along: i32) -> BlockType {
        let local = crossing.rem_euclid(self.depth);
        assert_eq!(
            local, self.edge,
            "coordinate {crossing} does not cross into this border plane"
        );
        assert!(
            (0..self.height as i32).contains(&y) && (0..self.span as i32).contains(&along),
            "neighbor query ({crossing}, {y}, {along}) crosses more than one boundary"
        );
        self.blocks[y as usize * self.span + along as usize]
    }

    /// Returns `true` if any block on the plane is solid.
    pub fn has_solid(&self) -> bool {
        self.blocks.iter().any(|block_type| block_type.is_solid())
    }
}

/// Edge planes of the four horizontal neighbors, taken at one point in time.
#[derive(Clone, Debug, Default)]
pub struct NeighborSnapshot {
    /// Indexed by [`BlockSide::horizontal_index`]
    planes: [Option<BorderPlane>; 4],
}

impl NeighborSnapshot {
    /// Captures the facing plane of every neighbor that is still loaded.
    ///
    /// Each neighbor is read-locked only while its plane is copied; no two locks
    /// are ever held at once.
    pub fn capture(links: &ChunkNeighbors) -> Self {
        let mut snapshot = NeighborSnapshot::default();
        for side in BlockSide::HORIZONTAL {
            if let Some(neighbor) = links.get(side) {
                let plane = BorderPlane::capture(&*neighbor.get(), side.opposite());
                snapshot.set(side, Some(plane));
            }
        }
        snapshot
    }

    /// Builds a snapshot from borrowed neighbor volumes, ordered as [`BlockSide::HORIZONTAL`].
    pub fn from_grids<G: BlockGrid + ?Sized>(neighbors: [Option<&G>; 4]) -> Self {
        let mut snapshot = NeighborSnapshot::default();
        for (side, neighbor) in BlockSide::HORIZONTAL.into_iter().zip(neighbors) {
            snapshot.set(side, neighbor.map(|grid| BorderPlane::capture(grid, side.opposite())));
        }
        snapshot
    }

    /// Replaces the plane seen across `side`.
    pub fn set(&mut self, side: BlockSide, plane: Option<BorderPlane>) {
        let index = horizontal_index(side);
        self.planes[index] = plane;
    }

    /// Returns `true` if a neighbor was present across `side`.
    pub fn has_neighbor(&self, side: BlockSide) -> bool {
        self.planes[horizontal_index(side)].is_some()
    }
}

impl NeighborResolver for NeighborSnapshot {
    fn resolve(&self, side: BlockSide, x: i32, y: i32, z: i32) -> BlockType {
        match &self.planes[horizontal_index(side)] {
            None => BlockType::AIR,
            Some(plane) => match side {
                BlockSide::RIGHT | BlockSide::LEFT => plane.get(x, y, z),
                _ => plane.get(z, y, x),
            },
        }
    }
}

fn horizontal_index(side: BlockSide) -> usize {
    side.horizontal_index()
        .unwrap_or_else(|| panic!("neighbor queries cross X or Z only, got {side:?}"))
}

/// Non-owning links from a chunk to its horizontal neighbors.
///
/// Links are only changed under the owning chunk's write lock. A link whose
/// target was unloaded upgrades to `None`, the same as no link at all.
#[derive(Clone, Default)]
pub struct ChunkNeighbors {
    /// Indexed by [`BlockSide::horizontal_index`]
    links: [Option<WeakMtResource<Chunk>>; 4],
}

impl ChunkNeighbors {
    /// Points the link across `side` at `neighbor`.
    pub fn link(&mut self, side: BlockSide, neighbor: WeakMtResource<Chunk>) {
        self.links[horizontal_index(side)] = Some(neighbor);
    }

    /// Clears the link across `side`.
    pub fn unlink(&mut self, side: BlockSide) {
        self.links[horizontal_index(side)] = None;
    }

    /// Resolves the link across `side` to a live chunk, if there is one.
    pub fn get(&self, side: BlockSide) -> Option<MtResource<Chunk>> {
        self.links[horizontal_index(side)]
            .as_ref()
            .and_then(WeakMtResource::upgrade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::voxel_grid::VoxelGrid;

    type Grid = VoxelGrid<4, 2, 3>;

    #[test]
    fn no_neighbors_is_open_air() {
        assert_eq!(NoNeighbors.resolve(BlockSide::RIGHT, 4, 0, 0), BlockType::AIR);
        assert_eq!(NoNeighbors.resolve(BlockSide::BACK, 0, 0, -1), BlockType::AIR);
    }

    #[test]
    #[should_panic(expected = "cross X or Z only")]
    fn vertical_queries_are_rejected() {
        NoNeighbors.resolve(BlockSide::TOP, 0, 2, 0);
    }

    #[test]
    fn snapshot_reads_the_facing_edge() {
        let mut east = Grid::new();
        east.put(0, 1, 2, BlockType::STONE);
        east.put(3, 1, 2, BlockType::DIRT);
        let mut south = Grid::new();
        south.put(1, 0, 0, BlockType::GRASS);

        let snapshot = NeighborSnapshot::from_grids([Some(&east), None, None, Some(&south)]);
        assert!(snapshot.has_neighbor(BlockSide::RIGHT));
        assert!(!snapshot.has_neighbor(BlockSide::LEFT));

        // One step past x = 3 wraps to the east neighbor's x = 0 edge.
        assert_eq!(snapshot.resolve(BlockSide::RIGHT, 4, 1, 2), BlockType::STONE);
        assert_eq!(snapshot.resolve(BlockSide::RIGHT, 4, 0, 2), BlockType::AIR);
        // One step before z = 0 wraps to the south neighbor's z = 2 edge.
        assert_eq!(snapshot.resolve(BlockSide::BACK, 1, 0, -1), BlockType::AIR);
        // Missing neighbors are air.
        assert_eq!(snapshot.resolve(BlockSide::LEFT, -1, 1, 2), BlockType::AIR);
    }

    #[test]
    fn back_neighbor_edge_is_its_far_plane() {
        let mut south = Grid::new();
        south.put(1, 0, 2, BlockType::GRASS);
        let snapshot = NeighborSnapshot::from_grids([None, None, None, Some(&south)]);
        assert_eq!(snapshot.resolve(BlockSide::BACK, 1, 0, -1), BlockType::GRASS);
    }

    #[test]
    #[should_panic(expected = "does not cross into this border plane")]
    fn queries_two_steps_out_are_rejected() {
        let east = Grid::filled(BlockType::STONE);
        let snapshot = NeighborSnapshot::from_grids([Some(&east), None, None, None]);
        snapshot.resolve(BlockSide::RIGHT, 5, 0, 0);
    }

    #[test]
    #[should_panic(expected = "crosses more than one boundary")]
    fn diagonal_queries_are_rejected() {
        let east = Grid::filled(BlockType::STONE);
        let snapshot = NeighborSnapshot::from_grids([Some(&east), None, None, None]);
        snapshot.resolve(BlockSide::RIGHT, 4, 0, 3);
    }

    #[test]
    fn border_plane_reports_solids() {
        let mut grid = Grid::new();
        assert!(!BorderPlane::capture(&grid, BlockSide::LEFT).has_solid());
        grid.put(0, 1, 1, BlockType::DIRT);
        assert!(BorderPlane::capture(&grid, BlockSide::LEFT).has_solid());
        assert!(!BorderPlane::capture(&grid, BlockSide::RIGHT).has_solid());
    }
}
