//! # Block Side Module
//!
//! This module defines the six faces of a voxel block and the unit offsets
//! used to find the block each face touches.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// Each variant is assigned a unique integer value which is also its index into
/// per-face tables such as the block catalog.
///
/// The order is: [RIGHT, LEFT, TOP, BOTTOM, FRONT, BACK]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The right face (facing positive X)
    RIGHT = 0,

    /// The left face (facing negative X)
    LEFT = 1,

    /// The top face (facing positive Y)
    TOP = 2,

    /// The bottom face (facing negative Y)
    BOTTOM = 3,

    /// The front face (facing positive Z)
    FRONT = 4,

    /// The back face (facing negative Z)
    BACK = 5,
}

impl BlockSide {
    /// All six block faces in index order.
    pub const ALL: [BlockSide; 6] = [
        BlockSide::RIGHT,
        BlockSide::LEFT,
        BlockSide::TOP,
        BlockSide::BOTTOM,
        BlockSide::FRONT,
        BlockSide::BACK,
    ];

    /// The four faces that can cross into a horizontally adjacent chunk.
    pub const HORIZONTAL: [BlockSide; 4] = [
        BlockSide::RIGHT,
        BlockSide::LEFT,
        BlockSide::FRONT,
        BlockSide::BACK,
    ];

    /// The unit step from a block to the block this face touches.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
        }
    }

    /// The face pointing the other way along the same axis.
    pub fn opposite(self) -> BlockSide {
        match self {
            BlockSide::RIGHT => BlockSide::LEFT,
            BlockSide::LEFT => BlockSide::RIGHT,
            BlockSide::TOP => BlockSide::BOTTOM,
            BlockSide::BOTTOM => BlockSide::TOP,
            BlockSide::FRONT => BlockSide::BACK,
            BlockSide::BACK => BlockSide::FRONT,
        }
    }

    /// Position of this side in [`BlockSide::HORIZONTAL`], or `None` for TOP/BOTTOM.
    pub fn horizontal_index(self) -> Option<usize> {
        match self {
            BlockSide::RIGHT => Some(0),
            BlockSide::LEFT => Some(1),
            BlockSide::FRONT => Some(2),
            BlockSide::BACK => Some(3),
            BlockSide::TOP | BlockSide::BOTTOM => None,
        }
    }
}
