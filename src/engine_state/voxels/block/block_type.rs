//! # Block Type Module
//!
//! This module defines the different materials a block can be made of.
//! It provides functionality for block type identification, conversion, and random generation.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// The discriminants are the values stored in voxel grids and the keys of the
/// block catalog. The `FromPrimitive` derive allows conversion from integers.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// An air block, the only non-solid and transparent material.
    #[default]
    AIR = 0,

    /// A grass block with different textures on top and sides.
    /// The top is green, sides have grass on dirt, and bottom is plain dirt.
    GRASS = 1,

    /// A basic dirt block, found in the soil layer under grass.
    DIRT = 2,

    /// A stone block, filling everything below the soil layer.
    STONE = 3,
}

impl BlockType {
    /// Every block type, in discriminant order.
    pub const ALL: [BlockType; 4] = [
        BlockType::AIR,
        BlockType::GRASS,
        BlockType::DIRT,
        BlockType::STONE,
    ];

    /// Converts a `BlockTypeSize` to a `BlockType`.
    ///
    /// # Returns
    /// `None` if the value doesn't correspond to a known block type.
    pub fn from_int(btype: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(btype)
    }

    /// Returns the compact storage value of this block type.
    pub const fn as_int(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Returns `true` for every material that occupies its cell.
    pub const fn is_solid(self) -> bool {
        !matches!(self, BlockType::AIR)
    }

    /// Returns `true` if faces behind this block can be seen through it.
    ///
    /// Only `AIR` is transparent; a face is drawn exactly when the block it
    /// faces is transparent.
    pub const fn is_transparent(self) -> bool {
        matches!(self, BlockType::AIR)
    }

    /// Generates a random block type (excluding AIR).
    ///
    /// This is used for demo edits and randomized tests.
    pub fn get_random_type() -> Self {
        Self::from_int(fastrand::u8(1..=BlockType::STONE.as_int())).unwrap_or(BlockType::STONE)
    }
}
