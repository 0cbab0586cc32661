use cgmath::Point3;

use crate::engine_state::{
    rendering::vertex::PackedVertex,
    voxels::block::{
        block_side::BlockSide,
        block_type::BlockType,
        catalog::{self, FaceTemplate, VERTICES_PER_FACE},
    },
};

/// A single visible face of a block, ready to be encoded.
///
/// Faces are never merged: each one covers exactly one block side and carries
/// the chunk-local coordinates of its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    /// Chunk-local coordinates of the block the face belongs to
    pub position: Point3<usize>,
    /// Material of the block, selects the atlas tile
    pub block_type: BlockType,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
}

impl Face {
    /// Creates a new face for the block at `(x, y, z)`.
    pub fn new(x: usize, y: usize, z: usize, block_type: BlockType, block_side: BlockSide) -> Self {
        Face {
            position: Point3::new(x, y, z),
            block_type,
            block_side,
        }
    }

    /// Encodes the face into its four packed vertices.
    ///
    /// # Panics
    /// See [`encode_face`].
    pub fn vertices(&self) -> [PackedVertex; VERTICES_PER_FACE] {
        encode_face(
            self.block_type,
            self.block_side,
            self.position.x,
            self.position.y,
            self.position.z,
        )
    }
}

/// Packs the four corners of one block face.
///
/// The catalog template already holds the corner offsets and atlas coordinates;
/// the block's coordinates are OR-ed into the position fields. The result only
/// depends on the arguments, so equal inputs always give bit-identical output.
///
/// # Arguments
/// * `block_type` - A solid material
/// * `side` - The face to encode
/// * `x`, `y`, `z` - Chunk-local block coordinates
///
/// # Panics
/// Panics if the catalog has no template for `(block_type, side)` (air, or a
/// material missing from the catalog) or if a coordinate does not fit its
/// packed field.
pub fn encode_face(block_type: BlockType, side: BlockSide, x: usize, y: usize, z: usize) -> FaceTemplate {
    let template = catalog::template_for(block_type, side)
        .unwrap_or_else(|| panic!("no face template for {block_type:?} {side:?}"));
    (*template).map(|vertex| vertex.with_position(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_decode_exactly() {
        for (x, y, z) in [(0, 0, 0), (15, 255, 15), (7, 128, 3), (1, 2, 14)] {
            for side in BlockSide::ALL {
                for vertex in encode_face(BlockType::STONE, side, x, y, z) {
                    assert_eq!(vertex.position(), [x as u32, y as u32, z as u32]);
                }
            }
        }
    }

    #[test]
    fn template_bits_survive_encoding() {
        let template = catalog::template_for(BlockType::GRASS, BlockSide::TOP).unwrap();
        let encoded = Face::new(3, 90, 12, BlockType::GRASS, BlockSide::TOP).vertices();
        for (packed, bare) in encoded.iter().zip(template) {
            assert_eq!(packed.template_bits(), bare.0);
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let first = encode_face(BlockType::DIRT, BlockSide::BACK, 4, 5, 6);
        let second = encode_face(BlockType::DIRT, BlockSide::BACK, 4, 5, 6);
        assert_eq!(first, second);
    }

    #[test]
    #[should_panic(expected = "no face template for AIR")]
    fn air_has_no_faces() {
        encode_face(BlockType::AIR, BlockSide::TOP, 0, 0, 0);
    }

    #[test]
    #[should_panic(expected = "does not fit the packed vertex")]
    fn oversized_coordinates_panic() {
        encode_face(BlockType::STONE, BlockSide::TOP, 16, 0, 0);
    }
}
