//! Packed vertex format used for voxel rendering.
//!
//! A chunk vertex is a single `u32`. The low bits come from the block catalog
//! (atlas corner and unit-cube corner, baked once per material and face); the high
//! bits hold the block's chunk-local position, added when a face is emitted.
//!
//! # Layout (low to high)
//! - atlas u, atlas v: [`ATLAS_BITS`] each, tile corners `0..=ATLAS_TILES_PER_ROW`
//! - corner x, y, z: one bit each
//! - block z: [`POSITION_Z_BITS`]
//! - block x: [`POSITION_X_BITS`]
//! - block y: [`POSITION_Y_BITS`]
//!
//! The vertex shader reconstructs the position as `block + corner` and the
//! texture coordinate as `atlas / ATLAS_TILES_PER_ROW`.

use static_assertions::{assert_eq_size, const_assert};

use crate::engine_state::voxels::chunk::{CHUNK_HEIGHT, CHUNK_LENGTH, CHUNK_WIDTH};

/// Number of tiles along each edge of the square texture atlas.
pub const ATLAS_TILES_PER_ROW: u32 = 16;

/// Number of bits needed to store every value in `0..=max_value`.
pub const fn bits_needed(max_value: u32) -> u32 {
    u32::BITS - max_value.leading_zeros()
}

/// Width of each atlas coordinate field.
pub const ATLAS_BITS: u32 = bits_needed(ATLAS_TILES_PER_ROW);
/// Width of the block x field.
pub const POSITION_X_BITS: u32 = bits_needed(CHUNK_LENGTH as u32 - 1);
/// Width of the block y field.
pub const POSITION_Y_BITS: u32 = bits_needed(CHUNK_HEIGHT as u32 - 1);
/// Width of the block z field.
pub const POSITION_Z_BITS: u32 = bits_needed(CHUNK_WIDTH as u32 - 1);

/// Shift of the atlas u field.
pub const ATLAS_U_SHIFT: u32 = 0;
/// Shift of the atlas v field.
pub const ATLAS_V_SHIFT: u32 = ATLAS_U_SHIFT + ATLAS_BITS;
/// Shift of the corner x bit.
pub const CORNER_X_SHIFT: u32 = ATLAS_V_SHIFT + ATLAS_BITS;
/// Shift of the corner y bit.
pub const CORNER_Y_SHIFT: u32 = CORNER_X_SHIFT + 1;
/// Shift of the corner z bit.
pub const CORNER_Z_SHIFT: u32 = CORNER_Y_SHIFT + 1;
/// Shift of the block z field.
pub const POSITION_Z_SHIFT: u32 = CORNER_Z_SHIFT + 1;
/// Shift of the block x field.
pub const POSITION_X_SHIFT: u32 = POSITION_Z_SHIFT + POSITION_Z_BITS;
/// Shift of the block y field.
pub const POSITION_Y_SHIFT: u32 = POSITION_X_SHIFT + POSITION_X_BITS;
/// Total number of bits in use.
pub const PACKED_BITS: u32 = POSITION_Y_SHIFT + POSITION_Y_BITS;

/// Mask of every bit a catalog template may set.
pub const TEMPLATE_MASK: u32 = (1 << POSITION_Z_SHIFT) - 1;
/// Mask of the block position fields.
pub const POSITION_MASK: u32 = ((1u64 << PACKED_BITS) - 1) as u32 & !TEMPLATE_MASK;

const_assert!(PACKED_BITS <= u32::BITS);
const_assert!((1 << POSITION_X_BITS) >= CHUNK_LENGTH);
const_assert!((1 << POSITION_Y_BITS) >= CHUNK_HEIGHT);
const_assert!((1 << POSITION_Z_BITS) >= CHUNK_WIDTH);
const_assert!((1 << ATLAS_BITS) > ATLAS_TILES_PER_ROW);

const fn field(word: u32, shift: u32, bits: u32) -> u32 {
    (word >> shift) & ((1 << bits) - 1)
}

/// A vertex in the voxel rendering pipeline, packed into one 32-bit word.
///
/// The GPU reads it as a single unsigned-integer attribute.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedVertex(pub u32);

assert_eq_size!(PackedVertex, u32);

impl PackedVertex {
    /// Builds the position-free part of a vertex: corner offset and atlas corner.
    ///
    /// # Panics
    /// Panics (at compile time when used in a constant) if a corner component is
    /// not 0 or 1, or an atlas coordinate exceeds [`ATLAS_TILES_PER_ROW`].
    pub const fn template(corner: [u32; 3], atlas: [u32; 2]) -> Self {
        assert!(corner[0] <= 1 && corner[1] <= 1 && corner[2] <= 1, "corner offsets are 0 or 1");
        assert!(
            atlas[0] <= ATLAS_TILES_PER_ROW && atlas[1] <= ATLAS_TILES_PER_ROW,
            "atlas coordinate outside the atlas"
        );
        PackedVertex(
            (atlas[0] << ATLAS_U_SHIFT)
                | (atlas[1] << ATLAS_V_SHIFT)
                | (corner[0] << CORNER_X_SHIFT)
                | (corner[1] << CORNER_Y_SHIFT)
                | (corner[2] << CORNER_Z_SHIFT),
        )
    }

    /// Adds a chunk-local block position to a template vertex.
    ///
    /// # Panics
    /// Panics if the position does not fit the chunk, rather than letting it
    /// bleed into a neighboring field.
    #[inline]
    pub fn with_position(self, x: usize, y: usize, z: usize) -> Self {
        assert!(
            x < CHUNK_LENGTH && y < CHUNK_HEIGHT && z < CHUNK_WIDTH,
            "block position ({x}, {y}, {z}) does not fit the packed vertex"
        );
        debug_assert_eq!(self.0 & POSITION_MASK, 0, "template already carries a position");
        PackedVertex(
            self.0
                | ((x as u32) << POSITION_X_SHIFT)
                | ((y as u32) << POSITION_Y_SHIFT)
                | ((z as u32) << POSITION_Z_SHIFT),
        )
    }

    /// The chunk-local block position `[x, y, z]`.
    pub const fn position(self) -> [u32; 3] {
        [
            field(self.0, POSITION_X_SHIFT, POSITION_X_BITS),
            field(self.0, POSITION_Y_SHIFT, POSITION_Y_BITS),
            field(self.0, POSITION_Z_SHIFT, POSITION_Z_BITS),
        ]
    }

    /// The unit-cube corner `[x, y, z]`, each 0 or 1.
    pub const fn corner(self) -> [u32; 3] {
        [
            field(self.0, CORNER_X_SHIFT, 1),
            field(self.0, CORNER_Y_SHIFT, 1),
            field(self.0, CORNER_Z_SHIFT, 1),
        ]
    }

    /// The atlas corner `[u, v]` in tile units.
    pub const fn atlas(self) -> [u32; 2] {
        [
            field(self.0, ATLAS_U_SHIFT, ATLAS_BITS),
            field(self.0, ATLAS_V_SHIFT, ATLAS_BITS),
        ]
    }

    /// The vertex's chunk-local position, as the shader reconstructs it.
    pub const fn chunk_position(self) -> [u32; 3] {
        let block = self.position();
        let corner = self.corner();
        [block[0] + corner[0], block[1] + corner[1], block[2] + corner[2]]
    }

    /// The bits contributed by the catalog template.
    pub const fn template_bits(self) -> u32 {
        self.0 & TEMPLATE_MASK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_disjoint_and_fit() {
        assert_eq!(POSITION_X_BITS, 4);
        assert_eq!(POSITION_Y_BITS, 8);
        assert_eq!(POSITION_Z_BITS, 4);
        assert_eq!(ATLAS_BITS, 5);
        assert_eq!(PACKED_BITS, 29);
        assert_eq!(TEMPLATE_MASK & POSITION_MASK, 0);
    }

    #[test]
    fn position_decodes_for_every_in_range_coordinate() {
        let template = PackedVertex::template([1, 0, 1], [3, 16]);
        for x in 0..CHUNK_LENGTH {
            for y in (0..CHUNK_HEIGHT).step_by(5).chain([CHUNK_HEIGHT - 1]) {
                for z in 0..CHUNK_WIDTH {
                    let vertex = template.with_position(x, y, z);
                    assert_eq!(vertex.position(), [x as u32, y as u32, z as u32]);
                    assert_eq!(vertex.template_bits(), template.0);
                }
            }
        }
    }

    #[test]
    fn template_fields_decode() {
        let vertex = PackedVertex::template([0, 1, 1], [16, 15]).with_position(15, 255, 0);
        assert_eq!(vertex.corner(), [0, 1, 1]);
        assert_eq!(vertex.atlas(), [16, 15]);
        assert_eq!(vertex.chunk_position(), [15, 256, 1]);
    }

    #[test]
    #[should_panic(expected = "does not fit the packed vertex")]
    fn out_of_range_position_panics() {
        PackedVertex::template([0, 0, 0], [0, 0]).with_position(CHUNK_LENGTH, 0, 0);
    }
}
