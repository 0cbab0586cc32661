//! # Block Catalog
//!
//! Static per-material, per-face vertex templates. Every template is computed at
//! compile time from the material's atlas tiles and the unit-cube corner table,
//! and the catalog itself is an immutable perfect-hash map keyed by the block's
//! storage value. Nothing here changes at runtime.

use log::error;
use phf::phf_map;

use crate::engine_state::rendering::vertex::PackedVertex;

use super::{block_side::BlockSide, block_type::BlockType, BlockTypeSize};

/// Number of faces on a block.
pub const FACES_PER_BLOCK: usize = 6;
/// Number of vertices emitted per face.
pub const VERTICES_PER_FACE: usize = 4;
/// Number of indices drawn per face.
pub const INDICES_PER_FACE: usize = 6;

/// How the four vertices of a face form two triangles.
pub const FACE_INDICES: [u32; INDICES_PER_FACE] = [0, 1, 3, 3, 2, 0];

/// The four template vertices of one face.
pub type FaceTemplate = [PackedVertex; VERTICES_PER_FACE];
/// The face templates of one material, indexed by `BlockSide`.
pub type BlockTemplates = [FaceTemplate; FACES_PER_BLOCK];

/// Unit-cube corners of each face, indexed by `BlockSide`, in emission order.
const FACE_CORNERS: [[[u32; 3]; VERTICES_PER_FACE]; FACES_PER_BLOCK] = [
    // right (+x)
    [[1, 0, 1], [1, 0, 0], [1, 1, 1], [1, 1, 0]],
    // left (-x)
    [[0, 0, 0], [0, 0, 1], [0, 1, 0], [0, 1, 1]],
    // top (+y)
    [[0, 1, 1], [1, 1, 1], [0, 1, 0], [1, 1, 0]],
    // bottom (-y)
    [[0, 0, 0], [1, 0, 0], [0, 0, 1], [1, 0, 1]],
    // front (+z)
    [[0, 0, 1], [1, 0, 1], [0, 1, 1], [1, 1, 1]],
    // back (-z)
    [[1, 0, 0], [0, 0, 0], [1, 1, 0], [0, 1, 0]],
];

/// Lower-left corner of a tile in the texture atlas, in tile units.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AtlasTile {
    /// Column, counted from the left edge.
    pub column: u32,
    /// Row, counted from the bottom edge.
    pub row: u32,
}

impl AtlasTile {
    const fn new(column: u32, row: u32) -> Self {
        AtlasTile { column, row }
    }
}

/// Atlas tiles used by a material.
#[derive(Copy, Clone, Debug)]
struct MaterialTiles {
    side: AtlasTile,
    top: AtlasTile,
    bottom: AtlasTile,
}

impl MaterialTiles {
    const fn uniform(tile: AtlasTile) -> Self {
        MaterialTiles {
            side: tile,
            top: tile,
            bottom: tile,
        }
    }
}

const TOP: usize = BlockSide::TOP as usize;
const BOTTOM: usize = BlockSide::BOTTOM as usize;

const fn block_templates(tiles: MaterialTiles) -> BlockTemplates {
    let mut templates = [[PackedVertex(0); VERTICES_PER_FACE]; FACES_PER_BLOCK];
    let mut side = 0;
    while side < FACES_PER_BLOCK {
        let tile = match side {
            TOP => tiles.top,
            BOTTOM => tiles.bottom,
            _ => tiles.side,
        };
        let mut vertex = 0;
        while vertex < VERTICES_PER_FACE {
            let atlas = [
                tile.column + (vertex as u32 & 1),
                tile.row + (vertex as u32 >> 1),
            ];
            templates[side][vertex] = PackedVertex::template(FACE_CORNERS[side][vertex], atlas);
            vertex += 1;
        }
        side += 1;
    }
    templates
}

static GRASS_TEMPLATES: BlockTemplates = block_templates(MaterialTiles {
    side: AtlasTile::new(0, 15),
    top: AtlasTile::new(2, 15),
    bottom: AtlasTile::new(1, 15),
});

static DIRT_TEMPLATES: BlockTemplates = block_templates(MaterialTiles::uniform(AtlasTile::new(1, 15)));

static STONE_TEMPLATES: BlockTemplates = block_templates(MaterialTiles::uniform(AtlasTile::new(3, 15)));

/// Templates keyed by `BlockType` storage value. `AIR` has no entry.
static CATALOG: phf::Map<BlockTypeSize, &'static BlockTemplates> = phf_map! {
    1u8 => &GRASS_TEMPLATES,
    2u8 => &DIRT_TEMPLATES,
    3u8 => &STONE_TEMPLATES,
};

/// Errors found while validating the block catalog at startup.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    /// A solid material has no templates.
    #[error("no face templates registered for {0:?}")]
    MissingTemplates(BlockType),

    /// `AIR` must never produce geometry.
    #[error("AIR must not have face templates")]
    AirHasTemplates,

    /// A catalog key does not name any block type.
    #[error("catalog entry {0} is not a block type")]
    UnknownKey(BlockTypeSize),

    /// A template writes outside the template bits.
    #[error("template for {block_type:?} {side:?} vertex {vertex} sets position bits")]
    PositionBitsSet {
        /// Offending material.
        block_type: BlockType,
        /// Offending face.
        side: BlockSide,
        /// Offending vertex within the face.
        vertex: usize,
    },
}

/// Looks up all six face templates of a material.
pub fn templates_for(block_type: BlockType) -> Option<&'static BlockTemplates> {
    CATALOG.get(&block_type.as_int()).copied()
}

/// Looks up the four vertex templates of one face of a material.
///
/// Returns `None`, and logs, for a pair the catalog does not hold. `AIR` is never
/// a valid query.
pub fn template_for(block_type: BlockType, side: BlockSide) -> Option<&'static FaceTemplate> {
    match templates_for(block_type) {
        Some(templates) => Some(&templates[side as usize]),
        None => {
            error!("Invalid type / no face data for {:?} {:?}", block_type, side);
            None
        }
    }
}

/// Checks every material and face combination.
///
/// Call once at startup so a misconfigured catalog fails before any chunk is
/// meshed.
pub fn validate() -> Result<(), CatalogError> {
    for key in CATALOG.keys() {
        if BlockType::from_int(*key).is_none() {
            return Err(CatalogError::UnknownKey(*key));
        }
    }

    for block_type in BlockType::ALL {
        let templates = templates_for(block_type);
        if !block_type.is_solid() {
            if templates.is_some() {
                return Err(CatalogError::AirHasTemplates);
            }
            continue;
        }

        let templates = templates.ok_or(CatalogError::MissingTemplates(block_type))?;
        for side in BlockSide::ALL {
            for (vertex, template) in templates[side as usize].iter().enumerate() {
                if template.position() != [0, 0, 0] {
                    return Err(CatalogError::PositionBitsSet {
                        block_type,
                        side,
                        vertex,
                    });
                }
            }
        }
    }

    Ok(())
}
