//! Mesh data structures and the mesh assembler.
//!
//! The assembler walks a block volume, asks the culler which faces of each solid
//! block are visible and appends the encoded vertices of those faces to a
//! [`MeshBuffer`]. Indices are not stored per mesh: every face uses the same six
//! index pattern offset by four vertices, so one shared index buffer serves all
//! meshes (see [`build_indices`]).

use std::ops::Range;

use crate::engine_state::{
    rendering::{meshing::culling::is_face_visible, vertex::PackedVertex},
    voxels::{
        block::{
            block_side::BlockSide,
            catalog::{FACE_INDICES, INDICES_PER_FACE, VERTICES_PER_FACE},
        },
        chunk::{chunk_iteration::ChunkBlockIterator, neighbors::NeighborResolver, voxel_grid::BlockGrid},
    },
};

use super::face::Face;

/// The vertex buffer of one chunk or section.
///
/// Vertices come in groups of four, one group per face, in the order
/// [`FACE_INDICES`] expects.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MeshBuffer {
    vertices: Vec<PackedVertex>,
}

impl MeshBuffer {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        MeshBuffer { vertices: Vec::new() }
    }

    /// Appends the four vertices of one face.
    pub fn push_face(&mut self, vertices: [PackedVertex; VERTICES_PER_FACE]) {
        self.vertices.extend_from_slice(&vertices);
    }

    /// The packed vertices, four per face.
    pub fn vertices(&self) -> &[PackedVertex] {
        &self.vertices
    }

    /// Number of packed vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces.
    pub fn face_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_FACE
    }

    /// Size of the vertex buffer in bytes: four per packed vertex.
    pub fn byte_len(&self) -> usize {
        std::mem::size_of_val(self.vertices.as_slice())
    }

    /// The vertex buffer as raw bytes, ready for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Returns `true` if no face was emitted.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// An index buffer matching this mesh.
    pub fn indices(&self) -> Vec<u32> {
        build_indices(self.face_count())
    }
}

/// Builds the mesh of a whole volume.
///
/// # Arguments
/// * `grid` - The volume to mesh
/// * `resolver` - Answers lookups past the volume's X and Z edges
///
/// # Returns
/// The visible faces of every solid block, in x, y, z traversal order.
pub fn build_mesh<G, R>(grid: &G, resolver: &R) -> MeshBuffer
where
    G: BlockGrid + ?Sized,
    R: NeighborResolver + ?Sized,
{
    let height = grid.dimensions().y;
    build_mesh_in_layers(grid, resolver, 0..height)
}

/// Builds the mesh of the blocks in `layers`, culling against the whole volume.
///
/// Used to mesh one section of a chunk: blocks outside `layers` still hide the
/// faces that touch them, but emit no faces themselves.
pub fn build_mesh_in_layers<G, R>(grid: &G, resolver: &R, layers: Range<usize>) -> MeshBuffer
where
    G: BlockGrid + ?Sized,
    R: NeighborResolver + ?Sized,
{
    let mut mesh = MeshBuffer::new();
    for (position, block_type) in ChunkBlockIterator::in_layers(grid, layers) {
        for side in BlockSide::ALL {
            if is_face_visible(grid, resolver, position, side) {
                let face = Face::new(position.x, position.y, position.z, block_type, side);
                mesh.push_face(face.vertices());
            }
        }
    }
    mesh
}

/// Builds the index buffer for `face_count` faces.
///
/// Face `n` uses [`FACE_INDICES`] shifted by `4 * n`.
pub fn build_indices(face_count: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(face_count * INDICES_PER_FACE);
    for face in 0..face_count as u32 {
        let base = face * VERTICES_PER_FACE as u32;
        indices.extend(FACE_INDICES.iter().map(|index| index + base));
    }
    indices
}
