//! Mesh generation for voxel rendering.
//!
//! This module turns block volumes into packed vertex buffers.
//!
//! # Architecture
//! - [`MeshBuffer`]: The vertex buffer of one chunk or section
//! - [`Face`]: A single visible block face and its encoder
//! - [`build_mesh`]: The assembler, emitting one quad per visible face
//!
//! Faces are never merged across coplanar runs; every visible block side gets
//! its own quad.
//!
//! # Usage
//! ```
//! use voxel_mesher::engine_state::rendering::meshing::build_mesh;
//! use voxel_mesher::engine_state::voxels::{
//!     block::block_type::BlockType,
//!     chunk::{neighbors::NoNeighbors, voxel_grid::VoxelGrid},
//! };
//!
//! let mut grid = VoxelGrid::<3, 3, 3>::new();
//! grid.put(1, 1, 1, BlockType::STONE);
//! let mesh = build_mesh(&grid, &NoNeighbors);
//! assert_eq!(mesh.face_count(), 6);
//! ```

mod face;
#[allow(clippy::module_inception)]
mod mesh;

pub use face::{encode_face, Face};
pub use mesh::*;
