//! Mesh generation for the voxel engine.
//!
//! This module turns voxel data into GPU-ready geometry: it decides which faces
//! are visible, packs each face into four `u32` vertices and assembles them
//! into one vertex buffer per chunk section. Drawing is left to whoever
//! consumes [`BufferState`](super::buffer_state::BufferState).

pub mod meshing;
pub mod tasks;
pub mod vertex;

// Re-export commonly used types
pub use meshing::MeshManager;
pub use vertex::PackedVertex;
