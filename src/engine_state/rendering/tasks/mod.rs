//! Background tasks for the rendering system.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: Builds the dirty sections of a chunk on a worker

pub mod chunk_mesh_generation_task;
