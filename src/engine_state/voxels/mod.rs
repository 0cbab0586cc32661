//! # Voxel Engine Core
//!
//! This module contains the voxel data model: block types and their face
//! templates, chunks and their sections, the world registry and terrain
//! generation.
//!
//! ## Architecture
//!
//! * **Block**: Block types, block sides and the static face template catalog
//! * **Chunk**: A 16x256x16 column stored as sixteen independently meshed sections
//! * **World**: The loaded chunks, keyed by position, and their neighbor links
//! * **Terrain**: Pluggable height maps used to populate new chunks
//! * **Tasks**: Chunk generation on the worker pool
//!
//! ## Data Flow
//!
//! 1. A generation task builds a chunk from the terrain height map
//! 2. The world links it to its neighbors and marks their shared borders dirty
//! 3. Dirty sections are picked up by mesh tasks
//! 4. Edits go through the world, which dirties every section they can affect
//!
//! ## Thread Safety
//!
//! * Each chunk sits behind its own read/write lock
//! * Neighbor links are weak and never keep a chunk alive
//! * The world map is only touched by the engine thread

pub mod block;
pub mod chunk;
pub mod tasks;
pub mod terrain;
pub mod world;
