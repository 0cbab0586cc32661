//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine.
//! It includes block type definitions, block face handling, and the static
//! catalog of per-face vertex templates.

pub mod block_side;
pub mod block_type;
pub mod catalog;

/// The underlying integer type used to represent block types in memory.
/// This is used for compact voxel storage and as the catalog key.
pub type BlockTypeSize = u8;
