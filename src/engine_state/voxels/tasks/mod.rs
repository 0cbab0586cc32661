//! # Voxel Task System
//!
//! This module contains tasks related to voxel world generation. They run on
//! the worker pool so that loading a large area never stalls the engine loop.

pub mod chunk_generation_task;
