#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Mesher
//!
//! A chunked voxel world that turns its blocks into packed, GPU-ready meshes.
//!
//! Chunks are 16x256x16 columns split into sixteen sections. Every section
//! keeps its own vertex buffer and is rebuilt only when a block that can
//! change its faces is edited. Generation and meshing run on a pool of worker
//! threads; results are installed on the thread that owns the world.
//!
//! ## Key Modules
//!
//! * `config` - JSON configuration with defaults for every value
//! * `core` - Shared-ownership primitives used throughout the engine
//! * `engine_state` - The world, the meshing pipeline and the worker pool
//! * `error` - Error types returned by the engine
//!
//! ## Vertex Format
//!
//! Every vertex is one `u32`. Its low bits hold the atlas tile corner and the
//! unit-cube corner of the face template; its high bits hold the block's
//! chunk-local position. Four vertices make a face and each face is drawn with
//! the index pattern `0, 1, 3, 3, 2, 0`.
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     if let Err(error) = voxel_mesher::run() {
//!         eprintln!("{error}");
//!     }
//! }
//! ```

use std::time::Duration;

use cgmath::{Point2, Point3};
use log::{error, info};
use web_time::Instant;

use config::EngineConfig;
use engine_state::{
    voxels::{
        block::{block_type::BlockType, catalog},
        chunk::{CHUNK_HEIGHT, CHUNK_LENGTH, CHUNK_WIDTH},
    },
    EngineState,
};
use error::EngineError;

pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

/// Loads the area around the origin, applies random edits and logs the results.
///
/// The configuration is read from the file named by
/// [`CONFIG_ENV_VAR`](config::CONFIG_ENV_VAR) when it is set.
///
/// # Errors
///
/// Any [`EngineError`]; the block catalog is checked before any work starts.
pub fn run() -> Result<(), EngineError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = EngineConfig::from_env()?;
    if let Err(err) = catalog::validate() {
        error!("Block catalog failed validation: {}", err);
        return Err(err.into());
    }

    let timeout = Duration::from_millis(config.idle_timeout_ms);
    let render_distance = config.render_distance;
    let demo_edits = config.demo_edits;
    let mut engine = EngineState::new(config)?;

    let load_start = Instant::now();
    let requested = engine.request_area(Point2::new(0, 0), render_distance);
    engine.run_until_idle(timeout)?;
    info!(
        "Loaded and meshed {} chunks in {:?}",
        requested,
        load_start.elapsed()
    );

    let edit_start = Instant::now();
    for _ in 0..demo_edits {
        let position = random_position(render_distance);
        let block_type = if fastrand::bool() {
            BlockType::AIR
        } else {
            BlockType::get_random_type()
        };
        engine.put_block(position, block_type)?;
    }
    engine.run_until_idle(timeout)?;
    info!(
        "Applied {} edits and remeshed in {:?}",
        demo_edits,
        edit_start.elapsed()
    );

    let stats = engine.stats();
    info!(
        "{} chunks, {} section buffers, {} faces, {} vertices, {} bytes",
        stats.chunks_loaded, stats.sections_meshed, stats.faces, stats.vertices, stats.memory_bytes
    );
    info!(
        "{} tasks completed, {} mesh builds started, {} installed",
        stats.tasks_completed, stats.builds_started, stats.builds_installed
    );
    Ok(())
}

/// A random block position inside the square of loaded chunks.
fn random_position(render_distance: i32) -> Point3<i32> {
    let min_x = -render_distance * CHUNK_LENGTH as i32;
    let max_x = (render_distance + 1) * CHUNK_LENGTH as i32;
    let min_z = -render_distance * CHUNK_WIDTH as i32;
    let max_z = (render_distance + 1) * CHUNK_WIDTH as i32;
    Point3::new(
        fastrand::i32(min_x..max_x),
        fastrand::i32(0..CHUNK_HEIGHT as i32),
        fastrand::i32(min_z..max_z),
    )
}
