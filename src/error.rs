//! Error types surfaced by the engine.
//!
//! Each concern has its own enum; [`EngineError`] gathers them for `run()`.
//! Programming errors such as out-of-range grid access are not represented here;
//! they panic at the point of misuse.

use std::time::Duration;

use crate::engine_state::{
    task_management::WorkerDisconnected,
    voxels::{block::catalog::CatalogError, world::WorldError},
};

/// Errors that can occur when loading, saving, or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// Failed to parse JSON content.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] serde_json::Error),

    /// Failed to serialize config to JSON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] serde_json::Error),

    /// A value is out of its allowed range.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Any error that stops the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The block catalog failed startup validation.
    #[error("block catalog is invalid: {0}")]
    Catalog(#[from] CatalogError),

    /// A world-space edit was rejected.
    #[error(transparent)]
    World(#[from] WorldError),

    /// A worker thread died with work in flight.
    #[error(transparent)]
    Worker(#[from] WorkerDisconnected),

    /// The task pipeline did not drain in time.
    #[error("engine did not go idle within {timeout:?} ({pending} tasks outstanding)")]
    Timeout {
        /// How long the engine waited.
        timeout: Duration,
        /// Tasks still queued or running.
        pending: usize,
    },
}
