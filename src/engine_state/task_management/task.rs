//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system,
//! which provides a framework for executing work across multiple threads.
//!
//! ## Core Components
//! - `Task`: Represents a unit of work that runs on a worker thread
//! - `TaskResult`: Represents the result of a completed task
//! - `TaskContext`: The engine state a result may touch on the owning thread
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the owning thread
//! 5. The result can spawn new tasks or issue buffer write commands
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - `TaskResult` must be `Send` to be transferred back to the owning thread
//! - Chunks are shared through `MtResource`; the world map is never shared

use crate::engine_state::{
    buffer_state::BufferWriteCommand, rendering::meshing::MeshManager, voxels::world::World,
};

/// Engine state available to task results.
///
/// Only the owning thread ever holds this, so results may change the world map
/// and the mesh bookkeeping without further synchronization.
pub struct TaskContext<'a> {
    /// The loaded chunks
    pub world: &'a mut World,
    /// In-flight mesh tracking
    pub mesh_manager: &'a mut MeshManager,
}

/// A trait representing a unit of work that can be executed on a worker.
///
/// Tasks should own, or hold shared handles to, all the data they need.
pub trait Task: Send {
    /// Processes the task and returns a result.
    ///
    /// This runs on a worker thread and should avoid blocking on anything but
    /// short chunk locks.
    ///
    /// # Returns
    /// A boxed `TaskResult` that will be processed on the owning thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// A trait representing the result of processing a `Task`.
pub trait TaskResult: Send {
    /// Handles the result of a completed task on the owning thread.
    ///
    /// # Arguments
    /// * `context` - The world and mesh bookkeeping
    ///
    /// # Returns
    /// A tuple containing:
    /// 1. A vector of new tasks to schedule (can be empty)
    /// 2. A vector of buffer write commands to execute (can be empty)
    fn handle_result(
        self: Box<Self>,
        context: &mut TaskContext<'_>,
    ) -> (Vec<Box<dyn Task + Send>>, Vec<BufferWriteCommand>);
}
