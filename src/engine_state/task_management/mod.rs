//! # Task Management System
//!
//! This module provides a small worker pool for running chunk generation and
//! mesh building off the owning thread.
//!
//! ## Architecture Overview
//!
//! The task management system consists of several key components:
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that runs on a worker thread
//! - `TaskResult`: The result of a completed task, which can spawn additional tasks
//! - `TaskChannel`: Communication channel between the owning thread and one worker
//!
//! Each worker is an OS thread with its own pair of `mpsc` channels. Tasks are
//! handed out round-robin, at most [`MAX_TASKS_IN_FLIGHT`] per worker; the rest
//! wait in a FIFO queue.
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to available worker channels using round-robin
//! 3. Workers process tasks and send back results
//! 4. Results are handled on the owning thread in `process_completed_tasks()`
//! 5. New tasks may be spawned from results, continuing the cycle
//!
//! ## Example Usage
//! ```
//! use voxel_mesher::engine_state::{
//!     buffer_state::BufferState,
//!     rendering::meshing::MeshManager,
//!     task_management::{task::TaskContext, TaskManager},
//!     voxels::world::World,
//! };
//!
//! let mut task_manager = TaskManager::new(2);
//! let mut world = World::new();
//! let mut mesh_manager = MeshManager::new();
//! let mut buffer_state = BufferState::new();
//!
//! // In the engine loop:
//! let mut context = TaskContext { world: &mut world, mesh_manager: &mut mesh_manager };
//! task_manager.process_completed_tasks(&mut context, &mut buffer_state).unwrap();
//! task_manager.process_queued_tasks();
//! assert!(task_manager.is_idle());
//! ```

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use log::{debug, error, info};
use task::{Task, TaskContext, TaskResult};
use thiserror::Error;

use super::buffer_state::BufferState;

/// A worker thread stopped answering, almost always because a task panicked.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("worker {worker} disconnected with {lost_tasks} task(s) in flight")]
pub struct WorkerDisconnected {
    /// Index of the worker
    pub worker: usize,
    /// Tasks that will never report back
    pub lost_tasks: usize,
}

/// A communication channel between the owning thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from the owning thread to the worker
/// - `result_receiver`: Receives task results from the worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `worker`: Handle to the worker thread, joined on drop
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Fields
/// - `channels`: Set of active worker channels
/// - `queued_tasks`: Tasks waiting for an available worker
/// - `current_channel`: Index for round-robin scheduling
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
    tasks_completed: u64,
}

/// Maximum number of tasks that can be in flight per worker channel.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        for _ in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let worker = thread::spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            });

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                worker,
            });
        }

        info!(
            "Started {} workers (available parallelism: {:?})",
            num_workers,
            thread::available_parallelism()
        );

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
            tasks_completed: 0,
        }
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was sent; the in-flight counter is incremented
    /// - `Err(task)` if the worker is gone, handing the task back for requeueing
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => Err(task.0),
        }
    }

    /// Finds an available worker channel, round-robin from the last one used.
    ///
    /// # Returns
    /// - `Some(usize)` index of a channel below [`MAX_TASKS_IN_FLIGHT`]
    /// - `None` if all channels are busy or there are no channels
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|step| (self.current_channel + step) % count)
            .find(|&index| self.channels[index].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Publishes a new task for execution.
    ///
    /// The task runs as soon as a worker is free, or waits in the queue.
    ///
    /// # Returns
    /// - `true` if the task was immediately scheduled on an available worker
    /// - `false` if the task was queued because all workers are busy
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Moves queued tasks onto free workers, oldest first, until the queue is
    /// empty or every worker is busy.
    pub fn process_queued_tasks(&mut self) {
        while !self.queued_tasks.is_empty() {
            let Some(channel_idx) = self.find_available_channel() else {
                break;
            };
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    // Channel is disconnected, put task back and stop processing
                    self.queued_tasks.push_front(task);
                    break;
                }
            }
        }
    }

    /// Handles every result the workers have sent back.
    ///
    /// Buffer write commands are applied to `buffer_state` immediately; follow-up
    /// tasks are published after all results were handled.
    ///
    /// # Returns
    /// The number of results handled.
    ///
    /// # Errors
    /// [`WorkerDisconnected`] if a worker died with work in flight.
    pub fn process_completed_tasks(
        &mut self,
        context: &mut TaskContext<'_>,
        buffer_state: &mut BufferState,
    ) -> Result<usize, WorkerDisconnected> {
        let mut tasks_to_queue = Vec::new();
        let mut handled = 0;

        for (worker, channel) in self.channels.iter_mut().enumerate() {
            loop {
                match channel.result_receiver.try_recv() {
                    Ok(result) => {
                        channel.num_tasks_in_flight -= 1;
                        let (new_tasks, write_commands) = result.handle_result(context);
                        for command in write_commands {
                            buffer_state.write(command);
                        }
                        tasks_to_queue.extend(new_tasks);
                        handled += 1;
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        if channel.num_tasks_in_flight > 0 {
                            error!("Worker {} disconnected", worker);
                            return Err(WorkerDisconnected {
                                worker,
                                lost_tasks: channel.num_tasks_in_flight,
                            });
                        }
                        break;
                    }
                }
            }
        }

        self.tasks_completed += handled as u64;
        if !tasks_to_queue.is_empty() {
            debug!("Results spawned {} follow-up tasks", tasks_to_queue.len());
        }
        for task in tasks_to_queue {
            self.publish_task(task);
        }

        Ok(handled)
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of tasks sent to workers and not yet handled.
    pub fn tasks_in_flight(&self) -> usize {
        self.channels
            .iter()
            .map(|channel| channel.num_tasks_in_flight)
            .sum()
    }

    /// Number of tasks waiting for a worker.
    pub fn queued_task_count(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Number of results handled so far.
    pub fn tasks_completed(&self) -> u64 {
        self.tasks_completed
    }

    /// Returns `true` if nothing is queued or running.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty() && self.tasks_in_flight() == 0
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        for TaskChannel {
            task_sender,
            result_receiver,
            worker,
            ..
        } in self.channels.drain(..)
        {
            drop(task_sender);
            drop(result_receiver);
            if worker.join().is_err() {
                error!("Worker thread panicked");
            }
        }
    }
}
