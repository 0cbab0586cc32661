//! # Engine State Module
//!
//! The core engine module that ties the voxel world, the worker pool and the
//! mesh buffers together.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `buffer_state` - Holds the latest mesh buffer of every section for the renderer
//! * `rendering` - Face culling, vertex packing, mesh assembly and mesh tasks
//! * `task_management` - Manages worker threads and the tasks they run
//! * `voxels` - Handles voxel data, chunks, and world generation
//!
//! ## Architecture
//!
//! `EngineState` owns every subsystem and is the only thing that touches the
//! world map and the buffers. Workers only ever see individual chunks through
//! their locks. Each call to [`EngineState::process_tasks`] hands finished
//! results back to their subsystems and keeps the workers busy.

use std::sync::Arc;
use std::time::Duration;

use cgmath::{Point2, Point3};
use log::{debug, info};
use web_time::Instant;

use buffer_state::BufferState;
use rendering::{
    meshing::MeshManager, tasks::chunk_mesh_generation_task::request_chunk_mesh,
};
use task_management::{task::TaskContext, TaskManager, WorkerDisconnected};
use voxels::{
    block::block_type::BlockType,
    chunk::ChunkPosition,
    tasks::chunk_generation_task::ChunkGenerationTask,
    terrain::{self, TerrainGenerator},
    world::{World, WorldError},
};

use crate::{config::EngineConfig, error::EngineError};

pub mod buffer_state;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// A snapshot of engine counters, used for the end-of-run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    /// Chunks currently loaded
    pub chunks_loaded: usize,
    /// Sections with a non-empty mesh buffer
    pub sections_meshed: usize,
    /// Faces across all buffers
    pub faces: usize,
    /// Vertices across all buffers
    pub vertices: usize,
    /// Vertex and index bytes in use
    pub memory_bytes: u64,
    /// Task results handled so far
    pub tasks_completed: u64,
    /// Mesh builds started so far
    pub builds_started: u64,
    /// Mesh builds whose result was installed
    pub builds_installed: u64,
}

/// The main state container for the voxel engine.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use cgmath::Point2;
/// use voxel_mesher::config::{EngineConfig, GenerationMethod};
/// use voxel_mesher::engine_state::EngineState;
///
/// let mut config = EngineConfig::default();
/// config.worker_threads = 2;
/// config.terrain.method = GenerationMethod::Flat;
///
/// let mut engine = EngineState::new(config).unwrap();
/// engine.request_area(Point2::new(0, 0), 1);
/// engine.run_until_idle(Duration::from_secs(30)).unwrap();
/// assert_eq!(engine.world().chunk_count(), 9);
/// ```
pub struct EngineState {
    config: EngineConfig,
    terrain: Arc<dyn TerrainGenerator>,
    world: World,
    mesh_manager: MeshManager,
    task_manager: TaskManager,
    buffer_state: BufferState,
}

impl EngineState {
    /// Creates a new engine state with all subsystems initialized.
    ///
    /// # Arguments
    ///
    /// * `config` - Engine configuration; validated before anything is started
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`] if the configuration is out of range.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let terrain = terrain::from_config(&config.terrain);
        Ok(Self::with_terrain(config, terrain))
    }

    /// Creates an engine state that generates chunks from `terrain` instead of
    /// the generator named in the configuration.
    pub fn with_terrain(config: EngineConfig, terrain: Arc<dyn TerrainGenerator>) -> Self {
        let task_manager = TaskManager::new(config.worker_count());
        info!(
            "Engine ready: render distance {}, {} workers",
            config.render_distance,
            task_manager.worker_count()
        );
        Self {
            config,
            terrain,
            world: World::new(),
            mesh_manager: MeshManager::new(),
            task_manager,
            buffer_state: BufferState::new(),
        }
    }

    /// Starts generating every chunk in the square of `radius` chunks around
    /// `center` that is neither loaded nor already being generated.
    ///
    /// # Returns
    ///
    /// The number of generation tasks published.
    pub fn request_area(&mut self, center: ChunkPosition, radius: i32) -> usize {
        let mut requested = 0;
        for x in -radius..=radius {
            for z in -radius..=radius {
                if self.request_chunk(Point2::new(center.x + x, center.y + z)) {
                    requested += 1;
                }
            }
        }
        debug!("Requested {} chunks around {:?}", requested, center);
        requested
    }

    /// Starts generating the chunk at `position`.
    ///
    /// # Returns
    ///
    /// `false` if the chunk is already loaded or being generated.
    pub fn request_chunk(&mut self, position: ChunkPosition) -> bool {
        if !self.world.begin_generation(position) {
            return false;
        }
        self.task_manager.publish_task(Box::new(ChunkGenerationTask::new(
            position,
            self.terrain.clone(),
        )));
        true
    }

    /// Reads a block in world coordinates.
    pub fn get_block(&self, position: Point3<i32>) -> Result<BlockType, WorldError> {
        self.world.get_block(position)
    }

    /// Writes a block in world coordinates and schedules the affected meshes.
    ///
    /// # Errors
    ///
    /// [`WorldError`] if the position is outside the world or its chunk is not loaded.
    pub fn put_block(
        &mut self,
        position: Point3<i32>,
        block_type: BlockType,
    ) -> Result<(), WorldError> {
        let affected = self.world.put_block(position, block_type)?;
        self.request_meshes(affected);
        Ok(())
    }

    /// Unloads the chunk at `position`, or cancels its generation if it is not
    /// loaded yet. Its buffers are released and the neighbors that now face the
    /// void are remeshed.
    ///
    /// # Returns
    ///
    /// `false` if the chunk was neither loaded nor being generated.
    pub fn unload_chunk(&mut self, position: ChunkPosition) -> bool {
        if self.world.cancel_generation(position) {
            debug!("Cancelled generation of chunk {:?}", position);
            return true;
        }
        let Some(affected) = self.world.remove_chunk(position) else {
            return false;
        };
        let released = self.buffer_state.release_chunk(position);
        self.mesh_manager.forget(position);
        debug!("Unloaded chunk {:?}, released {} buffers", position, released);
        self.request_meshes(affected);
        true
    }

    fn request_meshes(&mut self, positions: Vec<ChunkPosition>) {
        let mut context = TaskContext {
            world: &mut self.world,
            mesh_manager: &mut self.mesh_manager,
        };
        let tasks: Vec<_> = positions
            .into_iter()
            .filter_map(|position| request_chunk_mesh(&mut context, position))
            .collect();
        for task in tasks {
            self.task_manager.publish_task(task);
        }
    }

    /// Handles finished task results and keeps the workers busy.
    ///
    /// # Returns
    ///
    /// The number of results handled.
    ///
    /// # Errors
    ///
    /// [`WorkerDisconnected`] if a worker thread died with work in flight.
    pub fn process_tasks(&mut self) -> Result<usize, WorkerDisconnected> {
        let mut context = TaskContext {
            world: &mut self.world,
            mesh_manager: &mut self.mesh_manager,
        };
        let handled = self
            .task_manager
            .process_completed_tasks(&mut context, &mut self.buffer_state)?;
        self.task_manager.process_queued_tasks();
        Ok(handled)
    }

    /// Returns `true` if no generation or mesh build is queued or running.
    pub fn is_idle(&self) -> bool {
        self.task_manager.is_idle() && self.mesh_manager.is_idle()
    }

    /// Processes tasks until the engine is idle.
    ///
    /// # Returns
    ///
    /// The number of results handled.
    ///
    /// # Errors
    ///
    /// [`EngineError::Timeout`] if the engine is still busy after `timeout`,
    /// [`EngineError::Worker`] if a worker died.
    pub fn run_until_idle(&mut self, timeout: Duration) -> Result<usize, EngineError> {
        let start = Instant::now();
        let mut handled = 0;
        loop {
            handled += self.process_tasks()?;
            if self.is_idle() {
                debug!("Idle after {:?}, {} results handled", start.elapsed(), handled);
                return Ok(handled);
            }
            if start.elapsed() >= timeout {
                return Err(EngineError::Timeout {
                    timeout,
                    pending: self.task_manager.queued_task_count()
                        + self.task_manager.tasks_in_flight(),
                });
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    /// Current engine counters.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            chunks_loaded: self.world.chunk_count(),
            sections_meshed: self.buffer_state.buffer_count(),
            faces: self.buffer_state.total_faces(),
            vertices: self.buffer_state.total_vertices(),
            memory_bytes: self.buffer_state.get_total_used_memory(),
            tasks_completed: self.task_manager.tasks_completed(),
            builds_started: self.mesh_manager.builds_started(),
            builds_installed: self.mesh_manager.builds_installed(),
        }
    }

    /// The configuration the engine was started with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The loaded chunks.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The mesh buffers handed to the renderer.
    pub fn buffer_state(&self) -> &BufferState {
        &self.buffer_state
    }

    /// In-flight mesh build tracking.
    pub fn mesh_manager(&self) -> &MeshManager {
        &self.mesh_manager
    }

    /// The worker pool.
    pub fn task_manager(&self) -> &TaskManager {
        &self.task_manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationMethod;
    use crate::engine_state::{
        buffer_state::SectionKey,
        voxels::chunk::{CHUNK_LENGTH, CHUNK_WIDTH},
    };

    const TIMEOUT: Duration = Duration::from_secs(30);

    fn flat_engine(workers: usize, height: i32) -> EngineState {
        let mut config = EngineConfig::default();
        config.worker_threads = workers;
        config.terrain.method = GenerationMethod::Flat;
        config.terrain.base_height = height;
        EngineState::new(config).unwrap()
    }

    fn buffered_faces(engine: &EngineState, position: ChunkPosition) -> usize {
        engine
            .buffer_state()
            .keys()
            .filter(|key| key.position == position)
            .filter_map(|key| engine.buffer_state().get_buffer(*key))
            .map(|mesh| mesh.face_count())
            .sum()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.render_distance = -3;
        assert!(matches!(EngineState::new(config), Err(EngineError::Config(_))));
    }

    #[test]
    fn area_loads_and_meshes_every_chunk() {
        let mut engine = flat_engine(2, 4);
        assert_eq!(engine.request_area(Point2::new(0, 0), 1), 9);
        assert_eq!(engine.request_area(Point2::new(0, 0), 1), 0);
        engine.run_until_idle(TIMEOUT).unwrap();

        assert_eq!(engine.world().chunk_count(), 9);
        for position in engine.world().chunk_positions() {
            let chunk = engine.world().get_chunk_at(*position).unwrap();
            let chunk = chunk.get();
            assert!(!chunk.is_dirty());
            assert_eq!(buffered_faces(&engine, *position), chunk.face_count());
        }

        // The center chunk is surrounded, so it only shows its top and bottom layers.
        let center = Point2::new(0, 0);
        assert_eq!(
            buffered_faces(&engine, center),
            2 * CHUNK_LENGTH * CHUNK_WIDTH
        );
    }

    #[test]
    fn edits_are_remeshed() {
        let mut engine = flat_engine(2, 4);
        engine.request_area(Point2::new(0, 0), 0);
        engine.run_until_idle(TIMEOUT).unwrap();
        let before = buffered_faces(&engine, Point2::new(0, 0));

        let position = Point3::new(5, 5, 5);
        engine.put_block(position, BlockType::STONE).unwrap();
        assert_eq!(engine.get_block(position), Ok(BlockType::STONE));
        engine.run_until_idle(TIMEOUT).unwrap();
        // The new block hides one top face and adds five of its own.
        assert_eq!(buffered_faces(&engine, Point2::new(0, 0)), before + 4);

        engine.put_block(position, BlockType::AIR).unwrap();
        engine.run_until_idle(TIMEOUT).unwrap();
        assert_eq!(buffered_faces(&engine, Point2::new(0, 0)), before);
    }

    #[test]
    fn edits_outside_the_world_fail() {
        let mut engine = flat_engine(1, 4);
        assert_eq!(
            engine.put_block(Point3::new(0, 0, 0), BlockType::STONE),
            Err(WorldError::ChunkNotLoaded(Point2::new(0, 0)))
        );
        assert_eq!(
            engine.put_block(Point3::new(0, -1, 0), BlockType::STONE),
            Err(WorldError::OutOfWorld(-1))
        );
    }

    #[test]
    fn unloading_releases_buffers_and_exposes_neighbors() {
        let mut engine = flat_engine(2, 4);
        engine.request_area(Point2::new(0, 0), 1);
        engine.run_until_idle(TIMEOUT).unwrap();
        let center_before = buffered_faces(&engine, Point2::new(0, 0));

        assert!(engine.unload_chunk(Point2::new(1, 0)));
        assert!(!engine.unload_chunk(Point2::new(1, 0)));
        engine.run_until_idle(TIMEOUT).unwrap();

        assert!(!engine.world().contains_chunk(Point2::new(1, 0)));
        assert!(engine
            .buffer_state()
            .get_buffer(SectionKey {
                position: Point2::new(1, 0),
                section: 0
            })
            .is_none());
        // The center chunk now shows its wall toward the missing chunk.
        assert_eq!(
            buffered_faces(&engine, Point2::new(0, 0)),
            center_before + 5 * CHUNK_WIDTH
        );
    }

    #[test]
    fn cancelled_generation_is_dropped() {
        let mut engine = flat_engine(1, 4);
        engine.request_area(Point2::new(0, 0), 1);
        assert!(engine.unload_chunk(Point2::new(1, 1)));
        engine.run_until_idle(TIMEOUT).unwrap();

        assert_eq!(engine.world().chunk_count(), 8);
        assert!(!engine.world().contains_chunk(Point2::new(1, 1)));
    }

    #[test]
    fn without_workers_the_engine_times_out() {
        let mut engine = EngineState::with_terrain(
            EngineConfig {
                worker_threads: 1,
                ..EngineConfig::default()
            },
            Arc::new(terrain::FlatTerrain { height: 1 }),
        );
        // A pool without workers never drains its queue.
        engine.task_manager = TaskManager::new(0);
        engine.request_chunk(Point2::new(0, 0));
        assert!(matches!(
            engine.run_until_idle(Duration::from_millis(20)),
            Err(EngineError::Timeout { pending: 1, .. })
        ));
    }
}
