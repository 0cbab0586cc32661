use std::time::Duration;

use cgmath::{Point2, Point3};
use voxel_mesher::{
    config::{EngineConfig, GenerationMethod},
    engine_state::{
        buffer_state::SectionKey,
        rendering::meshing::build_mesh,
        voxels::{
            block::block_type::BlockType,
            chunk::{neighbors::NeighborSnapshot, ChunkPosition},
        },
        EngineState,
    },
};

const TIMEOUT: Duration = Duration::from_secs(60);

fn engine(method: GenerationMethod) -> EngineState {
    let mut config = EngineConfig::default();
    config.worker_threads = 3;
    config.terrain.method = method;
    config.terrain.seed = 7;
    EngineState::new(config).unwrap()
}

/// Faces held by the buffer state for one chunk.
fn buffered_faces(engine: &EngineState, position: ChunkPosition) -> usize {
    let buffers = engine.buffer_state();
    buffers
        .keys()
        .filter(|key| key.position == position)
        .filter_map(|key| buffers.get_buffer(*key))
        .map(|mesh| mesh.face_count())
        .sum()
}

/// Meshes a whole chunk from scratch on this thread.
fn fresh_faces(engine: &EngineState, position: ChunkPosition) -> usize {
    let chunk = engine.world().get_chunk_at(position).unwrap();
    let links = chunk.get().neighbors.clone();
    let snapshot = NeighborSnapshot::capture(&links);
    let chunk = chunk.get();
    build_mesh(&*chunk, &snapshot).face_count()
}

fn assert_buffers_match_world(engine: &EngineState) {
    assert!(engine.is_idle());
    for position in engine.world().chunk_positions() {
        let chunk = engine.world().get_chunk_at(*position).unwrap();
        assert!(!chunk.get().is_dirty(), "chunk {position:?} left dirty");
        assert_eq!(buffered_faces(engine, *position), chunk.get().face_count());
        assert_eq!(buffered_faces(engine, *position), fresh_faces(engine, *position));
    }
    let stats = engine.stats();
    assert_eq!(stats.faces, engine.buffer_state().total_faces());
    assert_eq!(stats.vertices, stats.faces * 4);
}

#[test]
fn perlin_area_meshes_consistently() {
    let mut engine = engine(GenerationMethod::Perlin);
    assert_eq!(engine.request_area(Point2::new(0, 0), 2), 25);
    engine.run_until_idle(TIMEOUT).unwrap();

    assert_eq!(engine.world().chunk_count(), 25);
    assert_buffers_match_world(&engine);
    assert!(engine.stats().builds_installed >= 25);
}

#[test]
fn random_edits_converge() {
    let mut engine = engine(GenerationMethod::Perlin);
    engine.request_area(Point2::new(0, 0), 1);
    engine.run_until_idle(TIMEOUT).unwrap();

    fastrand::seed(11);
    for _ in 0..200 {
        let position = Point3::new(
            fastrand::i32(-16..32),
            fastrand::i32(40..90),
            fastrand::i32(-16..32),
        );
        let block_type = if fastrand::bool() {
            BlockType::AIR
        } else {
            BlockType::get_random_type()
        };
        engine.put_block(position, block_type).unwrap();
        // Interleave edits with results so some land while builds are in flight.
        engine.process_tasks().unwrap();
    }
    engine.run_until_idle(TIMEOUT).unwrap();

    assert_buffers_match_world(&engine);
}

#[test]
fn streaming_the_area_sideways() {
    let mut engine = engine(GenerationMethod::Flat);
    engine.request_area(Point2::new(0, 0), 1);
    engine.run_until_idle(TIMEOUT).unwrap();

    for z in -1..=1 {
        assert!(engine.unload_chunk(Point2::new(-1, z)));
    }
    engine.request_area(Point2::new(1, 0), 1);
    engine.run_until_idle(TIMEOUT).unwrap();

    assert_eq!(engine.world().chunk_count(), 9);
    assert!(!engine.world().contains_chunk(Point2::new(-1, 0)));
    assert!(engine
        .buffer_state()
        .keys()
        .all(|key: &SectionKey| key.position.x >= 0));
    assert_buffers_match_world(&engine);
}
