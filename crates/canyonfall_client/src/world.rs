use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use canyonfall_core::events::{self, EventReceiver, EventSender};
use canyonfall_core::jobs::JobSystem;
use canyonfall_shared::block::BlockType;
use canyonfall_shared::chunk::ChunkData;
use canyonfall_shared::coords::{ChunkPos, WorldLayout, CHUNK_HEIGHT, CHUNK_SIZE};
use canyonfall_shared::grid::VoxelGrid;
use canyonfall_shared::worldgen::{render_slice, WorldGenerator};
use glam::IVec3;
use rand::Rng;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::renderer::atlas::{AtlasMapping, DEFAULT_ATLAS_SIZE};
use crate::renderer::mesh::{build_chunk_mesh, ChunkMesh};
use crate::settings::GenerationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Generating,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GenerationEvent {
    Progress { generated: usize, total: usize },
    Complete { seed: u64, chunks: usize },
}

impl GenerationEvent {
    pub fn fraction(&self) -> f32 {
        match *self {
            Self::Progress { generated, total } if total > 0 => generated as f32 / total as f32,
            Self::Progress { .. } => 0.0,
            Self::Complete { .. } => 1.0,
        }
    }
}

/// Aborts the run it was taken from; checked between chunks.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

struct GenerationRun {
    generator: WorldGenerator,
    pending: VecDeque<ChunkPos>,
    total: usize,
    generated: usize,
    chunks_per_step: usize,
    cancel: CancelHandle,
}

/// Owns the chunk store and drives generation one bounded batch per
/// [`CanyonWorld::step`] call.
pub struct CanyonWorld {
    state: GenerationState,
    seed: u64,
    layout: WorldLayout,
    atlas: AtlasMapping,
    chunks: FxHashMap<ChunkPos, ChunkData>,
    meshes: FxHashMap<ChunkPos, ChunkMesh>,
    run: Option<GenerationRun>,
    jobs: Option<JobSystem>,
    events: EventSender<GenerationEvent>,
}

fn stored_block(
    chunks: &FxHashMap<ChunkPos, ChunkData>,
    layout: &WorldLayout,
    world: IVec3,
) -> BlockType {
    layout
        .world_to_chunk(world)
        .and_then(|(pos, local)| chunks.get(&pos).map(|chunk| chunk.get(local)))
        .unwrap_or(BlockType::Air)
}

fn mesh_chunk(
    chunks: &FxHashMap<ChunkPos, ChunkData>,
    layout: &WorldLayout,
    atlas: &AtlasMapping,
    pos: ChunkPos,
) -> Option<ChunkMesh> {
    let chunk = chunks.get(&pos)?;
    let lookup = |world: IVec3| stored_block(chunks, layout, world);
    Some(build_chunk_mesh(chunk, layout, atlas, Some(&lookup)))
}

impl CanyonWorld {
    pub fn new(jobs: Option<JobSystem>) -> (Self, EventReceiver<GenerationEvent>) {
        let (events, receiver) = events::channel();
        let world = Self {
            state: GenerationState::Idle,
            seed: 0,
            layout: WorldLayout::centered(1, 1),
            atlas: AtlasMapping::default(),
            chunks: FxHashMap::default(),
            meshes: FxHashMap::default(),
            run: None,
            jobs,
            events,
        };
        (world, receiver)
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn layout(&self) -> &WorldLayout {
        &self.layout
    }

    pub fn chunk(&self, pos: ChunkPos) -> Option<&ChunkData> {
        self.chunks.get(&pos)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn mesh(&self, pos: ChunkPos) -> Option<&ChunkMesh> {
        self.meshes.get(&pos)
    }

    pub fn meshes(&self) -> impl Iterator<Item = (&ChunkPos, &ChunkMesh)> {
        self.meshes.iter()
    }

    pub fn cancel_handle(&self) -> Option<CancelHandle> {
        self.run.as_ref().map(|run| run.cancel.clone())
    }

    /// Fraction of chunks populated in the current run.
    pub fn progress(&self) -> f32 {
        match (&self.run, self.state) {
            (Some(run), _) if run.total > 0 => run.generated as f32 / run.total as f32,
            (_, GenerationState::Complete) => 1.0,
            _ => 0.0,
        }
    }

    /// Drops any previous world and queues every chunk of the new one.
    /// Returns the seed actually used.
    pub fn generate(&mut self, config: &GenerationConfig) -> u64 {
        self.clear();

        let config = config.clone().sanitize();
        let seed = if config.use_random_seed {
            rand::thread_rng().gen()
        } else {
            config.seed
        };
        let layout = config.layout();
        let generator = WorldGenerator::new(config.strategy, config.terrain_params(seed), layout);
        let pending: VecDeque<ChunkPos> = layout.chunk_positions().collect();
        let total = pending.len();

        info!(
            "Generating {}x{} chunk canyon ({:?}) with seed {seed}",
            layout.width_in_chunks, layout.length_in_chunks, config.strategy
        );

        self.seed = seed;
        self.layout = layout;
        self.atlas = AtlasMapping::with_overrides(DEFAULT_ATLAS_SIZE, &config.texture_overrides);
        self.chunks.reserve(total);
        self.run = Some(GenerationRun {
            generator,
            pending,
            total,
            generated: 0,
            chunks_per_step: config.chunks_per_frame,
            cancel: CancelHandle(Arc::new(AtomicBool::new(false))),
        });
        self.state = GenerationState::Generating;
        seed
    }

    /// Populates and meshes up to `chunks_per_frame` chunks. The step that
    /// drains the queue also rebuilds every mesh against its final
    /// neighbors and completes the run.
    pub fn step(&mut self) -> GenerationState {
        if self.state != GenerationState::Generating {
            return self.state;
        }
        let Some(run) = self.run.as_mut() else {
            self.state = GenerationState::Idle;
            return self.state;
        };
        if run.cancel.is_cancelled() {
            warn!("Generation cancelled after {}/{} chunks", run.generated, run.total);
            self.clear();
            return self.state;
        }

        let take = run.chunks_per_step.min(run.pending.len());
        let batch: Vec<ChunkPos> = run.pending.drain(..take).collect();

        let populated: Vec<ChunkData> = match &self.jobs {
            Some(jobs) if batch.len() > 1 => {
                let generator = &run.generator;
                jobs.map_ordered(batch, |pos| generator.generate_chunk(pos))
            }
            _ => {
                let mut populated = Vec::with_capacity(batch.len());
                for pos in batch {
                    if run.cancel.is_cancelled() {
                        break;
                    }
                    populated.push(run.generator.generate_chunk(pos));
                }
                populated
            }
        };

        if run.cancel.is_cancelled() {
            warn!("Generation cancelled after {}/{} chunks", run.generated, run.total);
            self.clear();
            return self.state;
        }

        for chunk in populated {
            let pos = chunk.pos;
            self.chunks.insert(pos, chunk);
            if let Some(mesh) = mesh_chunk(&self.chunks, &self.layout, &self.atlas, pos) {
                self.meshes.insert(pos, mesh);
            }
            if let Some(chunk) = self.chunks.get_mut(&pos) {
                chunk.mark_clean();
            }

            run.generated += 1;
            let _ = self.events.send(GenerationEvent::Progress {
                generated: run.generated,
                total: run.total,
            });
        }
        debug!("Generated {}/{} chunks", run.generated, run.total);

        if run.pending.is_empty() {
            self.finish();
        }
        self.state
    }

    /// Steps until the run completes or is cancelled.
    pub fn run_to_completion(&mut self) -> GenerationState {
        while self.step() == GenerationState::Generating {}
        self.state
    }

    fn finish(&mut self) {
        let rebuilt = self.rebuild_all_meshes();
        let chunks = self.chunks.len();
        self.run = None;
        self.state = GenerationState::Complete;
        let _ = self.events.send(GenerationEvent::Complete {
            seed: self.seed,
            chunks,
        });
        info!("Canyon complete: {chunks} chunks, {rebuilt} meshes rebuilt");

        if tracing::enabled!(tracing::Level::DEBUG) {
            let grid = self.snapshot();
            let slice = grid.depth() as i32 / 2;
            debug!("Cross-section at grid z={slice}:\n{}", render_slice(&grid, slice));
        }
    }

    /// Rebuilds every mesh from the current blocks; returns how many were built.
    pub fn rebuild_all_meshes(&mut self) -> usize {
        let positions: Vec<ChunkPos> = self.chunks.keys().copied().collect();
        let mut rebuilt = 0;
        for pos in positions {
            if let Some(mesh) = mesh_chunk(&self.chunks, &self.layout, &self.atlas, pos) {
                self.meshes.insert(pos, mesh);
                rebuilt += 1;
            }
            if let Some(chunk) = self.chunks.get_mut(&pos) {
                chunk.mark_clean();
            }
        }
        rebuilt
    }

    /// Block at a world position; `Air` outside the generated world.
    pub fn get_block(&self, world_x: i32, world_y: i32, world_z: i32) -> BlockType {
        stored_block(&self.chunks, &self.layout, IVec3::new(world_x, world_y, world_z))
    }

    /// Copies the chunk store into one dense grid indexed in grid space.
    pub fn snapshot(&self) -> VoxelGrid {
        let mut grid = VoxelGrid::new(
            self.layout.width_in_blocks() as usize,
            CHUNK_HEIGHT,
            self.layout.length_in_blocks() as usize,
        );
        for (pos, chunk) in &self.chunks {
            let base = self.layout.world_to_grid(self.layout.chunk_origin(*pos));
            for y in 0..CHUNK_HEIGHT as i32 {
                for z in 0..CHUNK_SIZE as i32 {
                    for x in 0..CHUNK_SIZE as i32 {
                        let block = chunk.get_i32(x, y, z);
                        if !block.is_air() {
                            grid.set_at(base + IVec3::new(x, y, z), block);
                        }
                    }
                }
            }
        }
        grid
    }

    /// Drops all chunks and meshes and aborts a run in progress.
    pub fn clear(&mut self) {
        if let Some(run) = self.run.take() {
            run.cancel.cancel();
        }
        self.chunks.clear();
        self.meshes.clear();
        self.state = GenerationState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use canyonfall_core::jobs::JobSystem;
    use canyonfall_shared::block::BlockType;
    use canyonfall_shared::coords::CHUNK_HEIGHT;
    use canyonfall_shared::worldgen::CanyonStrategy;

    use super::{mesh_chunk, CanyonWorld, GenerationEvent, GenerationState};
    use crate::settings::GenerationConfig;

    /// Non-air blocks in the default 2x2 column-noise world for seed 42.
    const SEED_42_SOLID_BLOCKS: usize = 10_877;

    fn small_config(seed: u64) -> GenerationConfig {
        GenerationConfig {
            seed,
            width_in_chunks: 2,
            length_in_chunks: 2,
            ..GenerationConfig::default()
        }
    }

    fn generate(config: &GenerationConfig) -> CanyonWorld {
        let (mut world, _events) = CanyonWorld::new(None);
        world.generate(config);
        assert_eq!(world.run_to_completion(), GenerationState::Complete);
        world
    }

    #[test]
    fn seed_42_world_is_reproducible_and_walled() {
        let config = small_config(42);
        let first = generate(&config);
        let second = generate(&config);

        let first_grid = first.snapshot();
        let second_grid = second.snapshot();
        assert_eq!(first_grid, second_grid);
        assert_eq!(first_grid.count_non_air(), SEED_42_SOLID_BLOCKS);

        let layout = config.layout();
        let min = layout.origin;
        let max_x = min.x + layout.width_in_blocks() - 1;
        let max_z = min.z + layout.length_in_blocks() - 1;
        for y in 0..CHUNK_HEIGHT as i32 {
            for z in min.z..=max_z {
                assert_eq!(first.get_block(min.x, y, z), BlockType::Stone);
                assert_eq!(first.get_block(max_x, y, z), BlockType::Stone);
            }
            for x in min.x..=max_x {
                assert_eq!(first.get_block(x, y, min.z), BlockType::Stone);
                assert_eq!(first.get_block(x, y, max_z), BlockType::Stone);
            }
        }

        for (pos, mesh) in first.meshes() {
            assert_eq!(Some(mesh), second.mesh(*pos));
        }
    }

    #[test]
    fn progress_is_reported_per_chunk_then_completion() {
        let (mut world, events) = CanyonWorld::new(None);
        world.generate(&small_config(7));

        assert_eq!(world.step(), GenerationState::Generating);
        assert_eq!(world.chunk_count(), 1);
        assert_eq!(world.progress(), 0.25);
        assert_eq!(world.run_to_completion(), GenerationState::Complete);

        let received = events.drain();
        let fractions: Vec<f32> = received.iter().map(GenerationEvent::fraction).collect();
        assert_eq!(fractions, vec![0.25, 0.5, 0.75, 1.0, 1.0]);
        assert_eq!(
            received.last(),
            Some(&GenerationEvent::Complete { seed: 7, chunks: 4 })
        );
        assert_eq!(world.progress(), 1.0);
    }

    #[test]
    fn final_pass_fixes_chunk_borders() {
        let world = generate(&small_config(3));
        for (pos, mesh) in world.meshes() {
            let fresh = mesh_chunk(&world.chunks, &world.layout, &world.atlas, *pos).expect("chunk");
            assert_eq!(&fresh, mesh);
            assert!(!world.chunk(*pos).expect("chunk").is_dirty());
        }
        assert_eq!(world.meshes().count(), 4);
    }

    #[test]
    fn cancelling_mid_run_leaves_nothing_behind() {
        let (mut world, _events) = CanyonWorld::new(None);
        world.generate(&small_config(1));
        world.step();
        let cancel = world.cancel_handle().expect("running");
        cancel.cancel();

        assert_eq!(world.step(), GenerationState::Idle);
        assert_eq!(world.chunk_count(), 0);
        assert_eq!(world.meshes().count(), 0);
        assert!(world.cancel_handle().is_none());
        assert_eq!(world.get_block(0, 1, 0), BlockType::Air);
    }

    #[test]
    fn clear_is_safe_when_idle_and_aborts_a_run() {
        let (mut world, _events) = CanyonWorld::new(None);
        world.clear();
        assert_eq!(world.state(), GenerationState::Idle);

        world.generate(&small_config(5));
        world.step();
        let cancel = world.cancel_handle().expect("running");
        world.clear();
        assert!(cancel.is_cancelled());
        assert_eq!(world.step(), GenerationState::Idle);
        assert_eq!(world.chunk_count(), 0);
    }

    #[test]
    fn parallel_batches_match_sequential_generation() {
        let config = GenerationConfig {
            chunks_per_frame: 3,
            strategy: CanyonStrategy::Path,
            width_in_chunks: 3,
            ..small_config(11)
        };
        let sequential = generate(&config);

        let jobs = JobSystem::new(Some(2)).expect("pool");
        let (mut parallel, _events) = CanyonWorld::new(Some(jobs));
        parallel.generate(&config);
        assert_eq!(parallel.run_to_completion(), GenerationState::Complete);

        assert_eq!(sequential.snapshot(), parallel.snapshot());
    }

    #[test]
    fn random_seed_is_reported_and_reproducible() {
        let config = GenerationConfig {
            use_random_seed: true,
            ..small_config(0)
        };
        let (mut world, _events) = CanyonWorld::new(None);
        let seed = world.generate(&config);
        world.run_to_completion();
        assert_eq!(world.seed(), seed);

        let replay = generate(&small_config(seed));
        assert_eq!(world.snapshot(), replay.snapshot());
    }

    #[test]
    fn block_queries_outside_the_world_read_air() {
        let world = generate(&small_config(9));
        assert_eq!(world.get_block(0, -1, 0), BlockType::Air);
        assert_eq!(world.get_block(0, CHUNK_HEIGHT as i32, 0), BlockType::Air);
        assert_eq!(world.get_block(-1000, 5, 0), BlockType::Air);
        assert_eq!(world.get_block(0, 0, 1000), BlockType::Air);
        assert_eq!(world.get_block(0, 0, 0), BlockType::Bedrock);
    }

    #[test]
    fn extreme_coordinates_read_air() {
        let world = generate(&small_config(9));
        assert_eq!(world.get_block(i32::MAX, 5, 0), BlockType::Air);
        assert_eq!(world.get_block(0, 5, i32::MAX), BlockType::Air);
        assert_eq!(world.get_block(i32::MIN, 5, i32::MIN), BlockType::Air);
        assert_eq!(world.get_block(0, i32::MAX, 0), BlockType::Air);
    }
}
