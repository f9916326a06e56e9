use glam::IVec3;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::block::BlockType;
use crate::canyon_path::PathCanyon;
use crate::chunk::ChunkData;
use crate::coords::{ChunkPos, WorldLayout, CHUNK_HEIGHT, CHUNK_SIZE};
use crate::grid::VoxelGrid;
use crate::stalagmite::StalagmiteField;

const WORLD_HEIGHT: i32 = CHUNK_HEIGHT as i32;

// Column-noise canyon shape.
const FLOOR_BASELINE: f64 = 3.0;
const RIM_HEIGHT: f64 = WORLD_HEIGHT as f64 - 2.0;
const PROFILE_EXPONENT: i32 = 5;
const WIDTH_NOISE_FREQUENCY: f64 = 0.3;
const HILL_NOISE_FREQUENCY: f64 = 0.2;
const DETAIL_NOISE_FREQUENCY: f64 = 2.0;
const MIN_SURFACE: i32 = 2;
const MAX_SURFACE: i32 = WORLD_HEIGHT - 5;
const NOISE_OFFSET_RANGE: f64 = 10_000.0;
const NOISE_OFFSET_SALT: u64 = 0x5eed_0ff5;

/// Which surface shape a generation run uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanyonStrategy {
    /// Straight trench along Z whose width and floor wander with noise.
    #[default]
    ColumnNoise,
    /// Trench following a drifting, branching centerline.
    Path,
}

/// Pure inputs of every terrain function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainParams {
    pub seed: u64,
    pub noise_scale: f64,
    pub height_multiplier: f64,
    pub canyon_width_factor: f64,
    pub stalagmite_density: f64,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 0,
            noise_scale: 0.03,
            height_multiplier: 10.0,
            canyon_width_factor: 1.0,
            stalagmite_density: 0.15,
        }
    }
}

/// How a column is dressed once its surface height is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnProfile {
    /// The top block is grass only when the surface is strictly above this.
    pub grass_above: i32,
    /// Dirt rows directly under a grass top.
    pub dirt_depth: i32,
}

/// Material at height `y` of a column whose top solid block sits at `surface`.
pub fn compose_column(surface: i32, y: i32, profile: ColumnProfile) -> BlockType {
    if y < 0 || y > surface {
        return BlockType::Air;
    }
    if y == 0 {
        return BlockType::Bedrock;
    }

    let grassy = surface > profile.grass_above;
    if !grassy {
        BlockType::Stone
    } else if y == surface {
        BlockType::Grass
    } else if y >= surface - profile.dirt_depth {
        BlockType::Dirt
    } else {
        BlockType::Stone
    }
}

pub(crate) fn mix64(mut value: u64) -> u64 {
    value ^= value >> 30;
    value = value.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    value ^= value >> 27;
    value = value.wrapping_mul(0x94d0_49bb_1331_11eb);
    value ^ (value >> 31)
}

/// Folds all 64 seed bits into the 32-bit seed `Perlin` takes.
pub(crate) fn perlin_seed(seed: u64, salt: u64) -> u32 {
    (mix64(seed.wrapping_add(salt)) >> 32) as u32
}

/// Order-independent hash of `(seed, salt, a, b)`.
pub(crate) fn cell_hash(seed: u64, salt: u64, a: i64, b: i64) -> u64 {
    mix64(
        seed.wrapping_add(salt)
            .wrapping_mul(6364136223846793005)
            .wrapping_add((a as u64).wrapping_mul(73856093))
            .wrapping_add((b as u64).wrapping_mul(19349663)),
    )
}

/// The `index`-th independent draw derived from one hash.
pub(crate) fn hash_draw(hash: u64, index: u64) -> u64 {
    mix64(hash.wrapping_add(index.wrapping_mul(0x9e37_79b9_7f4a_7c15)))
}

/// Maps a hash onto `[0, 1)`.
pub(crate) fn unit_from_hash(hash: u64) -> f64 {
    (hash >> 11) as f64 / (1u64 << 53) as f64
}

/// Perlin noise remapped from `[-1, 1]` onto `[0, 1]`.
pub(crate) fn noise01(noise: &Perlin, x: f64, y: f64) -> f64 {
    (noise.get([x, y]) * 0.5 + 0.5).clamp(0.0, 1.0)
}

/// Canyon running along Z through the world's X center.
///
/// Surface height is a function of `(world_x, world_z)` only: distance from
/// the axis, normalized by a noise-varied half width, goes through a steep
/// power curve so the floor meets the rim at a cliff.
#[derive(Debug, Clone)]
pub struct ColumnNoiseCanyon {
    params: TerrainParams,
    half_width: f64,
    noise_offset_z: f64,
    noise: Perlin,
}

impl ColumnNoiseCanyon {
    pub const PROFILE: ColumnProfile = ColumnProfile {
        grass_above: FLOOR_BASELINE as i32 + 3,
        dirt_depth: 2,
    };

    pub fn new(params: TerrainParams, layout: &WorldLayout) -> Self {
        let noise_offset_z =
            unit_from_hash(cell_hash(params.seed, NOISE_OFFSET_SALT, 0, 0)) * NOISE_OFFSET_RANGE;
        Self {
            params,
            half_width: f64::from(layout.width_in_blocks()) / 2.0,
            noise_offset_z,
            noise: Perlin::new(perlin_seed(params.seed, 0)),
        }
    }

    fn z_noise(&self, world_z: i32, frequency: f64) -> f64 {
        let t = (f64::from(world_z) + self.noise_offset_z) * self.params.noise_scale * frequency;
        noise01(&self.noise, 0.0, t)
    }

    /// 0 on the canyon axis, 1 at (or past) the noise-varied canyon edge.
    pub fn normalized_distance(&self, world_x: i32, world_z: i32) -> f64 {
        let width_variation = 0.5 + self.z_noise(world_z, WIDTH_NOISE_FREQUENCY);
        let effective = (self.half_width * self.params.canyon_width_factor * width_variation).max(1.0);
        (f64::from(world_x).abs() / effective).clamp(0.0, 1.0)
    }

    /// Unclamped surface height for a normalized distance in slice `world_z`.
    pub fn profile_height(&self, normalized_distance: f64, world_z: i32) -> f64 {
        let multiplier = self.params.height_multiplier;
        let hill = self.z_noise(world_z, HILL_NOISE_FREQUENCY);
        let floor = FLOOR_BASELINE + (hill - 0.3) * multiplier * 0.4;
        let rim = RIM_HEIGHT + (hill - 0.5) * multiplier * 0.3;

        let profile = normalized_distance.clamp(0.0, 1.0).powi(PROFILE_EXPONENT);
        let detail = self.z_noise(world_z, DETAIL_NOISE_FREQUENCY);
        floor + profile * (rim - floor) + (detail - 0.5) * multiplier * 0.15
    }

    pub fn surface_height(&self, world_x: i32, world_z: i32) -> i32 {
        let height = self.profile_height(self.normalized_distance(world_x, world_z), world_z);
        (height.floor() as i32).clamp(MIN_SURFACE, MAX_SURFACE)
    }
}

/// The surface strategy selected for one generation run.
#[derive(Debug, Clone)]
pub enum TerrainModel {
    ColumnNoise(ColumnNoiseCanyon),
    Path(PathCanyon),
}

impl TerrainModel {
    pub fn new(strategy: CanyonStrategy, params: TerrainParams, layout: &WorldLayout) -> Self {
        match strategy {
            CanyonStrategy::ColumnNoise => Self::ColumnNoise(ColumnNoiseCanyon::new(params, layout)),
            CanyonStrategy::Path => Self::Path(PathCanyon::generate(params, layout)),
        }
    }

    pub fn strategy(&self) -> CanyonStrategy {
        match self {
            Self::ColumnNoise(_) => CanyonStrategy::ColumnNoise,
            Self::Path(_) => CanyonStrategy::Path,
        }
    }

    pub fn profile(&self) -> ColumnProfile {
        match self {
            Self::ColumnNoise(_) => ColumnNoiseCanyon::PROFILE,
            Self::Path(_) => PathCanyon::PROFILE,
        }
    }

    pub fn surface_height(&self, world_x: i32, world_z: i32) -> i32 {
        match self {
            Self::ColumnNoise(canyon) => canyon.surface_height(world_x, world_z),
            Self::Path(canyon) => canyon.surface_height(world_x, world_z),
        }
    }
}

/// Produces chunk contents for one run: terrain, then stalagmites, then the
/// boundary walls, which win over everything else.
#[derive(Debug, Clone)]
pub struct WorldGenerator {
    pub seed: u64,
    layout: WorldLayout,
    terrain: TerrainModel,
    stalagmites: StalagmiteField,
}

impl WorldGenerator {
    pub fn new(strategy: CanyonStrategy, params: TerrainParams, layout: WorldLayout) -> Self {
        Self {
            seed: params.seed,
            terrain: TerrainModel::new(strategy, params, &layout),
            stalagmites: StalagmiteField::new(params.seed, params.stalagmite_density, &layout),
            layout,
        }
    }

    pub fn layout(&self) -> &WorldLayout {
        &self.layout
    }

    pub fn terrain(&self) -> &TerrainModel {
        &self.terrain
    }

    pub fn stalagmites(&self) -> &StalagmiteField {
        &self.stalagmites
    }

    pub fn block_at(&self, world: IVec3) -> BlockType {
        if !(0..WORLD_HEIGHT).contains(&world.y) {
            return BlockType::Air;
        }
        if self.layout.is_edge_column(world.x, world.z) {
            return BlockType::Stone;
        }
        if let Some(block) = self.stalagmites.block_at(world.x, world.y, world.z) {
            return block;
        }
        let surface = self.terrain.surface_height(world.x, world.z);
        compose_column(surface, world.y, self.terrain.profile())
    }

    pub fn generate_chunk(&self, pos: ChunkPos) -> ChunkData {
        let mut chunk = ChunkData::new_empty(pos);
        let origin = self.layout.chunk_origin(pos);
        let profile = self.terrain.profile();

        for z in 0..CHUNK_SIZE as i32 {
            for x in 0..CHUNK_SIZE as i32 {
                let world_x = origin.x + x;
                let world_z = origin.z + z;

                if self.layout.is_edge_column(world_x, world_z) {
                    for y in 0..WORLD_HEIGHT {
                        chunk.set_i32(x, y, z, BlockType::Stone);
                    }
                    continue;
                }

                let surface = self.terrain.surface_height(world_x, world_z);
                let stalagmite = self.stalagmites.column(world_x, world_z);
                for y in 0..WORLD_HEIGHT {
                    let block = match stalagmite.filter(|column| column.contains(y)) {
                        Some(_) => self.stalagmites.layer_block(y),
                        None => compose_column(surface, y, profile),
                    };
                    if !block.is_air() {
                        chunk.set_i32(x, y, z, block);
                    }
                }
            }
        }

        chunk
    }
}

/// ASCII cross-section of one Z slice, from the highest non-air row down to
/// `y = 0`. Each line is prefixed with its row number.
pub fn render_slice(grid: &VoxelGrid, slice_z: i32) -> String {
    let width = grid.width() as i32;
    let top = (0..grid.height() as i32)
        .rev()
        .find(|&y| (0..width).any(|x| !grid.is_air(x, y, slice_z)))
        .unwrap_or(0);

    let mut out = String::new();
    for y in (0..=top).rev() {
        out.push_str(&format!("{y:02} | "));
        out.extend((0..width).map(|x| grid.get(x, y, slice_z).symbol()));
        out.push('\n');
    }
    out
}
