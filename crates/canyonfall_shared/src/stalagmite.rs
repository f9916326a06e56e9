use std::ops::Range;

use crate::block::BlockType;
use crate::coords::{WorldLayout, CHUNK_HEIGHT};
use crate::worldgen::{cell_hash, hash_draw, unit_from_hash};

/// Stalagmites sit on a coarse grid; one cell holds at most one.
pub const CELL_SIZE: i64 = 6;
/// Shifts world coordinates positive before cell division.
const COORD_BIAS: i64 = 10_000;
/// Rows per material band.
pub const LAYER_THICKNESS: i32 = 4;
/// Blocks in from the near Z edge where nothing spawns.
pub const SPAWN_GUARD_DEPTH: i32 = 32;

const MIN_RADIUS: f64 = 0.5;
const CELL_SALT: u64 = 0x57a1_a9e1;
const LAYER_SALT: u64 = 0x1a7e_0b5d;
const GRAVEL_THRESHOLD: f64 = 0.6;

/// One stalagmite as seen from a single block column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StalagmiteColumn {
    /// Offsets from the column to the cell center.
    pub dx: f64,
    pub dz: f64,
    pub base_radius_x: f64,
    pub base_radius_z: f64,
    pub tip_radius_x: f64,
    pub tip_radius_z: f64,
}

impl StalagmiteColumn {
    /// Elliptical cone test at height `y`, tapering from base to tip over
    /// the full world height.
    pub fn contains(&self, y: i32) -> bool {
        if !(0..CHUNK_HEIGHT as i32).contains(&y) {
            return false;
        }
        let ratio = f64::from(y) / (CHUNK_HEIGHT as f64 - 1.0);
        let radius_x = lerp(self.base_radius_x, self.tip_radius_x, ratio).max(MIN_RADIUS);
        let radius_z = lerp(self.base_radius_z, self.tip_radius_z, ratio).max(MIN_RADIUS);
        let nx = self.dx / radius_x;
        let nz = self.dz / radius_z;
        nx * nx + nz * nz < 1.0
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Layered rock pillars scattered over the world, evaluated per column and
/// independent of the terrain underneath.
#[derive(Debug, Clone)]
pub struct StalagmiteField {
    seed: u64,
    density: f64,
    guard_z: Range<i32>,
}

impl StalagmiteField {
    pub fn new(seed: u64, density: f64, layout: &WorldLayout) -> Self {
        let start = layout.origin.z;
        Self {
            seed,
            density,
            guard_z: start..start + SPAWN_GUARD_DEPTH,
        }
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    /// Cell coordinates owning a world column.
    pub fn cell_of(world_x: i32, world_z: i32) -> (i64, i64) {
        (
            (i64::from(world_x) + COORD_BIAS).div_euclid(CELL_SIZE),
            (i64::from(world_z) + COORD_BIAS).div_euclid(CELL_SIZE),
        )
    }

    pub fn column(&self, world_x: i32, world_z: i32) -> Option<StalagmiteColumn> {
        if self.guard_z.contains(&world_z) {
            return None;
        }

        let (cell_x, cell_z) = Self::cell_of(world_x, world_z);
        let hash = cell_hash(self.seed, CELL_SALT, cell_x, cell_z);
        if unit_from_hash(hash_draw(hash, 0)) > self.density {
            return None;
        }

        let center_x = cell_x * CELL_SIZE + CELL_SIZE / 2;
        let center_z = cell_z * CELL_SIZE + CELL_SIZE / 2;
        let dx = (i64::from(world_x) + COORD_BIAS - center_x).abs();
        let dz = (i64::from(world_z) + COORD_BIAS - center_z).abs();

        Some(StalagmiteColumn {
            dx: dx as f64,
            dz: dz as f64,
            base_radius_x: (3 + hash_draw(hash, 1) % 3) as f64,
            base_radius_z: (3 + hash_draw(hash, 2) % 3) as f64,
            tip_radius_x: (1 + hash_draw(hash, 3) % 2) as f64,
            tip_radius_z: (1 + hash_draw(hash, 4) % 2) as f64,
        })
    }

    /// Banded material: every other band is stone, the rest cycle through
    /// sand, clay and an occasional gravel band.
    pub fn layer_block(&self, y: i32) -> BlockType {
        let layer = y.max(0) / LAYER_THICKNESS;
        match layer % 6 {
            1 => BlockType::Sand,
            3 => BlockType::Clay,
            5 => {
                let roll = unit_from_hash(cell_hash(self.seed, LAYER_SALT, i64::from(layer), 0));
                if roll > GRAVEL_THRESHOLD {
                    BlockType::Gravel
                } else {
                    BlockType::Stone
                }
            }
            _ => BlockType::Stone,
        }
    }

    pub fn block_at(&self, world_x: i32, y: i32, world_z: i32) -> Option<BlockType> {
        self.column(world_x, world_z)
            .filter(|column| column.contains(y))
            .map(|_| self.layer_block(y))
    }
}
