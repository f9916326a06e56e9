use glam::IVec3;
use noise::Perlin;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::coords::{WorldLayout, CHUNK_HEIGHT};
use crate::worldgen::{noise01, perlin_seed, ColumnProfile, TerrainParams};

const CANYON_WIDTH: f64 = 40.0;
const MIN_CANYON_WIDTH: f64 = 4.0;
const CANYON_BOTTOM: f64 = 5.0;
const CANYON_TOP: f64 = 25.0;
const EDGE_MARGIN: f64 = 5.0;

const RETARGET_INTERVAL: usize = 5;
const CURVE_INTENSITY: f64 = 0.3;
const STEER_RATE: f64 = 0.1;

const BRANCH_PROBABILITY: f64 = 0.15;
const BRANCH_MIN_Z: usize = 10;
const BRANCH_TAIL: usize = 50;
const BRANCH_SPREAD: f64 = 0.6;
const BRANCH_WEIGHT: f64 = 0.4;

const SMOOTHING_PASSES: usize = 2;
const SURFACE_NOISE_FREQUENCY: f64 = 0.1;
const SURFACE_NOISE_AMPLITUDE: f64 = 1.5;
const NOISE_SEED_SALT: u64 = 0x0bad_5eed;

#[derive(Debug, Clone, Copy)]
struct Branch {
    x: f64,
    start_z: usize,
    length: usize,
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn smoothstep(from: f64, to: f64, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let t = t * t * (3.0 - 2.0 * t);
    from + (to - from) * t
}

/// Canyon that follows a wandering centerline through grid space.
///
/// The centerline is drawn once per run from a `ChaCha8Rng` seeded with the
/// run seed, so the same seed always carves the same path.
#[derive(Debug, Clone)]
pub struct PathCanyon {
    origin: IVec3,
    width: f64,
    centerline: Vec<f64>,
    noise: Perlin,
}

impl PathCanyon {
    pub const PROFILE: ColumnProfile = ColumnProfile {
        grass_above: 8,
        dirt_depth: 3,
    };

    pub fn generate(params: TerrainParams, layout: &WorldLayout) -> Self {
        let depth = layout.length_in_blocks().max(0) as usize;
        let world_width = f64::from(layout.width_in_blocks());
        let width = (CANYON_WIDTH * params.canyon_width_factor).max(MIN_CANYON_WIDTH);

        let mut lo = width / 2.0 + EDGE_MARGIN;
        let mut hi = world_width - width / 2.0 - EDGE_MARGIN;
        if lo > hi {
            lo = world_width / 2.0;
            hi = lo;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
        let mut centerline = Vec::with_capacity(depth);
        let mut current = world_width / 2.0;
        let mut direction = 0.0;
        let mut target = 0.0;
        let mut branch: Option<Branch> = None;

        for z in 0..depth {
            if z % RETARGET_INTERVAL == 0 {
                target = (rng.gen::<f64>() - 0.5) * CURVE_INTENSITY;
            }
            direction = lerp(direction, target, STEER_RATE);
            current = (current + direction).clamp(lo, hi);

            let mut center = current;
            if let Some(active) = branch {
                let along = z - active.start_z;
                if along >= active.length {
                    branch = None;
                } else {
                    let fade = smoothstep(1.0, 0.0, along as f64 / active.length as f64);
                    center = lerp(center, active.x, fade * BRANCH_WEIGHT);
                }
            }
            centerline.push(center);

            let roll = rng.gen::<f64>();
            if roll < BRANCH_PROBABILITY && z > BRANCH_MIN_Z && z + BRANCH_TAIL < depth {
                let offset = (rng.gen::<f64>() - 0.5) * width * BRANCH_SPREAD;
                branch = Some(Branch {
                    x: (current + offset).clamp(lo, hi),
                    start_z: z,
                    length: rng.gen_range(15..30),
                });
            }
        }

        for _ in 0..SMOOTHING_PASSES {
            for z in 1..depth.saturating_sub(1) {
                centerline[z] = (centerline[z - 1] + centerline[z] + centerline[z + 1]) / 3.0;
            }
        }

        Self {
            origin: layout.origin,
            width,
            centerline,
            noise: Perlin::new(perlin_seed(params.seed, NOISE_SEED_SALT)),
        }
    }

    /// Centerline X per grid Z slice.
    pub fn centerline(&self) -> &[f64] {
        &self.centerline
    }

    pub fn canyon_width(&self) -> f64 {
        self.width
    }

    pub fn surface_height(&self, world_x: i32, world_z: i32) -> i32 {
        let grid_x = i64::from(world_x) - i64::from(self.origin.x);
        let grid_z = i64::from(world_z) - i64::from(self.origin.z);
        let center = usize::try_from(grid_z)
            .ok()
            .and_then(|z| self.centerline.get(z).copied())
            .unwrap_or(grid_x as f64);

        let half = self.width / 2.0;
        let distance = (grid_x as f64 - center).abs();
        let height = if distance < half {
            let t = distance / half;
            lerp(CANYON_BOTTOM, CANYON_TOP, t * t)
        } else {
            CANYON_TOP
        };

        let detail = noise01(
            &self.noise,
            grid_x as f64 * SURFACE_NOISE_FREQUENCY,
            grid_z as f64 * SURFACE_NOISE_FREQUENCY,
        );
        let jitter = detail * SURFACE_NOISE_AMPLITUDE - SURFACE_NOISE_AMPLITUDE / 2.0;
        ((height + jitter).round() as i32).clamp(1, CHUNK_HEIGHT as i32 - 1)
    }
}
