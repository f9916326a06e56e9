use std::fs;
use std::io;
use std::path::Path;

use canyonfall_shared::coords::WorldLayout;
use canyonfall_shared::worldgen::{CanyonStrategy, TerrainParams};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::renderer::atlas::TextureOverride;

const MIN_WIDTH_IN_CHUNKS: i32 = 1;
const MAX_WIDTH_IN_CHUNKS: i32 = 64;
const MIN_LENGTH_IN_CHUNKS: i32 = 1;
const MAX_LENGTH_IN_CHUNKS: i32 = 256;
const MIN_NOISE_SCALE: f64 = 0.01;
const MAX_NOISE_SCALE: f64 = 0.2;
const MIN_HEIGHT_MULTIPLIER: f64 = 1.0;
const MAX_HEIGHT_MULTIPLIER: f64 = 20.0;
const MIN_CANYON_WIDTH_FACTOR: f64 = 0.3;
const MAX_CANYON_WIDTH_FACTOR: f64 = 2.0;
const MIN_STALAGMITE_DENSITY: f64 = 0.0;
const MAX_STALAGMITE_DENSITY: f64 = 0.5;

/// Everything one generation run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub use_random_seed: bool,
    #[serde(default = "default_width_in_chunks")]
    pub width_in_chunks: i32,
    #[serde(default = "default_length_in_chunks")]
    pub length_in_chunks: i32,
    #[serde(default = "default_noise_scale")]
    pub noise_scale: f64,
    #[serde(default = "default_height_multiplier")]
    pub height_multiplier: f64,
    #[serde(default = "default_canyon_width_factor")]
    pub canyon_width_factor: f64,
    #[serde(default = "default_stalagmite_density")]
    pub stalagmite_density: f64,
    #[serde(default = "default_chunks_per_frame")]
    pub chunks_per_frame: usize,
    #[serde(default)]
    pub strategy: CanyonStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_threads: Option<usize>,
    #[serde(default)]
    pub texture_overrides: Vec<TextureOverride>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            use_random_seed: false,
            width_in_chunks: default_width_in_chunks(),
            length_in_chunks: default_length_in_chunks(),
            noise_scale: default_noise_scale(),
            height_multiplier: default_height_multiplier(),
            canyon_width_factor: default_canyon_width_factor(),
            stalagmite_density: default_stalagmite_density(),
            chunks_per_frame: default_chunks_per_frame(),
            strategy: CanyonStrategy::default(),
            worker_threads: None,
            texture_overrides: Vec::new(),
        }
    }
}

/// Clamps into `[min, max]`, falling back for NaN and infinities.
fn clamp_finite(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

impl GenerationConfig {
    pub fn sanitize(mut self) -> Self {
        self.width_in_chunks = self
            .width_in_chunks
            .clamp(MIN_WIDTH_IN_CHUNKS, MAX_WIDTH_IN_CHUNKS);
        self.length_in_chunks = self
            .length_in_chunks
            .clamp(MIN_LENGTH_IN_CHUNKS, MAX_LENGTH_IN_CHUNKS);
        self.noise_scale = clamp_finite(
            self.noise_scale,
            MIN_NOISE_SCALE,
            MAX_NOISE_SCALE,
            default_noise_scale(),
        );
        self.height_multiplier = clamp_finite(
            self.height_multiplier,
            MIN_HEIGHT_MULTIPLIER,
            MAX_HEIGHT_MULTIPLIER,
            default_height_multiplier(),
        );
        self.canyon_width_factor = clamp_finite(
            self.canyon_width_factor,
            MIN_CANYON_WIDTH_FACTOR,
            MAX_CANYON_WIDTH_FACTOR,
            default_canyon_width_factor(),
        );
        self.stalagmite_density = clamp_finite(
            self.stalagmite_density,
            MIN_STALAGMITE_DENSITY,
            MAX_STALAGMITE_DENSITY,
            default_stalagmite_density(),
        );
        self.chunks_per_frame = self.chunks_per_frame.max(1);
        self.worker_threads = self.worker_threads.map(|count| count.max(1));
        self
    }

    pub fn layout(&self) -> WorldLayout {
        WorldLayout::centered(self.width_in_chunks, self.length_in_chunks)
    }

    pub fn terrain_params(&self, seed: u64) -> TerrainParams {
        TerrainParams {
            seed,
            noise_scale: self.noise_scale,
            height_multiplier: self.height_multiplier,
            canyon_width_factor: self.canyon_width_factor,
            stalagmite_density: self.stalagmite_density,
        }
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let parsed = toml::from_str::<Self>(&contents).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to deserialize generation config: {e}"),
            )
        })?;
        Ok(parsed.sanitize())
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let config = self.clone().sanitize();
        let serialized = toml::to_string_pretty(&config).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to serialize generation config: {e}"),
            )
        })?;
        fs::write(path, serialized)
    }
}

fn default_width_in_chunks() -> i32 {
    4
}

fn default_length_in_chunks() -> i32 {
    4
}

fn default_noise_scale() -> f64 {
    0.03
}

fn default_height_multiplier() -> f64 {
    10.0
}

fn default_canyon_width_factor() -> f64 {
    1.0
}

fn default_stalagmite_density() -> f64 {
    0.15
}

fn default_chunks_per_frame() -> usize {
    1
}

/// Loads `path`, writing the defaults there when it does not exist yet. Any
/// other failure falls back to defaults without touching the file.
pub fn load_or_create_config(path: &Path) -> GenerationConfig {
    match GenerationConfig::load(path) {
        Ok(config) => config,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let config = GenerationConfig::default();
            if let Err(save_err) = config.save(path) {
                warn!(
                    "Failed to create default config at {}: {save_err}",
                    path.display()
                );
            }
            config
        }
        Err(err) => {
            warn!("Failed to load config from {}: {err}", path.display());
            GenerationConfig::default()
        }
    }
}
