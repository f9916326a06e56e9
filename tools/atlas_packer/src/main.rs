use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use serde::Deserialize;

const EMPTY_SLOT: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Debug, Deserialize)]
struct AtlasManifest {
    output: String,
    /// Cells per side.
    #[serde(default = "default_atlas_size")]
    atlas_size: u32,
    /// Pixels per cell side.
    #[serde(default = "default_tile_size")]
    tile_size: u32,
    /// Slot order, row-major from the top-left; `""` leaves a slot white.
    textures: Vec<String>,
}

fn default_atlas_size() -> u32 {
    4
}

fn default_tile_size() -> u32 {
    64
}

fn main() {
    let manifest_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "manifest.toml".to_string());

    if let Err(err) = run(Path::new(&manifest_path)) {
        eprintln!("atlas_packer error: {err}");
        std::process::exit(1);
    }
}

fn run(manifest_path: &Path) -> Result<(), String> {
    let manifest_src = fs::read_to_string(manifest_path)
        .map_err(|err| format!("failed to read {}: {err}", manifest_path.display()))?;

    let manifest: AtlasManifest = toml::from_str(&manifest_src)
        .map_err(|err| format!("failed to parse {}: {err}", manifest_path.display()))?;

    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let atlas = pack(&manifest, base_dir)?;

    let output = base_dir.join(&manifest.output);
    atlas
        .save(&output)
        .map_err(|err| format!("failed to write {}: {err}", output.display()))?;

    println!(
        "Packed {} textures into {} ({}x{} cells of {}px)",
        manifest.textures.iter().filter(|name| !name.is_empty()).count(),
        output.display(),
        manifest.atlas_size,
        manifest.atlas_size,
        manifest.tile_size
    );
    Ok(())
}

fn pack(manifest: &AtlasManifest, base_dir: &Path) -> Result<RgbaImage, String> {
    if manifest.atlas_size == 0 || manifest.tile_size == 0 {
        return Err("atlas_size and tile_size must be positive".to_string());
    }
    let slots = (manifest.atlas_size * manifest.atlas_size) as usize;
    if manifest.textures.len() > slots {
        return Err(format!(
            "{} textures do not fit a {}x{} atlas",
            manifest.textures.len(),
            manifest.atlas_size,
            manifest.atlas_size
        ));
    }

    let side = manifest.atlas_size * manifest.tile_size;
    let mut atlas = RgbaImage::from_pixel(side, side, EMPTY_SLOT);

    for (slot, rel_path) in manifest.textures.iter().enumerate() {
        if rel_path.is_empty() {
            continue;
        }
        let path = PathBuf::from(base_dir).join(rel_path);
        let tile = image::open(&path)
            .map_err(|err| format!("failed to load {}: {err}", path.display()))?
            .to_rgba8();
        let tile = imageops::resize(&tile, manifest.tile_size, manifest.tile_size, FilterType::Nearest);

        let slot = slot as u32;
        let x = (slot % manifest.atlas_size) * manifest.tile_size;
        let y = (slot / manifest.atlas_size) * manifest.tile_size;
        imageops::replace(&mut atlas, &tile, i64::from(x), i64::from(y));
    }

    Ok(atlas)
}
