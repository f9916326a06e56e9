use std::env;
use std::path::PathBuf;

use canyonfall_client::landing_marker::{LandingMarker, LandingMarkerSettings, STANDARD_GRAVITY};
use canyonfall_client::renderer::mesh::vertex_bytes;
use canyonfall_client::settings::load_or_create_config;
use canyonfall_client::world::{CanyonWorld, GenerationEvent, GenerationState};
use canyonfall_core::jobs::JobSystem;
use canyonfall_shared::projectile::BallisticProjectile;
use canyonfall_shared::trajectory::DEFAULT_TIME_STEP;
use canyonfall_shared::worldgen::{render_slice, CanyonStrategy};
use glam::Vec3;
use tracing::info;

struct Options {
    config_path: PathBuf,
    seed: Option<u64>,
    strategy: Option<CanyonStrategy>,
    slice: Option<i32>,
}

fn parse_strategy(value: &str) -> Option<CanyonStrategy> {
    match value {
        "column_noise" | "column" => Some(CanyonStrategy::ColumnNoise),
        "path" => Some(CanyonStrategy::Path),
        _ => None,
    }
}

fn main() {
    let _ = tracing_subscriber::fmt().with_target(false).try_init();

    let mut options = Options {
        config_path: PathBuf::from("canyonfall.toml"),
        seed: None,
        strategy: None,
        slice: None,
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let Some(value) = args.next() else {
                    eprintln!("--config expects a path argument");
                    std::process::exit(2);
                };
                options.config_path = PathBuf::from(value);
            }
            "--seed" => {
                let Some(value) = args.next() else {
                    eprintln!("--seed expects a numeric argument");
                    std::process::exit(2);
                };
                match value.parse::<u64>() {
                    Ok(parsed) => options.seed = Some(parsed),
                    Err(err) => {
                        eprintln!("invalid seed '{value}': {err}");
                        std::process::exit(2);
                    }
                }
            }
            "--strategy" => {
                let Some(value) = args.next() else {
                    eprintln!("--strategy expects column_noise or path");
                    std::process::exit(2);
                };
                let Some(strategy) = parse_strategy(&value) else {
                    eprintln!("unknown strategy '{value}', expected column_noise or path");
                    std::process::exit(2);
                };
                options.strategy = Some(strategy);
            }
            "--slice" => {
                let Some(value) = args.next() else {
                    eprintln!("--slice expects a grid z coordinate");
                    std::process::exit(2);
                };
                match value.parse::<i32>() {
                    Ok(parsed) => options.slice = Some(parsed),
                    Err(err) => {
                        eprintln!("invalid slice '{value}': {err}");
                        std::process::exit(2);
                    }
                }
            }
            "--help" | "-h" => {
                println!(
                    "Usage: canyonfall [--config <path>] [--seed <u64>] \
                     [--strategy column_noise|path] [--slice <z>]"
                );
                return;
            }
            other => {
                eprintln!("unknown argument: {other}");
                std::process::exit(2);
            }
        }
    }

    if let Err(err) = run(options) {
        eprintln!("canyonfall failed: {err}");
        std::process::exit(1);
    }
}

fn run(options: Options) -> Result<(), String> {
    let mut config = load_or_create_config(&options.config_path);
    if let Some(seed) = options.seed {
        config.seed = seed;
        config.use_random_seed = false;
    }
    if let Some(strategy) = options.strategy {
        config.strategy = strategy;
    }

    let jobs = JobSystem::new(config.worker_threads)
        .map_err(|e| format!("failed to start job system: {e}"))?;
    let (mut world, events) = CanyonWorld::new(Some(jobs));
    let seed = world.generate(&config);

    loop {
        let state = world.step();
        for event in events.drain() {
            match event {
                GenerationEvent::Progress { generated, total } => {
                    info!("Progress {generated}/{total} ({:.0}%)", event.fraction() * 100.0);
                }
                GenerationEvent::Complete { chunks, .. } => {
                    info!("Generation finished with {chunks} chunks");
                }
            }
        }
        match state {
            GenerationState::Generating => continue,
            GenerationState::Complete => break,
            GenerationState::Idle => return Err("generation was cancelled".to_string()),
        }
    }

    let (faces, bytes) = world.meshes().fold((0, 0), |(faces, bytes), (_, mesh)| {
        (
            faces + mesh.face_count(),
            bytes + vertex_bytes(&mesh.interleaved()).len(),
        )
    });
    let grid = world.snapshot();
    info!(
        "Seed {seed}: {} solid blocks, {faces} faces, {bytes} vertex bytes",
        grid.count_non_air()
    );

    fire_test_shot(&world);

    let slice = options.slice.unwrap_or(grid.depth() as i32 / 2);
    println!("Cross-section at z={slice} (seed {seed}):");
    print!("{}", render_slice(&grid, slice));
    Ok(())
}

/// Fires one projectile down the canyon and compares the marker's
/// ground-level prediction with where it actually hits terrain.
fn fire_test_shot(world: &CanyonWorld) {
    const FLIGHT_LIMIT: f32 = 20.0;

    let origin = world.layout().origin;
    let start = Vec3::new(0.5, 28.0, origin.z as f32 + 4.5);
    let mut projectile = BallisticProjectile::new(start, Vec3::new(0.0, 6.0, 18.0), 0.05);
    let mut marker = LandingMarker::new(LandingMarkerSettings {
        update_interval: 0.0,
        drag: Some(projectile.drag),
        ..LandingMarkerSettings::default()
    });
    marker.track(&projectile);

    while projectile.elapsed < FLIGHT_LIMIT {
        projectile.advance(DEFAULT_TIME_STEP, STANDARD_GRAVITY);
        let cell = projectile.position.floor().as_ivec3();
        if projectile.is_below(0.0) || !world.get_block(cell.x, cell.y, cell.z).is_air() {
            break;
        }
    }

    info!(
        "Test shot: marker {:?}, impact {:?} after {:.2}s",
        marker.landing_point(),
        projectile.position,
        projectile.elapsed
    );
}
