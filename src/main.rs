//! Murova - headless grass LOD driver
//!
//! Usage: murova [--config scene.json] [--frames 600] [--parallel]

use std::path::PathBuf;
use std::time::Instant;

use murova::core::{logging, Vec3};
use murova::scene::{GrassScene, SceneConfig};

fn main() {
    logging::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> murova::core::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config_path = args.iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from);
    let frames: u64 = args.iter()
        .position(|a| a == "--frames")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(600);
    let parallel = args.iter().any(|a| a == "--parallel");

    let config = match config_path {
        Some(path) => {
            log::info!("Loading scene config from {}", path.display());
            SceneConfig::from_json_file(&path)?
        }
        None => SceneConfig::default(),
    };

    let build_start = Instant::now();
    let mut scene = GrassScene::new(config)?;
    log::info!("Scene built in {:.1}ms", build_start.elapsed().as_secs_f64() * 1000.0);

    // Orbit the camera around the field at its initial radius and height
    let start = scene.camera_position();
    let radius = Vec3::new(start.x, 0.0, start.z).length().max(1.0);
    let center = scene.group().position();

    let loop_start = Instant::now();
    let mut draws = 0usize;
    for frame in 0..frames {
        let angle = frame as f32 * 0.01;
        let camera = center + Vec3::new(angle.sin() * radius, start.y, angle.cos() * radius);

        let stats = if parallel {
            scene.update_parallel(camera)?
        } else {
            scene.update(camera)?
        };
        draws += scene.draw_calls().count();

        if frame % 120 == 0 {
            log::info!(
                "frame {}: {} active / {} culled chunks, tiers {:?}",
                frame,
                stats.active_chunks,
                stats.inactive_chunks,
                stats.tier_counts
            );
        }
    }

    let elapsed = loop_start.elapsed().as_secs_f64();
    if frames > 0 {
        log::info!(
            "{} frames in {:.1}ms ({:.3}ms/frame, {:.1} draws/frame)",
            frames,
            elapsed * 1000.0,
            elapsed * 1000.0 / frames as f64,
            draws as f64 / frames as f64
        );
    }
    Ok(())
}
