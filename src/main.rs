//! Arc Arena headless runner
//!
//! Loads a scene, then drives the simulation with a fixed timestep, firing at
//! random aim angles and spinning the walls, and logs what the pool is doing.

use std::env;

use anyhow::Result;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use arc_arena::consts::{MAX_SUBSTEPS, SIM_DT};
use arc_arena::sim::{Arena, ProjectileKind};
use arc_arena::ArenaConfig;

/// Frame time the runner pretends the host delivers
const FRAME_DT: f32 = 1.0 / 60.0;
/// Seconds of simulated play
const RUN_SECONDS: f32 = 10.0;
/// Seconds between shots
const FIRE_INTERVAL: f32 = 0.2;
/// Seconds between new wall targets
const SPIN_INTERVAL: f32 = 2.0;
const SEED: u64 = 0x5eed;

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Arc Arena (headless) starting...");

    let config = match env::var("ARC_ARENA_CONFIG") {
        Ok(path) => ArenaConfig::load(path),
        Err(_) => {
            log::info!("ARC_ARENA_CONFIG not set, using the default arena");
            ArenaConfig::default()
        }
    };
    log::debug!("Config:\n{}", config.to_json()?);

    let mut arena = Arena::from_config(&config);
    let mut rng = Pcg32::seed_from_u64(SEED);

    let mut accumulator = 0.0f32;
    let mut elapsed = 0.0f32;
    let mut next_fire = 0.0f32;
    let mut next_spin = 0.0f32;
    let mut next_report = 1.0f32;
    let mut shots = 0u32;
    let mut contacts = 0usize;

    while elapsed < RUN_SECONDS {
        accumulator += FRAME_DT;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            elapsed += SIM_DT;

            if elapsed >= next_fire {
                next_fire += FIRE_INTERVAL;
                arena.player.aim = rng.random_range(-180.0..180.0);
                let kind = if rng.random_bool(0.25) {
                    ProjectileKind::Pellet
                } else {
                    ProjectileKind::BasicBall
                };
                arena.fire(kind);
                shots += 1;
            }

            if elapsed >= next_spin {
                next_spin += SPIN_INTERVAL;
                for id in arena.walls().iter().map(|w| w.id()).collect::<Vec<_>>() {
                    let target = rng.random_range(-180.0..180.0);
                    if let Some(wall) = arena.wall_mut(id) {
                        wall.body_mut().target_rotation = target;
                    }
                }
            }

            contacts += arena.step(SIM_DT).len();
            accumulator -= SIM_DT;
            substeps += 1;
        }

        if elapsed >= next_report {
            next_report += 1.0;
            let frame = arena.render_frame();
            log::info!(
                "t={:.1}s shots={} contacts={} active={} free={} slots={} walls drawn={}",
                elapsed,
                shots,
                contacts,
                arena.pool().len(),
                arena.pool().free_len(),
                arena.pool().capacity(),
                frame.walls.len()
            );
        }
    }

    log::info!(
        "Done after {} ticks: {} shots, {} contacts, {} projectiles still active",
        arena.ticks(),
        shots,
        contacts,
        arena.pool().len()
    );
    Ok(())
}
