//! Boxstep - Headless Scenario Runner
//!
//! Builds a small test level, drops a box character into it and drives it
//! with scripted input at a fixed timestep, logging what happens.
//!
//! ```text
//! boxstep [CONFIG.json] [TICKS]
//! RUST_LOG=debug boxstep          # include state transitions and jumps
//! ```

use std::path::Path;

use anyhow::Context;
use boxstep_physics::{
    BoxCharacterController, CollisionWorld, ControllerConfig, LayerMask, MoveState,
    PhysicsCharacterController,
};
use glam::Vec3;

/// Fixed simulation step (50 Hz).
const TICK: f32 = 1.0 / 50.0;

/// Default number of ticks to simulate.
const DEFAULT_TICKS: usize = 600;

/// Scripted input for one tick.
struct ScriptedInput {
    direction: Vec3,
    jump: bool,
}

/// Input script: walk forward, hop twice, turn towards the ramp, then the wall.
fn script(tick: usize) -> ScriptedInput {
    let seconds = tick as f32 * TICK;
    match seconds {
        s if s < 2.0 => ScriptedInput { direction: Vec3::Z, jump: false },
        s if s < 2.1 => ScriptedInput { direction: Vec3::Z, jump: true },
        s if s < 4.0 => ScriptedInput { direction: Vec3::new(1.0, 0.0, 1.0), jump: false },
        s if s < 4.1 => ScriptedInput { direction: Vec3::X, jump: true },
        s if s < 7.0 => ScriptedInput { direction: Vec3::X, jump: false },
        s if s < 9.0 => ScriptedInput { direction: -Vec3::X, jump: false },
        _ => ScriptedInput { direction: -Vec3::Z, jump: false },
    }
}

/// Floor, a wall, a 60 degree ramp, and a low ceiling slab.
fn build_level() -> anyhow::Result<CollisionWorld> {
    let mut world = CollisionWorld::new();

    // Floor with its top at y=0
    world.add_box(Vec3::new(0.0, -0.5, 0.0), Vec3::new(60.0, 0.5, 60.0), LayerMask::WORLD);

    // Wall along the far -Z side
    world.add_box(Vec3::new(0.0, 3.0, -12.0), Vec3::new(30.0, 3.0, 0.5), LayerMask::WORLD);

    // Steep ramp rising along +X
    let rise = 6.0 * 60f32.to_radians().tan();
    world
        .add_ramp(Vec3::new(14.0, 0.0, 0.0), Vec3::new(20.0, rise, 30.0), LayerMask::WORLD)
        .context("ramp hull is degenerate")?;

    // Low ceiling over the start area
    world.add_box(Vec3::new(0.0, 3.5, 0.0), Vec3::new(3.0, 0.25, 3.0), LayerMask::WORLD);

    Ok(world)
}

fn load_config(path: Option<&str>) -> anyhow::Result<ControllerConfig> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(Path::new(path))
                .with_context(|| format!("reading config {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {path}"))?
        }
        None => ControllerConfig::default(),
    };

    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config = load_config(args.next().as_deref())?;
    let ticks = match args.next() {
        Some(ticks) => ticks.parse().context("TICKS must be a number")?,
        None => DEFAULT_TICKS,
    };

    let mut world = build_level()?;
    log::info!("level built: {} colliders", world.collider_count());

    // The character is also a collider others can query; its own moves skip it.
    let spawn = Vec3::new(0.0, config.half_extents().y, 0.0);
    let body = world.add_box(spawn, config.half_extents(), LayerMask::CHARACTER);
    let character = BoxCharacterController::new(&config, spawn).with_self_collider(body);
    let mut controller = PhysicsCharacterController::with_character(config, character);

    let mut previous_state = controller.state();
    let mut jumps = 0;
    let mut ceiling_ticks = 0;

    for tick in 0..ticks {
        let input = script(tick);
        controller.walk(input.direction);
        if input.jump && controller.jump() {
            jumps += 1;
            log::info!("tick {tick}: jumped at {:?}", controller.position());
        }

        controller.update(&world, TICK);
        world.set_position(body, controller.position());

        let character = controller.character();
        if character.touches_ceiling() {
            ceiling_ticks += 1;
        }

        if controller.state() != previous_state {
            log::info!(
                "tick {tick}: {:?} -> {:?} at {:?} (ground angle {:.1})",
                previous_state,
                controller.state(),
                controller.position(),
                character.ground_angle()
            );
            previous_state = controller.state();
        }
    }

    let character = controller.character();
    log::info!(
        "done after {ticks} ticks: position={:?} velocity={:?} state={:?} jumps={jumps} ceiling ticks={ceiling_ticks}",
        controller.position(),
        controller.velocity(),
        controller.state()
    );

    if controller.state() == MoveState::Walk && !character.is_grounded() {
        log::warn!("walking without ground contact");
    }

    Ok(())
}
