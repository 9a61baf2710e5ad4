//! Stride - headless movement demo
//!
//! Builds a small level, then plays a scripted key sequence through the
//! player controller at a fixed step and logs every movement transition.
//!
//! Usage: `stride [settings.toml]`, or `stride --save-settings` to write the
//! current settings to the config directory and exit.

mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use stride_core::{FrameClock, Vec3};
use stride_game::{InputAction, InputState, PlayerController};
use stride_physics::PhysicsWorld;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use settings::Settings;

/// Simulated render frame length fed to the clock
const FRAME_DELTA: f32 = 1.0 / 30.0;
/// Demo length in seconds
const DURATION: f64 = 8.0;

/// One scripted key edge
struct ScriptedKey {
    at: f64,
    action: InputAction,
    pressed: bool,
}

const fn key(at: f64, action: InputAction, pressed: bool) -> ScriptedKey {
    ScriptedKey {
        at,
        action,
        pressed,
    }
}

/// Walk, sprint, slide and ride it out, crouch, stand, jump
const SCRIPT: &[ScriptedKey] = &[
    key(0.0, InputAction::MoveForward, true),
    key(0.5, InputAction::Sprint, true),
    key(1.5, InputAction::Crouch, true),
    key(2.0, InputAction::Crouch, false),
    key(5.0, InputAction::Sprint, false),
    key(5.5, InputAction::Crouch, true),
    key(6.0, InputAction::Crouch, false),
    key(6.5, InputAction::Jump, true),
    key(6.6, InputAction::Jump, false),
    key(7.0, InputAction::MoveForward, false),
];

/// Flat floor, a low overhang and a ramp
fn build_level(physics: &mut PhysicsWorld) {
    physics.create_ground(0.0);
    physics.create_static_box(Vec3::new(300.0, 20.0, 300.0), Vec3::new(800.0, 170.0, 0.0));
    physics.create_ramp(
        Vec3::new(200.0, 10.0, 400.0),
        Vec3::new(-800.0, 60.0, 0.0),
        15f32.to_radians(),
    );
    physics.refresh_queries();
    info!("Level built with {} colliders", physics.collider_set.len());
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Starting Stride movement demo...");

    let settings = match std::env::args().nth(1).as_deref() {
        Some("--save-settings") => {
            Settings::load().save()?;
            return Ok(());
        }
        Some(path) => Settings::load_from(&PathBuf::from(path)),
        None => Settings::load(),
    };
    settings
        .movement
        .validate()
        .context("Invalid movement settings")?;

    let mut physics = PhysicsWorld::with_config(settings.physics.clone());
    build_level(&mut physics);

    let mut player =
        PlayerController::with_config(settings.movement.clone(), settings.character.clone());
    player.spawn(&mut physics, Vec3::new(0.0, 2.0, 0.0));

    let mut clock = FrameClock::new(settings.clock.clone());
    let mut input = InputState::new();
    let mut next_key = 0;
    let mut last_state = player.state();

    info!("Player spawned in {} at {:?}", last_state, player.position());

    while clock.elapsed < DURATION {
        while let Some(scripted) = SCRIPT.get(next_key).filter(|k| k.at <= clock.elapsed) {
            if scripted.pressed {
                input.press(scripted.action);
            } else {
                input.release(scripted.action);
            }
            debug!(
                "t={:.2} {:?} {}",
                clock.elapsed,
                scripted.action,
                if scripted.pressed { "down" } else { "up" }
            );
            next_key += 1;
        }

        let steps = clock.advance(FRAME_DELTA);
        for _ in 0..steps {
            player.fixed_update(&mut physics, &input, 0.0, clock.dt());
            // Edges are seen by the first step of the frame only
            input.clear_frame();

            let state = player.state();
            if state != last_state {
                info!(
                    "t={:.2} {} -> {} (speed {:.0}, at {:?})",
                    clock.elapsed,
                    last_state,
                    state,
                    player.speed(),
                    player.position()
                );
                last_state = state;
            }
        }
    }

    info!(
        "Demo finished after {} steps: {} at {:?}, grounded: {}",
        clock.step_count,
        player.state(),
        player.position(),
        player.is_grounded()
    );
    Ok(())
}
