//! Headless симуляция HAMMERHOOK
//!
//! Строит тестовую полосу (пол, стена, breakable, launch pad, hook объекты),
//! прогоняет скриптованный input и печатает состояние персонажа.
//!
//! `hammerhook_simulation [config.ron]` - опциональный RON конфиг.

use bevy::prelude::*;
use hammerhook_simulation::collision::{spawn_solid, LAYER_ENVIRONMENT, LAYER_INTERACTABLE};
use hammerhook_simulation::{
    create_headless_app, spawn_player, step_fixed, Attackable, ConfigError, Hookable, InputAction,
    MovementState, PlayerInput, SimulationConfig,
};

fn send(app: &mut App, player: Entity, action: InputAction) {
    app.world_mut().send_event(PlayerInput::new(player, action));
}

fn build_course(world: &mut World) {
    // Пол (верх на y = 0) и стена вдоль трассы справа
    spawn_solid(world, Vec3::new(0.0, -0.5, -40.0), Vec3::new(20.0, 0.5, 60.0), LAYER_ENVIRONMENT);
    spawn_solid(world, Vec3::new(3.0, 4.0, -40.0), Vec3::new(0.5, 4.0, 20.0), LAYER_ENVIRONMENT);

    let breakable_at = Vec3::new(0.0, 1.0, -8.0);
    let breakable = spawn_solid(world, breakable_at, Vec3::splat(0.5), LAYER_INTERACTABLE);
    world.entity_mut(breakable).insert(Attackable::breakable(1, breakable_at));

    let pad = spawn_solid(world, Vec3::new(-4.0, 0.1, -20.0), Vec3::new(1.0, 0.1, 1.0), LAYER_INTERACTABLE);
    if let Ok(launch_pad) = Attackable::launch_pad(vec![8.0, 14.0, 20.0]) {
        world.entity_mut(pad).insert(launch_pad);
    }

    let mover_at = Vec3::new(0.0, 12.0, -60.0);
    let mover = spawn_solid(world, mover_at, Vec3::splat(1.0), LAYER_INTERACTABLE);
    world
        .entity_mut(mover)
        .insert(Hookable::mover(mover_at, Vec3::new(0.0, 4.0, -6.0), 3.0));

    let tree = spawn_solid(world, Vec3::new(-6.0, 10.0, -30.0), Vec3::new(0.5, 10.0, 0.5), LAYER_INTERACTABLE);
    world.entity_mut(tree).insert(Hookable::swing_charger(0.05, 200.0));
}

fn main() -> Result<(), ConfigError> {
    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    println!("Starting HAMMERHOOK headless simulation ({} Hz)", config.gameplay.tick_hz);

    let mut app = create_headless_app(config)?;
    build_course(app.world_mut());
    let player = spawn_player(app.world_mut(), Vec3::new(0.0, 1.01, 0.0), 0.0);

    // Бежим вперёд, прыгаем, бьём, бросаем якорь
    for tick in 0..600 {
        match tick {
            0 => send(&mut app, player, InputAction::Move(Vec2::new(0.0, 1.0))),
            40 => send(&mut app, player, InputAction::Jump { pressed: true }),
            45 => send(&mut app, player, InputAction::Jump { pressed: false }),
            60 => send(&mut app, player, InputAction::Attack { pressed: true }),
            90 => send(&mut app, player, InputAction::Attack { pressed: false }),
            150 => send(&mut app, player, InputAction::Look(Vec2::new(0.0, 120.0))),
            151 => send(&mut app, player, InputAction::Grapple { pressed: true }),
            260 => send(&mut app, player, InputAction::Grapple { pressed: false }),
            400 => send(&mut app, player, InputAction::Restart),
            _ => {}
        }

        step_fixed(&mut app);

        if tick % 50 == 0 {
            if let Some(state) = app.world().get::<MovementState>(player) {
                let position = app
                    .world()
                    .get::<Transform>(player)
                    .map(|t| t.translation)
                    .unwrap_or_default();
                println!(
                    "Tick {}: pos={:.2?} vel={:.2?} mode={:?} grounded={}",
                    tick, position, state.velocity, state.mode, state.grounded
                );
            }
        }
    }

    println!("Simulation complete!");
    Ok(())
}
