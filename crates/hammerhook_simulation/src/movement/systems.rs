//! Movement systems - один fixed тик Movement Controller
//!
//! Порядок внутри тика (на каждого персонажа):
//! 1. Внешняя сила прошлого тика (+ vertical override)
//! 2. Ground probe (3 луча)
//! 3. Таймеры wall-run / gravity-disable
//! 4. Wall-run check → выбор режима (WallRun > Ground > Air)
//! 5. Перемещение режима + гравитация + clamp падения
//! 6. Прыжок
//! 7. Death plane / restart → респавн
//! 8. Swept move через collision backend

use bevy::ecs::system::StaticSystemParam;
use bevy::prelude::*;

use super::modes::{air_move, ground_move, lateral, wall_run_move};
use super::probes::{ground_check, wall_probe};
use super::{
    wish_direction, CharacterInput, GrappleReleaseRequested, MovementMode, MovementState,
    PlayerDied, SpawnPoint,
};
use crate::collision::{CollisionBackend, CollisionQuery};
use crate::config::SimulationConfig;

/// Wall-run не стартует, если горизонтальная скорость ниже этой доли `ground_max_velocity·dt`
pub const WALL_RUN_MIN_SPEED_FRACTION: f32 = 0.75;

/// Наклон камеры при wall-run (градусы)
pub const WALL_RUN_TILT_DEGREES: f32 = 5.0;

/// Что произошло за тик (для событий)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub respawned: bool,
    pub wall_run_started: bool,
}

/// System: тик движения всех персонажей
pub fn tick_movement<B: CollisionBackend>(
    collision: StaticSystemParam<B::Param>,
    config: Res<SimulationConfig>,
    fixed: Res<Time<Fixed>>,
    mut characters: Query<(
        Entity,
        &mut Transform,
        &mut MovementState,
        &mut CharacterInput,
        &SpawnPoint,
    )>,
    mut died_events: EventWriter<PlayerDied>,
    mut release_events: EventWriter<GrappleReleaseRequested>,
) {
    let dt = fixed.timestep().as_secs_f32();

    B::with_world(&*collision, |world| {
        for (entity, mut transform, mut state, mut input, spawn) in characters.iter_mut() {
            let outcome = step_character(
                world,
                &config,
                dt,
                entity,
                &mut transform,
                &mut state,
                &mut input,
                spawn,
            );

            if outcome.wall_run_started {
                release_events.write(GrappleReleaseRequested { entity });
            }

            if outcome.respawned {
                died_events.write(PlayerDied { entity });
            }
        }
    });
}

/// Один тик одного персонажа
#[allow(clippy::too_many_arguments)]
pub fn step_character(
    world: &dyn CollisionQuery,
    config: &SimulationConfig,
    dt: f32,
    entity: Entity,
    transform: &mut Transform,
    state: &mut MovementState,
    input: &mut CharacterInput,
    spawn: &SpawnPoint,
) -> TickOutcome {
    let params = &config.movement;
    let shape = &config.gameplay.character;
    let position = transform.translation;
    let mut outcome = TickOutcome::default();

    // 1. Силы, накопленные в прошлом тике
    let mut velocity = state.velocity;
    if state.override_vertical {
        velocity.y = velocity.y.max(0.0);
        state.override_vertical = false;
    }
    velocity += std::mem::take(&mut state.pending_force);

    // 2. Ground probe
    state.grounded = ground_check(world, shape, position, state.facing(), config.masks.ground, entity);
    let in_wall_run = state.is_wall_running();
    if state.grounded {
        state.air_jumps_remaining = params.air_jumps;
    }

    // 3. Таймеры
    state.wall_run_timer -= dt;
    state.gravity_disable_timer -= dt;

    // 4. Wall-run check
    let cast_direction = if state.wall_run_timer <= 0.0 {
        state.right()
    } else {
        state.wall_run_cast
    };
    let wall = wall_probe(world, shape, position, cast_direction, config.masks.ground, entity)
        .filter(|hit| {
            hit.normal.dot(state.wish_dir) != 0.0
                && !state.grounded
                && lateral(state.velocity).length()
                    >= params.ground_max_velocity * dt * WALL_RUN_MIN_SPEED_FRACTION
        });

    match wall {
        Some(hit) => {
            state.wall_normal = hit.normal;

            if state.wall_run_timer <= -params.wall_run_recovery_time {
                start_wall_run(state, input, hit.normal, params.wall_run_duration, params.air_jumps);
                outcome.wall_run_started = true;

                crate::logger::log(&format!(
                    "🧱 Wall-run start: {:?} dir={:?}",
                    entity, state.wall_run_direction
                ));
            }
        }
        None => {
            state.camera_tilt_target = 0.0;
            if state.wall_run_timer > 0.0 {
                state.wall_run_timer = 0.0;
            }
        }
    }

    state.mode = if state.wall_run_timer > 0.0 {
        MovementMode::WallRun
    } else if state.grounded && state.grounded_last_tick {
        MovementMode::Ground
    } else {
        MovementMode::Air
    };

    // 5. Перемещение режима + гравитация + clamp
    let mut delta = match state.mode {
        MovementMode::WallRun => {
            wall_run_move(velocity, state.wall_run_direction, params.wall_run_speed, dt)
        }
        MovementMode::Ground => ground_move(state.wish_dir, velocity, params, dt),
        MovementMode::Air => air_move(state.wish_dir, velocity, params, dt),
    };

    if !state.is_gravity_disabled() {
        delta.y += params.gravity * dt * dt;
    }

    let fall_floor = if in_wall_run {
        0.0
    } else {
        -params.max_fall_speed * dt
    };
    delta.y = delta.y.max(fall_floor);

    // 6. Прыжок
    let can_jump = input.jump_held
        && (state.grounded
            || (state.air_jumps_remaining > 0 && !input.jumped_this_input)
            || in_wall_run);

    if can_jump {
        let wish = state.wish_dir;
        if wish != Vec3::ZERO {
            delta = wish * lateral(delta).length();
        }

        let min_lateral = params.ground_max_velocity * dt / 3.0;
        if lateral(delta).length() < min_lateral {
            delta = wish * min_lateral;
        }

        if in_wall_run {
            state.wall_run_timer = 0.0;
            delta = (state.wall_run_direction * params.wall_run_speed
                + state.wall_normal * params.wall_jump_lateral_velocity)
                * dt;
        }

        delta.y = params.jump_velocity * dt;
        input.jumped_this_input = true;

        if !state.grounded && !in_wall_run {
            state.air_jumps_remaining = state.air_jumps_remaining.saturating_sub(1);
        }
    }

    state.grounded_last_tick = state.grounded;

    // 7. Death plane / restart
    if position.y < config.gameplay.death_plane_y || std::mem::take(&mut state.respawn_requested) {
        respawn(transform, state, input, spawn);
        outcome.respawned = true;

        crate::logger::log_info(&format!(
            "💀 Respawn: {:?} at {:?}",
            entity, spawn.position
        ));
    }

    // 8. Swept move
    let resolved = if outcome.respawned {
        Vec3::ZERO
    } else {
        world.sweep(transform.translation, shape, delta, Some(entity))
    };

    transform.translation += resolved;
    state.last_displacement = resolved;
    state.velocity = resolved / dt;

    outcome
}

fn start_wall_run(
    state: &mut MovementState,
    input: &mut CharacterInput,
    wall_normal: Vec3,
    duration: f32,
    air_jumps: u32,
) {
    state.wall_run_timer = duration;
    state.air_jumps_remaining = air_jumps;
    state.wall_run_cast = state.right();

    let along = Vec3::Y.cross(wall_normal);
    let side = if along.dot(state.facing()) >= 0.0 { 1.0 } else { -1.0 };
    state.wall_run_direction = along * side;
    state.camera_tilt_target = WALL_RUN_TILT_DEGREES * side;

    input.jump_held = false;
}

/// Телепорт на spawn: swept move не участвует, тик без перемещения
fn respawn(
    transform: &mut Transform,
    state: &mut MovementState,
    input: &CharacterInput,
    spawn: &SpawnPoint,
) {
    transform.translation = spawn.position;
    transform.rotation = Quat::from_rotation_y(spawn.yaw);

    state.yaw = spawn.yaw;
    state.pitch = 0.0;
    state.wish_dir = wish_direction(input.move_axis, spawn.yaw);
    state.velocity = Vec3::ZERO;
    state.pending_force = Vec3::ZERO;
    state.override_vertical = false;
    state.wall_run_timer = 0.0;
    state.gravity_disable_timer = 0.0;
    state.camera_tilt_target = 0.0;
}
