//! Tests for the movement tick (step_character against a headless box world).

use bevy::prelude::*;

use super::*;
use crate::collision::{BoxVolume, VolumeWorld, LAYER_ENVIRONMENT};
use crate::config::SimulationConfig;

const DT: f32 = 0.02;
const EPS: f32 = 1e-4;

/// Высота pivot'а стоящего на полу персонажа (капсула 2м, центр в pivot)
const STANDING_Y: f32 = 1.001;

fn character() -> Entity {
    Entity::from_raw(100)
}

fn floor() -> BoxVolume {
    BoxVolume::new(
        Entity::from_raw(1),
        Vec3::new(0.0, -0.5, 0.0),
        Vec3::new(100.0, 0.5, 100.0),
        LAYER_ENVIRONMENT,
    )
}

/// Стена справа (при yaw = 0), грань на x = 0.7
fn right_wall() -> BoxVolume {
    BoxVolume::new(
        Entity::from_raw(2),
        Vec3::new(1.2, 5.0, 0.0),
        Vec3::new(0.5, 20.0, 100.0),
        LAYER_ENVIRONMENT,
    )
}

struct Rig {
    config: SimulationConfig,
    transform: Transform,
    state: MovementState,
    input: CharacterInput,
    spawn: SpawnPoint,
}

impl Rig {
    fn new(position: Vec3) -> Self {
        let config = SimulationConfig::default();
        let state = MovementState::new(config.movement.air_jumps, 0.0);
        Self {
            config,
            transform: Transform::from_translation(position),
            state,
            input: CharacterInput::default(),
            spawn: SpawnPoint::new(Vec3::new(0.0, 5.0, 0.0), 0.0),
        }
    }

    fn step(&mut self, world: &VolumeWorld) -> TickOutcome {
        step_character(
            world,
            &self.config,
            DT,
            character(),
            &mut self.transform,
            &mut self.state,
            &mut self.input,
            &self.spawn,
        )
    }
}

#[test]
fn test_ground_jump_applies_velocity_and_min_lateral() {
    let world = VolumeWorld::new(vec![floor()]);
    let mut rig = Rig::new(Vec3::new(0.0, STANDING_Y, 0.0));
    rig.state.wish_dir = Vec3::Z;
    rig.input.jump_held = true;

    rig.step(&world);

    let params = &rig.config.movement;
    let displacement = rig.state.last_displacement;
    assert!(rig.state.grounded);
    assert!((displacement.y - params.jump_velocity * DT).abs() < EPS, "dy = {}", displacement.y);
    assert!(modes::lateral(displacement).length() >= params.ground_max_velocity * DT / 3.0 - EPS);
    assert!(displacement.z > 0.0, "jump must go along the wish direction");
    assert!(rig.input.jumped_this_input);
    // Счётчик уменьшается только "unless grounded or wall-running":
    // прыжок с земли оставляет все air jumps
    assert_eq!(rig.state.air_jumps_remaining, 1);
}

#[test]
fn test_air_jump_consumes_one_per_press() {
    let world = VolumeWorld::new(vec![floor()]);
    let mut rig = Rig::new(Vec3::new(0.0, STANDING_Y, 0.0));
    rig.state.wish_dir = Vec3::Z;
    rig.input.jump_held = true;

    rig.step(&world); // прыжок с земли
    assert!(!rig.state.grounded || rig.transform.translation.y > STANDING_Y);

    // Удержание без нового нажатия: в воздухе не прыгаем
    rig.step(&world);
    assert_eq!(rig.state.air_jumps_remaining, 1);

    // Новое нажатие в воздухе
    rig.input.jumped_this_input = false;
    rig.step(&world);

    assert!(!rig.state.grounded);
    assert_eq!(rig.state.air_jumps_remaining, 0);
    assert!((rig.state.last_displacement.y - rig.config.movement.jump_velocity * DT).abs() < EPS);

    // Прыжков больше нет
    rig.input.jumped_this_input = false;
    rig.step(&world);
    assert!(rig.state.last_displacement.y < rig.config.movement.jump_velocity * DT);
}

#[test]
fn test_ground_mode_applies_friction() {
    let world = VolumeWorld::new(vec![floor()]);
    let mut rig = Rig::new(Vec3::new(0.0, STANDING_Y, 0.0));
    rig.state.grounded_last_tick = true;
    rig.state.velocity = Vec3::new(5.0, 0.0, 0.0);

    rig.step(&world);

    let friction = rig.config.movement.friction;
    assert_eq!(rig.state.mode, MovementMode::Ground);
    assert!((rig.state.velocity.x - (5.0 - 5.0 * friction * DT)).abs() < 1e-3);
    assert!(rig.state.velocity.y.abs() < 1e-3, "floor must stop gravity");
}

#[test]
fn test_first_grounded_tick_is_still_air_mode() {
    let world = VolumeWorld::new(vec![floor()]);
    let mut rig = Rig::new(Vec3::new(0.0, STANDING_Y, 0.0));

    rig.step(&world);
    assert_eq!(rig.state.mode, MovementMode::Air);

    rig.step(&world);
    assert_eq!(rig.state.mode, MovementMode::Ground);
}

#[test]
fn test_vertical_override_keeps_upward_launch() {
    let world = VolumeWorld::default();
    let gravity = SimulationConfig::default().movement.gravity;

    let mut launched = Rig::new(Vec3::new(0.0, 10.0, 0.0));
    launched.state.velocity = Vec3::new(0.0, -5.0, 0.0);
    launched.state.apply_force(Vec3::Y * 3.0, true);
    launched.step(&world);
    assert!((launched.state.velocity.y - (3.0 + gravity * DT)).abs() < 1e-3);
    assert!(!launched.state.override_vertical);
    assert_eq!(launched.state.pending_force, Vec3::ZERO);

    let mut plain = Rig::new(Vec3::new(0.0, 10.0, 0.0));
    plain.state.velocity = Vec3::new(0.0, -5.0, 0.0);
    plain.state.apply_force(Vec3::Y * 3.0, false);
    plain.step(&world);
    assert!((plain.state.velocity.y - (-2.0 + gravity * DT)).abs() < 1e-3);
}

#[test]
fn test_gravity_disable_and_fall_clamp() {
    let world = VolumeWorld::default();

    let mut floating = Rig::new(Vec3::new(0.0, 10.0, 0.0));
    floating.state.disable_gravity_for_seconds(1.0);
    floating.step(&world);
    assert!(floating.state.velocity.y.abs() < 1e-4);

    let mut falling = Rig::new(Vec3::new(0.0, 10.0, 0.0));
    falling.state.velocity = Vec3::new(0.0, -100.0, 0.0);
    falling.step(&world);
    let max_fall = falling.config.movement.max_fall_speed;
    assert!((falling.state.velocity.y + max_fall).abs() < 1e-3);
}

fn wall_runner(world_has_floor: bool) -> (VolumeWorld, Rig) {
    let mut boxes = vec![right_wall()];
    let y = if world_has_floor {
        boxes.push(floor());
        STANDING_Y
    } else {
        10.0
    };

    let mut rig = Rig::new(Vec3::new(0.0, y, 0.0));
    rig.state.wall_run_timer = -1.0; // cooldown давно прошёл
    rig.state.velocity = Vec3::new(0.0, 0.0, -10.0);
    rig.state.wish_dir = Vec3::new(0.6, 0.0, -0.8);
    (VolumeWorld::new(boxes), rig)
}

#[test]
fn test_wall_run_starts_along_wall() {
    let (world, mut rig) = wall_runner(false);
    rig.input.jump_held = true;

    let outcome = rig.step(&world);

    assert!(outcome.wall_run_started);
    assert_eq!(rig.state.mode, MovementMode::WallRun);
    assert!((rig.state.wall_run_timer - rig.config.movement.wall_run_duration).abs() < EPS);
    assert!((rig.state.wall_run_direction - Vec3::NEG_Z).length() < EPS);
    assert_eq!(rig.state.wall_normal, Vec3::NEG_X);
    assert!(!rig.input.jump_held, "wall-run entry clears jump");
    assert!(rig.state.camera_tilt_target != 0.0);
    // Не проваливаемся во время run'а после первого тика
    rig.step(&world);
    assert!(rig.state.last_displacement.y >= 0.0);
}

#[test]
fn test_wall_run_refused_when_grounded() {
    let (world, mut rig) = wall_runner(true);

    let outcome = rig.step(&world);

    assert!(rig.state.grounded);
    assert!(!outcome.wall_run_started);
    assert_ne!(rig.state.mode, MovementMode::WallRun);
}

#[test]
fn test_wall_run_refused_when_slow() {
    let (world, mut rig) = wall_runner(false);
    let threshold = rig.config.movement.ground_max_velocity * DT * 0.75;
    rig.state.velocity = Vec3::new(0.0, 0.0, -threshold * 0.5);

    let outcome = rig.step(&world);

    assert!(!outcome.wall_run_started);
    assert_eq!(rig.state.mode, MovementMode::Air);
}

#[test]
fn test_wall_run_refused_during_cooldown() {
    let (world, mut rig) = wall_runner(false);
    rig.state.wall_run_timer = -0.1;

    let outcome = rig.step(&world);

    assert!(!outcome.wall_run_started);
    assert_eq!(rig.state.mode, MovementMode::Air);
    assert!(rig.state.wall_run_timer > -rig.config.movement.wall_run_recovery_time);
}

#[test]
fn test_wall_run_refused_without_input_into_wall() {
    let (world, mut rig) = wall_runner(false);
    rig.state.wish_dir = Vec3::NEG_Z; // параллельно стене

    assert!(!rig.step(&world).wall_run_started);
}

#[test]
fn test_wall_jump_ends_run_and_kicks_off_wall() {
    let (world, mut rig) = wall_runner(false);
    rig.step(&world);
    assert!(rig.state.is_wall_running());

    rig.input.jump_held = true;
    rig.input.jumped_this_input = false;
    rig.step(&world);

    let params = &rig.config.movement;
    let displacement = rig.state.last_displacement;
    assert_eq!(rig.state.wall_run_timer, 0.0);
    assert!((displacement.y - params.jump_velocity * DT).abs() < EPS);
    assert!(displacement.x < 0.0, "kick goes along the wall normal");
    assert!((displacement.z + params.wall_run_speed * DT).abs() < EPS);
    assert_eq!(rig.state.air_jumps_remaining, params.air_jumps);
}

#[test]
fn test_death_plane_respawns_without_displacement() {
    let world = VolumeWorld::new(vec![floor()]);
    let mut rig = Rig::new(Vec3::new(3.0, -60.0, 2.0));
    rig.state.velocity = Vec3::new(4.0, -30.0, 0.0);
    rig.state.apply_force(Vec3::X * 5.0, true);
    rig.state.wall_run_timer = -0.2;

    let outcome = rig.step(&world);

    assert!(outcome.respawned);
    assert_eq!(rig.transform.translation, rig.spawn.position);
    assert_eq!(rig.state.last_displacement, Vec3::ZERO);
    assert_eq!(rig.state.velocity, Vec3::ZERO);
    assert_eq!(rig.state.pending_force, Vec3::ZERO);

    // Следующий тик - обычный, без повторного респавна
    assert!(!rig.step(&world).respawned);
}

#[test]
fn test_restart_request_respawns_once() {
    let world = VolumeWorld::new(vec![floor()]);
    let mut rig = Rig::new(Vec3::new(8.0, STANDING_Y, 8.0));
    rig.spawn.set_spawn(Vec3::new(1.0, STANDING_Y, 1.0), std::f32::consts::PI);
    rig.state.respawn_requested = true;

    assert!(rig.step(&world).respawned);
    assert_eq!(rig.transform.translation, Vec3::new(1.0, STANDING_Y, 1.0));
    assert!((rig.state.facing() - Vec3::Z).length() < EPS);
    assert!(!rig.step(&world).respawned);
}

#[test]
fn test_exactly_one_mode_follows_flags() {
    let (world, mut rig) = wall_runner(false);

    for tick in 0..120 {
        // Чередуем input, чтобы пройти через run, cooldown и падение
        if tick == 40 {
            rig.state.wish_dir = Vec3::ZERO;
        }
        rig.step(&world);

        let expected = if rig.state.wall_run_timer > 0.0 {
            MovementMode::WallRun
        } else if rig.state.grounded && rig.state.grounded_last_tick {
            MovementMode::Ground
        } else {
            MovementMode::Air
        };
        assert_eq!(rig.state.mode, expected, "tick {}", tick);
    }
}
