//! Rapier backend integration test
//!
//! Тот же мир, что и в headless тестах, но запросы идут через bevy_rapier3d:
//! - персонаж на полу grounded
//! - sweep в стену останавливается на радиусе капсулы
//! - сломанный breakable (ColliderDisabled) больше не блокирует sweep

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use bevy_rapier3d::prelude::{ColliderDisabled, ReadRapierContext};
use hammerhook_simulation::collision::{
    spawn_solid, CharacterShape, CollisionBackend, CollisionQuery, LAYER_ENVIRONMENT,
    LAYER_INTERACTABLE,
};
use hammerhook_simulation::*;

fn create_app() -> App {
    let mut app = create_rapier_app(SimulationConfig::default()).expect("default config is valid");
    spawn_solid(
        app.world_mut(),
        Vec3::new(0.0, -0.5, 0.0),
        Vec3::new(100.0, 0.5, 100.0),
        LAYER_ENVIRONMENT,
    );
    app
}

fn run_sweep(In((origin, displacement)): In<(Vec3, Vec3)>, context: ReadRapierContext) -> Vec3 {
    RapierBackend::with_world(&context, |world| {
        world.sweep(origin, &CharacterShape::default(), displacement, None)
    })
}

fn sweep(app: &mut App, origin: Vec3, displacement: Vec3) -> Vec3 {
    app.world_mut()
        .run_system_once_with(run_sweep, (origin, displacement))
        .expect("sweep system runs")
}

fn state(app: &App, player: Entity) -> MovementState {
    app.world()
        .get::<MovementState>(player)
        .cloned()
        .expect("player has MovementState")
}

#[test]
fn test_player_on_floor_is_grounded() {
    let mut app = create_app();
    let player = spawn_player(app.world_mut(), Vec3::new(0.0, 1.05, 0.0), 0.0);

    for _ in 0..10 {
        step_fixed(&mut app);
    }

    assert!(state(&app, player).grounded);
    let y = app.world().get::<Transform>(player).expect("transform").translation.y;
    assert!((0.99..1.06).contains(&y), "y = {}", y);
}

#[test]
fn test_sweep_stops_at_wall() {
    let mut app = create_app();
    spawn_solid(
        app.world_mut(),
        Vec3::new(2.5, 1.0, 0.0),
        Vec3::new(0.5, 1.0, 5.0),
        LAYER_ENVIRONMENT,
    );
    // Collider'ы попадают в query pipeline после шага rapier
    step_fixed(&mut app);

    let moved = sweep(&mut app, Vec3::new(0.0, 1.05, 0.0), Vec3::new(3.0, 0.0, 0.0));

    // Грань стены x = 2.0, радиус 0.5, зазор 0.01
    assert!((moved.x - 1.49).abs() < 0.02, "moved = {:?}", moved);
    assert!(moved.y.abs() < 1e-3);
    assert!(moved.z.abs() < 1e-3);
}

#[test]
fn test_broken_breakable_stops_blocking() {
    let mut app = create_app();
    let home = Vec3::new(0.0, 0.5, -1.5);
    let breakable = spawn_solid(app.world_mut(), home, Vec3::splat(0.5), LAYER_INTERACTABLE);
    app.world_mut()
        .entity_mut(breakable)
        .insert(Attackable::breakable(0, home));

    let player = spawn_player(app.world_mut(), Vec3::new(0.0, 1.02, 0.0), 0.0);
    step_fixed(&mut app);
    step_fixed(&mut app);

    let origin = Vec3::new(0.0, 1.02, 0.0);
    let forward = Vec3::new(0.0, 0.0, -3.0);

    // Грань breakable'а z = -1.0
    let blocked = sweep(&mut app, origin, forward);
    assert!((blocked.z + 0.49).abs() < 0.02, "blocked = {:?}", blocked);

    if let Some(mut movement) = app.world_mut().get_mut::<MovementState>(player) {
        movement.pitch = -0.32;
    }
    app.world_mut()
        .send_event(PlayerInput::new(player, InputAction::Attack { pressed: true }));
    step_fixed(&mut app);
    app.world_mut()
        .send_event(PlayerInput::new(player, InputAction::Attack { pressed: false }));
    step_fixed(&mut app);

    // Presence → ColliderDisabled → rapier
    for _ in 0..3 {
        step_fixed(&mut app);
    }

    assert!(!app.world().get::<Presence>(breakable).expect("presence").collidable);
    assert!(app.world().get::<ColliderDisabled>(breakable).is_some());

    let open = sweep(&mut app, origin, forward);
    assert!((open.z + 3.0).abs() < 1e-3, "open = {:?}", open);
}
