//! Тесты детерминизма
//!
//! Один и тот же скрипт input'а на одной и той же трассе даёт идентичный мир

use bevy::prelude::*;
use hammerhook_simulation::collision::{spawn_solid, LAYER_ENVIRONMENT, LAYER_INTERACTABLE};
use hammerhook_simulation::*;

const TICK_COUNT: usize = 600;

/// Скрипт: (тик, действие)
fn script() -> Vec<(usize, InputAction)> {
    vec![
        (0, InputAction::Move(Vec2::new(0.4, 1.0))),
        (20, InputAction::Jump { pressed: true }),
        (24, InputAction::Jump { pressed: false }),
        (30, InputAction::Jump { pressed: true }),
        (32, InputAction::Jump { pressed: false }),
        (60, InputAction::Look(Vec2::new(-40.0, -200.0))),
        (61, InputAction::Attack { pressed: true }),
        (90, InputAction::Attack { pressed: false }),
        (120, InputAction::Look(Vec2::new(80.0, 260.0))),
        (121, InputAction::Grapple { pressed: true }),
        (200, InputAction::Grapple { pressed: false }),
        (320, InputAction::Restart),
        (400, InputAction::Move(Vec2::new(-1.0, 0.5))),
        (450, InputAction::Jump { pressed: true }),
        (452, InputAction::Jump { pressed: false }),
    ]
}

fn build_course(world: &mut World) {
    spawn_solid(world, Vec3::new(0.0, -0.5, -20.0), Vec3::new(30.0, 0.5, 40.0), LAYER_ENVIRONMENT);
    spawn_solid(world, Vec3::new(3.0, 4.0, -25.0), Vec3::new(0.5, 4.0, 15.0), LAYER_ENVIRONMENT);

    let breakable_at = Vec3::new(-1.0, 0.5, -6.0);
    let breakable = spawn_solid(world, breakable_at, Vec3::splat(0.5), LAYER_INTERACTABLE);
    world.entity_mut(breakable).insert(Attackable::breakable(0, breakable_at));

    let tree = spawn_solid(world, Vec3::new(-3.0, 8.0, -30.0), Vec3::new(0.5, 8.0, 0.5), LAYER_INTERACTABLE);
    world.entity_mut(tree).insert(Hookable::swing_charger(0.05, 100.0));

    let mover_at = Vec3::new(2.0, 12.0, -40.0);
    let mover = spawn_solid(world, mover_at, Vec3::splat(1.0), LAYER_INTERACTABLE);
    world
        .entity_mut(mover)
        .insert(Hookable::mover(mover_at, Vec3::new(0.0, 2.0, 0.0), 2.0));
}

/// Запускает симуляцию и возвращает snapshot мира
fn run_simulation() -> Vec<u8> {
    let mut app = create_headless_app(SimulationConfig::default()).expect("default config is valid");
    build_course(app.world_mut());
    let player = spawn_player(app.world_mut(), Vec3::new(0.0, 1.001, 0.0), 0.0);

    let script = script();
    for tick in 0..TICK_COUNT {
        for (_, action) in script.iter().filter(|(at, _)| *at == tick) {
            app.world_mut().send_event(PlayerInput::new(player, *action));
        }
        step_fixed(&mut app);
    }

    let mut snapshot = world_snapshot::<MovementState>(app.world_mut());
    snapshot.extend(world_snapshot::<Transform>(app.world_mut()));
    snapshot.extend(world_snapshot::<Grapple>(app.world_mut()));
    snapshot.extend(world_snapshot::<Presence>(app.world_mut()));
    snapshot
}

#[test]
fn test_determinism_same_script() {
    let snapshot1 = run_simulation();
    let snapshot2 = run_simulation();

    assert_eq!(snapshot1, snapshot2, "Один и тот же скрипт дал разные результаты!");
}

#[test]
fn test_determinism_multiple_runs() {
    // Запускаем 3 раза - все должны быть идентичны
    let snapshots: Vec<_> = (0..3).map(|_| run_simulation()).collect();

    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(
            snapshots[0], *snapshot,
            "Прогон {} дал результат отличный от прогона 0",
            i
        );
    }
}
