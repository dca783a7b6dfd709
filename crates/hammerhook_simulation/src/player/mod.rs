//! Player - персонаж под управлением игрока
//!
//! Один entity несёт всё: movement state, input, spawn, hammer и rod.

use bevy::prelude::*;

use crate::config::SimulationConfig;
use crate::equipment::{ChargeWeapon, Grapple};
use crate::movement::{CharacterInput, MovementState, SpawnPoint};

/// Marker component для player-controlled entity
///
/// Хост находит по нему, куда слать `PlayerInput`.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Компоненты персонажа на spawn позиции
pub fn player_bundle(
    config: &SimulationConfig,
    position: Vec3,
    yaw: f32,
) -> (
    Player,
    Transform,
    MovementState,
    CharacterInput,
    SpawnPoint,
    ChargeWeapon,
    Grapple,
) {
    let mut grapple = Grapple::default();
    grapple.anchor.position = config.gameplay.character.center(position);

    (
        Player,
        Transform::from_translation(position).with_rotation(Quat::from_rotation_y(yaw)),
        MovementState::new(config.movement.air_jumps, yaw),
        CharacterInput::default(),
        SpawnPoint::new(position, yaw),
        ChargeWeapon::default(),
        grapple,
    )
}

/// Спавнит персонажа в мир (config берётся из ресурса)
pub fn spawn_player(world: &mut World, position: Vec3, yaw: f32) -> Entity {
    let config = world
        .get_resource::<SimulationConfig>()
        .cloned()
        .unwrap_or_default();

    let entity = world.spawn(player_bundle(&config, position, yaw)).id();
    crate::logger::log_info(&format!("🧍 Player spawned: {:?} at {:?}", entity, position));
    entity
}
