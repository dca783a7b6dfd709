//! Probes - запросы персонажа к миру коллизий
//!
//! Ground probe, wall probe, look surface, attackable raycast.
//! Все лучи стартуют из центра капсулы и исключают самого персонажа.

use bevy::prelude::*;

use super::MovementState;
use crate::collision::{CharacterShape, CollisionQuery, SurfaceHit, INFINITE_RANGE};

/// Длина ground луча в долях высоты капсулы (чуть ниже подошвы)
pub const GROUND_PROBE_HEIGHT_FACTOR: f32 = 0.56;

/// Длина wall луча в радиусах капсулы
pub const WALL_PROBE_RADIUS_FACTOR: f32 = 1.5;

/// Три луча вниз: центр, вперёд на радиус, назад на радиус. Любое попадание = grounded.
/// Лучи мимо (край уступа сбоку) - grounded, если капсула касается ground снизу.
pub fn ground_check(
    world: &dyn CollisionQuery,
    shape: &CharacterShape,
    position: Vec3,
    facing: Vec3,
    mask: u32,
    character: Entity,
) -> bool {
    let origin = shape.center(position);
    let offset = facing * shape.radius;
    let reach = shape.height * GROUND_PROBE_HEIGHT_FACTOR;

    [origin, origin + offset, origin - offset]
        .into_iter()
        .any(|probe| world.raycast(probe, Vec3::NEG_Y, reach, mask, Some(character)).is_some())
        || world.overlaps_ground(position, shape, mask, Some(character))
}

/// Луч вбок в `direction`, при промахе - в противоположную сторону
pub fn wall_probe(
    world: &dyn CollisionQuery,
    shape: &CharacterShape,
    position: Vec3,
    direction: Vec3,
    mask: u32,
    character: Entity,
) -> Option<SurfaceHit> {
    let origin = shape.center(position);
    let reach = shape.radius * WALL_PROBE_RADIUS_FACTOR;

    world
        .raycast(origin, direction, reach, mask, Some(character))
        .or_else(|| world.raycast(origin, -direction, reach, mask, Some(character)))
}

/// Поверхность под прицелом (бесконечная дальность)
pub fn look_surface(
    world: &dyn CollisionQuery,
    shape: &CharacterShape,
    position: Vec3,
    state: &MovementState,
    mask: u32,
    character: Entity,
) -> Option<SurfaceHit> {
    world.raycast(
        shape.center(position),
        state.look_vector(),
        INFINITE_RANGE,
        mask,
        Some(character),
    )
}

/// Attack raycast с компенсацией скорости: `attack_range + |velocity|·dt`.
/// Промах вперёд → обратный луч от дальнего конца к глазам.
pub fn attackable_raycast(
    world: &dyn CollisionQuery,
    shape: &CharacterShape,
    position: Vec3,
    state: &MovementState,
    attack_range: f32,
    dt: f32,
    mask: u32,
    character: Entity,
) -> Option<SurfaceHit> {
    let eye = shape.center(position);
    let look = state.look_vector();
    let range = attack_range + state.velocity.length() * dt;

    world
        .raycast(eye, look, range, mask, Some(character))
        .or_else(|| world.raycast(eye + look * range, -look, range, mask, Some(character)))
}
