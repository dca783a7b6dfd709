//! Movement events

use bevy::prelude::*;

/// Event: персонаж умер/респавнулся (death plane или restart)
///
/// Пишется ровно один раз на респавн, в тике движения.
///
/// Обрабатывается (в том же тике):
/// - charge weapon: сброс заряда
/// - grapple: retract без launch силы
/// - breakable interactables: восстановление
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerDied {
    pub entity: Entity,
}

/// Event: начался wall-run, grapple нужно отпустить
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrappleReleaseRequested {
    pub entity: Entity,
}
