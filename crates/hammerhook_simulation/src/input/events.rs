//! Input events
//!
//! Хост (движок, демо, тесты) пишет `PlayerInput`, симуляция читает его
//! в начале fixed тика (`SimulationSet::Input`).

use bevy::prelude::*;

/// Одно действие игрока
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    /// Сырой move axis (x = strafe, y = forward), хранится до следующего Move
    Move(Vec2),
    /// Дельта мыши/стика за кадр (x = вправо, y = вверх)
    Look(Vec2),
    Jump { pressed: bool },
    /// Hammer: press = StartCharge, release = ReleaseCharge
    Attack { pressed: bool },
    /// Rod: press = Use, release = Retract
    Grapple { pressed: bool },
    /// Респавн на текущем spawn
    Restart,
    /// Респавн на начальном spawn + `NewGameRequested` для хоста
    NewGame,
}

/// Input event для конкретного персонажа
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PlayerInput {
    pub entity: Entity,
    pub action: InputAction,
}

impl PlayerInput {
    pub fn new(entity: Entity, action: InputAction) -> Self {
        Self { entity, action }
    }
}

/// Event: игрок запросил новую игру (перезагрузку сцены делает хост)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewGameRequested {
    pub entity: Entity,
}
